use super::*;

/// The file type (`ftyp`) of a movie: a major brand and the brands it is compatible with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileType {
    /// The brand the file conforms to best.
    pub major_brand: Fourcc,
    /// The version of the major brand.
    pub minor_version: u32,
    /// Brands the file is also compatible with.
    pub compatible_brands: Vec<Fourcc>,
}

impl Atom for FileType {
    const FOURCC: Fourcc = FILETYPE;
}

impl ParseAtom for FileType {
    fn parse_atom(reader: &mut (impl Read + Seek), size: Size) -> crate::Result<Self> {
        expect_min_size("Filetype (ftyp)", size, 8)?;

        let mut major_brand = Fourcc::default();
        reader.read_exact(&mut *major_brand)?;
        let minor_version = reader.read_be_u32()?;

        let count = (size.content_len() - 8) / 4;
        let mut compatible_brands = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let mut brand = Fourcc::default();
            reader.read_exact(&mut *brand)?;
            compatible_brands.push(brand);
        }
        reader.skip(((size.content_len() - 8) % 4) as i64)?;

        Ok(Self { major_brand, minor_version, compatible_brands })
    }
}

impl AtomSize for FileType {
    fn size(&self) -> Size {
        Size::from(8 + 4 * self.compatible_brands.len() as u64)
    }
}

impl WriteAtom for FileType {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        self.write_head(writer)?;
        writer.write_all(&*self.major_brand)?;
        writer.write_be_u32(self.minor_version)?;
        for b in self.compatible_brands.iter() {
            writer.write_all(&**b)?;
        }
        Ok(())
    }
}

impl FileType {
    /// Returns `true` if the major brand is `qt  `.
    pub fn is_quicktime(&self) -> bool {
        self.major_brand == QUICKTIME_BRAND
    }

    /// A QuickTime movie (`qt  `).
    pub fn quicktime() -> Self {
        Self {
            major_brand: QUICKTIME_BRAND,
            minor_version: 0x0200,
            compatible_brands: vec![QUICKTIME_BRAND],
        }
    }

    /// An MPEG-4 file (`mp42`, compatible with `isom`).
    pub fn mp4() -> Self {
        Self {
            major_brand: MP42_BRAND,
            minor_version: 0,
            compatible_brands: vec![MP42_BRAND, ISOM_BRAND],
        }
    }
}
