use super::*;

/// An image sample description for Photo JPEG stills.
///
/// ```md
/// 4 bytes size
/// 4 bytes type (`jpeg`)
/// 6 bytes reserved
/// 2 bytes data reference index
/// 2 bytes version
/// 2 bytes revision level
/// 4 bytes vendor
/// 4 bytes temporal quality
/// 4 bytes spatial quality
/// 2 bytes width
/// 2 bytes height
/// 4 bytes horizontal resolution (16.16)
/// 4 bytes vertical resolution (16.16)
/// 4 bytes data size
/// 2 bytes frame count
/// 32 bytes compressor name (pascal string)
/// 2 bytes depth
/// 2 bytes color table id
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ImageSampleEntry {
    /// Index into the `dref` table, starting at 1.
    pub data_reference_index: u16,
    /// Always 0.
    pub version: u16,
    /// Always 0.
    pub revision: u16,
    /// The creator of the compressed data.
    pub vendor: Fourcc,
    /// Between 0 and 1023.
    pub temporal_quality: u32,
    /// Between 0 and 1024.
    pub spatial_quality: u32,
    /// Width in pixels.
    pub width: u16,
    /// Height in pixels.
    pub height: u16,
    /// Pixels per inch as 16.16 fixed point.
    pub horizontal_resolution: u32,
    /// Pixels per inch as 16.16 fixed point.
    pub vertical_resolution: u32,
    /// Frames per sample, always 1.
    pub frame_count: u16,
    /// At most 31 bytes.
    pub compressor_name: String,
    /// Bits per pixel.
    pub depth: u16,
    /// -1 for the default color table.
    pub color_table_id: i16,
}

impl ImageSampleEntry {
    /// The encoded length including the head.
    pub const LEN: u64 = 86;
    /// Offset of the width field in the encoded record.
    pub const WIDTH_POS: usize = 32;
    /// Offset of the height field in the encoded record.
    pub const HEIGHT_POS: usize = 34;
    const COMPRESSOR_NAME_LEN: usize = 32;

    /// Creates a Photo JPEG description. Dimensions that don't fit into 16 bits are rejected.
    pub fn jpeg(width: u32, height: u32) -> crate::Result<Self> {
        let dimension = |name: &str, v: u32| {
            u16::try_from(v).map_err(|_| {
                crate::Error::new(
                    ErrorKind::FormatDescriptionInvalid,
                    format!("Image {name} {v} exceeds the 16 bit range"),
                )
            })
        };

        Ok(Self {
            data_reference_index: 1,
            version: 0,
            revision: 0,
            vendor: Fourcc::default(),
            temporal_quality: 0x200,
            spatial_quality: 0x200,
            width: dimension("width", width)?,
            height: dimension("height", height)?,
            horizontal_resolution: 0x0048_0000,
            vertical_resolution: 0x0048_0000,
            frame_count: 1,
            compressor_name: "Photo - JPEG".to_owned(),
            depth: 24,
            color_table_id: -1,
        })
    }

    pub(crate) fn validate(&self) -> crate::Result<()> {
        if self.compressor_name.len() >= Self::COMPRESSOR_NAME_LEN {
            return Err(crate::Error::new(
                ErrorKind::FormatDescriptionInvalid,
                format!(
                    "Compressor name of {} bytes doesn't fit into 31 bytes",
                    self.compressor_name.len()
                ),
            ));
        }
        Ok(())
    }
}

impl Atom for ImageSampleEntry {
    const FOURCC: Fourcc = JPEG_MEDIA;
}

impl ParseAtom for ImageSampleEntry {
    fn parse_atom(reader: &mut (impl Read + Seek), size: Size) -> crate::Result<Self> {
        expect_min_size("Image sample entry (jpeg)", size, Self::LEN - 8)?;

        reader.skip(6)?; // reserved
        let data_reference_index = reader.read_be_u16()?;
        let version = reader.read_be_u16()?;
        let revision = reader.read_be_u16()?;
        let mut vendor = Fourcc::default();
        reader.read_exact(&mut *vendor)?;
        let temporal_quality = reader.read_be_u32()?;
        let spatial_quality = reader.read_be_u32()?;
        let width = reader.read_be_u16()?;
        let height = reader.read_be_u16()?;
        let horizontal_resolution = reader.read_be_u32()?;
        let vertical_resolution = reader.read_be_u32()?;
        reader.skip(4)?; // data size
        let frame_count = reader.read_be_u16()?;

        let name = reader.read_u8_vec(Self::COMPRESSOR_NAME_LEN as u64)?;
        let name_len = (name[0] as usize).min(Self::COMPRESSOR_NAME_LEN - 1);
        let compressor_name = String::from_utf8(name[1..1 + name_len].to_vec())?;

        let depth = reader.read_be_u16()?;
        let color_table_id = reader.read_be_i16()?;
        // extension atoms such as `pasp` are not interpreted
        reader.skip((size.content_len() - (Self::LEN - 8)) as i64)?;

        Ok(Self {
            data_reference_index,
            version,
            revision,
            vendor,
            temporal_quality,
            spatial_quality,
            width,
            height,
            horizontal_resolution,
            vertical_resolution,
            frame_count,
            compressor_name,
            depth,
            color_table_id,
        })
    }
}

impl AtomSize for ImageSampleEntry {
    fn size(&self) -> Size {
        Size::from(Self::LEN - 8)
    }
}

impl WriteAtom for ImageSampleEntry {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        self.validate()?;
        self.write_head(writer)?;

        writer.write_all(&[0; 6])?;
        writer.write_be_u16(self.data_reference_index)?;
        writer.write_be_u16(self.version)?;
        writer.write_be_u16(self.revision)?;
        writer.write_all(&*self.vendor)?;
        writer.write_be_u32(self.temporal_quality)?;
        writer.write_be_u32(self.spatial_quality)?;
        writer.write_be_u16(self.width)?;
        writer.write_be_u16(self.height)?;
        writer.write_be_u32(self.horizontal_resolution)?;
        writer.write_be_u32(self.vertical_resolution)?;
        writer.write_be_u32(0)?; // data size
        writer.write_be_u16(self.frame_count)?;

        let mut name = [0; Self::COMPRESSOR_NAME_LEN];
        name[0] = self.compressor_name.len() as u8;
        name[1..1 + self.compressor_name.len()].copy_from_slice(self.compressor_name.as_bytes());
        writer.write_all(&name)?;

        writer.write_be_u16(self.depth)?;
        writer.write_be_i16(self.color_table_id)?;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn fixed_offsets() {
        let entry = ImageSampleEntry::jpeg(640, 360).unwrap();
        let buf = entry.to_bytes().unwrap();
        assert_eq!(buf.len(), 86);
        assert_eq!(be_int!(buf, 0, u32), Some(86));
        assert_eq!(&buf[4..8], b"jpeg");
        assert_eq!(be_int!(buf, ImageSampleEntry::WIDTH_POS, u16), Some(640));
        assert_eq!(be_int!(buf, ImageSampleEntry::HEIGHT_POS, u16), Some(360));
        assert_eq!(buf[50], 12);
        assert_eq!(&buf[51..63], b"Photo - JPEG");
        assert_eq!(be_int!(buf, 82, u16), Some(24));
        assert_eq!(be_int!(buf, 84, i16), Some(-1));

        let mut reader = Cursor::new(&buf);
        let head = head::parse(&mut reader).unwrap();
        assert_eq!(ImageSampleEntry::parse(&mut reader, head.size()).unwrap(), entry);
    }

    #[test]
    fn oversized_dimensions() {
        let err = ImageSampleEntry::jpeg(70_000, 10).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::FormatDescriptionInvalid));
        let err = ImageSampleEntry::jpeg(10, 65_536).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::FormatDescriptionInvalid));
        assert!(ImageSampleEntry::jpeg(65_535, 65_535).is_ok());
    }
}
