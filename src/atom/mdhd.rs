use super::*;

/// Media header.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Mdhd {
    pub version: u8,
    pub flags: [u8; 3],
    pub creation_time: u64,
    pub modification_time: u64,
    pub timescale: u32,
    /// The duration in `timescale` units.
    pub duration: u64,
    /// A packed ISO 639-2/T language code.
    pub language: u16,
    pub quality: u16,
}

impl Atom for Mdhd {
    const FOURCC: Fourcc = MEDIA_HEADER;
}

impl ParseAtom for Mdhd {
    fn parse_atom(reader: &mut (impl Read + Seek), size: Size) -> crate::Result<Self> {
        let mut mdhd = Self::default();

        let (version, flags) = head::parse_full(reader)?;
        mdhd.version = version;
        mdhd.flags = flags;
        match version {
            0 => {
                expect_size("Media header (mdhd)", size, 24)?;
                mdhd.creation_time = reader.read_be_u32()? as u64;
                mdhd.modification_time = reader.read_be_u32()? as u64;
                mdhd.timescale = reader.read_be_u32()?;
                mdhd.duration = reader.read_be_u32()? as u64;
            }
            1 => {
                expect_size("Media header (mdhd)", size, 36)?;
                mdhd.creation_time = reader.read_be_u64()?;
                mdhd.modification_time = reader.read_be_u64()?;
                mdhd.timescale = reader.read_be_u32()?;
                mdhd.duration = reader.read_be_u64()?;
            }
            v => return unknown_version("media header (mdhd)", v),
        }
        mdhd.language = reader.read_be_u16()?;
        mdhd.quality = reader.read_be_u16()?;

        Ok(mdhd)
    }
}

impl AtomSize for Mdhd {
    fn size(&self) -> Size {
        match self.version {
            0 => Size::from(24),
            _ => Size::from(36),
        }
    }
}

impl WriteAtom for Mdhd {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        self.write_head(writer)?;
        head::write_full(writer, self.version, self.flags)?;

        match self.version {
            0 => {
                writer.write_be_u32(self.creation_time as u32)?;
                writer.write_be_u32(self.modification_time as u32)?;
                writer.write_be_u32(self.timescale)?;
                writer.write_be_u32(self.duration as u32)?;
            }
            1 => {
                writer.write_be_u64(self.creation_time)?;
                writer.write_be_u64(self.modification_time)?;
                writer.write_be_u32(self.timescale)?;
                writer.write_be_u64(self.duration)?;
            }
            v => return unknown_version("media header (mdhd)", v),
        }
        writer.write_be_u16(self.language)?;
        writer.write_be_u16(self.quality)?;

        Ok(())
    }
}

impl Mdhd {
    pub fn new(timescale: u32, duration: u64, language: [u8; 3]) -> Self {
        Self {
            version: (duration > u32::MAX as u64) as u8,
            timescale,
            duration,
            language: pack_language(language),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn language_field() {
        let buf = Mdhd::new(600, 9000, *b"und").to_bytes().unwrap();
        assert_eq!(buf.len(), 32);
        assert_eq!(be_int!(buf, 20, u32), Some(600));
        assert_eq!(be_int!(buf, 28, u16), Some(0x55C4));
    }
}
