use super::*;

/// Video media information header.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Vmhd {
    pub version: u8,
    pub flags: [u8; 3],
    pub graphics_mode: u16,
    pub op_color: [u16; 3],
}

impl Atom for Vmhd {
    const FOURCC: Fourcc = VIDEO_MEDIA_INFORMATION_HEADER;
}

impl ParseAtom for Vmhd {
    fn parse_atom(reader: &mut (impl Read + Seek), size: Size) -> crate::Result<Self> {
        let mut vmhd = Self::default();

        let (version, flags) = head::parse_full(reader)?;
        vmhd.version = version;
        vmhd.flags = flags;
        if version != 0 {
            return unknown_version("video media information header (vmhd)", version);
        }
        expect_size("Video media information header (vmhd)", size, 12)?;

        vmhd.graphics_mode = reader.read_be_u16()?;
        for c in vmhd.op_color.iter_mut() {
            *c = reader.read_be_u16()?;
        }

        Ok(vmhd)
    }
}

impl AtomSize for Vmhd {
    fn size(&self) -> Size {
        Size::from(12)
    }
}

impl WriteAtom for Vmhd {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        self.write_head(writer)?;
        head::write_full(writer, self.version, self.flags)?;
        writer.write_be_u16(self.graphics_mode)?;
        for c in self.op_color {
            writer.write_be_u16(c)?;
        }
        Ok(())
    }
}

impl Vmhd {
    /// Header of a still image track drawn with dither copy.
    pub fn chapter() -> Self {
        Self {
            version: 0,
            flags: [0, 0, 1],
            graphics_mode: 0x0040,
            op_color: [0x8000; 3],
        }
    }
}
