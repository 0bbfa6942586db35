use std::borrow::Cow;

use super::*;

/// Base media information header, used by media without a dedicated header such as text.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Gmhd {
    pub gmin: Option<Gmin>,
    pub text: Option<GmhdText>,
}

impl Atom for Gmhd {
    const FOURCC: Fourcc = BASE_MEDIA_INFORMATION_HEADER;
}

impl ParseAtom for Gmhd {
    fn parse_atom(reader: &mut (impl Read + Seek), size: Size) -> crate::Result<Self> {
        let mut gmhd = Self::default();

        parse_children(reader, size, |reader, head| {
            match head.fourcc() {
                BASE_MEDIA_INFORMATION => gmhd.gmin = Some(Gmin::parse(reader, head.size())?),
                TEXT_MEDIA => gmhd.text = Some(GmhdText::parse(reader, head.size())?),
                _ => return Ok(false),
            }
            Ok(true)
        })?;

        Ok(gmhd)
    }
}

impl AtomSize for Gmhd {
    fn size(&self) -> Size {
        let content_len = self.gmin.len_or_zero() + self.text.len_or_zero();
        Size::from(content_len)
    }
}

impl WriteAtom for Gmhd {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        self.write_head(writer)?;
        if let Some(a) = &self.gmin {
            a.write(writer)?;
        }
        if let Some(a) = &self.text {
            a.write(writer)?;
        }
        Ok(())
    }
}

impl Gmhd {
    pub fn chapter() -> Self {
        Self {
            gmin: Some(Gmin::chapter()),
            text: Some(GmhdText::chapter()),
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Gmin {
    pub version: u8,
    pub flags: [u8; 3],
    pub graphics_mode: u16,
    pub op_color: [u16; 3],
    pub balance: u16,
}

impl Atom for Gmin {
    const FOURCC: Fourcc = BASE_MEDIA_INFORMATION;
}

impl ParseAtom for Gmin {
    fn parse_atom(reader: &mut (impl Read + Seek), size: Size) -> crate::Result<Self> {
        let mut gmin = Self::default();

        let (version, flags) = head::parse_full(reader)?;
        gmin.version = version;
        gmin.flags = flags;
        if version != 0 {
            return unknown_version("base media information (gmin)", version);
        }
        expect_size("Base media information (gmin)", size, 16)?;

        gmin.graphics_mode = reader.read_be_u16()?;
        for c in gmin.op_color.iter_mut() {
            *c = reader.read_be_u16()?;
        }
        gmin.balance = reader.read_be_u16()?;
        reader.skip(2)?; // reserved

        Ok(gmin)
    }
}

impl AtomSize for Gmin {
    fn size(&self) -> Size {
        Size::from(16)
    }
}

impl WriteAtom for Gmin {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        self.write_head(writer)?;
        head::write_full(writer, self.version, self.flags)?;

        writer.write_be_u16(self.graphics_mode)?;
        for c in self.op_color {
            writer.write_be_u16(c)?;
        }
        writer.write_be_u16(self.balance)?;
        writer.write_be_u16(0)?; // reserved

        Ok(())
    }
}

impl Gmin {
    pub fn chapter() -> Self {
        Self {
            version: 0,
            flags: [0; 3],
            graphics_mode: 0x0040,
            op_color: [0x8000; 3],
            balance: 0,
        }
    }
}

/// The `text` child of `gmhd`, holding a display matrix for text media.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct GmhdText {
    pub data: Cow<'static, [u8]>,
}

impl Atom for GmhdText {
    const FOURCC: Fourcc = TEXT_MEDIA;
}

impl ParseAtom for GmhdText {
    fn parse_atom(reader: &mut (impl Read + Seek), size: Size) -> crate::Result<Self> {
        let data = reader.read_u8_vec(size.content_len())?;
        Ok(Self { data: Cow::Owned(data) })
    }
}

impl AtomSize for GmhdText {
    fn size(&self) -> Size {
        Size::from(self.data.len() as u64)
    }
}

impl WriteAtom for GmhdText {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        self.write_head(writer)?;
        writer.write_all(&self.data)?;
        Ok(())
    }
}

impl GmhdText {
    pub fn chapter() -> Self {
        Self {
            data: Cow::Borrowed(&[
                0x00, 0x01, 0x00, 0x00, //
                0x00, 0x00, 0x00, 0x00, //
                0x00, 0x00, 0x00, 0x00, //
                0x00, 0x00, 0x00, 0x00, //
                0x00, 0x01, 0x00, 0x00, //
                0x00, 0x00, 0x00, 0x00, //
                0x00, 0x00, 0x00, 0x00, //
                0x00, 0x00, 0x00, 0x00, //
                0x40, 0x00, 0x00, 0x00, //
            ]),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn chapter_header_layout() {
        let buf = Gmhd::chapter().to_bytes().unwrap();
        assert_eq!(buf.len(), 8 + 24 + 44);
        assert_eq!(&buf[12..16], b"gmin");
        assert_eq!(&buf[20..22], &[0x00, 0x40]);
        assert_eq!(&buf[36..40], b"text");
    }
}
