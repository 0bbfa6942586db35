use super::*;

/// Media.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Mdia {
    pub mdhd: Option<Mdhd>,
    pub hdlr: Option<Hdlr>,
    pub minf: Option<Minf>,
}

impl Atom for Mdia {
    const FOURCC: Fourcc = MEDIA;
}

impl ParseAtom for Mdia {
    fn parse_atom(reader: &mut (impl Read + Seek), size: Size) -> crate::Result<Self> {
        let mut mdia = Self::default();

        parse_children(reader, size, |reader, head| {
            match head.fourcc() {
                MEDIA_HEADER => mdia.mdhd = Some(Mdhd::parse(reader, head.size())?),
                HANDLER_REFERENCE => mdia.hdlr = Some(Hdlr::parse(reader, head.size())?),
                MEDIA_INFORMATION => mdia.minf = Some(Minf::parse(reader, head.size())?),
                _ => return Ok(false),
            }
            Ok(true)
        })?;

        Ok(mdia)
    }
}

impl AtomSize for Mdia {
    fn size(&self) -> Size {
        let content_len =
            self.mdhd.len_or_zero() + self.hdlr.len_or_zero() + self.minf.len_or_zero();
        Size::from(content_len)
    }
}

impl WriteAtom for Mdia {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        self.write_head(writer)?;
        if let Some(a) = &self.mdhd {
            a.write(writer)?;
        }
        if let Some(a) = &self.hdlr {
            a.write(writer)?;
        }
        if let Some(a) = &self.minf {
            a.write(writer)?;
        }
        Ok(())
    }
}

impl Mdia {
    pub fn stbl(&self) -> Option<&Stbl> {
        self.minf.as_ref().and_then(|m| m.stbl.as_ref())
    }
}
