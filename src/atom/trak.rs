use super::*;

/// A track.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Trak {
    pub tkhd: Option<Tkhd>,
    pub tref: Option<Tref>,
    pub mdia: Option<Mdia>,
    /// The direct children in stream order, as found while parsing.
    pub children: Vec<(Fourcc, AtomBounds)>,
}

impl Atom for Trak {
    const FOURCC: Fourcc = TRACK;
}

impl ParseAtom for Trak {
    fn parse_atom(reader: &mut (impl Read + Seek), size: Size) -> crate::Result<Self> {
        let mut trak = Self::default();

        parse_children(reader, size, |reader, head| {
            let bounds = find_bounds(reader, head.size())?;
            trak.children.push((head.fourcc(), bounds));

            match head.fourcc() {
                TRACK_HEADER => trak.tkhd = Some(Tkhd::parse(reader, head.size())?),
                TRACK_REFERENCE => trak.tref = Some(Tref::parse(reader, head.size())?),
                MEDIA => trak.mdia = Some(Mdia::parse(reader, head.size())?),
                _ => return Ok(false),
            }
            Ok(true)
        })?;

        Ok(trak)
    }
}

impl AtomSize for Trak {
    fn size(&self) -> Size {
        let content_len =
            self.tkhd.len_or_zero() + self.tref.len_or_zero() + self.mdia.len_or_zero();
        Size::from(content_len)
    }
}

impl WriteAtom for Trak {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        self.write_head(writer)?;
        if let Some(a) = &self.tkhd {
            a.write(writer)?;
        }
        if let Some(a) = &self.tref {
            a.write(writer)?;
        }
        if let Some(a) = &self.mdia {
            a.write(writer)?;
        }
        Ok(())
    }
}

impl Trak {
    pub fn stbl(&self) -> Option<&Stbl> {
        self.mdia.as_ref().and_then(|m| m.stbl())
    }

    pub fn handler_type(&self) -> Option<Fourcc> {
        self.mdia.as_ref().and_then(|m| m.hdlr.as_ref()).map(|h| h.handler_type)
    }
}
