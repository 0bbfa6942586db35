use super::*;

/// Media information.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Minf {
    pub vmhd: Option<Vmhd>,
    pub gmhd: Option<Gmhd>,
    pub dinf: Option<Dinf>,
    pub stbl: Option<Stbl>,
}

impl Atom for Minf {
    const FOURCC: Fourcc = MEDIA_INFORMATION;
}

impl ParseAtom for Minf {
    fn parse_atom(reader: &mut (impl Read + Seek), size: Size) -> crate::Result<Self> {
        let mut minf = Self::default();

        parse_children(reader, size, |reader, head| {
            match head.fourcc() {
                VIDEO_MEDIA_INFORMATION_HEADER => {
                    minf.vmhd = Some(Vmhd::parse(reader, head.size())?)
                }
                BASE_MEDIA_INFORMATION_HEADER => {
                    minf.gmhd = Some(Gmhd::parse(reader, head.size())?)
                }
                DATA_INFORMATION => minf.dinf = Some(Dinf::parse(reader, head.size())?),
                SAMPLE_TABLE => minf.stbl = Some(Stbl::parse(reader, head.size())?),
                _ => return Ok(false),
            }
            Ok(true)
        })?;

        Ok(minf)
    }
}

impl AtomSize for Minf {
    fn size(&self) -> Size {
        let content_len = self.vmhd.len_or_zero()
            + self.gmhd.len_or_zero()
            + self.dinf.len_or_zero()
            + self.stbl.len_or_zero();
        Size::from(content_len)
    }
}

impl WriteAtom for Minf {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        self.write_head(writer)?;
        if let Some(a) = &self.vmhd {
            a.write(writer)?;
        }
        if let Some(a) = &self.gmhd {
            a.write(writer)?;
        }
        if let Some(a) = &self.dinf {
            a.write(writer)?;
        }
        if let Some(a) = &self.stbl {
            a.write(writer)?;
        }
        Ok(())
    }
}
