use super::*;

/// Sample table.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Stbl {
    pub stsd: Option<Stsd>,
    pub stts: Option<Stts>,
    pub stsc: Option<Stsc>,
    pub stsz: Option<Stsz>,
    pub stco: Option<Stco>,
    pub co64: Option<Co64>,
}

impl Atom for Stbl {
    const FOURCC: Fourcc = SAMPLE_TABLE;
}

impl ParseAtom for Stbl {
    fn parse_atom(reader: &mut (impl Read + Seek), size: Size) -> crate::Result<Self> {
        let mut stbl = Self::default();

        parse_children(reader, size, |reader, head| {
            match head.fourcc() {
                SAMPLE_TABLE_SAMPLE_DESCRIPTION => {
                    stbl.stsd = Some(Stsd::parse(reader, head.size())?)
                }
                SAMPLE_TABLE_TIME_TO_SAMPLE => stbl.stts = Some(Stts::parse(reader, head.size())?),
                SAMPLE_TABLE_SAMPLE_TO_CHUNK => stbl.stsc = Some(Stsc::parse(reader, head.size())?),
                SAMPLE_TABLE_SAMPLE_SIZE => stbl.stsz = Some(Stsz::parse(reader, head.size())?),
                SAMPLE_TABLE_CHUNK_OFFSET => stbl.stco = Some(Stco::parse(reader, head.size())?),
                SAMPLE_TABLE_CHUNK_OFFSET_64 => {
                    stbl.co64 = Some(Co64::parse(reader, head.size())?)
                }
                _ => return Ok(false),
            }
            Ok(true)
        })?;

        Ok(stbl)
    }
}

impl AtomSize for Stbl {
    fn size(&self) -> Size {
        let content_len = self.stsd.len_or_zero()
            + self.stts.len_or_zero()
            + self.stsc.len_or_zero()
            + self.stsz.len_or_zero()
            + self.stco.len_or_zero()
            + self.co64.len_or_zero();
        Size::from(content_len)
    }
}

impl WriteAtom for Stbl {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        self.write_head(writer)?;
        if let Some(a) = &self.stsd {
            a.write(writer)?;
        }
        if let Some(a) = &self.stts {
            a.write(writer)?;
        }
        if let Some(a) = &self.stsc {
            a.write(writer)?;
        }
        if let Some(a) = &self.stsz {
            a.write(writer)?;
        }
        if let Some(a) = &self.stco {
            a.write(writer)?;
        }
        if let Some(a) = &self.co64 {
            a.write(writer)?;
        }
        Ok(())
    }
}

impl Stbl {
    pub fn chunk_offsets(&self) -> Option<ChunkOffsets<'_>> {
        match (&self.stco, &self.co64) {
            (Some(stco), _) => Some(ChunkOffsets::Stco(stco)),
            (None, Some(co64)) => Some(ChunkOffsets::Co64(co64)),
            (None, None) => None,
        }
    }
}
