use super::*;

const HEADER_SIZE: u64 = 8;

/// Sample table chunk offset with 32 bit offsets.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Stco {
    /// The position of the atom inside the stream it was parsed from.
    pub bounds: Option<AtomBounds>,
    pub offsets: Vec<u32>,
}

/// Sample table chunk offset with 64 bit offsets.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Co64 {
    /// The position of the atom inside the stream it was parsed from.
    pub bounds: Option<AtomBounds>,
    pub offsets: Vec<u64>,
}

impl Atom for Stco {
    const FOURCC: Fourcc = SAMPLE_TABLE_CHUNK_OFFSET;
}

impl Atom for Co64 {
    const FOURCC: Fourcc = SAMPLE_TABLE_CHUNK_OFFSET_64;
}

impl ParseAtom for Stco {
    fn parse_atom(reader: &mut (impl Read + Seek), size: Size) -> crate::Result<Self> {
        let bounds = find_bounds(reader, size)?;
        let num_entries = parse_table_head(reader, size, "Sample table chunk offset (stco)", 4)?;

        let mut offsets = Vec::with_capacity(num_entries as usize);
        for _ in 0..num_entries {
            offsets.push(reader.read_be_u32()?);
        }

        Ok(Self { bounds: Some(bounds), offsets })
    }
}

impl ParseAtom for Co64 {
    fn parse_atom(reader: &mut (impl Read + Seek), size: Size) -> crate::Result<Self> {
        let bounds = find_bounds(reader, size)?;
        let num_entries =
            parse_table_head(reader, size, "Sample table chunk offset 64 (co64)", 8)?;

        let mut offsets = Vec::with_capacity(num_entries as usize);
        for _ in 0..num_entries {
            offsets.push(reader.read_be_u64()?);
        }

        Ok(Self { bounds: Some(bounds), offsets })
    }
}

fn parse_table_head(
    reader: &mut impl Read,
    size: Size,
    name: &str,
    entry_size: u64,
) -> crate::Result<u32> {
    let (version, _) = head::parse_full(reader)?;
    if version != 0 {
        return unknown_version(name, version);
    }
    let num_entries = reader.read_be_u32()?;
    expect_size(name, size, HEADER_SIZE + entry_size * num_entries as u64)?;
    Ok(num_entries)
}

impl AtomSize for Stco {
    fn size(&self) -> Size {
        Size::from(HEADER_SIZE + 4 * self.offsets.len() as u64)
    }
}

impl AtomSize for Co64 {
    fn size(&self) -> Size {
        Size::from(HEADER_SIZE + 8 * self.offsets.len() as u64)
    }
}

impl WriteAtom for Stco {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        self.write_head(writer)?;
        head::write_full(writer, 0, [0; 3])?;
        writer.write_be_u32(self.offsets.len() as u32)?;
        for o in self.offsets.iter() {
            writer.write_be_u32(*o)?;
        }
        Ok(())
    }
}

impl WriteAtom for Co64 {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        self.write_head(writer)?;
        head::write_full(writer, 0, [0; 3])?;
        writer.write_be_u32(self.offsets.len() as u32)?;
        for o in self.offsets.iter() {
            writer.write_be_u64(*o)?;
        }
        Ok(())
    }
}

/// Chunk offsets of a track, whichever table they were stored in.
#[derive(Clone, Copy, Debug)]
pub enum ChunkOffsets<'a> {
    Stco(&'a Stco),
    Co64(&'a Co64),
}

impl ChunkOffsets<'_> {
    pub fn get(&self, index: usize) -> Option<u64> {
        match self {
            Self::Stco(a) => a.offsets.get(index).map(|o| *o as u64),
            Self::Co64(a) => a.offsets.get(index).copied(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Stco(a) => a.offsets.len(),
            Self::Co64(a) => a.offsets.len(),
        }
    }

    /// Shifts every offset by the amount `shift` returns for it inside `buf`, which holds the
    /// bytes the table was parsed from.
    pub fn shift_in_place(
        &self,
        buf: &mut Vec<u8>,
        shift: impl Fn(u64) -> i64,
    ) -> crate::Result<()> {
        let (bounds, entry_size) = match self {
            Self::Stco(a) => (a.bounds, 4),
            Self::Co64(a) => (a.bounds, 8),
        };
        let Some(bounds) = bounds else {
            return Ok(());
        };
        let table_pos = (bounds.content_pos() + HEADER_SIZE) as usize;

        for i in 0..self.len() {
            let pos = table_pos + i * entry_size;
            let old = self.get(i).unwrap_or_default();
            let new = old as i64 + shift(old);
            match self {
                Self::Stco(_) => {
                    let new = u32::try_from(new).map_err(|_| {
                        crate::Error::new(
                            ErrorKind::FinalizationFailed,
                            format!("Shifted chunk offset {new} doesn't fit into a 32 bit table"),
                        )
                    })?;
                    set_be_int!(buf, pos, new, u32);
                }
                Self::Co64(_) => {
                    let new = u64::try_from(new).map_err(|_| {
                        crate::Error::new(
                            ErrorKind::FinalizationFailed,
                            format!("Shifted chunk offset {new} is negative"),
                        )
                    })?;
                    set_be_int!(buf, pos, new, u64);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn shift_parsed_table() {
        let stco = Stco { bounds: None, offsets: vec![100, 4000] };
        let mut buf = stco.to_bytes().unwrap();

        let mut reader = Cursor::new(&buf);
        let head = head::parse(&mut reader).unwrap();
        let parsed = Stco::parse(&mut reader, head.size()).unwrap();
        assert_eq!(parsed.offsets, stco.offsets);

        ChunkOffsets::Stco(&parsed).shift_in_place(&mut buf, |_| 24).unwrap();
        assert_eq!(be_int!(buf, 16, u32), Some(124));
        assert_eq!(be_int!(buf, 20, u32), Some(4024));
    }

    #[test]
    fn overflowing_shift() {
        let stco = Stco { bounds: None, offsets: vec![u32::MAX - 4] };
        let mut buf = stco.to_bytes().unwrap();
        let mut reader = Cursor::new(&buf);
        let head = head::parse(&mut reader).unwrap();
        let parsed = Stco::parse(&mut reader, head.size()).unwrap();

        let err = ChunkOffsets::Stco(&parsed).shift_in_place(&mut buf, |_| 8).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::FinalizationFailed));
    }
}
