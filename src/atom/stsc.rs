use super::*;

const HEADER_SIZE: u64 = 8;
const ENTRY_SIZE: u64 = 12;

/// Sample table sample to chunk.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Stsc {
    pub items: Vec<StscItem>,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct StscItem {
    /// 1 based index of the first chunk this entry applies to.
    pub first_chunk: u32,
    pub samples_per_chunk: u32,
    /// 1 based index into the sample descriptions.
    pub sample_description_id: u32,
}

impl Atom for Stsc {
    const FOURCC: Fourcc = SAMPLE_TABLE_SAMPLE_TO_CHUNK;
}

impl ParseAtom for Stsc {
    fn parse_atom(reader: &mut (impl Read + Seek), size: Size) -> crate::Result<Self> {
        let (version, _) = head::parse_full(reader)?;
        if version != 0 {
            return unknown_version("sample table sample to chunk (stsc)", version);
        }

        let num_entries = reader.read_be_u32()?;
        let table_size = ENTRY_SIZE * num_entries as u64;
        expect_size("Sample table sample to chunk (stsc)", size, HEADER_SIZE + table_size)?;

        let mut items = Vec::with_capacity(num_entries as usize);
        for _ in 0..num_entries {
            items.push(StscItem {
                first_chunk: reader.read_be_u32()?,
                samples_per_chunk: reader.read_be_u32()?,
                sample_description_id: reader.read_be_u32()?,
            });
        }

        Ok(Self { items })
    }
}

impl AtomSize for Stsc {
    fn size(&self) -> Size {
        Size::from(HEADER_SIZE + ENTRY_SIZE * self.items.len() as u64)
    }
}

impl WriteAtom for Stsc {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        self.write_head(writer)?;
        head::write_full(writer, 0, [0; 3])?;
        writer.write_be_u32(self.items.len() as u32)?;
        for i in self.items.iter() {
            writer.write_be_u32(i.first_chunk)?;
            writer.write_be_u32(i.samples_per_chunk)?;
            writer.write_be_u32(i.sample_description_id)?;
        }
        Ok(())
    }
}

impl Stsc {
    /// All samples in a single chunk using the first sample description.
    pub fn single_chunk(sample_count: u32) -> Self {
        Self {
            items: vec![StscItem {
                first_chunk: 1,
                samples_per_chunk: sample_count,
                sample_description_id: 1,
            }],
        }
    }

    /// Returns the number of samples in each of the `chunk_count` chunks.
    pub fn samples_per_chunk(&self, chunk_count: u32) -> Vec<u32> {
        let mut counts = Vec::with_capacity(chunk_count as usize);
        for (i, item) in self.items.iter().enumerate() {
            let end = self.items.get(i + 1).map_or(chunk_count + 1, |next| next.first_chunk);
            for _ in item.first_chunk..end.min(chunk_count + 1) {
                counts.push(item.samples_per_chunk);
            }
        }
        counts
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn expand_chunks() {
        let stsc = Stsc {
            items: vec![
                StscItem { first_chunk: 1, samples_per_chunk: 3, sample_description_id: 1 },
                StscItem { first_chunk: 3, samples_per_chunk: 1, sample_description_id: 1 },
            ],
        };
        assert_eq!(stsc.samples_per_chunk(4), [3, 3, 1, 1]);
        assert_eq!(Stsc::single_chunk(5).samples_per_chunk(1), [5]);
    }
}
