use super::*;

const HEADER_SIZE: u64 = 8;
const ENTRY_SIZE: u64 = 8;

/// Sample table time to sample, run length encoded sample durations.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stts {
    pub items: Vec<SttsItem>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SttsItem {
    pub sample_count: u32,
    pub sample_duration: u32,
}

impl Atom for Stts {
    const FOURCC: Fourcc = SAMPLE_TABLE_TIME_TO_SAMPLE;
}

impl ParseAtom for Stts {
    fn parse_atom(reader: &mut (impl Read + Seek), size: Size) -> crate::Result<Self> {
        let (version, _) = head::parse_full(reader)?;
        if version != 0 {
            return unknown_version("sample table time to sample (stts)", version);
        }

        let num_entries = reader.read_be_u32()?;
        let table_size = ENTRY_SIZE * num_entries as u64;
        expect_size("Sample table time to sample (stts)", size, HEADER_SIZE + table_size)?;

        let mut items = Vec::with_capacity(num_entries as usize);
        for _ in 0..num_entries {
            items.push(SttsItem {
                sample_count: reader.read_be_u32()?,
                sample_duration: reader.read_be_u32()?,
            });
        }

        Ok(Self { items })
    }
}

impl AtomSize for Stts {
    fn size(&self) -> Size {
        Size::from(HEADER_SIZE + ENTRY_SIZE * self.items.len() as u64)
    }
}

impl WriteAtom for Stts {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        self.write_head(writer)?;
        head::write_full(writer, 0, [0; 3])?;
        writer.write_be_u32(self.items.len() as u32)?;
        for i in self.items.iter() {
            writer.write_be_u32(i.sample_count)?;
            writer.write_be_u32(i.sample_duration)?;
        }
        Ok(())
    }
}

impl Stts {
    /// Run length encodes a sequence of sample durations.
    pub fn from_durations(durations: impl IntoIterator<Item = u32>) -> Self {
        let mut items: Vec<SttsItem> = Vec::new();
        for d in durations {
            match items.last_mut() {
                Some(last) if last.sample_duration == d => last.sample_count += 1,
                _ => items.push(SttsItem { sample_count: 1, sample_duration: d }),
            }
        }
        Self { items }
    }

    /// Expands the table into one duration per sample.
    pub fn durations(&self) -> impl Iterator<Item = u32> + '_ {
        self.items
            .iter()
            .flat_map(|i| std::iter::repeat(i.sample_duration).take(i.sample_count as usize))
    }

    pub fn total_duration(&self) -> u64 {
        self.items.iter().map(|i| i.sample_count as u64 * i.sample_duration as u64).sum()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn run_length_encoding() {
        let stts = Stts::from_durations([600, 600, 1200, 600]);
        assert_eq!(
            stts.items,
            [
                SttsItem { sample_count: 2, sample_duration: 600 },
                SttsItem { sample_count: 1, sample_duration: 1200 },
                SttsItem { sample_count: 1, sample_duration: 600 },
            ]
        );
        assert_eq!(stts.durations().collect::<Vec<_>>(), [600, 600, 1200, 600]);
        assert_eq!(stts.total_duration(), 3000);
    }
}
