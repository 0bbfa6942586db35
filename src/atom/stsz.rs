use super::*;

const HEADER_SIZE: u64 = 12;
const ENTRY_SIZE: u64 = 4;

/// Sample table sample size.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Stsz {
    /// If this field is set to zero, a list of sizes is read instead.
    pub uniform_sample_size: u32,
    pub sample_count: u32,
    pub sizes: Vec<u32>,
}

impl Atom for Stsz {
    const FOURCC: Fourcc = SAMPLE_TABLE_SAMPLE_SIZE;
}

impl ParseAtom for Stsz {
    fn parse_atom(reader: &mut (impl Read + Seek), size: Size) -> crate::Result<Self> {
        let (version, _) = head::parse_full(reader)?;
        if version != 0 {
            return unknown_version("sample table sample size (stsz)", version);
        }

        let uniform_sample_size = reader.read_be_u32()?;
        let sample_count = reader.read_be_u32()?;
        let sizes = if uniform_sample_size == 0 {
            let table_size = ENTRY_SIZE * sample_count as u64;
            expect_size("Sample table sample size (stsz)", size, HEADER_SIZE + table_size)?;

            let mut sizes = Vec::with_capacity(sample_count as usize);
            for _ in 0..sample_count {
                sizes.push(reader.read_be_u32()?);
            }
            sizes
        } else {
            expect_size("Sample table sample size (stsz)", size, HEADER_SIZE)?;
            Vec::new()
        };

        Ok(Self { uniform_sample_size, sample_count, sizes })
    }
}

impl AtomSize for Stsz {
    fn size(&self) -> Size {
        Size::from(HEADER_SIZE + ENTRY_SIZE * self.sizes.len() as u64)
    }
}

impl WriteAtom for Stsz {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        self.write_head(writer)?;
        head::write_full(writer, 0, [0; 3])?;
        writer.write_be_u32(self.uniform_sample_size)?;
        writer.write_be_u32(self.sample_count)?;
        for s in self.sizes.iter() {
            writer.write_be_u32(*s)?;
        }
        Ok(())
    }
}

impl Stsz {
    /// Uses a uniform size if all samples share one, a table otherwise.
    pub fn from_sizes(sizes: Vec<u32>) -> Self {
        let sample_count = sizes.len() as u32;
        match sizes.first() {
            Some(&first) if first != 0 && sizes.iter().all(|s| *s == first) => {
                Self { uniform_sample_size: first, sample_count, sizes: Vec::new() }
            }
            _ => Self { uniform_sample_size: 0, sample_count, sizes },
        }
    }

    pub fn sample_size(&self, index: usize) -> Option<u32> {
        match self.uniform_sample_size {
            0 => self.sizes.get(index).copied(),
            s if index < self.sample_count as usize => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn uniform_or_table() {
        let uniform = Stsz::from_sizes(vec![7, 7, 7]);
        assert_eq!(uniform.uniform_sample_size, 7);
        assert_eq!(uniform.len(), 20);
        assert_eq!(uniform.sample_size(2), Some(7));
        assert_eq!(uniform.sample_size(3), None);

        let table = Stsz::from_sizes(vec![7, 9]);
        assert_eq!(table.uniform_sample_size, 0);
        assert_eq!(table.sample_count, 2);
        assert_eq!(table.len(), 28);
        assert_eq!(table.sample_size(1), Some(9));
    }
}
