use std::io::Cursor;

use super::*;

const HEADER_SIZE: u64 = 8;

/// A decoded sample description record.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SampleDescription {
    /// Legacy QuickTime text.
    Text(TextSampleEntry),
    /// Photo JPEG stills.
    Jpeg(ImageSampleEntry),
    /// Any other record, kept as its content bytes following the head.
    Other {
        /// The record type.
        fourcc: Fourcc,
        /// The content following the head.
        data: Vec<u8>,
    },
}

impl SampleDescription {
    /// The record type, such as `text` or `jpeg`.
    pub fn fourcc(&self) -> Fourcc {
        match self {
            Self::Text(_) => TEXT_MEDIA,
            Self::Jpeg(_) => JPEG_MEDIA,
            Self::Other { fourcc, .. } => *fourcc,
        }
    }

    /// Serializes the record. The leading size field always equals the length of the returned
    /// bytes.
    pub fn encode(&self) -> crate::Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.len() as usize);
        self.write(&mut buf)?;
        Ok(buf)
    }

    /// Parses a single record spanning all of `bytes`.
    pub fn decode(bytes: &[u8]) -> crate::Result<Self> {
        let invalid = |e: crate::Error| {
            crate::Error::new(
                ErrorKind::FormatDescriptionInvalid,
                format!("Invalid sample description: {}", e.description),
            )
        };

        let mut reader = Cursor::new(bytes);
        let head = head::parse(&mut reader).map_err(invalid)?;
        if head.len() != bytes.len() as u64 {
            return Err(crate::Error::new(
                ErrorKind::FormatDescriptionInvalid,
                format!(
                    "Sample description size field {} differs from the record length {}",
                    head.len(),
                    bytes.len()
                ),
            ));
        }
        Self::parse(&mut reader, head).map_err(invalid)
    }

    fn parse(reader: &mut (impl Read + Seek), head: Head) -> crate::Result<Self> {
        Ok(match head.fourcc() {
            TEXT_MEDIA => Self::Text(TextSampleEntry::parse(reader, head.size())?),
            JPEG_MEDIA => Self::Jpeg(ImageSampleEntry::parse(reader, head.size())?),
            fourcc => Self::Other { fourcc, data: reader.read_u8_vec(head.content_len())? },
        })
    }

    pub(crate) fn len(&self) -> u64 {
        match self {
            Self::Text(e) => e.len(),
            Self::Jpeg(e) => e.len(),
            Self::Other { data, .. } => Size::from(data.len() as u64).len(),
        }
    }

    pub(crate) fn write(&self, writer: &mut impl Write) -> crate::Result<()> {
        match self {
            Self::Text(e) => e.write(writer),
            Self::Jpeg(e) => e.write(writer),
            Self::Other { fourcc, data } => {
                head::write(writer, Head::from(Size::from(data.len() as u64), *fourcc))?;
                writer.write_all(data)?;
                Ok(())
            }
        }
    }
}

/// Sample table sample description.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Stsd {
    pub entries: Vec<SampleDescription>,
}

impl Atom for Stsd {
    const FOURCC: Fourcc = SAMPLE_TABLE_SAMPLE_DESCRIPTION;
}

impl ParseAtom for Stsd {
    fn parse_atom(reader: &mut (impl Read + Seek), size: Size) -> crate::Result<Self> {
        expect_min_size("Sample table sample description (stsd)", size, HEADER_SIZE)?;
        let (version, _) = head::parse_full(reader)?;
        if version != 0 {
            return unknown_version("sample table sample description (stsd)", version);
        }
        let num_entries = reader.read_be_u32()?;

        let mut stsd = Self::default();
        parse_children(reader, Size::from(size.content_len() - HEADER_SIZE), |reader, head| {
            stsd.entries.push(SampleDescription::parse(reader, head)?);
            Ok(true)
        })?;

        if stsd.entries.len() != num_entries as usize {
            return Err(crate::Error::new(
                ErrorKind::Parsing,
                format!("Expected {num_entries} sample descriptions, found {}", stsd.entries.len()),
            ));
        }

        Ok(stsd)
    }
}

impl AtomSize for Stsd {
    fn size(&self) -> Size {
        let content_len = HEADER_SIZE + self.entries.iter().map(|e| e.len()).sum::<u64>();
        Size::from(content_len)
    }
}

impl WriteAtom for Stsd {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        self.write_head(writer)?;
        head::write_full(writer, 0, [0; 3])?;
        writer.write_be_u32(self.entries.len() as u32)?;
        for e in self.entries.iter() {
            e.write(writer)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn size_field_matches_length() {
        let descriptions = [
            SampleDescription::Text(TextSampleEntry::default()),
            SampleDescription::Text(TextSampleEntry {
                font_name: "Lucida Grande".to_owned(),
                ..Default::default()
            }),
            SampleDescription::Jpeg(ImageSampleEntry::jpeg(160, 90).unwrap()),
            SampleDescription::Other { fourcc: Fourcc(*b"avc1"), data: vec![7; 21] },
        ];
        for d in descriptions {
            let bytes = d.encode().unwrap();
            assert_eq!(be_int!(bytes, 0, u32), Some(bytes.len() as u32));
            assert_eq!(&bytes[4..8], &*d.fourcc());
            assert_eq!(SampleDescription::decode(&bytes).unwrap(), d);
        }
    }

    #[test]
    fn decode_rejects_wrong_size() {
        let mut bytes = SampleDescription::Text(TextSampleEntry::default()).encode().unwrap();
        bytes.push(0);
        let err = SampleDescription::decode(&bytes).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::FormatDescriptionInvalid));

        let err = SampleDescription::decode(&bytes[..30]).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::FormatDescriptionInvalid));
    }

    #[test]
    fn stsd_with_one_entry() {
        let stsd = Stsd { entries: vec![SampleDescription::Text(TextSampleEntry::default())] };
        let buf = stsd.to_bytes().unwrap();
        assert_eq!(buf.len(), 8 + 8 + 60);
        assert_eq!(&buf[12..16], &[0, 0, 0, 1]);

        let mut reader = Cursor::new(&buf);
        let head = head::parse(&mut reader).unwrap();
        assert_eq!(Stsd::parse(&mut reader, head.size()).unwrap(), stsd);
    }
}
