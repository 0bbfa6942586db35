use super::*;

/// Data information, declaring where the media data of a track lives.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Dinf {
    pub dref: Option<Dref>,
}

impl Atom for Dinf {
    const FOURCC: Fourcc = DATA_INFORMATION;
}

impl ParseAtom for Dinf {
    fn parse_atom(reader: &mut (impl Read + Seek), size: Size) -> crate::Result<Self> {
        let mut dinf = Self::default();

        parse_children(reader, size, |reader, head| {
            match head.fourcc() {
                DATA_REFERENCE => dinf.dref = Some(Dref::parse(reader, head.size())?),
                _ => return Ok(false),
            }
            Ok(true)
        })?;

        Ok(dinf)
    }
}

impl AtomSize for Dinf {
    fn size(&self) -> Size {
        Size::from(self.dref.len_or_zero())
    }
}

impl WriteAtom for Dinf {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        self.write_head(writer)?;
        if let Some(a) = &self.dref {
            a.write(writer)?;
        }
        Ok(())
    }
}

impl Dinf {
    /// A data information atom referencing the movie file itself.
    pub fn self_contained() -> Self {
        Self { dref: Some(Dref { url: Some(Url::self_contained()) }) }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Dref {
    pub url: Option<Url>,
}

impl Atom for Dref {
    const FOURCC: Fourcc = DATA_REFERENCE;
}

impl ParseAtom for Dref {
    fn parse_atom(reader: &mut (impl Read + Seek), size: Size) -> crate::Result<Self> {
        expect_min_size("Data reference (dref)", size, 8)?;
        let (version, _) = head::parse_full(reader)?;
        if version != 0 {
            return unknown_version("data reference (dref)", version);
        }
        reader.skip(4)?; // number of entries

        let mut dref = Self::default();
        parse_children(reader, Size::from(size.content_len() - 8), |reader, head| {
            match head.fourcc() {
                URL_MEDIA => dref.url = Some(Url::parse(reader, head.size())?),
                _ => return Ok(false),
            }
            Ok(true)
        })?;

        Ok(dref)
    }
}

impl AtomSize for Dref {
    fn size(&self) -> Size {
        Size::from(8 + self.url.len_or_zero())
    }
}

impl WriteAtom for Dref {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        self.write_head(writer)?;
        head::write_full(writer, 0, [0; 3])?;
        writer.write_be_u32(self.url.is_some() as u32)?;
        if let Some(a) = &self.url {
            a.write(writer)?;
        }
        Ok(())
    }
}

/// A data reference entry. Without a location the data is contained in the movie file.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Url {
    pub flags: [u8; 3],
    pub location: Vec<u8>,
}

impl Atom for Url {
    const FOURCC: Fourcc = URL_MEDIA;
}

impl ParseAtom for Url {
    fn parse_atom(reader: &mut (impl Read + Seek), size: Size) -> crate::Result<Self> {
        expect_min_size("Data entry url (url )", size, 4)?;
        let (_, flags) = head::parse_full(reader)?;
        let location = reader.read_u8_vec(size.content_len() - 4)?;
        Ok(Self { flags, location })
    }
}

impl AtomSize for Url {
    fn size(&self) -> Size {
        Size::from(4 + self.location.len() as u64)
    }
}

impl WriteAtom for Url {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        self.write_head(writer)?;
        head::write_full(writer, 0, self.flags)?;
        writer.write_all(&self.location)?;
        Ok(())
    }
}

impl Url {
    pub const FLAG_SELF_CONTAINED: u8 = 0x01;

    pub fn self_contained() -> Self {
        Self { flags: [0, 0, Self::FLAG_SELF_CONTAINED], location: Vec::new() }
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn self_contained() {
        let dinf = Dinf::self_contained();
        let buf = dinf.to_bytes().unwrap();
        assert_eq!(
            buf,
            [
                0, 0, 0, 36, b'd', b'i', b'n', b'f', //
                0, 0, 0, 28, b'd', b'r', b'e', b'f', 0, 0, 0, 0, 0, 0, 0, 1, //
                0, 0, 0, 12, b'u', b'r', b'l', b' ', 0, 0, 0, 1,
            ]
        );

        let mut reader = Cursor::new(&buf);
        let head = head::parse(&mut reader).unwrap();
        assert_eq!(Dinf::parse(&mut reader, head.size()).unwrap(), dinf);
    }
}
