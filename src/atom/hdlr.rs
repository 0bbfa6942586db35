use super::*;

/// Handler reference.
///
/// ```md
/// 1 byte version
/// 3 bytes flags
/// 4 bytes component type (`mhlr` in QuickTime, zero in ISO files)
/// 4 bytes component subtype, the handler type
/// 12 bytes reserved
/// n bytes name
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Hdlr {
    pub component_type: Fourcc,
    pub handler_type: Fourcc,
    /// The raw name field, either a pascal or a null terminated string.
    pub name: Vec<u8>,
}

impl Atom for Hdlr {
    const FOURCC: Fourcc = HANDLER_REFERENCE;
}

impl ParseAtom for Hdlr {
    fn parse_atom(reader: &mut (impl Read + Seek), size: Size) -> crate::Result<Self> {
        expect_min_size("Handler reference (hdlr)", size, 24)?;
        let (version, _) = head::parse_full(reader)?;
        if version != 0 {
            return unknown_version("handler reference (hdlr)", version);
        }

        let mut hdlr = Self::default();
        reader.read_exact(&mut *hdlr.component_type)?;
        reader.read_exact(&mut *hdlr.handler_type)?;
        reader.skip(12)?;
        hdlr.name = reader.read_u8_vec(size.content_len() - 24)?;

        Ok(hdlr)
    }
}

impl AtomSize for Hdlr {
    fn size(&self) -> Size {
        Size::from(24 + self.name.len() as u64)
    }
}

impl WriteAtom for Hdlr {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        self.write_head(writer)?;
        head::write_full(writer, 0, [0; 3])?;
        writer.write_all(&*self.component_type)?;
        writer.write_all(&*self.handler_type)?;
        writer.write_all(&[0; 12])?;
        writer.write_all(&self.name)?;
        Ok(())
    }
}

impl Hdlr {
    /// A media handler. QuickTime files store the name as a pascal string, ISO files as a null
    /// terminated one.
    pub fn media(handler_type: Fourcc, name: &str, quicktime: bool) -> Self {
        let name = name.as_bytes();
        let name = if quicktime {
            let len = name.len().min(u8::MAX as usize);
            let mut buf = Vec::with_capacity(len + 1);
            buf.push(len as u8);
            buf.extend_from_slice(&name[..len]);
            buf
        } else {
            let mut buf = name.to_vec();
            buf.push(0);
            buf
        };

        Self { component_type: MEDIA_HANDLER_COMPONENT, handler_type, name }
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn name_styles() {
        let qt = Hdlr::media(TEXT_MEDIA, "Chapters", true);
        assert_eq!(qt.name, b"\x08Chapters");
        let iso = Hdlr::media(TEXT_MEDIA, "Chapters", false);
        assert_eq!(iso.name, b"Chapters\0");

        let buf = qt.to_bytes().unwrap();
        assert_eq!(&buf[16..20], b"text");
        let mut reader = Cursor::new(&buf);
        let head = head::parse(&mut reader).unwrap();
        assert_eq!(Hdlr::parse(&mut reader, head.size()).unwrap(), qt);
    }
}
