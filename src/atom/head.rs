use super::*;

/// The size of an atom and whether it uses an extended 64 bit length.
///
/// ```md
/// 4 bytes standard length
/// 4 bytes identifier
/// 8 bytes optional extended length
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Size {
    /// Whether the head is of standard size (8 bytes) with a 32 bit length or extended (16 bytes)
    /// with a 64 bit length.
    ext: bool,
    /// The length including the head.
    len: u64,
}

impl Size {
    pub const fn from(content_len: u64) -> Self {
        let mut len = content_len + 8;
        let ext = len > u32::MAX as u64;
        if ext {
            len += 8;
        }
        Self { ext, len }
    }

    pub const fn ext(&self) -> bool {
        self.ext
    }

    pub const fn len(&self) -> u64 {
        self.len
    }

    pub const fn head_len(&self) -> u64 {
        match self.ext {
            true => 16,
            false => 8,
        }
    }

    pub const fn content_len(&self) -> u64 {
        self.len - self.head_len()
    }
}

/// A head specifying the size and type of an atom.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Head {
    size: Size,
    fourcc: Fourcc,
}

impl Deref for Head {
    type Target = Size;

    fn deref(&self) -> &Self::Target {
        &self.size
    }
}

impl Head {
    pub const NORMAL_SIZE: u64 = 8;
    pub const EXTENDED_SIZE: u64 = 16;

    pub const fn new(ext: bool, len: u64, fourcc: Fourcc) -> Self {
        Self { size: Size { ext, len }, fourcc }
    }

    pub const fn from(size: Size, fourcc: Fourcc) -> Self {
        Self { size, fourcc }
    }

    pub const fn size(&self) -> Size {
        self.size
    }

    pub const fn fourcc(&self) -> Fourcc {
        self.fourcc
    }
}

/// Attempts to parse the atom's head containing a 32 bit unsigned integer determining the size of
/// the atom in bytes and the following 4 byte identifier from the reader. If the 32 bit length is
/// set to 1 an extended 64 bit length is read.
pub fn parse(reader: &mut impl Read) -> crate::Result<Head> {
    let len = match reader.read_be_u32() {
        Ok(l) => l as u64,
        Err(e) => {
            return Err(crate::Error::new(ErrorKind::Io(e), "Error reading atom length"));
        }
    };
    let mut ident = Fourcc([0u8; 4]);
    if let Err(e) = reader.read_exact(&mut *ident) {
        return Err(crate::Error::new(ErrorKind::Io(e), "Error reading atom identifier"));
    }

    if len == 1 {
        match reader.read_be_u64() {
            Ok(l) if l < Head::EXTENDED_SIZE => Err(crate::Error::new(
                ErrorKind::InvalidAtomSize,
                format!("Read extended length of '{ident}' which is less than 16 bytes: {l}"),
            )),
            Ok(l) => Ok(Head::new(true, l, ident)),
            Err(e) => Err(crate::Error::new(ErrorKind::Io(e), "Error reading extended atom length")),
        }
    } else if len < Head::NORMAL_SIZE {
        Err(crate::Error::new(
            ErrorKind::Parsing,
            format!("Read length of '{ident}' which is less than 8 bytes: {len}"),
        ))
    } else {
        Ok(Head::new(false, len, ident))
    }
}

pub fn write(writer: &mut impl Write, head: Head) -> crate::Result<()> {
    if head.ext() {
        writer.write_be_u32(1)?;
        writer.write_all(&*head.fourcc)?;
        writer.write_be_u64(head.len())?;
    } else {
        writer.write_be_u32(head.len() as u32)?;
        writer.write_all(&*head.fourcc)?;
    }
    Ok(())
}

/// Attempts to parse a full atom head.
///
/// ```md
/// 1 byte version
/// 3 bytes flags
/// ```
pub fn parse_full(reader: &mut impl Read) -> crate::Result<(u8, [u8; 3])> {
    let version = match reader.read_u8() {
        Ok(v) => v,
        Err(e) => {
            return Err(crate::Error::new(
                ErrorKind::Io(e),
                "Error reading version of full atom head",
            ));
        }
    };

    let mut flags = [0u8; 3];
    if let Err(e) = reader.read_exact(&mut flags) {
        return Err(crate::Error::new(ErrorKind::Io(e), "Error reading flags of full atom head"));
    };

    Ok((version, flags))
}

pub fn write_full(writer: &mut impl Write, version: u8, flags: [u8; 3]) -> crate::Result<()> {
    writer.write_u8(version)?;
    writer.write_all(&flags)?;
    Ok(())
}

/// The position and size of an atom inside a stream.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct AtomBounds {
    pos: u64,
    size: Size,
}

impl Deref for AtomBounds {
    type Target = Size;

    fn deref(&self) -> &Self::Target {
        &self.size
    }
}

impl AtomBounds {
    pub const fn new(pos: u64, size: Size) -> Self {
        Self { pos, size }
    }

    pub const fn pos(&self) -> u64 {
        self.pos
    }

    pub const fn size(&self) -> Size {
        self.size
    }

    pub const fn content_pos(&self) -> u64 {
        self.pos + self.size.head_len()
    }

    /// The position right after the atom. [`find_bounds`] guarantees this doesn't overflow.
    pub const fn end(&self) -> u64 {
        self.pos + self.size.len()
    }

    /// Returns the byte range of the whole atom inside a buffer starting at stream position 0.
    pub fn range(&self) -> std::ops::Range<usize> {
        self.pos as usize..self.end() as usize
    }
}

/// Returns the bounds of the atom whose head has just been read.
pub fn find_bounds(reader: &mut impl Seek, size: Size) -> crate::Result<AtomBounds> {
    let pos = reader.stream_position()? - size.head_len();
    if pos.checked_add(size.len()).is_none() {
        return Err(crate::Error::new(
            ErrorKind::InvalidAtomSize,
            format!("Atom at {pos} with a length of {} exceeds the addressable range", size.len()),
        ));
    }
    Ok(AtomBounds { pos, size })
}

pub fn seek_to_end(reader: &mut impl Seek, bounds: &AtomBounds) -> crate::Result<()> {
    let current = reader.stream_position()?;
    if current > bounds.end() {
        return Err(crate::Error::new(
            ErrorKind::SizeMismatch,
            format!("Read {} bytes past the end of an atom", current - bounds.end()),
        ));
    }
    reader.skip((bounds.end() - current) as i64)?;
    Ok(())
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn extended_size() {
        let size = Size::from(u32::MAX as u64);
        assert!(size.ext());
        assert_eq!(size.head_len(), 16);
        assert_eq!(size.content_len(), u32::MAX as u64);

        let mut buf = Vec::new();
        write(&mut buf, Head::from(size, MEDIA_DATA)).unwrap();
        assert_eq!(buf.len(), 16);

        let head = parse(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(head.fourcc(), MEDIA_DATA);
        assert_eq!(head.size(), size);
    }

    #[test]
    fn length_beyond_addressable_range() {
        let mut buf = vec![0, 0, 0, 8, b'f', b'r', b'e', b'e', 0, 0, 0, 1, b'f', b'r', b'e', b'e'];
        buf.extend_from_slice(&[0xFF; 8]);
        let mut reader = Cursor::new(&buf);
        reader.set_position(8);

        let head = parse(&mut reader).unwrap();
        assert_eq!(head.len(), u64::MAX);
        let err = find_bounds(&mut reader, head.size()).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidAtomSize));
    }

    #[test]
    fn oversized_child() {
        let mut buf = vec![0, 0, 0, 1, b'f', b'r', b'e', b'e'];
        buf.extend_from_slice(&[0xFF; 8]);
        let err = parse_children(&mut Cursor::new(&buf), Size::from(32), |_, _| Ok(false))
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::SizeMismatch));
    }

    #[test]
    fn too_short() {
        let buf = [0, 0, 0, 4, b'f', b'r', b'e', b'e'];
        let err = parse(&mut Cursor::new(&buf)).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Parsing));
    }
}
