use super::*;

/// Track references, grouped by reference type.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Tref {
    pub references: Vec<TrackReference>,
}

/// A single reference type atom inside `tref`, such as `chap`.
///
/// ```md
/// 4 bytes size
/// 4 bytes reference type
/// 4 bytes track id (repeated)
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TrackReference {
    pub kind: Fourcc,
    pub track_ids: Vec<u32>,
}

impl Atom for Tref {
    const FOURCC: Fourcc = TRACK_REFERENCE;
}

impl ParseAtom for Tref {
    fn parse_atom(reader: &mut (impl Read + Seek), size: Size) -> crate::Result<Self> {
        let mut tref = Self::default();

        parse_children(reader, size, |reader, head| {
            let count = head.content_len() / 4;
            let mut track_ids = Vec::with_capacity(count as usize);
            for _ in 0..count {
                track_ids.push(reader.read_be_u32()?);
            }
            // trailing bytes that don't form a whole id
            reader.skip((head.content_len() % 4) as i64)?;

            tref.references.push(TrackReference { kind: head.fourcc(), track_ids });
            Ok(true)
        })?;

        Ok(tref)
    }
}

impl AtomSize for TrackReference {
    fn size(&self) -> Size {
        Size::from(4 * self.track_ids.len() as u64)
    }
}

impl AtomSize for Tref {
    fn size(&self) -> Size {
        Size::from(self.references.len_or_zero())
    }
}

impl WriteAtom for Tref {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        self.write_head(writer)?;
        for r in self.references.iter() {
            head::write(writer, Head::from(r.size(), r.kind))?;
            for id in r.track_ids.iter() {
                writer.write_be_u32(*id)?;
            }
        }
        Ok(())
    }
}

impl Tref {
    /// Returns the ids referenced with the reference type `kind`.
    pub fn ids(&self, kind: Fourcc) -> impl Iterator<Item = u32> + '_ {
        self.references.iter().filter(move |r| r.kind == kind).flat_map(|r| r.track_ids.iter().copied())
    }

    /// Adds a reference to `id`. Returns false if the reference already exists.
    pub fn insert(&mut self, kind: Fourcc, id: u32) -> bool {
        if self.ids(kind).any(|i| i == id) {
            return false;
        }

        match self.references.iter_mut().find(|r| r.kind == kind) {
            Some(r) => r.track_ids.push(id),
            None => self.references.push(TrackReference { kind, track_ids: vec![id] }),
        }
        true
    }

    pub fn is_empty(&self) -> bool {
        self.references.iter().all(|r| r.track_ids.is_empty())
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn insert_is_idempotent() {
        let mut tref = Tref::default();
        assert!(tref.insert(CHAPTER_REFERENCE, 2));
        assert!(tref.insert(CHAPTER_REFERENCE, 3));
        assert!(!tref.insert(CHAPTER_REFERENCE, 2));
        assert_eq!(tref.ids(CHAPTER_REFERENCE).collect::<Vec<_>>(), [2, 3]);
        assert_eq!(tref.references.len(), 1);
    }

    #[test]
    fn keeps_other_reference_types() {
        let mut tref = Tref::default();
        tref.insert(Fourcc(*b"sync"), 1);
        tref.insert(CHAPTER_REFERENCE, 2);

        let buf = tref.to_bytes().unwrap();
        assert_eq!(buf.len(), 8 + 12 + 12);
        assert_eq!(&buf[12..16], b"sync");
        assert_eq!(&buf[24..28], b"chap");

        let mut reader = Cursor::new(&buf);
        let head = head::parse(&mut reader).unwrap();
        assert_eq!(Tref::parse(&mut reader, head.size()).unwrap(), tref);
    }
}
