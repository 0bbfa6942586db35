use super::*;

/// The movie header and the layout of the remaining children of a `moov` atom.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Moov {
    pub mvhd: Option<Mvhd>,
    /// All direct children in stream order, including `mvhd` and every `trak`.
    pub children: Vec<(Fourcc, AtomBounds)>,
}

impl Atom for Moov {
    const FOURCC: Fourcc = MOVIE;
}

impl ParseAtom for Moov {
    fn parse_atom(reader: &mut (impl Read + Seek), size: Size) -> crate::Result<Self> {
        let mut moov = Self::default();

        parse_children(reader, size, |reader, head| {
            let bounds = find_bounds(reader, head.size())?;
            moov.children.push((head.fourcc(), bounds));

            match head.fourcc() {
                MOVIE_HEADER => moov.mvhd = Some(Mvhd::parse(reader, head.size())?),
                _ => return Ok(false),
            }
            Ok(true)
        })?;

        Ok(moov)
    }
}

impl Moov {
    pub fn tracks(&self) -> impl Iterator<Item = &AtomBounds> {
        self.children.iter().filter(|(f, _)| *f == TRACK).map(|(_, b)| b)
    }
}
