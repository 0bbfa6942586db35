//! Typed MPEG-4/QuickTime atoms needed to read a movie's track layout and to write chapter
//! tracks.

use std::io::{Read, Seek, Write};
use std::ops::Deref;

use crate::ErrorKind;

pub use ftyp::FileType;
pub use ident::*;
pub use jpeg::ImageSampleEntry;
pub use stsd::SampleDescription;
pub use text::{TextBox, TextSampleEntry};

pub(crate) use ftyp::*;
pub(crate) use gmhd::*;
pub(crate) use hdlr::*;
pub(crate) use head::{find_bounds, AtomBounds, Head, Size};
pub(crate) use jpeg::*;
pub(crate) use mdat::*;
pub(crate) use mdhd::*;
pub(crate) use mdia::*;
pub(crate) use minf::*;
pub(crate) use moov::*;
pub(crate) use mvhd::*;
pub(crate) use stbl::*;
pub(crate) use stco::*;
pub(crate) use stsc::*;
pub(crate) use stsd::*;
pub(crate) use stsz::*;
pub(crate) use stts::*;
pub(crate) use text::*;
pub(crate) use tkhd::*;
pub(crate) use trak::*;
pub(crate) use tref::*;
pub(crate) use dinf::*;
pub(crate) use vmhd::*;

use util::*;

/// A module for working with identifiers.
pub mod ident;

pub(crate) mod head;
pub(crate) mod util;

mod dinf;
mod ftyp;
mod gmhd;
mod hdlr;
mod jpeg;
mod mdat;
mod mdhd;
mod mdia;
mod minf;
mod moov;
mod mvhd;
mod stbl;
mod stco;
mod stsc;
mod stsd;
mod stsz;
mod stts;
mod text;
mod tkhd;
mod trak;
mod tref;
mod vmhd;

pub(crate) trait Atom {
    const FOURCC: Fourcc;
}

pub(crate) trait ParseAtom: Atom + Sized {
    fn parse(reader: &mut (impl Read + Seek), size: Size) -> crate::Result<Self> {
        match Self::parse_atom(reader, size) {
            Err(mut e) => {
                e.description = format!("Error parsing {}: {}", Self::FOURCC, e.description).into();
                Err(e)
            }
            a => a,
        }
    }

    fn parse_atom(reader: &mut (impl Read + Seek), size: Size) -> crate::Result<Self>;
}

pub(crate) trait AtomSize {
    fn size(&self) -> Size;

    fn len(&self) -> u64 {
        self.size().len()
    }
}

pub(crate) trait WriteAtom: Atom + AtomSize {
    fn write(&self, writer: &mut impl Write) -> crate::Result<()> {
        self.write_atom(writer)
    }

    fn write_head(&self, writer: &mut impl Write) -> crate::Result<()> {
        head::write(writer, Head::from(self.size(), Self::FOURCC))
    }

    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()>;

    /// Serializes the whole atom, including its head.
    fn to_bytes(&self) -> crate::Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.len() as usize);
        self.write(&mut buf)?;
        debug_assert_eq!(buf.len() as u64, self.len(), "{} wrote a wrong size", Self::FOURCC);
        Ok(buf)
    }
}

pub(crate) trait LenOrZero {
    fn len_or_zero(&self) -> u64;
}

impl<T: AtomSize> LenOrZero for Option<T> {
    fn len_or_zero(&self) -> u64 {
        self.as_ref().map_or(0, |a| a.len())
    }
}

impl<T: AtomSize> LenOrZero for [T] {
    fn len_or_zero(&self) -> u64 {
        self.iter().map(|a| a.len()).sum()
    }
}

/// Iterates over the children of a container atom, calling `f` with every child's head. `f`
/// either consumes the child's content or leaves the reader at the start of the content, in
/// which case the child is skipped.
pub(crate) fn parse_children<R: Read + Seek>(
    reader: &mut R,
    size: Size,
    mut f: impl FnMut(&mut R, Head) -> crate::Result<bool>,
) -> crate::Result<()> {
    let mut parsed_bytes = 0;

    while parsed_bytes < size.content_len() {
        let head = head::parse(reader)?;
        if head.len() > size.content_len() - parsed_bytes {
            return Err(crate::Error::new(
                ErrorKind::SizeMismatch,
                format!("Child atom '{}' exceeds the bounds of its parent", head.fourcc()),
            ));
        }

        let start = reader.stream_position()?;
        if f(reader, head)? {
            let end = start + head.content_len();
            let current = reader.stream_position()?;
            if current != end {
                return Err(crate::Error::new(
                    ErrorKind::SizeMismatch,
                    format!(
                        "Atom '{}' has {} bytes of content but {} were read",
                        head.fourcc(),
                        head.content_len(),
                        current as i64 - start as i64,
                    ),
                ));
            }
        } else {
            reader.skip(head.content_len() as i64)?;
        }

        parsed_bytes += head.len();
    }

    Ok(())
}
