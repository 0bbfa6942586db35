use std::array::TryFromSliceError;
use std::fmt::{self, Write};
use std::ops::{Deref, DerefMut};
use std::str::FromStr;

/// (`ftyp`) Identifier of an atom containing information about the filetype.
pub const FILETYPE: Fourcc = Fourcc(*b"ftyp");
/// (`mdat`) Identifier of an atom containing the sample data.
pub const MEDIA_DATA: Fourcc = Fourcc(*b"mdat");
/// (`moov`) Identifier of an atom containing the movie structure.
pub const MOVIE: Fourcc = Fourcc(*b"moov");
/// (`mvhd`) Identifier of an atom containing information about the whole movie.
pub const MOVIE_HEADER: Fourcc = Fourcc(*b"mvhd");
/// (`trak`) Identifier of an atom containing information about a single track.
pub const TRACK: Fourcc = Fourcc(*b"trak");
/// (`tkhd`)
pub const TRACK_HEADER: Fourcc = Fourcc(*b"tkhd");
/// (`tref`) Identifier of an atom containing references to other tracks.
pub const TRACK_REFERENCE: Fourcc = Fourcc(*b"tref");
/// (`chap`) Track reference type marking the referenced tracks as chapter tracks.
pub const CHAPTER_REFERENCE: Fourcc = Fourcc(*b"chap");
/// (`mdia`) Identifier of an atom containing information about a tracks media type and data.
pub const MEDIA: Fourcc = Fourcc(*b"mdia");
/// (`mdhd`)
pub const MEDIA_HEADER: Fourcc = Fourcc(*b"mdhd");
/// (`hdlr`) Identifier of an atom specifying the handler that should interpret the media data.
pub const HANDLER_REFERENCE: Fourcc = Fourcc(*b"hdlr");
/// (`minf`)
pub const MEDIA_INFORMATION: Fourcc = Fourcc(*b"minf");
/// (`gmhd`)
pub const BASE_MEDIA_INFORMATION_HEADER: Fourcc = Fourcc(*b"gmhd");
/// (`gmin`)
pub const BASE_MEDIA_INFORMATION: Fourcc = Fourcc(*b"gmin");
/// (`vmhd`)
pub const VIDEO_MEDIA_INFORMATION_HEADER: Fourcc = Fourcc(*b"vmhd");
/// (`dinf`)
pub const DATA_INFORMATION: Fourcc = Fourcc(*b"dinf");
/// (`dref`)
pub const DATA_REFERENCE: Fourcc = Fourcc(*b"dref");
/// (`url `)
pub const URL_MEDIA: Fourcc = Fourcc(*b"url ");
/// (`stbl`)
pub const SAMPLE_TABLE: Fourcc = Fourcc(*b"stbl");
/// (`stsd`)
pub const SAMPLE_TABLE_SAMPLE_DESCRIPTION: Fourcc = Fourcc(*b"stsd");
/// (`stts`)
pub const SAMPLE_TABLE_TIME_TO_SAMPLE: Fourcc = Fourcc(*b"stts");
/// (`stsc`)
pub const SAMPLE_TABLE_SAMPLE_TO_CHUNK: Fourcc = Fourcc(*b"stsc");
/// (`stsz`)
pub const SAMPLE_TABLE_SAMPLE_SIZE: Fourcc = Fourcc(*b"stsz");
/// (`stco`)
pub const SAMPLE_TABLE_CHUNK_OFFSET: Fourcc = Fourcc(*b"stco");
/// (`co64`)
pub const SAMPLE_TABLE_CHUNK_OFFSET_64: Fourcc = Fourcc(*b"co64");
/// (`text`) Legacy QuickTime text media, used as sample entry type, handler subtype and `gmhd`
/// child.
pub const TEXT_MEDIA: Fourcc = Fourcc(*b"text");
/// (`jpeg`) Photo JPEG sample entry type.
pub const JPEG_MEDIA: Fourcc = Fourcc(*b"jpeg");
/// (`encd`) Text encoding declaration appended to a text sample.
pub const TEXT_ENCODING: Fourcc = Fourcc(*b"encd");
/// (`free`)
pub const FREE: Fourcc = Fourcc(*b"free");

// handler types
/// (`vide`)
pub const VIDEO_HANDLER: Fourcc = Fourcc(*b"vide");
/// (`soun`)
pub const SOUND_HANDLER: Fourcc = Fourcc(*b"soun");
/// (`sbtl`)
pub const SUBTITLE_HANDLER: Fourcc = Fourcc(*b"sbtl");
/// (`mhlr`) QuickTime media handler component type.
pub const MEDIA_HANDLER_COMPONENT: Fourcc = Fourcc(*b"mhlr");

// brands
/// (`qt  `)
pub const QUICKTIME_BRAND: Fourcc = Fourcc(*b"qt  ");
/// (`isom`)
pub const ISOM_BRAND: Fourcc = Fourcc(*b"isom");
/// (`mp42`)
pub const MP42_BRAND: Fourcc = Fourcc(*b"mp42");
/// (`M4V `)
pub const M4V_BRAND: Fourcc = Fourcc(*b"M4V ");

/// A 4 byte atom identifier (four character code).
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fourcc(pub [u8; 4]);

impl Deref for Fourcc {
    type Target = [u8; 4];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Fourcc {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl FromStr for Fourcc {
    type Err = TryFromSliceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Fourcc(s.as_bytes().try_into()?))
    }
}

impl fmt::Debug for Fourcc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Fourcc(")?;
        for c in self.0.iter().map(|b| char::from(*b)) {
            f.write_char(c)?;
        }
        f.write_str(")")?;
        Ok(())
    }
}

impl fmt::Display for Fourcc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.0.iter().map(|b| char::from(*b)) {
            f.write_char(c)?;
        }
        Ok(())
    }
}
