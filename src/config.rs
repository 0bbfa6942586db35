use std::fmt;
use std::str::FromStr;

use crate::{ErrorKind, FileType, MediaType};

/// An ISO 639-2/T language code such as `eng`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Language([u8; 3]);

impl Language {
    /// Undetermined (`und`).
    pub const UNDETERMINED: Self = Self(*b"und");

    /// Validates a three letter lowercase code.
    pub fn new(code: &str) -> crate::Result<Self> {
        match <[u8; 3]>::try_from(code.as_bytes()) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_lowercase) => Ok(Self(bytes)),
            _ => Err(crate::Error::new(
                ErrorKind::TrackCreationFailed,
                format!("Invalid language code '{code}', expected three lowercase letters"),
            )),
        }
    }

    /// Returns the three letter code.
    pub const fn code(&self) -> [u8; 3] {
        self.0
    }

    /// Returns the three letter code as a string.
    pub fn as_str(&self) -> &str {
        // always ascii
        std::str::from_utf8(&self.0).unwrap_or("und")
    }

    pub(crate) fn from_packed(packed: u16) -> Option<Self> {
        crate::atom::util::unpack_language(packed).map(Self)
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::UNDETERMINED
    }
}

impl FromStr for Language {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::new(s)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configure how chapters are authored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChapterConfig {
    /// The media type of the track chapters are attached to.
    pub primary: MediaType,
    /// The media type used if no track of the `primary` type exists.
    pub fallback: MediaType,
    /// The language of the chapter titles.
    pub language: Language,
    /// The timescale of the chapter tracks.
    pub timescale: u32,
    /// Whether every text sample declares its encoding as UTF-8 with an `encd` atom.
    pub declare_utf8: bool,
    /// Width and height of chapter thumbnails. If set, every marker must carry a thumbnail and a
    /// jpeg track is written next to the text track.
    pub thumbnail_size: Option<(u32, u32)>,
}

impl Default for ChapterConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl ChapterConfig {
    /// Chapters attached to video, falling back to audio, in an undetermined language at a timescale
    /// of 600, with the UTF-8 declaration and without thumbnails.
    pub const DEFAULT: Self = Self {
        primary: MediaType::Video,
        fallback: MediaType::Audio,
        language: Language::UNDETERMINED,
        timescale: 600,
        declare_utf8: true,
        thumbnail_size: None,
    };

    /// Sets the media type of the track chapters are attached to.
    pub const fn primary(mut self, primary: MediaType) -> Self {
        self.primary = primary;
        self
    }

    /// Sets the media type used if no track of the primary type exists.
    pub const fn fallback(mut self, fallback: MediaType) -> Self {
        self.fallback = fallback;
        self
    }

    /// Sets the language of the chapter tracks.
    pub const fn language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// Sets the timescale of the chapter tracks.
    pub const fn timescale(mut self, timescale: u32) -> Self {
        self.timescale = timescale;
        self
    }

    /// Sets whether chapter titles carry an `encd` atom declaring UTF-8.
    pub const fn declare_utf8(mut self, declare_utf8: bool) -> Self {
        self.declare_utf8 = declare_utf8;
        self
    }

    /// Enables a thumbnail track of the given size.
    pub const fn thumbnails(mut self, width: u32, height: u32) -> Self {
        self.thumbnail_size = Some((width, height));
        self
    }
}

/// Configure how a movie is written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteConfig {
    /// Replaces the file type of the source. Movies written without a source default to
    /// [`FileType::quicktime`].
    pub file_type: Option<FileType>,
    /// Whether references of copied tracks that aren't chapter references are kept. If
    /// disabled only the chapter references written by this crate remain.
    pub keep_references: bool,
}

impl Default for WriteConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl WriteConfig {
    /// Keeps the file type and the track references of the source.
    pub const DEFAULT: Self = Self { file_type: None, keep_references: true };

    /// Sets the file type written to the output.
    pub fn file_type(mut self, file_type: FileType) -> Self {
        self.file_type = Some(file_type);
        self
    }

    /// Sets whether copied tracks keep their existing track references.
    pub const fn keep_references(mut self, keep_references: bool) -> Self {
        self.keep_references = keep_references;
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn language_codes() {
        assert_eq!(Language::new("eng").unwrap().as_str(), "eng");
        assert_eq!("deu".parse::<Language>().unwrap().code(), *b"deu");
        assert!(Language::new("EN").is_err());
        assert!(Language::new("en1").is_err());
        assert!(Language::new("engl").is_err());
        assert_eq!(Language::from_packed(0x55C4), Some(Language::UNDETERMINED));
    }

    #[test]
    fn builder() {
        let cfg = ChapterConfig::DEFAULT.primary(MediaType::Audio).timescale(1000).thumbnails(160, 90);
        assert_eq!(cfg.primary, MediaType::Audio);
        assert_eq!(cfg.fallback, MediaType::Audio);
        assert_eq!(cfg.timescale, 1000);
        assert_eq!(cfg.thumbnail_size, Some((160, 90)));
        assert!(cfg.declare_utf8);
    }
}
