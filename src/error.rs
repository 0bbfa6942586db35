use std::borrow::Cow;
use std::{error, fmt, io, string};

use crate::atom::Fourcc;

/// Type alias for the result of chapter authoring operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Kinds of errors that may occur while authoring chapters.
#[derive(Debug)]
pub enum ErrorKind {
    /// Neither the preferred nor the fallback media type is present in the source.
    NoPrimaryTrack,
    /// A track couldn't be created, for example because of an invalid language tag or timescale.
    TrackCreationFailed,
    /// A sample description field is out of range for its binary representation.
    FormatDescriptionInvalid,
    /// A chapter title is longer than the 16 bit length prefix of a text sample allows.
    PayloadTooLarge,
    /// A computed chapter interval is not strictly positive.
    InvalidDuration,
    /// A sample violates the timing contract of the track it is appended to.
    InvalidTiming,
    /// A sample couldn't be assembled.
    SampleConstructionFailed,
    /// A track reference couldn't be recorded.
    AssociationFailed,
    /// Writing the container header or flushing sample data failed.
    FinalizationFailed,
    /// The operation was cancelled before it was committed.
    Cancelled,
    /// An atom could not be found. Contains the atom's identifier.
    AtomNotFound(Fourcc),
    /// An IO error has occurred. Contains the original `io::Error`.
    Io(io::Error),
    /// An error occurred during parsing.
    Parsing,
    /// The size stored in an atom head doesn't match the size of its content.
    SizeMismatch,
    /// An atom is smaller than the minimum size of its fixed fields.
    InvalidAtomSize,
    /// An atom has an unknown version. Contains the version.
    UnknownVersion(u8),
    /// A string decoding error has occurred. Contains the invalid data.
    Utf8StringDecoding(string::FromUtf8Error),
}

impl ErrorKind {
    /// Returns whether this kind describes bad input supplied by the caller, which can be fixed
    /// and retried, as opposed to a failing collaborator (source reader, file system).
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::NoPrimaryTrack
                | Self::FormatDescriptionInvalid
                | Self::PayloadTooLarge
                | Self::InvalidDuration
                | Self::InvalidTiming
                | Self::SampleConstructionFailed
                | Self::TrackCreationFailed
        )
    }
}

/// Any error that may occur while authoring chapters.
pub struct Error {
    /// The kind of error.
    pub kind: ErrorKind,
    /// A human readable string describing the error.
    pub description: Cow<'static, str>,
}

impl Error {
    /// Creates a new `Error` using the error kind and description.
    pub fn new(kind: ErrorKind, description: impl Into<Cow<'static, str>>) -> Error {
        Error { kind, description: description.into() }
    }

    /// Returns whether the error was caused by bad input. See [`ErrorKind::is_input_error`].
    pub fn is_input_error(&self) -> bool {
        self.kind.is_input_error()
    }

    /// Returns whether the error was caused by a collaborator, either the source container, the
    /// file system or a cancellation.
    pub fn is_collaborator_error(&self) -> bool {
        !self.kind.is_input_error()
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match &self.kind {
            ErrorKind::Io(err) => Some(err),
            ErrorKind::Utf8StringDecoding(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        let description = format!("IO error: {err}");
        Error::new(ErrorKind::Io(err), description)
    }
}

impl From<string::FromUtf8Error> for Error {
    fn from(err: string::FromUtf8Error) -> Error {
        Error::new(ErrorKind::Utf8StringDecoding(err), "Data is not valid utf-8.")
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.description.is_empty() {
            write!(f, "{:?}", self.kind)
        } else {
            write!(f, "{:?}: {}", self.kind, self.description)
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.description.is_empty() {
            write!(f, "{:?}", self.kind)
        } else {
            write!(f, "{}", self.description)
        }
    }
}
