//! Chapter sample payloads and the timed samples stored by a track.

use std::sync::Arc;

use crate::atom::{ident, SampleDescription};
use crate::{DecodeTime, ErrorKind, Time};

/// The `encd` atom declaring a text sample as UTF-8.
///
/// ```md
/// 4 bytes size (12)
/// 4 bytes type (`encd`)
/// 4 bytes encoding (0x00000100, UTF-8)
/// ```
pub const UTF8_DECLARATION: [u8; 12] = [0, 0, 0, 12, b'e', b'n', b'c', b'd', 0, 0, 0x01, 0];

const UTF8_ENCODING: u32 = 0x0100;

/// Encodes a chapter title as a QuickTime text sample, optionally followed by the
/// [`UTF8_DECLARATION`].
///
/// ```md
/// 2 bytes text length in bytes
/// n bytes UTF-8 text
/// ```
///
/// Titles longer than 65535 bytes fail with [`ErrorKind::PayloadTooLarge`].
pub fn encode_text(title: &str, declare_utf8: bool) -> crate::Result<Vec<u8>> {
    let len = u16::try_from(title.len()).map_err(|_| {
        crate::Error::new(
            ErrorKind::PayloadTooLarge,
            format!("Title of {} bytes exceeds the 65535 byte limit of a text sample", title.len()),
        )
    })?;

    let trailer = if declare_utf8 { UTF8_DECLARATION.len() } else { 0 };
    let mut payload = Vec::with_capacity(2 + title.len() + trailer);
    payload.extend_from_slice(&len.to_be_bytes());
    payload.extend_from_slice(title.as_bytes());
    if declare_utf8 {
        payload.extend_from_slice(&UTF8_DECLARATION);
    }

    Ok(payload)
}

/// A decoded text sample.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextPayload {
    /// The decoded title.
    pub text: String,
    /// Whether an `encd` atom declared the text as UTF-8.
    pub utf8_declared: bool,
}

/// Decodes a QuickTime text sample. Text starting with a UTF-16 byte order mark is decoded as
/// UTF-16, anything else as UTF-8. Trailing atoms other than `encd` are skipped.
pub fn decode_text(payload: &[u8]) -> crate::Result<TextPayload> {
    let Some(len) = crate::atom::util::be_int!(payload, 0, u16) else {
        return Err(crate::Error::new(ErrorKind::Parsing, "Text sample is shorter than 2 bytes"));
    };
    let end = 2 + len as usize;
    let Some(bytes) = payload.get(2..end) else {
        return Err(crate::Error::new(
            ErrorKind::Parsing,
            format!("Text length {len} exceeds the sample size {}", payload.len()),
        ));
    };

    let text = match bytes {
        [0xFE, 0xFF, rest @ ..] => decode_utf16(rest, u16::from_be_bytes)?,
        [0xFF, 0xFE, rest @ ..] => decode_utf16(rest, u16::from_le_bytes)?,
        _ => String::from_utf8(bytes.to_vec())?,
    };

    let mut utf8_declared = false;
    let mut pos = end;
    while pos + 8 <= payload.len() {
        let size = crate::atom::util::be_int!(payload, pos, u32).unwrap_or_default() as usize;
        if size < 8 || pos + size > payload.len() {
            break;
        }
        let encoding = crate::atom::util::be_int!(payload, pos + 8, u32);
        if payload[pos + 4..pos + 8] == *ident::TEXT_ENCODING && encoding == Some(UTF8_ENCODING) {
            utf8_declared = true;
        }
        pos += size;
    }

    Ok(TextPayload { text, utf8_declared })
}

fn decode_utf16(bytes: &[u8], from_bytes: fn([u8; 2]) -> u16) -> crate::Result<String> {
    let units = bytes.chunks_exact(2).map(|c| from_bytes([c[0], c[1]]));
    char::decode_utf16(units).collect::<Result<String, _>>().map_err(|e| {
        crate::Error::new(ErrorKind::Parsing, format!("Invalid UTF-16 text sample: {e}"))
    })
}

/// A timed sample appended to a track.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sample {
    /// The encoded sample data.
    pub payload: Vec<u8>,
    /// The presentation time in the track's timescale.
    pub pts: Time,
    /// The duration in the track's timescale. Always positive.
    pub duration: Time,
    /// The decode time, absent for samples decoded in presentation order.
    pub dts: DecodeTime,
    /// Shared by every sample of a track.
    pub description: Arc<SampleDescription>,
}

impl Sample {
    /// The end of the sample in the track's timescale.
    pub fn end(&self) -> Time {
        Time::new(self.pts.value + self.duration.value, self.pts.timescale)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn payload_layout() {
        let payload = encode_text("Intro", false).unwrap();
        assert_eq!(payload, b"\x00\x05Intro");

        let payload = encode_text("Kapitel Ü", true).unwrap();
        assert_eq!(&payload[..2], &[0, 10]);
        assert_eq!(&payload[12..], &UTF8_DECLARATION);

        let decoded = decode_text(&payload).unwrap();
        assert_eq!(decoded.text, "Kapitel Ü");
        assert!(decoded.utf8_declared);
    }

    #[test]
    fn length_limits() {
        for len in [0, 1, 255, 256, 65_535] {
            let title = "a".repeat(len);
            let payload = encode_text(&title, true).unwrap();
            assert_eq!(payload.len(), 2 + len + 12);
            assert_eq!(decode_text(&payload).unwrap().text, title);
        }

        let err = encode_text(&"a".repeat(65_536), true).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::PayloadTooLarge));
        assert!(err.is_input_error());
    }

    #[test]
    fn multibyte_length_is_byte_count() {
        let title = "日本語";
        let payload = encode_text(title, false).unwrap();
        assert_eq!(u16::from_be_bytes([payload[0], payload[1]]), 9);
    }

    #[test]
    fn utf16_and_trailing_atoms() {
        let mut payload = vec![0, 6, 0xFE, 0xFF, 0, b'H', 0, b'i'];
        payload.extend_from_slice(&[0, 0, 0, 10, b's', b't', b'y', b'l', 0, 0]);
        let decoded = decode_text(&payload).unwrap();
        assert_eq!(decoded.text, "Hi");
        assert!(!decoded.utf8_declared);
    }

    #[test]
    fn truncated() {
        assert!(decode_text(&[0]).is_err());
        assert!(decode_text(&[0, 4, b'a']).is_err());
    }
}
