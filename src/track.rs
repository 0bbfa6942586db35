use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::trace;

use crate::atom::{ident, Fourcc, SampleDescription};
use crate::{DecodeTime, ErrorKind, Language, Sample, Time};

/// The identifier of a track inside a movie. Never zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TrackId(pub u32);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The kind of media a track carries, derived from its handler type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MediaType {
    /// `vide`
    Video,
    /// `soun`
    Audio,
    /// `text`
    Text,
    /// Any other handler type, such as `sbtl` or `tmcd`.
    Other(Fourcc),
}

impl MediaType {
    /// Maps an `hdlr` handler type to a media type.
    pub fn from_handler(handler_type: Fourcc) -> Self {
        match handler_type {
            ident::VIDEO_HANDLER => Self::Video,
            ident::SOUND_HANDLER => Self::Audio,
            ident::TEXT_MEDIA => Self::Text,
            other => Self::Other(other),
        }
    }

    /// The handler type written to the `hdlr` atom.
    pub fn handler_type(&self) -> Fourcc {
        match self {
            Self::Video => ident::VIDEO_HANDLER,
            Self::Audio => ident::SOUND_HANDLER,
            Self::Text => ident::TEXT_MEDIA,
            Self::Other(f) => *f,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => f.write_str("video"),
            Self::Audio => f.write_str("audio"),
            Self::Text => f.write_str("text"),
            Self::Other(fourcc) => write!(f, "{fourcc}"),
        }
    }
}

/// A track under construction: a sequence of timed samples sharing one sample description.
///
/// New tracks are disabled, chapter tracks are only displayed through a reference from another
/// track. Samples are appended in presentation order and are stored in the track's timescale.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Track {
    media_type: MediaType,
    timescale: u32,
    enabled: bool,
    language: Option<Language>,
    /// Display width and height in pixels.
    dimensions: (u32, u32),
    description: Option<Arc<SampleDescription>>,
    samples: Vec<Sample>,
    media_data_destination: Option<PathBuf>,
}

impl Track {
    /// Creates an empty, disabled track.
    pub fn new(media_type: MediaType, timescale: u32, language: Option<Language>) -> crate::Result<Self> {
        if timescale == 0 {
            return Err(crate::Error::new(
                ErrorKind::TrackCreationFailed,
                format!("Cannot create a {media_type} track with a timescale of zero"),
            ));
        }

        Ok(Self {
            media_type,
            timescale,
            enabled: false,
            language,
            dimensions: (0, 0),
            description: None,
            samples: Vec::new(),
            media_data_destination: None,
        })
    }

    /// The media type of the track.
    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    /// The media timescale.
    pub fn timescale(&self) -> u32 {
        self.timescale
    }

    /// Whether the track is enabled for playback.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enables or disables the track. Chapter tracks are written disabled.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// The media language.
    pub fn language(&self) -> Option<Language> {
        self.language
    }

    /// The presentation size in pixels, `(0, 0)` for tracks without a visual.
    pub fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }

    /// Sets the presentation size in pixels. Track headers store the size as 16.16 fixed point,
    /// so either dimension above 65535 fails with [`ErrorKind::FormatDescriptionInvalid`].
    pub fn set_dimensions(&mut self, width: u32, height: u32) -> crate::Result<()> {
        if width > u16::MAX as u32 || height > u16::MAX as u32 {
            return Err(crate::Error::new(
                ErrorKind::FormatDescriptionInvalid,
                format!("Track dimensions {width}x{height} exceed the 16 bit range"),
            ));
        }
        self.dimensions = (width, height);
        Ok(())
    }

    /// The sample description shared by all samples, once the first sample was appended.
    pub fn description(&self) -> Option<&Arc<SampleDescription>> {
        self.description.as_ref()
    }

    /// The samples appended so far.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// The file sample data will be written to, if set.
    pub fn media_data_destination(&self) -> Option<&Path> {
        self.media_data_destination.as_deref()
    }

    /// Sets the file the sample data will be written to. Must be called before the first sample
    /// is appended.
    pub fn set_media_data_destination(&mut self, location: impl Into<PathBuf>) -> crate::Result<()> {
        if !self.samples.is_empty() {
            return Err(crate::Error::new(
                ErrorKind::SampleConstructionFailed,
                "The media data destination can't change after samples were appended",
            ));
        }
        self.media_data_destination = Some(location.into());
        Ok(())
    }

    /// The end of the last sample, or zero.
    pub fn end(&self) -> Time {
        self.samples.last().map_or(Time::zero(self.timescale), Sample::end)
    }

    /// Appends a sample. `pts` and `duration` may use any timescale, they are converted to the
    /// track's timescale by rounding the start and the end of the sample separately so that
    /// adjacent samples stay adjacent.
    ///
    /// Fails with [`ErrorKind::InvalidTiming`] if the duration isn't positive, or if the sample
    /// starts before the end of the previous one. A failed append leaves the track unchanged.
    pub fn append_sample(
        &mut self,
        payload: Vec<u8>,
        description: &Arc<SampleDescription>,
        pts: Time,
        duration: Time,
    ) -> crate::Result<()> {
        if self.media_data_destination.is_none() {
            return Err(crate::Error::new(
                ErrorKind::SampleConstructionFailed,
                "No media data destination set before appending samples",
            ));
        }
        self.check_description(description)?;
        if u32::try_from(payload.len()).is_err() {
            return Err(crate::Error::new(
                ErrorKind::SampleConstructionFailed,
                format!("Sample of {} bytes exceeds 4 GiB", payload.len()),
            ));
        }

        let invalid = |msg: String| crate::Error::new(ErrorKind::InvalidTiming, msg);
        if !duration.is_positive() {
            return Err(invalid(format!("Sample duration {duration} is not positive")));
        }
        if pts.is_negative() {
            return Err(invalid(format!("Sample presentation time {pts} is negative")));
        }

        let overflow = || invalid(format!("Sample at {pts} overflows timescale {}", self.timescale));
        let start = pts.rescale(self.timescale).ok_or_else(overflow)?;
        let end = pts.checked_add(duration).and_then(|e| e.rescale(self.timescale)).ok_or_else(overflow)?;
        let ticks = end.value - start.value;
        if ticks <= 0 {
            return Err(invalid(format!(
                "Sample duration {duration} rounds to zero in timescale {}",
                self.timescale
            )));
        }
        if ticks > u32::MAX as i64 {
            return Err(invalid(format!("Sample duration {duration} exceeds 32 bits of ticks")));
        }

        let last_end = self.end();
        if start < last_end {
            return Err(invalid(format!(
                "Sample at {:.3}s starts before the previous sample ends at {:.3}s",
                start.as_secs_f64(),
                last_end.as_secs_f64(),
            )));
        }

        trace!(
            media_type = %self.media_type,
            pts = start.value,
            duration = ticks,
            len = payload.len(),
            "appending sample"
        );
        self.description.get_or_insert_with(|| Arc::clone(description));
        self.samples.push(Sample {
            payload,
            pts: start,
            duration: Time::new(ticks, self.timescale),
            dts: DecodeTime::Absent,
            description: Arc::clone(description),
        });

        Ok(())
    }

    fn check_description(&self, description: &Arc<SampleDescription>) -> crate::Result<()> {
        if let Some(existing) = &self.description {
            if !Arc::ptr_eq(existing, description) && **existing != **description {
                return Err(crate::Error::new(
                    ErrorKind::FormatDescriptionInvalid,
                    "All samples of a track must share one sample description",
                ));
            }
        }

        let compatible = match (self.media_type, &**description) {
            (MediaType::Text, SampleDescription::Text(_)) => true,
            (MediaType::Text, _) | (_, SampleDescription::Text(_)) => false,
            (MediaType::Video, SampleDescription::Jpeg(_)) => true,
            (_, SampleDescription::Jpeg(_)) => false,
            _ => true,
        };
        if !compatible {
            return Err(crate::Error::new(
                ErrorKind::FormatDescriptionInvalid,
                format!(
                    "A '{}' sample description can't describe a {} track",
                    description.fourcc(),
                    self.media_type
                ),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::atom::{ImageSampleEntry, TextSampleEntry};

    fn text_track() -> (Track, Arc<SampleDescription>) {
        let mut track = Track::new(MediaType::Text, 600, None).unwrap();
        track.set_media_data_destination("out.mov").unwrap();
        (track, Arc::new(SampleDescription::Text(TextSampleEntry::default())))
    }

    #[test]
    fn new_track_is_disabled() {
        let track = Track::new(MediaType::Text, 600, Some(Language::UNDETERMINED)).unwrap();
        assert!(!track.is_enabled());
        assert!(track.samples().is_empty());
        assert_eq!(track.end(), Time::zero(600));

        let err = Track::new(MediaType::Text, 0, None).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::TrackCreationFailed));
    }

    #[test]
    fn dimensions_fit_the_track_header() {
        let mut track = Track::new(MediaType::Video, 600, None).unwrap();
        track.set_dimensions(65_535, 1080).unwrap();
        assert_eq!(track.dimensions(), (65_535, 1080));

        let err = track.set_dimensions(70_000, 1080).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::FormatDescriptionInvalid));
        assert_eq!(track.dimensions(), (65_535, 1080));
    }

    #[test]
    fn appends_are_contiguous_after_rescaling() {
        let (mut track, desc) = text_track();
        // sevenths of a second are not whole ticks at 600
        let third = Time::new(1, 7);
        let mut pts = Time::zero(7);
        for _ in 0..5 {
            track.append_sample(vec![0, 0], &desc, pts, third).unwrap();
            pts = pts.checked_add(third).unwrap();
        }

        let samples = track.samples();
        for pair in samples.windows(2) {
            assert_eq!(pair[0].end(), pair[1].pts);
        }
        assert_eq!(track.end(), Time::new(5, 7).rescale(600).unwrap());
        assert!(samples.iter().all(|s| Arc::ptr_eq(&s.description, &desc)));
    }

    #[test]
    fn rejects_invalid_timing() {
        let (mut track, desc) = text_track();
        track.append_sample(vec![0, 0], &desc, Time::from_secs(0), Time::from_secs(10)).unwrap();

        let overlapping = track.append_sample(vec![0, 0], &desc, Time::from_secs(9), Time::from_secs(1));
        assert!(matches!(overlapping.unwrap_err().kind, ErrorKind::InvalidTiming));
        let zero = track.append_sample(vec![0, 0], &desc, Time::from_secs(10), Time::from_secs(0));
        assert!(matches!(zero.unwrap_err().kind, ErrorKind::InvalidTiming));
        let negative = track.append_sample(vec![0, 0], &desc, Time::from_secs(10), Time::from_secs(-1));
        assert!(matches!(negative.unwrap_err().kind, ErrorKind::InvalidTiming));
        let too_short = track.append_sample(vec![0, 0], &desc, Time::from_secs(10), Time::new(1, 10_000));
        assert!(matches!(too_short.unwrap_err().kind, ErrorKind::InvalidTiming));

        assert_eq!(track.samples().len(), 1);

        // a gap is allowed
        track.append_sample(vec![0, 0], &desc, Time::from_secs(11), Time::from_secs(1)).unwrap();
        assert_eq!(track.samples().len(), 2);
    }

    #[test]
    fn requires_destination_and_matching_description() {
        let mut track = Track::new(MediaType::Text, 600, None).unwrap();
        let desc = Arc::new(SampleDescription::Text(TextSampleEntry::default()));
        let err = track.append_sample(vec![0, 0], &desc, Time::from_secs(0), Time::from_secs(1));
        assert!(matches!(err.unwrap_err().kind, ErrorKind::SampleConstructionFailed));

        track.set_media_data_destination("out.mov").unwrap();
        let jpeg = Arc::new(SampleDescription::Jpeg(ImageSampleEntry::jpeg(16, 16).unwrap()));
        let err = track.append_sample(vec![0, 0], &jpeg, Time::from_secs(0), Time::from_secs(1));
        assert!(matches!(err.unwrap_err().kind, ErrorKind::FormatDescriptionInvalid));

        track.append_sample(vec![0, 0], &desc, Time::from_secs(0), Time::from_secs(1)).unwrap();
        let other = Arc::new(SampleDescription::Text(TextSampleEntry {
            font_name: "Courier".to_owned(),
            ..Default::default()
        }));
        let err = track.append_sample(vec![0, 0], &other, Time::from_secs(1), Time::from_secs(1));
        assert!(matches!(err.unwrap_err().kind, ErrorKind::FormatDescriptionInvalid));

        let err = track.set_media_data_destination("other.mov").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::SampleConstructionFailed));
    }
}
