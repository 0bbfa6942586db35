use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::link::{AssociationKind, ChapterAssociation};
use crate::{
    ErrorKind, FileType, Language, MediaType, Mp4Source, SampleDescription, Time, TimeRange, Track,
    TrackId,
};

/// A 3x3 transformation matrix as stored in movie and track headers. The first two columns are
/// 16.16 fixed point numbers, the last one is 2.30 fixed point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Matrix(pub [[u32; 3]; 3]);

impl Matrix {
    /// The identity transformation.
    pub const IDENTITY: Self =
        Self([[0x0001_0000, 0, 0], [0, 0x0001_0000, 0], [0, 0, 0x4000_0000]]);
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A source track taken over into the movie.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct CopiedTrack {
    pub id: TrackId,
    /// Whether the media was inserted, tracks without media are left out when writing.
    pub inserted: bool,
}

/// The tracks and associations of a movie that is about to be written.
///
/// A movie either starts from a [`Mp4Source`], whose tracks can be copied over with their media
/// left in place, or from scratch. New tracks get the next free track ids.
#[derive(Clone, Debug)]
pub struct Movie {
    timescale: u32,
    transform: Matrix,
    source: Option<Mp4Source>,
    copied: Vec<CopiedTrack>,
    created: Vec<(TrackId, Track)>,
    associations: Vec<ChapterAssociation>,
    next_track_id: u32,
}

impl Movie {
    /// Creates an empty movie.
    pub fn new(timescale: u32, transform: Matrix) -> crate::Result<Self> {
        if timescale == 0 {
            return Err(crate::Error::new(
                ErrorKind::TrackCreationFailed,
                "Cannot create a movie with a timescale of zero",
            ));
        }

        Ok(Self {
            timescale,
            transform,
            source: None,
            copied: Vec::new(),
            created: Vec::new(),
            associations: Vec::new(),
            next_track_id: 1,
        })
    }

    /// Creates a movie with the timescale and transform of the source. No track is copied yet.
    pub fn from_source(source: &Mp4Source) -> Self {
        let mvhd = source.mvhd();
        let max_id = source.raw_tracks().map(|t| t.info.id.0).max().unwrap_or(0);

        Self {
            timescale: mvhd.timescale,
            transform: mvhd.matrix,
            source: Some(source.clone()),
            copied: Vec::new(),
            created: Vec::new(),
            associations: Vec::new(),
            next_track_id: mvhd.next_track_id.max(max_id.saturating_add(1)),
        }
    }

    /// The movie timescale.
    pub fn timescale(&self) -> u32 {
        self.timescale
    }

    /// The transformation applied to visual tracks.
    pub fn transform(&self) -> Matrix {
        self.transform
    }

    /// The movie tracks are copied from, if any.
    pub fn source(&self) -> Option<&Mp4Source> {
        self.source.as_ref()
    }

    /// The file type of the source, if any.
    pub fn file_type(&self) -> Option<&FileType> {
        self.source.as_ref().and_then(|s| s.file_type())
    }

    /// The duration of the movie in the movie timescale: the longer of the source duration and
    /// the end of the longest new track.
    pub fn duration(&self) -> crate::Result<Time> {
        let mut duration = Time::zero(self.timescale);
        if let Some(mvhd) = self.source.as_ref().map(|s| s.mvhd()) {
            duration.value = i64::try_from(mvhd.duration).unwrap_or(i64::MAX);
        }

        for (id, track) in self.created.iter() {
            let end = track.end().rescale(self.timescale).ok_or_else(|| {
                crate::Error::new(
                    ErrorKind::FinalizationFailed,
                    format!("Track {id} ends beyond the range of the movie timescale"),
                )
            })?;
            if end > duration {
                duration = end;
            }
        }

        Ok(duration)
    }

    /// Takes over a track of the source. Its media is only referenced after a call to
    /// [`Self::insert_time_range`].
    pub fn copy_track(&mut self, id: TrackId) -> crate::Result<TrackId> {
        let exists = self.source.as_ref().is_some_and(|s| s.raw_track(id).is_some());
        if !exists {
            return Err(crate::Error::new(
                ErrorKind::TrackCreationFailed,
                format!("The source has no track {id}"),
            ));
        }
        if self.copied.iter().any(|c| c.id == id) {
            return Err(crate::Error::new(
                ErrorKind::TrackCreationFailed,
                format!("Track {id} was already copied"),
            ));
        }

        self.copied.push(CopiedTrack { id, inserted: false });
        Ok(id)
    }

    /// Inserts the media of a copied track. Only the whole time range of the track is supported
    /// and sample data is never copied: the copied track keeps referencing the media where it is
    /// stored in the source.
    pub fn insert_time_range(
        &mut self,
        id: TrackId,
        range: TimeRange,
        copy_sample_data: bool,
    ) -> crate::Result<()> {
        if copy_sample_data {
            return Err(crate::Error::new(
                ErrorKind::SampleConstructionFailed,
                "Copying sample data of source tracks is not supported",
            ));
        }

        let info = self.source.as_ref().and_then(|s| s.track(id)).ok_or_else(|| {
            crate::Error::new(ErrorKind::TrackCreationFailed, format!("The source has no track {id}"))
        })?;
        let covers = range.start.is_zero() && range.end().is_some_and(|end| end >= info.duration);
        if !covers {
            return Err(crate::Error::new(
                ErrorKind::InvalidTiming,
                format!(
                    "Only the whole track can be inserted, track {id} lasts {:.3}s",
                    info.duration.as_secs_f64()
                ),
            ));
        }

        let Some(copied) = self.copied.iter_mut().find(|c| c.id == id) else {
            return Err(crate::Error::new(
                ErrorKind::TrackCreationFailed,
                format!("Track {id} wasn't copied"),
            ));
        };
        copied.inserted = true;
        Ok(())
    }

    /// Adds a new, empty and disabled track.
    pub fn add_track(
        &mut self,
        media_type: MediaType,
        timescale: u32,
        language: Option<Language>,
    ) -> crate::Result<TrackId> {
        let track = Track::new(media_type, timescale, language)?;
        let id = TrackId(self.next_track_id);
        self.next_track_id = self.next_track_id.checked_add(1).ok_or_else(|| {
            crate::Error::new(ErrorKind::TrackCreationFailed, "No track ids left")
        })?;

        debug!(track_id = id.0, %media_type, timescale, "added track");
        self.created.push((id, track));
        Ok(id)
    }

    /// Returns a track added with [`Self::add_track`].
    pub fn track(&self, id: TrackId) -> Option<&Track> {
        self.created.iter().find(|(i, _)| *i == id).map(|(_, t)| t)
    }

    /// Returns a mutable reference to a track added with [`Self::add_track`].
    pub fn track_mut(&mut self, id: TrackId) -> Option<&mut Track> {
        self.created.iter_mut().find(|(i, _)| *i == id).map(|(_, t)| t)
    }

    /// The tracks added with [`Self::add_track`].
    pub fn tracks(&self) -> impl Iterator<Item = (TrackId, &Track)> {
        self.created.iter().map(|(i, t)| (*i, t))
    }

    /// The copied tracks whose media was inserted.
    pub fn copied_tracks(&self) -> impl Iterator<Item = TrackId> + '_ {
        self.copied.iter().filter(|c| c.inserted).map(|c| c.id)
    }

    /// Every association recorded so far, in insertion order.
    pub fn associations(&self) -> &[ChapterAssociation] {
        &self.associations
    }

    /// Appends a sample to a new track. See [`Track::append_sample`].
    pub fn append_sample(
        &mut self,
        id: TrackId,
        payload: Vec<u8>,
        description: &Arc<SampleDescription>,
        pts: Time,
        duration: Time,
    ) -> crate::Result<()> {
        self.new_track_mut(id)?.append_sample(payload, description, pts, duration)
    }

    /// Sets the file the samples of a new track are written to. See
    /// [`Track::set_media_data_destination`].
    pub fn set_media_data_destination(
        &mut self,
        id: TrackId,
        location: impl Into<PathBuf>,
    ) -> crate::Result<()> {
        self.new_track_mut(id)?.set_media_data_destination(location)
    }

    /// Records an association between two tracks of the movie. Returns `false` if it already
    /// existed.
    pub fn add_association(
        &mut self,
        from: TrackId,
        to: TrackId,
        kind: AssociationKind,
    ) -> crate::Result<bool> {
        for id in [from, to] {
            if !self.contains(id) {
                return Err(crate::Error::new(
                    ErrorKind::AssociationFailed,
                    format!("Cannot associate track {id} which is not part of the movie"),
                ));
            }
        }
        if from == to {
            return Err(crate::Error::new(
                ErrorKind::AssociationFailed,
                format!("Cannot associate track {from} with itself"),
            ));
        }

        let association = ChapterAssociation { from, to, kind };
        if self.associations.contains(&association) {
            return Ok(false);
        }

        debug!(from = from.0, to = to.0, %kind, "added association");
        self.associations.push(association);
        Ok(true)
    }

    /// The ids of the tracks `from` is associated with, in insertion order.
    pub fn associated(&self, from: TrackId, kind: AssociationKind) -> impl Iterator<Item = TrackId> + '_ {
        self.associations.iter().filter(move |a| a.from == from && a.kind == kind).map(|a| a.to)
    }

    fn contains(&self, id: TrackId) -> bool {
        self.copied.iter().any(|c| c.id == id) || self.created.iter().any(|(i, _)| *i == id)
    }

    fn new_track_mut(&mut self, id: TrackId) -> crate::Result<&mut Track> {
        self.track_mut(id).ok_or_else(|| {
            crate::Error::new(
                ErrorKind::SampleConstructionFailed,
                format!("Track {id} is not a new track of the movie"),
            )
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::TextSampleEntry;

    #[test]
    fn new_tracks_get_consecutive_ids() {
        let mut movie = Movie::new(600, Matrix::IDENTITY).unwrap();
        let a = movie.add_track(MediaType::Video, 600, None).unwrap();
        let b = movie.add_track(MediaType::Text, 600, None).unwrap();
        assert_eq!((a, b), (TrackId(1), TrackId(2)));
        assert_eq!(movie.tracks().count(), 2);
        assert!(!movie.track(b).unwrap().is_enabled());

        assert!(Movie::new(0, Matrix::IDENTITY).is_err());
    }

    #[test]
    fn associations() {
        let mut movie = Movie::new(600, Matrix::IDENTITY).unwrap();
        let video = movie.add_track(MediaType::Video, 600, None).unwrap();
        let text = movie.add_track(MediaType::Text, 600, None).unwrap();

        assert!(movie.add_association(video, text, AssociationKind::ChapterList).unwrap());
        assert!(!movie.add_association(video, text, AssociationKind::ChapterList).unwrap());
        assert_eq!(movie.associations().len(), 1);
        assert_eq!(movie.associated(video, AssociationKind::ChapterList).collect::<Vec<_>>(), [text]);

        let err = movie.add_association(video, video, AssociationKind::ChapterList).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::AssociationFailed));
        let err = movie.add_association(video, TrackId(9), AssociationKind::ChapterList).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::AssociationFailed));
    }

    #[test]
    fn duration_covers_new_tracks() {
        let mut movie = Movie::new(1000, Matrix::IDENTITY).unwrap();
        let text = movie.add_track(MediaType::Text, 600, None).unwrap();
        movie.set_media_data_destination(text, "out.mov").unwrap();
        let desc = Arc::new(SampleDescription::Text(TextSampleEntry::default()));
        movie.append_sample(text, vec![0, 0], &desc, Time::from_secs(0), Time::from_secs(3)).unwrap();

        assert_eq!(movie.duration().unwrap(), Time::from_secs(3));
        assert_eq!(movie.duration().unwrap().timescale, 1000);
    }

    #[test]
    fn copy_requires_source() {
        let mut movie = Movie::new(600, Matrix::IDENTITY).unwrap();
        let err = movie.copy_track(TrackId(1)).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::TrackCreationFailed));
        let range = TimeRange::new(Time::zero(600), Time::from_secs(1));
        assert!(movie.insert_time_range(TrackId(1), range, true).is_err());
    }
}
