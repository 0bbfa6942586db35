//! Choosing the track chapters are attached to and recording the association.

use std::fmt;

use tracing::debug;

use crate::atom::{ident, Fourcc};
use crate::{ChapterConfig, ErrorKind, MediaType, Movie, SourceTrack, TrackId};

/// The kind of a track association.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssociationKind {
    /// The target track holds the chapters of the source track (`chap`).
    ChapterList,
}

impl AssociationKind {
    /// The track reference type this association is stored as.
    pub const fn fourcc(&self) -> Fourcc {
        match self {
            Self::ChapterList => ident::CHAPTER_REFERENCE,
        }
    }
}

impl fmt::Display for AssociationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChapterList => f.write_str("chapter list"),
        }
    }
}

/// A directed edge from a track to the track holding its chapters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChapterAssociation {
    /// The referencing track, usually the primary track.
    pub from: TrackId,
    /// The referenced track.
    pub to: TrackId,
    /// The kind of reference.
    pub kind: AssociationKind,
}

/// Selects the track chapters are attached to.
///
/// The first enabled track of the preferred media type wins, then any track of that type. If
/// there is none the same is tried with the fallback type.
pub fn select_primary<'a>(
    tracks: &'a [SourceTrack],
    cfg: &ChapterConfig,
) -> crate::Result<&'a SourceTrack> {
    let find = |media_type: MediaType| {
        let of_type = || tracks.iter().filter(move |t| t.media_type == media_type);
        of_type().find(|t| t.enabled).or_else(|| of_type().next())
    };

    let primary = find(cfg.primary).or_else(|| find(cfg.fallback));
    match primary {
        Some(t) => {
            debug!(track_id = t.id.0, media_type = %t.media_type, "selected primary track");
            Ok(t)
        }
        None => Err(crate::Error::new(
            ErrorKind::NoPrimaryTrack,
            format!("No {} or {} track found", cfg.primary, cfg.fallback),
        )),
    }
}

/// Marks `chapter` as the chapter list of `primary`. Returns `false` if the association already
/// existed, in which case nothing changes.
pub fn associate(movie: &mut Movie, primary: TrackId, chapter: TrackId) -> crate::Result<bool> {
    movie.add_association(primary, chapter, AssociationKind::ChapterList)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Time;

    fn track(id: u32, media_type: MediaType, enabled: bool) -> SourceTrack {
        SourceTrack {
            id: TrackId(id),
            media_type,
            enabled,
            timescale: 600,
            duration: Time::new(6000, 600),
            language: None,
            chapters: Vec::new(),
        }
    }

    #[test]
    fn prefers_enabled_video() {
        let tracks = [
            track(1, MediaType::Audio, true),
            track(2, MediaType::Video, false),
            track(3, MediaType::Video, true),
        ];
        let primary = select_primary(&tracks, &ChapterConfig::DEFAULT).unwrap();
        assert_eq!(primary.id, TrackId(3));
    }

    #[test]
    fn disabled_track_of_preferred_type() {
        let tracks = [track(1, MediaType::Audio, true), track(2, MediaType::Video, false)];
        let primary = select_primary(&tracks, &ChapterConfig::DEFAULT).unwrap();
        assert_eq!(primary.id, TrackId(2));
    }

    #[test]
    fn falls_back_to_audio() {
        let tracks = [track(1, MediaType::Text, true), track(2, MediaType::Audio, true)];
        let primary = select_primary(&tracks, &ChapterConfig::DEFAULT).unwrap();
        assert_eq!(primary.id, TrackId(2));

        let cfg = ChapterConfig::DEFAULT.primary(MediaType::Audio).fallback(MediaType::Video);
        let primary = select_primary(&tracks, &cfg).unwrap();
        assert_eq!(primary.id, TrackId(2));
    }

    #[test]
    fn no_primary_track() {
        let tracks = [track(1, MediaType::Text, true)];
        let err = select_primary(&tracks, &ChapterConfig::DEFAULT).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::NoPrimaryTrack));
        assert!(err.is_input_error());

        let err = select_primary(&[], &ChapterConfig::DEFAULT).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::NoPrimaryTrack));
    }
}
