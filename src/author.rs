use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::link::{associate, select_primary};
use crate::{
    encode_text, plan_intervals, ChapterConfig, ChapterInterval, ChapterMarker, ErrorKind,
    Finalizer, ImageSampleEntry, MediaType, Movie, Mp4Finalizer, Mp4Source, SampleDescription,
    Source, TextSampleEntry, Time, TimeRange, TrackId, WriteConfig,
};

lazy_static! {
    /// The text sample description shared by every chapter sample.
    static ref TEXT_DESCRIPTION: Arc<SampleDescription> =
        Arc::new(SampleDescription::Text(TextSampleEntry::default()));
}

/// The stages of adding chapters, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Loading the tracks and duration of the source.
    Opening,
    /// Computing the chapter intervals and encoding the samples.
    Planning,
    /// Building the chapter tracks.
    Building,
    /// Associating the chapter tracks with the primary track.
    Linking,
    /// Writing the destination.
    Finalizing,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Opening => f.write_str("opening"),
            Self::Planning => f.write_str("planning"),
            Self::Building => f.write_str("building"),
            Self::Linking => f.write_str("linking"),
            Self::Finalizing => f.write_str("finalizing"),
        }
    }
}

/// The result of adding chapters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Authored {
    /// The track the chapters are attached to.
    pub primary: TrackId,
    /// The new chapter text track.
    pub text_track: TrackId,
    /// The new thumbnail track, if thumbnails were requested.
    pub thumbnail_track: Option<TrackId>,
    /// The chapters as written, sorted by start time.
    pub intervals: Vec<ChapterInterval>,
}

/// Writes a copy of `source` with a chapter track built from `markers` to `destination`.
///
/// Every track of the source is copied except existing chapter tracks, which are replaced. The
/// media data of the source is copied as is. Nothing is written unless every marker could be
/// turned into a chapter, and a pre-existing destination is only removed right before the new
/// file is written.
///
/// # Example
/// ```no_run
/// use mp4chap::{ChapterConfig, ChapterMarker, Mp4Source, Time};
///
/// let source = Mp4Source::open("talk.mp4").unwrap();
/// let markers = [
///     ChapterMarker::new("Intro", Time::from_secs(0)),
///     ChapterMarker::new("Demo", Time::from_secs(120)),
/// ];
/// mp4chap::add_chapters(&source, "talk-chapters.mp4", &markers, &ChapterConfig::DEFAULT).unwrap();
/// ```
pub fn add_chapters(
    source: &Mp4Source,
    destination: impl AsRef<Path>,
    markers: &[ChapterMarker],
    cfg: &ChapterConfig,
) -> crate::Result<Authored> {
    add_chapters_with(source, destination, markers, cfg, &WriteConfig::DEFAULT, &Mp4Finalizer)
}

/// Like [`add_chapters`], with control over how the destination is written.
pub fn add_chapters_with(
    source: &Mp4Source,
    destination: impl AsRef<Path>,
    markers: &[ChapterMarker],
    cfg: &ChapterConfig,
    write_cfg: &WriteConfig,
    finalizer: &dyn Finalizer,
) -> crate::Result<Authored> {
    run(source, destination.as_ref(), markers, cfg, write_cfg, finalizer, &mut |_| Ok(()))
}

/// Runs the whole pipeline, calling `hook` before each stage. An error returned by the hook
/// aborts the run.
pub(crate) fn run(
    source: &Mp4Source,
    destination: &Path,
    markers: &[ChapterMarker],
    cfg: &ChapterConfig,
    write_cfg: &WriteConfig,
    finalizer: &dyn Finalizer,
    hook: &mut dyn FnMut(Stage) -> crate::Result<()>,
) -> crate::Result<Authored> {
    hook(Stage::Opening)?;
    let tracks = source.load_tracks()?;
    let duration = source.load_duration()?;
    let primary = select_primary(&tracks, cfg)?.id;

    hook(Stage::Planning)?;
    let intervals = plan_intervals(markers, duration)?;
    let payloads = intervals
        .iter()
        .map(|i| encode_text(&i.title, cfg.declare_utf8))
        .collect::<crate::Result<Vec<_>>>()?;
    let thumbnails = match cfg.thumbnail_size {
        Some((width, height)) => Some(thumbnails(markers, &intervals, width, height)?),
        None => None,
    };
    debug!(
        markers = markers.len(),
        primary = primary.0,
        destination = %destination.display(),
        "planned chapters"
    );

    hook(Stage::Building)?;
    let mut movie = Movie::from_source(source);
    // existing chapter tracks are replaced
    let replaced: Vec<TrackId> = tracks.iter().flat_map(|t| t.chapters.iter().copied()).collect();
    for t in tracks.iter().filter(|t| t.id == primary || !replaced.contains(&t.id)) {
        movie.copy_track(t.id)?;
        let range = TimeRange::new(Time::zero(t.timescale), t.duration);
        movie.insert_time_range(t.id, range, false)?;
    }

    let leading_gap = intervals[0].start;
    let text_track = movie.add_track(MediaType::Text, cfg.timescale, Some(cfg.language))?;
    movie.set_media_data_destination(text_track, destination)?;
    if leading_gap.is_positive() {
        let filler = encode_text("", cfg.declare_utf8)?;
        movie.append_sample(text_track, filler, &TEXT_DESCRIPTION, Time::zero(1), leading_gap)?;
    }
    for (interval, payload) in intervals.iter().zip(payloads) {
        movie.append_sample(text_track, payload, &TEXT_DESCRIPTION, interval.start, interval.duration)?;
    }
    debug!(track_id = text_track.0, samples = intervals.len(), "built chapter text track");

    let thumbnail_track = match thumbnails {
        Some((description, images)) => {
            let id = movie.add_track(MediaType::Video, cfg.timescale, Some(cfg.language))?;
            movie.set_media_data_destination(id, destination)?;
            if let Some(track) = movie.track_mut(id) {
                if let SampleDescription::Jpeg(entry) = &*description {
                    track.set_dimensions(entry.width as u32, entry.height as u32)?;
                }
            }
            if leading_gap.is_positive() {
                movie.append_sample(id, images[0].clone(), &description, Time::zero(1), leading_gap)?;
            }
            for (interval, image) in intervals.iter().zip(images) {
                movie.append_sample(id, image, &description, interval.start, interval.duration)?;
            }
            debug!(track_id = id.0, samples = intervals.len(), "built chapter thumbnail track");
            Some(id)
        }
        None => None,
    };

    hook(Stage::Linking)?;
    associate(&mut movie, primary, text_track)?;
    if let Some(id) = thumbnail_track {
        associate(&mut movie, primary, id)?;
    }

    hook(Stage::Finalizing)?;
    remove_stale_destination(source, destination)?;
    finalizer.write_header(&movie, destination, write_cfg)?;

    Ok(Authored { primary, text_track, thumbnail_track, intervals })
}

/// Collects one thumbnail per interval.
fn thumbnails(
    markers: &[ChapterMarker],
    intervals: &[ChapterInterval],
    width: u32,
    height: u32,
) -> crate::Result<(Arc<SampleDescription>, Vec<Vec<u8>>)> {
    let description = Arc::new(SampleDescription::Jpeg(ImageSampleEntry::jpeg(width, height)?));

    let images = intervals
        .iter()
        .map(|i| {
            let marker = &markers[i.marker_index];
            match &marker.thumbnail {
                Some(image) if !image.is_empty() => Ok(image.clone()),
                _ => Err(crate::Error::new(
                    ErrorKind::SampleConstructionFailed,
                    format!("Chapter '{}' has no thumbnail", marker.title),
                )),
            }
        })
        .collect::<crate::Result<Vec<_>>>()?;

    Ok((description, images))
}

fn remove_stale_destination(source: &Mp4Source, destination: &Path) -> crate::Result<()> {
    if !destination.exists() {
        return Ok(());
    }
    let is_source = source.path().is_some_and(|p| {
        matches!((fs::canonicalize(p), fs::canonicalize(destination)), (Ok(a), Ok(b)) if a == b)
    });
    if is_source {
        return Ok(());
    }

    warn!(destination = %destination.display(), "removing existing destination");
    fs::remove_file(destination).map_err(|e| {
        crate::Error::new(
            ErrorKind::FinalizationFailed,
            format!("Error removing existing destination {}: {e}", destination.display()),
        )
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn thumbnails_require_an_image_per_chapter() {
        let markers = [
            ChapterMarker::new("A", Time::from_secs(0)).with_thumbnail(vec![0xFF, 0xD8]),
            ChapterMarker::new("B", Time::from_secs(5)),
        ];
        let intervals = plan_intervals(&markers, Time::from_secs(10)).unwrap();
        let err = thumbnails(&markers, &intervals, 160, 90).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::SampleConstructionFailed));

        let err = thumbnails(&markers[..1], &intervals[..1], 70_000, 90).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::FormatDescriptionInvalid));

        let (description, images) = thumbnails(&markers[..1], &intervals[..1], 160, 90).unwrap();
        assert_eq!(description.fourcc(), crate::atom::ident::JPEG_MEDIA);
        assert_eq!(images, [vec![0xFF, 0xD8]]);
    }

    #[test]
    fn shared_text_description() {
        let a = Arc::clone(&TEXT_DESCRIPTION);
        let b = Arc::clone(&TEXT_DESCRIPTION);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.encode().unwrap().len(), 60);
    }

    fn video_source(path: &Path) -> Mp4Source {
        let mut movie = Movie::new(600, crate::Matrix::IDENTITY).unwrap();
        let video = movie.add_track(MediaType::Video, 600, None).unwrap();
        movie.set_media_data_destination(video, path).unwrap();
        let desc = Arc::new(SampleDescription::Other {
            fourcc: crate::Fourcc(*b"avc1"),
            data: vec![0; 8],
        });
        movie.append_sample(video, vec![3; 32], &desc, Time::zero(1), Time::from_secs(4)).unwrap();
        Mp4Finalizer.write_header(&movie, path, &WriteConfig::DEFAULT).unwrap();
        Mp4Source::open(path).unwrap()
    }

    #[test]
    fn cancelled_right_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let source = video_source(&dir.path().join("source.mov"));

        let destination = dir.path().join("chapters.mov");
        let markers = [ChapterMarker::new("A", Time::zero(1)), ChapterMarker::new("B", Time::from_secs(2))];
        let mut stages = Vec::new();
        let err = run(
            &source,
            &destination,
            &markers,
            &ChapterConfig::DEFAULT,
            &WriteConfig::DEFAULT,
            &Mp4Finalizer,
            &mut |stage| {
                stages.push(stage);
                match stage {
                    Stage::Finalizing => Err(crate::Error::new(ErrorKind::Cancelled, "stop")),
                    _ => Ok(()),
                }
            },
        )
        .unwrap_err();

        assert!(matches!(err.kind, ErrorKind::Cancelled));
        assert_eq!(
            stages,
            [Stage::Opening, Stage::Planning, Stage::Building, Stage::Linking, Stage::Finalizing]
        );
        assert!(!destination.exists());
    }

    #[test]
    fn chapter_shorter_than_a_tick() {
        let dir = tempfile::tempdir().unwrap();
        let source = video_source(&dir.path().join("source.mov"));

        // a positive interval that rounds to zero ticks at the chapter timescale
        let destination = dir.path().join("chapters.mov");
        let markers = [ChapterMarker::new("A", Time::zero(1)), ChapterMarker::new("B", Time::new(1, 10_000))];
        let mut stages = Vec::new();
        let err = run(
            &source,
            &destination,
            &markers,
            &ChapterConfig::DEFAULT,
            &WriteConfig::DEFAULT,
            &Mp4Finalizer,
            &mut |stage| {
                stages.push(stage);
                Ok(())
            },
        )
        .unwrap_err();

        assert!(matches!(err.kind, ErrorKind::InvalidTiming));
        assert_eq!(stages, [Stage::Opening, Stage::Planning, Stage::Building]);
        assert!(!destination.exists());
    }
}
