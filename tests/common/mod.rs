use std::path::Path;
use std::sync::Arc;

use mp4chap::{
    FileType, Finalizer, Fourcc, Language, Matrix, MediaType, Movie, Mp4Finalizer,
    SampleDescription, TextSampleEntry, Time, WriteConfig,
};

/// Writes a movie of `secs` seconds with one enabled track per media type. Every track holds
/// one 100 byte sample per second, filled with the track index and the sample index.
pub fn write_fixture(path: &Path, media: &[MediaType], secs: i64) {
    let mut movie = Movie::new(600, Matrix::IDENTITY).unwrap();

    for (i, media_type) in media.iter().enumerate() {
        let id = movie.add_track(*media_type, 600, Some(Language::new("eng").unwrap())).unwrap();
        movie.set_media_data_destination(id, path).unwrap();

        let track = movie.track_mut(id).unwrap();
        track.set_enabled(true);
        if *media_type == MediaType::Video {
            track.set_dimensions(320, 180).unwrap();
        }

        let other = |fourcc: &[u8; 4]| SampleDescription::Other {
            fourcc: Fourcc(*fourcc),
            data: vec![0; 8],
        };
        let desc = Arc::new(match media_type {
            MediaType::Video => other(b"avc1"),
            MediaType::Audio => other(b"mp4a"),
            MediaType::Text => SampleDescription::Text(TextSampleEntry::default()),
            MediaType::Other(_) => other(b"tmcd"),
        });
        for s in 0..secs {
            let payload = vec![i as u8, s as u8].repeat(50);
            movie.append_sample(id, payload, &desc, Time::from_secs(s), Time::from_secs(1)).unwrap();
        }
    }

    let cfg = WriteConfig::DEFAULT.file_type(FileType::mp4());
    Mp4Finalizer.write_header(&movie, path, &cfg).unwrap();
}

#[allow(dead_code)]
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
