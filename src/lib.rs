//! A library for adding QuickTime chapter tracks to MPEG-4 and QuickTime movies.
//!
//! Chapters are written as a disabled text track, optionally accompanied by a track of JPEG
//! thumbnails, which the primary track of the movie references with a `chap` track reference.
//! The media data of the source is copied without re-encoding.
//!
//! # Examples
//!
//! ## The easy way
//! ```no_run
//! use mp4chap::{ChapterConfig, ChapterMarker, Mp4Source, Time};
//!
//! let source = Mp4Source::open("talk.mp4").unwrap();
//! let markers = [
//!     ChapterMarker::new("Intro", Time::from_secs(0)),
//!     ChapterMarker::new("Setup", Time::from_millis(42_500)),
//!     ChapterMarker::new("Demo", Time::from_secs(120)),
//! ];
//!
//! mp4chap::add_chapters(&source, "talk-chapters.mp4", &markers, &ChapterConfig::DEFAULT).unwrap();
//!
//! let written = Mp4Source::open("talk-chapters.mp4").unwrap();
//! for chapter in written.read_chapters().unwrap() {
//!     println!("{chapter}");
//! }
//! ```
//!
//! ## In the background
//! ```no_run
//! use mp4chap::{AuthoringTask, ChapterConfig, ChapterMarker, Mp4Source, Time};
//!
//! let source = Mp4Source::open("talk.mp4").unwrap();
//! let markers = vec![ChapterMarker::new("Intro", Time::from_secs(0))];
//! let task = AuthoringTask::start(source, "talk-chapters.mp4", markers, ChapterConfig::DEFAULT);
//!
//! println!("{:?}", task.status());
//! task.wait().unwrap();
//! ```
//!
//! ## The hard way
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use mp4chap::{
//!     encode_text, Finalizer, Matrix, MediaType, Movie, Mp4Finalizer, SampleDescription,
//!     TextSampleEntry, Time, WriteConfig,
//! };
//!
//! let destination = Path::new("chapters.mov");
//! let mut movie = Movie::new(600, Matrix::IDENTITY).unwrap();
//! let text = movie.add_track(MediaType::Text, 600, None).unwrap();
//! movie.set_media_data_destination(text, destination).unwrap();
//!
//! let description = Arc::new(SampleDescription::Text(TextSampleEntry::default()));
//! let payload = encode_text("Intro", true).unwrap();
//! movie.append_sample(text, payload, &description, Time::zero(600), Time::from_secs(10)).unwrap();
//!
//! Mp4Finalizer.write_header(&movie, destination, &WriteConfig::DEFAULT).unwrap();
//! ```

#![warn(missing_docs)]

#[macro_use]
extern crate lazy_static;

pub use crate::atom::{
    ident, FileType, Fourcc, ImageSampleEntry, SampleDescription, TextBox, TextSampleEntry,
};
pub use crate::author::{add_chapters, add_chapters_with, Authored, Stage};
pub use crate::chapter::{plan_intervals, ChapterInterval, ChapterMarker};
pub use crate::config::{ChapterConfig, Language, WriteConfig};
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::finalize::{Finalizer, Mp4Finalizer};
pub use crate::link::{associate, select_primary, AssociationKind, ChapterAssociation};
pub use crate::movie::{Matrix, Movie};
pub use crate::sample::{decode_text, encode_text, Sample, TextPayload, UTF8_DECLARATION};
pub use crate::source::{Mp4Source, Source, SourceTrack};
pub use crate::task::{AuthoringTask, TaskStatus};
pub use crate::time::{DecodeTime, Time, TimeRange};
pub use crate::track::{MediaType, Track, TrackId};

mod atom;
mod author;
mod chapter;
mod config;
mod error;
mod finalize;
mod link;
mod movie;
mod sample;
mod source;
mod task;
mod time;
mod track;
