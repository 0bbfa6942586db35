//! Running the authoring pipeline off the calling thread.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use tracing::{debug, error};

use crate::author::{self, Authored, Stage};
use crate::{ChapterConfig, ChapterMarker, ErrorKind, Mp4Finalizer, Mp4Source, WriteConfig};

/// The state of an [`AuthoringTask`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskStatus {
    /// The task is executing a stage.
    Running(Stage),
    /// The destination was written.
    Completed,
    /// The task failed, nothing was committed.
    Failed,
    /// The task was cancelled before it committed.
    Cancelled,
}

impl TaskStatus {
    /// Returns `true` for the final states.
    pub fn is_done(&self) -> bool {
        !matches!(self, Self::Running(_))
    }
}

#[derive(Debug)]
struct Worktable {
    cancelled: AtomicBool,
    status: Mutex<TaskStatus>,
}

impl Worktable {
    fn set_status(&self, status: TaskStatus) {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner) = status;
    }

    fn status(&self) -> TaskStatus {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A handle to chapters being added on a worker thread.
///
/// The handle is owned by the caller, there is no global task state. Cancellation is checked
/// between stages and right before the destination is written. Once writing started the task
/// runs to completion.
#[derive(Debug)]
pub struct AuthoringTask {
    worktable: Arc<Worktable>,
    handle: JoinHandle<crate::Result<Authored>>,
}

impl AuthoringTask {
    /// Starts adding chapters to a copy of `source`, see [`crate::add_chapters`].
    pub fn start(
        source: Mp4Source,
        destination: impl Into<PathBuf>,
        markers: Vec<ChapterMarker>,
        cfg: ChapterConfig,
    ) -> Self {
        Self::start_with(source, destination, markers, cfg, WriteConfig::DEFAULT)
    }

    /// Like [`Self::start`], with control over how the destination is written.
    pub fn start_with(
        source: Mp4Source,
        destination: impl Into<PathBuf>,
        markers: Vec<ChapterMarker>,
        cfg: ChapterConfig,
        write_cfg: WriteConfig,
    ) -> Self {
        let worktable = Arc::new(Worktable {
            cancelled: AtomicBool::new(false),
            status: Mutex::new(TaskStatus::Running(Stage::Opening)),
        });
        Self::spawn(worktable, source, destination.into(), markers, cfg, write_cfg)
    }

    fn spawn(
        worktable: Arc<Worktable>,
        source: Mp4Source,
        destination: PathBuf,
        markers: Vec<ChapterMarker>,
        cfg: ChapterConfig,
        write_cfg: WriteConfig,
    ) -> Self {
        let table = Arc::clone(&worktable);
        let handle = thread::spawn(move || {
            let mut hook = |stage: Stage| {
                if table.cancelled.load(Ordering::Acquire) {
                    return Err(crate::Error::new(
                        ErrorKind::Cancelled,
                        format!("Cancelled before {stage}"),
                    ));
                }
                table.set_status(TaskStatus::Running(stage));
                debug!(%stage, "entering stage");
                Ok(())
            };

            let res = author::run(
                &source,
                &destination,
                &markers,
                &cfg,
                &write_cfg,
                &Mp4Finalizer,
                &mut hook,
            );
            match &res {
                Ok(_) => table.set_status(TaskStatus::Completed),
                Err(e) if matches!(e.kind, ErrorKind::Cancelled) => {
                    table.set_status(TaskStatus::Cancelled)
                }
                Err(e) => {
                    error!(destination = %destination.display(), "adding chapters failed: {e}");
                    table.set_status(TaskStatus::Failed);
                }
            }
            res
        });

        Self { worktable, handle }
    }

    /// Requests cancellation. Has no effect once the destination is being written.
    pub fn cancel(&self) {
        self.worktable.cancelled.store(true, Ordering::Release);
    }

    /// Returns the current state of the task.
    pub fn status(&self) -> TaskStatus {
        self.worktable.status()
    }

    /// Returns `true` once the task stopped. [`Self::wait`] won't block then.
    pub fn is_done(&self) -> bool {
        self.status().is_done()
    }

    /// Blocks until the task finished and returns its result.
    pub fn wait(self) -> crate::Result<Authored> {
        match self.handle.join() {
            Ok(res) => res,
            Err(_) => {
                self.worktable.set_status(TaskStatus::Failed);
                Err(crate::Error::new(ErrorKind::FinalizationFailed, "The authoring thread panicked"))
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Finalizer, Fourcc, Matrix, MediaType, Movie, SampleDescription, Time};

    fn fixture(path: &std::path::Path) -> Mp4Source {
        let mut movie = Movie::new(600, Matrix::IDENTITY).unwrap();
        let audio = movie.add_track(MediaType::Audio, 600, None).unwrap();
        movie.set_media_data_destination(audio, path).unwrap();
        movie.track_mut(audio).unwrap().set_enabled(true);

        let desc = Arc::new(SampleDescription::Other { fourcc: Fourcc(*b"mp4a"), data: vec![] });
        movie.append_sample(audio, vec![1; 16], &desc, Time::zero(1), Time::from_secs(10)).unwrap();
        Mp4Finalizer.write_header(&movie, path, &WriteConfig::DEFAULT).unwrap();
        Mp4Source::open(path).unwrap()
    }

    #[test]
    fn completes() {
        let dir = tempfile::tempdir().unwrap();
        let source = fixture(&dir.path().join("source.mov"));
        let destination = dir.path().join("chapters.mov");

        let markers = vec![ChapterMarker::new("Only", Time::zero(1))];
        let task = AuthoringTask::start(source, &destination, markers, ChapterConfig::DEFAULT);
        let worktable = Arc::clone(&task.worktable);
        let authored = task.wait().unwrap();

        assert_eq!(worktable.status(), TaskStatus::Completed);
        assert_eq!(authored.intervals.len(), 1);
        assert!(destination.exists());
    }

    #[test]
    fn cancelled_before_start() {
        let dir = tempfile::tempdir().unwrap();
        let source = fixture(&dir.path().join("source.mov"));
        let destination = dir.path().join("chapters.mov");

        let worktable = Arc::new(Worktable {
            cancelled: AtomicBool::new(true),
            status: Mutex::new(TaskStatus::Running(Stage::Opening)),
        });
        let markers = vec![ChapterMarker::new("Only", Time::zero(1))];
        let task = AuthoringTask::spawn(
            Arc::clone(&worktable),
            source,
            destination.clone(),
            markers,
            ChapterConfig::DEFAULT,
            WriteConfig::DEFAULT,
        );

        let err = task.wait().unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Cancelled));
        assert!(err.is_collaborator_error());
        assert_eq!(worktable.status(), TaskStatus::Cancelled);
        assert!(worktable.status().is_done());
        assert!(!destination.exists());
    }

    #[test]
    fn failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let source = fixture(&dir.path().join("source.mov"));
        let destination = dir.path().join("chapters.mov");

        let markers = vec![
            ChapterMarker::new("A", Time::zero(1)),
            ChapterMarker::new("B", Time::zero(1)),
        ];
        let task = AuthoringTask::start(source, &destination, markers, ChapterConfig::DEFAULT);
        let worktable = Arc::clone(&task.worktable);
        let err = task.wait().unwrap_err();

        assert!(matches!(err.kind, ErrorKind::InvalidDuration));
        assert_eq!(worktable.status(), TaskStatus::Failed);
        assert!(!destination.exists());
    }
}
