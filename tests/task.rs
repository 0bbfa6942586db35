use mp4chap::{
    AuthoringTask, ChapterConfig, ChapterMarker, ErrorKind, MediaType, Mp4Source, TaskStatus, Time,
};

mod common;

#[test]
fn background_authoring() {
    common::init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("source.mp4");
    common::write_fixture(&path, &[MediaType::Video, MediaType::Audio], 12);

    let source = Mp4Source::open(&path).unwrap();
    let destination = dir.path().join("chapters.mp4");
    let markers = vec![
        ChapterMarker::new("Intro", Time::from_secs(0)),
        ChapterMarker::new("Outro", Time::from_secs(9)),
    ];
    let task = AuthoringTask::start(source, &destination, markers, ChapterConfig::DEFAULT);
    let authored = task.wait().unwrap();
    assert_eq!(authored.intervals.len(), 2);

    let chapters = Mp4Source::open(&destination).unwrap().read_chapters().unwrap();
    let titles: Vec<_> = chapters.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, ["Intro", "Outro"]);
}

#[test]
fn cancel_never_leaves_a_partial_file() {
    common::init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("source.mp4");
    common::write_fixture(&path, &[MediaType::Video], 30);

    let source = Mp4Source::open(&path).unwrap();
    let destination = dir.path().join("chapters.mp4");
    let markers = vec![ChapterMarker::new("Only", Time::from_secs(0))];
    let task = AuthoringTask::start(source, &destination, markers, ChapterConfig::DEFAULT);
    task.cancel();

    // the task may have started writing before the request arrived
    match task.wait() {
        Ok(_) => {
            let written = Mp4Source::open(&destination).unwrap();
            assert_eq!(written.read_chapters().unwrap().len(), 1);
        }
        Err(e) => {
            assert!(matches!(e.kind, ErrorKind::Cancelled));
            assert!(!destination.exists());
        }
    }
}

#[test]
fn failed_status() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("source.mp4");
    common::write_fixture(&path, &[MediaType::Text], 5);

    let source = Mp4Source::open(&path).unwrap();
    let destination = dir.path().join("chapters.mp4");
    let markers = vec![ChapterMarker::new("Only", Time::from_secs(0))];
    let task = AuthoringTask::start(source, &destination, markers, ChapterConfig::DEFAULT);

    while !task.is_done() {
        std::thread::yield_now();
    }
    assert_eq!(task.status(), TaskStatus::Failed);
    let err = task.wait().unwrap_err();
    assert!(matches!(err.kind, ErrorKind::NoPrimaryTrack));
    assert!(!destination.exists());
}
