use std::process::ExitCode;

use mp4chap::{ChapterConfig, ChapterMarker, Mp4Source, Time};

/// Adds chapters to a copy of a movie.
///
/// ```text
/// cargo run --example add_chapters -- talk.mp4 talk-chapters.mp4 0=Intro 42.5=Setup 120=Demo
/// ```
fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [source, destination, markers @ ..] = args.as_slice() else {
        eprintln!("usage: add_chapters <source> <destination> <secs=title>...");
        return ExitCode::FAILURE;
    };

    let mut chapters = Vec::with_capacity(markers.len());
    for m in markers {
        let Some((secs, title)) = m.split_once('=') else {
            eprintln!("invalid marker '{m}', expected <secs=title>");
            return ExitCode::FAILURE;
        };
        let Ok(secs) = secs.parse::<f64>() else {
            eprintln!("invalid start time '{secs}'");
            return ExitCode::FAILURE;
        };
        chapters.push(ChapterMarker::new(title, Time::from_secs_f64(secs, 1000)));
    }

    let source = Mp4Source::open(source).expect("error reading source");
    match mp4chap::add_chapters(&source, destination, &chapters, &ChapterConfig::DEFAULT) {
        Ok(authored) => {
            for i in authored.intervals {
                println!("{i}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
