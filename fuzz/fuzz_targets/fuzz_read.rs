#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut reader = std::io::Cursor::new(data);
    if let Ok(source) = mp4chap::Mp4Source::read_from(&mut reader) {
        _ = source.read_chapters_from(&mut reader);
    }
});
