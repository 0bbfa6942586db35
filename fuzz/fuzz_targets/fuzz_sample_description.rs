#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(description) = mp4chap::SampleDescription::decode(data) {
        _ = description.encode();
    }
});
