//! Fuzz target for label line classification.
//!
//! Feeds arbitrary UTF-8 lines to the classifier with a class count taken
//! from the first byte, checking for panics, crashes, or hangs.
//!
//! Run with:
//!   cargo +nightly fuzz run label_line_classify

#![no_main]

use libfuzzer_sys::fuzz_target;
use yolocls::label::fuzz_classify_line;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let Some((&class_count, rest)) = data.split_first() else {
        return;
    };
    let Ok(line) = std::str::from_utf8(rest) else {
        return;
    };

    let _ = fuzz_classify_line(line, class_count as usize);
});
