//! Fuzz target for the sniffing import path.

#![no_main]

use idskit::conversion::import_text;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    if let Ok(text) = std::str::from_utf8(data) {
        let _ = import_text(text);
    }
});
