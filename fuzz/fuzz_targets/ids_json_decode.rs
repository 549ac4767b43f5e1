//! Fuzz target for flat IDS JSON parsing.
//!
//! Feeds arbitrary bytes to the flat JSON reader and re-serializes whatever
//! it accepts, checking for panics, crashes, or hangs.

#![no_main]

use idskit::ir::io_json::{from_json_slice, to_json_string};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    if let Ok(doc) = from_json_slice(data) {
        let _ = to_json_string(&doc);
    }
});
