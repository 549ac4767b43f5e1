//! Fuzz target for IDS XML decoding.
//!
//! This fuzzer feeds arbitrary byte sequences to the XML decoder and
//! re-encodes whatever it accepts, checking for panics, crashes, or hangs.

#![no_main]

use idskit::ir::io_ids_xml::{decode_xml_slice, encode_xml};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Cap input size to avoid excessive memory usage.
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    if let Ok(doc) = decode_xml_slice(data) {
        let _ = encode_xml(&doc);
    }
});
