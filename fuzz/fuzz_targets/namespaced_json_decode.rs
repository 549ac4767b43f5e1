//! Fuzz target for namespaced IDS JSON decoding.

#![no_main]

use idskit::ir::io_namespaced_json::{
    encode_namespaced_json, from_namespaced_json_slice, fuzz_leaf_text,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Cap input size to avoid excessive memory usage.
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    if let Ok(doc) = from_namespaced_json_slice(data) {
        let _ = encode_namespaced_json(&doc);
    }
    if let Ok(tree) = serde_json::from_slice::<serde_json::Value>(data) {
        let _ = fuzz_leaf_text(&tree);
    }
});
