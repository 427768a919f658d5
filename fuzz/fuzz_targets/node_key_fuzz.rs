//! Fuzz target for node key canonicalization.
//!
//! Run with: cargo +nightly fuzz run node_key_fuzz -- -max_total_time=60

#![no_main]

use crudio_core::NodeKey;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    let key = NodeKey::new(input);
    assert!(!key.as_str().contains(' '));
    assert_eq!(NodeKey::new(key.as_str()), key, "canonicalization is idempotent");

    let segment = key.url_segment();
    assert!(!segment.contains('/'));
    assert!(!segment.contains('?'));
    assert!(!segment.contains('#'));

    assert_eq!(NodeKey::parse(input).is_none(), input.trim().is_empty());
});
