//! Fuzz target for payload rendering.
//!
//! Feeds arbitrary strings and JSON documents through `render` and checks
//! that text output never carries raw markup characters.
//!
//! Run with: cargo +nightly fuzz run render_fuzz -- -max_total_time=60

#![no_main]

use crudio_core::{render, ContentType, RawPayload};
use libfuzzer_sys::fuzz_target;

fn assert_escaped(text: &str) {
    assert!(!text.contains('<'), "raw '<' in {:?}", text);
    assert!(!text.contains('>'), "raw '>' in {:?}", text);
    assert!(!text.contains('"'), "raw '\"' in {:?}", text);
    assert!(!text.contains('\''), "raw '\\'' in {:?}", text);
}

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    let payload = RawPayload::String(input.to_string());
    let rendered = render(&payload, Some(&ContentType::Text));
    assert_escaped(rendered.as_text().expect("text content renders to text"));

    if let Ok(json) = serde_json::from_str::<RawPayload>(input) {
        let rendered = render(&json, None);
        assert_escaped(rendered.as_text().expect("untyped content renders to text"));

        let passthrough = render(&json, Some(&ContentType::Image));
        assert!(passthrough.as_text().is_none());
    }
});
