//! Property tests for rendering and key canonicalization.

use crudio_core::{
    escape_html, render, render_record, CacheRecord, ContentType, NodeKey, RawPayload, Rendered,
};
use serde_json::json;
use proptest::prelude::*;

fn non_text_type() -> impl Strategy<Value = ContentType> {
    prop_oneof![
        Just(ContentType::Html),
        Just(ContentType::Image),
        Just(ContentType::Json),
        "[a-z]{3,10}"
            .prop_filter("not a known tag", |s| {
                !matches!(s.as_str(), "text" | "html" | "image" | "json")
            })
            .prop_map(ContentType::Other),
    ]
}

proptest! {
    #[test]
    fn escaped_text_has_no_markup_characters(input in ".*") {
        let escaped = escape_html(&input);
        prop_assert!(!escaped.contains('<'));
        prop_assert!(!escaped.contains('>'));
        prop_assert!(!escaped.contains('"'));
        prop_assert!(!escaped.contains('\''));
    }

    #[test]
    fn every_ampersand_starts_an_entity(input in ".*") {
        let escaped = escape_html(&input);
        for (idx, _) in escaped.match_indices('&') {
            let rest = &escaped[idx..];
            prop_assert!(
                rest.starts_with("&amp;")
                    || rest.starts_with("&lt;")
                    || rest.starts_with("&gt;")
                    || rest.starts_with("&quot;")
                    || rest.starts_with("&#x27;")
            );
        }
    }

    #[test]
    fn markup_free_text_is_unchanged(input in "[a-zA-Z0-9 .,:;!?/-]*") {
        let rendered = render(&RawPayload::String(input.clone()), None);
        prop_assert_eq!(rendered, Rendered::Text(input));
    }

    #[test]
    fn non_text_payload_is_untouched(content_type in non_text_type(), body in ".*") {
        let payload = RawPayload::String(body);
        let rendered = render(&payload, Some(&content_type));
        prop_assert_eq!(
            rendered,
            Rendered::Passthrough { content_type, payload }
        );
    }

    #[test]
    fn canonical_key_is_idempotent(raw in "[a-zA-Z0-9 _-]{0,24}") {
        let once = NodeKey::new(&raw);
        let twice = NodeKey::new(once.as_str());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn canonical_key_has_no_spaces_or_uppercase(raw in "[a-zA-Z0-9 ]{0,24}") {
        let key = NodeKey::new(&raw);
        prop_assert!(!key.as_str().contains(' '));
        prop_assert!(!key.as_str().chars().any(|c| c.is_ascii_uppercase()));
    }

    #[test]
    fn url_segment_is_path_safe(raw in ".{0,24}") {
        let segment = NodeKey::new(&raw).url_segment();
        prop_assert!(!segment.contains('/'));
        prop_assert!(!segment.contains('?'));
        prop_assert!(!segment.contains('#'));
        prop_assert!(!segment.contains(' '));
    }

    #[test]
    fn blank_or_null_type_tag_renders_escaped(
        tag in prop_oneof![Just(json!(null)), Just(json!("")), "[ \t]{1,3}".prop_map(|t| json!(t))],
        body in ".*",
    ) {
        let record: CacheRecord =
            serde_json::from_value(json!({ "type": tag, "payload": body.clone() })).unwrap();
        prop_assert_eq!(&record.content_type, &ContentType::Text);
        prop_assert_eq!(render_record(&record), Rendered::Text(escape_html(&body)));
    }
}
