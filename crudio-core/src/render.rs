//! Output renderer.
//!
//! Turns a raw payload plus its type tag into a value that is safe to hand
//! to display code. Text is HTML-escaped; this is the only XSS barrier in
//! the client, so `text` payloads are never returned unescaped.

use crate::content::{CacheRecord, ContentType, RawPayload};
use serde::Serialize;
use std::fmt;

/// A display-ready payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Rendered {
    /// Escaped text.
    Text(String),
    /// Non-text payload, returned exactly as received.
    Passthrough {
        content_type: ContentType,
        payload: RawPayload,
    },
}

impl Rendered {
    /// The escaped text, if this was rendered as `text`.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Passthrough { .. } => None,
        }
    }

    pub fn content_type(&self) -> ContentType {
        match self {
            Self::Text(_) => ContentType::Text,
            Self::Passthrough { content_type, .. } => content_type.clone(),
        }
    }
}

impl fmt::Display for Rendered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Passthrough { payload, .. } => write!(f, "{}", payload),
        }
    }
}

/// Render a payload according to its declared type. `None` or a blank tag
/// means `text`.
pub fn render(payload: &RawPayload, content_type: Option<&ContentType>) -> Rendered {
    match content_type {
        Some(other) if !renders_as_text(other) => Rendered::Passthrough {
            content_type: other.clone(),
            payload: payload.clone(),
        },
        _ => {
            let text = match payload {
                RawPayload::String(s) => escape_html(s),
                RawPayload::Null => String::new(),
                other => escape_html(&other.to_string()),
            };
            Rendered::Text(text)
        }
    }
}

fn renders_as_text(content_type: &ContentType) -> bool {
    match content_type {
        ContentType::Text => true,
        ContentType::Other(tag) => tag.trim().is_empty(),
        _ => false,
    }
}

/// Render a plain message as `text`.
pub fn render_text(message: &str) -> Rendered {
    Rendered::Text(escape_html(message))
}

/// Render a cached record with its recorded type.
pub fn render_record(record: &CacheRecord) -> Rendered {
    render(&record.payload, Some(&record.content_type))
}

/// Escape `&`, `<`, `>`, `"` and `'` for safe inclusion in HTML.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + input.len() / 8);
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
