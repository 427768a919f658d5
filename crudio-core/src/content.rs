//! Content records as delivered by the Content Cloud.

use crate::identity::NodeKey;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Opaque payload; a string for textual nodes, any JSON value otherwise.
pub type RawPayload = serde_json::Value;

/// Content of a load or read response, keyed by canonical node key.
///
/// Wire keys are canonicalized while deserializing, so `"Home Page"` and
/// `"home-page"` land on the same entry (the later one wins).
pub type ContentMap = BTreeMap<NodeKey, CacheRecord>;

/// Declared type of a node's payload.
///
/// Only [`ContentType::Text`] has rendering behavior. The remaining variants
/// pass through the renderer untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ContentType {
    #[default]
    Text,
    Html,
    Image,
    Json,
    /// Any tag this client does not know about, kept verbatim.
    Other(String),
}

impl ContentType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Html => "html",
            Self::Image => "image",
            Self::Json => "json",
            Self::Other(tag) => tag,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text)
    }
}

impl From<String> for ContentType {
    fn from(tag: String) -> Self {
        match tag.trim() {
            "" | "text" => Self::Text,
            "html" => Self::Html,
            "image" => Self::Image,
            "json" => Self::Json,
            _ => Self::Other(tag),
        }
    }
}

impl From<&str> for ContentType {
    fn from(tag: &str) -> Self {
        Self::from(tag.to_string())
    }
}

impl From<ContentType> for String {
    fn from(content_type: ContentType) -> Self {
        match content_type {
            ContentType::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node's type tag and payload, exactly as the service sent it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    #[serde(rename = "type", default, deserialize_with = "deserialize_content_type")]
    pub content_type: ContentType,
    #[serde(default)]
    pub payload: RawPayload,
}

/// A null, empty or missing type tag means `text`.
fn deserialize_content_type<'de, D>(deserializer: D) -> Result<ContentType, D::Error>
where
    D: Deserializer<'de>,
{
    let tag = Option::<String>::deserialize(deserializer)?;
    Ok(tag.map(ContentType::from).unwrap_or_default())
}

impl CacheRecord {
    pub fn new(content_type: ContentType, payload: impl Into<RawPayload>) -> Self {
        Self {
            content_type,
            payload: payload.into(),
        }
    }

    /// Shorthand for a `text` record.
    pub fn text(payload: impl Into<String>) -> Self {
        Self::new(ContentType::Text, RawPayload::String(payload.into()))
    }
}
