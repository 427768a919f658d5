//! Node identifiers.
//!
//! CRUD.io node names are case-insensitive. A [`NodeKey`] holds the single
//! canonical form used both as the cache key and as the request parameter,
//! so a node cached by a load is always found again by a later lookup no
//! matter how the caller spelled it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator that replaces spaces in canonical keys.
pub const KEY_SEPARATOR: char = '-';

/// Canonical, case-folded node identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct NodeKey(String);

impl NodeKey {
    /// Canonicalize a raw node name: lowercase, every space becomes `-`.
    pub fn new(raw: &str) -> Self {
        let canonical = raw
            .chars()
            .map(|c| if c == ' ' { KEY_SEPARATOR } else { c })
            .flat_map(char::to_lowercase)
            .collect();
        Self(canonical)
    }

    /// Canonicalize, rejecting names that are empty or only whitespace.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self::new(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Percent-encoded form for use as a URL path segment.
    pub fn url_segment(&self) -> String {
        urlencoding::encode(&self.0).into_owned()
    }
}

impl From<String> for NodeKey {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<&str> for NodeKey {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<NodeKey> for String {
    fn from(key: NodeKey) -> Self {
        key.0
    }
}

impl AsRef<str> for NodeKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
