//! Transport contract.
//!
//! The content client reaches the Content Cloud only through [`Transport`].
//! A transport issues one request per call and resolves exactly once: with
//! the decoded [`Envelope`], or with [`CrudError::TransportFailure`] when
//! the request never produced one (connect error, timeout, undecodable body).

use crate::content::ContentMap;
use crate::error::{CrudError, CrudResult};
use crate::identity::NodeKey;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Remote operation requested from the Content Cloud.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Bulk fetch of a collection.
    Load,
    /// Single node fetch.
    Read,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Read => "read",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured error body of an application failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

/// Response envelope shared by `load` and `read`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ContentMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl Envelope {
    pub fn ok(content: ContentMap) -> Self {
        Self {
            success: true,
            content: Some(content),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            content: None,
            error: Some(ErrorBody {
                message: message.into(),
            }),
        }
    }

    /// Unwrap the content map, turning `success: false` into
    /// [`CrudError::ApplicationFailure`]. A successful envelope without
    /// content yields an empty map.
    pub fn into_content(self) -> CrudResult<ContentMap> {
        if self.success {
            Ok(self.content.unwrap_or_default())
        } else {
            let message = self
                .error
                .map(|e| e.message)
                .unwrap_or_else(|| "Unknown content cloud error".to_string());
            Err(CrudError::ApplicationFailure { message })
        }
    }
}

/// Request executor for the Content Cloud.
///
/// `parameter` is already canonical; implementations only have to make it
/// safe for their wire format (e.g. percent-encode it into a URL).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(&self, method: Method, parameter: &NodeKey) -> CrudResult<Envelope>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::CacheRecord;
    use serde_json::json;

    #[test]
    fn test_method_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Method::Load).unwrap(), json!("load"));
        assert_eq!(Method::Read.to_string(), "read");
    }

    #[test]
    fn test_success_envelope_decodes() {
        let envelope: Envelope = serde_json::from_value(json!({
            "success": true,
            "content": { "Home Page": { "type": "text", "payload": "<b>hi</b>" } }
        }))
        .unwrap();

        let content = envelope.into_content().unwrap();
        assert_eq!(
            content.get(&NodeKey::new("home page")),
            Some(&CacheRecord::text("<b>hi</b>"))
        );
    }

    #[test]
    fn test_untyped_nodes_do_not_break_the_envelope() {
        let envelope: Envelope = serde_json::from_value(json!({
            "success": true,
            "content": {
                "a": { "type": "text", "payload": "one" },
                "b": { "type": null, "payload": "<two>" },
                "c": { "type": "", "payload": "three" }
            }
        }))
        .unwrap();

        let content = envelope.into_content().unwrap();
        assert_eq!(content.len(), 3);
        assert_eq!(content[&NodeKey::new("b")], CacheRecord::text("<two>"));
        assert_eq!(content[&NodeKey::new("c")], CacheRecord::text("three"));
    }

    #[test]
    fn test_failure_envelope_is_application_failure() {
        let envelope: Envelope = serde_json::from_value(json!({
            "success": false,
            "error": { "message": "bad collection" }
        }))
        .unwrap();

        assert_eq!(
            envelope.into_content(),
            Err(CrudError::application("bad collection"))
        );
    }

    #[test]
    fn test_failure_without_body_still_fails() {
        let envelope = Envelope {
            success: false,
            content: None,
            error: None,
        };
        assert!(matches!(
            envelope.into_content(),
            Err(CrudError::ApplicationFailure { .. })
        ));
    }

    #[test]
    fn test_success_without_content_is_empty() {
        let envelope: Envelope = serde_json::from_value(json!({ "success": true })).unwrap();
        assert!(envelope.into_content().unwrap().is_empty());
    }
}
