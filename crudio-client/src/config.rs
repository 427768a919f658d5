//! Client configuration.
//!
//! Only `server` is required. Keys the client does not recognize are kept in
//! [`ClientConfig::extensions`] untouched so host code can carry its own
//! settings alongside.

use crudio_core::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Request timeout applied when none is configured.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base endpoint of the Content Cloud, e.g. `https://cloud.crud.io/acme`.
    pub server: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Collection loaded when `load` is called without one.
    #[serde(default)]
    pub default_collection: Option<String>,
    /// Share one in-flight request among concurrent `get`s of the same node.
    #[serde(default)]
    pub coalesce_requests: bool,
    /// Store nodes fetched by `get` so later calls are cache hits.
    #[serde(default = "default_true")]
    pub populate_cache_on_get: bool,
    #[serde(flatten)]
    pub extensions: BTreeMap<String, serde_json::Value>,
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

fn default_true() -> bool {
    true
}

impl ClientConfig {
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            default_collection: None,
            coalesce_requests: false,
            populate_cache_on_get: true,
            extensions: BTreeMap::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_default_collection(mut self, collection: impl Into<String>) -> Self {
        self.default_collection = Some(collection.into());
        self
    }

    pub fn with_coalescing(mut self, enabled: bool) -> Self {
        self.coalesce_requests = enabled;
        self
    }

    pub fn with_cache_on_get(mut self, enabled: bool) -> Self {
        self.populate_cache_on_get = enabled;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: ClientConfig = toml::from_str(contents).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            reason: format!("{}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let server = self.server.trim();
        if server.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "server",
                reason: "must not be empty".to_string(),
            });
        }
        if !(server.starts_with("http://") || server.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "server",
                reason: "must be an http:// or https:// URL".to_string(),
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_ms",
                reason: "must be > 0".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let config = ClientConfig::from_toml_str(r#"server = "http://localhost:1337""#).unwrap();
        assert_eq!(config.request_timeout_ms, DEFAULT_REQUEST_TIMEOUT_MS);
        assert!(config.populate_cache_on_get);
        assert!(!config.coalesce_requests);
        assert!(config.default_collection.is_none());
        assert!(config.extensions.is_empty());
    }

    #[test]
    fn test_unknown_keys_pass_through() {
        let config = ClientConfig::from_toml_str(
            r#"
            server = "https://cloud.crud.io"
            default_collection = "landing"
            theme = "dark"
            retries = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.default_collection.as_deref(), Some("landing"));
        assert_eq!(config.extensions["theme"], serde_json::json!("dark"));
        assert_eq!(config.extensions["retries"], serde_json::json!(3));
    }

    #[test]
    fn test_requires_server() {
        let err = ClientConfig::new("  ").validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "server", .. }));
    }

    #[test]
    fn test_requires_http_scheme() {
        let err = ClientConfig::new("ftp://cloud").validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "server", .. }));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let config = ClientConfig::new("http://localhost").with_timeout(Duration::ZERO);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                field: "request_timeout_ms",
                ..
            })
        ));
    }

    #[test]
    fn test_oversized_timeout_saturates() {
        let config = ClientConfig::new("http://localhost").with_timeout(Duration::MAX);
        assert_eq!(config.request_timeout_ms, u64::MAX);

        let config = ClientConfig::new("http://localhost").with_timeout(Duration::from_secs(2));
        assert_eq!(config.request_timeout_ms, 2_000);
    }

    #[test]
    fn test_parse_error_is_reported() {
        let err = ClientConfig::from_toml_str("server = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ClientConfig::from_path(Path::new("/nonexistent/crudio.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crudio.toml");
        std::fs::write(&path, "server = \"http://localhost:1337\"\ncoalesce_requests = true\n")
            .unwrap();

        let config = ClientConfig::from_path(&path).unwrap();
        assert!(config.coalesce_requests);
    }
}
