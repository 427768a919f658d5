//! HTTP transport for the Content Cloud.

use crate::config::ClientConfig;
use async_trait::async_trait;
use crudio_core::{ConfigError, CrudError, CrudResult, Envelope, Method, NodeKey, Transport};
use reqwest::header::{HeaderValue, CACHE_CONTROL};

/// Issues `GET <server>/<method>/<node>` and decodes the JSON envelope.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    timeout_ms: u64,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> CrudResult<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                field: "server",
                reason: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: config.server.trim().trim_end_matches('/').to_string(),
            timeout_ms: config.request_timeout_ms,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request URL for `method` on an already canonical parameter.
    pub fn url_for(&self, method: Method, parameter: &NodeKey) -> String {
        format!("{}/{}/{}", self.base_url, method, parameter.url_segment())
    }

    async fn parse_response(&self, response: reqwest::Response) -> CrudResult<Envelope> {
        let status = response.status();
        if status.is_success() {
            return response.json::<Envelope>().await.map_err(|e| {
                CrudError::transport(format!("Failed to decode response: {}", e))
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| CrudError::transport(format!("HTTP {}: {}", status.as_u16(), e)))?;
        // Application failures are still envelopes, whatever the status code.
        if let Ok(envelope) = serde_json::from_str::<Envelope>(&text) {
            if !envelope.success {
                return Ok(envelope);
            }
        }
        Err(CrudError::transport(format!(
            "HTTP {}: {}",
            status.as_u16(),
            text
        )))
    }

    fn request_error(&self, err: reqwest::Error) -> CrudError {
        if err.is_timeout() {
            CrudError::transport(format!("request timed out after {}ms", self.timeout_ms))
        } else {
            CrudError::transport(format!("HTTP request failed: {}", err))
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(&self, method: Method, parameter: &NodeKey) -> CrudResult<Envelope> {
        let url = self.url_for(method, parameter);
        tracing::debug!(%method, %url, "Sending content cloud request");

        let response = self
            .client
            .get(&url)
            .header(CACHE_CONTROL, HeaderValue::from_static("no-cache"))
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        self.parse_response(response).await
    }
}
