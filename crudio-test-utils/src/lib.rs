//! CRUD.io Test Utilities
//!
//! Shared test infrastructure for the workspace:
//! - A scripted mock transport with a request log
//! - A handler recorder for the callback API
//! - Proptest generators for node names, content types and records
//! - Envelope fixtures and custom assertions

pub use crudio_core::{
    CacheRecord, ContentMap, ContentType, CrudError, CrudResult, Delivered, Envelope, Handlers,
    Method, NodeKey, RawPayload, Rendered, Transport,
};

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ============================================================================
// MOCK TRANSPORT
// ============================================================================

/// Scripted outcome of a mock request.
#[derive(Debug, Clone, PartialEq)]
pub enum MockResponse {
    /// Resolve with this envelope (success or application failure).
    Envelope(Envelope),
    /// Resolve with a transport failure.
    TransportFailure(String),
}

/// A request observed by [`MockTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: Method,
    pub parameter: NodeKey,
}

/// In-memory transport answering from a script keyed by method and
/// canonical parameter. Unscripted requests fail at the transport level.
#[derive(Debug, Default)]
pub struct MockTransport {
    script: Mutex<HashMap<(Method, NodeKey), MockResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
    delay: Option<Duration>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every response, so concurrent callers overlap.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Script a response (builder form).
    pub fn on(self, method: Method, parameter: &str, response: MockResponse) -> Self {
        self.respond(method, parameter, response);
        self
    }

    /// Script or replace a response.
    pub fn respond(&self, method: Method, parameter: &str, response: MockResponse) {
        self.script
            .lock()
            .unwrap()
            .insert((method, NodeKey::new(parameter)), response);
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Every request seen so far, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Number of requests for one method and parameter.
    pub fn count_for(&self, method: Method, parameter: &str) -> usize {
        let key = NodeKey::new(parameter);
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.parameter == key)
            .count()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn request(&self, method: Method, parameter: &NodeKey) -> CrudResult<Envelope> {
        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            parameter: parameter.clone(),
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let scripted = self
            .script
            .lock()
            .unwrap()
            .get(&(method, parameter.clone()))
            .cloned();
        match scripted {
            Some(MockResponse::Envelope(envelope)) => Ok(envelope),
            Some(MockResponse::TransportFailure(reason)) => {
                Err(CrudError::TransportFailure { reason })
            }
            None => Err(CrudError::transport(format!(
                "no scripted response for {}/{}",
                method, parameter
            ))),
        }
    }
}

// ============================================================================
// HANDLER RECORDER
// ============================================================================

/// Collects everything delivered to the handlers it hands out.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    successes: Arc<Mutex<Vec<Delivered>>>,
    errors: Arc<Mutex<Vec<Rendered>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handlers with both slots recording into this recorder.
    pub fn handlers(&self) -> Handlers {
        let successes = Arc::clone(&self.successes);
        let errors = Arc::clone(&self.errors);
        Handlers::new()
            .on_success(move |d| successes.lock().unwrap().push(d))
            .on_error(move |r| errors.lock().unwrap().push(r))
    }

    /// Handlers with only the error slot filled.
    pub fn error_only(&self) -> Handlers {
        let errors = Arc::clone(&self.errors);
        Handlers::new().on_error(move |r| errors.lock().unwrap().push(r))
    }

    pub fn successes(&self) -> Vec<Delivered> {
        self.successes.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<Rendered> {
        self.errors.lock().unwrap().clone()
    }

    /// Escaped text of every error delivered.
    pub fn error_texts(&self) -> Vec<String> {
        self.errors().iter().map(|r| r.to_string()).collect()
    }
}

// ============================================================================
// TRACING
// ============================================================================

/// Install a test-writer subscriber once per process. Honors `RUST_LOG`.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for CRUD.io content types.

    use super::*;
    use proptest::prelude::*;

    /// Human-style node names: words separated by single spaces, mixed case.
    pub fn arb_node_name() -> impl Strategy<Value = String> {
        "[A-Za-z][A-Za-z0-9]{0,7}( [A-Za-z0-9]{1,8}){0,3}"
    }

    /// Strings that are empty or whitespace only.
    pub fn arb_blank_name() -> impl Strategy<Value = String> {
        "[ \t]{0,4}"
    }

    pub fn arb_content_type() -> impl Strategy<Value = ContentType> {
        prop_oneof![
            3 => Just(ContentType::Text),
            1 => Just(ContentType::Html),
            1 => Just(ContentType::Image),
            1 => Just(ContentType::Json),
        ]
    }

    /// Text payloads biased towards markup.
    pub fn arb_text_payload() -> impl Strategy<Value = String> {
        prop_oneof![
            "[ -~]{0,40}",
            "<[a-z]{1,6}>[ -~]{0,20}</[a-z]{1,6}>",
            Just("<script>alert('x')</script>".to_string()),
        ]
    }

    pub fn arb_cache_record() -> impl Strategy<Value = CacheRecord> {
        (arb_content_type(), arb_text_payload())
            .prop_map(|(content_type, payload)| CacheRecord::new(content_type, payload))
    }

    pub fn arb_content_map() -> impl Strategy<Value = ContentMap> {
        prop::collection::btree_map(
            arb_node_name().prop_map(|name| NodeKey::new(&name)),
            arb_cache_record(),
            0..8,
        )
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built envelopes and content for common scenarios.

    use super::*;

    pub const TEST_SERVER: &str = "http://localhost:1337";

    /// Content map from `(node name, record)` pairs.
    pub fn content(entries: &[(&str, CacheRecord)]) -> ContentMap {
        entries
            .iter()
            .map(|(name, record)| (NodeKey::new(name), record.clone()))
            .collect()
    }

    /// Successful envelope carrying `entries`.
    pub fn ok(entries: &[(&str, CacheRecord)]) -> MockResponse {
        MockResponse::Envelope(Envelope::ok(content(entries)))
    }

    /// Successful single-node envelope for a text node.
    pub fn text_node(name: &str, payload: &str) -> MockResponse {
        ok(&[(name, CacheRecord::text(payload))])
    }

    /// Application failure envelope.
    pub fn app_error(message: &str) -> MockResponse {
        MockResponse::Envelope(Envelope::failure(message))
    }

    pub fn transport_error() -> MockResponse {
        MockResponse::TransportFailure("connection reset".to_string())
    }

    /// A small landing-page collection.
    pub fn landing_collection() -> Vec<(&'static str, CacheRecord)> {
        vec![
            ("Home Page", CacheRecord::text("<h1>Welcome</h1>")),
            ("Footer", CacheRecord::text("(c) 2012 & beyond")),
            (
                "Logo",
                CacheRecord::new(
                    ContentType::Image,
                    serde_json::json!({ "src": "/img/logo.png", "alt": "<logo>" }),
                ),
            ),
        ]
    }
}

// ============================================================================
// ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions on rendered output.

    use super::*;

    /// Assert `rendered` is text equal to `expected`.
    #[track_caller]
    pub fn assert_text(rendered: &Rendered, expected: &str) {
        match rendered {
            Rendered::Text(text) => assert_eq!(text, expected),
            other => panic!("Expected text, got {:?}", other),
        }
    }

    /// Assert `delivered` is a rendered node with text `expected`.
    #[track_caller]
    pub fn assert_node_text(delivered: &Delivered, expected: &str) {
        match delivered {
            Delivered::Node(rendered) => assert_text(rendered, expected),
            other => panic!("Expected a node, got {:?}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_transport_answers_script() {
        let transport = MockTransport::new().on(
            Method::Read,
            "Home Page",
            fixtures::text_node("Home Page", "hi"),
        );

        let envelope = transport
            .request(Method::Read, &NodeKey::new("home-page"))
            .await
            .unwrap();
        assert!(envelope.success);
        assert_eq!(transport.count_for(Method::Read, "HOME PAGE"), 1);
    }

    #[tokio::test]
    async fn test_mock_transport_unscripted_is_transport_failure() {
        let transport = MockTransport::new();
        let err = transport
            .request(Method::Load, &NodeKey::new(""))
            .await
            .unwrap_err();
        assert!(matches!(err, CrudError::TransportFailure { .. }));
        assert_eq!(
            transport.requests(),
            vec![RecordedRequest {
                method: Method::Load,
                parameter: NodeKey::new(""),
            }]
        );
    }

    #[test]
    fn test_recorder_collects() {
        let recorder = Recorder::new();
        let handlers = recorder.handlers();
        (handlers.on_error.unwrap())(Rendered::Text("boom".into()));
        assert_eq!(recorder.error_texts(), vec!["boom".to_string()]);
        assert!(recorder.successes().is_empty());
    }
}
