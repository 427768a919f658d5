//! Content access layer.
//!
//! [`ContentClient`] owns one node cache and one transport for its whole
//! lifetime. Lookups always consult the cache first:
//!
//! - [`ContentClient::read`] never touches the network. A miss yields a
//!   rendered placeholder telling the caller the node was not loaded.
//! - [`ContentClient::get`] falls back to a single-node `read` request on a
//!   miss.
//! - [`ContentClient::load`] fetches a whole collection and merges it into
//!   the cache.
//!
//! Every API has exactly one failure channel. `load` and `get` return
//! `Err(CrudError)`; `load_with` and `get_with` hand failures to the
//! resolved error handler and return nothing.

use std::sync::Arc;

use crudio_cache::{CacheStats, NodeCache};
use crudio_core::render::render_record;
use crudio_core::{
    render_text, unloaded_node_message, CacheRecord, ContentMap, CrudError, CrudResult,
    Delivered, Envelope, Handlers, Method, NodeKey, Rendered, Transport,
};
use futures_util::FutureExt;
use tokio::task::JoinHandle;

use crate::config::ClientConfig;
use crate::http::HttpTransport;
use crate::inflight::InFlight;

struct ClientInner {
    config: ClientConfig,
    cache: NodeCache,
    transport: Arc<dyn Transport>,
    handlers: Handlers,
    in_flight: InFlight,
}

/// Read-through client for the Content Cloud. Cheap to clone; clones share
/// the cache.
#[derive(Clone)]
pub struct ContentClient {
    inner: Arc<ClientInner>,
}

impl ContentClient {
    /// Build a client without loading anything.
    pub fn new(config: ClientConfig, transport: Arc<dyn Transport>) -> CrudResult<Self> {
        Self::with_handlers(config, transport, Handlers::new())
    }

    /// Build a client whose instance handlers sit between per-call handlers
    /// and the process defaults.
    pub fn with_handlers(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        handlers: Handlers,
    ) -> CrudResult<Self> {
        config.validate()?;
        Ok(Self {
            inner: Arc::new(ClientInner {
                config,
                cache: NodeCache::new(),
                transport,
                handlers,
                in_flight: InFlight::default(),
            }),
        })
    }

    /// Build a client over [`HttpTransport`].
    pub fn http(config: ClientConfig, handlers: Handlers) -> CrudResult<Self> {
        let transport = HttpTransport::new(&config)?;
        Self::with_handlers(config, Arc::new(transport), handlers)
    }

    /// Build a client and immediately start the initial collection load in
    /// the background.
    ///
    /// The cache stays empty or partial until the returned task finishes;
    /// its outcome goes to the instance handlers. Must be called from within
    /// a tokio runtime.
    pub fn connect(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        handlers: Handlers,
    ) -> CrudResult<(Self, JoinHandle<()>)> {
        let client = Self::with_handlers(config, transport, handlers)?;
        let initial_load = client.spawn_load(None);
        Ok((client, initial_load))
    }

    /// Run `load_with` on a background task using the instance handlers.
    pub fn spawn_load(&self, collection: Option<String>) -> JoinHandle<()> {
        let client = self.clone();
        tokio::spawn(async move {
            client
                .load_with(collection.as_deref(), Handlers::new())
                .await;
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    // ------------------------------------------------------------------------
    // Cache-only access
    // ------------------------------------------------------------------------

    /// Render a cached node, or the "not loaded" placeholder on a miss.
    /// Never issues a request.
    pub fn read(&self, node: &str) -> Rendered {
        let key = NodeKey::new(node);
        match self.inner.cache.get(&key) {
            Some(record) => {
                tracing::debug!(node = %key, "Cache hit");
                render_record(&record)
            }
            None => {
                tracing::debug!(node = %key, "Read of unloaded node");
                render_text(&unloaded_node_message(node))
            }
        }
    }

    /// Whether `node` is cached.
    pub fn is_cached(&self, node: &str) -> bool {
        self.inner.cache.has(&NodeKey::new(node))
    }

    pub fn cached_keys(&self) -> Vec<NodeKey> {
        self.inner.cache.keys()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.inner.cache.stats()
    }

    // ------------------------------------------------------------------------
    // Remote-fallback access
    // ------------------------------------------------------------------------

    /// Rendered payload of `node`, fetched with a `read` request on a miss.
    pub async fn get(&self, node: &str) -> CrudResult<Rendered> {
        let key = NodeKey::parse(node).ok_or(CrudError::InvalidArgument { field: "node" })?;

        if let Some(record) = self.inner.cache.get(&key) {
            tracing::debug!(node = %key, "Cache hit");
            return Ok(render_record(&record));
        }

        let record = self.fetch_node(&key).await?;
        if self.inner.config.populate_cache_on_get {
            self.inner.cache.insert(key, record.clone());
        }
        Ok(render_record(&record))
    }

    /// Callback form of [`ContentClient::get`].
    pub async fn get_with(&self, node: &str, handlers: Handlers) {
        let resolved = Handlers::resolve(&handlers, &self.inner.handlers);
        match self.get(node).await {
            Ok(rendered) => resolved.success(Delivered::Node(rendered)),
            Err(err) => resolved.error(err.rendered_for_get()),
        }
    }

    /// Load a collection and merge it into the cache. `None` or a blank
    /// name loads the configured default collection.
    ///
    /// Returns the structured content as received, unrendered.
    pub async fn load(&self, collection: Option<&str>) -> CrudResult<ContentMap> {
        let name = collection
            .filter(|c| !c.trim().is_empty())
            .or(self.inner.config.default_collection.as_deref())
            .unwrap_or("");
        let key = NodeKey::new(name);

        let envelope = self.inner.transport.request(Method::Load, &key).await;
        let content = self.unwrap_envelope(Method::Load, &key, envelope)?;

        let merged = self.inner.cache.merge(content.clone());
        tracing::info!(collection = %key, count = merged, "Loaded collection");
        Ok(content)
    }

    /// Callback form of [`ContentClient::load`].
    pub async fn load_with(&self, collection: Option<&str>, handlers: Handlers) {
        let resolved = Handlers::resolve(&handlers, &self.inner.handlers);
        match self.load(collection).await {
            Ok(content) => resolved.success(Delivered::Collection(content)),
            Err(err) => resolved.error(err.rendered_for_load()),
        }
    }

    async fn fetch_node(&self, key: &NodeKey) -> CrudResult<CacheRecord> {
        let envelope = if self.inner.config.coalesce_requests {
            let transport = Arc::clone(&self.inner.transport);
            let owned = key.clone();
            self.inner
                .in_flight
                .run(key, move || {
                    async move { transport.request(Method::Read, &owned).await }.boxed()
                })
                .await
        } else {
            self.inner.transport.request(Method::Read, key).await
        };

        let mut content = self.unwrap_envelope(Method::Read, key, envelope)?;
        content.remove(key).ok_or_else(|| {
            CrudError::transport(format!("response did not include node {}", key))
        })
    }

    fn unwrap_envelope(
        &self,
        method: Method,
        key: &NodeKey,
        envelope: CrudResult<Envelope>,
    ) -> CrudResult<ContentMap> {
        let result = envelope.and_then(Envelope::into_content);
        if let Err(err) = &result {
            match err {
                CrudError::ApplicationFailure { message } => {
                    tracing::warn!(%method, node = %key, error = %message, "Content cloud rejected request");
                }
                other => {
                    tracing::warn!(%method, node = %key, error = %other, "Content cloud request failed");
                }
            }
        }
        result
    }
}

impl std::fmt::Debug for ContentClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentClient")
            .field("server", &self.inner.config.server)
            .field("cached", &self.inner.cache.len())
            .field("handlers", &self.inner.handlers)
            .finish()
    }
}
