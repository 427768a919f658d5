//! CRUD.io content client.
//!
//! A read-through cache in front of the CRUD.io Content Cloud.
//!
//! # Example
//!
//! ```no_run
//! use crudio_client::{ClientConfig, ContentClient, Handlers};
//!
//! # async fn run() -> crudio_core::CrudResult<()> {
//! let config = ClientConfig::new("https://cloud.crud.io/acme")
//!     .with_default_collection("landing");
//! let client = ContentClient::http(config, Handlers::new())?;
//! client.load(None).await?;
//!
//! // Cache only, never hits the network.
//! let banner = client.read("Banner");
//!
//! // Cache first, single-node request on a miss.
//! let footer = client.get("Footer").await?;
//! # let _ = (banner, footer);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod http;
mod inflight;

pub use client::ContentClient;
pub use config::{ClientConfig, DEFAULT_REQUEST_TIMEOUT_MS};
pub use http::HttpTransport;

pub use crudio_cache::CacheStats;
pub use crudio_core::{
    CacheRecord, ContentMap, ContentType, CrudError, CrudResult, Delivered, Handlers, NodeKey,
    Rendered,
};
