//! In-memory node cache.
//!
//! The cache is the client's single source of truth for "is this node known
//! locally". It only grows: merges add or overwrite entries, nothing is ever
//! evicted, expired or deleted for the lifetime of the owning client.
//!
//! # Example
//!
//! ```
//! use crudio_cache::NodeCache;
//! use crudio_core::{CacheRecord, ContentMap, NodeKey};
//!
//! let cache = NodeCache::new();
//! let mut update = ContentMap::new();
//! update.insert(NodeKey::new("Home Page"), CacheRecord::text("hello"));
//! cache.merge(update);
//!
//! assert!(cache.has(&NodeKey::new("home-page")));
//! ```

pub mod stats;
pub mod store;

pub use stats::CacheStats;
pub use store::{CacheEntry, NodeCache};
