//! Node cache storage.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use crudio_core::{CacheRecord, ContentMap, NodeKey, Timestamp};

use crate::stats::CacheStats;

/// A cached record plus the time it entered the cache.
///
/// `cached_at` is informational only; entries never expire.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub record: CacheRecord,
    pub cached_at: Timestamp,
}

/// Append-only map from canonical node key to record.
///
/// All mutation happens under a single write lock, so a merge is visible to
/// readers either entirely or not at all.
#[derive(Debug, Default)]
pub struct NodeCache {
    entries: RwLock<HashMap<NodeKey, CacheEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl NodeCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `key` is cached. Does not touch the hit/miss counters.
    pub fn has(&self, key: &NodeKey) -> bool {
        self.read_entries().contains_key(key)
    }

    /// Look up a record, counting the lookup as a hit or a miss.
    pub fn get(&self, key: &NodeKey) -> Option<CacheRecord> {
        let record = self.read_entries().get(key).map(|e| e.record.clone());
        let counter = if record.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        record
    }

    /// Look up the full entry without counting it.
    pub fn entry(&self, key: &NodeKey) -> Option<CacheEntry> {
        self.read_entries().get(key).cloned()
    }

    /// Overlay `updates` onto the cache. Colliding keys take the update's
    /// record; keys absent from `updates` are left alone.
    ///
    /// Returns the number of entries written.
    pub fn merge(&self, updates: ContentMap) -> usize {
        let cached_at = Utc::now();
        let mut entries = self.write_entries();
        let count = updates.len();
        for (key, record) in updates {
            entries.insert(key, CacheEntry { record, cached_at });
        }
        count
    }

    /// Insert or replace a single record.
    pub fn insert(&self, key: NodeKey, record: CacheRecord) {
        self.write_entries().insert(
            key,
            CacheEntry {
                record,
                cached_at: Utc::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.read_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_entries().is_empty()
    }

    /// Cached keys in sorted order.
    pub fn keys(&self) -> Vec<NodeKey> {
        let mut keys: Vec<NodeKey> = self.read_entries().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entry_count: self.len() as u64,
        }
    }

    // Writers only perform whole-entry inserts, so a poisoned map is still consistent.
    fn read_entries(&self) -> RwLockReadGuard<'_, HashMap<NodeKey, CacheEntry>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_entries(&self) -> RwLockWriteGuard<'_, HashMap<NodeKey, CacheEntry>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crudio_core::ContentType;
    use serde_json::json;

    fn content(entries: &[(&str, CacheRecord)]) -> ContentMap {
        entries
            .iter()
            .map(|(k, r)| (NodeKey::new(k), r.clone()))
            .collect()
    }

    #[test]
    fn test_empty_cache_misses() {
        let cache = NodeCache::new();
        let key = NodeKey::new("missing");
        assert!(!cache.has(&key));
        assert!(cache.get(&key).is_none());
        assert_eq!(cache.stats().misses, 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_merge_makes_keys_available() {
        let cache = NodeCache::new();
        let written = cache.merge(content(&[
            ("Home Page", CacheRecord::text("welcome")),
            ("logo", CacheRecord::new(ContentType::Image, json!("logo.png"))),
        ]));

        assert_eq!(written, 2);
        assert_eq!(
            cache.get(&NodeKey::new("home page")),
            Some(CacheRecord::text("welcome"))
        );
        assert!(cache.has(&NodeKey::new("LOGO")));
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_merge_overwrites_but_never_removes() {
        let cache = NodeCache::new();
        cache.merge(content(&[
            ("a", CacheRecord::text("old")),
            ("b", CacheRecord::text("kept")),
        ]));
        cache.merge(content(&[("a", CacheRecord::text("new"))]));

        assert_eq!(cache.get(&NodeKey::new("a")), Some(CacheRecord::text("new")));
        assert_eq!(cache.get(&NodeKey::new("b")), Some(CacheRecord::text("kept")));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_insert_single_record() {
        let cache = NodeCache::new();
        cache.insert(NodeKey::new("footer"), CacheRecord::text("(c) 2012"));
        let entry = cache.entry(&NodeKey::new("footer")).unwrap();
        assert_eq!(entry.record, CacheRecord::text("(c) 2012"));
        assert_eq!(cache.stats().hits, 0);
    }

    #[test]
    fn test_keys_are_sorted() {
        let cache = NodeCache::new();
        cache.merge(content(&[
            ("zeta", CacheRecord::text("z")),
            ("alpha", CacheRecord::text("a")),
        ]));
        assert_eq!(cache.keys(), vec![NodeKey::new("alpha"), NodeKey::new("zeta")]);
    }
}
