//! In-process cache backend: a DashMap of serialized entries with per-key TTL.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A cached entry with TTL support.
///
/// The data is wrapped in `Arc` so cache hits clone a pointer, not the payload.
#[derive(Clone, Debug)]
pub struct CachedEntry {
    pub data: Arc<Vec<u8>>,
    pub cached_at: Instant,
    pub ttl: Duration,
}

impl CachedEntry {
    /// Create a new cached entry.
    pub fn new(data: Vec<u8>, ttl: Duration) -> Self {
        Self {
            data: Arc::new(data),
            cached_at: Instant::now(),
            ttl,
        }
    }

    /// An entry is expired from the instant its TTL has fully elapsed.
    pub fn is_expired(&self) -> bool {
        self.cached_at.elapsed() >= self.ttl
    }
}

/// Process-wide key-value store with absolute per-key expiry.
///
/// There is no size bound: entries leave only by expiry, invalidation or
/// [`CacheBackend::purge_expired`].
#[derive(Clone, Default)]
pub struct CacheBackend {
    local: Arc<DashMap<String, CachedEntry>>,
}

impl CacheBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a live value. Expired entries are removed and reported as a miss.
    pub fn get(&self, key: &str) -> Option<Arc<Vec<u8>>> {
        if let Some(entry) = self.local.get(key) {
            if !entry.is_expired() {
                tracing::debug!(key = %key, "cache hit");
                return Some(Arc::clone(&entry.data));
            }
            drop(entry);
            self.evict_expired(key);
            tracing::debug!(key = %key, "cache expired");
            return None;
        }
        tracing::debug!(key = %key, "cache miss");
        None
    }

    /// Remove `key` only if its current entry is expired; a value written
    /// since the caller observed the expiry stays.
    fn evict_expired(&self, key: &str) -> bool {
        self.local.remove_if(key, |_, entry| entry.is_expired()).is_some()
    }

    /// Set a value with TTL, replacing any previous entry (last write wins).
    pub fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) {
        self.local.insert(key.to_string(), CachedEntry::new(value, ttl));
    }

    /// True when a live entry exists for `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.local
            .get(key)
            .map(|entry| !entry.is_expired())
            .unwrap_or(false)
    }

    pub fn invalidate(&self, key: &str) {
        self.local.remove(key);
        tracing::debug!(key = %key, "cache invalidated");
    }

    /// Drop every expired entry; returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let before = self.local.len();
        self.local.retain(|_, entry| !entry.is_expired());
        before.saturating_sub(self.local.len())
    }

    pub fn clear(&self) {
        self.local.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.local.len(),
        }
    }
}

/// Cache statistics.
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub entries: usize,
}
