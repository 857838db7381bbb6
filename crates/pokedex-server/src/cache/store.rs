//! Typed cache facade over [`CacheBackend`].
//!
//! ## Cache Key Format
//!
//! | Family          | Key                              | TTL policy   |
//! |-----------------|----------------------------------|--------------|
//! | page            | `page:{page}:{limit}:{term}`     | medium       |
//! | detail          | `detail:{id}`                    | long         |
//! | category name   | `category-name:{key}`            | long         |
//! | total count     | `total-count`                    | long         |
//! | name index      | `name-index`                     | long         |
//!
//! Values are MessagePack-encoded. An entry that fails to decode is
//! invalidated and reported as a miss.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::backend::{CacheBackend, CacheStats};
use crate::config::CacheConfig;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Page {
        page: u64,
        limit: u64,
        search_term: Option<String>,
    },
    Detail(String),
    CategoryName(String),
    TotalCount,
    NameIndex,
}

impl CacheKey {
    pub fn page(page: u64, limit: u64, search_term: Option<&str>) -> Self {
        Self::Page {
            page,
            limit,
            search_term: search_term.map(str::to_string),
        }
    }

    pub fn detail(id: impl Into<String>) -> Self {
        Self::Detail(id.into())
    }

    pub fn category_name(key: impl Into<String>) -> Self {
        Self::CategoryName(key.into())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Page {
                page,
                limit,
                search_term,
            } => write!(
                f,
                "page:{page}:{limit}:{}",
                search_term.as_deref().unwrap_or("")
            ),
            CacheKey::Detail(id) => write!(f, "detail:{id}"),
            CacheKey::CategoryName(key) => write!(f, "category-name:{key}"),
            CacheKey::TotalCount => f.write_str("total-count"),
            CacheKey::NameIndex => f.write_str("name-index"),
        }
    }
}

/// TTL per key family.
#[derive(Debug, Clone, Copy)]
pub struct TtlPolicy {
    pub page: Duration,
    pub detail: Duration,
    pub category_name: Duration,
    pub total_count: Duration,
    pub name_index: Duration,
}

impl TtlPolicy {
    pub fn ttl_for(&self, key: &CacheKey) -> Duration {
        match key {
            CacheKey::Page { .. } => self.page,
            CacheKey::Detail(_) => self.detail,
            CacheKey::CategoryName(_) => self.category_name,
            CacheKey::TotalCount => self.total_count,
            CacheKey::NameIndex => self.name_index,
        }
    }
}

impl From<&CacheConfig> for TtlPolicy {
    fn from(cfg: &CacheConfig) -> Self {
        Self {
            page: Duration::from_secs(cfg.page_ttl_secs),
            detail: Duration::from_secs(cfg.detail_ttl_secs),
            category_name: Duration::from_secs(cfg.category_ttl_secs),
            total_count: Duration::from_secs(cfg.total_count_ttl_secs),
            name_index: Duration::from_secs(cfg.name_index_ttl_secs),
        }
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self::from(&CacheConfig::default())
    }
}

/// Shared cache handle. Cloning shares the underlying map.
#[derive(Clone)]
pub struct CacheStore {
    backend: CacheBackend,
    ttl: TtlPolicy,
}

impl CacheStore {
    pub fn new(backend: CacheBackend, ttl: TtlPolicy) -> Self {
        Self { backend, ttl }
    }

    pub fn from_config(cfg: &CacheConfig) -> Self {
        Self::new(CacheBackend::new(), TtlPolicy::from(cfg))
    }

    pub fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let key = key.to_string();
        let data = self.backend.get(&key)?;
        match rmp_serde::from_slice::<T>(&data) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to decode cached value");
                self.backend.invalidate(&key);
                None
            }
        }
    }

    /// Store a value under its key family's TTL.
    pub fn set<T: Serialize>(&self, key: &CacheKey, value: &T) {
        let ttl = self.ttl.ttl_for(key);
        let key = key.to_string();
        match rmp_serde::to_vec_named(value) {
            Ok(data) => self.backend.set(&key, data, ttl),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to encode value for cache");
            }
        }
    }

    pub fn has(&self, key: &CacheKey) -> bool {
        self.backend.contains(&key.to_string())
    }

    pub fn invalidate(&self, key: &CacheKey) {
        self.backend.invalidate(&key.to_string());
    }

    pub fn purge_expired(&self) -> usize {
        self.backend.purge_expired()
    }

    pub fn stats(&self) -> CacheStats {
        self.backend.stats()
    }
}
