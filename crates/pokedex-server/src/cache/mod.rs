//! Process-wide caching.
//!
//! ## Architecture
//!
//! - **Backend (DashMap)**: in-memory, per-process, absolute TTL per key
//! - **Store**: typed facade choosing the TTL from the key family
//!
//! ```text
//! GET page → page:{page}:{limit}:{term} → detail:{id} → category-name:{key} → PokeAPI
//! ```
//!
//! Writes are idempotent re-derivations of upstream data, so concurrent
//! writers need no coordination: the last write wins.

pub mod backend;
pub mod store;

pub use backend::{CacheBackend, CacheStats, CachedEntry};
pub use store::{CacheKey, CacheStore, TtlPolicy};
