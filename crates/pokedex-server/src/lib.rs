pub mod aggregator;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod handlers;
pub mod index_builder;
pub mod limiter;
pub mod middleware;
pub mod name_index;
pub mod observability;
pub mod prefetch;
pub mod profile;
pub mod resolver;
pub mod server;
pub mod upstream;

pub use aggregator::PageAggregator;
pub use cache::{CacheBackend, CacheKey, CacheStore, CachedEntry, TtlPolicy};
pub use catalog::Catalog;
pub use config::{AggregatorConfig, AppConfig, CacheConfig, CorsConfig, ServerConfig, UpstreamConfig};
pub use index_builder::{BuildOutcome, IndexBuilder};
pub use limiter::ConcurrencyLimiter;
pub use name_index::NameIndex;
pub use observability::{apply_logging_level, init_tracing};
pub use prefetch::Prefetcher;
pub use profile::{ProfileError, ProfileService};
pub use resolver::{DetailResolver, NameHint, PLACEHOLDER_IMAGE, Resolution};
pub use server::{AppState, PokedexServer, ServerBuilder, build_app};
pub use upstream::{UpstreamClient, UpstreamError};
