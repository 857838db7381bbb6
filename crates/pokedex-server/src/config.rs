use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, time::Duration};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    /// Upstream PokeAPI client settings
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// TTL policy per cache key family
    #[serde(default)]
    pub cache: CacheConfig,
    /// Page aggregation settings
    #[serde(default)]
    pub aggregator: AggregatorConfig,
    /// Background name index settings
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub locale: LocaleConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    /// Optional static snapshot file
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        if self.upstream.base_url.trim().is_empty() {
            return Err("upstream.base_url must not be empty".into());
        }
        if url::Url::parse(&self.upstream.base_url).is_err() {
            return Err(format!(
                "upstream.base_url is not a valid URL: {}",
                self.upstream.base_url
            ));
        }
        if self.aggregator.concurrency == 0 {
            return Err("aggregator.concurrency must be > 0".into());
        }
        if self.aggregator.default_limit == 0 {
            return Err("aggregator.default_limit must be > 0".into());
        }
        if self.aggregator.max_limit == 0 {
            return Err("aggregator.max_limit must be > 0".into());
        }
        if self.aggregator.default_limit > self.aggregator.max_limit {
            return Err("aggregator.default_limit must be <= aggregator.max_limit".into());
        }
        if self.index.batch_size == 0 {
            return Err("index.batch_size must be > 0".into());
        }
        if self.cors.allow_credentials && self.cors.allowed_origin == "*" {
            return Err("cors.allow_credentials=true requires a non-wildcard cors.allowed_origin".into());
        }
        let origin = self.cors.allowed_origin.as_str();
        if origin != "*"
            && origin != "mirror"
            && axum::http::HeaderValue::from_str(origin).is_err()
        {
            return Err(format!("cors.allowed_origin is not a valid header value: {origin}"));
        }
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        use std::net::{IpAddr, Ipv4Addr};
        let host: IpAddr = self
            .server
            .host
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        SocketAddr::from((host, self.server.port))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    3001
}
fn default_body_limit() -> usize {
    64 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout. Unset means calls run until the transport gives up.
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "https://pokeapi.co/api/v2".into()
}
fn default_user_agent() -> String {
    concat!("pokedex-server/", env!("CARGO_PKG_VERSION")).into()
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_ms: None,
            user_agent: default_user_agent(),
        }
    }
}

impl UpstreamConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_page_ttl_secs")]
    pub page_ttl_secs: u64,
    #[serde(default = "default_long_ttl_secs")]
    pub detail_ttl_secs: u64,
    #[serde(default = "default_long_ttl_secs")]
    pub category_ttl_secs: u64,
    #[serde(default = "default_long_ttl_secs")]
    pub total_count_ttl_secs: u64,
    #[serde(default = "default_long_ttl_secs")]
    pub name_index_ttl_secs: u64,
}

fn default_page_ttl_secs() -> u64 {
    3600 // 1 hour
}
fn default_long_ttl_secs() -> u64 {
    86400 // 24 hours
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            page_ttl_secs: default_page_ttl_secs(),
            detail_ttl_secs: default_long_ttl_secs(),
            category_ttl_secs: default_long_ttl_secs(),
            total_count_ttl_secs: default_long_ttl_secs(),
            name_index_ttl_secs: default_long_ttl_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatorConfig {
    /// Maximum detail resolutions in flight across all requests
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_limit")]
    pub default_limit: u64,
    #[serde(default = "default_max_limit")]
    pub max_limit: u64,
    /// Pages warmed after each served page; 0 disables prefetching
    #[serde(default = "default_prefetch_pages")]
    pub prefetch_pages: u64,
    /// Clamp for the upstream-reported total when it overcounts
    #[serde(default)]
    pub max_total_items: Option<u64>,
    /// Serve placeholder records for entities whose base record failed
    #[serde(default)]
    pub include_degraded: bool,
}

fn default_concurrency() -> usize {
    5
}
fn default_limit() -> u64 {
    20
}
fn default_max_limit() -> u64 {
    100
}
fn default_prefetch_pages() -> u64 {
    2
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            prefetch_pages: default_prefetch_pages(),
            max_total_items: None,
            include_degraded: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_true")]
    pub build_on_startup: bool,
}

fn default_true() -> bool {
    true
}
fn default_batch_size() -> usize {
    20
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            batch_size: default_batch_size(),
            build_on_startup: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocaleConfig {
    #[serde(default = "default_language")]
    pub language: String,
    /// Regional/script variant tried when `language` has no entry
    #[serde(default = "default_fallback_language")]
    pub fallback_language: Option<String>,
}

fn default_language() -> String {
    "ja".into()
}
fn default_fallback_language() -> Option<String> {
    Some("ja-Hrkt".into())
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            fallback_language: default_fallback_language(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// `*`, `mirror` (echo the request Origin) or one explicit origin
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,
    #[serde(default)]
    pub allow_credentials: bool,
    #[serde(default = "default_allowed_methods")]
    pub allowed_methods: Vec<String>,
    #[serde(default = "default_allowed_headers")]
    pub allowed_headers: Vec<String>,
}

fn default_allowed_origin() -> String {
    "*".into()
}
fn default_allowed_methods() -> Vec<String> {
    vec!["GET".into(), "OPTIONS".into()]
}
fn default_allowed_headers() -> Vec<String> {
    vec!["Content-Type".into()]
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origin: default_allowed_origin(),
            allow_credentials: false,
            allowed_methods: default_allowed_methods(),
            allowed_headers: default_allowed_headers(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SnapshotConfig {
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        let pathbuf = PathBuf::from(path.unwrap_or("pokedex.toml"));
        if pathbuf.exists() {
            builder = builder.add_source(File::from(pathbuf));
        }
        // Environment variable overrides, e.g., POKEDEX__SERVER__PORT=9090
        builder = builder.add_source(
            Environment::with_prefix("POKEDEX")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }
}
