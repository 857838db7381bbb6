use std::{future::Future, net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method},
    middleware,
    routing::get,
};
use pokedex_core::Snapshot;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    aggregator::PageAggregator,
    cache::CacheStore,
    catalog::Catalog,
    config::{AppConfig, CorsConfig, SnapshotConfig},
    handlers,
    index_builder::IndexBuilder,
    middleware as app_middleware,
    name_index::NameIndex,
    profile::ProfileService,
    resolver::DetailResolver,
    upstream::UpstreamClient,
};

const CACHE_PURGE_INTERVAL: Duration = Duration::from_secs(300);

/// Process-wide services shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub cache: CacheStore,
    pub index: Arc<NameIndex>,
    pub index_builder: Option<Arc<IndexBuilder>>,
    pub aggregator: PageAggregator,
    pub profiles: ProfileService,
}

impl AppState {
    /// Wire all services, loading the snapshot named in the config.
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let snapshot = load_snapshot(&config.snapshot);
        Self::new(config, snapshot)
    }

    pub fn new(config: AppConfig, snapshot: Option<Snapshot>) -> anyhow::Result<Self> {
        let config = Arc::new(config);
        let client = UpstreamClient::new(&config.upstream)?;
        let cache = CacheStore::from_config(&config.cache);
        let index = Arc::new(NameIndex::new());

        let snapshot = snapshot.filter(|s| !s.is_empty()).map(Arc::new);
        if let Some(snapshot) = &snapshot {
            index.init(snapshot.entries().iter().flat_map(|entry| {
                [
                    (entry.name_ja.clone(), entry.id.clone()),
                    (entry.name_en.clone(), entry.id.clone()),
                ]
            }));
            tracing::info!(names = index.len(), "Name index seeded from snapshot");
        }

        let catalog = Catalog::new(
            client.clone(),
            cache.clone(),
            config.aggregator.max_total_items,
        );
        let resolver = DetailResolver::new(client, cache.clone(), config.locale.clone());

        let index_builder = config.index.enabled.then(|| {
            Arc::new(IndexBuilder::new(
                catalog.clone(),
                resolver.clone(),
                cache.clone(),
                Arc::clone(&index),
                config.index.batch_size,
            ))
        });

        let mut aggregator = PageAggregator::new(
            catalog,
            resolver.clone(),
            cache.clone(),
            Arc::clone(&index),
            &config.aggregator,
        );
        if let Some(builder) = &index_builder {
            aggregator = aggregator.with_index_builder(Arc::clone(builder));
        }
        if let Some(snapshot) = &snapshot {
            aggregator = aggregator.with_snapshot(Arc::clone(snapshot));
        }
        let profiles = ProfileService::new(resolver, snapshot);

        Ok(Self {
            config,
            cache,
            index,
            index_builder,
            aggregator,
            profiles,
        })
    }
}

fn load_snapshot(cfg: &SnapshotConfig) -> Option<Snapshot> {
    let path = cfg.path.as_deref()?;
    match Snapshot::load(path) {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "Snapshot not loaded; continuing without it");
            None
        }
    }
}

pub fn cors_layer(cfg: &CorsConfig) -> CorsLayer {
    let methods: Vec<Method> = cfg
        .allowed_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();
    let headers: Vec<HeaderName> = cfg
        .allowed_headers
        .iter()
        .filter_map(|h| h.parse().ok())
        .collect();
    let origin = match cfg.allowed_origin.as_str() {
        "*" => AllowOrigin::any(),
        "mirror" => AllowOrigin::mirror_request(),
        explicit => match HeaderValue::from_str(explicit) {
            Ok(value) => AllowOrigin::exact(value),
            Err(_) => {
                tracing::warn!(origin = %explicit, "Invalid CORS origin; cross-origin requests denied");
                AllowOrigin::list(Vec::<HeaderValue>::new())
            }
        },
    };

    let layer = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(methods)
        .allow_headers(headers);
    if cfg.allow_credentials {
        layer.allow_credentials(true)
    } else {
        layer
    }
}

pub fn build_app(state: AppState) -> Router {
    let cfg = Arc::clone(&state.config);
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        .route(
            "/api/pokemon",
            get(handlers::list_pokemon).options(handlers::preflight),
        )
        .route(
            "/api/pokemon/{id}",
            get(handlers::get_pokemon).options(handlers::preflight),
        )
        .with_state(state)
        // Middleware stack, innermost first: cors -> compression -> trace -> request id
        .layer(cors_layer(&cfg.cors))
        .layer(CompressionLayer::new())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    use tracing::field::Empty;
                    let req_id = req
                        .extensions()
                        .get::<HeaderValue>()
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string();
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri(),
                        http.status_code = Empty,
                        request_id = %req_id
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>, latency: Duration, span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            tracing::field::display(res.status().as_u16()),
                        );
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
        .layer(middleware::from_fn(app_middleware::request_id))
        .layer(axum::extract::DefaultBodyLimit::max(
            cfg.server.body_limit_bytes,
        ))
}

pub struct PokedexServer {
    addr: SocketAddr,
    app: Router,
    state: AppState,
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
    snapshot: Option<Snapshot>,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
            snapshot: None,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    /// Use an already loaded snapshot instead of `snapshot.path`.
    pub fn with_snapshot(mut self, snapshot: Snapshot) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    pub fn build(self) -> anyhow::Result<PokedexServer> {
        let state = match self.snapshot {
            Some(snapshot) => AppState::new(self.config, Some(snapshot))?,
            None => AppState::from_config(self.config)?,
        };
        let app = build_app(state.clone());

        Ok(PokedexServer {
            addr: self.addr,
            app,
            state,
        })
    }
}

impl PokedexServer {
    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve<F>(self, listener: tokio::net::TcpListener, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        start_background_tasks(&self.state);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}

fn start_background_tasks(state: &AppState) {
    if state.config.index.build_on_startup
        && let Some(builder) = &state.index_builder
        && builder.trigger().is_some()
    {
        tracing::info!("Name index build started");
    }

    let cache = state.cache.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(CACHE_PURGE_INTERVAL);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let purged = cache.purge_expired();
            if purged > 0 {
                tracing::debug!(purged, "Expired cache entries purged");
            }
        }
    });
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
