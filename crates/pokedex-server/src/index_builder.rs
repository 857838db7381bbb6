//! Background population of the [`NameIndex`].
//!
//! A build walks the full catalog in fixed-size batches and resolves each
//! entity's localized name from its species record. Batches run their calls
//! concurrently but outside the request limiter, so a build never competes
//! for permits with foreground page assembly.
//!
//! At most one build runs per process. A completed build is persisted under
//! `name-index` and restored from there on the next attempt.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::future::join_all;
use tokio::task::JoinHandle;

use crate::cache::{CacheKey, CacheStore};
use crate::catalog::Catalog;
use crate::name_index::NameIndex;
use crate::resolver::DetailResolver;
use crate::upstream::UpstreamError;

/// What a call to [`IndexBuilder::build`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Walked the catalog; `names` entries now indexed.
    Built { names: usize },
    /// Loaded a previously persisted index from the cache.
    Restored { names: usize },
    /// Another build holds the guard.
    AlreadyRunning,
    /// The index was already complete.
    AlreadyReady,
}

pub struct IndexBuilder {
    catalog: Catalog,
    resolver: DetailResolver,
    cache: CacheStore,
    index: Arc<NameIndex>,
    batch_size: usize,
    building: AtomicBool,
}

impl IndexBuilder {
    pub fn new(
        catalog: Catalog,
        resolver: DetailResolver,
        cache: CacheStore,
        index: Arc<NameIndex>,
        batch_size: usize,
    ) -> Self {
        Self {
            catalog,
            resolver,
            cache,
            index,
            batch_size: batch_size.max(1),
            building: AtomicBool::new(false),
        }
    }

    pub fn is_building(&self) -> bool {
        self.building.load(Ordering::Acquire)
    }

    /// Start a detached build unless one is running or the index is ready.
    ///
    /// Returns the task handle when a build was started. Errors inside the
    /// task are logged, never propagated.
    pub fn trigger(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        if self.index.is_ready() || !self.acquire() {
            return None;
        }
        let this = Arc::clone(self);
        Some(tokio::spawn(async move {
            let outcome = this.populate().await;
            this.release();
            log_outcome(outcome);
        }))
    }

    /// Run a build on the current task.
    pub async fn build(&self) -> Result<BuildOutcome, UpstreamError> {
        if self.index.is_ready() {
            return Ok(BuildOutcome::AlreadyReady);
        }
        if !self.acquire() {
            return Ok(BuildOutcome::AlreadyRunning);
        }
        let outcome = self.populate().await;
        self.release();
        outcome
    }

    fn acquire(&self) -> bool {
        self.building
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn release(&self) {
        self.building.store(false, Ordering::Release);
    }

    async fn populate(&self) -> Result<BuildOutcome, UpstreamError> {
        if let Some(persisted) = self
            .cache
            .get::<HashMap<String, BTreeSet<String>>>(&CacheKey::NameIndex)
        {
            self.index.init(
                persisted
                    .into_iter()
                    .flat_map(|(name, ids)| ids.into_iter().map(move |id| (name.clone(), id))),
            );
            return Ok(BuildOutcome::Restored {
                names: self.index.len(),
            });
        }

        let items = self.catalog.full_listing().await?;
        tracing::info!(
            entities = items.len(),
            batch_size = self.batch_size,
            "Building name index"
        );

        let mut skipped = 0usize;
        for (batch_no, batch) in items.chunks(self.batch_size).enumerate() {
            let lookups = batch.iter().filter_map(|item| {
                let id = item.id()?.to_string();
                Some(async move {
                    let name = self.resolver.species_name(&id).await;
                    (id, item.display_key.as_str(), name)
                })
            });

            for (id, romanized, name) in join_all(lookups).await {
                self.index.insert(romanized, id.clone());
                match name {
                    Ok(Some(localized)) => self.index.insert(&localized, id),
                    Ok(None) => {}
                    Err(e) => {
                        skipped += 1;
                        tracing::debug!(id = %id, error = %e, "Skipping localized name");
                    }
                }
            }
            tracing::debug!(batch = batch_no + 1, indexed = self.index.len(), "Index batch done");
        }

        self.index.mark_ready();
        self.cache.set(&CacheKey::NameIndex, &self.index.entries());
        if skipped > 0 {
            tracing::warn!(skipped, "Some localized names could not be indexed");
        }
        Ok(BuildOutcome::Built {
            names: self.index.len(),
        })
    }
}

fn log_outcome(outcome: Result<BuildOutcome, UpstreamError>) {
    match outcome {
        Ok(BuildOutcome::Built { names }) => tracing::info!(names, "Name index built"),
        Ok(BuildOutcome::Restored { names }) => {
            tracing::info!(names, "Name index restored from cache")
        }
        Ok(other) => tracing::debug!(?other, "Name index build skipped"),
        Err(e) => tracing::warn!(error = %e, "Name index build failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheBackend, TtlPolicy};
    use crate::config::{LocaleConfig, UpstreamConfig};
    use crate::upstream::UpstreamClient;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn builder_for(server: &MockServer, batch_size: usize) -> (Arc<IndexBuilder>, Arc<NameIndex>, CacheStore) {
        let client = UpstreamClient::new(&UpstreamConfig {
            base_url: server.uri(),
            ..UpstreamConfig::default()
        })
        .unwrap();
        let cache = CacheStore::new(CacheBackend::new(), TtlPolicy::default());
        let index = Arc::new(NameIndex::new());
        let catalog = Catalog::new(client.clone(), cache.clone(), None);
        let resolver = DetailResolver::new(client, cache.clone(), LocaleConfig::default());
        let builder = IndexBuilder::new(catalog, resolver, cache.clone(), Arc::clone(&index), batch_size);
        (Arc::new(builder), index, cache)
    }

    async fn mount_catalog(server: &MockServer) {
        let listing = json!({
            "count": 3,
            "results": [
                { "name": "bulbasaur", "url": "https://pokeapi.co/api/v2/pokemon/1/" },
                { "name": "ivysaur", "url": "https://pokeapi.co/api/v2/pokemon/2/" },
                { "name": "venusaur", "url": "https://pokeapi.co/api/v2/pokemon/3/" }
            ]
        });
        Mock::given(method("GET"))
            .and(path("/pokemon"))
            .and(query_param("limit", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "count": 3, "results": [] })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/pokemon"))
            .and(query_param("limit", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing))
            .mount(server)
            .await;
        for (id, name) in [("1", "フシギダネ"), ("3", "フシギバナ")] {
            Mock::given(method("GET"))
                .and(path(format!("/pokemon-species/{id}")))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "names": [{ "language": { "name": "ja", "url": "" }, "name": name }]
                })))
                .mount(server)
                .await;
        }
        Mock::given(method("GET"))
            .and(path("/pokemon-species/2"))
            .respond_with(ResponseTemplate::new(500))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_build_indexes_localized_and_romanized_names() {
        let server = MockServer::start().await;
        mount_catalog(&server).await;
        let (builder, index, cache) = builder_for(&server, 2);

        let outcome = builder.build().await.unwrap();
        assert_eq!(outcome, BuildOutcome::Built { names: 5 });
        assert!(index.is_ready());
        assert!(!builder.is_building());

        assert_eq!(index.lookup("ふしぎ"), vec!["1", "3"]);
        // Species failure for 2 still leaves its romanized name searchable
        assert_eq!(index.lookup("ivy"), vec!["2"]);
        assert!(cache.has(&CacheKey::NameIndex));

        assert_eq!(builder.build().await.unwrap(), BuildOutcome::AlreadyReady);
    }

    #[tokio::test]
    async fn test_restores_from_cache_without_upstream() {
        let server = MockServer::start().await;
        let (builder, index, cache) = builder_for(&server, 20);
        let persisted: HashMap<String, BTreeSet<String>> = [(
            "ピカチュウ".to_string(),
            BTreeSet::from(["25".to_string()]),
        )]
        .into_iter()
        .collect();
        cache.set(&CacheKey::NameIndex, &persisted);

        let outcome = builder.build().await.unwrap();
        assert_eq!(outcome, BuildOutcome::Restored { names: 1 });
        assert_eq!(index.lookup("ぴか"), vec!["25"]);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_trigger_runs_once() {
        let server = MockServer::start().await;
        mount_catalog(&server).await;
        let (builder, index, _) = builder_for(&server, 20);

        let handle = builder.trigger().expect("first trigger starts a build");
        assert!(builder.trigger().is_none());
        handle.await.unwrap();

        assert!(index.is_ready());
        assert!(builder.trigger().is_none());
    }

    #[tokio::test]
    async fn test_listing_failure_leaves_index_not_ready() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pokemon"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        let (builder, index, _) = builder_for(&server, 20);

        assert!(builder.build().await.is_err());
        assert!(!index.is_ready());
        assert!(!builder.is_building());
    }
}
