//! Page assembly.
//!
//! One requested page goes through:
//!
//! 1. the page cache (`page:{page}:{limit}:{term}`),
//! 2. candidate resolution: a listing window, or the full filtered set for a
//!    search,
//! 3. detail expansion through the [`ConcurrencyLimiter`] and
//!    [`DetailResolver`], preserving candidate order,
//! 4. write-through of the envelope.
//!
//! Only a failure to obtain the candidate list is an error. Entities that
//! fail to resolve are dropped from `results` (or served degraded when
//! configured).
//!
//! Search consults the [`NameIndex`] once it is ready. Before that, and
//! whenever the index has no match, the full upstream listing is scanned
//! and a background index build is requested.

use std::sync::Arc;

use pokedex_core::{
    EntityDetail, EntityListItem, PageEnvelope, PageQuery, Snapshot, normalize_term, total_pages,
};

use crate::cache::{CacheKey, CacheStore};
use crate::catalog::Catalog;
use crate::config::AggregatorConfig;
use crate::index_builder::IndexBuilder;
use crate::limiter::ConcurrencyLimiter;
use crate::name_index::NameIndex;
use crate::prefetch::Prefetcher;
use crate::resolver::{DetailResolver, NameHint, Resolution};
use crate::upstream::UpstreamError;

/// One entity selected for a page, with whatever names are known locally.
#[derive(Debug, Clone)]
struct Candidate {
    id: String,
    hint: NameHint,
}

/// Cheap to clone; clones share cache, index, limiter and builder.
#[derive(Clone)]
pub struct PageAggregator {
    catalog: Catalog,
    resolver: DetailResolver,
    cache: CacheStore,
    limiter: ConcurrencyLimiter,
    index: Arc<NameIndex>,
    builder: Option<Arc<IndexBuilder>>,
    snapshot: Option<Arc<Snapshot>>,
    prefetcher: Prefetcher,
    include_degraded: bool,
}

impl PageAggregator {
    pub fn new(
        catalog: Catalog,
        resolver: DetailResolver,
        cache: CacheStore,
        index: Arc<NameIndex>,
        config: &AggregatorConfig,
    ) -> Self {
        Self {
            catalog,
            resolver,
            cache,
            limiter: ConcurrencyLimiter::new(config.concurrency),
            index,
            builder: None,
            snapshot: None,
            prefetcher: Prefetcher::new(config.prefetch_pages),
            include_degraded: config.include_degraded,
        }
    }

    /// Builder to trigger when a search has to fall back to a listing scan.
    pub fn with_index_builder(mut self, builder: Arc<IndexBuilder>) -> Self {
        self.builder = Some(builder);
        self
    }

    /// Snapshot supplying localized-name hints and search fallbacks.
    pub fn with_snapshot(mut self, snapshot: Arc<Snapshot>) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    pub fn limiter(&self) -> &ConcurrencyLimiter {
        &self.limiter
    }

    pub fn is_cached(&self, query: &PageQuery) -> bool {
        self.cache.has(&page_key(query))
    }

    /// Serve one page and schedule prefetching of the following ones.
    pub async fn serve(&self, query: &PageQuery) -> Result<PageEnvelope, UpstreamError> {
        let envelope = self.page(query).await?;
        self.prefetcher
            .schedule(self.clone(), query, envelope.total_pages);
        Ok(envelope)
    }

    /// Assemble one page, from the cache when possible.
    pub async fn page(&self, query: &PageQuery) -> Result<PageEnvelope, UpstreamError> {
        let key = page_key(query);
        if let Some(envelope) = self.cache.get::<PageEnvelope>(&key) {
            tracing::debug!(key = %key, "Page cache hit");
            return Ok(envelope);
        }
        tracing::debug!(key = %key, "Page cache miss");

        let envelope = self.assemble(query).await?;
        self.cache.set(&key, &envelope);
        Ok(envelope)
    }

    async fn assemble(&self, query: &PageQuery) -> Result<PageEnvelope, UpstreamError> {
        let (window, total_items) = match query.search_term.as_deref() {
            None => match query.checked_offset() {
                Some(offset) => {
                    let (items, total) = self.catalog.window(offset, query.limit).await?;
                    let window = items
                        .iter()
                        .filter_map(|item| self.candidate_from_listing(item))
                        .collect::<Vec<_>>();
                    (window, total)
                }
                // Unreachable offset: only the total is needed for the past-end envelope
                None => (Vec::new(), self.catalog.total_count().await?),
            },
            Some(term) => {
                let matches = self.search(term).await?;
                let total = matches.len() as u64;
                let window = matches
                    .into_iter()
                    .skip(usize::try_from(query.offset()).unwrap_or(usize::MAX))
                    .take(query.limit as usize)
                    .collect::<Vec<_>>();
                (window, total)
            }
        };

        if total_items == 0 {
            return Ok(PageEnvelope::no_matches());
        }
        let total_pages = total_pages(total_items, query.limit);
        if query.page > total_pages {
            return Ok(PageEnvelope::past_end(query.page, total_pages, total_items));
        }

        let results = self.expand(window).await;
        Ok(PageEnvelope {
            results,
            current_page: query.page,
            total_pages,
            total_items,
        })
    }

    /// Full ordered match set for a search term.
    async fn search(&self, term: &str) -> Result<Vec<Candidate>, UpstreamError> {
        if self.index.is_ready() {
            let ids = self.index.lookup(term);
            if !ids.is_empty() {
                tracing::debug!(term = %term, matches = ids.len(), "Search served from name index");
                return Ok(ids
                    .into_iter()
                    .map(|id| Candidate {
                        hint: self.hint(&id, None),
                        id,
                    })
                    .collect());
            }
        } else if let Some(builder) = &self.builder
            && builder.trigger().is_some()
        {
            tracing::info!("Search fell back to listing scan; name index build started");
        }

        let needle = normalize_term(term);
        let listing = self.catalog.full_listing().await?;
        let matches: Vec<Candidate> = listing
            .iter()
            .filter(|item| self.listing_matches(item, &needle))
            .filter_map(|item| self.candidate_from_listing(item))
            .collect();
        tracing::debug!(term = %term, matches = matches.len(), "Search served from listing scan");
        Ok(matches)
    }

    fn listing_matches(&self, item: &EntityListItem, needle: &str) -> bool {
        let Some(id) = item.id() else {
            return false;
        };
        if id == needle || normalize_term(&item.display_key).contains(needle) {
            return true;
        }
        self.snapshot
            .as_ref()
            .and_then(|snapshot| snapshot.get(id))
            .is_some_and(|entry| normalize_term(&entry.name_ja).contains(needle))
    }

    fn candidate_from_listing(&self, item: &EntityListItem) -> Option<Candidate> {
        let id = item.id()?.to_string();
        Some(Candidate {
            hint: self.hint(&id, Some(&item.display_key)),
            id,
        })
    }

    fn hint(&self, id: &str, romanized: Option<&str>) -> NameHint {
        let entry = self.snapshot.as_ref().and_then(|snapshot| snapshot.get(id));
        NameHint {
            localized: entry
                .map(|e| e.name_ja.clone())
                .filter(|name| !name.is_empty()),
            romanized: romanized
                .map(str::to_string)
                .or_else(|| entry.map(|e| e.name_en.clone())),
        }
    }

    /// Resolve every candidate under the limiter; order follows `window`.
    async fn expand(&self, window: Vec<Candidate>) -> Vec<EntityDetail> {
        let resolutions = self
            .limiter
            .run_all(
                window
                    .iter()
                    .map(|candidate| self.resolver.resolve(&candidate.id, &candidate.hint)),
            )
            .await;

        let mut results = Vec::with_capacity(resolutions.len());
        let mut dropped = 0usize;
        for resolution in resolutions {
            if let Resolution::Resolved(detail) = &resolution {
                self.index.insert(&detail.localized_name, detail.id.clone());
            }
            match resolution.into_detail(self.include_degraded) {
                Some(detail) => results.push(detail),
                None => dropped += 1,
            }
        }
        if dropped > 0 {
            tracing::warn!(dropped, served = results.len(), "Page served with missing entities");
        }
        results
    }
}

/// Page cache key; search terms are keyed in normalized form.
fn page_key(query: &PageQuery) -> CacheKey {
    let term = query.search_term.as_deref().map(normalize_term);
    CacheKey::page(query.page, query.limit, term.as_deref())
}
