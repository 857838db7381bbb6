//! Speculative warming of the pages after the one just served.

use pokedex_core::PageQuery;
use tokio::task::JoinHandle;

use crate::aggregator::PageAggregator;

#[derive(Debug, Clone, Copy)]
pub struct Prefetcher {
    pages_ahead: u64,
}

impl Prefetcher {
    pub fn new(pages_ahead: u64) -> Self {
        Self { pages_ahead }
    }

    /// Pages worth warming after `served`: the next `pages_ahead` that exist
    /// and are not cached yet.
    pub fn candidates(
        &self,
        aggregator: &PageAggregator,
        served: &PageQuery,
        total_pages: u64,
    ) -> Vec<PageQuery> {
        (1..=self.pages_ahead)
            .map_while(|ahead| served.page.checked_add(ahead))
            .filter(|page| *page <= total_pages)
            .map(|page| served.with_page(page))
            .filter(|next| !aggregator.is_cached(next))
            .collect()
    }

    /// Warm the candidate pages on a detached task, one after another.
    ///
    /// Failures are logged and dropped; they never reach the request that
    /// scheduled them.
    pub fn schedule(
        &self,
        aggregator: PageAggregator,
        served: &PageQuery,
        total_pages: u64,
    ) -> Option<JoinHandle<()>> {
        let pending = self.candidates(&aggregator, served, total_pages);
        if pending.is_empty() {
            return None;
        }
        Some(tokio::spawn(async move {
            for query in pending {
                match aggregator.page(&query).await {
                    Ok(_) => tracing::debug!(page = query.page, limit = query.limit, "Prefetched page"),
                    Err(e) => tracing::debug!(page = query.page, error = %e, "Prefetch failed"),
                }
            }
        }))
    }
}
