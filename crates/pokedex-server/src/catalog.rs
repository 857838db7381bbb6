//! Candidate listing over the upstream catalog.
//!
//! The upstream total is used as reported unless `max_total_items` is set,
//! in which case it is clamped and items past the clamp are dropped.

use pokedex_core::EntityListItem;

use crate::cache::{CacheKey, CacheStore};
use crate::upstream::{UpstreamClient, UpstreamError};

#[derive(Clone)]
pub struct Catalog {
    client: UpstreamClient,
    cache: CacheStore,
    max_total_items: Option<u64>,
}

impl Catalog {
    pub fn new(client: UpstreamClient, cache: CacheStore, max_total_items: Option<u64>) -> Self {
        Self {
            client,
            cache,
            max_total_items,
        }
    }

    fn clamp(&self, reported: u64) -> u64 {
        match self.max_total_items {
            Some(ceiling) => reported.min(ceiling),
            None => reported,
        }
    }

    /// One listing window and the (clamped) total.
    pub async fn window(
        &self,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<EntityListItem>, u64), UpstreamError> {
        let page = self.client.list(offset, limit).await?;
        self.cache.set(&CacheKey::TotalCount, &page.count);

        let total = self.clamp(page.count);
        let mut items = page.items();
        items.truncate(total.saturating_sub(offset) as usize);
        Ok((items, total))
    }

    /// Total entity count, served from `total-count` when cached.
    pub async fn total_count(&self) -> Result<u64, UpstreamError> {
        if let Some(count) = self.cache.get::<u64>(&CacheKey::TotalCount) {
            return Ok(self.clamp(count));
        }
        let page = self.client.list(0, 1).await?;
        self.cache.set(&CacheKey::TotalCount, &page.count);
        Ok(self.clamp(page.count))
    }

    /// The whole listing in upstream order.
    pub async fn full_listing(&self) -> Result<Vec<EntityListItem>, UpstreamError> {
        let total = self.total_count().await?;
        if total == 0 {
            return Ok(Vec::new());
        }
        let page = self.client.list(0, total).await?;
        let mut items = page.items();
        items.truncate(total as usize);
        tracing::debug!(items = items.len(), "Fetched full upstream listing");
        Ok(items)
    }
}
