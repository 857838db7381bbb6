//! Page arithmetic shared by the aggregator and its callers.

use crate::error::{CoreError, Result};

/// A validated page request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageQuery {
    pub page: u64,
    pub limit: u64,
    pub search_term: Option<String>,
}

impl PageQuery {
    /// Build a query, rejecting `page < 1` or `limit < 1`.
    ///
    /// Blank search terms are treated as absent.
    pub fn new(page: u64, limit: u64, search_term: Option<String>) -> Result<Self> {
        if page == 0 {
            return Err(CoreError::invalid_query("page must be >= 1"));
        }
        if limit == 0 {
            return Err(CoreError::invalid_query("limit must be >= 1"));
        }
        let search_term = search_term
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        Ok(Self {
            page,
            limit,
            search_term,
        })
    }

    /// Zero-based offset of the first item on this page, saturating at
    /// `u64::MAX` for pages no dataset can reach.
    pub fn offset(&self) -> u64 {
        self.checked_offset().unwrap_or(u64::MAX)
    }

    /// Offset of the first item, or `None` when it does not fit in a `u64`.
    pub fn checked_offset(&self) -> Option<u64> {
        self.page.saturating_sub(1).checked_mul(self.limit)
    }

    /// Same query for another page number.
    pub fn with_page(&self, page: u64) -> Self {
        Self {
            page,
            limit: self.limit,
            search_term: self.search_term.clone(),
        }
    }
}

/// `ceil(total_items / limit)`, 0 for an empty dataset and at least 1 otherwise.
pub fn total_pages(total_items: u64, limit: u64) -> u64 {
    if total_items == 0 {
        return 0;
    }
    total_items.div_ceil(limit.max(1)).max(1)
}
