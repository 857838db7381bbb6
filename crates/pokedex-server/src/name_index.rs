//! In-memory reverse index from normalized name to entity id.
//!
//! Shared by the page aggregator (lookups, opportunistic inserts) and the
//! background builder (bulk population). One name maps to every id that
//! carries it, since alternate forms share their species' localized name.
//! Writes are lock-free and only ever add ids.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use pokedex_core::{normalize_term, numeric_order};

#[derive(Debug, Default)]
pub struct NameIndex {
    names: DashMap<String, BTreeSet<String>>,
    ready: AtomicBool,
}

impl NameIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bulk-load entries and mark the index ready.
    pub fn init<I, N, V>(&self, entries: I)
    where
        I: IntoIterator<Item = (N, V)>,
        N: AsRef<str>,
        V: Into<String>,
    {
        for (name, id) in entries {
            self.insert(name.as_ref(), id);
        }
        self.ready.store(true, Ordering::Release);
    }

    /// Add `id` under `name`; ids already indexed under it are kept.
    /// Blank names are ignored.
    pub fn insert(&self, name: &str, id: impl Into<String>) {
        let key = normalize_term(name);
        if key.is_empty() {
            return;
        }
        self.names.entry(key).or_default().insert(id.into());
    }

    /// Ids whose indexed name contains `term` (after normalization) or whose
    /// id equals it, de-duplicated and in numeric id order.
    pub fn lookup(&self, term: &str) -> Vec<String> {
        let needle = normalize_term(term);
        if needle.is_empty() {
            return Vec::new();
        }
        let mut ids: Vec<String> = self
            .names
            .iter()
            .flat_map(|entry| {
                let name_matches = entry.key().contains(&needle);
                entry
                    .value()
                    .iter()
                    .filter(|id| name_matches || **id == needle)
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .collect();
        ids.sort_by(|a, b| numeric_order(a, b));
        ids.dedup();
        ids
    }

    pub fn clear(&self) {
        self.names.clear();
        self.ready.store(false, Ordering::Release);
    }

    /// True once a full build or a bulk load completed.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Number of distinct indexed names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Copy of the current contents, for persisting to the cache.
    pub fn entries(&self) -> HashMap<String, BTreeSet<String>> {
        self.names
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}
