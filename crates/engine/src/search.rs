use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use hashbrown::HashSet;
use log::{debug, warn};
use serde::Serialize;
use trawl_fs::{ExtensionSet, FileRecord};

use crate::store::IndexStore;

/// Split a query on whitespace into lowercase words.
pub fn tokenize(query: &str) -> Vec<String> {
    query.split_whitespace().map(str::to_lowercase).collect()
}

/// Timings and hit counts for one search.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchMetrics {
    /// Time spent in the suffix-path query.
    pub suffix_time: Option<Duration>,
    /// Time spent in the full-path query. `None` when it was skipped.
    pub prefix_time: Option<Duration>,
    pub merge_time: Option<Duration>,
    pub suffix_hits: usize,
    pub prefix_hits: usize,
    /// Duplicates dropped by the merge. Zero unless the store returns a
    /// path it was asked to exclude.
    pub duplicates: usize,
}

impl SearchMetrics {
    pub fn total(&self) -> Duration {
        self.suffix_time.unwrap_or_default()
            + self.prefix_time.unwrap_or_default()
            + self.merge_time.unwrap_or_default()
    }

    pub fn prefix_skipped(&self) -> bool {
        self.prefix_time.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchResult {
    pub records: Vec<FileRecord>,
    pub metrics: SearchMetrics,
}

/// Concatenate two ranked lists and drop later repeats of a path.
///
/// Relative order is kept, so every `primary` record stays ahead of every
/// `secondary` one.
pub fn merge_dedup(primary: Vec<FileRecord>, secondary: Vec<FileRecord>) -> Vec<FileRecord> {
    let mut seen: HashSet<String> = HashSet::with_capacity(primary.len() + secondary.len());
    let mut out = Vec::with_capacity(primary.len() + secondary.len());

    for record in primary.into_iter().chain(secondary) {
        if seen.insert(record.path.clone()) {
            out.push(record);
        }
    }
    out
}

/// Hybrid substring search: suffix-path matches first, topped up with
/// full-path matches not already returned while budget remains.
pub struct SearchEngine<S: IndexStore + ?Sized> {
    store: Arc<S>,
}

impl<S: IndexStore + ?Sized> SearchEngine<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// At most `limit` records, no path twice. Store failures are logged
    /// and treated as empty results.
    pub async fn search(
        &self,
        query: &str,
        extensions: Option<&ExtensionSet>,
        limit: usize,
    ) -> Vec<FileRecord> {
        self.search_detailed(query, extensions, limit).await.records
    }

    pub async fn search_detailed(
        &self,
        query: &str,
        extensions: Option<&ExtensionSet>,
        limit: usize,
    ) -> SearchResult {
        let words = tokenize(query);
        let mut metrics = SearchMetrics::default();

        let start = Instant::now();
        let mut suffix = match self.store.query_by_suffix(&words, extensions, limit).await {
            Ok(records) => records,
            Err(e) => {
                warn!("suffix query for {query:?} failed: {e}");
                Vec::new()
            }
        };
        suffix.truncate(limit);
        metrics.suffix_time = Some(start.elapsed());
        metrics.suffix_hits = suffix.len();

        let remaining = limit - suffix.len();
        let prefix = if remaining == 0 {
            debug!("suffix matches filled the limit of {limit}; skipping full-path query");
            Vec::new()
        } else {
            let start = Instant::now();
            let seen: HashSet<String> = suffix.iter().map(|r| r.path.clone()).collect();
            let mut prefix = match self
                .store
                .query_by_prefix(&words, extensions, &seen, remaining)
                .await
            {
                Ok(records) => records,
                Err(e) => {
                    warn!("full-path query for {query:?} failed: {e}");
                    Vec::new()
                }
            };
            prefix.truncate(remaining);
            metrics.prefix_time = Some(start.elapsed());
            metrics.prefix_hits = prefix.len();
            prefix
        };

        let start = Instant::now();
        let fetched = suffix.len() + prefix.len();
        let records = merge_dedup(suffix, prefix);
        metrics.merge_time = Some(start.elapsed());
        metrics.duplicates = fetched - records.len();

        debug!(
            "search {query:?}: {} suffix + {} full-path hits, {} after dedup",
            metrics.suffix_hits,
            metrics.prefix_hits,
            records.len()
        );

        SearchResult { records, metrics }
    }
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod tests;
