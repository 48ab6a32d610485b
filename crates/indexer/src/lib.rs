use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use log::{info, warn};
use serde::Serialize;
use trawl_engine::{ReadyPolicy, SnapshotStore, await_ready};
use trawl_fs::{CrawlOptions, CrawlSummary, Crawler, IgnoreEngine, ScanFilter, UserExcludes};

/// Exclude roots and ignore patterns for a crawl of `root`.
///
/// With `use_defaults` the system skip prefixes and the default project
/// patterns apply; `extra_excludes` are added either way.
pub fn create_scan_filter(
    root: &Path,
    use_defaults: bool,
    extra_excludes: Vec<PathBuf>,
) -> Result<ScanFilter> {
    let mut excludes = if use_defaults {
        UserExcludes::with_system_defaults()
    } else {
        UserExcludes::default()
    };
    for path in extra_excludes {
        excludes.add_root(path);
    }

    let ignore = if use_defaults {
        Some(
            IgnoreEngine::with_defaults(root)
                .with_context(|| format!("Failed to build ignore patterns for {}", root.display()))?,
        )
    } else {
        None
    };

    Ok(ScanFilter::new(excludes, ignore))
}

/// Open the store at `path` and wait, within `policy`, for it to load.
///
/// A store that never reports ready is still returned; its operations will
/// fail individually.
pub async fn open_store(path: &Path, policy: ReadyPolicy) -> Arc<SnapshotStore> {
    let store = SnapshotStore::open(path);
    if !await_ready(&*store, policy).await {
        warn!("store at {} is not ready, proceeding anyway", path.display());
    }
    store
}

#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    #[serde(flatten)]
    pub summary: CrawlSummary,
    /// Records written to the snapshot after the crawl
    pub persisted: usize,
    pub store: Option<PathBuf>,
}

/// Crawl `root` into `store`, then persist it once the episode drains.
pub async fn crawl_into(
    store: Arc<SnapshotStore>,
    root: &Path,
    options: CrawlOptions,
) -> Result<CrawlReport> {
    let crawler = Crawler::new(Arc::clone(&store), options);
    let summary = crawler.scan_directory(root).wait().await;

    let persisted = store.persist().await.with_context(|| match store.path() {
        Some(p) => format!("Failed to persist records to {}", p.display()),
        None => "Failed to persist records".to_owned(),
    })?;

    info!(
        "[indexer] {} recorded, {} persisted",
        summary.counters.recorded, persisted
    );

    Ok(CrawlReport {
        summary,
        persisted,
        store: store.path().map(Path::to_path_buf),
    })
}

/// Open the store at `store_path`, crawl `root` into it and persist.
pub async fn crawl_and_persist(
    root: &Path,
    store_path: &Path,
    options: CrawlOptions,
    policy: ReadyPolicy,
) -> Result<CrawlReport> {
    let store = open_store(store_path, policy).await;
    crawl_into(store, root, options).await
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
