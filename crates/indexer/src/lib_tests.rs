use std::{fs, path::Path, time::Duration};

use tempfile::tempdir;
use trawl_engine::{IndexStore, SearchEngine};
use trawl_fs::{CrawlMode, ExtensionSet};

use super::*;

fn touch(root: &Path, rel: &str, bytes: usize) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, vec![b'x'; bytes]).unwrap();
}

fn options(mode: CrawlMode) -> CrawlOptions {
    CrawlOptions::new(mode, ExtensionSet::new(["zip", "exe"]))
}

fn fast() -> ReadyPolicy {
    ReadyPolicy {
        attempts: 50,
        delay: Duration::from_millis(10),
    }
}

#[tokio::test]
async fn crawl_persists_recorded_files() {
    let tree = tempdir().unwrap();
    touch(tree.path(), "dl/setup.exe", 10);
    touch(tree.path(), "dl/notes.txt", 10);
    touch(tree.path(), "dl/old/bundle.zip", 10);

    let state = tempdir().unwrap();
    let store_path = state.path().join("records.bin");

    let report = crawl_and_persist(tree.path(), &store_path, options(CrawlMode::Full), fast())
        .await
        .unwrap();
    assert_eq!(report.summary.counters.recorded, 2);
    assert_eq!(report.persisted, 2);
    assert_eq!(report.store.as_deref(), Some(store_path.as_path()));

    let reloaded = Arc::new(SnapshotStore::load(&store_path).await.unwrap());
    assert_eq!(reloaded.len().unwrap(), 2);

    let engine = SearchEngine::new(reloaded);
    let hits = engine.search("old bundle", None, 10).await;
    assert_eq!(hits.len(), 1);
    assert!(hits[0].path.ends_with("bundle.zip"));
}

#[tokio::test]
async fn repeated_crawls_do_not_duplicate() {
    let tree = tempdir().unwrap();
    touch(tree.path(), "a/one.zip", 5);
    touch(tree.path(), "b/two.exe", 5);

    let state = tempdir().unwrap();
    let store_path = state.path().join("records.bin");

    for _ in 0..2 {
        crawl_and_persist(tree.path(), &store_path, options(CrawlMode::Quick), fast())
            .await
            .unwrap();
    }

    // Grow a file between crawls; the record is refreshed in place
    touch(tree.path(), "a/one.zip", 50);
    let report = crawl_and_persist(tree.path(), &store_path, options(CrawlMode::Quick), fast())
        .await
        .unwrap();
    assert_eq!(report.persisted, 2);

    let store = SnapshotStore::load(&store_path).await.unwrap();
    let all = store.find_all().await.unwrap();
    assert_eq!(all.len(), 2);
    let one = all.iter().find(|r| r.path.ends_with("one.zip")).unwrap();
    assert_eq!(one.size, 50);
}

#[tokio::test]
async fn in_memory_crawl_persists_nothing() {
    let tree = tempdir().unwrap();
    touch(tree.path(), "x/y.zip", 3);

    let store = Arc::new(SnapshotStore::in_memory());
    let report = crawl_into(Arc::clone(&store), tree.path(), options(CrawlMode::Full))
        .await
        .unwrap();

    assert_eq!(report.summary.counters.recorded, 1);
    assert_eq!(report.persisted, 0);
    assert!(report.store.is_none());
    assert_eq!(store.len().unwrap(), 1);
}

#[tokio::test]
async fn default_filter_skips_dependency_trees() {
    let tree = tempdir().unwrap();
    let root = tree.path().canonicalize().unwrap();
    touch(&root, "proj/node_modules/pkg/dist.zip", 3);
    touch(&root, "proj/release.zip", 3);
    touch(&root, "private/keep.zip", 3);

    let filter = create_scan_filter(&root, true, vec![root.join("private")]).unwrap();
    let store = Arc::new(SnapshotStore::in_memory());
    let report = crawl_into(
        Arc::clone(&store),
        &root,
        options(CrawlMode::Full).with_filter(filter),
    )
    .await
    .unwrap();

    assert_eq!(report.summary.counters.recorded, 1);
    let all = store.find_all().await.unwrap();
    assert!(all[0].path.ends_with("release.zip"));
}

#[test]
fn filter_without_defaults_has_only_extra_roots() {
    let tree = tempdir().unwrap();
    let root = tree.path().canonicalize().unwrap();

    let filter = create_scan_filter(&root, false, vec![root.join("skip")]).unwrap();
    assert!(filter.is_excluded(&root.join("skip/file.zip")));
    assert!(!filter.is_excluded(&root.join("keep/file.zip")));
    assert!(!filter.is_ignored(&root.join("node_modules"), true));
}

#[tokio::test]
async fn corrupt_store_file_is_replaced_after_crawl() {
    let tree = tempdir().unwrap();
    touch(tree.path(), "a/b.zip", 3);

    let state = tempdir().unwrap();
    let store_path = state.path().join("records.bin");
    fs::write(&store_path, b"garbage").unwrap();

    let report = crawl_and_persist(tree.path(), &store_path, options(CrawlMode::Full), fast())
        .await
        .unwrap();
    assert_eq!(report.persisted, 1);

    let store = SnapshotStore::load(&store_path).await.unwrap();
    assert_eq!(store.len().unwrap(), 1);
}
