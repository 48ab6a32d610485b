use std::sync::Arc;

use chrono::{DateTime, Utc};
use hashbrown::HashSet;
use tempfile::tempdir;
use trawl_fs::{ExtensionSet, ScannedFile};

use super::*;

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap()
}

fn file(path: &str, created: i64, size: u64) -> ScannedFile {
    ScannedFile {
        path: path.to_owned(),
        created_at: at(created),
        modified_at: at(created + 5),
        size,
    }
}

fn words(ws: &[&str]) -> Vec<String> {
    ws.iter().map(|w| (*w).to_owned()).collect()
}

fn paths(records: &[FileRecord]) -> Vec<&str> {
    records.iter().map(|r| r.path.as_str()).collect()
}

async fn seeded() -> SnapshotStore {
    let store = SnapshotStore::in_memory();
    for (path, created) in [
        ("/home/ada/Downloads/SteamSetup.exe", 300),
        ("/home/ada/Downloads/steam-old/SteamSetup.exe", 100),
        ("/home/ada/Games/Steam/uninstall.exe", 200),
        ("/home/ada/Downloads/report.zip", 400),
        ("/opt/steam/bin/runtime.tar.gz", 50),
    ] {
        IndexStore::upsert(&store, file(path, created, 10)).await.unwrap();
    }
    store
}

#[tokio::test]
async fn upsert_is_keyed_by_path() {
    let store = SnapshotStore::in_memory();

    let first = IndexStore::upsert(&store, file("/a/b/c.zip", 10, 1)).await.unwrap();
    let second = IndexStore::upsert(&store, file("/a/b/c.zip", 10, 99)).await.unwrap();

    assert_eq!(first.path, second.path);
    assert_eq!(second.size, 99);
    assert_eq!(store.len().unwrap(), 1);
    assert_eq!(store.find_all().await.unwrap()[0].size, 99);
}

#[tokio::test]
async fn suffix_query_orders_newest_first() {
    let store = seeded().await;

    let hits = store.query_by_suffix(&words(&["steam"]), None, 10).await.unwrap();
    assert_eq!(
        paths(&hits),
        vec![
            "/home/ada/Downloads/SteamSetup.exe",
            "/home/ada/Games/Steam/uninstall.exe",
            "/home/ada/Downloads/steam-old/SteamSetup.exe",
        ]
    );
}

#[tokio::test]
async fn suffix_query_respects_limit() {
    let store = seeded().await;
    let hits = store.query_by_suffix(&words(&["steam"]), None, 2).await.unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].path, "/home/ada/Downloads/SteamSetup.exe");

    assert!(store.query_by_suffix(&words(&["steam"]), None, 0).await.unwrap().is_empty());
}

#[tokio::test]
async fn words_are_conjunctive() {
    let store = seeded().await;

    let hits = store
        .query_by_suffix(&words(&["steam", "old"]), None, 10)
        .await
        .unwrap();
    assert_eq!(paths(&hits), vec!["/home/ada/Downloads/steam-old/SteamSetup.exe"]);

    let none = store
        .query_by_suffix(&words(&["steam", "zzz"]), None, 10)
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn prefix_query_sees_whole_path() {
    let store = seeded().await;

    // "opt" only appears above the suffix
    assert!(store.query_by_suffix(&words(&["opt"]), None, 10).await.unwrap().is_empty());
    let hits = store.query_by_prefix(&words(&["opt"]), None, &HashSet::new(), 10).await.unwrap();
    assert_eq!(paths(&hits), vec!["/opt/steam/bin/runtime.tar.gz"]);

    // Words may straddle the prefix/suffix boundary
    let hits = store
        .query_by_prefix(&words(&["ada/downloads/report"]), None, &HashSet::new(), 10)
        .await
        .unwrap();
    assert_eq!(paths(&hits), vec!["/home/ada/Downloads/report.zip"]);
}

#[tokio::test]
async fn excluded_paths_do_not_use_up_the_limit() {
    let store = seeded().await;
    let all = store
        .query_by_prefix(&words(&["steam"]), None, &HashSet::new(), 10)
        .await
        .unwrap();
    assert!(all.len() >= 2);

    let newest: HashSet<String> = [all[0].path.clone()].into_iter().collect();
    let rest = store
        .query_by_prefix(&words(&["steam"]), None, &newest, 1)
        .await
        .unwrap();
    assert_eq!(paths(&rest), vec![all[1].path.as_str()]);
}

#[tokio::test]
async fn short_needles_fall_back_to_scanning() {
    let store = seeded().await;
    let hits = store.query_by_suffix(&words(&["gz"]), None, 10).await.unwrap();
    assert_eq!(paths(&hits), vec!["/opt/steam/bin/runtime.tar.gz"]);
}

#[tokio::test]
async fn extension_filter_applies_to_both_sources() {
    let store = seeded().await;
    let exts = ExtensionSet::new(["zip"]);

    let hits = store.query_by_suffix(&words(&[]), Some(&exts), 10).await.unwrap();
    assert_eq!(paths(&hits), vec!["/home/ada/Downloads/report.zip"]);

    let hits = store.query_by_prefix(&words(&["ada"]), Some(&exts), &HashSet::new(), 10).await.unwrap();
    assert_eq!(paths(&hits), vec!["/home/ada/Downloads/report.zip"]);

    let empty = ExtensionSet::default();
    assert!(store
        .query_by_prefix(&words(&["ada"]), Some(&empty), &HashSet::new(), 10)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn prefix_field_clauses_are_verified_without_postings() {
    let store = seeded().await;
    let hits = store
        .query(
            vec![
                Clause::contains(Field::Prefix, "/home/ada"),
                Clause::contains(Field::Suffix, "setup"),
            ],
            10,
        )
        .await
        .unwrap();
    assert_eq!(
        paths(&hits),
        vec![
            "/home/ada/Downloads/SteamSetup.exe",
            "/home/ada/Downloads/steam-old/SteamSetup.exe",
        ]
    );
}

#[tokio::test]
async fn find_all_lists_everything_newest_first() {
    let store = seeded().await;
    let all = store.find_all().await.unwrap();
    assert_eq!(all.len(), 5);
    assert!(all.windows(2).all(|w| w[0].created_at >= w[1].created_at));
}

#[tokio::test]
async fn unloaded_store_is_not_ready() {
    let store = SnapshotStore {
        path: None,
        table: RwLock::new(None),
    };

    assert!(!store.is_ready());
    assert!(matches!(store.ping().await, Err(StoreError::NotReady)));
    assert!(matches!(
        IndexStore::upsert(&store, file("/a/b/c.zip", 1, 1)).await,
        Err(StoreError::NotReady)
    ));
    assert!(matches!(store.find_all().await, Err(StoreError::NotReady)));
    assert!(Recorder::upsert(&store, file("/a/b/c.zip", 1, 1)).await.is_err());
}

#[tokio::test]
async fn persist_and_reload() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("records.bin");

    let store = SnapshotStore::load(&path).await.unwrap();
    assert!(store.is_empty().unwrap());
    IndexStore::upsert(&store, file("/home/ada/Downloads/SteamSetup.exe", 300, 7)).await.unwrap();
    IndexStore::upsert(&store, file("/home/ada/Downloads/report.zip", 400, 8)).await.unwrap();
    assert_eq!(store.persist().await.unwrap(), 2);

    let reloaded = SnapshotStore::load(&path).await.unwrap();
    assert_eq!(reloaded.find_all().await.unwrap(), store.find_all().await.unwrap());

    // Postings are rebuilt on load
    let hits = reloaded.query_by_suffix(&words(&["steam"]), None, 10).await.unwrap();
    assert_eq!(paths(&hits), vec!["/home/ada/Downloads/SteamSetup.exe"]);
}

#[tokio::test]
async fn open_becomes_ready_in_background() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("records.bin");
    {
        let store = SnapshotStore::load(&path).await.unwrap();
        IndexStore::upsert(&store, file("/a/b/c.zip", 1, 1)).await.unwrap();
        store.persist().await.unwrap();
    }

    let store = SnapshotStore::open(&path);
    let mut ready = false;
    for _ in 0..200 {
        if store.ping().await.is_ok() {
            ready = true;
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert!(ready);
    assert_eq!(store.len().unwrap(), 1);
}

#[tokio::test]
async fn corrupt_snapshot_starts_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("records.bin");
    std::fs::write(&path, b"definitely not a snapshot").unwrap();

    let store = SnapshotStore::load(&path).await.unwrap();
    assert!(store.is_ready());
    assert!(store.is_empty().unwrap());
}

#[tokio::test]
async fn in_memory_persist_writes_nothing() {
    let store = seeded().await;
    assert_eq!(store.persist().await.unwrap(), 0);
    assert!(store.path().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_upserts_of_one_path_keep_one_record() {
    let store = Arc::new(SnapshotStore::in_memory());

    let mut tasks = Vec::new();
    for i in 0..64u64 {
        let store = Arc::clone(&store);
        tasks.push(tokio::spawn(async move {
            IndexStore::upsert(&*store, file("/x/y/same.zip", 1, i)).await.unwrap();
        }));
    }
    for t in tasks {
        t.await.unwrap();
    }

    assert_eq!(store.len().unwrap(), 1);
    let hits = store.query_by_suffix(&words(&["same"]), None, 10).await.unwrap();
    assert_eq!(hits.len(), 1);
}
