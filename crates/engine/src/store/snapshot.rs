use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use hashbrown::HashMap;
use log::{debug, info, warn};
use parking_lot::RwLock;
use trawl_fs::{FileRecord, Recorder, ScannedFile};

use super::{
    Clause, CompiledQuery, Field, IndexStore,
    persist::{SnapshotEntry, read_snapshot, write_snapshot_atomic},
};
use crate::{
    error::{StoreError, StoreResult},
    helpers::{insert_sorted, intersect_all},
    trigram::{Trigram, index_trigrams, query_trigrams},
};

type RecordId = u32;
type Postings = HashMap<Trigram, Vec<RecordId>>;

#[derive(Debug, Default)]
struct Table {
    /// Indexed by `RecordId`. Records are never removed.
    records: Vec<FileRecord>,
    by_path: HashMap<String, RecordId>,
    suffix_grams: Postings,
    path_grams: Postings,
}

impl Table {
    fn from_entries(entries: Vec<SnapshotEntry>) -> Self {
        let mut table = Table::default();
        for entry in entries {
            table.upsert(entry.into_scanned());
        }
        table
    }

    fn upsert(&mut self, file: ScannedFile) -> FileRecord {
        if let Some(&id) = self.by_path.get(&file.path) {
            // Derived fields only depend on the path, so postings stay valid.
            let record = &mut self.records[id as usize];
            record.refresh(&file);
            return record.clone();
        }

        let id = self.records.len() as RecordId;
        let record = FileRecord::from_scanned(file);

        for t in index_trigrams(&record.suffix_path) {
            insert_sorted(self.suffix_grams.entry(t).or_default(), id);
        }
        for t in index_trigrams(&record.path_lower) {
            insert_sorted(self.path_grams.entry(t).or_default(), id);
        }

        self.by_path.insert(record.path.clone(), id);
        self.records.push(record.clone());
        record
    }

    fn postings(&self, field: Field) -> Option<&Postings> {
        match field {
            Field::Suffix => Some(&self.suffix_grams),
            Field::Path => Some(&self.path_grams),
            Field::Prefix => None,
        }
    }

    /// Ids that may match, or `None` if no needle could narrow the search.
    fn candidates(&self, query: &CompiledQuery) -> Option<Vec<RecordId>> {
        let mut lists: Vec<&[RecordId]> = Vec::new();

        for (field, needle) in query.needles() {
            let Some(index) = self.postings(field) else {
                continue;
            };
            for t in query_trigrams(needle) {
                match index.get(&t) {
                    Some(ids) => lists.push(ids),
                    None => return Some(Vec::new()),
                }
            }
        }

        intersect_all(lists)
    }

    fn query(&self, query: &CompiledQuery, limit: usize) -> Vec<FileRecord> {
        if limit == 0 || query.is_unsatisfiable() {
            return Vec::new();
        }

        let mut hits: Vec<&FileRecord> = match self.candidates(query) {
            Some(ids) => ids
                .iter()
                .map(|&id| &self.records[id as usize])
                .filter(|r| query.matches(r))
                .collect(),
            None => self.records.iter().filter(|r| query.matches(r)).collect(),
        };

        newest_first(&mut hits);
        hits.truncate(limit);
        hits.into_iter().cloned().collect()
    }

    fn all(&self) -> Vec<FileRecord> {
        let mut all: Vec<&FileRecord> = self.records.iter().collect();
        newest_first(&mut all);
        all.into_iter().cloned().collect()
    }

    fn entries(&self) -> Vec<SnapshotEntry> {
        self.records.iter().map(SnapshotEntry::from).collect()
    }
}

/// `created_at` descending, ties by path so results are deterministic.
fn newest_first(records: &mut [&FileRecord]) {
    records.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.path.cmp(&b.path))
    });
}

/// Read a snapshot, falling back to an empty table on any failure.
fn load_table(path: &Path) -> Table {
    match read_snapshot(path) {
        Ok(entries) => {
            debug!("loaded {} records from {}", entries.len(), path.display());
            Table::from_entries(entries)
        }
        Err(e) => {
            warn!(
                "could not load snapshot {}: {e}; starting empty",
                path.display()
            );
            Table::default()
        }
    }
}

/// In-memory record table with trigram postings over the suffix and full
/// paths, optionally backed by a snapshot file.
///
/// Until the snapshot has been loaded every operation fails with
/// `StoreError::NotReady`.
pub struct SnapshotStore {
    path: Option<PathBuf>,
    table: RwLock<Option<Table>>,
}

impl SnapshotStore {
    /// Ready at once, never written to disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            table: RwLock::new(Some(Table::default())),
        }
    }

    /// Return immediately and load `path` on a blocking task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn open(path: impl Into<PathBuf>) -> Arc<Self> {
        let store = Arc::new(Self {
            path: Some(path.into()),
            table: RwLock::new(None),
        });

        let loader = Arc::clone(&store);
        tokio::task::spawn_blocking(move || {
            if let Some(path) = loader.path.as_deref() {
                let table = load_table(path);
                *loader.table.write() = Some(table);
            }
        });

        store
    }

    /// Load `path` and return once the store is ready.
    pub async fn load(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let from = path.clone();
        let table = tokio::task::spawn_blocking(move || load_table(&from)).await?;

        Ok(Self {
            path: Some(path),
            table: RwLock::new(Some(table)),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_ready(&self) -> bool {
        self.table.read().is_some()
    }

    pub fn len(&self) -> StoreResult<usize> {
        self.with_table(|t| t.records.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        self.len().map(|n| n == 0)
    }

    /// Write every record to the backing file. Returns how many were
    /// written; in-memory stores write nothing.
    pub async fn persist(&self) -> StoreResult<usize> {
        let Some(path) = self.path.clone() else {
            debug!("in-memory store, nothing to persist");
            return Ok(0);
        };

        let entries = self.with_table(Table::entries)?;
        let count = entries.len();

        let target = path.clone();
        tokio::task::spawn_blocking(move || write_snapshot_atomic(&target, &entries)).await??;

        info!("persisted {count} records to {}", path.display());
        Ok(count)
    }

    fn with_table<T>(&self, f: impl FnOnce(&Table) -> T) -> StoreResult<T> {
        self.table.read().as_ref().map(f).ok_or(StoreError::NotReady)
    }

    fn with_table_mut<T>(&self, f: impl FnOnce(&mut Table) -> T) -> StoreResult<T> {
        self.table.write().as_mut().map(f).ok_or(StoreError::NotReady)
    }
}

#[async_trait]
impl IndexStore for SnapshotStore {
    async fn ping(&self) -> StoreResult<()> {
        self.with_table(|_| ())
    }

    async fn upsert(&self, file: ScannedFile) -> StoreResult<FileRecord> {
        self.with_table_mut(|t| t.upsert(file))
    }

    async fn query(&self, clauses: Vec<Clause>, limit: usize) -> StoreResult<Vec<FileRecord>> {
        let query = CompiledQuery::compile(clauses);
        self.with_table(|t| t.query(&query, limit))
    }

    async fn find_all(&self) -> StoreResult<Vec<FileRecord>> {
        self.with_table(Table::all)
    }
}

#[async_trait]
impl Recorder for SnapshotStore {
    async fn upsert(&self, file: ScannedFile) -> anyhow::Result<FileRecord> {
        Ok(IndexStore::upsert(self, file).await?)
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
