mod clause;
mod persist;
mod snapshot;

use async_trait::async_trait;
use hashbrown::HashSet;
use trawl_fs::{ExtensionSet, FileRecord, ScannedFile};

use crate::error::StoreResult;

pub use clause::{Clause, CompiledQuery, Field};
pub use persist::{
    SNAPSHOT_MAGIC, SNAPSHOT_VERSION, SnapshotEntry, decode_snapshot, read_snapshot,
    write_snapshot_atomic,
};
pub use snapshot::SnapshotStore;

/// A keyed collection of `FileRecord`s with substring search over the
/// lowercased path fields.
///
/// Query results are ordered by `created_at` descending and hold at most
/// `limit` records.
#[async_trait]
pub trait IndexStore: Send + Sync + 'static {
    /// `Ok` once the store can serve requests.
    async fn ping(&self) -> StoreResult<()>;

    /// Insert, or refresh the record already stored under `file.path`.
    async fn upsert(&self, file: ScannedFile) -> StoreResult<FileRecord>;

    /// Records matching every clause.
    async fn query(&self, clauses: Vec<Clause>, limit: usize) -> StoreResult<Vec<FileRecord>>;

    async fn find_all(&self) -> StoreResult<Vec<FileRecord>>;

    /// Every word is a substring of the suffix path.
    async fn query_by_suffix(
        &self,
        words: &[String],
        extensions: Option<&ExtensionSet>,
        limit: usize,
    ) -> StoreResult<Vec<FileRecord>> {
        self.query(Clause::for_words(Field::Suffix, words, extensions), limit)
            .await
    }

    /// Every word is a substring of the full lowercased path, and the path
    /// is not in `exclude`.
    ///
    /// `exclude` holds records the caller already has, so they do not take
    /// up any of `limit`.
    async fn query_by_prefix(
        &self,
        words: &[String],
        extensions: Option<&ExtensionSet>,
        exclude: &HashSet<String>,
        limit: usize,
    ) -> StoreResult<Vec<FileRecord>> {
        let mut clauses = Clause::for_words(Field::Path, words, extensions);
        if !exclude.is_empty() {
            clauses.push(Clause::PathNotIn(exclude.clone()));
        }
        self.query(clauses, limit).await
    }
}
