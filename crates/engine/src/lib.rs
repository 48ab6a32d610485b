mod error;
mod helpers;
mod ready;
mod search;
mod store;
mod trigram;

pub use error::{StoreError, StoreResult};
pub use helpers::{insert_sorted, intersect_all, intersect_sorted, intersect_sorted_into};
pub use ready::{ReadyPolicy, await_ready};
pub use search::{SearchEngine, SearchMetrics, SearchResult, merge_dedup, tokenize};
pub use store::{
    Clause, CompiledQuery, Field, IndexStore, SNAPSHOT_MAGIC, SNAPSHOT_VERSION, SnapshotEntry,
    SnapshotStore, decode_snapshot, read_snapshot, write_snapshot_atomic,
};
pub use trigram::{QueryTrigrams, Trigram, index_trigrams, query_trigrams};
