use std::sync::Arc;

use async_trait::async_trait;

use crate::record::{FileRecord, ScannedFile};

/// Where the crawler sends files worth keeping.
///
/// Implementations must upsert by `path`: the same path may arrive many
/// times across crawls, and concurrently within one.
#[async_trait]
pub trait Recorder: Send + Sync + 'static {
    async fn upsert(&self, file: ScannedFile) -> anyhow::Result<FileRecord>;
}

#[async_trait]
impl<R: Recorder + ?Sized> Recorder for Arc<R> {
    async fn upsert(&self, file: ScannedFile) -> anyhow::Result<FileRecord> {
        (**self).upsert(file).await
    }
}
