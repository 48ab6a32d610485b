use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::path::decompose;

/// One file as observed by the crawler, before decomposition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    /// Full path as encountered
    pub path: String,
    /// Birth time, or modification time where the platform has none
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub size: u64,
}

/// Persisted metadata for one file. `path` is the unique key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Full path, unmodified
    pub path: String,
    /// Case-folded `path`
    pub path_lower: String,
    /// Every segment except the last two, case-folded
    pub prefix_path: String,
    /// Parent folder and file name, case-folded
    pub suffix_path: String,
    /// Lowercase extension without dot, empty if none
    pub extension: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    /// Size in bytes
    pub size: u64,
}

impl FileRecord {
    pub fn from_scanned(file: ScannedFile) -> Self {
        let parts = decompose(&file.path);

        Self {
            path: file.path,
            path_lower: parts.path_lower,
            prefix_path: parts.prefix_path,
            suffix_path: parts.suffix_path,
            extension: parts.extension,
            created_at: file.created_at,
            modified_at: file.modified_at,
            size: file.size,
        }
    }

    /// Refresh the mutable metadata from a rescan of the same path.
    ///
    /// Derived fields depend only on `path` and are left untouched.
    pub fn refresh(&mut self, file: &ScannedFile) {
        debug_assert_eq!(self.path, file.path);
        self.created_at = file.created_at;
        self.modified_at = file.modified_at;
        self.size = file.size;
    }
}

impl From<ScannedFile> for FileRecord {
    fn from(file: ScannedFile) -> Self {
        Self::from_scanned(file)
    }
}
