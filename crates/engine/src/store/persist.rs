use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::Path,
};

use bincode::config;
use chrono::{DateTime, Utc};
use crc32fast::Hasher;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use trawl_fs::{FileRecord, ScannedFile};

use crate::error::{StoreError, StoreResult};

/// Magic number: "TRWL" in little-endian
pub const SNAPSHOT_MAGIC: u32 = 0x4C57_5254;
pub const SNAPSHOT_VERSION: u32 = 1;
/// magic, version, payload crc32, payload length
pub const HEADER_LEN: usize = 4 + 4 + 4 + 8;

/// On-disk form of a record. Derived fields are rebuilt from `path` on
/// load, so only what the filesystem told us is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub path: String,
    /// Microseconds since the Unix epoch
    pub created_us: i64,
    pub modified_us: i64,
    pub size: u64,
}

impl From<&FileRecord> for SnapshotEntry {
    fn from(r: &FileRecord) -> Self {
        Self {
            path: r.path.clone(),
            created_us: r.created_at.timestamp_micros(),
            modified_us: r.modified_at.timestamp_micros(),
            size: r.size,
        }
    }
}

impl SnapshotEntry {
    pub fn into_scanned(self) -> ScannedFile {
        ScannedFile {
            path: self.path,
            created_at: from_micros(self.created_us),
            modified_at: from_micros(self.modified_us),
            size: self.size,
        }
    }
}

fn from_micros(us: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_micros(us).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Serialize `entries` with header into `writer`.
pub fn write_snapshot_to<W: Write>(writer: W, entries: &[SnapshotEntry]) -> StoreResult<()> {
    let payload = bincode::serde::encode_to_vec(entries, config::standard())?;

    let mut hasher = Hasher::new();
    hasher.update(&payload);
    let crc = hasher.finalize();

    let mut writer = BufWriter::new(writer);
    writer.write_all(&SNAPSHOT_MAGIC.to_le_bytes())?;
    writer.write_all(&SNAPSHOT_VERSION.to_le_bytes())?;
    writer.write_all(&crc.to_le_bytes())?;
    writer.write_all(&(payload.len() as u64).to_le_bytes())?;
    writer.write_all(&payload)?;
    writer.flush()?;
    Ok(())
}

/// Atomic snapshot write: temp file in the same directory, fsync, rename.
pub fn write_snapshot_atomic(path: &Path, entries: &[SnapshotEntry]) -> StoreResult<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let tmp = NamedTempFile::new_in(parent)?;

    write_snapshot_to(tmp.as_file(), entries)?;

    tmp.as_file().sync_all()?;

    tmp.persist(path).map_err(|e| e.error)?;

    #[cfg(unix)]
    {
        if let Ok(dir) = File::open(parent) {
            let _ = dir.sync_all();
        }
    }

    Ok(())
}

/// Validate header and checksum, then decode the entries.
pub fn decode_snapshot(bytes: &[u8]) -> StoreResult<Vec<SnapshotEntry>> {
    if bytes.len() < HEADER_LEN {
        return Err(StoreError::Corrupt(format!(
            "{} bytes is shorter than the header",
            bytes.len()
        )));
    }

    let (header, payload) = bytes.split_at(HEADER_LEN);
    let u32_at =
        |i: usize| u32::from_le_bytes([header[i], header[i + 1], header[i + 2], header[i + 3]]);

    let magic = u32_at(0);
    if magic != SNAPSHOT_MAGIC {
        return Err(StoreError::Corrupt(format!("bad magic {magic:#010x}")));
    }

    let version = u32_at(4);
    if version != SNAPSHOT_VERSION {
        return Err(StoreError::Corrupt(format!(
            "unsupported version {version} (expected {SNAPSHOT_VERSION})"
        )));
    }

    let crc = u32_at(8);
    let mut len_bytes = [0u8; 8];
    len_bytes.copy_from_slice(&header[12..20]);
    let len = u64::from_le_bytes(len_bytes);
    if len != payload.len() as u64 {
        return Err(StoreError::Corrupt(format!(
            "payload is {} bytes, header says {len}",
            payload.len()
        )));
    }

    let mut hasher = Hasher::new();
    hasher.update(payload);
    if hasher.finalize() != crc {
        return Err(StoreError::Corrupt("checksum mismatch".into()));
    }

    let (entries, _) = bincode::serde::decode_from_slice(payload, config::standard())?;
    Ok(entries)
}

/// Read a snapshot file. A missing file is an empty snapshot.
pub fn read_snapshot(path: &Path) -> StoreResult<Vec<SnapshotEntry>> {
    match fs::read(path) {
        Ok(bytes) => decode_snapshot(&bytes),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[path = "persist_tests.rs"]
mod tests;
