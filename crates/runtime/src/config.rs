use std::{path::PathBuf, time::Duration};

pub const PROGRAM_NAME: &str = "trawl";
pub const PROGRAM_LOG_LEVEL: &str = "TRAWL_LOG_LEVEL";
/// Overrides the location of the record store.
pub const PROGRAM_STORE_PATH: &str = "TRAWL_STORE";
pub const STORE_FILE_NAME: &str = "records.bin";

/// Directories nested deeper than this below the crawl root are not listed.
pub const DEFAULT_MAX_DEPTH: usize = 250;
/// Files must be strictly larger than this many bytes to be recorded.
pub const DEFAULT_MIN_SIZE: u64 = 0;
pub const DEFAULT_SEARCH_LIMIT: usize = 50;

/// How many times to poll the store before giving up on it being ready.
pub const READY_ATTEMPTS: u32 = 10;
pub const READY_DELAY: Duration = Duration::from_millis(200);

/// Archive and installer extensions recorded by default.
/// All entries must be lowercase and without the leading dot.
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "exe", "msi", "zip", "rar", "7z", "dmg", "pkg", "deb", "rpm", "appimage", "iso", "tar", "gz",
    "tgz", "bz2", "xz", "jar", "apk", "cab",
];

/// Pseudo and volatile filesystems that never hold user downloads.
pub const DEFAULT_SYSTEM_SKIP_PREFIXES: &[&str] = &[
    "/proc",
    "/sys",
    "/dev",
    "/run",
    "/var/run",
    "/var/tmp",
    "/private/tmp",
];

/// Gitignore-style patterns for dependency and VCS trees.
pub const DEFAULT_PROJECT_IGNORE_PATTERNS: &[&str] = &[
    ".git/",
    ".hg/",
    ".svn/",
    "node_modules/",
    "__pycache__/",
    ".venv/",
    "venv/",
    "target/",
];

pub fn xdg_or_home(xdg_var: &str, home_suffix: &str) -> PathBuf {
    match std::env::var_os(xdg_var) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(home_suffix),
    }
}

/// Default root for the program to start scanning
pub fn default_scan_root() -> PathBuf {
    dirs::home_dir()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn trawl_dir() -> PathBuf {
    xdg_or_home("XDG_CACHE_HOME", ".cache").join(PROGRAM_NAME)
}

/// Store file location, honouring `TRAWL_STORE` when set and non-empty.
pub fn default_store_path() -> PathBuf {
    match std::env::var_os(PROGRAM_STORE_PATH) {
        Some(p) if !p.is_empty() => PathBuf::from(p),
        _ => trawl_dir().join(STORE_FILE_NAME),
    }
}

pub fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|s| (*s).to_owned()).collect()
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
