mod config;
pub mod logging;

pub use config::{
    DEFAULT_EXTENSIONS, DEFAULT_MAX_DEPTH, DEFAULT_MIN_SIZE, DEFAULT_PROJECT_IGNORE_PATTERNS,
    DEFAULT_SEARCH_LIMIT, DEFAULT_SYSTEM_SKIP_PREFIXES, PROGRAM_NAME, READY_ATTEMPTS, READY_DELAY,
    default_extensions, default_scan_root, default_store_path, trawl_dir,
};

pub use logging::init;
