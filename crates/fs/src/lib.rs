mod classify;
mod crawler;
mod excludes;
mod path;
mod quiescence;
mod record;
mod recorder;

pub use classify::{ExtensionSet, is_recordable, normalize_extension, quick_scan_should_descend};
pub use crawler::{CrawlCounters, CrawlEpisode, CrawlMode, CrawlOptions, CrawlSummary, Crawler};
pub use excludes::{IgnoreEngine, ScanFilter, UserExcludes};
pub use path::{PathParts, decompose, extension_of, split_suffix};
pub use quiescence::{Completion, InFlight, QuiescenceTracker};
pub use record::{FileRecord, ScannedFile};
pub use recorder::Recorder;
