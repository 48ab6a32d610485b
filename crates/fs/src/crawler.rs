use std::{
    fmt,
    fs::Metadata,
    future::Future,
    io,
    path::{Path, PathBuf},
    pin::Pin,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::Serialize;
use tokio::fs;
use trawl_runtime::{DEFAULT_MAX_DEPTH, DEFAULT_MIN_SIZE};

use crate::{
    classify::{ExtensionSet, is_recordable, quick_scan_should_descend},
    excludes::ScanFilter,
    quiescence::{Completion, InFlight, QuiescenceTracker},
    record::ScannedFile,
    recorder::Recorder,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CrawlMode {
    /// Skip the stat for names that are confidently unwanted files.
    #[default]
    Quick,
    /// Stat every entry.
    Full,
}

impl fmt::Display for CrawlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrawlMode::Quick => f.write_str("quick"),
            CrawlMode::Full => f.write_str("full"),
        }
    }
}

#[derive(Debug)]
pub struct CrawlOptions {
    pub mode: CrawlMode,
    /// Extensions worth recording
    pub extensions: ExtensionSet,
    /// Files must be strictly larger than this to be recorded
    pub min_size: u64,
    /// Directories deeper than this below the root are not listed
    pub max_depth: usize,
    pub filter: ScanFilter,
}

impl CrawlOptions {
    pub fn new(mode: CrawlMode, extensions: ExtensionSet) -> Self {
        Self {
            mode,
            extensions,
            min_size: DEFAULT_MIN_SIZE,
            max_depth: DEFAULT_MAX_DEPTH,
            filter: ScanFilter::default(),
        }
    }

    pub fn with_min_size(mut self, min_size: u64) -> Self {
        self.min_size = min_size;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_filter(mut self, filter: ScanFilter) -> Self {
        self.filter = filter;
        self
    }

    #[inline]
    pub fn should_record(&self, path: &str, size: u64) -> bool {
        size > self.min_size && is_recordable(path, &self.extensions)
    }
}

#[derive(Debug, Default)]
struct CrawlStats {
    files_scanned: AtomicU64,
    dirs_scanned: AtomicU64,
    recorded: AtomicU64,
    skipped: AtomicU64,
    errors: AtomicU64,
    depth_limited: AtomicU64,
}

impl CrawlStats {
    #[inline]
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> CrawlCounters {
        CrawlCounters {
            files_scanned: self.files_scanned.load(Ordering::Relaxed),
            dirs_scanned: self.dirs_scanned.load(Ordering::Relaxed),
            recorded: self.recorded.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            depth_limited: self.depth_limited.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CrawlCounters {
    /// Regular files stat'ed, plus names quick mode skipped without a stat
    pub files_scanned: u64,
    pub dirs_scanned: u64,
    /// Successful upserts
    pub recorded: u64,
    /// Entries dropped before stat (quick mode or exclude roots) or by
    /// ignore patterns
    pub skipped: u64,
    /// Listing, stat and persistence failures, and entry tasks that panicked
    pub errors: u64,
    /// Directory frames stopped by the depth guard
    pub depth_limited: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CrawlSummary {
    pub root: PathBuf,
    pub mode: CrawlMode,
    #[serde(flatten)]
    pub counters: CrawlCounters,
    pub elapsed_ms: u64,
}

impl CrawlSummary {
    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }
}

/// Recursive, unbounded fan-out crawler.
///
/// Every directory listing and every entry stat runs as its own task. The
/// crawl of one root is an episode with its own [`QuiescenceTracker`], so
/// concurrent crawls never share state.
pub struct Crawler<R: Recorder> {
    recorder: Arc<R>,
    options: Arc<CrawlOptions>,
}

impl<R: Recorder> Crawler<R> {
    pub fn new(recorder: Arc<R>, options: CrawlOptions) -> Self {
        Self {
            recorder,
            options: Arc::new(options),
        }
    }

    pub fn options(&self) -> &CrawlOptions {
        &self.options
    }

    /// Start crawling `root`. Must be called within a Tokio runtime.
    ///
    /// Work starts immediately in the background; await
    /// [`CrawlEpisode::wait`] for the summary.
    pub fn scan_directory(&self, root: impl Into<PathBuf>) -> CrawlEpisode {
        let root = root.into();
        let episode = Arc::new(Episode {
            recorder: Arc::clone(&self.recorder),
            options: Arc::clone(&self.options),
            tracker: Arc::new(QuiescenceTracker::new()),
            stats: Arc::new(CrawlStats::default()),
        });

        let completion = episode.tracker.start();

        info!(
            "[crawl] starting {} crawl of {} ({} extensions, min size {}, max depth {})",
            self.options.mode,
            root.display(),
            self.options.extensions.len(),
            self.options.min_size,
            self.options.max_depth,
        );

        let handle = CrawlEpisode {
            root: root.clone(),
            mode: self.options.mode,
            tracker: Arc::clone(&episode.tracker),
            stats: Arc::clone(&episode.stats),
            completion,
            started: Instant::now(),
        };

        let held = episode.tracker.hold(root);
        tokio::spawn(episode.scan_dir(held, 0));

        handle
    }
}

/// Handle on a running crawl.
pub struct CrawlEpisode {
    root: PathBuf,
    mode: CrawlMode,
    tracker: Arc<QuiescenceTracker>,
    stats: Arc<CrawlStats>,
    completion: Completion,
    started: Instant,
}

impl CrawlEpisode {
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Paths with work outstanding right now.
    pub fn in_flight(&self) -> usize {
        self.tracker.in_flight()
    }

    /// Counters so far; final once the episode has completed.
    pub fn progress(&self) -> CrawlCounters {
        self.stats.snapshot()
    }

    /// Resolve when every dispatched listing, stat and upsert has finished.
    pub async fn wait(self) -> CrawlSummary {
        // The handle keeps the tracker alive, so the sender is never
        // dropped and this only returns once the set has drained.
        self.completion.wait().await;
        let elapsed = self.started.elapsed();
        let counters = self.stats.snapshot();

        info!(
            "[crawl] finished {} in {:.2}s: {} files, {} dirs, {} recorded, {} skipped, {} errors",
            self.root.display(),
            elapsed.as_secs_f64(),
            counters.files_scanned,
            counters.dirs_scanned,
            counters.recorded,
            counters.skipped,
            counters.errors,
        );

        CrawlSummary {
            root: self.root,
            mode: self.mode,
            counters,
            elapsed_ms: elapsed.as_millis().min(u64::MAX as u128) as u64,
        }
    }
}

type Frame = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// State shared by every task of one crawl.
struct Episode<R: Recorder> {
    recorder: Arc<R>,
    options: Arc<CrawlOptions>,
    tracker: Arc<QuiescenceTracker>,
    stats: Arc<CrawlStats>,
}

impl<R: Recorder> Episode<R> {
    /// One directory frame: list, dispatch every child, release the
    /// directory's own marker when `held` drops.
    ///
    /// Boxed so the frame and `process_entry` can reach each other.
    fn scan_dir(self: Arc<Self>, held: InFlight, depth: usize) -> Frame {
        Box::pin(async move {
            let dir = held.path();

            if depth > self.options.max_depth {
                info!(
                    "[crawl] depth limit {} reached at {}",
                    self.options.max_depth,
                    dir.display()
                );
                CrawlStats::bump(&self.stats.depth_limited);
                return;
            }

            let children = match list_dir(dir).await {
                Ok(children) => children,
                Err(e) => {
                    warn!("[crawl] read_dir({}) failed: {e}", dir.display());
                    CrawlStats::bump(&self.stats.errors);
                    return;
                }
            };

            debug!(
                "[crawl] {} entries in {} (depth {depth})",
                children.len(),
                dir.display()
            );

            for child in children {
                // Marked before dispatch so the set cannot drain while the
                // child waits to be scheduled.
                let child = self.tracker.hold(child);
                tokio::spawn(Arc::clone(&self).process_entry(child, depth));
            }
        })
    }

    async fn process_entry(self: Arc<Self>, held: InFlight, depth: usize) {
        let opts = &self.options;
        let path = held.path();
        // Dropped before `held`, so the error is counted before the path
        // is released.
        let panic_guard = PanicCounter {
            stats: &self.stats,
            path,
        };

        if opts.filter.is_excluded(path) {
            debug!("[crawl] excluded {}", path.display());
            CrawlStats::bump(&self.stats.skipped);
            return;
        }

        if opts.mode == CrawlMode::Quick
            && !quick_scan_should_descend(&path.to_string_lossy(), &opts.extensions)
        {
            CrawlStats::bump(&self.stats.files_scanned);
            CrawlStats::bump(&self.stats.skipped);
            return;
        }

        // lstat: a symlink reports as neither file nor directory and is
        // never followed.
        let meta = match fs::symlink_metadata(path).await {
            Ok(meta) => meta,
            Err(e) => {
                warn!("[crawl] stat({}) failed: {e}", path.display());
                CrawlStats::bump(&self.stats.errors);
                return;
            }
        };

        let file_type = meta.file_type();

        if file_type.is_file() {
            CrawlStats::bump(&self.stats.files_scanned);
            if opts.filter.is_ignored(path, false) {
                CrawlStats::bump(&self.stats.skipped);
            } else {
                self.record(path, &meta).await;
            }
        } else if file_type.is_dir() {
            if opts.filter.is_ignored(path, true) {
                debug!("[crawl] ignored directory {}", path.display());
                CrawlStats::bump(&self.stats.skipped);
                return;
            }
            CrawlStats::bump(&self.stats.dirs_scanned);
            drop(panic_guard);
            Arc::clone(&self).scan_dir(held, depth + 1).await;
        } else {
            debug!("[crawl] not following {}", path.display());
        }
    }

    async fn record(&self, path: &Path, meta: &Metadata) {
        let Some(path_str) = path.to_str() else {
            debug!("[crawl] skipping non UTF-8 path {}", path.display());
            return;
        };

        let size = meta.len();
        if !self.options.should_record(path_str, size) {
            return;
        }

        let (created_at, modified_at) = file_times(meta);
        let file = ScannedFile {
            path: path_str.to_owned(),
            created_at,
            modified_at,
            size,
        };

        match self.recorder.upsert(file).await {
            Ok(_) => {
                debug!("[crawl] recorded {path_str} ({size} bytes)");
                CrawlStats::bump(&self.stats.recorded);
            }
            Err(e) => {
                warn!("[crawl] failed to record {path_str}: {e:#}");
                CrawlStats::bump(&self.stats.errors);
            }
        }
    }
}

/// Counts an entry task that unwinds as an error.
struct PanicCounter<'a> {
    stats: &'a CrawlStats,
    path: &'a Path,
}

impl Drop for PanicCounter<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            warn!("[crawl] task for {} panicked", self.path.display());
            CrawlStats::bump(&self.stats.errors);
        }
    }
}

async fn list_dir(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut rd = fs::read_dir(dir).await?;
    let mut children = Vec::new();
    while let Some(entry) = rd.next_entry().await? {
        children.push(entry.path());
    }
    Ok(children)
}

/// (birth time, modification time). Birth time falls back to the
/// modification time where the platform or filesystem has none.
fn file_times(meta: &Metadata) -> (DateTime<Utc>, DateTime<Utc>) {
    let modified = meta
        .modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    let created = meta
        .created()
        .map(DateTime::<Utc>::from)
        .unwrap_or(modified);
    (created, modified)
}

#[cfg(test)]
#[path = "crawler_tests.rs"]
mod tests;
