use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use hashbrown::HashSet;
use log::debug;
use parking_lot::Mutex;
use tokio::sync::oneshot;

/// Tracks which paths of one crawl episode still have work outstanding,
/// and resolves a [`Completion`] the moment that set drains.
///
/// Marks are idempotent and an unmark removes the path outright, so a path
/// that several steps mark (the listing loop, then the recursive frame for
/// the same directory) needs exactly one unmark. There is no counter that
/// could drift.
#[derive(Debug, Default)]
pub struct QuiescenceTracker {
    state: Mutex<TrackerState>,
}

#[derive(Debug, Default)]
struct TrackerState {
    in_flight: HashSet<PathBuf>,
    done_tx: Option<oneshot::Sender<()>>,
    completions: u32,
}

/// Resolves once, when the tracker that issued it goes quiet.
#[derive(Debug)]
pub struct Completion {
    rx: oneshot::Receiver<()>,
}

impl Completion {
    /// Wait for quiescence. Returns `false` if the tracker was dropped
    /// without ever draining.
    pub async fn wait(self) -> bool {
        self.rx.await.is_ok()
    }

    /// Non-blocking check.
    pub fn is_done(&mut self) -> bool {
        self.rx.try_recv().is_ok()
    }
}

impl QuiescenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin an episode. Call before the first [`mark`](Self::mark).
    ///
    /// Completion is only signalled by an unmark that empties the set, so
    /// an episode that never marks anything never completes.
    pub fn start(&self) -> Completion {
        let (tx, rx) = oneshot::channel();
        let mut state = self.state.lock();
        if !state.in_flight.is_empty() {
            debug!(
                "[quiescence] start() with {} paths still in flight",
                state.in_flight.len()
            );
        }
        state.done_tx = Some(tx);
        Completion { rx }
    }

    /// Add `path` to the in-flight set. Marking a present path is a no-op.
    pub fn mark(&self, path: &Path) {
        let mut state = self.state.lock();
        if !state.in_flight.contains(path) {
            state.in_flight.insert(path.to_path_buf());
        }
    }

    /// Remove `path`; fires the episode's completion if the set is now empty.
    ///
    /// Unmarking an absent path does nothing.
    pub fn unmark(&self, path: &Path) {
        let mut state = self.state.lock();

        if !state.in_flight.remove(path) {
            debug!("[quiescence] unmark of untracked path {}", path.display());
            return;
        }

        if state.in_flight.is_empty()
            && let Some(tx) = state.done_tx.take()
        {
            state.completions += 1;
            // The receiver may already be gone; quiescence still happened.
            let _ = tx.send(());
        }
    }

    /// Mark `path` and return a guard that unmarks it when dropped.
    ///
    /// The unmark also runs when the owning task panics or is dropped
    /// unpolled, so such a task cannot keep the episode open.
    pub fn hold(self: &Arc<Self>, path: PathBuf) -> InFlight {
        self.mark(&path);
        InFlight {
            tracker: Arc::clone(self),
            path,
        }
    }

    pub fn in_flight(&self) -> usize {
        self.state.lock().in_flight.len()
    }

    pub fn is_tracked(&self, path: &Path) -> bool {
        self.state.lock().in_flight.contains(path)
    }

    /// Number of times a completion has fired over the tracker's life.
    pub fn completions(&self) -> u32 {
        self.state.lock().completions
    }
}

/// Outstanding work on one path. See [`QuiescenceTracker::hold`].
#[derive(Debug)]
pub struct InFlight {
    tracker: Arc<QuiescenceTracker>,
    path: PathBuf,
}

impl InFlight {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.tracker.unmark(&self.path);
    }
}

#[cfg(test)]
#[path = "quiescence_tests.rs"]
mod tests;
