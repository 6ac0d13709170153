//! The single current-snapshot slot.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use parking_lot::Mutex;

use crate::source::Snapshot;

/// Counters describing the poll history of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PollStats {
    pub applied: u64,
    pub failed: u64,
    /// Failures since the last applied snapshot.
    pub consecutive_failures: u64,
}

#[derive(Debug)]
struct WriterState {
    open: bool,
    last_error: Option<String>,
    stats: PollStats,
}

/// Holds the current snapshot for one writer and any number of readers.
///
/// Readers load the current `Arc` without locking. The writer side is
/// serialized and checks liveness under the same lock as the store, so once
/// [`close`](Self::close) returns nothing is published again.
#[derive(Debug)]
pub struct SnapshotStore {
    current: ArcSwapOption<Snapshot>,
    writer: Mutex<WriterState>,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self {
            current: ArcSwapOption::empty(),
            writer: Mutex::new(WriterState {
                open: true,
                last_error: None,
                stats: PollStats::default(),
            }),
        }
    }

    /// The latest applied snapshot, or `None` before the first success.
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.current.load_full()
    }

    /// Replace the current snapshot. Returns `false` if the store is closed.
    pub fn publish(&self, snapshot: Snapshot) -> bool {
        let mut writer = self.writer.lock();
        if !writer.open {
            return false;
        }
        self.current.store(Some(Arc::new(snapshot)));
        writer.last_error = None;
        writer.stats.applied += 1;
        writer.stats.consecutive_failures = 0;
        true
    }

    /// Record a failed poll. The current snapshot is left untouched.
    pub fn record_failure(&self, error: impl ToString) -> bool {
        let mut writer = self.writer.lock();
        if !writer.open {
            return false;
        }
        writer.last_error = Some(error.to_string());
        writer.stats.failed += 1;
        writer.stats.consecutive_failures += 1;
        true
    }

    /// Stop accepting writes.
    pub fn close(&self) {
        self.writer.lock().open = false;
    }

    pub fn is_open(&self) -> bool {
        self.writer.lock().open
    }

    /// Message from the most recent poll, if it failed.
    pub fn last_error(&self) -> Option<String> {
        self.writer.lock().last_error.clone()
    }

    pub fn stats(&self) -> PollStats {
        self.writer.lock().stats
    }
}
