//! Snapshot sources for the dashboard.
//!
//! This module provides a trait-based abstraction over where state
//! snapshots come from: a live poller against the backend's HTTP API, or a
//! saved `/api/state` document on disk.

mod file;
mod http;
mod snapshot;

pub use file::FileSource;
pub use http::HttpSource;
pub use snapshot::{decode_snapshot, Rtt, Snapshot, TargetState, Timestamp, UNREACHABLE_SENTINEL};

use std::fmt::Debug;
use std::sync::Arc;

/// Trait for receiving state snapshots from various sources.
///
/// # Example
///
/// ```
/// use butaman_dashboard::{DataSource, FileSource};
///
/// let mut source = FileSource::new("state.json");
/// if let Some(snapshot) = source.poll() {
///     println!("Got {} targets", snapshot.len());
/// }
/// ```
pub trait DataSource: Send + Debug {
    /// Poll for the latest snapshot.
    ///
    /// Returns `Some(snapshot)` if a newer snapshot is available than the
    /// one returned last time, `None` otherwise. Must not block.
    fn poll(&mut self) -> Option<Arc<Snapshot>>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;

    /// The error from the most recent attempt, if it failed.
    ///
    /// An error does not invalidate snapshots returned earlier; the UI keeps
    /// showing them as stale data.
    fn error(&self) -> Option<&str>;
}
