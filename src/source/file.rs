//! Saved-state data source.
//!
//! Reads a captured `/api/state` document, e.g. one taken with
//! `curl http://backend:8080/api/state > state.json`, and reads it again
//! whenever it changes on disk. Loads go through a [`SnapshotStore`] just
//! like live polls: a rewrite that fails to decode is recorded as the last
//! error and the previous snapshot stays current.

use std::fs::{self, Metadata};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use thiserror::Error;
use tracing::{debug, warn};

use super::{decode_snapshot, DataSource, Snapshot};
use crate::sync::{PollStats, SnapshotStore};

#[derive(Debug, Error)]
enum LoadError {
    #[error("cannot read state file: {0}")]
    Read(#[from] io::Error),

    #[error("invalid state document: {0}")]
    Decode(#[from] serde_json::Error),
}

/// What a load saw of the file. Length is compared too, so a rewrite
/// within the filesystem's mtime granularity is still noticed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fingerprint {
    modified: Option<SystemTime>,
    len: u64,
}

impl Fingerprint {
    fn of(meta: &Metadata) -> Self {
        Self {
            modified: meta.modified().ok(),
            len: meta.len(),
        }
    }
}

/// A data source that serves snapshots from a JSON file.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
    store: SnapshotStore,
    seen: Option<Fingerprint>,
    last_error: Option<String>,
}

impl FileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self {
            path,
            description,
            store: SnapshotStore::new(),
            seen: None,
            last_error: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The last snapshot that loaded successfully.
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.store.current()
    }

    /// Load counters, same shape as the live poller's.
    pub fn stats(&self) -> PollStats {
        self.store.stats()
    }

    fn load(&self) -> Result<Snapshot, LoadError> {
        let content = fs::read(&self.path)?;
        Ok(decode_snapshot(&content)?)
    }

    fn fail(&mut self, error: LoadError) {
        let message = error.to_string();
        // Only log transitions; a broken file is polled every refresh
        if self.last_error.as_deref() != Some(message.as_str()) {
            warn!(path = %self.path.display(), error = %message, "keeping previous snapshot");
        }
        self.store.record_failure(&message);
        self.last_error = Some(message);
    }
}

impl DataSource for FileSource {
    fn poll(&mut self) -> Option<Arc<Snapshot>> {
        let fingerprint = match fs::metadata(&self.path) {
            Ok(meta) => Fingerprint::of(&meta),
            Err(e) => {
                // Whatever shows up at the path next is new
                self.seen = None;
                self.fail(LoadError::Read(e));
                return None;
            }
        };

        if self.seen == Some(fingerprint) {
            return None;
        }
        // Remember even failed loads: a broken file is retried once it changes
        self.seen = Some(fingerprint);

        match self.load() {
            Ok(snapshot) => {
                debug!(path = %self.path.display(), targets = snapshot.len(), "state file loaded");
                self.store.publish(snapshot);
                self.last_error = None;
                self.store.current()
            }
            Err(e) => {
                self.fail(e);
                None
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
