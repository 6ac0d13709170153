//! Live data source backed by the polling client.

use std::sync::Arc;

use super::{DataSource, Snapshot};
use crate::sync::SyncHandle;

/// A data source that reads from a running [`SyncHandle`].
///
/// Polling is done by the handle's background task; this source only hands
/// the UI each newly applied snapshot once. Dropping the source stops the
/// poller.
#[derive(Debug)]
pub struct HttpSource {
    handle: SyncHandle,
    description: String,
    last_seen: Option<Arc<Snapshot>>,
    last_error: Option<String>,
}

impl HttpSource {
    pub fn new(handle: SyncHandle) -> Self {
        let description = format!("http: {}", handle.endpoint());
        Self {
            handle,
            description,
            last_seen: None,
            last_error: None,
        }
    }

    /// The underlying poller handle.
    pub fn handle(&self) -> &SyncHandle {
        &self.handle
    }
}

impl DataSource for HttpSource {
    fn poll(&mut self) -> Option<Arc<Snapshot>> {
        self.last_error = self.handle.last_error();

        let current = self.handle.current_snapshot()?;
        if let Some(seen) = &self.last_seen {
            if Arc::ptr_eq(seen, &current) {
                return None;
            }
        }
        self.last_seen = Some(current.clone());
        Some(current)
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::source::{Rtt, TargetState};
    use crate::sync::{FetchError, SnapshotFetcher, SyncClient};

    /// Succeeds on odd calls, fails on even ones.
    #[derive(Debug, Default)]
    struct FlakyFetcher {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SnapshotFetcher for FlakyFetcher {
        async fn fetch(&self) -> Result<Snapshot, FetchError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call % 2 == 0 {
                return Err(FetchError::Status(500));
            }
            let mut snapshot = Snapshot::new();
            snapshot.insert(
                "10.0.0.1".to_string(),
                TargetState {
                    name: format!("poll-{}", call),
                    last_success: None,
                    history: vec![Rtt::Millis(call as u64)],
                    last_update: None,
                },
            );
            Ok(snapshot)
        }

        fn endpoint(&self) -> &str {
            "http://backend/api/state"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_http_source_yields_each_snapshot_once() {
        let handle = SyncClient::new(Arc::new(FlakyFetcher::default())).start();
        let mut source = HttpSource::new(handle);
        assert_eq!(source.description(), "http: http://backend/api/state");

        // Nothing before the first poll has run
        assert!(source.poll().is_none());

        tokio::time::sleep(Duration::from_millis(10)).await;
        let first = source.poll().unwrap();
        assert_eq!(first["10.0.0.1"].name, "poll-1");
        assert!(source.poll().is_none());
        assert!(source.error().is_none());

        // Failed poll: no new snapshot, error exposed, old data still current
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert!(source.poll().is_none());
        assert_eq!(source.error(), Some("unexpected HTTP status 500"));
        assert!(Arc::ptr_eq(&source.handle().current_snapshot().unwrap(), &first));

        tokio::time::sleep(Duration::from_millis(1000)).await;
        let third = source.poll().unwrap();
        assert_eq!(third["10.0.0.1"].name, "poll-3");
        assert!(source.error().is_none());
    }
}
