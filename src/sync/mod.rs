//! Polling client that keeps the current snapshot fresh.
//!
//! A [`SyncClient`] spawns one background task that fetches the full state
//! resource on a fixed cadence and publishes each decoded snapshot into a
//! shared [`SnapshotStore`]. Failed polls are logged and recorded but never
//! touch the held snapshot and never stop the loop.
//!
//! Polls never overlap: the fetch runs inline in the task. Ticks that come
//! due while a poll is outstanding collapse into one tick that fires when
//! it completes; the cadence then resumes on the original schedule.
//!
//! ```no_run
//! use butaman_dashboard::sync::SyncClient;
//!
//! # tokio_test::block_on(async {
//! let handle = SyncClient::http("http://localhost:8080/api/state")
//!     .unwrap()
//!     .start();
//!
//! if let Some(snapshot) = handle.current_snapshot() {
//!     println!("{} targets", snapshot.len());
//! }
//! handle.stop();
//! # });
//! ```

mod fetch;
mod store;

pub use fetch::{FetchError, HttpFetcher, SnapshotFetcher, REQUEST_TIMEOUT};
pub use store::{PollStats, SnapshotStore};

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::source::Snapshot;

/// Time between poll starts.
pub const POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Shortest accepted polling interval.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Path of the state resource under the base URL.
pub const STATE_PATH: &str = "/api/state";

/// Result of a single poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// A new snapshot replaced the previous one.
    Applied,
    /// The snapshot arrived after the store was closed and was dropped.
    Discarded,
    /// The poll failed; the previous snapshot is still current.
    Failed,
}

/// Configures and starts the polling task.
#[derive(Debug)]
pub struct SyncClient {
    fetcher: Arc<dyn SnapshotFetcher>,
    interval: Duration,
}

impl SyncClient {
    /// Create a client around any fetcher, polling every [`POLL_INTERVAL`].
    pub fn new(fetcher: Arc<dyn SnapshotFetcher>) -> Self {
        Self {
            fetcher,
            interval: POLL_INTERVAL,
        }
    }

    /// Create a client that polls `endpoint` over HTTP.
    pub fn http(endpoint: &str) -> Result<Self, FetchError> {
        Ok(Self::new(Arc::new(HttpFetcher::new(endpoint)?)))
    }

    /// Override the polling interval. Values below [`MIN_POLL_INTERVAL`]
    /// are raised to it.
    pub fn interval(mut self, interval: Duration) -> Self {
        if interval < MIN_POLL_INTERVAL {
            warn!(?interval, min = ?MIN_POLL_INTERVAL, "polling interval too short, clamping");
        }
        self.interval = interval.max(MIN_POLL_INTERVAL);
        self
    }

    /// Spawn the polling task. The first poll starts immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(self) -> SyncHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let store = Arc::new(SnapshotStore::new());
        let endpoint = self.fetcher.endpoint().to_string();

        info!(%endpoint, interval_ms = self.interval.as_millis() as u64, "starting poller");
        let task = tokio::spawn(run(self.fetcher, store.clone(), self.interval, stop_rx));

        SyncHandle {
            stop_tx,
            store,
            task: Some(task),
            endpoint,
        }
    }
}

/// Handle to a running poller.
///
/// Dropping the handle stops polling.
#[derive(Debug)]
pub struct SyncHandle {
    stop_tx: watch::Sender<bool>,
    store: Arc<SnapshotStore>,
    task: Option<JoinHandle<()>>,
    endpoint: String,
}

impl SyncHandle {
    /// The latest applied snapshot, or `None` before the first success.
    pub fn current_snapshot(&self) -> Option<Arc<Snapshot>> {
        self.store.current()
    }

    /// Error from the most recent poll, if it failed.
    pub fn last_error(&self) -> Option<String> {
        self.store.last_error()
    }

    pub fn stats(&self) -> PollStats {
        self.store.stats()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn is_stopped(&self) -> bool {
        !self.store.is_open()
    }

    /// Stop polling.
    ///
    /// A poll already in flight may still complete, but its result is
    /// discarded: no snapshot is published after this returns.
    pub fn stop(&self) {
        if self.store.is_open() {
            info!(endpoint = %self.endpoint, "stopping poller");
        }
        self.store.close();
        let _ = self.stop_tx.send(true);
    }

    /// Stop polling and wait for the task to finish.
    pub async fn join(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run(
    fetcher: Arc<dyn SnapshotFetcher>,
    store: Arc<SnapshotStore>,
    interval: Duration,
    mut stop_rx: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            changed = stop_rx.changed() => {
                if changed.is_err() || *stop_rx.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => {
                poll_once(fetcher.as_ref(), &store).await;
            }
        }
    }

    debug!(endpoint = fetcher.endpoint(), "poller stopped");
}

/// Run one poll against `fetcher` and apply the result to `store`.
pub async fn poll_once(fetcher: &dyn SnapshotFetcher, store: &SnapshotStore) -> PollOutcome {
    match fetcher.fetch().await {
        Ok(snapshot) => {
            let targets = snapshot.len();
            if store.publish(snapshot) {
                debug!(targets, "snapshot applied");
                PollOutcome::Applied
            } else {
                debug!(targets, "poller stopped, dropping late snapshot");
                PollOutcome::Discarded
            }
        }
        Err(e) => {
            if store.record_failure(&e) {
                warn!(endpoint = fetcher.endpoint(), error = %e, "poll failed, keeping previous snapshot");
            }
            PollOutcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use crate::source::{Rtt, TargetState};

    fn snapshot(name: &str, history: &[u64]) -> Snapshot {
        let mut snapshot = Snapshot::new();
        snapshot.insert(
            "10.0.0.1".to_string(),
            TargetState {
                name: name.to_string(),
                last_success: None,
                history: history.iter().map(|&ms| Rtt::Millis(ms)).collect(),
                last_update: None,
            },
        );
        snapshot
    }

    enum Step {
        Ok(Snapshot),
        Fail,
    }

    /// Returns scripted results in order, then keeps failing.
    #[derive(Debug, Default)]
    struct ScriptedFetcher {
        steps: parking_lot::Mutex<VecDeque<Snapshot>>,
        failures: parking_lot::Mutex<VecDeque<bool>>,
        calls: AtomicUsize,
    }

    impl ScriptedFetcher {
        fn new(steps: Vec<Step>) -> Self {
            let fetcher = Self::default();
            for step in steps {
                match step {
                    Step::Ok(s) => {
                        fetcher.steps.lock().push_back(s);
                        fetcher.failures.lock().push_back(false);
                    }
                    Step::Fail => fetcher.failures.lock().push_back(true),
                }
            }
            fetcher
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SnapshotFetcher for ScriptedFetcher {
        async fn fetch(&self) -> Result<Snapshot, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.failures.lock().pop_front() {
                Some(false) => Ok(self.steps.lock().pop_front().unwrap()),
                _ => Err(FetchError::Connection("connection refused".to_string())),
            }
        }

        fn endpoint(&self) -> &str {
            "scripted"
        }
    }

    /// Blocks inside `fetch` until released.
    #[derive(Debug, Default)]
    struct GatedFetcher {
        started: Notify,
        release: Notify,
    }

    #[async_trait]
    impl SnapshotFetcher for GatedFetcher {
        async fn fetch(&self) -> Result<Snapshot, FetchError> {
            self.started.notify_one();
            self.release.notified().await;
            Ok(snapshot("late", &[1]))
        }

        fn endpoint(&self) -> &str {
            "gated"
        }
    }

    /// Sleeps for a fixed time and tracks concurrent calls.
    #[derive(Debug, Default)]
    struct SlowFetcher {
        delay: Duration,
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    #[async_trait]
    impl SnapshotFetcher for SlowFetcher {
        async fn fetch(&self) -> Result<Snapshot, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(snapshot("slow", &[1]))
        }

        fn endpoint(&self) -> &str {
            "slow"
        }
    }

    #[tokio::test]
    async fn test_poll_once_applies_snapshot() {
        let fetcher = ScriptedFetcher::new(vec![Step::Ok(snapshot("router", &[5]))]);
        let store = SnapshotStore::new();

        assert_eq!(poll_once(&fetcher, &store).await, PollOutcome::Applied);
        assert_eq!(store.current().unwrap()["10.0.0.1"].name, "router");
    }

    #[tokio::test]
    async fn test_failed_poll_keeps_previous_snapshot() {
        let fetcher = ScriptedFetcher::new(vec![Step::Ok(snapshot("router", &[5])), Step::Fail]);
        let store = SnapshotStore::new();

        poll_once(&fetcher, &store).await;
        let before = store.current().unwrap();

        assert_eq!(poll_once(&fetcher, &store).await, PollOutcome::Failed);
        let after = store.current().unwrap();
        assert!(Arc::ptr_eq(&before, &after));
        assert!(store.last_error().unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_failure_before_first_success_keeps_no_data() {
        let fetcher = ScriptedFetcher::new(vec![Step::Fail]);
        let store = SnapshotStore::new();

        assert_eq!(poll_once(&fetcher, &store).await, PollOutcome::Failed);
        assert!(store.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_poll_is_immediate_and_cadence_is_fixed() {
        let fetcher = Arc::new(ScriptedFetcher::new(vec![
            Step::Ok(snapshot("a", &[1])),
            Step::Fail,
            Step::Ok(snapshot("c", &[3])),
        ]));
        let handle = SyncClient::new(fetcher.clone()).start();

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(fetcher.calls(), 1);
        assert_eq!(handle.current_snapshot().unwrap()["10.0.0.1"].name, "a");

        // Second tick fails: snapshot unchanged, polling continues
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(fetcher.calls(), 2);
        assert_eq!(handle.current_snapshot().unwrap()["10.0.0.1"].name, "a");
        assert!(handle.last_error().is_some());

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(fetcher.calls(), 3);
        assert_eq!(handle.current_snapshot().unwrap()["10.0.0.1"].name, "c");
        assert!(handle.last_error().is_none());

        let stats = handle.stats();
        assert_eq!(stats.applied, 2);
        assert_eq!(stats.failed, 1);

        handle.join().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_polls_do_not_overlap() {
        let fetcher = Arc::new(SlowFetcher {
            delay: Duration::from_millis(2500),
            ..Default::default()
        });
        let handle = SyncClient::new(fetcher.clone()).start();

        tokio::time::sleep(Duration::from_millis(2600)).await;
        // Two missed ticks collapse into at most one follow-up poll
        assert!(fetcher.calls.load(Ordering::SeqCst) <= 2);
        assert!(handle.current_snapshot().is_some());

        tokio::time::sleep(Duration::from_millis(5000)).await;
        assert_eq!(fetcher.max_in_flight.load(Ordering::SeqCst), 1);

        handle.join().await;
    }

    #[tokio::test]
    async fn test_stop_discards_in_flight_result() {
        let fetcher = Arc::new(GatedFetcher::default());
        let handle = SyncClient::new(fetcher.clone()).start();

        // Wait until the first request is outstanding
        fetcher.started.notified().await;
        handle.stop();
        assert!(handle.is_stopped());

        // Let the request resolve after stop
        fetcher.release.notify_one();
        let store = handle.store.clone();
        handle.join().await;

        assert!(store.current().is_none());
        assert_eq!(store.stats().applied, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_polls_after_stop() {
        let fetcher = Arc::new(ScriptedFetcher::new(vec![
            Step::Ok(snapshot("a", &[1])),
            Step::Ok(snapshot("b", &[2])),
        ]));
        let handle = SyncClient::new(fetcher.clone())
            .interval(Duration::from_millis(500))
            .start();

        tokio::time::sleep(Duration::from_millis(10)).await;
        let store = handle.store.clone();
        handle.join().await;

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(fetcher.calls(), 1);
        assert_eq!(store.current().unwrap()["10.0.0.1"].name, "a");
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let fetcher = Arc::new(ScriptedFetcher::new(vec![]));
        let client = SyncClient::new(fetcher).interval(Duration::ZERO);
        assert_eq!(client.interval, MIN_POLL_INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_still_polls() {
        let fetcher = Arc::new(ScriptedFetcher::new(vec![
            Step::Ok(snapshot("a", &[1])),
            Step::Ok(snapshot("b", &[2])),
        ]));
        let handle = SyncClient::new(fetcher.clone())
            .interval(Duration::ZERO)
            .start();

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(fetcher.calls() >= 2);
        assert_eq!(handle.current_snapshot().unwrap()["10.0.0.1"].name, "b");
        assert!(!handle.is_stopped());

        // The task is still alive rather than having panicked
        let finished = handle.task.as_ref().map(|t| t.is_finished());
        assert_eq!(finished, Some(false));
        handle.join().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_stops_polling() {
        let fetcher = Arc::new(ScriptedFetcher::new(vec![]));
        let handle = SyncClient::new(fetcher.clone()).start();

        tokio::time::sleep(Duration::from_millis(10)).await;
        drop(handle);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(fetcher.calls(), 1);
    }
}
