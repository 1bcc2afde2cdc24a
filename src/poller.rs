//! Periodic retrieval of fleet snapshots.
//!
//! The poller runs a fixed-period timer. Each tick starts one retrieval
//! unless the previous one is still in flight, in which case the tick is
//! skipped. Results are normalized and delivered as [`PollEvent`]s on an
//! mpsc channel, in completion order.
//!
//! ```text
//!            tick                       result
//!   Idle ───────────▶ Fetching ───────────────────▶ Idle
//!    │                   │  (tick while here: skip)
//!    │ stop              │ stop (late result dropped)
//!    ▼                   ▼
//!  Stopped ◀─────────────┘
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::data::{normalize_batch, Snapshot};
use crate::source::{FetchError, TelemetrySource};

/// Default time between retrieval cycles.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(5000);

/// Shortest period the timer accepts.
const MIN_INTERVAL: Duration = Duration::from_millis(10);

type Retrieval = Pin<Box<dyn Future<Output = Result<Vec<Value>, FetchError>> + Send>>;

/// Lifecycle state of a running poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    /// Waiting for the next tick.
    Idle,
    /// A retrieval is in flight.
    Fetching,
    /// Cancelled. Terminal.
    Stopped,
}

/// Outcome of one completed poll cycle.
#[derive(Debug, Clone)]
pub enum PollEvent {
    /// A new snapshot replaces the previous one.
    Snapshot(Snapshot),
    /// The cycle failed; the previous snapshot should be kept.
    Failed(FetchError),
}

/// Polls a [`TelemetrySource`] on a fixed interval.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use fleetwatch::{FileSource, Poller};
///
/// #[tokio::main]
/// async fn main() {
///     let (tx, mut rx) = tokio::sync::mpsc::channel(16);
///     let handle = Poller::builder()
///         .interval(Duration::from_secs(5))
///         .build(Arc::new(FileSource::new("robots.json")))
///         .spawn(tx);
///
///     if let Some(event) = rx.recv().await {
///         println!("{:?}", event);
///     }
///     handle.stop();
/// }
/// ```
#[derive(Debug)]
pub struct Poller {
    source: Arc<dyn TelemetrySource>,
    interval: Duration,
}

impl Poller {
    /// Create a poller with the default interval.
    pub fn new(source: Arc<dyn TelemetrySource>) -> Self {
        Self::builder().build(source)
    }

    /// Create a builder for configuring the poller.
    pub fn builder() -> PollerBuilder {
        PollerBuilder::default()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns the description of the underlying source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Run a single retrieval and normalize the result.
    pub async fn poll_once(&self) -> Result<Snapshot, FetchError> {
        let records = self.source.fetch().await?;
        Ok(snapshot_from_records(&records))
    }

    /// Start polling in a background task.
    ///
    /// Events are sent on `events` until the returned handle is stopped or
    /// dropped, or the receiver goes away.
    pub fn spawn(self, events: mpsc::Sender<PollEvent>) -> PollerHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let (state_tx, state_rx) = watch::channel(PollerState::Idle);

        let task = tokio::spawn(self.run(events, stop_rx, state_tx));

        PollerHandle {
            stop_tx,
            state_rx,
            task,
        }
    }

    /// The polling loop. Returns once stopped.
    pub async fn run(
        self,
        events: mpsc::Sender<PollEvent>,
        mut stop_rx: watch::Receiver<bool>,
        state_tx: watch::Sender<PollerState>,
    ) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut in_flight: Option<Retrieval> = None;

        info!(source = self.source.description(), interval = ?self.interval, "poller started");

        loop {
            tokio::select! {
                biased;

                changed = stop_rx.changed() => {
                    if changed.is_err() || *stop_rx.borrow() {
                        break;
                    }
                }

                result = wait_for(&mut in_flight), if in_flight.is_some() => {
                    in_flight = None;
                    if *stop_rx.borrow() {
                        debug!("discarding retrieval that completed after stop");
                        break;
                    }

                    let event = match result {
                        Ok(records) => PollEvent::Snapshot(snapshot_from_records(&records)),
                        Err(e) => {
                            warn!(error = %e, "poll cycle failed, keeping previous snapshot");
                            PollEvent::Failed(e)
                        }
                    };
                    state_tx.send_replace(PollerState::Idle);

                    // Wait for channel capacity, but let a stop request win.
                    tokio::select! {
                        biased;

                        _ = stop_rx.changed() => {
                            debug!("stop requested before delivery, dropping result");
                            break;
                        }

                        permit = events.reserve() => match permit {
                            Ok(permit) => permit.send(event),
                            Err(_) => {
                                info!("event receiver dropped, stopping poller");
                                break;
                            }
                        },
                    }
                }

                _ = ticker.tick() => {
                    if in_flight.is_some() {
                        debug!("retrieval still in flight, skipping cycle");
                        continue;
                    }
                    let source = Arc::clone(&self.source);
                    in_flight = Some(Box::pin(async move { source.fetch().await }));
                    state_tx.send_replace(PollerState::Fetching);
                    debug!("retrieval issued");
                }
            }
        }

        state_tx.send_replace(PollerState::Stopped);
        info!("poller stopped");
    }
}

/// Builder for [`Poller`].
#[derive(Debug, Default)]
pub struct PollerBuilder {
    interval: Option<Duration>,
}

impl PollerBuilder {
    /// Set the polling interval (default: 5 seconds).
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Build the poller for the given source.
    pub fn build(self, source: Arc<dyn TelemetrySource>) -> Poller {
        Poller {
            source,
            interval: self.interval.unwrap_or(DEFAULT_INTERVAL).max(MIN_INTERVAL),
        }
    }
}

/// Handle for controlling a spawned poller.
///
/// Dropping the handle stops the poller.
#[derive(Debug)]
pub struct PollerHandle {
    stop_tx: watch::Sender<bool>,
    state_rx: watch::Receiver<PollerState>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Request a stop. Any retrieval in flight is abandoned.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(true);
    }

    /// Current state of the poller.
    pub fn state(&self) -> PollerState {
        *self.state_rx.borrow()
    }

    /// Watch state transitions.
    pub fn subscribe_state(&self) -> watch::Receiver<PollerState> {
        self.state_rx.clone()
    }

    /// Wait for the polling task to finish.
    pub async fn wait(self) {
        let _ = self.task.await;
    }
}

/// Normalize a raw batch into a snapshot stamped with the current time.
///
/// Malformed records are logged and dropped.
pub fn snapshot_from_records(records: &[Value]) -> Snapshot {
    let batch = normalize_batch(records);
    for rejected in &batch.rejected {
        warn!(index = rejected.index, error = %rejected.error, "dropping malformed record");
    }

    let mut snapshot = Snapshot::new(batch.units, Utc::now());
    snapshot.dropped = batch.rejected.len();
    info!(
        units = snapshot.len(),
        dropped = snapshot.dropped,
        "snapshot retrieved"
    );
    snapshot
}

async fn wait_for(retrieval: &mut Option<Retrieval>) -> Result<Vec<Value>, FetchError> {
    match retrieval {
        Some(fut) => fut.await,
        None => std::future::pending().await,
    }
}
