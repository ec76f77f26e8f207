//! Connection-health monitor.
//!
//! Supervises one persistent streaming connection and decides, on its own
//! schedule, whether the connection has gone silent and must be reopened.
//!
//! # Architecture
//!
//! The owner reports lifecycle events (`record_connect`, `record_disconnect`,
//! `record_ping`) and controls supervision (`start`, `stop`). A background
//! tokio task wakes on the tick interval and runs the staleness check:
//!
//! - **Stale**: no ping (or, before any ping, no start) within
//!   [`STALE_THRESHOLD`]
//! - **Budget**: fewer than `max_reconnect_attempts` attempts this run
//! - **Back-pressure**: a loss reported within the threshold counts the
//!   attempt but skips the reopen
//!
//! All state sits behind one mutex so a check always sees a consistent
//! snapshot. The reopen request is issued after that mutex is released, so a
//! [`Reopen`] implementation may report events back into the monitor. A
//! separate dispatch gate, read-locked by the check for the whole dispatch and
//! write-locked by `start()`/`stop()`, guarantees nothing fires after `stop()`
//! returns.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, trace, warn};

use crate::config::MonitorConfig;
use crate::connection::Reopen;
use crate::error::{Error, Result};

pub mod backoff;
mod state;

pub use backoff::{tick_interval, HEARTBEAT_INTERVAL, STALE_THRESHOLD};
pub use state::{MonitorStatus, Phase};

use state::{MonitorState, TickOutcome};

/// State shared between the monitor handle and its check loop.
struct Shared<R> {
    config: MonitorConfig,
    connection: R,
    state: Mutex<MonitorState>,
    /// Generation allowed to dispatch reopens. Read-held across `reopen()`.
    gate: RwLock<u64>,
}

impl<R: Reopen> Shared<R> {
    /// Run one check for run `generation`.
    ///
    /// Returns the delay until the next check, or `None` once the run has been
    /// stopped or superseded.
    fn tick(&self, generation: u64) -> Option<Duration> {
        let gate = self.gate.read();
        if *gate != generation {
            debug!(generation, "Check loop superseded, exiting");
            return None;
        }

        let (outcome, delay) = {
            let mut state = self.state.lock();
            let outcome = state.evaluate(Instant::now(), &self.config);
            (outcome, state.next_interval(&self.config))
        };

        match outcome {
            TickOutcome::Stopped => return None,
            TickOutcome::Healthy => trace!("Connection healthy"),
            TickOutcome::Exhausted { first } => {
                if first {
                    warn!(
                        attempts = self.config.max_reconnect_attempts,
                        "Reconnect attempts exhausted, no further reopens this run"
                    );
                }
            }
            TickOutcome::Deferred { attempt } => {
                debug!(attempt, "Connection stale but dropped recently, deferring reopen");
            }
            TickOutcome::Reopen { attempt } => {
                warn!(
                    attempt,
                    max_attempts = self.config.max_reconnect_attempts,
                    "Connection stale, requesting reopen"
                );
                self.connection.reopen();
            }
        }

        drop(gate);
        Some(delay)
    }
}

/// Periodic staleness check for one run of the monitor.
async fn check_loop<R: Reopen>(shared: Arc<Shared<R>>, generation: u64) {
    let mut next_check = Instant::now();
    loop {
        sleep_until(next_check).await;
        let Some(delay) = shared.tick(generation) else {
            break;
        };
        // Fixed-rate cadence; never schedule into the past after a stall.
        next_check = (next_check + delay).max(Instant::now());
    }
}

/// Supervises a single connection and asks it to reopen when it goes silent.
///
/// Every method takes `&self` and returns immediately, so the monitor can be
/// shared (e.g. behind an `Arc`) between the task reading the socket and the
/// task managing its lifecycle. Dropping the monitor cancels its check loop.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use connwatch::config::MonitorConfig;
/// use connwatch::connection::ReopenRequest;
/// use connwatch::monitor::ConnectionMonitor;
///
/// # async fn run() -> connwatch::error::Result<()> {
/// let (tx, mut reopen_rx) = tokio::sync::mpsc::unbounded_channel::<ReopenRequest>();
/// let monitor = Arc::new(ConnectionMonitor::new(MonitorConfig::reconnecting(10, 3, 30), tx)?);
/// monitor.start();
///
/// while reopen_rx.recv().await.is_some() {
///     // tear down and re-dial, then:
///     monitor.record_connect();
/// }
/// # Ok(())
/// # }
/// ```
pub struct ConnectionMonitor<R: Reopen + 'static> {
    shared: Arc<Shared<R>>,
    runtime: Handle,
    job: Mutex<Option<JoinHandle<()>>>,
}

impl<R: Reopen + 'static> ConnectionMonitor<R> {
    /// Create a monitor for `connection`. Supervision does not begin until
    /// [`start`](Self::start).
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidValue`](crate::error::ConfigError::InvalidValue)
    ///   when the delay bounds or attempt limit are out of range
    /// - [`Error::NoRuntime`] when called outside a tokio runtime
    pub fn new(config: MonitorConfig, connection: R) -> Result<Self> {
        config.validate()?;
        let runtime = Handle::try_current().map_err(|_| Error::NoRuntime)?;

        Ok(Self {
            shared: Arc::new(Shared {
                state: Mutex::new(MonitorState::new(&config)),
                gate: RwLock::new(0),
                config,
                connection,
            }),
            runtime,
            job: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.shared.config
    }

    /// The connection opened: reset attempts, count as a ping, clear any loss.
    pub fn record_connect(&self) {
        self.shared.state.lock().record_connect(Instant::now());
        info!("Connection opened");
    }

    /// The connection closed or was lost. Supervision keeps running.
    pub fn record_disconnect(&self) {
        self.shared.state.lock().record_disconnect(Instant::now());
        info!("Connection lost");
    }

    /// A keep-alive was observed.
    pub fn record_ping(&self) {
        self.shared.state.lock().record_ping(Instant::now());
        trace!("Ping observed");
    }

    /// Begin (or restart) supervision.
    ///
    /// Resets the attempt counter and replaces any running check loop; the
    /// first check runs immediately.
    ///
    /// Blocks while a reopen request is being dispatched, so it must not be
    /// called synchronously from [`Reopen::reopen`].
    pub fn start(&self) {
        let mut job = self.job.lock();
        let mut gate = self.shared.gate.write();
        let (generation, interval) = {
            let mut state = self.shared.state.lock();
            let generation = state.start(Instant::now(), &self.shared.config);
            (generation, state.interval())
        };
        *gate = generation;
        drop(gate);

        if let Some(previous) = job.take() {
            debug!("Replacing running check loop");
            previous.abort();
        }

        *job = Some(
            self.runtime
                .spawn(check_loop(Arc::clone(&self.shared), generation)),
        );

        info!(
            interval_secs = interval.as_secs(),
            policy = ?self.shared.config.interval_policy,
            reconnection = self.shared.config.reconnection,
            "Connection monitor started"
        );
    }

    /// End supervision. No reopen is requested once this returns.
    ///
    /// Waits for a reopen request that is already being dispatched, so like
    /// [`start`](Self::start) it must not be called from [`Reopen::reopen`].
    pub fn stop(&self) {
        let mut job = self.job.lock();
        let mut gate = self.shared.gate.write();
        {
            let mut state = self.shared.state.lock();
            state.stop(Instant::now());
            *gate = state.generation();
        }
        drop(gate);
        if let Some(handle) = job.take() {
            handle.abort();
        }
        info!("Connection monitor stopped");
    }

    pub fn is_running(&self) -> bool {
        self.shared.state.lock().is_running()
    }

    /// Whether the connection would be judged stale right now.
    pub fn is_stale(&self) -> bool {
        self.shared.state.lock().is_stale(Instant::now())
    }

    pub fn reconnect_attempts(&self) -> u32 {
        self.shared.state.lock().reconnect_attempts()
    }

    pub fn status(&self) -> MonitorStatus {
        self.shared.state.lock().status(&self.shared.config)
    }
}

impl<R: Reopen + 'static> Drop for ConnectionMonitor<R> {
    fn drop(&mut self) {
        if let Some(handle) = self.job.get_mut().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests;
