//! Handler for the `simulate` command.
//!
//! Drives a [`ConnectionMonitor`] against a fake connection that heartbeats
//! normally, then goes half-open (no pings, no close). Reopen requests arrive
//! over a channel and are served by redialing.

use std::time::Duration;

use tokio::signal;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::{sleep, sleep_until, Instant};
use tracing::{debug, info, warn};

use crate::cli::SimulateArgs;
use crate::config::{Config, LogFormat};
use crate::connection::ReopenRequest;
use crate::error::Result;
use crate::monitor::{ConnectionMonitor, HEARTBEAT_INTERVAL};

const REDIAL_DELAY: Duration = Duration::from_secs(1);

/// Timeline of one simulated connection.
#[derive(Debug, Clone, Copy)]
struct Scenario {
    silent_after: Duration,
    duration: Duration,
    failed_redials: u32,
}

impl From<&SimulateArgs> for Scenario {
    fn from(args: &SimulateArgs) -> Self {
        Self {
            silent_after: Duration::from_secs(args.silent_after),
            duration: Duration::from_secs(args.duration),
            failed_redials: args.failed_redials,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Outcome {
    reopens: u32,
    connected: bool,
}

/// Execute the simulate command.
pub async fn execute(args: &SimulateArgs) -> Result<()> {
    let mut config = Config::load(&args.config)?;
    if let Some(ref level) = args.log_level {
        config.logging.level = level.clone();
    }
    if args.json_logs {
        config.logging.format = LogFormat::Json;
    }
    config.init_logging()?;

    let (reopen_tx, mut reopen_rx) = mpsc::unbounded_channel::<ReopenRequest>();
    let monitor = ConnectionMonitor::new(config.monitor.clone(), reopen_tx)?;

    info!(
        silent_after_secs = args.silent_after,
        duration_secs = args.duration,
        failed_redials = args.failed_redials,
        "Starting simulation"
    );
    let outcome = run(&monitor, &mut reopen_rx, Scenario::from(args)).await;

    let status = monitor.status();
    info!(
        reopens = outcome.reopens,
        connected = outcome.connected,
        attempts = status.reconnect_attempts,
        exhausted = status.exhausted,
        phase = ?status.phase,
        "Simulation finished"
    );

    Ok(())
}

/// Play `scenario` against `monitor` until it ends or ctrl-c. Stops the
/// monitor on the way out.
async fn run(
    monitor: &ConnectionMonitor<UnboundedSender<ReopenRequest>>,
    reopen_rx: &mut UnboundedReceiver<ReopenRequest>,
    scenario: Scenario,
) -> Outcome {
    let started = Instant::now();
    let end = sleep_until(started + scenario.duration);
    let silence = sleep_until(started + scenario.silent_after);
    // Re-armed per reopen request; only polled while a redial is in flight.
    let redial = sleep(Duration::ZERO);
    tokio::pin!(end);
    tokio::pin!(silence);
    tokio::pin!(redial);

    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    let mut healthy = true;
    let mut silenced = false;
    let mut redialing = false;
    let mut reopens: u32 = 0;
    let mut failures_left = scenario.failed_redials;

    monitor.start();
    monitor.record_connect();

    loop {
        tokio::select! {
            _ = &mut end => break,
            _ = signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
            _ = &mut silence, if !silenced => {
                silenced = true;
                healthy = false;
                warn!("Connection went silent");
            }
            _ = heartbeat.tick() => {
                if healthy {
                    monitor.record_ping();
                }
            }
            Some(ReopenRequest) = reopen_rx.recv() => {
                reopens += 1;
                if redialing {
                    debug!(reopens, "Reopen requested while redialing, ignored");
                    continue;
                }
                info!(reopens, "Reopen requested, redialing");
                monitor.record_disconnect();
                redial.as_mut().reset(Instant::now() + REDIAL_DELAY);
                redialing = true;
            }
            _ = &mut redial, if redialing => {
                redialing = false;
                if failures_left > 0 {
                    failures_left -= 1;
                    warn!(remaining_failures = failures_left, "Redial failed");
                } else {
                    healthy = true;
                    monitor.record_connect();
                }
            }
        }
    }

    monitor.stop();
    Outcome {
        reopens,
        connected: healthy,
    }
}
