//! Monitor state and the staleness decision.
//!
//! Everything here is plain data driven by explicit `now` instants, so the
//! policy can be exercised without a runtime. The owning monitor wraps a
//! [`MonitorState`] in a single mutex and feeds it the clock.

use std::time::Duration;

use tokio::time::Instant;

use super::backoff::{tick_interval, STALE_THRESHOLD};
use crate::config::{IntervalPolicy, MonitorConfig};

/// Supervision phase, derived from the recorded timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// `start()` has never been called.
    NotStarted,
    /// Running, with no loss reported since the last connect.
    Connected,
    /// Running, with a loss reported and no connect since.
    Disconnected,
    /// `stop()` was called; terminal until the next `start()`.
    Stopped,
}

/// Consistent point-in-time view of a monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorStatus {
    pub phase: Phase,
    pub reconnect_attempts: u32,
    /// The attempt budget for this run is spent.
    pub exhausted: bool,
    pub last_ping_at: Option<Instant>,
    pub disconnected_at: Option<Instant>,
    pub started_at: Option<Instant>,
    pub stopped_at: Option<Instant>,
    /// Delay the check loop will wait before its next check.
    pub tick_interval: Duration,
}

/// What a single check decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TickOutcome {
    /// Supervision is stopped; nothing evaluated.
    Stopped,
    /// Not stale, or reconnection disabled.
    Healthy,
    /// Stale, but the attempt budget is spent.
    Exhausted { first: bool },
    /// Attempt counted; the connection dropped too recently to reopen.
    Deferred { attempt: u32 },
    /// Attempt counted and a reopen should be requested.
    Reopen { attempt: u32 },
}

#[derive(Debug)]
pub(crate) struct MonitorState {
    last_ping_at: Option<Instant>,
    disconnected_at: Option<Instant>,
    started_at: Option<Instant>,
    stopped_at: Option<Instant>,
    reconnect_attempts: u32,
    interval: Duration,
    /// Bumped on every start/stop; a check loop only acts for its own run.
    generation: u64,
    exhaustion_reported: bool,
}

impl MonitorState {
    pub(crate) fn new(config: &MonitorConfig) -> Self {
        Self {
            last_ping_at: None,
            disconnected_at: None,
            started_at: None,
            stopped_at: None,
            reconnect_attempts: 0,
            interval: tick_interval(0, config.min_delay_secs, config.max_delay_secs),
            generation: 0,
            exhaustion_reported: false,
        }
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn reconnect_attempts(&self) -> u32 {
        self.reconnect_attempts
    }

    pub(crate) fn interval(&self) -> Duration {
        self.interval
    }

    pub(crate) fn is_running(&self) -> bool {
        self.started_at.is_some() && self.stopped_at.is_none()
    }

    fn reset(&mut self) {
        self.reconnect_attempts = 0;
        self.exhaustion_reported = false;
    }

    pub(crate) fn record_connect(&mut self, now: Instant) {
        self.reset();
        self.last_ping_at = Some(now);
        self.disconnected_at = None;
    }

    pub(crate) fn record_disconnect(&mut self, now: Instant) {
        self.disconnected_at = Some(now);
    }

    pub(crate) fn record_ping(&mut self, now: Instant) {
        self.last_ping_at = Some(now);
    }

    /// Begin a new run and return its generation.
    ///
    /// The loop interval is computed here from the (just reset) attempt count.
    pub(crate) fn start(&mut self, now: Instant, config: &MonitorConfig) -> u64 {
        self.reset();
        self.stopped_at = None;
        self.started_at = Some(now);
        self.interval = tick_interval(
            self.reconnect_attempts,
            config.min_delay_secs,
            config.max_delay_secs,
        );
        self.generation += 1;
        self.generation
    }

    pub(crate) fn stop(&mut self, now: Instant) {
        self.stopped_at = Some(now);
        self.generation += 1;
    }

    /// Silent for longer than the stale threshold.
    ///
    /// Measured from the last ping when one was ever seen, else from the start
    /// of supervision. Never stale before the first `start()`.
    pub(crate) fn is_stale(&self, now: Instant) -> bool {
        match self.last_ping_at.or(self.started_at) {
            Some(since) => now.saturating_duration_since(since) > STALE_THRESHOLD,
            None => false,
        }
    }

    fn disconnected_recently(&self, now: Instant) -> bool {
        self.disconnected_at
            .is_some_and(|at| now.saturating_duration_since(at) < STALE_THRESHOLD)
    }

    /// Run one staleness check against `config` at `now`.
    ///
    /// The attempt is counted before the recent-disconnect test, so a deferred
    /// check still consumes budget.
    pub(crate) fn evaluate(&mut self, now: Instant, config: &MonitorConfig) -> TickOutcome {
        if self.stopped_at.is_some() {
            return TickOutcome::Stopped;
        }
        if !config.reconnection || !self.is_stale(now) {
            return TickOutcome::Healthy;
        }
        if self.reconnect_attempts >= config.max_reconnect_attempts {
            let first = !self.exhaustion_reported;
            self.exhaustion_reported = true;
            return TickOutcome::Exhausted { first };
        }

        self.reconnect_attempts += 1;
        let attempt = self.reconnect_attempts;
        if self.disconnected_recently(now) {
            TickOutcome::Deferred { attempt }
        } else {
            TickOutcome::Reopen { attempt }
        }
    }

    /// Delay until the next check, per the configured policy.
    pub(crate) fn next_interval(&mut self, config: &MonitorConfig) -> Duration {
        if config.interval_policy == IntervalPolicy::Adaptive {
            self.interval = tick_interval(
                self.reconnect_attempts,
                config.min_delay_secs,
                config.max_delay_secs,
            );
        }
        self.interval
    }

    pub(crate) fn phase(&self) -> Phase {
        match (self.started_at, self.stopped_at) {
            (None, _) => Phase::NotStarted,
            (Some(_), Some(_)) => Phase::Stopped,
            (Some(_), None) if self.disconnected_at.is_some() => Phase::Disconnected,
            (Some(_), None) => Phase::Connected,
        }
    }

    pub(crate) fn status(&self, config: &MonitorConfig) -> MonitorStatus {
        MonitorStatus {
            phase: self.phase(),
            reconnect_attempts: self.reconnect_attempts,
            exhausted: self.reconnect_attempts >= config.max_reconnect_attempts,
            last_ping_at: self.last_ping_at,
            disconnected_at: self.disconnected_at,
            started_at: self.started_at,
            stopped_at: self.stopped_at,
            tick_interval: self.interval,
        }
    }
}
