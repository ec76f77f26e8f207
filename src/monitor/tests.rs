use super::*;
use std::time::Duration;

use crate::config::IntervalPolicy;
use crate::error::ConfigError;
use crate::testkit::{self, RecordingConnection};

// -- Helpers --------------------------------------------------------------

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

fn monitor(
    config: MonitorConfig,
) -> (ConnectionMonitor<Arc<RecordingConnection>>, Arc<RecordingConnection>) {
    let conn = Arc::new(RecordingConnection::new());
    let monitor = ConnectionMonitor::new(config, Arc::clone(&conn)).unwrap();
    (monitor, conn)
}

/// Sleep on the paused clock until `at` seconds after `origin`.
async fn advance_to(origin: Instant, at: u64) {
    tokio::time::sleep_until(origin + secs(at)).await;
}

// -- Construction ---------------------------------------------------------

#[test]
fn new_outside_runtime_fails() {
    let result = ConnectionMonitor::new(testkit::monitor_config(), RecordingConnection::new());
    assert!(matches!(result, Err(Error::NoRuntime)));
}

#[tokio::test]
async fn new_rejects_inverted_bounds() {
    let result = ConnectionMonitor::new(
        MonitorConfig::reconnecting(3, 30, 5),
        RecordingConnection::new(),
    );
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidValue { .. }))
    ));
}

#[tokio::test]
async fn new_monitor_is_idle() {
    let (monitor, conn) = monitor(testkit::monitor_config());
    let status = monitor.status();
    assert_eq!(status.phase, Phase::NotStarted);
    assert_eq!(status.reconnect_attempts, 0);
    assert_eq!(status.tick_interval, secs(5));
    assert!(!monitor.is_running());
    assert!(!monitor.is_stale());
    assert_eq!(conn.reopen_count(), 0);
}

// -- Staleness ------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn scenario_reopens_until_budget_exhausted() {
    let (monitor, conn) = monitor(testkit::monitor_config());
    let t0 = Instant::now();
    monitor.start();

    // Checks at 0s and 5s are within the threshold.
    advance_to(t0, 9).await;
    assert_eq!(conn.reopen_count(), 0);
    assert_eq!(monitor.reconnect_attempts(), 0);

    advance_to(t0, 11).await;
    assert_eq!(conn.reopen_count(), 1);
    assert_eq!(monitor.reconnect_attempts(), 1);

    advance_to(t0, 300).await;
    assert_eq!(conn.reopen_count(), 3);
    assert_eq!(monitor.reconnect_attempts(), 3);
    assert!(monitor.status().exhausted);

    let offsets: Vec<u64> = conn.reopened_at().iter().map(|at| (*at - t0).as_secs()).collect();
    assert_eq!(offsets, vec![10, 15, 20]);
}

#[tokio::test(start_paused = true)]
async fn pings_keep_connection_healthy() {
    let (monitor, conn) = monitor(testkit::monitor_config());
    monitor.start();
    monitor.record_connect();

    for _ in 0..20 {
        tokio::time::sleep(HEARTBEAT_INTERVAL).await;
        monitor.record_ping();
    }

    assert_eq!(conn.reopen_count(), 0);
    assert_eq!(monitor.reconnect_attempts(), 0);
    assert!(!monitor.is_stale());
}

#[tokio::test(start_paused = true)]
async fn connect_resets_attempts() {
    let (monitor, conn) = monitor(testkit::monitor_config());
    let t0 = Instant::now();
    monitor.start();

    advance_to(t0, 16).await;
    assert_eq!(monitor.reconnect_attempts(), 2);

    monitor.record_connect();
    assert_eq!(monitor.reconnect_attempts(), 0);
    assert!(!monitor.is_stale());
    assert_eq!(monitor.status().phase, Phase::Connected);

    // Silent again after the connect: budget is available in full.
    advance_to(t0, 100).await;
    assert_eq!(conn.reopen_count(), 2 + 3);
}

#[tokio::test(start_paused = true)]
async fn recent_disconnect_defers_reopen() {
    let (monitor, conn) = monitor(testkit::monitor_config());
    let t0 = Instant::now();
    monitor.start();

    advance_to(t0, 8).await;
    monitor.record_disconnect();
    assert_eq!(monitor.status().phase, Phase::Disconnected);

    // Check at 10s: stale, but the loss was 2s ago.
    advance_to(t0, 11).await;
    assert_eq!(monitor.reconnect_attempts(), 1);
    assert_eq!(conn.reopen_count(), 0);

    // Check at 15s: the loss is 7s old.
    advance_to(t0, 16).await;
    assert_eq!(monitor.reconnect_attempts(), 2);
    assert_eq!(conn.reopen_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn disabled_reconnection_only_observes() {
    let (monitor, conn) = monitor(MonitorConfig::default());
    monitor.start();

    tokio::time::sleep(secs(120)).await;

    assert!(monitor.is_running());
    assert!(monitor.is_stale());
    assert_eq!(monitor.reconnect_attempts(), 0);
    assert_eq!(conn.reopen_count(), 0);
}

// -- Lifecycle ------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn stop_prevents_further_reopens() {
    let (monitor, conn) = monitor(testkit::monitor_config());
    let t0 = Instant::now();
    monitor.start();

    advance_to(t0, 11).await;
    assert_eq!(conn.reopen_count(), 1);

    monitor.stop();
    advance_to(t0, 120).await;

    assert_eq!(conn.reopen_count(), 1);
    let status = monitor.status();
    assert_eq!(status.phase, Phase::Stopped);
    assert!(status.stopped_at.is_some());
    assert!(!monitor.is_running());
}

#[tokio::test(start_paused = true)]
async fn restart_after_stop_resumes_with_fresh_budget() {
    let (monitor, conn) = monitor(testkit::monitor_config());
    let t0 = Instant::now();
    monitor.start();
    advance_to(t0, 30).await;
    assert_eq!(conn.reopen_count(), 3);

    monitor.stop();
    monitor.start();
    assert_eq!(monitor.reconnect_attempts(), 0);
    assert!(monitor.is_running());

    // Restarted at 30s: checks at 30, 35, 40 -> first stale check at 40s.
    advance_to(t0, 41).await;
    assert_eq!(conn.reopen_count(), 4);
}

#[tokio::test(start_paused = true)]
async fn double_start_leaves_single_checker() {
    let (monitor, conn) = monitor(testkit::monitor_config());
    let t0 = Instant::now();
    monitor.start();
    monitor.start();

    // Two live checkers would both count the stale check at 10s.
    advance_to(t0, 11).await;
    assert_eq!(monitor.reconnect_attempts(), 1);
    assert_eq!(conn.reopen_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn restart_supersedes_previous_cadence() {
    let (monitor, conn) = monitor(testkit::monitor_config());
    let t0 = Instant::now();
    monitor.start();

    advance_to(t0, 11).await;
    assert_eq!(conn.reopen_count(), 1);

    // New run from 11s: checks at 11, 16, 21. The old cadence (15, 20) would
    // have found the connection stale at 20s.
    monitor.start();
    advance_to(t0, 20).await;
    assert_eq!(monitor.reconnect_attempts(), 0);

    advance_to(t0, 22).await;
    assert_eq!(monitor.reconnect_attempts(), 1);
    assert_eq!(conn.reopen_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn drop_cancels_checker() {
    let conn = Arc::new(RecordingConnection::new());
    let monitor = ConnectionMonitor::new(testkit::monitor_config(), Arc::clone(&conn)).unwrap();
    monitor.start();
    drop(monitor);

    tokio::time::sleep(secs(60)).await;

    assert_eq!(conn.reopen_count(), 0);
    assert_eq!(Arc::strong_count(&conn), 1);
}

// -- Interval policy ------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn fixed_policy_keeps_initial_cadence() {
    let (monitor, conn) = monitor(MonitorConfig::reconnecting(10, 1, 30));
    let t0 = Instant::now();
    monitor.start();

    tokio::time::sleep_until(t0 + Duration::from_millis(500)).await;
    monitor.record_ping();

    // Stale from 6.5s; one attempt per check at 7..=12s.
    tokio::time::sleep_until(t0 + Duration::from_millis(12_500)).await;
    assert_eq!(conn.reopen_count(), 6);
    assert_eq!(monitor.status().tick_interval, secs(1));
}

#[tokio::test(start_paused = true)]
async fn adaptive_policy_stretches_cadence() {
    let config = MonitorConfig::reconnecting(10, 1, 30)
        .with_interval_policy(IntervalPolicy::Adaptive);
    let (monitor, conn) = monitor(config);
    let t0 = Instant::now();
    monitor.start();

    tokio::time::sleep_until(t0 + Duration::from_millis(500)).await;
    monitor.record_ping();

    // Attempt 1 at 7s, then 5*ln(2) -> 3s, then 5*ln(3) -> 5s.
    tokio::time::sleep_until(t0 + Duration::from_millis(12_500)).await;
    let offsets: Vec<u64> = conn.reopened_at().iter().map(|at| (*at - t0).as_secs()).collect();
    assert_eq!(offsets, vec![7, 10]);
    assert_eq!(monitor.status().tick_interval, secs(5));
}

// -- Sharing --------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn events_from_other_tasks_are_seen() {
    let (monitor, conn) = monitor(testkit::monitor_config());
    let monitor = Arc::new(monitor);
    monitor.start();

    let pinger = {
        let monitor = Arc::clone(&monitor);
        tokio::spawn(async move {
            for _ in 0..10 {
                tokio::time::sleep(HEARTBEAT_INTERVAL).await;
                monitor.record_ping();
            }
        })
    };
    pinger.await.unwrap();

    assert_eq!(conn.reopen_count(), 0);
}

#[tokio::test]
async fn monitors_are_independent() {
    let (first, _) = monitor(testkit::monitor_config());
    let (second, _) = monitor(testkit::monitor_config());
    first.start();
    first.record_disconnect();

    assert_eq!(first.status().phase, Phase::Disconnected);
    assert_eq!(second.status().phase, Phase::NotStarted);
    first.stop();
}
