//! Delay curve for the staleness check loop.

use std::time::Duration;

/// Expected keep-alive cadence of the transport.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(3);

/// Silence longer than this marks a connection as stale (two missed beats).
pub const STALE_THRESHOLD: Duration = Duration::from_secs(2 * HEARTBEAT_INTERVAL.as_secs());

const CURVE_SCALE_SECS: f64 = 5.0;

/// Delay before the next staleness check after `attempts` reconnect attempts.
///
/// `5 * ln(attempts + 1)` seconds clamped to `[min_secs, max_secs]`, truncated
/// to whole seconds. Grows logarithmically, so repeated failures stretch the
/// cadence slowly rather than doubling it.
pub fn tick_interval(attempts: u32, min_secs: u64, max_secs: u64) -> Duration {
    let raw = CURVE_SCALE_SECS * (f64::from(attempts) + 1.0).ln();
    let clamped = raw.min(max_secs as f64).max(min_secs as f64);
    Duration::from_secs(clamped as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_threshold_is_two_heartbeats() {
        assert_eq!(STALE_THRESHOLD, Duration::from_secs(6));
    }

    #[test]
    fn zero_attempts_yields_minimum() {
        assert_eq!(tick_interval(0, 5, 30), Duration::from_secs(5));
        assert_eq!(tick_interval(0, 1, 30), Duration::from_secs(1));
    }

    #[test]
    fn grows_logarithmically() {
        // 5 * ln(4) = 6.93, 5 * ln(10) = 11.51, 5 * ln(100) = 23.03
        assert_eq!(tick_interval(3, 1, 60), Duration::from_secs(6));
        assert_eq!(tick_interval(9, 1, 60), Duration::from_secs(11));
        assert_eq!(tick_interval(99, 1, 60), Duration::from_secs(23));
    }

    #[test]
    fn capped_at_maximum() {
        assert_eq!(tick_interval(10_000, 5, 30), Duration::from_secs(30));
        assert_eq!(tick_interval(u32::MAX, 5, 30), Duration::from_secs(30));
    }

    #[test]
    fn monotonic_and_bounded() {
        for (min, max) in [(1, 1), (1, 30), (5, 30), (3, 10), (20, 25)] {
            let mut previous = Duration::ZERO;
            for attempts in 0..=500 {
                let delay = tick_interval(attempts, min, max);
                assert!(delay >= previous, "attempts={attempts} min={min} max={max}");
                assert!(delay >= Duration::from_secs(min));
                assert!(delay <= Duration::from_secs(max));
                previous = delay;
            }
        }
    }
}
