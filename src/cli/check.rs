//! Handler for the `check` command.

use std::path::Path;
use std::time::Duration;

use crate::config::Config;
use crate::error::Result;
use crate::monitor::{tick_interval, STALE_THRESHOLD};

/// Validate the configuration file and print the resulting check schedule.
pub fn execute<P: AsRef<Path>>(config_path: P) -> Result<()> {
    let path = config_path.as_ref();
    println!("Checking configuration: {}", path.display());
    println!();

    let config = Config::load(path)?;
    let monitor = &config.monitor;

    println!("✓ Configuration file is valid");
    println!();
    println!("Summary:");
    println!("  Reconnection: {}", if monitor.reconnection { "enabled" } else { "disabled" });
    println!("  Max attempts: {}", monitor.max_reconnect_attempts);
    println!("  Delay bounds: {}s..={}s", monitor.min_delay_secs, monitor.max_delay_secs);
    println!("  Interval policy: {:?}", monitor.interval_policy);
    println!("  Stale threshold: {}s", STALE_THRESHOLD.as_secs());
    println!();

    println!("Check schedule:");
    for (first, last, delay) in schedule(
        monitor.max_reconnect_attempts,
        monitor.min_delay_secs,
        monitor.max_delay_secs,
    ) {
        if first == last {
            println!("  after {first} attempts: every {}s", delay.as_secs());
        } else {
            println!("  after {first}-{last} attempts: every {}s", delay.as_secs());
        }
    }

    if !monitor.reconnection {
        println!();
        println!("⚠ Reconnection disabled: the monitor will only observe");
    }

    Ok(())
}

/// Attempt ranges sharing the same tick interval, as `(first, last, delay)`.
fn schedule(max_attempts: u32, min_secs: u64, max_secs: u64) -> Vec<(u32, u32, Duration)> {
    let mut ranges: Vec<(u32, u32, Duration)> = Vec::new();
    for attempts in 0..=max_attempts {
        let delay = tick_interval(attempts, min_secs, max_secs);
        match ranges.last_mut() {
            Some((_, last, current)) if *current == delay => *last = attempts,
            _ => ranges.push((attempts, attempts, delay)),
        }
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_groups_equal_delays() {
        // 5 * ln(4) = 6.93 is the first value above the 5s floor.
        let ranges = schedule(3, 5, 30);
        assert_eq!(
            ranges,
            vec![(0, 2, Duration::from_secs(5)), (3, 3, Duration::from_secs(6))]
        );
    }

    #[test]
    fn schedule_covers_every_attempt() {
        let ranges = schedule(30, 1, 10);
        assert_eq!(ranges.first().map(|r| r.0), Some(0));
        assert_eq!(ranges.last().map(|r| r.1), Some(30));
        assert_eq!(ranges.last().map(|r| r.2), Some(Duration::from_secs(10)));
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].1 + 1, pair[1].0);
            assert!(pair[0].2 < pair[1].2);
        }
    }
}
