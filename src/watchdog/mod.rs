//! Liveness monitor adapter
//!
//! The harness never implements the reset logic of a hardware watchdog; it
//! only pings it. [`LivenessMonitor`] is that one operation. The software
//! implementations here stand in for the hardware facility on a host build.

use std::time::{Duration, Instant};
use tracing::warn;

/// External facility that must be pinged within its timeout window
pub trait LivenessMonitor {
    /// Reset the monitor's timeout window
    fn ping(&mut self);

    /// Called once when the trigger fires, before the first workload runs.
    /// Until then the platform event loop is responsible for the monitor.
    fn arm(&mut self) {}
}

impl<M: LivenessMonitor + ?Sized> LivenessMonitor for &mut M {
    fn ping(&mut self) {
        (**self).ping()
    }

    fn arm(&mut self) {
        (**self).arm()
    }
}

/// Ping statistics collected by a [`SoftwareWatchdog`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WatchdogStats {
    /// Pings received since arming
    pub pings: u64,
    /// Longest observed gap between two pings (or arming and the first ping)
    pub longest_gap: Duration,
    /// Gaps that exceeded the timeout window
    pub overruns: u64,
}

/// Host stand-in for a hardware watchdog.
///
/// Records how densely it is pinged. A gap longer than the timeout would have
/// reset a real device; here it is counted as an overrun and logged once.
#[derive(Debug)]
pub struct SoftwareWatchdog {
    timeout: Duration,
    last_ping: Instant,
    stats: WatchdogStats,
}

impl SoftwareWatchdog {
    /// Create a watchdog with the given timeout window, armed now
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            last_ping: Instant::now(),
            stats: WatchdogStats::default(),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn stats(&self) -> WatchdogStats {
        self.stats
    }

    /// True if any gap so far would have reset the device
    pub fn has_overrun(&self) -> bool {
        self.stats.overruns > 0
    }
}

impl LivenessMonitor for SoftwareWatchdog {
    fn ping(&mut self) {
        let now = Instant::now();
        let gap = now.duration_since(self.last_ping);
        self.last_ping = now;
        self.stats.pings += 1;
        if gap > self.stats.longest_gap {
            self.stats.longest_gap = gap;
        }
        if gap > self.timeout {
            self.stats.overruns += 1;
            if self.stats.overruns == 1 {
                warn!(
                    gap_ms = gap.as_millis() as u64,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "watchdog window exceeded; a hardware monitor would have reset the device"
                );
            }
        }
    }

    /// Restart the timeout window and clear statistics
    fn arm(&mut self) {
        self.last_ping = Instant::now();
        self.stats = WatchdogStats::default();
    }
}

/// Monitor that only counts pings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PingCounter {
    pings: u64,
}

impl PingCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> u64 {
        self.pings
    }
}

impl LivenessMonitor for PingCounter {
    fn ping(&mut self) {
        self.pings += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_ping_counter() {
        let mut counter = PingCounter::new();
        for _ in 0..5 {
            counter.ping();
        }
        assert_eq!(counter.count(), 5);
    }

    #[test]
    fn test_mut_ref_forwards() {
        fn ping_twice(mut monitor: impl LivenessMonitor) {
            monitor.ping();
            monitor.ping();
        }

        let mut counter = PingCounter::new();
        ping_twice(&mut counter);
        assert_eq!(counter.count(), 2);
    }

    #[test]
    fn test_software_watchdog_dense_pings() {
        let mut watchdog = SoftwareWatchdog::new(Duration::from_secs(5));
        for _ in 0..1000 {
            watchdog.ping();
        }
        let stats = watchdog.stats();
        assert_eq!(stats.pings, 1000);
        assert_eq!(stats.overruns, 0);
        assert!(!watchdog.has_overrun());
    }

    #[test]
    fn test_software_watchdog_detects_overrun() {
        let mut watchdog = SoftwareWatchdog::new(Duration::from_millis(5));
        watchdog.ping();
        thread::sleep(Duration::from_millis(20));
        watchdog.ping();

        let stats = watchdog.stats();
        assert_eq!(stats.overruns, 1);
        assert!(stats.longest_gap >= Duration::from_millis(20));
        assert!(watchdog.has_overrun());
    }

    #[test]
    fn test_arm_clears_stats() {
        let mut watchdog = SoftwareWatchdog::new(Duration::from_millis(1));
        thread::sleep(Duration::from_millis(5));
        watchdog.ping();
        assert!(watchdog.has_overrun());

        watchdog.arm();
        assert_eq!(watchdog.stats(), WatchdogStats::default());
    }
}
