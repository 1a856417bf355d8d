//! Metrics collection for the poll loop
//!
//! Lock-free counters using atomic operations. Updated once per cycle,
//! snapshotted for periodic logging.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Instant, SystemTime};

/// Poll loop metrics collector
pub struct MetricsCollector {
    /// Cycles that produced a frame (possibly empty)
    cycles_completed: AtomicU64,
    /// Cycles abandoned on a fetch, read or decode failure
    cycles_dropped: AtomicU64,
    /// Ticker records decoded across all cycles
    records_decoded: AtomicU64,
    /// Sum of changed markets over all frames
    markets_changed: AtomicU64,
    /// Frame bytes produced
    bytes_emitted: AtomicU64,
    /// Keys and values cut at the spill capacity
    tokens_truncated: AtomicU64,
    /// Last completed cycle (Unix millis)
    last_cycle_time: AtomicU64,
    start_time: Instant,
}

/// Metrics snapshot
#[derive(Debug, Clone, Copy)]
pub struct MetricsSnapshot {
    pub cycles_completed: u64,
    pub cycles_dropped: u64,
    pub records_decoded: u64,
    pub markets_changed: u64,
    pub bytes_emitted: u64,
    pub tokens_truncated: u64,
    pub last_cycle_time: u64,
    pub cycle_rate: f64, // cycles per second
    pub uptime_seconds: u64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            cycles_completed: AtomicU64::new(0),
            cycles_dropped: AtomicU64::new(0),
            records_decoded: AtomicU64::new(0),
            markets_changed: AtomicU64::new(0),
            bytes_emitted: AtomicU64::new(0),
            tokens_truncated: AtomicU64::new(0),
            last_cycle_time: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a completed cycle
    #[inline]
    pub fn record_cycle(&self, records: usize, changed: usize, bytes: usize) {
        self.cycles_completed.fetch_add(1, Ordering::Relaxed);
        self.records_decoded.fetch_add(records as u64, Ordering::Relaxed);
        self.markets_changed.fetch_add(changed as u64, Ordering::Relaxed);
        self.bytes_emitted.fetch_add(bytes as u64, Ordering::Relaxed);
        self.last_cycle_time.store(unix_millis(), Ordering::Relaxed);
    }

    #[inline]
    pub fn record_dropped(&self) {
        self.cycles_dropped.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_truncated(&self, tokens: u64) {
        if tokens > 0 {
            self.tokens_truncated.fetch_add(tokens, Ordering::Relaxed);
        }
    }

    /// Get current snapshot of metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        let completed = self.cycles_completed.load(Ordering::Relaxed);
        let dropped = self.cycles_dropped.load(Ordering::Relaxed);

        let uptime = self.start_time.elapsed().as_secs();
        let rate = if uptime > 0 {
            (completed + dropped) as f64 / uptime as f64
        } else {
            0.0
        };

        MetricsSnapshot {
            cycles_completed: completed,
            cycles_dropped: dropped,
            records_decoded: self.records_decoded.load(Ordering::Relaxed),
            markets_changed: self.markets_changed.load(Ordering::Relaxed),
            bytes_emitted: self.bytes_emitted.load(Ordering::Relaxed),
            tokens_truncated: self.tokens_truncated.load(Ordering::Relaxed),
            last_cycle_time: self.last_cycle_time.load(Ordering::Relaxed),
            cycle_rate: rate,
            uptime_seconds: uptime,
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_collector_creation() {
        let snapshot = MetricsCollector::new().snapshot();
        assert_eq!(snapshot.cycles_completed, 0);
        assert_eq!(snapshot.cycles_dropped, 0);
        assert_eq!(snapshot.bytes_emitted, 0);
        assert_eq!(snapshot.last_cycle_time, 0);
    }

    #[test]
    fn test_record_cycles() {
        let collector = MetricsCollector::new();
        collector.record_cycle(100, 3, 12);
        collector.record_cycle(100, 0, 0);
        collector.record_dropped();
        collector.record_truncated(2);
        collector.record_truncated(0);

        let snapshot = collector.snapshot();
        assert_eq!(snapshot.cycles_completed, 2);
        assert_eq!(snapshot.cycles_dropped, 1);
        assert_eq!(snapshot.records_decoded, 200);
        assert_eq!(snapshot.markets_changed, 3);
        assert_eq!(snapshot.bytes_emitted, 12);
        assert_eq!(snapshot.tokens_truncated, 2);
        assert!(snapshot.last_cycle_time > 0);
    }

    #[test]
    fn test_concurrent_updates() {
        use std::sync::Arc;
        let collector = Arc::new(MetricsCollector::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let c = collector.clone();
                std::thread::spawn(move || {
                    for _ in 0..250 {
                        c.record_cycle(1, 1, 1);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(collector.snapshot().cycles_completed, 1000);
    }
}
