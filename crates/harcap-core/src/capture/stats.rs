//! Session statistics, owned by the capture session.
//!
//! An explicit shared object rather than state hung off the watcher
//! handle, so counters survive watcher teardown and the stop routine can
//! read them without touching the watch resource.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::har::ExtractOutcome;

/// Live counters for one continuous-capture session. All atomics; safe
/// to read from the control thread while the worker updates them.
#[derive(Debug, Default)]
pub struct SessionStats {
    har_processed: AtomicU64,
    json_saved: AtomicU64,
    filtered_out: AtomicU64,
    errors: AtomicU64,
    in_flight: AtomicU64,
}

impl SessionStats {
    pub fn record(&self, outcome: &ExtractOutcome) {
        self.har_processed.fetch_add(1, Ordering::Relaxed);
        self.json_saved.fetch_add(outcome.saved, Ordering::Relaxed);
        self.filtered_out.fetch_add(outcome.filtered, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn begin_flight(&self) {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
    }

    pub fn end_flight(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn in_flight(&self) -> u64 {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            har_processed: self.har_processed.load(Ordering::Relaxed),
            json_saved: self.json_saved.load(Ordering::Relaxed),
            filtered_out: self.filtered_out.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub har_processed: u64,
    pub json_saved: u64,
    pub filtered_out: u64,
    pub errors: u64,
}

/// Final result returned by `CaptureSession::stop`.
#[derive(Debug, Clone, Copy)]
pub struct SessionSummary {
    pub elapsed: Duration,
    pub stats: StatsSnapshot,
    /// True when the graceful drain finished before the wait bound.
    pub drained: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_accumulates() {
        let stats = SessionStats::default();
        stats.record(&ExtractOutcome { saved: 2, filtered: 1, existing: 0 });
        stats.record(&ExtractOutcome { saved: 0, filtered: 3, existing: 1 });
        stats.record_error();

        let snap = stats.snapshot();
        assert_eq!(snap.har_processed, 2);
        assert_eq!(snap.json_saved, 2);
        assert_eq!(snap.filtered_out, 4);
        assert_eq!(snap.errors, 1);
    }

    #[test]
    fn flight_counter_balances() {
        let stats = SessionStats::default();
        stats.begin_flight();
        assert_eq!(stats.in_flight(), 1);
        stats.end_flight();
        assert_eq!(stats.in_flight(), 0);
    }
}
