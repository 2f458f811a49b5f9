use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters updated on every admission decision.
///
/// Atomics keep [`admit`](crate::Admittor::admit) a `&self` operation: the
/// decision reads the sketch without mutating it, and the bookkeeping should
/// not force exclusivity on the caller.
pub struct StatsCounter {
    admitted: AtomicU64,
    rejected: AtomicU64,
}

impl StatsCounter {
    pub fn new() -> Self {
        StatsCounter {
            admitted: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn record_admitted(&self) {
        self.admitted.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns a point-in-time snapshot of the statistics.
    pub fn snapshot(&self) -> Metrics {
        let admitted = self.admitted.load(Ordering::Relaxed);
        let rejected = self.rejected.load(Ordering::Relaxed);
        let total = admitted + rejected;
        let admit_rate = if total == 0 {
            0.0_f64
        } else {
            admitted as f64 / total as f64
        };
        Metrics {
            admitted,
            rejected,
            admit_rate,
        }
    }
}

impl Default for StatsCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time snapshot of admission statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    /// Number of candidates admitted (the candidate out-counted the victim).
    pub admitted: u64,
    /// Number of candidates rejected (tie or victim out-counted).
    pub rejected: u64,
    /// `admitted / (admitted + rejected)`, or `0.0` before any decision.
    pub admit_rate: f64,
}

impl Metrics {
    pub fn decision_count(&self) -> u64 {
        self.admitted + self.rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_recordings() {
        let counter = StatsCounter::new();
        counter.record_admitted();
        counter.record_rejected();
        counter.record_rejected();

        let stats = counter.snapshot();
        assert_eq!(stats.admitted, 1);
        assert_eq!(stats.rejected, 2);
        assert_eq!(stats.decision_count(), 3);
        assert!((stats.admit_rate - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn empty_counter_has_zero_rate() {
        assert_eq!(StatsCounter::new().snapshot().admit_rate, 0.0);
    }
}
