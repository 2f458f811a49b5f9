use std::hash::Hash;

use crate::builder::TinyLfuBuilder;
use crate::metrics::stats::{Metrics, StatsCounter};
use crate::sketch::doorkeeper::Doorkeeper;
use crate::sketch::frequency::FrequencySketch;

// ---------------------------------------------------------------------------
// Admittor trait
// ---------------------------------------------------------------------------

/// Decides whether a candidate entry may displace a victim.
///
/// All methods are called **single-threadedly** by the enclosing cache's
/// eviction path.  Implementors only need to be `Send`; callers that share
/// an admittor across threads serialize access externally.
pub trait Admittor<Q: Hash + ?Sized>: Send {
    /// Records one access to `item`, building its frequency history.
    fn record(&mut self, item: &Q);

    /// Returns `true` when `candidate` should be admitted in place of
    /// `victim`.
    fn admit(&self, candidate: &Q, victim: &Q) -> bool;
}

/// Admits every candidate — the no-filter baseline.
///
/// Useful for measuring how much an admission filter actually buys on a
/// given workload, and as the default for caches small enough that filtering
/// is not worth a sketch.
pub struct AlwaysAdmit;

impl<Q: Hash + ?Sized> Admittor<Q> for AlwaysAdmit {
    #[inline]
    fn record(&mut self, _item: &Q) {}

    #[inline]
    fn admit(&self, _candidate: &Q, _victim: &Q) -> bool {
        true
    }
}

// ---------------------------------------------------------------------------
// TinyLFU
// ---------------------------------------------------------------------------

/// The TinyLFU admission filter.
///
/// ## Decision rule
///
/// `admit(candidate, victim)` compares the two frequency estimates and
/// admits only when the candidate's is **strictly** greater.  Ties keep the
/// incumbent: evicting on equal evidence would let a stream of cold items
/// churn the cache for no hit-rate gain.  Callers typically [`record`] the
/// candidate's access *before* asking for admission, so a first-sight item
/// competes with frequency ≥ 1.
///
/// ## Doorkeeper
///
/// With the doorkeeper enabled (see [`TinyLfuBuilder::doorkeeper`]), the
/// first sighting of an item within a sample window is held in a Bloom
/// filter instead of the sketch.  Frequency estimates add the filter's
/// presence bit back in, so the gated access still counts; the sketch's
/// counters are simply not spent on items never seen again.  When the sketch
/// ages, the filter is flushed so both structures describe the same window.
///
/// ## References
///
/// - Einziger, Friedman, Manes (2017). *TinyLFU: A Highly Efficient Cache
///   Admission Policy.* ACM Transactions on Storage.
///
/// [`record`]: Admittor::record
pub struct TinyLfu {
    sketch: FrequencySketch,
    doorkeeper: Option<Doorkeeper>,
    /// Reset count last observed on the sketch; when it advances, the
    /// doorkeeper is flushed.
    seen_resets: u64,
    stats: StatsCounter,
}

impl TinyLfu {
    pub(crate) fn new(sketch: FrequencySketch, doorkeeper: Option<Doorkeeper>) -> Self {
        TinyLfu {
            sketch,
            doorkeeper,
            seen_resets: 0,
            stats: StatsCounter::new(),
        }
    }

    /// Returns a [`TinyLfuBuilder`] for configuring a new filter.
    pub fn builder(sample_size: u64) -> TinyLfuBuilder {
        TinyLfuBuilder::new(sample_size)
    }

    /// Records one access to a pre-hashed item.
    pub fn record_hashed(&mut self, item_hash: u64) {
        if let Some(doorkeeper) = &mut self.doorkeeper {
            if !doorkeeper.insert(item_hash) {
                // First sighting this window: absorbed by the filter.
                return;
            }
        }
        self.sketch.add_hashed(item_hash, 1);
        if self.sketch.resets() != self.seen_resets {
            self.seen_resets = self.sketch.resets();
            if let Some(doorkeeper) = &mut self.doorkeeper {
                doorkeeper.clear();
            }
        }
    }

    /// Estimated frequency of a pre-hashed item, doorkeeper included.
    pub fn frequency_hashed(&self, item_hash: u64) -> u32 {
        let mut freq = self.sketch.estimate_hashed(item_hash);
        if let Some(doorkeeper) = &self.doorkeeper {
            if doorkeeper.contains(item_hash) {
                freq = freq.saturating_add(1);
            }
        }
        freq
    }

    /// The admission decision for pre-hashed items.
    pub fn admit_hashed(&self, candidate: u64, victim: u64) -> bool {
        let admitted = self.frequency_hashed(candidate) > self.frequency_hashed(victim);
        if admitted {
            self.stats.record_admitted();
        } else {
            self.stats.record_rejected();
        }
        admitted
    }

    /// Estimated frequency of `item`, doorkeeper included.
    #[inline]
    pub fn frequency<Q: Hash + ?Sized>(&self, item: &Q) -> u32 {
        self.frequency_hashed(self.sketch.hash_item(item))
    }

    /// A point-in-time snapshot of the admission statistics.
    pub fn stats(&self) -> Metrics {
        self.stats.snapshot()
    }

    /// The underlying frequency sketch.
    pub fn sketch(&self) -> &FrequencySketch {
        &self.sketch
    }
}

impl<Q: Hash + ?Sized> Admittor<Q> for TinyLfu {
    #[inline]
    fn record(&mut self, item: &Q) {
        let h = self.sketch.hash_item(item);
        self.record_hashed(h);
    }

    #[inline]
    fn admit(&self, candidate: &Q, victim: &Q) -> bool {
        self.admit_hashed(self.sketch.hash_item(candidate), self.sketch.hash_item(victim))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
