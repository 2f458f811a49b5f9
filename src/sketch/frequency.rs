use std::hash::Hash;

use super::count_min::CountMinSketch;

/// An aging frequency sketch: conservative-update Count-Min with a
/// TinyLFU-style sample reset.
///
/// Every insertion adds its weight to a running `size`.  Once `size` exceeds
/// `sample_size`, every counter is **halved** (logical right shift) and
/// `size` is rebuilt as `size / 2` minus the low bit of every counter — the
/// half-counts the shift discards.  Without that parity correction `size`
/// and the table sum drift apart, resets fire at the wrong cadence, and
/// admission decisions skew.
///
/// Halving makes the sketch forget old popularity exponentially: an item
/// that stops being accessed loses half its estimate per reset, so a
/// once-hot key cannot squat on cache space forever.  This is the aging
/// mechanism of the TinyLFU admission policy (Einziger, Friedman, Manes,
/// 2017).
///
/// The sketch is single-threaded; a caller that shares one instance across
/// threads must serialize access externally.
pub struct FrequencySketch {
    cms: CountMinSketch,
    /// Aging threshold: the inserted weight that triggers a reset.
    sample_size: u64,
    /// Weight added since the last reset (not since construction).
    size: u64,
    /// Completed resets.  Exposed so layers that cache per-item state (the
    /// doorkeeper) can detect a reset and flush in sync with the counters.
    resets: u64,
}

impl FrequencySketch {
    /// Creates a sketch with explicit dimensions and aging threshold.
    ///
    /// # Panics
    ///
    /// Panics if `depth`, `width`, or `sample_size` is zero.
    pub fn new(depth: usize, width: usize, seed: u64, sample_size: u64) -> Self {
        assert!(sample_size > 0, "sample_size must be greater than 0");
        FrequencySketch {
            cms: CountMinSketch::new(depth, width, seed),
            sample_size,
            size: 0,
            resets: 0,
        }
    }

    /// Creates a sketch sized for a target error bound; see
    /// [`CountMinSketch::with_error`] for the dimension derivation.
    ///
    /// # Panics
    ///
    /// Panics unless `0 < epsilon < 1`, `0 < delta < 1`, and
    /// `sample_size > 0`.
    pub fn with_error(epsilon: f64, delta: f64, seed: u64, sample_size: u64) -> Self {
        assert!(sample_size > 0, "sample_size must be greater than 0");
        FrequencySketch {
            cms: CountMinSketch::with_error(epsilon, delta, seed),
            sample_size,
            size: 0,
            resets: 0,
        }
    }

    /// Records `count` occurrences of `item`.
    ///
    /// The sample is advanced (and the table aged, if the threshold was
    /// crossed) **before** the counters are updated, so a reset halves only
    /// history, never the insertion that triggered it.
    #[inline]
    pub fn add<Q: Hash + ?Sized>(&mut self, item: &Q, count: u32) {
        self.advance_sample(count);
        self.cms.add_conservative(item, count);
    }

    /// [`add`](Self::add) for a pre-hashed item.
    #[inline]
    pub fn add_hashed(&mut self, item_hash: u64, count: u32) {
        self.advance_sample(count);
        self.cms.add_conservative_hashed(item_hash, count);
    }

    /// Estimated frequency of `item` within the current sample window.
    #[inline]
    pub fn estimate<Q: Hash + ?Sized>(&self, item: &Q) -> u32 {
        self.cms.estimate(item)
    }

    /// [`estimate`](Self::estimate) for a pre-hashed item.
    #[inline]
    pub fn estimate_hashed(&self, item_hash: u64) -> u32 {
        self.cms.estimate_hashed(item_hash)
    }

    #[inline]
    fn advance_sample(&mut self, count: u32) {
        self.size += count as u64;
        if self.size > self.sample_size {
            self.reset();
        }
    }

    /// Halves every counter and parity-corrects the sample.
    ///
    /// A single oversized insertion that overshoots the threshold by several
    /// sample intervals still causes exactly one halving — the cadence is
    /// per-call, not per-interval.
    fn reset(&mut self) {
        self.size /= 2;
        // Each odd counter loses its low bit to the shift; remove those
        // half-counts from the sample as well.  The subtraction clamps at
        // zero: `size` is unsigned, and a transiently negative sample would
        // only delay the next reset anyway.
        let odd = self.cms.halve();
        self.size = self.size.saturating_sub(odd);
        self.resets += 1;
    }

    /// Pre-hashes `item` the way every probe does.
    #[inline]
    pub fn hash_item<Q: Hash + ?Sized>(&self, item: &Q) -> u64 {
        self.cms.hash_item(item)
    }

    /// Inserted weight that triggers a reset.
    #[inline]
    pub fn sample_size(&self) -> u64 {
        self.sample_size
    }

    /// Weight recorded since the last reset.
    #[inline]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Number of resets performed so far.
    #[inline]
    pub fn resets(&self) -> u64 {
        self.resets
    }

    /// Sum of every counter in the table.
    pub fn total(&self) -> u64 {
        self.cms.total()
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.cms.depth()
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.cms.width()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_like_plain_count_min_below_threshold() {
        let mut sketch = FrequencySketch::new(4, 64, 1, 1_000);
        for _ in 0..5 {
            sketch.add(&"a", 1);
        }
        assert_eq!(sketch.estimate(&"a"), 5);
        assert_eq!(sketch.size(), 5);
        assert_eq!(sketch.resets(), 0);
    }

    #[test]
    fn reset_fires_when_sample_exceeded() {
        let mut sketch = FrequencySketch::new(4, 32, 1, 10);
        for i in 0..11u64 {
            sketch.add(&i, 1);
        }
        assert_eq!(sketch.resets(), 1, "the 11th insertion must trigger aging");
        assert!(sketch.size() <= 6, "size {} after reset", sketch.size());
        assert!(
            sketch.total() <= 6,
            "counter sum {} after reset",
            sketch.total()
        );
    }

    #[test]
    fn parity_correction_with_even_counters() {
        // Ten inserts of one item: its d cells each hold 10 when the 11th
        // insert crosses the threshold.  All cells even, so no parity debt:
        //   size = 11/2 = 5, counters 10 -> 5, then the insert lands: 6.
        let mut sketch = FrequencySketch::new(4, 32, 1, 10);
        for _ in 0..10 {
            sketch.add(&"x", 1);
        }
        sketch.add(&"x", 1);
        assert_eq!(sketch.resets(), 1);
        assert_eq!(sketch.size(), 5);
        assert_eq!(sketch.estimate(&"x"), 6);
    }

    #[test]
    fn parity_correction_with_odd_counters() {
        // Eleven inserts against S = 11: the 12th crosses with all four
        // cells holding 11 (odd).  size = 12/2 − 4 = 2, counters 11 -> 5,
        // then the insert lands: 6.
        let mut sketch = FrequencySketch::new(4, 32, 1, 11);
        for _ in 0..11 {
            sketch.add(&"x", 1);
        }
        sketch.add(&"x", 1);
        assert_eq!(sketch.resets(), 1);
        assert_eq!(sketch.size(), 2);
        assert_eq!(sketch.estimate(&"x"), 6);
    }

    #[test]
    fn oversized_insert_triggers_exactly_one_reset() {
        let mut sketch = FrequencySketch::new(4, 32, 1, 10);
        // 100 overshoots ten sample intervals, but the halving is per-call.
        sketch.add(&"x", 100);
        assert_eq!(sketch.resets(), 1);
        assert_eq!(
            sketch.estimate(&"x"),
            100,
            "the triggering insertion must not be halved"
        );
        assert_eq!(sketch.size(), 50);
    }

    #[test]
    fn reset_halves_every_counter_at_most() {
        let mut sketch = FrequencySketch::new(4, 64, 1, 50);
        for i in 0..10u64 {
            for _ in 0..5 {
                sketch.add(&i, 1);
            }
        }
        let before: Vec<u32> = (0..10u64).map(|i| sketch.estimate(&i)).collect();
        sketch.add(&"trigger", 1); // 51st unit of weight
        assert_eq!(sketch.resets(), 1);
        for (i, &b) in before.iter().enumerate() {
            let after = sketch.estimate(&(i as u64));
            assert!(
                after <= b,
                "estimate for {} grew across a reset: {} -> {}",
                i,
                b,
                after
            );
            assert!(
                after >= b / 2,
                "estimate for {} fell below half: {} -> {}",
                i,
                b,
                after
            );
        }
    }

    #[test]
    fn ranking_survives_repeated_aging() {
        let mut sketch = FrequencySketch::new(4, 128, 1, 100);
        // Keep "hot" warm through four sample windows of cold noise.
        for round in 0..4 {
            for _ in 0..40 {
                sketch.add(&"hot", 1);
            }
            for i in 0..70u64 {
                sketch.add(&(round * 1_000 + i), 1);
            }
        }
        assert!(sketch.resets() >= 3, "only {} resets", sketch.resets());
        assert!(
            sketch.estimate(&"hot") > sketch.estimate(&0u64),
            "hot item lost its lead: {} vs {}",
            sketch.estimate(&"hot"),
            sketch.estimate(&0u64)
        );
    }

    #[test]
    #[should_panic(expected = "sample_size must be greater than 0")]
    fn zero_sample_size_is_rejected() {
        FrequencySketch::new(4, 16, 1, 0);
    }

    #[test]
    #[should_panic(expected = "sample_size must be greater than 0")]
    fn zero_sample_size_is_rejected_with_error_bound() {
        FrequencySketch::with_error(0.1, 0.1, 1, 0);
    }
}
