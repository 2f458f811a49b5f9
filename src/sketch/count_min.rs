use std::hash::Hash;

use super::hash::HashFamily;
use super::matrix::CounterMatrix;

/// Count-Min sketch: approximate frequency counting in `depth × width`
/// saturating counters.
///
/// [`estimate`] returns the **minimum** of the `depth` probed cells — the
/// classical Count-Min estimator, which may overestimate (hash collisions
/// add phantom counts) but never underestimates.
///
/// Two update rules are provided:
///
/// | Rule | Cells written | Effect on collisions |
/// |------|---------------|----------------------|
/// | [`add`] (classical) | all `depth` probed cells | every insertion inflates colliding items in every row |
/// | [`add_conservative`] | only cells at or below `min + count` | colliding items see fewer phantom increments |
///
/// Both rules produce the *same* estimate for the inserted item itself; the
/// conservative rule only reduces the collateral damage of collisions, which
/// is why it is the one the admission layer builds on.
///
/// [`estimate`]: CountMinSketch::estimate
/// [`add`]: CountMinSketch::add
/// [`add_conservative`]: CountMinSketch::add_conservative
pub struct CountMinSketch {
    hashes: HashFamily,
    table: CounterMatrix,
    /// Scratch for the probed columns, reused across `add` calls so the
    /// steady state performs no allocation.
    probe: Box<[usize]>,
}

impl CountMinSketch {
    /// Creates a sketch with explicit dimensions.
    ///
    /// `depth` governs the failure probability (`δ ≈ e^−depth`), `width` the
    /// error magnitude (`ε ≈ e/width`).  `seed` derives the hash family, so
    /// sketches sharing a seed probe identical columns.
    ///
    /// # Panics
    ///
    /// Panics if `depth` or `width` is zero.
    pub fn new(depth: usize, width: usize, seed: u64) -> Self {
        let hashes = HashFamily::new(depth, width, seed);
        CountMinSketch {
            probe: vec![0usize; depth].into_boxed_slice(),
            table: CounterMatrix::new(depth, width),
            hashes,
        }
    }

    /// Creates a sketch sized for a target error bound.
    ///
    /// Chooses `width = ⌈e/epsilon⌉` and `depth = ⌈ln(1/delta)⌉`, which give
    /// `estimate(x) ≤ true(x) + epsilon·N` with probability at least
    /// `1 − delta` after `N` insertions.
    ///
    /// # Panics
    ///
    /// Panics unless `0 < epsilon < 1` and `0 < delta < 1`.
    pub fn with_error(epsilon: f64, delta: f64, seed: u64) -> Self {
        assert!(
            epsilon > 0.0 && epsilon < 1.0,
            "epsilon must be in (0, 1)"
        );
        assert!(delta > 0.0 && delta < 1.0, "delta must be in (0, 1)");

        let width = (std::f64::consts::E / epsilon).ceil() as usize;
        let depth = ((1.0 / delta).ln().ceil() as usize).max(1);
        Self::new(depth, width, seed)
    }

    /// Estimated frequency of `item`: the minimum over the probed cells.
    ///
    /// Never under-reports the item's (decayed) true frequency.  Cost: one
    /// probe per row.
    #[inline]
    pub fn estimate<Q: Hash + ?Sized>(&self, item: &Q) -> u32 {
        self.estimate_hashed(self.hashes.hash_item(item))
    }

    /// [`estimate`](Self::estimate) for a pre-hashed item.
    pub fn estimate_hashed(&self, item_hash: u64) -> u32 {
        let mut min = u32::MAX;
        for row in 0..self.depth() {
            let col = self.hashes.column(row, item_hash);
            min = min.min(self.table.get(row, col));
        }
        min
    }

    /// Classical update: adds `count` to **all** probed cells, saturating.
    ///
    /// Kept as the reference rule; the admission sketch uses
    /// [`add_conservative`](Self::add_conservative) instead.
    #[inline]
    pub fn add<Q: Hash + ?Sized>(&mut self, item: &Q, count: u32) {
        self.add_hashed(self.hashes.hash_item(item), count);
    }

    /// [`add`](Self::add) for a pre-hashed item.
    pub fn add_hashed(&mut self, item_hash: u64, count: u32) {
        debug_assert!(count >= 1, "count must be at least 1");
        for row in 0..self.depth() {
            let col = self.hashes.column(row, item_hash);
            self.table.saturating_add(row, col, count);
        }
    }

    /// Conservative update: raises each probed cell to `min + count`, where
    /// `min` is the smallest probed value **before** the update.
    ///
    /// Cells already above `min + count` are left untouched; every cell at
    /// the minimum receives the full increment.  The estimator (the min) ends
    /// up exactly where the classical rule would put it, but non-minimum
    /// cells accumulate fewer phantom counts from collisions.
    #[inline]
    pub fn add_conservative<Q: Hash + ?Sized>(&mut self, item: &Q, count: u32) {
        self.add_conservative_hashed(self.hashes.hash_item(item), count);
    }

    /// [`add_conservative`](Self::add_conservative) for a pre-hashed item.
    pub fn add_conservative_hashed(&mut self, item_hash: u64, count: u32) {
        debug_assert!(count >= 1, "count must be at least 1");
        let mut min = u32::MAX;
        for row in 0..self.depth() {
            let col = self.hashes.column(row, item_hash);
            self.probe[row] = col;
            min = min.min(self.table.get(row, col));
        }
        let target = min.saturating_add(count);
        for row in 0..self.depth() {
            self.table.raise_to(row, self.probe[row], target);
        }
    }

    /// Halves every counter; returns how many were odd before the shift.
    pub(crate) fn halve(&mut self) -> u64 {
        self.table.halve()
    }

    /// Pre-hashes `item` the way every probe does.  Exposed so layers above
    /// the sketch (doorkeeper, admission oracle) can share one hash per item.
    #[inline]
    pub fn hash_item<Q: Hash + ?Sized>(&self, item: &Q) -> u64 {
        self.hashes.hash_item(item)
    }

    /// Sum of every counter in the table.
    pub fn total(&self) -> u64 {
        self.table.total()
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.table.depth()
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.table.width()
    }
}
