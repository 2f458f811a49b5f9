use crate::admission::TinyLfu;
use crate::sketch::doorkeeper::Doorkeeper;
use crate::sketch::frequency::FrequencySketch;

/// Seed used when the caller does not supply one.  Any fixed value works;
/// the sketch only needs the seed to be stable for its own lifetime.
const DEFAULT_SEED: u64 = 0xD6E8_FEB8_6659_FD93;

/// How the sketch dimensions are chosen.
enum Dimensions {
    /// Explicit `depth × width`.
    Direct { depth: usize, width: usize },
    /// Derived from a target error bound: `width = ⌈e/ε⌉`, `depth = ⌈ln(1/δ)⌉`.
    ErrorBound { epsilon: f64, delta: f64 },
}

/// Builder for configuring and constructing a [`TinyLfu`] admission filter.
///
/// # Example
/// ```
/// use lungo::TinyLfuBuilder;
///
/// let filter = TinyLfuBuilder::new(100_000)
///     .error_bound(0.001, 0.01)
///     .seed(42)
///     .doorkeeper(true)
///     .build();
/// assert_eq!(filter.frequency(&"anything"), 0);
/// ```
pub struct TinyLfuBuilder {
    sample_size: u64,
    dimensions: Dimensions,
    seed: u64,
    doorkeeper: bool,
}

impl TinyLfuBuilder {
    /// Starts a builder for a filter that ages after `sample_size` units of
    /// recorded weight.
    ///
    /// The default dimensions are `depth = 4` and `width = sample_size / 10`
    /// (at least 8) — ten samples per counter column, the customary TinyLFU
    /// sizing.  Override with [`dimensions`](Self::dimensions) or
    /// [`error_bound`](Self::error_bound).
    ///
    /// # Panics
    ///
    /// Panics if `sample_size` is zero.
    pub fn new(sample_size: u64) -> Self {
        assert!(sample_size > 0, "sample_size must be greater than 0");
        TinyLfuBuilder {
            sample_size,
            dimensions: Dimensions::Direct {
                depth: 4,
                width: (sample_size / 10).max(8) as usize,
            },
            seed: DEFAULT_SEED,
            doorkeeper: false,
        }
    }

    /// Sets explicit sketch dimensions.
    ///
    /// # Panics
    ///
    /// Panics if `depth` or `width` is zero.
    pub fn dimensions(mut self, depth: usize, width: usize) -> Self {
        assert!(depth >= 1, "depth must be at least 1");
        assert!(width >= 1, "width must be at least 1");
        self.dimensions = Dimensions::Direct { depth, width };
        self
    }

    /// Derives the sketch dimensions from a target error bound.
    ///
    /// # Panics
    ///
    /// Panics unless `0 < epsilon < 1` and `0 < delta < 1`.
    pub fn error_bound(mut self, epsilon: f64, delta: f64) -> Self {
        assert!(epsilon > 0.0 && epsilon < 1.0, "epsilon must be in (0, 1)");
        assert!(delta > 0.0 && delta < 1.0, "delta must be in (0, 1)");
        self.dimensions = Dimensions::ErrorBound { epsilon, delta };
        self
    }

    /// Seeds the hash family (and the doorkeeper, if enabled).  Filters
    /// built with the same configuration and seed behave identically.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Enables the doorkeeper: a Bloom filter absorbing each item's first
    /// sighting per sample window so one-hit wonders never touch the
    /// counters.  Disabled by default.
    pub fn doorkeeper(mut self, enabled: bool) -> Self {
        self.doorkeeper = enabled;
        self
    }

    pub fn build(self) -> TinyLfu {
        let sketch = match self.dimensions {
            Dimensions::Direct { depth, width } => {
                FrequencySketch::new(depth, width, self.seed, self.sample_size)
            }
            Dimensions::ErrorBound { epsilon, delta } => {
                FrequencySketch::with_error(epsilon, delta, self.seed, self.sample_size)
            }
        };
        let doorkeeper = self
            .doorkeeper
            .then(|| Doorkeeper::new(self.sample_size as usize, self.seed));
        TinyLfu::new(sketch, doorkeeper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_dimensions_follow_sample_size() {
        let filter = TinyLfuBuilder::new(1_000).build();
        assert_eq!(filter.sketch().depth(), 4);
        assert_eq!(filter.sketch().width(), 100);
        assert_eq!(filter.sketch().sample_size(), 1_000);
    }

    #[test]
    fn tiny_samples_get_a_floor_width() {
        let filter = TinyLfuBuilder::new(10).build();
        assert_eq!(filter.sketch().width(), 8);
    }

    #[test]
    fn error_bound_overrides_dimensions() {
        let filter = TinyLfuBuilder::new(1_000).error_bound(0.1, 0.1).build();
        assert_eq!(filter.sketch().width(), 28);
        assert_eq!(filter.sketch().depth(), 3);
    }

    #[test]
    #[should_panic(expected = "sample_size must be greater than 0")]
    fn zero_sample_size_is_rejected() {
        TinyLfuBuilder::new(0);
    }

    #[test]
    #[should_panic(expected = "width must be at least 1")]
    fn zero_width_is_rejected() {
        TinyLfuBuilder::new(100).dimensions(4, 0);
    }
}
