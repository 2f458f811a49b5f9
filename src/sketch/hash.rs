use std::hash::Hash;

use ahash::RandomState;

/// SplitMix64 sequence increment (the 64-bit golden ratio).
const GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// SplitMix64 finalizer — a 64-bit avalanche mixer.
///
/// Every input bit affects every output bit with probability ~1/2, so
/// XOR-ing a per-row salt into an item hash and mixing yields column
/// choices that behave as approximately pairwise-independent across rows.
#[inline]
pub(crate) fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// A family of `depth` hash functions mapping items to columns in `[0, width)`.
///
/// Construction is fully determined by `(depth, width, seed)`: the per-row
/// salts are drawn from a SplitMix64 stream over `seed`, and the item
/// pre-hasher is an [`ahash::RandomState`] keyed from the same stream.  Two
/// families built with the same parameters therefore probe the same columns
/// for the same items.
///
/// A probe mixes `salt[row] ^ item_hash` through [`mix64`] and reduces the
/// result to `[0, width)` with Lemire's multiply-shift, which stays unbiased
/// when `width` is not a power of two.
pub struct HashFamily {
    /// One salt per row.
    salts: Box<[u64]>,
    width: usize,
    /// Pre-hashes arbitrary `Hash` items (integers, strings, byte slices)
    /// to the fixed-width `u64` the row mixers operate on.
    item_hasher: RandomState,
}

impl HashFamily {
    /// Creates a family of `depth` hash functions over `[0, width)`.
    ///
    /// # Panics
    ///
    /// Panics if `depth` or `width` is zero.
    pub fn new(depth: usize, width: usize, seed: u64) -> Self {
        assert!(depth >= 1, "depth must be at least 1");
        assert!(width >= 1, "width must be at least 1");

        let mut state = seed;
        let mut next = || {
            state = state.wrapping_add(GAMMA);
            mix64(state)
        };

        let salts = (0..depth).map(|_| next()).collect();
        let item_hasher = RandomState::with_seeds(next(), next(), next(), next());

        HashFamily {
            salts,
            width,
            item_hasher,
        }
    }

    /// Pre-hashes `item` to the fixed-width integer the row mixers consume.
    #[inline]
    pub fn hash_item<Q: Hash + ?Sized>(&self, item: &Q) -> u64 {
        self.item_hasher.hash_one(item)
    }

    /// Column for `item_hash` in `row`, in `[0, width)`.
    ///
    /// `(mixed as u128 * width) >> 64` maps the full 64-bit range onto the
    /// column range proportionally, with no modulo and no power-of-two
    /// requirement.
    #[inline]
    pub fn column(&self, row: usize, item_hash: u64) -> usize {
        let mixed = mix64(self.salts[row] ^ item_hash);
        (((mixed as u128) * (self.width as u128)) >> 64) as usize
    }
}
