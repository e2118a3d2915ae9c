#![forbid(unsafe_code)]

//! Explicitly threaded random source for vector generation.
//!
//! Every sampler takes `&mut DeterministicRng`; there is no process-wide
//! generator, so a seed fully determines a generated batch.

use num_bigint::BigUint;

const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;
const MIX_CONST1: u64 = 0xBF58_476D_1CE4_E5B9;
const MIX_CONST2: u64 = 0x94D0_49BB_1331_11EB;
pub const DEFAULT_RNG_SEED: u64 = 0xC0DE_CAFE_F00D_BAAD;

pub const RANDOM_REASON_CODES: [&str; 2] = [
    "random_upper_bound_rejected",
    "random_empty_range_rejected",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RandomError {
    InvalidUpperBound,
    EmptyRange,
}

impl RandomError {
    #[must_use]
    pub const fn reason_code(self) -> &'static str {
        match self {
            Self::InvalidUpperBound => "random_upper_bound_rejected",
            Self::EmptyRange => "random_empty_range_rejected",
        }
    }
}

impl std::fmt::Display for RandomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUpperBound => write!(f, "upper_bound must be > 0"),
            Self::EmptyRange => write!(f, "range lower bound exceeds upper bound"),
        }
    }
}

impl std::error::Error for RandomError {}

/// Counter-based SplitMix64 stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeterministicRng {
    stream_seed: u64,
    counter: u64,
}

impl DeterministicRng {
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            stream_seed: seed,
            counter: 0,
        }
    }

    #[must_use]
    pub const fn from_state(seed: u64, counter: u64) -> Self {
        Self {
            stream_seed: seed,
            counter,
        }
    }

    #[must_use]
    pub const fn state(self) -> (u64, u64) {
        (self.stream_seed, self.counter)
    }

    #[must_use]
    pub const fn seed(self) -> u64 {
        self.stream_seed
    }

    #[must_use]
    pub fn next_u64(&mut self) -> u64 {
        self.counter = self.counter.wrapping_add(1);
        splitmix64(
            self.stream_seed
                .wrapping_add(self.counter.wrapping_mul(GOLDEN_GAMMA)),
        )
    }

    /// Uniform draw from `[0, upper_bound)` by rejection sampling.
    pub fn bounded_u64(&mut self, upper_bound: u64) -> Result<u64, RandomError> {
        if upper_bound == 0 {
            return Err(RandomError::InvalidUpperBound);
        }

        let threshold = u64::MAX - u64::MAX % upper_bound;

        loop {
            let candidate = self.next_u64();
            if candidate < threshold {
                return Ok(candidate % upper_bound);
            }
        }
    }

    /// Uniform index into a collection of `len` elements.
    pub fn choose_index(&mut self, len: usize) -> Result<usize, RandomError> {
        let picked = self.bounded_u64(len as u64)?;
        Ok(picked as usize)
    }

    #[must_use]
    pub fn fair_coin(&mut self) -> bool {
        self.next_u64() >> 63 == 1
    }

    /// Uniform draw from `[0, bound)` for an arbitrary-width bound.
    ///
    /// Draws exactly as many 32-bit digits as `bound` needs, masks the spare
    /// high bits, and rejects candidates `>= bound`. Each attempt succeeds
    /// with probability above one half.
    pub fn below_biguint(&mut self, bound: &BigUint) -> Result<BigUint, RandomError> {
        let bits = bound.bits();
        if bits == 0 {
            return Err(RandomError::InvalidUpperBound);
        }
        let words = bits.div_ceil(32);
        let spare = (words * 32 - bits) as u32;

        loop {
            let mut digits: Vec<u32> = (0..words).map(|_| (self.next_u64() >> 32) as u32).collect();
            if let Some(top) = digits.last_mut() {
                *top >>= spare;
            }
            let candidate = BigUint::new(digits);
            if &candidate < bound {
                return Ok(candidate);
            }
        }
    }

    /// Uniform draw from the closed interval `[lower, upper]`.
    pub fn uniform_biguint(
        &mut self,
        lower: &BigUint,
        upper: &BigUint,
    ) -> Result<BigUint, RandomError> {
        if lower > upper {
            return Err(RandomError::EmptyRange);
        }
        let span = upper - lower + 1u32;
        Ok(lower + self.below_biguint(&span)?)
    }
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(DEFAULT_RNG_SEED)
    }
}

fn splitmix64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(MIX_CONST1);
    x ^= x >> 27;
    x = x.wrapping_mul(MIX_CONST2);
    x ^ (x >> 31)
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_RNG_SEED, DeterministicRng, RANDOM_REASON_CODES, RandomError};
    use num_bigint::BigUint;

    #[test]
    fn reason_code_registry_is_stable() {
        assert_eq!(
            RANDOM_REASON_CODES,
            [
                "random_upper_bound_rejected",
                "random_empty_range_rejected",
            ]
        );
        assert_eq!(
            RandomError::InvalidUpperBound.reason_code(),
            RANDOM_REASON_CODES[0]
        );
        assert_eq!(RandomError::EmptyRange.reason_code(), RANDOM_REASON_CODES[1]);
    }

    #[test]
    fn same_seed_replays_same_stream() {
        let mut a = DeterministicRng::new(1234);
        let mut b = DeterministicRng::new(1234);
        for _ in 0..64 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = DeterministicRng::new(1);
        let mut b = DeterministicRng::new(2);
        let left: Vec<u64> = (0..8).map(|_| a.next_u64()).collect();
        let right: Vec<u64> = (0..8).map(|_| b.next_u64()).collect();
        assert_ne!(left, right);
    }

    #[test]
    fn restored_state_continues_stream() {
        let mut rng = DeterministicRng::new(99);
        let _ = rng.next_u64();
        let _ = rng.next_u64();
        let (seed, counter) = rng.state();
        let mut restored = DeterministicRng::from_state(seed, counter);
        assert_eq!(rng.next_u64(), restored.next_u64());
    }

    #[test]
    fn default_uses_default_seed() {
        assert_eq!(DeterministicRng::default().seed(), DEFAULT_RNG_SEED);
    }

    #[test]
    fn bounded_u64_rejects_zero_and_stays_in_range() {
        let mut rng = DeterministicRng::new(7);
        assert_eq!(rng.bounded_u64(0), Err(RandomError::InvalidUpperBound));
        for _ in 0..1000 {
            assert!(rng.bounded_u64(4).expect("non-zero bound") < 4);
        }
    }

    #[test]
    fn choose_index_covers_every_slot() {
        let mut rng = DeterministicRng::new(11);
        let mut seen = [false; 4];
        for _ in 0..400 {
            seen[rng.choose_index(4).expect("non-empty")] = true;
        }
        assert!(seen.iter().all(|hit| *hit));
    }

    #[test]
    fn fair_coin_produces_both_faces() {
        let mut rng = DeterministicRng::new(3);
        let heads = (0..1000).filter(|_| rng.fair_coin()).count();
        assert!((350..=650).contains(&heads), "heads={heads}");
    }

    #[test]
    fn below_biguint_rejects_zero_bound() {
        let mut rng = DeterministicRng::new(5);
        assert_eq!(
            rng.below_biguint(&BigUint::from(0u32)),
            Err(RandomError::InvalidUpperBound)
        );
    }

    #[test]
    fn uniform_biguint_stays_inside_wide_bounds() {
        let mut rng = DeterministicRng::new(17);
        let lower = BigUint::from(10u32).pow(12);
        let upper = BigUint::from(10u32).pow(100);
        for _ in 0..200 {
            let value = rng
                .uniform_biguint(&lower, &upper)
                .expect("valid interval");
            assert!(value >= lower && value <= upper);
        }
    }

    #[test]
    fn uniform_biguint_handles_degenerate_interval() {
        let mut rng = DeterministicRng::new(23);
        let point = BigUint::from(10u32).pow(40);
        let value = rng.uniform_biguint(&point, &point).expect("single point");
        assert_eq!(value, point);
    }

    #[test]
    fn uniform_biguint_rejects_inverted_interval() {
        let mut rng = DeterministicRng::new(29);
        let lower = BigUint::from(500u32);
        let upper = BigUint::from(2u32);
        assert_eq!(
            rng.uniform_biguint(&lower, &upper),
            Err(RandomError::EmptyRange)
        );
    }

    #[test]
    fn uniform_biguint_reaches_both_ends_of_small_interval() {
        let mut rng = DeterministicRng::new(31);
        let lower = BigUint::from(2u32);
        let upper = BigUint::from(5u32);
        let mut hits = [false; 4];
        for _ in 0..400 {
            let value = rng.uniform_biguint(&lower, &upper).expect("valid interval");
            let slot = u32::try_from(&value - &lower).expect("small offset") as usize;
            hits[slot] = true;
        }
        assert!(hits.iter().all(|hit| *hit));
    }
}
