#![forbid(unsafe_code)]

//! Per-operation operand pair solvers.

use crate::sampler::{SignVariant, expand_all, sample_magnitude, sample_signed};
use crate::tiers::{TierError, TierId, TierTable};
use bvg_oracle::{Operation, OracleError};
use bvg_random::{DeterministicRng, RandomError};
use num_bigint::{BigInt, BigUint, Sign};

/// Exclusive upper bound on a quotient-and-remainder quotient.
pub const BIN_LIMIT: u64 = 1_000_000_000;
pub const DEFAULT_DIVISOR_RETRIES: usize = 200;
pub const DEFAULT_DIVISION_RESTARTS: usize = 64;

pub const GENERATION_REASON_CODES: [&str; 10] = [
    "tier_lower_bound_zero",
    "tier_bounds_inverted",
    "tier_division_unsatisfiable",
    "random_upper_bound_rejected",
    "random_empty_range_rejected",
    "division_retries_exhausted",
    "retry_limits_invalid",
    "oracle_rejected_pair",
    "batch_count_invalid",
    "wrap_width_invalid",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    Tier(TierError),
    Random(RandomError),
    Oracle(OracleError),
    DivisionRetriesExhausted {
        restarts: usize,
        divisor_retries: usize,
    },
    InvalidRetryLimits,
    InvalidBatchCount,
    InvalidWrapWidth,
}

impl GenerationError {
    #[must_use]
    pub const fn reason_code(&self) -> &'static str {
        match self {
            Self::Tier(err) => err.reason_code(),
            Self::Random(err) => err.reason_code(),
            Self::Oracle(_) => "oracle_rejected_pair",
            Self::DivisionRetriesExhausted { .. } => "division_retries_exhausted",
            Self::InvalidRetryLimits => "retry_limits_invalid",
            Self::InvalidBatchCount => "batch_count_invalid",
            Self::InvalidWrapWidth => "wrap_width_invalid",
        }
    }
}

impl std::fmt::Display for GenerationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tier(err) => write!(f, "tier configuration invalid: {err}"),
            Self::Random(err) => write!(f, "random source rejected draw: {err}"),
            Self::Oracle(err) => write!(f, "oracle rejected solved pair: {err}"),
            Self::DivisionRetriesExhausted {
                restarts,
                divisor_retries,
            } => write!(
                f,
                "no dividend > divisor after {restarts} restarts of {divisor_retries} divisor draws; check tier configuration"
            ),
            Self::InvalidRetryLimits => write!(f, "retry limits must be > 0"),
            Self::InvalidBatchCount => write!(f, "batch count must be > 0"),
            Self::InvalidWrapWidth => write!(f, "wrap width must be > 0"),
        }
    }
}

impl std::error::Error for GenerationError {}

impl From<TierError> for GenerationError {
    fn from(err: TierError) -> Self {
        Self::Tier(err)
    }
}

impl From<RandomError> for GenerationError {
    fn from(err: RandomError) -> Self {
        Self::Random(err)
    }
}

impl From<OracleError> for GenerationError {
    fn from(err: OracleError) -> Self {
        Self::Oracle(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryLimits {
    /// Fresh divisor draws per dividend.
    pub divisor_retries: usize,
    /// Dividend redraws before giving up.
    pub division_restarts: usize,
}

impl Default for RetryLimits {
    fn default() -> Self {
        Self {
            divisor_retries: DEFAULT_DIVISOR_RETRIES,
            division_restarts: DEFAULT_DIVISION_RESTARTS,
        }
    }
}

/// Signed operands in emission order.
///
/// For quotient-and-remainder `x` is the dividend and `y` the divisor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperandPair {
    pub operation: Operation,
    pub x: BigInt,
    pub y: BigInt,
    pub attempts: usize,
}

/// Unsigned division draw with `x > y`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagnitudePair {
    pub x: BigUint,
    pub y: BigUint,
    pub attempts: usize,
}

/// Operand tier combination for unconstrained pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierClass {
    WideWide,
    NarrowWide,
    WideNarrow,
    NarrowNarrow,
}

impl TierClass {
    pub const ALL: [Self; 4] = [
        Self::WideWide,
        Self::NarrowWide,
        Self::WideNarrow,
        Self::NarrowNarrow,
    ];

    #[must_use]
    pub const fn tiers(self) -> (TierId, TierId) {
        match self {
            Self::WideWide => (TierId::Wide, TierId::Wide),
            Self::NarrowWide => (TierId::Narrow, TierId::Wide),
            Self::WideNarrow => (TierId::Wide, TierId::Narrow),
            Self::NarrowNarrow => (TierId::Narrow, TierId::Narrow),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PairSolver<'a> {
    tiers: &'a TierTable,
    limits: RetryLimits,
}

impl<'a> PairSolver<'a> {
    pub fn new(tiers: &'a TierTable, limits: RetryLimits) -> Result<Self, GenerationError> {
        if limits.divisor_retries == 0 || limits.division_restarts == 0 {
            return Err(GenerationError::InvalidRetryLimits);
        }
        Ok(Self { tiers, limits })
    }

    #[must_use]
    pub const fn limits(&self) -> RetryLimits {
        self.limits
    }

    /// Operand pairs for one generation step of `op`.
    ///
    /// Division yields all four sign variants of a single magnitude draw;
    /// every other operation yields exactly one pair.
    pub fn solve(
        &self,
        op: Operation,
        rng: &mut DeterministicRng,
    ) -> Result<Vec<OperandPair>, GenerationError> {
        let pair = match op {
            Operation::Addition | Operation::Subtraction | Operation::Multiplication => {
                self.unconstrained_pair(op, rng)?
            }
            Operation::Division => return self.division_pairs(rng),
            Operation::Modulus => self.modulus_pair(rng)?,
            Operation::QuotientAndRemainder => self.quotient_remainder_pair(rng)?,
            Operation::Exponentiation => self.exponentiation_pair(rng)?,
        };
        Ok(vec![pair])
    }

    pub fn unconstrained_pair(
        &self,
        op: Operation,
        rng: &mut DeterministicRng,
    ) -> Result<OperandPair, GenerationError> {
        let class = TierClass::ALL[rng.choose_index(TierClass::ALL.len())?];
        let (x_tier, y_tier) = class.tiers();
        let x = sample_signed(rng, self.tiers.tier(x_tier))?;
        let y = sample_signed(rng, self.tiers.tier(y_tier))?;
        Ok(OperandPair {
            operation: op,
            x,
            y,
            attempts: 1,
        })
    }

    /// Dividend from the wide tier, divisor from the narrow tier, `x > y`.
    pub fn division_magnitudes(
        &self,
        rng: &mut DeterministicRng,
    ) -> Result<MagnitudePair, GenerationError> {
        let wide = self.tiers.tier(TierId::Wide);
        let narrow = self.tiers.tier(TierId::Narrow);
        let mut attempts = 0;

        for _ in 0..self.limits.division_restarts {
            let x = sample_magnitude(rng, wide)?;
            for _ in 0..self.limits.divisor_retries {
                attempts += 1;
                let y = sample_magnitude(rng, narrow)?;
                if x > y {
                    return Ok(MagnitudePair { x, y, attempts });
                }
            }
        }

        Err(GenerationError::DivisionRetriesExhausted {
            restarts: self.limits.division_restarts,
            divisor_retries: self.limits.divisor_retries,
        })
    }

    pub fn division_pairs(
        &self,
        rng: &mut DeterministicRng,
    ) -> Result<Vec<OperandPair>, GenerationError> {
        let base = self.division_magnitudes(rng)?;
        Ok(expand_all(&base.x, &base.y)
            .into_iter()
            .map(|(x, y)| OperandPair {
                operation: Operation::Division,
                x,
                y,
                attempts: base.attempts,
            })
            .collect())
    }

    pub fn modulus_pair(&self, rng: &mut DeterministicRng) -> Result<OperandPair, GenerationError> {
        let base = self.division_magnitudes(rng)?;
        let (x, y) = SignVariant::choose(rng)?.apply(&base.x, &base.y);
        Ok(OperandPair {
            operation: Operation::Modulus,
            x,
            y,
            attempts: base.attempts,
        })
    }

    /// Divisor `d` from the wide tier, dividend uniform in `[d, d * BIN_LIMIT - 1]`.
    pub fn quotient_remainder_pair(
        &self,
        rng: &mut DeterministicRng,
    ) -> Result<OperandPair, GenerationError> {
        let divisor = sample_magnitude(rng, self.tiers.tier(TierId::Wide))?;
        let ceiling = &divisor * BIN_LIMIT - 1u32;
        let dividend = rng.uniform_biguint(&divisor, &ceiling)?;
        Ok(OperandPair {
            operation: Operation::QuotientAndRemainder,
            x: BigInt::from(dividend),
            y: BigInt::from(divisor),
            attempts: 1,
        })
    }

    pub fn exponentiation_pair(
        &self,
        rng: &mut DeterministicRng,
    ) -> Result<OperandPair, GenerationError> {
        let tier = self.tiers.tier(TierId::Exponent);
        let base = sample_magnitude(rng, tier)?;
        let exponent = sample_magnitude(rng, tier)?;
        let sign = if rng.fair_coin() { Sign::Minus } else { Sign::Plus };
        Ok(OperandPair {
            operation: Operation::Exponentiation,
            x: BigInt::from_biguint(sign, base),
            y: BigInt::from(exponent),
            attempts: 1,
        })
    }
}
