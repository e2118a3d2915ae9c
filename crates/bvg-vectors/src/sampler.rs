#![forbid(unsafe_code)]

use crate::tiers::MagnitudeTier;
use bvg_random::{DeterministicRng, RandomError};
use num_bigint::{BigInt, BigUint, Sign};

/// Uniform magnitude from the tier's closed interval.
pub fn sample_magnitude(
    rng: &mut DeterministicRng,
    tier: &MagnitudeTier,
) -> Result<BigUint, RandomError> {
    rng.uniform_biguint(tier.lower(), tier.upper())
}

/// Magnitude with an independent fair sign.
pub fn sample_signed(
    rng: &mut DeterministicRng,
    tier: &MagnitudeTier,
) -> Result<BigInt, RandomError> {
    let magnitude = sample_magnitude(rng, tier)?;
    let sign = if rng.fair_coin() { Sign::Minus } else { Sign::Plus };
    Ok(BigInt::from_biguint(sign, magnitude))
}

/// Signs applied to an unsigned `(x, y)` base pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignVariant {
    PosPos,
    NegPos,
    PosNeg,
    NegNeg,
}

impl SignVariant {
    /// Emission order for exhaustive expansion.
    pub const ALL: [Self; 4] = [Self::PosPos, Self::NegPos, Self::PosNeg, Self::NegNeg];

    #[must_use]
    pub const fn signs(self) -> (Sign, Sign) {
        match self {
            Self::PosPos => (Sign::Plus, Sign::Plus),
            Self::NegPos => (Sign::Minus, Sign::Plus),
            Self::PosNeg => (Sign::Plus, Sign::Minus),
            Self::NegNeg => (Sign::Minus, Sign::Minus),
        }
    }

    pub fn choose(rng: &mut DeterministicRng) -> Result<Self, RandomError> {
        let idx = rng.choose_index(Self::ALL.len())?;
        Ok(Self::ALL[idx])
    }

    #[must_use]
    pub fn apply(self, x: &BigUint, y: &BigUint) -> (BigInt, BigInt) {
        let (sx, sy) = self.signs();
        (
            BigInt::from_biguint(sx, x.clone()),
            BigInt::from_biguint(sy, y.clone()),
        )
    }
}

/// All four signed variants of one magnitude pair, in `SignVariant::ALL` order.
#[must_use]
pub fn expand_all(x: &BigUint, y: &BigUint) -> [(BigInt, BigInt); 4] {
    SignVariant::ALL.map(|variant| variant.apply(x, y))
}
