#![forbid(unsafe_code)]

//! Shared magnitude tier table.

use num_bigint::BigUint;
use num_traits::One;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TierId {
    Narrow,
    Wide,
    Exponent,
}

impl TierId {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Narrow => "small-big",
            Self::Wide => "big-big",
            Self::Exponent => "exponent",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TierError {
    ZeroLowerBound(TierId),
    InvertedBounds(TierId),
    UnsatisfiableDivision,
}

impl TierError {
    #[must_use]
    pub const fn reason_code(&self) -> &'static str {
        match self {
            Self::ZeroLowerBound(_) => "tier_lower_bound_zero",
            Self::InvertedBounds(_) => "tier_bounds_inverted",
            Self::UnsatisfiableDivision => "tier_division_unsatisfiable",
        }
    }
}

impl std::fmt::Display for TierError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroLowerBound(id) => write!(f, "tier {} must have lower >= 1", id.as_str()),
            Self::InvertedBounds(id) => write!(f, "tier {} has lower > upper", id.as_str()),
            Self::UnsatisfiableDivision => write!(
                f,
                "small-big floor is not below the big-big ceiling; no dividend can exceed a divisor"
            ),
        }
    }
}

impl std::error::Error for TierError {}

/// Closed interval `[lower, upper]` of unsigned magnitudes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagnitudeTier {
    id: TierId,
    lower: BigUint,
    upper: BigUint,
}

impl MagnitudeTier {
    pub fn new(id: TierId, lower: BigUint, upper: BigUint) -> Result<Self, TierError> {
        if lower < BigUint::one() {
            return Err(TierError::ZeroLowerBound(id));
        }
        if lower > upper {
            return Err(TierError::InvertedBounds(id));
        }
        Ok(Self { id, lower, upper })
    }

    /// Tier spanning `[10^lower_exp, 10^upper_exp]`.
    pub fn decimal(id: TierId, lower_exp: u32, upper_exp: u32) -> Result<Self, TierError> {
        let ten = BigUint::from(10u32);
        Self::new(id, ten.pow(lower_exp), ten.pow(upper_exp))
    }

    pub fn small(id: TierId, lower: u64, upper: u64) -> Result<Self, TierError> {
        Self::new(id, BigUint::from(lower), BigUint::from(upper))
    }

    #[must_use]
    pub const fn id(&self) -> TierId {
        self.id
    }

    #[must_use]
    pub const fn lower(&self) -> &BigUint {
        &self.lower
    }

    #[must_use]
    pub const fn upper(&self) -> &BigUint {
        &self.upper
    }

    #[must_use]
    pub fn contains(&self, value: &BigUint) -> bool {
        value >= &self.lower && value <= &self.upper
    }
}

/// Every tier used by the pair solvers, defined once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierTable {
    narrow: MagnitudeTier,
    wide: MagnitudeTier,
    exponent: MagnitudeTier,
}

impl TierTable {
    pub fn new(
        narrow: MagnitudeTier,
        wide: MagnitudeTier,
        exponent: MagnitudeTier,
    ) -> Result<Self, TierError> {
        // Division draws its dividend from `wide` and divisor from `narrow`.
        if narrow.lower() >= wide.upper() {
            return Err(TierError::UnsatisfiableDivision);
        }
        Ok(Self {
            narrow,
            wide,
            exponent,
        })
    }

    /// `small-big = [1e12, 1e50]`, `big-big = [1e12, 1e100]`, `exponent = [2, 500]`.
    #[must_use]
    pub fn standard() -> Self {
        let ten = BigUint::from(10u32);
        Self {
            narrow: MagnitudeTier {
                id: TierId::Narrow,
                lower: ten.pow(12),
                upper: ten.pow(50),
            },
            wide: MagnitudeTier {
                id: TierId::Wide,
                lower: ten.pow(12),
                upper: ten.pow(100),
            },
            exponent: MagnitudeTier {
                id: TierId::Exponent,
                lower: BigUint::from(2u32),
                upper: BigUint::from(500u32),
            },
        }
    }

    #[must_use]
    pub const fn tier(&self, id: TierId) -> &MagnitudeTier {
        match id {
            TierId::Narrow => &self.narrow,
            TierId::Wide => &self.wide,
            TierId::Exponent => &self.exponent,
        }
    }
}

impl Default for TierTable {
    fn default() -> Self {
        Self::standard()
    }
}
