#![forbid(unsafe_code)]

use num_bigint::{BigInt, Sign};
use num_integer::Integer;
use num_traits::{ToPrimitive, Zero};
use serde::{Deserialize, Serialize};

/// Largest exponent the oracle will expand.
pub const MAX_EXPONENT: u32 = 1 << 16;

pub const ORACLE_REASON_CODES: [&str; 4] = [
    "oracle_division_by_zero",
    "oracle_negative_exponent",
    "oracle_exponent_out_of_range",
    "oracle_quotient_remainder_domain",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Modulus,
    Exponentiation,
    QuotientAndRemainder,
}

impl Operation {
    pub const ALL: [Self; 7] = [
        Self::Addition,
        Self::Subtraction,
        Self::Multiplication,
        Self::Division,
        Self::Modulus,
        Self::Exponentiation,
        Self::QuotientAndRemainder,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Addition => "addition",
            Self::Subtraction => "subtraction",
            Self::Multiplication => "multiplication",
            Self::Division => "division",
            Self::Modulus => "modulus",
            Self::Exponentiation => "exponentiation",
            Self::QuotientAndRemainder => "quotient_and_remainder",
        }
    }

    /// Name of the assertion helper in the consuming test suite.
    #[must_use]
    pub const fn assertion_name(self) -> &'static str {
        match self {
            Self::Addition => "runAddition",
            Self::Subtraction => "runSubtraction",
            Self::Multiplication => "runMultiplication",
            Self::Division => "runDivision",
            Self::Modulus => "runModulus",
            Self::Exponentiation => "runExponentiation",
            Self::QuotientAndRemainder => "runQuotientAndRemainder",
        }
    }

    pub fn from_wire(raw: &str) -> Result<Self, String> {
        let normalized = raw.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == normalized)
            .ok_or_else(|| format!("unknown operation '{raw}'"))
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sign rule for `%` when the operands disagree in sign.
///
/// `Floored` gives the remainder the divisor's sign (`-5 % 3 == 1`);
/// `Truncated` gives it the dividend's sign (`-5 % 3 == -2`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemainderConvention {
    #[default]
    Floored,
    Truncated,
}

impl RemainderConvention {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Floored => "floored",
            Self::Truncated => "truncated",
        }
    }

    pub fn from_wire(raw: &str) -> Result<Self, String> {
        match raw.trim() {
            "floored" => Ok(Self::Floored),
            "truncated" => Ok(Self::Truncated),
            bad => Err(format!("unknown remainder convention '{bad}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    DivisionByZero,
    NegativeExponent,
    ExponentOutOfRange(BigInt),
    QuotientRemainderDomain,
}

impl OracleError {
    #[must_use]
    pub const fn reason_code(&self) -> &'static str {
        match self {
            Self::DivisionByZero => "oracle_division_by_zero",
            Self::NegativeExponent => "oracle_negative_exponent",
            Self::ExponentOutOfRange(_) => "oracle_exponent_out_of_range",
            Self::QuotientRemainderDomain => "oracle_quotient_remainder_domain",
        }
    }
}

impl std::fmt::Display for OracleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DivisionByZero => write!(f, "divisor must be non-zero"),
            Self::NegativeExponent => write!(f, "exponent must be non-negative"),
            Self::ExponentOutOfRange(exp) => {
                write!(f, "exponent {exp} exceeds maximum {MAX_EXPONENT}")
            }
            Self::QuotientRemainderDomain => {
                write!(f, "quotient-and-remainder requires 0 < divisor <= dividend")
            }
        }
    }
}

impl std::error::Error for OracleError {}

/// Trusted result for one operand pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected {
    Single(BigInt),
    QuotientRemainder { quotient: BigInt, remainder: BigInt },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OracleEvaluator {
    remainder: RemainderConvention,
}

impl OracleEvaluator {
    #[must_use]
    pub const fn new(remainder: RemainderConvention) -> Self {
        Self { remainder }
    }

    #[must_use]
    pub const fn remainder_convention(&self) -> RemainderConvention {
        self.remainder
    }

    /// Exact result of `op` applied to `(x, y)` in emission order.
    ///
    /// For `QuotientAndRemainder`, `x` is the dividend and `y` the divisor.
    pub fn evaluate(&self, op: Operation, x: &BigInt, y: &BigInt) -> Result<Expected, OracleError> {
        let single = match op {
            Operation::Addition => x + y,
            Operation::Subtraction => x - y,
            Operation::Multiplication => x * y,
            Operation::Division => truncating_div(x, y)?,
            Operation::Modulus => self.modulus(x, y)?,
            Operation::Exponentiation => power(x, y)?,
            Operation::QuotientAndRemainder => {
                let (quotient, remainder) = quotient_and_remainder(x, y)?;
                return Ok(Expected::QuotientRemainder {
                    quotient,
                    remainder,
                });
            }
        };
        Ok(Expected::Single(single))
    }

    pub fn modulus(&self, x: &BigInt, y: &BigInt) -> Result<BigInt, OracleError> {
        if y.is_zero() {
            return Err(OracleError::DivisionByZero);
        }
        Ok(match self.remainder {
            RemainderConvention::Floored => x.mod_floor(y),
            RemainderConvention::Truncated => x % y,
        })
    }
}

/// Division rounding toward zero.
pub fn truncating_div(x: &BigInt, y: &BigInt) -> Result<BigInt, OracleError> {
    if y.is_zero() {
        return Err(OracleError::DivisionByZero);
    }
    Ok(x / y)
}

pub fn power(base: &BigInt, exponent: &BigInt) -> Result<BigInt, OracleError> {
    if exponent.sign() == Sign::Minus {
        return Err(OracleError::NegativeExponent);
    }
    let exp = exponent
        .to_u32()
        .filter(|exp| *exp <= MAX_EXPONENT)
        .ok_or_else(|| OracleError::ExponentOutOfRange(exponent.clone()))?;
    Ok(base.pow(exp))
}

/// `(q, r)` with `dividend = q * divisor + r` and `0 <= r < divisor`.
pub fn quotient_and_remainder(
    dividend: &BigInt,
    divisor: &BigInt,
) -> Result<(BigInt, BigInt), OracleError> {
    if divisor.is_zero() {
        return Err(OracleError::DivisionByZero);
    }
    if divisor.sign() == Sign::Minus || dividend < divisor {
        return Err(OracleError::QuotientRemainderDomain);
    }
    Ok(dividend.div_rem(divisor))
}
