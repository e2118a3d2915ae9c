#![forbid(unsafe_code)]

use crate::format::VectorFormatter;
use crate::pairs::{GenerationError, OperandPair, PairSolver};
use crate::{GeneratorConfig, VectorLogEntry, maybe_append_vector_log};
use bvg_oracle::{Expected, Operation, OracleEvaluator};
use bvg_random::DeterministicRng;
use num_bigint::BigInt;
use std::io::Write;

/// Operands in emission order with the oracle's expected result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestVector {
    pub operation: Operation,
    pub x: BigInt,
    pub y: BigInt,
    pub expected: Expected,
    pub attempts: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct BatchDriver<'a> {
    solver: PairSolver<'a>,
    oracle: OracleEvaluator,
    formatter: VectorFormatter,
    batch_count: usize,
}

impl<'a> BatchDriver<'a> {
    pub fn new(config: &'a GeneratorConfig) -> Result<Self, GenerationError> {
        if config.batch_count == 0 {
            return Err(GenerationError::InvalidBatchCount);
        }
        if config.wrap_width == 0 {
            return Err(GenerationError::InvalidWrapWidth);
        }
        Ok(Self {
            solver: PairSolver::new(&config.tiers, config.retry)?,
            oracle: OracleEvaluator::new(config.remainder_convention),
            formatter: VectorFormatter::new(config.wrap_width),
            batch_count: config.batch_count,
        })
    }

    #[must_use]
    pub const fn batch_count(&self) -> usize {
        self.batch_count
    }

    #[must_use]
    pub const fn formatter(&self) -> &VectorFormatter {
        &self.formatter
    }

    pub fn evaluate(&self, pair: OperandPair) -> Result<TestVector, GenerationError> {
        let expected = self.oracle.evaluate(pair.operation, &pair.x, &pair.y)?;
        Ok(TestVector {
            operation: pair.operation,
            x: pair.x,
            y: pair.y,
            expected,
            attempts: pair.attempts,
        })
    }

    /// One batch of `op` in generation order.
    ///
    /// Runs `batch_count` solve steps; division contributes four vectors per
    /// step, every other operation one.
    pub fn generate(
        &self,
        op: Operation,
        rng: &mut DeterministicRng,
    ) -> Result<Vec<TestVector>, GenerationError> {
        let mut vectors = Vec::with_capacity(self.batch_count);
        for _ in 0..self.batch_count {
            for pair in self.solver.solve(op, rng)? {
                vectors.push(self.evaluate(pair)?);
            }
        }
        Ok(vectors)
    }

    pub fn render_batch(
        &self,
        op: Operation,
        rng: &mut DeterministicRng,
    ) -> Result<Vec<String>, GenerationError> {
        Ok(self
            .generate(op, rng)?
            .iter()
            .map(|vector| self.formatter.render(vector))
            .collect())
    }

    /// Generates, renders and writes one batch, returning the vector count.
    pub fn emit<W: Write>(
        &self,
        op: Operation,
        rng: &mut DeterministicRng,
        out: &mut W,
    ) -> Result<usize, String> {
        let seed = rng.seed();
        let vectors = self.generate(op, rng).map_err(|err| {
            match maybe_append_vector_log(&VectorLogEntry::failed(seed, op, &err)) {
                Ok(()) => format!("{op}: {err}"),
                Err(log_err) => format!("{op}: {err}; log: {log_err}"),
            }
        })?;

        for (index, vector) in vectors.iter().enumerate() {
            writeln!(out, "{}", self.formatter.render(vector))
                .map_err(|err| format!("failed writing {op} vector {index}: {err}"))?;
            maybe_append_vector_log(&VectorLogEntry::emitted(seed, index, vector))?;
        }
        Ok(vectors.len())
    }
}

#[cfg(test)]
mod tests {
    use super::BatchDriver;
    use crate::GeneratorConfig;
    use crate::pairs::{BIN_LIMIT, GenerationError, RetryLimits};
    use crate::tiers::{MagnitudeTier, TierId, TierTable};
    use bvg_oracle::{Expected, Operation};
    use bvg_random::DeterministicRng;
    use num_bigint::BigInt;
    use num_traits::{Signed, Zero};

    fn config() -> GeneratorConfig {
        GeneratorConfig::default_config().with_seed(20_241_017)
    }

    #[test]
    fn zero_batch_count_is_rejected() {
        let mut cfg = config();
        cfg.batch_count = 0;
        assert_eq!(
            BatchDriver::new(&cfg).err(),
            Some(GenerationError::InvalidBatchCount)
        );
    }

    #[test]
    fn zero_wrap_width_is_rejected() {
        let mut cfg = config();
        cfg.wrap_width = 0;
        let err = BatchDriver::new(&cfg).err();
        assert_eq!(err, Some(GenerationError::InvalidWrapWidth));
        assert_eq!(
            err.map(|err| err.reason_code()),
            Some("wrap_width_invalid")
        );
    }

    #[test]
    fn exhausted_division_surfaces_error_and_writes_nothing() {
        let mut cfg = config();
        cfg.tiers = TierTable::new(
            MagnitudeTier::small(TierId::Narrow, 10, 1_000_000).expect("valid tier"),
            MagnitudeTier::small(TierId::Wide, 1, 11).expect("valid tier"),
            MagnitudeTier::small(TierId::Exponent, 2, 500).expect("valid tier"),
        )
        .expect("floor below ceiling");
        cfg.retry = RetryLimits {
            divisor_retries: 5,
            division_restarts: 3,
        };
        let driver = BatchDriver::new(&cfg).expect("valid config");
        let mut out = Vec::new();
        let err = driver
            .emit(Operation::Division, &mut DeterministicRng::new(73), &mut out)
            .expect_err("x > y is practically unreachable");
        assert!(err.starts_with("division: no dividend > divisor"), "{err}");
        assert!(out.is_empty());
    }

    #[test]
    fn batch_sizes_follow_operation_shape() {
        let cfg = config();
        let driver = BatchDriver::new(&cfg).expect("default config");
        let mut rng = DeterministicRng::new(cfg.seed);
        for op in Operation::ALL {
            let vectors = driver.generate(op, &mut rng).expect("batch");
            let expected = if op == Operation::Division { 40 } else { 10 };
            assert_eq!(vectors.len(), expected, "{op}");
            assert!(vectors.iter().all(|vector| vector.operation == op));
        }
    }

    #[test]
    fn addition_vectors_sum_exactly() {
        let cfg = config();
        let driver = BatchDriver::new(&cfg).expect("default config");
        let mut rng = DeterministicRng::new(cfg.seed);
        for vector in driver.generate(Operation::Addition, &mut rng).expect("batch") {
            assert_eq!(vector.expected, Expected::Single(&vector.x + &vector.y));
        }
    }

    #[test]
    fn division_quadruples_share_magnitudes_and_flip_quotient_sign() {
        let cfg = config();
        let driver = BatchDriver::new(&cfg).expect("default config");
        let mut rng = DeterministicRng::new(cfg.seed);
        let vectors = driver.generate(Operation::Division, &mut rng).expect("batch");
        for quad in vectors.chunks(4) {
            let Expected::Single(base_q) = &quad[0].expected else {
                panic!("division yields a single quotient");
            };
            assert!(base_q.is_positive());
            for vector in quad {
                let Expected::Single(q) = &vector.expected else {
                    panic!("division yields a single quotient");
                };
                assert_eq!(q, &(&vector.x / &vector.y));
                assert_eq!(q.magnitude(), base_q.magnitude());
                let negative = vector.x.is_negative() != vector.y.is_negative();
                assert_eq!(q.is_negative(), negative);
            }
        }
    }

    #[test]
    fn quotient_remainder_vectors_reconstruct_dividend() {
        let cfg = config();
        let driver = BatchDriver::new(&cfg).expect("default config");
        let mut rng = DeterministicRng::new(cfg.seed);
        for vector in driver
            .generate(Operation::QuotientAndRemainder, &mut rng)
            .expect("batch")
        {
            let Expected::QuotientRemainder {
                quotient,
                remainder,
            } = &vector.expected
            else {
                panic!("quotient-and-remainder yields a pair");
            };
            let (dividend, divisor) = (&vector.x, &vector.y);
            assert_eq!(&(quotient * divisor + remainder), dividend);
            assert!(!remainder.is_negative() && remainder < divisor);
            assert!(quotient >= &BigInt::from(1) && quotient < &BigInt::from(BIN_LIMIT));
        }
    }

    #[test]
    fn modulus_vectors_use_floored_remainder_by_default() {
        let cfg = config();
        let driver = BatchDriver::new(&cfg).expect("default config");
        let mut rng = DeterministicRng::new(cfg.seed);
        for vector in driver.generate(Operation::Modulus, &mut rng).expect("batch") {
            let Expected::Single(r) = &vector.expected else {
                panic!("modulus yields a single remainder");
            };
            assert!(r.magnitude() < vector.y.magnitude());
            assert!(r.is_zero() || r.is_negative() == vector.y.is_negative());
            assert!(((&vector.x - r) % &vector.y).is_zero());
        }
    }

    #[test]
    fn same_seed_emits_identical_bytes() {
        let cfg = config();
        let driver = BatchDriver::new(&cfg).expect("default config");
        for op in Operation::ALL {
            let mut first = Vec::new();
            let mut second = Vec::new();
            driver
                .emit(op, &mut DeterministicRng::new(cfg.seed), &mut first)
                .expect("emit");
            driver
                .emit(op, &mut DeterministicRng::new(cfg.seed), &mut second)
                .expect("emit");
            assert_eq!(first, second, "{op}");
            assert!(!first.is_empty());
        }
    }

    #[test]
    fn emit_writes_one_check_block_per_vector() {
        let cfg = config();
        let driver = BatchDriver::new(&cfg).expect("default config");
        let mut out = Vec::new();
        let count = driver
            .emit(Operation::Subtraction, &mut DeterministicRng::new(cfg.seed), &mut out)
            .expect("emit");
        let text = String::from_utf8(out).expect("ascii output");
        assert_eq!(count, 10);
        assert_eq!(text.matches("CHECK(runSubtraction(").count(), 10);
        assert_eq!(text.lines().count(), 30);
    }
}
