#![forbid(unsafe_code)]

//! Re-verifies generated batches against the arithmetic they claim.
//!
//! Checks are recomputed from the operands rather than trusted from the
//! generator, and the rendered text is parsed back to confirm the literals.

use crate::driver::{BatchDriver, TestVector};
use crate::format::unwrap_literals;
use crate::pairs::BIN_LIMIT;
use crate::tiers::TierId;
use crate::{GeneratorConfig, SuiteReport, sha256_hex};
use bvg_oracle::{Expected, Operation, RemainderConvention};
use bvg_random::DeterministicRng;
use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};

pub fn run_vector_self_check_suite(config: &GeneratorConfig) -> Result<SuiteReport, String> {
    let driver = BatchDriver::new(config).map_err(|err| err.to_string())?;
    let mut report = SuiteReport {
        suite: "vector_self_check",
        case_count: 0,
        pass_count: 0,
        failures: Vec::new(),
    };

    for op in Operation::ALL {
        let mut rng = DeterministicRng::new(config.seed);
        let vectors = driver
            .generate(op, &mut rng)
            .map_err(|err| format!("{op}: {err}"))?;

        for (index, vector) in vectors.iter().enumerate() {
            let id = format!("{op}[{index}]");
            check_vector(&mut report, config, &id, vector);

            let rendered = driver.formatter().render(vector);
            let expected_text = literal_text(vector);
            record_check(
                &mut report,
                unwrap_literals(&rendered) == expected_text,
                format!("{id}: rendered literals do not reassemble the operands and result"),
            );
        }

        if op == Operation::Division {
            check_division_quads(&mut report, &vectors);
        }

        let first = batch_digest(&driver, op, config.seed)?;
        let second = batch_digest(&driver, op, config.seed)?;
        record_check(
            &mut report,
            first == second,
            format!("{op}: seed {} produced differing batches", config.seed),
        );
    }

    Ok(report)
}

/// SHA-256 of the rendered batch for `op` under `seed`.
pub fn batch_digest(driver: &BatchDriver<'_>, op: Operation, seed: u64) -> Result<String, String> {
    let blocks = driver
        .render_batch(op, &mut DeterministicRng::new(seed))
        .map_err(|err| format!("{op}: {err}"))?;
    Ok(sha256_hex(blocks.join("\n").as_bytes()))
}

fn literal_text(vector: &TestVector) -> String {
    match &vector.expected {
        Expected::Single(value) => format!("{}{}{value}", vector.x, vector.y),
        Expected::QuotientRemainder { remainder, .. } => {
            format!("{}{}{remainder}", vector.x, vector.y)
        }
    }
}

fn check_vector(report: &mut SuiteReport, config: &GeneratorConfig, id: &str, vector: &TestVector) {
    let (x, y) = (&vector.x, &vector.y);
    match (&vector.expected, vector.operation) {
        (Expected::Single(sum), Operation::Addition) => {
            record_check(report, &(x + y) == sum, format!("{id}: x + y != sum"));
            check_wide_operands(report, config, id, vector);
        }
        (Expected::Single(diff), Operation::Subtraction) => {
            record_check(report, &(x - y) == diff, format!("{id}: x - y != difference"));
            check_wide_operands(report, config, id, vector);
        }
        (Expected::Single(product), Operation::Multiplication) => {
            record_check(report, &(x * y) == product, format!("{id}: x * y != product"));
            check_wide_operands(report, config, id, vector);
        }
        (Expected::Single(q), Operation::Division) => {
            check_division_operands(report, config, id, vector);
            record_check(
                report,
                x.magnitude() > y.magnitude(),
                format!("{id}: dividend magnitude must exceed divisor"),
            );
            // Truncation: |q| * |y| <= |x| < (|q| + 1) * |y|.
            let qy = q.magnitude() * y.magnitude();
            record_check(
                report,
                &qy <= x.magnitude() && x.magnitude() < &(qy + y.magnitude()),
                format!("{id}: quotient is not truncated x / y"),
            );
            let negative = x.is_negative() != y.is_negative();
            record_check(
                report,
                q.is_zero() || q.is_negative() == negative,
                format!("{id}: quotient sign disagrees with operand signs"),
            );
        }
        (Expected::Single(r), Operation::Modulus) => {
            check_division_operands(report, config, id, vector);
            let sign_ok = match config.remainder_convention {
                RemainderConvention::Floored => r.is_zero() || r.is_negative() == y.is_negative(),
                RemainderConvention::Truncated => {
                    r.is_zero() || r.is_negative() == x.is_negative()
                }
            };
            record_check(report, sign_ok, format!("{id}: remainder sign convention"));
            record_check(
                report,
                r.magnitude() < y.magnitude() && ((x - r) % y).is_zero(),
                format!("{id}: remainder is not x mod y"),
            );
        }
        (Expected::Single(power), Operation::Exponentiation) => {
            let tier = config.tiers.tier(TierId::Exponent);
            record_check(
                report,
                !y.is_negative() && tier.contains(x.magnitude()) && tier.contains(y.magnitude()),
                format!("{id}: base or exponent outside the exponent tier"),
            );
            let recomputed = y.to_u32().map(|exp| x.pow(exp));
            record_check(
                report,
                recomputed.as_ref() == Some(power),
                format!("{id}: x ** y != power"),
            );
        }
        (
            Expected::QuotientRemainder {
                quotient,
                remainder,
            },
            Operation::QuotientAndRemainder,
        ) => {
            let (dividend, divisor) = (x, y);
            record_check(
                report,
                divisor.is_positive()
                    && divisor <= dividend
                    && dividend < &(divisor * BigInt::from(BIN_LIMIT)),
                format!("{id}: operands violate 0 < x <= y < x * BIN_LIMIT"),
            );
            record_check(
                report,
                &(quotient * divisor + remainder) == dividend
                    && !remainder.is_negative()
                    && remainder < divisor,
                format!("{id}: y != q * x + r with 0 <= r < x"),
            );
        }
        (_, op) => record_check(report, false, format!("{id}: result shape does not fit {op}")),
    }
}

fn check_wide_operands(
    report: &mut SuiteReport,
    config: &GeneratorConfig,
    id: &str,
    vector: &TestVector,
) {
    let wide = config.tiers.tier(TierId::Wide);
    record_check(
        report,
        wide.contains(vector.x.magnitude()) && wide.contains(vector.y.magnitude()),
        format!("{id}: operand magnitude outside the big-big tier"),
    );
}

fn check_division_operands(
    report: &mut SuiteReport,
    config: &GeneratorConfig,
    id: &str,
    vector: &TestVector,
) {
    record_check(
        report,
        config.tiers.tier(TierId::Wide).contains(vector.x.magnitude())
            && config.tiers.tier(TierId::Narrow).contains(vector.y.magnitude()),
        format!("{id}: dividend outside big-big or divisor outside small-big"),
    );
}

fn check_division_quads(report: &mut SuiteReport, vectors: &[TestVector]) {
    for (step, quad) in vectors.chunks(4).enumerate() {
        let same_magnitudes = quad.len() == 4
            && quad.iter().all(|vector| {
                vector.x.magnitude() == quad[0].x.magnitude()
                    && vector.y.magnitude() == quad[0].y.magnitude()
            });
        let signs: Vec<(bool, bool)> = quad
            .iter()
            .map(|vector| (vector.x.is_negative(), vector.y.is_negative()))
            .collect();
        record_check(
            report,
            same_magnitudes
                && signs == [(false, false), (true, false), (false, true), (true, true)],
            format!("division step {step}: sign variants are not (+,+) (-,+) (+,-) (-,-)"),
        );
    }
}

fn record_check(report: &mut SuiteReport, passed: bool, failure: String) {
    report.case_count += 1;
    if passed {
        report.pass_count += 1;
    } else {
        report.failures.push(failure);
    }
}
