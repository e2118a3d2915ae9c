use bvg_vectors::{
    BatchDriver, DeterministicRng, Expected, GeneratorConfig, OperandPair, Operation,
    run_vector_self_check_suite, unwrap_literals,
};
use num_bigint::BigInt;

#[test]
fn self_check_suite_is_green() {
    let cfg = GeneratorConfig::default_config();
    let report = run_vector_self_check_suite(&cfg).expect("self-check should run");
    assert_eq!(report.suite, "vector_self_check");
    assert!(report.all_passed(), "failures={:?}", report.failures);
}

#[test]
fn full_run_is_byte_identical_for_a_fixed_seed() {
    let cfg = GeneratorConfig::default_config().with_seed(424_242);
    let driver = BatchDriver::new(&cfg).expect("default config");
    let run = || {
        let mut rng = DeterministicRng::new(cfg.seed);
        let mut out = Vec::new();
        for op in Operation::ALL {
            driver.emit(op, &mut rng, &mut out).expect("emit");
        }
        out
    };
    assert_eq!(run(), run());
}

#[test]
fn exponentiation_blocks_reassemble_the_power() {
    let cfg = GeneratorConfig::default_config().with_seed(99);
    let driver = BatchDriver::new(&cfg).expect("default config");
    let mut rng = DeterministicRng::new(cfg.seed);
    for vector in driver
        .generate(Operation::Exponentiation, &mut rng)
        .expect("batch")
    {
        let Expected::Single(power) = &vector.expected else {
            panic!("exponentiation yields a single value");
        };
        let rendered = driver.formatter().render(&vector);
        assert_eq!(
            unwrap_literals(&rendered),
            format!("{}{}{power}", vector.x, vector.y)
        );
        for line in rendered.lines() {
            let literal = line.trim().trim_start_matches("Int(").split('"').nth(1);
            if let Some(chunk) = literal {
                assert!(chunk.len() <= 80);
            }
        }
    }
}

#[test]
fn quotient_remainder_scenario_matches_oracle() {
    let cfg = GeneratorConfig::default_config();
    let driver = BatchDriver::new(&cfg).expect("default config");
    let divisor = BigInt::from(2_000_000_000_000_u64);
    let dividend = &divisor * 999_999_937_u32 + 17_u32;
    let vector = driver
        .evaluate(OperandPair {
            operation: Operation::QuotientAndRemainder,
            x: dividend,
            y: divisor,
            attempts: 1,
        })
        .expect("valid pair");
    assert_eq!(
        vector.expected,
        Expected::QuotientRemainder {
            quotient: BigInt::from(999_999_937),
            remainder: BigInt::from(17),
        }
    );
}
