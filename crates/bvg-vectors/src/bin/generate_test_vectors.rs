#![forbid(unsafe_code)]

use bvg_vectors::{
    BatchDriver, DeterministicRng, GeneratorConfig, Operation, RemainderConvention, parse_seed,
    seed_from_clock, set_vector_log_path,
};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

#[derive(Debug)]
struct GenerateOptions {
    operations: Vec<Operation>,
    seed: Option<u64>,
    count: Option<usize>,
    remainder: Option<RemainderConvention>,
    log_path: Option<PathBuf>,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("generate_test_vectors failed: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let Some(options) = parse_args()? else {
        return Ok(());
    };

    let mut cfg = GeneratorConfig::default_config().apply_env()?;
    let env_seeded = std::env::var_os("BVG_SEED").is_some();
    cfg.seed = match options.seed {
        Some(seed) => seed,
        None if env_seeded => cfg.seed,
        None => seed_from_clock(),
    };
    if let Some(count) = options.count {
        cfg.batch_count = count;
    }
    if let Some(remainder) = options.remainder {
        cfg.remainder_convention = remainder;
    }
    if options.log_path.is_some() {
        set_vector_log_path(options.log_path.clone());
    }

    eprintln!(
        "generate_test_vectors: seed={} count={} remainder={}",
        cfg.seed,
        cfg.batch_count,
        cfg.remainder_convention.as_str()
    );

    let driver = BatchDriver::new(&cfg).map_err(|err| err.to_string())?;
    let mut rng = DeterministicRng::new(cfg.seed);
    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for op in &options.operations {
        driver.emit(*op, &mut rng, &mut out)?;
    }
    out.flush()
        .map_err(|err| format!("failed flushing stdout: {err}"))
}

fn parse_args() -> Result<Option<GenerateOptions>, String> {
    let mut options = GenerateOptions {
        operations: Vec::new(),
        seed: None,
        count: None,
        remainder: None,
        log_path: None,
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--operation" => {
                let value = args
                    .next()
                    .ok_or_else(|| "--operation requires a value".to_string())?;
                options.operations.push(Operation::from_wire(&value)?);
            }
            "--seed" => {
                let value = args
                    .next()
                    .ok_or_else(|| "--seed requires a value".to_string())?;
                options.seed = Some(parse_seed(&value)?);
            }
            "--count" => {
                let value = args
                    .next()
                    .ok_or_else(|| "--count requires a value".to_string())?;
                let count = value
                    .parse::<usize>()
                    .map_err(|err| format!("invalid --count value '{value}': {err}"))?;
                options.count = Some(count);
            }
            "--remainder" => {
                let value = args
                    .next()
                    .ok_or_else(|| "--remainder requires a value".to_string())?;
                options.remainder = Some(RemainderConvention::from_wire(&value)?);
            }
            "--log-path" => {
                let value = args
                    .next()
                    .ok_or_else(|| "--log-path requires a value".to_string())?;
                options.log_path = Some(PathBuf::from(value));
            }
            "--help" | "-h" => {
                println!(
                    "Usage: cargo run -p bvg-vectors --bin generate_test_vectors -- [--operation <name>]... [--seed <u64>] [--count <n>] [--remainder floored|truncated] [--log-path <path>]"
                );
                return Ok(None);
            }
            unknown => return Err(format!("unknown argument: {unknown}")),
        }
    }

    if options.operations.is_empty() {
        options.operations = Operation::ALL.to_vec();
    }
    Ok(Some(options))
}
