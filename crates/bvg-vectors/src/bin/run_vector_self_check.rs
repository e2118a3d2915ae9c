#![forbid(unsafe_code)]

use bvg_vectors::{GeneratorConfig, RemainderConvention, parse_seed, run_vector_self_check_suite};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Serialize)]
struct SelfCheckSummary {
    status: &'static str,
    seed: u64,
    batch_count: usize,
    remainder_convention: &'static str,
    case_count: usize,
    pass_count: usize,
    failures: Vec<String>,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("run_vector_self_check failed: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let mut cfg = GeneratorConfig::default_config().apply_env()?;
    let mut report_path: Option<PathBuf> = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--seed" => {
                let value = args
                    .next()
                    .ok_or_else(|| "--seed requires a value".to_string())?;
                cfg.seed = parse_seed(&value)?;
            }
            "--remainder" => {
                let value = args
                    .next()
                    .ok_or_else(|| "--remainder requires a value".to_string())?;
                cfg.remainder_convention = RemainderConvention::from_wire(&value)?;
            }
            "--report-path" => {
                let value = args
                    .next()
                    .ok_or_else(|| "--report-path requires a value".to_string())?;
                report_path = Some(PathBuf::from(value));
            }
            "--help" | "-h" => {
                println!(
                    "Usage: cargo run -p bvg-vectors --bin run_vector_self_check -- [--seed <u64>] [--remainder floored|truncated] [--report-path <path>]"
                );
                return Ok(());
            }
            unknown => return Err(format!("unknown argument: {unknown}")),
        }
    }

    let report = run_vector_self_check_suite(&cfg)?;
    let passed = report.all_passed();
    let summary = SelfCheckSummary {
        status: if passed { "pass" } else { "fail" },
        seed: cfg.seed,
        batch_count: cfg.batch_count,
        remainder_convention: cfg.remainder_convention.as_str(),
        case_count: report.case_count,
        pass_count: report.pass_count,
        failures: report.failures,
    };

    println!(
        "vector self-check: seed={} cases={} passed={} status={}",
        summary.seed, summary.case_count, summary.pass_count, summary.status
    );

    if let Some(path) = report_path {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| format!("failed creating {}: {err}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(&summary)
            .map_err(|err| format!("failed serializing self-check summary: {err}"))?;
        fs::write(&path, raw).map_err(|err| format!("failed writing {}: {err}", path.display()))?;
        println!("wrote {}", path.display());
    }

    if passed {
        Ok(())
    } else {
        Err(format!("{} check(s) failed", summary.failures.len()))
    }
}
