#![forbid(unsafe_code)]

//! Stratified test-vector generation for arbitrary-precision integer
//! arithmetic.
//!
//! A [`BatchDriver`] repeatedly asks the [`PairSolver`] for operands that
//! satisfy the operation's structural invariant, evaluates them with the
//! trusted oracle, and renders `CHECK(run<Op>(...));` blocks.

pub mod driver;
pub mod format;
pub mod pairs;
pub mod sampler;
pub mod self_check;
pub mod tiers;

pub use crate::driver::{BatchDriver, TestVector};
pub use crate::format::{VectorFormatter, WRAP_WIDTH, unwrap_literals, wrap_decimal};
pub use crate::pairs::{BIN_LIMIT, GenerationError, OperandPair, PairSolver, RetryLimits};
pub use crate::self_check::run_vector_self_check_suite;
pub use crate::tiers::{MagnitudeTier, TierId, TierTable};
pub use bvg_oracle::{Expected, Operation, RemainderConvention};
pub use bvg_random::DeterministicRng;

use bvg_random::DEFAULT_RNG_SEED;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

pub const DEFAULT_BATCH_COUNT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub seed: u64,
    pub batch_count: usize,
    pub tiers: TierTable,
    pub retry: RetryLimits,
    pub remainder_convention: RemainderConvention,
    pub wrap_width: usize,
}

impl GeneratorConfig {
    #[must_use]
    pub fn default_config() -> Self {
        Self {
            seed: DEFAULT_RNG_SEED,
            batch_count: DEFAULT_BATCH_COUNT,
            tiers: TierTable::standard(),
            retry: RetryLimits::default(),
            remainder_convention: RemainderConvention::Floored,
            wrap_width: WRAP_WIDTH,
        }
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Applies `BVG_SEED` and `BVG_BATCH_COUNT` overrides when set.
    pub fn apply_env(mut self) -> Result<Self, String> {
        if let Some(raw) = std::env::var_os("BVG_SEED") {
            let raw = raw.to_string_lossy();
            self.seed = parse_seed(&raw)?;
        }
        if let Some(raw) = std::env::var_os("BVG_BATCH_COUNT") {
            let raw = raw.to_string_lossy();
            self.batch_count = raw
                .trim()
                .parse::<usize>()
                .map_err(|err| format!("invalid BVG_BATCH_COUNT '{raw}': {err}"))?;
        }
        Ok(self)
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

/// Decimal or `0x`-prefixed hexadecimal seed.
pub fn parse_seed(raw: &str) -> Result<u64, String> {
    let trimmed = raw.trim();
    let parsed = match trimmed.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(&hex.replace('_', ""), 16),
        None => trimmed.replace('_', "").parse::<u64>(),
    };
    parsed.map_err(|err| format!("invalid seed '{raw}': {err}"))
}

/// Seed for runs that did not ask for one; print it so the batch can be replayed.
#[must_use]
pub fn seed_from_clock() -> u64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos());
    (nanos as u64) ^ ((nanos >> 64) as u64) ^ u64::from(std::process::id())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteReport {
    pub suite: &'static str,
    pub case_count: usize,
    pub pass_count: usize,
    pub failures: Vec<String>,
}

impl SuiteReport {
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.case_count == self.pass_count && self.failures.is_empty()
    }
}

#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(&mut out, "{byte:02x}");
    }
    out
}

#[derive(Debug, Clone, Serialize)]
pub struct VectorLogEntry {
    pub fixture_id: String,
    pub seed: u64,
    pub operation: Operation,
    pub vector_index: Option<usize>,
    pub attempts: usize,
    pub reason_code: String,
    pub passed: bool,
}

impl VectorLogEntry {
    #[must_use]
    pub fn emitted(seed: u64, index: usize, vector: &TestVector) -> Self {
        Self {
            fixture_id: format!("{}-{seed:016x}-{index}", vector.operation),
            seed,
            operation: vector.operation,
            vector_index: Some(index),
            attempts: vector.attempts,
            reason_code: "vector_emitted".to_string(),
            passed: true,
        }
    }

    #[must_use]
    pub fn failed(seed: u64, operation: Operation, err: &GenerationError) -> Self {
        Self {
            fixture_id: format!("{operation}-{seed:016x}"),
            seed,
            operation,
            vector_index: None,
            attempts: 0,
            reason_code: err.reason_code().to_string(),
            passed: false,
        }
    }
}

static VECTOR_LOG_PATH: OnceLock<Mutex<Option<PathBuf>>> = OnceLock::new();

pub fn set_vector_log_path(path: Option<PathBuf>) {
    let cell = VECTOR_LOG_PATH.get_or_init(|| Mutex::new(None));
    if let Ok(mut slot) = cell.lock() {
        *slot = path;
    }
}

pub(crate) fn maybe_append_vector_log(entry: &VectorLogEntry) -> Result<(), String> {
    let configured = VECTOR_LOG_PATH
        .get()
        .and_then(|cell| cell.lock().ok())
        .and_then(|slot| slot.clone());
    let from_env = std::env::var_os("BVG_VECTOR_LOG_PATH").map(PathBuf::from);
    let Some(path) = configured.or(from_env) else {
        return Ok(());
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|err| format!("failed creating {}: {err}", parent.display()))?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|err| format!("failed opening {}: {err}", path.display()))?;
    let line = serde_json::to_string(entry)
        .map_err(|err| format!("failed serializing vector log entry: {err}"))?;
    let mut payload = line.into_bytes();
    payload.push(b'\n');
    file.write_all(&payload)
        .map_err(|err| format!("failed appending vector log {}: {err}", path.display()))
}
