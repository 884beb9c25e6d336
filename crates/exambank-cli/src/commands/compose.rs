//! The `exambank compose` command.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;

use exambank_core::composer::{Composer, ExamRequest};
use exambank_core::model::{Difficulty, ExamMode};
use exambank_providers::load_config_from;

use super::{build_store, rng_from_seed};

pub fn execute(
    mode: String,
    count: i32,
    difficulty: Option<String>,
    strict: bool,
    config_path: Option<PathBuf>,
    seed: Option<u64>,
) -> Result<()> {
    let mode = ExamMode::from_str(&mode).map_err(anyhow::Error::msg)?;
    let difficulty = difficulty
        .map(|d| Difficulty::from_str(&d).map_err(anyhow::Error::msg))
        .transpose()?;

    let config = load_config_from(config_path.as_deref())?;
    let (store, authored_closed) = build_store(&config)?;

    let composer = Composer::new(store, authored_closed);
    let request = ExamRequest {
        mode,
        count,
        difficulty,
        strict,
    };
    let mut rng = rng_from_seed(seed);
    let exam = composer.compose(&request, &mut rng)?;

    if exam.fallback_applied {
        eprintln!("Note: no questions matched the requested difficulty, served the unfiltered pool.");
    }
    if exam.clamped {
        eprintln!("Note: requested count was clamped to the per-mode cap.");
    }

    println!("{}", serde_json::to_string_pretty(&exam)?);
    Ok(())
}
