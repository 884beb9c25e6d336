//! The `exambank grade` command.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use exambank_core::grading::{grade, AnswerSubmission};
use exambank_core::model::{AttemptMode, ExamMode};
use exambank_core::scoring::ScoringConfig;
use exambank_providers::load_config_from;

use super::build_store;

pub fn execute(
    mode: String,
    answers_path: PathBuf,
    test_prep: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let mode = ExamMode::from_str(&mode).map_err(anyhow::Error::msg)?;
    let attempt_mode = if test_prep {
        AttemptMode::TestPrep
    } else {
        AttemptMode::OfficialLike
    };

    let content = std::fs::read_to_string(&answers_path)
        .with_context(|| format!("failed to read answers from {}", answers_path.display()))?;
    let answers: Vec<AnswerSubmission> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse answers from {}", answers_path.display()))?;

    let config = load_config_from(config_path.as_deref())?;
    let (store, _) = build_store(&config)?;

    let graded = grade(
        &answers,
        store.as_ref(),
        mode,
        attempt_mode,
        &ScoringConfig::default(),
    )?;

    println!("{}", serde_json::to_string_pretty(&graded)?);
    Ok(())
}
