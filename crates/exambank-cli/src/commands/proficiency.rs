//! The `exambank proficiency` command.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use exambank_core::model::{ExamAttempt, ExamType};
use exambank_core::scoring::{proficiency, ScoringConfig};

pub fn execute(exam_type: String, attempts_path: PathBuf) -> Result<()> {
    let exam_type = ExamType::from_str(&exam_type).map_err(anyhow::Error::msg)?;

    let content = std::fs::read_to_string(&attempts_path)
        .with_context(|| format!("failed to read attempts from {}", attempts_path.display()))?;
    let attempts: Vec<ExamAttempt> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse attempts from {}", attempts_path.display()))?;

    match proficiency(&attempts, exam_type, &ScoringConfig::default()) {
        Some(score) => println!("Proficiency ({exam_type}): {score:.1}"),
        None => println!("Proficiency ({exam_type}): N/A (no scoreable test-prep attempts)"),
    }
    Ok(())
}
