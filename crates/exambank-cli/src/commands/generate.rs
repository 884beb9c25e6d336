//! The `exambank generate` command.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use exambank_core::bank::{BankGenerator, BankPaths};
use exambank_core::model::{Difficulty, ExamType};
use exambank_providers::{create_drafter, load_config_from};

use super::rng_from_seed;

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    exam_type: String,
    difficulty: String,
    topic: String,
    count: i32,
    drafter_name: Option<String>,
    config_path: Option<PathBuf>,
    seed: Option<u64>,
) -> Result<()> {
    let exam_type = ExamType::from_str(&exam_type).map_err(anyhow::Error::msg)?;
    let difficulty = Difficulty::from_str(&difficulty).map_err(anyhow::Error::msg)?;

    let config = load_config_from(config_path.as_deref())?;
    let name = drafter_name.unwrap_or_else(|| config.default_drafter.clone());
    let drafter_config = config
        .drafters
        .get(&name)
        .with_context(|| format!("drafter '{name}' not found in config"))?;
    let drafter = create_drafter(drafter_config)?;

    let paths = match exam_type {
        ExamType::ClosedBook => BankPaths {
            authored: config.authored_closed_bank.clone(),
            generated: config.generated_closed_bank.clone(),
            archive_dir: config.archive_dir.clone(),
        },
        _ => BankPaths {
            authored: config.authored_open_bank.clone(),
            generated: config.generated_open_bank.clone(),
            archive_dir: config.archive_dir.clone(),
        },
    };

    let generator = BankGenerator::new(paths);
    let mut rng = rng_from_seed(seed);
    let outcome = generator
        .generate(exam_type, difficulty, &topic, count, drafter.as_ref(), &mut rng)
        .await?;

    println!(
        "Generated {} of {} requested question(s) ({} duplicate(s) skipped, {} failure(s))",
        outcome.generated.len(),
        outcome.requested,
        outcome.skipped_duplicates,
        outcome.skipped_failures,
    );
    for q in &outcome.generated {
        println!("  {}  [{} / {}]  {}", q.id, q.difficulty, q.category, q.text);
    }
    match &outcome.archive_path {
        Some(path) => println!("Archived batch to {}", path.display()),
        None => println!("Nothing generated, no archive written."),
    }

    Ok(())
}
