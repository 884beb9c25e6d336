//! CLI command implementations.

pub mod compose;
pub mod generate;
pub mod grade;
pub mod proficiency;
pub mod stats;
pub mod tag;

use std::sync::Arc;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;

use exambank_core::model::Question;
use exambank_core::store::{load_bank, load_bank_or_empty, InMemoryStore};
use exambank_providers::ExambankConfig;

/// Seeded rng when `--seed` is given, entropy otherwise.
pub(crate) fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Build the combined question store from the configured bank files.
///
/// Returns the store plus the flat authored closed-book bank, which the
/// composer needs separately for closed-book test-prep exams.
pub(crate) fn build_store(config: &ExambankConfig) -> Result<(Arc<InMemoryStore>, Vec<Question>)> {
    let mut questions = load_bank(&config.authored_open_bank).with_context(|| {
        format!(
            "failed to load authored open-book bank from {}",
            config.authored_open_bank.display()
        )
    })?;
    questions.extend(load_bank_or_empty(&config.generated_open_bank)?);

    let closed = load_bank_or_empty(&config.authored_closed_bank)?;
    questions.extend(closed.iter().cloned());
    questions.extend(load_bank_or_empty(&config.generated_closed_bank)?);

    Ok((Arc::new(InMemoryStore::new(questions)), closed))
}
