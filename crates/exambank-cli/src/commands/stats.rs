//! The `exambank stats` command.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use exambank_core::model::{Difficulty, Provenance, QuestionKind};
use exambank_core::store::QuestionStore;
use exambank_providers::load_config_from;

use super::build_store;

pub fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let (store, _) = build_store(&config)?;
    let questions = store.all();

    let mut by_cell: BTreeMap<(String, String), usize> = BTreeMap::new();
    let mut generated = 0;
    for q in &questions {
        *by_cell
            .entry((q.kind.to_string(), q.difficulty.to_string()))
            .or_insert(0) += 1;
        if q.source == Provenance::Generated {
            generated += 1;
        }
    }

    let mut table = Table::new();
    table.set_header(vec!["Kind", "Difficulty", "Count"]);
    for kind in [QuestionKind::Open, QuestionKind::Closed] {
        for difficulty in [
            Difficulty::Easy,
            Difficulty::Medium,
            Difficulty::Hard,
            Difficulty::TestPrep,
        ] {
            let count = by_cell
                .get(&(kind.to_string(), difficulty.to_string()))
                .copied()
                .unwrap_or(0);
            table.add_row(vec![
                Cell::new(kind.to_string()),
                Cell::new(difficulty.to_string()),
                Cell::new(count),
            ]);
        }
    }

    println!("{table}");
    println!(
        "{} question(s) total, {} generated, {} authored.",
        questions.len(),
        generated,
        questions.len() - generated,
    );
    Ok(())
}
