//! The `exambank tag` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use exambank_core::store::{load_bank, save_bank};
use exambank_core::tagger;

pub fn execute(bank_path: PathBuf, write: bool) -> Result<()> {
    let mut bank = load_bank(&bank_path)?;

    let mut table = Table::new();
    table.set_header(vec!["Id", "Difficulty", "Category", "Changed"]);

    let mut changed = 0;
    for q in bank.iter_mut() {
        let (difficulty, category) = tagger::tag(&q.text, Some(q.category.as_str()));
        let is_change = difficulty != q.difficulty || category != q.category;
        if is_change {
            changed += 1;
        }
        table.add_row(vec![
            Cell::new(&q.id),
            Cell::new(difficulty.to_string()),
            Cell::new(&category),
            Cell::new(if is_change { "*" } else { "" }),
        ]);
        q.difficulty = difficulty;
        q.category = category;
    }

    println!("{table}");
    println!("{changed} of {} question(s) re-tagged.", bank.len());

    if write {
        save_bank(&bank_path, &bank)?;
        println!("Wrote {}", bank_path.display());
    } else if changed > 0 {
        println!("Run again with --write to persist.");
    }

    Ok(())
}
