//! Question bank growth pipeline.
//!
//! Grows the generated pool toward target (category, difficulty) cells:
//! draws a category at random, drafts a candidate through the
//! content-generation collaborator, rejects near-duplicate stems, assigns a
//! stable id, and archives each batch immutably.
//!
//! Callers must serialize bank-growth calls against the same pool; id
//! assignment keeps a collision-probe fallback but is not safe under
//! concurrent writers.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ExamError;
use crate::model::{
    Difficulty, ExamType, Provenance, Question, QuestionKind, OPEN_BOOK_CATEGORIES,
    UNASSIGNED_CATEGORY,
};
use crate::store::{load_bank, load_bank_or_empty, save_bank};
use crate::traits::{DraftRequest, QuestionDrafter};
use crate::weights::domain_for_category;

/// Per-type caps on a single generation batch.
fn batch_cap(exam_type: ExamType) -> Option<usize> {
    match exam_type {
        ExamType::OpenBook => Some(40),
        ExamType::ClosedBook => Some(60),
        ExamType::Mixed => None,
    }
}

/// File locations the generator reads and writes.
#[derive(Debug, Clone)]
pub struct BankPaths {
    /// Authored (hand-curated) bank, required at startup.
    pub authored: PathBuf,
    /// Generated pool, created on first write.
    pub generated: PathBuf,
    /// Root directory for immutable batch archives.
    pub archive_dir: PathBuf,
}

/// Result of one generation batch.
#[derive(Debug)]
pub struct GenerationOutcome {
    /// Effective item target after any cap clamping.
    pub requested: usize,
    /// Questions admitted to the pool this batch.
    pub generated: Vec<Question>,
    /// Candidates rejected as near-duplicates (soft skips).
    pub skipped_duplicates: usize,
    /// Candidates lost to drafter failures (logged, not fatal).
    pub skipped_failures: usize,
    /// Archive written for this batch, absent for an empty batch.
    pub archive_path: Option<PathBuf>,
}

/// Sibling metadata record written next to each batch archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveMeta {
    pub exam_type: ExamType,
    pub difficulty: Difficulty,
    pub topic: String,
    pub generated_at_utc: String,
    pub num_questions: usize,
    pub questions: Vec<Question>,
}

/// Near-duplicate guard over stems.
///
/// Case-insensitive exact match always rejects; stems of 40 characters or
/// more also reject on a substring relation in either direction.
pub fn is_too_similar(stem: &str, existing_stems: &[String]) -> bool {
    let new = stem.trim().to_lowercase();
    if new.is_empty() {
        return false;
    }
    for s in existing_stems {
        let old = s.trim().to_lowercase();
        if old.is_empty() {
            continue;
        }
        if new == old {
            return true;
        }
        if new.len() >= 40 && (old.contains(&new) || new.contains(&old)) {
            return true;
        }
    }
    false
}

/// Allocate the next generated id for `prefix`: max numeric suffix plus one,
/// zero-padded to 6 digits, re-probed on collision.
pub fn next_generated_id(existing_ids: &HashSet<String>, prefix: &str) -> String {
    let mut max_n: u64 = 0;
    for id in existing_ids {
        if let Some(tail) = id.strip_prefix(prefix) {
            if let Ok(n) = tail.parse::<u64>() {
                max_n = max_n.max(n);
            }
        }
    }
    let mut n = max_n + 1;
    let mut candidate = format!("{prefix}{n:06}");
    while existing_ids.contains(&candidate) {
        n += 1;
        candidate = format!("{prefix}{n:06}");
    }
    candidate
}

/// Merge explanation overlays into a bank by id, last write wins. Returns
/// the number of questions updated. The only permitted mutation of an
/// existing question.
pub fn merge_explanations(bank: &mut [Question], overlays: &[ExplanationOverlay]) -> usize {
    let mut updated = 0;
    for overlay in overlays {
        for q in bank.iter_mut() {
            if q.id == overlay.id {
                q.explanation = overlay.explanation.clone();
                updated += 1;
            }
        }
    }
    updated
}

/// An explanation keyed by question id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplanationOverlay {
    pub id: String,
    pub explanation: String,
}

/// Grows the generated question pool.
pub struct BankGenerator {
    paths: BankPaths,
}

impl BankGenerator {
    pub fn new(paths: BankPaths) -> Self {
        Self { paths }
    }

    /// Run one generation batch.
    ///
    /// Fatal failures (missing authored bank, non-positive count, exam type
    /// without a generated pool) are raised before any mutation. Rejected
    /// candidates are soft skips: the batch simply yields fewer items than
    /// requested.
    pub async fn generate<R: Rng>(
        &self,
        exam_type: ExamType,
        difficulty: Difficulty,
        topic: &str,
        count: i32,
        drafter: &dyn QuestionDrafter,
        rng: &mut R,
    ) -> Result<GenerationOutcome, ExamError> {
        let prefix = exam_type.generated_id_prefix().ok_or_else(|| {
            ExamError::Validation(format!("no generated pool for exam type {exam_type}"))
        })?;
        if count <= 0 {
            return Err(ExamError::Validation("count must be > 0".into()));
        }

        if !self.paths.authored.exists() {
            return Err(ExamError::Configuration(format!(
                "authored question bank not found at {}",
                self.paths.authored.display()
            )));
        }
        let authored = load_bank(&self.paths.authored)?;
        if authored.is_empty() {
            return Err(ExamError::Configuration(format!(
                "authored question bank at {} is empty",
                self.paths.authored.display()
            )));
        }
        let mut generated = load_bank_or_empty(&self.paths.generated)?;

        let mut requested = count as usize;
        if let Some(cap) = batch_cap(exam_type) {
            if requested > cap {
                tracing::warn!(
                    requested,
                    cap,
                    %exam_type,
                    "generation request exceeds per-type cap, clamping"
                );
                requested = cap;
            }
        }

        let mut existing_ids: HashSet<String> = authored
            .iter()
            .chain(generated.iter())
            .map(|q| q.id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect();
        let mut existing_stems: Vec<String> = authored
            .iter()
            .chain(generated.iter())
            .map(|q| q.text.clone())
            .collect();

        let kind = match exam_type {
            ExamType::OpenBook => QuestionKind::Open,
            ExamType::ClosedBook => QuestionKind::Closed,
            ExamType::Mixed => unreachable!("rejected above"),
        };

        let mut batch: Vec<Question> = Vec::new();
        let mut skipped_duplicates = 0;
        let mut skipped_failures = 0;

        for i in 0..requested {
            // Closed-book items carry no subject category; open-book items
            // target a random category cell.
            let (category_code, category_label) = match exam_type {
                ExamType::OpenBook => {
                    let cat = &OPEN_BOOK_CATEGORIES[rng.gen_range(0..OPEN_BOOK_CATEGORIES.len())];
                    (cat.code.to_string(), cat.label.to_string())
                }
                _ => (UNASSIGNED_CATEGORY.to_string(), topic.to_string()),
            };

            // Up to two authored questions from the same cell, for style.
            let matching: Vec<&Question> = authored
                .iter()
                .filter(|q| q.category == category_code && q.difficulty == difficulty)
                .collect();
            let reference_questions: Vec<Question> = matching
                .choose_multiple(rng, 2)
                .map(|q| (*q).clone())
                .collect();

            let request = DraftRequest {
                exam_type,
                difficulty,
                category_code: category_code.clone(),
                category_label,
                topic: topic.to_string(),
                reference_snippets: Vec::new(),
                reference_questions,
            };

            let draft = match drafter.draft(&request).await {
                Ok(draft) => draft,
                Err(e) => {
                    tracing::warn!(item = i + 1, error = %e, "drafter failed, skipping item");
                    skipped_failures += 1;
                    continue;
                }
            };

            if is_too_similar(&draft.stem, &existing_stems) {
                tracing::warn!(
                    item = i + 1,
                    category = %category_code,
                    "drafted stem too similar to an existing question, skipping"
                );
                skipped_duplicates += 1;
                continue;
            }

            let id = next_generated_id(&existing_ids, prefix);
            existing_ids.insert(id.clone());
            existing_stems.push(draft.stem.clone());

            let question = Question {
                id,
                text: draft.stem,
                options: draft.options,
                correct: draft.correct,
                explanation: draft.explanation,
                difficulty,
                domain: domain_for_category(&category_code).map(str::to_string),
                category: category_code,
                kind,
                topic: Some(topic.to_string()),
                reference_document: None,
                reference_section: None,
                source: Provenance::Generated,
                created_at_utc: Some(Utc::now()),
            };
            generated.push(question.clone());
            batch.push(question);
        }

        if batch.is_empty() {
            tracing::info!(%exam_type, %difficulty, "no new questions admitted this batch");
            return Ok(GenerationOutcome {
                requested,
                generated: batch,
                skipped_duplicates,
                skipped_failures,
                archive_path: None,
            });
        }

        save_bank(&self.paths.generated, &generated)?;
        let archive_path = self.archive_batch(exam_type, difficulty, topic, &batch)?;

        tracing::info!(
            admitted = batch.len(),
            requested,
            skipped_duplicates,
            skipped_failures,
            archive = %archive_path.display(),
            "generation batch complete"
        );

        Ok(GenerationOutcome {
            requested,
            generated: batch,
            skipped_duplicates,
            skipped_failures,
            archive_path: Some(archive_path),
        })
    }

    /// Write the frozen snapshot of a batch: the question array, plus a
    /// sibling `.meta.json` record.
    fn archive_batch(
        &self,
        exam_type: ExamType,
        difficulty: Difficulty,
        topic: &str,
        batch: &[Question],
    ) -> Result<PathBuf, ExamError> {
        let ts = Utc::now().format("%Y%m%d-%H%M%S").to_string();
        let dir = self.paths.archive_dir.join(exam_type.to_string());
        let path = dir.join(format!("test-{exam_type}-{difficulty}-{ts}.json"));

        save_bank(&path, batch)?;

        let meta = ArchiveMeta {
            exam_type,
            difficulty,
            topic: topic.to_string(),
            generated_at_utc: ts,
            num_questions: batch.len(),
            questions: batch.to_vec(),
        };
        let meta_path = path.with_extension("meta.json");
        let json = serde_json::to_string_pretty(&meta).map_err(|source| ExamError::Malformed {
            path: meta_path.display().to_string(),
            source,
        })?;
        std::fs::write(&meta_path, json).map_err(|source| ExamError::Io {
            path: meta_path.display().to_string(),
            source,
        })?;

        Ok(path)
    }
}

/// Load an archived batch back from disk.
pub fn load_archive(path: &Path) -> Result<Vec<Question>, ExamError> {
    load_bank(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChoiceLabel;
    use crate::store::test_support::question;
    use crate::traits::QuestionDraft;
    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Drafter that serves stems from a fixed script, then errors.
    struct ScriptedDrafter {
        stems: Vec<String>,
        cursor: AtomicUsize,
    }

    impl ScriptedDrafter {
        fn new(stems: Vec<&str>) -> Self {
            Self {
                stems: stems.into_iter().map(String::from).collect(),
                cursor: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl QuestionDrafter for ScriptedDrafter {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn draft(&self, _request: &DraftRequest) -> anyhow::Result<QuestionDraft> {
            let i = self.cursor.fetch_add(1, Ordering::SeqCst);
            let stem = self
                .stems
                .get(i)
                .ok_or_else(|| anyhow::anyhow!("script exhausted"))?;
            Ok(QuestionDraft {
                stem: stem.clone(),
                options: ["A".into(), "B".into(), "C".into(), "D".into()],
                correct: ChoiceLabel::B,
                explanation: "because".into(),
            })
        }
    }

    fn setup(dir: &Path) -> BankPaths {
        let paths = BankPaths {
            authored: dir.join("authored.json"),
            generated: dir.join("generated.json"),
            archive_dir: dir.join("archives"),
        };
        let authored = vec![question("auth-1", QuestionKind::Open, Difficulty::Medium)];
        save_bank(&paths.authored, &authored).unwrap();
        paths
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(99)
    }

    #[test]
    fn similarity_guard_rules() {
        let existing = vec![
            "What is the minimum clear width required at an accessible door?".to_string(),
        ];

        // Case-insensitive exact match.
        assert!(is_too_similar(
            "what is the minimum clear width required at an accessible door?",
            &existing
        ));
        // A superstring of an existing 40+ char stem is rejected.
        assert!(is_too_similar(
            "What is the minimum clear width required at an accessible door? Explain.",
            &existing
        ));
        // A substring of 40+ chars is rejected too.
        assert!(is_too_similar(
            "minimum clear width required at an accessible door?",
            &existing
        ));
        // Short overlapping text is allowed.
        assert!(!is_too_similar("What is the minimum?", &existing));
        // Empty candidates never match.
        assert!(!is_too_similar("", &existing));
    }

    #[test]
    fn id_allocation_increments_and_pads() {
        let mut ids: HashSet<String> = ["gen-ob-000001", "gen-ob-000007", "auth-12"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(next_generated_id(&ids, "gen-ob-"), "gen-ob-000008");

        // Collision probe: pre-insert the next id.
        ids.insert("gen-ob-000008".into());
        assert_eq!(next_generated_id(&ids, "gen-ob-"), "gen-ob-000009");

        // Independent sequence per prefix.
        assert_eq!(next_generated_id(&ids, "gen-cb-"), "gen-cb-000001");
    }

    #[test]
    fn merge_explanations_by_id_last_write_wins() {
        let mut bank = vec![
            question("q1", QuestionKind::Open, Difficulty::Easy),
            question("q2", QuestionKind::Open, Difficulty::Easy),
        ];
        let overlays = vec![
            ExplanationOverlay {
                id: "q1".into(),
                explanation: "first".into(),
            },
            ExplanationOverlay {
                id: "q1".into(),
                explanation: "second".into(),
            },
            ExplanationOverlay {
                id: "missing".into(),
                explanation: "ignored".into(),
            },
        ];
        let updated = merge_explanations(&mut bank, &overlays);
        assert_eq!(updated, 2);
        assert_eq!(bank[0].explanation, "second");
        assert!(bank[1].explanation.is_empty());
    }

    #[tokio::test]
    async fn batch_appends_persists_and_archives() {
        let dir = tempfile::tempdir().unwrap();
        let paths = setup(dir.path());
        let generator = BankGenerator::new(paths.clone());
        let drafter = ScriptedDrafter::new(vec![
            "A ramp run rises 28 inches. How many handrail extensions are required at the top landing?",
            "An accessible parking stall serves a medical office. What access aisle width is required?",
        ]);

        let outcome = generator
            .generate(
                ExamType::OpenBook,
                Difficulty::Hard,
                "Ramps",
                2,
                &drafter,
                &mut rng(),
            )
            .await
            .unwrap();

        assert_eq!(outcome.generated.len(), 2);
        assert_eq!(outcome.skipped_duplicates, 0);
        assert_eq!(outcome.generated[0].id, "gen-ob-000001");
        assert_eq!(outcome.generated[1].id, "gen-ob-000002");
        assert!(outcome
            .generated
            .iter()
            .all(|q| q.source == Provenance::Generated && q.kind == QuestionKind::Open));

        // The pool mirror holds the batch.
        let pool = load_bank(&paths.generated).unwrap();
        assert_eq!(pool.len(), 2);

        // Archive round-trip: element-for-element identical to the batch.
        let archive_path = outcome.archive_path.unwrap();
        let archived = load_archive(&archive_path).unwrap();
        assert_eq!(archived.len(), outcome.generated.len());
        for (a, b) in archived.iter().zip(&outcome.generated) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.text, b.text);
            assert_eq!(a.correct, b.correct);
        }

        // Sibling metadata record.
        let meta_path = archive_path.with_extension("meta.json");
        let meta: ArchiveMeta =
            serde_json::from_str(&std::fs::read_to_string(meta_path).unwrap()).unwrap();
        assert_eq!(meta.num_questions, 2);
        assert_eq!(meta.topic, "Ramps");
        assert_eq!(meta.exam_type, ExamType::OpenBook);
    }

    #[tokio::test]
    async fn duplicate_stems_are_soft_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let paths = setup(dir.path());
        let generator = BankGenerator::new(paths.clone());
        // The authored stem is "Stem for auth-1" (short, allowed to overlap);
        // use a 40+ char stem twice so the second is a duplicate.
        let stem = "A two-story tenant improvement adds a platform lift. Which section applies?";
        let drafter = ScriptedDrafter::new(vec![stem, stem]);

        let outcome = generator
            .generate(
                ExamType::OpenBook,
                Difficulty::Medium,
                "General",
                2,
                &drafter,
                &mut rng(),
            )
            .await
            .unwrap();

        assert_eq!(outcome.generated.len(), 1);
        assert_eq!(outcome.skipped_duplicates, 1);
    }

    #[tokio::test]
    async fn empty_batch_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let paths = setup(dir.path());
        let generator = BankGenerator::new(paths.clone());
        // Drafter with an empty script: every item fails and is skipped.
        let drafter = ScriptedDrafter::new(vec![]);

        let outcome = generator
            .generate(
                ExamType::OpenBook,
                Difficulty::Easy,
                "General",
                3,
                &drafter,
                &mut rng(),
            )
            .await
            .unwrap();

        assert!(outcome.generated.is_empty());
        assert_eq!(outcome.skipped_failures, 3);
        assert!(outcome.archive_path.is_none());
        assert!(!paths.generated.exists());
        assert!(!paths.archive_dir.exists());
    }

    #[tokio::test]
    async fn over_cap_requests_are_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let paths = setup(dir.path());
        let generator = BankGenerator::new(paths);
        let drafter = ScriptedDrafter::new(vec![]);

        let outcome = generator
            .generate(
                ExamType::OpenBook,
                Difficulty::Easy,
                "General",
                99,
                &drafter,
                &mut rng(),
            )
            .await
            .unwrap();
        assert_eq!(outcome.requested, 40);
    }

    #[tokio::test]
    async fn fatal_failures_are_raised_before_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let paths = BankPaths {
            authored: dir.path().join("missing.json"),
            generated: dir.path().join("generated.json"),
            archive_dir: dir.path().join("archives"),
        };
        let generator = BankGenerator::new(paths.clone());
        let drafter = ScriptedDrafter::new(vec![]);

        let err = generator
            .generate(
                ExamType::OpenBook,
                Difficulty::Easy,
                "General",
                1,
                &drafter,
                &mut rng(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ExamError::Configuration(_)));

        // Non-positive count.
        let paths2 = setup(dir.path());
        let generator = BankGenerator::new(paths2);
        let err = generator
            .generate(
                ExamType::OpenBook,
                Difficulty::Easy,
                "General",
                0,
                &drafter,
                &mut rng(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ExamError::Validation(_)));

        // Mixed has no generated pool.
        let err = BankGenerator::new(BankPaths {
            authored: dir.path().join("authored.json"),
            generated: dir.path().join("generated.json"),
            archive_dir: dir.path().join("archives"),
        })
        .generate(
            ExamType::Mixed,
            Difficulty::Easy,
            "General",
            1,
            &drafter,
            &mut rng(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ExamError::Validation(_)));
        assert!(!dir.path().join("generated.json").exists());
    }

    #[tokio::test]
    async fn ids_continue_across_batches() {
        let dir = tempfile::tempdir().unwrap();
        let paths = setup(dir.path());
        let generator = BankGenerator::new(paths.clone());

        let first = ScriptedDrafter::new(vec![
            "A hotel corridor includes a drinking fountain alcove. What knee clearance applies?",
        ]);
        generator
            .generate(ExamType::OpenBook, Difficulty::Medium, "General", 1, &first, &mut rng())
            .await
            .unwrap();

        let second = ScriptedDrafter::new(vec![
            "A parking structure adds EV charging. How many accessible EVCS spaces are required?",
        ]);
        let outcome = generator
            .generate(ExamType::OpenBook, Difficulty::Medium, "General", 1, &second, &mut rng())
            .await
            .unwrap();

        assert_eq!(outcome.generated[0].id, "gen-ob-000002");
    }
}
