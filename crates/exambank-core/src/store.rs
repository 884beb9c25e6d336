//! Question store collaborator and its JSON-bank-backed implementation.
//!
//! The store is specified only at its interface boundary: filter by kind and
//! optional difficulty, look up by id, and return a concrete ordered list.

use std::path::Path;

use crate::error::ExamError;
use crate::model::{Difficulty, Question, QuestionKind};

/// Read-side collaborator the composer and grader query.
pub trait QuestionStore: Send + Sync {
    /// Questions of the given kind, in stable order, up to `limit`.
    fn by_kind(&self, kind: QuestionKind, limit: usize) -> Vec<Question>;

    /// Questions of the given kind and difficulty, in stable order, up to
    /// `limit`.
    fn by_kind_and_difficulty(
        &self,
        kind: QuestionKind,
        difficulty: Difficulty,
        limit: usize,
    ) -> Vec<Question>;

    /// Questions matching the given ids, in store order.
    fn by_ids(&self, ids: &[String]) -> Vec<Question>;

    /// Every question in the store, in stable order.
    fn all(&self) -> Vec<Question>;
}

/// Load a JSON array of question records.
pub fn load_bank(path: &Path) -> Result<Vec<Question>, ExamError> {
    let content = std::fs::read_to_string(path).map_err(|source| ExamError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ExamError::Malformed {
        path: path.display().to_string(),
        source,
    })
}

/// Load a bank file that may not exist yet; a missing file is an empty bank.
pub fn load_bank_or_empty(path: &Path) -> Result<Vec<Question>, ExamError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    load_bank(path)
}

/// Persist a bank as a pretty-printed JSON array, creating parent
/// directories as needed.
pub fn save_bank(path: &Path, bank: &[Question]) -> Result<(), ExamError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ExamError::Io {
            path: parent.display().to_string(),
            source,
        })?;
    }
    let json = serde_json::to_string_pretty(bank).map_err(|source| ExamError::Malformed {
        path: path.display().to_string(),
        source,
    })?;
    std::fs::write(path, json).map_err(|source| ExamError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// In-memory store over the combined authored + generated pools.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    questions: Vec<Question>,
}

impl InMemoryStore {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    /// Build a store from the authored bank file plus an optional generated
    /// bank file.
    ///
    /// The authored bank is required at startup; a missing file is a fatal
    /// configuration error, raised before anything else runs.
    pub fn from_bank_files(authored: &Path, generated: Option<&Path>) -> Result<Self, ExamError> {
        if !authored.exists() {
            return Err(ExamError::Configuration(format!(
                "authored question bank not found at {}",
                authored.display()
            )));
        }
        let mut questions = load_bank(authored)?;
        if let Some(generated) = generated {
            questions.extend(load_bank_or_empty(generated)?);
        }
        tracing::debug!(count = questions.len(), "loaded question store");
        Ok(Self { questions })
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

impl QuestionStore for InMemoryStore {
    fn by_kind(&self, kind: QuestionKind, limit: usize) -> Vec<Question> {
        self.questions
            .iter()
            .filter(|q| q.kind == kind)
            .take(limit)
            .cloned()
            .collect()
    }

    fn by_kind_and_difficulty(
        &self,
        kind: QuestionKind,
        difficulty: Difficulty,
        limit: usize,
    ) -> Vec<Question> {
        self.questions
            .iter()
            .filter(|q| q.kind == kind && q.difficulty == difficulty)
            .take(limit)
            .cloned()
            .collect()
    }

    fn by_ids(&self, ids: &[String]) -> Vec<Question> {
        self.questions
            .iter()
            .filter(|q| ids.contains(&q.id))
            .cloned()
            .collect()
    }

    fn all(&self) -> Vec<Question> {
        self.questions.clone()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::question;
    use super::*;
    use crate::model::QuestionKind;

    fn sample_store() -> InMemoryStore {
        InMemoryStore::new(vec![
            question("q1", QuestionKind::Open, Difficulty::Easy),
            question("q2", QuestionKind::Open, Difficulty::Hard),
            question("q3", QuestionKind::Closed, Difficulty::Easy),
            question("q4", QuestionKind::Closed, Difficulty::Hard),
            question("q5", QuestionKind::Open, Difficulty::Easy),
        ])
    }

    #[test]
    fn filters_by_kind_with_limit() {
        let store = sample_store();
        let open = store.by_kind(QuestionKind::Open, 2);
        assert_eq!(open.len(), 2);
        assert_eq!(open[0].id, "q1");
        assert_eq!(open[1].id, "q2");
    }

    #[test]
    fn filters_by_kind_and_difficulty() {
        let store = sample_store();
        let found = store.by_kind_and_difficulty(QuestionKind::Open, Difficulty::Easy, 10);
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|q| q.difficulty == Difficulty::Easy));
    }

    #[test]
    fn lookup_by_ids_preserves_store_order() {
        let store = sample_store();
        let found = store.by_ids(&["q4".to_string(), "q1".to_string()]);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].id, "q1");
        assert_eq!(found[1].id, "q4");
    }

    #[test]
    fn missing_authored_bank_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("authored.json");
        let err = InMemoryStore::from_bank_files(&missing, None).unwrap_err();
        assert!(matches!(err, ExamError::Configuration(_)));
    }

    #[test]
    fn bank_files_roundtrip_and_combine() {
        let dir = tempfile::tempdir().unwrap();
        let authored_path = dir.path().join("authored.json");
        let generated_path = dir.path().join("generated.json");

        save_bank(
            &authored_path,
            &[question("a1", QuestionKind::Open, Difficulty::Easy)],
        )
        .unwrap();
        save_bank(
            &generated_path,
            &[question("gen-ob-000001", QuestionKind::Open, Difficulty::Hard)],
        )
        .unwrap();

        let store =
            InMemoryStore::from_bank_files(&authored_path, Some(&generated_path)).unwrap();
        assert_eq!(store.len(), 2);

        // Generated bank file is optional.
        let store = InMemoryStore::from_bank_files(
            &authored_path,
            Some(&dir.path().join("nope.json")),
        )
        .unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn malformed_bank_is_reported_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = load_bank(&path).unwrap_err();
        assert!(matches!(err, ExamError::Malformed { .. }));
        assert!(err.to_string().contains("bad.json"));
    }
}
