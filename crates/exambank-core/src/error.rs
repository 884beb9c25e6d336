//! Domain error taxonomy.
//!
//! Defined in `exambank-core` so the CLI and service layer can classify
//! failures without string matching. Configuration and validation errors are
//! fatal and raised before any mutation; availability errors are user-visible
//! and never swallowed into a silently-empty exam.

use thiserror::Error;

use crate::model::Difficulty;

/// Errors raised by exam composition, grading, scoring, and bank growth.
#[derive(Debug, Error)]
pub enum ExamError {
    /// A required bank or file is missing at startup.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A request was rejected before any mutation (bad difficulty, bad count).
    #[error("validation error: {0}")]
    Validation(String),

    /// No questions remain after all documented fallbacks.
    #[error("no questions available{}", match .difficulty {
        Some(d) => format!(" for difficulty={d}"),
        None => String::new(),
    })]
    NoQuestionsAvailable { difficulty: Option<Difficulty> },

    /// A strict request found fewer questions than it asked for.
    #[error("not enough questions for difficulty={difficulty}; requested {requested} found {found}")]
    Shortfall {
        difficulty: String,
        requested: usize,
        found: usize,
    },

    /// The caller's identity could not be established.
    #[error("identity error: {0}")]
    Identity(String),

    /// An underlying file read or write failed.
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A bank or archive file held malformed JSON.
    #[error("malformed bank file {path}: {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ExamError {
    /// Returns `true` for errors that must abort before any mutation.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ExamError::Configuration(_) | ExamError::Validation(_) | ExamError::Identity(_)
        )
    }
}
