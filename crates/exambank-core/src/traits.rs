//! Collaborator traits at the system boundary.
//!
//! Content generation and identity verification are external concerns; the
//! core depends only on these seams. Implementations live in
//! `exambank-providers` and in the host application.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ExamError;
use crate::model::{ChoiceLabel, Difficulty, ExamType, Question};

/// Request for a single drafted question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftRequest {
    pub exam_type: ExamType,
    pub difficulty: Difficulty,
    /// Category code, e.g. "11B-4".
    pub category_code: String,
    /// Human-readable category label.
    pub category_label: String,
    /// Free-form topic label.
    pub topic: String,
    /// Corpus snippets supplied for grounding (may be empty).
    #[serde(default)]
    pub reference_snippets: Vec<String>,
    /// Authored questions supplied for style guidance (at most 2).
    #[serde(default)]
    pub reference_questions: Vec<Question>,
}

/// A candidate question returned by the content-generation collaborator.
///
/// Treated as opaque: the bank pipeline validates it only for near-duplicate
/// stems before admission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub stem: String,
    pub options: [String; 4],
    pub correct: ChoiceLabel,
    #[serde(default)]
    pub explanation: String,
}

/// Trait for backends that draft new exam questions.
#[async_trait]
pub trait QuestionDrafter: Send + Sync {
    /// Human-readable drafter name (e.g. "openai").
    fn name(&self) -> &str;

    /// Draft one candidate question.
    async fn draft(&self, request: &DraftRequest) -> anyhow::Result<QuestionDraft>;
}

/// A verified caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Caller {
    pub id: u64,
    pub email: String,
    pub has_active_subscription: bool,
}

/// Trait for identity verification. Composition and grading fail closed when
/// identity cannot be established.
pub trait IdentityProvider: Send + Sync {
    fn verify(&self, token: &str) -> Result<Caller, ExamError>;
}

/// Identity provider with a fixed token → caller table, for local and test
/// use.
#[derive(Debug, Default)]
pub struct StaticIdentity {
    callers: Vec<(String, Caller)>,
}

impl StaticIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_caller(mut self, token: &str, caller: Caller) -> Self {
        self.callers.push((token.to_string(), caller));
        self
    }
}

impl IdentityProvider for StaticIdentity {
    fn verify(&self, token: &str) -> Result<Caller, ExamError> {
        self.callers
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, c)| c.clone())
            .ok_or_else(|| ExamError::Identity("could not validate credentials".into()))
    }
}
