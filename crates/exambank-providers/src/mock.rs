//! Mock drafter for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use exambank_core::model::ChoiceLabel;
use exambank_core::traits::{DraftRequest, QuestionDraft, QuestionDrafter};

/// A mock drafter for exercising the bank pipeline without real API calls.
///
/// Returns configurable drafts based on topic matching; unmatched requests
/// get a synthesized draft with a unique stem so batches never self-collide.
pub struct MockDrafter {
    /// Map of topic substring → draft.
    responses: HashMap<String, QuestionDraft>,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last request received.
    last_request: Mutex<Option<DraftRequest>>,
}

impl MockDrafter {
    /// Create a new mock with the given topic→draft mappings.
    pub fn new(responses: HashMap<String, QuestionDraft>) -> Self {
        Self {
            responses,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Create a mock that synthesizes every draft.
    pub fn synthesizing() -> Self {
        Self::new(HashMap::new())
    }

    /// Get the number of calls made to this drafter.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last request made to this drafter.
    pub fn last_request(&self) -> Option<DraftRequest> {
        self.last_request.lock().unwrap().clone()
    }

    fn synthesize(&self, request: &DraftRequest, seq: u32) -> QuestionDraft {
        QuestionDraft {
            stem: format!(
                "Which provision of {} governs {} (case {seq})?",
                request.category_code, request.topic
            ),
            options: [
                "The scoping chapter".into(),
                "The technical chapter".into(),
                "The definitions chapter".into(),
                "The administration chapter".into(),
            ],
            correct: ChoiceLabel::B,
            explanation: format!("Synthesized draft for {}", request.topic),
        }
    }
}

#[async_trait]
impl QuestionDrafter for MockDrafter {
    fn name(&self) -> &str {
        "mock"
    }

    async fn draft(&self, request: &DraftRequest) -> anyhow::Result<QuestionDraft> {
        let seq = self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_request.lock().unwrap() = Some(request.clone());

        let draft = self
            .responses
            .iter()
            .find(|(key, _)| request.topic.contains(key.as_str()))
            .map(|(_, v)| v.clone())
            .unwrap_or_else(|| self.synthesize(request, seq));

        Ok(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exambank_core::model::{Difficulty, ExamType};

    fn request(topic: &str) -> DraftRequest {
        DraftRequest {
            exam_type: ExamType::OpenBook,
            difficulty: Difficulty::Medium,
            category_code: "11B-6".into(),
            category_label: "Div 6 Plumbing Elements (H)".into(),
            topic: topic.into(),
            reference_snippets: vec![],
            reference_questions: vec![],
        }
    }

    #[tokio::test]
    async fn topic_matching() {
        let mut responses = HashMap::new();
        responses.insert(
            "lavatories".to_string(),
            QuestionDraft {
                stem: "What is the maximum lavatory rim height?".into(),
                options: ["30 in".into(), "32 in".into(), "34 in".into(), "36 in".into()],
                correct: ChoiceLabel::C,
                explanation: String::new(),
            },
        );

        let drafter = MockDrafter::new(responses);
        let draft = drafter.draft(&request("lavatories and sinks")).await.unwrap();
        assert!(draft.stem.contains("rim height"));
        assert_eq!(drafter.call_count(), 1);
        assert_eq!(drafter.last_request().unwrap().topic, "lavatories and sinks");
    }

    #[tokio::test]
    async fn synthesized_stems_are_unique_per_call() {
        let drafter = MockDrafter::synthesizing();
        let a = drafter.draft(&request("drinking fountains")).await.unwrap();
        let b = drafter.draft(&request("drinking fountains")).await.unwrap();
        assert_ne!(a.stem, b.stem);
        assert_eq!(drafter.call_count(), 2);
    }
}
