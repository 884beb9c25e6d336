//! Exam composer: quota-based assembly of question sets.
//!
//! Given a mode, a requested count, and an optional difficulty, selects a
//! concrete set of questions under per-mode caps, mixed-mode sub-quotas, and
//! the documented fallback rules. Never returns a silently-empty exam.

use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ExamError;
use crate::model::{Difficulty, ExamMode, Question, QuestionKind};
use crate::store::QuestionStore;

/// Hard cap on open-book exams (official exam length).
pub const OPEN_BOOK_MAX_QUESTIONS: usize = 40;
/// Hard cap on closed-book exams.
pub const CLOSED_BOOK_MAX_QUESTIONS: usize = 60;
/// Cap on mixed exams: the two standalone caps combined.
pub const MIXED_MAX_QUESTIONS: usize = OPEN_BOOK_MAX_QUESTIONS + CLOSED_BOOK_MAX_QUESTIONS;

/// Share of a mixed exam drawn from the open-book pool.
const MIXED_OPEN_RATIO: f64 = 0.4;

/// An exam composition request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamRequest {
    pub mode: ExamMode,
    pub count: i32,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    /// When set, a shortfall is an error instead of a smaller exam.
    #[serde(default)]
    pub strict: bool,
}

/// A question as presented to the exam taker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamQuestion {
    pub id: String,
    pub text: String,
    pub correct_answer: String,
    #[serde(default)]
    pub kind: Option<QuestionKind>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub reference_document: Option<String>,
    #[serde(default)]
    pub reference_section: Option<String>,
}

impl From<&Question> for ExamQuestion {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id.clone(),
            text: q.text.clone(),
            correct_answer: q.correct.to_string(),
            kind: Some(q.kind),
            difficulty: Some(q.difficulty),
            reference_document: q.reference_document.clone(),
            reference_section: q.reference_section.clone(),
        }
    }
}

/// A composed exam, ready to serve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposedExam {
    pub mode: ExamMode,
    pub effective_count: usize,
    pub questions: Vec<ExamQuestion>,
    /// Realized open/closed sub-quotas (mixed mode only).
    #[serde(default)]
    pub open_share: Option<usize>,
    #[serde(default)]
    pub closed_share: Option<usize>,
    /// True when a difficulty filter fell back to the unfiltered pool.
    #[serde(default)]
    pub fallback_applied: bool,
    /// True when the requested count was clamped to the per-mode cap.
    #[serde(default)]
    pub clamped: bool,
}

/// Composes exams from the question store and the flat authored closed-book
/// bank (the source for closed-book test-prep exams, which live outside the
/// queryable store).
pub struct Composer {
    store: Arc<dyn QuestionStore>,
    authored_closed: Vec<Question>,
}

fn clamp_count(count: i32, max: usize) -> (usize, bool) {
    if count < 1 {
        (1, true)
    } else if count as usize > max {
        (max, true)
    } else {
        (count as usize, false)
    }
}

impl Composer {
    pub fn new(store: Arc<dyn QuestionStore>, authored_closed: Vec<Question>) -> Self {
        Self {
            store,
            authored_closed,
        }
    }

    /// Compose an exam for the request.
    ///
    /// The rng drives only the closed-book test-prep shuffle; all other
    /// selection is store order, so results are reproducible for a seeded
    /// rng and a fixed store.
    pub fn compose<R: Rng>(
        &self,
        request: &ExamRequest,
        rng: &mut R,
    ) -> Result<ComposedExam, ExamError> {
        match request.mode {
            ExamMode::Mixed => self.compose_mixed(request),
            ExamMode::Closed if request.difficulty == Some(Difficulty::TestPrep) => {
                self.compose_closed_test_prep(request, rng)
            }
            ExamMode::Open | ExamMode::Closed => self.compose_standalone(request),
        }
    }

    fn compose_mixed(&self, request: &ExamRequest) -> Result<ComposedExam, ExamError> {
        let (total, clamped) = clamp_count(request.count, MIXED_MAX_QUESTIONS);
        if clamped {
            tracing::warn!(
                requested = request.count,
                effective = total,
                "mixed exam count clamped"
            );
        }

        let mut open_count = (total as f64 * MIXED_OPEN_RATIO).round() as usize;
        let mut closed_count = total - open_count;

        // Guarantee at least one of each kind when the total allows it.
        if total >= 2 {
            if open_count == 0 {
                open_count = 1;
                closed_count = total - open_count;
            }
            if closed_count == 0 {
                closed_count = 1;
                open_count = total - closed_count;
            }
        }

        let mut fallback_applied = false;
        let (mut open_qs, mut closed_qs) = match request.difficulty {
            Some(d) => (
                self.store
                    .by_kind_and_difficulty(QuestionKind::Open, d, open_count),
                self.store
                    .by_kind_and_difficulty(QuestionKind::Closed, d, closed_count),
            ),
            None => (
                self.store.by_kind(QuestionKind::Open, open_count),
                self.store.by_kind(QuestionKind::Closed, closed_count),
            ),
        };

        // All-or-nothing fallback: only when the difficulty filter emptied
        // both sub-pools simultaneously.
        if open_qs.is_empty() && closed_qs.is_empty() && request.difficulty.is_some() {
            tracing::warn!(
                difficulty = %request.difficulty.unwrap(),
                "no mixed-mode questions at requested difficulty, falling back to unfiltered pools"
            );
            open_qs = self.store.by_kind(QuestionKind::Open, open_count);
            closed_qs = self.store.by_kind(QuestionKind::Closed, closed_count);
            fallback_applied = true;
        }

        let open_share = open_qs.len();
        let closed_share = closed_qs.len();
        let questions: Vec<ExamQuestion> =
            open_qs.iter().chain(closed_qs.iter()).map(ExamQuestion::from).collect();

        if questions.is_empty() {
            return Err(ExamError::NoQuestionsAvailable {
                difficulty: request.difficulty,
            });
        }
        self.check_strict(request, total, questions.len())?;

        Ok(ComposedExam {
            mode: ExamMode::Mixed,
            effective_count: questions.len(),
            questions,
            open_share: Some(open_share),
            closed_share: Some(closed_share),
            fallback_applied,
            clamped,
        })
    }

    fn compose_closed_test_prep<R: Rng>(
        &self,
        request: &ExamRequest,
        rng: &mut R,
    ) -> Result<ComposedExam, ExamError> {
        let (count, clamped) = clamp_count(request.count, CLOSED_BOOK_MAX_QUESTIONS);

        let mut pool: Vec<&Question> = self
            .authored_closed
            .iter()
            .filter(|q| q.difficulty == Difficulty::TestPrep)
            .collect();
        if pool.is_empty() {
            return Err(ExamError::NoQuestionsAvailable {
                difficulty: Some(Difficulty::TestPrep),
            });
        }

        pool.shuffle(rng);
        let questions: Vec<ExamQuestion> = pool
            .into_iter()
            .take(count)
            .map(|q| {
                let mut eq = ExamQuestion::from(q);
                eq.kind = Some(QuestionKind::Closed);
                eq
            })
            .collect();

        self.check_strict(request, count, questions.len())?;

        Ok(ComposedExam {
            mode: ExamMode::Closed,
            effective_count: questions.len(),
            questions,
            open_share: None,
            closed_share: None,
            fallback_applied: false,
            clamped,
        })
    }

    fn compose_standalone(&self, request: &ExamRequest) -> Result<ComposedExam, ExamError> {
        let (kind, max) = match request.mode {
            ExamMode::Open => (QuestionKind::Open, OPEN_BOOK_MAX_QUESTIONS),
            ExamMode::Closed => (QuestionKind::Closed, CLOSED_BOOK_MAX_QUESTIONS),
            ExamMode::Mixed => unreachable!("mixed handled in compose"),
        };
        let (count, clamped) = clamp_count(request.count, max);
        if clamped {
            tracing::warn!(
                requested = request.count,
                effective = count,
                mode = %request.mode,
                "exam count clamped to per-mode cap"
            );
        }

        let mut fallback_applied = false;
        let mut questions = match request.difficulty {
            Some(d) => self.store.by_kind_and_difficulty(kind, d, count),
            None => self.store.by_kind(kind, count),
        };

        // A missing difficulty match alone is never a hard failure; fall
        // back to the kind-only filter.
        if questions.is_empty() && request.difficulty.is_some() {
            tracing::warn!(
                difficulty = %request.difficulty.unwrap(),
                mode = %request.mode,
                "no questions at requested difficulty, falling back to kind-only filter"
            );
            questions = self.store.by_kind(kind, count);
            fallback_applied = true;
        }

        if questions.is_empty() {
            return Err(ExamError::NoQuestionsAvailable {
                difficulty: request.difficulty,
            });
        }
        self.check_strict(request, count, questions.len())?;

        Ok(ComposedExam {
            mode: request.mode,
            effective_count: questions.len(),
            questions: questions.iter().map(ExamQuestion::from).collect(),
            open_share: None,
            closed_share: None,
            fallback_applied,
            clamped,
        })
    }

    fn check_strict(
        &self,
        request: &ExamRequest,
        requested: usize,
        found: usize,
    ) -> Result<(), ExamError> {
        if request.strict && found < requested {
            return Err(ExamError::Shortfall {
                difficulty: request
                    .difficulty
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "ANY".to_string()),
                requested,
                found,
            });
        }
        Ok(())
    }
}
