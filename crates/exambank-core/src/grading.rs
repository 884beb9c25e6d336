//! Grading of submitted answers.
//!
//! Resolves each answer against the question store, counts correctness,
//! derives per-domain results, and assembles the immutable attempt record
//! handed to the psychometric scorer.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::error::ExamError;
use crate::model::{
    AttemptMode, ChoiceLabel, DomainResult, ExamAttempt, ExamMode, ExamType, QuestionKind,
};
use crate::scoring::{score_attempt, ScoringConfig};
use crate::store::QuestionStore;

/// One submitted answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerSubmission {
    pub question_id: String,
    pub selected: ChoiceLabel,
    /// Which pool the question came from; present for mixed exams.
    #[serde(default)]
    pub kind: Option<QuestionKind>,
}

/// Per-question grading outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionOutcome {
    pub question_id: String,
    pub correct: bool,
    pub text: String,
    pub user_choice: ChoiceLabel,
    pub correct_choice: ChoiceLabel,
    #[serde(default)]
    pub explanation: String,
}

/// A fully graded submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradedSubmission {
    pub submission_id: Uuid,
    pub mode: ExamMode,
    pub total_questions: i32,
    pub correct_count: i32,
    pub score_percent: f64,
    /// Psychometric mastery score; present only for test-prep attempts of a
    /// weighted exam type.
    #[serde(default)]
    pub mastery_score: Option<f64>,
    pub breakdown: Vec<QuestionOutcome>,
    /// The immutable attempt record, for longitudinal tracking.
    pub attempt: ExamAttempt,
}

fn exam_type_for_mode(mode: ExamMode) -> ExamType {
    match mode {
        ExamMode::Open => ExamType::OpenBook,
        ExamMode::Closed => ExamType::ClosedBook,
        ExamMode::Mixed => ExamType::Mixed,
    }
}

fn simple_percent(correct: i32, total: i32) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    f64::from(correct) / f64::from(total) * 100.0
}

/// Grade a submission against the store.
///
/// The total counts every submitted answer; answers whose question id is not
/// in the store cannot be judged and are omitted from the breakdown and the
/// correct count.
pub fn grade(
    answers: &[AnswerSubmission],
    store: &dyn QuestionStore,
    mode: ExamMode,
    attempt_mode: AttemptMode,
    config: &ScoringConfig,
) -> Result<GradedSubmission, ExamError> {
    let ids: Vec<String> = answers.iter().map(|a| a.question_id.clone()).collect();
    let questions = store.by_ids(&ids);

    let total = answers.len() as i32;
    let mut correct_count = 0;
    let mut breakdown = Vec::new();
    let mut domain_totals: BTreeMap<String, (i32, i32)> = BTreeMap::new();

    for answer in answers {
        let Some(q) = questions.iter().find(|q| q.id == answer.question_id) else {
            tracing::warn!(question_id = %answer.question_id, "answer references unknown question");
            continue;
        };

        let is_correct = answer.selected == q.correct;
        if is_correct {
            correct_count += 1;
        }

        if let Some(domain) = &q.domain {
            let entry = domain_totals.entry(domain.clone()).or_insert((0, 0));
            entry.0 += 1;
            if is_correct {
                entry.1 += 1;
            }
        }

        breakdown.push(QuestionOutcome {
            question_id: q.id.clone(),
            correct: is_correct,
            text: q.text.clone(),
            user_choice: answer.selected,
            correct_choice: q.correct,
            explanation: q.explanation.clone(),
        });
    }

    let domains: Vec<DomainResult> = domain_totals
        .into_iter()
        .map(|(domain_code, (questions_in_domain, correct_in_domain))| DomainResult {
            domain_code,
            questions_in_domain,
            correct_in_domain,
        })
        .collect();

    let attempt = ExamAttempt {
        exam_type: exam_type_for_mode(mode),
        mode: attempt_mode,
        taken_at: Utc::now(),
        total_questions: total,
        total_correct: correct_count,
        domains,
    };

    let mastery_score = score_attempt(&attempt, config);

    Ok(GradedSubmission {
        submission_id: Uuid::new_v4(),
        mode,
        total_questions: total,
        correct_count,
        score_percent: simple_percent(correct_count, total),
        mastery_score,
        breakdown,
        attempt,
    })
}
