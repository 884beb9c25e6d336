//! Psychometric scoring: single-attempt mastery and recency-weighted
//! longitudinal proficiency.
//!
//! Scores are defined only for test-prep attempts; everything else returns
//! `None` ("N/A") rather than a misleading zero.

use crate::model::{AttemptMode, ExamAttempt, ExamType};
use crate::weights::{weights_for, DomainWeights};

/// Recency weights for up to 3 attempts, oldest to newest.
const RECENCY_WEIGHTS: [f64; 3] = [0.2, 0.3, 0.5];

/// Scoring configuration.
#[derive(Debug, Clone, Copy)]
pub struct ScoringConfig {
    /// Blend factor: `alpha` on raw percent, `1 - alpha` on the
    /// domain-weighted composite.
    pub alpha: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self { alpha: 0.4 }
    }
}

/// Raw percent score in [0, 100], or `None` when `total <= 0`.
pub fn raw_percent(correct: i32, total: i32) -> Option<f64> {
    if total <= 0 {
        return None;
    }
    Some(f64::from(correct) / f64::from(total) * 100.0)
}

fn clamp_score(score: f64) -> f64 {
    score.clamp(0.0, 100.0)
}

/// Mastery score in [0, 100] for a single attempt, or `None` when the
/// attempt is not test prep, has no questions, or its exam type carries no
/// weight table.
///
/// The composite sums `weight * domain_percent` over the domains present in
/// both the attempt and the weight table, renormalized over present domains
/// only; with no domain breakdown at all the score is the raw percent.
pub fn score_attempt(attempt: &ExamAttempt, config: &ScoringConfig) -> Option<f64> {
    if attempt.mode != AttemptMode::TestPrep {
        return None;
    }
    let raw = raw_percent(attempt.total_correct, attempt.total_questions)?;
    let weights = weights_for(attempt.exam_type)?;
    Some(blend(attempt, raw, &weights, config.alpha))
}

fn blend(attempt: &ExamAttempt, raw: f64, weights: &DomainWeights, alpha: f64) -> f64 {
    let domain_scores: Vec<(&str, f64)> = attempt
        .domains
        .iter()
        .filter(|d| d.questions_in_domain > 0)
        .map(|d| {
            (
                d.domain_code.as_str(),
                f64::from(d.correct_in_domain) / f64::from(d.questions_in_domain) * 100.0,
            )
        })
        .collect();

    if domain_scores.is_empty() {
        return clamp_score(raw);
    }

    let mut composite = 0.0;
    let mut total_weight = 0.0;
    for (code, percent) in &domain_scores {
        if let Some(w) = weights.get(code) {
            composite += w * percent;
            total_weight += w;
        }
    }

    let composite = if total_weight > 0.0 {
        composite / total_weight
    } else {
        // No attempt domain appears in the table; fall back to raw.
        raw
    };

    clamp_score(alpha * raw + (1.0 - alpha) * composite)
}

/// Longitudinal proficiency in [0, 100] over the most recent test-prep
/// attempts of `exam_type`, or `None` if there are none.
///
/// Keeps the last 3 attempts by `taken_at`. Recency weights come from the
/// fixed `[0.2, 0.3, 0.5]` sequence, right-aligned to the kept count and
/// renormalized to sum 1. Attempts that score N/A are dropped and the
/// normalized weights re-aligned (right-aligned again) to the survivors.
pub fn proficiency(
    attempts: &[ExamAttempt],
    exam_type: ExamType,
    config: &ScoringConfig,
) -> Option<f64> {
    let mut filtered: Vec<&ExamAttempt> = attempts
        .iter()
        .filter(|a| a.exam_type == exam_type && a.mode == AttemptMode::TestPrep)
        .collect();
    if filtered.is_empty() {
        return None;
    }

    filtered.sort_by_key(|a| a.taken_at);
    let recent = &filtered[filtered.len().saturating_sub(3)..];

    let base = &RECENCY_WEIGHTS[RECENCY_WEIGHTS.len() - recent.len()..];
    let total: f64 = base.iter().sum();
    let weights: Vec<f64> = base.iter().map(|w| w / total).collect();

    let scores: Vec<f64> = recent
        .iter()
        .filter_map(|a| score_attempt(a, config))
        .collect();
    if scores.is_empty() {
        return None;
    }

    let effective = &weights[weights.len() - scores.len()..];
    let sum: f64 = effective.iter().zip(&scores).map(|(w, s)| w * s).sum();
    Some(clamp_score(sum))
}
