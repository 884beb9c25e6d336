//! Fixed per-exam-type domain weight tables.
//!
//! Each table encodes the official domain distribution for that exam form
//! and sums to 1.0. Tables are immutable values injected at construction so
//! the scorer stays pure and swappable in tests.

use std::collections::BTreeMap;

use crate::model::ExamType;

/// Domain code → weight in [0, 1], summing to 1 per exam type.
#[derive(Debug, Clone)]
pub struct DomainWeights {
    weights: BTreeMap<&'static str, f64>,
}

impl DomainWeights {
    pub fn new(entries: &[(&'static str, f64)]) -> Self {
        Self {
            weights: entries.iter().copied().collect(),
        }
    }

    pub fn get(&self, domain_code: &str) -> Option<f64> {
        self.weights.get(domain_code).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.weights.iter().map(|(k, v)| (*k, *v))
    }

    pub fn total(&self) -> f64 {
        self.weights.values().sum()
    }
}

/// Closed-book domain distribution.
pub fn closed_book_weights() -> DomainWeights {
    DomainWeights::new(&[
        ("cbc_scoping", 0.40),
        ("housing", 0.20),
        ("federal_regs", 0.1333),
        ("casp_statutes", 0.1333),
        ("identifying_standards", 0.1334),
    ])
}

/// Open-book domain distribution (project-type buckets F-J).
pub fn open_book_weights() -> DomainWeights {
    DomainWeights::new(&[
        ("site_elements_ev", 0.25),
        ("routes", 0.20),
        ("plumbing", 0.20),
        ("communication", 0.15),
        ("built_ins", 0.20),
    ])
}

/// Open-book scoring domain for a subject category code, when one exists.
///
/// Closed-book domains are assigned at import time and have no category
/// mapping.
pub fn domain_for_category(category_code: &str) -> Option<&'static str> {
    match category_code {
        "11B-5/8" => Some("site_elements_ev"),
        "11B-4" => Some("routes"),
        "11B-6" => Some("plumbing"),
        "11B-7" => Some("communication"),
        "11B-9" => Some("built_ins"),
        _ => None,
    }
}

/// Weight table for an exam type, or `None` where no psychometric score is
/// defined (mixed exams).
pub fn weights_for(exam_type: ExamType) -> Option<DomainWeights> {
    match exam_type {
        ExamType::OpenBook => Some(open_book_weights()),
        ExamType::ClosedBook => Some(closed_book_weights()),
        ExamType::Mixed => None,
    }
}
