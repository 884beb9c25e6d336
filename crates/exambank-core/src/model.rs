//! Core data model types for exambank.
//!
//! These are the fundamental types the entire system uses to represent
//! questions, exams, and graded attempts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Difficulty tier of a question.
///
/// `TestPrep` is never assigned directly by the tagger; it is only reachable
/// through the upgrade rule applied to `Hard` results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    TestPrep,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
            Difficulty::TestPrep => write!(f, "test_prep"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" | "beginner" => Ok(Difficulty::Easy),
            "medium" | "intermediate" => Ok(Difficulty::Medium),
            "hard" | "advanced" => Ok(Difficulty::Hard),
            "test_prep" | "test-prep" | "testprep" => Ok(Difficulty::TestPrep),
            other => Err(format!("invalid difficulty: {other}")),
        }
    }
}

/// Whether a question belongs to the open-book or closed-book pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Open,
    Closed,
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::Open => write!(f, "open"),
            QuestionKind::Closed => write!(f, "closed"),
        }
    }
}

/// Exam composition mode requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamMode {
    Open,
    Closed,
    Mixed,
}

impl fmt::Display for ExamMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExamMode::Open => write!(f, "open"),
            ExamMode::Closed => write!(f, "closed"),
            ExamMode::Mixed => write!(f, "mixed"),
        }
    }
}

impl FromStr for ExamMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(ExamMode::Open),
            "closed" => Ok(ExamMode::Closed),
            "mixed" => Ok(ExamMode::Mixed),
            other => Err(format!("invalid exam mode: {other}")),
        }
    }
}

/// Exam form a question bank or attempt belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExamType {
    OpenBook,
    ClosedBook,
    Mixed,
}

impl ExamType {
    /// Prefix used for generated-question ids of this exam type.
    ///
    /// Mixed exams draw from the two standalone pools and have no generated
    /// pool of their own.
    pub fn generated_id_prefix(&self) -> Option<&'static str> {
        match self {
            ExamType::OpenBook => Some("gen-ob-"),
            ExamType::ClosedBook => Some("gen-cb-"),
            ExamType::Mixed => None,
        }
    }
}

impl fmt::Display for ExamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExamType::OpenBook => write!(f, "open_book"),
            ExamType::ClosedBook => write!(f, "closed_book"),
            ExamType::Mixed => write!(f, "mixed"),
        }
    }
}

impl FromStr for ExamType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open_book" | "open-book" | "open" => Ok(ExamType::OpenBook),
            "closed_book" | "closed-book" | "closed" => Ok(ExamType::ClosedBook),
            "mixed" => Ok(ExamType::Mixed),
            other => Err(format!("invalid exam type: {other}")),
        }
    }
}

/// Whether an attempt was taken as a graded official-like run or as test prep.
///
/// Psychometric scores are defined only for test-prep attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptMode {
    OfficialLike,
    TestPrep,
}

/// How a question entered the bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Authored,
    Generated,
}

/// Label of one of the four answer choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChoiceLabel {
    A,
    B,
    C,
    D,
}

impl ChoiceLabel {
    /// Index into a question's `options` array.
    pub fn index(&self) -> usize {
        match self {
            ChoiceLabel::A => 0,
            ChoiceLabel::B => 1,
            ChoiceLabel::C => 2,
            ChoiceLabel::D => 3,
        }
    }
}

impl fmt::Display for ChoiceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChoiceLabel::A => write!(f, "A"),
            ChoiceLabel::B => write!(f, "B"),
            ChoiceLabel::C => write!(f, "C"),
            ChoiceLabel::D => write!(f, "D"),
        }
    }
}

impl FromStr for ChoiceLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "A" => Ok(ChoiceLabel::A),
            "B" => Ok(ChoiceLabel::B),
            "C" => Ok(ChoiceLabel::C),
            "D" => Ok(ChoiceLabel::D),
            other => Err(format!("invalid choice label: {other}")),
        }
    }
}

/// Sentinel category for questions no keyword family matched.
pub const UNASSIGNED_CATEGORY: &str = "UNASSIGNED";

/// A fixed subject category cell the generator targets.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryDef {
    /// Short regulatory code, e.g. "11B-4".
    pub code: &'static str,
    /// Human-readable label.
    pub label: &'static str,
    /// Exam-metrics bucket letter (F–J).
    pub bucket: &'static str,
}

/// Open-book category cells, aligned with exam-metrics buckets F–J.
pub const OPEN_BOOK_CATEGORIES: [CategoryDef; 5] = [
    CategoryDef {
        code: "11B-5/8",
        label: "Div 2-5/8 Site, Parking, EVCS (F)",
        bucket: "F",
    },
    CategoryDef {
        code: "11B-4",
        label: "Div 2-4 Accessible Routes (G)",
        bucket: "G",
    },
    CategoryDef {
        code: "11B-6",
        label: "Div 2-6 Plumbing Elements and Facilities (H)",
        bucket: "H",
    },
    CategoryDef {
        code: "11B-7",
        label: "Div 2-7 Communication Elements (I)",
        bucket: "I",
    },
    CategoryDef {
        code: "11B-9",
        label: "Div 2-9 Built-In Elements and Features (J)",
        bucket: "J",
    },
];

/// Returns `true` if `code` is one of the fixed open-book categories.
pub fn is_valid_category(code: &str) -> bool {
    OPEN_BOOK_CATEGORIES.iter().any(|c| c.code == code)
}

/// A single multiple-choice question.
///
/// Questions are read-only after creation except for explanation backfill
/// (see [`crate::bank::merge_explanations`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Globally unique identifier, stable across regenerations.
    pub id: String,
    /// The question stem.
    pub text: String,
    /// The four answer choices, indexed A through D.
    #[serde(default)]
    pub options: [String; 4],
    /// Label of the correct choice.
    pub correct: ChoiceLabel,
    /// Rationale shown after grading.
    #[serde(default)]
    pub explanation: String,
    /// Difficulty tier.
    pub difficulty: Difficulty,
    /// Subject category code, possibly [`UNASSIGNED_CATEGORY`].
    pub category: String,
    /// Open or closed book pool.
    pub kind: QuestionKind,
    /// Weight-table domain code, when known.
    #[serde(default)]
    pub domain: Option<String>,
    /// Free-form topic label from generation.
    #[serde(default)]
    pub topic: Option<String>,
    /// Where the answer lives (open-book guidance).
    #[serde(default)]
    pub reference_document: Option<String>,
    #[serde(default)]
    pub reference_section: Option<String>,
    /// Authored or generated.
    pub source: Provenance,
    #[serde(default)]
    pub created_at_utc: Option<DateTime<Utc>>,
}

impl Question {
    /// Text of the correct choice.
    pub fn correct_option(&self) -> &str {
        &self.options[self.correct.index()]
    }
}

/// Per-attempt result for a single scoring domain. Derived during grading,
/// never independently persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainResult {
    pub domain_code: String,
    pub questions_in_domain: i32,
    pub correct_in_domain: i32,
}

/// One graded exam attempt. Immutable once scored; retained for longitudinal
/// proficiency over at most the 3 most recent attempts per exam type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamAttempt {
    pub exam_type: ExamType,
    pub mode: AttemptMode,
    pub taken_at: DateTime<Utc>,
    pub total_questions: i32,
    pub total_correct: i32,
    #[serde(default)]
    pub domains: Vec<DomainResult>,
}
