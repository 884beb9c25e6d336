//! Difficulty and category tagger.
//!
//! Pure classification of raw question text into a difficulty tier and a
//! subject category. First-match-wins over a small set of textual signals:
//! stem length, regulatory-code reference count, list markers, scenario
//! wording, and exam-style phrasing. Re-tagging identical text always yields
//! the identical result.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::{is_valid_category, Difficulty, UNASSIGNED_CATEGORY};

static CODE_REF: LazyLock<Regex> = LazyLock::new(|| {
    // Chapter 11B references plus bare 2xx/3xx section numbers.
    Regex::new(r"\b11[A-Z]?\b|\b20[1-9]\b|\b30[1-9]\b").unwrap()
});

static SECTION_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bSection\s+\d+[A-Za-z0-9.-]*").unwrap());

const LIST_MARKERS: [&str; 8] = ["\n- ", "\n* ", "\n1. ", "\n2. ", "\n3. ", " A.", " B.", " C."];

const SCENARIO_KEYWORDS: [&str; 25] = [
    "clinic",
    "spinal",
    "rehabilitation",
    "doctor",
    "patient",
    "waiting room",
    "exam room",
    "suite",
    "tenant space",
    "tenant improvement",
    "shell building",
    "multi-story",
    "multi-storey",
    "shopping center",
    "grocery",
    "restaurant",
    "parking facility",
    "parking structure",
    "parking garage",
    "apartment",
    "hotel",
    "motel",
    "lodging",
    "field office",
    "customer service center",
];

const EXAM_STYLE_MARKERS: [&str; 12] = [
    "most appropriate",
    "best describes",
    "best meets",
    "which of the following",
    "based on the information above",
    "based on this scenario",
    "you are reviewing plans",
    "you are inspecting",
    "plan review",
    "project type",
    "new spinal care clinic",
    "new title ii field office",
];

const PACKET_MARKERS: [&str; 5] = [
    "detail set",
    "enlarged plan",
    "exam-style",
    "test prep",
    "packet",
];

/// Count regulatory-code references in the text.
pub fn count_code_refs(text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }
    CODE_REF.find_iter(text).count() + SECTION_REF.find_iter(text).count()
}

fn has_list_structure(text: &str) -> bool {
    LIST_MARKERS.iter().any(|m| text.contains(m))
}

fn is_scenario(text: &str) -> bool {
    let lower = text.to_lowercase();
    SCENARIO_KEYWORDS.iter().any(|k| lower.contains(k))
}

fn is_exam_style(text: &str) -> bool {
    let lower = text.to_lowercase();
    EXAM_STYLE_MARKERS.iter().any(|k| lower.contains(k))
}

/// Estimate a base difficulty from the stem text alone.
///
/// Never returns [`Difficulty::TestPrep`]; that tier is reachable only via
/// the upgrade in [`tag`].
pub fn estimate_difficulty(text: &str) -> Difficulty {
    let t = text.trim();
    if t.is_empty() {
        return Difficulty::Medium;
    }

    let length = t.len();
    let refs = count_code_refs(t);
    let listy = has_list_structure(t);
    let scenario = is_scenario(t);
    let examy = is_exam_style(t);

    // Strong hard signals
    if length > 350 || refs >= 4 || (scenario && examy) || (scenario && refs >= 2) {
        return Difficulty::Hard;
    }

    // Clear easy signals
    if length < 140 && refs <= 1 && !scenario && !listy {
        return Difficulty::Easy;
    }

    // Mild hard signals
    if (length > 260 && (scenario || refs >= 2)) || (listy && (scenario || refs >= 2)) {
        return Difficulty::Hard;
    }

    Difficulty::Medium
}

/// Whether a hard item reads like a full exam-preparation scenario and
/// should be upgraded to test_prep.
fn is_test_prep_candidate(text: &str, base: Difficulty) -> bool {
    if base != Difficulty::Hard {
        return false;
    }
    let t = text.trim();
    if t.is_empty() {
        return false;
    }

    let lower = t.to_lowercase();
    let refs = count_code_refs(t);
    let scenario = is_scenario(t);
    let examy = is_exam_style(t);
    let long_enough = t.len() > 260;
    let very_long = t.len() > 340;
    let packety = PACKET_MARKERS.iter().any(|k| lower.contains(k));

    packety
        || (very_long && scenario && refs >= 2)
        || (long_enough && scenario && examy && refs >= 2)
        || (scenario && examy && refs >= 3)
}

/// Guess a category from keyword families, or keep an already-valid one.
///
/// Unmatched text gets the explicit [`UNASSIGNED_CATEGORY`] sentinel rather
/// than being dropped.
pub fn normalize_category(text: &str, existing: Option<&str>) -> String {
    if let Some(cat) = existing {
        let cat = cat.trim();
        if is_valid_category(cat) {
            return cat.to_string();
        }
    }

    let lower = text.to_lowercase();
    let families: [(&str, &[&str]); 5] = [
        (
            "11B-5/8",
            &["parking", "stall", "lot", "drive aisle", "loading", "site", "evcs", "electric vehicle"],
        ),
        (
            "11B-4",
            &["route", "path of travel", "walk", "ramp", "stair", "stairs", "elevator", "lift"],
        ),
        (
            "11B-6",
            &["toilet", "restroom", "lavatory", "shower", "bath", "urinal", "grab bar", "bathtub"],
        ),
        (
            "11B-7",
            &["sign", "tactile", "braille", "alarm", "communication", "assistive listening", "public address"],
        ),
        (
            "11B-9",
            &["counter", "work surface", "storage", "shelf", "bench", "drinking fountain", "fixed seating"],
        ),
    ];

    for (code, keywords) in families {
        if keywords.iter().any(|k| lower.contains(k)) {
            return code.to_string();
        }
    }
    UNASSIGNED_CATEGORY.to_string()
}

/// Tag question text with a difficulty tier and a subject category.
///
/// Pure, no side effects. An already-valid `existing_category` is kept.
pub fn tag(text: &str, existing_category: Option<&str>) -> (Difficulty, String) {
    let base = estimate_difficulty(text);
    let difficulty = if is_test_prep_candidate(text, base) {
        Difficulty::TestPrep
    } else {
        base
    };
    (difficulty, normalize_category(text, existing_category))
}
