//! CLI integration tests using assert_cmd.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use chrono::{TimeZone, Utc};
use predicates::prelude::*;
use tempfile::TempDir;

use exambank_core::model::{
    AttemptMode, ChoiceLabel, Difficulty, DomainResult, ExamAttempt, ExamType, Provenance,
    Question, QuestionKind, UNASSIGNED_CATEGORY,
};
use exambank_core::store::save_bank;

fn exambank() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("exambank").unwrap()
}

fn question(id: &str, kind: QuestionKind, difficulty: Difficulty, text: &str) -> Question {
    Question {
        id: id.into(),
        text: text.into(),
        options: [
            "Choice A".into(),
            "Choice B".into(),
            "Choice C".into(),
            "Choice D".into(),
        ],
        correct: ChoiceLabel::B,
        explanation: String::new(),
        difficulty,
        category: UNASSIGNED_CATEGORY.into(),
        kind,
        domain: None,
        topic: None,
        reference_document: None,
        reference_section: None,
        source: Provenance::Authored,
        created_at_utc: None,
    }
}

/// Write bank fixtures plus a config that points at them, using the mock
/// drafter so no network is needed.
fn write_fixtures(dir: &Path) -> PathBuf {
    let open_bank = dir.join("open.json");
    let generated_bank = dir.join("generated_open.json");
    let closed_bank = dir.join("closed.json");
    let generated_closed = dir.join("generated_closed.json");
    let archive_dir = dir.join("archives");

    save_bank(
        &open_bank,
        &[
            question(
                "ob-1",
                QuestionKind::Open,
                Difficulty::Easy,
                "What is the minimum clear width of an accessible route?",
            ),
            question(
                "ob-2",
                QuestionKind::Open,
                Difficulty::Medium,
                "Which chapter covers plumbing elements and facilities?",
            ),
            question(
                "ob-3",
                QuestionKind::Open,
                Difficulty::Hard,
                "A two-story office building undergoes a tenant improvement; which scoping provisions apply to the altered area?",
            ),
        ],
    )
    .unwrap();
    save_bank(
        &closed_bank,
        &[
            question(
                "cb-1",
                QuestionKind::Closed,
                Difficulty::TestPrep,
                "Which agency enforces the federal accessibility standards?",
            ),
            question(
                "cb-2",
                QuestionKind::Closed,
                Difficulty::TestPrep,
                "What does CBC Chapter 11B scope?",
            ),
        ],
    )
    .unwrap();

    let config_path = dir.join("exambank.toml");
    std::fs::write(
        &config_path,
        format!(
            r#"
default_drafter = "mock"
authored_open_bank = {open_bank:?}
generated_open_bank = {generated_bank:?}
authored_closed_bank = {closed_bank:?}
generated_closed_bank = {generated_closed:?}
archive_dir = {archive_dir:?}

[drafters.mock]
type = "mock"
"#
        ),
    )
    .unwrap();
    config_path
}

#[test]
fn compose_open_exam() {
    let dir = TempDir::new().unwrap();
    let config = write_fixtures(dir.path());

    exambank()
        .arg("compose")
        .arg("--mode")
        .arg("open")
        .arg("--count")
        .arg("2")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"effective_count\": 2"))
        .stdout(predicate::str::contains("ob-1"));
}

#[test]
fn compose_strict_shortfall_fails() {
    let dir = TempDir::new().unwrap();
    let config = write_fixtures(dir.path());

    exambank()
        .arg("compose")
        .arg("--mode")
        .arg("open")
        .arg("--count")
        .arg("10")
        .arg("--difficulty")
        .arg("hard")
        .arg("--strict")
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not enough questions"));
}

#[test]
fn compose_mixed_includes_both_kinds() {
    let dir = TempDir::new().unwrap();
    let config = write_fixtures(dir.path());

    exambank()
        .arg("compose")
        .arg("--mode")
        .arg("mixed")
        .arg("--count")
        .arg("4")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"kind\": \"open\""))
        .stdout(predicate::str::contains("\"kind\": \"closed\""));
}

#[test]
fn grade_answers_file() {
    let dir = TempDir::new().unwrap();
    let config = write_fixtures(dir.path());

    let answers = serde_json::json!([
        {"question_id": "ob-1", "selected": "B"},
        {"question_id": "ob-2", "selected": "C"}
    ]);
    let answers_path = dir.path().join("answers.json");
    std::fs::write(&answers_path, answers.to_string()).unwrap();

    exambank()
        .arg("grade")
        .arg("--mode")
        .arg("open")
        .arg("--answers")
        .arg(&answers_path)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"correct_count\": 1"))
        .stdout(predicate::str::contains("\"score_percent\": 50.0"));
}

#[test]
fn proficiency_over_attempt_history() {
    let dir = TempDir::new().unwrap();

    let attempt = |day: u32, correct: i32| ExamAttempt {
        exam_type: ExamType::ClosedBook,
        mode: AttemptMode::TestPrep,
        taken_at: Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap(),
        total_questions: 10,
        total_correct: correct,
        domains: vec![DomainResult {
            domain_code: "cbc_scoping".into(),
            questions_in_domain: 10,
            correct_in_domain: correct,
        }],
    };
    let attempts = vec![attempt(1, 6), attempt(2, 8), attempt(3, 10)];
    let attempts_path = dir.path().join("attempts.json");
    std::fs::write(&attempts_path, serde_json::to_string(&attempts).unwrap()).unwrap();

    exambank()
        .arg("proficiency")
        .arg("--exam-type")
        .arg("closed-book")
        .arg("--attempts")
        .arg(&attempts_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Proficiency (closed_book):"))
        .stdout(predicate::str::contains("N/A").not());
}

#[test]
fn proficiency_without_test_prep_attempts_is_na() {
    let dir = TempDir::new().unwrap();

    let attempts = vec![ExamAttempt {
        exam_type: ExamType::ClosedBook,
        mode: AttemptMode::OfficialLike,
        taken_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
        total_questions: 10,
        total_correct: 9,
        domains: vec![],
    }];
    let attempts_path = dir.path().join("attempts.json");
    std::fs::write(&attempts_path, serde_json::to_string(&attempts).unwrap()).unwrap();

    exambank()
        .arg("proficiency")
        .arg("--exam-type")
        .arg("closed-book")
        .arg("--attempts")
        .arg(&attempts_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("N/A"));
}

#[test]
fn generate_with_mock_drafter() {
    let dir = TempDir::new().unwrap();
    let config = write_fixtures(dir.path());

    exambank()
        .arg("generate")
        .arg("--exam-type")
        .arg("open-book")
        .arg("--difficulty")
        .arg("hard")
        .arg("--topic")
        .arg("Ramps")
        .arg("--count")
        .arg("2")
        .arg("--seed")
        .arg("7")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated 2 of 2"))
        .stdout(predicate::str::contains("gen-ob-000001"))
        .stdout(predicate::str::contains("Archived batch to"));

    assert!(dir.path().join("generated_open.json").exists());
    assert!(dir.path().join("archives").join("open_book").exists());
}

#[test]
fn generate_rejects_mixed_exam_type() {
    let dir = TempDir::new().unwrap();
    let config = write_fixtures(dir.path());

    exambank()
        .arg("generate")
        .arg("--exam-type")
        .arg("mixed")
        .arg("--topic")
        .arg("Anything")
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no generated pool"));
}

#[test]
fn tag_reports_changes_without_write() {
    let dir = TempDir::new().unwrap();
    let config = write_fixtures(dir.path());
    let _ = config;

    let bank_path = dir.path().join("open.json");
    let before = std::fs::read_to_string(&bank_path).unwrap();

    exambank()
        .arg("tag")
        .arg("--bank")
        .arg(&bank_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("re-tagged"));

    // Without --write the bank file is untouched.
    assert_eq!(std::fs::read_to_string(&bank_path).unwrap(), before);
}

#[test]
fn stats_summarizes_banks() {
    let dir = TempDir::new().unwrap();
    let config = write_fixtures(dir.path());

    exambank()
        .arg("stats")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("5 question(s) total"));
}

#[test]
fn missing_bank_is_an_error() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("exambank.toml");
    std::fs::write(
        &config_path,
        format!(
            "authored_open_bank = {:?}\n",
            dir.path().join("missing.json")
        ),
    )
    .unwrap();

    exambank()
        .arg("stats")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn help_output() {
    exambank()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Practice-exam generation and scoring"));
}

#[test]
fn version_output() {
    exambank()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("exambank"));
}
