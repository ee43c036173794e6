use std::collections::BTreeMap;

use casework_core::{
    validate, Field, FieldContainer, FieldPath, InputConstraint, Submission, ValidSubmission,
};

use super::*;
use crate::record::Record;
use crate::version::ReviewStep;

// ──────────────────────────────────────
// Fixtures
// ──────────────────────────────────────

/// Directory where every department exists; closed ones are listed.
struct Directory {
    closed: Vec<&'static str>,
}

impl Directory {
    fn all_open() -> Directory {
        Directory { closed: vec![] }
    }
}

impl DepartmentDirectory for Directory {
    fn exists(&self, _department: &str) -> bool {
        true
    }
    fn is_open(&self, department: &str) -> bool {
        !self.closed.contains(&department)
    }
}

/// Oracle allowing exactly the listed (principal, department) pairs,
/// plus anything for the elevated principal "admin".
struct Oracle {
    allowed: Vec<(&'static str, &'static str)>,
}

impl AuthorizationOracle for Oracle {
    fn allows(&self, principal: &str, department: &str) -> bool {
        principal == "admin"
            || self
                .allowed
                .iter()
                .any(|(p, d)| *p == principal && *d == department)
    }
}

fn default_oracle() -> Oracle {
    Oracle {
        allowed: vec![("ines", "intake"), ("zara", "zoning")],
    }
}

fn schema() -> FieldContainer {
    let root = Field::label("note", "Note").unwrap();
    FieldContainer::new("schema-1", root).unwrap()
}

fn empty_submission() -> ValidSubmission {
    validate(&schema(), &Submission::new("schema-1", BTreeMap::new())).unwrap()
}

fn step(id: &str, order: u32, department: &str) -> ReviewStep {
    ReviewStep {
        id: id.to_string(),
        order,
        department: department.to_string(),
        title: format!("Step {}", id),
        annotation_schema: None,
    }
}

/// Annotation schema: one mandatory comment input.
fn annotation_schema() -> FieldContainer {
    let comment = Field::input(
        "comment",
        "Comment",
        true,
        InputConstraint::Text { max_length: 200 },
    )
    .unwrap();
    FieldContainer::new("intake-annotations", comment).unwrap()
}

fn two_step_version() -> FormVersion {
    FormVersion::publish(
        "v1",
        "Permit",
        "2024-05-01T12:00:00Z",
        schema(),
        vec![step("intake", 10, "intake"), step("zoning", 20, "zoning")],
        &Directory::all_open(),
    )
    .unwrap()
}

fn open_record(version: &FormVersion) -> Record {
    Record::open("r1", empty_submission(), version).unwrap()
}

// ──────────────────────────────────────
// Walks to the terminal states
// ──────────────────────────────────────

#[test]
fn two_accepts_walk_to_accepted() {
    let version = two_step_version();
    let mut record = open_record(&version);
    assert_eq!(record.status(), &RecordStatus::Pending { step_index: 0 });

    let outcome = advance(
        &mut record,
        &version,
        "ines",
        Decision::Accept,
        None,
        &Directory::all_open(),
        &default_oracle(),
    )
    .unwrap();
    assert_eq!(outcome.status, RecordStatus::Pending { step_index: 1 });
    assert_eq!(record.revision(), 1);

    let outcome = advance(
        &mut record,
        &version,
        "zara",
        Decision::Accept,
        None,
        &Directory::all_open(),
        &default_oracle(),
    )
    .unwrap();
    assert_eq!(outcome.status, RecordStatus::Accepted);
    assert_eq!(record.status(), &RecordStatus::Accepted);
    assert_eq!(record.revision(), 2);
}

#[test]
fn refuse_terminates_at_current_step() {
    let version = two_step_version();
    let mut record = open_record(&version);
    let outcome = advance(
        &mut record,
        &version,
        "ines",
        Decision::Refuse {
            reason: "bad".to_string(),
        },
        None,
        &Directory::all_open(),
        &default_oracle(),
    )
    .unwrap();
    let refused = RecordStatus::Refused {
        step_index: 0,
        reason: "bad".to_string(),
    };
    assert_eq!(outcome.status, refused);
    assert_eq!(record.status(), &refused);
}

#[test]
fn terminal_record_rejects_any_further_advance() {
    let version = two_step_version();
    let mut record = open_record(&version);
    advance(
        &mut record,
        &version,
        "ines",
        Decision::Refuse {
            reason: "bad".to_string(),
        },
        None,
        &Directory::all_open(),
        &default_oracle(),
    )
    .unwrap();
    let before = record.clone();

    let result = advance(
        &mut record,
        &version,
        "admin",
        Decision::Accept,
        None,
        &Directory::all_open(),
        &default_oracle(),
    );
    assert!(matches!(
        result,
        Err(TransitionError::RecordAlreadyTerminal { .. })
    ));
    assert_eq!(record, before);
}

// ──────────────────────────────────────
// Authorization
// ──────────────────────────────────────

#[test]
fn wrong_department_principal_is_rejected() {
    let version = two_step_version();
    let mut record = open_record(&version);
    let before = record.clone();
    // zara reviews zoning, not intake.
    let result = advance(
        &mut record,
        &version,
        "zara",
        Decision::Accept,
        None,
        &Directory::all_open(),
        &default_oracle(),
    );
    match result {
        Err(TransitionError::Unauthorized {
            principal,
            step_index,
            department,
        }) => {
            assert_eq!(principal, "zara");
            assert_eq!(step_index, 0);
            assert_eq!(department, "intake");
        }
        other => panic!("expected Unauthorized, got {:?}", other),
    }
    assert_eq!(record, before);
}

#[test]
fn elevated_principal_may_act_at_any_step() {
    let version = two_step_version();
    let mut record = open_record(&version);
    for _ in 0..2 {
        advance(
            &mut record,
            &version,
            "admin",
            Decision::Accept,
            None,
            &Directory::all_open(),
            &default_oracle(),
        )
        .unwrap();
    }
    assert_eq!(record.status(), &RecordStatus::Accepted);
}

#[test]
fn closed_department_blocks_the_step() {
    let version = two_step_version();
    let mut record = open_record(&version);
    let result = advance(
        &mut record,
        &version,
        "ines",
        Decision::Accept,
        None,
        &Directory { closed: vec!["intake"] },
        &default_oracle(),
    );
    assert!(matches!(
        result,
        Err(TransitionError::DepartmentClosed { .. })
    ));
    assert_eq!(record.status(), &RecordStatus::Pending { step_index: 0 });
}

#[test]
fn foreign_version_is_rejected() {
    let version = two_step_version();
    let other = FormVersion::publish(
        "v2",
        "Permit",
        "2024-06-01T12:00:00Z",
        schema(),
        vec![step("intake", 10, "intake")],
        &Directory::all_open(),
    )
    .unwrap();
    let mut record = open_record(&version);
    assert!(matches!(
        advance(
            &mut record,
            &other,
            "ines",
            Decision::Accept,
            None,
            &Directory::all_open(),
            &default_oracle(),
        ),
        Err(TransitionError::VersionMismatch { .. })
    ));
}

// ──────────────────────────────────────
// Reviewer-entered annotations
// ──────────────────────────────────────

fn annotated_version() -> FormVersion {
    let mut intake = step("intake", 10, "intake");
    intake.annotation_schema = Some(annotation_schema());
    FormVersion::publish(
        "v1",
        "Permit",
        "2024-05-01T12:00:00Z",
        schema(),
        vec![intake, step("zoning", 20, "zoning")],
        &Directory::all_open(),
    )
    .unwrap()
}

fn comment(text: &str) -> Submission {
    Submission::new(
        "intake-annotations",
        [(FieldPath::root(), text.to_string())].into_iter().collect(),
    )
}

#[test]
fn annotated_step_requires_answers() {
    let version = annotated_version();
    let mut record = open_record(&version);
    let result = advance(
        &mut record,
        &version,
        "ines",
        Decision::Accept,
        None,
        &Directory::all_open(),
        &default_oracle(),
    );
    assert!(matches!(
        result,
        Err(TransitionError::MissingReviewAnswers { step_index: 0 })
    ));
    assert_eq!(record.status(), &RecordStatus::Pending { step_index: 0 });
}

#[test]
fn valid_annotations_are_returned_with_the_outcome() {
    let version = annotated_version();
    let mut record = open_record(&version);
    let outcome = advance(
        &mut record,
        &version,
        "ines",
        Decision::Accept,
        Some(&comment("all documents present")),
        &Directory::all_open(),
        &default_oracle(),
    )
    .unwrap();
    let answers = outcome.reviewer_answers.unwrap();
    assert_eq!(answers.answer(&FieldPath::root()), Some("all documents present"));
    assert_eq!(record.status(), &RecordStatus::Pending { step_index: 1 });
}

#[test]
fn malformed_annotations_abort_the_transition() {
    let version = annotated_version();
    let mut record = open_record(&version);
    let before = record.clone();
    let long = "x".repeat(300);
    let result = advance(
        &mut record,
        &version,
        "ines",
        Decision::Accept,
        Some(&comment(&long)),
        &Directory::all_open(),
        &default_oracle(),
    );
    assert!(matches!(
        result,
        Err(TransitionError::MalformedReviewAnswer { step_index: 0, .. })
    ));
    assert_eq!(record, before);
}

#[test]
fn step_without_annotation_schema_ignores_answers() {
    let version = two_step_version();
    let mut record = open_record(&version);
    let outcome = advance(
        &mut record,
        &version,
        "ines",
        Decision::Accept,
        Some(&comment("ignored")),
        &Directory::all_open(),
        &default_oracle(),
    )
    .unwrap();
    assert!(outcome.reviewer_answers.is_none());
}
