//! Submissions and the validator that checks them against a schema.
//!
//! A [`Submission`] is the literal, unvalidated user input: a flat map
//! from field path to raw answer string. Validity is established on
//! demand by [`validate`], never baked into the type; the only way to
//! obtain a [`ValidSubmission`] in code is to pass validation.
//!
//! The walk is depth-first from the root and threads mandatory-ness
//! down: a node is effectively mandatory only if every ancestor on its
//! path is. For a fixed container and answer map the result is fully
//! deterministic -- nodes are visited in index order and the first
//! failure wins.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::container::FieldContainer;
use crate::error::ValidationError;
use crate::field::{Field, FieldKind};
use crate::path::FieldPath;

/// Raw user input against one container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub container_id: String,
    pub answers: BTreeMap<FieldPath, String>,
}

impl Submission {
    pub fn new(
        container_id: impl Into<String>,
        answers: BTreeMap<FieldPath, String>,
    ) -> Submission {
        Submission {
            container_id: container_id.into(),
            answers,
        }
    }
}

/// A submission that has passed validation against its container.
///
/// Construction happens only through [`validate`]; rehydration from
/// storage (the serde impl) relies on the persistence adapter's contract
/// that saved values come back byte-identical.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidSubmission {
    container_id: String,
    answers: BTreeMap<FieldPath, String>,
}

impl ValidSubmission {
    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    pub fn answers(&self) -> &BTreeMap<FieldPath, String> {
        &self.answers
    }

    pub fn answer(&self, path: &FieldPath) -> Option<&str> {
        self.answers.get(path).map(String::as_str)
    }
}

/// Validate a submission against a container.
///
/// On success the raw answers are frozen into a [`ValidSubmission`]. On
/// failure the first relevant error is returned with the offending path;
/// the submission and container are untouched.
pub fn validate(
    container: &FieldContainer,
    submission: &Submission,
) -> Result<ValidSubmission, ValidationError> {
    if submission.container_id != container.id() {
        return Err(ValidationError::ContainerMismatch {
            expected: container.id().to_string(),
            got: submission.container_id.clone(),
        });
    }
    walk(
        container.root(),
        &FieldPath::root(),
        true,
        &submission.answers,
    )?;
    Ok(ValidSubmission {
        container_id: submission.container_id.clone(),
        answers: submission.answers.clone(),
    })
}

fn walk(
    field: &Field,
    path: &FieldPath,
    inherited: bool,
    answers: &BTreeMap<FieldPath, String>,
) -> Result<(), ValidationError> {
    let mandatory = inherited && field.mandatory();
    match field.kind() {
        FieldKind::Label => Ok(()),
        FieldKind::Input(constraint) => match answers.get(path) {
            None if mandatory => Err(ValidationError::MissingRequiredField {
                path: path.clone(),
            }),
            None => Ok(()),
            Some(raw) => constraint
                .parse(raw)
                .map(|_| ())
                .map_err(|reason| ValidationError::MalformedAnswer {
                    path: path.clone(),
                    reason,
                }),
        },
        FieldKind::Choice(options) => match answers.get(path) {
            None if mandatory => Err(ValidationError::MissingRequiredField {
                path: path.clone(),
            }),
            None => Ok(()),
            Some(raw) => {
                let invalid = || ValidationError::InvalidChoice {
                    path: path.clone(),
                    answer: raw.clone(),
                };
                // Same lexical discipline as path segments: plain decimal
                // digits only, no signs, no padding.
                if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid());
                }
                let index = raw.parse::<u32>().map_err(|_| invalid())?;
                let selected = options.get(&index).ok_or_else(invalid)?;
                walk(selected, &path.child(index), mandatory, answers)
            }
        },
        FieldKind::Group(slots) => {
            for (&index, slot) in slots {
                walk(slot, &path.child(index), mandatory, answers)?;
            }
            Ok(())
        }
        FieldKind::List { min, max, inner } => {
            // Elements below min inherit the list's mandatory-ness; the
            // rest are always optional. Answers at indices >= max are
            // never visited and therefore ignored.
            for index in 0..*max {
                walk(inner, &path.child(index), mandatory && index < *min, answers)?;
            }
            Ok(())
        }
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
