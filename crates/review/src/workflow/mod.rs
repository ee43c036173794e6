//! The record review state machine.
//!
//! [`advance`] moves a record one step through its version's review
//! sequence based on a reviewer's decision. The transition either fully
//! commits the new state or leaves the prior state completely intact:
//! every precondition (terminal guard, version binding, department
//! state, authorization, reviewer-answer validation) is checked before
//! the record is touched, so there is no partial advancement and no
//! orphaned reviewer answers.
//!
//! Preconditions are checked in a fixed order so that a caller learns
//! nothing it is not entitled to: a terminal record answers the same way
//! to everyone, and an unauthorized principal is rejected before the
//! step's annotation schema is consulted.

use std::fmt;

use casework_core::{validate, Submission, ValidSubmission, ValidationError};

use crate::oracle::{AuthorizationOracle, DepartmentDirectory};
use crate::record::{Record, RecordStatus};
use crate::version::FormVersion;

// ──────────────────────────────────────────────
// Transition inputs and outputs
// ──────────────────────────────────────────────

/// A reviewer's decision at a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Refuse { reason: String },
}

/// Result of a committed transition.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    /// The step the decision was taken at.
    pub step_index: usize,
    /// The record's status after the transition.
    pub status: RecordStatus,
    /// Reviewer answers validated against the step's annotation schema,
    /// when the step declares one. Returned so the caller can persist
    /// them atomically with the status change.
    pub reviewer_answers: Option<ValidSubmission>,
}

/// Review-transition failures. Every variant leaves the record untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionError {
    /// The record is already accepted or refused.
    RecordAlreadyTerminal {
        record_id: String,
        status: RecordStatus,
    },
    /// The record was opened against a different version.
    VersionMismatch {
        record_id: String,
        expected: String,
        got: String,
    },
    /// The record points past the version's step list. Indicates a
    /// corrupted record row, not a caller mistake.
    StepOutOfRange {
        record_id: String,
        step_index: usize,
    },
    /// The step's department is not currently open for review work.
    DepartmentClosed {
        step_index: usize,
        department: String,
    },
    /// The principal may not act for the step's department.
    Unauthorized {
        principal: String,
        step_index: usize,
        department: String,
    },
    /// The step requires reviewer answers and none were supplied.
    MissingReviewAnswers { step_index: usize },
    /// Supplied reviewer answers failed validation against the step's
    /// annotation schema.
    MalformedReviewAnswer {
        step_index: usize,
        error: ValidationError,
    },
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionError::RecordAlreadyTerminal { record_id, status } => {
                write!(f, "record '{}' is already {}", record_id, status)
            }
            TransitionError::VersionMismatch {
                record_id,
                expected,
                got,
            } => {
                write!(
                    f,
                    "record '{}' is bound to version '{}', not '{}'",
                    record_id, expected, got
                )
            }
            TransitionError::StepOutOfRange {
                record_id,
                step_index,
            } => {
                write!(
                    f,
                    "record '{}' is pending at step {} past the version's step list",
                    record_id, step_index
                )
            }
            TransitionError::DepartmentClosed {
                step_index,
                department,
            } => {
                write!(
                    f,
                    "department '{}' for step {} is not open",
                    department, step_index
                )
            }
            TransitionError::Unauthorized {
                principal,
                step_index,
                department,
            } => {
                write!(
                    f,
                    "principal '{}' may not act for department '{}' at step {}",
                    principal, department, step_index
                )
            }
            TransitionError::MissingReviewAnswers { step_index } => {
                write!(f, "step {} requires reviewer answers", step_index)
            }
            TransitionError::MalformedReviewAnswer { step_index, error } => {
                write!(f, "reviewer answers for step {} invalid: {}", step_index, error)
            }
        }
    }
}

impl std::error::Error for TransitionError {}

// ──────────────────────────────────────────────
// The transition
// ──────────────────────────────────────────────

/// Advance a record by one decision.
///
/// On `Accept` the record moves to the next step, or to `Accepted` when
/// the decided step was the last one. On `Refuse` the record terminates
/// as `Refused` at the current step. Reviewer answers are validated
/// against the step's annotation schema when one is declared; a step
/// without one ignores whatever answers were supplied.
///
/// Callers are responsible for serializing concurrent calls on the same
/// record; the committed revision counter is made for wrapping this in
/// an optimistic compare-and-swap loop.
pub fn advance(
    record: &mut Record,
    version: &FormVersion,
    principal: &str,
    decision: Decision,
    reviewer_answers: Option<&Submission>,
    directory: &dyn DepartmentDirectory,
    oracle: &dyn AuthorizationOracle,
) -> Result<StepOutcome, TransitionError> {
    let step_index = match record.status() {
        RecordStatus::Pending { step_index } => *step_index,
        terminal => {
            return Err(TransitionError::RecordAlreadyTerminal {
                record_id: record.id().to_string(),
                status: terminal.clone(),
            })
        }
    };
    if record.version_id() != version.id() {
        return Err(TransitionError::VersionMismatch {
            record_id: record.id().to_string(),
            expected: record.version_id().to_string(),
            got: version.id().to_string(),
        });
    }
    let step = version
        .step(step_index)
        .ok_or_else(|| TransitionError::StepOutOfRange {
            record_id: record.id().to_string(),
            step_index,
        })?;

    if !directory.is_open(&step.department) {
        return Err(TransitionError::DepartmentClosed {
            step_index,
            department: step.department.clone(),
        });
    }
    if !oracle.allows(principal, &step.department) {
        return Err(TransitionError::Unauthorized {
            principal: principal.to_string(),
            step_index,
            department: step.department.clone(),
        });
    }

    let validated_answers = match &step.annotation_schema {
        Some(schema) => {
            let answers = reviewer_answers
                .ok_or(TransitionError::MissingReviewAnswers { step_index })?;
            let valid = validate(schema, answers).map_err(|error| {
                TransitionError::MalformedReviewAnswer { step_index, error }
            })?;
            Some(valid)
        }
        None => None,
    };

    let status = match decision {
        Decision::Accept => {
            let next = step_index + 1;
            if next == version.steps().len() {
                RecordStatus::Accepted
            } else {
                RecordStatus::Pending { step_index: next }
            }
        }
        Decision::Refuse { reason } => RecordStatus::Refused { step_index, reason },
    };

    record.commit(status.clone());
    Ok(StepOutcome {
        step_index,
        status,
        reviewer_answers: validated_answers,
    })
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests;
