//! Records: one validated submission plus its review position.
//!
//! A record is created from exactly one validated submission and is
//! never re-parented. Its position only moves forward or terminates; the
//! revision counter supports optimistic-concurrency persistence (re-read,
//! recompute, compare-and-swap on the revision).

use std::fmt;

use serde::{Deserialize, Serialize};

use casework_core::ValidSubmission;

use crate::version::FormVersion;

/// Review lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordStatus {
    /// Waiting on the step at `step_index` in the version's sequence.
    Pending { step_index: usize },
    /// Ran past the last step. Terminal.
    Accepted,
    /// Refused at a step. Terminal.
    Refused { step_index: usize, reason: String },
}

impl RecordStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RecordStatus::Pending { .. })
    }

    /// Lowercase status kind, used as a storage filter key.
    pub fn kind_name(&self) -> &'static str {
        match self {
            RecordStatus::Pending { .. } => "pending",
            RecordStatus::Accepted => "accepted",
            RecordStatus::Refused { .. } => "refused",
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordStatus::Pending { step_index } => write!(f, "pending at step {}", step_index),
            RecordStatus::Accepted => write!(f, "accepted"),
            RecordStatus::Refused { step_index, reason } => {
                write!(f, "refused at step {}: {}", step_index, reason)
            }
        }
    }
}

/// Errors from opening a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// The submission was validated against a different container than
    /// the version's schema.
    SchemaMismatch { expected: String, got: String },
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::SchemaMismatch { expected, got } => {
                write!(
                    f,
                    "submission was validated against container '{}', version uses '{}'",
                    got, expected
                )
            }
        }
    }
}

impl std::error::Error for RecordError {}

/// A submission under review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    id: String,
    version_id: String,
    submission: ValidSubmission,
    status: RecordStatus,
    /// Bumped on every committed transition; the persistence layer keys
    /// its compare-and-swap on this.
    revision: i64,
}

impl Record {
    /// Open a record for a validated submission against a version.
    ///
    /// A version with no review steps accepts the record immediately;
    /// otherwise the record starts pending at the first step.
    pub fn open(
        id: impl Into<String>,
        submission: ValidSubmission,
        version: &FormVersion,
    ) -> Result<Record, RecordError> {
        if submission.container_id() != version.schema().id() {
            return Err(RecordError::SchemaMismatch {
                expected: version.schema().id().to_string(),
                got: submission.container_id().to_string(),
            });
        }
        let status = if version.steps().is_empty() {
            RecordStatus::Accepted
        } else {
            RecordStatus::Pending { step_index: 0 }
        };
        Ok(Record {
            id: id.into(),
            version_id: version.id().to_string(),
            submission,
            status,
            revision: 0,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn version_id(&self) -> &str {
        &self.version_id
    }

    pub fn submission(&self) -> &ValidSubmission {
        &self.submission
    }

    pub fn status(&self) -> &RecordStatus {
        &self.status
    }

    pub fn revision(&self) -> i64 {
        self.revision
    }

    /// Commit a transition result. Only the workflow calls this, after
    /// every precondition has passed.
    pub(crate) fn commit(&mut self, status: RecordStatus) {
        self.status = status;
        self.revision += 1;
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
