//! Form versions: an immutable schema plus an ordered review sequence.
//!
//! A version is published once and never edited; changing a form's
//! schema produces a new version, and records stay bound to the version
//! they were created against for their entire lifetime.

use std::fmt;

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use casework_core::FieldContainer;

use crate::oracle::DepartmentDirectory;

/// One department-owned checkpoint in a version's review sequence.
///
/// `annotation_schema`, when present, is the schema for reviewer-entered
/// data at this step; a transition through the step must then carry
/// answers that validate against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewStep {
    pub id: String,
    /// Position key: steps are totally ordered by `order` and the
    /// workflow always advances to the next-higher order, never by
    /// identifier lookup.
    pub order: u32,
    pub department: String,
    pub title: String,
    pub annotation_schema: Option<FieldContainer>,
}

/// Errors from publishing a form version.
#[derive(Debug, Clone, PartialEq)]
pub enum VersionError {
    InvalidDefinition { reason: String },
    UnknownDepartment { step_id: String, department: String },
}

impl fmt::Display for VersionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionError::InvalidDefinition { reason } => {
                write!(f, "invalid form version: {}", reason)
            }
            VersionError::UnknownDepartment {
                step_id,
                department,
            } => {
                write!(
                    f,
                    "review step '{}' references unknown department '{}'",
                    step_id, department
                )
            }
        }
    }
}

impl std::error::Error for VersionError {}

/// An immutable published form version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawVersion")]
pub struct FormVersion {
    id: String,
    /// RFC 3339 publication timestamp.
    created_at: String,
    title: String,
    schema: FieldContainer,
    steps: Vec<ReviewStep>,
}

impl FormVersion {
    /// Publish a new version.
    ///
    /// Steps are sorted by `order`; duplicate orders are rejected because
    /// the positional traversal must be unambiguous. Every step's
    /// department is resolved against the directory.
    pub fn publish(
        id: impl Into<String>,
        title: impl Into<String>,
        created_at: impl Into<String>,
        schema: FieldContainer,
        steps: Vec<ReviewStep>,
        directory: &dyn DepartmentDirectory,
    ) -> Result<FormVersion, VersionError> {
        for step in &steps {
            if !directory.exists(&step.department) {
                return Err(VersionError::UnknownDepartment {
                    step_id: step.id.clone(),
                    department: step.department.clone(),
                });
            }
        }
        FormVersion::assemble(id.into(), title.into(), created_at.into(), schema, steps)
    }

    /// Structural construction shared by `publish` and deserialization.
    /// Directory resolution happens only at publish time; a version
    /// rehydrated from storage was already resolved once.
    fn assemble(
        id: String,
        title: String,
        created_at: String,
        schema: FieldContainer,
        mut steps: Vec<ReviewStep>,
    ) -> Result<FormVersion, VersionError> {
        let invalid = |reason: String| VersionError::InvalidDefinition { reason };
        if id.trim().is_empty() {
            return Err(invalid("version identifier is empty".to_string()));
        }
        if title.trim().is_empty() {
            return Err(invalid("version title is empty".to_string()));
        }
        let mut seen_ids = std::collections::BTreeSet::new();
        for step in &steps {
            if step.id.trim().is_empty() {
                return Err(invalid("review step identifier is empty".to_string()));
            }
            if step.department.trim().is_empty() {
                return Err(invalid(format!(
                    "review step '{}' has an empty department",
                    step.id
                )));
            }
            if !seen_ids.insert(step.id.as_str()) {
                return Err(invalid(format!(
                    "duplicate review step identifier '{}'",
                    step.id
                )));
            }
        }
        steps.sort_by_key(|s| s.order);
        if steps.windows(2).any(|w| w[0].order == w[1].order) {
            return Err(invalid("review steps share an order value".to_string()));
        }
        Ok(FormVersion {
            id,
            created_at,
            title,
            schema,
            steps,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn schema(&self) -> &FieldContainer {
        &self.schema
    }

    /// The review sequence, sorted by `order`.
    pub fn steps(&self) -> &[ReviewStep] {
        &self.steps
    }

    /// The step at a position in the sorted sequence.
    pub fn step(&self, index: usize) -> Option<&ReviewStep> {
        self.steps.get(index)
    }
}

#[derive(Deserialize)]
struct RawVersion {
    id: String,
    created_at: String,
    title: String,
    schema: FieldContainer,
    steps: Vec<ReviewStep>,
}

impl TryFrom<RawVersion> for FormVersion {
    type Error = VersionError;

    fn try_from(raw: RawVersion) -> Result<FormVersion, VersionError> {
        FormVersion::assemble(raw.id, raw.title, raw.created_at, raw.schema, raw.steps)
    }
}

/// The current instant as an RFC 3339 string, for `created_at` fields.
pub fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string())
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
