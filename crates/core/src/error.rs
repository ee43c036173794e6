//! Error types for schema construction, path resolution, specialization,
//! and submission validation.
//!
//! Construction errors are fail-fast: a rejected constructor never yields
//! a partially built tree. Validation errors are ordinary recoverable
//! values and always carry the offending path so a caller can point at
//! the exact field.

use std::fmt;

use crate::path::FieldPath;

// ──────────────────────────────────────────────
// Construction
// ──────────────────────────────────────────────

/// A malformed schema definition, rejected at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    InvalidDefinition { reason: String },
}

impl FieldError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        FieldError::InvalidDefinition {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::InvalidDefinition { reason } => {
                write!(f, "invalid field definition: {}", reason)
            }
        }
    }
}

impl std::error::Error for FieldError {}

// ──────────────────────────────────────────────
// Path resolution and decoding
// ──────────────────────────────────────────────

/// Errors from resolving or decoding a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The path does not lead to a node in the given container.
    NotFound { path: FieldPath },
    /// The textual form could not be decoded into a path.
    Malformed { text: String, reason: String },
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::NotFound { path } => {
                write!(f, "no field at path '{}'", path)
            }
            PathError::Malformed { text, reason } => {
                write!(f, "malformed field path '{}': {}", text, reason)
            }
        }
    }
}

impl std::error::Error for PathError {}

// ──────────────────────────────────────────────
// Specialization
// ──────────────────────────────────────────────

/// A field fails to narrow its general counterpart.
///
/// Carries the path to the offending node plus a description of what the
/// general field requires and what the specialized field declared, so the
/// caller can build a precise message for the form author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecializationError {
    pub path: FieldPath,
    pub expected: String,
    pub actual: String,
}

impl fmt::Display for SpecializationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "incompatible specialization at path '{}': expected {}, got {}",
            self.path, self.expected, self.actual
        )
    }
}

impl std::error::Error for SpecializationError {}

// ──────────────────────────────────────────────
// Submission validation
// ──────────────────────────────────────────────

/// Submission validation failures, surfaced verbatim to the end user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A mandatory field has no answer at its path.
    MissingRequiredField { path: FieldPath },
    /// An answer is present but does not satisfy the input constraint.
    MalformedAnswer { path: FieldPath, reason: String },
    /// A choice answer is not one of the declared option indices.
    InvalidChoice { path: FieldPath, answer: String },
    /// The submission references a different container than the one
    /// it is being validated against.
    ContainerMismatch { expected: String, got: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingRequiredField { path } => {
                write!(f, "missing required answer at path '{}'", path)
            }
            ValidationError::MalformedAnswer { path, reason } => {
                write!(f, "malformed answer at path '{}': {}", path, reason)
            }
            ValidationError::InvalidChoice { path, answer } => {
                write!(
                    f,
                    "answer '{}' at path '{}' is not a valid option index",
                    answer, path
                )
            }
            ValidationError::ContainerMismatch { expected, got } => {
                write!(
                    f,
                    "submission targets container '{}', validated against '{}'",
                    got, expected
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}
