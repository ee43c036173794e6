//! casework-core: form schema and submission validation core.
//!
//! Provides the recursive field schema (label, input, choice, group, list),
//! the path addressing scheme used to reference any node in a schema tree,
//! the constraint-narrowing check used when a form specializes a template,
//! and the validator that checks a flat answer map against a schema.
//!
//! # Public API
//!
//! Key types are re-exported at the crate root for convenience:
//!
//! - [`Field`] / [`FieldKind`] -- one node of a schema tree
//! - [`InputConstraint`] -- lexical constraint on an input field's answer
//! - [`FieldPath`] -- sequence of indices locating a node in a tree
//! - [`FieldContainer`] -- an immutable, identified schema root
//! - [`Submission`] / [`ValidSubmission`] -- raw vs. validated answer maps
//! - [`validate()`] -- check a submission against a container
//! - [`check_specialization()`] / [`is_compatible_with()`] -- narrowing rules
//!
//! Everything here is a pure, synchronous computation over immutable
//! values. No I/O, no locking, no ambient state; persistence and
//! authorization live in sibling crates.

pub mod constraint;
pub mod container;
pub mod error;
pub mod field;
pub mod path;
pub mod submission;

// ── Convenience re-exports: key types ────────────────────────────────

pub use constraint::{AnswerValue, InputConstraint};
pub use container::FieldContainer;
pub use error::{FieldError, PathError, SpecializationError, ValidationError};
pub use field::{Field, FieldKind};
pub use path::FieldPath;
pub use submission::{Submission, ValidSubmission};

// ── Convenience re-exports: entry points ─────────────────────────────

pub use field::{check_specialization, is_compatible_with};
pub use submission::validate;
