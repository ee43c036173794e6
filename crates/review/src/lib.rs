//! casework-review: form versions and the record review state machine.
//!
//! A form version couples a published schema with an ordered list of
//! department-owned review steps. A record wraps one validated
//! submission and walks forward through those steps as reviewers accept
//! or refuse it, until it reaches a terminal state.
//!
//! Transitions take an explicit acting principal; authorization is
//! resolved through the [`AuthorizationOracle`] and department state
//! through the [`DepartmentDirectory`], never from ambient context. All
//! transition checks are all-or-nothing: a failed [`advance`] leaves the
//! record exactly as it was.

pub mod oracle;
pub mod record;
pub mod version;
pub mod workflow;

// ── Convenience re-exports: key types ────────────────────────────────

pub use oracle::{AuthorizationOracle, DepartmentDirectory};
pub use record::{Record, RecordError, RecordStatus};
pub use version::{now_rfc3339, FormVersion, ReviewStep, VersionError};
pub use workflow::{advance, Decision, StepOutcome, TransitionError};
