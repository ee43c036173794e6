//! Field containers: immutable, identified schema roots.
//!
//! A container is created once and never mutated in place. Editing a
//! form's schema always produces a new container (and a new form version
//! referencing it), so submissions stored against prior containers stay
//! interpretable forever.

use serde::{Deserialize, Serialize};

use crate::error::{FieldError, PathError};
use crate::field::Field;
use crate::path::FieldPath;

/// An immutable (identifier, root field) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawContainer")]
pub struct FieldContainer {
    id: String,
    root: Field,
}

impl FieldContainer {
    pub fn new(id: impl Into<String>, root: Field) -> Result<FieldContainer, FieldError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(FieldError::invalid("container identifier is empty"));
        }
        Ok(FieldContainer { id, root })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn root(&self) -> &Field {
        &self.root
    }

    /// Resolve a path to the unique node it addresses.
    ///
    /// The empty path resolves to the root. Descent follows
    /// [`Field::child`]; the first segment that has no child fails the
    /// whole resolution with the requested path in the error.
    pub fn resolve(&self, path: &FieldPath) -> Result<&Field, PathError> {
        let mut node = &self.root;
        for &index in path.segments() {
            node = node.child(index).ok_or_else(|| PathError::NotFound {
                path: path.clone(),
            })?;
        }
        Ok(node)
    }
}

#[derive(Deserialize)]
struct RawContainer {
    id: String,
    root: Field,
}

impl TryFrom<RawContainer> for FieldContainer {
    type Error = FieldError;

    fn try_from(raw: RawContainer) -> Result<FieldContainer, FieldError> {
        FieldContainer::new(raw.id, raw.root)
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
