//! Path addressing for schema trees.
//!
//! A [`FieldPath`] is a sequence of non-negative indices identifying one
//! node in a field tree: descend through a choice by the chosen option
//! index, through a group by the slot index, and through a list by the
//! element's position. The empty path is the root.
//!
//! Paths are the sole addressing mechanism used by stored answers, review
//! annotations, and search filters, so they carry a single canonical
//! textual form: indices joined by `:`. Encoding and decoding round-trip
//! exactly; decoding is strict about what a segment may contain.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::PathError;

/// Separator between segments in the canonical textual form.
pub const PATH_SEPARATOR: char = ':';

/// A path from a tree's root to one of its nodes.
///
/// Equality is structural (segment-sequence equality). Ordering is
/// lexicographic over segments, which makes path-keyed `BTreeMap`s
/// iterate in depth-first document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath(Vec<u32>);

impl FieldPath {
    /// The empty path, denoting the container root.
    pub fn root() -> Self {
        FieldPath(Vec::new())
    }

    pub fn new(segments: Vec<u32>) -> Self {
        FieldPath(segments)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[u32] {
        &self.0
    }

    /// The path of this node's child at `index`.
    pub fn child(&self, index: u32) -> FieldPath {
        let mut segments = self.0.clone();
        segments.push(index);
        FieldPath(segments)
    }

    /// The parent path, or `None` for the root.
    pub fn parent(&self) -> Option<FieldPath> {
        if self.0.is_empty() {
            None
        } else {
            Some(FieldPath(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Encode to the canonical textual form. The root encodes as `""`.
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Decode the canonical textual form.
    ///
    /// Rejects empty segments (`"0::1"`), signs (`"+1"`, `"-1"`), and
    /// anything else that is not a plain decimal index.
    pub fn decode(text: &str) -> Result<Self, PathError> {
        text.parse()
    }
}

impl From<Vec<u32>> for FieldPath {
    fn from(segments: Vec<u32>) -> Self {
        FieldPath(segments)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in &self.0 {
            if !first {
                write!(f, "{}", PATH_SEPARATOR)?;
            }
            write!(f, "{}", segment)?;
            first = false;
        }
        Ok(())
    }
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, PathError> {
        if s.is_empty() {
            return Ok(FieldPath::root());
        }
        let malformed = |reason: &str| PathError::Malformed {
            text: s.to_string(),
            reason: reason.to_string(),
        };
        let mut segments = Vec::new();
        for part in s.split(PATH_SEPARATOR) {
            if part.is_empty() {
                return Err(malformed("empty segment"));
            }
            if !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed("segment is not a decimal index"));
            }
            let index = part
                .parse::<u32>()
                .map_err(|_| malformed("segment out of range"))?;
            segments.push(index);
        }
        Ok(FieldPath(segments))
    }
}

// Paths serialize as their canonical string so that answer maps keyed by
// path become plain JSON objects in storage and on the wire.

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
