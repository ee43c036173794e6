//! Input constraints: the lexical contracts on atomic answers.
//!
//! Every input field carries one constraint that restricts the raw string
//! an end user may supply. Parsing is type-directed and total: a raw
//! answer either parses to a typed [`AnswerValue`] or fails with a
//! human-readable reason.

use serde::{Deserialize, Serialize};

/// Constraint on the lexical form of an input field's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputConstraint {
    /// Free text of at most `max_length` characters.
    Text { max_length: u32 },
    /// A decimal integer within `min..=max`.
    Integer { min: i64, max: i64 },
    /// Exactly `true` or `false`.
    Boolean,
}

/// A raw answer parsed against its constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerValue {
    Text(String),
    Integer(i64),
    Boolean(bool),
}

impl InputConstraint {
    /// Human-readable constraint kind for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            InputConstraint::Text { .. } => "Text",
            InputConstraint::Integer { .. } => "Integer",
            InputConstraint::Boolean => "Boolean",
        }
    }

    /// Structural well-formedness. `Integer` bounds must not be inverted.
    pub(crate) fn validate(&self) -> Result<(), String> {
        match self {
            InputConstraint::Integer { min, max } if min > max => Err(format!(
                "integer constraint has inverted bounds ({} > {})",
                min, max
            )),
            _ => Ok(()),
        }
    }

    /// Parse a raw answer string against this constraint.
    pub fn parse(&self, raw: &str) -> Result<AnswerValue, String> {
        match self {
            InputConstraint::Text { max_length } => {
                let length = raw.chars().count();
                if length > *max_length as usize {
                    Err(format!(
                        "text is {} characters, limit is {}",
                        length, max_length
                    ))
                } else {
                    Ok(AnswerValue::Text(raw.to_string()))
                }
            }
            InputConstraint::Integer { min, max } => {
                let value = raw
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| format!("'{}' is not an integer", raw))?;
                if value < *min || value > *max {
                    Err(format!(
                        "{} is outside the allowed range {}..={}",
                        value, min, max
                    ))
                } else {
                    Ok(AnswerValue::Integer(value))
                }
            }
            InputConstraint::Boolean => match raw.trim() {
                "true" => Ok(AnswerValue::Boolean(true)),
                "false" => Ok(AnswerValue::Boolean(false)),
                other => Err(format!("'{}' is not 'true' or 'false'", other)),
            },
        }
    }

    /// Whether this constraint accepts a subset of the values `general`
    /// accepts. Cross-kind narrowing is always false: a boolean field may
    /// never replace a text or integer field, and vice versa.
    pub fn narrows(&self, general: &InputConstraint) -> bool {
        match (self, general) {
            (
                InputConstraint::Text { max_length: s },
                InputConstraint::Text { max_length: g },
            ) => s <= g,
            (
                InputConstraint::Integer { min: s_min, max: s_max },
                InputConstraint::Integer { min: g_min, max: g_max },
            ) => g_min <= s_min && s_max <= g_max,
            (InputConstraint::Boolean, InputConstraint::Boolean) => true,
            _ => false,
        }
    }

    /// Short description of the constraint for specialization diagnostics.
    pub fn describe(&self) -> String {
        match self {
            InputConstraint::Text { max_length } => format!("Text(max_length={})", max_length),
            InputConstraint::Integer { min, max } => format!("Integer({}..={})", min, max),
            InputConstraint::Boolean => "Boolean".to_string(),
        }
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
