//! The recursive field schema: one closed tagged union with five variants.
//!
//! A schema tree is built from validating constructors only. Every stored
//! tree is therefore structurally sound: labels are non-empty, choice and
//! group branches are non-empty with unique sibling identifiers, and list
//! arities are ordered. Deserialization funnels through the same
//! constructors, so a tree rehydrated from storage carries the same
//! guarantees as one built in code.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constraint::InputConstraint;
use crate::error::{FieldError, SpecializationError};
use crate::path::FieldPath;

// ──────────────────────────────────────────────
// Field tree
// ──────────────────────────────────────────────

/// One node of a schema tree.
///
/// `mandatory` is the node's own flag; the effective mandatory-ness of a
/// node during validation is the AND of the flags along its ancestry, so
/// an optional branch makes its whole subtree optional. Label nodes are
/// never mandatory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "raw::RawField")]
pub struct Field {
    id: String,
    label: String,
    mandatory: bool,
    kind: FieldKind,
}

/// The five variants of a field node.
///
/// Choice and group children are keyed by small integer indices: the
/// option index chosen by the submitter for a choice, the fixed slot
/// index for a group. A list wraps a single field reused at every
/// element index below `max`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FieldKind {
    /// Static text with no answer.
    Label,
    /// Atomic leaf; its answer must satisfy the constraint.
    Input(InputConstraint),
    /// Exactly one option is selected (when mandatory).
    Choice(BTreeMap<u32, Field>),
    /// Every slot is evaluated independently.
    Group(BTreeMap<u32, Field>),
    /// `min..=max` repeated instances of the wrapped field.
    List {
        min: u32,
        max: u32,
        inner: Box<Field>,
    },
}

impl Field {
    /// A static text node. Never mandatory.
    pub fn label(id: impl Into<String>, label: impl Into<String>) -> Result<Field, FieldError> {
        Field::build(id, label, false, FieldKind::Label)
    }

    /// An atomic input leaf.
    pub fn input(
        id: impl Into<String>,
        label: impl Into<String>,
        mandatory: bool,
        constraint: InputConstraint,
    ) -> Result<Field, FieldError> {
        constraint.validate().map_err(FieldError::invalid)?;
        Field::build(id, label, mandatory, FieldKind::Input(constraint))
    }

    /// A choice among the given options. The option map must be non-empty
    /// and sibling identifiers must be unique.
    pub fn choice(
        id: impl Into<String>,
        label: impl Into<String>,
        mandatory: bool,
        options: BTreeMap<u32, Field>,
    ) -> Result<Field, FieldError> {
        Field::check_children("choice", &options)?;
        Field::build(id, label, mandatory, FieldKind::Choice(options))
    }

    /// A group of slots. The slot map must be non-empty and sibling
    /// identifiers must be unique.
    pub fn group(
        id: impl Into<String>,
        label: impl Into<String>,
        mandatory: bool,
        slots: BTreeMap<u32, Field>,
    ) -> Result<Field, FieldError> {
        Field::check_children("group", &slots)?;
        Field::build(id, label, mandatory, FieldKind::Group(slots))
    }

    /// A repeated list of `min..=max` instances of `inner`.
    pub fn list(
        id: impl Into<String>,
        label: impl Into<String>,
        mandatory: bool,
        min: u32,
        max: u32,
        inner: Field,
    ) -> Result<Field, FieldError> {
        if min > max {
            return Err(FieldError::invalid(format!(
                "list arity is inverted ({} > {})",
                min, max
            )));
        }
        Field::build(
            id,
            label,
            mandatory,
            FieldKind::List {
                min,
                max,
                inner: Box::new(inner),
            },
        )
    }

    fn build(
        id: impl Into<String>,
        label: impl Into<String>,
        mandatory: bool,
        kind: FieldKind,
    ) -> Result<Field, FieldError> {
        let id = id.into();
        let label = label.into();
        if id.trim().is_empty() {
            return Err(FieldError::invalid("field identifier is empty"));
        }
        if label.trim().is_empty() {
            return Err(FieldError::invalid(format!(
                "field '{}' has an empty label",
                id
            )));
        }
        Ok(Field {
            id,
            label,
            mandatory,
            kind,
        })
    }

    fn check_children(variant: &str, children: &BTreeMap<u32, Field>) -> Result<(), FieldError> {
        if children.is_empty() {
            return Err(FieldError::invalid(format!("{} has no children", variant)));
        }
        let mut seen = std::collections::BTreeSet::new();
        for child in children.values() {
            if !seen.insert(child.id.as_str()) {
                return Err(FieldError::invalid(format!(
                    "{} has duplicate child identifier '{}'",
                    variant, child.id
                )));
            }
        }
        Ok(())
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn display_label(&self) -> &str {
        &self.label
    }

    pub fn mandatory(&self) -> bool {
        self.mandatory
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// The child reachable by one path segment, if any.
    ///
    /// Choice and group look the index up in their child map. A list
    /// resolves every element index below `max` to the single wrapped
    /// field. Input and label have no children.
    pub fn child(&self, index: u32) -> Option<&Field> {
        match &self.kind {
            FieldKind::Label | FieldKind::Input(_) => None,
            FieldKind::Choice(children) | FieldKind::Group(children) => children.get(&index),
            FieldKind::List { max, inner, .. } => {
                if index < *max {
                    Some(inner)
                } else {
                    None
                }
            }
        }
    }

    fn variant_name(&self) -> &'static str {
        match &self.kind {
            FieldKind::Label => "Label",
            FieldKind::Input(_) => "Input",
            FieldKind::Choice(_) => "Choice",
            FieldKind::Group(_) => "Group",
            FieldKind::List { .. } => "List",
        }
    }
}

// ──────────────────────────────────────────────
// Specialization (constraint narrowing)
// ──────────────────────────────────────────────

/// Whether `specific` is a valid specialization of `general`.
///
/// Reflexive: every valid field specializes itself.
pub fn is_compatible_with(general: &Field, specific: &Field) -> bool {
    check_specialization(general, specific).is_ok()
}

/// Check that `specific` narrows `general`, reporting the first offending
/// node on failure.
///
/// The recursion mirrors the tree shapes: variant kinds and identifiers
/// must match at every node, a choice or group may not add, remove, or
/// renumber children, a list's arity must be contained in the general
/// arity, and an input's constraint must accept a subset of the values
/// the general constraint accepts. A specialization may make an optional
/// field mandatory (fewer answer maps accepted) but never the reverse.
pub fn check_specialization(
    general: &Field,
    specific: &Field,
) -> Result<(), SpecializationError> {
    check_node(general, specific, &FieldPath::root())
}

fn check_node(
    general: &Field,
    specific: &Field,
    path: &FieldPath,
) -> Result<(), SpecializationError> {
    let fail = |expected: String, actual: String| SpecializationError {
        path: path.clone(),
        expected,
        actual,
    };

    if general.id != specific.id {
        return Err(fail(
            format!("identifier '{}'", general.id),
            format!("identifier '{}'", specific.id),
        ));
    }
    if general.mandatory && !specific.mandatory {
        return Err(fail(
            "a mandatory field".to_string(),
            "an optional field".to_string(),
        ));
    }

    match (&general.kind, &specific.kind) {
        (FieldKind::Label, FieldKind::Label) => Ok(()),
        (FieldKind::Input(g), FieldKind::Input(s)) => {
            if s.narrows(g) {
                Ok(())
            } else {
                Err(fail(
                    format!("a constraint narrowing {}", g.describe()),
                    s.describe(),
                ))
            }
        }
        (FieldKind::Choice(g), FieldKind::Choice(s))
        | (FieldKind::Group(g), FieldKind::Group(s)) => {
            if !g.keys().eq(s.keys()) {
                return Err(fail(
                    format!("child indices {:?}", g.keys().collect::<Vec<_>>()),
                    format!("child indices {:?}", s.keys().collect::<Vec<_>>()),
                ));
            }
            for (index, g_child) in g {
                check_node(g_child, &s[index], &path.child(*index))?;
            }
            Ok(())
        }
        (
            FieldKind::List {
                min: g_min,
                max: g_max,
                inner: g_inner,
            },
            FieldKind::List {
                min: s_min,
                max: s_max,
                inner: s_inner,
            },
        ) => {
            if s_min < g_min || s_max > g_max {
                return Err(fail(
                    format!("an arity within [{}, {}]", g_min, g_max),
                    format!("arity [{}, {}]", s_min, s_max),
                ));
            }
            check_node(g_inner, s_inner, &path.child(0))
        }
        _ => Err(fail(
            format!("a {} field", general.variant_name()),
            format!("a {} field", specific.variant_name()),
        )),
    }
}

// ──────────────────────────────────────────────
// Deserialization funnel
// ──────────────────────────────────────────────

mod raw {
    use std::collections::BTreeMap;

    use serde::Deserialize;

    use super::{Field, FieldError, InputConstraint};

    /// Unvalidated mirror of [`Field`]; `TryFrom` routes through the
    /// validating constructors so deserialized trees keep the invariants.
    #[derive(Deserialize)]
    pub struct RawField {
        id: String,
        label: String,
        #[serde(default)]
        mandatory: bool,
        kind: RawFieldKind,
    }

    #[derive(Deserialize)]
    enum RawFieldKind {
        Label,
        Input(InputConstraint),
        Choice(BTreeMap<u32, RawField>),
        Group(BTreeMap<u32, RawField>),
        List {
            min: u32,
            max: u32,
            inner: Box<RawField>,
        },
    }

    fn convert_children(
        raw: BTreeMap<u32, RawField>,
    ) -> Result<BTreeMap<u32, Field>, FieldError> {
        raw.into_iter()
            .map(|(index, child)| Ok((index, Field::try_from(child)?)))
            .collect()
    }

    impl TryFrom<RawField> for Field {
        type Error = FieldError;

        fn try_from(raw: RawField) -> Result<Field, FieldError> {
            match raw.kind {
                RawFieldKind::Label => {
                    if raw.mandatory {
                        return Err(FieldError::invalid(format!(
                            "label field '{}' cannot be mandatory",
                            raw.id
                        )));
                    }
                    Field::label(raw.id, raw.label)
                }
                RawFieldKind::Input(constraint) => {
                    Field::input(raw.id, raw.label, raw.mandatory, constraint)
                }
                RawFieldKind::Choice(options) => Field::choice(
                    raw.id,
                    raw.label,
                    raw.mandatory,
                    convert_children(options)?,
                ),
                RawFieldKind::Group(slots) => {
                    Field::group(raw.id, raw.label, raw.mandatory, convert_children(slots)?)
                }
                RawFieldKind::List { min, max, inner } => Field::list(
                    raw.id,
                    raw.label,
                    raw.mandatory,
                    min,
                    max,
                    Field::try_from(*inner)?,
                ),
            }
        }
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn text(max_length: u32) -> InputConstraint {
        InputConstraint::Text { max_length }
    }

    fn options(fields: Vec<Field>) -> BTreeMap<u32, Field> {
        fields.into_iter().enumerate().map(|(i, f)| (i as u32, f)).collect()
    }

    #[test]
    fn construction_rejects_empty_label() {
        assert!(Field::label("note", "  ").is_err());
        assert!(Field::input("name", "", true, text(10)).is_err());
    }

    #[test]
    fn construction_rejects_empty_branches() {
        assert!(Field::choice("c", "Pick one", true, BTreeMap::new()).is_err());
        assert!(Field::group("g", "Details", true, BTreeMap::new()).is_err());
    }

    #[test]
    fn construction_rejects_duplicate_sibling_ids() {
        let children = options(vec![
            Field::label("dup", "A").unwrap(),
            Field::label("dup", "B").unwrap(),
        ]);
        assert!(Field::group("g", "Details", false, children).is_err());
    }

    #[test]
    fn construction_rejects_inverted_arities() {
        let inner = Field::input("item", "Item", false, text(10)).unwrap();
        assert!(Field::list("l", "Items", false, 3, 1, inner.clone()).is_err());
        assert!(Field::list("l", "Items", false, 0, 0, inner).is_ok());
    }

    #[test]
    fn construction_rejects_inverted_integer_bounds() {
        let c = InputConstraint::Integer { min: 5, max: -5 };
        assert!(Field::input("n", "Number", false, c).is_err());
    }

    #[test]
    fn list_child_resolves_below_max_only() {
        let inner = Field::input("item", "Item", false, text(10)).unwrap();
        let list = Field::list("l", "Items", false, 1, 3, inner).unwrap();
        assert_eq!(list.child(0).unwrap().id(), "item");
        assert_eq!(list.child(2).unwrap().id(), "item");
        assert!(list.child(3).is_none());
    }

    #[test]
    fn leaves_have_no_children() {
        let input = Field::input("name", "Name", false, text(10)).unwrap();
        assert!(input.child(0).is_none());
        assert!(Field::label("note", "Note").unwrap().child(0).is_none());
    }

    #[test]
    fn specialization_is_reflexive() {
        let inner = Field::input("item", "Item", true, text(10)).unwrap();
        let fields = [
            Field::label("note", "Note").unwrap(),
            Field::input("name", "Name", true, text(10)).unwrap(),
            Field::choice(
                "c",
                "Pick",
                false,
                options(vec![
                    Field::label("a", "A").unwrap(),
                    Field::label("b", "B").unwrap(),
                ]),
            )
            .unwrap(),
            Field::list("l", "Items", true, 1, 3, inner).unwrap(),
        ];
        for f in &fields {
            assert!(is_compatible_with(f, f), "{} must specialize itself", f.id());
        }
    }

    #[test]
    fn text_specialization_narrows_max_length() {
        let general = Field::input("name", "Name", false, text(10)).unwrap();
        let narrower = Field::input("name", "Name", false, text(9)).unwrap();
        let wider = Field::input("name", "Name", false, text(11)).unwrap();
        assert!(is_compatible_with(&general, &narrower));
        assert!(!is_compatible_with(&general, &wider));
    }

    #[test]
    fn specialization_rejects_variant_change() {
        let general = Field::input("x", "X", false, text(10)).unwrap();
        let specific = Field::label("x", "X").unwrap();
        assert!(!is_compatible_with(&general, &specific));
    }

    #[test]
    fn specialization_rejects_renumbered_children() {
        let general = Field::group(
            "g",
            "G",
            false,
            options(vec![
                Field::label("a", "A").unwrap(),
                Field::label("b", "B").unwrap(),
            ]),
        )
        .unwrap();
        let renumbered = Field::group(
            "g",
            "G",
            false,
            [
                (0u32, Field::label("a", "A").unwrap()),
                (2u32, Field::label("b", "B").unwrap()),
            ]
            .into_iter()
            .collect(),
        )
        .unwrap();
        assert!(!is_compatible_with(&general, &renumbered));
    }

    #[test]
    fn specialization_may_not_drop_mandatory() {
        let general = Field::input("name", "Name", true, text(10)).unwrap();
        let optional = Field::input("name", "Name", false, text(10)).unwrap();
        assert!(!is_compatible_with(&general, &optional));
        // The other direction tightens and is allowed.
        assert!(is_compatible_with(&optional, &general));
    }

    #[test]
    fn specialization_error_reports_offending_path() {
        let general = Field::group(
            "g",
            "G",
            false,
            options(vec![
                Field::label("a", "A").unwrap(),
                Field::input("n", "N", false, text(10)).unwrap(),
            ]),
        )
        .unwrap();
        let specific = Field::group(
            "g",
            "G",
            false,
            options(vec![
                Field::label("a", "A").unwrap(),
                Field::input("n", "N", false, text(11)).unwrap(),
            ]),
        )
        .unwrap();
        let err = check_specialization(&general, &specific).unwrap_err();
        assert_eq!(err.path, FieldPath::new(vec![1]));
    }

    #[test]
    fn list_specialization_contains_arity() {
        let inner = Field::input("item", "Item", false, text(10)).unwrap();
        let general = Field::list("l", "Items", false, 1, 5, inner.clone()).unwrap();
        let contained = Field::list("l", "Items", false, 2, 4, inner.clone()).unwrap();
        let wider = Field::list("l", "Items", false, 0, 5, inner).unwrap();
        assert!(is_compatible_with(&general, &contained));
        assert!(!is_compatible_with(&general, &wider));
    }

    #[test]
    fn serde_round_trip_preserves_tree() {
        let tree = Field::group(
            "g",
            "Details",
            true,
            options(vec![
                Field::input("name", "Name", true, text(10)).unwrap(),
                Field::choice(
                    "kind",
                    "Kind",
                    false,
                    options(vec![
                        Field::label("private", "Private").unwrap(),
                        Field::label("business", "Business").unwrap(),
                    ]),
                )
                .unwrap(),
            ]),
        )
        .unwrap();
        let json = serde_json::to_string(&tree).unwrap();
        let back: Field = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tree);
    }

    #[test]
    fn deserialization_rejects_invalid_trees() {
        // An empty group is rejected by the same constructor that guards
        // in-code construction.
        let json = r#"{"id":"g","label":"G","kind":{"Group":{}}}"#;
        assert!(serde_json::from_str::<Field>(json).is_err());
        // A mandatory label is rejected.
        let json = r#"{"id":"t","label":"T","mandatory":true,"kind":"Label"}"#;
        assert!(serde_json::from_str::<Field>(json).is_err());
    }
}
