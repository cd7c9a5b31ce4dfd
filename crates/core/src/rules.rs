//! Validation rules as plain data.
//!
//! Rules are tagged variants interpreted by one generic evaluator
//! (see [`crate::evaluator`]), not an inheritance hierarchy. Leaf-level
//! rules inspect a single value; group-level rules inspect sibling fields
//! jointly.

use serde::{Deserialize, Serialize};

/// A leaf-level validation rule attached to a [`FieldNode`](crate::FieldNode).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Rule {
    /// Fails on null or empty string.
    Required,

    /// Fails when a string value is shorter than `min`.
    MinLength { min: usize },

    /// Fails when a string value is longer than `max`.
    MaxLength { max: usize },

    /// Fails when a non-empty string value is not a conventional email
    /// address. Empty values are left to [`Rule::Required`].
    EmailFormat,

    /// Fails when a non-null value is non-numeric or outside `[min, max]`.
    /// Null passes: absence of a value is valid.
    Range { min: i64, max: i64 },
}

/// A group-level rule attached to a [`GroupNode`](crate::GroupNode),
/// evaluated against the group's direct children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum GroupRule {
    /// Cross-field equality: inert while either named child is pristine,
    /// otherwise fails when the two values differ.
    Match { first: String, second: String },
}

/// Well-known error tag constants.
///
/// Tags are the keys of a node's error map and the lookup keys of the
/// tag → message table in [`crate::messages`].
pub mod tags {
    /// The value is missing (null or empty string).
    pub const REQUIRED: &str = "required";

    /// The string value is shorter than the rule's minimum.
    pub const MIN_LENGTH: &str = "minlength";

    /// The string value is longer than the rule's maximum.
    pub const MAX_LENGTH: &str = "maxlength";

    /// The value is not a valid email address.
    pub const EMAIL: &str = "email";

    /// The value is non-numeric or outside the rule's range.
    pub const RANGE: &str = "range";

    /// Two cross-matched fields hold different values.
    pub const MATCH: &str = "match";
}
