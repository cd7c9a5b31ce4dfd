//! Form model error type.
//!
//! Validation failures are never surfaced here — they live as error tags on
//! the owning node. `CoreError` covers the structural failures only: bad
//! control paths and whole-tree overwrites whose shape does not match the
//! form.

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Unknown control path: {0}")]
    UnknownPath(String),

    #[error("Control at '{0}' is not a field")]
    NotAField(String),

    #[error("Control at '{0}' is not a list")]
    NotAList(String),

    /// A whole-tree overwrite supplied keys that do not exactly match the
    /// form's current field set. Nothing is applied when this is returned.
    #[error("Value shape does not match the form: missing keys {missing:?}, unexpected keys {unexpected:?}")]
    ShapeMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },
}
