//! Human-readable validation messages.
//!
//! The rendering layer shows one inline message string for the email leaf,
//! composed from the leaf's current error tags.

use crate::tree::FieldNode;

/// Look up the display message for an error tag.
///
/// Unmapped tags return `None` and are skipped during composition rather
/// than producing blank segments.
pub fn validation_message(tag: &str) -> Option<&'static str> {
    match tag {
        crate::rules::tags::REQUIRED => Some("Please enter your email address."),
        crate::rules::tags::EMAIL => Some("Please enter a valid email address."),
        _ => None,
    }
}

/// Compose the inline message for the email leaf.
///
/// Empty unless the leaf has been touched or modified and currently carries
/// at least one error; applicable messages are joined with a single space.
pub fn email_message(field: &FieldNode) -> String {
    if !(field.is_touched() || field.is_dirty()) || field.errors().is_empty() {
        return String::new();
    }
    field
        .errors()
        .keys()
        .filter_map(|tag| validation_message(tag))
        .collect::<Vec<_>>()
        .join(" ")
}
