//! Well-known control path constants for the customer form.
//!
//! These must match the child names used by
//! [`customer_form`](crate::builder::customer_form) and are the paths the
//! reactive wiring subscribes to.

/// First name leaf (required, min length 3).
pub const FIRST_NAME: &str = "firstName";

/// Last name leaf (required, max length 50).
pub const LAST_NAME: &str = "lastName";

/// Email group carrying the cross-field match rule.
pub const EMAIL_GROUP: &str = "emailGroup";

/// Email leaf inside the email group.
pub const EMAIL: &str = "emailGroup.email";

/// Confirmation email leaf inside the email group.
pub const CONFIRM_EMAIL: &str = "emailGroup.confirmEmail";

/// Phone leaf (conditionally required, driven by the notification method).
pub const PHONE: &str = "phone";

/// Notification method leaf (`"email"` or `"text"`).
pub const NOTIFICATION: &str = "notification";

/// Rating leaf (nullable integer, range 1–5).
pub const RATING: &str = "rating";

/// Send-catalog flag leaf.
pub const SEND_CATALOG: &str = "sendCatalog";

/// Address list.
pub const ADDRESSES: &str = "addresses";
