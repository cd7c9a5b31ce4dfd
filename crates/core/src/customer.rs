//! The customer form facade.
//!
//! [`CustomerForm`] owns the control tree built by [`crate::builder`] and
//! exposes the operations the rendering layer and the reactive wiring use:
//! value mutation, the notification-driven phone rule toggle, address
//! appends, whole-tree overwrite, and save.

use serde_json::{json, Value};

use crate::builder;
use crate::error::CoreError;
use crate::paths;
use crate::rules::Rule;
use crate::tree::{ControlNode, FieldNode, GroupNode};

/// Notification method value that makes the phone leaf required.
pub const NOTIFY_VIA_TEXT: &str = "text";

/// Default notification method; the phone leaf carries no rules.
pub const NOTIFY_VIA_EMAIL: &str = "email";

/// The customer registration form: the control tree plus its operations.
#[derive(Debug, Clone)]
pub struct CustomerForm {
    root: GroupNode,
}

impl CustomerForm {
    /// Build the default form (see [`builder::customer_form`]).
    pub fn new() -> Self {
        Self {
            root: builder::customer_form(),
        }
    }

    /// Read-only access to the root group.
    pub fn root(&self) -> &GroupNode {
        &self.root
    }

    /// Resolve a path to a node.
    pub fn node(&self, path: &str) -> Result<&ControlNode, CoreError> {
        self.root.node(path)
    }

    /// Resolve a path to a leaf.
    pub fn field(&self, path: &str) -> Result<&FieldNode, CoreError> {
        self.root.field(path)
    }

    /// Apply a user edit to a leaf: set the value, mark it dirty, and
    /// recompute error state across the tree so cross-field rules see the
    /// new value immediately.
    pub fn set_value(&mut self, path: &str, value: Value) -> Result<(), CoreError> {
        self.root.field_mut(path)?.set_value(value);
        self.root.revalidate();
        Ok(())
    }

    /// Record that a leaf received and lost focus, then recompute error
    /// state (the match rule inspects interaction status).
    pub fn mark_touched(&mut self, path: &str) -> Result<(), CoreError> {
        self.root.field_mut(path)?.mark_touched();
        self.root.revalidate();
        Ok(())
    }

    /// Apply the notification method to the phone leaf's rule set: `"text"`
    /// attaches the required rule, anything else clears all rules. The
    /// phone leaf is revalidated immediately so its error state reflects
    /// the new rules right away.
    pub fn set_notification(&mut self, notify_via: &str) -> Result<(), CoreError> {
        let phone = self.root.field_mut(paths::PHONE)?;
        if notify_via == NOTIFY_VIA_TEXT {
            phone.set_rules(vec![Rule::Required]);
        } else {
            phone.clear_rules();
        }
        self.root.revalidate();
        Ok(())
    }

    /// Append one freshly built address group. Returns the new list length.
    pub fn add_address(&mut self) -> Result<usize, CoreError> {
        let list = self.root.list_mut(paths::ADDRESSES)?;
        list.push(ControlNode::Group(builder::address_group()));
        let len = list.len();
        self.root.revalidate();
        Ok(len)
    }

    /// True when no node in the tree carries an error.
    pub fn is_valid(&self) -> bool {
        self.root.is_valid()
    }

    /// The whole tree's current values as JSON.
    pub fn value(&self) -> Value {
        self.root.value()
    }

    /// Serialize the current values to the log sink and return the rendered
    /// string.
    pub fn save(&self) -> String {
        let rendered = self.value().to_string();
        tracing::info!(form = %rendered, "Saved customer form");
        rendered
    }

    /// Overwrite the entire tree's values at once.
    ///
    /// The record's keys must exactly match the form's current field set at
    /// every level; on any mismatch nothing is applied and
    /// [`CoreError::ShapeMismatch`] is returned naming the missing and
    /// unexpected keys. Leaves overwritten this way stay pristine.
    pub fn set_all(&mut self, record: &Value) -> Result<(), CoreError> {
        let mut missing = Vec::new();
        let mut unexpected = Vec::new();
        self.root.check_shape(record, "", &mut missing, &mut unexpected);
        if !missing.is_empty() || !unexpected.is_empty() {
            return Err(CoreError::ShapeMismatch {
                missing,
                unexpected,
            });
        }
        self.root.apply_all(record);
        self.root.revalidate();
        Ok(())
    }

    /// Overwrite the tree with the fixed test record.
    ///
    /// The record's keys (`email`, `sendCatalogue`) do not match the tree
    /// built by [`builder::customer_form`] (`emailGroup.email`,
    /// `sendCatalog`), so this fails with [`CoreError::ShapeMismatch`]
    /// instead of partially applying.
    pub fn populate_test_data(&mut self) -> Result<(), CoreError> {
        self.set_all(&json!({
            "firstName": "uhn",
            "lastName": "ahnn",
            "email": "bulbasaur@yahoo.com",
            "sendCatalogue": false,
        }))
    }
}

impl Default for CustomerForm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::tags;
    use assert_matches::assert_matches;

    #[test]
    fn set_value_clears_satisfied_errors() {
        let mut form = CustomerForm::new();
        form.set_value(paths::FIRST_NAME, json!("sam")).unwrap();
        let first_name = form.field(paths::FIRST_NAME).unwrap();
        assert!(first_name.is_dirty());
        assert!(first_name.errors().is_empty());
    }

    #[test]
    fn short_first_name_violates_min_length() {
        let mut form = CustomerForm::new();
        form.set_value(paths::FIRST_NAME, json!("sa")).unwrap();
        assert!(form.field(paths::FIRST_NAME).unwrap().has_error(tags::MIN_LENGTH));
    }

    #[test]
    fn email_match_activates_once_both_leaves_are_dirty() {
        let mut form = CustomerForm::new();
        form.set_value(paths::EMAIL, json!("sam@example.com")).unwrap();
        // Confirmation still pristine: no match error despite the difference.
        let email_group = form.node(paths::EMAIL_GROUP).unwrap().as_group().unwrap();
        assert!(!email_group.has_error(tags::MATCH));

        form.set_value(paths::CONFIRM_EMAIL, json!("other@example.com"))
            .unwrap();
        let email_group = form.node(paths::EMAIL_GROUP).unwrap().as_group().unwrap();
        assert!(email_group.has_error(tags::MATCH));

        form.set_value(paths::CONFIRM_EMAIL, json!("sam@example.com"))
            .unwrap();
        let email_group = form.node(paths::EMAIL_GROUP).unwrap().as_group().unwrap();
        assert!(!email_group.has_error(tags::MATCH));
    }

    #[test]
    fn text_notification_attaches_required_to_phone() {
        let mut form = CustomerForm::new();
        assert!(form.field(paths::PHONE).unwrap().rules().is_empty());

        form.set_notification(NOTIFY_VIA_TEXT).unwrap();
        let phone = form.field(paths::PHONE).unwrap();
        assert_eq!(phone.rules(), &[Rule::Required]);
        assert!(phone.has_error(tags::REQUIRED));

        form.set_notification(NOTIFY_VIA_EMAIL).unwrap();
        let phone = form.field(paths::PHONE).unwrap();
        assert!(phone.rules().is_empty());
        assert!(phone.errors().is_empty());
    }

    #[test]
    fn add_address_appends_default_groups() {
        let mut form = CustomerForm::new();
        assert_eq!(form.add_address().unwrap(), 2);
        assert_eq!(form.add_address().unwrap(), 3);
        assert_eq!(form.field("addresses.2.addressType").unwrap().value(), &json!("home"));
        assert_eq!(form.field("addresses.2.city").unwrap().value(), &json!(""));
    }

    #[test]
    fn save_serializes_the_whole_value_tree() {
        let mut form = CustomerForm::new();
        form.set_value(paths::FIRST_NAME, json!("sam")).unwrap();
        let rendered = form.save();
        let value: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["firstName"], json!("sam"));
        assert_eq!(value["sendCatalog"], json!(true));
        assert_eq!(value["addresses"][0]["addressType"], json!("home"));
    }

    #[test]
    fn set_all_with_matching_shape_overwrites_every_leaf() {
        let mut form = CustomerForm::new();
        let mut record = form.value();
        record["firstName"] = json!("sam");
        record["rating"] = json!(4);
        form.set_all(&record).unwrap();
        assert_eq!(form.field(paths::FIRST_NAME).unwrap().value(), &json!("sam"));
        // A whole-tree overwrite is not a user edit.
        assert!(form.field(paths::FIRST_NAME).unwrap().is_pristine());
    }

    #[test]
    fn populate_test_data_fails_with_shape_mismatch() {
        let mut form = CustomerForm::new();
        let before = form.value();
        let err = form.populate_test_data().unwrap_err();
        assert_matches!(err, CoreError::ShapeMismatch { ref missing, ref unexpected } => {
            assert!(missing.contains(&"emailGroup".to_string()));
            assert!(missing.contains(&"sendCatalog".to_string()));
            assert!(missing.contains(&"phone".to_string()));
            assert!(unexpected.contains(&"email".to_string()));
            assert!(unexpected.contains(&"sendCatalogue".to_string()));
        });
        // Nothing was applied.
        assert_eq!(form.value(), before);
    }

    #[test]
    fn default_form_is_invalid_until_required_fields_are_filled() {
        let mut form = CustomerForm::new();
        assert!(!form.is_valid());
        form.set_value(paths::FIRST_NAME, json!("sam")).unwrap();
        form.set_value(paths::LAST_NAME, json!("porter")).unwrap();
        form.set_value(paths::EMAIL, json!("sam@example.com")).unwrap();
        form.set_value(paths::CONFIRM_EMAIL, json!("sam@example.com"))
            .unwrap();
        assert!(form.is_valid());
    }
}
