//! Default customer form construction.
//!
//! Construction is total over fixed literal defaults — no error conditions.

use serde_json::{json, Value};

use crate::rules::{GroupRule, Rule};
use crate::tree::{ControlNode, FieldNode, GroupNode, ListNode};

/// Build the customer registration form with its default leaves and rules.
///
/// The phone leaf starts with no rules attached: the default notification
/// method is `"email"`, and requiredness only arrives when it switches to
/// `"text"` (see [`CustomerForm::set_notification`](crate::CustomerForm::set_notification)).
pub fn customer_form() -> GroupNode {
    let mut root = GroupNode::new()
        .with_field(
            "firstName",
            FieldNode::new(json!(""), vec![Rule::Required, Rule::MinLength { min: 3 }]),
        )
        .with_field(
            "lastName",
            FieldNode::new(json!(""), vec![Rule::Required, Rule::MaxLength { max: 50 }]),
        )
        .with_child(
            "emailGroup",
            ControlNode::Group(
                GroupNode::new()
                    .with_group_rule(GroupRule::Match {
                        first: "email".to_string(),
                        second: "confirmEmail".to_string(),
                    })
                    .with_field(
                        "email",
                        FieldNode::new(json!(""), vec![Rule::Required, Rule::EmailFormat]),
                    )
                    .with_field("confirmEmail", FieldNode::new(json!(""), vec![Rule::Required])),
            ),
        )
        .with_field("phone", FieldNode::new(json!(""), Vec::new()))
        .with_field("notification", FieldNode::new(json!("email"), Vec::new()))
        .with_field(
            "rating",
            FieldNode::new(Value::Null, vec![Rule::Range { min: 1, max: 5 }]),
        )
        .with_field("sendCatalog", FieldNode::new(json!(true), Vec::new()))
        .with_child(
            "addresses",
            ControlNode::List(ListNode::of(vec![ControlNode::Group(address_group())])),
        );
    root.revalidate();
    root
}

/// Build one address group with default leaves: type `"home"`, everything
/// else the empty string. Used at build time and by every append.
pub fn address_group() -> GroupNode {
    GroupNode::new()
        .with_field("addressType", FieldNode::new(json!("home"), Vec::new()))
        .with_field("street1", FieldNode::new(json!(""), Vec::new()))
        .with_field("street2", FieldNode::new(json!(""), Vec::new()))
        .with_field("city", FieldNode::new(json!(""), Vec::new()))
        .with_field("state", FieldNode::new(json!(""), Vec::new()))
        .with_field("zip", FieldNode::new(json!(""), Vec::new()))
}
