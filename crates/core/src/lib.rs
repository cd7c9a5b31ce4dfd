//! Customer registration form model.
//!
//! This crate provides the core building blocks for the registration
//! form's client-side validation:
//!
//! - [`tree`] — the mutable control tree ([`FieldNode`], [`GroupNode`],
//!   [`ListNode`]) with per-node value, dirty/touched status, and error
//!   state, addressed by dot-separated paths.
//! - [`rules`] — validation rules as plain data ([`Rule`], [`GroupRule`])
//!   plus the well-known error tag constants.
//! - [`evaluator`] — the pure rule evaluator that turns a rule set and a
//!   value into an error map.
//! - [`builder`] — constructs the default customer form and address groups.
//! - [`customer`] — [`CustomerForm`], the public form facade: value
//!   mutation, the notification toggle, address appends, whole-tree
//!   overwrite, and save.
//! - [`messages`] — error tag to human-readable message composition for
//!   the email leaf.

pub mod builder;
pub mod customer;
pub mod error;
pub mod evaluator;
pub mod messages;
pub mod paths;
pub mod rules;
pub mod tree;

pub use customer::CustomerForm;
pub use error::CoreError;
pub use rules::{GroupRule, Rule};
pub use tree::{ControlNode, FieldNode, GroupNode, ListNode};
