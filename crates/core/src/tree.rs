//! The mutable control tree.
//!
//! A form is a [`GroupNode`] of named children, each a [`FieldNode`] leaf,
//! a nested [`GroupNode`], or an append-only [`ListNode`]. Nodes are
//! addressed by dot-separated paths (`emailGroup.email`, `addresses.0.city`).
//!
//! Invariant: a node's error map is always consistent with its currently
//! attached rules. Every mutation entry point revalidates synchronously;
//! after mutating a rule set directly, call [`revalidate`](FieldNode::revalidate)
//! explicitly.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::CoreError;
use crate::evaluator;
use crate::rules::{GroupRule, Rule};

// ---------------------------------------------------------------------------
// FieldNode
// ---------------------------------------------------------------------------

/// An atomic input value with its own rules, status, and error state.
#[derive(Debug, Clone)]
pub struct FieldNode {
    value: Value,
    dirty: bool,
    touched: bool,
    rules: Vec<Rule>,
    errors: BTreeMap<&'static str, bool>,
}

impl FieldNode {
    /// Create a leaf with a default value and initial rule set. The error
    /// map is populated immediately so the consistency invariant holds from
    /// construction.
    pub fn new(value: Value, rules: Vec<Rule>) -> Self {
        let errors = evaluator::evaluate_field(&rules, &value);
        Self {
            value,
            dirty: false,
            touched: false,
            rules,
            errors,
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// A user edit: updates the value, marks the leaf dirty, revalidates.
    pub fn set_value(&mut self, value: Value) {
        self.value = value;
        self.dirty = true;
        self.revalidate();
    }

    /// A programmatic overwrite (whole-tree set): updates the value without
    /// touching the dirty flag, then revalidates.
    pub fn overwrite(&mut self, value: Value) {
        self.value = value;
        self.revalidate();
    }

    /// The leaf received and lost focus at least once.
    pub fn mark_touched(&mut self) {
        self.touched = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_touched(&self) -> bool {
        self.touched
    }

    /// Never value-modified by user interaction.
    pub fn is_pristine(&self) -> bool {
        !self.dirty
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Replace the attached rule set. Callers must revalidate afterwards —
    /// rule mutation and re-evaluation are deliberately separate steps.
    pub fn set_rules(&mut self, rules: Vec<Rule>) {
        self.rules = rules;
    }

    /// Remove all attached rules. Callers must revalidate afterwards.
    pub fn clear_rules(&mut self) {
        self.rules.clear();
    }

    /// Error map: tag → presence.
    pub fn errors(&self) -> &BTreeMap<&'static str, bool> {
        &self.errors
    }

    pub fn has_error(&self, tag: &str) -> bool {
        self.errors.get(tag).copied().unwrap_or(false)
    }

    /// Recompute the error map from the current rules and value.
    pub fn revalidate(&mut self) {
        self.errors = evaluator::evaluate_field(&self.rules, &self.value);
    }
}

// ---------------------------------------------------------------------------
// GroupNode
// ---------------------------------------------------------------------------

/// A named composite of fields, groups, and lists, itself validatable by
/// rules that inspect its children jointly.
#[derive(Debug, Clone, Default)]
pub struct GroupNode {
    children: Vec<(String, ControlNode)>,
    group_rules: Vec<GroupRule>,
    errors: BTreeMap<&'static str, bool>,
}

impl GroupNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a group-level rule (builder style).
    pub fn with_group_rule(mut self, rule: GroupRule) -> Self {
        self.group_rules.push(rule);
        self
    }

    /// Append a named child (builder style). Child order is preserved.
    pub fn with_child(mut self, name: impl Into<String>, node: ControlNode) -> Self {
        self.children.push((name.into(), node));
        self
    }

    /// Append a named leaf (builder style).
    pub fn with_field(self, name: impl Into<String>, field: FieldNode) -> Self {
        self.with_child(name, ControlNode::Field(field))
    }

    pub fn group_rules(&self) -> &[GroupRule] {
        &self.group_rules
    }

    /// Group-level error map (cross-field rules only; child errors live on
    /// the children).
    pub fn errors(&self) -> &BTreeMap<&'static str, bool> {
        &self.errors
    }

    pub fn has_error(&self, tag: &str) -> bool {
        self.errors.get(tag).copied().unwrap_or(false)
    }

    /// Direct child by name.
    pub fn child(&self, name: &str) -> Option<&ControlNode> {
        self.children
            .iter()
            .find(|(child_name, _)| child_name == name)
            .map(|(_, node)| node)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut ControlNode> {
        self.children
            .iter_mut()
            .find(|(child_name, _)| child_name == name)
            .map(|(_, node)| node)
    }

    /// Direct child by name, if it is a leaf.
    pub fn child_field(&self, name: &str) -> Option<&FieldNode> {
        match self.child(name) {
            Some(ControlNode::Field(field)) => Some(field),
            _ => None,
        }
    }

    /// Iterate direct children in insertion order.
    pub fn children(&self) -> impl Iterator<Item = (&str, &ControlNode)> {
        self.children
            .iter()
            .map(|(name, node)| (name.as_str(), node))
    }

    /// Resolve a dot-separated path to a node.
    pub fn node(&self, path: &str) -> Result<&ControlNode, CoreError> {
        let mut segments = path.split('.');
        let first = segments.next().unwrap_or_default();
        let mut current = self
            .child(first)
            .ok_or_else(|| CoreError::UnknownPath(path.to_string()))?;
        for segment in segments {
            current = current
                .child(segment)
                .ok_or_else(|| CoreError::UnknownPath(path.to_string()))?;
        }
        Ok(current)
    }

    pub fn node_mut(&mut self, path: &str) -> Result<&mut ControlNode, CoreError> {
        let mut segments = path.split('.');
        let first = segments.next().unwrap_or_default();
        let mut current = self
            .child_mut(first)
            .ok_or_else(|| CoreError::UnknownPath(path.to_string()))?;
        for segment in segments {
            current = current
                .child_mut(segment)
                .ok_or_else(|| CoreError::UnknownPath(path.to_string()))?;
        }
        Ok(current)
    }

    /// Resolve a path expecting a leaf.
    pub fn field(&self, path: &str) -> Result<&FieldNode, CoreError> {
        match self.node(path)? {
            ControlNode::Field(field) => Ok(field),
            _ => Err(CoreError::NotAField(path.to_string())),
        }
    }

    pub fn field_mut(&mut self, path: &str) -> Result<&mut FieldNode, CoreError> {
        match self.node_mut(path)? {
            ControlNode::Field(field) => Ok(field),
            _ => Err(CoreError::NotAField(path.to_string())),
        }
    }

    /// Resolve a path expecting a list.
    pub fn list(&self, path: &str) -> Result<&ListNode, CoreError> {
        match self.node(path)? {
            ControlNode::List(list) => Ok(list),
            _ => Err(CoreError::NotAList(path.to_string())),
        }
    }

    pub fn list_mut(&mut self, path: &str) -> Result<&mut ListNode, CoreError> {
        match self.node_mut(path)? {
            ControlNode::List(list) => Ok(list),
            _ => Err(CoreError::NotAList(path.to_string())),
        }
    }

    /// Recompute error state for the whole subtree: children first, then
    /// this group's cross-field rules against the fresh child state.
    pub fn revalidate(&mut self) {
        for (_, child) in &mut self.children {
            child.revalidate();
        }
        let errors = evaluator::evaluate_group(&self.group_rules, self);
        self.errors = errors;
    }

    /// True when neither this group nor any descendant carries an error.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty() && self.children.iter().all(|(_, child)| child.is_valid())
    }

    /// The group's current value as a JSON object.
    pub fn value(&self) -> Value {
        Value::Object(
            self.children
                .iter()
                .map(|(name, node)| (name.clone(), node.value()))
                .collect(),
        )
    }

    pub(crate) fn check_shape(
        &self,
        value: &Value,
        path: &str,
        missing: &mut Vec<String>,
        unexpected: &mut Vec<String>,
    ) {
        let Value::Object(map) = value else {
            unexpected.push(path.to_string());
            return;
        };
        for (name, child) in &self.children {
            match map.get(name) {
                Some(child_value) => {
                    child.check_shape(child_value, &join(path, name), missing, unexpected);
                }
                None => missing.push(join(path, name)),
            }
        }
        for key in map.keys() {
            if self.child(key).is_none() {
                unexpected.push(join(path, key));
            }
        }
    }

    /// Apply a shape-checked value object to the subtree. Leaves are
    /// overwritten without being marked dirty; callers revalidate afterwards.
    pub(crate) fn apply_all(&mut self, value: &Value) {
        let Value::Object(map) = value else {
            return;
        };
        for (name, child) in &mut self.children {
            if let Some(child_value) = map.get(name.as_str()) {
                child.apply_all(child_value);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// ListNode
// ---------------------------------------------------------------------------

/// An ordered, append-only sequence of controls. No removal operation.
#[derive(Debug, Clone, Default)]
pub struct ListNode {
    items: Vec<ControlNode>,
}

impl ListNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of(items: Vec<ControlNode>) -> Self {
        Self { items }
    }

    pub fn push(&mut self, node: ControlNode) {
        self.items.push(node);
    }

    pub fn get(&self, index: usize) -> Option<&ControlNode> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut ControlNode> {
        self.items.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ControlNode> {
        self.items.iter()
    }
}

// ---------------------------------------------------------------------------
// ControlNode
// ---------------------------------------------------------------------------

/// Any node of the control tree.
#[derive(Debug, Clone)]
pub enum ControlNode {
    Field(FieldNode),
    Group(GroupNode),
    List(ListNode),
}

impl ControlNode {
    /// Direct child by path segment: a name for groups, an index for lists.
    fn child(&self, segment: &str) -> Option<&ControlNode> {
        match self {
            ControlNode::Group(group) => group.child(segment),
            ControlNode::List(list) => list.get(segment.parse().ok()?),
            ControlNode::Field(_) => None,
        }
    }

    fn child_mut(&mut self, segment: &str) -> Option<&mut ControlNode> {
        match self {
            ControlNode::Group(group) => group.child_mut(segment),
            ControlNode::List(list) => list.get_mut(segment.parse().ok()?),
            ControlNode::Field(_) => None,
        }
    }

    pub fn as_field(&self) -> Option<&FieldNode> {
        match self {
            ControlNode::Field(field) => Some(field),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&GroupNode> {
        match self {
            ControlNode::Group(group) => Some(group),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListNode> {
        match self {
            ControlNode::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn revalidate(&mut self) {
        match self {
            ControlNode::Field(field) => field.revalidate(),
            ControlNode::Group(group) => group.revalidate(),
            ControlNode::List(list) => {
                for item in &mut list.items {
                    item.revalidate();
                }
            }
        }
    }

    pub fn is_valid(&self) -> bool {
        match self {
            ControlNode::Field(field) => field.errors().is_empty(),
            ControlNode::Group(group) => group.is_valid(),
            ControlNode::List(list) => list.iter().all(ControlNode::is_valid),
        }
    }

    /// The subtree's current value.
    pub fn value(&self) -> Value {
        match self {
            ControlNode::Field(field) => field.value().clone(),
            ControlNode::Group(group) => group.value(),
            ControlNode::List(list) => Value::Array(list.iter().map(ControlNode::value).collect()),
        }
    }

    pub(crate) fn check_shape(
        &self,
        value: &Value,
        path: &str,
        missing: &mut Vec<String>,
        unexpected: &mut Vec<String>,
    ) {
        match self {
            // Leaves accept any value.
            ControlNode::Field(_) => {}
            ControlNode::Group(group) => group.check_shape(value, path, missing, unexpected),
            ControlNode::List(list) => {
                let Value::Array(items) = value else {
                    unexpected.push(path.to_string());
                    return;
                };
                for (index, item) in items.iter().enumerate() {
                    let item_path = join(path, &index.to_string());
                    match list.get(index) {
                        Some(node) => node.check_shape(item, &item_path, missing, unexpected),
                        None => unexpected.push(item_path),
                    }
                }
                for index in items.len()..list.len() {
                    missing.push(join(path, &index.to_string()));
                }
            }
        }
    }

    pub(crate) fn apply_all(&mut self, value: &Value) {
        match self {
            ControlNode::Field(field) => field.overwrite(value.clone()),
            ControlNode::Group(group) => group.apply_all(value),
            ControlNode::List(list) => {
                if let Value::Array(items) = value {
                    for (node, item) in list.items.iter_mut().zip(items) {
                        node.apply_all(item);
                    }
                }
            }
        }
    }
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::tags;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn sample_group() -> GroupNode {
        GroupNode::new()
            .with_field(
                "name",
                FieldNode::new(json!(""), vec![Rule::Required, Rule::MinLength { min: 3 }]),
            )
            .with_child(
                "inner",
                ControlNode::Group(
                    GroupNode::new().with_field("city", FieldNode::new(json!(""), Vec::new())),
                ),
            )
            .with_child(
                "items",
                ControlNode::List(ListNode::of(vec![ControlNode::Group(
                    GroupNode::new().with_field("zip", FieldNode::new(json!(""), Vec::new())),
                )])),
            )
    }

    #[test]
    fn new_field_is_pristine_with_computed_errors() {
        let field = FieldNode::new(json!(""), vec![Rule::Required]);
        assert!(field.is_pristine());
        assert!(!field.is_touched());
        assert!(field.has_error(tags::REQUIRED));
    }

    #[test]
    fn set_value_marks_dirty_and_revalidates() {
        let mut field = FieldNode::new(json!(""), vec![Rule::Required]);
        field.set_value(json!("sam"));
        assert!(field.is_dirty());
        assert!(field.errors().is_empty());
    }

    #[test]
    fn overwrite_keeps_field_pristine() {
        let mut field = FieldNode::new(json!(""), vec![Rule::Required]);
        field.overwrite(json!("sam"));
        assert!(field.is_pristine());
        assert!(field.errors().is_empty());
    }

    #[test]
    fn rule_swap_takes_effect_on_explicit_revalidate() {
        let mut field = FieldNode::new(json!(""), Vec::new());
        field.set_rules(vec![Rule::Required]);
        // Errors are stale until revalidate is called.
        assert!(field.errors().is_empty());
        field.revalidate();
        assert!(field.has_error(tags::REQUIRED));

        field.clear_rules();
        field.revalidate();
        assert!(field.errors().is_empty());
    }

    #[test]
    fn path_lookup_resolves_nested_and_indexed_nodes() {
        let group = sample_group();
        assert!(group.field("name").is_ok());
        assert!(group.field("inner.city").is_ok());
        assert!(group.field("items.0.zip").is_ok());
    }

    #[test]
    fn unknown_path_is_an_error() {
        let group = sample_group();
        assert_matches!(group.field("nope"), Err(CoreError::UnknownPath(_)));
        assert_matches!(group.field("inner.nope"), Err(CoreError::UnknownPath(_)));
        assert_matches!(group.field("items.7.zip"), Err(CoreError::UnknownPath(_)));
    }

    #[test]
    fn path_type_confusion_is_an_error() {
        let group = sample_group();
        assert_matches!(group.field("inner"), Err(CoreError::NotAField(_)));
        assert_matches!(group.list("name"), Err(CoreError::NotAList(_)));
    }

    #[test]
    fn revalidate_refreshes_the_whole_subtree() {
        let mut group = sample_group();
        group.field_mut("name").unwrap().set_value(json!("sam"));
        group.revalidate();
        assert!(group.field("name").unwrap().errors().is_empty());
    }

    #[test]
    fn value_reconstructs_the_tree_shape() {
        let group = sample_group();
        let value = group.value();
        assert_eq!(value["name"], json!(""));
        assert_eq!(value["inner"]["city"], json!(""));
        assert_eq!(value["items"][0]["zip"], json!(""));
    }

    #[test]
    fn check_shape_reports_missing_and_unexpected_keys() {
        let group = sample_group();
        let record = json!({
            "name": "sam",
            "surname": "unknown",
            "items": [{"zip": "12345"}],
        });
        let mut missing = Vec::new();
        let mut unexpected = Vec::new();
        group.check_shape(&record, "", &mut missing, &mut unexpected);
        assert_eq!(missing, vec!["inner".to_string()]);
        assert_eq!(unexpected, vec!["surname".to_string()]);
    }

    #[test]
    fn check_shape_reports_list_length_mismatch() {
        let group = sample_group();
        let record = json!({
            "name": "sam",
            "inner": {"city": "x"},
            "items": [{"zip": "1"}, {"zip": "2"}],
        });
        let mut missing = Vec::new();
        let mut unexpected = Vec::new();
        group.check_shape(&record, "", &mut missing, &mut unexpected);
        assert!(missing.is_empty());
        assert_eq!(unexpected, vec!["items.1".to_string()]);
    }
}
