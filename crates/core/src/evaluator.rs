//! Rule evaluator — pure logic, no tree mutation.
//!
//! All functions here are total over JSON values: malformed input (e.g. a
//! non-numeric rating) produces an error tag, never a panic or an `Err`.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::rules::{tags, GroupRule, Rule};
use crate::tree::GroupNode;

/// Conventional email pattern: one `@`, non-empty local part, dotted domain.
const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EMAIL_PATTERN).expect("valid regex"));

/// Evaluate all leaf rules against a single value, producing the error map
/// (tag → presence) for the owning field.
pub fn evaluate_field(rules: &[Rule], value: &Value) -> BTreeMap<&'static str, bool> {
    rules
        .iter()
        .filter_map(|rule| evaluate_rule(rule, value))
        .map(|tag| (tag, true))
        .collect()
}

/// Evaluate all group rules against a group's direct children.
pub fn evaluate_group(rules: &[GroupRule], group: &GroupNode) -> BTreeMap<&'static str, bool> {
    rules
        .iter()
        .filter_map(|rule| evaluate_group_rule(rule, group))
        .map(|tag| (tag, true))
        .collect()
}

fn evaluate_rule(rule: &Rule, value: &Value) -> Option<&'static str> {
    match rule {
        Rule::Required => evaluate_required(value),
        Rule::MinLength { min } => evaluate_min_length(*min, value),
        Rule::MaxLength { max } => evaluate_max_length(*max, value),
        Rule::EmailFormat => evaluate_email_format(value),
        Rule::Range { min, max } => evaluate_range(*min, *max, value),
    }
}

fn evaluate_group_rule(rule: &GroupRule, group: &GroupNode) -> Option<&'static str> {
    match rule {
        GroupRule::Match { first, second } => evaluate_match(first, second, group),
    }
}

fn evaluate_required(value: &Value) -> Option<&'static str> {
    match value {
        Value::Null => Some(tags::REQUIRED),
        Value::String(s) if s.is_empty() => Some(tags::REQUIRED),
        _ => None,
    }
}

fn evaluate_min_length(min: usize, value: &Value) -> Option<&'static str> {
    let s = value.as_str()?;
    if s.len() < min {
        Some(tags::MIN_LENGTH)
    } else {
        None
    }
}

fn evaluate_max_length(max: usize, value: &Value) -> Option<&'static str> {
    let s = value.as_str()?;
    if s.len() > max {
        Some(tags::MAX_LENGTH)
    } else {
        None
    }
}

fn evaluate_email_format(value: &Value) -> Option<&'static str> {
    let s = value.as_str()?;
    // Empty values are the required rule's concern.
    if s.is_empty() || EMAIL_RE.is_match(s) {
        None
    } else {
        Some(tags::EMAIL)
    }
}

fn evaluate_range(min: i64, max: i64, value: &Value) -> Option<&'static str> {
    if value.is_null() {
        return None;
    }
    match value.as_f64() {
        Some(n) if n < min as f64 || n > max as f64 => Some(tags::RANGE),
        Some(_) => None,
        // Non-numeric values are a range violation, not an exception.
        None => Some(tags::RANGE),
    }
}

/// Cross-field match: inert while either participant is pristine, so an
/// untouched confirmation field is never flagged.
fn evaluate_match(first: &str, second: &str, group: &GroupNode) -> Option<&'static str> {
    let a = group.child_field(first)?;
    let b = group.child_field(second)?;

    if a.is_pristine() || b.is_pristine() {
        return None;
    }
    if a.value() == b.value() {
        None
    } else {
        Some(tags::MATCH)
    }
}
