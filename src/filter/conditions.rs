//! Filter condition grammar: `||`-separated groups of `&&`-joined conditions
//!
//! A condition is one of
//! - a numeric comparison (`>3`, `<=10`, `=100`, or a bare number) applied to
//!   numeric values,
//! - a `%` wildcard pattern (`%auth%`, `%.com`, `api%`),
//! - a case-insensitive exact match.
//!
//! Malformed conditions never fail; they fall through to the next strategy.

use regex::Regex;
use std::sync::OnceLock;

use crate::domain::Scalar;

/// OR-list of AND-lists of raw conditions
pub type ConditionGroups = Vec<Vec<String>>;

/// Whether a value is compared numerically or as text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Number,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Gt,
    Lt,
    Ge,
    Le,
    Eq,
}

impl Operator {
    fn from_token(token: &str) -> Operator {
        match token {
            ">" => Operator::Gt,
            "<" => Operator::Lt,
            ">=" => Operator::Ge,
            "<=" => Operator::Le,
            _ => Operator::Eq,
        }
    }

    fn holds(self, value: f64, bound: f64) -> bool {
        match self {
            Operator::Gt => value > bound,
            Operator::Lt => value < bound,
            Operator::Ge => value >= bound,
            Operator::Le => value <= bound,
            Operator::Eq => value == bound,
        }
    }
}

fn operator_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:[<>]=?|=)").expect("operator pattern is valid"))
}

fn float_prefix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[+-]?(?:Infinity|(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)")
            .expect("float pattern is valid")
    })
}

/// Read the longest numeric prefix of `text`, ignoring leading whitespace.
///
/// `"10abc"` reads as 10, `"abc"` and `"%5"` do not read at all.
pub fn parse_float_prefix(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let matched = float_prefix_regex().find(text)?.as_str();
    let unsigned = matched.trim_start_matches(['+', '-']);
    let number = if unsigned == "Infinity" {
        f64::INFINITY
    } else {
        unsigned.parse::<f64>().ok()?
    };

    if matched.starts_with('-') {
        Some(-number)
    } else {
        Some(number)
    }
}

/// Split a filter expression into OR-groups of AND-conditions.
/// Empty tokens and empty groups are dropped.
pub fn parse_conditions(filter: &str) -> ConditionGroups {
    filter
        .split("||")
        .map(|group| {
            group
                .split("&&")
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .filter(|group| !group.is_empty())
        .collect()
}

/// Numeric when the value is a number or text holding one complete finite number
pub fn determine_field_type(value: &Scalar) -> FieldType {
    if value.as_number().is_some() {
        FieldType::Number
    } else {
        FieldType::Text
    }
}

/// Evaluate one condition against a value rendered as text
pub fn matches_condition(value: &str, condition: &str, field_type: FieldType) -> bool {
    if field_type == FieldType::Number {
        let token = operator_regex()
            .find(condition)
            .map(|m| m.as_str())
            .unwrap_or("");
        let remainder = &condition[token.len()..];

        if let Some(bound) = parse_float_prefix(remainder) {
            let actual = parse_float_prefix(value).unwrap_or(f64::NAN);
            return Operator::from_token(token).holds(actual, bound);
        }
    }

    if condition.contains('%') {
        let starts_wild = condition.starts_with('%');
        let ends_wild = condition.ends_with('%');
        let pattern = condition.replace('%', "").to_lowercase();
        let value = value.to_lowercase();

        match (starts_wild, ends_wild) {
            (true, true) => return value.contains(&pattern),
            (true, false) => return value.ends_with(&pattern),
            (false, true) => return value.starts_with(&pattern),
            (false, false) => {}
        }
    }

    value.to_lowercase() == condition.to_lowercase()
}

/// True when some group has all of its conditions satisfied.
/// No groups means the filter is inert and everything matches.
pub fn matches_conditions(value: &str, groups: &[Vec<String>], field_type: FieldType) -> bool {
    if groups.is_empty() {
        return true;
    }

    groups.iter().any(|group| {
        group
            .iter()
            .all(|condition| matches_condition(value, condition, field_type))
    })
}

/// Evaluate a filter expression against an optional resolved value.
/// A missing or empty value never passes a non-empty filter.
pub fn value_matches_filter(value: Option<&Scalar>, filter: &str) -> bool {
    let groups = parse_conditions(filter);
    if groups.is_empty() {
        return true;
    }

    match value {
        Some(value) if !value.is_empty() => {
            matches_conditions(&value.to_string(), &groups, determine_field_type(value))
        }
        _ => false,
    }
}
