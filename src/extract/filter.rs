//! Value filters for extracted item fields

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// A scalar produced by extraction
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Int(i64),
    Float(f64),
}

impl Value {
    fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int(value) => Some(*value as f64),
            Value::Float(value) => Some(*value),
            Value::Text(_) => None,
        }
    }
}

/// Operand for equality predicates, written as a number or a string in TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterOperand {
    Number(f64),
    Text(String),
}

/// Predicates an extracted value must satisfy
///
/// Unset predicates always hold. Numeric bounds are inclusive: a value equal
/// to `less-than` passes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct FilterRule {
    pub less_than: Option<f64>,
    pub greater_than: Option<f64>,
    pub equal_to: Option<FilterOperand>,
    pub not_equal_to: Option<FilterOperand>,

    /// Substring a text value must contain
    pub must_contain: Option<String>,

    /// Parse text values as numbers before applying numeric predicates
    pub coerce_to_number: bool,
}

impl FilterRule {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"-?\d+(?:\.\d+)?").expect("number pattern is valid"))
}

/// Pulls the first signed decimal out of `text`, ignoring thousands separators
///
/// "$1,299.99" becomes `Float(1299.99)`, "42 left" becomes `Int(42)`.
pub fn coerce_to_number(text: &str) -> Option<Value> {
    let cleaned = text.replace(',', "");
    let found = number_pattern().find(&cleaned)?.as_str();

    if found.contains('.') {
        found.parse::<f64>().ok().map(Value::Float)
    } else {
        found.parse::<i64>().ok().map(Value::Int)
    }
}

/// Returns true when `value` satisfies every predicate set on `rule`
///
/// With `coerce_to_number`, a text value that holds no number fails.
pub fn filter_value(value: &Value, rule: &FilterRule) -> bool {
    if let Value::Text(text) = value {
        if rule.coerce_to_number {
            return match coerce_to_number(text) {
                Some(number) => filter_value(&number, rule),
                None => false,
            };
        }
    }

    match value.as_number() {
        Some(number) => filter_number(number, rule),
        None => match value {
            Value::Text(text) => filter_text(text, rule),
            _ => false,
        },
    }
}

fn filter_number(number: f64, rule: &FilterRule) -> bool {
    if let Some(bound) = rule.less_than {
        if number > bound {
            return false;
        }
    }

    if let Some(bound) = rule.greater_than {
        if number < bound {
            return false;
        }
    }

    match &rule.equal_to {
        Some(FilterOperand::Number(expected)) if number != *expected => return false,
        Some(FilterOperand::Text(_)) => return false,
        _ => {}
    }

    if let Some(FilterOperand::Number(excluded)) = &rule.not_equal_to {
        if number == *excluded {
            return false;
        }
    }

    true
}

fn filter_text(text: &str, rule: &FilterRule) -> bool {
    // Numeric bounds on a string that was never coerced cannot hold
    if rule.less_than.is_some() || rule.greater_than.is_some() {
        return false;
    }

    match &rule.equal_to {
        Some(FilterOperand::Text(expected)) if text != expected => return false,
        Some(FilterOperand::Number(_)) => return false,
        _ => {}
    }

    if let Some(FilterOperand::Text(excluded)) = &rule.not_equal_to {
        if text == excluded {
            return false;
        }
    }

    if let Some(needle) = &rule.must_contain {
        if !text.contains(needle.as_str()) {
            return false;
        }
    }

    true
}
