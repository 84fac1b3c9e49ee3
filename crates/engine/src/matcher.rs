//! Single (text, operator, value) tests.
//!
//! Every failure mode evaluates to `false`: an invalid regex, a value that is
//! not a number for a numeric operator, a missing value. Nothing here returns
//! an error.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::rules::{MatchOp, MatchValue};

/// `1,234,567.89` style: grouped thousands with an optional fraction.
static GROUPED_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d{1,3}(,\d{3})*(\.\d+)?$").expect("valid regex"));

/// Plain digits with an optional fraction.
static PLAIN_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+(\.\d+)?$").expect("valid regex"));

/// Longest numeric prefix a lenient parse will accept.
static LEADING_FLOAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:Infinity|(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)").expect("valid regex")
});

/// How numeric operators read cell text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NumericMode {
    /// The whole trimmed text must be a number, optionally with `,` grouping.
    #[default]
    Strict,
    /// Strip `,` and take the leading number, ignoring trailing text.
    Lenient,
}

impl NumericMode {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            NumericMode::Strict
        } else {
            NumericMode::Lenient
        }
    }
}

/// Parse a number the way numeric operators see it. `None` means "not a
/// number" and makes any comparison false.
pub fn parse_number(text: &str, mode: NumericMode) -> Option<f64> {
    let trimmed = text.trim();
    if mode == NumericMode::Strict
        && !(GROUPED_NUMBER.is_match(trimmed) || PLAIN_NUMBER.is_match(trimmed))
    {
        return None;
    }

    let cleaned = trimmed.replace(',', "");
    let literal = LEADING_FLOAT.find(&cleaned)?.as_str();
    literal.parse::<f64>().ok().filter(|n| !n.is_nan())
}

fn compare(op: MatchOp, x: f64, y: f64) -> bool {
    match op {
        MatchOp::Eq => x == y,
        MatchOp::Gt => x > y,
        MatchOp::Lt => x < y,
        MatchOp::Ge => x >= y,
        MatchOp::Le => x <= y,
        _ => false,
    }
}

/// Evaluates match operators against cell text.
///
/// User regex patterns are compiled once per evaluator; a pattern that fails
/// to compile is cached as `None` so it is not retried for every cell.
#[derive(Debug, Default)]
pub struct MatchEvaluator {
    mode: NumericMode,
    regex_cache: RefCell<HashMap<String, Option<fancy_regex::Regex>>>,
}

impl MatchEvaluator {
    pub fn new(mode: NumericMode) -> Self {
        Self { mode, regex_cache: RefCell::new(HashMap::new()) }
    }

    pub fn mode(&self) -> NumericMode {
        self.mode
    }

    pub fn evaluate(&self, text: &str, op: MatchOp, value: Option<&MatchValue>) -> bool {
        let text = text.trim();

        if op.is_numeric() {
            return self.evaluate_numeric(text, op, value);
        }

        let t = text.to_lowercase();
        let v = value.map(MatchValue::as_text).unwrap_or_default().to_lowercase();

        match op {
            MatchOp::Is => t == v,
            MatchOp::IsNot => t != v,
            MatchOp::Contains => t.contains(&v),
            MatchOp::NotContains => !t.contains(&v),
            MatchOp::StartsWith => t.starts_with(&v),
            MatchOp::EndsWith => t.ends_with(&v),
            MatchOp::NotStartsWith => !t.starts_with(&v),
            MatchOp::NotEndsWith => !t.ends_with(&v),
            MatchOp::IsEmpty => text.is_empty(),
            MatchOp::IsNotEmpty => !text.is_empty(),
            MatchOp::IsRegex => {
                let pattern = value.map(MatchValue::as_text).unwrap_or_default();
                self.regex_matches(&pattern, text)
            }
            MatchOp::Eq | MatchOp::Gt | MatchOp::Lt | MatchOp::Ge | MatchOp::Le => false,
        }
    }

    fn evaluate_numeric(&self, text: &str, op: MatchOp, value: Option<&MatchValue>) -> bool {
        let Some(x) = parse_number(text, self.mode) else {
            return false;
        };
        let y = match value {
            Some(MatchValue::Number(n)) if !n.is_nan() => *n,
            Some(MatchValue::Text(s)) => match parse_number(s, self.mode) {
                Some(n) => n,
                None => return false,
            },
            _ => return false,
        };
        compare(op, x, y)
    }

    fn regex_matches(&self, pattern: &str, text: &str) -> bool {
        let mut cache = self.regex_cache.borrow_mut();
        let compiled = cache.entry(pattern.to_string()).or_insert_with(|| {
            match fancy_regex::Regex::new(&format!("(?i){}", pattern)) {
                Ok(re) => Some(re),
                Err(e) => {
                    log::debug!("invalid match pattern '{}': {}", pattern, e);
                    None
                }
            }
        });
        // Backtrack-limit errors count as no match.
        compiled.as_ref().is_some_and(|re| re.is_match(text).unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(text: &str, op: MatchOp, value: impl Into<MatchValue>) -> bool {
        MatchEvaluator::new(NumericMode::Strict).evaluate(text, op, Some(&value.into()))
    }

    fn eval_lenient(text: &str, op: MatchOp, value: impl Into<MatchValue>) -> bool {
        MatchEvaluator::new(NumericMode::Lenient).evaluate(text, op, Some(&value.into()))
    }

    #[test]
    fn test_string_ops_ignore_case_and_padding() {
        assert!(eval("  Done ", MatchOp::Is, "done"));
        assert!(eval("Done", MatchOp::IsNot, "don"));
        assert!(eval("In Progress", MatchOp::Contains, "PROG"));
        assert!(eval("In Progress", MatchOp::NotContains, "done"));
        assert!(eval("Alpha", MatchOp::StartsWith, "al"));
        assert!(eval("Alpha", MatchOp::EndsWith, "HA"));
        assert!(eval("Alpha", MatchOp::NotStartsWith, "b"));
        assert!(!eval("Alpha", MatchOp::NotEndsWith, "a"));
    }

    #[test]
    fn test_empty_ops() {
        let ev = MatchEvaluator::default();
        assert!(ev.evaluate("   ", MatchOp::IsEmpty, None));
        assert!(!ev.evaluate(" x ", MatchOp::IsEmpty, None));
        assert!(ev.evaluate("x", MatchOp::IsNotEmpty, None));
    }

    #[test]
    fn test_missing_value_reads_as_empty_string() {
        let ev = MatchEvaluator::default();
        assert!(ev.evaluate("", MatchOp::Is, None));
        assert!(ev.evaluate("abc", MatchOp::Contains, None));
    }

    #[test]
    fn test_numeric_value_compared_as_text() {
        assert!(eval("100", MatchOp::Is, 100));
        assert!(eval("1.5", MatchOp::Is, 1.5));
    }

    #[test]
    fn test_strict_numbers() {
        assert!(eval("12,345.67", MatchOp::Gt, 100));
        assert!(eval("-5", MatchOp::Lt, 0));
        assert!(eval("7", MatchOp::Eq, "7.0"));
        assert!(eval("3", MatchOp::Ge, 3));
        assert!(eval("3", MatchOp::Le, 3));
        assert!(!eval("v1.2", MatchOp::Gt, 1));
        assert!(!eval("1,23", MatchOp::Gt, 1));
        assert!(!eval("12abc", MatchOp::Gt, 1));
        assert!(!eval("", MatchOp::Eq, 0));
    }

    #[test]
    fn test_eq_is_exact() {
        assert!(!eval("0.0000000000000001", MatchOp::Eq, "0.0000000000000002"));
        assert!(eval("0.1", MatchOp::Eq, "0.10"));
        assert!(eval("-0", MatchOp::Eq, 0));
    }

    #[test]
    fn test_lenient_numbers() {
        assert!(!eval_lenient("v1.2", MatchOp::Gt, 1));
        assert!(eval_lenient("1,234", MatchOp::Gt, 100));
        assert!(eval_lenient("12abc", MatchOp::Eq, 12));
        assert!(eval_lenient("1,23", MatchOp::Eq, 123));
        assert!(!eval_lenient("abc", MatchOp::Lt, 1000));
    }

    #[test]
    fn test_unparseable_operand_is_false() {
        assert!(!eval("5", MatchOp::Gt, "five"));
        assert!(!MatchEvaluator::default().evaluate("5", MatchOp::Gt, None));
    }

    #[test]
    fn test_regex() {
        assert!(eval("Error: disk", MatchOp::IsRegex, "^error"));
        assert!(eval("abc123", MatchOp::IsRegex, r"\d{3}$"));
        assert!(!eval("abc", MatchOp::IsRegex, r"\d"));
    }

    #[test]
    fn test_invalid_regex_is_false() {
        let ev = MatchEvaluator::default();
        let pattern = MatchValue::from("(");
        assert!(!ev.evaluate("anything", MatchOp::IsRegex, Some(&pattern)));
        // Second call hits the cached failure.
        assert!(!ev.evaluate("(", MatchOp::IsRegex, Some(&pattern)));
    }

    #[test]
    fn test_parse_number_modes() {
        assert_eq!(parse_number(" 1,000 ", NumericMode::Strict), Some(1000.0));
        assert_eq!(parse_number("1000.5", NumericMode::Strict), Some(1000.5));
        assert_eq!(parse_number("+3", NumericMode::Strict), None);
        assert_eq!(parse_number("+3", NumericMode::Lenient), Some(3.0));
        assert_eq!(parse_number(".5x", NumericMode::Lenient), Some(0.5));
        assert_eq!(parse_number("1e3", NumericMode::Lenient), Some(1000.0));
        assert_eq!(parse_number("-", NumericMode::Lenient), None);
    }
}
