//! Value kinds a field can hold.
//!
//! Besides plain single values a field may hold ranges, comparisons and
//! pattern matches. The [`ValueType`] of the last three is gated per field,
//! see [`FieldConfig::accepts`](crate::FieldConfig::accepts).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Value kinds that a field must explicitly accept.
///
/// Single values have no capability gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Range,
    Comparison,
    PatternMatch,
}

impl ValueType {
    /// Returns the display name of this value type.
    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::Range => "range",
            ValueType::Comparison => "comparison",
            ValueType::PatternMatch => "pattern-match",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scalar value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleValue {
    value: Value,
}

impl SingleValue {
    pub fn new(value: impl Into<Value>) -> Self {
        SingleValue {
            value: value.into(),
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// A bounded interval.
///
/// Both bounds are inclusive unless stated otherwise. `lower <= upper` is
/// checked when the range is accepted as input, not here.
///
/// # Example
///
/// ```
/// use quarry::Range;
///
/// let range = Range::new(10, 20).with_upper_exclusive();
/// assert!(range.is_lower_inclusive());
/// assert!(!range.is_upper_inclusive());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Range {
    lower: Value,
    upper: Value,
    lower_inclusive: bool,
    upper_inclusive: bool,
}

impl Range {
    /// Creates a range with both bounds inclusive.
    pub fn new(lower: impl Into<Value>, upper: impl Into<Value>) -> Self {
        Range {
            lower: lower.into(),
            upper: upper.into(),
            lower_inclusive: true,
            upper_inclusive: true,
        }
    }

    pub fn with_inclusive(mut self, lower: bool, upper: bool) -> Self {
        self.lower_inclusive = lower;
        self.upper_inclusive = upper;
        self
    }

    pub fn with_lower_exclusive(mut self) -> Self {
        self.lower_inclusive = false;
        self
    }

    pub fn with_upper_exclusive(mut self) -> Self {
        self.upper_inclusive = false;
        self
    }

    pub fn lower(&self) -> &Value {
        &self.lower
    }

    pub fn upper(&self) -> &Value {
        &self.upper
    }

    pub fn is_lower_inclusive(&self) -> bool {
        self.lower_inclusive
    }

    pub fn is_upper_inclusive(&self) -> bool {
        self.upper_inclusive
    }
}

/// Comparison operator of a [`Compare`] value.
///
/// `Ne` is the exclusive operator, every other operator is inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    /// Less than.
    #[serde(rename = "<")]
    Lt,
    /// Less than or equal.
    #[serde(rename = "<=")]
    Lte,
    /// Greater than.
    #[serde(rename = ">")]
    Gt,
    /// Greater than or equal.
    #[serde(rename = ">=")]
    Gte,
    /// Not equal.
    #[serde(rename = "<>")]
    Ne,
}

impl CompareOp {
    /// Parses the operator from its symbol.
    pub fn parse(symbol: &str) -> Option<CompareOp> {
        match symbol {
            "<" => Some(CompareOp::Lt),
            "<=" => Some(CompareOp::Lte),
            ">" => Some(CompareOp::Gt),
            ">=" => Some(CompareOp::Gte),
            "<>" => Some(CompareOp::Ne),
            _ => None,
        }
    }

    /// Returns `true` for the exclusive operator (`<>`).
    pub fn is_exclusive(self) -> bool {
        self == CompareOp::Ne
    }

    /// Returns the operator symbol.
    pub fn as_str(self) -> &'static str {
        match self {
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Ne => "<>",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An operator-qualified value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Compare {
    operator: CompareOp,
    value: Value,
}

impl Compare {
    pub fn new(operator: CompareOp, value: impl Into<Value>) -> Self {
        Compare {
            operator,
            value: value.into(),
        }
    }

    pub fn operator(&self) -> CompareOp {
        self.operator
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn is_exclusive(&self) -> bool {
        self.operator.is_exclusive()
    }
}

/// How a [`PatternMatch`] matches its column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternKind {
    /// Column contains the pattern.
    Contains,
    /// Column starts with the pattern.
    StartsWith,
    /// Column ends with the pattern.
    EndsWith,
    /// Column equals the pattern (optionally ignoring case).
    Equals,
    /// Column matches the pattern as a regular expression.
    Regex,
}

impl PatternKind {
    /// Parses a pattern type name such as `CONTAINS` or `NOT_REGEX`.
    ///
    /// Returns the kind and whether the `NOT_` (exclusive) prefix was present.
    pub fn parse(name: &str) -> Option<(PatternKind, bool)> {
        let upper = name.to_ascii_uppercase();
        let (body, exclusive) = match upper.strip_prefix("NOT_") {
            Some(rest) => (rest, true),
            None => (upper.as_str(), false),
        };

        let kind = match body {
            "CONTAINS" => PatternKind::Contains,
            "STARTS_WITH" => PatternKind::StartsWith,
            "ENDS_WITH" => PatternKind::EndsWith,
            "EQUALS" => PatternKind::Equals,
            "REGEX" => PatternKind::Regex,
            _ => return None,
        };

        Some((kind, exclusive))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PatternKind::Contains => "CONTAINS",
            PatternKind::StartsWith => "STARTS_WITH",
            PatternKind::EndsWith => "ENDS_WITH",
            PatternKind::Equals => "EQUALS",
            PatternKind::Regex => "REGEX",
        }
    }
}

/// A string-matching predicate.
///
/// # Example
///
/// ```
/// use quarry::{PatternKind, PatternMatch};
///
/// let pattern = PatternMatch::new("acme", PatternKind::StartsWith)
///     .case_insensitive()
///     .exclusive();
/// assert!(pattern.is_exclusive());
/// assert!(pattern.is_case_insensitive());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternMatch {
    value: String,
    kind: PatternKind,
    case_insensitive: bool,
    exclusive: bool,
}

impl PatternMatch {
    pub fn new(value: impl Into<String>, kind: PatternKind) -> Self {
        PatternMatch {
            value: value.into(),
            kind,
            case_insensitive: false,
            exclusive: false,
        }
    }

    pub fn case_insensitive(mut self) -> Self {
        self.case_insensitive = true;
        self
    }

    pub fn exclusive(mut self) -> Self {
        self.exclusive = true;
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    pub fn is_exclusive(&self) -> bool {
        self.exclusive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compare_op_symbols() {
        for op in [
            CompareOp::Lt,
            CompareOp::Lte,
            CompareOp::Gt,
            CompareOp::Gte,
            CompareOp::Ne,
        ] {
            assert_eq!(CompareOp::parse(op.as_str()), Some(op));
        }
        assert_eq!(CompareOp::parse("=="), None);
        assert_eq!(CompareOp::Gte.to_string(), ">=");
    }

    #[test]
    fn only_not_equal_is_exclusive() {
        assert!(CompareOp::Ne.is_exclusive());
        assert!(!CompareOp::Lt.is_exclusive());
        assert!(!CompareOp::Gte.is_exclusive());
        assert!(Compare::new(CompareOp::Ne, 1).is_exclusive());
    }

    #[test]
    fn pattern_kind_parsing() {
        assert_eq!(
            PatternKind::parse("CONTAINS"),
            Some((PatternKind::Contains, false))
        );
        assert_eq!(
            PatternKind::parse("not_starts_with"),
            Some((PatternKind::StartsWith, true))
        );
        assert_eq!(
            PatternKind::parse("NOT_REGEX"),
            Some((PatternKind::Regex, true))
        );
        assert_eq!(PatternKind::parse("LIKE"), None);
        assert_eq!(PatternKind::parse("NOT_"), None);
    }

    #[test]
    fn range_inclusivity() {
        let range = Range::new(1, 5);
        assert!(range.is_lower_inclusive() && range.is_upper_inclusive());

        let range = range.with_inclusive(false, true);
        assert!(!range.is_lower_inclusive());
        assert!(range.is_upper_inclusive());
        assert_eq!(range.lower(), &Value::from(1));
    }

    #[test]
    fn value_type_names() {
        assert_eq!(ValueType::Range.to_string(), "range");
        assert_eq!(ValueType::Comparison.to_string(), "comparison");
        assert_eq!(ValueType::PatternMatch.to_string(), "pattern-match");
    }
}
