//! Per-field value buckets.

use serde::{Deserialize, Serialize};

use crate::value::Value;
use crate::values::{Compare, CompareOp, PatternMatch, Range, SingleValue};

/// All values of one field within one [`ValuesGroup`](crate::ValuesGroup).
///
/// Single values and ranges are kept in separate included and excluded
/// buckets. Comparisons and pattern matches describe their own inclusion
/// (`<>` and `exclusive` respectively), so they share one bucket each.
///
/// Values keep their insertion order.
///
/// # Example
///
/// ```
/// use quarry::{CompareOp, ValuesBag};
///
/// let bag = ValuesBag::new()
///     .with_single_value(1)
///     .with_single_value(2)
///     .with_excluded_value(5)
///     .with_comparison(CompareOp::Gt, 0);
/// assert_eq!(bag.count(), 4);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuesBag {
    single_values: Vec<SingleValue>,
    excluded_values: Vec<SingleValue>,
    ranges: Vec<Range>,
    excluded_ranges: Vec<Range>,
    comparisons: Vec<Compare>,
    pattern_matchers: Vec<PatternMatch>,
}

impl ValuesBag {
    pub fn new() -> Self {
        ValuesBag::default()
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    pub fn add_single_value(&mut self, value: impl Into<Value>) -> &mut Self {
        self.single_values.push(SingleValue::new(value));
        self
    }

    pub fn add_excluded_value(&mut self, value: impl Into<Value>) -> &mut Self {
        self.excluded_values.push(SingleValue::new(value));
        self
    }

    pub fn add_range(&mut self, range: Range) -> &mut Self {
        self.ranges.push(range);
        self
    }

    pub fn add_excluded_range(&mut self, range: Range) -> &mut Self {
        self.excluded_ranges.push(range);
        self
    }

    pub fn add_comparison(&mut self, compare: Compare) -> &mut Self {
        self.comparisons.push(compare);
        self
    }

    pub fn add_pattern_match(&mut self, pattern: PatternMatch) -> &mut Self {
        self.pattern_matchers.push(pattern);
        self
    }

    /// Appends all values of `other`, keeping their order.
    pub fn merge(&mut self, other: ValuesBag) {
        self.single_values.extend(other.single_values);
        self.excluded_values.extend(other.excluded_values);
        self.ranges.extend(other.ranges);
        self.excluded_ranges.extend(other.excluded_ranges);
        self.comparisons.extend(other.comparisons);
        self.pattern_matchers.extend(other.pattern_matchers);
    }

    // ========================================================================
    // Builder shorthands
    // ========================================================================

    pub fn with_single_value(mut self, value: impl Into<Value>) -> Self {
        self.add_single_value(value);
        self
    }

    pub fn with_excluded_value(mut self, value: impl Into<Value>) -> Self {
        self.add_excluded_value(value);
        self
    }

    pub fn with_range(mut self, range: Range) -> Self {
        self.add_range(range);
        self
    }

    pub fn with_excluded_range(mut self, range: Range) -> Self {
        self.add_excluded_range(range);
        self
    }

    pub fn with_comparison(mut self, operator: CompareOp, value: impl Into<Value>) -> Self {
        self.add_comparison(Compare::new(operator, value));
        self
    }

    pub fn with_pattern_match(mut self, pattern: PatternMatch) -> Self {
        self.add_pattern_match(pattern);
        self
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    pub fn single_values(&self) -> &[SingleValue] {
        &self.single_values
    }

    pub fn excluded_values(&self) -> &[SingleValue] {
        &self.excluded_values
    }

    pub fn ranges(&self) -> &[Range] {
        &self.ranges
    }

    pub fn excluded_ranges(&self) -> &[Range] {
        &self.excluded_ranges
    }

    pub fn comparisons(&self) -> &[Compare] {
        &self.comparisons
    }

    pub fn pattern_matchers(&self) -> &[PatternMatch] {
        &self.pattern_matchers
    }

    /// Total number of values of every kind.
    pub fn count(&self) -> usize {
        self.single_values.len()
            + self.excluded_values.len()
            + self.ranges.len()
            + self.excluded_ranges.len()
            + self.comparisons.len()
            + self.pattern_matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }
}
