//! Field declarations.
//!
//! A [`FieldConfig`] declares a search dimension and which value kinds it
//! accepts. A [`FieldSet`] is the process-wide collection of them, built
//! once and shared read-only.

use indexmap::IndexMap;

use crate::values::ValueType;

/// Free-form field options, consumed by conversions downstream.
pub type FieldOptions = serde_json::Map<String, serde_json::Value>;

/// Declaration of one search field.
///
/// Fields accept only single values unless ranges, comparisons or pattern
/// matches are explicitly enabled.
///
/// # Example
///
/// ```
/// use quarry::{FieldConfig, ValueType};
///
/// let price = FieldConfig::new("price").accept_ranges(true).accept_compares(true);
/// assert!(price.accepts(ValueType::Range));
/// assert!(!price.accepts(ValueType::PatternMatch));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FieldConfig {
    name: String,
    accept_ranges: bool,
    accept_compares: bool,
    accept_pattern_match: bool,
    options: FieldOptions,
}

impl FieldConfig {
    pub fn new(name: impl Into<String>) -> Self {
        FieldConfig {
            name: name.into(),
            accept_ranges: false,
            accept_compares: false,
            accept_pattern_match: false,
            options: FieldOptions::new(),
        }
    }

    pub fn accept_ranges(mut self, accept: bool) -> Self {
        self.accept_ranges = accept;
        self
    }

    pub fn accept_compares(mut self, accept: bool) -> Self {
        self.accept_compares = accept;
        self
    }

    pub fn accept_pattern_match(mut self, accept: bool) -> Self {
        self.accept_pattern_match = accept;
        self
    }

    pub fn with_option(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn accepts_ranges(&self) -> bool {
        self.accept_ranges
    }

    pub fn accepts_compares(&self) -> bool {
        self.accept_compares
    }

    pub fn accepts_pattern_match(&self) -> bool {
        self.accept_pattern_match
    }

    /// Returns `true` if the field accepts values of the given type.
    pub fn accepts(&self, value_type: ValueType) -> bool {
        match value_type {
            ValueType::Range => self.accept_ranges,
            ValueType::Comparison => self.accept_compares,
            ValueType::PatternMatch => self.accept_pattern_match,
        }
    }

    pub fn options(&self) -> &FieldOptions {
        &self.options
    }

    pub fn option(&self, key: &str) -> Option<&serde_json::Value> {
        self.options.get(key)
    }
}

/// A named set of fields, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSet {
    name: String,
    fields: IndexMap<String, FieldConfig>,
}

impl FieldSet {
    pub fn new(name: impl Into<String>) -> Self {
        FieldSet {
            name: name.into(),
            fields: IndexMap::new(),
        }
    }

    /// Adds a field, replacing any field with the same name.
    pub fn with_field(mut self, field: FieldConfig) -> Self {
        self.fields.insert(field.name().to_string(), field);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&FieldConfig> {
        self.fields.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldConfig> {
        self.fields.values()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
