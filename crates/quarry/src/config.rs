//! Input processor configuration.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::field::FieldSet;

/// Structural limits enforced on every accepted search expression.
///
/// Missing keys fall back to their defaults when deserializing:
///
/// ```
/// use quarry::Limits;
///
/// let limits = Limits::from_yaml("max-groups: 5\n").unwrap();
/// assert_eq!(limits.max_groups, 5);
/// assert_eq!(limits.max_nesting_level, 100);
/// assert_eq!(limits.max_values, 10_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Limits {
    /// Deepest allowed group nesting, the root group being level 0.
    pub max_nesting_level: usize,
    /// Maximum number of sibling groups within one group.
    pub max_groups: usize,
    /// Maximum number of values per field within one group.
    pub max_values: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_nesting_level: 100,
            max_groups: 100,
            max_values: 10_000,
        }
    }
}

impl Limits {
    /// Parses limits from a YAML document.
    pub fn from_yaml(source: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(source)?)
    }

    /// Parses limits from a JSON document.
    pub fn from_json(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }
}

/// Configuration handed to an input processor.
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    field_set: Arc<FieldSet>,
    limits: Limits,
}

impl ProcessorConfig {
    pub fn new(field_set: impl Into<Arc<FieldSet>>) -> Self {
        ProcessorConfig {
            field_set: field_set.into(),
            limits: Limits::default(),
        }
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_max_nesting_level(mut self, max: usize) -> Self {
        self.limits.max_nesting_level = max;
        self
    }

    pub fn with_max_groups(mut self, max: usize) -> Self {
        self.limits.max_groups = max;
        self
    }

    pub fn with_max_values(mut self, max: usize) -> Self {
        self.limits.max_values = max;
        self
    }

    pub fn field_set(&self) -> &Arc<FieldSet> {
        &self.field_set
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn max_nesting_level(&self) -> usize {
        self.limits.max_nesting_level
    }

    pub fn max_groups(&self) -> usize {
        self.limits.max_groups
    }

    pub fn max_values(&self) -> usize {
        self.limits.max_values
    }
}
