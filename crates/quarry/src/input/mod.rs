//! Input acceptance.
//!
//! Every concrete input format walks its own raw syntax but routes field
//! names, group structure and value kinds through an [`InputContext`], so
//! that the same limits hold regardless of syntax.

mod json;

pub use json::JsonInput;

use tracing::debug;

use crate::alias::FieldAliasResolver;
use crate::config::ProcessorConfig;
use crate::error::{Result, SearchError};
use crate::field::FieldConfig;
use crate::group::SearchCondition;
use crate::values::{PatternKind, PatternMatch, Range, ValueType};

/// Turns raw, untrusted input into a [`SearchCondition`].
pub trait InputProcessor {
    /// The raw input this processor understands.
    type Input: ?Sized;

    /// Processes the input against the configured field set and limits.
    ///
    /// Empty input yields a condition with an empty root group.
    fn process(&self, config: &ProcessorConfig, input: &Self::Input) -> Result<SearchCondition>;
}

/// Shared acceptance checks, bound to one processing run.
pub struct InputContext<'a> {
    config: &'a ProcessorConfig,
    aliases: &'a dyn FieldAliasResolver,
}

impl<'a> InputContext<'a> {
    pub fn new(config: &'a ProcessorConfig, aliases: &'a dyn FieldAliasResolver) -> Self {
        InputContext { config, aliases }
    }

    pub fn config(&self) -> &'a ProcessorConfig {
        self.config
    }

    /// Resolves a raw name through the alias resolver and returns the
    /// declaration of the canonical field.
    pub fn resolve_field_name(&self, name: &str) -> Result<&'a FieldConfig> {
        let field_set = self.config.field_set();
        let resolved = self.aliases.resolve_field_name(field_set, name);

        match field_set.get(&resolved) {
            Some(field) => Ok(field),
            None => {
                debug!(raw = name, resolved = %resolved, "rejected unknown field");
                Err(SearchError::UnknownField(resolved))
            }
        }
    }

    /// Checks the nesting level of a group before its content is processed.
    pub fn validate_group_nesting(&self, group_idx: usize, level: usize) -> Result<()> {
        let max = self.config.max_nesting_level();
        if level > max {
            debug!(max, group_idx, level, "rejected group nesting");
            return Err(SearchError::GroupsNesting {
                max,
                group_idx,
                level,
            });
        }
        Ok(())
    }

    /// Checks the number of sibling groups within one group.
    pub fn validate_groups_count(
        &self,
        group_idx: usize,
        count: usize,
        level: usize,
    ) -> Result<()> {
        let max = self.config.max_groups();
        if count > max {
            debug!(max, count, group_idx, level, "rejected group count");
            return Err(SearchError::GroupsOverflow {
                max,
                count,
                group_idx,
                level,
            });
        }
        Ok(())
    }

    /// Checks the number of values a field holds within one group.
    pub fn validate_values_count(
        &self,
        field: &FieldConfig,
        count: usize,
        group_idx: usize,
        level: usize,
    ) -> Result<()> {
        let max = self.config.max_values();
        if count > max {
            debug!(field = field.name(), max, count, "rejected values count");
            return Err(SearchError::ValuesOverflow {
                field: field.name().to_string(),
                max,
                count,
                group_idx,
                level,
            });
        }
        Ok(())
    }

    /// Fails unless the field accepts values of the given type.
    pub fn assert_accepts_type(&self, field: &FieldConfig, value_type: ValueType) -> Result<()> {
        if field.accepts(value_type) {
            return Ok(());
        }
        debug!(field = field.name(), %value_type, "rejected value type");
        Err(SearchError::UnsupportedValueType {
            field: field.name().to_string(),
            value_type,
        })
    }

    /// Checks that the range bounds are comparable and ordered.
    pub fn validate_range(&self, field: &FieldConfig, range: &Range) -> Result<()> {
        let reason = match range.lower().compare(range.upper()) {
            Some(std::cmp::Ordering::Greater) => "lower bound is greater than upper bound",
            Some(_) => return Ok(()),
            None => "bounds are not comparable",
        };
        Err(SearchError::InvalidRange {
            field: field.name().to_string(),
            reason,
        })
    }

    /// Checks that a regex pattern compiles.
    pub fn validate_pattern(&self, field: &FieldConfig, pattern: &PatternMatch) -> Result<()> {
        if pattern.kind() != PatternKind::Regex {
            return Ok(());
        }
        regex::Regex::new(pattern.value())
            .map(|_| ())
            .map_err(|source| SearchError::InvalidPattern {
                field: field.name().to_string(),
                source,
            })
    }
}
