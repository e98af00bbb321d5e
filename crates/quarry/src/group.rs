//! Condition trees.
//!
//! A [`ValuesGroup`] holds per-field [`ValuesBag`]s and nested child groups,
//! combined with a single [`GroupLogical`] operator.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::bag::ValuesBag;
use crate::field::FieldSet;

/// Logical operator combining the content of a group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupLogical {
    #[default]
    #[serde(rename = "AND", alias = "and")]
    And,
    #[serde(rename = "OR", alias = "or")]
    Or,
}

impl GroupLogical {
    /// Returns the SQL keyword for this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            GroupLogical::And => "AND",
            GroupLogical::Or => "OR",
        }
    }
}

impl fmt::Display for GroupLogical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A logical group of field constraints and nested subgroups.
///
/// Field keys are unique within a group and keep their insertion order,
/// adding values for a field that is already present merges them into the
/// existing bag.
///
/// # Example
///
/// ```
/// use quarry::{GroupLogical, ValuesBag, ValuesGroup};
///
/// let group = ValuesGroup::new()
///     .with_logical(GroupLogical::Or)
///     .with_field("id", ValuesBag::new().with_single_value(1))
///     .with_field("name", ValuesBag::new().with_single_value("Acme"))
///     .with_group(ValuesGroup::new().with_field("id", ValuesBag::new().with_single_value(2)));
///
/// assert_eq!(group.fields().count(), 2);
/// assert_eq!(group.groups().len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuesGroup {
    logical: GroupLogical,
    fields: IndexMap<String, ValuesBag>,
    groups: Vec<ValuesGroup>,
}

impl ValuesGroup {
    /// Creates an empty AND group.
    pub fn new() -> Self {
        ValuesGroup::default()
    }

    pub fn with_logical(mut self, logical: GroupLogical) -> Self {
        self.logical = logical;
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, values: ValuesBag) -> Self {
        self.add_field(name, values);
        self
    }

    pub fn with_group(mut self, group: ValuesGroup) -> Self {
        self.groups.push(group);
        self
    }

    pub fn set_logical(&mut self, logical: GroupLogical) {
        self.logical = logical;
    }

    /// Adds values for a field, merging with values already present.
    pub fn add_field(&mut self, name: impl Into<String>, values: ValuesBag) {
        self.fields.entry(name.into()).or_default().merge(values);
    }

    pub fn add_group(&mut self, group: ValuesGroup) {
        self.groups.push(group);
    }

    pub fn logical(&self) -> GroupLogical {
        self.logical
    }

    /// Iterates fields in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &ValuesBag)> {
        self.fields.iter().map(|(name, bag)| (name.as_str(), bag))
    }

    pub fn field(&self, name: &str) -> Option<&ValuesBag> {
        self.fields.get(name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn groups(&self) -> &[ValuesGroup] {
        &self.groups
    }

    /// Returns `true` when neither this group nor any subgroup holds a value.
    pub fn is_empty(&self) -> bool {
        self.fields.values().all(ValuesBag::is_empty)
            && self.groups.iter().all(ValuesGroup::is_empty)
    }

    /// Depth of the deepest subgroup, the group itself being level 0.
    pub fn depth(&self) -> usize {
        self.groups
            .iter()
            .map(|group| group.depth() + 1)
            .max()
            .unwrap_or(0)
    }
}

/// A field set together with the condition tree built against it.
#[derive(Debug, Clone)]
pub struct SearchCondition {
    field_set: Arc<FieldSet>,
    values_group: ValuesGroup,
}

impl SearchCondition {
    pub fn new(field_set: Arc<FieldSet>, values_group: ValuesGroup) -> Self {
        SearchCondition {
            field_set,
            values_group,
        }
    }

    pub fn field_set(&self) -> &Arc<FieldSet> {
        &self.field_set
    }

    pub fn values_group(&self) -> &ValuesGroup {
        &self.values_group
    }

    pub fn into_values_group(self) -> ValuesGroup {
        self.values_group
    }
}
