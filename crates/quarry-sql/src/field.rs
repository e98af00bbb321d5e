//! Query fields: search fields mapped onto columns.

use indexmap::IndexMap;
use quarry::{FieldConfig, FieldOptions, Value};

use crate::conversion::{Connection, ConversionHints, FieldConverter, StrategyId, ValueConverter};

/// A search field bound to a column, with optional conversions.
#[derive(Debug, Clone)]
pub struct QueryField {
    config: FieldConfig,
    column: String,
    alias: Option<String>,
    value_conversion: Option<ValueConverter>,
    field_conversion: Option<FieldConverter>,
}

impl QueryField {
    pub fn new(config: FieldConfig, column: impl Into<String>) -> Self {
        QueryField {
            config,
            column: column.into(),
            alias: None,
            value_conversion: None,
            field_conversion: None,
        }
    }

    /// Qualifies the column with a table alias.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_value_conversion(mut self, conversion: impl Into<ValueConverter>) -> Self {
        self.value_conversion = Some(conversion.into());
        self
    }

    pub fn with_field_conversion(mut self, conversion: FieldConverter) -> Self {
        self.field_conversion = Some(conversion);
        self
    }

    pub fn name(&self) -> &str {
        self.config.name()
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn options(&self) -> &FieldOptions {
        self.config.options()
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// The column as used in SQL, `alias.column` when an alias is set.
    pub fn qualified_column(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{alias}.{}", self.column),
            None => self.column.clone(),
        }
    }

    pub fn value_conversion(&self) -> Option<&ValueConverter> {
        self.value_conversion.as_ref()
    }

    pub fn field_conversion(&self) -> Option<&FieldConverter> {
        self.field_conversion.as_ref()
    }

    /// True when either conversion selects a strategy per value.
    pub fn has_conversion_strategy(&self) -> bool {
        self.value_conversion
            .as_ref()
            .is_some_and(ValueConverter::is_strategy_selected)
            || self
                .field_conversion
                .as_ref()
                .is_some_and(FieldConverter::is_strategy_selected)
    }

    pub fn has_sql_value_conversion(&self) -> bool {
        self.value_conversion
            .as_ref()
            .is_some_and(ValueConverter::is_sql)
    }

    /// Single values of this field can share one `IN (..)` list.
    pub fn allows_value_batching(&self) -> bool {
        !self.has_conversion_strategy() && !self.has_sql_value_conversion()
    }

    /// Selects the conversion strategy for `value`.
    ///
    /// The value conversion is asked first, then the field conversion.
    /// Without a strategy-selected conversion there is no strategy.
    pub fn conversion_strategy(
        &self,
        value: &Value,
        connection: &Connection,
    ) -> Option<StrategyId> {
        let strategy = self
            .value_conversion
            .as_ref()
            .and_then(ValueConverter::strategy)
            .or_else(|| {
                self.field_conversion
                    .as_ref()
                    .and_then(FieldConverter::strategy)
            })?;

        let column = self.qualified_column();
        let hints = ConversionHints {
            field: self,
            column: &column,
            connection,
            strategy: None,
        };
        strategy.conversion_strategy(value, self.options(), &hints)
    }
}

/// Query fields keyed by search field name, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct QueryFields {
    fields: IndexMap<String, QueryField>,
}

impl QueryFields {
    pub fn new() -> Self {
        QueryFields::default()
    }

    /// Adds or replaces the mapping of a field.
    pub fn insert(&mut self, field: QueryField) {
        self.fields.insert(field.name().to_string(), field);
    }

    pub fn with(mut self, field: QueryField) -> Self {
        self.insert(field);
        self
    }

    pub fn get(&self, name: &str) -> Option<&QueryField> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueryField> {
        self.fields.values()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<QueryField> for QueryFields {
    fn from_iter<I: IntoIterator<Item = QueryField>>(iter: I) -> Self {
        let mut fields = QueryFields::new();
        for field in iter {
            fields.insert(field);
        }
        fields
    }
}
