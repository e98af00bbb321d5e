//! WHERE-clause builder over a search condition.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;
use quarry::{SearchCondition, Value};
use tracing::debug;

use crate::conversion::{Connection, FieldConverter, ValueConverter};
use crate::error::{QueryError, Result};
use crate::field::{QueryField, QueryFields};
use crate::fragment::CompiledCondition;
use crate::generator::QueryGenerator;
use crate::platform::{Binding, Dialect, SqlPlatform};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ColumnMapping {
    column: String,
    alias: Option<String>,
}

/// Builds the WHERE clause for one search condition.
///
/// Fields are mapped onto columns, optionally with conversions, and the
/// condition is compiled on first use. Changing the configuration discards
/// the compiled result. Fields of the condition without a mapping are left
/// out of the clause.
///
/// # Example
///
/// ```
/// use quarry::{FieldConfig, FieldSet, InputProcessor, JsonInput, ProcessorConfig};
/// use quarry_sql::{Connection, WhereBuilder};
///
/// let fields = FieldSet::new("customer")
///     .with_field(FieldConfig::new("id"))
///     .with_field(FieldConfig::new("name").accept_pattern_match(true));
/// let condition = JsonInput::new()
///     .process(
///         &ProcessorConfig::new(fields),
///         r#"{"fields": {"id": {"single-values": [1, 2]}}}"#,
///     )
///     .unwrap();
///
/// let mut builder = WhereBuilder::new(Connection::new("pdo_pgsql"), condition).unwrap();
/// builder.set_field_with_alias("id", "id", "c").unwrap();
///
/// assert_eq!(builder.where_clause(" WHERE ").unwrap(), " WHERE c.id IN (1, 2)");
/// ```
#[derive(Debug)]
pub struct WhereBuilder {
    condition: SearchCondition,
    connection: Connection,
    dialect: Dialect,
    binding: Binding,
    mappings: IndexMap<String, ColumnMapping>,
    value_conversions: IndexMap<String, ValueConverter>,
    field_conversions: IndexMap<String, FieldConverter>,
    compiled: Option<CompiledCondition>,
}

impl WhereBuilder {
    /// Creates a builder, the dialect follows the connection driver.
    pub fn new(connection: Connection, condition: SearchCondition) -> Result<Self> {
        let driver = connection.driver();
        let dialect = Dialect::from_driver(driver)
            .ok_or_else(|| QueryError::UnsupportedDriver(driver.to_string()))?;

        Ok(WhereBuilder {
            condition,
            connection,
            dialect,
            binding: Binding::default(),
            mappings: IndexMap::new(),
            value_conversions: IndexMap::new(),
            field_conversions: IndexMap::new(),
            compiled: None,
        })
    }

    pub fn with_binding(mut self, binding: Binding) -> Self {
        self.binding = binding;
        self.compiled = None;
        self
    }

    pub fn set_binding(&mut self, binding: Binding) -> &mut Self {
        self.binding = binding;
        self.compiled = None;
        self
    }

    /// Maps a search field onto a column.
    pub fn set_field(&mut self, field: &str, column: impl Into<String>) -> Result<&mut Self> {
        self.map_field(field, column.into(), None)
    }

    /// Maps a search field onto a column of an aliased table.
    pub fn set_field_with_alias(
        &mut self,
        field: &str,
        column: impl Into<String>,
        alias: impl Into<String>,
    ) -> Result<&mut Self> {
        self.map_field(field, column.into(), Some(alias.into()))
    }

    pub fn set_value_conversion(
        &mut self,
        field: &str,
        conversion: impl Into<ValueConverter>,
    ) -> Result<&mut Self> {
        self.ensure_field(field)?;
        self.value_conversions
            .insert(field.to_string(), conversion.into());
        self.compiled = None;
        Ok(self)
    }

    pub fn set_field_conversion(
        &mut self,
        field: &str,
        conversion: FieldConverter,
    ) -> Result<&mut Self> {
        self.ensure_field(field)?;
        self.field_conversions.insert(field.to_string(), conversion);
        self.compiled = None;
        Ok(self)
    }

    pub fn condition(&self) -> &SearchCondition {
        &self.condition
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn binding(&self) -> Binding {
        self.binding
    }

    /// Compiles the condition, or returns the earlier result.
    pub fn compile(&mut self) -> Result<&CompiledCondition> {
        let compiled = match self.compiled.take() {
            Some(compiled) => compiled,
            None => self.build()?,
        };
        Ok(self.compiled.insert(compiled))
    }

    /// The clause prefixed with `prepend`, empty when nothing constrains.
    pub fn where_clause(&mut self, prepend: &str) -> Result<String> {
        let compiled = self.compile()?;
        if compiled.is_empty() {
            return Ok(String::new());
        }
        Ok(format!("{prepend}{}", compiled.sql()))
    }

    /// Parameters bound by the clause's placeholders.
    pub fn parameters(&mut self) -> Result<&[Value]> {
        Ok(self.compile()?.params())
    }

    /// Hash of everything that shapes the compiled SQL except conversions.
    pub(crate) fn fingerprint(&self) -> Result<u64> {
        let tree = serde_json::to_string(self.condition.values_group())?;

        let mut hasher = DefaultHasher::new();
        self.condition.field_set().name().hash(&mut hasher);
        tree.hash(&mut hasher);
        self.dialect.hash(&mut hasher);
        self.binding.hash(&mut hasher);
        for (field, mapping) in &self.mappings {
            field.hash(&mut hasher);
            mapping.hash(&mut hasher);
        }
        Ok(hasher.finish())
    }

    fn ensure_field(&self, field: &str) -> Result<()> {
        if self.condition.field_set().has(field) {
            Ok(())
        } else {
            Err(QueryError::UnknownField(field.to_string()))
        }
    }

    fn map_field(
        &mut self,
        field: &str,
        column: String,
        alias: Option<String>,
    ) -> Result<&mut Self> {
        self.ensure_field(field)?;
        self.mappings
            .insert(field.to_string(), ColumnMapping { column, alias });
        self.compiled = None;
        Ok(self)
    }

    fn query_fields(&self) -> QueryFields {
        let field_set = self.condition.field_set();
        self.mappings
            .iter()
            .filter_map(|(name, mapping)| {
                let config = field_set.get(name)?.clone();
                let mut field = QueryField::new(config, mapping.column.clone());
                if let Some(alias) = &mapping.alias {
                    field = field.with_alias(alias.clone());
                }
                if let Some(conversion) = self.value_conversions.get(name) {
                    field = field.with_value_conversion(conversion.clone());
                }
                if let Some(conversion) = self.field_conversions.get(name) {
                    field = field.with_field_conversion(conversion.clone());
                }
                Some(field)
            })
            .collect()
    }

    fn build(&self) -> Result<CompiledCondition> {
        let fields = self.query_fields();
        let platform = SqlPlatform::for_dialect(self.dialect, &fields, &self.connection)
            .with_binding(self.binding);

        debug!(
            field_set = self.condition.field_set().name(),
            dialect = self.dialect.name(),
            mapped = fields.len(),
            "building where clause"
        );
        let group = self.condition.values_group();
        QueryGenerator::new(&platform, &fields, &self.connection).compile(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry::{FieldConfig, FieldSet, ValuesBag, ValuesGroup};
    use std::sync::Arc;

    fn condition(group: ValuesGroup) -> SearchCondition {
        let fields = FieldSet::new("customer")
            .with_field(FieldConfig::new("id"))
            .with_field(FieldConfig::new("name"));
        SearchCondition::new(Arc::new(fields), group)
    }

    #[test]
    fn unknown_field_mapping() {
        let condition = condition(ValuesGroup::new());
        let mut builder = WhereBuilder::new(Connection::new("sqlite"), condition).unwrap();
        let err = builder.set_field("email", "email").unwrap_err();
        assert!(matches!(err, QueryError::UnknownField(name) if name == "email"));
    }

    #[test]
    fn empty_condition_has_no_clause() {
        let condition = condition(ValuesGroup::new());
        let mut builder = WhereBuilder::new(Connection::new("sqlite"), condition).unwrap();
        builder.set_field("id", "id").unwrap();
        assert_eq!(builder.where_clause(" WHERE ").unwrap(), "");
    }

    #[test]
    fn remapping_recompiles() {
        let group = ValuesGroup::new().with_field("id", ValuesBag::new().with_single_value(3));
        let mut builder = WhereBuilder::new(Connection::new("mysql"), condition(group)).unwrap();

        builder.set_field("id", "id").unwrap();
        assert_eq!(builder.compile().unwrap().sql(), "id IN (3)");

        builder
            .set_field_with_alias("id", "customer_id", "c")
            .unwrap();
        assert_eq!(builder.compile().unwrap().sql(), "c.customer_id IN (3)");
    }

    #[test]
    fn fingerprint_tracks_mappings() {
        let group = ValuesGroup::new().with_field("id", ValuesBag::new().with_single_value(3));
        let mut builder = WhereBuilder::new(Connection::new("mysql"), condition(group)).unwrap();
        builder.set_field("id", "id").unwrap();
        let before = builder.fingerprint().unwrap();

        builder.set_field("name", "name").unwrap();
        assert_ne!(builder.fingerprint().unwrap(), before);
    }

    #[test]
    fn positional_parameters() {
        let names = ValuesBag::new()
            .with_single_value("a")
            .with_single_value("b");
        let group = ValuesGroup::new().with_field("name", names);
        let mut builder = WhereBuilder::new(Connection::new("pgsql"), condition(group))
            .unwrap()
            .with_binding(Binding::Positional);
        builder.set_field("name", "name").unwrap();

        assert_eq!(builder.where_clause("").unwrap(), "name IN (?, ?)");
        assert_eq!(
            builder.parameters().unwrap(),
            &[Value::from("a"), Value::from("b")]
        );
    }
}
