//! Creates where builders with conversions taken from field options.

use std::collections::HashMap;
use std::fmt;

use quarry::SearchCondition;
use tracing::debug;

use crate::cache::{Cache, CachedWhereBuilder};
use crate::conversion::{Connection, FieldConverter, ValueConverter};
use crate::error::{QueryError, Result};
use crate::where_builder::WhereBuilder;

/// Field option naming the value conversion of a field.
pub const VALUE_CONVERSION_OPTION: &str = "dbal_conversion";

/// Field option naming the column conversion of a field.
pub const FIELD_CONVERSION_OPTION: &str = "dbal_field_conversion";

enum Registration<T> {
    Ready(T),
    Deferred(Box<dyn Fn() -> T + Send + Sync>),
}

impl<T: Clone> Registration<T> {
    fn resolve(&self) -> T {
        match self {
            Registration::Ready(conversion) => conversion.clone(),
            Registration::Deferred(produce) => produce(),
        }
    }
}

/// Named conversions that field options can refer to.
///
/// Deferred registrations are produced each time a builder is created, never
/// while compiling.
#[derive(Default)]
pub struct ConversionRegistry {
    values: HashMap<String, Registration<ValueConverter>>,
    fields: HashMap<String, Registration<FieldConverter>>,
}

impl ConversionRegistry {
    pub fn new() -> Self {
        ConversionRegistry::default()
    }

    pub fn register_value(
        &mut self,
        name: impl Into<String>,
        conversion: impl Into<ValueConverter>,
    ) -> &mut Self {
        self.values
            .insert(name.into(), Registration::Ready(conversion.into()));
        self
    }

    pub fn register_value_lazy<F>(&mut self, name: impl Into<String>, produce: F) -> &mut Self
    where
        F: Fn() -> ValueConverter + Send + Sync + 'static,
    {
        self.values
            .insert(name.into(), Registration::Deferred(Box::new(produce)));
        self
    }

    pub fn register_field(
        &mut self,
        name: impl Into<String>,
        conversion: FieldConverter,
    ) -> &mut Self {
        self.fields
            .insert(name.into(), Registration::Ready(conversion));
        self
    }

    pub fn register_field_lazy<F>(&mut self, name: impl Into<String>, produce: F) -> &mut Self
    where
        F: Fn() -> FieldConverter + Send + Sync + 'static,
    {
        self.fields
            .insert(name.into(), Registration::Deferred(Box::new(produce)));
        self
    }

    pub fn has_value(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    fn value(&self, name: &str) -> Option<ValueConverter> {
        self.values.get(name).map(Registration::resolve)
    }

    fn field(&self, name: &str) -> Option<FieldConverter> {
        self.fields.get(name).map(Registration::resolve)
    }
}

impl fmt::Debug for ConversionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut values: Vec<_> = self.values.keys().collect();
        let mut fields: Vec<_> = self.fields.keys().collect();
        values.sort();
        fields.sort();
        f.debug_struct("ConversionRegistry")
            .field("values", &values)
            .field("fields", &fields)
            .finish()
    }
}

/// Entry point for building WHERE clauses.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use quarry::{FieldConfig, FieldOptions, FieldSet, SearchCondition, ValuesBag, ValuesGroup};
/// use quarry_sql::{Connection, Conversion, ConversionHints, ConversionRegistry, DbalFactory, SqlFieldConversion};
///
/// struct Lower;
///
/// impl SqlFieldConversion for Lower {
///     fn convert_sql_field(&self, column: &str, _: &FieldOptions, _: &ConversionHints<'_>) -> String {
///         format!("LOWER({column})")
///     }
/// }
///
/// let mut registry = ConversionRegistry::new();
/// registry.register_field("lower", Conversion::field(Lower));
///
/// let fields = FieldSet::new("customer")
///     .with_field(FieldConfig::new("email").with_option("dbal_field_conversion", "lower"));
/// let group = ValuesGroup::new().with_field("email", ValuesBag::new().with_single_value("a@b.c"));
/// let condition = SearchCondition::new(Arc::new(fields), group);
///
/// let factory = DbalFactory::new(registry);
/// let mut builder = factory
///     .create_where_builder(Connection::new("sqlite"), condition)
///     .unwrap();
/// builder.set_field("email", "email").unwrap();
///
/// assert_eq!(builder.where_clause("").unwrap(), "LOWER(email) IN ('a@b.c')");
/// ```
#[derive(Debug, Default)]
pub struct DbalFactory {
    registry: ConversionRegistry,
}

impl DbalFactory {
    pub fn new(registry: ConversionRegistry) -> Self {
        DbalFactory { registry }
    }

    pub fn registry(&self) -> &ConversionRegistry {
        &self.registry
    }

    /// Creates a builder with the conversions named in field options attached.
    pub fn create_where_builder(
        &self,
        connection: Connection,
        condition: SearchCondition,
    ) -> Result<WhereBuilder> {
        let field_set = condition.field_set().clone();
        let mut builder = WhereBuilder::new(connection, condition)?;

        for field in field_set.iter() {
            let name = field.name();
            if let Some(value) = conversion_name(name, field.option(VALUE_CONVERSION_OPTION))? {
                let conversion = self
                    .registry
                    .value(value)
                    .ok_or_else(|| unknown(name, value))?;
                builder.set_value_conversion(name, conversion)?;
            }
            if let Some(column) = conversion_name(name, field.option(FIELD_CONVERSION_OPTION))? {
                let conversion = self
                    .registry
                    .field(column)
                    .ok_or_else(|| unknown(name, column))?;
                builder.set_field_conversion(name, conversion)?;
            }
        }

        debug!(field_set = field_set.name(), "created where builder");
        Ok(builder)
    }

    pub fn create_cached_where_builder<'c, C: Cache + ?Sized>(
        &self,
        connection: Connection,
        condition: SearchCondition,
        cache: &'c C,
    ) -> Result<CachedWhereBuilder<'c, C>> {
        let builder = self.create_where_builder(connection, condition)?;
        Ok(CachedWhereBuilder::new(builder, cache))
    }
}

fn conversion_name<'v>(
    field: &str,
    option: Option<&'v serde_json::Value>,
) -> Result<Option<&'v str>> {
    match option {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(name)) => Ok(Some(name)),
        Some(_) => Err(QueryError::InvalidConversionOption(field.to_string())),
    }
}

fn unknown(field: &str, name: &str) -> QueryError {
    QueryError::UnknownConversion {
        field: field.to_string(),
        name: name.to_string(),
    }
}
