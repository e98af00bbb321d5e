//! Backend rendering primitives.
//!
//! The compiler never produces SQL for columns, values or pattern predicates
//! itself. It asks a [`QueryPlatform`], which owns every backend-specific
//! detail: quoting, placeholders, conversions and pattern syntax.

mod dialect;

pub use dialect::Dialect;

use quarry::{Number, PatternMatch, Value};

use crate::conversion::{Connection, ConversionHints, StrategyId, ValueConverter};
use crate::error::{QueryError, Result};
use crate::field::{QueryField, QueryFields};
use crate::fragment::SqlFragment;

/// Renders the parts of a predicate for one backend.
pub trait QueryPlatform {
    /// The column expression of `field`, for the given strategy.
    fn field_column(&self, field: &str, strategy: Option<StrategyId>) -> Result<String>;

    /// A value as literal or placeholder, compared against `column`.
    fn value_as_sql(
        &self,
        value: &Value,
        field: &str,
        column: &str,
        strategy: Option<StrategyId>,
    ) -> Result<SqlFragment>;

    /// A complete pattern-match predicate on `column`.
    fn pattern_matcher(&self, pattern: &PatternMatch, column: &str) -> Result<SqlFragment>;
}

/// How values end up in the SQL text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Binding {
    /// Values are quoted into the SQL.
    #[default]
    Inline,
    /// Values become `?` placeholders, returned as ordered parameters.
    Positional,
}

impl Binding {
    pub fn as_str(self) -> &'static str {
        match self {
            Binding::Inline => "inline",
            Binding::Positional => "positional",
        }
    }
}

/// [`QueryPlatform`] for SQL databases.
///
/// # Example
///
/// ```
/// use quarry::{FieldConfig, Value};
/// use quarry_sql::{Binding, Connection, QueryField, QueryFields, QueryPlatform, SqlPlatform};
///
/// let fields = QueryFields::new().with(QueryField::new(FieldConfig::new("name"), "c.name"));
/// let connection = Connection::new("pdo_pgsql");
///
/// let platform = SqlPlatform::new(&fields, &connection).unwrap();
/// let literal = platform
///     .value_as_sql(&Value::from("O'Neil"), "name", "c.name", None)
///     .unwrap();
/// assert_eq!(literal.sql, "'O''Neil'");
///
/// let platform = platform.with_binding(Binding::Positional);
/// let placeholder = platform
///     .value_as_sql(&Value::from(5), "name", "c.name", None)
///     .unwrap();
/// assert_eq!(placeholder.sql, "?");
/// assert_eq!(placeholder.params, vec![Value::from(5)]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SqlPlatform<'a> {
    fields: &'a QueryFields,
    connection: &'a Connection,
    dialect: Dialect,
    binding: Binding,
}

impl<'a> SqlPlatform<'a> {
    /// Creates a platform for the connection's driver.
    pub fn new(fields: &'a QueryFields, connection: &'a Connection) -> Result<Self> {
        let driver = connection.driver();
        let dialect = Dialect::from_driver(driver)
            .ok_or_else(|| QueryError::UnsupportedDriver(driver.to_string()))?;
        Ok(SqlPlatform::for_dialect(dialect, fields, connection))
    }

    pub fn for_dialect(
        dialect: Dialect,
        fields: &'a QueryFields,
        connection: &'a Connection,
    ) -> Self {
        SqlPlatform {
            fields,
            connection,
            dialect,
            binding: Binding::default(),
        }
    }

    pub fn with_binding(mut self, binding: Binding) -> Self {
        self.binding = binding;
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn binding(&self) -> Binding {
        self.binding
    }

    fn query_field(&self, name: &str) -> Result<&'a QueryField> {
        self.fields
            .get(name)
            .ok_or_else(|| QueryError::UnmappedField(name.to_string()))
    }

    fn hints<'h>(
        &self,
        field: &'h QueryField,
        column: &'h str,
        strategy: Option<StrategyId>,
    ) -> ConversionHints<'h>
    where
        'a: 'h,
    {
        ConversionHints {
            field,
            column,
            connection: self.connection,
            strategy,
        }
    }

    fn render_value(&self, field: &str, value: &Value) -> Result<SqlFragment> {
        if let Value::Number(n) = value {
            if !n.is_finite() {
                return Err(QueryError::UnsupportedValue {
                    field: field.to_string(),
                    reason: "number is not finite",
                });
            }
        }

        Ok(match self.binding {
            Binding::Positional => SqlFragment::with_params("?", vec![value.clone()]),
            Binding::Inline => SqlFragment::new(self.literal(value)),
        })
    }

    fn literal(&self, value: &Value) -> String {
        match value {
            Value::String(s) => self.dialect.quote(s),
            Value::Number(n) => render_number(*n),
            Value::Bool(b) => self.dialect.bool_literal(*b).to_string(),
        }
    }
}

fn render_number(n: Number) -> String {
    match n {
        Number::F64(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{f:.1}"),
        other => other.to_string(),
    }
}

impl QueryPlatform for SqlPlatform<'_> {
    fn field_column(&self, field: &str, strategy: Option<StrategyId>) -> Result<String> {
        let query_field = self.query_field(field)?;
        let column = query_field.qualified_column();

        Ok(match query_field.field_conversion() {
            Some(conversion) => {
                let hints = self.hints(query_field, &column, strategy);
                conversion
                    .converter()
                    .convert_sql_field(&column, query_field.options(), &hints)
            }
            None => column,
        })
    }

    fn value_as_sql(
        &self,
        value: &Value,
        field: &str,
        column: &str,
        strategy: Option<StrategyId>,
    ) -> Result<SqlFragment> {
        let query_field = self.query_field(field)?;
        let hints = self.hints(query_field, column, strategy);
        let options = query_field.options();

        match query_field.value_conversion() {
            None => self.render_value(field, value),
            Some(ValueConverter::Value(conversion)) => {
                let converted = conversion
                    .converter()
                    .convert_value(value, options, &hints);
                self.render_value(field, &converted)
            }
            Some(ValueConverter::Sql(conversion)) => {
                let rendered = self.render_value(field, value)?;
                let sql = conversion
                    .converter()
                    .convert_sql_value(value, &rendered.sql, options, &hints);
                Ok(SqlFragment::with_params(sql, rendered.params))
            }
        }
    }

    fn pattern_matcher(&self, pattern: &PatternMatch, column: &str) -> Result<SqlFragment> {
        let operand = Value::String(self.dialect.pattern_operand(pattern));
        let value = match self.binding {
            Binding::Positional => SqlFragment::with_params("?", vec![operand]),
            Binding::Inline => SqlFragment::new(self.literal(&operand)),
        };

        let sql = self.dialect.pattern_predicate(pattern, column, &value.sql)?;
        Ok(SqlFragment::with_params(sql, value.params))
    }
}
