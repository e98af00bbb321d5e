//! Column and value conversions.
//!
//! A field may carry a value conversion and a column (field) conversion.
//! Either may be strategy-selected: a [`ConversionStrategy`] then picks a
//! [`StrategyId`] per value, and that id flows into the column and value
//! rendering for that value only. This covers fields whose physical storage
//! depends on the value, such as polymorphic columns.

use std::fmt;
use std::sync::Arc;

use quarry::{FieldOptions, Value};

use crate::field::QueryField;

/// Identifier of a conversion strategy, chosen per value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StrategyId(pub u32);

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The database connection a query is compiled for.
///
/// Only descriptive; nothing in this crate talks to a database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    driver: String,
    server_version: Option<String>,
}

impl Connection {
    pub fn new(driver: impl Into<String>) -> Self {
        Connection {
            driver: driver.into(),
            server_version: None,
        }
    }

    pub fn with_server_version(mut self, version: impl Into<String>) -> Self {
        self.server_version = Some(version.into());
        self
    }

    pub fn driver(&self) -> &str {
        &self.driver
    }

    pub fn server_version(&self) -> Option<&str> {
        self.server_version.as_deref()
    }
}

/// Context handed to conversions.
///
/// Hints are built fresh for every conversion call and never outlive it.
#[derive(Debug, Clone, Copy)]
pub struct ConversionHints<'a> {
    /// The field being converted.
    pub field: &'a QueryField,
    /// Column expression in effect for this call.
    pub column: &'a str,
    /// The active connection.
    pub connection: &'a Connection,
    /// Strategy selected for the current value, if any.
    pub strategy: Option<StrategyId>,
}

/// Selects a conversion strategy for a value.
pub trait ConversionStrategy: Send + Sync {
    fn conversion_strategy(
        &self,
        value: &Value,
        options: &FieldOptions,
        hints: &ConversionHints<'_>,
    ) -> Option<StrategyId>;
}

impl<F> ConversionStrategy for F
where
    F: Fn(&Value, &FieldOptions, &ConversionHints<'_>) -> Option<StrategyId> + Send + Sync,
{
    fn conversion_strategy(
        &self,
        value: &Value,
        options: &FieldOptions,
        hints: &ConversionHints<'_>,
    ) -> Option<StrategyId> {
        self(value, options, hints)
    }
}

/// Transforms a value before the platform renders it.
pub trait ValueConversion: Send + Sync {
    fn convert_value(
        &self,
        value: &Value,
        options: &FieldOptions,
        hints: &ConversionHints<'_>,
    ) -> Value;
}

/// Wraps the rendered value (literal or placeholder) in custom SQL.
///
/// The returned SQL must contain `rendered` exactly once, otherwise bound
/// parameters no longer line up with their placeholders.
pub trait SqlValueConversion: Send + Sync {
    fn convert_sql_value(
        &self,
        value: &Value,
        rendered: &str,
        options: &FieldOptions,
        hints: &ConversionHints<'_>,
    ) -> String;
}

/// Wraps the column expression in custom SQL.
pub trait SqlFieldConversion: Send + Sync {
    fn convert_sql_field(
        &self,
        column: &str,
        options: &FieldOptions,
        hints: &ConversionHints<'_>,
    ) -> String;
}

/// A conversion, either fixed or selected per value by a strategy.
///
/// # Example
///
/// ```
/// use quarry::{FieldOptions, Value};
/// use quarry_sql::{Conversion, ConversionHints, SqlFieldConversion, StrategyId};
///
/// struct Lower;
///
/// impl SqlFieldConversion for Lower {
///     fn convert_sql_field(&self, column: &str, _: &FieldOptions, _: &ConversionHints<'_>) -> String {
///         format!("LOWER({column})")
///     }
/// }
///
/// let fixed = Conversion::field(Lower);
/// assert!(fixed.strategy().is_none());
///
/// let selected = Conversion::field(Lower).with_strategy(
///     |value: &Value, _: &FieldOptions, _: &ConversionHints<'_>| {
///         value.is_number().then_some(StrategyId(1))
///     },
/// );
/// assert!(selected.is_strategy_selected());
/// ```
pub enum Conversion<C: ?Sized> {
    Fixed(Arc<C>),
    StrategySelected {
        conversion: Arc<C>,
        strategy: Arc<dyn ConversionStrategy>,
    },
}

impl<C: ?Sized> Conversion<C> {
    /// Makes this conversion strategy-selected.
    pub fn with_strategy(self, strategy: impl ConversionStrategy + 'static) -> Self {
        Conversion::StrategySelected {
            conversion: self.into_converter(),
            strategy: Arc::new(strategy),
        }
    }

    pub fn converter(&self) -> &C {
        match self {
            Conversion::Fixed(conversion) => conversion,
            Conversion::StrategySelected { conversion, .. } => conversion,
        }
    }

    pub fn strategy(&self) -> Option<&dyn ConversionStrategy> {
        match self {
            Conversion::Fixed(_) => None,
            Conversion::StrategySelected { strategy, .. } => Some(strategy.as_ref()),
        }
    }

    pub fn is_strategy_selected(&self) -> bool {
        matches!(self, Conversion::StrategySelected { .. })
    }

    fn into_converter(self) -> Arc<C> {
        match self {
            Conversion::Fixed(conversion) => conversion,
            Conversion::StrategySelected { conversion, .. } => conversion,
        }
    }
}

impl Conversion<dyn ValueConversion> {
    pub fn value(conversion: impl ValueConversion + 'static) -> Self {
        Conversion::Fixed(Arc::new(conversion))
    }
}

impl Conversion<dyn SqlValueConversion> {
    pub fn sql_value(conversion: impl SqlValueConversion + 'static) -> Self {
        Conversion::Fixed(Arc::new(conversion))
    }
}

impl Conversion<dyn SqlFieldConversion> {
    pub fn field(conversion: impl SqlFieldConversion + 'static) -> Self {
        Conversion::Fixed(Arc::new(conversion))
    }
}

impl<C: ?Sized> Clone for Conversion<C> {
    fn clone(&self) -> Self {
        match self {
            Conversion::Fixed(conversion) => Conversion::Fixed(Arc::clone(conversion)),
            Conversion::StrategySelected {
                conversion,
                strategy,
            } => Conversion::StrategySelected {
                conversion: Arc::clone(conversion),
                strategy: Arc::clone(strategy),
            },
        }
    }
}

impl<C: ?Sized> fmt::Debug for Conversion<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conversion::Fixed(_) => f.write_str("Conversion::Fixed"),
            Conversion::StrategySelected { .. } => f.write_str("Conversion::StrategySelected"),
        }
    }
}

/// Column conversion of a field.
pub type FieldConverter = Conversion<dyn SqlFieldConversion>;

/// Value conversion of a field.
///
/// A plain [`ValueConversion`] changes the value and keeps the default
/// rendering, a [`SqlValueConversion`] replaces the rendering with custom
/// SQL. The latter disables `IN (..)` batching of single values.
#[derive(Debug, Clone)]
pub enum ValueConverter {
    Value(Conversion<dyn ValueConversion>),
    Sql(Conversion<dyn SqlValueConversion>),
}

impl ValueConverter {
    pub fn strategy(&self) -> Option<&dyn ConversionStrategy> {
        match self {
            ValueConverter::Value(conversion) => conversion.strategy(),
            ValueConverter::Sql(conversion) => conversion.strategy(),
        }
    }

    pub fn is_strategy_selected(&self) -> bool {
        self.strategy().is_some()
    }

    pub fn is_sql(&self) -> bool {
        matches!(self, ValueConverter::Sql(_))
    }
}

impl From<Conversion<dyn ValueConversion>> for ValueConverter {
    fn from(conversion: Conversion<dyn ValueConversion>) -> Self {
        ValueConverter::Value(conversion)
    }
}

impl From<Conversion<dyn SqlValueConversion>> for ValueConverter {
    fn from(conversion: Conversion<dyn SqlValueConversion>) -> Self {
        ValueConverter::Sql(conversion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Upper;

    impl ValueConversion for Upper {
        fn convert_value(&self, value: &Value, _: &FieldOptions, _: &ConversionHints<'_>) -> Value {
            match value {
                Value::String(s) => Value::String(s.to_uppercase()),
                other => other.clone(),
            }
        }
    }

    #[test]
    fn fixed_conversions_have_no_strategy() {
        let converter = ValueConverter::from(Conversion::value(Upper));
        assert!(!converter.is_strategy_selected());
        assert!(!converter.is_sql());
    }

    #[test]
    fn strategy_survives_clone() {
        let conversion = Conversion::value(Upper).with_strategy(
            |_: &Value, _: &FieldOptions, _: &ConversionHints<'_>| Some(StrategyId(2)),
        );
        let converter = ValueConverter::from(conversion.clone());
        assert!(converter.is_strategy_selected());
        assert!(conversion.is_strategy_selected());
        assert_eq!(format!("{conversion:?}"), "Conversion::StrategySelected");
    }

    #[test]
    fn connection_description() {
        let connection = Connection::new("pdo_pgsql").with_server_version("16.2");
        assert_eq!(connection.driver(), "pdo_pgsql");
        assert_eq!(connection.server_version(), Some("16.2"));
        assert_eq!(StrategyId(3).to_string(), "3");
    }
}
