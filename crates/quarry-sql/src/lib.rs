//! Quarry SQL - compile search conditions into WHERE clauses.
//!
//! `quarry-sql` renders a [`quarry::ValuesGroup`] as one parenthesized SQL
//! boolean expression. Rendering of columns, values and pattern predicates is
//! delegated to a [`QueryPlatform`]; [`SqlPlatform`] covers PostgreSQL, MySQL
//! and SQLite with inline literals or positional parameters.
//!
//! # Quick Start
//!
//! ```rust
//! use quarry::{FieldConfig, FieldSet, InputProcessor, JsonInput, ProcessorConfig};
//! use quarry_sql::{Binding, Connection, WhereBuilder};
//!
//! let fields = FieldSet::new("invoice")
//!     .with_field(FieldConfig::new("id"))
//!     .with_field(FieldConfig::new("price").accept_ranges(true).accept_compares(true));
//!
//! let condition = JsonInput::new()
//!     .process(
//!         &ProcessorConfig::new(fields),
//!         r#"{"fields": {
//!             "id": {"single-values": [1, 2], "excluded-values": [5]},
//!             "price": {"comparisons": [{"operator": ">", "value": 5}, {"operator": "<", "value": 10}]}
//!         }}"#,
//!     )
//!     .unwrap();
//!
//! let mut builder = WhereBuilder::new(Connection::new("pdo_pgsql"), condition).unwrap();
//! builder.set_field("id", "id").unwrap();
//! builder.set_field_with_alias("price", "price", "i").unwrap();
//!
//! assert_eq!(
//!     builder.where_clause("WHERE ").unwrap(),
//!     "WHERE ((id IN (1, 2)) AND (id NOT IN (5))) AND (i.price > 5 AND i.price < 10)"
//! );
//!
//! let mut bound = builder.with_binding(Binding::Positional);
//! assert_eq!(bound.parameters().unwrap().len(), 5);
//! ```
//!
//! # Rendering
//!
//! | Values | SQL |
//! |--------|-----|
//! | single values | `col IN (a, b)` / `col NOT IN (a, b)` |
//! | range | `(col >= l AND col <= u)` |
//! | excluded range | `(col <= l OR col >= u)` |
//! | comparisons | `col > v`, several as `(col > a AND col < b)` |
//! | pattern matches | `LIKE`, `ILIKE`, `GLOB`, `REGEXP`, `~` depending on dialect |
//!
//! Case-sensitive pattern matches and equality compare bytes on every
//! dialect: SQLite matches them with `GLOB`, MySQL with `BINARY` operands.
//!
//! Single values of fields with a strategy-selected conversion or an SQL
//! value conversion are rendered one by one as `col = v` / `col <> v`.

mod cache;
mod conversion;
mod error;
mod expr;
mod factory;
mod field;
mod fragment;
mod generator;
mod platform;
mod where_builder;

// Re-export public API
pub use cache::{Cache, CachedWhereBuilder, MemoryCache};
pub use conversion::{
    Connection, Conversion, ConversionHints, ConversionStrategy, FieldConverter, SqlFieldConversion,
    SqlValueConversion, StrategyId, ValueConversion, ValueConverter,
};
pub use error::{QueryError, Result};
pub use factory::{
    ConversionRegistry, DbalFactory, FIELD_CONVERSION_OPTION, VALUE_CONVERSION_OPTION,
};
pub use field::{QueryField, QueryFields};
pub use fragment::{CompiledCondition, SqlFragment};
pub use generator::QueryGenerator;
pub use platform::{Binding, Dialect, QueryPlatform, SqlPlatform};
pub use where_builder::WhereBuilder;
