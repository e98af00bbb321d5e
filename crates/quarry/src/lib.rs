//! Quarry - validated search conditions.
//!
//! Quarry turns structured, user-authored search criteria into a trusted
//! condition tree. It provides:
//!
//! - A value model: single values, ranges, comparisons and pattern matches
//! - Condition trees: per-field value bags grouped with AND/OR logic and
//!   arbitrary nesting
//! - Field declarations with per-field value-type capabilities
//! - Alias resolution for field names
//! - An input acceptance layer that enforces nesting, group and value limits
//!   uniformly for every input format, plus a JSON input format
//!
//! Compiling a condition tree into a backend query is the job of the
//! `quarry-sql` crate.
//!
//! # Quick Start
//!
//! ```rust
//! use quarry::{FieldConfig, FieldSet, InputProcessor, JsonInput, ProcessorConfig, SearchError};
//!
//! let fields = FieldSet::new("invoice")
//!     .with_field(FieldConfig::new("id"))
//!     .with_field(FieldConfig::new("total").accept_ranges(true).accept_compares(true));
//!
//! let config = ProcessorConfig::new(fields).with_max_nesting_level(1);
//! let input = JsonInput::new();
//!
//! let condition = input
//!     .process(
//!         &config,
//!         r#"{
//!             "fields": {"id": {"single-values": [1, 2], "excluded-values": [5]}},
//!             "groups": [{"fields": {"total": {"comparisons": [{"operator": ">", "value": 100}]}}}]
//!         }"#,
//!     )
//!     .unwrap();
//! assert_eq!(condition.values_group().groups().len(), 1);
//!
//! // Ranges are not accepted by the `id` field.
//! let err = input
//!     .process(&config, r#"{"fields": {"id": {"ranges": [{"lower": 1, "upper": 2}]}}}"#)
//!     .unwrap_err();
//! assert!(matches!(err, SearchError::UnsupportedValueType { .. }));
//! ```
//!
//! # Limits
//!
//! | Limit | Default | Error |
//! |-------|---------|-------|
//! | nesting level (root = 0) | 100 | [`SearchError::GroupsNesting`] |
//! | sibling groups per group | 100 | [`SearchError::GroupsOverflow`] |
//! | values per field per group | 10000 | [`SearchError::ValuesOverflow`] |

mod alias;
mod bag;
mod config;
mod error;
mod field;
mod group;
mod input;
mod value;
mod values;

// Re-export public API
pub use alias::{AliasMap, ChainAliasResolver, FieldAliasResolver, NoopAliasResolver};
pub use bag::ValuesBag;
pub use config::{Limits, ProcessorConfig};
pub use error::{Result, SearchError};
pub use field::{FieldConfig, FieldOptions, FieldSet};
pub use group::{GroupLogical, SearchCondition, ValuesGroup};
pub use input::{InputContext, InputProcessor, JsonInput};
pub use value::{Number, Value};
pub use values::{Compare, CompareOp, PatternKind, PatternMatch, Range, SingleValue, ValueType};
