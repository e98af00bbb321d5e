//! Error types for the quarry crate.

use thiserror::Error;

use crate::values::ValueType;

/// Errors raised while accepting a search expression.
///
/// Every variant is terminal for the input that produced it: a rejected
/// expression is never partially accepted.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The (alias-resolved) field name is not part of the field set.
    #[error("unknown field \"{0}\"")]
    UnknownField(String),

    /// A group is nested deeper than the configured maximum.
    #[error("group {group_idx} at level {level} exceeds the maximum nesting level of {max}")]
    GroupsNesting {
        max: usize,
        group_idx: usize,
        level: usize,
    },

    /// Too many sibling groups at one nesting level.
    #[error("group {group_idx} at level {level} contains {count} groups, the maximum is {max}")]
    GroupsOverflow {
        max: usize,
        count: usize,
        group_idx: usize,
        level: usize,
    },

    /// A field holds more values than allowed in a single group.
    #[error("field \"{field}\" has {count} values in group {group_idx}, level {level}, max {max}")]
    ValuesOverflow {
        field: String,
        max: usize,
        count: usize,
        group_idx: usize,
        level: usize,
    },

    /// The field does not accept this kind of value.
    #[error("field \"{field}\" does not accept {value_type} values")]
    UnsupportedValueType {
        field: String,
        value_type: ValueType,
    },

    /// Range lower bound is greater than the upper bound, or the bounds
    /// can't be compared with each other.
    #[error("invalid range for field \"{field}\": {reason}")]
    InvalidRange { field: String, reason: &'static str },

    /// Regular expression pattern that does not compile.
    #[error("invalid regex pattern for field \"{field}\": {source}")]
    InvalidPattern {
        field: String,
        #[source]
        source: regex::Error,
    },

    /// Malformed raw input.
    #[error("malformed search input: {0}")]
    InvalidInput(#[from] serde_json::Error),

    /// Malformed limits configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] serde_yaml::Error),
}

/// Result type for quarry operations.
pub type Result<T, E = SearchError> = std::result::Result<T, E>;
