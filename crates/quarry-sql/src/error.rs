//! Error types for the quarry-sql crate.

use thiserror::Error;

/// Errors that can occur when configuring or compiling a query.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The field is not part of the search condition's field set.
    #[error("unknown field \"{0}\"")]
    UnknownField(String),

    /// The platform was asked to render a field that has no column mapping.
    #[error("field \"{0}\" has no column mapping")]
    UnmappedField(String),

    /// The value can't be expressed on this backend.
    #[error("cannot render value for field \"{field}\": {reason}")]
    UnsupportedValue { field: String, reason: &'static str },

    /// The pattern-match flavour is not available on this backend.
    #[error("{dialect} does not support {pattern} pattern matching")]
    UnsupportedPattern {
        dialect: &'static str,
        pattern: &'static str,
    },

    /// No dialect is known for the connection driver.
    #[error("unsupported database driver \"{0}\"")]
    UnsupportedDriver(String),

    /// A field option names a conversion that was never registered.
    #[error("no conversion registered as \"{name}\" for field \"{field}\"")]
    UnknownConversion { field: String, name: String },

    /// A conversion option that is not a string.
    #[error("conversion option of field \"{0}\" must be a string")]
    InvalidConversionOption(String),

    /// The condition tree could not be fingerprinted for caching.
    #[error("failed to fingerprint search condition: {0}")]
    Fingerprint(#[from] serde_json::Error),
}

/// Result type for quarry-sql operations.
pub type Result<T> = std::result::Result<T, QueryError>;
