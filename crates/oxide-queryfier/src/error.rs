//! Error types for parameter binding.

use thiserror::Error;

use crate::value::SqlValue;

/// Errors reported while binding parameters.
#[derive(Debug, Error, PartialEq)]
pub enum QueryfierError {
    /// A positional bind found no unbound slot left to fill.
    #[error("no unbound parameter left for {} value {value}", .value.kind())]
    BindingOverflow {
        /// The value that could not be placed.
        value: SqlValue,
    },
}

/// Result type alias for binding operations.
pub type Result<T> = std::result::Result<T, QueryfierError>;
