//! Error types for running queryfied SQL.

use thiserror::Error;

/// Errors raised while preparing or executing a pruned query.
#[derive(Debug, Error)]
pub enum Error {
    /// A placeholder survived pruning but no value was ever bound to it.
    ///
    /// This happens when the placeholder does not sit in a recognised clause
    /// shape (e.g. `OR :from <= col`) and so could not be pruned.
    #[error("parameter '{0}' is referenced by the query but was never bound")]
    UnboundParameter(String),

    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;
