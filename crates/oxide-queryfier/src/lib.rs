//! # oxide-queryfier
//!
//! Named-parameter binding for hand-written SQL and entity-query templates,
//! with clauses bound to null pruned out of the text instead of compared
//! against `NULL`.
//!
//! This crate provides:
//! - A shallow clause grammar (`AND t.col = :name`, `WHERE col BETWEEN :lo AND :hi`)
//! - Positional and named parameter binding over the template's placeholders
//! - A one-shot pruning pass that removes unbound clauses and promotes the
//!   next surviving `AND`/`OR` to `WHERE` when the leading clause goes
//!
//! ## Optional filters
//!
//! ```rust
//! use oxide_queryfier::Queryfier;
//!
//! let query = Queryfier::new("SELECT * FROM t WHERE a = :x AND b = :y")
//!     .with(None::<&str>)
//!     .with("v")
//!     .build();
//!
//! // The WHERE clause on `a` is gone and `b` took its place.
//! assert_eq!(query.sql(), "SELECT * FROM t  WHERE b = :y");
//! assert_eq!(query.parameters()[0].name(), "y");
//! ```
//!
//! ## Nullable parameters
//!
//! ```rust
//! use oxide_queryfier::{Parameter, Queryfier};
//!
//! let query = Queryfier::new("SELECT * FROM t WHERE deleted_at IS :deleted")
//!     .with_parameter(Parameter::nullable("deleted", None::<i64>))
//!     .build();
//!
//! assert_eq!(query.sql(), "SELECT * FROM t WHERE deleted_at IS :deleted");
//! ```
//!
//! Text is never parsed beyond the clause patterns in [`grammar`]; the result
//! still needs a driver to run it.

pub mod error;
pub mod grammar;
pub mod parameter;
pub mod processor;
pub mod queryfier;
pub mod span;
pub mod value;

pub use error::{QueryfierError, Result};
pub use parameter::{Parameter, ParameterSet};
pub use processor::{PruneOutcome, Pruner};
pub use queryfier::{Queryfied, Queryfier};
pub use span::Span;
pub use value::{SqlValue, ToSqlValue};
