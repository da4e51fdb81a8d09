//! # oxide-queryfier-sqlx
//!
//! Runs queries pruned by `oxide-queryfier` on SQLite through sqlx.
//!
//! Named placeholders are rewritten to `?` and the retained parameter values
//! are bound in placeholder order. Rows can be fetched raw or mapped into any
//! `FromRow` type.
//!
//! ```ignore
//! use oxide_queryfier::Queryfier;
//! use oxide_queryfier_sqlx::PreparedQuery;
//! use sqlx::SqlitePool;
//!
//! #[derive(sqlx::FromRow)]
//! struct User {
//!     id: i64,
//!     name: String,
//! }
//!
//! async fn adults(pool: &SqlitePool, name: Option<&str>) -> oxide_queryfier_sqlx::Result<Vec<User>> {
//!     let query = Queryfier::new("SELECT id, name FROM users WHERE name = :name AND age >= :age")
//!         .with(name)
//!         .with(18)
//!         .build();
//!
//!     PreparedQuery::new(&query)?.fetch_all_as(pool).await
//! }
//! ```

pub mod error;
pub mod prepared;

pub use error::{Error, Result};
pub use prepared::PreparedQuery;
