//! Positional rewriting and value binding.

use oxide_queryfier::grammar;
use oxide_queryfier::{Queryfied, SqlValue};
use sqlx::query::{Query, QueryAs};
use sqlx::sqlite::{Sqlite, SqliteArguments, SqlitePool, SqliteRow};
use sqlx::FromRow;
use tracing::debug;

use crate::error::{Error, Result};

/// A pruned query rewritten to `?` placeholders, with one value per placeholder.
///
/// Named placeholders are resolved here rather than left to SQLite so that a
/// name used twice binds the same value twice and a name that was never bound
/// is reported before the query reaches the database.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedQuery {
    sql: String,
    values: Vec<SqlValue>,
}

impl PreparedQuery {
    /// Rewrites `queryfied` for positional binding.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnboundParameter`] for a placeholder that has no
    /// retained parameter, or whose parameter was never bound.
    pub fn new(queryfied: &Queryfied) -> Result<Self> {
        let source = queryfied.sql();
        let mut sql = String::with_capacity(source.len());
        let mut values = Vec::new();
        let mut pos = 0;

        for placeholder in grammar::placeholders(source) {
            let parameter = queryfied
                .parameter(placeholder.name)
                .filter(|p| p.is_bound())
                .ok_or_else(|| Error::UnboundParameter(placeholder.name.to_string()))?;

            sql.push_str(&source[pos..placeholder.span.start]);
            sql.push('?');
            values.push(parameter.value().clone());
            pos = placeholder.span.end;
        }
        sql.push_str(&source[pos..]);

        debug!(sql = %sql, values = values.len(), "prepared query");
        Ok(Self { sql, values })
    }

    /// SQL with positional placeholders.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Values in placeholder order.
    #[must_use]
    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    /// Raw query with every value bound.
    #[must_use]
    pub fn query(&self) -> Query<'_, Sqlite, SqliteArguments<'_>> {
        self.values
            .iter()
            .fold(sqlx::query(&self.sql), |query, value| bind_value(query, value))
    }

    /// Typed query mapping each row into `T`.
    #[must_use]
    pub fn query_as<T>(&self) -> QueryAs<'_, Sqlite, T, SqliteArguments<'_>>
    where
        T: for<'r> FromRow<'r, SqliteRow>,
    {
        self.values
            .iter()
            .fold(sqlx::query_as::<_, T>(&self.sql), |query, value| {
                bind_value_as(query, value)
            })
    }

    /// Executes the query and returns the number of rows affected.
    pub async fn execute(&self, pool: &SqlitePool) -> Result<u64> {
        let result = self.query().execute(pool).await?;
        Ok(result.rows_affected())
    }

    /// Fetches every row without mapping.
    pub async fn fetch_all(&self, pool: &SqlitePool) -> Result<Vec<SqliteRow>> {
        Ok(self.query().fetch_all(pool).await?)
    }

    /// Fetches every row mapped into `T`.
    pub async fn fetch_all_as<T>(&self, pool: &SqlitePool) -> Result<Vec<T>>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        Ok(self.query_as::<T>().fetch_all(pool).await?)
    }

    /// Fetches at most one row mapped into `T`.
    pub async fn fetch_optional_as<T>(&self, pool: &SqlitePool) -> Result<Option<T>>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        Ok(self.query_as::<T>().fetch_optional(pool).await?)
    }
}

impl TryFrom<&Queryfied> for PreparedQuery {
    type Error = Error;

    fn try_from(queryfied: &Queryfied) -> Result<Self> {
        Self::new(queryfied)
    }
}

/// Binds a SqlValue parameter to a raw query.
fn bind_value<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &SqlValue,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value.clone() {
        SqlValue::Null => query.bind(Option::<i64>::None),
        SqlValue::Bool(b) => query.bind(b),
        SqlValue::Int(i) => query.bind(i),
        SqlValue::Float(f) => query.bind(f),
        SqlValue::Text(s) => query.bind(s),
        SqlValue::Blob(b) => query.bind(b),
    }
}

/// Binds a SqlValue parameter to a query_as query.
fn bind_value_as<'q, T>(
    query: QueryAs<'q, Sqlite, T, SqliteArguments<'q>>,
    value: &SqlValue,
) -> QueryAs<'q, Sqlite, T, SqliteArguments<'q>>
where
    T: for<'r> FromRow<'r, SqliteRow>,
{
    match value.clone() {
        SqlValue::Null => query.bind(Option::<i64>::None),
        SqlValue::Bool(b) => query.bind(b),
        SqlValue::Int(i) => query.bind(i),
        SqlValue::Float(f) => query.bind(f),
        SqlValue::Text(s) => query.bind(s),
        SqlValue::Blob(b) => query.bind(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxide_queryfier::{Parameter, Queryfier};
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::Row;

    #[derive(Debug, PartialEq, sqlx::FromRow)]
    struct Person {
        id: i64,
        name: String,
        age: i64,
    }

    async fn create_test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .expect("Failed to create in-memory SQLite pool");

        sqlx::query(
            "CREATE TABLE person (id INTEGER PRIMARY KEY, name TEXT NOT NULL, \
             age INTEGER NOT NULL, nickname TEXT)",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO person (id, name, age, nickname) VALUES \
             (1, 'alice', 30, 'al'), (2, 'bob', 17, NULL), (3, 'carol', 45, NULL)",
        )
        .execute(&pool)
        .await
        .unwrap();

        pool
    }

    #[test]
    fn test_rewrites_placeholders_in_order() {
        let queryfied = Queryfier::new("SELECT * FROM t WHERE a = :a AND b = :b OR c = :a")
            .with(1)
            .with(2)
            .with(3)
            .build();
        let prepared = PreparedQuery::new(&queryfied).unwrap();
        assert_eq!(prepared.sql(), "SELECT * FROM t WHERE a = ? AND b = ? OR c = ?");
        assert_eq!(
            prepared.values(),
            &[SqlValue::Int(1), SqlValue::Int(2), SqlValue::Int(1)]
        );
    }

    #[test]
    fn test_casts_are_left_alone() {
        let queryfied = Queryfier::new("SELECT a::text FROM t WHERE b = :b")
            .with("x")
            .build();
        let prepared = PreparedQuery::try_from(&queryfied).unwrap();
        assert_eq!(prepared.sql(), "SELECT a::text FROM t WHERE b = ?");
    }

    #[test]
    fn test_unprunable_unbound_placeholder_is_an_error() {
        let queryfied = Queryfier::new("SELECT * FROM t WHERE (x IS NULL OR :since <= y)").build();
        let err = PreparedQuery::new(&queryfied).unwrap_err();
        assert!(matches!(err, Error::UnboundParameter(ref name) if name == "since"));
        assert_eq!(
            err.to_string(),
            "parameter 'since' is referenced by the query but was never bound"
        );
    }

    #[test]
    fn test_explicit_null_is_bindable() {
        let queryfied = Queryfier::new("SELECT * FROM t WHERE a = :a AND b = :b")
            .allowing_nulls()
            .with(None::<i64>)
            .with(2)
            .build();
        let prepared = PreparedQuery::new(&queryfied).unwrap();
        assert_eq!(prepared.values(), &[SqlValue::Null, SqlValue::Int(2)]);
    }

    #[test]
    fn test_bound_null_in_unprunable_clause_binds_null() {
        let queryfied = Queryfier::new("SELECT * FROM t WHERE (x IS NULL OR :since <= y)")
            .with(None::<i64>)
            .build();
        assert!(!queryfied.parameter("since").unwrap().accepts_null());

        let prepared = PreparedQuery::new(&queryfied).unwrap();
        assert_eq!(prepared.sql(), "SELECT * FROM t WHERE (x IS NULL OR ? <= y)");
        assert_eq!(prepared.values(), &[SqlValue::Null]);
    }

    #[tokio::test]
    async fn test_fetch_with_pruned_filter() {
        let pool = create_test_pool().await;
        let queryfied = Queryfier::new(
            "SELECT id, name, age FROM person WHERE name = :name AND age >= :min_age ORDER BY id",
        )
        .with(None::<&str>)
        .with(18)
        .build();
        assert_eq!(
            queryfied.sql(),
            "SELECT id, name, age FROM person  WHERE age >= :min_age ORDER BY id"
        );

        let people: Vec<Person> = PreparedQuery::new(&queryfied)
            .unwrap()
            .fetch_all_as(&pool)
            .await
            .unwrap();
        let names: Vec<_> = people.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["alice", "carol"]);
    }

    #[tokio::test]
    async fn test_fetch_without_any_filter() {
        let pool = create_test_pool().await;
        let queryfied = Queryfier::new(
            "SELECT id, name, age FROM person WHERE age BETWEEN :lo AND :hi",
        )
        .build();
        assert_eq!(queryfied.sql(), "SELECT id, name, age FROM person");

        let rows = PreparedQuery::new(&queryfied)
            .unwrap()
            .fetch_all(&pool)
            .await
            .unwrap();
        assert_eq!(rows.len(), 3);
    }

    #[tokio::test]
    async fn test_fetch_optional_by_name() {
        let pool = create_test_pool().await;
        let queryfied = Queryfier::new("SELECT id, name, age FROM person WHERE name = :name")
            .with_parameter(Parameter::new("name", "bob"))
            .build();

        let bob: Option<Person> = PreparedQuery::new(&queryfied)
            .unwrap()
            .fetch_optional_as(&pool)
            .await
            .unwrap();
        assert_eq!(
            bob,
            Some(Person {
                id: 2,
                name: String::from("bob"),
                age: 17,
            })
        );
    }

    #[tokio::test]
    async fn test_nullable_parameter_binds_null() {
        let pool = create_test_pool().await;
        let queryfied = Queryfier::new("SELECT id FROM person WHERE nickname IS :nick ORDER BY id")
            .with_parameter(Parameter::nullable("nick", None::<&str>))
            .build();

        let rows = PreparedQuery::new(&queryfied)
            .unwrap()
            .fetch_all(&pool)
            .await
            .unwrap();
        let ids: Vec<i64> = rows.iter().map(|r| r.get("id")).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[tokio::test]
    async fn test_execute_update() {
        let pool = create_test_pool().await;
        let queryfied = Queryfier::new("UPDATE person SET age = age + 1 WHERE name = :name")
            .with("carol")
            .build();

        let affected = PreparedQuery::new(&queryfied)
            .unwrap()
            .execute(&pool)
            .await
            .unwrap();
        assert_eq!(affected, 1);

        let age: i64 = sqlx::query("SELECT age FROM person WHERE id = 3")
            .fetch_one(&pool)
            .await
            .unwrap()
            .get(0);
        assert_eq!(age, 46);
    }
}
