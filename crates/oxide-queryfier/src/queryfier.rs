//! Build-step object for a query template.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, warn};

use crate::grammar;
use crate::parameter::{Parameter, ParameterSet};
use crate::processor::Pruner;
use crate::value::ToSqlValue;

/// Collects parameter bindings for a template, then prunes it once.
///
/// # Example
///
/// ```
/// use oxide_queryfier::Queryfier;
///
/// let query = Queryfier::new("SELECT * FROM users WHERE name = :name AND age >= :age")
///     .with("alice")
///     .with(None::<i64>)
///     .build();
///
/// assert_eq!(query.sql(), "SELECT * FROM users WHERE name = :name");
/// assert_eq!(query.parameters().len(), 1);
/// ```
#[derive(Debug, Clone)]
#[must_use = "a Queryfier does nothing until built"]
pub struct Queryfier {
    sql: String,
    parameters: ParameterSet,
    allow_nulls: bool,
}

impl Queryfier {
    /// Scans `sql` for placeholders; every slot starts unbound.
    pub fn new(sql: impl Into<String>) -> Self {
        let sql = sql.into();
        let parameters = ParameterSet::scan(&sql);
        Self {
            sql,
            parameters,
            allow_nulls: false,
        }
    }

    /// Binds `value` to the next unbound placeholder, in template order.
    ///
    /// Extra values are logged and ignored.
    pub fn with<V: ToSqlValue>(mut self, value: V) -> Self {
        if let Err(err) = self.parameters.bind_next(value) {
            warn!(sql = %self.sql, "{err}");
        }
        self
    }

    /// Binds a parameter by name, replacing any earlier slot with that name.
    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.insert_named(parameter);
        self
    }

    /// Keeps every clause, even those bound to null.
    pub fn allowing_nulls(mut self) -> Self {
        self.allow_nulls = true;
        self
    }

    /// The template as given.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Current parameter slots.
    #[must_use]
    pub const fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    /// First slot with the given name.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.get(name)
    }

    /// Prunes the template and keeps the parameters it still references.
    ///
    /// Taking `self` by value means a template can only be pruned once.
    #[must_use]
    pub fn build(self) -> Queryfied {
        let outcome = Pruner::new(&self.sql, &self.parameters)
            .allow_nulls(self.allow_nulls)
            .prune();

        let mut seen = HashSet::new();
        let referenced: Vec<&str> = grammar::placeholders(&outcome.sql)
            .map(|p| p.name)
            .filter(|name| seen.insert(*name))
            .collect();

        let mut emitted = HashSet::new();
        let parameters: Vec<Parameter> = self
            .parameters
            .iter()
            .filter(|p| referenced.contains(&p.name()) && emitted.insert(p.name()))
            .cloned()
            .collect();

        debug!(
            pruned = ?outcome.pruned,
            retained = parameters.len(),
            "queryfied template"
        );

        Queryfied {
            sql: outcome.sql,
            parameters,
        }
    }
}

/// A pruned query and the parameters it still references.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Queryfied {
    sql: String,
    parameters: Vec<Parameter>,
}

impl Queryfied {
    /// The pruned query text.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Retained parameters, one per distinct name, in binding order.
    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Retained parameter by name.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name() == name)
    }

    /// Splits into the query text and its parameters.
    #[must_use]
    pub fn into_parts(self) -> (String, Vec<Parameter>) {
        (self.sql, self.parameters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::SqlValue;

    #[test]
    fn test_build_without_bindings() {
        let q = Queryfier::new("SELECT * FROM t WHERE a = :a").build();
        assert_eq!(q.sql(), "SELECT * FROM t");
        assert!(q.parameters().is_empty());
    }

    #[test]
    fn test_extra_positional_values_are_ignored() {
        let q = Queryfier::new("SELECT * FROM t WHERE a = :a")
            .with(1)
            .with(2)
            .build();
        assert_eq!(q.sql(), "SELECT * FROM t WHERE a = :a");
        assert_eq!(q.parameter("a").unwrap().value(), &SqlValue::Int(1));
    }

    #[test]
    fn test_pruned_parameters_are_dropped() {
        let q = Queryfier::new("SELECT * FROM t WHERE a = :a AND b BETWEEN :lo AND :hi")
            .with("x")
            .with(None::<i64>)
            .with(10)
            .build();
        assert_eq!(q.sql(), "SELECT * FROM t WHERE a = :a");
        let names: Vec<_> = q.parameters().iter().map(Parameter::name).collect();
        assert_eq!(names, vec!["a"]);
    }

    #[test]
    fn test_duplicate_names_emitted_once() {
        let q = Queryfier::new("SELECT * FROM t WHERE a = :v OR b = :v")
            .with(1)
            .with(2)
            .build();
        assert_eq!(q.sql(), "SELECT * FROM t WHERE a = :v OR b = :v");
        assert_eq!(q.parameters().len(), 1);
        assert_eq!(q.parameters()[0].value(), &SqlValue::Int(1));
    }

    #[test]
    fn test_allowing_nulls_keeps_unbound_parameters() {
        let (sql, params) = Queryfier::new("SELECT * FROM t WHERE a = :a AND b = :b")
            .allowing_nulls()
            .build()
            .into_parts();
        assert_eq!(sql, "SELECT * FROM t WHERE a = :a AND b = :b");
        assert_eq!(params.len(), 2);
        assert!(params.iter().all(Parameter::is_null));
    }

    #[test]
    fn test_accessors_before_build() {
        let q = Queryfier::new("SELECT * FROM t WHERE a = :a").with(5);
        assert_eq!(q.sql(), "SELECT * FROM t WHERE a = :a");
        assert_eq!(q.parameters().len(), 1);
        assert!(q.parameter("a").unwrap().is_bound());
        assert!(q.parameter("b").is_none());
    }
}
