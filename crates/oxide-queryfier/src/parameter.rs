//! Named parameter slots.

use serde::Serialize;
use tracing::trace;

use crate::error::{QueryfierError, Result};
use crate::grammar;
use crate::value::{SqlValue, ToSqlValue};

/// A named binding slot.
///
/// A slot whose value is null is pruned from the query together with its
/// clause, unless it was created with [`Parameter::nullable`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    name: String,
    value: SqlValue,
    accepts_null: bool,
    #[serde(skip)]
    bound: bool,
}

impl Parameter {
    /// Creates a parameter that is pruned when `value` is null.
    #[must_use]
    pub fn new<V: ToSqlValue>(name: impl Into<String>, value: V) -> Self {
        Self {
            name: name.into(),
            value: value.to_sql_value(),
            accepts_null: false,
            bound: false,
        }
    }

    /// Creates a parameter whose clause is kept even when `value` is null.
    ///
    /// ```
    /// use oxide_queryfier::{Parameter, Queryfier};
    ///
    /// let q = Queryfier::new("SELECT * FROM t WHERE c IS :c")
    ///     .with_parameter(Parameter::nullable("c", None::<i64>))
    ///     .build();
    /// assert_eq!(q.sql(), "SELECT * FROM t WHERE c IS :c");
    /// ```
    #[must_use]
    pub fn nullable<V: ToSqlValue>(name: impl Into<String>, value: V) -> Self {
        Self {
            accepts_null: true,
            ..Self::new(name, value)
        }
    }

    fn unbound(name: &str) -> Self {
        Self::new(name, SqlValue::Null)
    }

    /// Parameter name, without the leading colon.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bound value; [`SqlValue::Null`] when nothing was bound.
    #[must_use]
    pub const fn value(&self) -> &SqlValue {
        &self.value
    }

    /// Whether a null value keeps the clause in the query.
    #[must_use]
    pub const fn accepts_null(&self) -> bool {
        self.accepts_null
    }

    /// Whether a value was assigned, positionally or by name.
    #[must_use]
    pub const fn is_bound(&self) -> bool {
        self.bound
    }

    /// Whether the value is absent.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        self.value.is_null()
    }

    /// True when the clause referencing this parameter must be removed.
    #[must_use]
    pub const fn is_prunable(&self) -> bool {
        self.is_null() && !self.accepts_null
    }
}

/// Ordered parameter slots of one query.
///
/// Scanning a template yields one slot per placeholder occurrence, so a name
/// that appears twice gets two slots and positional binds fill both in turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSet {
    parameters: Vec<Parameter>,
}

impl ParameterSet {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            parameters: Vec::new(),
        }
    }

    /// Creates one unbound slot per placeholder in `template`, left to right.
    #[must_use]
    pub fn scan(template: &str) -> Self {
        let parameters: Vec<_> = grammar::placeholders(template)
            .map(|p| Parameter::unbound(p.name))
            .collect();
        trace!(count = parameters.len(), "scanned placeholders");
        Self { parameters }
    }

    /// Assigns `value` to the first slot nothing has been bound to yet.
    ///
    /// # Errors
    ///
    /// Returns [`QueryfierError::BindingOverflow`] when every slot is bound;
    /// the set is left unchanged.
    pub fn bind_next<V: ToSqlValue>(&mut self, value: V) -> Result<()> {
        let value = value.to_sql_value();
        match self.parameters.iter_mut().find(|p| !p.bound) {
            Some(slot) => {
                trace!(name = %slot.name, kind = value.kind(), "bound positional value");
                slot.value = value;
                slot.bound = true;
                Ok(())
            }
            None => Err(QueryfierError::BindingOverflow { value }),
        }
    }

    /// Replaces every slot named like `parameter` with it, appended last.
    pub fn insert_named(&mut self, mut parameter: Parameter) {
        self.parameters.retain(|p| p.name != parameter.name);
        parameter.bound = true;
        trace!(name = %parameter.name, "inserted named parameter");
        self.parameters.push(parameter);
    }

    /// First slot with the given name.
    ///
    /// `None` means the name never appeared in the template and was never
    /// inserted; the pruner treats that like an unbound, non-nullable slot.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Slots in binding order.
    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.parameters.iter()
    }

    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Returns true if there are no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

impl<'a> IntoIterator for &'a ParameterSet {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
