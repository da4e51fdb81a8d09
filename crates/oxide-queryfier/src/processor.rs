//! Null-aware clause pruning.
//!
//! Clauses whose parameter has no value are cut out of the query text. When
//! the clause that carried the `WHERE` keyword goes, the next clause that
//! survives has its `AND`/`OR` rewritten to `WHERE` so the text still parses.
//!
//! All matching happens against the unmodified input. Decisions are recorded as
//! [`Edit`]s and applied in one left-to-right copy at the end, so nothing is
//! rescanned after being modified.

use tracing::debug;

use crate::grammar::{self, Connector, Operator};
use crate::parameter::ParameterSet;
use crate::span::Span;

/// A single rewrite of the input text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edit {
    /// Drop the bytes in the span.
    Remove(Span),
    /// Replace an `AND`/`OR` connector with `WHERE`.
    Promote(Span),
}

impl Edit {
    const fn span(self) -> Span {
        match self {
            Self::Remove(span) | Self::Promote(span) => span,
        }
    }
}

/// Result of a pruning pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PruneOutcome {
    /// Trimmed query text.
    pub sql: String,
    /// Names of the placeholders whose clauses were removed, in text order.
    pub pruned: Vec<String>,
}

/// One-shot pruning pass over a query template.
///
/// ```
/// use oxide_queryfier::{ParameterSet, Pruner};
///
/// let mut params = ParameterSet::scan("SELECT * FROM t WHERE a = :x AND b = :y");
/// params.bind_next(None::<i64>).unwrap();
/// params.bind_next("v").unwrap();
///
/// let outcome = Pruner::new("SELECT * FROM t WHERE a = :x AND b = :y", &params).prune();
/// assert_eq!(outcome.sql, "SELECT * FROM t  WHERE b = :y");
/// assert_eq!(outcome.pruned, vec!["x"]);
/// ```
#[derive(Debug)]
pub struct Pruner<'a> {
    sql: &'a str,
    parameters: &'a ParameterSet,
    allow_nulls: bool,
}

impl<'a> Pruner<'a> {
    /// Creates a pruner that removes clauses bound to null values.
    #[must_use]
    pub const fn new(sql: &'a str, parameters: &'a ParameterSet) -> Self {
        Self {
            sql,
            parameters,
            allow_nulls: false,
        }
    }

    /// Keeps every clause regardless of parameter values.
    #[must_use]
    pub const fn allow_nulls(mut self, allow_nulls: bool) -> Self {
        self.allow_nulls = allow_nulls;
        self
    }

    /// Runs the pass.
    ///
    /// Consumes the pruner: a template is pruned exactly once.
    #[must_use]
    pub fn prune(self) -> PruneOutcome {
        if self.allow_nulls {
            debug!("nulls allowed, keeping every clause");
            return PruneOutcome {
                sql: self.sql.trim().to_string(),
                pruned: Vec::new(),
            };
        }

        let mut edits: Vec<Edit> = Vec::new();
        let mut pruned = Vec::new();
        let mut where_removed = false;
        // End of the last removed span; clauses starting before it were
        // already swallowed by a BETWEEN upper bound.
        let mut cursor = 0;

        for clause in grammar::clauses(self.sql) {
            if clause.span.start < cursor {
                continue;
            }

            let prunable = self
                .parameters
                .get(clause.placeholder)
                .is_none_or(|p| p.is_prunable());

            if prunable {
                debug!(
                    connector = %clause.connector,
                    column = clause.column,
                    operator = %clause.operator,
                    placeholder = clause.placeholder,
                    "pruning clause with null parameter"
                );
                edits.push(Edit::Remove(clause.span));
                pruned.push(clause.placeholder.to_string());
                cursor = clause.span.end;

                if clause.connector == Connector::Where {
                    where_removed = true;
                }

                if clause.operator == Operator::Between {
                    if let Some(upper) = grammar::paired_bound(self.sql, clause.span.end) {
                        debug!(placeholder = upper.placeholder, "pruning BETWEEN upper bound");
                        edits.push(Edit::Remove(upper.span));
                        pruned.push(upper.placeholder.to_string());
                        cursor = upper.span.end;
                    }
                }
            } else if where_removed {
                let taken: Vec<Span> = edits.iter().map(|e| e.span()).collect();
                if let Some(connector) = grammar::first_bare_connector(self.sql, &taken) {
                    debug!(
                        connector = connector.slice(self.sql),
                        "promoting connector to WHERE"
                    );
                    edits.push(Edit::Promote(connector));
                }
                where_removed = false;
            }
        }

        PruneOutcome {
            sql: apply(self.sql, edits).trim().to_string(),
            pruned,
        }
    }
}

/// Copies `sql` left to right, skipping removed spans and substituting
/// promoted connectors.
fn apply(sql: &str, mut edits: Vec<Edit>) -> String {
    // A removal starting at a promoted connector takes the connector with it,
    // so removals sort first at equal start.
    edits.sort_by_key(|e| (e.span().start, matches!(e, Edit::Promote(_))));

    let mut out = String::with_capacity(sql.len());
    let mut pos = 0;
    for edit in edits {
        let span = edit.span();
        if span.start < pos {
            // Already removed.
            continue;
        }
        out.push_str(&sql[pos..span.start]);
        if let Edit::Promote(_) = edit {
            out.push_str(Connector::Where.keyword());
        }
        pos = span.end;
    }
    out.push_str(&sql[pos..]);
    out
}
