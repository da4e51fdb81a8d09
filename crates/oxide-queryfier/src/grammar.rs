//! Clause recognition.
//!
//! The grammar is deliberately shallow: it does not parse SQL, it only
//! recognises the two shapes a prunable filter can take.
//!
//! - `<connector> <column> <operator> :<name>`, e.g. `AND t.age >= :min_age`
//! - `<connector> :<name>`, the upper bound of `BETWEEN :lo AND :hi`
//!
//! Connectors and keyword operators match case-insensitively. Column names may
//! carry an alias prefix (`t.column`) so the same patterns serve plain SQL and
//! entity query dialects.

use std::fmt;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::span::Span;

const CONNECTOR: &str = r"\b(?P<connector>WHERE|AND|OR)";
const COLUMN: &str = r"(?P<column>[A-Za-z0-9_]+(?:\.[A-Za-z0-9_]+)*)";
const OPERATOR: &str = r"(?P<operator><=|>=|=|<|>|IS|BETWEEN|LIKE)";
const PLACEHOLDER: &str = r":(?P<name>[A-Za-z][A-Za-z0-9_]*)";

static CLAUSE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i){CONNECTOR} {COLUMN}\s*{OPERATOR}\s*{PLACEHOLDER}"
    ))
    .expect("clause pattern is valid")
});

static PAIRED_BOUND_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)^\s*(?P<fragment>{CONNECTOR} {PLACEHOLDER})"))
        .expect("paired bound pattern is valid")
});

// Matches `::name` too so casts can be told apart from placeholders.
static PLACEHOLDER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r":{1,2}(?P<name>[A-Za-z][A-Za-z0-9_]*)").expect("placeholder pattern is valid")
});

static BARE_CONNECTOR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:AND|OR)\b").expect("bare connector pattern is valid")
});

/// Keyword that introduces or joins a filter clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connector {
    /// `WHERE`
    Where,
    /// `AND`
    And,
    /// `OR`
    Or,
}

impl Connector {
    /// Parses a connector keyword, ignoring case.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        [Self::Where, Self::And, Self::Or]
            .into_iter()
            .find(|c| keyword.eq_ignore_ascii_case(c.keyword()))
    }

    /// Canonical upper-case spelling.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Where => "WHERE",
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Comparison operator between a column and a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `=`
    Eq,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    Le,
    /// `>=`
    Ge,
    /// `IS`
    Is,
    /// `BETWEEN`, whose upper bound follows as a bare `AND :name`
    Between,
    /// `LIKE`
    Like,
}

impl Operator {
    /// Parses an operator token, ignoring case.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        [
            Self::Eq,
            Self::Lt,
            Self::Gt,
            Self::Le,
            Self::Ge,
            Self::Is,
            Self::Between,
            Self::Like,
        ]
        .into_iter()
        .find(|op| token.eq_ignore_ascii_case(op.token()))
    }

    /// Canonical spelling.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::Is => "IS",
            Self::Between => "BETWEEN",
            Self::Like => "LIKE",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A `<connector> <column> <operator> :<name>` match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clause<'t> {
    /// From the first byte of the connector to the last byte of the placeholder.
    pub span: Span,
    /// Leading connector.
    pub connector: Connector,
    /// Column or alias path being compared.
    pub column: &'t str,
    /// Comparison operator.
    pub operator: Operator,
    /// Placeholder name without the colon.
    pub placeholder: &'t str,
}

/// A `<connector> :<name>` match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BareClause<'t> {
    /// From the first byte of the connector to the last byte of the placeholder.
    pub span: Span,
    /// Leading connector.
    pub connector: Connector,
    /// Placeholder name without the colon.
    pub placeholder: &'t str,
}

/// A `:name` occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder<'t> {
    /// Covers the colon and the name.
    pub span: Span,
    /// Name without the colon.
    pub name: &'t str,
}

/// Finds every full clause in `text`, leftmost first, without overlap.
pub fn clauses(text: &str) -> impl Iterator<Item = Clause<'_>> {
    CLAUSE_PATTERN
        .captures_iter(text)
        .filter_map(|caps| clause_from(&caps))
}

fn clause_from<'t>(caps: &Captures<'t>) -> Option<Clause<'t>> {
    let whole = caps.get(0)?;
    Some(Clause {
        span: whole.into(),
        connector: Connector::from_keyword(caps.name("connector")?.as_str())?,
        column: caps.name("column")?.as_str(),
        operator: Operator::from_token(caps.name("operator")?.as_str())?,
        placeholder: caps.name("name")?.as_str(),
    })
}

/// Matches the bare `<connector> :<name>` fragment starting at byte `at`,
/// after any whitespace.
///
/// This is how the upper bound of `col BETWEEN :lo AND :hi` is found once the
/// clause ending at `:lo` is known. The returned span is relative to `text`.
#[must_use]
pub fn paired_bound(text: &str, at: usize) -> Option<BareClause<'_>> {
    let rest = text.get(at..)?;
    let caps = PAIRED_BOUND_PATTERN.captures(rest)?;
    let fragment = caps.name("fragment")?;
    Some(BareClause {
        span: Span::from(fragment).offset(at),
        connector: Connector::from_keyword(caps.name("connector")?.as_str())?,
        placeholder: caps.name("name")?.as_str(),
    })
}

/// Every placeholder occurrence in `text`, left to right.
///
/// `::name` (a type cast) is skipped.
pub fn placeholders(text: &str) -> impl Iterator<Item = Placeholder<'_>> {
    PLACEHOLDER_PATTERN.captures_iter(text).filter_map(|caps| {
        let whole = caps.get(0)?;
        if whole.as_str().starts_with("::") {
            return None;
        }
        Some(Placeholder {
            span: whole.into(),
            name: caps.name("name")?.as_str(),
        })
    })
}

/// Span of the first word-bounded `AND`/`OR` lying outside every span in `skip`.
#[must_use]
pub fn first_bare_connector(text: &str, skip: &[Span]) -> Option<Span> {
    BARE_CONNECTOR_PATTERN
        .find_iter(text)
        .map(Span::from)
        .find(|candidate| !skip.iter().any(|s| s.overlaps(candidate)))
}
