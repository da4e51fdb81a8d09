//! Command-line value literals.
//!
//! `null`, `true`/`false`, integers, floats and `'quoted text'` are
//! recognised; anything else is taken as text verbatim.

use oxide_queryfier::SqlValue;

/// Parses a single literal.
pub fn parse_literal(raw: &str) -> SqlValue {
    let trimmed = raw.trim();

    if trimmed.eq_ignore_ascii_case("null") {
        return SqlValue::Null;
    }
    if let Some(inner) = trimmed
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
    {
        return SqlValue::Text(inner.replace("''", "'"));
    }
    if trimmed.eq_ignore_ascii_case("true") {
        return SqlValue::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return SqlValue::Bool(false);
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return SqlValue::Int(i);
    }
    // f64 also parses "inf" and "NaN"; only digits count as numbers here.
    if trimmed.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '.') {
        if let Ok(f) = trimmed.parse::<f64>() {
            return SqlValue::Float(f);
        }
    }

    SqlValue::Text(raw.to_string())
}

/// Parses `NAME=LITERAL`.
pub fn parse_named(raw: &str) -> Result<(String, SqlValue), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;
    Ok((parse_name(name)?, parse_literal(value)))
}

/// Parses `NAME` or `NAME=LITERAL`; a bare name is bound to null.
pub fn parse_nullable(raw: &str) -> Result<(String, SqlValue), String> {
    match raw.split_once('=') {
        Some((name, value)) => Ok((parse_name(name)?, parse_literal(value))),
        None => Ok((parse_name(raw)?, SqlValue::Null)),
    }
}

fn parse_name(raw: &str) -> Result<String, String> {
    let name = raw.trim().trim_start_matches(':');
    if name.is_empty() {
        return Err(String::from("parameter name must not be empty"));
    }
    Ok(name.to_string())
}
