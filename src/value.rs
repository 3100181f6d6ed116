//! Runtime value type for the interpolation engine.
//!
//! The engine carries exactly two kinds of values: strings and at-maps
//! ([`MultiMap`]).  Everything stringifies; a map's string form is the
//! string form of its first entry's value (or `""` when empty), so every
//! value has a *string projection* and truthiness is simply "non-empty
//! projection".

use std::cmp::Ordering;
use std::fmt;

use crate::multimap::MultiMap;

/// A runtime value: a string or an at-map.
///
/// "Absent" (a builtin that produced nothing) is modelled as
/// `Option<Value>::None`, not as a variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Map(MultiMap),
}

impl Default for Value {
    fn default() -> Self {
        Value::Str(String::new())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{s}"),
            Value::Map(m) => write!(f, "{}", m.projection()),
        }
    }
}

impl Value {
    /// Truthy iff the string projection is non-empty.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Str(s) => !s.is_empty(),
            Value::Map(m) => !m.projection().is_empty(),
        }
    }

    /// Parse the string projection as a number.
    pub fn as_number(&self) -> Option<f64> {
        parse_number(&self.to_string())
    }

    /// Borrow the map, if this is one.
    pub fn as_map(&self) -> Option<&MultiMap> {
        match self {
            Value::Map(m) => Some(m),
            Value::Str(_) => None,
        }
    }

    /// Relational comparison: numeric when both sides parse as numbers,
    /// lexicographic otherwise.
    pub fn compare(&self, other: &Value) -> Ordering {
        let a = self.to_string();
        let b = other.to_string();
        match (parse_number(&a), parse_number(&b)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => a.cmp(&b),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Str(format_number(x))
    }
}

impl From<MultiMap> for Value {
    fn from(m: MultiMap) -> Self {
        Value::Map(m)
    }
}

// ── Number formatting ─────────────────────────────────────────────────────────

/// Parse a string as a number, tolerating surrounding whitespace.
pub fn parse_number(s: &str) -> Option<f64> {
    let t = s.trim();
    if t.is_empty() {
        return None;
    }
    t.parse().ok()
}

/// Render a number the way the engine prints it: integral finite values
/// without a decimal point, everything else via the shortest `f64` form.
pub fn format_number(x: f64) -> String {
    // 2^53 — beyond it f64 cannot represent every integer anyway.
    if x.is_finite() && x == x.trunc() && x.abs() < 9_007_199_254_740_992.0 {
        format!("{}", x as i64)
    } else {
        format!("{x}")
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
