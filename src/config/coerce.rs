//! Scalar type coercion for untyped formats (INI, `.env`, environment variables).

use std::sync::LazyLock;

use regex::Regex;

use super::value::Value;

static NUMERIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?\s*$")
        .expect("numeric pattern is valid")
});

/// Coerces a raw string into the most specific value.
///
/// In order: all-digit strings become integers, other numeric strings become
/// floats, and the exact literals `true`, `false` and `null` become booleans and
/// null. Everything else stays a string.
pub fn coerce_scalar(s: &str) -> Value {
    if looks_like_integer(s) {
        if let Ok(i) = s.parse::<i64>() {
            return Value::Integer(i);
        }
    }

    if is_numeric(s) {
        if let Ok(f) = s.trim().parse::<f64>() {
            return Value::Float(f);
        }
    }

    match s {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" => Value::Null,
        _ => Value::String(s.to_string()),
    }
}

/// Returns `true` for decimal numeric strings: optional sign, digits with an
/// optional fraction, optional exponent, surrounding whitespace allowed.
pub fn is_numeric(s: &str) -> bool {
    NUMERIC_RE.is_match(s)
}

fn looks_like_integer(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|c| c.is_ascii_digit())
}
