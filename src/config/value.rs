//! The configuration tree node type.

use std::fmt;

use indexmap::IndexMap;

use super::coerce::is_numeric;

/// An insertion-ordered mapping from keys to values.
pub type Table = IndexMap<String, Value>;

/// A node in the configuration tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    Table(Table),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_table_mut(&mut self) -> Option<&mut Table> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }

    /// Returns `true` for strings, numbers and booleans.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Bool(_) | Value::Integer(_) | Value::Float(_) | Value::String(_)
        )
    }

    /// Coerces the value to an integer.
    ///
    /// Floats are truncated, booleans become 0/1 and strings are parsed as an
    /// integer, then as a float. Anything unparseable is 0; collections are 0 when
    /// empty and 1 otherwise.
    pub fn coerce_int(&self) -> i64 {
        match self {
            Value::Null => 0,
            Value::Bool(b) => i64::from(*b),
            Value::Integer(i) => *i,
            Value::Float(f) => *f as i64,
            Value::String(s) => parse_int(s),
            Value::Array(a) => i64::from(!a.is_empty()),
            Value::Table(t) => i64::from(!t.is_empty()),
        }
    }

    /// Coerces the value to a float, following the same rules as [`Value::coerce_int`].
    pub fn coerce_float(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Integer(i) => *i as f64,
            Value::Float(f) => *f,
            Value::String(s) => parse_float(s),
            Value::Array(a) => f64::from(u8::from(!a.is_empty())),
            Value::Table(t) => f64::from(u8::from(!t.is_empty())),
        }
    }

    /// Truthiness: `""`, `"0"`, zero and empty collections are false.
    pub fn coerce_bool(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Integer(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::String(s) => !(s.is_empty() || s == "0"),
            Value::Array(a) => !a.is_empty(),
            Value::Table(t) => !t.is_empty(),
        }
    }

    /// Converts the tree into a JSON value. Non-finite floats become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Integer(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(a) => serde_json::Value::Array(a.iter().map(Value::to_json).collect()),
            Value::Table(t) => serde_json::Value::Object(
                t.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

fn parse_int(s: &str) -> i64 {
    let trimmed = s.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return i;
    }
    if is_numeric(trimmed) {
        return trimmed.parse::<f64>().map(|f| f as i64).unwrap_or(0);
    }
    0
}

fn parse_float(s: &str) -> f64 {
    let trimmed = s.trim();
    if is_numeric(trimmed) {
        trimmed.parse::<f64>().unwrap_or(0.0)
    } else {
        0.0
    }
}

/// Renders the value the way it is exported and interpolated.
///
/// `Null` is empty, scalars use their natural form and collections are compact JSON.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => f.write_str(s),
            Value::Array(_) | Value::Table(_) => write!(f, "{}", self.to_json()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Table> for Value {
    fn from(t: Table) -> Self {
        Value::Table(t)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(a) => Value::Array(a.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(o) => {
                Value::Table(o.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<toml::Value> for Value {
    fn from(value: toml::Value) -> Self {
        match value {
            toml::Value::String(s) => Value::String(s),
            toml::Value::Integer(i) => Value::Integer(i),
            toml::Value::Float(f) => Value::Float(f),
            toml::Value::Boolean(b) => Value::Bool(b),
            toml::Value::Datetime(dt) => Value::String(dt.to_string()),
            toml::Value::Array(a) => Value::Array(a.into_iter().map(Value::from).collect()),
            toml::Value::Table(t) => {
                Value::Table(t.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_scalars() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Integer(42).to_string(), "42");
        assert_eq!(Value::Float(42.5).to_string(), "42.5");
        assert_eq!(Value::from("abc").to_string(), "abc");
    }

    #[test]
    fn test_display_collections_as_json() {
        let mut table = Table::new();
        table.insert("b".into(), Value::Integer(1));
        table.insert("a".into(), Value::from(vec!["x", "y"]));
        assert_eq!(Value::Table(table).to_string(), r#"{"b":1,"a":["x","y"]}"#);
    }

    #[test]
    fn test_coerce_int() {
        assert_eq!(Value::from("12").coerce_int(), 12);
        assert_eq!(Value::from(" 7.9 ").coerce_int(), 7);
        assert_eq!(Value::from("abc").coerce_int(), 0);
        assert_eq!(Value::Float(-3.7).coerce_int(), -3);
        assert_eq!(Value::Bool(true).coerce_int(), 1);
        assert_eq!(Value::Array(vec![]).coerce_int(), 0);
    }

    #[test]
    fn test_coerce_float() {
        assert_eq!(Value::from("1e3").coerce_float(), 1000.0);
        assert_eq!(Value::Integer(2).coerce_float(), 2.0);
        assert_eq!(Value::from("nan").coerce_float(), 0.0);
    }

    #[test]
    fn test_coerce_bool() {
        assert!(!Value::from("").coerce_bool());
        assert!(!Value::from("0").coerce_bool());
        assert!(Value::from("false").coerce_bool());
        assert!(!Value::Integer(0).coerce_bool());
        assert!(Value::Float(0.1).coerce_bool());
        assert!(!Value::Table(Table::new()).coerce_bool());
    }

    #[test]
    fn test_strict_accessors_do_not_coerce() {
        assert_eq!(Value::Integer(3).as_i64(), Some(3));
        assert_eq!(Value::from("3").as_i64(), None);
        assert_eq!(Value::Float(0.5).as_f64(), Some(0.5));
        assert_eq!(Value::Integer(1).as_f64(), None);
        assert_eq!(Value::Bool(false).as_bool(), Some(false));
        assert_eq!(Value::from("true").as_bool(), None);
        assert_eq!(Value::from(vec![1, 2]).as_array().map(Vec::len), Some(2));
        assert_eq!(Value::Null.as_array(), None);
    }

    #[test]
    fn test_from_json_keeps_order_and_types() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"z": 1, "a": 2.5, "m": [true, null]}"#).unwrap();
        let value = Value::from(json);
        let table = value.as_table().unwrap();
        assert_eq!(table.keys().collect::<Vec<_>>(), vec!["z", "a", "m"]);
        assert_eq!(table["z"], Value::Integer(1));
        assert_eq!(table["a"], Value::Float(2.5));
        assert_eq!(table["m"], Value::Array(vec![Value::Bool(true), Value::Null]));
    }

    #[test]
    fn test_from_toml_datetime_is_string() {
        let table: toml::Table = toml::from_str("when = 1979-05-27T07:32:00Z").unwrap();
        let value = Value::from(toml::Value::Table(table));
        assert_eq!(value.as_table().unwrap()["when"].as_str(), Some("1979-05-27T07:32:00Z"));
    }
}
