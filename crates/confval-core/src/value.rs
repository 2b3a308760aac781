//! Dynamic configuration values
//!
//! [`Value`] is the already-parsed, untyped shape a configuration value has
//! before it is coerced into a Rust type: a scalar, a sequence, or an ordered
//! mapping. It is what callers hand to the dynamic-value sources.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An ordered mapping of keys to dynamic values
pub type ValueMap = IndexMap<String, Value>;

/// An untyped configuration value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    /// Null value
    #[default]
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Integer(i64),
    /// Floating point value
    Float(f64),
    /// String value
    String(String),
    /// Sequence of values
    Sequence(Vec<Value>),
    /// Mapping of string keys to values, in insertion order
    Mapping(ValueMap),
}

impl Value {
    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as f64 if this is a Float or Integer
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&ValueMap> {
        match self {
            Value::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Look up a nested value by path (e.g. `"inputs.features"` or `"servers[0].port"`).
    ///
    /// Returns `None` when any segment is missing or traverses a non-container.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut current = self;
        for segment in parse_path(path)? {
            current = match (segment, current) {
                (PathSegment::Key(key), Value::Mapping(map)) => map.get(key.as_str())?,
                (PathSegment::Index(idx), Value::Sequence(seq)) => seq.get(idx)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Returns the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Sequence(_) => "list",
            Value::Mapping(_) => "map",
        }
    }

    /// Render this value for an error message. Strings are quoted so that
    /// `"5"` and `5` can be told apart.
    pub fn describe(&self) -> String {
        match self {
            Value::String(s) => format!("{:?}", s),
            other => other.to_string(),
        }
    }

    /// Convert to a `serde_json::Value`. Non-finite floats become null.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Integer(i) => serde_json::Value::Number((*i).into()),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Sequence(seq) => serde_json::Value::Array(seq.iter().map(Value::to_json).collect()),
            Value::Mapping(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(n) => write!(f, "{:?}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Sequence(seq) => {
                write!(f, "[")?;
                for (i, v) in seq.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v.describe())?;
                }
                write!(f, "]")
            }
            Value::Mapping(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v.describe())?;
                }
                write!(f, "}}")
            }
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
        Value::Integer(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Sequence(v.into_iter().map(Into::into).collect())
    }
}

impl From<ValueMap> for Value {
    fn from(m: ValueMap) -> Self {
        Value::Mapping(m)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum PathSegment {
    Key(String),
    Index(usize),
}

/// Split `"a.b[0].c"` into segments. Returns `None` on a malformed index.
fn parse_path(path: &str) -> Option<Vec<PathSegment>> {
    let mut segments = Vec::new();
    let mut key = String::new();
    let mut chars = path.chars();

    while let Some(c) = chars.next() {
        match c {
            '.' | '[' => {
                if !key.is_empty() {
                    segments.push(PathSegment::Key(std::mem::take(&mut key)));
                }
                if c == '[' {
                    let index: String = chars.by_ref().take_while(|&c| c != ']').collect();
                    segments.push(PathSegment::Index(index.parse().ok()?));
                }
            }
            ']' => return None,
            _ => key.push(c),
        }
    }

    if !key.is_empty() {
        segments.push(PathSegment::Key(key));
    }
    Some(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Value {
        let mut server = ValueMap::new();
        server.insert("host".into(), Value::from("localhost"));
        server.insert("port".into(), Value::from(8080));

        let mut root = ValueMap::new();
        root.insert("servers".into(), Value::Sequence(vec![Value::Mapping(server)]));
        root.insert("replicas".into(), Value::from(3));
        Value::Mapping(root)
    }

    #[test]
    fn test_parse_path_segments() {
        assert_eq!(
            parse_path("servers[0].host"),
            Some(vec![
                PathSegment::Key("servers".into()),
                PathSegment::Index(0),
                PathSegment::Key("host".into())
            ])
        );
        assert_eq!(parse_path(""), Some(vec![]));
        assert_eq!(parse_path("servers[x]"), None);
        assert_eq!(parse_path("servers]"), None);
    }

    #[test]
    fn test_get_path() {
        let value = sample();
        assert_eq!(value.get_path("replicas").and_then(Value::as_i64), Some(3));
        assert_eq!(
            value.get_path("servers[0].host").and_then(Value::as_str),
            Some("localhost")
        );
        assert_eq!(value.get_path(""), Some(&value));
    }

    #[test]
    fn test_get_path_missing() {
        let value = sample();
        assert!(value.get_path("servers[3]").is_none());
        assert!(value.get_path("replicas.count").is_none());
        assert!(value.get_path("nope").is_none());
    }

    #[test]
    fn test_value_type_names() {
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::Integer(1).type_name(), "int");
        assert_eq!(Value::Float(1.5).type_name(), "float");
        assert_eq!(Value::Sequence(vec![]).type_name(), "list");
        assert_eq!(Value::Mapping(ValueMap::new()).type_name(), "map");
        assert_eq!(Value::Bool(true).type_name(), "bool");
        assert_eq!(Value::from("x").type_name(), "string");
    }

    #[test]
    fn test_float_display_keeps_fraction() {
        assert_eq!(Value::Float(1.0).to_string(), "1.0");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::Integer(1).to_string(), "1");
        assert_eq!(Value::from(vec![1.0, 2.0]).describe(), "[1.0, 2.0]");
    }

    #[test]
    fn test_describe_quotes_strings() {
        assert_eq!(Value::from("5").describe(), "\"5\"");
        assert_eq!(Value::from(5).describe(), "5");
        assert_eq!(Value::from(vec!["a", "b"]).to_string(), "[\"a\", \"b\"]");
    }

    #[test]
    fn test_deserialize_from_yaml() {
        let value: Value = serde_yaml::from_str("port: 80\nratio: 0.5\ntags: [a, b]\nempty:\n").unwrap();
        assert_eq!(value.get_path("port"), Some(&Value::Integer(80)));
        assert_eq!(value.get_path("ratio"), Some(&Value::Float(0.5)));
        assert_eq!(value.get_path("tags[1]"), Some(&Value::from("b")));
        assert_eq!(value.get_path("empty"), Some(&Value::Null));
    }

    #[test]
    fn test_to_json() {
        let json = sample().to_json();
        assert_eq!(json["replicas"], serde_json::json!(3));
        assert_eq!(json["servers"][0]["port"], serde_json::json!(8080));
        assert_eq!(Value::Float(f64::NAN).to_json(), serde_json::Value::Null);
    }

    #[test]
    fn test_option_into_value() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(4i64)), Value::Integer(4));
    }
}
