//! Core value types for the key-path store.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A leaf value held at a single path.
///
/// Numbers compare by value, so `1` and `1.0` are equal.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
}

impl Scalar {
    /// Convert to the equivalent JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Scalar::Null => serde_json::Value::Null,
            Scalar::Bool(b) => serde_json::Value::Bool(*b),
            Scalar::Number(n) => serde_json::Value::Number(n.clone()),
            Scalar::String(s) => serde_json::Value::String(s.clone()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Scalar::Null, Scalar::Null) => true,
            (Scalar::Bool(a), Scalar::Bool(b)) => a == b,
            (Scalar::Number(a), Scalar::Number(b)) => same_number(a, b),
            (Scalar::String(a), Scalar::String(b)) => a == b,
            _ => false,
        }
    }
}

fn same_number(a: &serde_json::Number, b: &serde_json::Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => write!(f, "null"),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::String(s)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Number(n.into())
    }
}

impl From<u64> for Scalar {
    fn from(n: u64) -> Self {
        Scalar::Number(n.into())
    }
}

impl From<f64> for Scalar {
    /// Non-finite floats have no JSON number form and become `Null`.
    fn from(n: f64) -> Self {
        serde_json::Number::from_f64(n)
            .map(Scalar::Number)
            .unwrap_or(Scalar::Null)
    }
}

/// A nested record: named children, each a scalar or another record.
pub type Record = BTreeMap<String, Value>;

/// A value tree as accepted by `set_object` and produced by `get_object`.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    /// No value. Contributes no entry when flattened.
    #[default]
    Absent,
    Scalar(Scalar),
    Record(Record),
}

impl Value {
    /// An empty record.
    pub fn record() -> Self {
        Value::Record(Record::new())
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Look up a direct child of a record.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_record().and_then(|r| r.get(key))
    }

    /// Convert to the equivalent JSON value.
    ///
    /// Absent children are omitted; a top-level `Absent` becomes `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Absent => serde_json::Value::Null,
            Value::Scalar(s) => s.to_json(),
            Value::Record(r) => serde_json::Value::Object(
                r.iter()
                    .filter(|(_, v)| !v.is_absent())
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for Value {
    /// Objects become records. Arrays become records keyed by decimal index.
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Scalar(Scalar::Null),
            serde_json::Value::Bool(b) => Value::Scalar(Scalar::Bool(b)),
            serde_json::Value::Number(n) => Value::Scalar(Scalar::Number(n)),
            serde_json::Value::String(s) => Value::Scalar(Scalar::String(s)),
            serde_json::Value::Array(items) => Value::Record(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| (i.to_string(), Value::from(v)))
                    .collect(),
            ),
            serde_json::Value::Object(map) => Value::Record(
                map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            ),
        }
    }
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        Value::Scalar(s)
    }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Value::Record(r)
    }
}

impl From<Option<Scalar>> for Value {
    fn from(s: Option<Scalar>) -> Self {
        s.map(Value::Scalar).unwrap_or(Value::Absent)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Scalar(s.into())
    }
}

/// The canonical flat representation: stored path -> leaf value.
pub type FlatMap = BTreeMap<String, Scalar>;

/// Change payload: path -> value after the write (`None` once deleted).
pub type ChangeMap = BTreeMap<String, Option<Scalar>>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_nested() {
        let value = Value::from(json!({"foo": "bar", "man": {"name": "johnny"}}));

        assert_eq!(value.get("foo"), Some(&Value::from("bar")));
        assert_eq!(
            value.get("man").and_then(|m| m.get("name")),
            Some(&Value::from("johnny"))
        );
    }

    #[test]
    fn test_array_becomes_indexed_record() {
        let value = Value::from(json!(["a", "b"]));
        let record = value.as_record().unwrap();

        assert_eq!(record.len(), 2);
        assert_eq!(record.get("0"), Some(&Value::from("a")));
        assert_eq!(record.get("1"), Some(&Value::from("b")));
    }

    #[test]
    fn test_to_json_skips_absent() {
        let mut record = Record::new();
        record.insert("keep".to_string(), Value::from("x"));
        record.insert("gone".to_string(), Value::Absent);

        assert_eq!(Value::Record(record).to_json(), json!({"keep": "x"}));
    }

    #[test]
    fn test_scalar_equality() {
        assert_eq!(Scalar::from(1i64), Scalar::from(1u64));
        assert_ne!(Scalar::from("1"), Scalar::from(1i64));
        assert_ne!(Scalar::Null, Scalar::from(false));
    }

    #[test]
    fn test_numbers_compare_by_value() {
        let int = Scalar::from(1i64);
        let float = Scalar::from(1.0);

        assert_eq!(int, float);
        assert_eq!(Scalar::from(u64::MAX), Scalar::from(u64::MAX));
        assert_ne!(Scalar::from(1i64), Scalar::from(1.5));
        assert_ne!(Scalar::from(-1i64), Scalar::from(u64::MAX));
    }

    #[test]
    fn test_non_finite_float_is_null() {
        assert_eq!(Scalar::from(f64::NAN), Scalar::Null);
        assert_eq!(Scalar::from(1.5), Scalar::Number(serde_json::Number::from_f64(1.5).unwrap()));
    }

    #[test]
    fn test_scalar_serializes_untagged() {
        let encoded = serde_json::to_value(Scalar::from("bar")).unwrap();
        assert_eq!(encoded, json!("bar"));

        let decoded: Scalar = serde_json::from_value(json!(null)).unwrap();
        assert_eq!(decoded, Scalar::Null);
    }
}
