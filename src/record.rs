//! Record and identity types
//!
//! A `Record` is one stored business entity: an ordered map of field key to
//! JSON value. Identity lives in the caller-assigned `userId` field.
//!
//! Copy and equality are structural: `Clone` produces an independent tree,
//! and `PartialEq` compares values key by key without regard to key order.
//! Values that JSON cannot represent (dates, binary) must be encoded by the
//! caller before they enter a record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Field name carrying a record's identity
pub const USER_ID_KEY: &str = "userId";

/// A single stored record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build a record from a JSON value; only objects qualify
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Builder method: set a field
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The record's identity, if one is set and not null
    pub fn user_id(&self) -> Option<UserId> {
        self.0.get(USER_ID_KEY).and_then(|v| UserId::from_value(v.clone()))
    }

    pub fn set_user_id(&mut self, id: UserId) {
        self.0.insert(USER_ID_KEY.to_string(), id.into_value());
    }

    /// Check whether this record carries the given identity
    pub fn has_user_id(&self, id: &UserId) -> bool {
        self.0.get(USER_ID_KEY).map(|v| v == id.as_value()).unwrap_or(false)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Caller-assigned record identity
///
/// Wraps a string or number. Matching is strict, so `9` and `"9"` name
/// different records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct UserId(Value);

impl UserId {
    /// Accepts strings and numbers; everything else is not an identity
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::String(_) | Value::Number(_) => Some(Self(value)),
            _ => None,
        }
    }

    /// Parse command-line style input: integers become numeric ids
    pub fn parse(input: &str) -> Self {
        match input.parse::<i64>() {
            Ok(n) => Self(Value::from(n)),
            Err(_) => Self(Value::String(input.to_string())),
        }
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl TryFrom<Value> for UserId {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value).ok_or_else(|| "userId must be a string or a number".to_string())
    }
}

impl From<UserId> for Value {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(Value::String(s.to_string()))
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(Value::String(s))
    }
}

impl From<i64> for UserId {
    fn from(n: i64) -> Self {
        Self(Value::from(n))
    }
}

impl From<u64> for UserId {
    fn from(n: u64) -> Self {
        Self(Value::from(n))
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::String(s) => write!(f, "{}", s),
            other => write!(f, "{}", other),
        }
    }
}

/// Shape violation found while validating persisted data
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ShapeError {
    #[error("expected an array of records, found {0}")]
    NotAnArray(&'static str),

    #[error("element {index} is {found}, expected an object")]
    NotAnObject { index: usize, found: &'static str },
}

/// Validate that `value` is an array of non-array objects
pub fn validate_records(value: Value) -> Result<Vec<Record>, ShapeError> {
    let items = match value {
        Value::Array(items) => items,
        other => return Err(ShapeError::NotAnArray(kind_name(&other))),
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let found = kind_name(&item);
            Record::from_value(item).ok_or(ShapeError::NotAnObject { index, found })
        })
        .collect()
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
