use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use super::decimal;

/// Loosely-typed description of one proposed transaction.
///
/// Which keys are present decides which checks the audit pipeline runs.
/// Unknown keys are carried along and ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Intent(Map<String, Value>);

impl Intent {
    pub fn new() -> Self {
        Intent(Map::new())
    }

    /// Build an intent from a JSON value; non-objects yield an empty intent.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Intent(map),
            _ => Intent::new(),
        }
    }

    /// Insert a fact, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// True iff every key is present.
    pub fn has_all(&self, keys: &[&str]) -> bool {
        keys.iter().all(|k| self.contains(k))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Look up `key.sub` inside a nested mapping.
    pub fn nested(&self, key: &str, sub: &str) -> Option<&Value> {
        self.0.get(key).and_then(|v| v.get(sub))
    }

    /// Textual form of a fact; numbers and booleans are rendered, absent is `""`.
    pub fn text(&self, key: &str) -> String {
        value_text(self.get(key))
    }

    pub fn nested_text(&self, key: &str, sub: &str) -> String {
        value_text(self.nested(key, sub))
    }

    /// Decimal fact, defaulting to zero when absent or unreadable.
    pub fn decimal_or_zero(&self, key: &str) -> Decimal {
        value_decimal(key, self.get(key))
    }

    pub fn nested_decimal_or_zero(&self, key: &str, sub: &str) -> Decimal {
        value_decimal(sub, self.nested(key, sub))
    }

    /// Optional decimal fact; `None` when absent.
    pub fn decimal(&self, key: &str) -> Option<Decimal> {
        self.get(key).map(|v| value_decimal(key, Some(v)))
    }

    /// Boolean fact inside a nested mapping; absent or non-boolean is false.
    pub fn nested_flag(&self, key: &str, sub: &str) -> bool {
        match self.nested(key, sub) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }
}

impl From<Map<String, Value>> for Intent {
    fn from(map: Map<String, Value>) -> Self {
        Intent(map)
    }
}

fn value_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn value_decimal(key: &str, value: Option<&Value>) -> Decimal {
    match value {
        None | Some(Value::Null) => Decimal::ZERO,
        Some(v) => decimal::from_json(v).unwrap_or_else(|| {
            warn!(key = key, value = %v, "Unreadable numeric fact, defaulting to zero");
            Decimal::ZERO
        }),
    }
}
