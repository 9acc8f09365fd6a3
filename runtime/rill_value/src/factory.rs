//! The factory layer: the one gate host data passes to become values.
//!
//! [`value_of`] normalizes anything convertible; [`from_text`] sniffs
//! string payloads (JSON-looking text parses into collections, everything
//! else stays a string); [`from_json`] maps arbitrary JSON structures into
//! the variant set. Deferred computations wrap via [`Value::lazy`] without
//! being evaluated.
//!
//! Canonical constants collapse here: factory-built booleans, void, and
//! integer zero are the shared singletons (error-carrying values never
//! are — those allocate fresh so provenance survives).

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use num_bigint::BigInt;

use crate::value::Value;

/// Normalize any convertible host value.
pub fn value_of(host: impl Into<Value>) -> Value {
    host.into()
}

/// Sniff a text payload.
///
/// Alphanumeric text short-circuits to a string. Text opening like a JSON
/// list or map parses as one, falling back to a plain string when the
/// parse fails. Everything else is a string.
pub fn from_text(text: &str) -> Value {
    if text.chars().all(char::is_alphanumeric) {
        return Value::string(text);
    }
    let trimmed = text.trim_start();
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(text) {
            return from_json(&parsed);
        }
    }
    Value::string(text)
}

/// Map a parsed JSON structure into the variant set.
pub fn from_json(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::null(),
        serde_json::Value::Bool(b) => Value::boolean(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::int(i)
            } else {
                Value::decimal(n.as_f64().unwrap_or(0.0))
            }
        }
        serde_json::Value::String(s) => Value::string(s.clone()),
        serde_json::Value::Array(items) => {
            Value::list(items.iter().map(from_json).collect())
        }
        serde_json::Value::Object(entries) => {
            let mut map = IndexMap::with_capacity(entries.len());
            for (key, value) in entries {
                map.insert(key.clone(), from_json(value));
            }
            Value::map(map)
        }
    }
}

// Host conversions. Each lands on the canonical variant; common constants
// come out as the shared singletons.

impl From<()> for Value {
    fn from((): ()) -> Self {
        Value::void()
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::boolean(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::int(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::int(value)
    }
}

impl From<BigInt> for Value {
    fn from(value: BigInt) -> Self {
        Value::big_int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::decimal(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        from_text(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        from_text(&value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::date(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::list(value)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(value: IndexMap<String, Value>) -> Self {
        Value::map(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(inner) => inner.into(),
            None => Value::void(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn alphanumeric_text_stays_a_string() {
        assert_eq!(from_text("hello42"), Value::string("hello42"));
        assert_eq!(from_text(""), Value::string(""));
    }

    #[test]
    fn json_looking_text_parses_into_collections() {
        let list = from_text("[1, 2, 3]");
        assert!(list.is_list());
        assert_eq!(list.size().ok(), Some(3));

        let map = from_text(r#"{"a": 1}"#);
        assert!(map.is_map());
        assert_eq!(map.get(&Value::string("a")).ok(), Some(Value::int(1)));
    }

    #[test]
    fn malformed_json_falls_back_to_a_string() {
        let value = from_text("[not json");
        assert!(value.is_string());
        assert_eq!(value, Value::string("[not json"));
    }

    #[test]
    fn host_conversions_land_on_canonical_variants() {
        assert_eq!(value_of(true), Value::TRUE);
        assert_eq!(value_of(0i64), Value::ZERO);
        assert_eq!(value_of(()), Value::void());
        assert_eq!(value_of(1.5f64), Value::decimal(1.5));
        assert_eq!(value_of(None::<i64>), Value::void());
        assert_eq!(value_of(Some(7i64)), Value::int(7));
    }

    #[test]
    fn json_numbers_split_into_integer_and_decimal() {
        let parsed = from_json(&serde_json::json!([1, 2.5, null, "s"]));
        assert_eq!(
            parsed,
            Value::list(vec![
                Value::int(1),
                Value::decimal(2.5),
                Value::null(),
                Value::string("s"),
            ])
        );
    }

    #[test]
    fn deferred_computations_wrap_without_evaluating() {
        let touched = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
        let seen = std::sync::Arc::clone(&touched);
        let node = Value::lazy(move |_| {
            seen.store(true, std::sync::atomic::Ordering::SeqCst);
            Ok(Value::int(1))
        });
        assert!(node.is_lazy());
        assert!(!touched.load(std::sync::atomic::Ordering::SeqCst));
    }
}
