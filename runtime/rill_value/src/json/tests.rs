// Tests unwrap freely: a failed unwrap is the failure being reported.
#![allow(clippy::unwrap_used)]

use chrono::{TimeZone, Utc};
use num_bigint::BigInt;
use pretty_assertions::assert_eq;

use super::{deserialize, serialize};
use crate::errors::multiplier_too_large;
use crate::value::{RangeValue, Type, UriValue, Value};

fn round_trip(value: &Value) -> Value {
    let projected = serialize(value).unwrap();
    deserialize(&projected).unwrap()
}

#[test]
fn scalar_round_trips() {
    for value in [
        Value::void(),
        Value::null(),
        Value::TRUE,
        Value::FALSE,
        Value::int(42),
        Value::int(-7),
        Value::decimal(1.25),
        Value::string("hello"),
        Value::infinity(false),
        Value::infinity(true),
    ] {
        assert_eq!(round_trip(&value), value);
    }
}

#[test]
fn big_integers_travel_as_strings() {
    let big = Value::big_int(BigInt::from(i64::MAX) + 12345);
    let projected = serialize(&big).unwrap();
    assert!(projected.get("big").is_some());
    assert_eq!(deserialize(&projected).unwrap(), big);
}

#[test]
fn date_round_trips_with_millis() {
    let date = Value::date(Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap());
    let projected = serialize(&date).unwrap();
    assert_eq!(projected.get("$type").and_then(|t| t.as_str()), Some("DATE"));
    assert!(projected.get("millis").is_some());
    assert_eq!(round_trip(&date), date);
}

#[test]
fn collection_round_trips() {
    let list = Value::list(vec![Value::int(1), Value::string("two"), Value::TRUE]);
    assert_eq!(round_trip(&list), list);

    let map = Value::pair("a", Value::int(1))
        .plus(&Value::pair("b", Value::list(vec![Value::decimal(0.5)])))
        .unwrap();
    assert_eq!(round_trip(&map), map);

    let sequence = Value::sequence(vec![Value::int(1), Value::int(2)]);
    assert_eq!(round_trip(&sequence), sequence);
}

#[test]
fn range_round_trips_with_flags() {
    let range = Value::range(RangeValue::with_bounds(
        Value::int(5),
        Value::int(1),
        false,
        true,
    ));
    assert_eq!(round_trip(&range), range);
}

#[test]
fn queue_round_trips_by_content() {
    let queue = Value::queue();
    queue.plus(&Value::int(1)).unwrap();
    queue.plus(&Value::int(2)).unwrap();
    assert_eq!(round_trip(&queue), queue);
}

#[test]
fn uri_round_trips_by_identity() {
    let uri = Value::uri(UriValue::new("mem:bucket/key", None).unwrap());
    assert_eq!(round_trip(&uri), uri);
}

#[test]
fn error_round_trips_by_code_and_message() {
    let error = Value::error(multiplier_too_large(5000, 1000));
    let projected = serialize(&error).unwrap();
    assert_eq!(
        projected.get("code").and_then(|c| c.as_str()),
        Some("MULTIPLIER_TOO_LARGE")
    );
    assert_eq!(round_trip(&error), error);
}

#[test]
fn lazy_values_are_fixed_before_projection() {
    let node = Value::lazy(|_| Ok(Value::int(9)));
    let projected = serialize(&node).unwrap();
    assert_eq!(
        projected.get("$type").and_then(|t| t.as_str()),
        Some("INTEGER")
    );
}

#[test]
fn map_entry_order_is_preserved() {
    let map = Value::pair("zebra", Value::int(1))
        .plus(&Value::pair("alpha", Value::int(2)))
        .unwrap();
    let projected = serialize(&map).unwrap();
    let keys: Vec<&String> = projected
        .get("entries")
        .and_then(|e| e.as_object())
        .unwrap()
        .keys()
        .collect();
    assert_eq!(keys, vec!["zebra", "alpha"]);
}

#[test]
fn deserialize_rejects_untagged_json() {
    let err = deserialize(&serde_json::json!({ "value": 1 })).unwrap_err();
    assert!(err.message.contains("$type"));
}

#[test]
fn every_tag_name_parses_back() {
    for tag in [
        "VOID", "NULL", "BOOLEAN", "INTEGER", "DECIMAL", "STRING", "DATE",
        "INFINITY", "ERROR", "LIST", "MAP", "RANGE", "QUEUE", "URI", "SEQUENCE",
        "ANY",
    ] {
        assert_eq!(Type::from_name(tag).map(Type::name), Some(tag));
    }
}
