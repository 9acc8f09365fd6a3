//! The canonical JSON projection.
//!
//! Every variant serializes to an object tagged with a `$type`
//! discriminator; [`deserialize`] turns the projection back into an equal
//! value for every non-reactive variant. URIs round-trip by identity only
//! (the backend handler does not travel); reactive values are forced
//! before projecting.

#[cfg(test)]
mod tests;

use serde_json::{json, Value as Json};

use crate::errors::{exception, ErrorKind, ValueError, ValueResult};
use crate::value::{
    IntVal, QueueValue, RangeValue, Type, UriValue, Value, Variant,
};

/// Project a value onto tagged JSON. Lazy values are fixed first.
pub fn serialize(value: &Value) -> Result<Json, ValueError> {
    let value = value.demand()?;
    Ok(match value.variant() {
        Variant::Void => json!({ "$type": "VOID" }),
        Variant::Null => json!({ "$type": "NULL" }),
        Variant::Bool(b) => json!({ "$type": "BOOLEAN", "value": b }),
        Variant::Int(n) => match n {
            IntVal::Small(i) => json!({ "$type": "INTEGER", "value": i }),
            // Big magnitudes travel as decimal strings.
            IntVal::Big(b) => json!({ "$type": "INTEGER", "big": b.to_string() }),
        },
        Variant::Decimal(d) => json!({ "$type": "DECIMAL", "value": d }),
        Variant::Str(s) => json!({ "$type": "STRING", "text": &**s }),
        Variant::Date(d) => json!({
            "$type": "DATE",
            "text": d.to_rfc3339(),
            "millis": d.timestamp_millis(),
        }),
        Variant::Infinity { negative } => {
            json!({ "$type": "INFINITY", "negative": negative })
        }
        Variant::Error(e) => json!({
            "$type": "ERROR",
            "code": e.kind.code(),
            "message": e.message,
        }),
        Variant::List(items) => {
            json!({ "$type": "LIST", "values": serialize_all(items)? })
        }
        Variant::Sequence(items) => {
            json!({ "$type": "SEQUENCE", "values": serialize_all(items)? })
        }
        Variant::Map(entries) => {
            let mut object = serde_json::Map::with_capacity(entries.len());
            for (key, child) in entries.iter() {
                object.insert(key.clone(), serialize(child)?);
            }
            json!({ "$type": "MAP", "entries": object })
        }
        Variant::Range(range) => json!({
            "$type": "RANGE",
            "lower": serialize(range.lower())?,
            "upper": serialize(range.upper())?,
            "lowerOpen": range.lower_open(),
            "upperOpen": range.upper_open(),
            "reversed": range.reversed(),
        }),
        Variant::Queue(queue) => {
            json!({ "$type": "QUEUE", "values": serialize_all(&queue.snapshot())? })
        }
        Variant::Uri(uri) => json!({ "$type": "URI", "uri": uri.text() }),
        // demand() above already settled any lazy value.
        Variant::Lazy(_) => json!({ "$type": "VOID" }),
    })
}

/// Reconstruct a value from its tagged projection.
pub fn deserialize(json: &Json) -> ValueResult {
    let tag = json
        .get("$type")
        .and_then(Json::as_str)
        .ok_or_else(|| exception("missing $type discriminator"))?;
    let tag = Type::from_name(tag)
        .ok_or_else(|| exception(format!("unknown $type: {tag}")))?;

    Ok(match tag {
        Type::Void | Type::Any => Value::void(),
        Type::Null => Value::null(),
        Type::Boolean => Value::boolean(
            json.get("value").and_then(Json::as_bool).unwrap_or_default(),
        ),
        Type::Integer => {
            if let Some(big) = json.get("big").and_then(Json::as_str) {
                let parsed = big
                    .parse::<num_bigint::BigInt>()
                    .map_err(|_| exception(format!("bad big integer: {big}")))?;
                Value::big_int(parsed)
            } else {
                Value::int(json.get("value").and_then(Json::as_i64).unwrap_or_default())
            }
        }
        Type::Decimal => Value::decimal(
            json.get("value").and_then(Json::as_f64).unwrap_or_default(),
        ),
        Type::String => Value::string(
            json.get("text").and_then(Json::as_str).unwrap_or_default(),
        ),
        Type::Date => {
            let text = json
                .get("text")
                .and_then(Json::as_str)
                .ok_or_else(|| exception("DATE without text"))?;
            Value::string(text).cast(Type::Date)?
        }
        Type::Infinity => Value::infinity(
            json.get("negative").and_then(Json::as_bool).unwrap_or_default(),
        ),
        Type::Error => {
            let code = json.get("code").and_then(Json::as_str).unwrap_or("EXCEPTION");
            let message = json
                .get("message")
                .and_then(Json::as_str)
                .unwrap_or_default();
            let mut error = ValueError::new(kind_for_code(code));
            error.message = message.to_string();
            Value::error(error)
        }
        Type::List => Value::list(deserialize_all(json)?),
        Type::Sequence => Value::sequence(deserialize_all(json)?),
        Type::Map => {
            let entries = json
                .get("entries")
                .and_then(Json::as_object)
                .ok_or_else(|| exception("MAP without entries"))?;
            let mut map = indexmap::IndexMap::with_capacity(entries.len());
            for (key, child) in entries {
                map.insert(key.clone(), deserialize(child)?);
            }
            Value::map(map)
        }
        Type::Range => {
            let lower = deserialize(
                json.get("lower").ok_or_else(|| exception("RANGE without lower"))?,
            )?;
            let upper = deserialize(
                json.get("upper").ok_or_else(|| exception("RANGE without upper"))?,
            )?;
            Value::range(RangeValue::from_parts(
                lower,
                upper,
                json.get("lowerOpen").and_then(Json::as_bool).unwrap_or_default(),
                json.get("upperOpen").and_then(Json::as_bool).unwrap_or_default(),
                json.get("reversed").and_then(Json::as_bool).unwrap_or_default(),
            ))
        }
        Type::Queue => {
            let queue = QueueValue::new();
            for item in deserialize_all(json)? {
                queue.push(item);
            }
            Value::from_queue(queue)
        }
        Type::Uri => {
            let text = json
                .get("uri")
                .and_then(Json::as_str)
                .ok_or_else(|| exception("URI without address"))?;
            Value::uri(UriValue::new(text, None)?)
        }
    })
}

fn serialize_all(items: &[Value]) -> Result<Vec<Json>, ValueError> {
    items.iter().map(serialize).collect()
}

fn deserialize_all(json: &Json) -> Result<Vec<Value>, ValueError> {
    json.get("values")
        .and_then(Json::as_array)
        .map(|items| items.iter().map(deserialize).collect())
        .unwrap_or_else(|| Ok(Vec::new()))
}

/// Rebuild an error-kind skeleton from its stable code. Field detail is
/// carried by the message; codes are what equality compares.
fn kind_for_code(code: &str) -> ErrorKind {
    if let Some(variant) = code
        .strip_prefix("INVALID_")
        .and_then(|rest| rest.strip_suffix("_OPERATION"))
        .and_then(Type::from_name)
    {
        return ErrorKind::InvalidOperation {
            variant,
            operation: "",
        };
    }
    match code {
        "INVALID_CAST" => ErrorKind::InvalidCast {
            from: Type::Any,
            to: Type::Any,
        },
        "MULTIPLIER_TOO_LARGE" => ErrorKind::MultiplierTooLarge {
            multiplier: 0,
            cap: crate::ops::MAX_MULTIPLIER,
        },
        "STRING_TOO_LARGE" => ErrorKind::StringTooLarge { length: 0 },
        "BAD_REGEX" => ErrorKind::BadRegex {
            pattern: String::new(),
        },
        "METADATA_IMMUTABLE" => ErrorKind::MetadataImmutable { key: "" },
        "CONSTRAINT_VIOLATION" => ErrorKind::ConstraintViolation {
            previous: String::new(),
            attempted: String::new(),
        },
        "RECURSION_LIMIT" => ErrorKind::RecursionLimit {
            depth: 0,
            stack: Vec::new(),
        },
        "ASSERTION_FAILED" => ErrorKind::AssertionFailed {
            detail: String::new(),
        },
        "WRONG_STATE" => ErrorKind::WrongState {
            detail: String::new(),
        },
        _ => ErrorKind::Exception {
            detail: String::new(),
        },
    }
}
