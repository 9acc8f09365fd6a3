//! The casting matrix (`as` coercions).
//!
//! Every variant casts to BOOLEAN, STRING, LIST, MAP, and VOID at minimum.
//! Anything else is per-variant; an unsupported pairing is a typed
//! `INVALID_CAST`, never a panic. Lossy numeric casts follow the
//! language's rules (boolean to decimal is 1.0/0.0, dates convert through
//! epoch milliseconds, strings parse or fail).

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use num_bigint::BigInt;
use std::str::FromStr;

use crate::errors::{invalid_cast, ValueResult};
use crate::value::{Type, UriValue, Value, Variant};

impl Value {
    /// Cast to a target type tag.
    pub fn cast(&self, to: Type) -> ValueResult {
        let v = self.demand()?;
        if v.type_tag() == to || to == Type::Any {
            return Ok(v);
        }
        let from = v.type_tag();

        match to {
            Type::Void => Ok(Value::void()),
            Type::Null => Ok(Value::null()),
            Type::Boolean => Ok(Value::boolean(v.truthy())),
            Type::String => Ok(Value::string(v.to_text())),

            Type::Integer => match v.variant() {
                Variant::Bool(b) => Ok(Value::int(i64::from(*b))),
                Variant::Decimal(d) => Ok(Value::int(*d as i64)),
                Variant::Date(d) => Ok(Value::int(d.timestamp_millis())),
                Variant::Str(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(Value::int)
                    .or_else(|_| {
                        BigInt::from_str(s.trim())
                            .map(Value::big_int)
                            .map_err(|_| invalid_cast(from, to))
                    }),
                _ => Err(invalid_cast(from, to)),
            },

            Type::Decimal => match v.variant() {
                // Booleans cast to 1.0 / 0.0.
                Variant::Bool(b) => Ok(Value::decimal(if *b { 1.0 } else { 0.0 })),
                Variant::Int(n) => Ok(Value::decimal(n.to_f64())),
                Variant::Date(d) => Ok(Value::decimal(d.timestamp_millis() as f64)),
                Variant::Str(s) => s
                    .trim()
                    .parse::<f64>()
                    .map(Value::decimal)
                    .map_err(|_| invalid_cast(from, to)),
                _ => Err(invalid_cast(from, to)),
            },

            Type::Date => match v.variant() {
                Variant::Str(s) => DateTime::parse_from_rfc3339(s.trim())
                    .map(|d| Value::date(d.with_timezone(&Utc)))
                    .map_err(|_| invalid_cast(from, to)),
                Variant::Int(n) => n
                    .as_i64()
                    .and_then(DateTime::from_timestamp_millis)
                    .map(Value::date)
                    .ok_or_else(|| invalid_cast(from, to)),
                Variant::Decimal(d) => DateTime::from_timestamp_millis(*d as i64)
                    .map(Value::date)
                    .ok_or_else(|| invalid_cast(from, to)),
                _ => Err(invalid_cast(from, to)),
            },

            Type::List => Ok(Value::list(v.into_items()?)),

            Type::Sequence => Ok(Value::sequence(v.into_items()?)),

            Type::Map => match v.variant() {
                Variant::Void => Ok(Value::map(IndexMap::new())),
                Variant::List(items) | Variant::Sequence(items) => {
                    // Positional keys keep list order visible in the map.
                    let mut entries = IndexMap::with_capacity(items.len());
                    for (index, item) in items.iter().enumerate() {
                        entries.insert(index.to_string(), item.clone());
                    }
                    Ok(Value::map(entries))
                }
                _ => Ok(Value::pair("value", v.clone())),
            },

            Type::Queue => match v.variant() {
                Variant::List(items) | Variant::Sequence(items) => {
                    let queue = Value::queue();
                    for item in items.iter() {
                        queue.append(item)?;
                    }
                    Ok(queue)
                }
                _ => Err(invalid_cast(from, to)),
            },

            Type::Uri => match v.variant() {
                Variant::Str(s) => UriValue::new(s.as_str(), None)
                    .map(Value::uri)
                    .map_err(|_| invalid_cast(from, to)),
                _ => Err(invalid_cast(from, to)),
            },

            Type::Infinity | Type::Error | Type::Range | Type::Any => {
                Err(invalid_cast(from, to))
            }
        }
    }

    /// The value as a vector of children: collections enumerate, scalars
    /// wrap, absence is empty.
    fn into_items(&self) -> Result<Vec<Value>, crate::errors::ValueError> {
        Ok(match self.variant() {
            Variant::Void | Variant::Null => Vec::new(),
            Variant::List(items) | Variant::Sequence(items) => (**items).clone(),
            Variant::Map(entries) => entries.values().cloned().collect(),
            Variant::Range(range) => range.to_vec()?,
            Variant::Queue(queue) => queue.snapshot(),
            _ => vec![self.clone()],
        })
    }
}
