//! The arithmetic half of the uniform operation contract.
//!
//! Dispatch is a `match` over variant pairs — the type set is closed, so
//! enum dispatch beats trait objects and the compiler checks exhaustiveness.
//! Operands force (`demand`) before dispatch, which is how reactive nodes
//! transparently take part in arithmetic.
//!
//! The coercion rules live here and must hold exactly:
//!
//! - a string on the right concatenates, a list on the right prepends,
//!   a range on the right broadcasts, an infinity absorbs;
//! - integer overflow promotes to the big representation, never wraps;
//! - numeric division by zero yields signed infinity, never an error;
//! - collection replication is capped — a huge multiplier is a typed
//!   failure, not an allocation attempt.

#[cfg(test)]
mod tests;

use crate::compare::{as_f64, as_int};
use crate::errors::{
    invalid_operation, multiplier_too_large, string_too_large, ValueResult,
};
use crate::value::{IntVal, Type, Value, Variant};

/// Hard cap on collection/string replication factors.
pub const MAX_MULTIPLIER: i64 = 1000;

/// Hard cap on a string operation's result length, in characters.
const MAX_STRING_LENGTH: usize = 10_000_000;

impl Value {
    /// Addition / concatenation / accumulation.
    pub fn plus(&self, rhs: &Value) -> ValueResult {
        let a = self.demand()?;
        let b = rhs.demand()?;

        // Infinity absorbs from either side; the right one wins the sign.
        if let Variant::Infinity { .. } = b.variant() {
            return Ok(b);
        }
        if let Variant::Infinity { .. } = a.variant() {
            return Ok(a);
        }

        match (a.variant(), b.variant()) {
            // A collection on the left accumulates.
            (Variant::List(items), Variant::List(other)) => {
                let mut joined = (**items).clone();
                joined.extend(other.iter().cloned());
                Ok(Value::list(joined))
            }
            (Variant::List(items), _) => {
                let mut joined = (**items).clone();
                joined.push(b.clone());
                Ok(Value::list(joined))
            }
            (Variant::Sequence(items), _) => {
                let mut joined = (**items).clone();
                joined.push(b.clone());
                Ok(Value::sequence(joined))
            }
            (Variant::Map(entries), Variant::Map(other)) => {
                let mut merged = (**entries).clone();
                for (k, v) in other.iter() {
                    merged.insert(k.clone(), v.clone());
                }
                Ok(Value::map(merged))
            }
            (Variant::Map(_), _) => Err(invalid_operation(Type::Map, "plus")),
            (Variant::Queue(queue), _) => {
                queue.push(b.clone());
                Ok(a.clone())
            }
            (Variant::Range(range), _) => Ok(Value::range(range.broadcast_plus(&b)?)),

            // A string on either side concatenates.
            (Variant::Str(s), _) => {
                let joined = format!("{s}{}", b.to_text());
                if joined.chars().count() > MAX_STRING_LENGTH {
                    return Err(string_too_large(joined.len()));
                }
                Ok(Value::string(joined))
            }
            (_, Variant::Str(s)) => Ok(Value::string(format!("{}{s}", a.to_text()))),

            // A list on the right takes the left operand as its new head.
            (_, Variant::List(items)) => {
                let mut joined = Vec::with_capacity(items.len() + 1);
                joined.push(a.clone());
                joined.extend(items.iter().cloned());
                Ok(Value::list(joined))
            }
            (_, Variant::Range(range)) => Ok(Value::range(range.broadcast_plus(&a)?)),

            // Numeric addition with overflow promotion.
            (Variant::Int(x), Variant::Int(y)) => Ok(Value::int_val(x.plus(y))),
            (Variant::Int(x), Variant::Decimal(y)) => Ok(Value::decimal(x.to_f64() + y)),
            (Variant::Decimal(x), Variant::Int(y)) => Ok(Value::decimal(x + y.to_f64())),
            (Variant::Decimal(x), Variant::Decimal(y)) => Ok(Value::decimal(x + y)),

            (Variant::Date(d), _) => match as_f64(&b) {
                Some(days) => Ok(Value::date(*d + chrono::Duration::milliseconds(
                    (days * 86_400_000.0) as i64,
                ))),
                None => Err(invalid_operation(Type::Date, "plus")),
            },

            // Absence is the identity.
            (Variant::Void | Variant::Null, _) => Ok(b),

            _ => Err(invalid_operation(a.type_tag(), "plus")),
        }
    }

    /// Subtraction / removal. Boolean minus is logical XOR.
    pub fn minus(&self, rhs: &Value) -> ValueResult {
        let a = self.demand()?;
        let b = rhs.demand()?;

        if let Variant::Infinity { negative } = b.variant() {
            // x - inf = -inf, x - (-inf) = +inf.
            return Ok(Value::infinity(!negative));
        }
        if let Variant::Infinity { .. } = a.variant() {
            return Ok(a);
        }

        match (a.variant(), b.variant()) {
            (Variant::Bool(x), Variant::Bool(y)) => Ok(Value::boolean(x ^ y)),

            (Variant::Int(x), Variant::Int(y)) => Ok(Value::int_val(x.minus(y))),
            (Variant::Int(x), Variant::Decimal(y)) => Ok(Value::decimal(x.to_f64() - y)),
            (Variant::Decimal(x), Variant::Int(y)) => Ok(Value::decimal(x - y.to_f64())),
            (Variant::Decimal(x), Variant::Decimal(y)) => Ok(Value::decimal(x - y)),

            // String minus removes every occurrence of the right text.
            (Variant::Str(s), _) => Ok(Value::string(s.replace(&b.to_text(), ""))),

            // List minus removes the first equal element.
            (Variant::List(items), _) => {
                let mut remaining = (**items).clone();
                if let Some(index) = remaining.iter().position(|item| item == &b) {
                    remaining.remove(index);
                }
                Ok(Value::list(remaining))
            }

            // Map minus removes the key named by the right text.
            (Variant::Map(entries), _) => {
                let mut remaining = (**entries).clone();
                remaining.shift_remove(&b.to_text());
                Ok(Value::map(remaining))
            }

            (Variant::Date(d), Variant::Date(other)) => {
                let millis = (*d - *other).num_milliseconds();
                Ok(Value::decimal(millis as f64 / 86_400_000.0))
            }
            (Variant::Date(d), _) => match as_f64(&b) {
                Some(days) => Ok(Value::date(*d - chrono::Duration::milliseconds(
                    (days * 86_400_000.0) as i64,
                ))),
                None => Err(invalid_operation(Type::Date, "minus")),
            },

            (Variant::Void | Variant::Null, _) => b.negate(),

            _ => Err(invalid_operation(a.type_tag(), "minus")),
        }
    }

    /// Multiplication / replication.
    pub fn multiply(&self, rhs: &Value) -> ValueResult {
        let a = self.demand()?;
        let b = rhs.demand()?;

        // Sign-rule table: positive iff signs agree.
        if a.is_infinite() || b.is_infinite() {
            if a.is_boolean() || b.is_boolean() {
                return Err(invalid_operation(Type::Boolean, "multiply"));
            }
            let negative = numeric_negative(&a) != numeric_negative(&b);
            return Ok(Value::infinity(negative));
        }

        match (a.variant(), b.variant()) {
            (Variant::Int(x), Variant::Int(y)) => Ok(Value::int_val(x.times(y))),
            (Variant::Int(x), Variant::Decimal(y)) => Ok(Value::decimal(x.to_f64() * y)),
            (Variant::Decimal(x), Variant::Int(y)) => Ok(Value::decimal(x * y.to_f64())),
            (Variant::Decimal(x), Variant::Decimal(y)) => Ok(Value::decimal(x * y)),

            (Variant::List(items), Variant::Int(_)) => {
                Ok(Value::list(replicate(items, &b, Type::List)?))
            }
            (Variant::Sequence(items), Variant::Int(_)) => {
                Ok(Value::sequence(replicate(items, &b, Type::Sequence)?))
            }

            (Variant::Str(s), Variant::Int(n)) => {
                let Some(count) = n.as_i64() else {
                    return Err(multiplier_too_large(i64::MAX, MAX_MULTIPLIER));
                };
                if count.unsigned_abs() > MAX_MULTIPLIER as u64 {
                    return Err(multiplier_too_large(count, MAX_MULTIPLIER));
                }
                let total = s.chars().count().saturating_mul(count.unsigned_abs() as usize);
                if total > MAX_STRING_LENGTH {
                    return Err(string_too_large(total));
                }
                let repeated = s.repeat(count.unsigned_abs() as usize);
                Ok(Value::string(if count < 0 {
                    repeated.chars().rev().collect::<String>()
                } else {
                    repeated
                }))
            }
            // String by a fraction shrinks: s * 0.5 is the first half.
            (Variant::Str(_), Variant::Decimal(d)) if *d > 0.0 && *d < 1.0 => {
                a.divide(&Value::decimal(1.0 / d))
            }

            (Variant::Bool(_), _) | (_, Variant::Bool(_)) => {
                Err(invalid_operation(Type::Boolean, "multiply"))
            }

            _ => Err(invalid_operation(a.type_tag(), "multiply")),
        }
    }

    /// Division / splitting. Never produces NaN; a zero divisor yields a
    /// signed infinity.
    pub fn divide(&self, rhs: &Value) -> ValueResult {
        let a = self.demand()?;
        let b = rhs.demand()?;

        // Anything divided by infinity collapses to zero.
        if b.is_infinite() && !a.is_boolean() {
            return Ok(Value::ZERO);
        }
        if a.is_infinite() {
            let negative = numeric_negative(&a) != numeric_negative(&b);
            return Ok(Value::infinity(negative));
        }

        match (a.variant(), b.variant()) {
            // Boolean division compares truthiness.
            (Variant::Bool(x), Variant::Bool(y)) => Ok(Value::boolean(x == y)),

            (Variant::Int(x), Variant::Int(y)) => {
                if y.is_zero() {
                    return Ok(Value::infinity(x.is_negative()));
                }
                match x.div_exact(y) {
                    Some(exact) => Ok(Value::int_val(exact)),
                    None => Ok(Value::decimal(x.to_f64() / y.to_f64())),
                }
            }
            (Variant::Int(x), Variant::Decimal(y)) => {
                if *y == 0.0 {
                    return Ok(Value::infinity(x.is_negative()));
                }
                Ok(Value::decimal(x.to_f64() / y))
            }
            (Variant::Decimal(x), Variant::Int(y)) => {
                if y.is_zero() {
                    return Ok(Value::infinity(*x < 0.0));
                }
                Ok(Value::decimal(x / y.to_f64()))
            }
            (Variant::Decimal(x), Variant::Decimal(y)) => {
                if *y == 0.0 {
                    return Ok(Value::infinity(*x < 0.0));
                }
                Ok(Value::decimal(x / y))
            }

            // String by string splits on the literal delimiter.
            (Variant::Str(s), Variant::Str(delimiter)) => {
                let parts: Vec<Value> = s
                    .split(delimiter.as_str())
                    .map(Value::string)
                    .collect();
                Ok(Value::list(parts))
            }
            // String by a fraction grows: s / 0.5 == s * 2. Larger divisors
            // keep the leading 1/n of the text.
            (Variant::Str(s), _) => match as_f64(&b) {
                Some(n) if n > 0.0 && n < 1.0 => {
                    let factor = (1.0 / n).round() as i64;
                    a.multiply(&Value::int(factor))
                }
                Some(n) if n >= 1.0 => {
                    let keep = (s.chars().count() as f64 / n) as usize;
                    Ok(Value::string(s.chars().take(keep).collect::<String>()))
                }
                _ => Err(invalid_operation(Type::String, "divide")),
            },

            _ => Err(invalid_operation(a.type_tag(), "divide")),
        }
    }

    /// Remainder. A zero divisor mirrors division (signed infinity); an
    /// infinite divisor collapses to zero.
    pub fn modulus(&self, rhs: &Value) -> ValueResult {
        let a = self.demand()?;
        let b = rhs.demand()?;

        if b.is_infinite() && !a.is_boolean() {
            return Ok(Value::ZERO);
        }
        if a.is_infinite() {
            return Ok(a);
        }

        match (a.variant(), b.variant()) {
            (Variant::Int(x), Variant::Int(y)) => match x.remainder(y) {
                Some(remainder) => Ok(Value::int_val(remainder)),
                None => Ok(Value::infinity(x.is_negative())),
            },
            (Variant::Int(x), Variant::Decimal(y)) => {
                if *y == 0.0 {
                    return Ok(Value::infinity(x.is_negative()));
                }
                Ok(Value::decimal(x.to_f64() % y))
            }
            (Variant::Decimal(x), Variant::Int(y)) => {
                if y.is_zero() {
                    return Ok(Value::infinity(*x < 0.0));
                }
                Ok(Value::decimal(x % y.to_f64()))
            }
            (Variant::Decimal(x), Variant::Decimal(y)) => {
                if *y == 0.0 {
                    return Ok(Value::infinity(*x < 0.0));
                }
                Ok(Value::decimal(x % y))
            }
            (Variant::Bool(_), _) => Err(invalid_operation(Type::Boolean, "modulus")),
            _ => Err(invalid_operation(a.type_tag(), "modulus")),
        }
    }

    /// Negation: numeric sign flip, boolean not, collection reversal.
    pub fn negate(&self) -> ValueResult {
        let a = self.demand()?;
        match a.variant() {
            Variant::Bool(b) => Ok(Value::boolean(!b)),
            Variant::Int(n) => Ok(Value::int_val(n.negated())),
            Variant::Decimal(d) => Ok(Value::decimal(-d)),
            Variant::Infinity { negative } => Ok(Value::infinity(!negative)),
            Variant::List(items) => {
                let mut reversed = (**items).clone();
                reversed.reverse();
                Ok(Value::list(reversed))
            }
            Variant::Sequence(items) => {
                let mut reversed = (**items).clone();
                reversed.reverse();
                Ok(Value::sequence(reversed))
            }
            _ => Err(invalid_operation(a.type_tag(), "negate")),
        }
    }
}

/// Replicate `items` by the integer in `count_value`, honoring the cap and
/// reversing for negative counts.
fn replicate(
    items: &[Value],
    count_value: &Value,
    variant: Type,
) -> Result<Vec<Value>, crate::errors::ValueError> {
    let Some(count) = as_int(count_value).and_then(IntVal::as_i64) else {
        return Err(invalid_operation(variant, "multiply"));
    };
    if count.unsigned_abs() > MAX_MULTIPLIER as u64 {
        return Err(multiplier_too_large(count, MAX_MULTIPLIER));
    }
    let times = count.unsigned_abs() as usize;
    let mut replicated = Vec::with_capacity(items.len().saturating_mul(times));
    for _ in 0..times {
        replicated.extend(items.iter().cloned());
    }
    if count < 0 {
        replicated.reverse();
    }
    Ok(replicated)
}

/// Sign of a numeric operand for the infinity sign-rule table.
fn numeric_negative(value: &Value) -> bool {
    match value.variant() {
        Variant::Infinity { negative } => *negative,
        Variant::Int(n) => n.is_negative(),
        Variant::Decimal(d) => *d < 0.0,
        _ => false,
    }
}
