//! Equality and total ordering across the variant set.
//!
//! Equality is over canonical unwrapped representations: `1 == 1.0`, a
//! promoted big integer equals its small twin, and a reactive node forces
//! its pipe before comparing. Metadata never participates.
//!
//! Ordering is total — including the range cases the language exposes
//! (`value <=> range` is Equal when the value falls inside the range) —
//! so sorting mixed collections cannot throw. Cross-type comparisons that
//! have no numeric meaning fall back to comparing text forms.

use std::cmp::Ordering;

use crate::errors::ValueError;
use crate::value::{IntVal, Value, Variant};

/// Structural equality. Lazy values force first; a value whose pipe fails
/// compares equal only to nothing.
pub fn values_equal(left: &Value, right: &Value) -> bool {
    let (left, right) = match (left.demand(), right.demand()) {
        (Ok(l), Ok(r)) => (l, r),
        _ => return false,
    };

    match (left.variant(), right.variant()) {
        (Variant::Void, Variant::Void) | (Variant::Null, Variant::Null) => true,
        (Variant::Bool(a), Variant::Bool(b)) => a == b,
        (Variant::Str(a), Variant::Str(b)) => a == b,
        (Variant::Date(a), Variant::Date(b)) => a == b,
        (Variant::Error(a), Variant::Error(b)) => {
            a.kind.code() == b.kind.code() && a.message == b.message
        }
        (Variant::List(a), Variant::List(b)) | (Variant::Sequence(a), Variant::Sequence(b)) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| values_equal(x, y))
        }
        (Variant::Map(a), Variant::Map(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(k, v)| b.get(k).is_some_and(|other| values_equal(v, other)))
        }
        (Variant::Range(a), Variant::Range(b)) => a == b,
        (Variant::Queue(a), Variant::Queue(b)) => a == b,
        (Variant::Uri(a), Variant::Uri(b)) => a == b,
        (Variant::Infinity { negative: a }, Variant::Infinity { negative: b }) => a == b,
        // Numeric equality crosses the integer/decimal divide.
        _ if left.is_number() && right.is_number() => {
            numeric_cmp(&left, &right) == Some(Ordering::Equal)
        }
        _ => false,
    }
}

/// Total ordering over any two values.
///
/// The only failures are forced-evaluation failures bubbling out of lazy
/// operands; every settled pair orders.
pub fn compare_values(left: &Value, right: &Value) -> Result<Ordering, ValueError> {
    let left = left.demand()?;
    let right = right.demand()?;

    // Range comparisons: a value inside the range ties with it.
    match (left.variant(), right.variant()) {
        (Variant::Range(a), Variant::Range(b)) => {
            let by_lower = compare_values(a.lower(), b.lower())?;
            return Ok(if by_lower == Ordering::Equal {
                compare_values(a.upper(), b.upper())?
            } else {
                by_lower
            });
        }
        (Variant::Range(range), _) => {
            if range.contains(&right)? {
                return Ok(Ordering::Equal);
            }
            // The range sits above the value iff its lower bound does.
            return compare_values(range.lower(), &right);
        }
        (_, Variant::Range(_)) => {
            return Ok(compare_values(&right, &left)?.reverse());
        }
        _ => {}
    }

    if let Some(ordering) = numeric_cmp(&left, &right) {
        return Ok(ordering);
    }

    Ok(match (left.variant(), right.variant()) {
        (Variant::Bool(a), Variant::Bool(b)) => a.cmp(b),
        (Variant::Str(a), Variant::Str(b)) => a.as_str().cmp(b.as_str()),
        (Variant::Date(a), Variant::Date(b)) => a.cmp(b),
        (Variant::List(a), Variant::List(b)) | (Variant::Sequence(a), Variant::Sequence(b)) => {
            compare_elementwise(a, b)?
        }
        (Variant::Void, Variant::Void) | (Variant::Null, Variant::Null) => Ordering::Equal,
        // Absence sorts below everything.
        (Variant::Void, _) => Ordering::Less,
        (_, Variant::Void) => Ordering::Greater,
        (Variant::Null, _) => Ordering::Less,
        (_, Variant::Null) => Ordering::Greater,
        // Cross-type fallback: text forms keep the ordering total.
        _ => left.to_text().cmp(&right.to_text()),
    })
}

fn compare_elementwise(a: &[Value], b: &[Value]) -> Result<Ordering, ValueError> {
    for (x, y) in a.iter().zip(b.iter()) {
        let ordering = compare_values(x, y)?;
        if ordering != Ordering::Equal {
            return Ok(ordering);
        }
    }
    Ok(a.len().cmp(&b.len()))
}

/// Numeric ordering across INTEGER, DECIMAL, and INFINITY.
/// `None` when either side is not a number.
fn numeric_cmp(left: &Value, right: &Value) -> Option<Ordering> {
    match (left.variant(), right.variant()) {
        (Variant::Infinity { negative: a }, Variant::Infinity { negative: b }) => {
            // Ties broken by sign: -inf < +inf.
            Some(b.cmp(a))
        }
        (Variant::Infinity { negative }, _) if right.is_number() => {
            Some(if *negative { Ordering::Less } else { Ordering::Greater })
        }
        (_, Variant::Infinity { negative }) if left.is_number() => {
            Some(if *negative { Ordering::Greater } else { Ordering::Less })
        }
        (Variant::Int(a), Variant::Int(b)) => Some(a.cmp_int(b)),
        (Variant::Int(a), Variant::Decimal(b)) => Some(a.to_f64().total_cmp(b)),
        (Variant::Decimal(a), Variant::Int(b)) => Some(a.total_cmp(&b.to_f64())),
        (Variant::Decimal(a), Variant::Decimal(b)) => Some(a.total_cmp(b)),
        _ => None,
    }
}

/// Convenience: the numeric payload as `f64`, for coercion decisions.
pub(crate) fn as_f64(value: &Value) -> Option<f64> {
    match value.variant() {
        Variant::Int(n) => Some(n.to_f64()),
        Variant::Decimal(d) => Some(*d),
        Variant::Infinity { negative: false } => Some(f64::INFINITY),
        Variant::Infinity { negative: true } => Some(f64::NEG_INFINITY),
        _ => None,
    }
}

/// Convenience: the integer payload, when the value is an integer.
pub(crate) fn as_int(value: &Value) -> Option<&IntVal> {
    match value.variant() {
        Variant::Int(n) => Some(n),
        _ => None,
    }
}
