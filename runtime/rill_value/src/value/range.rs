//! The RANGE variant: an endpoint pair with boundary flags.
//!
//! Construction normalizes endpoint order — a literal written start-high
//! (`5..1`) stores `lower=1, upper=5` with `reversed` set, so membership
//! checks work unconditionally and iteration still runs in the written
//! direction.

use std::cmp::Ordering;

use crate::compare::compare_values;
use crate::errors::{invalid_operation, ValueError};
use crate::value::{Type, Value};

/// An endpoint pair plus open/closed boundary flags.
#[derive(Clone, Debug)]
pub struct RangeValue {
    lower: Value,
    upper: Value,
    lower_open: bool,
    upper_open: bool,
    reversed: bool,
}

impl RangeValue {
    /// A closed range. Endpoints given high-first are swapped and the
    /// range marked reversed.
    pub fn new(start: Value, finish: Value) -> Self {
        RangeValue::with_bounds(start, finish, false, false)
    }

    /// A range with explicit boundary openness.
    pub fn with_bounds(start: Value, finish: Value, lower_open: bool, upper_open: bool) -> Self {
        let descending = matches!(
            compare_values(&start, &finish),
            Ok(Ordering::Greater)
        );
        if descending {
            RangeValue {
                lower: finish,
                upper: start,
                // Boundary flags follow their endpoints through the swap.
                lower_open: upper_open,
                upper_open: lower_open,
                reversed: true,
            }
        } else {
            RangeValue {
                lower: start,
                upper: finish,
                lower_open,
                upper_open,
                reversed: false,
            }
        }
    }

    /// Rebuild from stored parts (the JSON projection's path back in).
    pub(crate) fn from_parts(
        lower: Value,
        upper: Value,
        lower_open: bool,
        upper_open: bool,
        reversed: bool,
    ) -> Self {
        RangeValue {
            lower,
            upper,
            lower_open,
            upper_open,
            reversed,
        }
    }

    pub fn lower(&self) -> &Value {
        &self.lower
    }

    pub fn upper(&self) -> &Value {
        &self.upper
    }

    pub fn lower_open(&self) -> bool {
        self.lower_open
    }

    pub fn upper_open(&self) -> bool {
        self.upper_open
    }

    /// Whether the literal was written high-first.
    pub fn reversed(&self) -> bool {
        self.reversed
    }

    /// Membership under the boundary flags.
    pub fn contains(&self, value: &Value) -> Result<bool, ValueError> {
        let above_lower = match compare_values(value, &self.lower)? {
            Ordering::Greater => true,
            Ordering::Equal => !self.lower_open,
            Ordering::Less => false,
        };
        if !above_lower {
            return Ok(false);
        }
        Ok(match compare_values(value, &self.upper)? {
            Ordering::Less => true,
            Ordering::Equal => !self.upper_open,
            Ordering::Greater => false,
        })
    }

    /// Enumerate an integer range, in the written direction.
    ///
    /// Non-integer endpoints cannot be enumerated.
    pub fn to_vec(&self) -> Result<Vec<Value>, ValueError> {
        let (Some(low), Some(high)) = (endpoint_int(&self.lower), endpoint_int(&self.upper))
        else {
            return Err(invalid_operation(Type::Range, "iterate"));
        };
        let start = if self.lower_open { low + 1 } else { low };
        let end = if self.upper_open { high - 1 } else { high };
        let mut items: Vec<Value> = (start..=end).map(Value::int).collect();
        if self.reversed {
            items.reverse();
        }
        Ok(items)
    }

    /// Number of enumerable elements.
    pub fn len(&self) -> Result<usize, ValueError> {
        Ok(self.to_vec()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, ValueError> {
        Ok(self.len()? == 0)
    }

    /// Broadcast an addition over both endpoints, keeping flags.
    pub fn broadcast_plus(&self, rhs: &Value) -> Result<RangeValue, ValueError> {
        Ok(RangeValue {
            lower: self.lower.plus(rhs)?,
            upper: self.upper.plus(rhs)?,
            lower_open: self.lower_open,
            upper_open: self.upper_open,
            reversed: self.reversed,
        })
    }
}

fn endpoint_int(value: &Value) -> Option<i64> {
    match value.variant() {
        crate::value::Variant::Int(n) => n.as_i64(),
        _ => None,
    }
}

impl PartialEq for RangeValue {
    fn eq(&self, other: &Self) -> bool {
        self.lower == other.lower
            && self.upper == other.upper
            && self.lower_open == other.lower_open
            && self.upper_open == other.upper_open
            && self.reversed == other.reversed
    }
}

impl std::fmt::Display for RangeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let open = if self.lower_open { "(" } else { "[" };
        let close = if self.upper_open { ")" } else { "]" };
        write!(
            f,
            "{open}{}..{}{close}",
            self.lower.to_text(),
            self.upper.to_text()
        )
    }
}
