//! Two-width integer payload for the INTEGER variant.
//!
//! `IntVal` keeps small integers inline as `i64` and promotes to a shared
//! `BigInt` when an operation would overflow the 63-bit range, instead of
//! wrapping or failing. Both widths carry the same INTEGER type tag; the
//! width is an implementation detail that never leaks into coercion rules.
//!
//! Arithmetic never goes through unchecked operators: the small path uses
//! the `checked_*` family and falls over to the big path on `None`.

use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};
use std::cmp::Ordering;
use std::fmt;

use super::heap::Heap;

/// Integer payload: inline `i64` or promoted `BigInt`.
#[derive(Clone)]
pub enum IntVal {
    /// Fits in 64 bits; the common case.
    Small(i64),
    /// Promoted after overflow. Shared, never demoted in place.
    Big(Heap<BigInt>),
}

impl IntVal {
    /// The canonical zero.
    pub const ZERO: Self = IntVal::Small(0);

    /// Wrap a raw `i64`.
    #[inline]
    pub const fn new(value: i64) -> Self {
        IntVal::Small(value)
    }

    /// Wrap a `BigInt`, demoting to the small representation when it fits.
    pub fn from_big(value: BigInt) -> Self {
        match value.to_i64() {
            Some(small) => IntVal::Small(small),
            None => IntVal::Big(Heap::new(value)),
        }
    }

    /// The value as `i64`, if it fits.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            IntVal::Small(n) => Some(*n),
            IntVal::Big(b) => b.to_i64(),
        }
    }

    /// Lossy conversion to `f64` (used by decimal coercion).
    pub fn to_f64(&self) -> f64 {
        match self {
            IntVal::Small(n) => *n as f64,
            IntVal::Big(b) => b.to_f64().unwrap_or(f64::INFINITY),
        }
    }

    /// The value widened to `BigInt`.
    pub fn to_big(&self) -> BigInt {
        match self {
            IntVal::Small(n) => BigInt::from(*n),
            IntVal::Big(b) => (**b).clone(),
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            IntVal::Small(n) => *n == 0,
            IntVal::Big(b) => b.is_zero(),
        }
    }

    pub fn is_negative(&self) -> bool {
        match self {
            IntVal::Small(n) => *n < 0,
            IntVal::Big(b) => b.is_negative(),
        }
    }

    /// Addition with overflow promotion.
    pub fn plus(&self, rhs: &IntVal) -> IntVal {
        if let (IntVal::Small(a), IntVal::Small(b)) = (self, rhs) {
            if let Some(sum) = a.checked_add(*b) {
                return IntVal::Small(sum);
            }
        }
        IntVal::from_big(self.to_big() + rhs.to_big())
    }

    /// Subtraction with overflow promotion.
    pub fn minus(&self, rhs: &IntVal) -> IntVal {
        if let (IntVal::Small(a), IntVal::Small(b)) = (self, rhs) {
            if let Some(diff) = a.checked_sub(*b) {
                return IntVal::Small(diff);
            }
        }
        IntVal::from_big(self.to_big() - rhs.to_big())
    }

    /// Multiplication with overflow promotion.
    pub fn times(&self, rhs: &IntVal) -> IntVal {
        if let (IntVal::Small(a), IntVal::Small(b)) = (self, rhs) {
            if let Some(product) = a.checked_mul(*b) {
                return IntVal::Small(product);
            }
        }
        IntVal::from_big(self.to_big() * rhs.to_big())
    }

    /// Exact division. `None` when the divisor is zero or does not divide
    /// evenly; callers fall back to decimal division or infinity.
    pub fn div_exact(&self, rhs: &IntVal) -> Option<IntVal> {
        if rhs.is_zero() {
            return None;
        }
        let (num, den) = (self.to_big(), rhs.to_big());
        if (&num % &den).is_zero() {
            Some(IntVal::from_big(num / den))
        } else {
            None
        }
    }

    /// Remainder. `None` when the divisor is zero.
    pub fn remainder(&self, rhs: &IntVal) -> Option<IntVal> {
        if rhs.is_zero() {
            return None;
        }
        if let (IntVal::Small(a), IntVal::Small(b)) = (self, rhs) {
            if let Some(r) = a.checked_rem(*b) {
                return Some(IntVal::Small(r));
            }
        }
        Some(IntVal::from_big(self.to_big() % rhs.to_big()))
    }

    /// Negation with overflow promotion (`i64::MIN` promotes).
    pub fn negated(&self) -> IntVal {
        match self {
            IntVal::Small(n) => match n.checked_neg() {
                Some(neg) => IntVal::Small(neg),
                None => IntVal::from_big(-self.to_big()),
            },
            IntVal::Big(b) => IntVal::from_big(-(**b).clone()),
        }
    }

    pub fn cmp_int(&self, rhs: &IntVal) -> Ordering {
        match (self, rhs) {
            (IntVal::Small(a), IntVal::Small(b)) => a.cmp(b),
            _ => self.to_big().cmp(&rhs.to_big()),
        }
    }
}

impl PartialEq for IntVal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp_int(other) == Ordering::Equal
    }
}

impl Eq for IntVal {}

impl From<i64> for IntVal {
    fn from(value: i64) -> Self {
        IntVal::Small(value)
    }
}

impl fmt::Display for IntVal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntVal::Small(n) => write!(f, "{n}"),
            IntVal::Big(b) => write!(f, "{b}"),
        }
    }
}

impl fmt::Debug for IntVal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
