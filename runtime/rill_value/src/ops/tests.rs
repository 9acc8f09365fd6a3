// Tests unwrap freely: a failed unwrap is the failure being reported.
#![allow(clippy::unwrap_used)]

use crate::errors::ErrorKind;
use crate::value::{RangeValue, Type, Value, Variant};
use num_bigint::BigInt;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[test]
fn integer_addition() {
    assert_eq!(Value::int(2).plus(&Value::int(3)).unwrap(), Value::int(5));
}

#[test]
fn integer_plus_decimal_promotes() {
    let sum = Value::int(2).plus(&Value::decimal(1.5)).unwrap();
    assert_eq!(sum.type_tag(), Type::Decimal);
    assert_eq!(sum, Value::decimal(3.5));
}

#[test]
fn overflow_promotes_to_big() {
    let sum = Value::int(i64::MAX).plus(&Value::int(1)).unwrap();
    assert_eq!(sum.type_tag(), Type::Integer);
    assert_eq!(sum, Value::big_int(BigInt::from(i64::MAX) + 1));
}

#[test]
fn string_on_the_right_concatenates() {
    assert_eq!(
        Value::int(1).plus(&Value::string("a")).unwrap(),
        Value::string("1a")
    );
    assert_eq!(
        Value::string("x=").plus(&Value::int(7)).unwrap(),
        Value::string("x=7")
    );
}

#[test]
fn list_on_the_right_takes_the_left_as_head() {
    let list = Value::list(vec![Value::int(2), Value::int(3)]);
    assert_eq!(
        Value::int(1).plus(&list).unwrap(),
        Value::list(vec![Value::int(1), Value::int(2), Value::int(3)])
    );
}

#[test]
fn list_on_the_left_appends() {
    let list = Value::list(vec![Value::int(1)]);
    assert_eq!(
        list.plus(&Value::int(2)).unwrap(),
        Value::list(vec![Value::int(1), Value::int(2)])
    );
    // List + list concatenates rather than nesting.
    assert_eq!(
        list.plus(&Value::list(vec![Value::int(9)])).unwrap(),
        Value::list(vec![Value::int(1), Value::int(9)])
    );
}

#[test]
fn range_on_either_side_broadcasts() {
    let range = Value::range(RangeValue::new(Value::int(1), Value::int(5)));
    let shifted = Value::int(10).plus(&range).unwrap();
    let Variant::Range(r) = shifted.variant() else {
        panic!("expected a range, got {shifted:?}");
    };
    assert_eq!(r.lower(), &Value::int(11));
    assert_eq!(r.upper(), &Value::int(15));

    let shifted = range.plus(&Value::int(2)).unwrap();
    let Variant::Range(r) = shifted.variant() else {
        panic!("expected a range, got {shifted:?}");
    };
    assert_eq!(r.lower(), &Value::int(3));
}

#[test]
fn infinity_absorbs_addition() {
    assert_eq!(
        Value::int(5).plus(&Value::infinity(false)).unwrap(),
        Value::infinity(false)
    );
    assert_eq!(
        Value::infinity(true).plus(&Value::int(5)).unwrap(),
        Value::infinity(true)
    );
}

#[test]
fn division_by_zero_is_signed_infinity() {
    assert_eq!(Value::int(5).divide(&Value::int(0)).unwrap(), Value::infinity(false));
    assert_eq!(Value::int(-5).divide(&Value::int(0)).unwrap(), Value::infinity(true));
    assert_eq!(
        Value::decimal(-2.5).divide(&Value::decimal(0.0)).unwrap(),
        Value::infinity(true)
    );
}

#[test]
fn division_by_infinity_is_zero() {
    assert_eq!(Value::int(7).divide(&Value::infinity(false)).unwrap(), Value::ZERO);
    assert_eq!(
        Value::decimal(7.5).modulus(&Value::infinity(true)).unwrap(),
        Value::ZERO
    );
}

#[test]
fn integer_division_stays_exact_or_widens() {
    assert_eq!(Value::int(6).divide(&Value::int(3)).unwrap(), Value::int(2));
    assert_eq!(Value::int(7).divide(&Value::int(2)).unwrap(), Value::decimal(3.5));
}

#[test]
fn infinity_multiplication_sign_table() {
    let pos = Value::infinity(false);
    let neg = Value::infinity(true);
    assert_eq!(Value::int(3).multiply(&pos).unwrap(), Value::infinity(false));
    assert_eq!(Value::int(-3).multiply(&pos).unwrap(), Value::infinity(true));
    assert_eq!(Value::int(-3).multiply(&neg).unwrap(), Value::infinity(false));
    assert_eq!(neg.multiply(&neg).unwrap(), Value::infinity(false));
}

#[test]
fn list_replication_and_cap() {
    let list = Value::list(vec![Value::int(1), Value::int(2)]);

    let tripled = list.multiply(&Value::int(3)).unwrap();
    assert_eq!(tripled.size().unwrap(), 6);

    let reversed = list.multiply(&Value::int(-2)).unwrap();
    assert_eq!(
        reversed,
        Value::list(vec![
            Value::int(2),
            Value::int(1),
            Value::int(2),
            Value::int(1),
        ])
    );

    let err = list.multiply(&Value::int(1001)).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::MultiplierTooLarge { multiplier: 1001, .. }));
    let err = list.multiply(&Value::int(-1001)).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::MultiplierTooLarge { .. }));
}

#[test]
fn string_division_splits_on_literal_delimiter() {
    let split = Value::string("a,b,c").divide(&Value::string(",")).unwrap();
    assert_eq!(
        split,
        Value::list(vec![
            Value::string("a"),
            Value::string("b"),
            Value::string("c"),
        ])
    );
    // The delimiter is literal text, not a pattern.
    let split = Value::string("a.b").divide(&Value::string(".")).unwrap();
    assert_eq!(split.size().unwrap(), 2);
}

#[test]
fn string_division_by_fraction_multiplies() {
    assert_eq!(
        Value::string("ab").divide(&Value::decimal(0.5)).unwrap(),
        Value::string("abab")
    );
}

#[test]
fn string_replication_cap() {
    assert_eq!(
        Value::string("ab").multiply(&Value::int(3)).unwrap(),
        Value::string("ababab")
    );
    let err = Value::string("ab").multiply(&Value::int(1001)).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::MultiplierTooLarge { .. }));
}

#[test]
fn boolean_arithmetic() {
    // Minus is XOR.
    assert_eq!(Value::TRUE.minus(&Value::FALSE).unwrap(), Value::TRUE);
    assert_eq!(Value::TRUE.minus(&Value::TRUE).unwrap(), Value::FALSE);
    // Divide compares truthiness.
    assert_eq!(Value::TRUE.divide(&Value::TRUE).unwrap(), Value::TRUE);
    assert_eq!(Value::TRUE.divide(&Value::FALSE).unwrap(), Value::FALSE);
    // Multiply and modulus are invalid.
    let err = Value::TRUE.multiply(&Value::int(2)).unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::InvalidOperation { variant: Type::Boolean, .. }
    ));
    assert!(Value::TRUE.modulus(&Value::int(2)).is_err());
}

#[test]
fn string_minus_removes_occurrences() {
    assert_eq!(
        Value::string("banana").minus(&Value::string("an")).unwrap(),
        Value::string("ba")
    );
}

#[test]
fn list_minus_removes_first_match() {
    let list = Value::list(vec![Value::int(1), Value::int(2), Value::int(1)]);
    assert_eq!(
        list.minus(&Value::int(1)).unwrap(),
        Value::list(vec![Value::int(2), Value::int(1)])
    );
}

#[test]
fn map_merge_keeps_insertion_order() {
    let left = Value::pair("a", Value::int(1));
    let right = Value::pair("b", Value::int(2));
    let merged = left.plus(&right).unwrap();
    assert_eq!(merged.size().unwrap(), 2);
    assert_eq!(merged.get(&Value::string("b")).unwrap(), Value::int(2));
}

#[test]
fn modulus_follows_division_edge_rules() {
    assert_eq!(Value::int(7).modulus(&Value::int(3)).unwrap(), Value::int(1));
    assert_eq!(
        Value::int(-7).modulus(&Value::int(0)).unwrap(),
        Value::infinity(true)
    );
}

#[test]
fn negate_by_variant() {
    assert_eq!(Value::int(3).negate().unwrap(), Value::int(-3));
    assert_eq!(Value::TRUE.negate().unwrap(), Value::FALSE);
    assert_eq!(Value::infinity(false).negate().unwrap(), Value::infinity(true));
    assert_eq!(
        Value::list(vec![Value::int(1), Value::int(2)]).negate().unwrap(),
        Value::list(vec![Value::int(2), Value::int(1)])
    );
}

#[test]
fn void_is_additive_identity() {
    assert_eq!(Value::void().plus(&Value::int(3)).unwrap(), Value::int(3));
}

proptest! {
    #[test]
    fn division_by_zero_never_errors(dividend in any::<i64>()) {
        let result = Value::int(dividend).divide(&Value::int(0)).unwrap();
        prop_assert_eq!(result, Value::infinity(dividend < 0));
    }

    #[test]
    fn int_plus_decimal_matches_f64(i in -1_000_000i64..1_000_000, d in -1.0e9f64..1.0e9) {
        let sum = Value::int(i).plus(&Value::decimal(d)).unwrap();
        prop_assert_eq!(sum.type_tag(), Type::Decimal);
        prop_assert_eq!(sum, Value::decimal(i as f64 + d));
    }

    #[test]
    fn replication_length_is_exact(len in 0usize..8, n in -1000i64..=1000) {
        let list = Value::list(vec![Value::int(0); len]);
        let result = list.multiply(&Value::int(n)).unwrap();
        prop_assert_eq!(result.size().unwrap(), len * n.unsigned_abs() as usize);
    }
}
