// Tests unwrap freely: a failed unwrap is the failure being reported.
#![allow(clippy::unwrap_used)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pretty_assertions::assert_eq;

use super::{assert_equal, assert_truthy, each, multiply_block, MAX_MULTIPLY};
use rill_value::{ErrorKind, Value};

#[test]
fn multiply_block_reevaluates_per_round() {
    let runs = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&runs);
    let block = Value::lazy(move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
        Ok(Value::int(10))
    });

    let total = multiply_block(&block, 3).unwrap();
    assert_eq!(total, Value::int(30));
    // The block ran once per round, not once overall.
    assert_eq!(runs.load(Ordering::SeqCst), 3);
}

#[test]
fn multiply_block_caps_the_count() {
    let block = Value::int(1);
    let err = multiply_block(&block, MAX_MULTIPLY + 1).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::MultiplierTooLarge { .. }));
    assert_eq!(multiply_block(&block, 0).unwrap(), Value::void());
}

#[test]
fn each_preserves_order_sequentially() {
    let list = Value::list((1..=5i64).map(Value::int).collect());
    let doubled = each(&list, false, |v| v.multiply(&Value::int(2))).unwrap();
    assert_eq!(
        doubled,
        Value::list(vec![
            Value::int(2),
            Value::int(4),
            Value::int(6),
            Value::int(8),
            Value::int(10),
        ])
    );
}

#[test]
fn each_preserves_order_in_parallel() {
    let list = Value::list((0..64i64).map(Value::int).collect());
    let mapped = each(&list, true, |v| v.plus(&Value::int(100))).unwrap();
    let expected: Vec<Value> = (0..64i64).map(|i| Value::int(i + 100)).collect();
    assert_eq!(mapped, Value::list(expected));
}

#[test]
fn each_wraps_scalars() {
    let mapped = each(&Value::int(3), false, |v| v.plus(&Value::int(1))).unwrap();
    assert_eq!(mapped, Value::list(vec![Value::int(4)]));
}

#[test]
fn each_stops_on_the_first_failure() {
    let list = Value::list(vec![Value::int(1), Value::TRUE, Value::int(3)]);
    let result = each(&list, false, |v| v.multiply(&Value::int(2)));
    assert!(result.is_err());
}

#[test]
fn assertions_raise_with_detail() {
    assert_eq!(assert_truthy(&Value::TRUE, "must hold").unwrap(), Value::TRUE);

    let err = assert_truthy(&Value::FALSE, "must hold").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::AssertionFailed { .. }));

    assert!(assert_equal(&Value::int(1), &Value::decimal(1.0)).is_ok());
    let err = assert_equal(&Value::int(1), &Value::int(2)).unwrap_err();
    assert!(err.message.contains("1 != 2"));
}

#[test]
fn assertions_force_reactive_conditions() {
    let node = Value::lazy(|_| Ok(Value::boolean(true)));
    assert!(assert_truthy(&node, "lazy condition").is_ok());
}
