//! Evaluator-level operations over values.
//!
//! These sit above the value layer's own coercion rules: block
//! multiplication re-evaluates its operand, `each` maps a callback over a
//! collection (optionally in parallel, always order-preserving), and
//! assertions raise regardless of the quiet/fail-fast mode.

#[cfg(test)]
mod tests;

use rayon::prelude::*;

use rill_value::{
    assertion_failed, multiplier_too_large, ValueResult, Value,
};

/// Cap on evaluator-level block multiplication.
pub const MAX_MULTIPLY: i64 = 1000;

/// Multiply a block result: deep-fix the operand and add it to itself
/// `count - 1` more times, re-fixing per addition so a reactive operand
/// re-evaluates each round. This is replication of *evaluations*, not of a
/// snapshot — a side-effecting block runs `count` times.
pub fn multiply_block(value: &Value, count: i64) -> ValueResult {
    if count.unsigned_abs() > MAX_MULTIPLY as u64 {
        return Err(multiplier_too_large(count, MAX_MULTIPLY));
    }
    if count == 0 {
        return Ok(Value::void());
    }

    let mut total = value.fix_deep(false)?;
    for _ in 1..count.abs() {
        total = total.plus(&value.fix_deep(false)?)?;
    }
    if count < 0 {
        total.negate()
    } else {
        Ok(total)
    }
}

/// Map `f` over a collection's elements, returning a list in input order.
///
/// With `parallel` set the elements fan out over the thread pool; the
/// result order still matches the input, only side effects inside `f` may
/// interleave.
pub fn each(
    value: &Value,
    parallel: bool,
    f: impl Fn(&Value) -> ValueResult + Send + Sync,
) -> ValueResult {
    let source = value.cast(rill_value::Type::List)?;
    let elements: Vec<Value> = match source.variant() {
        rill_value::Variant::List(items) => (**items).clone(),
        _ => vec![source.clone()],
    };

    let mapped: Result<Vec<Value>, _> = if parallel {
        elements.par_iter().map(|item| f(item)).collect()
    } else {
        elements.iter().map(|item| f(item)).collect()
    };
    Ok(Value::list(mapped?))
}

/// Assert that a condition value is truthy. Failures always raise; quiet
/// mode never absorbs an assertion.
pub fn assert_truthy(condition: &Value, detail: &str) -> ValueResult {
    let settled = condition.demand()?;
    if settled.truthy() {
        Ok(Value::TRUE)
    } else {
        Err(assertion_failed(detail.to_string()))
    }
}

/// Assert that two values are equal under the language's equality.
pub fn assert_equal(left: &Value, right: &Value) -> ValueResult {
    let left = left.demand()?;
    let right = right.demand()?;
    if left == right {
        Ok(Value::TRUE)
    } else {
        Err(assertion_failed(format!(
            "{} != {}",
            left.to_text(),
            right.to_text()
        )))
    }
}
