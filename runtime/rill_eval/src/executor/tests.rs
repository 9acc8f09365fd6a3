// Tests unwrap freely: a failed unwrap is the failure being reported.
#![allow(clippy::unwrap_used)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;

use super::ThreadExecutor;
use rill_value::{Executor, Value};

#[test]
fn execute_now_settles_immediately() {
    let executor = ThreadExecutor::new();
    let future = executor.execute_now(Box::new(|| Ok(Value::int(7))));
    assert_eq!(future.try_join(), Some(Ok(Value::int(7))));
}

#[test]
fn background_tasks_settle_on_join() {
    let executor = ThreadExecutor::new();
    let future = executor.execute_in_background(Box::new(|| {
        std::thread::sleep(Duration::from_millis(10));
        Ok(Value::string("done"))
    }));
    assert_eq!(future.join(), Ok(Value::string("done")));
}

#[test]
fn fork_returns_a_usable_id() {
    let executor = ThreadExecutor::new();
    let (id, future) = executor.fork_and_return_id(Box::new(|| Ok(Value::int(1))));

    // The handle is re-fetchable by id until forgotten.
    let fetched = executor.future_for(&id).unwrap();
    assert_eq!(fetched.join(), Ok(Value::int(1)));
    assert_eq!(future.join(), Ok(Value::int(1)));

    executor.forget(&id);
    assert!(executor.future_for(&id).is_none());
}

#[test]
fn forcing_a_fork_handle_blocks_until_done() {
    let executor = ThreadExecutor::new();
    let (_, future) = executor.fork_and_return_id(Box::new(|| {
        std::thread::sleep(Duration::from_millis(10));
        Ok(Value::int(5))
    }));

    // A fork handle wrapped as a value blocks inside fix.
    let handle = future.into_lazy();
    assert_eq!(handle.fix(1, false).unwrap(), Value::int(5));
}

#[test]
fn concurrency_cap_serializes_excess_tasks() {
    let executor = ThreadExecutor::with_max_concurrent(2);
    let peak = Arc::new(AtomicUsize::new(0));
    let live = Arc::new(AtomicUsize::new(0));

    let futures: Vec<_> = (0..8)
        .map(|_| {
            let live = Arc::clone(&live);
            let peak = Arc::clone(&peak);
            executor.execute_in_background(Box::new(move || {
                let now = live.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(5));
                live.fetch_sub(1, Ordering::SeqCst);
                Ok(Value::void())
            }))
        })
        .collect();

    for future in &futures {
        future.join().unwrap();
    }
    assert!(peak.load(Ordering::SeqCst) <= 2);
}
