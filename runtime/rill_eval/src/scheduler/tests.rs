// Tests unwrap freely: a failed unwrap is the failure being reported.
#![allow(clippy::unwrap_used)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::{run_every, IntervalScheduler};
use rill_value::{Scheduler, Value};

fn wait_until(deadline_ms: u64, condition: impl Fn() -> bool) -> bool {
    let start = std::time::Instant::now();
    while start.elapsed() < Duration::from_millis(deadline_ms) {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    condition()
}

#[test]
fn scheduled_callbacks_fire_repeatedly() {
    let scheduler = IntervalScheduler::new();
    let fired = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&fired);

    let id = scheduler.schedule(
        Arc::new(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        }),
        Duration::from_millis(5),
    );

    assert!(wait_until(500, || fired.load(Ordering::SeqCst) >= 3));
    scheduler.cancel(&id);
}

#[test]
fn cancel_stops_the_task() {
    let scheduler = IntervalScheduler::new();
    let fired = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&fired);

    let id = scheduler.schedule(
        Arc::new(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        }),
        Duration::from_millis(5),
    );
    assert!(wait_until(500, || fired.load(Ordering::SeqCst) >= 1));

    scheduler.cancel(&id);
    assert!(wait_until(500, || scheduler.active() == 0));
    let after_cancel = fired.load(Ordering::SeqCst);

    // No further firings once the task thread has exited.
    std::thread::sleep(Duration::from_millis(30));
    assert_eq!(fired.load(Ordering::SeqCst), after_cancel);
}

#[test]
fn cancelling_unknown_ids_is_harmless() {
    let scheduler = IntervalScheduler::new();
    scheduler.cancel("no-such-task");
}

#[test]
fn every_until_cancels_itself() {
    let concrete = Arc::new(IntervalScheduler::new());
    let scheduler: Arc<dyn Scheduler> = Arc::<IntervalScheduler>::clone(&concrete);
    let runs = Arc::new(AtomicUsize::new(0));

    let seen = Arc::clone(&runs);
    let node = Value::lazy(move |_| {
        let n = seen.fetch_add(1, Ordering::SeqCst);
        Ok(Value::int(n as i64))
    });

    // Stop once the node has produced a value of at least 2.
    let until: Arc<dyn Fn(&Value) -> bool + Send + Sync> = Arc::new(|value: &Value| {
        rill_value::compare_values(value, &Value::int(2))
            .map(|ordering| ordering != std::cmp::Ordering::Less)
            .unwrap_or(false)
    });
    run_every(&scheduler, node, Duration::from_millis(5), Some(until));

    assert!(wait_until(1000, || runs.load(Ordering::SeqCst) >= 3));
    // The until-condition fired a cancel; the task winds down.
    assert!(wait_until(1000, || concrete.active() == 0));
}
