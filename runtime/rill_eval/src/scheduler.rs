//! The default scheduler: periodic evaluation with cancel-by-id.
//!
//! Each scheduled task gets a thread driving a crossbeam tick channel; a
//! cancel message (or a dropped scheduler) ends it. [`run_every`] layers
//! the language's `every ... until ...` construct on top: re-notify a
//! reactive value each period and cancel once the condition holds.

#[cfg(test)]
mod tests;

use crossbeam::channel::{bounded, tick, Sender};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use ulid::Ulid;

use rill_value::{Scheduler, TaskId, Value};

/// Thread-per-task interval scheduler.
pub struct IntervalScheduler {
    cancellers: Arc<DashMap<TaskId, Sender<()>>>,
}

impl IntervalScheduler {
    pub fn new() -> Self {
        IntervalScheduler {
            cancellers: Arc::new(DashMap::new()),
        }
    }

    /// Number of live scheduled tasks.
    pub fn active(&self) -> usize {
        self.cancellers.len()
    }
}

impl Default for IntervalScheduler {
    fn default() -> Self {
        IntervalScheduler::new()
    }
}

impl Scheduler for IntervalScheduler {
    fn schedule(&self, callback: Arc<dyn Fn() + Send + Sync>, period: Duration) -> TaskId {
        let id = Ulid::new().to_string();
        let (cancel_tx, cancel_rx) = bounded::<()>(1);
        self.cancellers.insert(id.clone(), cancel_tx);

        let ticks = tick(period);
        let cancellers = Arc::clone(&self.cancellers);
        let task_id = id.clone();
        std::thread::spawn(move || {
            loop {
                crossbeam::channel::select! {
                    recv(cancel_rx) -> _ => break,
                    recv(ticks) -> _ => callback(),
                }
            }
            cancellers.remove(&task_id);
            debug!(task = %task_id, "scheduled task ended");
        });

        id
    }

    fn cancel(&self, id: &str) {
        if let Some((_, canceller)) = self.cancellers.remove(id) {
            // A full buffer means a cancel is already pending.
            let _ = canceller.try_send(());
        }
    }
}

/// Re-evaluate `node` every `period`, stopping once `until` returns true
/// for a produced value. Returns the task id so callers can cancel early.
pub fn run_every(
    scheduler: &Arc<dyn Scheduler>,
    node: Value,
    period: Duration,
    until: Option<Arc<dyn Fn(&Value) -> bool + Send + Sync>>,
) -> TaskId {
    let slot: Arc<parking_lot::Mutex<Option<TaskId>>> =
        Arc::new(parking_lot::Mutex::new(None));

    let tick_scheduler = Arc::clone(scheduler);
    let tick_slot = Arc::clone(&slot);
    let id = scheduler.schedule(
        Arc::new(move || {
            let produced = match node.notify() {
                Ok(value) => value,
                Err(_) => return,
            };
            if let Some(condition) = &until {
                if condition(&produced) {
                    if let Some(id) = tick_slot.lock().as_deref() {
                        tick_scheduler.cancel(id);
                    }
                }
            }
        }),
        period,
    );

    *slot.lock() = Some(id.clone());
    id
}
