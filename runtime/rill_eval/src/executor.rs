//! The default executor: plain threads behind the `Executor` seam.
//!
//! `execute_now` runs on the calling thread and returns an already-settled
//! future. Background execution spawns a thread per task, capped by a
//! counting semaphore so a burst of forks cannot exhaust the host. Forked
//! tasks are tracked by id; the handle can be re-fetched until joined.

#[cfg(test)]
mod tests;

use dashmap::DashMap;
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::thread;
use tracing::debug;
use ulid::Ulid;

use rill_value::{Executor, Task, TaskId, ValueFuture};

/// Default cap on concurrently running background tasks.
const DEFAULT_MAX_CONCURRENT: usize = 64;

/// A counting semaphore over `Mutex` + `Condvar`.
struct Semaphore {
    count: Mutex<usize>,
    released: Condvar,
    max: usize,
}

impl Semaphore {
    fn new(max: usize) -> Self {
        Semaphore {
            count: Mutex::new(0),
            released: Condvar::new(),
            max,
        }
    }

    fn acquire(&self) {
        let mut count = self.count.lock();
        while *count >= self.max {
            self.released.wait(&mut count);
        }
        *count += 1;
    }

    fn release(&self) {
        let mut count = self.count.lock();
        *count = count.saturating_sub(1);
        self.released.notify_one();
    }
}

/// Thread-per-task executor with a concurrency cap and a fork table.
pub struct ThreadExecutor {
    semaphore: Arc<Semaphore>,
    forks: DashMap<TaskId, ValueFuture>,
}

impl ThreadExecutor {
    pub fn new() -> Self {
        ThreadExecutor::with_max_concurrent(DEFAULT_MAX_CONCURRENT)
    }

    pub fn with_max_concurrent(max: usize) -> Self {
        ThreadExecutor {
            semaphore: Arc::new(Semaphore::new(max.max(1))),
            forks: DashMap::new(),
        }
    }

    /// Look a forked task's handle up by id. The entry stays until
    /// [`ThreadExecutor::forget`].
    pub fn future_for(&self, id: &str) -> Option<ValueFuture> {
        self.forks.get(id).map(|entry| entry.value().clone())
    }

    /// Drop a fork-table entry.
    pub fn forget(&self, id: &str) {
        self.forks.remove(id);
    }

    fn spawn(&self, task: Task) -> ValueFuture {
        let future = ValueFuture::new();
        let producer = future.clone();
        let semaphore = Arc::clone(&self.semaphore);
        thread::spawn(move || {
            // Capped inside the worker so submission never blocks.
            semaphore.acquire();
            let result = task();
            producer.complete(result);
            semaphore.release();
        });
        future
    }
}

impl Default for ThreadExecutor {
    fn default() -> Self {
        ThreadExecutor::new()
    }
}

impl Executor for ThreadExecutor {
    fn execute_now(&self, task: Task) -> ValueFuture {
        let future = ValueFuture::new();
        future.complete(task());
        future
    }

    fn execute_in_background(&self, task: Task) -> ValueFuture {
        self.spawn(task)
    }

    fn fork_and_return_id(&self, task: Task) -> (TaskId, ValueFuture) {
        let id = Ulid::new().to_string();
        let future = self.spawn(task);
        self.forks.insert(id.clone(), future.clone());
        debug!(fork = %id, "forked background task");
        (id, future)
    }
}
