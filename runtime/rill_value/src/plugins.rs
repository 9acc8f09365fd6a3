//! Collaborator traits the value model consumes.
//!
//! The core never schedules threads, handles its own failures, or predicts
//! types directly; it talks to pluggable collaborators behind these traits.
//! Default implementations live in `rill_eval`; hosts may register their
//! own through [`crate::config`].

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::Duration;

use crate::errors::{SourceLocation, ValueError, ValueResult};
use crate::scope::Scope;
use crate::value::{Type, Value};

/// A deferred unit of work handed to an executor.
pub type Task = Box<dyn FnOnce() -> ValueResult + Send + 'static>;

/// Identifier for forked and scheduled work, cancellable by id.
pub type TaskId = String;

/// Thread-pool collaborator for `fork` and background evaluation.
pub trait Executor: Send + Sync {
    /// Run the task, possibly on the calling thread, returning a handle.
    fn execute_now(&self, task: Task) -> ValueFuture;

    /// Hand the task to a background thread and return immediately.
    fn execute_in_background(&self, task: Task) -> ValueFuture;

    /// Background execution that also yields a cancellation/lookup id.
    fn fork_and_return_id(&self, task: Task) -> (TaskId, ValueFuture);
}

/// Periodic-evaluation collaborator for the `every` construct.
pub trait Scheduler: Send + Sync {
    /// Invoke `callback` every `period` until cancelled.
    fn schedule(&self, callback: Arc<dyn Fn() + Send + Sync>, period: Duration) -> TaskId;

    /// Cancel a scheduled task. Unknown ids are ignored.
    fn cancel(&self, id: &str);
}

/// Failure-policy collaborator consulted at the reactive dispatch boundary.
///
/// The handler decides between propagating the error (fail-fast) and
/// converting it to an ERROR-variant value (quiet). Assertion and
/// recursion-limit errors must propagate regardless.
pub trait ErrorHandler: Send + Sync {
    fn handle(
        &self,
        scope: Option<&Scope>,
        location: Option<&SourceLocation>,
        error: ValueError,
    ) -> ValueResult;
}

/// A learned guess at a node's result type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TypePrediction {
    /// The most probable type tag.
    pub probable: Type,
    /// Fraction of observations agreeing with `probable`, in `0.0..=1.0`.
    pub certainty: f64,
}

/// Type-learning collaborator behind `predict_type`.
pub trait TypeLearner: Send + Sync {
    /// Predict the result type of a named computation, if anything was
    /// learned about it.
    fn predict(&self, name: &str, inputs: &[Value]) -> Option<TypePrediction>;

    /// Record an observed result type for a named computation.
    fn learn(&self, name: &str, inputs: &[Value], observed: Type);
}

struct FutureState {
    slot: Mutex<Option<ValueResult>>,
    ready: Condvar,
}

/// A write-once result handle for background work.
///
/// The producing side calls [`complete`](ValueFuture::complete) exactly
/// once; consumers [`join`](ValueFuture::join) (blocking) or wrap the
/// handle as a lazy value whose fix blocks.
#[derive(Clone)]
pub struct ValueFuture {
    state: Arc<FutureState>,
}

impl ValueFuture {
    pub fn new() -> Self {
        ValueFuture {
            state: Arc::new(FutureState {
                slot: Mutex::new(None),
                ready: Condvar::new(),
            }),
        }
    }

    /// Deliver the result. Later deliveries are dropped.
    pub fn complete(&self, result: ValueResult) {
        let mut slot = self.state.slot.lock();
        if slot.is_none() {
            *slot = Some(result);
            self.state.ready.notify_all();
        }
    }

    /// Block until the result is delivered, then clone it out.
    pub fn join(&self) -> ValueResult {
        let mut slot = self.state.slot.lock();
        while slot.is_none() {
            self.state.ready.wait(&mut slot);
        }
        match slot.as_ref() {
            Some(result) => result.clone(),
            // Unreachable: the wait loop only exits when the slot is filled.
            None => Ok(Value::void()),
        }
    }

    /// The result if already delivered; `None` while still in flight.
    pub fn try_join(&self) -> Option<ValueResult> {
        self.state.slot.lock().clone()
    }

    /// Wrap the handle as a reactive value. Forcing it blocks on `join`.
    pub fn into_lazy(self) -> Value {
        Value::lazy(move |_| self.join())
    }
}

impl Default for ValueFuture {
    fn default() -> Self {
        ValueFuture::new()
    }
}

impl std::fmt::Debug for ValueFuture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let settled = self.state.slot.lock().is_some();
        write!(f, "ValueFuture(settled: {settled})")
    }
}
