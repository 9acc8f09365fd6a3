//! Thread-local guards for reactive evaluation.
//!
//! Two pieces of hidden state keep the reactive graph honest:
//!
//! - an evaluation stack of node ids, bounding reactive re-entry at
//!   [`MAX_EVAL_DEPTH`] so runaway recursion raises a structured error
//!   instead of overflowing the native stack;
//! - an in-flight notify set, making a re-entrant `notify` on a node that
//!   is already notifying a silent no-op rather than an infinite loop.
//!
//! Both are RAII-guarded: push and pop stay paired on unwinding.

use rustc_hash::FxHashSet;
use std::cell::RefCell;
use ulid::Ulid;

use crate::errors::{recursion_limit, ValueError};

/// Maximum nested reactive invocations per thread.
pub const MAX_EVAL_DEPTH: usize = 100;

thread_local! {
    static EVAL_STACK: RefCell<Vec<Ulid>> = const { RefCell::new(Vec::new()) };
    static NOTIFYING: RefCell<FxHashSet<Ulid>> = RefCell::new(FxHashSet::default());
}

/// Push a node onto the evaluation stack.
///
/// Fails with a recursion-limit error naming the active stack once the
/// depth would exceed [`MAX_EVAL_DEPTH`].
pub fn push_eval(id: Ulid) -> Result<EvalEntry, ValueError> {
    EVAL_STACK.with(|stack| {
        let mut stack = stack.borrow_mut();
        if stack.len() >= MAX_EVAL_DEPTH {
            let frames = stack.iter().map(Ulid::to_string).collect();
            return Err(recursion_limit(MAX_EVAL_DEPTH, frames));
        }
        stack.push(id);
        Ok(EvalEntry)
    })
}

/// Current reactive evaluation depth on this thread.
pub fn eval_depth() -> usize {
    EVAL_STACK.with(|stack| stack.borrow().len())
}

/// RAII frame on the evaluation stack.
pub struct EvalEntry;

impl Drop for EvalEntry {
    fn drop(&mut self) {
        EVAL_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// Mark a node as notifying. `None` means a notify for this node is
/// already in flight on this thread and the caller should back off.
pub fn begin_notify(id: Ulid) -> Option<NotifyEntry> {
    NOTIFYING.with(|set| {
        if set.borrow_mut().insert(id) {
            Some(NotifyEntry { id })
        } else {
            None
        }
    })
}

/// RAII membership in the in-flight notify set.
pub struct NotifyEntry {
    id: Ulid,
}

impl Drop for NotifyEntry {
    fn drop(&mut self) {
        NOTIFYING.with(|set| {
            set.borrow_mut().remove(&self.id);
        });
    }
}
