//! Process-wide runtime configuration and collaborator registry.
//!
//! The failure mode (fail-fast vs quiet) is process-wide by design, not
//! per-call. Collaborators registered here are consulted by the reactive
//! dispatch boundary; when none is registered a built-in policy applies.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::errors::{SourceLocation, ValueError, ValueResult};
use crate::plugins::{ErrorHandler, TypeLearner};
use crate::scope::{current_scope, Scope};
use crate::value::Value;

static FAIL_FAST: AtomicBool = AtomicBool::new(true);

static ERROR_HANDLER: RwLock<Option<Arc<dyn ErrorHandler>>> = RwLock::new(None);
static TYPE_LEARNER: RwLock<Option<Arc<dyn TypeLearner>>> = RwLock::new(None);

/// Whether errors propagate immediately (`true`) or become ERROR values.
pub fn fail_fast() -> bool {
    FAIL_FAST.load(Ordering::Relaxed)
}

/// Switch the process-wide failure mode.
pub fn set_fail_fast(enabled: bool) {
    FAIL_FAST.store(enabled, Ordering::Relaxed);
}

/// Register the process-wide error handler.
pub fn set_error_handler(handler: Arc<dyn ErrorHandler>) {
    *ERROR_HANDLER.write() = Some(handler);
}

/// Register the process-wide type learner.
pub fn set_type_learner(learner: Arc<dyn TypeLearner>) {
    *TYPE_LEARNER.write() = Some(learner);
}

/// The registered type learner, if any.
pub fn type_learner() -> Option<Arc<dyn TypeLearner>> {
    TYPE_LEARNER.read().clone()
}

/// Route an error through the handler bound to the current context.
///
/// Resolution order: the innermost scope handler on this thread, then the
/// process-wide handler, then the built-in policy — propagate when
/// fail-fast, otherwise absorb into an ERROR value. Errors whose kind is
/// not quietable (assertions, recursion exhaustion) always propagate.
pub fn handle_error(location: Option<&SourceLocation>, error: ValueError) -> ValueResult {
    if !error.quietable() {
        return Err(error);
    }

    let scope = current_scope();
    if let Some(handler) = scope.as_ref().and_then(Scope::error_handler) {
        return handler.handle(scope.as_ref(), location, error);
    }
    if let Some(handler) = ERROR_HANDLER.read().clone() {
        return handler.handle(scope.as_ref(), location, error);
    }

    if fail_fast() {
        Err(error)
    } else {
        Ok(Value::error(error))
    }
}
