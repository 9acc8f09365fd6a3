//! The reactive node: a deferred computation behind the value interface.
//!
//! A `LazyValue` owns a pipe — the boxed computation an expression compiles
//! to — plus a listener registry and a cached type prediction. It holds no
//! result: every [`execute`](LazyValue::execute) re-runs the pipe, which is
//! what lets a dependency graph pick up upstream changes on re-fix.
//!
//! Execution always crosses the guarded dispatch boundary: the thread-local
//! evaluation stack bounds reactive re-entry, attached lexical scopes are
//! pushed around the call (and popped on every exit path), and pipe
//! failures are routed to the error handler bound to the current scope.

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::trace;
use ulid::Ulid;

use crate::config;
use crate::errors::ValueResult;
use crate::guards;
use crate::meta::MetaMap;
use crate::plugins::TypePrediction;
use crate::scope;
use crate::stack::ensure_sufficient_stack;
use crate::value::Value;

/// The deferred computation. Receives the incoming value (void unless the
/// node sits mid-pipeline) and produces the node's current value.
pub type Pipe = Arc<dyn Fn(&Value) -> ValueResult + Send + Sync>;

/// A change listener. Called with each freshly produced value.
pub type Listener = Arc<dyn Fn(&Value) + Send + Sync>;

/// A reactive node wrapping a pipe.
///
/// Cloning shares the node (same identity, same listeners); use
/// [`duplicate`](LazyValue::duplicate) for an independent copy.
#[derive(Clone)]
pub struct LazyValue {
    id: Ulid,
    pipe: Pipe,
    listeners: Arc<RwLock<IndexMap<String, Listener>>>,
    prediction: Arc<Mutex<Option<TypePrediction>>>,
}

impl LazyValue {
    pub(crate) fn new(pipe: Pipe) -> Self {
        LazyValue {
            id: Ulid::new(),
            pipe,
            listeners: Arc::new(RwLock::new(IndexMap::new())),
            prediction: Arc::new(Mutex::new(None)),
        }
    }

    /// The node's identity.
    pub fn id(&self) -> Ulid {
        self.id
    }

    /// An independent node over the same pipe: fresh identity, empty
    /// listener registry, cold prediction cache.
    pub(crate) fn duplicate(&self) -> LazyValue {
        LazyValue::new(Arc::clone(&self.pipe))
    }

    /// Run the pipe once through the dispatch boundary.
    ///
    /// Pushes this node onto the thread-local evaluation stack (bounding
    /// reactive recursion), re-enters any scopes attached in `meta`, and
    /// hands pipe failures to the scope-bound error handler.
    pub(crate) fn execute(&self, meta: Option<&MetaMap>) -> ValueResult {
        let _frame = guards::push_eval(self.id)?;
        let scopes = meta.map(MetaMap::scopes).unwrap_or_default();
        let _entered = scope::enter_scopes(&scopes);

        trace!(node = %self.id, depth = guards::eval_depth(), "executing pipe");
        let outcome = ensure_sufficient_stack(|| (self.pipe)(&Value::VOID));
        match outcome {
            Ok(value) => Ok(value),
            Err(error) => {
                let location = meta.and_then(MetaMap::location);
                config::handle_error(location.as_ref(), error)
            }
        }
    }

    /// Register a listener under a generated id; returns the id.
    pub(crate) fn listen(&self, listener: Listener) -> String {
        self.listen_with_id(Ulid::new().to_string(), listener)
    }

    /// Register a listener under an explicit id, replacing any previous
    /// listener with that id (registration order is kept from the first
    /// insertion).
    pub(crate) fn listen_with_id(&self, id: String, listener: Listener) -> String {
        self.listeners.write().insert(id.clone(), listener);
        id
    }

    /// Remove a listener; unknown ids are ignored.
    pub(crate) fn cancel(&self, id: &str) {
        self.listeners.write().shift_remove(id);
    }

    /// Execute the pipe and fan the fresh value out, in registration
    /// order. A notify already in flight for this node on this thread
    /// suppresses the nested one.
    pub(crate) fn notify(&self, meta: Option<&MetaMap>) -> ValueResult {
        let Some(_inflight) = guards::begin_notify(self.id) else {
            trace!(node = %self.id, "re-entrant notify suppressed");
            return Ok(Value::void());
        };

        let value = self.execute(meta)?;
        // Snapshot so listeners may register or cancel without deadlock.
        let snapshot: SmallVec<[Listener; 4]> =
            self.listeners.read().values().cloned().collect();
        for listener in &snapshot {
            listener(&value);
        }
        Ok(value)
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// Consult the type learner once and cache its answer.
    pub(crate) fn predict(&self) -> Option<TypePrediction> {
        let mut cached = self.prediction.lock();
        if cached.is_none() {
            let learner = config::type_learner()?;
            *cached = learner.predict(&self.id.to_string(), &[]);
        }
        *cached
    }
}

impl std::fmt::Debug for LazyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LazyValue({}, {} listeners)", self.id, self.listener_count())
    }
}
