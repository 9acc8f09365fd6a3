//! Lexical scopes shared by the evaluator and reactive nodes.
//!
//! A `Scope` is a thread-safe chain link: a variable table plus a parent
//! pointer. Reactive nodes carry scopes in their metadata and re-enter them
//! around pipe execution; the evaluator pushes and pops them as blocks open
//! and close. Unlike a single-threaded interpreter environment, values here
//! are shared across threads, so the table sits behind a `parking_lot`
//! RwLock rather than `Rc<RefCell>`.
//!
//! The "current scope" is a thread-local stack. Entry returns an RAII guard
//! so push/pop stay paired on every exit path, including unwinding.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::sync::Arc;
use ulid::Ulid;

use crate::plugins::ErrorHandler;
use crate::value::Value;

struct ScopeInner {
    id: Ulid,
    label: String,
    parent: Option<Scope>,
    vars: RwLock<FxHashMap<String, Value>>,
    error_handler: RwLock<Option<Arc<dyn ErrorHandler>>>,
}

/// A lexical scope: named bindings plus a parent chain.
#[derive(Clone)]
pub struct Scope {
    inner: Arc<ScopeInner>,
}

impl Scope {
    /// A fresh root scope.
    pub fn root() -> Self {
        Scope::with_parent("root", None)
    }

    /// A child of this scope.
    pub fn child(&self, label: impl Into<String>) -> Self {
        Scope::with_parent(label, Some(self.clone()))
    }

    fn with_parent(label: impl Into<String>, parent: Option<Scope>) -> Self {
        Scope {
            inner: Arc::new(ScopeInner {
                id: Ulid::new(),
                label: label.into(),
                parent,
                vars: RwLock::new(FxHashMap::default()),
                error_handler: RwLock::new(None),
            }),
        }
    }

    pub fn id(&self) -> Ulid {
        self.inner.id
    }

    pub fn label(&self) -> String {
        self.inner.label.clone()
    }

    pub fn parent(&self) -> Option<Scope> {
        self.inner.parent.clone()
    }

    /// Look a name up, walking the parent chain.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.inner.vars.read().get(name) {
            return Some(value.clone());
        }
        self.inner.parent.as_ref().and_then(|p| p.get(name))
    }

    /// Define (or shadow) a binding in this scope.
    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.inner.vars.write().insert(name.into(), value);
    }

    /// Reassign an existing binding, walking the chain. Returns `false`
    /// when no scope defines the name.
    pub fn update(&self, name: &str, value: Value) -> bool {
        {
            let mut vars = self.inner.vars.write();
            if vars.contains_key(name) {
                vars.insert(name.to_string(), value);
                return true;
            }
        }
        match &self.inner.parent {
            Some(parent) => parent.update(name, value),
            None => false,
        }
    }

    /// Bind an error handler to this scope.
    pub fn set_error_handler(&self, handler: Arc<dyn ErrorHandler>) {
        *self.inner.error_handler.write() = Some(handler);
    }

    /// The nearest error handler on the chain, if any.
    pub fn error_handler(&self) -> Option<Arc<dyn ErrorHandler>> {
        if let Some(handler) = self.inner.error_handler.read().as_ref() {
            return Some(Arc::clone(handler));
        }
        self.inner.parent.as_ref().and_then(Scope::error_handler)
    }

    /// Whether two handles name the same scope.
    pub fn same(&self, other: &Scope) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Scope({}, {})", self.inner.label, self.inner.id)
    }
}

thread_local! {
    static CURRENT: RefCell<Vec<Scope>> = const { RefCell::new(Vec::new()) };
}

/// The innermost scope entered on this thread, if any.
pub fn current_scope() -> Option<Scope> {
    CURRENT.with(|stack| stack.borrow().last().cloned())
}

/// Enter a scope on this thread. The returned guard leaves it on drop.
pub fn enter_scope(scope: Scope) -> ScopeEntry {
    CURRENT.with(|stack| stack.borrow_mut().push(scope));
    ScopeEntry { count: 1 }
}

/// Enter several scopes in order (a reactive node's attachment list).
/// The guard leaves them in reverse order on drop.
pub fn enter_scopes(scopes: &[Scope]) -> ScopeEntry {
    CURRENT.with(|stack| {
        let mut stack = stack.borrow_mut();
        for scope in scopes {
            stack.push(scope.clone());
        }
    });
    ScopeEntry {
        count: scopes.len(),
    }
}

/// RAII guard pairing scope entry with exit.
pub struct ScopeEntry {
    count: usize,
}

impl Drop for ScopeEntry {
    fn drop(&mut self) {
        CURRENT.with(|stack| {
            let mut stack = stack.borrow_mut();
            for _ in 0..self.count {
                stack.pop();
            }
        });
    }
}
