//! Scope-stack management for the evaluator.
//!
//! The evaluator opens a child scope per block and must close it on every
//! exit path — early returns, `?`, unwinding. [`Environment::scoped`]
//! returns an RAII guard that pops on drop, so push and pop cannot drift
//! apart.

use rill_value::{Scope, Value};
use std::ops::{Deref, DerefMut};

/// The evaluator's scope stack. The bottom scope is the program root.
pub struct Environment {
    stack: Vec<Scope>,
}

impl Environment {
    /// A fresh environment with a root scope.
    pub fn new() -> Self {
        Environment {
            stack: vec![Scope::root()],
        }
    }

    /// An environment rooted at an existing scope (module embedding).
    pub fn with_root(root: Scope) -> Self {
        Environment { stack: vec![root] }
    }

    /// The innermost scope.
    pub fn current(&self) -> &Scope {
        match self.stack.last() {
            Some(scope) => scope,
            // The root scope is never popped.
            None => unreachable!("environment lost its root scope"),
        }
    }

    /// Current nesting depth, root included.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Define a binding in the innermost scope.
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.current().set(name, value);
    }

    /// Look a name up through the chain.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.current().get(name)
    }

    /// Reassign an existing binding. Returns `false` if undefined.
    pub fn assign(&self, name: &str, value: Value) -> bool {
        self.current().update(name, value)
    }

    /// Open a child scope, closed again when the guard drops.
    pub fn scoped(&mut self, label: impl Into<String>) -> ScopedEnv<'_> {
        let child = self.current().child(label);
        self.stack.push(child);
        ScopedEnv { environment: self }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::new()
    }
}

/// RAII guard over an open block scope.
///
/// Derefs to [`Environment`], so evaluation code uses it exactly like the
/// environment itself. Dropping it pops the scope, panics included.
pub struct ScopedEnv<'env> {
    environment: &'env mut Environment,
}

impl Drop for ScopedEnv<'_> {
    fn drop(&mut self) {
        self.environment.stack.pop();
    }
}

impl Deref for ScopedEnv<'_> {
    type Target = Environment;

    fn deref(&self) -> &Environment {
        self.environment
    }
}

impl DerefMut for ScopedEnv<'_> {
    fn deref_mut(&mut self) -> &mut Environment {
        self.environment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn blocks_shadow_and_restore() {
        let mut env = Environment::new();
        env.define("x", Value::int(1));
        {
            let scoped = env.scoped("block");
            scoped.define("x", Value::int(2));
            assert_eq!(scoped.get("x"), Some(Value::int(2)));
        }
        assert_eq!(env.get("x"), Some(Value::int(1)));
        assert_eq!(env.depth(), 1);
    }

    #[test]
    fn assign_writes_through_to_outer_scopes() {
        let mut env = Environment::new();
        env.define("x", Value::int(1));
        {
            let scoped = env.scoped("block");
            assert!(scoped.assign("x", Value::int(5)));
        }
        assert_eq!(env.get("x"), Some(Value::int(5)));
    }

    #[test]
    fn nested_guards_unwind_in_order() {
        let mut env = Environment::new();
        {
            let mut outer = env.scoped("outer");
            {
                let inner = outer.scoped("inner");
                assert_eq!(inner.depth(), 3);
            }
            assert_eq!(outer.depth(), 2);
        }
        assert_eq!(env.depth(), 1);
    }
}
