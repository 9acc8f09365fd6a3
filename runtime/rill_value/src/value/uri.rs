//! The URI variant: a resource address bound to a backend handler.
//!
//! A `UriValue` couples the address text with an optional per-scheme
//! [`UriHandler`] and a lifecycle state machine. Side-effecting operations
//! go through [`UriValue::with_running`], which auto-starts a fresh
//! resource on first access and rejects any other non-running state.
//!
//! The handler is owned exclusively by this value; handlers are never
//! shared across values.

use parking_lot::Mutex;
use std::sync::Arc;

use rill_resource::{
    HookResult, LifecycleError, LifecycleHooks, Signal, State, StateMachine,
};

use crate::errors::{exception, invalid_operation, wrong_state, ValueError, ValueResult};
use crate::value::{Listener, Type, Value};

/// Per-scheme I/O backend for URI-addressed resources.
///
/// Lifecycle hooks default to no-ops; data operations default to the URI
/// invalid-operation error so a backend only implements what its scheme
/// supports.
#[allow(unused_variables)]
pub trait UriHandler: Send + Sync {
    fn init(&self) -> Result<(), ValueError> {
        Ok(())
    }
    fn start(&self) -> Result<(), ValueError> {
        Ok(())
    }
    fn stop(&self) -> Result<(), ValueError> {
        Ok(())
    }
    fn pause(&self) -> Result<(), ValueError> {
        Ok(())
    }
    fn unpause(&self) -> Result<(), ValueError> {
        Ok(())
    }
    fn destroy(&self) -> Result<(), ValueError> {
        Ok(())
    }

    fn get(&self, key: &Value) -> ValueResult {
        Err(invalid_operation(Type::Uri, "get"))
    }
    fn set(&self, key: &Value, value: &Value) -> ValueResult {
        Err(invalid_operation(Type::Uri, "set"))
    }
    fn remove(&self, key: &Value) -> ValueResult {
        Err(invalid_operation(Type::Uri, "remove"))
    }
    fn append(&self, value: &Value) -> ValueResult {
        Err(invalid_operation(Type::Uri, "append"))
    }
    fn prepend(&self, value: &Value) -> ValueResult {
        Err(invalid_operation(Type::Uri, "prepend"))
    }
    fn insert(&self, index: usize, value: &Value) -> ValueResult {
        Err(invalid_operation(Type::Uri, "insert"))
    }
    fn read(&self, blocking: bool, mutating: bool) -> ValueResult {
        Err(invalid_operation(Type::Uri, "read"))
    }
    fn write(&self, value: &Value, blocking: bool, mutating: bool) -> ValueResult {
        Err(invalid_operation(Type::Uri, "write"))
    }
    fn subscribe(&self, id: &str, listener: Listener) -> ValueResult {
        Err(invalid_operation(Type::Uri, "subscribe"))
    }
    fn unsubscribe(&self, id: &str) -> ValueResult {
        Err(invalid_operation(Type::Uri, "unsubscribe"))
    }
    fn all(&self) -> ValueResult {
        Err(invalid_operation(Type::Uri, "all"))
    }
    fn drain(&self) -> ValueResult {
        Err(invalid_operation(Type::Uri, "drain"))
    }
    fn size(&self) -> ValueResult {
        Err(invalid_operation(Type::Uri, "size"))
    }
}

/// Bridges handler lifecycle callbacks into state-machine hooks.
struct HandlerHooks {
    handler: Option<Arc<dyn UriHandler>>,
}

impl HandlerHooks {
    fn call(
        &mut self,
        hook: &'static str,
        f: impl FnOnce(&dyn UriHandler) -> Result<(), ValueError>,
    ) -> HookResult {
        match &self.handler {
            Some(handler) => f(handler.as_ref()).map_err(|e| LifecycleError::HookFailed {
                hook,
                message: e.message,
            }),
            None => Ok(()),
        }
    }
}

impl LifecycleHooks for HandlerHooks {
    fn on_init(&mut self) -> HookResult {
        self.call("init", UriHandler::init)
    }
    fn on_start(&mut self) -> HookResult {
        self.call("start", UriHandler::start)
    }
    fn on_stop(&mut self) -> HookResult {
        self.call("stop", UriHandler::stop)
    }
    fn on_pause(&mut self) -> HookResult {
        self.call("pause", UriHandler::pause)
    }
    fn on_unpause(&mut self) -> HookResult {
        self.call("unpause", UriHandler::unpause)
    }
    fn on_destroy(&mut self) -> HookResult {
        self.call("destroy", UriHandler::destroy)
    }
}

/// A URI payload: address text, scheme, handler, lifecycle machine.
pub struct UriValue {
    text: String,
    scheme: String,
    handler: Option<Arc<dyn UriHandler>>,
    machine: Mutex<StateMachine<HandlerHooks>>,
}

impl UriValue {
    /// Parse `scheme:rest`, binding a backend handler.
    pub fn new(
        text: impl Into<String>,
        handler: Option<Arc<dyn UriHandler>>,
    ) -> Result<UriValue, ValueError> {
        let text = text.into();
        let scheme = text
            .split_once(':')
            .map(|(scheme, _)| scheme.to_string())
            .ok_or_else(|| exception(format!("uri without scheme: {text}")))?;
        Ok(UriValue {
            text,
            scheme,
            handler: handler.clone(),
            machine: Mutex::new(StateMachine::new(HandlerHooks { handler })),
        })
    }

    /// The full address text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The scheme prefix.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Current lifecycle state.
    pub fn state(&self) -> State {
        self.machine.lock().state()
    }

    /// Deliver a lifecycle signal.
    pub fn fire(&self, signal: Signal) -> Result<State, ValueError> {
        self.machine
            .lock()
            .fire(signal)
            .map_err(|e| wrong_state(e.to_string()))
    }

    /// Run an operation that requires a running resource.
    ///
    /// Fresh resources auto-start (`INITIAL → RUNNING`); any other
    /// non-running state is a wrong-state error, as is a URI with no
    /// bound handler.
    pub fn with_running<R>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&dyn UriHandler) -> Result<R, ValueError>,
    ) -> Result<R, ValueError> {
        self.machine
            .lock()
            .ensure_running()
            .map_err(|e| wrong_state(e.to_string()))?;
        match &self.handler {
            Some(handler) => f(handler.as_ref()),
            None => Err(invalid_operation(Type::Uri, operation)),
        }
    }
}

impl PartialEq for UriValue {
    /// URIs compare by address; handler identity never participates.
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl std::fmt::Debug for UriValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "UriValue({}, {}, handler: {})",
            self.text,
            self.state().name(),
            self.handler.is_some()
        )
    }
}
