//! Resource lifecycle state machine for stateful runtime values.
//!
//! Stateful values (URI-backed resources, subscriptions) gate their
//! side-effecting operations behind a small finite-state machine:
//!
//! ```text
//! INITIAL ──CREATE/STOP──▶ STOPPED ◀──STOP── RUNNING ◀──UNPAUSE── PAUSED
//!    │                        │                 ▲                     ▲
//!    │                        └─────START───────┘────────PAUSE───────┘
//!    └──────DESTROY──▶ DESTROYED (terminal)
//! ```
//!
//! Transitions fire entry/exit hooks on a [`LifecycleHooks`] object owned by
//! the machine: leaving `INITIAL` initializes the backing handler, entering
//! `RUNNING` starts it, leaving `RUNNING` stops it, the `PAUSED` boundary
//! fires pause/unpause, and entering `DESTROYED` tears the handler down.
//!
//! The machine is generic over its hook object and carries no value-model
//! dependency, so it can be tested in isolation. It is not thread-safe;
//! callers serialize signal delivery to a given resource.


use thiserror::Error;
use tracing::debug;

/// Lifecycle states of a stateful resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum State {
    /// Freshly constructed; the backing handler has not been initialized.
    Initial,
    /// Initialized but not started (or stopped after running).
    Stopped,
    /// Started; side-effecting operations are permitted.
    Running,
    /// Temporarily suspended; resumable via [`Signal::Unpause`].
    Paused,
    /// Terminal. No signal except a reentrant DESTROY is accepted.
    Destroyed,
}

impl State {
    /// Short uppercase name used in error messages and logs.
    pub fn name(self) -> &'static str {
        match self {
            State::Initial => "INITIAL",
            State::Stopped => "STOPPED",
            State::Running => "RUNNING",
            State::Paused => "PAUSED",
            State::Destroyed => "DESTROYED",
        }
    }
}

/// Signals that drive lifecycle transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Signal {
    Create,
    Start,
    Stop,
    Pause,
    Unpause,
    Destroy,
}

impl Signal {
    /// Short uppercase name used in error messages and logs.
    pub fn name(self) -> &'static str {
        match self {
            Signal::Create => "CREATE",
            Signal::Start => "START",
            Signal::Stop => "STOP",
            Signal::Pause => "PAUSE",
            Signal::Unpause => "UNPAUSE",
            Signal::Destroy => "DESTROY",
        }
    }
}

/// Error raised by illegal transitions, wrong-state operations, or hooks.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
    /// The signal is not legal in the current state per the transition table.
    #[error("signal {} is not legal in state {}", signal.name(), state.name())]
    IllegalTransition { state: State, signal: Signal },

    /// An operation required a specific state the resource is not in.
    ///
    /// Raised by [`StateMachine::ensure_running`] for any state other than
    /// `INITIAL` (which auto-starts) or `RUNNING`.
    #[error("resource is {} but the operation requires {}", state.name(), required.name())]
    WrongState { state: State, required: State },

    /// A lifecycle hook reported failure; the transition did not complete.
    #[error("{hook} hook failed: {message}")]
    HookFailed { hook: &'static str, message: String },
}

/// Result type for hook implementations.
pub type HookResult = Result<(), LifecycleError>;

/// Entry/exit hooks fired by the state machine.
///
/// All hooks default to no-ops so handlers only implement the boundaries
/// they care about. A hook returning `Err` aborts the transition and leaves
/// the machine in its previous state.
pub trait LifecycleHooks {
    /// Fired once when leaving `INITIAL`.
    fn on_init(&mut self) -> HookResult {
        Ok(())
    }

    /// Fired when entering `RUNNING`.
    fn on_start(&mut self) -> HookResult {
        Ok(())
    }

    /// Fired when leaving `RUNNING`.
    fn on_stop(&mut self) -> HookResult {
        Ok(())
    }

    /// Fired when entering `PAUSED`.
    fn on_pause(&mut self) -> HookResult {
        Ok(())
    }

    /// Fired when leaving `PAUSED`.
    fn on_unpause(&mut self) -> HookResult {
        Ok(())
    }

    /// Fired when entering `DESTROYED`.
    fn on_destroy(&mut self) -> HookResult {
        Ok(())
    }
}

/// Hooks that do nothing. Useful for resources with no backing handler.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopHooks;

impl LifecycleHooks for NoopHooks {}

/// The lifecycle state machine.
///
/// Owns its hook object exclusively; no cross-resource sharing of a handler.
#[derive(Debug)]
pub struct StateMachine<H> {
    state: State,
    hooks: H,
}

impl<H: LifecycleHooks> StateMachine<H> {
    /// Create a machine in `INITIAL` with the given hooks.
    pub fn new(hooks: H) -> Self {
        StateMachine {
            state: State::Initial,
            hooks,
        }
    }

    /// Current state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Borrow the hook object.
    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    /// Mutably borrow the hook object.
    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    /// Fire a signal, running exit hooks for the old state and entry hooks
    /// for the new one.
    ///
    /// Reentrant transitions (`STOP` while stopped, `START` while running,
    /// `PAUSE` while paused, `DESTROY` while destroyed) are accepted and do
    /// not re-fire hooks. Anything absent from the table is
    /// [`LifecycleError::IllegalTransition`].
    pub fn fire(&mut self, signal: Signal) -> Result<State, LifecycleError> {
        let from = self.state;
        let to = transition(from, signal).ok_or(LifecycleError::IllegalTransition {
            state: from,
            signal,
        })?;

        if to == from {
            // Reentrant: stay put, no hooks.
            return Ok(to);
        }

        debug!(from = from.name(), to = to.name(), signal = signal.name(), "lifecycle transition");

        // Exit hooks first, then entry hooks. A hook failure aborts the
        // transition with the machine still in `from`.
        match from {
            State::Initial => self.hooks.on_init()?,
            State::Running => self.hooks.on_stop()?,
            State::Paused => self.hooks.on_unpause()?,
            State::Stopped | State::Destroyed => {}
        }
        match to {
            State::Running => self.hooks.on_start()?,
            State::Paused => self.hooks.on_pause()?,
            State::Destroyed => self.hooks.on_destroy()?,
            State::Initial | State::Stopped => {}
        }

        self.state = to;
        Ok(to)
    }

    /// Require the resource to be running, auto-starting from `INITIAL`.
    ///
    /// First access to a fresh resource transitions `INITIAL → RUNNING`
    /// (firing init then start). Any other non-running state is
    /// [`LifecycleError::WrongState`].
    pub fn ensure_running(&mut self) -> Result<(), LifecycleError> {
        match self.state {
            State::Running => Ok(()),
            State::Initial => {
                self.fire(Signal::Start)?;
                Ok(())
            }
            state => Err(LifecycleError::WrongState {
                state,
                required: State::Running,
            }),
        }
    }
}

/// The transition table. `None` means the signal is illegal in that state.
fn transition(state: State, signal: Signal) -> Option<State> {
    use Signal::{Create, Destroy, Pause, Start, Stop, Unpause};
    use State::{Destroyed, Initial, Paused, Running, Stopped};

    match (state, signal) {
        (Initial, Create | Stop) => Some(Stopped),
        (Initial, Start) => Some(Running),
        (Initial, Pause) => Some(Paused),
        (Initial, Destroy) => Some(Destroyed),

        (Stopped, Start) => Some(Running),
        (Stopped, Stop) => Some(Stopped),
        (Stopped, Destroy) => Some(Destroyed),

        (Running, Stop) => Some(Stopped),
        (Running, Start) => Some(Running),
        (Running, Pause) => Some(Paused),
        (Running, Destroy) => Some(Destroyed),

        (Paused, Stop) => Some(Stopped),
        (Paused, Unpause) => Some(Running),
        (Paused, Pause) => Some(Paused),
        (Paused, Destroy) => Some(Destroyed),

        (Destroyed, Destroy) => Some(Destroyed),

        _ => None,
    }
}
