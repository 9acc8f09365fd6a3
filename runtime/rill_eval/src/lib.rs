//! Rill Eval - evaluator-level operations and default collaborators.
//!
//! Sits above `rill_value`:
//!
//! - `environment`: the evaluator's scope stack with RAII block guards
//! - `exec`: block multiplication, ordered (optionally parallel) mapping,
//!   and assertions
//! - `executor`: the default thread executor behind `fork` and background
//!   evaluation
//! - `scheduler`: the default interval scheduler behind `every ... until`
//! - `error_handler`: the default fail-fast/quiet policy
//! - `learner`: the default frequency-counting type learner
//!
//! The collaborator implementations register through `rill_value::config`;
//! hosts may swap any of them for their own.

mod environment;
mod error_handler;
mod exec;
mod executor;
mod learner;
mod scheduler;

pub use environment::{Environment, ScopedEnv};
pub use error_handler::DefaultErrorHandler;
pub use exec::{assert_equal, assert_truthy, each, multiply_block, MAX_MULTIPLY};
pub use executor::ThreadExecutor;
pub use learner::CountingTypeLearner;
pub use scheduler::{run_every, IntervalScheduler};

/// Install every default collaborator process-wide.
pub fn install_defaults() {
    DefaultErrorHandler::install();
    CountingTypeLearner::install();
}
