//! Rill Value - the polymorphic value model and reactive node.
//!
//! This crate is the runtime core of the Rill expression language:
//!
//! - `value`: the closed variant set (`Value`), factory methods, and
//!   capability probes
//! - `ops` / `collections` / `compare` / `cast`: the uniform operation
//!   contract — arithmetic coercion, collection access, total ordering,
//!   and the casting matrix, dispatched by `match` over the variant tags
//! - `value::lazy`: the reactive node wrapping deferred computations, with
//!   listener fan-out, bounded reactive recursion, and scope re-entry
//! - `factory`: normalization of host data into canonical variants
//! - `json`: the `$type`-tagged canonical JSON projection
//! - `errors`: typed failure kinds plus the quiet/fail-fast split
//! - `plugins` / `config`: the collaborator seams (executor, scheduler,
//!   error handler, type learner) and process-wide configuration
//!
//! The evaluator layer lives in `rill_eval`; the lifecycle state machine
//! backing URI values lives in `rill_resource`.

mod cast;
mod collections;
mod compare;
pub mod config;
pub mod errors;
pub mod factory;
mod guards;
pub mod json;
mod meta;
mod ops;
pub mod plugins;
pub mod scope;
mod stack;
mod value;

pub use compare::compare_values;
pub use errors::{
    assertion_failed, bad_regex, constraint_violation, exception, invalid_cast,
    invalid_operation, metadata_immutable, multiplier_too_large, recursion_limit,
    string_too_large, wrong_state, ErrorKind, SourceLocation, ValueError, ValueResult,
};
pub use factory::{from_json, from_text, value_of};
pub use guards::MAX_EVAL_DEPTH;
pub use meta::MetaMap;
pub use ops::MAX_MULTIPLIER;
pub use plugins::{
    ErrorHandler, Executor, Scheduler, Task, TaskId, TypeLearner, TypePrediction,
    ValueFuture,
};
pub use scope::{current_scope, enter_scope, enter_scopes, Scope, ScopeEntry};
pub use stack::ensure_sufficient_stack;
pub use value::{
    Heap, IntVal, LazyValue, Listener, Pipe, QueueValue, RangeValue, Type, UriHandler,
    UriValue, Value, Variant, MAX_FIX_DEPTH,
};
