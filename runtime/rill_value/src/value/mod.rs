//! The polymorphic runtime value.
//!
//! # Shape
//!
//! `Value` is a thin struct: a closed [`Variant`] sum plus an optional
//! shared [`MetaMap`]. Every datum the language touches — booleans,
//! numbers, strings, dates, collections, URIs, queues, deferred
//! computations — is one of these variants, and every variant answers the
//! same uniform operation contract (arithmetic in [`crate::ops`],
//! comparison in [`crate::compare`], casting in [`crate::cast`], collection
//! access in [`crate::collections`]).
//!
//! # Allocation discipline
//!
//! Heap payloads live behind [`Heap`], whose constructor is crate-private:
//! the factory methods on `Value` are the only mint. Canonical constants
//! (`TRUE`, `FALSE`, `VOID`, zero) are shared consts; the factory collapses
//! error-free host values onto them.
//!
//! # Reactivity
//!
//! A deferred computation is just another variant ([`Variant::Lazy`]).
//! Operations that need a concrete value call [`Value::demand`], which
//! forces the node through the guarded dispatch boundary; the small
//! allowlist of structural operations (metadata, listen/notify/cancel,
//! `fix`, `copy`, error queries) works on the node itself.

mod heap;
mod lazy;
mod num;
mod range;
mod queue;
mod uri;

pub use heap::Heap;
pub use lazy::{LazyValue, Listener, Pipe};
pub use num::IntVal;
pub use queue::QueueValue;
pub use range::RangeValue;
pub use uri::{UriHandler, UriValue};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use num_bigint::BigInt;
use std::sync::Arc;

use crate::errors::{ValueError, ValueResult};
use crate::guards;
use crate::meta::MetaMap;
use crate::plugins::TypePrediction;
use crate::stack::ensure_sufficient_stack;

/// Type tags for the closed variant set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Void,
    Null,
    Boolean,
    Integer,
    Decimal,
    String,
    Date,
    Infinity,
    Error,
    List,
    Map,
    Range,
    Queue,
    Uri,
    Sequence,
    /// The wildcard tag used by type hints and NULL values.
    Any,
}

impl Type {
    /// Stable uppercase name, as used in error codes and the JSON projection.
    pub fn name(self) -> &'static str {
        match self {
            Type::Void => "VOID",
            Type::Null => "NULL",
            Type::Boolean => "BOOLEAN",
            Type::Integer => "INTEGER",
            Type::Decimal => "DECIMAL",
            Type::String => "STRING",
            Type::Date => "DATE",
            Type::Infinity => "INFINITY",
            Type::Error => "ERROR",
            Type::List => "LIST",
            Type::Map => "MAP",
            Type::Range => "RANGE",
            Type::Queue => "QUEUE",
            Type::Uri => "URI",
            Type::Sequence => "SEQUENCE",
            Type::Any => "ANY",
        }
    }

    /// Parse a tag name produced by [`Type::name`].
    pub fn from_name(name: &str) -> Option<Type> {
        Some(match name {
            "VOID" => Type::Void,
            "NULL" => Type::Null,
            "BOOLEAN" => Type::Boolean,
            "INTEGER" => Type::Integer,
            "DECIMAL" => Type::Decimal,
            "STRING" => Type::String,
            "DATE" => Type::Date,
            "INFINITY" => Type::Infinity,
            "ERROR" => Type::Error,
            "LIST" => Type::List,
            "MAP" => Type::Map,
            "RANGE" => Type::Range,
            "QUEUE" => Type::Queue,
            "URI" => Type::Uri,
            "SEQUENCE" => Type::Sequence,
            "ANY" => Type::Any,
            _ => return None,
        })
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One concrete case of the value sum.
#[derive(Clone)]
pub enum Variant {
    /// Absence of a value.
    Void,
    /// An explicit null (tagged ANY in the type system).
    Null,
    Bool(bool),
    Int(IntVal),
    Decimal(f64),
    Str(Heap<String>),
    Date(DateTime<Utc>),
    /// Signed infinity, produced by division by zero among others.
    Infinity { negative: bool },
    /// A failure travelling as a value (quiet mode).
    Error(Heap<ValueError>),
    List(Heap<Vec<Value>>),
    /// Insertion-ordered string-keyed map.
    Map(Heap<IndexMap<String, Value>>),
    Range(Heap<RangeValue>),
    Queue(Heap<QueueValue>),
    Uri(Heap<UriValue>),
    /// An ordered multi-value pipeline result; list-like but distinct.
    Sequence(Heap<Vec<Value>>),
    /// A deferred computation behind the uniform interface.
    Lazy(LazyValue),
}

/// The uniform runtime value: a variant plus optional shared metadata.
#[derive(Clone)]
pub struct Value {
    variant: Variant,
    meta: Option<Arc<MetaMap>>,
}

/// Depth passed by `fix_deep`; in practice "unbounded".
pub const MAX_FIX_DEPTH: u32 = u32::MAX;

// Construction: canonical constants and factory methods.

impl Value {
    /// The canonical true.
    pub const TRUE: Value = Value::from_variant(Variant::Bool(true));
    /// The canonical false.
    pub const FALSE: Value = Value::from_variant(Variant::Bool(false));
    /// The canonical void.
    pub const VOID: Value = Value::from_variant(Variant::Void);
    /// The canonical null.
    pub const NULL: Value = Value::from_variant(Variant::Null);
    /// The canonical integer zero.
    pub const ZERO: Value = Value::from_variant(Variant::Int(IntVal::ZERO));

    const fn from_variant(variant: Variant) -> Self {
        Value {
            variant,
            meta: None,
        }
    }

    pub fn void() -> Self {
        Value::VOID
    }

    pub fn null() -> Self {
        Value::NULL
    }

    pub fn boolean(value: bool) -> Self {
        if value {
            Value::TRUE
        } else {
            Value::FALSE
        }
    }

    pub fn int(value: i64) -> Self {
        Value::from_variant(Variant::Int(IntVal::new(value)))
    }

    pub fn big_int(value: BigInt) -> Self {
        Value::from_variant(Variant::Int(IntVal::from_big(value)))
    }

    pub(crate) fn int_val(value: IntVal) -> Self {
        Value::from_variant(Variant::Int(value))
    }

    pub fn decimal(value: f64) -> Self {
        Value::from_variant(Variant::Decimal(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Value::from_variant(Variant::Str(Heap::new(value.into())))
    }

    pub fn date(value: DateTime<Utc>) -> Self {
        Value::from_variant(Variant::Date(value))
    }

    pub fn infinity(negative: bool) -> Self {
        Value::from_variant(Variant::Infinity { negative })
    }

    /// An ERROR-variant value carrying a structured failure.
    pub fn error(error: ValueError) -> Self {
        Value::from_variant(Variant::Error(Heap::new(error)))
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::from_variant(Variant::List(Heap::new(items)))
    }

    pub fn map(entries: IndexMap<String, Value>) -> Self {
        Value::from_variant(Variant::Map(Heap::new(entries)))
    }

    /// A single-entry map — the language's "pair".
    pub fn pair(key: impl Into<String>, value: Value) -> Self {
        let mut entries = IndexMap::with_capacity(1);
        entries.insert(key.into(), value);
        Value::map(entries)
    }

    pub fn sequence(items: Vec<Value>) -> Self {
        Value::from_variant(Variant::Sequence(Heap::new(items)))
    }

    pub fn range(range: RangeValue) -> Self {
        Value::from_variant(Variant::Range(Heap::new(range)))
    }

    /// A fresh empty queue.
    pub fn queue() -> Self {
        Value::from_queue(QueueValue::new())
    }

    pub(crate) fn from_queue(queue: QueueValue) -> Self {
        Value::from_variant(Variant::Queue(Heap::new(queue)))
    }

    pub fn uri(uri: UriValue) -> Self {
        Value::from_variant(Variant::Uri(Heap::new(uri)))
    }

    /// Wrap a deferred computation without evaluating it.
    pub fn lazy(pipe: impl Fn(&Value) -> ValueResult + Send + Sync + 'static) -> Self {
        Value::from_variant(Variant::Lazy(LazyValue::new(Arc::new(pipe))))
    }
}

// Structure: tags, variants, metadata.

impl Value {
    /// The variant payload. Does not force lazy values.
    pub fn variant(&self) -> &Variant {
        &self.variant
    }

    /// The type tag. Does not force lazy values; a deferred computation
    /// reports its predicted type via [`Value::predict_type`] instead.
    pub fn type_tag(&self) -> Type {
        match &self.variant {
            Variant::Void => Type::Void,
            Variant::Null => Type::Null,
            Variant::Bool(_) => Type::Boolean,
            Variant::Int(_) => Type::Integer,
            Variant::Decimal(_) => Type::Decimal,
            Variant::Str(_) => Type::String,
            Variant::Date(_) => Type::Date,
            Variant::Infinity { .. } => Type::Infinity,
            Variant::Error(_) => Type::Error,
            Variant::List(_) => Type::List,
            Variant::Map(_) => Type::Map,
            Variant::Range(_) => Type::Range,
            Variant::Queue(_) => Type::Queue,
            Variant::Uri(_) => Type::Uri,
            Variant::Sequence(_) => Type::Sequence,
            Variant::Lazy(_) => Type::Any,
        }
    }

    /// The metadata attached to this value, if any.
    pub fn meta(&self) -> Option<&Arc<MetaMap>> {
        self.meta.as_ref()
    }

    /// This value with a metadata map attached (sharing the variant).
    #[must_use]
    pub fn with_meta(&self) -> Value {
        match &self.meta {
            Some(_) => self.clone(),
            None => Value {
                variant: self.variant.clone(),
                meta: Some(Arc::new(MetaMap::new())),
            },
        }
    }

    /// Record a constraint fingerprint.
    ///
    /// Idempotent for a matching fingerprint; a different fingerprint on an
    /// already-constrained value is a `ConstraintViolation`.
    pub fn constrain(&self, fingerprint: &str) -> ValueResult {
        let value = self.with_meta();
        if let Some(meta) = value.meta() {
            meta.record_fingerprint(fingerprint)?;
        }
        Ok(value)
    }

    /// The recorded constraint fingerprint, if any.
    pub fn constraint_fingerprint(&self) -> Option<String> {
        self.meta.as_ref().and_then(|m| m.fingerprint())
    }

    /// Whether quiet-mode errors have accumulated on this value.
    ///
    /// An ERROR variant always reports `true`.
    pub fn has_errors(&self) -> bool {
        matches!(self.variant, Variant::Error(_))
            || self.meta.as_ref().is_some_and(|m| m.has_errors())
    }

    /// Accumulated errors: the ERROR payload if this is one, plus any
    /// metadata-attached failures.
    pub fn errors(&self) -> Vec<ValueError> {
        let mut all = Vec::new();
        if let Variant::Error(e) = &self.variant {
            all.push((**e).clone());
        }
        if let Some(meta) = &self.meta {
            all.extend(meta.errors());
        }
        all
    }

    /// This value with an error appended to its metadata list.
    #[must_use]
    pub fn with_error(&self, error: ValueError) -> Value {
        let value = self.with_meta();
        if let Some(meta) = value.meta() {
            meta.push_error(error);
        }
        value
    }

    /// A structural copy. For a reactive node this is a fresh node sharing
    /// the pipe but with its own identity and an empty listener registry;
    /// everything else clones (cheaply, payloads are shared).
    #[must_use]
    pub fn copy(&self) -> Value {
        match &self.variant {
            Variant::Lazy(node) => Value::from_variant(Variant::Lazy(node.duplicate())),
            _ => self.clone(),
        }
    }
}

// Reactivity: demand, fix, listeners, prediction.

impl Value {
    /// Force a deferred computation to a concrete value.
    ///
    /// Concrete values return themselves. A lazy value executes its pipe
    /// through the guarded dispatch boundary; a pipe returning another
    /// lazy value is forced again.
    pub fn demand(&self) -> ValueResult {
        match &self.variant {
            Variant::Lazy(node) => {
                let produced = node.execute(self.meta.as_deref())?;
                produced.demand()
            }
            _ => Ok(self.clone()),
        }
    }

    /// Unwrap to the underlying concrete value (alias used by the
    /// evaluator's `$unwrap`).
    pub fn unwrap_value(&self) -> ValueResult {
        self.demand()
    }

    /// Force evaluation to the given depth.
    ///
    /// A lazy value executes its pipe exactly once per call — results are
    /// never cached across calls, which is what makes re-fixing pick up
    /// upstream changes. Depth 1 forces only this node; larger depths fix
    /// the produced value (and container children) to `depth - 1`.
    /// `parallel` fans container children out over the thread pool while
    /// preserving order.
    pub fn fix(&self, depth: u32, parallel: bool) -> ValueResult {
        if depth == 0 {
            return Ok(self.clone());
        }
        match &self.variant {
            Variant::Lazy(node) => {
                let produced = node.execute(self.meta.as_deref())?;
                if depth > 1 {
                    ensure_sufficient_stack(|| produced.fix(depth - 1, parallel))
                } else {
                    Ok(produced)
                }
            }
            Variant::List(items) if depth > 1 => {
                let fixed = fix_children(items, depth - 1, parallel)?;
                Ok(Value::list(fixed))
            }
            Variant::Sequence(items) if depth > 1 => {
                let fixed = fix_children(items, depth - 1, parallel)?;
                Ok(Value::sequence(fixed))
            }
            Variant::Map(entries) if depth > 1 => {
                let mut fixed = IndexMap::with_capacity(entries.len());
                for (key, value) in entries.iter() {
                    let child =
                        ensure_sufficient_stack(|| value.fix(depth - 1, parallel))?;
                    fixed.insert(key.clone(), child);
                }
                Ok(Value::map(fixed))
            }
            _ => Ok(self.clone()),
        }
    }

    /// Force the whole graph below this value.
    pub fn fix_deep(&self, parallel: bool) -> ValueResult {
        self.fix(MAX_FIX_DEPTH, parallel)
    }

    /// Register a change listener with a generated id.
    ///
    /// Settled values never change, so listening to one is a no-op and the
    /// returned id is empty.
    pub fn listen(&self, listener: Listener) -> String {
        match &self.variant {
            Variant::Lazy(node) => node.listen(listener),
            _ => String::new(),
        }
    }

    /// Register a change listener under an explicit id, replacing any
    /// previous listener with that id.
    pub fn listen_with_id(&self, id: impl Into<String>, listener: Listener) -> String {
        match &self.variant {
            Variant::Lazy(node) => node.listen_with_id(id.into(), listener),
            _ => String::new(),
        }
    }

    /// Re-evaluate and fan the fresh value out to listeners in
    /// registration order. Re-entrant notification of a node already
    /// notifying on this thread is a silent no-op.
    pub fn notify(&self) -> ValueResult {
        match &self.variant {
            Variant::Lazy(node) => node.notify(self.meta.as_deref()),
            _ => Ok(self.clone()),
        }
    }

    /// Remove a listener. Unknown ids are ignored.
    pub fn cancel(&self, id: &str) {
        if let Variant::Lazy(node) = &self.variant {
            node.cancel(id);
        }
    }

    /// Predict this value's eventual type without forcing it.
    ///
    /// A concrete metadata type hint wins; otherwise the registered type
    /// learner is consulted once and its answer cached on the node.
    pub fn predict_type(&self) -> Option<TypePrediction> {
        if let Some(hint) = self.meta.as_ref().and_then(|m| m.type_hint()) {
            return Some(TypePrediction {
                probable: hint,
                certainty: 1.0,
            });
        }
        match &self.variant {
            Variant::Lazy(node) => node.predict(),
            _ => Some(TypePrediction {
                probable: self.type_tag(),
                certainty: 1.0,
            }),
        }
    }

    /// Current reactive evaluation depth on this thread (diagnostics).
    pub fn evaluation_depth() -> usize {
        guards::eval_depth()
    }
}

fn fix_children(items: &[Value], depth: u32, parallel: bool) -> Result<Vec<Value>, ValueError> {
    if parallel {
        use rayon::prelude::*;
        // Indexed parallel collect keeps result order aligned with input
        // order; only side effects inside child pipes may race.
        items
            .par_iter()
            .map(|child| child.fix(depth, parallel))
            .collect()
    } else {
        items
            .iter()
            .map(|child| ensure_sufficient_stack(|| child.fix(depth, parallel)))
            .collect()
    }
}

// Capability probes.
//
// The probe vocabulary is what the coercion engine dispatches on; answers
// must stay mutually consistent (`is_integer()` implies `is_number()`, a
// pair is also a map, and so on). Probes are structural: they never force
// a lazy value.

impl Value {
    pub fn is_void(&self) -> bool {
        // ERROR is a subtype of VOID: absence with an explanation.
        matches!(self.variant, Variant::Void | Variant::Error(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self.variant, Variant::Null)
    }

    pub fn is_error(&self) -> bool {
        matches!(self.variant, Variant::Error(_))
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self.variant, Variant::Bool(_))
    }

    pub fn is_true(&self) -> bool {
        matches!(self.variant, Variant::Bool(true))
    }

    pub fn is_false(&self) -> bool {
        matches!(self.variant, Variant::Bool(false))
    }

    pub fn neither_true_nor_false(&self) -> bool {
        !self.is_boolean()
    }

    pub fn is_integer(&self) -> bool {
        matches!(self.variant, Variant::Int(_))
    }

    pub fn is_decimal(&self) -> bool {
        matches!(self.variant, Variant::Decimal(_))
    }

    pub fn is_number(&self) -> bool {
        self.is_integer() || self.is_decimal() || self.is_infinite()
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self.variant, Variant::Infinity { .. })
    }

    pub fn is_string(&self) -> bool {
        matches!(self.variant, Variant::Str(_))
    }

    pub fn is_date(&self) -> bool {
        matches!(self.variant, Variant::Date(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self.variant, Variant::List(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self.variant, Variant::Map(_))
    }

    /// A pair is a single-entry map.
    pub fn is_pair(&self) -> bool {
        match &self.variant {
            Variant::Map(entries) => entries.len() == 1,
            _ => false,
        }
    }

    pub fn is_range(&self) -> bool {
        matches!(self.variant, Variant::Range(_))
    }

    pub fn is_queue(&self) -> bool {
        matches!(self.variant, Variant::Queue(_))
    }

    pub fn is_uri(&self) -> bool {
        matches!(self.variant, Variant::Uri(_))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self.variant, Variant::Sequence(_))
    }

    pub fn is_collection(&self) -> bool {
        matches!(
            self.variant,
            Variant::List(_)
                | Variant::Map(_)
                | Variant::Range(_)
                | Variant::Queue(_)
                | Variant::Sequence(_)
        )
    }

    /// Scalar-like: exactly one underlying datum.
    pub fn is_single_value(&self) -> bool {
        matches!(
            self.variant,
            Variant::Bool(_)
                | Variant::Int(_)
                | Variant::Decimal(_)
                | Variant::Str(_)
                | Variant::Date(_)
                | Variant::Infinity { .. }
                | Variant::Uri(_)
        )
    }

    pub fn is_lazy(&self) -> bool {
        matches!(self.variant, Variant::Lazy(_))
    }

    /// Truthiness under the language's rules.
    pub fn truthy(&self) -> bool {
        match &self.variant {
            Variant::Void | Variant::Null | Variant::Error(_) => false,
            Variant::Bool(b) => *b,
            Variant::Int(n) => !n.is_zero(),
            Variant::Decimal(d) => *d != 0.0,
            Variant::Str(s) => !s.is_empty(),
            Variant::Date(_) | Variant::Uri(_) | Variant::Infinity { .. } => true,
            Variant::List(items) | Variant::Sequence(items) => !items.is_empty(),
            Variant::Map(entries) => !entries.is_empty(),
            Variant::Range(_) => true,
            Variant::Queue(q) => !q.is_empty(),
            Variant::Lazy(_) => self.demand().map(|v| v.truthy()).unwrap_or(false),
        }
    }
}

// Text rendering.

impl Value {
    /// The value's canonical text form (string coercion target).
    ///
    /// Forces lazy values; a failing pipe renders its error message.
    pub fn to_text(&self) -> String {
        match &self.variant {
            Variant::Void => "void".to_string(),
            Variant::Null => "null".to_string(),
            Variant::Bool(b) => b.to_string(),
            Variant::Int(n) => n.to_string(),
            Variant::Decimal(d) => d.to_string(),
            Variant::Str(s) => (**s).clone(),
            Variant::Date(d) => d.to_rfc3339(),
            Variant::Infinity { negative: false } => "infinity".to_string(),
            Variant::Infinity { negative: true } => "-infinity".to_string(),
            Variant::Error(e) => format!("error({}: {})", e.kind.code(), e.message),
            Variant::List(items) | Variant::Sequence(items) => {
                let rendered: Vec<String> = items.iter().map(Value::to_text).collect();
                format!("[{}]", rendered.join(", "))
            }
            Variant::Map(entries) => {
                let rendered: Vec<String> = entries
                    .iter()
                    .map(|(k, v)| format!("{k}: {}", v.to_text()))
                    .collect();
                format!("{{{}}}", rendered.join(", "))
            }
            Variant::Range(r) => r.to_string(),
            Variant::Queue(q) => format!("queue({})", q.len()),
            Variant::Uri(u) => u.text().to_string(),
            Variant::Lazy(_) => match self.demand() {
                Ok(v) => v.to_text(),
                Err(e) => format!("error({}: {})", e.kind.code(), e.message),
            },
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.variant {
            Variant::Lazy(node) => write!(f, "Lazy({})", node.id()),
            Variant::Str(s) => write!(f, "Str({s:?})"),
            _ => write!(f, "{}({})", self.type_tag().name(), self.to_text()),
        }
    }
}

impl PartialEq for Value {
    /// Structural equality over canonical representations. Metadata is
    /// provenance and never participates; lazy values force first.
    fn eq(&self, other: &Self) -> bool {
        crate::compare::values_equal(self, other)
    }
}
