//! Per-value metadata.
//!
//! The metadata surface the language needs is small and known: a write-once
//! constraint fingerprint, source provenance, a type hint, the lexical
//! scopes a reactive node re-enters, and accumulated quiet-mode errors. A
//! fixed-schema struct holds those directly; a string-keyed side table
//! covers the rare genuinely dynamic attachment (named-parameter tagging
//! during parsing).
//!
//! A `MetaMap` is shared by every clone of its value (`Arc`) and guarded by
//! a single `RwLock`. Reads and writes from any thread are fine; there is
//! deliberately no compound compare-and-set across two calls.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::errors::{constraint_violation, metadata_immutable, SourceLocation, ValueError};
use crate::scope::Scope;
use crate::value::{Type, Value};

#[derive(Default)]
struct MetaInner {
    fingerprint: Option<String>,
    location: Option<SourceLocation>,
    type_hint: Option<Type>,
    scopes: SmallVec<[Scope; 2]>,
    errors: Vec<ValueError>,
    extra: FxHashMap<&'static str, Value>,
}

/// Fixed-schema metadata attached to a value.
#[derive(Default)]
pub struct MetaMap {
    inner: RwLock<MetaInner>,
}

impl MetaMap {
    pub fn new() -> Self {
        MetaMap::default()
    }

    /// The constraint fingerprint, if one was recorded.
    pub fn fingerprint(&self) -> Option<String> {
        self.inner.read().fingerprint.clone()
    }

    /// Record a constraint fingerprint.
    ///
    /// Write-once: recording the same fingerprint again is a no-op,
    /// recording a different one is a `ConstraintViolation`.
    pub fn record_fingerprint(&self, fingerprint: &str) -> Result<(), ValueError> {
        let mut inner = self.inner.write();
        match inner.fingerprint.as_deref() {
            None => {
                inner.fingerprint = Some(fingerprint.to_string());
                Ok(())
            }
            Some(existing) if existing == fingerprint => Ok(()),
            Some(existing) => Err(constraint_violation(existing, fingerprint)),
        }
    }

    pub fn location(&self) -> Option<SourceLocation> {
        self.inner.read().location.clone()
    }

    pub fn set_location(&self, location: SourceLocation) {
        self.inner.write().location = Some(location);
    }

    pub fn type_hint(&self) -> Option<Type> {
        self.inner.read().type_hint
    }

    pub fn set_type_hint(&self, hint: Type) {
        self.inner.write().type_hint = Some(hint);
    }

    /// Attach a lexical scope for re-entry around pipe execution.
    pub fn attach_scope(&self, scope: Scope) {
        self.inner.write().scopes.push(scope);
    }

    /// Snapshot of the attached scopes, in attachment order.
    pub fn scopes(&self) -> Vec<Scope> {
        self.inner.read().scopes.iter().cloned().collect()
    }

    /// Append a quiet-mode error to the value's error list.
    pub fn push_error(&self, error: ValueError) {
        self.inner.write().errors.push(error);
    }

    pub fn errors(&self) -> Vec<ValueError> {
        self.inner.read().errors.clone()
    }

    pub fn has_errors(&self) -> bool {
        !self.inner.read().errors.is_empty()
    }

    /// Read a dynamic side-table entry.
    pub fn get_extra(&self, key: &str) -> Option<Value> {
        self.inner.read().extra.get(key).cloned()
    }

    /// Write a dynamic side-table entry. Keys are write-once, matching the
    /// fingerprint discipline.
    pub fn set_extra(&self, key: &'static str, value: Value) -> Result<(), ValueError> {
        let mut inner = self.inner.write();
        if inner.extra.contains_key(key) {
            return Err(metadata_immutable(key));
        }
        inner.extra.insert(key, value);
        Ok(())
    }
}

impl std::fmt::Debug for MetaMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("MetaMap")
            .field("fingerprint", &inner.fingerprint)
            .field("type_hint", &inner.type_hint)
            .field("scopes", &inner.scopes.len())
            .field("errors", &inner.errors.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_write_once() {
        let meta = MetaMap::new();
        assert!(meta.record_fingerprint("a").is_ok());
        assert!(meta.record_fingerprint("a").is_ok());
        let err = meta.record_fingerprint("b").unwrap_err();
        assert!(matches!(
            err.kind,
            crate::errors::ErrorKind::ConstraintViolation { .. }
        ));
        assert_eq!(meta.fingerprint().as_deref(), Some("a"));
    }

    #[test]
    fn side_table_keys_are_write_once() {
        let meta = MetaMap::new();
        assert!(meta.set_extra("param", Value::int(1)).is_ok());
        assert!(meta.set_extra("param", Value::int(2)).is_err());
        assert_eq!(meta.get_extra("param"), Some(Value::int(1)));
    }
}
