//! The collection-access half of the uniform operation contract.
//!
//! `get`/`set`/`remove`/`append`/`prepend`/`insert` plus the structural
//! queries `size` and `contains`. All mutations return new values —
//! payloads are shared, so "copy" is an Arc clone plus the touched slot.
//! The queue and URI variants are the exception: their backends mutate in
//! place by design, gated behind the lifecycle machine for URIs.

use crate::errors::{invalid_operation, ValueResult};
use crate::value::{Value, Variant};

impl Value {
    /// Index into a collection: list/sequence by integer (negative counts
    /// from the end), map by key text, string by character index, queue by
    /// peeking, URI by delegating to its handler.
    pub fn get(&self, key: &Value) -> ValueResult {
        let target = self.demand()?;
        let key = key.demand()?;
        match target.variant() {
            Variant::List(items) | Variant::Sequence(items) => {
                Ok(index_slice(items, &key).cloned().unwrap_or_else(Value::void))
            }
            Variant::Map(entries) => Ok(entries
                .get(&key.to_text())
                .cloned()
                .unwrap_or_else(Value::void)),
            Variant::Str(s) => {
                let Some(index) = normalized_index(s.chars().count(), &key) else {
                    return Ok(Value::void());
                };
                Ok(s.chars()
                    .nth(index)
                    .map(|c| Value::string(c.to_string()))
                    .unwrap_or_else(Value::void))
            }
            Variant::Queue(queue) => Ok(queue.peek().unwrap_or_else(Value::void)),
            Variant::Uri(uri) => uri.with_running("get", |handler| handler.get(&key)),
            Variant::Range(range) => {
                let items = range.to_vec()?;
                Ok(index_slice(&items, &key).cloned().unwrap_or_else(Value::void))
            }
            _ => Err(invalid_operation(target.type_tag(), "get")),
        }
    }

    /// Replace or insert at a key, returning the updated collection.
    pub fn set(&self, key: &Value, value: &Value) -> ValueResult {
        let target = self.demand()?;
        let key = key.demand()?;
        match target.variant() {
            Variant::List(items) => {
                let mut updated = (**items).clone();
                match normalized_index(updated.len(), &key) {
                    Some(index) if index < updated.len() => updated[index] = value.clone(),
                    _ => updated.push(value.clone()),
                }
                Ok(Value::list(updated))
            }
            Variant::Map(entries) => {
                let mut updated = (**entries).clone();
                updated.insert(key.to_text(), value.clone());
                Ok(Value::map(updated))
            }
            Variant::Uri(uri) => uri.with_running("set", |handler| handler.set(&key, value)),
            _ => Err(invalid_operation(target.type_tag(), "set")),
        }
    }

    /// Remove by key/index, returning the updated collection.
    pub fn remove(&self, key: &Value) -> ValueResult {
        let target = self.demand()?;
        let key = key.demand()?;
        match target.variant() {
            Variant::List(items) => {
                let mut updated = (**items).clone();
                if let Some(index) = normalized_index(updated.len(), &key) {
                    if index < updated.len() {
                        updated.remove(index);
                    }
                }
                Ok(Value::list(updated))
            }
            Variant::Map(entries) => {
                let mut updated = (**entries).clone();
                updated.shift_remove(&key.to_text());
                Ok(Value::map(updated))
            }
            Variant::Uri(uri) => uri.with_running("remove", |handler| handler.remove(&key)),
            _ => Err(invalid_operation(target.type_tag(), "remove")),
        }
    }

    /// Append at the tail.
    pub fn append(&self, value: &Value) -> ValueResult {
        let target = self.demand()?;
        match target.variant() {
            Variant::List(items) => {
                let mut updated = (**items).clone();
                updated.push(value.clone());
                Ok(Value::list(updated))
            }
            Variant::Sequence(items) => {
                let mut updated = (**items).clone();
                updated.push(value.clone());
                Ok(Value::sequence(updated))
            }
            Variant::Str(s) => Ok(Value::string(format!("{s}{}", value.to_text()))),
            Variant::Queue(queue) => {
                queue.push(value.clone());
                Ok(target.clone())
            }
            Variant::Uri(uri) => uri.with_running("append", |handler| handler.append(value)),
            _ => Err(invalid_operation(target.type_tag(), "append")),
        }
    }

    /// Prepend at the head.
    pub fn prepend(&self, value: &Value) -> ValueResult {
        let target = self.demand()?;
        match target.variant() {
            Variant::List(items) => {
                let mut updated = Vec::with_capacity(items.len() + 1);
                updated.push(value.clone());
                updated.extend(items.iter().cloned());
                Ok(Value::list(updated))
            }
            Variant::Sequence(items) => {
                let mut updated = Vec::with_capacity(items.len() + 1);
                updated.push(value.clone());
                updated.extend(items.iter().cloned());
                Ok(Value::sequence(updated))
            }
            Variant::Str(s) => Ok(Value::string(format!("{}{s}", value.to_text()))),
            Variant::Queue(queue) => {
                queue.push_front(value.clone());
                Ok(target.clone())
            }
            Variant::Uri(uri) => uri.with_running("prepend", |handler| handler.prepend(value)),
            _ => Err(invalid_operation(target.type_tag(), "prepend")),
        }
    }

    /// Insert at an index (lists/sequences) or delegate to a URI handler.
    pub fn insert(&self, index: usize, value: &Value) -> ValueResult {
        let target = self.demand()?;
        match target.variant() {
            Variant::List(items) => {
                let mut updated = (**items).clone();
                let index = index.min(updated.len());
                updated.insert(index, value.clone());
                Ok(Value::list(updated))
            }
            Variant::Sequence(items) => {
                let mut updated = (**items).clone();
                let index = index.min(updated.len());
                updated.insert(index, value.clone());
                Ok(Value::sequence(updated))
            }
            Variant::Uri(uri) => {
                uri.with_running("insert", |handler| handler.insert(index, value))
            }
            _ => Err(invalid_operation(target.type_tag(), "insert")),
        }
    }

    /// Element/entry/character count. Scalars count 1, absence counts 0.
    pub fn size(&self) -> Result<usize, crate::errors::ValueError> {
        let target = self.demand()?;
        Ok(match target.variant() {
            Variant::Void | Variant::Null | Variant::Error(_) => 0,
            Variant::Str(s) => s.chars().count(),
            Variant::List(items) | Variant::Sequence(items) => items.len(),
            Variant::Map(entries) => entries.len(),
            Variant::Range(range) => range.len()?,
            Variant::Queue(queue) => queue.len(),
            Variant::Uri(uri) => {
                let size = uri.with_running("size", |handler| handler.size())?;
                match size.variant() {
                    Variant::Int(n) => n.as_i64().unwrap_or(0).max(0) as usize,
                    _ => 0,
                }
            }
            _ => 1,
        })
    }

    /// Membership: list/sequence element, map key, substring, range
    /// membership, queued element.
    pub fn contains(&self, value: &Value) -> Result<bool, crate::errors::ValueError> {
        let target = self.demand()?;
        let value = value.demand()?;
        match target.variant() {
            Variant::List(items) | Variant::Sequence(items) => {
                Ok(items.iter().any(|item| item == &value))
            }
            Variant::Map(entries) => Ok(entries.contains_key(&value.to_text())),
            Variant::Str(s) => Ok(s.contains(&value.to_text())),
            Variant::Range(range) => range.contains(&value),
            Variant::Queue(queue) => Ok(queue.snapshot().iter().any(|item| item == &value)),
            _ => Err(invalid_operation(target.type_tag(), "contains")),
        }
    }
}

/// Resolve a value to an index into `len` items; negative indexes count
/// from the end.
fn normalized_index(len: usize, key: &Value) -> Option<usize> {
    let raw = match key.variant() {
        Variant::Int(n) => n.as_i64()?,
        _ => return None,
    };
    if raw < 0 {
        len.checked_sub(raw.unsigned_abs() as usize)
    } else {
        Some(raw as usize)
    }
}

fn index_slice<'a>(items: &'a [Value], key: &Value) -> Option<&'a Value> {
    let index = normalized_index(items.len(), key)?;
    items.get(index)
}
