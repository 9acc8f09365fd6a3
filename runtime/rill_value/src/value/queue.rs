//! The QUEUE variant: a blocking FIFO of values.
//!
//! Producers push, consumers poll (non-blocking) or take (blocking on a
//! condvar until an element arrives). The queue is the one variant whose
//! payload mutates in place; the `Value` wrapper stays shared and the
//! mutation is confined behind the lock.

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;

use crate::value::Value;

/// A concurrent FIFO payload.
pub struct QueueValue {
    inner: Mutex<VecDeque<Value>>,
    available: Condvar,
}

impl QueueValue {
    pub fn new() -> Self {
        QueueValue {
            inner: Mutex::new(VecDeque::new()),
            available: Condvar::new(),
        }
    }

    /// Append at the tail and wake one blocked taker.
    pub fn push(&self, value: Value) {
        self.inner.lock().push_back(value);
        self.available.notify_one();
    }

    /// Insert at the head and wake one blocked taker.
    pub fn push_front(&self, value: Value) {
        self.inner.lock().push_front(value);
        self.available.notify_one();
    }

    /// Remove the head without blocking.
    pub fn poll(&self) -> Option<Value> {
        self.inner.lock().pop_front()
    }

    /// Remove the head, blocking until an element is available.
    pub fn take(&self) -> Value {
        let mut queue = self.inner.lock();
        loop {
            if let Some(value) = queue.pop_front() {
                return value;
            }
            self.available.wait(&mut queue);
        }
    }

    /// The head without removing it.
    pub fn peek(&self) -> Option<Value> {
        self.inner.lock().front().cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Remove and return all elements, oldest first.
    pub fn drain_all(&self) -> Vec<Value> {
        self.inner.lock().drain(..).collect()
    }

    /// Copy of the contents, oldest first, without removing.
    pub fn snapshot(&self) -> Vec<Value> {
        self.inner.lock().iter().cloned().collect()
    }
}

impl Default for QueueValue {
    fn default() -> Self {
        QueueValue::new()
    }
}

impl PartialEq for QueueValue {
    fn eq(&self, other: &Self) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        self.snapshot() == other.snapshot()
    }
}

impl std::fmt::Debug for QueueValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "QueueValue(len: {})", self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn fifo_order() {
        let queue = QueueValue::new();
        queue.push(Value::int(1));
        queue.push(Value::int(2));
        assert_eq!(queue.poll(), Some(Value::int(1)));
        assert_eq!(queue.poll(), Some(Value::int(2)));
        assert_eq!(queue.poll(), None);
    }

    #[test]
    fn take_blocks_until_push() {
        let queue = Arc::new(QueueValue::new());
        let producer = Arc::clone(&queue);
        let handle = thread::spawn(move || {
            producer.push(Value::string("late"));
        });
        assert_eq!(queue.take(), Value::string("late"));
        handle.join().ok();
    }

    #[test]
    fn drain_empties_the_queue() {
        let queue = QueueValue::new();
        queue.push(Value::int(1));
        queue.push(Value::int(2));
        assert_eq!(queue.drain_all(), vec![Value::int(1), Value::int(2)]);
        assert!(queue.is_empty());
    }
}
