//! Thread-safe unbounded FIFO for records.

use std::collections::VecDeque;
use std::sync::Mutex;

use offerflow_core::Record;

/// Unbounded concurrent FIFO. Push and pop need no external locking.
#[derive(Debug, Default)]
pub struct RecordQueue {
    inner: Mutex<VecDeque<Record>>,
}

impl RecordQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a queue seeded with the given records, preserving order.
    pub fn seeded(records: Vec<Record>) -> Self {
        Self {
            inner: Mutex::new(records.into()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Record>> {
        // A poisoned lock only means a panic elsewhere; the queue itself
        // stays structurally valid.
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Append a record at the tail.
    pub fn push(&self, record: Record) {
        self.lock().push_back(record);
    }

    /// Remove and return the head record, if any.
    pub fn pop(&self) -> Option<Record> {
        self.lock().pop_front()
    }

    /// Copy the current contents in order, leaving the queue untouched.
    pub fn snapshot(&self) -> Vec<Record> {
        self.lock().iter().cloned().collect()
    }

    /// Discard all buffered records.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of buffered records.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fifo_order() {
        let queue = RecordQueue::new();
        queue.push(json!("a"));
        queue.push(json!("b"));
        queue.push(json!("c"));

        assert_eq!(queue.pop(), Some(json!("a")));
        assert_eq!(queue.pop(), Some(json!("b")));
        assert_eq!(queue.pop(), Some(json!("c")));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_snapshot_leaves_queue_intact() {
        let queue = RecordQueue::new();
        queue.push(json!(1));
        queue.push(json!(2));

        assert_eq!(queue.snapshot(), vec![json!(1), json!(2)]);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_seeded_preserves_order() {
        let queue = RecordQueue::seeded(vec![json!(1), json!(2)]);
        assert_eq!(queue.pop(), Some(json!(1)));
        assert_eq!(queue.pop(), Some(json!(2)));
    }

    #[test]
    fn test_concurrent_push_pop() {
        use std::sync::Arc;

        let queue = Arc::new(RecordQueue::new());
        let producer = {
            let queue = Arc::clone(&queue);
            std::thread::spawn(move || {
                for i in 0..1000 {
                    queue.push(json!(i));
                }
            })
        };

        let mut seen = 0;
        while seen < 1000 {
            if queue.pop().is_some() {
                seen += 1;
            } else {
                std::thread::yield_now();
            }
        }
        producer.join().unwrap();
        assert!(queue.is_empty());
    }
}
