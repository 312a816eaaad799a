//! Per-consumer session buffers.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use offerflow_core::Record;

use crate::queue::RecordQueue;

/// FIFO buffer for one consumer session.
///
/// Seeded as a copy of the master buffer's contents at creation time. The
/// last-access stamp is refreshed on poll, not on push; a session idle past
/// its timeout is discarded and lazily re-seeded by the manager.
#[derive(Debug)]
pub struct SessionBuffer {
    queue: RecordQueue,
    last_access: Mutex<Instant>,
    timeout: Duration,
}

impl SessionBuffer {
    /// Create a session buffer seeded with a master-buffer snapshot.
    pub fn seeded(records: Vec<Record>, timeout: Duration) -> Self {
        Self {
            queue: RecordQueue::seeded(records),
            last_access: Mutex::new(Instant::now()),
            timeout,
        }
    }

    /// Append a record. Pushes do not refresh the last-access stamp.
    pub fn push(&self, record: Record) {
        self.queue.push(record);
    }

    /// Remove and return the head record, refreshing the last-access stamp.
    pub fn poll(&self) -> Option<Record> {
        self.touch();
        self.queue.pop()
    }

    /// Whether the session has been idle past its timeout.
    pub fn is_expired(&self) -> bool {
        let last = match self.last_access.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        };
        last.elapsed() > self.timeout
    }

    /// Number of buffered records.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Check whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    fn touch(&self) {
        let now = Instant::now();
        match self.last_access.lock() {
            Ok(mut guard) => *guard = now,
            Err(poisoned) => *poisoned.into_inner() = now,
        }
    }
}
