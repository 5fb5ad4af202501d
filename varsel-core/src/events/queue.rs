//! Unbounded FIFO queue between the record producer and its consumers.
//!
//! Single-producer/multi-consumer: the generation loop pushes from one
//! task, any number of consumer tasks pop concurrently. Delivery is FIFO
//! within a queue and every record is delivered exactly once. `push`
//! never blocks and never drops; backpressure is the consumer's problem.

use crossbeam::queue::SegQueue;
use tokio::sync::Notify;

/// Unbounded MPMC record queue with async consumption.
pub struct RecordQueue<T> {
    items: SegQueue<T>,
    notify: Notify,
}

impl<T> RecordQueue<T> {
    pub fn new() -> Self {
        Self {
            items: SegQueue::new(),
            notify: Notify::new(),
        }
    }

    /// Enqueues a record. Never blocks.
    pub fn push(&self, value: T) {
        self.items.push(value);
        self.notify.notify_one();
    }

    /// Dequeues the next record, suspending until one is available.
    ///
    /// FIFO with respect to `push` order. A record popped here is never
    /// observed by any other consumer.
    pub async fn pop(&self) -> T {
        loop {
            if let Some(value) = self.items.pop() {
                return value;
            }
            let notified = self.notify.notified();
            // A push may have landed between the failed pop and the
            // waiter registration; re-check before suspending.
            if let Some(value) = self.items.pop() {
                return value;
            }
            notified.await;
        }
    }

    /// Non-suspending variant of [`pop`](Self::pop).
    pub fn try_pop(&self) -> Option<T> {
        self.items.pop()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> Default for RecordQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
