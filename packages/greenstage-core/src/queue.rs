//! Internally synchronized deque of pending wait entries.
//!
//! Pure data structure, no policy: the scheduler decides what goes where.
//! Popping an empty queue is a scheduler-invariant violation and panics.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::SchedulerError;

pub struct SpliceQueue<T> {
    entries: Mutex<VecDeque<T>>,
}

impl<T> SpliceQueue<T> {
    pub fn new() -> Self {
        SpliceQueue {
            entries: Mutex::new(VecDeque::new()),
        }
    }

    pub fn push_back(&self, value: T) {
        self.entries
            .lock()
            .expect("scheduler lock poisoned")
            .push_back(value);
    }

    /// Insert ahead of all previously enqueued entries (priority grant).
    pub fn push_front(&self, value: T) {
        self.entries
            .lock()
            .expect("scheduler lock poisoned")
            .push_front(value);
    }

    pub fn pop_front(&self) -> T {
        self.entries
            .lock()
            .expect("scheduler lock poisoned")
            .pop_front()
            .unwrap_or_else(|| panic!("{}", SchedulerError::empty_queue_pop()))
    }

    pub fn pop_back(&self) -> T {
        self.entries
            .lock()
            .expect("scheduler lock poisoned")
            .pop_back()
            .unwrap_or_else(|| panic!("{}", SchedulerError::empty_queue_pop()))
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("scheduler lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Splice all of `src`'s entries onto the receiver's tail, leaving `src`
    /// empty. Bulk move of the backing storage, not element-by-element.
    ///
    /// Locks receiver then source; only the tick pass splices, so the order
    /// never inverts.
    pub fn move_from(&self, src: &SpliceQueue<T>) {
        let mut dst = self.entries.lock().expect("scheduler lock poisoned");
        let mut src = src.entries.lock().expect("scheduler lock poisoned");
        dst.append(&mut *src);
    }
}

impl<T> Default for SpliceQueue<T> {
    fn default() -> Self {
        SpliceQueue::new()
    }
}
