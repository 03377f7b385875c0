//! Core identifier types for the scheduler.
//!
//! All IDs are lightweight Copy types using newtype pattern for type safety.

/// Unique identifier for a scheduled task.
///
/// Tasks are managed by the scheduler which maintains its own internal
/// counter; raw value 0 is reserved to mean "no active task".
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TaskId(pub u64);

/// Unique identifier for a wait entry.
///
/// Monotonically increasing per scheduler; a repeated logical wait gets a
/// fresh id because wait entries are consumed exactly once.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct EntryId(pub u64);

impl TaskId {
    /// Get the raw value.
    pub fn raw(&self) -> u64 {
        self.0
    }

    /// Create a TaskId from a raw value.
    pub fn from_raw(value: u64) -> Self {
        TaskId(value)
    }
}

impl EntryId {
    /// Get the raw value.
    pub fn raw(&self) -> u64 {
        self.0
    }

    /// Create an EntryId from a raw value.
    pub fn from_raw(value: u64) -> Self {
        EntryId(value)
    }
}
