//! Wait entries: one pending resumption condition plus its callback.

use std::fmt;

use crate::ids::{EntryId, TaskId};

/// The condition that releases a wait entry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ReleaseKind {
    /// Due once game time has reached the absolute threshold (seconds).
    AtTime(f64),
    /// Due once the frame counter has advanced past the recorded frame.
    AtFrame(u64),
    /// Always due; serviced with priority during the tick pass.
    MainContext,
}

/// A record of one pending resumption. Lives in exactly one queue from the
/// moment its task suspends until the tick pass consumes it; never
/// re-queued (a repeated logical wait creates a fresh entry).
pub struct WaitEntry {
    pub id: EntryId,
    pub task: TaskId,
    pub kind: ReleaseKind,
    callback: Box<dyn FnOnce() + Send>,
}

impl WaitEntry {
    pub fn new(
        id: EntryId,
        task: TaskId,
        kind: ReleaseKind,
        callback: Box<dyn FnOnce() + Send>,
    ) -> Self {
        WaitEntry {
            id,
            task,
            kind,
            callback,
        }
    }

    /// Whether the release condition holds at the given game time and frame.
    pub fn is_due(&self, game_time: f64, frame: u64) -> bool {
        match self.kind {
            ReleaseKind::AtTime(threshold) => threshold <= game_time,
            ReleaseKind::AtFrame(threshold) => frame > threshold,
            ReleaseKind::MainContext => true,
        }
    }

    /// Consume the entry and invoke its callback.
    pub fn fire(self) {
        (self.callback)();
    }
}

impl fmt::Debug for WaitEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitEntry")
            .field("id", &self.id)
            .field("task", &self.task)
            .field("kind", &self.kind)
            .finish()
    }
}
