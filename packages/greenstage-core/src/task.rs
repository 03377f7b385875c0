//! Task liveness and the abort signal.

/// Capability interface implemented by everything that can own a task
/// (sprite, stage, ...). The scheduler depends only on this, never on
/// concrete owner types.
pub trait TaskOwner: Send + Sync {
    fn is_live(&self) -> bool;
}

/// Distinguished unwind payload raised when a task is resumed after its
/// owner stopped being live.
///
/// Raised with `std::panic::panic_any` at suspension-resumption boundaries
/// only, and caught exactly once, at the task-body wrapper, which treats it
/// as silent termination. Ordinary error handling inside script logic never
/// sees it, so cleanup code cannot accidentally suppress a stop.
#[derive(Debug)]
pub struct TaskAborted;
