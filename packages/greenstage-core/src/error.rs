//! Error types for the scheduler.
//!
//! All of these indicate a caller programming error, never a recoverable
//! runtime condition; the scheduler uses them as panic payloads (fail fast
//! on invariant violations).

use crate::ids::TaskId;

#[derive(Debug, Clone)]
pub enum SchedulerError {
    YieldFromInactiveTask {
        task: TaskId,
        active: Option<TaskId>,
    },
    WaitOutsideTask,
    EmptyQueuePop,
    JobLaneFull {
        capacity: usize,
    },
}

impl std::fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchedulerError::YieldFromInactiveTask { task, active } => {
                write!(
                    f,
                    "task {} is not the active task (active: {:?}) and cannot yield",
                    task.raw(),
                    active.map(|t| t.raw())
                )
            }
            SchedulerError::WaitOutsideTask => {
                write!(f, "wait primitive called outside any task")
            }
            SchedulerError::EmptyQueuePop => {
                write!(f, "pop from an empty scheduler queue")
            }
            SchedulerError::JobLaneFull { capacity } => {
                write!(f, "external job lane is full (capacity {})", capacity)
            }
        }
    }
}

impl std::error::Error for SchedulerError {}

impl SchedulerError {
    pub fn yield_from_inactive(task: TaskId, active: Option<TaskId>) -> Self {
        SchedulerError::YieldFromInactiveTask { task, active }
    }

    pub fn wait_outside_task() -> Self {
        SchedulerError::WaitOutsideTask
    }

    pub fn empty_queue_pop() -> Self {
        SchedulerError::EmptyQueuePop
    }

    pub fn job_lane_full(capacity: usize) -> Self {
        SchedulerError::JobLaneFull { capacity }
    }
}
