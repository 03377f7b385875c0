//! greenstage-core: the cooperative coroutine scheduler underneath the
//! greenstage scripting model.
//!
//! Hundreds of independently-authored scripts (one per sprite event handler)
//! run as OS threads, but a single execution permit guarantees that only one
//! script body executes at a time. Scripts suspend by waiting for elapsed
//! game time, for the next frame, or for a hand-off to the main (tick)
//! context; a per-frame tick pass releases the waits that have become due.
//!
//! # Architecture
//!
//! - **Single execution permit**: a binary semaphore every task body holds
//!   while it runs; suspension releases it, resumption re-acquires it.
//! - **Two splice queues**: wait entries due this tick vs. deferred to the
//!   next tick, promoted with a bulk `move_from` once per pass.
//! - **Abort-on-stop**: resuming a task whose owner is no longer live raises
//!   a distinguished unwind payload caught only at the task-body wrapper.
//! - **Watchdog budget**: each tick pass is bounded in wall-clock time;
//!   work cut short survives in place and is picked up next frame.

pub mod clock;
pub mod error;
pub mod ids;
mod jobs;
mod logging;
pub mod queue;
pub mod scheduler;
pub mod stats;
pub mod task;
mod tick;
pub mod wait;


pub use clock::GameClock;
pub use error::SchedulerError;
pub use ids::{EntryId, TaskId};
pub use queue::SpliceQueue;
pub use scheduler::{DrainMode, Scheduler, SchedulerConfig};
pub use stats::TickStats;
pub use task::{TaskAborted, TaskOwner};
pub use wait::{ReleaseKind, WaitEntry};
