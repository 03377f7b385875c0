//! greenstage: the script-facing surface of the greenstage engine's
//! cooperative scheduler.
//!
//! An [`Engine`] owns one scheduler and one game clock. Game code spawns
//! scripts with [`Engine::go`], scripts suspend with [`Engine::wait`] /
//! [`Engine::wait_next_frame`] / [`Engine::wait_main`], and the game loop
//! drives everything with one [`Engine::tick`] call per frame.

mod engine;

pub use engine::Engine;
pub use greenstage_core::{
    DrainMode, GameClock, ReleaseKind, Scheduler, SchedulerConfig, SchedulerError, TaskAborted,
    TaskId, TaskOwner, TickStats,
};
