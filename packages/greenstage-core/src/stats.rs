//! Per-tick statistics for observability tooling.

/// Detailed statistics of the most recent tick pass. Overwritten each pass;
/// all timings are wall-clock seconds.
#[derive(Clone, Copy, Debug, Default)]
pub struct TickStats {
    /// Time spent draining the external job lane before the entry loop.
    pub init_time: f64,
    /// Time spent in the entry loop, including task hand-off waits.
    pub loop_time: f64,
    /// Time spent splicing the deferred queue back into the current one.
    pub move_time: f64,
    /// Total wall-clock time of the pass.
    pub total_time: f64,
    /// Iterations of the entry loop. Exceeds `entries_processed` when the
    /// watchdog cuts an iteration short before it pops an entry.
    pub loop_iterations: usize,
    /// Wait entries popped from the current queue.
    pub entries_processed: usize,
    /// Of those, time waits.
    pub wait_time_count: usize,
    /// Of those, frame waits.
    pub wait_frame_count: usize,
    /// Of those, main-context calls.
    pub wait_main_count: usize,
    /// External jobs executed from the job lane.
    pub jobs_run: usize,
    /// Entries deferred to the next tick at splice time.
    pub deferred_count: usize,
    /// Whether the watchdog budget cut the pass short.
    pub watchdog_triggered: bool,
}
