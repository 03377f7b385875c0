//! The engine handle: scheduler + clock + tick driver in one object.

use std::sync::Arc;

use greenstage_core::{
    GameClock, Scheduler, SchedulerConfig, SchedulerError, TaskId, TaskOwner, TickStats,
};

/// Handle to one running game instance's scheduler and clock.
///
/// Cheap to clone; clones share the same scheduler, so scripts capture a
/// clone to call the wait primitives. Multiple independent engines can
/// coexist (useful for tests and embedding), there is no global state.
///
/// ```
/// use greenstage::Engine;
///
/// let engine = Engine::new();
/// let inner = engine.clone();
/// engine.go(move || {
///     inner.wait(0.5);
/// });
/// engine.tick(0.016);
/// engine.shutdown();
/// ```
#[derive(Clone)]
pub struct Engine {
    clock: Arc<GameClock>,
    sched: Arc<Scheduler>,
}

impl Engine {
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default())
    }

    pub fn with_config(config: SchedulerConfig) -> Self {
        let clock = Arc::new(GameClock::new());
        let sched = Scheduler::with_config(Arc::clone(&clock), config);
        Engine { clock, sched }
    }

    /// Start a new script that executes `body` concurrently with the rest
    /// of the game, under the scheduler's one-body-at-a-time guarantee.
    ///
    /// Long-running scripts must call `wait` or `wait_next_frame`
    /// periodically; a script that never suspends starves every other
    /// script until it returns.
    pub fn go<F>(&self, body: F) -> TaskId
    where
        F: FnOnce() + Send + 'static,
    {
        self.sched.create(None, move |_| body())
    }

    /// Like [`Engine::go`], but binds the script to an owner whose liveness
    /// gates every resumption: once `owner.is_live()` turns false, the
    /// script is aborted at its next wait instead of resumed.
    pub fn go_with_owner<F>(&self, owner: Arc<dyn TaskOwner>, body: F) -> TaskId
    where
        F: FnOnce() + Send + 'static,
    {
        self.sched.create(Some(owner), move |_| body())
    }

    /// Pause the calling script for `secs` seconds of game time. Returns
    /// the game time actually elapsed, which may exceed the request due to
    /// frame granularity. Must be called from inside a script.
    pub fn wait(&self, secs: f64) -> f64 {
        self.sched.wait(secs)
    }

    /// Pause the calling script until the next frame. Returns the delta
    /// time of the frame that resumed it. Must be called from inside a
    /// script.
    pub fn wait_next_frame(&self) -> f64 {
        self.sched.wait_next_frame()
    }

    /// Pause the calling script and run `call` inside the next tick pass,
    /// ahead of all pending time/frame waits. Use for work that must touch
    /// the non-reentrant engine API.
    pub fn wait_main<F>(&self, call: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.sched.wait_main(call)
    }

    /// Give other scripts a turn, then continue immediately: the calling
    /// script suspends for one scheduler beat and resumes on its own, with
    /// no frame or game time passing. Use inside long computations that
    /// would otherwise monopolize the one-body-at-a-time permit. Must be
    /// called from inside a script.
    pub fn reschedule(&self) {
        self.sched.reschedule()
    }

    /// Post a job from any thread (including non-script threads) for
    /// execution during the next tick pass. Fails when the job lane is
    /// full.
    pub fn post<F>(&self, job: F) -> Result<(), SchedulerError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.sched.post(job)
    }

    /// One driver frame: process all due waits within the watchdog budget,
    /// then advance game time and the frame counter by `delta` seconds.
    /// Call exactly once per frame from the game loop.
    pub fn tick(&self, delta: f64) {
        self.sched.process_tick();
        self.clock.advance(delta);
    }

    /// Statistics recorded by the most recent tick pass.
    pub fn last_tick_stats(&self) -> TickStats {
        self.sched.last_tick_stats()
    }

    pub fn live_tasks(&self) -> usize {
        self.sched.live_task_count()
    }

    pub fn scheduler(&self) -> &Arc<Scheduler> {
        &self.sched
    }

    pub fn clock(&self) -> &Arc<GameClock> {
        &self.clock
    }

    /// Abort every script and wait until none are live. For embedding and
    /// tests; a game normally never tears its engine down before exit.
    pub fn shutdown(&self) {
        self.sched.shutdown();
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    fn wait_for(what: &str, cond: impl Fn() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while !cond() {
            assert!(Instant::now() < deadline, "timed out waiting for {what}");
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_go_and_wait_roundtrip() {
        let engine = Engine::new();
        let elapsed_bits = Arc::new(AtomicU64::new(0));
        let done = Arc::new(AtomicBool::new(false));

        let inner = engine.clone();
        let elapsed2 = Arc::clone(&elapsed_bits);
        let done2 = Arc::clone(&done);
        engine.go(move || {
            let actual = inner.wait(0.1);
            elapsed2.store(actual.to_bits(), Ordering::SeqCst);
            done2.store(true, Ordering::SeqCst);
        });

        let deadline = Instant::now() + Duration::from_secs(10);
        while !done.load(Ordering::SeqCst) {
            assert!(Instant::now() < deadline, "script never resumed");
            engine.tick(0.05);
        }
        assert!(f64::from_bits(elapsed_bits.load(Ordering::SeqCst)) >= 0.1);
    }

    #[test]
    fn test_wait_next_frame_returns_delta() {
        let engine = Engine::new();
        let delta_bits = Arc::new(AtomicU64::new(0));
        let done = Arc::new(AtomicBool::new(false));

        let inner = engine.clone();
        let delta2 = Arc::clone(&delta_bits);
        let done2 = Arc::clone(&done);
        engine.go(move || {
            let delta = inner.wait_next_frame();
            delta2.store(delta.to_bits(), Ordering::SeqCst);
            done2.store(true, Ordering::SeqCst);
        });

        wait_for("script to park", || engine.scheduler().queued_entries() == 1);
        engine.tick(0.02);
        engine.tick(0.02);
        wait_for("script to finish", || engine.live_tasks() == 0);
        assert_eq!(f64::from_bits(delta_bits.load(Ordering::SeqCst)), 0.02);
    }

    #[test]
    fn test_shutdown_leaves_nothing_live() {
        let engine = Engine::new();
        let inner = engine.clone();
        engine.go(move || {
            inner.wait(100.0);
        });
        wait_for("script to park", || engine.scheduler().queued_entries() == 1);
        engine.shutdown();
        assert_eq!(engine.live_tasks(), 0);
    }
}
