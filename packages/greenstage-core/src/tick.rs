//! Per-frame tick processing.
//!
//! The tick driver calls `process_tick` once per frame. The pass drains the
//! external job lane, then walks the "current" queue: due entries fire (and
//! in cooperative mode the pass waits for the resumed task to park again,
//! so resume order is FIFO), not-yet-due entries defer to the "next" queue.
//! A wall-clock watchdog bounds the whole pass; a pathological chain of
//! immediately-resuming tasks costs one frame of latency instead of an
//! unbounded frame. Afterwards the deferred queue is spliced back in as the
//! next pass's starting point.

use std::thread;
use std::time::Instant;

use crate::ids::TaskId;
use crate::scheduler::{DrainMode, Scheduler};
use crate::sched_debug_log;
use crate::stats::TickStats;
use crate::wait::ReleaseKind;

impl Scheduler {
    /// Process all due wait entries within the watchdog budget. Called once
    /// per frame by the tick driver; reads game time and frame from the
    /// clock, never advances them.
    pub fn process_tick(&self) {
        let pass_start = Instant::now();
        let budget = self.config.tick_budget;
        let cur_time = self.clock.game_time();
        let cur_frame = self.clock.frame();
        let mut stats = TickStats::default();

        stats.jobs_run = self.drain_jobs(pass_start);
        stats.init_time = pass_start.elapsed().as_secs_f64();

        let loop_start = Instant::now();
        let mut watchdog = false;
        while !self.cur_queue.is_empty() {
            stats.loop_iterations += 1;
            if pass_start.elapsed() >= budget {
                watchdog = true;
                break;
            }
            let entry = self.cur_queue.pop_front();
            stats.entries_processed += 1;
            match entry.kind {
                ReleaseKind::AtTime(_) => stats.wait_time_count += 1,
                ReleaseKind::AtFrame(_) => stats.wait_frame_count += 1,
                ReleaseKind::MainContext => stats.wait_main_count += 1,
            }
            if entry.is_due(cur_time, cur_frame) {
                let task = entry.task;
                entry.fire();
                if self.config.drain == DrainMode::Cooperative {
                    watchdog = self.wait_until_parked(task, pass_start);
                    if watchdog {
                        break;
                    }
                }
            } else {
                self.next_queue.push_back(entry);
            }
        }
        stats.watchdog_triggered = watchdog;
        stats.loop_time = loop_start.elapsed().as_secs_f64();

        let move_start = Instant::now();
        stats.deferred_count = self.next_queue.len();
        self.cur_queue.move_from(&self.next_queue);
        stats.move_time = move_start.elapsed().as_secs_f64();
        stats.total_time = pass_start.elapsed().as_secs_f64();

        if watchdog {
            sched_debug_log!(
                "tick watchdog: frame {} time {:.3} processed {} deferred {} total {:.3}ms",
                cur_frame,
                cur_time,
                stats.entries_processed,
                stats.deferred_count,
                stats.total_time * 1000.0
            );
        }
        *self.last_stats.lock().expect("scheduler lock poisoned") = stats;
    }

    fn drain_jobs(&self, pass_start: Instant) -> usize {
        let mut ran = 0;
        while let Some(job) = self.jobs.try_take() {
            job();
            ran += 1;
            if pass_start.elapsed() >= self.config.tick_budget {
                break;
            }
        }
        ran
    }

    /// Hand-off: block the pass until the task just resumed has either
    /// suspended again or exited. Returns true when the watchdog budget ran
    /// out first (the task keeps running on its own thread; exclusion is
    /// unaffected, the pass just stops waiting).
    fn wait_until_parked(&self, task: TaskId, pass_start: Instant) -> bool {
        loop {
            if self.is_parked_or_gone(task) {
                return false;
            }
            if pass_start.elapsed() >= self.config.tick_budget {
                return true;
            }
            thread::yield_now();
        }
    }
}
