//! Scheduler core: task lifecycle, the single execution permit, and the
//! suspension primitives.
//!
//! Task bodies run on their own OS threads, but `ExecPermit` restricts
//! actual execution to one body at a time, so the whole scripting model is
//! cooperative and single-logical-thread. Suspension points are exactly the
//! `yield_current` calls made by the wait primitives; a body that never
//! waits starves every other task, by design.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, Weak};
use std::thread;
use std::time::Duration;

use crate::clock::GameClock;
use crate::error::SchedulerError;
use crate::ids::{EntryId, TaskId};
use crate::jobs::JobLane;
use crate::queue::SpliceQueue;
use crate::sched_debug_log;
use crate::stats::TickStats;
use crate::task::{TaskAborted, TaskOwner};
use crate::wait::{ReleaseKind, WaitEntry};

/// How `process_tick` services due entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrainMode {
    /// Full hand-off model: after firing an entry the tick pass waits until
    /// the resumed task parks again (or exits) before servicing the next
    /// one, which makes within-tick resume order deterministic FIFO.
    Cooperative,
    /// Degraded-host model: fire and move on without waiting. Resumed tasks
    /// run whenever the host schedules them; the external contract (resume
    /// no earlier than requested) still holds.
    Bounded,
}

#[derive(Clone, Copy, Debug)]
pub struct SchedulerConfig {
    /// Wall-clock watchdog budget for one tick pass.
    pub tick_budget: Duration,
    pub drain: DrainMode,
    /// Capacity of the external job lane.
    pub job_capacity: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            tick_budget: Duration::from_millis(100),
            drain: DrainMode::Cooperative,
            job_capacity: 1024,
        }
    }
}

impl SchedulerConfig {
    /// Configuration for hosts where per-task threads are expensive and a
    /// frame must never stall on stragglers.
    pub fn bounded_host() -> Self {
        SchedulerConfig {
            tick_budget: Duration::from_millis(16),
            drain: DrainMode::Bounded,
            job_capacity: 1024,
        }
    }
}

/// Binary semaphore enforcing "only one task body runs at a time".
struct ExecPermit {
    held: Mutex<bool>,
    cv: Condvar,
}

impl ExecPermit {
    fn new() -> Self {
        ExecPermit {
            held: Mutex::new(false),
            cv: Condvar::new(),
        }
    }

    fn acquire(&self) {
        let mut held = self.held.lock().expect("scheduler lock poisoned");
        while *held {
            held = self.cv.wait(held).expect("scheduler lock poisoned");
        }
        *held = true;
    }

    fn release(&self) {
        let mut held = self.held.lock().expect("scheduler lock poisoned");
        if !*held {
            panic!("execution permit released while not held");
        }
        *held = false;
        self.cv.notify_one();
    }
}

struct TaskRecord {
    owner: Option<Arc<dyn TaskOwner>>,
}

/// The coroutine manager. One instance per running game; embed several in
/// tests freely, there is no global state.
pub struct Scheduler {
    permit: ExecPermit,
    /// Parked flag per suspended task: true until a resume flips it.
    suspended: Mutex<HashMap<TaskId, bool>>,
    resumed_cv: Condvar,
    /// Every live task, created until retired. Carries the liveness owner.
    tasks: Mutex<HashMap<TaskId, TaskRecord>>,
    /// Raw id of the active task; 0 when none.
    current: AtomicU64,
    next_task_id: AtomicU64,
    next_entry_id: AtomicU64,
    live_tasks: AtomicU64,
    shutting_down: AtomicBool,
    pub(crate) cur_queue: SpliceQueue<WaitEntry>,
    pub(crate) next_queue: SpliceQueue<WaitEntry>,
    pub(crate) jobs: JobLane,
    pub(crate) clock: Arc<GameClock>,
    pub(crate) config: SchedulerConfig,
    pub(crate) last_stats: Mutex<TickStats>,
}

impl Scheduler {
    pub fn new(clock: Arc<GameClock>) -> Arc<Self> {
        Self::with_config(clock, SchedulerConfig::default())
    }

    pub fn with_config(clock: Arc<GameClock>, config: SchedulerConfig) -> Arc<Self> {
        Arc::new(Scheduler {
            permit: ExecPermit::new(),
            suspended: Mutex::new(HashMap::new()),
            resumed_cv: Condvar::new(),
            tasks: Mutex::new(HashMap::new()),
            current: AtomicU64::new(0),
            next_task_id: AtomicU64::new(1),
            next_entry_id: AtomicU64::new(1),
            live_tasks: AtomicU64::new(0),
            shutting_down: AtomicBool::new(false),
            cur_queue: SpliceQueue::new(),
            next_queue: SpliceQueue::new(),
            jobs: JobLane::with_capacity(config.job_capacity),
            clock,
            config,
            last_stats: Mutex::new(TickStats::default()),
        })
    }

    pub fn clock(&self) -> &Arc<GameClock> {
        &self.clock
    }

    pub fn config(&self) -> SchedulerConfig {
        self.config
    }

    /// The task whose body is currently executing, if any.
    pub fn current(&self) -> Option<TaskId> {
        match self.current.load(Ordering::SeqCst) {
            0 => None,
            raw => Some(TaskId::from_raw(raw)),
        }
    }

    pub fn live_task_count(&self) -> usize {
        self.live_tasks.load(Ordering::SeqCst) as usize
    }

    /// Wait entries pending across both queues.
    pub fn queued_entries(&self) -> usize {
        self.cur_queue.len() + self.next_queue.len()
    }

    /// Statistics recorded by the most recent tick pass.
    pub fn last_tick_stats(&self) -> TickStats {
        *self.last_stats.lock().expect("scheduler lock poisoned")
    }

    /// Spawn a new task bound to `owner` and start its body as an
    /// independent activity. The body cannot interleave with any other
    /// active body: its thread acquires the execution permit and records
    /// itself active before the body runs.
    pub fn create<F>(self: &Arc<Self>, owner: Option<Arc<dyn TaskOwner>>, body: F) -> TaskId
    where
        F: FnOnce(TaskId) + Send + 'static,
    {
        self.create_and_start(owner, body, None)
    }

    /// Like `create`, but when `requesting` names the running task that
    /// asked for the spawn, the caller briefly yields the OS scheduler so
    /// the new task gets a chance to run up to its first suspension point.
    /// A scheduling hint only, never a correctness requirement.
    pub fn create_and_start<F>(
        self: &Arc<Self>,
        owner: Option<Arc<dyn TaskOwner>>,
        body: F,
        requesting: Option<TaskId>,
    ) -> TaskId
    where
        F: FnOnce(TaskId) + Send + 'static,
    {
        let id = TaskId::from_raw(self.next_task_id.fetch_add(1, Ordering::Relaxed));
        self.tasks
            .lock()
            .expect("scheduler lock poisoned")
            .insert(id, TaskRecord { owner });
        self.live_tasks.fetch_add(1, Ordering::SeqCst);

        let sched = Arc::clone(self);
        thread::Builder::new()
            .name(format!("greenstage-task-{}", id.raw()))
            .spawn(move || sched.run_task(id, body))
            .expect("failed to spawn task thread");

        if requesting.is_some() {
            thread::yield_now();
        }
        id
    }

    fn run_task<F>(&self, me: TaskId, body: F)
    where
        F: FnOnce(TaskId),
    {
        self.permit.acquire();
        self.current.store(me.raw(), Ordering::SeqCst);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.check_abort(me);
            body(me);
        }));
        self.retire(me);
        self.permit.release();
        if let Err(payload) = outcome {
            if payload.downcast_ref::<TaskAborted>().is_none() {
                // An application bug, not a stop: let it propagate.
                panic::resume_unwind(payload);
            }
            sched_debug_log!("task {} aborted", me.raw());
        }
    }

    fn retire(&self, me: TaskId) {
        self.suspended
            .lock()
            .expect("scheduler lock poisoned")
            .remove(&me);
        self.tasks
            .lock()
            .expect("scheduler lock poisoned")
            .remove(&me);
        self.live_tasks.fetch_sub(1, Ordering::SeqCst);
        let _ = self
            .current
            .compare_exchange(me.raw(), 0, Ordering::SeqCst, Ordering::SeqCst);
    }

    /// Suspend the active task until something resumes it.
    ///
    /// Panics when `task` is not the active task: that is caller corruption,
    /// not a recoverable condition. On wake the task re-acquires the
    /// execution permit, re-installs itself active, and runs the abort
    /// check before control returns to the body.
    pub fn yield_current(&self, task: TaskId) {
        if self.current.load(Ordering::SeqCst) != task.raw() {
            panic!(
                "{}",
                SchedulerError::yield_from_inactive(task, self.current())
            );
        }
        self.permit.release();

        let mut suspended = self.suspended.lock().expect("scheduler lock poisoned");
        suspended.insert(task, true);
        while suspended.get(&task).copied().unwrap_or(false) {
            suspended = self
                .resumed_cv
                .wait(suspended)
                .expect("scheduler lock poisoned");
        }
        suspended.remove(&task);
        drop(suspended);

        self.permit.acquire();
        self.current.store(task.raw(), Ordering::SeqCst);
        self.check_abort(task);
    }

    /// Mark a suspended task ready and wake it. Idempotent: resuming a task
    /// that was already marked ready is a no-op, and resuming a task that no
    /// longer exists discards the request (a stopped task's pending
    /// resumption must never hang or touch freed state). When the resume
    /// arrives before the corresponding yield has registered the task as
    /// suspended, retries with a scheduling yield until it has.
    pub fn resume(&self, task: TaskId) {
        loop {
            {
                let mut suspended = self.suspended.lock().expect("scheduler lock poisoned");
                if let Some(parked) = suspended.get_mut(&task) {
                    if *parked {
                        *parked = false;
                        self.resumed_cv.notify_all();
                    }
                    return;
                }
            }
            let tracked = self
                .tasks
                .lock()
                .expect("scheduler lock poisoned")
                .contains_key(&task);
            if !tracked {
                return;
            }
            thread::yield_now();
        }
    }

    /// Suspend the caller for `secs` of game time. Returns the game time
    /// actually elapsed, which can exceed the request by frame granularity.
    pub fn wait(self: &Arc<Self>, secs: f64) -> f64 {
        let me = self.require_current();
        let start = self.clock.game_time();
        let entry = self.resume_entry(me, ReleaseKind::AtTime(start + secs));
        self.cur_queue.push_back(entry);
        self.yield_current(me);
        self.clock.game_time() - start
    }

    /// Suspend the caller until the frame counter advances. Returns the
    /// delta time of the frame that resumed it.
    pub fn wait_next_frame(self: &Arc<Self>) -> f64 {
        let me = self.require_current();
        let entry = self.resume_entry(me, ReleaseKind::AtFrame(self.clock.frame()));
        self.cur_queue.push_back(entry);
        self.yield_current(me);
        self.clock.delta_time()
    }

    /// Suspend the caller and run `call` synchronously inside the next tick
    /// pass, ahead of every time/frame entry already queued. Main-context
    /// work typically touches a non-reentrant engine API that other pending
    /// work depends on, hence the front insertion.
    pub fn wait_main<F>(self: &Arc<Self>, call: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let me = self.require_current();
        let id = self.fresh_entry_id();
        let weak = Arc::downgrade(self);
        let entry = WaitEntry::new(
            id,
            me,
            ReleaseKind::MainContext,
            Box::new(move || {
                call();
                resume_via(&weak, me);
            }),
        );
        self.cur_queue.push_front(entry);
        self.yield_current(me);
    }

    /// Give other tasks a turn without waiting on the clock: dispatch an
    /// asynchronous self-resume, then park. The caller wakes as soon as the
    /// resume lands, so no tick pass runs and no game time or frame passes
    /// in between. Lets a long-running body stay fair mid-computation.
    pub fn reschedule(self: &Arc<Self>) {
        let me = self.require_current();
        let sched = Arc::clone(self);
        thread::Builder::new()
            .name(format!("greenstage-resume-{}", me.raw()))
            .spawn(move || sched.resume(me))
            .expect("failed to spawn resume thread");
        self.yield_current(me);
    }

    /// Post a job from any thread for execution during the next tick pass.
    pub fn post<F>(&self, job: F) -> Result<(), SchedulerError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.jobs.post(Box::new(job))
    }

    /// Tear down for embedding/testing: abort every task at its next
    /// resumption and wait until none are live. Pending wait entries are
    /// dropped unfired.
    pub fn shutdown(&self) {
        self.shutting_down.store(true, Ordering::SeqCst);
        while self.live_tasks.load(Ordering::SeqCst) > 0 {
            let mut suspended = self.suspended.lock().expect("scheduler lock poisoned");
            for parked in suspended.values_mut() {
                *parked = false;
            }
            self.resumed_cv.notify_all();
            drop(suspended);
            thread::yield_now();
        }
        while !self.cur_queue.is_empty() {
            drop(self.cur_queue.pop_front());
        }
        while !self.next_queue.is_empty() {
            drop(self.next_queue.pop_front());
        }
    }

    fn fresh_entry_id(&self) -> EntryId {
        EntryId::from_raw(self.next_entry_id.fetch_add(1, Ordering::Relaxed))
    }

    fn resume_entry(self: &Arc<Self>, me: TaskId, kind: ReleaseKind) -> WaitEntry {
        // Weak capture: entries sit in the scheduler's own queues, a strong
        // Arc would cycle and keep the scheduler alive forever.
        let weak = Arc::downgrade(self);
        WaitEntry::new(
            self.fresh_entry_id(),
            me,
            kind,
            Box::new(move || resume_via(&weak, me)),
        )
    }

    fn require_current(&self) -> TaskId {
        self.current()
            .unwrap_or_else(|| panic!("{}", SchedulerError::wait_outside_task()))
    }

    pub(crate) fn check_abort(&self, me: TaskId) {
        if self.shutting_down.load(Ordering::SeqCst) {
            panic::panic_any(TaskAborted);
        }
        let owner_dead = {
            let tasks = self.tasks.lock().expect("scheduler lock poisoned");
            match tasks.get(&me) {
                Some(record) => record
                    .owner
                    .as_ref()
                    .map_or(false, |owner| !owner.is_live()),
                None => false,
            }
        };
        if owner_dead {
            panic::panic_any(TaskAborted);
        }
    }

    pub(crate) fn is_parked_or_gone(&self, task: TaskId) -> bool {
        let parked = self
            .suspended
            .lock()
            .expect("scheduler lock poisoned")
            .get(&task)
            .copied()
            .unwrap_or(false);
        if parked {
            return true;
        }
        !self
            .tasks
            .lock()
            .expect("scheduler lock poisoned")
            .contains_key(&task)
    }
}

fn resume_via(sched: &Weak<Scheduler>, task: TaskId) {
    if let Some(sched) = sched.upgrade() {
        sched.resume(task);
    }
}
