//! Bounded external job lane.
//!
//! Work posted from outside the coroutine world (or from hosts too cheap to
//! run one thread per task) lands here and is drained at the head of each
//! tick pass, up to the watchdog budget.

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::error::SchedulerError;

pub(crate) type Job = Box<dyn FnOnce() + Send>;

pub(crate) struct JobLane {
    tx: Sender<Job>,
    rx: Receiver<Job>,
    capacity: usize,
}

impl JobLane {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity);
        JobLane { tx, rx, capacity }
    }

    /// Post a job for execution during the next tick pass. Fails instead of
    /// blocking when the lane is full (backpressure, not a queue of record).
    pub(crate) fn post(&self, job: Job) -> Result<(), SchedulerError> {
        self.tx
            .try_send(job)
            .map_err(|_| SchedulerError::job_lane_full(self.capacity))
    }

    pub(crate) fn try_take(&self) -> Option<Job> {
        self.rx.try_recv().ok()
    }
}
