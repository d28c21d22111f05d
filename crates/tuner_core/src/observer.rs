//! Job lifecycle events.
//!
//! The orchestrator and the process runner report through a
//! [`SweepObserver`] handed to them by the caller instead of logging
//! globally, so tests can count launches and cache hits directly.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::jobs::Job;
use crate::runner::{JobResult, JobStatus};

pub trait SweepObserver: Sync {
    /// A solver process is about to be launched for `job`.
    fn job_started(&self, job: &Job);

    /// `job`'s solution artifact already existed; nothing was launched.
    fn cache_hit(&self, job: &Job);

    /// `result` is final for its job.
    fn job_finished(&self, result: &JobResult, elapsed: Duration);
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl SweepObserver for TracingObserver {
    fn job_started(&self, job: &Job) {
        debug!(label = %job.label, index = job.index, "launching solver");
    }

    fn cache_hit(&self, job: &Job) {
        debug!(label = %job.label, "solution artifact exists, skipping solver");
    }

    fn job_finished(&self, result: &JobResult, elapsed: Duration) {
        match &result.status {
            JobStatus::Completed => info!(
                label = %result.job.label,
                elapsed_ms = elapsed.as_millis() as u64,
                "solver finished"
            ),
            JobStatus::Cached => {}
            JobStatus::Failed(err) => warn!(
                label = %result.job.label,
                log = %result.job.log_path.display(),
                "job failed: {err}"
            ),
            JobStatus::Cancelled => debug!(label = %result.job.label, "job cancelled before launch"),
        }
    }
}
