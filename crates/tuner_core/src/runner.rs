//! Solver execution: one job at a time, or a whole grid on a worker pool.
//!
//! A job whose solution artifact already exists is a cache hit and never
//! launches a process. Failures stay with their job; nothing here retries,
//! and one failing job never affects another.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::artifacts::{atomic_write, ArtifactKind};
use crate::error::{JobExecutionError, SweepError};
use crate::jobs::Job;
use crate::observer::SweepObserver;

mod solver;

pub use solver::{run_captured, CapturedOutput, SolverCommand};

/// Which solver by-products survive a successful run. The canonical solution
/// artifact is always kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionPolicy {
    /// Keep the info artifact (needed for solve-time metrics).
    pub keep_info: bool,
    /// Keep augmented/dummy networks and the attribute tables.
    pub keep_intermediates: bool,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            keep_info: true,
            keep_intermediates: false,
        }
    }
}

impl RetentionPolicy {
    pub fn keep_all() -> Self {
        Self {
            keep_info: true,
            keep_intermediates: true,
        }
    }

    /// Artifacts this policy deletes after a successful run.
    pub fn disposable(&self) -> Vec<ArtifactKind> {
        let mut kinds = Vec::new();
        if !self.keep_intermediates {
            kinds.extend([
                ArtifactKind::AugmentedForest,
                ArtifactKind::DummyForest,
                ArtifactKind::EdgeAttributes,
                ArtifactKind::NodeAttributes,
            ]);
        }
        if !self.keep_info {
            kinds.push(ArtifactKind::Info);
        }
        kinds
    }

    fn apply(&self, job: &Job) {
        for kind in self.disposable() {
            let path = job.auxiliary_path(kind);
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => warn!(path = %path.display(), "failed to remove solver artifact: {err}"),
            }
        }
    }
}

/// Per-sweep execution settings shared read-only by all workers.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub solver: SolverCommand,
    pub retention: RetentionPolicy,
    /// Kill a solver that runs longer than this.
    pub timeout: Option<Duration>,
}

impl RunSettings {
    pub fn new(solver: SolverCommand) -> Self {
        Self {
            solver,
            retention: RetentionPolicy::default(),
            timeout: None,
        }
    }
}

#[derive(Debug)]
pub enum JobStatus {
    /// Artifact already existed; no process was launched.
    Cached,
    /// Solver ran and produced the artifact.
    Completed,
    Failed(JobExecutionError),
    /// Sweep was cancelled before this job was dispatched.
    Cancelled,
}

#[derive(Debug)]
pub struct JobResult {
    pub job: Job,
    pub artifact_path: PathBuf,
    pub status: JobStatus,
    /// Captured stdout then stderr; empty for cache hits.
    pub log: String,
}

impl JobResult {
    fn new(job: Job, status: JobStatus, log: String) -> Self {
        Self {
            artifact_path: job.artifact_path.clone(),
            job,
            status,
            log,
        }
    }

    pub fn succeeded(&self) -> bool {
        matches!(self.status, JobStatus::Cached | JobStatus::Completed)
    }

    /// Whether a solver process was started for this result.
    pub fn launched(&self) -> bool {
        match &self.status {
            JobStatus::Completed => true,
            JobStatus::Failed(err) => !matches!(err, JobExecutionError::Spawn(_)),
            JobStatus::Cached | JobStatus::Cancelled => false,
        }
    }
}

/// Sweep-wide stop flag, checked before each job is dispatched. Jobs already
/// running are allowed to finish.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Worker count actually used: the request clamped to the host's
/// parallelism, never below one.
pub fn effective_workers(requested: usize) -> usize {
    let available = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    requested.min(available).max(1)
}

/// A failed or killed run may leave a partial forest behind. It must not be
/// picked up as a cached solution by a later sweep.
fn discard_artifact(job: &Job) {
    match fs::remove_file(&job.artifact_path) {
        Ok(()) => warn!(label = %job.label, "discarded forest from failed run"),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => warn!(label = %job.label, "failed to remove forest from failed run: {err}"),
    }
}

fn execute(job: &Job, settings: &RunSettings) -> (Result<(), JobExecutionError>, String) {
    let cmd = settings.solver.command_for(job);
    let output = match run_captured(cmd, settings.timeout) {
        Ok(output) => output,
        Err(err) => return (Err(JobExecutionError::Spawn(err)), String::new()),
    };

    let combined = output.combined_log();
    let log = String::from_utf8_lossy(&combined).into_owned();
    if let Err(err) = atomic_write(&job.log_path, &combined) {
        warn!(label = %job.label, "failed to write solver log: {err}");
    }

    let outcome = if output.timed_out {
        discard_artifact(job);
        Err(JobExecutionError::TimedOut {
            secs: settings.timeout.map(|t| t.as_secs()).unwrap_or_default(),
        })
    } else if !output.status.success() {
        discard_artifact(job);
        Err(JobExecutionError::NonZeroExit {
            code: output.status.code(),
        })
    } else if !job.artifact_path.exists() {
        Err(JobExecutionError::MissingArtifact(job.artifact_path.clone()))
    } else {
        settings.retention.apply(job);
        Ok(())
    };
    (outcome, log)
}

/// Run one job, or short-circuit if its artifact already exists.
pub fn run_single_job(job: Job, settings: &RunSettings, observer: &dyn SweepObserver) -> JobResult {
    let started = Instant::now();
    let result = if job.artifact_path.exists() {
        observer.cache_hit(&job);
        JobResult::new(job, JobStatus::Cached, String::new())
    } else {
        observer.job_started(&job);
        let (outcome, log) = execute(&job, settings);
        let status = match outcome {
            Ok(()) => JobStatus::Completed,
            Err(err) => JobStatus::Failed(err),
        };
        JobResult::new(job, status, log)
    };
    observer.job_finished(&result, started.elapsed());
    result
}

/// Run every job on a pool of `effective_workers(workers)` threads.
///
/// Blocks until each job has a result. Results come back in grid order
/// regardless of completion order.
pub fn run_parallel_jobs(
    jobs: Vec<Job>,
    settings: &RunSettings,
    workers: usize,
    cancel: &CancellationToken,
    observer: &dyn SweepObserver,
) -> Result<Vec<JobResult>, SweepError> {
    let threads = effective_workers(workers);
    info!(jobs = jobs.len(), workers = threads, "dispatching solver jobs");

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|idx| format!("solver-worker-{idx}"))
        .build()?;

    let mut results: Vec<JobResult> = pool.install(|| {
        jobs.into_par_iter()
            .map(|job| {
                if cancel.is_cancelled() {
                    let result = JobResult::new(job, JobStatus::Cancelled, String::new());
                    observer.job_finished(&result, Duration::ZERO);
                    result
                } else {
                    run_single_job(job, settings, observer)
                }
            })
            .collect()
    });

    results.sort_by_key(|result| result.job.index);
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workers_are_clamped_to_host() {
        let available = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_workers(usize::MAX), available);
        assert_eq!(effective_workers(0), 1);
        assert_eq!(effective_workers(1), 1);
    }

    #[test]
    fn default_retention_keeps_info() {
        let kinds = RetentionPolicy::default().disposable();
        assert!(!kinds.contains(&ArtifactKind::Info));
        assert!(!kinds.contains(&ArtifactKind::OptimalForest));
        assert_eq!(kinds.len(), 4);

        let strict = RetentionPolicy {
            keep_info: false,
            keep_intermediates: false,
        };
        assert!(strict.disposable().contains(&ArtifactKind::Info));
        assert!(RetentionPolicy::keep_all().disposable().is_empty());
    }

    #[test]
    fn cancellation_token_is_shared() {
        let token = CancellationToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }
}
