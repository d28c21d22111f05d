//! Error taxonomy for sweeps.
//!
//! Per-job errors ([`JobExecutionError`], [`ArtifactParseError`]) are recorded
//! on the job and never abort a sweep. [`SweepError`] is what a caller sees
//! when the sweep as a whole cannot produce a report.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SweepError>;

/// Terminal sweep failures.
#[derive(Debug, Error)]
pub enum SweepError {
    /// Bad inputs detected before any job was scheduled.
    #[error("invalid input: {0}")]
    InputValidation(String),

    #[error("invalid range for `{parameter}`: {source}")]
    Range {
        parameter: &'static str,
        #[source]
        source: RangeSpecError,
    },

    /// The grid was empty, so nothing ran.
    #[error("parameter grid produced no jobs")]
    NoJobs,

    /// Every job ran (or was served from cache) but none qualified.
    #[error(
        "no solution accepted: {executed} jobs executed, {failed} failed, 0 passed the acceptance criteria"
    )]
    NoAcceptedSolution { executed: usize, failed: usize },

    #[error("sweep cancelled after {completed} of {total} jobs")]
    Cancelled { completed: usize, total: usize },

    #[error("failed to load {what} from '{path}': {source}", path = path.display())]
    Input {
        what: &'static str,
        path: PathBuf,
        #[source]
        source: ArtifactParseError,
    },

    #[error("failed to read config file '{path}': {message}", path = path.display())]
    Config { path: PathBuf, message: String },

    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a single solver invocation did not produce a usable artifact.
#[derive(Debug, Error)]
pub enum JobExecutionError {
    #[error("failed to launch solver: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("solver exited with {}", describe_exit(.code))]
    NonZeroExit { code: Option<i32> },

    #[error("solver exceeded the {secs}s timeout and was killed")]
    TimedOut { secs: u64 },

    #[error("solver exited cleanly but '{}' was not written", .0.display())]
    MissingArtifact(PathBuf),

    #[error("I/O error while running solver: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

/// Malformed or unreadable graph/prize/info artifacts.
#[derive(Debug, Error)]
pub enum ArtifactParseError {
    #[error("cannot read '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{path}' line {line}: expected at least {expected} columns, found {found}", path = path.display())]
    MalformedRow {
        path: PathBuf,
        line: usize,
        expected: usize,
        found: usize,
    },
}

#[derive(Debug, Error, PartialEq)]
pub enum RangeSpecError {
    #[error("cannot parse '{0}' as a number")]
    NotANumber(String),

    #[error("sample count must be at least 1")]
    ZeroCount,

    #[error("step must be non-zero")]
    ZeroStep,

    #[error("step {step} never reaches {stop} from {start}")]
    WrongDirection { start: f64, stop: f64, step: f64 },

    #[error("{0} is not a finite number within the accepted bounds")]
    OutOfBounds(f64),

    #[error("range expands to more than {max} samples")]
    TooManySamples { max: usize },

    #[error("expected `start,end,count`, `start:stop:step` or a single value, got '{0}'")]
    Syntax(String),
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("no rows to export")]
    NoRows,

    #[error("failed to write report table: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to serialize summary: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to persist '{path}': {source}", path = path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error while writing report: {0}")]
    Io(#[from] std::io::Error),
}
