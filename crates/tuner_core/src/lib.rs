//! Parameter sweeps over an external prize-collecting Steiner forest solver.
//!
//! This crate expands a grid of solver parameters (`w`, `b`, `mu`), runs the
//! solver once per grid point in parallel, parses the resulting forests,
//! filters them by terminal coverage and picks the most tree-like one.
//! Solver outputs are addressed by label, so re-running a sweep only
//! launches the jobs whose artifacts are missing.
//!
//! # Quick Start
//!
//! ```no_run
//! use tuner_core::{run_sweep, CancellationToken, RangeSpec, SolverCommand, SweepConfig, TracingObserver};
//!
//! let config = SweepConfig {
//!     working_dir: "runs".into(),
//!     solver: SolverCommand::new("forest.py", "msgsteiner").with_interpreter("python"),
//!     prize_path: "data/prizes.txt".into(),
//!     edge_path: "data/interactome.sif".into(),
//!     grid: tuner_core::ParameterSpace::grid()
//!         .w(RangeSpec::linspace(1.0, 10.0, 10))
//!         .b(RangeSpec::linspace(1.0, 10.0, 10))
//!         .mu(RangeSpec::value(0.1)),
//!     processes: 8,
//!     ..SweepConfig::default()
//! };
//!
//! let report = run_sweep(&config, &TracingObserver, &CancellationToken::new()).unwrap();
//! println!("best: {}", report.best().unwrap().label());
//! ```
//!
//! # Architecture
//!
//! - [`parameters`]: Range specs and grid expansion
//! - [`jobs`]: Labels, config artifacts and job descriptors
//! - [`artifacts`]: On-disk layout and atomic writes
//! - [`runner`]: Solver processes and the worker pool
//! - [`graph`]: Edge-list parsing and component analysis
//! - [`metrics`]: Per-solution statistics
//! - [`selection`]: Acceptance and best-solution choice
//! - [`export`]: Report table, best network and JSON summary
//! - [`sweep`]: The end-to-end pipeline
//! - [`config`]: Sweep configuration and TOML loading

pub mod artifacts;
pub mod config;
pub mod error;
pub mod export;
pub mod graph;
pub mod jobs;
pub mod metrics;
pub mod observer;
pub mod parameters;
pub mod runner;
pub mod selection;
pub mod sweep;

pub use config::SweepConfig;
pub use error::{ArtifactParseError, JobExecutionError, RangeSpecError, ReportError, SweepError};
pub use export::ReportOrder;
pub use graph::EdgeDialect;
pub use metrics::SolutionMetrics;
pub use observer::{SweepObserver, TracingObserver};
pub use parameters::{ParameterConfig, ParameterSpace, RangeSpec};
pub use runner::{CancellationToken, RetentionPolicy, SolverCommand};
pub use sweep::{run_sweep, SweepReport};
