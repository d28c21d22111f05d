//! End-to-end sweep: grid, jobs, solver runs, selection and reports.

use std::path::PathBuf;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::artifacts::ArtifactKind;
use crate::config::SweepConfig;
use crate::error::{Result, SweepError};
use crate::export::{ReportFiles, SweepSummary};
use crate::graph::{EdgeDialect, ForestGraph, InteractionNetwork, TerminalSet};
use crate::jobs::materialize_jobs;
use crate::metrics::{extract_metrics, read_solve_time, MetricsContext, SolutionMetrics};
use crate::observer::SweepObserver;
use crate::runner::{run_parallel_jobs, CancellationToken, JobResult, JobStatus};
use crate::selection::{forest_feature, select_best, AcceptanceCriteria, Solution};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepCounters {
    pub total: usize,
    pub cached: usize,
    /// Solver processes actually started.
    pub launched: usize,
    /// Execution failures plus unparseable artifacts.
    pub failed: usize,
    pub parse_failures: usize,
    pub accepted: usize,
}

impl SweepCounters {
    /// Jobs that produced an artifact, by launch or cache.
    pub fn executed(&self) -> usize {
        self.total - self.failed + self.parse_failures
    }
}

/// Files written for a successful sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub table: PathBuf,
    pub best_network: PathBuf,
    pub summary: Option<PathBuf>,
}

#[derive(Debug)]
pub struct SweepReport {
    /// One row per accepted solution, in grid order.
    pub rows: Vec<SolutionMetrics>,
    /// Every parsed solution, accepted or not, in grid order.
    pub solutions: Vec<Solution>,
    /// Index into `solutions`.
    pub best: Option<usize>,
    pub counters: SweepCounters,
    pub paths: ReportPaths,
}

impl SweepReport {
    pub fn best(&self) -> Option<&Solution> {
        self.best.map(|idx| &self.solutions[idx])
    }
}

/// Read-only inputs shared by every result evaluation.
pub struct Evaluation<'a> {
    pub criteria: AcceptanceCriteria,
    pub dialect: EdgeDialect,
    pub context: MetricsContext<'a>,
    /// Read solve times from info artifacts.
    pub read_info: bool,
}

/// Parse and judge every successful result.
///
/// Failed results only touch the counters. Unparseable artifacts are logged
/// and counted as failures; they never abort the sweep.
pub fn evaluate_results(
    results: Vec<JobResult>,
    evaluation: &Evaluation<'_>,
) -> (Vec<Solution>, SweepCounters) {
    let mut counters = SweepCounters {
        total: results.len(),
        ..SweepCounters::default()
    };
    let mut solutions = Vec::new();

    for result in results {
        if result.launched() {
            counters.launched += 1;
        }
        match result.status {
            JobStatus::Cached => counters.cached += 1,
            JobStatus::Completed => {}
            JobStatus::Failed(_) | JobStatus::Cancelled => {
                counters.failed += 1;
                continue;
            }
        }

        let graph = match ForestGraph::load(&result.artifact_path, evaluation.dialect) {
            Ok(graph) => graph,
            Err(err) => {
                warn!(label = %result.job.label, "unusable solution artifact: {err}");
                counters.failed += 1;
                counters.parse_failures += 1;
                continue;
            }
        };

        let mut solution = Solution {
            result,
            graph,
            metrics: None,
            score: None,
            rejection: None,
        };
        match evaluation
            .criteria
            .evaluate(&solution.graph, evaluation.context.terminals)
        {
            Ok(()) => {
                let job = &solution.result.job;
                let solve_time = if evaluation.read_info {
                    read_solve_time(&job.auxiliary_path(ArtifactKind::Info))
                } else {
                    None
                };
                solution.metrics = Some(extract_metrics(
                    &job.label,
                    &job.config,
                    &solution.graph,
                    solve_time,
                    &evaluation.context,
                ));
                solution.score = Some(forest_feature(&solution.graph));
                counters.accepted += 1;
            }
            Err(rejection) => {
                debug!(label = %solution.label(), "rejected: {rejection}");
                solution.rejection = Some(rejection);
            }
        }
        solutions.push(solution);
    }

    (solutions, counters)
}

/// Run a full sweep described by `config`.
///
/// # Errors
///
/// Fails before scheduling on invalid inputs or an empty grid, and after
/// execution when the sweep was cancelled or no solution was accepted. In
/// those cases no report is written.
pub fn run_sweep(
    config: &SweepConfig,
    observer: &dyn SweepObserver,
    cancel: &CancellationToken,
) -> Result<SweepReport> {
    let started = Instant::now();
    config.validate()?;

    let configs = config.grid.generate()?;
    if configs.is_empty() {
        return Err(SweepError::NoJobs);
    }
    info!(configs = configs.len(), "generated parameter grid");

    let terminals = TerminalSet::load(&config.prize_path).map_err(|source| SweepError::Input {
        what: "prize file",
        path: config.prize_path.clone(),
        source,
    })?;
    let network = InteractionNetwork::load(&config.edge_path, config.edge_dialect).map_err(
        |source| SweepError::Input {
            what: "interaction network",
            path: config.edge_path.clone(),
            source,
        },
    )?;
    info!(
        terminals = terminals.len(),
        network_nodes = network.node_count(),
        "loaded inputs"
    );

    let layout = config.layout();
    let jobs = materialize_jobs(configs, &config.inputs(), &layout)?;
    let settings = config.run_settings();
    let results = run_parallel_jobs(jobs, &settings, config.processes, cancel, observer)?;

    if cancel.is_cancelled() {
        let total = results.len();
        let completed = results
            .iter()
            .filter(|result| !matches!(result.status, JobStatus::Cancelled))
            .count();
        return Err(SweepError::Cancelled { completed, total });
    }

    let evaluation = Evaluation {
        criteria: config.criteria(),
        dialect: config.solution_dialect,
        context: MetricsContext {
            terminals: &terminals,
            network: &network,
            landmark: config.landmark.as_deref(),
        },
        read_info: settings.retention.keep_info,
    };
    let (solutions, counters) = evaluate_results(results, &evaluation);
    info!(
        total = counters.total,
        cached = counters.cached,
        launched = counters.launched,
        failed = counters.failed,
        accepted = counters.accepted,
        "all jobs finished"
    );

    let Some(best_idx) = select_best(&solutions) else {
        return Err(SweepError::NoAcceptedSolution {
            executed: counters.executed(),
            failed: counters.failed,
        });
    };

    let rows: Vec<SolutionMetrics> = solutions
        .iter()
        .filter_map(|solution| solution.metrics.clone())
        .collect();

    let best = &solutions[best_idx];
    let table = config.resolved_report_path();
    let best_network = layout.artifact_path(best.label(), ArtifactKind::BestForest);
    let mut files = ReportFiles::new()
        .table(&rows, config.report_order, &table)?
        .network(&best.graph, &best_network);

    let summary = match (&config.summary_path, &best.metrics, best.score) {
        (Some(path), Some(metrics), Some(score)) => {
            let summary = SweepSummary {
                best_label: best.label().to_string(),
                best_config: best.result.job.config.clone(),
                best_score: score,
                best_metrics: metrics.clone(),
                jobs_total: counters.total,
                jobs_cached: counters.cached,
                jobs_launched: counters.launched,
                jobs_failed: counters.failed,
                solutions_accepted: counters.accepted,
            };
            files = files.summary(&summary, path)?;
            Some(path.clone())
        }
        _ => None,
    };
    files.persist()?;

    let best_config = &best.result.job.config;
    info!(
        label = %best.label(),
        w = best_config.w,
        b = best_config.b,
        mu = best_config.mu,
        score = best.score.unwrap_or_default(),
        report = %table.display(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "best configuration selected"
    );

    Ok(SweepReport {
        rows,
        solutions,
        best: Some(best_idx),
        counters,
        paths: ReportPaths {
            table,
            best_network,
            summary,
        },
    })
}
