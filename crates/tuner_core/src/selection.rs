//! Acceptance filtering and best-solution selection.
//!
//! A solution is accepted when it has at least one edge and covers strictly
//! more than `min_nodes_percent` of the prize-file terminals. Accepted
//! solutions are ranked by the forest feature
//! `|components - mean(component size)|`, lower is better, where a
//! component's size is its edge count.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::graph::{ForestGraph, TerminalSet};
use crate::metrics::{terminal_overlap, SolutionMetrics};
use crate::runner::JobResult;

/// Default minimum terminal overlap, in percent.
pub const DEFAULT_MIN_NODES_PERCENT: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AcceptanceCriteria {
    /// Overlap must be strictly greater than this percentage.
    pub min_nodes_percent: f64,
}

impl Default for AcceptanceCriteria {
    fn default() -> Self {
        Self {
            min_nodes_percent: DEFAULT_MIN_NODES_PERCENT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rejection {
    NoEdges,
    InsufficientOverlap { percent: f64 },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NoEdges => write!(f, "solution has no edges"),
            Rejection::InsufficientOverlap { percent } => {
                write!(f, "terminal overlap {percent:.2}% is not above the threshold")
            }
        }
    }
}

/// Percentage of prize-file terminals present in `graph`; 0 when the prize
/// file is empty.
pub fn overlap_percent(graph: &ForestGraph, terminals: &TerminalSet) -> f64 {
    if terminals.is_empty() {
        return 0.0;
    }
    100.0 * terminal_overlap(graph, terminals) as f64 / terminals.len() as f64
}

impl AcceptanceCriteria {
    pub fn new(min_nodes_percent: f64) -> Self {
        Self { min_nodes_percent }
    }

    pub fn evaluate(&self, graph: &ForestGraph, terminals: &TerminalSet) -> Result<(), Rejection> {
        if graph.edge_count() == 0 {
            return Err(Rejection::NoEdges);
        }
        let percent = overlap_percent(graph, terminals);
        if terminals.is_empty() || percent <= self.min_nodes_percent {
            return Err(Rejection::InsufficientOverlap { percent });
        }
        Ok(())
    }

    pub fn accepts(&self, graph: &ForestGraph, terminals: &TerminalSet) -> bool {
        self.evaluate(graph, terminals).is_ok()
    }
}

/// `|number of components - mean edges per component|`. An empty graph
/// scores 0.
pub fn forest_feature(graph: &ForestGraph) -> f64 {
    let components = graph.components();
    if components.is_empty() {
        return 0.0;
    }
    let total_edges: usize = components.iter().map(|component| component.edges).sum();
    let mean_size = total_edges as f64 / components.len() as f64;
    (components.len() as f64 - mean_size).abs()
}

/// A parsed job result with its acceptance verdict.
#[derive(Debug)]
pub struct Solution {
    pub result: JobResult,
    pub graph: ForestGraph,
    /// Present only for accepted solutions.
    pub metrics: Option<SolutionMetrics>,
    pub score: Option<f64>,
    pub rejection: Option<Rejection>,
}

impl Solution {
    pub fn accepted(&self) -> bool {
        self.metrics.is_some()
    }

    pub fn label(&self) -> &str {
        &self.result.job.label
    }
}

/// Index of the first strictly smallest score, scanning in order. NaN scores
/// never win.
pub fn select_min_score<I>(scores: I) -> Option<usize>
where
    I: IntoIterator<Item = f64>,
{
    let mut best: Option<(usize, f64)> = None;
    for (idx, score) in scores.into_iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        match best {
            Some((_, best_score)) if score >= best_score => {}
            _ => best = Some((idx, score)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Best accepted solution among `solutions`, which must be in grid order.
/// Ties go to the earliest grid point.
pub fn select_best(solutions: &[Solution]) -> Option<usize> {
    let accepted: Vec<(usize, f64)> = solutions
        .iter()
        .enumerate()
        .filter_map(|(idx, solution)| solution.score.map(|score| (idx, score)))
        .collect();
    select_min_score(accepted.iter().map(|&(_, score)| score)).map(|pos| accepted[pos].0)
}
