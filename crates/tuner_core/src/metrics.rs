//! Structural metrics of solution graphs.
//!
//! Nodes of a solution are split into terminals (present in the prize file)
//! and Steiner nodes (everything else). Steiner node degrees are measured in
//! the reference interaction network, since the solution subgraph alone says
//! little about how connected a node is.

use serde::Serialize;

use crate::graph::{ForestGraph, InteractionNetwork, TerminalSet};
use crate::parameters::ParameterConfig;

mod info;

pub use info::{parse_solve_time, read_solve_time};

/// Components with more nodes than this count as trees; the rest are
/// singletons.
pub const TREE_MIN_NODES: usize = 5;

/// Read-only context shared by every solution of a sweep.
#[derive(Debug, Clone, Copy)]
pub struct MetricsContext<'a> {
    pub terminals: &'a TerminalSet,
    pub network: &'a InteractionNetwork,
    pub landmark: Option<&'a str>,
}

/// Aggregated metrics for one accepted solution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolutionMetrics {
    pub label: String,
    pub w: f64,
    pub b: f64,
    pub mu: f64,
    /// Solver time from the info artifact, when available.
    pub solve_time: Option<f64>,
    /// Number of terminals in the prize file.
    pub prize_count: usize,
    /// Prize-file terminals present in the solution.
    pub terminal_count: usize,
    pub steiner_count: usize,
    pub node_count: usize,
    pub edge_count: usize,
    pub tree_count: usize,
    pub singleton_count: usize,
    pub mean_steiner_degree: Option<f64>,
    pub median_steiner_degree: Option<f64>,
    /// `None` when no landmark node was configured.
    pub landmark_present: Option<bool>,
}

impl SolutionMetrics {
    /// Mean and median of `values`; `None` for an empty slice.
    pub fn calculate_stats(values: &[usize]) -> (Option<f64>, Option<f64>) {
        if values.is_empty() {
            return (None, None);
        }

        let mut sorted = values.to_vec();
        sorted.sort_unstable();

        let sum: usize = sorted.iter().sum();
        let mean = sum as f64 / sorted.len() as f64;

        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) as f64 / 2.0
        } else {
            sorted[mid] as f64
        };

        (Some(mean), Some(median))
    }
}

/// Number of prize-file terminals present in `graph`.
pub fn terminal_overlap(graph: &ForestGraph, terminals: &TerminalSet) -> usize {
    graph.nodes().filter(|node| terminals.contains(node)).count()
}

pub fn extract_metrics(
    label: &str,
    config: &ParameterConfig,
    graph: &ForestGraph,
    solve_time: Option<f64>,
    context: &MetricsContext<'_>,
) -> SolutionMetrics {
    let steiner_degrees: Vec<usize> = graph
        .nodes()
        .filter(|node| !context.terminals.contains(node))
        .map(|node| context.network.degree(node))
        .collect();
    let (mean_steiner_degree, median_steiner_degree) =
        SolutionMetrics::calculate_stats(&steiner_degrees);

    let components = graph.components();
    let tree_count = components
        .iter()
        .filter(|component| component.nodes > TREE_MIN_NODES)
        .count();

    SolutionMetrics {
        label: label.to_string(),
        w: config.w,
        b: config.b,
        mu: config.mu,
        solve_time,
        prize_count: context.terminals.len(),
        terminal_count: terminal_overlap(graph, context.terminals),
        steiner_count: steiner_degrees.len(),
        node_count: graph.node_count(),
        edge_count: graph.edge_count(),
        tree_count,
        singleton_count: components.len() - tree_count,
        mean_steiner_degree,
        median_steiner_degree,
        landmark_present: context.landmark.map(|node| graph.contains_node(node)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context<'a>(
        terminals: &'a TerminalSet,
        network: &'a InteractionNetwork,
        landmark: Option<&'a str>,
    ) -> MetricsContext<'a> {
        MetricsContext {
            terminals,
            network,
            landmark,
        }
    }

    #[test]
    fn test_calculate_stats() {
        let (mean, median) = SolutionMetrics::calculate_stats(&[4, 1, 3, 2]);
        assert_eq!(mean, Some(2.5));
        assert_eq!(median, Some(2.5));

        let (mean, median) = SolutionMetrics::calculate_stats(&[7, 1, 1]);
        assert_eq!(mean, Some(3.0));
        assert_eq!(median, Some(1.0));
    }

    #[test]
    fn test_calculate_stats_empty() {
        assert_eq!(SolutionMetrics::calculate_stats(&[]), (None, None));
    }

    #[test]
    fn splits_terminals_and_steiner_nodes() {
        let terminals = TerminalSet::from_nodes(["A", "B", "C", "Z"]);
        let network = InteractionNetwork::from_edges([
            ("A", "S1"),
            ("B", "S1"),
            ("C", "S1"),
            ("S1", "X"),
            ("C", "S2"),
            ("Q", "R"),
        ]);
        let graph = ForestGraph::from_edges([("A", "S1"), ("B", "S1"), ("C", "S2"), ("S2", "S1")]);
        let config = ParameterConfig::new(1.0, 2.0, 0.1);

        let metrics = extract_metrics(
            "p_w1.0b2.0mu0.1",
            &config,
            &graph,
            Some(3.5),
            &context(&terminals, &network, Some("S2")),
        );

        assert_eq!(metrics.prize_count, 4);
        assert_eq!(metrics.terminal_count, 3);
        assert_eq!(metrics.steiner_count, 2);
        assert_eq!(metrics.node_count, 5);
        assert_eq!(metrics.edge_count, 4);
        // S1 has degree 4 and S2 degree 1 in the reference network.
        assert_eq!(metrics.mean_steiner_degree, Some(2.5));
        assert_eq!(metrics.median_steiner_degree, Some(2.5));
        assert_eq!(metrics.tree_count, 0);
        assert_eq!(metrics.singleton_count, 1);
        assert_eq!(metrics.landmark_present, Some(true));
        assert_eq!(metrics.solve_time, Some(3.5));
    }

    #[test]
    fn trees_need_more_than_five_nodes() {
        let terminals = TerminalSet::from_nodes(["A"]);
        let network = InteractionNetwork::default();
        let graph = ForestGraph::from_edges([
            ("A", "B"),
            ("B", "C"),
            ("C", "D"),
            ("D", "E"),
            ("E", "F"),
            ("P", "Q"),
            ("Q", "R"),
            ("R", "S"),
            ("S", "T"),
        ]);
        let metrics = extract_metrics(
            "x",
            &ParameterConfig::new(1.0, 1.0, 0.0),
            &graph,
            None,
            &context(&terminals, &network, None),
        );
        assert_eq!(metrics.tree_count, 1);
        assert_eq!(metrics.singleton_count, 1);
        assert_eq!(metrics.landmark_present, None);
        // Steiner nodes absent from the reference network have degree 0.
        assert_eq!(metrics.mean_steiner_degree, Some(0.0));
    }
}
