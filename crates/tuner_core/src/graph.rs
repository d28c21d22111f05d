//! Parsing of edge-list artifacts into undirected graphs.
//!
//! Solution artifacts, the reference interaction network and the prize file
//! are all whitespace-delimited text. Edge rows come in two dialects: SIF
//! (`source relation target`) and tabular (`source target ...`).

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::unionfind::UnionFind;
use serde::{Deserialize, Serialize};

use crate::error::ArtifactParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeDialect {
    /// `source relation target`
    #[default]
    Sif,
    /// `source target [ignored columns...]`
    Tabular,
}

impl EdgeDialect {
    fn target_column(self) -> usize {
        match self {
            Self::Sif => 2,
            Self::Tabular => 1,
        }
    }
}

fn read_text(path: &Path) -> Result<String, ArtifactParseError> {
    fs::read_to_string(path).map_err(|source| ArtifactParseError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse edge rows from `text`. Blank lines are skipped; `path` is only used
/// in error messages.
pub fn parse_edges(
    text: &str,
    dialect: EdgeDialect,
    path: &Path,
) -> Result<Vec<(String, String)>, ArtifactParseError> {
    let target = dialect.target_column();
    let mut edges = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let cols: Vec<&str> = line.split_whitespace().collect();
        if cols.is_empty() {
            continue;
        }
        if cols.len() <= target {
            return Err(ArtifactParseError::MalformedRow {
                path: path.to_path_buf(),
                line: line_no + 1,
                expected: target + 1,
                found: cols.len(),
            });
        }
        edges.push((cols[0].to_string(), cols[target].to_string()));
    }
    Ok(edges)
}

/// Sizes of one connected component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Component {
    pub nodes: usize,
    pub edges: usize,
}

/// Undirected simple graph: node set plus normalized edge set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForestGraph {
    nodes: BTreeSet<String>,
    edges: BTreeSet<(String, String)>,
}

impl ForestGraph {
    pub fn from_edges<I, S>(edges: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        let mut graph = Self::default();
        for (a, b) in edges {
            graph.add_edge(a.into(), b.into());
        }
        graph
    }

    pub fn load(path: &Path, dialect: EdgeDialect) -> Result<Self, ArtifactParseError> {
        let text = read_text(path)?;
        Ok(Self::from_edges(parse_edges(&text, dialect, path)?))
    }

    fn add_edge(&mut self, a: String, b: String) {
        self.nodes.insert(a.clone());
        self.nodes.insert(b.clone());
        let edge = if a <= b { (a, b) } else { (b, a) };
        self.edges.insert(edge);
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(String::as_str)
    }

    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.edges.iter().map(|(a, b)| (a.as_str(), b.as_str()))
    }

    pub fn contains_node(&self, node: &str) -> bool {
        self.nodes.contains(node)
    }

    /// Connected components, ordered by their smallest node name.
    pub fn components(&self) -> Vec<Component> {
        let index: HashMap<&str, usize> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.as_str(), i))
            .collect();

        let mut sets = UnionFind::<usize>::new(self.nodes.len());
        for (a, b) in &self.edges {
            sets.union(index[a.as_str()], index[b.as_str()]);
        }

        let mut order: Vec<usize> = Vec::new();
        let mut sizes: HashMap<usize, Component> = HashMap::new();
        for i in 0..self.nodes.len() {
            let root = sets.find(i);
            sizes
                .entry(root)
                .or_insert_with(|| {
                    order.push(root);
                    Component { nodes: 0, edges: 0 }
                })
                .nodes += 1;
        }
        for (a, _) in &self.edges {
            let root = sets.find(index[a.as_str()]);
            if let Some(component) = sizes.get_mut(&root) {
                component.edges += 1;
            }
        }

        order.into_iter().map(|root| sizes[&root]).collect()
    }
}

/// Reference interaction network, loaded once per sweep for degree lookups.
#[derive(Debug, Clone, Default)]
pub struct InteractionNetwork {
    graph: UnGraph<String, ()>,
    index: HashMap<String, NodeIndex>,
}

impl InteractionNetwork {
    pub fn from_edges<I, S>(edges: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        let mut network = Self::default();
        for (a, b) in edges {
            let a = network.node(a.into());
            let b = network.node(b.into());
            network.graph.update_edge(a, b, ());
        }
        network
    }

    pub fn load(path: &Path, dialect: EdgeDialect) -> Result<Self, ArtifactParseError> {
        let text = read_text(path)?;
        Ok(Self::from_edges(parse_edges(&text, dialect, path)?))
    }

    fn node(&mut self, name: String) -> NodeIndex {
        if let Some(&idx) = self.index.get(&name) {
            return idx;
        }
        let idx = self.graph.add_node(name.clone());
        self.index.insert(name, idx);
        idx
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of distinct neighbours; 0 for nodes absent from the network.
    pub fn degree(&self, node: &str) -> usize {
        self.index
            .get(node)
            .map(|&idx| self.graph.neighbors(idx).count())
            .unwrap_or(0)
    }
}

/// Terminal (prize) node identifiers from column 0 of the prize file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TerminalSet {
    nodes: BTreeSet<String>,
    source: Option<PathBuf>,
}

impl TerminalSet {
    pub fn from_nodes<I, S>(nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            nodes: nodes.into_iter().map(Into::into).collect(),
            source: None,
        }
    }

    pub fn load(path: &Path) -> Result<Self, ArtifactParseError> {
        let text = read_text(path)?;
        let nodes = text
            .lines()
            .filter_map(|line| line.split_whitespace().next())
            .map(str::to_string)
            .collect();
        Ok(Self {
            nodes,
            source: Some(path.to_path_buf()),
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, node: &str) -> bool {
        self.nodes.contains(node)
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sif_rows_use_third_column() {
        let edges = parse_edges("A pp B\n\nB pp C\n", EdgeDialect::Sif, Path::new("f")).unwrap();
        assert_eq!(
            edges,
            vec![
                ("A".to_string(), "B".to_string()),
                ("B".to_string(), "C".to_string())
            ]
        );
    }

    #[test]
    fn tabular_rows_ignore_weights() {
        let edges = parse_edges("A\tB\t0.9\n", EdgeDialect::Tabular, Path::new("f")).unwrap();
        assert_eq!(edges, vec![("A".to_string(), "B".to_string())]);
    }

    #[test]
    fn short_rows_are_reported_with_line_number() {
        let err = parse_edges("A pp B\nC D\n", EdgeDialect::Sif, Path::new("f")).unwrap_err();
        match err {
            ArtifactParseError::MalformedRow {
                line,
                expected,
                found,
                ..
            } => {
                assert_eq!((line, expected, found), (2, 3, 2));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn parallel_and_reversed_edges_collapse() {
        let graph = ForestGraph::from_edges([("A", "B"), ("B", "A"), ("A", "B"), ("B", "C")]);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn components_count_nodes_and_edges() {
        let graph = ForestGraph::from_edges([
            ("A", "B"),
            ("B", "C"),
            ("C", "A"),
            ("X", "Y"),
        ]);
        let components = graph.components();
        assert_eq!(
            components,
            vec![
                Component { nodes: 3, edges: 3 },
                Component { nodes: 2, edges: 1 }
            ]
        );
    }

    #[test]
    fn empty_graph_has_no_components() {
        assert!(ForestGraph::default().components().is_empty());
    }

    #[test]
    fn reference_degree_counts_distinct_neighbours() {
        let network =
            InteractionNetwork::from_edges([("A", "B"), ("A", "C"), ("C", "A"), ("C", "D")]);
        assert_eq!(network.degree("A"), 2);
        assert_eq!(network.degree("C"), 2);
        assert_eq!(network.degree("D"), 1);
        assert_eq!(network.degree("missing"), 0);
    }

    #[test]
    fn terminal_set_reads_first_column() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("prizes.txt");
        fs::write(&path, "A\t1.5\nB 0.3 extra\n\nA 2.0\n").unwrap();
        let terminals = TerminalSet::load(&path).unwrap();
        assert_eq!(terminals.len(), 2);
        assert!(terminals.contains("B"));
        assert_eq!(terminals.source(), Some(path.as_path()));
    }
}
