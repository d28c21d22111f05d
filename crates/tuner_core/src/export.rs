//! Report output: the aggregate TSV table, the best solution's edge list and
//! an optional JSON summary.
//!
//! Every file is written to a temp file first and renamed into place, so an
//! interrupted sweep never leaves a half-written report behind. Files that
//! belong together go through [`ReportFiles`]: all of them are rendered
//! before the first one is written.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ReportError;
use crate::graph::ForestGraph;
use crate::metrics::SolutionMetrics;

#[path = "export/json.rs"]
mod json;
#[path = "export/network.rs"]
mod network;
#[path = "export/tsv.rs"]
mod tsv;
#[path = "export/writer_utils.rs"]
mod writer_utils;

pub use json::SweepSummary;
pub use tsv::REPORT_HEADER;

/// Row order of the aggregate report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportOrder {
    /// Canonical grid order (outer w, middle b, inner mu).
    #[default]
    Grid,
    /// Terminal count descending, then mean Steiner degree ascending.
    TerminalsThenDegree,
}

/// Rows in the requested order. Grid order is the order the rows came in.
pub fn order_rows(rows: &[SolutionMetrics], order: ReportOrder) -> Vec<&SolutionMetrics> {
    let mut ordered: Vec<&SolutionMetrics> = rows.iter().collect();
    if order == ReportOrder::TerminalsThenDegree {
        ordered.sort_by(|a, b| {
            b.terminal_count.cmp(&a.terminal_count).then_with(|| {
                match (a.mean_steiner_degree, b.mean_steiner_degree) {
                    (Some(x), Some(y)) => x.total_cmp(&y),
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (None, None) => std::cmp::Ordering::Equal,
                }
            })
        });
    }
    ordered
}

/// Report files rendered in memory and written as one unit.
#[derive(Debug, Default)]
pub struct ReportFiles {
    pending: Vec<(PathBuf, Vec<u8>)>,
}

impl ReportFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the tab-delimited report table.
    ///
    /// # Errors
    ///
    /// Returns an error if `rows` is empty or cannot be rendered.
    pub fn table(
        mut self,
        rows: &[SolutionMetrics],
        order: ReportOrder,
        path: impl Into<PathBuf>,
    ) -> Result<Self, ReportError> {
        writer_utils::ensure_not_empty(rows)?;
        let bytes = tsv::render_table(&order_rows(rows, order))?;
        self.pending.push((path.into(), bytes));
        Ok(self)
    }

    /// Queue `graph` as a two-column edge list, one `a\tb` line per edge.
    pub fn network(mut self, graph: &ForestGraph, path: impl Into<PathBuf>) -> Self {
        let bytes = network::render_edges(graph).into_bytes();
        self.pending.push((path.into(), bytes));
        self
    }

    /// Queue a pretty-printed JSON summary of the sweep.
    pub fn summary(
        mut self,
        summary: &SweepSummary,
        path: impl Into<PathBuf>,
    ) -> Result<Self, ReportError> {
        let bytes = json::render_summary(summary)?;
        self.pending.push((path.into(), bytes));
        Ok(self)
    }

    /// Write every queued file in order. If one fails, the files already
    /// written by this call are removed again before the error is returned.
    pub fn persist(self) -> Result<(), ReportError> {
        let mut written: Vec<&Path> = Vec::with_capacity(self.pending.len());
        for (path, bytes) in &self.pending {
            if let Err(err) = writer_utils::write_output_file(path, bytes) {
                for done in written {
                    if let Err(cleanup) = fs::remove_file(done) {
                        warn!(path = %done.display(), "failed to remove partial report: {cleanup}");
                    }
                }
                return Err(err);
            }
            written.push(path);
        }
        Ok(())
    }
}

/// Write the tab-delimited report table.
///
/// # Errors
///
/// Returns an error if `rows` is empty or the file cannot be written.
pub fn export_to_tsv(
    rows: &[SolutionMetrics],
    order: ReportOrder,
    path: impl AsRef<Path>,
) -> Result<(), ReportError> {
    ReportFiles::new()
        .table(rows, order, path.as_ref())?
        .persist()
}

/// Write `graph` as a two-column edge list, one `a\tb` line per edge.
pub fn export_network(graph: &ForestGraph, path: impl AsRef<Path>) -> Result<(), ReportError> {
    ReportFiles::new().network(graph, path.as_ref()).persist()
}

/// Write a pretty-printed JSON summary of the sweep.
pub fn export_summary_json(
    summary: &SweepSummary,
    path: impl AsRef<Path>,
) -> Result<(), ReportError> {
    ReportFiles::new().summary(summary, path.as_ref())?.persist()
}
