use serde::Serialize;

use crate::error::ReportError;
use crate::metrics::SolutionMetrics;
use crate::parameters::ParameterConfig;

/// Machine-readable outcome of a sweep.
#[derive(Debug, Clone, Serialize)]
pub struct SweepSummary {
    pub best_label: String,
    pub best_config: ParameterConfig,
    pub best_score: f64,
    pub best_metrics: SolutionMetrics,
    pub jobs_total: usize,
    pub jobs_cached: usize,
    pub jobs_launched: usize,
    pub jobs_failed: usize,
    pub solutions_accepted: usize,
}

pub(crate) fn render_summary(summary: &SweepSummary) -> Result<Vec<u8>, ReportError> {
    let mut bytes = serde_json::to_vec_pretty(summary)?;
    bytes.push(b'\n');
    Ok(bytes)
}
