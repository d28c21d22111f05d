use crate::error::ReportError;
use crate::metrics::SolutionMetrics;

const NOT_AVAILABLE: &str = "NA";

pub const REPORT_HEADER: [&str; 15] = [
    "label",
    "w",
    "b",
    "mu",
    "solve_time",
    "prize_count",
    "terminal_count",
    "steiner_count",
    "node_count",
    "edge_count",
    "tree_count",
    "singleton_count",
    "mean_steiner_degree",
    "median_steiner_degree",
    "landmark_present",
];

fn optional<T: ToString>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub(crate) fn render_table(rows: &[&SolutionMetrics]) -> Result<Vec<u8>, ReportError> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(Vec::new());

    wtr.write_record(REPORT_HEADER)?;

    for row in rows {
        wtr.write_record([
            row.label.clone(),
            format!("{:?}", row.w),
            format!("{:?}", row.b),
            format!("{:?}", row.mu),
            optional(row.solve_time),
            row.prize_count.to_string(),
            row.terminal_count.to_string(),
            row.steiner_count.to_string(),
            row.node_count.to_string(),
            row.edge_count.to_string(),
            row.tree_count.to_string(),
            row.singleton_count.to_string(),
            optional(row.mean_steiner_degree),
            optional(row.median_steiner_degree),
            optional(row.landmark_present),
        ])?;
    }

    wtr.into_inner()
        .map_err(|err| ReportError::Io(err.into_error()))
}
