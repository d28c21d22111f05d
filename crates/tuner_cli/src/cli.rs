use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tuner_core::{EdgeDialect, RangeSpec, ReportOrder, SweepConfig};

#[derive(Parser, Debug)]
#[command(
    name = "forest-tuner",
    version,
    about = "Grid search over prize-collecting Steiner forest solver parameters",
    long_about = "Runs the solver once per (w, b, mu) grid point in parallel, keeps the\n\
                  forests that cover enough terminals and reports the most tree-like one.\n\
                  Solutions from earlier runs in the same working directory are reused."
)]
pub struct Cli {
    /// TOML file with sweep settings; flags given here override it
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory that receives configs/ and the outputs directory
    #[arg(long, value_name = "DIR")]
    pub working_dir: Option<PathBuf>,

    /// Solver script or executable
    #[arg(long, value_name = "PATH")]
    pub solver: Option<PathBuf>,

    /// Program used to run the solver script, e.g. `python`
    #[arg(long, value_name = "PROGRAM")]
    pub interpreter: Option<PathBuf>,

    /// Support executable passed to the solver as --msgpath
    #[arg(long, value_name = "PATH")]
    pub support: Option<PathBuf>,

    /// Prize file; column 0 lists the terminals
    #[arg(long, value_name = "PATH")]
    pub prize: Option<PathBuf>,

    /// Interaction network edge file
    #[arg(long, value_name = "PATH")]
    pub edge: Option<PathBuf>,

    /// Column layout of the edge file
    #[arg(long, value_enum, value_name = "DIALECT")]
    pub edge_dialect: Option<DialectArg>,

    /// Values for w: `start,end,count`, `start:stop:step` or a single number
    #[arg(long, value_name = "RANGE", allow_hyphen_values = true)]
    pub w: Option<RangeSpec>,

    /// Values for b, same syntax as --w
    #[arg(long, value_name = "RANGE", allow_hyphen_values = true)]
    pub b: Option<RangeSpec>,

    /// Values for mu, same syntax as --w
    #[arg(long, value_name = "RANGE", allow_hyphen_values = true)]
    pub mu: Option<RangeSpec>,

    /// Depth parameter D written to every config
    #[arg(long = "d", value_name = "DEPTH")]
    pub depth: Option<u32>,

    /// Minimum percentage of terminals a forest must contain (exclusive)
    #[arg(long = "min-nodes", value_name = "PERCENT")]
    pub min_nodes_percent: Option<f64>,

    /// Requested number of parallel solver processes
    #[arg(long, value_name = "NUM")]
    pub processes: Option<usize>,

    /// Name of the outputs directory inside the working directory
    #[arg(long, value_name = "NAME")]
    pub outputs_dir: Option<String>,

    /// Report table path [default: <outputs>/<prize stem>_report.tsv]
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Row order of the report table
    #[arg(long, value_enum, value_name = "ORDER")]
    pub order: Option<OrderArg>,

    /// Node whose presence is reported for every accepted forest
    #[arg(long, value_name = "NODE")]
    pub landmark: Option<String>,

    /// Keep augmented networks and attribute tables
    #[arg(long)]
    pub keep_intermediates: bool,

    /// Delete info files after each run (solve times become NA)
    #[arg(long)]
    pub drop_info: bool,

    /// Kill a solver run after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Also write a JSON summary of the best configuration here
    #[arg(long, value_name = "PATH")]
    pub json_summary: Option<PathBuf>,

    /// Increase verbosity (-v INFO, -vv DEBUG, -vvv TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Also write logs to this file
    #[arg(long, value_name = "PATH", env = "FOREST_TUNER_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DialectArg {
    /// source relation target
    Sif,
    /// source target [more columns]
    Tabular,
}

impl From<DialectArg> for EdgeDialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Sif => EdgeDialect::Sif,
            DialectArg::Tabular => EdgeDialect::Tabular,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OrderArg {
    /// Grid order (w, then b, then mu)
    Grid,
    /// Most terminals first, then lowest mean Steiner degree
    TerminalsThenDegree,
}

impl From<OrderArg> for ReportOrder {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::Grid => ReportOrder::Grid,
            OrderArg::TerminalsThenDegree => ReportOrder::TerminalsThenDegree,
        }
    }
}

impl Cli {
    /// Layer the flags over `config`, which comes from the config file or defaults.
    pub fn apply_to(&self, mut config: SweepConfig) -> SweepConfig {
        if let Some(dir) = &self.working_dir {
            config.working_dir = dir.clone();
        }
        if let Some(solver) = &self.solver {
            config.solver.solver_path = solver.clone();
        }
        if let Some(interpreter) = &self.interpreter {
            config.solver.interpreter = Some(interpreter.clone());
        }
        if let Some(support) = &self.support {
            config.solver.support_path = support.clone();
        }
        if let Some(prize) = &self.prize {
            config.prize_path = prize.clone();
        }
        if let Some(edge) = &self.edge {
            config.edge_path = edge.clone();
        }
        if let Some(dialect) = self.edge_dialect {
            config.edge_dialect = dialect.into();
        }
        if let Some(w) = self.w {
            config.grid.w = w;
        }
        if let Some(b) = self.b {
            config.grid.b = b;
        }
        if let Some(mu) = self.mu {
            config.grid.mu = mu;
        }
        if let Some(depth) = self.depth {
            config.grid.d = depth;
        }
        if let Some(percent) = self.min_nodes_percent {
            config.min_nodes_percent = percent;
        }
        if let Some(processes) = self.processes {
            config.processes = processes;
        }
        if let Some(outputs) = &self.outputs_dir {
            config.outputs_dir = outputs.clone();
        }
        if let Some(report) = &self.report {
            config.report_path = Some(report.clone());
        }
        if let Some(order) = self.order {
            config.report_order = order.into();
        }
        if let Some(landmark) = &self.landmark {
            config.landmark = Some(landmark.clone());
        }
        if self.keep_intermediates {
            config.retention.keep_intermediates = true;
        }
        if self.drop_info {
            config.retention.keep_info = false;
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout_secs = Some(secs);
        }
        if let Some(summary) = &self.json_summary {
            config.summary_path = Some(summary.clone());
        }
        config
    }
}
