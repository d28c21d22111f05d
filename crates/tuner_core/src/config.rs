//! Sweep configuration.
//!
//! A [`SweepConfig`] can be built in code, loaded from a TOML file, or
//! assembled by the CLI (which layers flags over an optional file). Either
//! way [`SweepConfig::validate`] runs before any job is scheduled.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::artifacts::{WorkspaceLayout, DEFAULT_OUTPUTS_DIR};
use crate::error::SweepError;
use crate::export::ReportOrder;
use crate::graph::EdgeDialect;
use crate::jobs::JobInputs;
use crate::parameters::ParameterSpace;
use crate::runner::{RetentionPolicy, RunSettings, SolverCommand};
use crate::selection::{AcceptanceCriteria, DEFAULT_MIN_NODES_PERCENT};

/// Worker count requested when none is configured; clamped to the host.
pub const DEFAULT_PROCESSES: usize = 64;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweepConfig {
    pub working_dir: PathBuf,
    pub solver: SolverCommand,
    pub prize_path: PathBuf,
    pub edge_path: PathBuf,
    /// Row format of the edge input.
    pub edge_dialect: EdgeDialect,
    /// Row format of solver-produced solution artifacts.
    pub solution_dialect: EdgeDialect,
    pub grid: ParameterSpace,
    pub min_nodes_percent: f64,
    pub processes: usize,
    /// Name of the outputs directory inside `working_dir`.
    pub outputs_dir: String,
    /// Defaults to `<outputs>/<prize stem>_report.tsv`.
    pub report_path: Option<PathBuf>,
    pub report_order: ReportOrder,
    pub summary_path: Option<PathBuf>,
    pub landmark: Option<String>,
    pub retention: RetentionPolicy,
    pub timeout_secs: Option<u64>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            working_dir: PathBuf::from("."),
            solver: SolverCommand::default(),
            prize_path: PathBuf::new(),
            edge_path: PathBuf::new(),
            edge_dialect: EdgeDialect::Sif,
            solution_dialect: EdgeDialect::Sif,
            grid: ParameterSpace::default(),
            min_nodes_percent: DEFAULT_MIN_NODES_PERCENT,
            processes: DEFAULT_PROCESSES,
            outputs_dir: DEFAULT_OUTPUTS_DIR.to_string(),
            report_path: None,
            report_order: ReportOrder::Grid,
            summary_path: None,
            landmark: None,
            retention: RetentionPolicy::default(),
            timeout_secs: None,
        }
    }
}

fn require_dir(what: &str, path: &Path) -> Result<(), SweepError> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(SweepError::InputValidation(format!(
            "the {what} '{}' is not a valid directory",
            path.display()
        )))
    }
}

fn require_file(what: &str, path: &Path) -> Result<(), SweepError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(SweepError::InputValidation(format!(
            "the {what} '{}' is not a valid file path",
            path.display()
        )))
    }
}

impl SweepConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, SweepError> {
        let text = fs::read_to_string(path).map_err(|err| SweepError::Config {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        Self::from_toml_str(&text).map_err(|err| SweepError::Config {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    /// Fail fast on anything that would make every job fail.
    pub fn validate(&self) -> Result<(), SweepError> {
        require_dir("working directory", &self.working_dir)?;
        require_file("solver path", &self.solver.solver_path)?;
        require_file("solver support path", &self.solver.support_path)?;
        require_file("prize path", &self.prize_path)?;
        require_file("edge path", &self.edge_path)?;

        if !self.min_nodes_percent.is_finite() {
            return Err(SweepError::InputValidation(format!(
                "minimum node overlap must be a finite percentage, got {}",
                self.min_nodes_percent
            )));
        }
        if self.outputs_dir.trim().is_empty() {
            return Err(SweepError::InputValidation(
                "outputs directory name must not be empty".to_string(),
            ));
        }
        for (parameter, spec) in [("w", &self.grid.w), ("b", &self.grid.b), ("mu", &self.grid.mu)] {
            spec.validate()
                .map_err(|source| SweepError::Range { parameter, source })?;
        }
        Ok(())
    }

    pub fn layout(&self) -> WorkspaceLayout {
        WorkspaceLayout::new(&self.working_dir, &self.outputs_dir)
    }

    pub fn inputs(&self) -> JobInputs {
        JobInputs {
            prize_path: self.prize_path.clone(),
            edge_path: self.edge_path.clone(),
        }
    }

    pub fn criteria(&self) -> AcceptanceCriteria {
        AcceptanceCriteria::new(self.min_nodes_percent)
    }

    pub fn run_settings(&self) -> RunSettings {
        RunSettings {
            solver: self.solver.clone(),
            retention: self.retention,
            timeout: self.timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn resolved_report_path(&self) -> PathBuf {
        match &self.report_path {
            Some(path) => path.clone(),
            None => {
                let stem = self
                    .prize_path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "sweep".to_string());
                self.layout()
                    .outputs_dir
                    .join(format!("{stem}_report.tsv"))
            }
        }
    }
}
