//! Turns grid points into solver jobs.
//!
//! Each job gets a label derived from the prize file name and its rounded
//! parameter values. The label is the idempotency key: it names the config
//! artifact, the expected solution artifact and the log, so a repeated sweep
//! over the same inputs lands on exactly the same files.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::artifacts::{atomic_write, ArtifactKind, WorkspaceLayout};
use crate::error::SweepError;
use crate::parameters::ParameterConfig;

/// Fixed inputs shared by every job in a sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobInputs {
    pub prize_path: PathBuf,
    pub edge_path: PathBuf,
}

/// One solver invocation, fully described.
#[derive(Debug, Clone)]
pub struct Job {
    /// Position in the canonical grid order.
    pub index: usize,
    pub config: ParameterConfig,
    pub label: String,
    pub inputs: JobInputs,
    pub outputs_dir: PathBuf,
    pub config_path: PathBuf,
    pub artifact_path: PathBuf,
    pub log_path: PathBuf,
}

impl Job {
    pub fn auxiliary_path(&self, kind: ArtifactKind) -> PathBuf {
        self.outputs_dir
            .join(format!("{}{}", self.label, kind.suffix()))
    }
}

/// Build the label `<stem>_w<w>b<b>mu<mu>` for a config.
///
/// Floats render in shortest round-trip form with a trailing `.0` for whole
/// numbers (`1.0`, `0.15`, `10.0`), so labels from earlier runs still match.
pub fn job_label(prize_path: &Path, config: &ParameterConfig) -> String {
    let stem = prize_path
        .file_stem()
        .map(|stem| sanitize(&stem.to_string_lossy()))
        .unwrap_or_default();
    format!(
        "{stem}_w{:?}b{:?}mu{:?}",
        config.w, config.b, config.mu
    )
}

fn sanitize(stem: &str) -> String {
    stem.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Write the config artifact for `config` unless one already exists.
///
/// An existing file is left alone so hand edits survive re-runs. Returns
/// whether a file was written.
pub fn write_config_file(path: &Path, config: &ParameterConfig) -> Result<bool, SweepError> {
    if path.exists() {
        return Ok(false);
    }
    let mut contents = config.config_lines().join("\n");
    contents.push('\n');
    atomic_write(path, contents.as_bytes())?;
    Ok(true)
}

/// Create the directory tree, write config artifacts and return one job per
/// config in grid order.
pub fn materialize_jobs(
    configs: Vec<ParameterConfig>,
    inputs: &JobInputs,
    layout: &WorkspaceLayout,
) -> Result<Vec<Job>, SweepError> {
    layout.create_dirs()?;

    configs
        .into_iter()
        .enumerate()
        .map(|(index, config)| {
            let label = job_label(&inputs.prize_path, &config);
            let config_path = layout.config_path(&label);
            if write_config_file(&config_path, &config)? {
                debug!(label = %label, path = %config_path.display(), "wrote config");
            }
            Ok(Job {
                index,
                artifact_path: layout.artifact_path(&label, ArtifactKind::OptimalForest),
                log_path: layout.log_path(&label),
                outputs_dir: layout.outputs_dir.clone(),
                inputs: inputs.clone(),
                config,
                label,
                config_path,
            })
        })
        .collect()
}
