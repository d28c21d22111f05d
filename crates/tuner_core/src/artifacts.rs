//! On-disk layout of a sweep's working directory.
//!
//! Every path is a pure function of the job label, which is what makes
//! re-runs resumable and keeps concurrent workers off each other's files.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::ReportError;

pub const CONFIGS_DIR: &str = "configs";
pub const LOGS_DIR: &str = "logs";
pub const DEFAULT_OUTPUTS_DIR: &str = "outputs";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    OptimalForest,
    AugmentedForest,
    DummyForest,
    EdgeAttributes,
    NodeAttributes,
    Info,
    BestForest,
}

impl ArtifactKind {
    pub fn suffix(self) -> &'static str {
        match self {
            Self::OptimalForest => "_optimalForest.sif",
            Self::AugmentedForest => "_augmentedForest.sif",
            Self::DummyForest => "_dummyForest.sif",
            Self::EdgeAttributes => "_edgeattributes.tsv",
            Self::NodeAttributes => "_nodeattributes.tsv",
            Self::Info => "_info.txt",
            Self::BestForest => "_bestOptimalForest.tsv",
        }
    }
}

/// Directory layout rooted at the sweep's working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceLayout {
    pub working_dir: PathBuf,
    pub outputs_dir: PathBuf,
}

impl WorkspaceLayout {
    pub fn new(working_dir: impl Into<PathBuf>, outputs_dir_name: &str) -> Self {
        let working_dir = working_dir.into();
        let outputs_dir = working_dir.join(outputs_dir_name);
        Self {
            working_dir,
            outputs_dir,
        }
    }

    pub fn configs_dir(&self) -> PathBuf {
        self.working_dir.join(CONFIGS_DIR)
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.outputs_dir.join(LOGS_DIR)
    }

    pub fn config_path(&self, label: &str) -> PathBuf {
        self.configs_dir().join(format!("config_{label}.txt"))
    }

    pub fn log_path(&self, label: &str) -> PathBuf {
        self.logs_dir().join(format!("log_{label}.txt"))
    }

    pub fn artifact_path(&self, label: &str, kind: ArtifactKind) -> PathBuf {
        self.outputs_dir.join(format!("{label}{}", kind.suffix()))
    }

    pub fn create_dirs(&self) -> std::io::Result<()> {
        fs::create_dir_all(self.configs_dir())?;
        fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }
}

/// Write `bytes` to a temp file beside `path`, then rename it into place, so
/// readers never observe a partially written file.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> Result<(), ReportError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut file = NamedTempFile::new_in(parent)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|err| ReportError::Persist {
        path: path.to_path_buf(),
        source: err.error,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn paths_are_keyed_by_label() {
        let layout = WorkspaceLayout::new("/work", "outputs");
        assert_eq!(
            layout.config_path("p_w1.0b1.0mu0.0"),
            PathBuf::from("/work/configs/config_p_w1.0b1.0mu0.0.txt")
        );
        assert_eq!(
            layout.artifact_path("p_w1.0b1.0mu0.0", ArtifactKind::OptimalForest),
            PathBuf::from("/work/outputs/p_w1.0b1.0mu0.0_optimalForest.sif")
        );
        assert_eq!(
            layout.log_path("x"),
            PathBuf::from("/work/outputs/logs/log_x.txt")
        );
    }

    #[test]
    fn atomic_write_replaces_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("file.txt");
        atomic_write(&path, b"first").unwrap();
        atomic_write(&path, b"second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");

        let leftovers = fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
