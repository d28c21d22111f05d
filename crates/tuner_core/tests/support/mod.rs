//! Stub solver and fixture inputs for sweep integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use tempfile::TempDir;
use tuner_core::jobs::Job;
use tuner_core::runner::JobResult;
use tuner_core::{ParameterSpace, RangeSpec, SolverCommand, SweepConfig, SweepObserver};

/// Five terminals, all reachable through the chain A-B-C-D-E-F-G.
pub const PRIZES: &str = "A\t1.0\nB\t1.0\nC\t1.0\nD\t1.0\nE\t1.0\n";
pub const NETWORK: &str = "A pp B\nB pp C\nC pp D\nD pp E\nE pp F\nF pp G\nB pp F\n";

/// Six nodes, five edges, covering every terminal.
pub const TREE: &str = "A pp B\nB pp C\nC pp D\nD pp E\nE pp F\n";

/// Label suffix of the only grid point the default stub solves.
pub const WINNER: &str = "_w1.0b1.0mu0.1";

/// Parses the solver arguments into `$out` and `$label` and records the
/// launch, then runs the case-specific body.
const PRELUDE: &str = r#"
while [ $# -gt 0 ]; do
  case "$1" in
    --outpath) out="$2"; shift 2 ;;
    --outlabel) label="$2"; shift 2 ;;
    *) shift ;;
  esac
done
echo "$label" >> "$LAUNCHES"
"#;

/// Writes the tree for the winning label and an empty forest otherwise, plus
/// an info artifact and one intermediate.
pub const SOLVE_WINNER_ONLY: &str = r#"
case "$label" in
  *_w1.0b1.0mu0.1) printf 'A pp B\nB pp C\nC pp D\nD pp E\nE pp F\n' > "$out/${label}_optimalForest.sif" ;;
  *) : > "$out/${label}_optimalForest.sif" ;;
esac
printf 'run summary\nelapsed 1.5\n\nignored 9.9\n' > "$out/${label}_info.txt"
: > "$out/${label}_augmentedForest.sif"
echo "solved $label"
"#;

pub struct Fixture {
    pub dir: TempDir,
    pub solver: PathBuf,
    pub support: PathBuf,
    pub prizes: PathBuf,
    pub network: PathBuf,
    pub launches: PathBuf,
}

impl Fixture {
    pub fn new(body: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let launches = root.join("launches.txt");

        let solver = root.join("solver.sh");
        let script = format!(
            "LAUNCHES='{}'\n{PRELUDE}{body}",
            launches.display()
        );
        fs::write(&solver, script).unwrap();

        let support = root.join("msgsteiner");
        fs::write(&support, "").unwrap();
        let prizes = root.join("prizes.txt");
        fs::write(&prizes, PRIZES).unwrap();
        let network = root.join("network.sif");
        fs::write(&network, NETWORK).unwrap();

        Self {
            dir,
            solver,
            support,
            prizes,
            network,
            launches,
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn outputs(&self) -> PathBuf {
        self.root().join("outputs")
    }

    /// `w, b ∈ {1, 10}`, `mu = 0.1`: four jobs.
    pub fn config(&self) -> SweepConfig {
        SweepConfig {
            working_dir: self.root().to_path_buf(),
            solver: SolverCommand::new(&self.solver, &self.support).with_interpreter("sh"),
            prize_path: self.prizes.clone(),
            edge_path: self.network.clone(),
            grid: ParameterSpace::grid()
                .w(RangeSpec::linspace(1.0, 10.0, 2))
                .b(RangeSpec::linspace(1.0, 10.0, 2))
                .mu(RangeSpec::value(0.1)),
            processes: 4,
            timeout_secs: Some(30),
            ..SweepConfig::default()
        }
    }

    /// Labels the stub was launched with, in launch order.
    pub fn launched_labels(&self) -> Vec<String> {
        match fs::read_to_string(&self.launches) {
            Ok(text) => text.lines().map(str::to_string).collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn label(&self, suffix: &str) -> String {
        format!("prizes{suffix}")
    }
}

/// Counts lifecycle events.
#[derive(Default)]
pub struct RecordingObserver {
    pub started: Mutex<Vec<String>>,
    pub cache_hits: Mutex<Vec<String>>,
    pub finished: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn started(&self) -> usize {
        self.started.lock().unwrap().len()
    }

    pub fn cache_hits(&self) -> usize {
        self.cache_hits.lock().unwrap().len()
    }

    pub fn finished(&self) -> usize {
        self.finished.lock().unwrap().len()
    }
}

impl SweepObserver for RecordingObserver {
    fn job_started(&self, job: &Job) {
        self.started.lock().unwrap().push(job.label.clone());
    }

    fn cache_hit(&self, job: &Job) {
        self.cache_hits.lock().unwrap().push(job.label.clone());
    }

    fn job_finished(&self, result: &JobResult, _elapsed: Duration) {
        self.finished.lock().unwrap().push(result.job.label.clone());
    }
}
