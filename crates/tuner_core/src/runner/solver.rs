use std::io::{self, Read};
#[cfg(unix)]
use std::os::unix::process::CommandExt;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::jobs::Job;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// How long output is still collected after a timed-out child was killed.
pub const KILL_GRACE: Duration = Duration::from_millis(500);

/// How to launch the external solver.
///
/// With an interpreter set the command line is
/// `<interpreter> <solver_path> ...`, otherwise `solver_path` is executed
/// directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverCommand {
    #[serde(default)]
    pub interpreter: Option<PathBuf>,
    pub solver_path: PathBuf,
    /// Solver-internal executable handed over via `--msgpath`.
    pub support_path: PathBuf,
}

impl SolverCommand {
    pub fn new(solver_path: impl Into<PathBuf>, support_path: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: None,
            solver_path: solver_path.into(),
            support_path: support_path.into(),
        }
    }

    pub fn with_interpreter(mut self, interpreter: impl Into<PathBuf>) -> Self {
        self.interpreter = Some(interpreter.into());
        self
    }

    /// Full argument contract for one job.
    pub fn command_for(&self, job: &Job) -> Command {
        let mut cmd = match &self.interpreter {
            Some(interpreter) => {
                let mut cmd = Command::new(interpreter);
                cmd.arg(&self.solver_path);
                cmd
            }
            None => Command::new(&self.solver_path),
        };
        cmd.arg("--msgpath")
            .arg(&self.support_path)
            .arg("-p")
            .arg(&job.inputs.prize_path)
            .arg("-e")
            .arg(&job.inputs.edge_path)
            .arg("-c")
            .arg(&job.config_path)
            .arg("--outpath")
            .arg(&job.outputs_dir)
            .arg("--outlabel")
            .arg(&job.label);
        cmd
    }
}

/// Everything a finished (or killed) child produced.
#[derive(Debug)]
pub struct CapturedOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub timed_out: bool,
}

impl CapturedOutput {
    /// stdout followed by stderr.
    pub fn combined_log(&self) -> Vec<u8> {
        let mut log = Vec::with_capacity(self.stdout.len() + self.stderr.len());
        log.extend_from_slice(&self.stdout);
        log.extend_from_slice(&self.stderr);
        log
    }
}

/// Streams a pipe into a channel chunk by chunk, so the reader never blocks
/// the child and output written before a kill is still collected.
fn drain<R: Read + Send + 'static>(reader: Option<R>) -> Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    if let Some(mut reader) = reader {
        thread::spawn(move || {
            let mut chunk = [0u8; 8192];
            loop {
                match reader.read(&mut chunk) {
                    Ok(0) => break,
                    Ok(n) => {
                        if tx.send(chunk[..n].to_vec()).is_err() {
                            break;
                        }
                    }
                    Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                    Err(_) => break,
                }
            }
        });
    }
    rx
}

/// Everything received until the pipe closes or, with a deadline, until it
/// passes. A pipe kept open by an escaped descendant must not hold the job.
fn collect(rx: &Receiver<Vec<u8>>, deadline: Option<Instant>) -> Vec<u8> {
    let mut buf = Vec::new();
    loop {
        let chunk = match deadline {
            None => rx.recv().ok(),
            Some(deadline) => rx
                .recv_timeout(deadline.saturating_duration_since(Instant::now()))
                .ok(),
        };
        match chunk {
            Some(chunk) => buf.extend_from_slice(&chunk),
            None => return buf,
        }
    }
}

/// Kill the child and everything it started. On unix the child leads its own
/// process group, so the whole group is signalled.
fn kill_tree(child: &mut Child) {
    #[cfg(unix)]
    {
        let group = format!("-{}", child.id());
        let signalled = Command::new("kill")
            .args(["-KILL", "--", &group])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false);
        if !signalled {
            warn!(pid = child.id(), "could not signal solver process group");
        }
    }
    // The child may exit between try_wait and kill.
    let _ = child.kill();
}

fn wait_with_deadline(child: &mut Child, timeout: Option<Duration>) -> io::Result<(ExitStatus, bool)> {
    let Some(timeout) = timeout else {
        return Ok((child.wait()?, false));
    };

    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok((status, false));
        }
        if Instant::now() >= deadline {
            kill_tree(child);
            return Ok((child.wait()?, true));
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Run `cmd` to completion, draining stdout and stderr on separate threads so
/// a chatty child cannot block on a full pipe.
///
/// With a timeout the child runs in its own process group (unix), and the
/// whole group is killed once the timeout is exceeded. Output is then
/// collected for at most [`KILL_GRACE`] more.
pub fn run_captured(mut cmd: Command, timeout: Option<Duration>) -> io::Result<CapturedOutput> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    #[cfg(unix)]
    {
        if timeout.is_some() {
            cmd.process_group(0);
        }
    }

    let mut child = cmd.spawn()?;
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let (status, timed_out) = wait_with_deadline(&mut child, timeout)?;

    let deadline = timed_out.then(|| Instant::now() + KILL_GRACE);
    Ok(CapturedOutput {
        status,
        stdout: collect(&stdout, deadline),
        stderr: collect(&stderr, deadline),
        timed_out,
    })
}
