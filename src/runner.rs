// src/runner.rs

use crate::model::{DiffAlgorithm, RawDiff, RevisionPair};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Default deadline for a single `git diff` invocation
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Produces the raw diff of one revision pair under one algorithm.
///
/// Implementations fail closed: any failure yields an empty [`RawDiff`].
pub trait DiffComputer: Sync {
    fn compute(&self, pair: &RevisionPair, algorithm: DiffAlgorithm) -> RawDiff;
}

/// Computes diffs by shelling out to the `git` binary
#[derive(Debug, Clone)]
pub struct GitCli {
    repo: PathBuf,
    ignore_whitespace: bool,
    timeout: Duration,
}

impl GitCli {
    pub fn new(repo: impl Into<PathBuf>) -> Self {
        GitCli {
            repo: repo.into(),
            ignore_whitespace: true,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Pass `-w` to every invocation, for both algorithm variants alike
    pub fn ignore_whitespace(mut self, enabled: bool) -> Self {
        self.ignore_whitespace = enabled;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn repo(&self) -> &Path {
        &self.repo
    }

    /// Checks that a usable `git` binary is on the path
    pub fn probe(&self) -> io::Result<String> {
        let mut cmd = Command::new("git");
        cmd.arg("--version");
        let (status, stdout) = run_with_timeout(cmd, self.timeout)?;
        if !status.success() {
            return Err(io::Error::other(format!("git --version exited with {status}")));
        }
        Ok(String::from_utf8_lossy(&stdout).trim().to_string())
    }

    fn command(&self, pair: &RevisionPair, algorithm: DiffAlgorithm) -> Command {
        let mut cmd = Command::new("git");
        // Paths are matched literally so `[id].tsx` cannot also select `i.tsx`
        cmd.arg("-C").arg(&self.repo).arg("--literal-pathspecs").arg("diff").arg("--no-color").arg("--no-ext-diff");
        if self.ignore_whitespace {
            cmd.arg("-w");
        }
        cmd.arg(format!("--diff-algorithm={}", algorithm.git_name()))
            .arg(&pair.old_revision)
            .arg(&pair.new_revision)
            .arg("--")
            .arg(&pair.file_path);
        cmd
    }
}

impl DiffComputer for GitCli {
    fn compute(&self, pair: &RevisionPair, algorithm: DiffAlgorithm) -> RawDiff {
        let cmd = self.command(pair, algorithm);
        match run_with_timeout(cmd, self.timeout) {
            Ok((status, stdout)) if status.success() => RawDiff(String::from_utf8_lossy(&stdout).into_owned()),
            Ok((status, _)) => {
                tracing::debug!(file = %pair.file_path, rev = %pair.new_revision, %algorithm, %status, "git diff failed");
                RawDiff::empty()
            }
            Err(e) => {
                tracing::debug!(file = %pair.file_path, rev = %pair.new_revision, %algorithm, error = %e, "git diff did not complete");
                RawDiff::empty()
            }
        }
    }
}

/// Runs a command with stdout captured, killing it if it outlives `timeout`.
pub fn run_with_timeout(mut cmd: Command, timeout: Duration) -> io::Result<(ExitStatus, Vec<u8>)> {
    cmd.stdout(Stdio::piped()).stderr(Stdio::null()).stdin(Stdio::null());
    let mut child = cmd.spawn()?;
    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| io::Error::other("child stdout was not captured"))?;

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = tx.send(stdout.read_to_end(&mut buf).map(|_| buf));
    });

    match rx.recv_timeout(timeout) {
        Ok(read) => {
            let status = child.wait()?;
            Ok((status, read?))
        }
        Err(_) => {
            let _ = child.kill();
            let _ = child.wait();
            Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("command timed out after {:.1?}", timeout),
            ))
        }
    }
}
