// Publisher: stages the output directory, commits it and pushes to the
// configured remote. All git work happens with the process inside the
// repository root; the caller's working directory is restored afterwards.

use crate::error::PublishError;
use crate::report;
use std::env;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    NothingToCommit,
}

/// The version-control operations the publisher needs.
pub trait VersionControl {
    fn stage(&self, paths: &[&Path]) -> Result<(), PublishError>;
    fn commit(&self, message: &str) -> Result<CommitOutcome, PublishError>;
    fn push(&self, remote: &str, branch: &str) -> Result<(), PublishError>;
    fn pull(&self, remote: &str, branch: &str) -> Result<(), PublishError>;
}

/// Runs the `git` binary found on `PATH` in the current directory.
/// Credentials come from the user's own git configuration.
#[derive(Debug, Clone, Default)]
pub struct GitCli;

impl GitCli {
    fn run(&self, args: &[&str]) -> Result<Output, PublishError> {
        let command = format!("git {}", args.join(" "));
        let output = Command::new("git")
            .args(args)
            .output()
            .map_err(|source| PublishError::Spawn {
                command: command.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(PublishError::Failed {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output)
    }
}

impl VersionControl for GitCli {
    fn stage(&self, paths: &[&Path]) -> Result<(), PublishError> {
        let mut args = vec!["add".to_string()];
        args.extend(paths.iter().map(|p| p.to_string_lossy().into_owned()));
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.run(&args).map(|_| ())
    }

    fn commit(&self, message: &str) -> Result<CommitOutcome, PublishError> {
        match self.run(&["commit", "-m", message]) {
            Ok(_) => Ok(CommitOutcome::Committed),
            Err(e @ PublishError::Failed { .. }) => {
                if nothing_staged()? {
                    Ok(CommitOutcome::NothingToCommit)
                } else {
                    Err(e)
                }
            }
            Err(e) => Err(e),
        }
    }

    fn push(&self, remote: &str, branch: &str) -> Result<(), PublishError> {
        self.run(&["push", remote, branch]).map(|_| ())
    }

    fn pull(&self, remote: &str, branch: &str) -> Result<(), PublishError> {
        self.run(&["pull", remote, branch]).map(|_| ())
    }
}

/// `git diff --cached --quiet` exits 0 when the index matches HEAD.
fn nothing_staged() -> Result<bool, PublishError> {
    let status = Command::new("git")
        .args(["diff", "--cached", "--quiet"])
        .status()
        .map_err(|source| PublishError::Spawn {
            command: "git diff --cached --quiet".into(),
            source,
        })?;
    Ok(status.success())
}

/// Changes the process working directory and puts the previous one back
/// when dropped, on every exit path.
pub struct WorkdirGuard {
    previous: PathBuf,
}

impl WorkdirGuard {
    pub fn enter(dir: &Path) -> Result<Self, PublishError> {
        let previous = env::current_dir().map_err(|source| PublishError::WorkingDir {
            path: dir.to_path_buf(),
            source,
        })?;
        env::set_current_dir(dir).map_err(|source| PublishError::WorkingDir {
            path: dir.to_path_buf(),
            source,
        })?;
        Ok(WorkdirGuard { previous })
    }
}

impl Drop for WorkdirGuard {
    fn drop(&mut self) {
        if let Err(e) = env::set_current_dir(&self.previous) {
            report::error(&format!(
                "failed to restore working directory {}: {}",
                self.previous.display(),
                e
            ));
        }
    }
}

/// Commit message stamped with the current local time.
pub fn commit_message() -> String {
    format!(
        "Update vocabulary data - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    )
}

pub struct Publisher<V: VersionControl> {
    vcs: V,
    root: PathBuf,
    output_dir: PathBuf,
    remote: String,
    branch: String,
}

impl<V: VersionControl> Publisher<V> {
    pub fn new(
        vcs: V,
        root: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        remote: &str,
        branch: &str,
    ) -> Self {
        Publisher {
            vcs,
            root: root.into(),
            output_dir: output_dir.into(),
            remote: remote.to_string(),
            branch: branch.to_string(),
        }
    }

    #[cfg(test)]
    pub fn vcs(&self) -> &V {
        &self.vcs
    }

    /// Stage, commit and push. Returns the commit outcome, or the first
    /// error; the working directory is restored either way.
    pub fn try_publish(&self) -> Result<CommitOutcome, PublishError> {
        let _guard = WorkdirGuard::enter(&self.root)?;
        self.vcs.stage(&[self.output_dir.as_path()])?;
        let outcome = self.vcs.commit(&commit_message())?;
        if outcome == CommitOutcome::NothingToCommit {
            report::warn("Nothing to commit; pushing anyway.");
        }
        self.vcs.push(&self.remote, &self.branch)?;
        Ok(outcome)
    }

    pub fn publish(&self) -> bool {
        match self.try_publish() {
            Ok(_) => true,
            Err(e) => {
                report::error(&format!("pushing to {}: {}", self.remote, e));
                false
            }
        }
    }

    pub fn try_pull(&self) -> Result<(), PublishError> {
        let _guard = WorkdirGuard::enter(&self.root)?;
        self.vcs.pull(&self.remote, &self.branch)
    }

    pub fn pull(&self) -> bool {
        match self.try_pull() {
            Ok(()) => true,
            Err(e) => {
                report::error(&format!("pulling from {}: {}", self.remote, e));
                false
            }
        }
    }
}
