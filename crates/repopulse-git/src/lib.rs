#![doc = include_str!("../README.md")]

use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GitError>;

#[derive(Debug, Error)]
pub enum GitError {
    #[error("failed to run git {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("git {command} exited with status {code}: {stderr}")]
    Failed {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("git {command} produced non-UTF-8 output")]
    InvalidOutput { command: String },
}

/// A git checkout the runner operates on.
///
/// Holds only the working directory; every call shells out to `git` and
/// succeeds iff the subprocess exits zero.
#[derive(Debug, Clone)]
pub struct GitWorkspace {
    workdir: PathBuf,
}

impl GitWorkspace {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        GitWorkspace {
            workdir: workdir.into(),
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Stage a path.
    pub fn add(&self, path: &str) -> Result<()> {
        self.run(&["add", path]).map(|_| ())
    }

    /// Commit staged changes with the given message.
    pub fn commit(&self, message: &str) -> Result<()> {
        self.run(&["commit", "-m", message]).map(|_| ())
    }

    /// Push a branch to a remote.
    pub fn push(&self, remote: &str, branch: &str) -> Result<()> {
        self.run(&["push", remote, branch]).map(|_| ())
    }

    /// Pull a branch from a remote.
    pub fn pull(&self, remote: &str, branch: &str) -> Result<()> {
        self.run(&["pull", remote, branch]).map(|_| ())
    }

    /// Check out an existing branch.
    pub fn checkout(&self, branch: &str) -> Result<()> {
        self.run(&["checkout", branch]).map(|_| ())
    }

    /// Create a branch and check it out.
    pub fn create_branch(&self, branch: &str) -> Result<()> {
        self.run(&["checkout", "-b", branch]).map(|_| ())
    }

    /// Delete a local branch (refuses unmerged branches, as `git branch -d` does).
    pub fn delete_branch(&self, branch: &str) -> Result<()> {
        self.run(&["branch", "-d", branch]).map(|_| ())
    }

    /// Name of the currently checked-out branch.
    pub fn current_branch(&self) -> Result<String> {
        self.run(&["rev-parse", "--abbrev-ref", "HEAD"])
            .map(|out| out.trim().to_string())
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        let command = args.join(" ");
        tracing::debug!(workdir = %self.workdir.display(), "git {}", command);

        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .map_err(|source| GitError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(GitError::Failed {
                command,
                code: output.status.code().unwrap_or(-1),
                stderr,
            });
        }

        String::from_utf8(output.stdout).map_err(|_| GitError::InvalidOutput { command })
    }
}
