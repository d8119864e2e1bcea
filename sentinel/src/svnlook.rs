//! `svnlook` subprocess implementation of [`RepositoryLook`].

use sentinel_common::look::{MERGEINFO_PROPERTY, RepositoryLook, Snapshot};
use sentinel_common::{Result, SentinelError};
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

/// Error codes that mean "nothing there" rather than failure.
const PROPERTY_NOT_FOUND: &str = "E200017";
const PATH_NOT_FOUND: &str = "E160013";

/// What the hook is looking at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// An uncommitted transaction (pre-commit).
    Transaction(String),
    /// A committed revision (manual re-checks).
    Revision(u64),
}

impl Target {
    fn args(&self) -> [String; 2] {
        match self {
            Self::Transaction(txn) => ["--transaction".to_string(), txn.clone()],
            Self::Revision(rev) => ["--revision".to_string(), rev.to_string()],
        }
    }
}

#[derive(Debug, Clone)]
pub struct SvnLook {
    program: PathBuf,
    repos: PathBuf,
    target: Target,
}

impl SvnLook {
    pub fn new(program: impl Into<PathBuf>, repos: impl Into<PathBuf>, target: Target) -> Self {
        Self {
            program: program.into(),
            repos: repos.into(),
            target,
        }
    }

    /// Target for the "previous" snapshot. `None` when there is no such
    /// revision; `Some(None)` means the youngest revision.
    fn previous_target(&self) -> Option<Option<Target>> {
        match self.target {
            Target::Transaction(_) => Some(None),
            Target::Revision(0) => None,
            Target::Revision(rev) => Some(Some(Target::Revision(rev - 1))),
        }
    }

    /// Run `svnlook SUBCOMMAND REPOS [target] [extra..]` and return stdout.
    ///
    /// Any stderr output is treated as failure, same as a non-zero exit.
    fn run(&self, subcommand: &str, target: Option<&Target>, extra: &[&str]) -> Result<String> {
        let command = format!("svnlook {subcommand}");
        let mut cmd = Command::new(&self.program);
        cmd.arg(subcommand).arg(&self.repos);
        if let Some(target) = target {
            cmd.args(target.args());
        }
        cmd.args(extra);
        debug!(?cmd, "running svnlook");

        let output = cmd.output().map_err(|err| SentinelError::Look {
            command: command.clone(),
            message: format!("failed to run {}: {err}", self.program.display()),
        })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        if !stderr.is_empty() {
            return Err(SentinelError::Look {
                command,
                message: stderr.to_string(),
            });
        }
        if !output.status.success() {
            return Err(SentinelError::Look {
                command,
                message: format!("exited with {}", output.status),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl RepositoryLook for SvnLook {
    fn changed(&self) -> Result<String> {
        self.run("changed", Some(&self.target), &["--copy-info"])
    }

    fn info(&self) -> Result<String> {
        self.run("info", Some(&self.target), &[])
    }

    fn merge_info(&self, path: &str, snapshot: Snapshot) -> Result<Option<String>> {
        let target = match snapshot {
            Snapshot::Current => Some(self.target.clone()),
            Snapshot::Previous => match self.previous_target() {
                Some(target) => target,
                None => return Ok(None),
            },
        };
        match self.run("propget", target.as_ref(), &[MERGEINFO_PROPERTY, path]) {
            Ok(value) => Ok(Some(value)),
            Err(SentinelError::Look { message, .. })
                if message.contains(PROPERTY_NOT_FOUND) || message.contains(PATH_NOT_FOUND) =>
            {
                debug!(path, ?snapshot, "no mergeinfo");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}
