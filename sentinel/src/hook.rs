//! Repository hook runners.
//!
//! Subversion relays a failing hook's stderr to the committing client, and
//! prints nothing for a passing one. Runners therefore stay silent on
//! success and return a [`HookOutcome`] that `main` turns into the exit code.

use crate::config::{load_policy, resolve_config_path};
use crate::svnlook::{SvnLook, Target};
use anyhow::{Context, Result};
use sentinel_common::policy::Verdict;
use sentinel_common::{Transaction, check_transaction, require_merge_tracking};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};

/// Exit code accepting the commit.
const EXIT_ALLOW: u8 = 0;

/// Exit code rejecting the commit (stderr goes back to the client).
const EXIT_DENY: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookOutcome {
    Allowed,
    Denied,
}

impl From<HookOutcome> for ExitCode {
    fn from(outcome: HookOutcome) -> Self {
        match outcome {
            HookOutcome::Allowed => ExitCode::from(EXIT_ALLOW),
            HookOutcome::Denied => ExitCode::from(EXIT_DENY),
        }
    }
}

/// Which transaction or revision to look at, as given on the command line.
#[derive(Debug, Clone)]
pub struct LookRequest {
    pub repos: PathBuf,
    pub id: String,
    pub revision: bool,
    pub svnlook: PathBuf,
}

impl LookRequest {
    pub fn open(&self) -> Result<SvnLook> {
        let target = if self.revision {
            let rev = self
                .id
                .parse::<u64>()
                .with_context(|| format!("Invalid revision number '{}'", self.id))?;
            Target::Revision(rev)
        } else {
            Target::Transaction(self.id.clone())
        };
        Ok(SvnLook::new(&self.svnlook, &self.repos, target))
    }
}

/// pre-commit: load the policy and transaction, print the rejection text on
/// denial.
pub fn run_pre_commit(request: &LookRequest, config: Option<&Path>) -> Result<HookOutcome> {
    let config_path = resolve_config_path(config, &request.repos);
    let policy = load_policy(&config_path)?;

    let look = request.open()?;
    let txn = Transaction::load(&look)
        .with_context(|| format!("Failed to read transaction {}", request.id))?;
    let verdict = check_transaction(&policy, &txn, &look)
        .with_context(|| format!("Failed to classify transaction {}", request.id))?;

    match verdict {
        Verdict::Allow(allowance) => {
            debug!(?allowance, txn = %request.id, "allowing commit");
            Ok(HookOutcome::Allowed)
        }
        Verdict::Deny(violation) => {
            info!(txn = %request.id, author = %txn.author, path = %violation.path, "rejecting commit");
            let mut stderr = io::stderr().lock();
            stderr.write_all(violation.render(&policy).as_bytes())?;
            stderr.flush()?;
            Ok(HookOutcome::Denied)
        }
    }
}

/// start-commit: refuse clients that cannot record merge tracking.
pub fn run_start_commit(repos: &Path, user: &str, capabilities: &str) -> Result<HookOutcome> {
    match require_merge_tracking(capabilities) {
        Ok(()) => Ok(HookOutcome::Allowed),
        Err(err) => {
            info!(repos = %repos.display(), user, capabilities, "client lacks merge tracking");
            let mut stderr = io::stderr().lock();
            writeln!(stderr, "{err}")?;
            Ok(HookOutcome::Denied)
        }
    }
}
