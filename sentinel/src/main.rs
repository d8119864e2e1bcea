//! SVN Sentinel - repository hook CLI
//!
//! Installed as the `pre-commit` and `start-commit` hooks of a Subversion
//! repository. Blocks direct commits to protected directories unless the
//! commit is a whitelisted branch, move or merge.

#![forbid(unsafe_code)]

mod commands;
mod config;
mod hook;
mod svnlook;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use hook::{HookOutcome, LookRequest};
use sentinel_common::{LogConfig, init_logging};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "sentinel")]
#[command(author, version, about = "SVN Sentinel - commit policy hooks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args)]
struct TargetArgs {
    /// Repository path
    repos: PathBuf,

    /// Transaction name (or revision number with --revision)
    txn: String,

    /// Treat TXN as a committed revision number
    #[arg(short, long)]
    revision: bool,

    /// svnlook binary
    #[arg(long, env = "SENTINEL_SVNLOOK", default_value = "svnlook")]
    svnlook: PathBuf,
}

impl TargetArgs {
    fn into_request(self) -> LookRequest {
        LookRequest {
            repos: self.repos,
            id: self.txn,
            revision: self.revision,
            svnlook: self.svnlook,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run as the pre-commit hook
    PreCommit {
        #[command(flatten)]
        target: TargetArgs,

        /// Policy file (default: REPOS/conf/sentinel.toml)
        #[arg(short, long, env = "SENTINEL_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Run as the start-commit hook
    ///
    /// Rejects clients that do not advertise merge tracking.
    StartCommit {
        /// Repository path
        repos: PathBuf,

        /// Committing user
        user: String,

        /// Colon-separated client capabilities
        capabilities: String,
    },

    /// Validate a policy file and print a summary
    CheckConfig {
        /// Policy file
        path: PathBuf,
    },

    /// Print a transaction and how it classifies
    Inspect {
        #[command(flatten)]
        target: TargetArgs,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn run(command: Commands) -> Result<HookOutcome> {
    match command {
        Commands::PreCommit { target, config } => {
            hook::run_pre_commit(&target.into_request(), config.as_deref())
        }
        Commands::StartCommit {
            repos,
            user,
            capabilities,
        } => hook::run_start_commit(&repos, &user, &capabilities),
        Commands::CheckConfig { path } => {
            commands::check_config(&path)?;
            Ok(HookOutcome::Allowed)
        }
        Commands::Inspect { target, json } => {
            commands::inspect(&target.into_request(), json)?;
            Ok(HookOutcome::Allowed)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut log_config = LogConfig::from_env("warn");
    if cli.verbose {
        log_config = log_config.with_level("debug");
    }
    if let Err(err) = init_logging(&log_config) {
        eprintln!("[ERROR] {err}");
        return ExitCode::FAILURE;
    }

    match run(cli.command) {
        Ok(outcome) => outcome.into(),
        Err(err) => {
            eprintln!("[ERROR] {err:#}");
            ExitCode::FAILURE
        }
    }
}
