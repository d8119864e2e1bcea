//! Policy violations and the rejection text shown to the committer.

use super::config::PolicyConfig;
use crate::classify::{Operation, OperationKind};
use serde::Serialize;
use std::fmt::{self, Write as _};

/// Why a commit was refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViolationKind {
    /// A plain edit inside a restricted directory.
    DirectCommit,
    /// A copy, move or merge into a restricted directory that no whitelist
    /// pair allows.
    UnlistedOperation { operation: Operation },
}

/// A rejected change: the offending path and the restricted prefix it falls
/// under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyViolation {
    pub kind: ViolationKind,
    pub path: String,
    pub restricted_prefix: String,
}

impl PolicyViolation {
    pub fn direct_commit(path: &str, restricted_prefix: &str) -> Self {
        Self {
            kind: ViolationKind::DirectCommit,
            path: path.to_string(),
            restricted_prefix: restricted_prefix.to_string(),
        }
    }

    pub fn unlisted_operation(operation: &Operation, restricted_prefix: &str) -> Self {
        Self {
            kind: ViolationKind::UnlistedOperation {
                operation: operation.clone(),
            },
            path: operation.destination().to_string(),
            restricted_prefix: restricted_prefix.to_string(),
        }
    }

    /// Full rejection text: banner, reason, and the operations that would
    /// have been accepted for the rejected path.
    pub fn render(&self, config: &PolicyConfig) -> String {
        let mut out = String::new();
        out.push_str(config.reject_banner());
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        let _ = writeln!(out, "!! {self}");
        let _ = writeln!(out);
        let _ = writeln!(out, "Changed path: {}", self.path);
        let _ = writeln!(out, "Restricted path: {}", self.restricted_prefix);

        let alternatives = allowed_alternatives(config, &self.path, &self.restricted_prefix);
        if !alternatives.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Allowed operations for this path:");
            for alternative in &alternatives {
                let _ = writeln!(out, " - {alternative}");
            }
        }
        out
    }
}

impl fmt::Display for PolicyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ViolationKind::DirectCommit => write!(
                f,
                "Direct commits to {} are not allowed",
                self.restricted_prefix
            ),
            ViolationKind::UnlistedOperation { operation } => {
                write!(f, "{operation} is not allowed")
            }
        }
    }
}

/// An operation that the policy would accept for a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alternative {
    /// Direct commits matching an exception of the restricted prefix.
    Commit { pattern: String },
    /// A whitelisted pair whose destination covers the path.
    Pair {
        kind: OperationKind,
        source: String,
        destination: String,
    },
}

impl fmt::Display for Alternative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Commit { pattern } => write!(f, "Commits to ^/{pattern}"),
            Self::Pair {
                kind,
                source,
                destination,
            } => write!(
                f,
                "{} from ^/{source} to ^/{destination}",
                kind.describe()
            ),
        }
    }
}

/// Exceptions of `restricted_prefix`, then every branching, move and merge
/// pair whose destination pattern matches `path`.
pub fn allowed_alternatives(
    config: &PolicyConfig,
    path: &str,
    restricted_prefix: &str,
) -> Vec<Alternative> {
    let mut alternatives: Vec<Alternative> = config
        .blacklist()
        .exceptions(restricted_prefix)
        .unwrap_or_default()
        .iter()
        .map(|pattern| Alternative::Commit {
            pattern: format!("{restricted_prefix}{pattern}"),
        })
        .collect();

    for kind in [OperationKind::Copy, OperationKind::Move, OperationKind::Merge] {
        alternatives.extend(config.pairs_for(kind).pairs_into(path).into_iter().map(
            |(source, destination)| Alternative::Pair {
                kind,
                source: source.to_string(),
                destination: destination.to_string(),
            },
        ));
    }
    alternatives
}
