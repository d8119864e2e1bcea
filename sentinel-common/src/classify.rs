//! Transaction shape classification.
//!
//! A transaction is only interesting to the whitelist when it does exactly
//! one thing: a single copy (branch or tag), a single move, or a single
//! merge. Anything else is a plain edit and goes through the blacklist.

use crate::change::StatusKind;
use crate::errors::Result;
use crate::look::{RepositoryLook, Snapshot};
use crate::transaction::Transaction;
use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};

/// The kind of a classified operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Copy,
    Move,
    Merge,
}

impl OperationKind {
    /// Verb used in policy messages.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Copy => "Branching",
            Self::Move => "Move",
            Self::Merge => "Merge",
        }
    }
}

/// A transaction that does exactly one structural thing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Operation {
    Copy {
        source: String,
        destination: String,
    },
    Move {
        source: String,
        destination: String,
    },
    Merge {
        source: String,
        destination: String,
        /// Upper bound of the last merged revision range.
        revision: String,
    },
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Copy { .. } => OperationKind::Copy,
            Self::Move { .. } => OperationKind::Move,
            Self::Merge { .. } => OperationKind::Merge,
        }
    }

    pub fn source(&self) -> &str {
        match self {
            Self::Copy { source, .. } | Self::Move { source, .. } | Self::Merge { source, .. } => {
                source
            }
        }
    }

    pub fn destination(&self) -> &str {
        match self {
            Self::Copy { destination, .. }
            | Self::Move { destination, .. }
            | Self::Merge { destination, .. } => destination,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} from ^/{} to ^/{}",
            self.kind().describe(),
            self.source(),
            self.destination()
        )?;
        if let Self::Merge { revision, .. } = self {
            write!(f, " (up to r{revision})")?;
        }
        Ok(())
    }
}

/// A single added-with-history path.
pub fn detect_copy(txn: &Transaction) -> Option<Operation> {
    if txn.len() != 1 {
        return None;
    }
    let item = txn.items().next()?;
    let source = item.copied_from.as_ref()?;
    Some(Operation::Copy {
        source: source.path.clone(),
        destination: item.path.clone(),
    })
}

/// A deleted path plus one path copied from it, and nothing else.
pub fn detect_move(txn: &Transaction) -> Option<Operation> {
    if txn.len() != 2 {
        return None;
    }
    let mut items = txn.items();
    let (a, b) = (items.next()?, items.next()?);
    let (deleted, copied) = match (a.is_copy(), b.is_copy()) {
        (false, true) => (a, b),
        (true, false) => (b, a),
        _ => return None,
    };
    let source = copied.copied_from.as_ref()?;
    if deleted.status != StatusKind::Deleted || deleted.path != source.path {
        return None;
    }
    Some(Operation::Move {
        source: deleted.path.clone(),
        destination: copied.path.clone(),
    })
}

/// Character-wise longest common prefix of all changed paths.
fn common_prefix(txn: &Transaction) -> Option<&str> {
    let mut paths = txn.changes().keys();
    let first = paths.next()?;
    let mut len = first.len();
    for path in paths {
        len = first
            .bytes()
            .zip(path.bytes())
            .take(len)
            .take_while(|(a, b)| a == b)
            .count();
    }
    while !first.is_char_boundary(len) {
        len -= 1;
    }
    Some(&first[..len])
}

/// A property change on the common base directory that adds a new
/// `svn:mergeinfo` entry.
///
/// Assumes the client supports merge tracking; that is enforced by the
/// start-commit gate. Only the last mergeinfo line is reported, so several
/// merges committed together show up as the last one.
pub fn detect_merge(txn: &Transaction, look: &impl RepositoryLook) -> Result<Option<Operation>> {
    let Some(base) = common_prefix(txn) else {
        return Ok(None);
    };
    match txn.get(base) {
        Some(item) if item.property_changed => {}
        _ => return Ok(None),
    }

    let Some(after) = look
        .merge_info(base, Snapshot::Current)?
        .filter(|value| !value.trim().is_empty())
    else {
        return Ok(None);
    };
    let before = look.merge_info(base, Snapshot::Previous)?;
    if before.as_deref().map(str::trim) == Some(after.trim()) {
        debug!(base, "mergeinfo unchanged, not a merge");
        return Ok(None);
    }

    let Some(latest) = after.trim_end().lines().last() else {
        return Ok(None);
    };
    let Some((source, revisions)) = latest.split_once(':') else {
        warn!(base, entry = latest, "unparseable mergeinfo entry");
        return Ok(None);
    };
    let mut chars = source.chars();
    chars.next();
    let source = format!("{}/", chars.as_str());
    let revision = revisions.rsplit('-').next().unwrap_or(revisions);

    Ok(Some(Operation::Merge {
        source,
        destination: base.to_string(),
        revision: revision.to_string(),
    }))
}

/// Classify a transaction as a copy, move or merge, in that order.
///
/// The repository is only consulted when the transaction is neither a copy
/// nor a move.
pub fn classify(txn: &Transaction, look: &impl RepositoryLook) -> Result<Option<Operation>> {
    let operation = match detect_copy(txn).or_else(|| detect_move(txn)) {
        Some(operation) => Some(operation),
        None => detect_merge(txn, look)?,
    };
    match &operation {
        Some(op) => debug!(operation = %op, "classified transaction"),
        None => debug!("transaction is not a single copy, move or merge"),
    }
    Ok(operation)
}
