//! Verdicts: bypass, then whitelist, then blacklist.

use super::config::PolicyConfig;
use super::message::PolicyViolation;
use crate::change::ChangeItem;
use crate::classify::{Operation, classify};
use crate::errors::Result;
use crate::look::RepositoryLook;
use crate::pattern::PathPattern;
use crate::transaction::Transaction;
use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::ControlFlow;
use tracing::{debug, info};

/// Segment appended to a directory's relative path when the directory itself
/// only had its properties changed, so exception globs such as
/// `feature/f*/?*` can admit it.
pub const DIRECTORY_PROPERTIES_SEGMENT: &str = ".";

/// Why a commit was let through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Allowance {
    /// The log message carried the bypass prefix.
    Bypass,
    /// The transaction is a declared branch, move or merge.
    Whitelisted { operation: Operation },
    /// Nothing touched a restricted path without an exception.
    Unrestricted,
}

/// Outcome of evaluating one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", content = "detail", rename_all = "snake_case")]
pub enum Verdict {
    Allow(Allowance),
    Deny(PolicyViolation),
}

impl Verdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow(_))
    }
}

/// What an exception glob is matched against for one changed item.
struct ExceptionSubject<'a> {
    relative: &'a str,
    directory_properties: bool,
}

impl<'a> ExceptionSubject<'a> {
    fn new(item: &'a ChangeItem, restricted_prefix: &str) -> Self {
        Self {
            relative: item
                .path
                .strip_prefix(restricted_prefix)
                .unwrap_or(&item.path),
            directory_properties: item.is_directory_property_change(),
        }
    }

    fn matched_by(&self, pattern: &PathPattern) -> bool {
        if self.directory_properties {
            pattern.matches(&format!("{}{DIRECTORY_PROPERTIES_SEGMENT}", self.relative))
        } else {
            pattern.matches(self.relative)
        }
    }
}

/// `dirname(path) + "/"`; a directory groups under itself.
fn containing_directory(path: &str) -> String {
    match path.rfind('/') {
        Some(idx) => format!("{}/", &path[..idx]),
        None => "/".to_string(),
    }
}

/// Check every changed path against the restricted prefixes and their
/// exceptions.
pub fn check_restricted_paths(
    config: &PolicyConfig,
    txn: &Transaction,
) -> std::result::Result<(), PolicyViolation> {
    let mut groups: BTreeMap<String, Vec<&ChangeItem>> = BTreeMap::new();
    for item in txn.items() {
        groups
            .entry(containing_directory(&item.path))
            .or_default()
            .push(item);
    }

    let blacklist = config.blacklist();
    for (directory, items) in &groups {
        let Some(prefix) = blacklist.restricted_prefix(directory) else {
            continue;
        };
        let offending = match blacklist.exceptions(prefix) {
            None => items.first(),
            Some(patterns) => items.iter().find(|item| {
                let subject = ExceptionSubject::new(item, prefix);
                !patterns.iter().any(|pattern| subject.matched_by(pattern))
            }),
        };
        if let Some(item) = offending {
            debug!(path = %item.path, prefix, "direct commit to restricted path");
            return Err(PolicyViolation::direct_commit(&item.path, prefix));
        }
    }
    Ok(())
}

/// Whitelist check for a classified operation.
///
/// Breaks with `Allow` when the pair is declared, with `Deny` when the
/// destination is restricted and the pair is not declared, and continues
/// otherwise.
pub fn check_valid_pairs(config: &PolicyConfig, operation: &Operation) -> ControlFlow<Verdict> {
    let pairs = config.pairs_for(operation.kind());
    if pairs.permits(operation.source(), operation.destination()) {
        info!(%operation, "whitelisted operation");
        return ControlFlow::Break(Verdict::Allow(Allowance::Whitelisted {
            operation: operation.clone(),
        }));
    }
    if let Some(prefix) = config.blacklist().restricted_prefix(operation.destination()) {
        debug!(%operation, prefix, "operation lands in restricted path");
        return ControlFlow::Break(Verdict::Deny(PolicyViolation::unlisted_operation(
            operation, prefix,
        )));
    }
    ControlFlow::Continue(())
}

/// Evaluate a transaction whose operation has already been classified.
pub fn evaluate(
    config: &PolicyConfig,
    txn: &Transaction,
    operation: Option<&Operation>,
) -> Verdict {
    if let Some(operation) = operation
        && let ControlFlow::Break(verdict) = check_valid_pairs(config, operation)
    {
        return verdict;
    }
    match check_restricted_paths(config, txn) {
        Ok(()) => Verdict::Allow(Allowance::Unrestricted),
        Err(violation) => Verdict::Deny(violation),
    }
}

/// Full pre-commit check: bypass, classification, then [`evaluate`].
pub fn check_transaction(
    config: &PolicyConfig,
    txn: &Transaction,
    look: &impl RepositoryLook,
) -> Result<Verdict> {
    if let Some(rule) = config.bypass()
        && rule.applies(&txn.author, &txn.log_message)
    {
        info!(author = %txn.author, "bypass prefix present, skipping checks");
        return Ok(Verdict::Allow(Allowance::Bypass));
    }

    let operation = classify(txn, look)?;
    let verdict = evaluate(config, txn, operation.as_ref());
    match &verdict {
        Verdict::Allow(allowance) => debug!(?allowance, "commit allowed"),
        Verdict::Deny(violation) => info!(%violation, path = %violation.path, "commit denied"),
    }
    Ok(verdict)
}
