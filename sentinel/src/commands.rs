//! Administrator commands: policy validation and transaction inspection.

use crate::config::load_policy;
use crate::hook::LookRequest;
use anyhow::{Context, Result};
use sentinel_common::{Operation, PolicyConfig, Transaction, classify};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;

/// Human-readable summary of a validated policy.
pub fn policy_summary(path: &Path, policy: &PolicyConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Policy OK: {}", path.display());
    match policy.bypass() {
        Some(rule) => {
            let users = match &rule.allowed_users {
                Some(users) => users.iter().cloned().collect::<Vec<_>>().join(", "),
                None => "anyone".to_string(),
            };
            let _ = writeln!(out, "  bypass prefix: {:?} ({users})", rule.message_prefix);
        }
        None => {
            let _ = writeln!(out, "  bypass: disabled");
        }
    }
    let _ = writeln!(out, "  restricted paths: {}", policy.blacklist().len());
    for prefix in policy.blacklist().prefixes() {
        let exceptions = policy.blacklist().exceptions(prefix).map_or(0, <[_]>::len);
        let _ = writeln!(out, "    {prefix} ({exceptions} exceptions)");
    }
    let _ = writeln!(out, "  branching pairs: {}", policy.branching().len());
    let _ = writeln!(out, "  relocation pairs: {}", policy.relocation().len());
    let _ = writeln!(out, "  reintegration pairs: {}", policy.reintegration().len());
    out
}

pub fn check_config(path: &Path) -> Result<()> {
    let policy = load_policy(path)?;
    print!("{}", policy_summary(path, &policy));
    Ok(())
}

#[derive(Debug, Serialize)]
struct InspectReport<'a> {
    transaction: &'a Transaction,
    operation: Option<&'a Operation>,
}

pub fn inspect(request: &LookRequest, json: bool) -> Result<()> {
    let look = request.open()?;
    let txn = Transaction::load(&look)
        .with_context(|| format!("Failed to read transaction {}", request.id))?;
    let operation = classify(&txn, &look)
        .with_context(|| format!("Failed to classify transaction {}", request.id))?;

    if json {
        let report = InspectReport {
            transaction: &txn,
            operation: operation.as_ref(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{txn}");
        match &operation {
            Some(op) => println!("Operation: {op}"),
            None => println!("Operation: none"),
        }
    }
    Ok(())
}
