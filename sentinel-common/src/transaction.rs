//! The transaction model: change items plus commit metadata.

use crate::change::{ChangeItem, parse_change_listing};
use crate::errors::{Result, SentinelError};
use crate::look::RepositoryLook;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// One commit attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    pub author: String,
    pub date: String,
    pub log_message: String,
    changes: BTreeMap<String, ChangeItem>,
}

impl Transaction {
    /// Build a transaction from the raw `changed` listing and `info` block.
    pub fn parse(changed: &str, info: &str) -> Result<Self> {
        let (author, date, log_message) = parse_info(info)?;

        let mut changes = BTreeMap::new();
        for item in parse_change_listing(changed)? {
            if changes.contains_key(&item.path) {
                return Err(SentinelError::malformed(&item.path, "path listed twice"));
            }
            changes.insert(item.path.clone(), item);
        }

        Ok(Self {
            author,
            date,
            log_message,
            changes,
        })
    }

    /// Load the transaction through a repository look.
    pub fn load(look: &impl RepositoryLook) -> Result<Self> {
        let changed = look.changed()?;
        let info = look.info()?;
        let txn = Self::parse(&changed, &info)?;
        debug!(
            author = %txn.author,
            changes = txn.changes.len(),
            "loaded transaction"
        );
        Ok(txn)
    }

    pub fn changes(&self) -> &BTreeMap<String, ChangeItem> {
        &self.changes
    }

    pub fn get(&self, path: &str) -> Option<&ChangeItem> {
        self.changes.get(path)
    }

    /// Change items in path order.
    pub fn items(&self) -> impl Iterator<Item = &ChangeItem> {
        self.changes.values()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

fn parse_info(info: &str) -> Result<(String, String, String)> {
    let mut fields = info.splitn(4, '\n');
    let author = fields.next().unwrap_or_default();
    let (Some(date), Some(_log_size)) = (fields.next(), fields.next()) else {
        return Err(SentinelError::MalformedInfo(format!(
            "expected author, date, log size and log, got {info:?}"
        )));
    };
    let log_message = fields.next().unwrap_or_default();

    Ok((
        author.trim_end_matches('\r').to_string(),
        date.trim_end_matches('\r').to_string(),
        log_message.trim_end_matches(['\r', '\n']).to_string(),
    ))
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = self.log_message.lines().next().unwrap_or_default();
        writeln!(f, "{summary}")?;
        writeln!(f, "{}", "-".repeat(summary.chars().count()))?;
        for item in self.changes.values() {
            writeln!(f, "{item}")?;
        }
        Ok(())
    }
}
