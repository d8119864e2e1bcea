//! Parsing of `svnlook changed --copy-info` records.
//!
//! Each record is one header line with three flag columns followed by the
//! path, optionally followed by an indented `(from SOURCE:rREV)` line when
//! the path was added with history:
//!
//! ```text
//! A + branches/feature/f12/
//!     (from development/:r120)
//! ```

use crate::errors::{Result, SentinelError};
use serde::Serialize;
use std::fmt;

/// What happened to a node's contents in the transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Added,
    Deleted,
    Updated,
    /// Node content untouched, only its properties changed (`_` column).
    PropertyOnly,
}

impl StatusKind {
    fn from_column(c: char) -> Option<Self> {
        match c {
            'A' => Some(Self::Added),
            'D' => Some(Self::Deleted),
            'U' => Some(Self::Updated),
            '_' => Some(Self::PropertyOnly),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Deleted => "deleted",
            Self::Updated => "updated",
            Self::PropertyOnly => "prop-change",
        }
    }
}

/// Origin of a node that was added with history.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CopySource {
    pub path: String,
    pub revision: u64,
}

/// One path touched by a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeItem {
    pub path: String,
    pub status: StatusKind,
    pub property_changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copied_from: Option<CopySource>,
}

impl ChangeItem {
    pub fn is_copy(&self) -> bool {
        self.copied_from.is_some()
    }

    /// svnlook prints directories with a trailing `/`.
    pub fn is_directory(&self) -> bool {
        self.path.ends_with('/')
    }

    /// A directory whose only change is to its own properties.
    pub fn is_directory_property_change(&self) -> bool {
        self.is_directory() && self.status == StatusKind::PropertyOnly
    }
}

impl fmt::Display for ChangeItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.copied_from {
            Some(source) => write!(
                f,
                "{} (copied from {}@{})",
                self.path, source.path, source.revision
            ),
            None => write!(f, "{} ({})", self.path, self.status.as_str()),
        }
    }
}

/// Parse a single change record into a [`ChangeItem`].
pub fn parse_change_record(record: &str) -> Result<ChangeItem> {
    let record = record.trim();
    let (header, annotation) = match record.split_once('\n') {
        Some((header, rest)) => (header.trim_end(), Some(rest.trim())),
        None => (record, None),
    };

    let mut columns = header.chars();
    let (Some(status_col), Some(prop_col), Some(copy_col)) =
        (columns.next(), columns.next(), columns.next())
    else {
        return Err(SentinelError::malformed(record, "record too short"));
    };

    let status = StatusKind::from_column(status_col).ok_or_else(|| {
        SentinelError::malformed(record, format!("unknown status '{status_col}'"))
    })?;
    let property_changed = match prop_col {
        'U' => true,
        ' ' => false,
        other => {
            return Err(SentinelError::malformed(
                record,
                format!("unknown property flag '{other}'"),
            ));
        }
    };
    let copied = match copy_col {
        '+' => true,
        ' ' => false,
        other => {
            return Err(SentinelError::malformed(
                record,
                format!("unknown copy flag '{other}'"),
            ));
        }
    };
    if copied && status != StatusKind::Added {
        return Err(SentinelError::malformed(
            record,
            "copy flag is only valid on added paths",
        ));
    }

    // All three flag columns are ASCII at this point.
    let path = header[3..].trim_start();
    if path.is_empty() {
        return Err(SentinelError::malformed(record, "missing path"));
    }

    let copied_from = match (copied, annotation) {
        (true, Some(annotation)) => Some(parse_copy_annotation(record, annotation)?),
        (true, None) => {
            return Err(SentinelError::malformed(record, "copy without source"));
        }
        (false, Some(_)) => {
            return Err(SentinelError::malformed(
                record,
                "unexpected continuation line",
            ));
        }
        (false, None) => None,
    };

    Ok(ChangeItem {
        path: path.to_string(),
        status,
        property_changed,
        copied_from,
    })
}

fn parse_copy_annotation(record: &str, annotation: &str) -> Result<CopySource> {
    let inner = annotation
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(|| SentinelError::malformed(record, "copy source is not parenthesised"))?;
    let marker = inner
        .trim()
        .strip_prefix("from ")
        .ok_or_else(|| SentinelError::malformed(record, "copy source lacks 'from'"))?;
    let (path, revision) = marker
        .trim()
        .rsplit_once(":r")
        .ok_or_else(|| SentinelError::malformed(record, "copy source lacks ':r' revision"))?;
    let revision = revision.parse::<u64>().map_err(|_| {
        SentinelError::malformed(record, format!("copy revision '{revision}' is not numeric"))
    })?;
    if path.is_empty() {
        return Err(SentinelError::malformed(record, "empty copy source path"));
    }

    Ok(CopySource {
        path: path.to_string(),
        revision,
    })
}

/// Split a full `svnlook changed --copy-info` listing into records.
///
/// Lines starting with whitespace continue the previous record.
pub fn split_change_records(listing: &str) -> Vec<String> {
    let mut records: Vec<String> = Vec::new();
    for line in listing.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let continuation = line.starts_with(char::is_whitespace);
        match records.last_mut() {
            Some(current) if continuation => {
                current.push('\n');
                current.push_str(line);
            }
            _ => records.push(line.to_string()),
        }
    }
    records
}

/// Parse a full listing into change items, in listing order.
pub fn parse_change_listing(listing: &str) -> Result<Vec<ChangeItem>> {
    split_change_records(listing)
        .iter()
        .map(|record| parse_change_record(record))
        .collect()
}
