//! SVN Sentinel - shared library
//!
//! Parsing of `svnlook` output into a transaction model, classification of
//! branch/move/merge transactions, and the commit policy evaluated by the
//! repository hooks.

#![forbid(unsafe_code)]

pub mod capabilities;
pub mod change;
pub mod classify;
pub mod errors;
pub mod logging;
pub mod look;
pub mod path_trie;
pub mod pattern;
pub mod policy;
pub mod transaction;

#[cfg(test)]
mod testing;

pub use capabilities::{MissingMergeTracking, require_merge_tracking};
pub use change::{ChangeItem, CopySource, StatusKind, parse_change_listing};
pub use classify::{Operation, OperationKind, classify};
pub use errors::{Result, SentinelError};
pub use logging::{LOG_ENV, LogConfig, LoggingError, init_logging};
pub use look::{MERGEINFO_PROPERTY, RepositoryLook, Snapshot};
pub use path_trie::PathPrefixTrie;
pub use pattern::{PathPattern, PatternPairs};
pub use policy::{PolicyConfig, PolicyViolation, Verdict, check_transaction};
pub use transaction::Transaction;
