//! Commit policy: configuration, evaluation and rejection messages.

mod config;
mod evaluate;
mod message;

pub use config::{
    Blacklist, BypassRule, ConfigError, DEFAULT_REJECT_BANNER, PolicyConfig, PolicyFile,
    RestrictedPathEntry,
};
pub use evaluate::{
    Allowance, DIRECTORY_PROPERTIES_SEGMENT, Verdict, check_restricted_paths, check_transaction,
    check_valid_pairs, evaluate,
};
pub use message::{Alternative, PolicyViolation, ViolationKind, allowed_alternatives};
