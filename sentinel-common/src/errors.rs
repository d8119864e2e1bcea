//! Error types for transaction parsing and repository introspection.
//!
//! Every variant here is fatal to a hook run: a policy cannot be evaluated
//! safely over a change set that could not be read or parsed. Policy
//! rejections are not errors, see [`crate::policy::PolicyViolation`].

use thiserror::Error;

/// Errors raised while building or classifying a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SentinelError {
    /// A `svnlook changed` record did not match the expected grammar.
    #[error("Malformed change record ({reason}): {record:?}")]
    MalformedChangeRecord { record: String, reason: String },

    /// The `svnlook info` block did not have author, date, size and log.
    #[error("Malformed transaction info: {0}")]
    MalformedInfo(String),

    /// The introspection tool failed or wrote diagnostics.
    #[error("{command}: {message}")]
    Look { command: String, message: String },
}

impl SentinelError {
    pub(crate) fn malformed(record: &str, reason: impl Into<String>) -> Self {
        Self::MalformedChangeRecord {
            record: record.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the error came from the introspection collaborator rather
    /// than from parsing its output.
    pub fn is_look_failure(&self) -> bool {
        matches!(self, Self::Look { .. })
    }
}

pub type Result<T, E = SentinelError> = std::result::Result<T, E>;
