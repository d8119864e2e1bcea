//! Start-commit gate on client capabilities.
//!
//! Merge detection reads `svn:mergeinfo`, so clients that cannot record it
//! would slip merges past the whitelist as plain edits.

use thiserror::Error;

/// Capability a client must advertise.
pub const MERGE_TRACKING_CAPABILITY: &str = "mergeinfo";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Commits from clients without merge tracking are not allowed. \
     Please upgrade to Subversion 1.5 or newer."
)]
pub struct MissingMergeTracking {
    /// The capability list as received.
    pub capabilities: String,
}

/// Check the colon-separated capability list passed to start-commit.
pub fn require_merge_tracking(capabilities: &str) -> Result<(), MissingMergeTracking> {
    if capabilities
        .split(':')
        .any(|cap| cap.trim() == MERGE_TRACKING_CAPABILITY)
    {
        Ok(())
    } else {
        Err(MissingMergeTracking {
            capabilities: capabilities.to_string(),
        })
    }
}
