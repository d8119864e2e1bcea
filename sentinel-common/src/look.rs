//! Repository introspection seam.
//!
//! The hook never reads the repository itself. Everything it knows about a
//! transaction comes through [`RepositoryLook`], implemented by the binary on
//! top of the `svnlook` tool and by in-memory fakes in tests.

use crate::errors::Result;

/// Property holding merge-tracking information.
pub const MERGEINFO_PROPERTY: &str = "svn:mergeinfo";

/// Which side of the transaction a property read refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Snapshot {
    /// The tree the transaction is based on.
    Previous,
    /// The tree as it will look once the transaction is committed.
    Current,
}

/// Read-only view of one transaction (or committed revision).
pub trait RepositoryLook {
    /// Raw `changed --copy-info` listing.
    fn changed(&self) -> Result<String>;

    /// Raw `info` block: author, date, log size and log message.
    fn info(&self) -> Result<String>;

    /// Value of `svn:mergeinfo` on `path`, or `None` when the property or
    /// the path does not exist in that snapshot.
    fn merge_info(&self, path: &str, snapshot: Snapshot) -> Result<Option<String>>;
}

impl<T: RepositoryLook + ?Sized> RepositoryLook for &T {
    fn changed(&self) -> Result<String> {
        (**self).changed()
    }

    fn info(&self) -> Result<String> {
        (**self).info()
    }

    fn merge_info(&self, path: &str, snapshot: Snapshot) -> Result<Option<String>> {
        (**self).merge_info(path, snapshot)
    }
}
