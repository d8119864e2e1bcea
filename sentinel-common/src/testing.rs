//! In-memory repository look for unit tests.

use crate::errors::{Result, SentinelError};
use crate::look::{RepositoryLook, Snapshot};
use std::cell::Cell;
use std::collections::HashMap;

pub(crate) struct MemoryLook {
    changed: Result<String>,
    info: String,
    merge_info: HashMap<(String, Snapshot), Result<Option<String>>>,
    merge_info_reads: Cell<usize>,
}

fn look_failure(command: &str, message: &str) -> SentinelError {
    SentinelError::Look {
        command: command.to_string(),
        message: message.to_string(),
    }
}

impl MemoryLook {
    pub(crate) fn new(changed: &str, info: &str) -> Self {
        Self {
            changed: Ok(changed.to_string()),
            info: info.to_string(),
            merge_info: HashMap::new(),
            merge_info_reads: Cell::new(0),
        }
    }

    pub(crate) fn failing_changed(mut self, message: &str) -> Self {
        self.changed = Err(look_failure("svnlook changed", message));
        self
    }

    pub(crate) fn with_merge_info(
        mut self,
        path: &str,
        snapshot: Snapshot,
        value: Option<&str>,
    ) -> Self {
        self.merge_info.insert(
            (path.to_string(), snapshot),
            Ok(value.map(str::to_string)),
        );
        self
    }

    pub(crate) fn failing_merge_info(mut self, path: &str, snapshot: Snapshot, message: &str) -> Self {
        self.merge_info.insert(
            (path.to_string(), snapshot),
            Err(look_failure("svnlook propget", message)),
        );
        self
    }

    pub(crate) fn merge_info_reads(&self) -> usize {
        self.merge_info_reads.get()
    }
}

impl RepositoryLook for MemoryLook {
    fn changed(&self) -> Result<String> {
        self.changed.clone()
    }

    fn info(&self) -> Result<String> {
        Ok(self.info.clone())
    }

    fn merge_info(&self, path: &str, snapshot: Snapshot) -> Result<Option<String>> {
        self.merge_info_reads.set(self.merge_info_reads.get() + 1);
        self.merge_info
            .get(&(path.to_string(), snapshot))
            .cloned()
            .unwrap_or(Ok(None))
    }
}
