//! Policy file location and loading.

use anyhow::{Context, Result};
use sentinel_common::PolicyConfig;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Policy location inside a repository when nothing else is given.
pub const DEFAULT_CONFIG_PATH: &str = "conf/sentinel.toml";

/// `explicit` (`--config` or `SENTINEL_CONFIG`), else `<repos>/conf/sentinel.toml`.
pub fn resolve_config_path(explicit: Option<&Path>, repos: &Path) -> PathBuf {
    match explicit {
        Some(path) => path.to_path_buf(),
        None => repos.join(DEFAULT_CONFIG_PATH),
    }
}

pub fn load_policy(path: &Path) -> Result<PolicyConfig> {
    debug!(path = %path.display(), "loading policy");
    PolicyConfig::load(path)
        .with_context(|| format!("Failed to load policy from {}", path.display()))
}
