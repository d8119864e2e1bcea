//! Policy configuration: the TOML file schema and its validated, compiled
//! form.
//!
//! [`PolicyFile`] is what serde reads. [`PolicyConfig`] is built from it once
//! per hook run, owns the compiled glob patterns and the blacklist trie, and
//! is then only ever borrowed.

use crate::classify::OperationKind;
use crate::path_trie::PathPrefixTrie;
use crate::pattern::{PathPattern, PatternPairs, has_wildcards};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Banner printed above every rejection unless the policy overrides it.
pub const DEFAULT_REJECT_BANNER: &str = "
*********************************************************************
*                SVN Sentinel : COMMIT REJECTED                     *
*********************************************************************
";

/// Errors that make a policy file unusable.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read policy file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse policy file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid pattern '{pattern}' in {key}: {source}")]
    InvalidPattern {
        key: String,
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Restricted path '{0}' must not contain wildcards")]
    WildcardPrefix(String),

    #[error("Restricted path must not be empty")]
    EmptyPrefix,

    #[error("Restricted path '{0}' is listed more than once")]
    DuplicatePrefix(String),
}

/// One `no_direct_commits` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RestrictedPathEntry {
    /// Directory prefix under which direct commits are refused.
    pub path: String,
    /// Globs, relative to `path`, that may still be committed to directly.
    #[serde(default)]
    pub exceptions: Option<Vec<String>>,
}

/// On-disk policy schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyFile {
    /// Log message prefix that skips all checks. Absent disables bypass.
    pub bypass_message_prefix: Option<String>,
    /// Users allowed to bypass. Absent means anyone may.
    pub bypass_allowed_users: Option<Vec<String>>,
    pub reject_banner: Option<String>,
    #[serde(default)]
    pub no_direct_commits: Vec<RestrictedPathEntry>,
    #[serde(default)]
    pub branching_paths: Vec<(String, String)>,
    #[serde(default)]
    pub relocation_paths: Vec<(String, String)>,
    #[serde(default)]
    pub reintegration_paths: Vec<(String, String)>,
}

impl PolicyFile {
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

/// Commits whose log starts with `message_prefix` skip every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BypassRule {
    pub message_prefix: String,
    pub allowed_users: Option<BTreeSet<String>>,
}

impl BypassRule {
    pub fn applies(&self, author: &str, log_message: &str) -> bool {
        if !log_message.starts_with(&self.message_prefix) {
            return false;
        }
        match &self.allowed_users {
            None => true,
            Some(users) => users.contains(author),
        }
    }
}

/// Restricted directory prefixes and their exceptions.
#[derive(Debug, Clone, Default)]
pub struct Blacklist {
    trie: PathPrefixTrie,
    exceptions: BTreeMap<String, Option<Vec<PathPattern>>>,
}

fn normalize_prefix(raw: &str) -> String {
    format!("{}/", raw.trim_matches('/'))
}

impl Blacklist {
    fn from_entries(entries: &[RestrictedPathEntry]) -> Result<Self, ConfigError> {
        let mut blacklist = Self::default();
        for entry in entries {
            if entry.path.trim_matches('/').is_empty() {
                return Err(ConfigError::EmptyPrefix);
            }
            if has_wildcards(&entry.path) {
                return Err(ConfigError::WildcardPrefix(entry.path.clone()));
            }
            let prefix = normalize_prefix(&entry.path);
            if blacklist.exceptions.contains_key(&prefix) {
                return Err(ConfigError::DuplicatePrefix(prefix));
            }

            let exceptions = match entry.exceptions.as_deref() {
                None | Some([]) => None,
                Some(raw) => Some(compile_all("no_direct_commits.exceptions", raw)?),
            };
            blacklist.trie.insert(&prefix);
            blacklist.exceptions.insert(prefix, exceptions);
        }
        Ok(blacklist)
    }

    /// The restricted prefix (with trailing `/`) covering `path`, if any.
    pub fn restricted_prefix(&self, path: &str) -> Option<&str> {
        let matched = self.trie.longest_match(path)?;
        self.exceptions
            .get_key_value(&normalize_prefix(&matched))
            .map(|(prefix, _)| prefix.as_str())
    }

    /// Exception globs for a restricted prefix; `None` when the prefix has
    /// no exceptions at all.
    pub fn exceptions(&self, prefix: &str) -> Option<&[PathPattern]> {
        self.exceptions.get(prefix)?.as_deref()
    }

    /// Restricted prefixes in sorted order.
    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.exceptions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.exceptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exceptions.is_empty()
    }
}

fn compile_all(key: &str, raw: &[String]) -> Result<Vec<PathPattern>, ConfigError> {
    raw.iter()
        .map(|pattern| {
            PathPattern::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                key: key.to_string(),
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}

fn compile_pairs(key: &str, raw: &[(String, String)]) -> Result<PatternPairs, ConfigError> {
    let mut pairs = PatternPairs::default();
    for (source, destination) in raw {
        pairs
            .insert(source, destination)
            .map_err(|err| ConfigError::InvalidPattern {
                key: key.to_string(),
                pattern: format!("{source} -> {destination}"),
                source: err,
            })?;
    }
    Ok(pairs)
}

/// Validated policy, immutable once built.
#[derive(Debug, Clone)]
pub struct PolicyConfig {
    bypass: Option<BypassRule>,
    reject_banner: String,
    blacklist: Blacklist,
    branching: PatternPairs,
    relocation: PatternPairs,
    reintegration: PatternPairs,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            bypass: None,
            reject_banner: DEFAULT_REJECT_BANNER.to_string(),
            blacklist: Blacklist::default(),
            branching: PatternPairs::default(),
            relocation: PatternPairs::default(),
            reintegration: PatternPairs::default(),
        }
    }
}

impl TryFrom<PolicyFile> for PolicyConfig {
    type Error = ConfigError;

    fn try_from(file: PolicyFile) -> Result<Self, Self::Error> {
        let bypass = match (file.bypass_message_prefix, file.bypass_allowed_users) {
            (Some(prefix), users) if !prefix.is_empty() => Some(BypassRule {
                message_prefix: prefix,
                allowed_users: users.map(|u| u.into_iter().collect()),
            }),
            (_, Some(_)) => {
                warn!("bypass_allowed_users is set but bypass is disabled (no message prefix)");
                None
            }
            _ => None,
        };

        let config = Self {
            bypass,
            reject_banner: file
                .reject_banner
                .unwrap_or_else(|| DEFAULT_REJECT_BANNER.to_string()),
            blacklist: Blacklist::from_entries(&file.no_direct_commits)?,
            branching: compile_pairs("branching_paths", &file.branching_paths)?,
            relocation: compile_pairs("relocation_paths", &file.relocation_paths)?,
            reintegration: compile_pairs("reintegration_paths", &file.reintegration_paths)?,
        };
        debug!(
            restricted = config.blacklist.len(),
            branching = config.branching.len(),
            relocation = config.relocation.len(),
            reintegration = config.reintegration.len(),
            "policy compiled"
        );
        Ok(config)
    }
}

impl PolicyConfig {
    /// Parse and validate policy text. `origin` is only used in errors.
    pub fn from_toml(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        let file = PolicyFile::from_toml(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        Self::try_from(file)
    }

    /// Read, parse and validate a policy file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text, path)
    }

    pub fn bypass(&self) -> Option<&BypassRule> {
        self.bypass.as_ref()
    }

    pub fn reject_banner(&self) -> &str {
        &self.reject_banner
    }

    pub fn blacklist(&self) -> &Blacklist {
        &self.blacklist
    }

    pub fn branching(&self) -> &PatternPairs {
        &self.branching
    }

    pub fn relocation(&self) -> &PatternPairs {
        &self.relocation
    }

    pub fn reintegration(&self) -> &PatternPairs {
        &self.reintegration
    }

    /// The whitelist table consulted for an operation kind.
    pub fn pairs_for(&self, kind: OperationKind) -> &PatternPairs {
        match kind {
            OperationKind::Copy => &self.branching,
            OperationKind::Move => &self.relocation,
            OperationKind::Merge => &self.reintegration,
        }
    }
}
