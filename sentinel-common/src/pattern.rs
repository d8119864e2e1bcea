//! Shell-style path patterns and the bidirectional pattern-pair tables.
//!
//! Patterns follow `fnmatch` rules: `*` and `?` may cross `/`, and `[...]`
//! classes are supported. A pattern that ends in `/` names a directory and
//! additionally matches everything beneath it.

use glob::{Pattern, PatternError};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A compiled path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    glob: Pattern,
    directory: bool,
}

impl PathPattern {
    pub fn new(raw: &str) -> Result<Self, PatternError> {
        Ok(Self {
            raw: raw.to_string(),
            glob: Pattern::new(raw)?,
            directory: raw.ends_with('/'),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, path: &str) -> bool {
        if self.glob.matches(path) {
            return true;
        }
        if !self.directory {
            return false;
        }
        if !path.ends_with('/') && self.glob.matches(&format!("{path}/")) {
            return true;
        }
        path.match_indices('/')
            .any(|(idx, _)| self.glob.matches(&path[..=idx]))
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Whether `raw` uses any glob metacharacters.
pub fn has_wildcards(raw: &str) -> bool {
    raw.contains(['*', '?', '['])
}

#[derive(Debug, Clone)]
struct PatternEntry {
    pattern: PathPattern,
    partners: BTreeSet<String>,
}

/// A table of `(source, destination)` pattern pairs, indexable in both
/// directions.
#[derive(Debug, Clone, Default)]
pub struct PatternPairs {
    forward: BTreeMap<String, PatternEntry>,
    reverse: BTreeMap<String, PatternEntry>,
}

fn index_pair(
    index: &mut BTreeMap<String, PatternEntry>,
    key: &str,
    partner: &str,
) -> Result<(), PatternError> {
    if let Some(entry) = index.get_mut(key) {
        entry.partners.insert(partner.to_string());
        return Ok(());
    }
    index.insert(
        key.to_string(),
        PatternEntry {
            pattern: PathPattern::new(key)?,
            partners: BTreeSet::from([partner.to_string()]),
        },
    );
    Ok(())
}

impl PatternPairs {
    pub fn new<S, D>(pairs: impl IntoIterator<Item = (S, D)>) -> Result<Self, PatternError>
    where
        S: AsRef<str>,
        D: AsRef<str>,
    {
        let mut table = Self::default();
        for (source, destination) in pairs {
            table.insert(source.as_ref(), destination.as_ref())?;
        }
        Ok(table)
    }

    pub fn insert(&mut self, source: &str, destination: &str) -> Result<(), PatternError> {
        index_pair(&mut self.forward, source, destination)?;
        index_pair(&mut self.reverse, destination, source)
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Number of distinct pairs.
    pub fn len(&self) -> usize {
        self.forward.values().map(|e| e.partners.len()).sum()
    }

    /// Union of destination patterns registered against every source pattern
    /// that matches `source`.
    pub fn allowed_destinations(&self, source: &str) -> Vec<&PathPattern> {
        let names: BTreeSet<&str> = self
            .forward
            .values()
            .filter(|entry| entry.pattern.matches(source))
            .flat_map(|entry| entry.partners.iter().map(String::as_str))
            .collect();
        names
            .into_iter()
            .filter_map(|name| self.reverse.get(name).map(|entry| &entry.pattern))
            .collect()
    }

    /// Whether moving content from `source` to `destination` is a declared
    /// pairing.
    pub fn permits(&self, source: &str, destination: &str) -> bool {
        self.allowed_destinations(source)
            .iter()
            .any(|pattern| pattern.matches(destination))
    }

    /// Every declared `(source, destination)` pattern pair whose destination
    /// pattern matches `destination`.
    pub fn pairs_into(&self, destination: &str) -> Vec<(&str, &str)> {
        self.reverse
            .iter()
            .filter(|(_, entry)| entry.pattern.matches(destination))
            .flat_map(|(dst, entry)| {
                entry
                    .partners
                    .iter()
                    .map(move |src| (src.as_str(), dst.as_str()))
            })
            .collect()
    }

    /// All pairs, ordered by source pattern.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.forward.iter().flat_map(|(src, entry)| {
            entry
                .partners
                .iter()
                .map(move |dst| (src.as_str(), dst.as_str()))
        })
    }
}
