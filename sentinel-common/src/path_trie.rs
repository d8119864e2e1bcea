//! Segment-wise prefix trie over `/`-delimited repository paths.
//!
//! Used to find which blacklisted directory (if any) a changed path lives
//! under. Matching works on whole segments, so `branches` never matches
//! `branches2/x`.

use std::collections::BTreeMap;

const DELIMITER: char = '/';

#[derive(Debug, Default, Clone)]
struct TrieNode {
    children: BTreeMap<String, TrieNode>,
    terminal: bool,
}

/// Set of registered path prefixes.
#[derive(Debug, Default, Clone)]
pub struct PathPrefixTrie {
    root: TrieNode,
    len: usize,
}

fn split_path(path: &str) -> Vec<&str> {
    let path = path.strip_suffix(DELIMITER).unwrap_or(path);
    path.split(DELIMITER).collect()
}

impl PathPrefixTrie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a path. Empty input is ignored; re-inserting is a no-op.
    pub fn insert(&mut self, path: &str) {
        if path.is_empty() {
            return;
        }
        let mut node = &mut self.root;
        for segment in split_path(path) {
            node = node.children.entry(segment.to_string()).or_default();
        }
        if !node.terminal {
            node.terminal = true;
            self.len += 1;
        }
    }

    /// Number of distinct registered paths.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Walk `path` segment by segment as deep as the trie allows and return
    /// the consumed prefix (without trailing `/`) if the walk stopped on a
    /// registered path.
    ///
    /// A walk that runs out of trie on an intermediate node does not match,
    /// even when a shorter registered path lies on the way.
    pub fn longest_match(&self, path: &str) -> Option<String> {
        let segments = split_path(path);
        let mut node = &self.root;
        let mut depth = 0;
        for segment in &segments {
            match node.children.get(*segment) {
                Some(child) => {
                    node = child;
                    depth += 1;
                }
                None => break,
            }
        }

        if !node.terminal {
            return None;
        }
        let matched = segments[..depth].join("/");
        if matched.is_empty() {
            Some(DELIMITER.to_string())
        } else {
            Some(matched)
        }
    }
}

impl<S: AsRef<str>> FromIterator<S> for PathPrefixTrie {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut trie = Self::new();
        for path in iter {
            trie.insert(path.as_ref());
        }
        trie
    }
}
