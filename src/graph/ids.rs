//! Identifier assignment
//!
//! Raw feed and warehouse names are not guaranteed unique or safe to use as
//! node ids, so every node gets a freshly minted `<counter>-<normalized-name>`
//! id. The registry keeps the mapping from a stable logical key (row key,
//! normalized warehouse name, or fixed roster key) to the minted id, so edge
//! construction can resolve "the node for warehouse X" later. All state is
//! local to one transform invocation; two concurrent runs never interleave
//! id assignment.

use std::collections::HashMap;

/// Replace spaces with underscores
///
/// Used both as the stable lookup key for warehouse columns and as the name
/// half of minted ids.
pub fn normalise(name: &str) -> String {
    name.replace(' ', "_")
}

/// Stable logical key for the feed row at `row` (zero-based table order)
pub fn feed_key(row: usize) -> String {
    format!("feed_{row}")
}

/// Maps stable logical keys to minted node ids
#[derive(Debug, Default)]
pub struct IdRegistry {
    next: u64,
    ids: HashMap<String, String>,
}

impl IdRegistry {
    /// Create an empty registry with the counter at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint the next id for `name` and register it under `key`
    ///
    /// The counter increments once per mint, in call order, so ids are
    /// unique within one run even when names collide.
    pub fn mint(&mut self, key: impl Into<String>, name: &str) -> String {
        let id = format!("{}-{}", self.next, normalise(name));
        self.next += 1;
        self.ids.insert(key.into(), id.clone());
        id
    }

    /// Resolve the id registered under `key`
    pub fn resolve(&self, key: &str) -> Option<&str> {
        self.ids.get(key).map(String::as_str)
    }

    /// Whether `key` was registered
    ///
    /// Presence here is the sole gate for whether a row participates in
    /// edge construction.
    pub fn contains(&self, key: &str) -> bool {
        self.ids.contains_key(key)
    }
}
