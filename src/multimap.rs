//! Ordered multi-valued key/value collection ("at-map").
//!
//! A [`MultiMap`] is an ordered sequence of entries plus a derived index
//! from key projection to entry positions.  Duplicate keys are preserved in
//! insertion order; lookups by key return the *first* matching entry unless
//! the whole group is requested via [`MultiMap::index`].
//!
//! Maps are immutable after construction: every "modifying" operation
//! returns a new map.

use std::collections::HashMap;

use crate::value::Value;

/// One key/value entry.  Both sides are full [`Value`]s.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub key: Value,
    pub value: Value,
}

/// Ordered entry list with a per-key index.
#[derive(Debug, Clone, Default)]
pub struct MultiMap {
    entries: Vec<Entry>,
    // key projection → entry positions, in insertion order.
    index: HashMap<String, Vec<usize>>,
}

impl PartialEq for MultiMap {
    fn eq(&self, other: &Self) -> bool {
        // The index is derived; the entry sequence is the identity.
        self.entries == other.entries
    }
}

impl MultiMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from entries, in order.
    pub fn from_entries(entries: impl IntoIterator<Item = Entry>) -> Self {
        let mut map = MultiMap::new();
        for entry in entries {
            map.push(entry);
        }
        map
    }

    /// Build a map from key/value pairs, in order.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Value, Value)>) -> Self {
        Self::from_entries(pairs.into_iter().map(|(key, value)| Entry { key, value }))
    }

    /// Concatenate several maps into a new one, preserving entry order.
    pub fn merged(sources: impl IntoIterator<Item = MultiMap>) -> Self {
        let mut map = MultiMap::new();
        for source in sources {
            for entry in source.entries {
                map.push(entry);
            }
        }
        map
    }

    // Construction-time only; the public surface is non-mutating.
    fn push(&mut self, entry: Entry) {
        let pos = self.entries.len();
        self.index
            .entry(entry.key.to_string())
            .or_default()
            .push(pos);
        self.entries.push(entry);
    }

    // ── Introspection ─────────────────────────────────────────────────────────

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Key/value pairs in insertion order.
    pub fn pairs(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|e| (&e.key, &e.value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|e| &e.key)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|e| &e.value)
    }

    /// Value of the first entry.
    pub fn first(&self) -> Option<&Value> {
        self.entries.first().map(|e| &e.value)
    }

    /// Value of the last entry.
    pub fn last(&self) -> Option<&Value> {
        self.entries.last().map(|e| &e.value)
    }

    /// The `n`th entry, 1-indexed.
    pub fn entry(&self, n: usize) -> Option<&Entry> {
        if n == 0 {
            return None;
        }
        self.entries.get(n - 1)
    }

    /// True when at least one entry's key projects to `key`.
    pub fn has(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Value of the *first* entry whose key projects to `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        let pos = *self.index.get(key)?.first()?;
        Some(&self.entries[pos].value)
    }

    /// String projection: the first entry's value, stringified, or `""`.
    pub fn projection(&self) -> String {
        self.first().map(|v| v.to_string()).unwrap_or_default()
    }

    // ── Derived maps ──────────────────────────────────────────────────────────

    /// All entries whose key projects to `key`, as a new map with keys
    /// renumbered `1..=n`.  `None` when the key is absent.
    pub fn index(&self, key: &str) -> Option<MultiMap> {
        let positions = self.index.get(key)?;
        Some(Self::from_entries(positions.iter().enumerate().map(
            |(rank, &pos)| Entry {
                key: Value::from(format!("{}", rank + 1)),
                value: self.entries[pos].value.clone(),
            },
        )))
    }

    /// Only the first occurrence of each distinct value, original keys kept.
    pub fn unique(&self) -> MultiMap {
        let mut seen: Vec<&Value> = Vec::new();
        let mut kept = Vec::new();
        for entry in &self.entries {
            if seen.iter().any(|v| **v == entry.value) {
                continue;
            }
            seen.push(&entry.value);
            kept.push(entry.clone());
        }
        Self::from_entries(kept)
    }

    /// Join stringified values with `sep` over the 1-indexed inclusive entry
    /// range `[from, to]` (defaults: whole map; negative indices count from
    /// the end).
    pub fn concat(&self, sep: &str, from: Option<i64>, to: Option<i64>) -> String {
        let len = self.entries.len() as i64;
        let lo = clamp_index(from.unwrap_or(1), len).max(1);
        let hi = clamp_index(to.unwrap_or(-1), len).min(len);
        if lo > hi {
            return String::new();
        }
        self.entries[(lo - 1) as usize..hi as usize]
            .iter()
            .map(|e| e.value.to_string())
            .collect::<Vec<_>>()
            .join(sep)
    }
}

// Resolve a possibly-negative 1-based index against `len` (-1 = last).
fn clamp_index(i: i64, len: i64) -> i64 {
    if i < 0 {
        len + i + 1
    } else {
        i
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
