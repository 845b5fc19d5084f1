//! Path-addressed nested key/value storage.
//!
//! Paths are split on a caller-chosen separator. An empty separator means the
//! whole path is a single key, which lets callers store flat keys that contain
//! characters like `.`.

use super::value::{Table, Value};

/// A tree of [`Value`]s whose root is always a mapping.
///
/// Writes create missing intermediate mappings; reads and deletes on missing
/// paths are no-ops. Empty parent mappings are never pruned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NestedStore {
    root: Table,
}

impl NestedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_table(root: Table) -> Self {
        Self { root }
    }

    /// Looks up `path`, returning `None` if a segment is missing or an
    /// intermediate node is not a mapping.
    pub fn get(&self, path: &str, separator: &str) -> Option<&Value> {
        let (parents, last) = split_path(path, separator);

        let mut table = &self.root;
        for part in parents {
            table = table.get(part)?.as_table()?;
        }
        table.get(last)
    }

    /// Like [`get`](Self::get) but returns an owned copy, or `default` when absent.
    pub fn get_or(&self, path: &str, default: impl Into<Value>, separator: &str) -> Value {
        match self.get(path, separator) {
            Some(value) => value.clone(),
            None => default.into(),
        }
    }

    pub fn contains(&self, path: &str, separator: &str) -> bool {
        self.get(path, separator).is_some()
    }

    /// Stores `value` at `path` and returns a reference to the stored value.
    ///
    /// Missing intermediate levels are created as empty mappings. An intermediate
    /// node that is not a mapping is replaced by one.
    pub fn set(&mut self, path: &str, value: impl Into<Value>, separator: &str) -> &Value {
        let (parents, last) = split_path(path, separator);

        let mut table = &mut self.root;
        for part in parents {
            table = child_table(table, part);
        }

        let slot = table.entry(last.to_string()).or_default();
        *slot = value.into();
        slot
    }

    /// Removes the value at `path` and returns it.
    ///
    /// Removing a mapping removes the whole subtree. Returns `None` without
    /// touching the store when any segment is missing.
    pub fn delete(&mut self, path: &str, separator: &str) -> Option<Value> {
        let (parents, last) = split_path(path, separator);

        let mut table = &mut self.root;
        for part in parents {
            table = table.get_mut(part)?.as_table_mut()?;
        }
        table.shift_remove(last)
    }

    pub fn as_table(&self) -> &Table {
        &self.root
    }

    /// Returns an owned snapshot of the top-level mapping.
    pub fn to_table(&self) -> Table {
        self.root.clone()
    }

    pub fn into_table(self) -> Table {
        self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    pub fn len(&self) -> usize {
        self.root.len()
    }
}

/// Splits a path into its parent segments and its final segment.
fn split_path<'a>(path: &'a str, separator: &str) -> (Vec<&'a str>, &'a str) {
    if separator.is_empty() {
        return (Vec::new(), path);
    }
    match path.rsplit_once(separator) {
        Some((parents, last)) => (parents.split(separator).collect(), last),
        None => (Vec::new(), path),
    }
}

fn child_table<'t>(table: &'t mut Table, key: &str) -> &'t mut Table {
    let slot = table.entry(key.to_string()).or_default();
    if slot.as_table().is_none() {
        *slot = Value::Table(Table::new());
    }
    slot.as_table_mut().expect("slot was just made a table")
}
