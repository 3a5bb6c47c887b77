//! Nested item store addressed by dotted paths.
//!
//! In-memory tree of `serde_json::Value` items. Branches are JSON
//! objects with insertion order preserved; every other value is a leaf.
//! All CRUD funnels through the same tree walk: writers create missing
//! intermediate branches and refuse to descend through a leaf, while
//! readers and removers treat both situations as "absent".

use std::fmt;

use serde_json::{Map, Value};
use tracing::debug;

use crate::cursor::Cursor;
use crate::error::{Result, StoreError};
use crate::path::ItemPath;

/// Alias for stored items; `serde_json::Value` supports all JSON types.
pub type Item = Value;

/// A branch node: an ordered mapping of child key to item.
pub type Branch = Map<String, Item>;

/// Describe a value's JSON kind for error messages.
fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}


/// In-memory tree of items addressed by dotted paths.
#[derive(Debug, Clone)]
pub struct ItemStore {
    /// Root branch holding all items.
    root: Branch,
}

impl ItemStore {
    /// Create an empty store.
    pub fn new() -> Self {
        ItemStore {
            root: Branch::new(),
        }
    }

    /// Build a store from a whole tree.
    ///
    /// An object becomes the root branch, `null` yields an empty store,
    /// and anything else is rejected.
    pub fn from_tree(tree: Item) -> Result<Self> {
        let mut store = ItemStore::new();
        store.reset(tree)?;
        Ok(store)
    }

    /// Add a value at `path`, creating intermediate branches as needed.
    ///
    /// When the existing value and the incoming value are both branches,
    /// their children are merged one level deep: colliding keys take the
    /// incoming child, other children stay. Every other combination
    /// overwrites the existing value.
    pub fn add(&mut self, path: &str, value: Item) -> Result<()> {
        let parsed = ItemPath::parse(path)?;
        let branch = self.branch_for_write(&parsed)?;
        let last = parsed.last();

        match value {
            Value::Object(incoming)
                if matches!(branch.get(last), Some(Value::Object(_))) =>
            {
                if let Some(Value::Object(existing)) = branch.get_mut(last) {
                    for (key, child) in incoming {
                        existing.insert(key, child);
                    }
                }
            }
            other => {
                branch.insert(last.to_string(), other);
            }
        }
        debug!(path = %parsed, "added item");
        Ok(())
    }

    /// Apply [`ItemStore::add`] to each `(path, value)` pair in order.
    pub fn add_many<I>(&mut self, pairs: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, Item)>,
    {
        for (path, value) in pairs {
            self.add(&path, value)?;
        }
        Ok(())
    }

    /// Overwrite the value at `path` unconditionally, creating
    /// intermediate branches as needed.
    pub fn set(&mut self, path: &str, value: Item) -> Result<()> {
        let parsed = ItemPath::parse(path)?;
        let branch = self.branch_for_write(&parsed)?;
        branch.insert(parsed.last().to_string(), value);
        debug!(path = %parsed, "set item");
        Ok(())
    }

    /// Apply [`ItemStore::set`] to each `(path, value)` pair in order.
    pub fn set_many<I>(&mut self, pairs: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, Item)>,
    {
        for (path, value) in pairs {
            self.set(&path, value)?;
        }
        Ok(())
    }

    /// Read the item at `path`.
    ///
    /// Fails with `ItemNotFound` when the full path does not resolve.
    /// An intermediate leaf counts as absent for reads.
    pub fn get(&self, path: &str) -> Result<&Item> {
        let parsed = ItemPath::parse(path)?;
        self.resolve(&parsed)
            .ok_or_else(|| StoreError::ItemNotFound {
                path: parsed.to_dotted(),
            })
    }

    /// Read the item at `path`, falling back to `default` on any miss.
    ///
    /// Never fails: malformed and unresolved paths both yield the
    /// default. Hits are returned by clone.
    pub fn get_or(&self, path: &str, default: Item) -> Item {
        match ItemPath::parse(path) {
            Ok(parsed) => match self.resolve(&parsed) {
                Some(item) => item.clone(),
                None => default,
            },
            Err(_) => default,
        }
    }

    /// True if the full path resolves to an item. Never fails.
    pub fn has(&self, path: &str) -> bool {
        match ItemPath::parse(path) {
            Ok(parsed) => self.resolve(&parsed).is_some(),
            Err(_) => false,
        }
    }

    /// Alias for [`ItemStore::has`].
    pub fn exists(&self, path: &str) -> bool {
        self.has(path)
    }

    /// Delete the item at `path`, returning it when present.
    ///
    /// Removing an absent path is a silent no-op, so removal is
    /// idempotent.
    pub fn remove(&mut self, path: &str) -> Option<Item> {
        let parsed = match ItemPath::parse(path) {
            Ok(parsed) => parsed,
            Err(_) => return None,
        };
        let mut node = &mut self.root;
        for segment in parsed.parent_segments() {
            node = match node.get_mut(segment) {
                Some(Value::Object(map)) => map,
                _ => return None,
            };
        }
        let removed = node.remove(parsed.last());
        if removed.is_some() {
            debug!(path = %parsed, "removed item");
        }
        removed
    }

    /// Drop every item, leaving an empty root branch.
    pub fn clear(&mut self) {
        self.root.clear();
        debug!("cleared store");
    }

    /// Replace the whole tree, validating like [`ItemStore::from_tree`].
    pub fn reset(&mut self, tree: Item) -> Result<()> {
        self.root = match tree {
            Value::Object(map) => map,
            Value::Null => Branch::new(),
            other => {
                return Err(StoreError::InvalidTree {
                    found: kind(&other),
                })
            }
        };
        debug!("reset store");
        Ok(())
    }

    /// Borrow the full root branch.
    ///
    /// This hands out the store's own node: mutations made through
    /// [`ItemStore::all_mut`] are mutations of the store. Use
    /// [`ItemStore::export`] for a detached copy.
    pub fn all(&self) -> &Branch {
        &self.root
    }

    /// Mutably borrow the full root branch.
    pub fn all_mut(&mut self) -> &mut Branch {
        &mut self.root
    }

    /// Deep copy of the whole tree as a single item.
    pub fn export(&self) -> Item {
        Value::Object(self.root.clone())
    }

    /// Render the whole tree as a JSON string.
    pub fn to_json(&self) -> String {
        self.export().to_string()
    }

    /// Number of direct children under the root.
    pub fn len(&self) -> usize {
        self.root.len()
    }

    /// True if the root branch has no children.
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Start chained navigation into this store.
    pub fn cursor(&mut self) -> Cursor<'_> {
        Cursor::new(self)
    }

    // -------------------------------------------------------------------
    // Internal tree walk
    // -------------------------------------------------------------------

    /// Walk to the branch owning the path's final segment, creating
    /// missing intermediate branches. Fails when an intermediate segment
    /// holds a leaf. Intermediates created before the failure stay.
    fn branch_for_write(&mut self, path: &ItemPath) -> Result<&mut Branch> {
        let mut node = &mut self.root;
        for segment in path.parent_segments() {
            let child = node
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(Branch::new()));
            node = match child {
                Value::Object(map) => map,
                _ => {
                    return Err(StoreError::NestedUnderLeaf {
                        path: path.to_dotted(),
                        segment: segment.clone(),
                    })
                }
            };
        }
        Ok(node)
    }

    /// Walk to the item at the path, read-only. Absent segments and leaf
    /// intermediates both resolve to `None`.
    fn resolve(&self, path: &ItemPath) -> Option<&Item> {
        let mut node = &self.root;
        for segment in path.parent_segments() {
            node = match node.get(segment) {
                Some(Value::Object(map)) => map,
                _ => return None,
            };
        }
        node.get(path.last())
    }
}

impl Default for ItemStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Collect `(key, value)` pairs as direct children of the root.
///
/// Keys are taken verbatim, not parsed as dotted paths. This mirrors
/// tree construction, where top-level keys may contain dots.
impl FromIterator<(String, Item)> for ItemStore {
    fn from_iter<I: IntoIterator<Item = (String, Item)>>(iter: I) -> Self {
        ItemStore {
            root: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for ItemStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json())
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
