//! Chained navigation into an [`ItemStore`].
//!
//! A cursor borrows a store and accumulates a path prefix through
//! [`Cursor::down`] calls; a terminal [`Cursor::get`], [`Cursor::set`],
//! or [`Cursor::remove`] applies the full path to the store and clears
//! the prefix. Terminal operations are single-shot: the next operation
//! starts from the root again, so one cursor serves unrelated accesses
//! without leaking state between them.

use crate::error::Result;
use crate::store::{Item, ItemStore};

/// Stateful navigator over an [`ItemStore`].
///
/// The only state is the current prefix. Navigation is explicit
/// two-tier dispatch: the fixed methods below are always themselves,
/// and anything meant as a path segment goes through `down`.
#[derive(Debug)]
pub struct Cursor<'s> {
    store: &'s mut ItemStore,
    prefix: Vec<String>,
}

impl<'s> Cursor<'s> {
    pub(crate) fn new(store: &'s mut ItemStore) -> Self {
        Cursor {
            store,
            prefix: Vec::new(),
        }
    }

    /// Descend one level: append `name` to the prefix.
    ///
    /// Chainable; does not touch the store.
    pub fn down(&mut self, name: &str) -> &mut Self {
        self.prefix.push(name.to_string());
        self
    }

    /// Read the item at prefix + `name`, then clear the prefix.
    ///
    /// The prefix clears whether or not the read succeeds. Hits are
    /// returned by clone.
    pub fn get(&mut self, name: &str) -> Result<Item> {
        let path = self.terminal_path(name);
        self.prefix.clear();
        self.store.get(&path).map(|item| item.clone())
    }

    /// Write the item at prefix + `name`, then clear the prefix.
    ///
    /// Writes through the store's overwrite primitive.
    pub fn set(&mut self, name: &str, value: Item) -> Result<()> {
        let path = self.terminal_path(name);
        self.prefix.clear();
        self.store.set(&path, value)
    }

    /// Delete the subtree at the current prefix, then clear the prefix.
    ///
    /// No extra segment is appended. With an empty prefix this is a
    /// no-op, as is an absent prefix.
    pub fn remove(&mut self) {
        let path = self.prefix.join(".");
        self.prefix.clear();
        if !path.is_empty() {
            self.store.remove(&path);
        }
    }

    /// Dotted rendering of the current prefix (empty when at the root).
    pub fn path(&self) -> String {
        self.prefix.join(".")
    }

    fn terminal_path(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.prefix.join("."), name)
        }
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use serde_json::json;

    #[test]
    fn descend_and_set_writes_full_path() {
        let mut store = ItemStore::new();
        store
            .cursor()
            .down("one")
            .down("two")
            .set("three", json!("v"))
            .unwrap();
        assert_eq!(store.get("one.two.three").unwrap(), &json!("v"));
    }

    #[test]
    fn descend_and_get_reads_full_path() {
        let mut store = ItemStore::new();
        store.add("one.two.three", json!(3)).unwrap();
        let got = store.cursor().down("one").down("two").get("three").unwrap();
        assert_eq!(got, json!(3));
    }

    #[test]
    fn terminal_at_root_needs_no_descent() {
        let mut store = ItemStore::new();
        store.add("top", json!(1)).unwrap();
        assert_eq!(store.cursor().get("top").unwrap(), json!(1));
    }

    #[test]
    fn prefix_clears_after_set() {
        let mut store = ItemStore::new();
        let mut cursor = store.cursor();
        cursor.down("one").down("two").set("three", json!("v")).unwrap();
        assert_eq!(cursor.path(), "");
        // a following unrelated access is not contaminated
        cursor.set("other", json!("w")).unwrap();
        drop(cursor);
        assert_eq!(store.get("other").unwrap(), &json!("w"));
        assert!(!store.has("one.two.other"));
    }

    #[test]
    fn prefix_clears_after_get() {
        let mut store = ItemStore::new();
        store.add("a.b", json!(1)).unwrap();
        store.add("c", json!(2)).unwrap();
        let mut cursor = store.cursor();
        cursor.down("a").get("b").unwrap();
        assert_eq!(cursor.get("c").unwrap(), json!(2));
    }

    #[test]
    fn prefix_clears_after_failed_get() {
        let mut store = ItemStore::new();
        store.add("c", json!(2)).unwrap();
        let mut cursor = store.cursor();
        let err = cursor.down("a").get("missing").unwrap_err();
        assert!(matches!(err, StoreError::ItemNotFound { .. }));
        assert_eq!(cursor.path(), "");
        assert_eq!(cursor.get("c").unwrap(), json!(2));
    }

    #[test]
    fn remove_deletes_subtree_at_prefix() {
        let mut store = ItemStore::new();
        store.add("one.two.three", json!(3)).unwrap();
        store.add("one.keep", json!(true)).unwrap();
        let mut cursor = store.cursor();
        cursor.down("one").down("two").remove();
        assert_eq!(cursor.path(), "");
        drop(cursor);
        assert!(!store.has("one.two"));
        assert!(store.has("one.keep"));
    }

    #[test]
    fn remove_with_empty_prefix_is_noop() {
        let mut store = ItemStore::new();
        store.add("keep", json!(1)).unwrap();
        store.cursor().remove();
        assert!(store.has("keep"));
    }

    #[test]
    fn remove_absent_prefix_is_noop() {
        let mut store = ItemStore::new();
        let mut cursor = store.cursor();
        cursor.down("ghost").remove();
        assert_eq!(cursor.path(), "");
    }

    #[test]
    fn path_renders_current_prefix() {
        let mut store = ItemStore::new();
        let mut cursor = store.cursor();
        cursor.down("one").down("two");
        assert_eq!(cursor.path(), "one.two");
    }

    #[test]
    fn one_cursor_serves_many_operations() {
        let mut store = ItemStore::new();
        let mut cursor = store.cursor();
        cursor.down("a").set("x", json!(1)).unwrap();
        cursor.down("b").set("y", json!(2)).unwrap();
        assert_eq!(cursor.down("a").get("x").unwrap(), json!(1));
        drop(cursor);
        assert_eq!(store.get("b.y").unwrap(), &json!(2));
    }
}
