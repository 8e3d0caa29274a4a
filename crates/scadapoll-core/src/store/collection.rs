// ── Ordered, name-indexed item collection ──
//
// `IndexMap` gives both halves of the contract at once: iteration in
// first-seen order and O(1) lookup by name, with positions kept in sync
// on removal.

use indexmap::IndexMap;

use crate::model::{Item, ItemValue};

/// Items in first-seen order, indexed by name.
///
/// Entries are mutated in place across polls, so local state attached to
/// an item (a pending edit) survives updates of its synced fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemCollection {
    pub(super) items: IndexMap<String, Item>,
}

impl ItemCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Item> {
        self.items.get(name)
    }

    /// Current position of `name` in the ordered sequence.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.items.get_index_of(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    /// Owned copy of the ordered sequence.
    pub fn to_vec(&self) -> Vec<Item> {
        self.items.values().cloned().collect()
    }

    /// Remove all entries.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    // ── Local edits ──────────────────────────────────────────────────

    /// Start editing `name`, seeding the edit with the synced value.
    /// Returns `false` if there is no such item.
    pub fn begin_edit(&mut self, name: &str) -> bool {
        self.items.get_mut(name).is_some_and(|item| {
            if item.pending_edit.is_none() {
                item.pending_edit = Some(item.value.clone());
            }
            true
        })
    }

    /// Replace the pending edit of `name`. Returns `false` if there is no
    /// such item.
    pub fn set_pending_edit(&mut self, name: &str, value: ItemValue) -> bool {
        self.items.get_mut(name).is_some_and(|item| {
            item.pending_edit = Some(value);
            true
        })
    }

    /// Promote the pending edit of `name` into its synced value and end
    /// the edit. Returns the promoted value.
    pub fn commit_edit(&mut self, name: &str) -> Option<ItemValue> {
        let item = self.items.get_mut(name)?;
        let value = item.pending_edit.take()?;
        item.value = value.clone();
        Some(value)
    }

    /// Drop the pending edit of `name`. Returns `false` if there is no
    /// such item.
    pub fn cancel_edit(&mut self, name: &str) -> bool {
        self.items.get_mut(name).is_some_and(|item| {
            item.pending_edit = None;
            true
        })
    }
}

impl<'a> IntoIterator for &'a ItemCollection {
    type Item = &'a Item;
    type IntoIter = indexmap::map::Values<'a, String, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.values()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use scadapoll_api::RawItem;

    fn raw(name: &str, value: i64) -> RawItem {
        RawItem {
            name: name.into(),
            quality: 0xC0,
            timestamp: "/Date(1609459200000)/".into(),
            value: value.into(),
            write_permission: true,
        }
    }

    fn collection(names: &[&str]) -> ItemCollection {
        let mut col = ItemCollection::new();
        col.merge(names.iter().map(|n| raw(n, 0)).collect());
        col
    }

    #[test]
    fn lookup_and_position() {
        let col = collection(&["A", "B", "C"]);
        assert_eq!(col.len(), 3);
        assert_eq!(col.position("C"), Some(2));
        assert_eq!(col.get("B").unwrap().name, "B");
        assert!(col.get("Z").is_none());
    }

    #[test]
    fn edit_lifecycle() {
        let mut col = collection(&["A"]);

        assert!(col.begin_edit("A"));
        assert_eq!(col.get("A").unwrap().pending_edit, Some(ItemValue::from(0_i64)));

        assert!(col.set_pending_edit("A", ItemValue::from(5_i64)));
        assert_eq!(col.get("A").unwrap().effective_value(), &ItemValue::from(5_i64));

        assert_eq!(col.commit_edit("A"), Some(ItemValue::from(5_i64)));
        let item = col.get("A").unwrap();
        assert_eq!(item.value, ItemValue::from(5_i64));
        assert!(!item.is_editing());
    }

    #[test]
    fn begin_edit_keeps_existing_edit() {
        let mut col = collection(&["A"]);
        col.set_pending_edit("A", ItemValue::from(9_i64));
        col.begin_edit("A");
        assert_eq!(col.get("A").unwrap().pending_edit, Some(ItemValue::from(9_i64)));
    }

    #[test]
    fn edits_on_missing_items_report_false() {
        let mut col = collection(&["A"]);
        assert!(!col.begin_edit("Z"));
        assert!(!col.set_pending_edit("Z", ItemValue::Null));
        assert!(!col.cancel_edit("Z"));
        assert_eq!(col.commit_edit("Z"), None);
        // No pending edit to commit either.
        assert_eq!(col.commit_edit("A"), None);
    }

    #[test]
    fn clear_empties_everything() {
        let mut col = collection(&["A", "B"]);
        col.clear();
        assert!(col.is_empty());
        assert_eq!(col.names().count(), 0);
    }
}
