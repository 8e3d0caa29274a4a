// ── Poll response merge ──
//
// Reconciles one poll response against the held collection. Every
// existing entry starts as a deletion candidate; entries seen in the
// response are updated in place, new names are appended, and whatever
// is still a candidate afterwards is pruned.

use std::collections::HashSet;

use scadapoll_api::RawItem;

use super::collection::ItemCollection;
use crate::model::Item;

/// Names affected by one merge, each list in collection order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub inserted: Vec<String>,
    /// Existing items whose value, timestamp or quality changed.
    pub updated: Vec<String>,
    pub removed: Vec<String>,
}

impl MergeReport {
    pub fn is_empty(&self) -> bool {
        self.inserted.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }
}

impl ItemCollection {
    /// Merge a full poll response.
    ///
    /// Order of surviving items never changes; new items go to the end in
    /// response order. Existing entries only get `value`, `timestamp` and
    /// `quality` overwritten, so a pending edit is preserved. An item
    /// that appears twice in one response keeps the later occurrence.
    pub fn merge(&mut self, incoming: Vec<RawItem>) -> MergeReport {
        let mut report = MergeReport::default();
        let mut seen: HashSet<String> = HashSet::with_capacity(incoming.len());

        for raw in incoming {
            let fresh = Item::from(raw);
            let first_sighting = seen.insert(fresh.name.clone());

            if let Some(existing) = self.items.get_mut(&fresh.name) {
                let changed = existing.value != fresh.value
                    || existing.timestamp != fresh.timestamp
                    || existing.quality != fresh.quality;
                existing.value = fresh.value;
                existing.timestamp = fresh.timestamp;
                existing.quality = fresh.quality;

                if changed && first_sighting {
                    report.updated.push(existing.name.clone());
                }
            } else {
                report.inserted.push(fresh.name.clone());
                self.items.insert(fresh.name.clone(), fresh);
            }
        }

        // `retain` preserves the relative order of survivors and keeps the
        // name index consistent with the new positions.
        self.items.retain(|name, _| {
            let keep = seen.contains(name);
            if !keep {
                report.removed.push(name.clone());
            }
            keep
        });

        report
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scadapoll_api::ItemValue;

    use crate::model::QualityTier;

    fn raw(name: &str, value: i64) -> RawItem {
        RawItem {
            name: name.into(),
            quality: 0xC0,
            timestamp: "/Date(1609459200000)/".into(),
            value: value.into(),
            write_permission: true,
        }
    }

    fn names(col: &ItemCollection) -> Vec<&str> {
        col.names().collect()
    }

    #[test]
    fn inserts_in_first_seen_order() {
        let mut col = ItemCollection::new();
        let first = col.merge(vec![raw("X", 1), raw("Y", 2)]);
        let second = col.merge(vec![raw("X", 1), raw("Y", 2), raw("Z", 3)]);

        assert_eq!(names(&col), ["X", "Y", "Z"]);
        assert_eq!(first.inserted, ["X", "Y"]);
        assert_eq!(second.inserted, ["Z"]);
    }

    #[test]
    fn append_only_response_shape() {
        // A response naming only Z after [X, Y] prunes X and Y.
        let mut col = ItemCollection::new();
        col.merge(vec![raw("X", 1), raw("Y", 2)]);
        let report = col.merge(vec![raw("Z", 3)]);

        assert_eq!(names(&col), ["Z"]);
        assert_eq!(report.removed, ["X", "Y"]);
    }

    #[test]
    fn order_is_stable_for_persisting_items() {
        let mut col = ItemCollection::new();
        col.merge(vec![raw("A", 1), raw("B", 2), raw("C", 3)]);
        col.merge(vec![raw("B", 20), raw("A", 10), raw("C", 30)]);

        assert_eq!(names(&col), ["A", "B", "C"]);
        assert_eq!(col.get("B").unwrap().value, ItemValue::from(20_i64));
    }

    #[test]
    fn missing_items_are_removed_from_sequence_and_index() {
        let mut col = ItemCollection::new();
        col.merge(vec![raw("A", 1), raw("B", 2)]);
        let report = col.merge(vec![raw("A", 1)]);

        assert_eq!(names(&col), ["A"]);
        assert!(col.get("B").is_none());
        assert_eq!(col.position("B"), None);
        assert_eq!(report.removed, ["B"]);
    }

    #[test]
    fn removal_keeps_index_positions_correct() {
        let mut col = ItemCollection::new();
        col.merge(vec![raw("A", 1), raw("B", 2), raw("C", 3), raw("D", 4)]);
        col.merge(vec![raw("A", 1), raw("C", 3), raw("D", 4)]);

        assert_eq!(col.position("A"), Some(0));
        assert_eq!(col.position("C"), Some(1));
        assert_eq!(col.position("D"), Some(2));
        assert_eq!(col.get("D").unwrap().name, "D");
    }

    #[test]
    fn merge_is_idempotent() {
        let response = vec![raw("A", 1), raw("B", 2), raw("C", 3)];
        let mut once = ItemCollection::new();
        once.merge(vec![raw("Old", 0), raw("B", 9)]);
        let mut twice = once.clone();

        once.merge(response.clone());
        twice.merge(response.clone());
        let second = twice.merge(response);

        assert_eq!(once, twice);
        assert!(second.is_empty());
    }

    #[test]
    fn update_touches_only_synced_fields() {
        let mut col = ItemCollection::new();
        col.merge(vec![raw("A", 1)]);
        col.set_pending_edit("A", ItemValue::from(99_i64));

        let mut next = raw("A", 2);
        next.quality = 0x18;
        next.write_permission = false;
        let report = col.merge(vec![next]);

        let item = col.get("A").unwrap();
        assert_eq!(item.value, ItemValue::from(2_i64));
        assert_eq!(item.quality.tier, QualityTier::Bad);
        assert_eq!(item.pending_edit, Some(ItemValue::from(99_i64)));
        assert!(item.write_permission);
        assert_eq!(report.updated, ["A"]);
    }

    #[test]
    fn unchanged_items_are_not_reported() {
        let mut col = ItemCollection::new();
        col.merge(vec![raw("A", 1), raw("B", 2)]);
        let report = col.merge(vec![raw("A", 1), raw("B", 3)]);

        assert_eq!(report.updated, ["B"]);
        assert!(report.inserted.is_empty());
        assert!(report.removed.is_empty());
    }

    #[test]
    fn duplicate_names_collapse_to_last_occurrence() {
        let mut col = ItemCollection::new();
        let report = col.merge(vec![raw("A", 1), raw("A", 2)]);

        assert_eq!(col.len(), 1);
        assert_eq!(col.get("A").unwrap().value, ItemValue::from(2_i64));
        assert_eq!(report.inserted, ["A"]);
        assert!(report.updated.is_empty());
    }

    #[test]
    fn empty_response_clears_collection() {
        let mut col = ItemCollection::new();
        col.merge(vec![raw("A", 1)]);
        let report = col.merge(Vec::new());

        assert!(col.is_empty());
        assert_eq!(report.removed, ["A"]);
    }
}
