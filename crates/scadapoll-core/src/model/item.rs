// ── Item domain type ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::quality::Quality;
use scadapoll_api::ItemValue;

/// One named data point, as held in the synchronized collection.
///
/// `value` is what the server last reported. `pending_edit` carries a
/// local edit in progress; polling never touches it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub quality: Quality,
    /// `None` when the server sent a timestamp that could not be parsed.
    pub timestamp: Option<DateTime<Utc>>,
    pub value: ItemValue,
    pub write_permission: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_edit: Option<ItemValue>,
}

impl Item {
    /// The edit in progress if there is one, otherwise the synced value.
    pub fn effective_value(&self) -> &ItemValue {
        self.pending_edit.as_ref().unwrap_or(&self.value)
    }

    pub fn is_editing(&self) -> bool {
        self.pending_edit.is_some()
    }
}
