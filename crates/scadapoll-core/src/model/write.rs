// ── Write domain types ──

use serde::{Deserialize, Serialize};

use scadapoll_api::ItemValue;

/// A single `name = value` write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WritePair {
    pub key: String,
    pub value: ItemValue,
}

impl WritePair {
    pub fn new(key: impl Into<String>, value: impl Into<ItemValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Ordered batch of writes submitted as one request.
///
/// A lone [`WritePair`] converts into a batch of one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WriteBatch(Vec<WritePair>);

impl WriteBatch {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn pairs(&self) -> &[WritePair] {
        &self.0
    }
}

impl From<WritePair> for WriteBatch {
    fn from(pair: WritePair) -> Self {
        Self(vec![pair])
    }
}

impl From<Vec<WritePair>> for WriteBatch {
    fn from(pairs: Vec<WritePair>) -> Self {
        Self(pairs)
    }
}

impl FromIterator<WritePair> for WriteBatch {
    fn from_iter<I: IntoIterator<Item = WritePair>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for WriteBatch {
    type Item = WritePair;
    type IntoIter = std::vec::IntoIter<WritePair>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Failure the server reported for one item of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemError {
    pub code: i64,
    pub item_name: String,
}

/// Decoded write response.
///
/// Partial success is normal: some items may be written while others
/// fail, and only the failures are listed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WriteResult {
    pub errors: Vec<ItemError>,
    pub written_count: u32,
}

impl WriteResult {
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    /// The error reported for `name`, if any.
    pub fn error_for(&self, name: &str) -> Option<&ItemError> {
        self.errors.iter().find(|e| e.item_name == name)
    }
}
