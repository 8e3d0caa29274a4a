// ── API-to-domain type conversions ──
//
// Bridges raw `scadapoll_api` wire types into `scadapoll_core::model`
// domain types. Decode anomalies degrade to sentinels (unknown tier,
// missing status, missing timestamp) instead of failing the item.

use chrono::Utc;
use tracing::warn;

use scadapoll_api::{RawItem, WriteItem, WriteResponse, timestamp};

use crate::model::quality::GOOD_NON_SPECIFIC;
use crate::model::{Item, ItemError, Quality, QualityTier, WriteBatch, WriteResult};

impl From<RawItem> for Item {
    fn from(raw: RawItem) -> Self {
        let quality = Quality::from_bits(raw.quality);
        if quality.tier == QualityTier::Unknown {
            warn!(item = %raw.name, bits = raw.quality, "unrecognized quality bits");
        }

        let timestamp = match timestamp::parse(&raw.timestamp) {
            Ok(ts) => Some(ts),
            Err(e) => {
                warn!(item = %raw.name, error = %e, "dropping unparseable timestamp");
                None
            }
        };

        Self {
            name: raw.name,
            quality,
            timestamp,
            value: raw.value,
            write_permission: raw.write_permission,
            pending_edit: None,
        }
    }
}

impl From<WriteResponse> for WriteResult {
    fn from(resp: WriteResponse) -> Self {
        Self {
            errors: resp
                .error_infos
                .into_iter()
                .map(|e| ItemError {
                    code: e.error_code,
                    item_name: e.name,
                })
                .collect(),
            written_count: resp.written_items,
        }
    }
}

/// Stamp every pair of a batch with the same instant and good quality.
pub(crate) fn stamp_batch(batch: WriteBatch, at: chrono::DateTime<Utc>) -> Vec<WriteItem> {
    let ts = timestamp::format(at);
    batch
        .into_iter()
        .map(|pair| WriteItem {
            name: pair.key,
            value: pair.value,
            quality: GOOD_NON_SPECIFIC,
            timestamp: ts.clone(),
        })
        .collect()
}
