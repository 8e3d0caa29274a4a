// ── OPC quality byte decoding ──
//
// One status byte packs three independent classifications:
//
//   bit  7 6 5 4 3 2 1 0
//        Q Q S S S S L L
//
// Quality is `byte & 0xC0`, status is `byte & 0xFC` (quality bits
// included, so each tier has its own disjoint table), limit is
// `byte & 0x03`.

use serde::{Deserialize, Serialize};
use strum::Display;

pub const QUALITY_MASK: u8 = 0xC0;
pub const STATUS_MASK: u8 = 0xFC;
pub const LIMIT_MASK: u8 = 0x03;

/// Status byte for a plain good value with no substatus and no limit.
pub const GOOD_NON_SPECIFIC: u8 = 0xC0;

/// Data trustworthiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QualityTier {
    Bad,
    Uncertain,
    Good,
    /// `0x80`: not assigned by OPC. Kept as a sentinel instead of failing
    /// the item.
    Unknown,
}

impl QualityTier {
    pub fn from_bits(bits: u8) -> Self {
        match bits & QUALITY_MASK {
            0x00 => Self::Bad,
            0x40 => Self::Uncertain,
            0xC0 => Self::Good,
            _ => Self::Unknown,
        }
    }
}

/// Detailed cause, meaningful only within its quality tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    // Bad
    ConfigError,
    DeviceFailure,
    SensorFailure,
    LastKnown,
    CommFailure,
    OutOfService,
    WaitingForInitialData,
    // Uncertain
    SensorCal,
    EguExceeded,
    // Good
    LocalOverride,
}

impl Status {
    /// Look up `bits & 0xFC` in the table for `tier`. Unlisted values have
    /// no status; that is not an error.
    pub fn lookup(tier: QualityTier, bits: u8) -> Option<Self> {
        let status = match (tier, bits & STATUS_MASK) {
            (QualityTier::Bad, 0x04) => Self::ConfigError,
            (QualityTier::Bad, 0x0C) => Self::DeviceFailure,
            (QualityTier::Bad, 0x10) => Self::SensorFailure,
            (QualityTier::Bad, 0x14) => Self::LastKnown,
            (QualityTier::Bad, 0x18) => Self::CommFailure,
            (QualityTier::Bad, 0x1C) => Self::OutOfService,
            (QualityTier::Bad, 0x20) => Self::WaitingForInitialData,
            (QualityTier::Uncertain, 0x50) => Self::SensorCal,
            (QualityTier::Uncertain, 0x54) => Self::EguExceeded,
            (QualityTier::Good, 0xD8) => Self::LocalOverride,
            _ => return None,
        };
        Some(status)
    }

    /// The masked status bits this value decodes from.
    pub fn bits(self) -> u8 {
        match self {
            Self::ConfigError => 0x04,
            Self::DeviceFailure => 0x0C,
            Self::SensorFailure => 0x10,
            Self::LastKnown => 0x14,
            Self::CommFailure => 0x18,
            Self::OutOfService => 0x1C,
            Self::WaitingForInitialData => 0x20,
            Self::SensorCal => 0x50,
            Self::EguExceeded => 0x54,
            Self::LocalOverride => 0xD8,
        }
    }
}

/// Value-range condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Limit {
    Ok,
    Low,
    High,
    Const,
}

impl Limit {
    pub fn from_bits(bits: u8) -> Self {
        match bits & LIMIT_MASK {
            0x00 => Self::Ok,
            0x01 => Self::Low,
            0x02 => Self::High,
            _ => Self::Const,
        }
    }
}

/// Decoded status byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Quality {
    pub raw: u8,
    pub tier: QualityTier,
    pub status: Option<Status>,
    pub limit: Limit,
}

impl Quality {
    pub fn from_bits(bits: u8) -> Self {
        let tier = QualityTier::from_bits(bits);
        Self {
            raw: bits,
            tier,
            status: Status::lookup(tier, bits),
            limit: Limit::from_bits(bits),
        }
    }

    pub fn is_good(&self) -> bool {
        self.tier == QualityTier::Good
    }
}

impl From<u8> for Quality {
    fn from(bits: u8) -> Self {
        Self::from_bits(bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_follows_low_bits_for_every_byte() {
        let table = [Limit::Ok, Limit::Low, Limit::High, Limit::Const];
        for b in 0..=u8::MAX {
            let expected = table[usize::from(b & LIMIT_MASK)];
            assert_eq!(Quality::from_bits(b).limit, expected, "byte {b:#04x}");
        }
    }

    #[test]
    fn tiers_from_top_bits() {
        assert_eq!(QualityTier::from_bits(0x00), QualityTier::Bad);
        assert_eq!(QualityTier::from_bits(0x43), QualityTier::Uncertain);
        assert_eq!(QualityTier::from_bits(0xC0), QualityTier::Good);
        assert_eq!(QualityTier::from_bits(0x80), QualityTier::Unknown);
        assert_eq!(QualityTier::from_bits(0xBF), QualityTier::Unknown);
    }

    #[test]
    fn good_without_listed_status() {
        let q = Quality::from_bits(0xC4);
        assert_eq!(q.tier, QualityTier::Good);
        assert_eq!(q.status, None);
    }

    #[test]
    fn local_override() {
        let q = Quality::from_bits(0xD8);
        assert_eq!(q.tier, QualityTier::Good);
        assert_eq!(q.status, Some(Status::LocalOverride));
        assert_eq!(q.limit, Limit::Ok);
    }

    #[test]
    fn status_ignores_limit_bits() {
        let q = Quality::from_bits(0x1B);
        assert_eq!(q.tier, QualityTier::Bad);
        assert_eq!(q.status, Some(Status::CommFailure));
        assert_eq!(q.limit, Limit::Const);
    }

    #[test]
    fn status_tables_are_per_tier() {
        for status in [
            Status::ConfigError,
            Status::DeviceFailure,
            Status::SensorFailure,
            Status::LastKnown,
            Status::CommFailure,
            Status::OutOfService,
            Status::WaitingForInitialData,
            Status::SensorCal,
            Status::EguExceeded,
            Status::LocalOverride,
        ] {
            let q = Quality::from_bits(status.bits());
            assert_eq!(q.status, Some(status));
        }
        // 0x50 only means SENSOR_CAL under uncertain quality.
        assert_eq!(Status::lookup(QualityTier::Bad, 0x50), None);
    }

    #[test]
    fn unknown_tier_has_no_status() {
        let q = Quality::from_bits(0x98);
        assert_eq!(q.tier, QualityTier::Unknown);
        assert_eq!(q.status, None);
    }

    #[test]
    fn display_uses_wire_names() {
        assert_eq!(QualityTier::Uncertain.to_string(), "UNCERTAIN");
        assert_eq!(Status::WaitingForInitialData.to_string(), "WAITING_FOR_INITIAL_DATA");
        assert_eq!(Status::EguExceeded.to_string(), "EGU_EXCEEDED");
        assert_eq!(Limit::Const.to_string(), "CONST");
    }
}
