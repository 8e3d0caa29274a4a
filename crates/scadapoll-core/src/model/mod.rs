// ── Domain model ──

pub mod item;
pub mod quality;
pub mod write;

pub use item::Item;
pub use quality::{Limit, Quality, QualityTier, Status};
pub use write::{ItemError, WriteBatch, WritePair, WriteResult};

pub use scadapoll_api::{ItemValue, Selector};
