//! Polling, synchronization and write logic on top of `scadapoll-api`.
//!
//! - **[`Client`]**: facade owning one live [`ClientConfig`]. [`on()`](Client::on)
//!   starts periodic polling and hands every merged snapshot to a callback,
//!   [`off()`](Client::off) stops it, [`set()`](Client::set) writes.
//!
//! - **[`Poller`]**: transport-agnostic scheduler. Fetches immediately, then
//!   again every interval, re-reading URL and interval before each request.
//!   Returns a [`PollHandle`] that cancels the chain.
//!
//! - **[`ItemCollection`]**: ordered, name-indexed items.
//!   [`merge()`](ItemCollection::merge) reconciles a poll response in place,
//!   preserving order and local edits.
//!
//! - **[`Writer`]**: stamps and submits write batches and decodes per-item
//!   failures.
//!
//! - **Domain model** ([`model`]): [`Item`] and the OPC [`Quality`] decoder.

pub mod client;
pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod poller;
pub mod store;
pub mod writer;

// ── Primary re-exports ──────────────────────────────────────────────
pub use client::Client;
pub use config::{
    ClientConfig, DEFAULT_BASE_URL, DEFAULT_POLL_INTERVAL, TlsVerification, parse_base_url,
    resolve_selector,
};
pub use error::CoreError;
pub use poller::{PollHandle, Poller};
pub use store::{ItemCollection, MergeReport};
pub use writer::Writer;

pub use model::{
    Item, ItemError, ItemValue, Limit, Quality, QualityTier, Selector, Status, WriteBatch,
    WritePair, WriteResult,
};
