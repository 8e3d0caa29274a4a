// scadapoll-api: Async Rust client for the CompactSCADA item read/write API

pub mod client;
pub mod error;
pub mod models;
pub mod timestamp;
pub mod transport;

pub use client::{ScadaClient, parse_read_body, parse_write_body, read_url, write_url};
pub use error::Error;
pub use models::{ErrorInfo, ItemValue, RawItem, Selector, WriteItem, WriteResponse};
pub use transport::{HttpTransport, TlsMode, Transport, TransportConfig};
