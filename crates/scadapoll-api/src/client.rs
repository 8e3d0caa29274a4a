// Item API client
//
// Wraps a `Transport` with endpoint URL construction and JSON decoding.
// The base URL is passed per call because consumers may reconfigure it
// between polls.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::{RawItem, Selector, WriteItem, WriteResponse};
use crate::transport::{HttpTransport, Transport, preview};

/// Client for the `read` and `write` item endpoints.
///
/// Cheap to clone; the transport is shared.
#[derive(Debug)]
pub struct ScadaClient<T = HttpTransport> {
    transport: Arc<T>,
}

impl<T> Clone for ScadaClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: Transport> ScadaClient<T> {
    pub fn new(transport: T) -> Self {
        Self::from_shared(Arc::new(transport))
    }

    /// Build on a transport that is also used elsewhere (e.g. by a poller).
    pub fn from_shared(transport: Arc<T>) -> Self {
        Self { transport }
    }

    /// The underlying transport.
    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    /// `GET {base}/read/...` for the given selector.
    pub async fn read_items(&self, base: &Url, selector: &Selector) -> Result<Vec<RawItem>, Error> {
        let url = read_url(base, selector)?;
        debug!("GET {}", url);

        let body = self.transport.get(url).await?;
        parse_read_body(&body)
    }

    /// `POST {base}/write/items` with the given batch.
    pub async fn write_items(
        &self,
        base: &Url,
        items: &[WriteItem],
    ) -> Result<WriteResponse, Error> {
        let url = write_url(base)?;
        let body = serde_json::to_string(items)?;
        debug!("POST {}", url);
        trace!(%body, "write request body");

        let resp = self.transport.post(url, body).await?;
        parse_write_body(&resp)
    }
}

// ── URL builders ─────────────────────────────────────────────────────

/// Build the read URL: `{base}/read/patterns/{p}` or `{base}/read/items/{a},{b}`.
///
/// A selector that encodes to `.` or `..` is refused; parsing would
/// resolve it against the path and hit another endpoint.
pub fn read_url(base: &Url, selector: &Selector) -> Result<Url, Error> {
    if selector.is_dot_segment() {
        return Err(Error::UnroutableSelector(selector.path_segment()));
    }
    let base = base.as_str().trim_end_matches('/');
    Ok(Url::parse(&format!("{base}{}", selector.read_path()))?)
}

/// Build the write URL: `{base}/write/items`.
pub fn write_url(base: &Url) -> Result<Url, Error> {
    let base = base.as_str().trim_end_matches('/');
    Ok(Url::parse(&format!("{base}/write/items"))?)
}

// ── Body decoding ────────────────────────────────────────────────────

/// Decode the JSON array returned by a read.
pub fn parse_read_body(body: &str) -> Result<Vec<RawItem>, Error> {
    decode(body)
}

/// Decode the `{ErrorInfos, WrittenItems}` object returned by a write.
pub fn parse_write_body(body: &str) -> Result<WriteResponse, Error> {
    decode(body)
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(body)),
        body: body.to_owned(),
    })
}
