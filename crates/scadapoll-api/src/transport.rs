// Transport abstraction and the reqwest-backed implementation.
//
// The poller and the write path only ever need "fetch this URL once" and
// "post this body once". Everything environment-specific (TLS, timeouts,
// headers) lives behind the `Transport` trait so tests can inject a fake.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::trace;
use url::Url;

use crate::error::Error;

const USER_AGENT: &str = concat!("scadapoll/", env!("CARGO_PKG_VERSION"));

/// Body preview length kept in error values.
const PREVIEW_CHARS: usize = 200;

/// One asynchronous request-response cycle against a URL.
///
/// Implementations know nothing about polling or the shape of the data;
/// they hand back the response body as text.
pub trait Transport: Send + Sync + 'static {
    /// `GET url`, returning the response body.
    fn get(&self, url: Url) -> impl Future<Output = Result<String, Error>> + Send;

    /// `POST url` with a JSON text body, returning the response body.
    fn post(&self, url: Url, body: String) -> impl Future<Output = Result<String, Error>> + Send;
}

// ── Configuration ───────────────────────────────────────────────────

/// TLS verification mode (api-level mirror of core's config).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsMode {
    /// Use the system certificate store.
    #[default]
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (for self-signed servers).
    DangerAcceptInvalid,
}

/// Settings for building the HTTP client.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT);

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

// ── HTTP transport ──────────────────────────────────────────────────

/// `Transport` over plain HTTP(S) using `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: config.build_client()?,
        })
    }

    /// Wrap a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: Url) -> Result<String, Error> {
        let resp = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        read_body(resp).await
    }

    async fn post(&self, url: Url, body: String) -> Result<String, Error> {
        // The write endpoint takes the JSON array as a text/plain body.
        let resp = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "text/plain")
            .header(ACCEPT, "application/json")
            .body(body)
            .send()
            .await?;
        read_body(resp).await
    }
}

async fn read_body(resp: reqwest::Response) -> Result<String, Error> {
    let status = resp.status();
    let body = resp.text().await?;
    trace!(%status, bytes = body.len(), "response received");

    if !status.is_success() {
        return Err(Error::Http {
            status: status.as_u16(),
            body: preview(&body),
        });
    }
    Ok(body)
}

/// First few characters of a body, for error messages.
pub(crate) fn preview(body: &str) -> String {
    body.chars().take(PREVIEW_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_builds() {
        assert!(TransportConfig::default().build_client().is_ok());
    }

    #[test]
    fn missing_ca_file_is_a_tls_error() {
        let config = TransportConfig {
            tls: TlsMode::CustomCa(PathBuf::from("/nonexistent/ca.pem")),
            ..TransportConfig::default()
        };
        assert!(matches!(config.build_client(), Err(Error::Tls(_))));
    }

    #[test]
    fn preview_truncates_on_char_boundaries() {
        let body = "é".repeat(500);
        assert_eq!(preview(&body).chars().count(), PREVIEW_CHARS);
    }
}
