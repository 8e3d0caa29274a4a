// ── Core error types ──
//
// User-facing errors from scadapoll-core. Wire-level failures from
// `scadapoll_api` are translated by the `From` impl below; per-item
// write failures are data (`WriteResult::errors`), never errors.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    Timeout,

    // ── Lifecycle errors ─────────────────────────────────────────────
    #[error("Polling is already active; call off() first")]
    AlreadyActive,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Item not found: {name}")]
    ItemNotFound { name: String },

    #[error("Item {name} has no pending edit")]
    NoPendingEdit { name: String },

    #[error("Write batch is empty")]
    EmptyWrite,

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<scadapoll_api::Error> for CoreError {
    fn from(err: scadapoll_api::Error) -> Self {
        match err {
            scadapoll_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(|u| u.to_string())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            scadapoll_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            scadapoll_api::Error::UnroutableSelector(segment) => CoreError::Config {
                message: format!("selector {segment:?} cannot be sent as a URL path segment"),
            },
            scadapoll_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            scadapoll_api::Error::Http { status, body } => CoreError::Api {
                message: if body.is_empty() {
                    format!("HTTP {status}")
                } else {
                    format!("HTTP {status}: {body}")
                },
                status: Some(status),
            },
            scadapoll_api::Error::Deserialization { message, body: _ } => {
                CoreError::InvalidResponse { message }
            }
            scadapoll_api::Error::InvalidTimestamp(raw) => CoreError::InvalidResponse {
                message: format!("invalid timestamp {raw:?}"),
            },
            scadapoll_api::Error::Serialization(e) => {
                CoreError::Internal(format!("Serialization error: {e}"))
            }
        }
    }
}
