// ── Runtime client configuration ──
//
// These types describe *where* to poll and *what* to select. They never
// touch disk; the CLI (via scadapoll-config) builds a `ClientConfig` and
// hands it in. The facade keeps it in an `ArcSwap` so the poller sees
// changes on its next tick.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use scadapoll_api::{Selector, TlsMode, TransportConfig};

use crate::error::CoreError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8081/compactscada";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed certs).
    DangerAcceptInvalid,
}

impl From<&TlsVerification> for TlsMode {
    fn from(tls: &TlsVerification) -> Self {
        match tls {
            TlsVerification::SystemDefaults => Self::System,
            TlsVerification::CustomCa(path) => Self::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => Self::DangerAcceptInvalid,
        }
    }
}

/// Configuration for polling a single endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Endpoint root, e.g. `http://localhost:8081/compactscada`.
    pub base_url: Url,
    /// Delay between poll issuances. Zero means a single poll.
    pub poll_interval: Duration,
    pub selector: Selector,
    /// Log request URLs and bodies at `info` level.
    pub debug: bool,
    /// Per-request timeout.
    pub timeout: Duration,
    pub tls: TlsVerification,
}

impl ClientConfig {
    /// Defaults for everything but the selector.
    pub fn new(selector: Selector) -> Self {
        Self {
            base_url: default_base_url(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            selector,
            debug: false,
            timeout: DEFAULT_TIMEOUT,
            tls: TlsVerification::default(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Result<Self, CoreError> {
        self.base_url = parse_base_url(url)?;
        Ok(self)
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_tls(mut self, tls: TlsVerification) -> Self {
        self.tls = tls;
        self
    }

    /// Check the invariants the request path relies on.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_selector(&self.selector)?;
        if self.base_url.cannot_be_a_base() {
            return Err(CoreError::config(format!(
                "base URL {} cannot carry a path",
                self.base_url
            )));
        }
        Ok(())
    }

    pub(crate) fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            tls: TlsMode::from(&self.tls),
            timeout: self.timeout,
        }
    }
}

/// Parse a base URL, dropping any trailing slash.
pub fn parse_base_url(raw: &str) -> Result<Url, CoreError> {
    let trimmed = raw.trim().trim_end_matches('/');
    Url::parse(trimmed).map_err(|e| CoreError::config(format!("invalid base URL {raw:?}: {e}")))
}

/// Build a selector from exactly one of a pattern or a list of names.
pub fn resolve_selector(pattern: Option<String>, items: Vec<String>) -> Result<Selector, CoreError> {
    let selector = match (pattern, items.is_empty()) {
        (Some(_), false) => {
            return Err(CoreError::config(
                "specify either a pattern or item names, not both",
            ));
        }
        (Some(p), true) => Selector::Pattern(p),
        (None, false) => Selector::Items(items),
        (None, true) => {
            return Err(CoreError::config(
                "no selector: specify a pattern or at least one item name",
            ));
        }
    };
    validate_selector(&selector)?;
    Ok(selector)
}

pub(crate) fn validate_selector(selector: &Selector) -> Result<(), CoreError> {
    match selector {
        Selector::Pattern(p) if p.is_empty() => Err(CoreError::config("pattern is empty")),
        Selector::Items(names) if names.is_empty() => {
            Err(CoreError::config("item list is empty"))
        }
        Selector::Items(names) if names.iter().any(String::is_empty) => {
            Err(CoreError::config("item list contains an empty name"))
        }
        s if s.is_dot_segment() => Err(CoreError::config(format!(
            "selector {:?} cannot be requested: `.` and `..` are not valid path components",
            s.path_segment()
        ))),
        _ => Ok(()),
    }
}

#[allow(clippy::expect_used)]
fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("DEFAULT_BASE_URL is a valid URL")
}
