//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use scadapoll_config::ConfigError;
use scadapoll_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const WRITE_REJECTED: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to {url}")]
    #[diagnostic(
        code(scadapoll::connection_failed),
        help(
            "Check that the CompactSCADA service is running and reachable.\n\
             Override the endpoint with --url or set `url` in your profile."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request timed out")]
    #[diagnostic(
        code(scadapoll::timeout),
        help("Increase timeout with --timeout or check server responsiveness.")
    )]
    Timeout,

    // ── Server ───────────────────────────────────────────────────────
    #[error("Server error: {message}")]
    #[diagnostic(code(scadapoll::api_error))]
    ApiError {
        message: String,
        status: Option<u16>,
    },

    #[error("Unexpected response: {message}")]
    #[diagnostic(
        code(scadapoll::invalid_response),
        help("Check that --url points at the CompactSCADA root. Run with --debug to see the body.")
    )]
    InvalidResponse { message: String },

    #[error("{failed} of {submitted} writes were rejected")]
    #[diagnostic(code(scadapoll::write_rejected), help("{details}"))]
    WriteRejected {
        submitted: usize,
        failed: usize,
        details: String,
    },

    // ── Items ────────────────────────────────────────────────────────
    #[error("Item '{name}' not found")]
    #[diagnostic(
        code(scadapoll::not_found),
        help("Run: scadapoll read to see the available items")
    )]
    NotFound { name: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(scadapoll::validation))]
    Validation { field: String, reason: String },

    #[error("No items selected: {reason}")]
    #[diagnostic(
        code(scadapoll::no_selector),
        help(
            "Pass --pattern <REGEX> or one or more --item <NAME>,\n\
             or set `pattern` / `items` in your profile."
        )
    )]
    NoSelector { reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(scadapoll::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: scadapoll config set url <URL> --profile <NAME>"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(scadapoll::config))]
    Config { message: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Output rendering failed: {0}")]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::WriteRejected { .. } => exit_code::WRITE_REJECTED,
            Self::Validation { .. } | Self::NoSelector { .. } | Self::ProfileNotFound { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },
            CoreError::Timeout => CliError::Timeout,
            CoreError::ItemNotFound { name } => CliError::NotFound { name },
            CoreError::NoPendingEdit { name } => CliError::Validation {
                field: name,
                reason: "no pending edit".into(),
            },
            CoreError::EmptyWrite => CliError::Validation {
                field: "assignments".into(),
                reason: "nothing to write".into(),
            },
            CoreError::AlreadyActive => CliError::Validation {
                field: "watch".into(),
                reason: "polling is already running".into(),
            },
            CoreError::InvalidResponse { message } => CliError::InvalidResponse { message },
            CoreError::Api { message, status } => CliError::ApiError { message, status },
            CoreError::Config { message } => CliError::Config { message },
            CoreError::Internal(message) => CliError::ApiError {
                message,
                status: None,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } if field == "selector" => {
                CliError::NoSelector { reason }
            }
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownProfile { name } => {
                let cfg = crate::config::load_config_or_default();
                let mut available: Vec<_> = cfg.profiles.into_keys().collect();
                available.sort();
                CliError::ProfileNotFound {
                    name,
                    available: if available.is_empty() {
                        "(none)".into()
                    } else {
                        available.join(", ")
                    },
                }
            }
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}
