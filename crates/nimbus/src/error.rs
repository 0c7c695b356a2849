//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use nimbus_config::ConfigError;
use nimbus_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to console at {url}")]
    #[diagnostic(
        code(nimbus::connection_failed),
        help(
            "Check that the console is running and reachable.\n\
             Reason: {reason}\n\
             Self-signed certificate? Try --insecure (-k)."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(nimbus::timeout),
        help("Increase the timeout with --timeout or check console responsiveness.")
    )]
    Timeout,

    // ── Session ──────────────────────────────────────────────────────
    #[error("Session expired for profile '{profile}'")]
    #[diagnostic(
        code(nimbus::session_expired),
        help(
            "Log in to the console again and store the new session cookie:\n\
             nimbus config set-session --profile {profile}"
        )
    )]
    SessionExpired { profile: String },

    #[error("No session configured for profile '{profile}'")]
    #[diagnostic(
        code(nimbus::no_session),
        help(
            "Store one with: nimbus config set-session\n\
             Or set the NIMBUS_SESSION environment variable."
        )
    )]
    NoSession { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{kind} '{identifier}' not found")]
    #[diagnostic(
        code(nimbus::not_found),
        help("Run: nimbus list {kind} to see available records")
    )]
    NotFound { kind: String, identifier: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(nimbus::api_error))]
    Api { status: u16, message: String },

    #[error("Unexpected response from console: {message}")]
    #[diagnostic(code(nimbus::invalid_response))]
    InvalidResponse { message: String },

    #[error("Internal error: {0}")]
    #[diagnostic(code(nimbus::internal))]
    Internal(String),

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(nimbus::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(nimbus::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: nimbus config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No console configured")]
    #[diagnostic(
        code(nimbus::no_config),
        help(
            "Create a profile with: nimbus config init\n\
             Or pass --url. Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(nimbus::config))]
    Config(#[from] ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(nimbus::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::SessionExpired { .. } | Self::NoSession { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::ProfileNotFound { .. } | Self::NoConfig { .. } => {
                exit_code::USAGE
            }
            Self::Api { status: 401, .. } => exit_code::AUTH,
            Self::Api { status: 404, .. } => exit_code::NOT_FOUND,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },
            CoreError::SessionExpired => CliError::SessionExpired {
                profile: "current".into(),
            },
            CoreError::Timeout => CliError::Timeout,
            CoreError::NotFound { kind, identifier } => CliError::NotFound {
                kind: kind.to_string(),
                identifier,
            },
            CoreError::InvalidResponse { message } => CliError::InvalidResponse { message },
            CoreError::Rejected {
                message, status, ..
            } => CliError::Api { status, message },
            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}
