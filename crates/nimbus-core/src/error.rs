// ── Core error types ──
//
// What action callers see when an operation fails. Session expiry never
// reaches this type from an action: it is reported through `Session` and
// the action resolves successfully. The `From<nimbus_api::Error>` impl
// translates transport failures into domain variants.

use thiserror::Error;

use crate::model::ResourceKind;

#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to console at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Session expired -- login required")]
    SessionExpired,

    #[error("Console request timed out")]
    Timeout,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("{} not found: {identifier}", kind.singular())]
    NotFound {
        kind: ResourceKind,
        identifier: String,
    },

    #[error("Unexpected response from console: {message}")]
    InvalidResponse { message: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("{message}")]
    Rejected {
        message: String,
        status: u16,
        code: Option<String>,
    },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// HTTP status of a server rejection, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::SessionExpired => Some(401),
            _ => None,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<nimbus_api::Error> for CoreError {
    fn from(err: nimbus_api::Error) -> Self {
        match err {
            nimbus_api::Error::SessionExpired => CoreError::SessionExpired,
            nimbus_api::Error::CsrfMissing => {
                CoreError::Internal("CSRF token not initialised -- call Console::init()".into())
            }
            nimbus_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Rejected {
                        message: e.to_string(),
                        status: e.status().map_or(0, |s| s.as_u16()),
                        code: None,
                    }
                }
            }
            nimbus_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("invalid console URL: {e}"),
            },
            nimbus_api::Error::Tls(message) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS: {message}"),
            },
            nimbus_api::Error::Api {
                status,
                message,
                code,
                ..
            } => CoreError::Rejected {
                message,
                status,
                code,
            },
            nimbus_api::Error::EventConnect(reason) => CoreError::ConnectionFailed {
                url: String::new(),
                reason,
            },
            nimbus_api::Error::Deserialization { message, .. } => {
                CoreError::InvalidResponse { message }
            }
        }
    }
}
