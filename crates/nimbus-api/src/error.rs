use thiserror::Error;

/// Top-level error type for the `nimbus-api` crate.
///
/// Covers every failure mode of the REST surface and the event stream.
/// `nimbus-core` maps these into user-facing diagnostics and alerts.
#[derive(Debug, Error)]
pub enum Error {
    // ── Session ─────────────────────────────────────────────────────
    /// The server answered HTTP 401: the session is gone and the user
    /// has to log in again.
    #[error("Session expired -- login required")]
    SessionExpired,

    /// No CSRF token has been fetched yet but a mutating request was issued.
    #[error("CSRF token missing -- call fetch_csrf() first")]
    CsrfMissing,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── API ─────────────────────────────────────────────────────────
    /// Non-2xx response. `message` is the best available summary: the
    /// server's `error_msg`, else its `error` key, else the status text.
    #[error("API error (HTTP {status}): {message}")]
    Api {
        status: u16,
        message: String,
        /// Machine-readable error key (`error` field), if present.
        code: Option<String>,
        /// The server's `error_msg`, verbatim, if the body carried one.
        detail: Option<String>,
    },

    // ── Event stream ────────────────────────────────────────────────
    /// WebSocket connection failed.
    #[error("Event stream connection failed: {0}")]
    EventConnect(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the session has expired.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Api { status: 404, .. } => true,
            _ => false,
        }
    }

    /// HTTP status associated with this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::SessionExpired => Some(401),
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Server-provided human-readable message, if the response carried one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Api { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_expired_maps_to_401() {
        assert!(Error::SessionExpired.is_session_expired());
        assert_eq!(Error::SessionExpired.status(), Some(401));
    }

    #[test]
    fn api_not_found() {
        let err = Error::Api {
            status: 404,
            message: "Not Found".into(),
            code: None,
            detail: None,
        };
        assert!(err.is_not_found());
        assert!(err.server_message().is_none());
    }

    #[test]
    fn structured_api_error_exposes_message() {
        let err = Error::Api {
            status: 400,
            message: "Invalid network".into(),
            code: Some("network_invalid".into()),
            detail: Some("Invalid network".into()),
        };
        assert_eq!(err.server_message(), Some("Invalid network"));
    }

    #[test]
    fn error_key_alone_is_not_a_server_message() {
        let err = Error::Api {
            status: 400,
            message: "network_invalid".into(),
            code: Some("network_invalid".into()),
            detail: None,
        };
        assert!(err.server_message().is_none());
    }
}
