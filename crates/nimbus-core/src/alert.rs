// ── User-visible alerts ──
//
// Action failures are reported here rather than returned silently. Every
// alert is also logged, so headless consumers that never subscribe still
// see it in their trace output.

use std::fmt;

use tokio::sync::broadcast;
use tracing::{info, warn};

const ALERT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum AlertLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub level: AlertLevel,
    pub message: String,
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Broadcast hub for alerts.
#[derive(Debug, Clone)]
pub struct AlertCenter {
    tx: broadcast::Sender<Alert>,
}

impl Default for AlertCenter {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertCenter {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(ALERT_CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Alert> {
        self.tx.subscribe()
    }

    pub fn publish(&self, level: AlertLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            AlertLevel::Error | AlertLevel::Warning => warn!(%level, "{message}"),
            AlertLevel::Info | AlertLevel::Success => info!(%level, "{message}"),
        }
        let _ = self.tx.send(Alert { level, message });
    }

    pub fn error(&self, message: impl Into<String>) {
        self.publish(AlertLevel::Error, message);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.publish(AlertLevel::Success, message);
    }

    /// Report a failed request: `"<context>: <server message>"` when the
    /// server explained itself, the bare context otherwise.
    pub fn error_response(&self, context: &str, err: &nimbus_api::Error) {
        match err.server_message() {
            Some(detail) => self.error(format!("{context}: {detail}")),
            None => self.error(context),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn error_response_appends_server_message() {
        let center = AlertCenter::new();
        let mut rx = center.subscribe();

        center.error_response(
            "Failed to save firewall",
            &nimbus_api::Error::Api {
                status: 400,
                message: "Invalid port".into(),
                code: Some("port_invalid".into()),
                detail: Some("Invalid port".into()),
            },
        );
        center.error_response(
            "Failed to load firewalls",
            &nimbus_api::Error::Api {
                status: 502,
                message: "Bad Gateway".into(),
                code: None,
                detail: None,
            },
        );

        let first = rx.try_recv().unwrap();
        assert_eq!(first.level, AlertLevel::Error);
        assert_eq!(first.message, "Failed to save firewall: Invalid port");
        assert_eq!(rx.try_recv().unwrap().message, "Failed to load firewalls");
    }

    #[test]
    fn publishing_without_subscribers_is_fine() {
        AlertCenter::new().success("Saved");
    }
}
