// ── Runtime console configuration ──
//
// Describes how to reach one management console. Never touches disk: the
// CLI resolves profiles and hands a `ConsoleConfig` in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::store::DEFAULT_PAGE_COUNT;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed certs on lab consoles).
    DangerAcceptInvalid,
}

#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Console base URL (e.g. `https://cloud.example.com`).
    pub url: Url,
    /// Organization to scope requests to.
    pub organization: Option<String>,
    /// Session cookie of a logged-in administrator (`Cookie` header value).
    pub session_cookie: Option<SecretString>,
    pub tls: TlsVerification,
    pub timeout: Duration,
    /// Items per page for every store.
    pub page_count: u64,
    /// Subscribe to the `/event` websocket in `Console::listen`.
    pub events_enabled: bool,
}

impl ConsoleConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            organization: None,
            session_cookie: None,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            page_count: DEFAULT_PAGE_COUNT,
            events_enabled: true,
        }
    }

    pub(crate) fn transport(&self) -> nimbus_api::TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => nimbus_api::TlsMode::System,
            TlsVerification::CustomCa(path) => nimbus_api::TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => nimbus_api::TlsMode::DangerAcceptInvalid,
        };

        let transport = nimbus_api::TransportConfig {
            tls,
            timeout: self.timeout,
            ..nimbus_api::TransportConfig::default()
        };
        match &self.session_cookie {
            Some(cookie) => transport.with_session_cookie(cookie.clone()),
            None => transport,
        }
    }
}
