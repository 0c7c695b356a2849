//! Server-pushed event stream with auto-reconnect.
//!
//! Connects to the console's `/event` WebSocket and streams parsed
//! dispatch events (`"firewall.change"`, `"instance.change"`, ...) through a
//! [`tokio::sync::broadcast`] channel. Reconnects with exponential backoff.
//!
//! # Example
//!
//! ```rust,ignore
//! use nimbus_api::events::{EventHandle, ReconnectConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! let cancel = CancellationToken::new();
//! let handle = EventHandle::connect(client.event_url()?, ReconnectConfig::default(), cancel, None);
//! let mut rx = handle.subscribe();
//!
//! while let Ok(event) = rx.recv().await {
//!     println!("{}", event.event_type);
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_tungstenite::tungstenite::{self, ClientRequestBuilder};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::Error;

const EVENT_CHANNEL_CAPACITY: usize = 256;

// ── ServerEvent ──────────────────────────────────────────────────────

/// A parsed event from the console event stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerEvent {
    /// Event cursor id assigned by the server.
    #[serde(default)]
    pub id: Option<String>,

    /// Channel the event was published on (usually `"dispatch"`).
    #[serde(default)]
    pub channel: Option<String>,

    /// Dispatch type, e.g. `"firewall.change"`.
    #[serde(rename = "type")]
    pub event_type: String,

    /// Remaining payload.
    #[serde(default)]
    pub data: serde_json::Value,
}

impl ServerEvent {
    /// Resource prefix of a `"<resource>.change"` event, if it is one.
    pub fn changed_resource(&self) -> Option<&str> {
        self.event_type.strip_suffix(".change")
    }
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default, rename = "type")]
    event_type: Option<String>,
    #[serde(default)]
    data: serde_json::Value,
}

/// Parse a text frame. Two shapes are accepted: the event envelope
/// `{id, channel, data: {type, ...}}` and a flat `{type, ...}` object.
pub fn parse_event(text: &str) -> Option<ServerEvent> {
    let raw: RawEvent = match serde_json::from_str(text) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::debug!(error = %e, "Failed to parse event frame");
            return None;
        }
    };

    let event_type = raw.event_type.or_else(|| {
        raw.data
            .get("type")
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned)
    })?;

    Some(ServerEvent {
        id: raw.id,
        channel: raw.channel,
        event_type,
        data: raw.data,
    })
}

// ── ReconnectConfig ──────────────────────────────────────────────────

/// Exponential backoff configuration for reconnection.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Delay before the first reconnection attempt. Default: 1s.
    pub initial_delay: Duration,

    /// Upper bound on backoff delay. Default: 30s.
    pub max_delay: Duration,

    /// Maximum reconnection attempts before giving up.
    /// `None` means retry forever.
    pub max_retries: Option<u32>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_retries: None,
        }
    }
}

/// Backoff for the given attempt: `initial * 2^attempt`, capped at `max_delay`.
pub(crate) fn calculate_backoff(attempt: u32, config: &ReconnectConfig) -> Duration {
    let factor = 2u32.saturating_pow(attempt.min(16));
    config
        .initial_delay
        .saturating_mul(factor)
        .min(config.max_delay)
}

// ── EventHandle ──────────────────────────────────────────────────────

/// Handle to a running event stream.
pub struct EventHandle {
    event_rx: broadcast::Receiver<Arc<ServerEvent>>,
    cancel: CancellationToken,
}

impl EventHandle {
    /// Spawn the reconnection loop and return immediately.
    ///
    /// The first connection attempt happens asynchronously. `cookie` is
    /// injected as a `Cookie` header on the upgrade request.
    pub fn connect(
        url: Url,
        reconnect: ReconnectConfig,
        cancel: CancellationToken,
        cookie: Option<String>,
    ) -> Self {
        let (event_tx, event_rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            event_loop(url, event_tx, reconnect, task_cancel, cookie).await;
        });

        Self { event_rx, cancel }
    }

    /// Get a new broadcast receiver for the event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<ServerEvent>> {
        self.event_rx.resubscribe()
    }

    /// Signal the background task to shut down.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

// ── Background reconnection loop ─────────────────────────────────────

async fn event_loop(
    url: Url,
    event_tx: broadcast::Sender<Arc<ServerEvent>>,
    reconnect: ReconnectConfig,
    cancel: CancellationToken,
    cookie: Option<String>,
) {
    let mut attempt: u32 = 0;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = connect_and_read(&url, &event_tx, &cancel, cookie.as_deref()) => {
                match result {
                    Ok(()) => {
                        if cancel.is_cancelled() {
                            break;
                        }
                        tracing::info!("Event stream disconnected cleanly, reconnecting");
                        attempt = 0;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, attempt, "Event stream error");

                        if let Some(max) = reconnect.max_retries {
                            if attempt >= max {
                                tracing::error!(
                                    max_retries = max,
                                    "Event stream reconnection limit reached, giving up"
                                );
                                break;
                            }
                        }

                        let delay = calculate_backoff(attempt, &reconnect);
                        tracing::info!(
                            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                            attempt,
                            "Waiting before reconnect"
                        );

                        tokio::select! {
                            biased;
                            () = cancel.cancelled() => break,
                            () = tokio::time::sleep(delay) => {}
                        }

                        attempt = attempt.saturating_add(1);
                    }
                }
            }
        }
    }

    tracing::debug!("Event loop exiting");
}

async fn connect_and_read(
    url: &Url,
    event_tx: &broadcast::Sender<Arc<ServerEvent>>,
    cancel: &CancellationToken,
    cookie: Option<&str>,
) -> Result<(), Error> {
    tracing::info!(url = %url, "Connecting to event stream");

    let uri: tungstenite::http::Uri = url
        .as_str()
        .parse()
        .map_err(|e: tungstenite::http::uri::InvalidUri| Error::EventConnect(e.to_string()))?;

    let mut request = ClientRequestBuilder::new(uri);
    if let Some(cookie_val) = cookie {
        request = request.with_header("Cookie", cookie_val);
    }

    let (stream, _response) = tokio_tungstenite::connect_async(request)
        .await
        .map_err(|e| Error::EventConnect(e.to_string()))?;

    tracing::info!("Event stream connected");

    let (_write, mut read) = stream.split();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => return Ok(()),
            frame = read.next() => {
                match frame {
                    Some(Ok(tungstenite::Message::Text(text))) => {
                        if let Some(event) = parse_event(&text) {
                            tracing::trace!(event_type = %event.event_type, "event received");
                            // No receivers is not an error: nobody is listening yet.
                            let _ = event_tx.send(Arc::new(event));
                        }
                    }
                    Some(Ok(tungstenite::Message::Close(frame))) => {
                        if let Some(ref cf) = frame {
                            tracing::info!(code = %cf.code, reason = %cf.reason, "Event stream closed by server");
                        }
                        return Ok(());
                    }
                    Some(Err(e)) => return Err(Error::EventConnect(e.to_string())),
                    None => return Ok(()),
                    // Binary, Ping, Pong, Frame
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}
