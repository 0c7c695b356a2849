// ── Server-pushed change events ──
//
// Separate from the store dispatcher: carries "collection X changed on the
// server" notices from the websocket bridge to the action modules, which
// respond by re-syncing.

use std::sync::Arc;

use nimbus_api::ServerEvent;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::model::ResourceKind;

const CHANGE_CHANNEL_CAPACITY: usize = 256;

/// A resource collection was modified server-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub kind: ResourceKind,
    /// Raw event type as sent by the server, e.g. `"firewall.change"`.
    pub event_type: String,
}

impl ChangeEvent {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            event_type: kind.change_event(),
        }
    }

    /// Map a server event to a change notice. Non-change events and
    /// unknown resources yield `None`.
    pub fn from_server(event: &ServerEvent) -> Option<Self> {
        let kind = ResourceKind::from_path(event.changed_resource()?)?;
        Some(Self {
            kind,
            event_type: event.event_type.clone(),
        })
    }
}

/// Broadcast bus for [`ChangeEvent`]s.
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    tx: broadcast::Sender<ChangeEvent>,
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl EventDispatcher {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }

    /// Publish a change. Returns the number of listeners reached.
    pub fn emit(&self, event: ChangeEvent) -> usize {
        trace!(event_type = %event.event_type, "change event");
        self.tx.send(event).unwrap_or(0)
    }

    /// Forward server events until cancelled or the source closes.
    pub async fn forward(
        &self,
        mut source: broadcast::Receiver<Arc<ServerEvent>>,
        cancel: CancellationToken,
    ) {
        loop {
            let event = tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                event = source.recv() => event,
            };

            match event {
                Ok(event) => match ChangeEvent::from_server(&event) {
                    Some(change) => {
                        self.emit(change);
                    }
                    None => trace!(event_type = %event.event_type, "ignoring event"),
                },
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(skipped = n, "event bridge lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        debug!("event bridge stopped");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn server_event(event_type: &str) -> Arc<ServerEvent> {
        Arc::new(ServerEvent {
            id: None,
            channel: Some("dispatch".into()),
            event_type: event_type.into(),
            data: serde_json::Value::Null,
        })
    }

    #[test]
    fn maps_change_events_only() {
        let change = ChangeEvent::from_server(&server_event("balancer.change")).unwrap();
        assert_eq!(change.kind, ResourceKind::Balancer);
        assert!(ChangeEvent::from_server(&server_event("balancer.update")).is_none());
        assert!(ChangeEvent::from_server(&server_event("router.change")).is_none());
    }

    #[tokio::test]
    async fn forward_bridges_server_events() {
        let bus = EventDispatcher::new();
        let mut rx = bus.subscribe();
        let (tx, source) = broadcast::channel(8);
        let cancel = CancellationToken::new();

        let task = {
            let bus = bus.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { bus.forward(source, cancel).await })
        };

        tx.send(server_event("system.ping")).unwrap();
        tx.send(server_event("disk.change")).unwrap();

        let change = rx.recv().await.unwrap();
        assert_eq!(change, ChangeEvent::new(ResourceKind::Disk));

        cancel.cancel();
        task.await.unwrap();
    }

    #[test]
    fn emit_without_listeners_is_harmless() {
        let bus = EventDispatcher::new();
        assert_eq!(bus.emit(ChangeEvent::new(ResourceKind::Zone)), 0);
    }
}
