// ── Connectivity events ──
//
// Named, payload-free signals published whenever a tick tells us something
// about reachability or authorization. Delivery goes through the
// `NotificationBus` trait so embedders (and tests) choose the transport.

use serde::Serialize;
use strum::{Display, IntoStaticStr};
use tokio::sync::broadcast;

const EVENT_CHANNEL_SIZE: usize = 64;

/// A connectivity signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr, Serialize)]
#[strum(serialize_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum ConnectivityEvent {
    /// The bridge answered with data.
    LocalConnection,
    /// The bridge could not be reached.
    NoLocalConnection,
    /// The bridge rejected the username.
    NotAuthenticated,
}

impl ConnectivityEvent {
    /// The event's bus name (`localConnection`, `noLocalConnection`, `notAuthenticated`).
    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// Sink for connectivity events.
pub trait NotificationBus: Send + Sync {
    fn publish(&self, event: ConnectivityEvent);
}

/// [`NotificationBus`] backed by a `tokio::sync::broadcast` channel.
///
/// Publishing with no live subscribers is not an error; the event is
/// simply dropped.
#[derive(Debug, Clone)]
pub struct BroadcastBus {
    tx: broadcast::Sender<ConnectivityEvent>,
}

impl BroadcastBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<ConnectivityEvent> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastBus {
    fn default() -> Self {
        Self::new(EVENT_CHANNEL_SIZE)
    }
}

impl NotificationBus for BroadcastBus {
    fn publish(&self, event: ConnectivityEvent) {
        let _ = self.tx.send(event);
    }
}
