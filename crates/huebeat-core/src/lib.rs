//! Heartbeat polling for a single lighting bridge.
//!
//! - **[`HeartbeatPoller`]**: Owns one repeating task per configured
//!   [`ResourceType`]. Each tick GETs the resource, classifies the body,
//!   fans successful payloads out to every [`Processor`], and publishes
//!   connectivity events.
//!
//! - **[`NotificationBus`]**: Injectable sink for [`ConnectivityEvent`]s.
//!   [`BroadcastBus`] is the stock implementation on a `tokio::sync::broadcast`
//!   channel.
//!
//! - **[`ConnectivityTracker`]**: De-duplicates the paired
//!   `localConnection` / `noLocalConnection` signals inside a time window.
//!
//! Core never reads config files: build a [`BridgeAccessConfig`] and
//! [`HeartbeatConfig`] and hand them in.

pub mod classify;
pub mod config;
pub mod connectivity;
pub mod error;
pub mod event;
pub mod heartbeat;
pub mod processor;

// ── Primary re-exports ──────────────────────────────────────────────
pub use classify::{CONFIG_ERROR_FIELD_LIMIT, Classified, classify};
pub use config::{BridgeAccessConfig, DEFAULT_NOTIFICATION_WINDOW, HeartbeatConfig};
pub use connectivity::ConnectivityTracker;
pub use error::CoreError;
pub use event::{BroadcastBus, ConnectivityEvent, NotificationBus};
pub use heartbeat::{HeartbeatPoller, TickOutcome};
pub use processor::Processor;

// API types that appear in the core surface.
pub use huebeat_api::{BridgeError, BridgeErrorKind, Decoded, ResourceType};
