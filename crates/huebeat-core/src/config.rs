// ── Runtime heartbeat configuration ──
//
// These types describe *what* to poll and *how often*. They carry the
// bridge credentials and timing, but never touch disk. The CLI (or any
// other embedder) builds them and hands them in.

use std::collections::BTreeMap;
use std::time::Duration;

use secrecy::SecretString;

use huebeat_api::ResourceType;

/// Paired connectivity signals are suppressed for this long after firing.
pub const DEFAULT_NOTIFICATION_WINDOW: Duration = Duration::from_secs(10);

/// Host and credentials for one bridge.
#[derive(Debug, Clone)]
pub struct BridgeAccessConfig {
    /// Bridge host, optionally with port (e.g. `192.168.1.20`).
    pub host: String,
    /// Whitelisted bridge username. Travels in the request path.
    pub username: SecretString,
}

impl BridgeAccessConfig {
    pub fn new(host: impl Into<String>, username: SecretString) -> Self {
        Self {
            host: host.into(),
            username,
        }
    }
}

/// Poll cadence and notification tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeartbeatConfig {
    /// Poll interval per resource type. Types not listed are not polled.
    pub intervals: BTreeMap<ResourceType, Duration>,
    /// De-duplication window for `localConnection` / `noLocalConnection`.
    pub notification_window: Duration,
    /// HTTP request timeout.
    pub timeout: Duration,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        let intervals = BTreeMap::from([
            (ResourceType::Lights, Duration::from_secs(5)),
            (ResourceType::Groups, Duration::from_secs(5)),
            (ResourceType::Sensors, Duration::from_secs(5)),
            (ResourceType::Config, Duration::from_secs(10)),
        ]);
        Self {
            intervals,
            notification_window: DEFAULT_NOTIFICATION_WINDOW,
            timeout: Duration::from_secs(30),
        }
    }
}

impl HeartbeatConfig {
    /// A config with no resource types scheduled.
    pub fn unscheduled() -> Self {
        Self {
            intervals: BTreeMap::new(),
            ..Self::default()
        }
    }
}
