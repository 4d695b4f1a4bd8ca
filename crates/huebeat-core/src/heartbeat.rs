// ── Heartbeat poller ──
//
// One repeating task per configured resource type. Every tick fires a
// detached request; the response is classified, fanned out to processors,
// and turned into connectivity events. Overlapping in-flight requests for
// the same resource are allowed and never coalesced or cancelled.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use huebeat_api::{BridgeClient, BridgeError, Decoded, ResourceType, TransportConfig};

use crate::classify::{Classified, classify};
use crate::config::{BridgeAccessConfig, HeartbeatConfig};
use crate::connectivity::ConnectivityTracker;
use crate::error::CoreError;
use crate::event::{ConnectivityEvent, NotificationBus};
use crate::processor::Processor;

/// What a single heartbeat tick ended with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The payload reached every processor.
    Delivered,
    /// The bridge reported an API-level error. Holds the decoded records.
    ApiError(Vec<BridgeError>),
    /// The body carried nothing usable.
    Malformed,
    /// The request never got a response.
    Unreachable,
}

// ── HeartbeatPoller ──────────────────────────────────────────────

/// Polls one bridge on a per-resource cadence.
///
/// Cheaply cloneable via `Arc<PollerInner>`. Must be started from within
/// a tokio runtime; a current-thread runtime gives the single event-loop
/// model, but the poller is also sound on a multi-thread runtime.
#[derive(Clone)]
pub struct HeartbeatPoller {
    inner: Arc<PollerInner>,
}

struct PollerInner {
    client: BridgeClient,
    processors: Vec<Arc<dyn Processor>>,
    bus: Arc<dyn NotificationBus>,
    intervals: Mutex<BTreeMap<ResourceType, Duration>>,
    timers: Mutex<HashMap<ResourceType, ActiveTimer>>,
    connectivity: Mutex<ConnectivityTracker>,
}

/// A live repeating task for one resource type.
struct ActiveTimer {
    period: Duration,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl HeartbeatPoller {
    /// Create a poller for the bridge described by `access`. Does NOT start
    /// polling -- call [`start()`](Self::start).
    pub fn new(
        access: &BridgeAccessConfig,
        config: &HeartbeatConfig,
        processors: Vec<Arc<dyn Processor>>,
        bus: Arc<dyn NotificationBus>,
    ) -> Result<Self, CoreError> {
        let transport = TransportConfig::default().with_timeout(config.timeout);
        let client = BridgeClient::new(access.host.clone(), access.username.clone(), &transport)?;
        Ok(Self::with_client(client, config, processors, bus))
    }

    /// Create a poller around an existing client.
    pub fn with_client(
        client: BridgeClient,
        config: &HeartbeatConfig,
        processors: Vec<Arc<dyn Processor>>,
        bus: Arc<dyn NotificationBus>,
    ) -> Self {
        Self {
            inner: Arc::new(PollerInner {
                client,
                processors,
                bus,
                intervals: Mutex::new(config.intervals.clone()),
                timers: Mutex::new(HashMap::new()),
                connectivity: Mutex::new(ConnectivityTracker::new(config.notification_window)),
            }),
        }
    }

    /// The bridge host being polled.
    pub fn host(&self) -> &str {
        self.inner.client.host()
    }

    // ── Interval registry ────────────────────────────────────────

    /// Set (or replace) the poll interval for `resource`.
    ///
    /// Takes effect the next time [`start()`](Self::start) runs; a timer
    /// that is already active keeps its current period.
    pub fn set_interval(&self, resource: ResourceType, interval: Duration) {
        self.inner.intervals().insert(resource, interval);
    }

    /// Forget the configured interval for `resource`. Does not touch an
    /// active timer; use [`remove_heartbeat()`](Self::remove_heartbeat) for that.
    pub fn clear_interval(&self, resource: ResourceType) -> Option<Duration> {
        self.inner.intervals().remove(&resource)
    }

    pub fn interval(&self, resource: ResourceType) -> Option<Duration> {
        self.inner.intervals().get(&resource).copied()
    }

    /// Snapshot of every configured interval.
    pub fn intervals(&self) -> BTreeMap<ResourceType, Duration> {
        self.inner.intervals().clone()
    }

    /// Cancel the active timer for `resource`, if any.
    ///
    /// No further requests for `resource` are issued afterwards. A request
    /// already in flight is allowed to finish.
    pub fn remove_heartbeat(&self, resource: ResourceType) {
        if let Some(timer) = self.inner.timers().remove(&resource) {
            debug!(%resource, period = ?timer.period, "heartbeat removed");
            timer.cancel.cancel();
        }
    }

    pub fn is_active(&self, resource: ResourceType) -> bool {
        self.inner.timers().contains_key(&resource)
    }

    /// Resource types with a live timer, in sorted order.
    pub fn active_resource_types(&self) -> Vec<ResourceType> {
        let mut active: Vec<ResourceType> = self.inner.timers().keys().copied().collect();
        active.sort_unstable();
        active
    }

    // ── Scheduler ────────────────────────────────────────────────

    /// Start a heartbeat for every configured resource type.
    ///
    /// Each type gets one immediate request, then a repeating task at its
    /// interval. Calling `start()` again replaces existing timers rather
    /// than stacking a second one. A zero interval is skipped.
    pub fn start(&self) {
        let intervals = self.intervals();
        let mut timers = self.inner.timers();

        for (resource, period) in intervals {
            if let Some(previous) = timers.remove(&resource) {
                previous.cancel.cancel();
            }
            if period.is_zero() {
                warn!(%resource, "zero poll interval, resource not scheduled");
                continue;
            }

            // Eager first tick: don't wait a full period for the first answer.
            let inner = Arc::clone(&self.inner);
            tokio::spawn(async move {
                inner.poll_once(resource).await;
            });

            let cancel = CancellationToken::new();
            let handle = tokio::spawn(heartbeat_task(
                Arc::downgrade(&self.inner),
                resource,
                period,
                cancel.clone(),
            ));
            timers.insert(
                resource,
                ActiveTimer {
                    period,
                    cancel,
                    handle,
                },
            );
        }

        info!(host = %self.host(), active = timers.len(), "heartbeat started");
    }

    /// Cancel every active timer. Configured intervals are kept, so a later
    /// [`start()`](Self::start) resumes the same schedule.
    pub fn stop(&self) {
        let stopped = self.drain_timers();
        for timer in &stopped {
            timer.cancel.cancel();
        }
        info!(host = %self.host(), stopped = stopped.len(), "heartbeat stopped");
    }

    /// [`stop()`](Self::stop), then wait for every timer task to exit.
    pub async fn shutdown(&self) {
        let stopped = self.drain_timers();
        for timer in &stopped {
            timer.cancel.cancel();
        }
        for timer in stopped {
            let _ = timer.handle.await;
        }
        info!(host = %self.host(), "heartbeat shut down");
    }

    fn drain_timers(&self) -> Vec<ActiveTimer> {
        self.inner.timers().drain().map(|(_, timer)| timer).collect()
    }

    // ── Requests ─────────────────────────────────────────────────

    /// Run one full heartbeat for `resource` and wait for it to finish.
    ///
    /// Exactly what a timer tick does: request, classify, fan out, notify.
    pub async fn poll_once(&self, resource: ResourceType) -> TickOutcome {
        self.inner.poll_once(resource).await
    }

    /// Fetch and decode `resource` without classifying it or touching
    /// processors and connectivity state.
    pub async fn fetch(&self, resource: ResourceType) -> Result<Decoded, CoreError> {
        self.inner
            .client
            .fetch(resource)
            .await
            .map_err(|e| self.inner.core_error(e))
    }
}

impl PollerInner {
    fn intervals(&self) -> MutexGuard<'_, BTreeMap<ResourceType, Duration>> {
        self.intervals.lock().expect("interval registry lock poisoned")
    }

    fn timers(&self) -> MutexGuard<'_, HashMap<ResourceType, ActiveTimer>> {
        self.timers.lock().expect("timer registry lock poisoned")
    }

    async fn poll_once(&self, resource: ResourceType) -> TickOutcome {
        match self.client.fetch(resource).await {
            Ok(decoded) => self.handle_response(resource, decoded),
            Err(e) => {
                if self.notify(ConnectivityEvent::NoLocalConnection) {
                    warn!(%resource, error = %e, "bridge unreachable");
                } else {
                    debug!(%resource, error = %e, "bridge unreachable");
                }
                TickOutcome::Unreachable
            }
        }
    }

    fn handle_response(&self, resource: ResourceType, decoded: Decoded) -> TickOutcome {
        match classify(resource, decoded) {
            Classified::Payload(payload) => {
                trace!(%resource, fields = payload.len(), "dispatching payload");
                for processor in &self.processors {
                    processor.process_payload(&payload, resource);
                }
                self.notify(ConnectivityEvent::LocalConnection);
                TickOutcome::Delivered
            }
            Classified::ApiError(errors) => {
                if errors.is_empty() {
                    debug!(%resource, "bridge rejected request without error records");
                }
                for error in &errors {
                    self.evaluate_error(resource, error);
                }
                TickOutcome::ApiError(errors)
            }
            Classified::Malformed => {
                debug!(%resource, "ignoring malformed response");
                TickOutcome::Malformed
            }
        }
    }

    fn evaluate_error(&self, resource: ResourceType, error: &BridgeError) {
        if error.is_unauthorized() {
            warn!(%resource, %error, "bridge rejected username");
            self.notify(ConnectivityEvent::NotAuthenticated);
        } else {
            debug!(%resource, %error, "bridge reported error");
        }
    }

    /// Publish `event` unless the de-duplication window suppresses it.
    /// Returns whether it was published.
    fn notify(&self, event: ConnectivityEvent) -> bool {
        let emit = self
            .connectivity
            .lock()
            .expect("connectivity lock poisoned")
            .should_emit(event, Instant::now());
        if emit {
            debug!(event = event.name(), "publishing connectivity event");
            self.bus.publish(event);
        } else {
            trace!(event = event.name(), "connectivity event suppressed");
        }
        emit
    }

    fn core_error(&self, err: huebeat_api::Error) -> CoreError {
        match CoreError::from(err) {
            CoreError::ConnectionFailed { reason, .. } => CoreError::ConnectionFailed {
                host: self.client.host().to_owned(),
                reason,
            },
            other => other,
        }
    }
}

/// Repeating timer for one resource type. The first tick lands one full
/// period after start; the eager request is issued by `start()` itself.
async fn heartbeat_task(
    poller: Weak<PollerInner>,
    resource: ResourceType,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                let Some(inner) = poller.upgrade() else {
                    debug!(%resource, "poller dropped, heartbeat exiting");
                    break;
                };
                trace!(%resource, "heartbeat tick");
                // Detached: a slow bridge must not delay the next tick.
                tokio::spawn(async move {
                    inner.poll_once(resource).await;
                });
            }
        }
    }
}
