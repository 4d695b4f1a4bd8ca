// ── Connectivity notification de-duplication ──
//
// `localConnection` and `noLocalConnection` fire at most once per window.
// Emitting one resets the other to "never fired", so a state flip is
// always reported immediately. `notAuthenticated` is never suppressed.

use std::time::Duration;

use tokio::time::Instant;

use crate::config::DEFAULT_NOTIFICATION_WINDOW;
use crate::event::ConnectivityEvent;

/// Last-fired instants for the paired connectivity signals.
#[derive(Debug, Clone)]
pub struct ConnectivityTracker {
    window: Duration,
    last_connected: Option<Instant>,
    last_disconnected: Option<Instant>,
}

impl Default for ConnectivityTracker {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFICATION_WINDOW)
    }
}

impl ConnectivityTracker {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_connected: None,
            last_disconnected: None,
        }
    }

    /// Decide whether `event` should be published at `now`, recording it
    /// as fired if so.
    pub fn should_emit(&mut self, event: ConnectivityEvent, now: Instant) -> bool {
        match event {
            ConnectivityEvent::NotAuthenticated => true,
            ConnectivityEvent::LocalConnection => Self::gate(
                &mut self.last_connected,
                &mut self.last_disconnected,
                self.window,
                now,
            ),
            ConnectivityEvent::NoLocalConnection => Self::gate(
                &mut self.last_disconnected,
                &mut self.last_connected,
                self.window,
                now,
            ),
        }
    }

    fn gate(
        last: &mut Option<Instant>,
        paired: &mut Option<Instant>,
        window: Duration,
        now: Instant,
    ) -> bool {
        let due = last.is_none_or(|fired| now.saturating_duration_since(fired) > window);
        if due {
            *last = Some(now);
            *paired = None;
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCAL: ConnectivityEvent = ConnectivityEvent::LocalConnection;
    const NO_LOCAL: ConnectivityEvent = ConnectivityEvent::NoLocalConnection;
    const NOT_AUTH: ConnectivityEvent = ConnectivityEvent::NotAuthenticated;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn first_signal_always_fires() {
        let mut tracker = ConnectivityTracker::default();
        assert!(tracker.should_emit(LOCAL, Instant::now()));
    }

    #[test]
    fn repeats_inside_window_are_suppressed() {
        let mut tracker = ConnectivityTracker::default();
        let t0 = Instant::now();
        assert!(tracker.should_emit(LOCAL, t0));
        assert!(!tracker.should_emit(LOCAL, t0 + secs(3)));
        assert!(!tracker.should_emit(LOCAL, t0 + secs(10)));
        assert!(tracker.should_emit(LOCAL, t0 + secs(11)));
    }

    #[test]
    fn suppressed_window_is_measured_from_last_emission() {
        let mut tracker = ConnectivityTracker::default();
        let t0 = Instant::now();
        assert!(tracker.should_emit(NO_LOCAL, t0));
        assert!(!tracker.should_emit(NO_LOCAL, t0 + secs(9)));
        assert!(tracker.should_emit(NO_LOCAL, t0 + secs(12)));
        assert!(!tracker.should_emit(NO_LOCAL, t0 + secs(20)));
    }

    #[test]
    fn state_flip_fires_immediately_both_ways() {
        let mut tracker = ConnectivityTracker::default();
        let t0 = Instant::now();
        assert!(tracker.should_emit(LOCAL, t0));
        assert!(!tracker.should_emit(LOCAL, t0 + secs(1)));
        assert!(tracker.should_emit(NO_LOCAL, t0 + secs(2)));
        assert!(!tracker.should_emit(NO_LOCAL, t0 + secs(3)));
        // The earlier localConnection was forgotten when noLocalConnection fired.
        assert!(tracker.should_emit(LOCAL, t0 + secs(4)));
        assert!(tracker.should_emit(NO_LOCAL, t0 + secs(5)));
    }

    #[test]
    fn not_authenticated_is_never_suppressed() {
        let mut tracker = ConnectivityTracker::default();
        let t0 = Instant::now();
        assert!(tracker.should_emit(NOT_AUTH, t0));
        assert!(tracker.should_emit(NOT_AUTH, t0));
        assert!(tracker.should_emit(NOT_AUTH, t0 + secs(1)));
    }

    #[test]
    fn not_authenticated_does_not_touch_paired_state() {
        let mut tracker = ConnectivityTracker::default();
        let t0 = Instant::now();
        assert!(tracker.should_emit(LOCAL, t0));
        assert!(tracker.should_emit(NOT_AUTH, t0 + secs(1)));
        assert!(!tracker.should_emit(LOCAL, t0 + secs(2)));
    }

    #[test]
    fn custom_window() {
        let mut tracker = ConnectivityTracker::new(Duration::from_millis(100));
        let t0 = Instant::now();
        assert!(tracker.should_emit(LOCAL, t0));
        assert!(tracker.should_emit(LOCAL, t0 + Duration::from_millis(101)));
    }
}
