//! `huebeat watch`: run the heartbeat until Ctrl-C.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use owo_colors::OwoColorize;
use serde_json::{Map, Value, json};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use huebeat_core::{
    BroadcastBus, ConnectivityEvent, HeartbeatConfig, HeartbeatPoller, Processor, ResourceType,
};

use crate::cli::{GlobalOpts, WatchArgs};
use crate::commands::{load_settings, use_color};
use crate::error::CliError;

pub async fn handle(args: &WatchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = load_settings(global)?;
    let access = huebeat_config::bridge_access(&cfg)?;
    let mut heartbeat = huebeat_config::heartbeat_config(&cfg)?;
    apply_overrides(&mut heartbeat, args)?;

    let style = LineStyle {
        json: args.json,
        color: !args.json && use_color(global.color),
    };

    let bus = Arc::new(BroadcastBus::default());
    let mut events = bus.subscribe();

    let mut processors: Vec<Arc<dyn Processor>> = Vec::new();
    if !global.quiet {
        processors.push(Arc::new(SummaryPrinter { style }));
    }

    let poller = HeartbeatPoller::new(&access, &heartbeat, processors, bus)?;
    poller.start();

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = &mut shutdown => {
                if let Err(e) = result {
                    warn!(error = %e, "failed to listen for Ctrl-C");
                }
                break;
            }
            received = events.recv() => match received {
                Ok(event) => println!("{}", event_line(style, Local::now(), event)),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "event printer fell behind"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    debug!("stopping heartbeat");
    poller.shutdown().await;
    Ok(())
}

/// Apply `--interval` and `--only` on top of the configured schedule.
fn apply_overrides(heartbeat: &mut HeartbeatConfig, args: &WatchArgs) -> Result<(), CliError> {
    for spec in &args.intervals {
        let (resource, period) = huebeat_config::parse_interval_spec(spec)?;
        heartbeat.intervals.insert(resource, period);
    }
    if !args.only.is_empty() {
        heartbeat
            .intervals
            .retain(|resource, _| args.only.contains(resource));
    }
    if heartbeat.intervals.values().all(Duration::is_zero) {
        return Err(CliError::Validation {
            field: "intervals".into(),
            reason: "no resource has a non-zero poll interval".into(),
        });
    }
    Ok(())
}

// ── Output ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct LineStyle {
    json: bool,
    color: bool,
}

/// Prints a one-line summary for every payload the poller delivers.
struct SummaryPrinter {
    style: LineStyle,
}

impl Processor for SummaryPrinter {
    fn process_payload(&self, payload: &Map<String, Value>, resource: ResourceType) {
        println!(
            "{}",
            payload_line(self.style, Local::now(), resource, payload.len())
        );
    }
}

fn payload_line(
    style: LineStyle,
    at: DateTime<Local>,
    resource: ResourceType,
    entries: usize,
) -> String {
    if style.json {
        return json!({
            "time": at.to_rfc3339(),
            "type": "payload",
            "resource": resource,
            "entries": entries,
        })
        .to_string();
    }

    let label = format!("{:<9}", resource.path_segment());
    let label = if style.color {
        label.cyan().to_string()
    } else {
        label
    };
    format!("{}  {label} {entries} entries", at.format("%H:%M:%S"))
}

fn event_line(style: LineStyle, at: DateTime<Local>, event: ConnectivityEvent) -> String {
    if style.json {
        return json!({
            "time": at.to_rfc3339(),
            "type": "event",
            "event": event,
        })
        .to_string();
    }

    let name = event.name();
    let name = if style.color {
        match event {
            ConnectivityEvent::LocalConnection => name.green().bold().to_string(),
            ConnectivityEvent::NoLocalConnection => name.red().bold().to_string(),
            ConnectivityEvent::NotAuthenticated => name.yellow().bold().to_string(),
        }
    } else {
        name.to_owned()
    };
    format!("{}  {name}", at.format("%H:%M:%S"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    const PLAIN: LineStyle = LineStyle {
        json: false,
        color: false,
    };
    const JSON: LineStyle = LineStyle {
        json: true,
        color: false,
    };

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 1, 9, 30, 15).unwrap()
    }

    fn args(intervals: &[&str], only: &[ResourceType]) -> WatchArgs {
        WatchArgs {
            intervals: intervals.iter().map(|s| (*s).to_owned()).collect(),
            only: only.to_vec(),
            json: false,
        }
    }

    #[test]
    fn plain_lines() {
        assert_eq!(
            payload_line(PLAIN, at(), ResourceType::Lights, 3),
            "09:30:15  lights    3 entries"
        );
        assert_eq!(
            event_line(PLAIN, at(), ConnectivityEvent::NoLocalConnection),
            "09:30:15  noLocalConnection"
        );
    }

    #[test]
    fn json_lines() {
        let line: Value =
            serde_json::from_str(&payload_line(JSON, at(), ResourceType::Sensors, 7)).unwrap();
        assert_eq!(line["type"], "payload");
        assert_eq!(line["resource"], "sensors");
        assert_eq!(line["entries"], 7);

        let line: Value =
            serde_json::from_str(&event_line(JSON, at(), ConnectivityEvent::NotAuthenticated))
                .unwrap();
        assert_eq!(line["type"], "event");
        assert_eq!(line["event"], "notAuthenticated");
    }

    #[test]
    fn interval_flags_override_and_add() {
        let mut heartbeat = HeartbeatConfig::default();
        apply_overrides(&mut heartbeat, &args(&["lights=2s", "rules=1m"], &[])).unwrap();
        assert_eq!(
            heartbeat.intervals[&ResourceType::Lights],
            Duration::from_secs(2)
        );
        assert_eq!(
            heartbeat.intervals[&ResourceType::Rules],
            Duration::from_secs(60)
        );
        assert_eq!(
            heartbeat.intervals[&ResourceType::Config],
            Duration::from_secs(10)
        );
    }

    #[test]
    fn only_restricts_schedule() {
        let mut heartbeat = HeartbeatConfig::default();
        apply_overrides(
            &mut heartbeat,
            &args(&[], &[ResourceType::Groups, ResourceType::Scenes]),
        )
        .unwrap();
        // scenes has no interval configured, so only groups survives
        assert_eq!(
            heartbeat.intervals.keys().copied().collect::<Vec<_>>(),
            vec![ResourceType::Groups]
        );
    }

    #[test]
    fn empty_schedule_is_rejected() {
        let mut heartbeat = HeartbeatConfig::unscheduled();
        let err = apply_overrides(&mut heartbeat, &args(&["lights=0s"], &[])).unwrap_err();
        assert!(matches!(err, CliError::Validation { .. }));
    }
}
