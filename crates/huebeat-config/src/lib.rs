//! Shared configuration for huebeat.
//!
//! TOML file + `HUEBEAT_*` environment, username resolution, and
//! translation to `huebeat_core::{BridgeAccessConfig, HeartbeatConfig}`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use huebeat_core::{BridgeAccessConfig, HeartbeatConfig, ResourceType};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no bridge host configured")]
    NoHost,

    #[error("no bridge username configured")]
    NoCredentials,

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// De-duplication window for connectivity events.
    #[serde(default = "default_notification_window")]
    pub notification_window: String,

    #[serde(default)]
    pub bridge: Bridge,

    /// Poll interval per resource name, as humantime strings (`"5s"`).
    /// `"0s"` disables a resource that is on by default.
    #[serde(default = "default_intervals")]
    pub intervals: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            notification_window: default_notification_window(),
            bridge: Bridge::default(),
            intervals: default_intervals(),
        }
    }
}

/// The `[bridge]` section.
#[derive(Debug, Deserialize, Serialize)]
pub struct Bridge {
    /// Bridge host, optionally with port (e.g. "192.168.1.20").
    pub host: Option<String>,

    /// Whitelisted username (plaintext -- prefer `username_env`).
    pub username: Option<String>,

    /// Environment variable name containing the username.
    pub username_env: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Bridge {
    fn default() -> Self {
        Self {
            host: None,
            username: None,
            username_env: None,
            timeout: default_timeout(),
        }
    }
}

fn default_intervals() -> BTreeMap<String, String> {
    HeartbeatConfig::default()
        .intervals
        .into_iter()
        .map(|(resource, period)| {
            (
                resource.to_string(),
                humantime::format_duration(period).to_string(),
            )
        })
        .collect()
}
fn default_notification_window() -> String {
    humantime::format_duration(huebeat_core::DEFAULT_NOTIFICATION_WINDOW).to_string()
}
fn default_timeout() -> u64 {
    30
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "huebeat", "huebeat").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("huebeat");
    p
}

// ── Config loading ──────────────────────────────────────────────────

const ENV_PREFIX: &str = "HUEBEAT_";

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from `path` + environment.
///
/// A missing file is not an error; defaults and environment still apply.
/// Environment keys nest with a double underscore:
/// `HUEBEAT_BRIDGE__HOST`, `HUEBEAT_INTERVALS__LIGHTS`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let mut figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(env_provider().filter(|key| !is_verbatim_key(key.as_str())));

    // Figment's Env provider reads `1234567890` or `30` as a number, which
    // would not fit these string fields. Merge them without parsing.
    for (key, value) in env_provider().iter() {
        if is_verbatim_key(key.as_str()) {
            figment = figment.merge(Serialized::default(key.as_str(), value));
        }
    }

    let config: Config = figment.extract()?;
    Ok(config)
}

fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX).split("__")
}

/// Config keys whose environment values are always taken as strings.
fn is_verbatim_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    matches!(
        key.as_str(),
        "notification_window" | "bridge.host" | "bridge.username" | "bridge.username_env"
    ) || key.starts_with("intervals.")
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Resolution ──────────────────────────────────────────────────────

/// Resolve the bridge username from the credential chain.
pub fn resolve_username(bridge: &Bridge) -> Result<SecretString, ConfigError> {
    // 1. Section's username_env → env var lookup
    if let Some(ref env_name) = bridge.username_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. Plaintext in config
    if let Some(ref username) = bridge.username {
        return Ok(SecretString::from(username.clone()));
    }

    Err(ConfigError::NoCredentials)
}

/// Parse a humantime duration for `field`. A bare integer is seconds.
pub fn parse_duration(field: &str, value: &str) -> Result<Duration, ConfigError> {
    let value = value.trim();
    if let Ok(secs) = value.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    humantime::parse_duration(value).map_err(|e| ConfigError::Validation {
        field: field.into(),
        reason: format!("'{value}' is not a duration: {e}"),
    })
}

/// Parse a resource name (case-insensitive).
pub fn parse_resource(name: &str) -> Result<ResourceType, ConfigError> {
    ResourceType::from_str(name.trim()).map_err(|_| ConfigError::Validation {
        field: "resource".into(),
        reason: format!(
            "unknown resource '{name}', expected one of: {}",
            ResourceType::ALL.map(ResourceType::path_segment).join(", ")
        ),
    })
}

/// Parse a `resource=duration` override such as `lights=2s`.
pub fn parse_interval_spec(spec: &str) -> Result<(ResourceType, Duration), ConfigError> {
    let (name, value) = spec.split_once('=').ok_or_else(|| ConfigError::Validation {
        field: "interval".into(),
        reason: format!("expected RESOURCE=DURATION, got '{spec}'"),
    })?;
    let resource = parse_resource(name)?;
    let period = parse_duration(&format!("intervals.{resource}"), value)?;
    Ok((resource, period))
}

/// Build the heartbeat tuning from a config. No credentials needed.
pub fn heartbeat_config(cfg: &Config) -> Result<HeartbeatConfig, ConfigError> {
    let mut intervals = BTreeMap::new();
    for (name, value) in &cfg.intervals {
        let resource = parse_resource(name)?;
        let period = parse_duration(&format!("intervals.{name}"), value)?;
        intervals.insert(resource, period);
    }

    Ok(HeartbeatConfig {
        intervals,
        notification_window: parse_duration("notification_window", &cfg.notification_window)?,
        timeout: Duration::from_secs(cfg.bridge.timeout),
    })
}

/// Build the bridge access config. Host and username are required.
pub fn bridge_access(cfg: &Config) -> Result<BridgeAccessConfig, ConfigError> {
    let host = cfg
        .bridge
        .host
        .as_deref()
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .ok_or(ConfigError::NoHost)?;
    let username = resolve_username(&cfg.bridge)?;
    Ok(BridgeAccessConfig::new(host, username))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert!(cfg.bridge.host.is_none());
        assert_eq!(cfg.bridge.timeout, 30);

        let heartbeat = heartbeat_config(&cfg).unwrap();
        assert_eq!(heartbeat, HeartbeatConfig::default());
    }

    #[test]
    fn file_overrides_merge_with_default_intervals() {
        let (_dir, path) = write_config(
            r#"
            notification_window = "30s"

            [bridge]
            host = "192.168.1.20"
            username = "abc123"
            timeout = 5

            [intervals]
            lights = "2s"
            rules = "1m"
            sensors = "0s"
            "#,
        );

        let cfg = load_config_from(&path).unwrap();
        let heartbeat = heartbeat_config(&cfg).unwrap();
        assert_eq!(heartbeat.intervals[&ResourceType::Lights], Duration::from_secs(2));
        assert_eq!(heartbeat.intervals[&ResourceType::Rules], Duration::from_secs(60));
        assert_eq!(heartbeat.intervals[&ResourceType::Sensors], Duration::ZERO);
        assert_eq!(heartbeat.intervals[&ResourceType::Config], Duration::from_secs(10));
        assert_eq!(heartbeat.notification_window, Duration::from_secs(30));
        assert_eq!(heartbeat.timeout, Duration::from_secs(5));

        let access = bridge_access(&cfg).unwrap();
        assert_eq!(access.host, "192.168.1.20");
        assert_eq!(access.username.expose_secret(), "abc123");
    }

    #[test]
    fn unknown_resource_is_rejected() {
        let (_dir, path) = write_config("[intervals]\nbulbs = \"5s\"\n");
        let cfg = load_config_from(&path).unwrap();
        let err = heartbeat_config(&cfg).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "resource"));
    }

    #[test]
    fn bad_duration_is_rejected() {
        let (_dir, path) = write_config("[intervals]\nlights = \"often\"\n");
        let cfg = load_config_from(&path).unwrap();
        let err = heartbeat_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("intervals.lights"));
    }

    #[test]
    fn host_and_username_are_required() {
        let mut cfg = Config::default();
        assert!(matches!(bridge_access(&cfg), Err(ConfigError::NoHost)));

        cfg.bridge.host = Some("bridge.lan".into());
        assert!(matches!(bridge_access(&cfg), Err(ConfigError::NoCredentials)));
    }

    #[test]
    fn username_env_falls_back_to_plaintext_when_unset() {
        let bridge = Bridge {
            username: Some("plain".into()),
            username_env: Some("HUEBEAT_TEST_USERNAME_THAT_IS_NEVER_SET".into()),
            ..Bridge::default()
        };
        assert_eq!(resolve_username(&bridge).unwrap().expose_secret(), "plain");
    }

    #[test]
    fn numeric_env_values_stay_strings() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("HUEBEAT_BRIDGE__HOST", "10.0.0.2");
            jail.set_env("HUEBEAT_BRIDGE__USERNAME", "0123456789");
            jail.set_env("HUEBEAT_BRIDGE__TIMEOUT", "7");
            jail.set_env("HUEBEAT_NOTIFICATION_WINDOW", "30");
            jail.set_env("HUEBEAT_INTERVALS__LIGHTS", "2");

            let cfg = load_config_from(&jail.directory().join("absent.toml"))
                .map_err(|e| e.to_string())?;
            assert_eq!(cfg.bridge.username.as_deref(), Some("0123456789"));
            assert_eq!(cfg.bridge.timeout, 7);
            assert_eq!(cfg.notification_window, "30");

            let heartbeat = heartbeat_config(&cfg).map_err(|e| e.to_string())?;
            assert_eq!(heartbeat.notification_window, Duration::from_secs(30));
            assert_eq!(heartbeat.intervals[&ResourceType::Lights], Duration::from_secs(2));
            assert_eq!(heartbeat.timeout, Duration::from_secs(7));
            Ok(())
        });
    }

    #[test]
    fn bare_integer_duration_is_seconds() {
        assert_eq!(parse_duration("window", " 45 ").unwrap(), Duration::from_secs(45));
        assert_eq!(parse_duration("window", "1m 5s").unwrap(), Duration::from_secs(65));
        assert!(parse_duration("window", "-3").is_err());
    }

    #[test]
    fn parses_interval_specs() {
        assert_eq!(
            parse_interval_spec("Lights=250ms").unwrap(),
            (ResourceType::Lights, Duration::from_millis(250))
        );
        assert!(parse_interval_spec("lights").is_err());
        assert!(parse_interval_spec("lamps=5s").is_err());
    }

    #[test]
    fn saved_config_round_trips_through_loader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.bridge.host = Some("10.0.0.2".into());
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.bridge.host.as_deref(), Some("10.0.0.2"));
        assert_eq!(loaded.intervals, default_intervals());
    }
}
