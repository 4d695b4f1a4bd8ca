//! Command handlers and the settings they share.

pub mod config_cmd;
pub mod fetch;
pub mod watch;

use std::io::IsTerminal;

use huebeat_config::Config;

use crate::cli::{ColorMode, GlobalOpts};
use crate::error::CliError;

/// Load the config file (explicit `--config` or the platform default) and
/// layer the global CLI overrides on top.
pub fn load_settings(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = match global.config {
        Some(ref path) => huebeat_config::load_config_from(path)?,
        None => huebeat_config::load_config()?,
    };

    if let Some(ref host) = global.host {
        cfg.bridge.host = Some(host.clone());
    }
    if let Some(ref username) = global.username {
        // An explicit username wins over any username_env indirection.
        cfg.bridge.username = Some(username.clone());
        cfg.bridge.username_env = None;
    }
    if let Some(timeout) = global.timeout {
        cfg.bridge.timeout = timeout;
    }

    Ok(cfg)
}

/// Whether stdout should be colorized.
pub fn use_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
        }
    }
}
