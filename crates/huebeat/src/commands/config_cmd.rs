//! Config subcommand handlers.

use huebeat_config::Config;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::commands::load_settings;
use crate::error::CliError;

const REDACTED: &str = "********";

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init { force } => init(global, force),

        ConfigCommand::Show => {
            let mut cfg = load_settings(global)?;
            redact(&mut cfg);
            print!("{}", toml::to_string_pretty(&cfg)?);
            Ok(())
        }

        ConfigCommand::Path => {
            let path = global
                .config
                .clone()
                .unwrap_or_else(huebeat_config::config_path);
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn init(global: &GlobalOpts, force: bool) -> Result<(), CliError> {
    let path = global
        .config
        .clone()
        .unwrap_or_else(huebeat_config::config_path);
    if path.exists() && !force {
        return Err(CliError::Validation {
            field: "config".into(),
            reason: format!("{} already exists (use --force to overwrite)", path.display()),
        });
    }

    let mut cfg = Config::default();
    cfg.bridge.host.clone_from(&global.host);
    cfg.bridge.username.clone_from(&global.username);
    if let Some(timeout) = global.timeout {
        cfg.bridge.timeout = timeout;
    }

    huebeat_config::save_config_to(&cfg, &path)?;
    eprintln!("Wrote {}", path.display());
    Ok(())
}

/// Mask the plaintext username so `config show` is safe to paste.
fn redact(cfg: &mut Config) {
    if cfg.bridge.username.is_some() {
        cfg.bridge.username = Some(REDACTED.into());
    }
}
