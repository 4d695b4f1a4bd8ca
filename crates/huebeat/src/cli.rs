//! Clap derive structures for the `huebeat` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use huebeat_core::ResourceType;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// huebeat -- heartbeat monitor for a local lighting bridge
#[derive(Debug, Parser)]
#[command(
    name = "huebeat",
    version,
    about = "Poll a lighting bridge and report connectivity",
    long_about = "Polls the bridge's local HTTP API on a per-resource cadence,\n\
        prints payload summaries, and reports localConnection /\n\
        noLocalConnection / notAuthenticated events as they happen.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "HUEBEAT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Bridge host, optionally with port (overrides config)
    #[arg(long, short = 'H', env = "HUEBEAT_HOST", global = true)]
    pub host: Option<String>,

    /// Whitelisted bridge username (overrides config)
    #[arg(
        long,
        short = 'u',
        env = "HUEBEAT_USERNAME",
        global = true,
        hide_env_values = true
    )]
    pub username: Option<String>,

    /// Request timeout in seconds (overrides config)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress payload summaries (events are still printed)
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always use color
    Always,
    /// Never use color
    Never,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Poll continuously, printing payload summaries and connectivity events
    Watch(WatchArgs),

    /// Fetch one resource once and print it
    Fetch(FetchArgs),

    /// Inspect configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Set a poll interval, e.g. `lights=2s` (repeatable)
    #[arg(long = "interval", short = 'i', value_name = "RESOURCE=DURATION")]
    pub intervals: Vec<String>,

    /// Poll only these resources (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<ResourceType>,

    /// Emit newline-delimited JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Resource to fetch (lights, groups, scenes, sensors, rules, config, schedules)
    pub resource: ResourceType,

    /// Print compact JSON
    #[arg(long)]
    pub compact: bool,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a config file with default intervals and the given --host / --username
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the resolved configuration (username redacted)
    Show,
    /// Print the config file path
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
