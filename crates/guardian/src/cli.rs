//! Clap derive structures for the `guardian` CLI.
//!
//! Shared with `build.rs` for man page generation, so this module only
//! depends on clap.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// guardian -- inspect and block devices on a Router Guardian service
#[derive(Debug, Parser)]
#[command(
    name = "guardian",
    version,
    about = "Inspect and block devices on your home network",
    long_about = "Command-line client for the Router Guardian service.\n\n\
        Lists the devices the router knows about, shows the connected\n\
        Wi-Fi network and blocks or unblocks devices by MAC address.",
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
    /// Service URL (overrides the config file)
    #[arg(long, short = 's', env = "GUARDIAN_URL", global = true)]
    pub server: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "GUARDIAN_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout in seconds (overrides the config file)
    #[arg(long, env = "GUARDIAN_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List, inspect, block and unblock devices
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Show the Wi-Fi network the router is connected to
    #[command(alias = "w")]
    Wifi,

    /// Re-print the device table on every poll until Ctrl-C
    Watch(WatchArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List devices (filtered, sorted and paginated)
    #[command(alias = "ls")]
    List(DeviceListArgs),

    /// Show one device in detail
    Get {
        /// Device MAC address
        mac: String,
    },

    /// Block a device, indefinitely or for a duration
    Block {
        /// Device MAC address
        mac: String,

        /// How long to block for, e.g. 1h or 30m (overrides the config)
        #[arg(long, short = 'd')]
        duration: Option<String>,
    },

    /// Lift a block
    Unblock {
        /// Device MAC address
        mac: String,
    },
}

/// View arguments shared by `devices list` and `watch`.
#[derive(Debug, Clone, Args)]
pub struct DeviceListArgs {
    /// Case-insensitive filter on hostname, IP, MAC and status
    #[arg(long, short = 'f')]
    pub search: Option<String>,

    /// Column to sort by
    #[arg(long, default_value = "hostname")]
    pub sort: SortColumn,

    /// Sort descending
    #[arg(long)]
    pub desc: bool,

    /// Page to show (1-based, clamped to the last page)
    #[arg(long, short = 'p', default_value = "1")]
    pub page: usize,

    /// Rows per page (defaults to the configured page size)
    #[arg(long, short = 'l')]
    pub page_size: Option<usize>,

    /// Show every matching device on one page
    #[arg(long, short = 'a')]
    pub all: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortColumn {
    Hostname,
    Ip,
    Mac,
    Status,
    OnlineDuration,
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Poll period, e.g. 10s or 1m (defaults to the configured interval)
    #[arg(long, short = 'i')]
    pub interval: Option<String>,

    #[command(flatten)]
    pub view: DeviceListArgs,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Show the effective configuration
    Show,

    /// Write a config file with default values
    Init,

    /// Set a single value, e.g. `dashboard.page_size 10`
    Set {
        /// Dotted key
        key: String,
        /// New value
        value: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
