//! `guardian-tui`: terminal dashboard for a Router Guardian service.
//!
//! Shows the devices on the network in a searchable, sortable, paginated
//! table, the connected Wi-Fi name, and lets the user block or unblock a
//! device. A background data bridge streams controller updates into the
//! action loop; auto-refresh polls the service on a timer.
//!
//! Logs go to a file (default under the temp dir) so they never corrupt
//! the terminal.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::{Path, PathBuf};

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use guardian_config::Preferences;
use guardian_core::{Controller, DashboardConfig};

use crate::app::App;

/// Terminal dashboard for watching and blocking devices on your router.
#[derive(Parser, Debug)]
#[command(name = "guardian-tui", version, about)]
struct Cli {
    /// Service URL (e.g., http://192.168.1.1:5000); overrides the config file
    #[arg(short, long, env = "GUARDIAN_URL")]
    server: Option<String>,

    /// Log file path
    #[arg(long, default_value_os_t = default_log_file())]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn default_log_file() -> PathBuf {
    std::env::temp_dir().join("router-guardian-tui.log")
}

/// File-only tracing; stdout belongs to the terminal UI. Hold the guard
/// for the lifetime of the app so logs flush.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "guardian_tui={log_level},guardian_core={log_level},guardian_api={log_level}"
        ))
    });

    let log_dir = cli.log_file.parent().unwrap_or(Path::new("."));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("router-guardian-tui.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

/// Config file and env, then the `--server` flag on top.
fn build_config(cli: &Cli) -> Result<DashboardConfig> {
    let mut cfg = guardian_config::load_config().wrap_err("failed to load configuration")?;
    if let Some(server) = &cli.server {
        cfg.set("server.url", server)
            .wrap_err_with(|| format!("invalid --server value: {server}"))?;
    }
    cfg.to_dashboard_config()
        .wrap_err("invalid configuration")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Hooks before entering the terminal so a panic restores it.
    tui::install_hooks()?;

    let _log_guard = setup_tracing(&cli);

    let config = build_config(&cli)?;
    let preferences = Preferences::load();
    info!(url = %config.url, dark_mode = preferences.dark_mode, "starting guardian-tui");

    let mut app = App::new(Controller::new(config), preferences);
    app.run().await
}
