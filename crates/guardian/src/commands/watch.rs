//! `watch`: keep polling and re-print the device table on every change.

use tracing::info;

use guardian_core::{Controller, DashboardConfig, Device, EntityStream};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

use super::{devices, util};

pub async fn handle(
    mut config: DashboardConfig,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if let Some(raw) = args.interval.as_deref() {
        config.refresh_interval = util::parse_interval(raw)?;
    }
    if config.refresh_interval.is_zero() {
        return Err(CliError::Validation {
            field: "interval".into(),
            reason: "polling is disabled in the config; pass --interval".into(),
        });
    }
    config.auto_refresh = true;
    let page_size = config.page_size;
    let interval = config.refresh_interval;
    // Fail on bad view flags before connecting.
    devices::view_state(&args.view, page_size)?;

    let controller = Controller::new(config);
    controller.connect().await?;
    let mut stream = controller.devices();
    controller.start().await;
    info!(interval = %humantime::format_duration(interval), "watching devices");

    let result = watch_loop(&mut stream, &args, page_size, global).await;
    controller.disconnect().await;
    result
}

async fn watch_loop(
    stream: &mut EntityStream<Device>,
    args: &WatchArgs,
    page_size: usize,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => return Ok(()),
            snapshot = stream.changed() => {
                let Some(snapshot) = snapshot else {
                    return Ok(());
                };
                let body = devices::render_devices(&snapshot, &args.view, page_size, global)?;
                if matches!(global.output, OutputFormat::Table) && !global.quiet {
                    println!("── {} ──", chrono::Local::now().format("%H:%M:%S"));
                }
                output::print_output(&body, global.quiet);
            }
        }
    }
}
