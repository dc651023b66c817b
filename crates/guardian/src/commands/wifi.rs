//! Wi-Fi command handler.

use serde::Serialize;
use tracing::warn;

use guardian_core::{Controller, DashboardConfig, WifiStatus};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct WifiOutput {
    connected: bool,
    ssid: Option<String>,
}

impl From<&WifiStatus> for WifiOutput {
    fn from(status: &WifiStatus) -> Self {
        Self {
            connected: status.ssid().is_some(),
            ssid: status.ssid().map(str::to_owned),
        }
    }
}

/// Print the connected SSID. An unreachable service is an error; any other
/// failure reads as `Unavailable`.
pub async fn handle(config: DashboardConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let status = Controller::oneshot(config, |c| async move {
        match c.refresh_wifi().await {
            Ok(status) => Ok(status),
            Err(e) if e.is_unreachable() => Err(e),
            Err(e) => {
                warn!(error = %e, "wifi lookup failed");
                Ok(WifiStatus::Unavailable)
            }
        }
    })
    .await?;

    let out = output::render_single(
        &global.output,
        &WifiOutput::from(&status),
        |_| format!("Connected Wi-Fi: {status}"),
        |w| w.ssid.clone().unwrap_or_default(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
