//! Resolve the effective dashboard settings: config file, then
//! environment, then command-line flags.

use guardian_config::Config;
use guardian_core::DashboardConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Load the config file and layer `--server` / `--timeout` on top.
pub fn resolve(global: &GlobalOpts) -> Result<DashboardConfig, CliError> {
    let mut cfg = guardian_config::load_config()?;
    apply_overrides(&mut cfg, global)?;
    Ok(cfg.to_dashboard_config()?)
}

fn apply_overrides(cfg: &mut Config, global: &GlobalOpts) -> Result<(), CliError> {
    if let Some(ref server) = global.server {
        cfg.set("server.url", server).map_err(|_| CliError::Validation {
            field: "server".into(),
            reason: format!("invalid URL: {server}"),
        })?;
    }
    if let Some(timeout) = global.timeout {
        if timeout == 0 {
            return Err(CliError::Validation {
                field: "timeout".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        cfg.server.timeout = timeout;
    }
    Ok(())
}
