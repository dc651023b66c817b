//! Device command handlers.

use std::sync::Arc;

use tabled::Tabled;
use tracing::debug;

use guardian_core::{
    BlockDuration, BlockDurationPolicy, CommandResult, Controller, DashboardConfig, Device,
    DeviceAction, MacAddress, SortDirection, SortKey, ViewState,
};

use crate::cli::{DeviceListArgs, DevicesArgs, DevicesCommand, GlobalOpts, OutputFormat, SortColumn};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Hostname")]
    hostname: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Online Duration")]
    online: String,
    #[tabled(rename = "Blocked")]
    blocked: String,
    #[tabled(rename = "Action")]
    action: String,
}

fn device_row(d: &Arc<Device>, color: bool) -> DeviceRow {
    DeviceRow {
        hostname: d.display_name().to_owned(),
        ip: d.ip.clone().unwrap_or_else(|| "-".into()),
        mac: d.mac.to_string(),
        status: output::paint(d.status.as_str(), d.row_class(), color),
        online: d.online_duration_display(),
        blocked: yes_no(d.is_blocked()).into(),
        action: action_label(d.action()).into(),
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

fn action_label(action: DeviceAction) -> &'static str {
    match action {
        DeviceAction::Block => "Block",
        DeviceAction::Unblock => "Unblock",
    }
}

fn detail(d: &Arc<Device>) -> String {
    let seen = |ts: Option<chrono::NaiveDateTime>| {
        ts.map_or_else(|| "-".into(), |t| t.format("%Y-%m-%d %H:%M:%S").to_string())
    };
    [
        format!("Hostname:   {}", d.display_name()),
        format!("MAC:        {}", d.mac),
        format!("IP:         {}", d.ip.as_deref().unwrap_or("-")),
        format!("Status:     {}", d.status),
        format!("Online:     {}", d.online_duration_display()),
        format!("Blocked:    {}", yes_no(d.is_blocked())),
        format!("Action:     {}", action_label(d.action())),
        format!("First seen: {}", seen(d.first_seen)),
        format!("Last seen:  {}", seen(d.last_seen)),
    ]
    .join("\n")
}

// ── View pipeline ───────────────────────────────────────────────────

fn sort_key(column: SortColumn) -> SortKey {
    match column {
        SortColumn::Hostname => SortKey::Hostname,
        SortColumn::Ip => SortKey::Ip,
        SortColumn::Mac => SortKey::Mac,
        SortColumn::Status => SortKey::Status,
        SortColumn::OnlineDuration => SortKey::OnlineDuration,
    }
}

/// Translate list flags into a [`ViewState`].
pub fn view_state(args: &DeviceListArgs, default_page_size: usize) -> Result<ViewState, CliError> {
    let page_size = args.page_size.unwrap_or(default_page_size);
    if page_size == 0 {
        return Err(CliError::Validation {
            field: "page-size".into(),
            reason: "must be at least 1".into(),
        });
    }
    let direction = if args.desc {
        SortDirection::Desc
    } else {
        SortDirection::Asc
    };

    let mut view = ViewState::new(page_size);
    view.set_search(args.search.clone().unwrap_or_default());
    view.set_sort(sort_key(args.sort), direction);
    view.set_page(args.page);
    Ok(view)
}

/// Render the device table for `devices list` and `watch`.
///
/// Table output ends with a `Page N of M` footer unless `--all` is set.
pub fn render_devices(
    devices: &[Arc<Device>],
    args: &DeviceListArgs,
    default_page_size: usize,
    global: &GlobalOpts,
) -> Result<String, CliError> {
    let view = view_state(args, default_page_size)?;
    let color = output::should_color(&global.color);
    let table = matches!(global.output, OutputFormat::Table);

    let (rows, footer) = if args.all {
        let rows = view.derive_all(devices);
        let footer = format!("{} of {} devices", rows.len(), devices.len());
        (rows, footer)
    } else {
        let page = view.derive(devices);
        let footer = format!(
            "{} ({} of {} devices)",
            page.page_label(),
            page.matched,
            page.total
        );
        (page.rows, footer)
    };

    if table && rows.is_empty() {
        return Ok(format!("No devices found.\n{footer}"));
    }

    let body = output::render_list(
        &global.output,
        &rows,
        |d| device_row(d, color),
        |d| d.mac.to_string(),
    )?;
    Ok(if table { format!("{body}\n{footer}") } else { body })
}

// ── Block duration ──────────────────────────────────────────────────

/// `--duration` wins; otherwise a fixed configured duration applies and
/// anything else blocks indefinitely.
fn resolve_duration(
    flag: Option<&str>,
    policy: BlockDurationPolicy,
) -> Result<Option<BlockDuration>, CliError> {
    match flag {
        Some(raw) => Ok(Some(raw.parse::<BlockDuration>()?)),
        None => Ok(match policy {
            BlockDurationPolicy::Fixed(d) => Some(d),
            BlockDurationPolicy::Prompt | BlockDurationPolicy::Indefinite => None,
        }),
    }
}

fn print_mutation(
    result: &CommandResult,
    summary: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if !global.quiet {
        eprintln!("{summary}");
    }
    if let CommandResult::Device(device) = result {
        let out = output::render_single(&global.output, device, detail, |d| {
            d.status.to_string()
        })?;
        output::print_output(&out, global.quiet);
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    config: DashboardConfig,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        DevicesCommand::List(list) => {
            let page_size = config.page_size;
            let devices = Controller::oneshot(config, |c| async move {
                c.refresh_devices().await?;
                Ok(c.devices_snapshot())
            })
            .await?;
            debug!(devices = devices.len(), "rendering device list");
            let out = render_devices(&devices, &list, page_size, global)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Get { mac } => {
            let mac = MacAddress::new(&mac);
            let device =
                Controller::oneshot(config, |c| async move { c.get_device(&mac).await }).await?;
            let out = output::render_single(&global.output, &device, detail, |d| {
                d.mac.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Block { mac, duration } => {
            // Rejected before any request goes out.
            let duration = resolve_duration(duration.as_deref(), config.block_duration)?;
            let typed = MacAddress::new(&mac);

            let spinner = util::spinner(format!("Blocking {typed}..."), global.quiet);
            let result = Controller::oneshot(config, |c| async move {
                let mac = c.resolve_mac(&typed).await;
                let result = c.block(mac.clone(), duration).await?;
                Ok((mac, result))
            })
            .await;
            spinner.finish_and_clear();

            let (mac, result) = result?;
            let summary = match duration {
                Some(d) => format!("Blocked {mac} for {d}"),
                None => format!("Blocked {mac}"),
            };
            print_mutation(&result, &summary, global)
        }

        DevicesCommand::Unblock { mac } => {
            let typed = MacAddress::new(&mac);

            let spinner = util::spinner(format!("Unblocking {typed}..."), global.quiet);
            let result = Controller::oneshot(config, |c| async move {
                let mac = c.resolve_mac(&typed).await;
                let result = c.unblock(mac.clone()).await?;
                Ok((mac, result))
            })
            .await;
            spinner.finish_and_clear();

            let (mac, result) = result?;
            print_mutation(&result, &format!("Unblocked {mac}"), global)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use guardian_core::DeviceStatus;

    fn device(mac: &str, hostname: &str, status: &str) -> Arc<Device> {
        Arc::new(Device {
            mac: MacAddress::new(mac),
            ip: None,
            hostname: Some(hostname.into()),
            status: DeviceStatus::from(status.to_owned()),
            online_duration: None,
            blocked: None,
            first_seen: None,
            last_seen: None,
        })
    }

    fn list_args() -> DeviceListArgs {
        DeviceListArgs {
            search: None,
            sort: SortColumn::Hostname,
            desc: false,
            page: 1,
            page_size: None,
            all: false,
        }
    }

    #[test]
    fn duration_flag_overrides_policy() {
        let fixed = BlockDurationPolicy::Fixed(BlockDuration::hours(2).unwrap());
        assert_eq!(
            resolve_duration(Some("30m"), fixed).unwrap(),
            Some(BlockDuration::minutes(30).unwrap())
        );
        assert_eq!(
            resolve_duration(None, fixed).unwrap(),
            Some(BlockDuration::hours(2).unwrap())
        );
        assert_eq!(resolve_duration(None, BlockDurationPolicy::Prompt).unwrap(), None);
    }

    #[test]
    fn malformed_duration_is_a_usage_error() {
        let err = resolve_duration(Some("2d"), BlockDurationPolicy::Indefinite).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::exit_code::USAGE);
    }

    #[test]
    fn view_state_maps_flags() {
        let mut args = list_args();
        args.sort = SortColumn::Status;
        args.desc = true;
        args.page = 3;
        args.search = Some("cam".into());

        let view = view_state(&args, 5).unwrap();
        assert_eq!(view.sort_key(), SortKey::Status);
        assert_eq!(view.sort_direction(), SortDirection::Desc);
        assert_eq!(view.page(), 3);
        assert_eq!(view.search(), "cam");
        assert!(view_state(&DeviceListArgs { page_size: Some(0), ..args }, 5).is_err());
    }

    #[test]
    fn row_shows_unblock_for_scheduled() {
        let row = device_row(&device("aa:aa:aa:aa:aa:aa", "tv", "scheduled"), false);
        assert_eq!(row.blocked, "Yes");
        assert_eq!(row.action, "Unblock");
        assert_eq!(row.ip, "-");
    }

    #[test]
    fn detail_lists_seen_timestamps() {
        let text = detail(&device("aa:aa:aa:aa:aa:aa", "tv", "online"));
        assert!(text.contains("First seen: -"));
        assert!(text.contains("Action:     Block"));
    }
}
