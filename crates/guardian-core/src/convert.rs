// ── API-to-domain type conversions ──
//
// Bridges raw `guardian_api` payloads into `guardian_core::model` types.

use chrono::{DateTime, NaiveDateTime};

use guardian_api::ApiDevice;

use crate::model::{Device, DeviceStatus, MacAddress};

/// Parse an ISO-8601 timestamp. The tracking backend writes naive local
/// times; offsets are accepted and dropped.
fn parse_timestamp(raw: Option<&str>) -> Option<NaiveDateTime> {
    let raw = raw?.trim();
    raw.parse::<NaiveDateTime>()
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_local()))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl From<ApiDevice> for Device {
    fn from(d: ApiDevice) -> Self {
        // Older backends only send the `blocked` flag.
        let status = match d.status {
            Some(raw) => DeviceStatus::from(raw),
            None if d.blocked == Some(true) => DeviceStatus::Blocked,
            None => DeviceStatus::Other(String::new()),
        };

        Device {
            mac: MacAddress::new(&d.mac),
            ip: non_empty(d.ip),
            hostname: non_empty(d.hostname),
            status,
            online_duration: non_empty(d.online_duration),
            blocked: d.blocked,
            first_seen: parse_timestamp(d.first_seen.as_deref()),
            last_seen: parse_timestamp(d.last_seen.as_deref()),
        }
    }
}
