// ── Device domain types ──

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::duration::{OnlineDuration, format_online_duration};
use super::mac::MacAddress;

/// Hostname shown when the service doesn't know one.
pub const UNKNOWN_HOSTNAME: &str = "Unknown";

/// Connection/blocking status as reported by the service.
///
/// Values outside the four known ones are kept verbatim in `Other` so they
/// still take part in search and sort.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DeviceStatus {
    Online,
    Offline,
    Blocked,
    Scheduled,
    Other(String),
}

impl DeviceStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
            Self::Blocked => "blocked",
            Self::Scheduled => "scheduled",
            Self::Other(raw) => raw,
        }
    }

    /// Blocked right now, or under a scheduled block.
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked | Self::Scheduled)
    }
}

impl From<&str> for DeviceStatus {
    fn from(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "online" => Self::Online,
            "offline" => Self::Offline,
            "blocked" => Self::Blocked,
            "scheduled" => Self::Scheduled,
            _ => Self::Other(raw.to_owned()),
        }
    }
}

impl From<String> for DeviceStatus {
    fn from(raw: String) -> Self {
        Self::from(raw.as_str())
    }
}

impl From<DeviceStatus> for String {
    fn from(status: DeviceStatus) -> Self {
        match status {
            DeviceStatus::Other(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visual category of a table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum RowClass {
    Blocked,
    Scheduled,
    /// Online for at least a day.
    LongOnline,
    Online,
    Neutral,
}

/// The one mutation a row offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum DeviceAction {
    Block,
    Unblock,
}

/// A device on the router's network.
///
/// Read-only; the service is the source of truth. `mac` is the stable
/// identity used for every block/unblock call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub mac: MacAddress,
    pub ip: Option<String>,
    pub hostname: Option<String>,
    pub status: DeviceStatus,
    /// Raw duration text from the service.
    pub online_duration: Option<String>,
    /// Explicit flag some backends send alongside `status`.
    pub blocked: Option<bool>,
    pub first_seen: Option<NaiveDateTime>,
    pub last_seen: Option<NaiveDateTime>,
}

impl Device {
    /// Hostname for display, `"Unknown"` when absent.
    pub fn display_name(&self) -> &str {
        self.hostname
            .as_deref()
            .filter(|h| !h.is_empty())
            .unwrap_or(UNKNOWN_HOSTNAME)
    }

    pub fn parsed_online_duration(&self) -> Option<OnlineDuration> {
        self.online_duration.as_deref().and_then(OnlineDuration::parse)
    }

    /// Online duration formatted for display.
    pub fn online_duration_display(&self) -> String {
        format_online_duration(self.online_duration.as_deref())
    }

    /// Whether the row shows the device as blocked (and offers Unblock).
    pub fn is_blocked(&self) -> bool {
        self.status.is_blocked()
    }

    pub fn action(&self) -> DeviceAction {
        if self.is_blocked() {
            DeviceAction::Unblock
        } else {
            DeviceAction::Block
        }
    }

    /// Online for at least a full day.
    pub fn is_long_online(&self) -> bool {
        if self.status != DeviceStatus::Online {
            return false;
        }
        match self.parsed_online_duration() {
            Some(d) => d.days() >= 1,
            None => self
                .online_duration
                .as_deref()
                .is_some_and(|raw| raw.contains("day")),
        }
    }

    pub fn row_class(&self) -> RowClass {
        match self.status {
            DeviceStatus::Blocked => RowClass::Blocked,
            DeviceStatus::Scheduled => RowClass::Scheduled,
            DeviceStatus::Online if self.is_long_online() => RowClass::LongOnline,
            DeviceStatus::Online => RowClass::Online,
            _ => RowClass::Neutral,
        }
    }

    /// `hostname ip mac status`, missing fields empty. This is the text the
    /// search box matches against.
    pub fn search_text(&self) -> String {
        format!(
            "{} {} {} {}",
            self.hostname.as_deref().unwrap_or_default(),
            self.ip.as_deref().unwrap_or_default(),
            self.mac,
            self.status
        )
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub(crate) fn device(mac: &str, status: &str) -> Device {
        Device {
            mac: MacAddress::new(mac),
            ip: None,
            hostname: None,
            status: DeviceStatus::from(status),
            online_duration: None,
            blocked: None,
            first_seen: None,
            last_seen: None,
        }
    }
}
