// ── Sorting ──
//
// Locale-style string comparison on one column. Missing values compare as
// the empty string. `sort_by` is stable, so ties keep service order.

use std::cmp::Ordering;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::model::Device;

/// Sortable column.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SortKey {
    #[default]
    Hostname,
    Ip,
    Mac,
    Status,
    OnlineDuration,
}

impl SortKey {
    /// Column header text.
    pub fn label(self) -> &'static str {
        match self {
            Self::Hostname => "Hostname",
            Self::Ip => "IP",
            Self::Mac => "MAC",
            Self::Status => "Status",
            Self::OnlineDuration => "Online Duration",
        }
    }

    /// The raw string this column sorts on.
    pub fn value_of(self, device: &Device) -> &str {
        match self {
            Self::Hostname => device.hostname.as_deref().unwrap_or_default(),
            Self::Ip => device.ip.as_deref().unwrap_or_default(),
            Self::Mac => device.mac.as_str(),
            Self::Status => device.status.as_str(),
            Self::OnlineDuration => device.online_duration.as_deref().unwrap_or_default(),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    /// Header arrow.
    pub fn arrow(self) -> &'static str {
        match self {
            Self::Asc => "▲",
            Self::Desc => "▼",
        }
    }
}

/// Case-insensitive comparison; on a case-only tie lowercase sorts first.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

pub fn sort_devices(devices: &mut [Arc<Device>], key: SortKey, direction: SortDirection) {
    devices.sort_by(|a, b| {
        let ord = locale_compare(key.value_of(a), key.value_of(b));
        match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::device::fixtures::device;

    fn named(mac: &str, hostname: Option<&str>) -> Arc<Device> {
        let mut d = device(mac, "online");
        d.hostname = hostname.map(String::from);
        Arc::new(d)
    }

    fn hostnames(devices: &[Arc<Device>]) -> Vec<&str> {
        devices
            .iter()
            .map(|d| d.hostname.as_deref().unwrap_or("<none>"))
            .collect()
    }

    #[test]
    fn compare_ignores_case_first() {
        assert_eq!(locale_compare("apple", "Banana"), Ordering::Less);
        assert_eq!(locale_compare("a", "A"), Ordering::Less);
        assert_eq!(locale_compare("same", "same"), Ordering::Equal);
    }

    #[test]
    fn missing_values_sort_first_ascending() {
        let mut devices = vec![named("01", Some("zeta")), named("02", None), named("03", Some("Alpha"))];
        sort_devices(&mut devices, SortKey::Hostname, SortDirection::Asc);
        assert_eq!(hostnames(&devices), ["<none>", "Alpha", "zeta"]);

        sort_devices(&mut devices, SortKey::Hostname, SortDirection::Desc);
        assert_eq!(hostnames(&devices), ["zeta", "Alpha", "<none>"]);
    }

    #[test]
    fn ties_keep_insertion_order() {
        let mut devices = vec![named("01", Some("x")), named("02", Some("x")), named("03", Some("a"))];
        sort_devices(&mut devices, SortKey::Hostname, SortDirection::Desc);
        let macs: Vec<_> = devices.iter().map(|d| d.mac.as_str()).collect();
        assert_eq!(macs, ["01", "02", "03"]);
    }

    #[test]
    fn status_sort_matches_example() {
        let mut aa = device("AA", "online");
        aa.online_duration = Some("2 days, 03:15:00".into());
        let mut devices = vec![Arc::new(aa), Arc::new(device("BB", "blocked"))];
        sort_devices(&mut devices, SortKey::Status, SortDirection::Asc);
        assert_eq!(devices[0].mac.as_str(), "bb");
    }

    #[test]
    fn sort_key_parses_cli_names() {
        assert_eq!("online_duration".parse::<SortKey>().ok(), Some(SortKey::OnlineDuration));
        assert_eq!("IP".parse::<SortKey>().ok(), Some(SortKey::Ip));
        assert_eq!(SortKey::OnlineDuration.to_string(), "online_duration");
    }
}
