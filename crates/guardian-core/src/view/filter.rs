// ── Search filter ──
//
// Case-insensitive substring match over `hostname ip mac status`.

use std::sync::Arc;

use crate::model::Device;

/// Whether `device` matches an already-lowercased query.
fn matches_lowercase(device: &Device, query: &str) -> bool {
    query.is_empty() || device.search_text().to_lowercase().contains(query)
}

pub fn matches(device: &Device, query: &str) -> bool {
    matches_lowercase(device, &query.to_lowercase())
}

/// Keep the devices matching `query`, in their original order.
pub fn filter_devices(devices: &[Arc<Device>], query: &str) -> Vec<Arc<Device>> {
    let q = query.to_lowercase();
    devices
        .iter()
        .filter(|d| matches_lowercase(d, &q))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::device::fixtures::device;

    fn sample() -> Vec<Arc<Device>> {
        let mut laptop = device("aa:aa:aa:aa:aa:01", "online");
        laptop.hostname = Some("Work-Laptop".into());
        laptop.ip = Some("192.168.1.20".into());
        let mut tv = device("aa:aa:aa:aa:aa:02", "blocked");
        tv.hostname = Some("Living Room TV".into());
        tv.ip = Some("192.168.1.31".into());
        let bare = device("bb:bb:bb:bb:bb:03", "offline");
        vec![Arc::new(laptop), Arc::new(tv), Arc::new(bare)]
    }

    fn macs(devices: &[Arc<Device>]) -> Vec<&str> {
        devices.iter().map(|d| d.mac.as_str()).collect()
    }

    #[test]
    fn empty_query_keeps_everything() {
        assert_eq!(filter_devices(&sample(), "").len(), 3);
    }

    #[test]
    fn matches_each_field_case_insensitively() {
        let devices = sample();
        assert_eq!(macs(&filter_devices(&devices, "LAPTOP")), ["aa:aa:aa:aa:aa:01"]);
        assert_eq!(macs(&filter_devices(&devices, "1.31")), ["aa:aa:aa:aa:aa:02"]);
        assert_eq!(macs(&filter_devices(&devices, "BB:BB")), ["bb:bb:bb:bb:bb:03"]);
        assert_eq!(macs(&filter_devices(&devices, "blocked")), ["aa:aa:aa:aa:aa:02"]);
        assert!(filter_devices(&devices, "printer").is_empty());
    }

    #[test]
    fn filter_agrees_with_predicate() {
        let devices = sample();
        for query in ["", "a", "room", "192.168.1.2", "line", "Z", " "] {
            let filtered = filter_devices(&devices, query);
            let expected: Vec<_> = devices.iter().filter(|d| matches(d, query)).collect();
            assert_eq!(filtered.len(), expected.len(), "query {query:?}");
        }
    }
}
