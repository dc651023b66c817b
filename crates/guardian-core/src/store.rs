// ── Device store ──
//
// The raw device collection plus the Wi-Fi badge, each behind a `watch`
// channel. Polls replace the collection wholesale; whichever response is
// applied last wins.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::model::{Device, MacAddress, WifiStatus};
use crate::stream::EntityStream;

pub struct DeviceStore {
    devices: watch::Sender<Arc<Vec<Arc<Device>>>>,
    wifi: watch::Sender<WifiStatus>,
    last_refresh: watch::Sender<Option<DateTime<Utc>>>,
}

impl Default for DeviceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceStore {
    pub fn new() -> Self {
        let (devices, _) = watch::channel(Arc::new(Vec::new()));
        let (wifi, _) = watch::channel(WifiStatus::default());
        let (last_refresh, _) = watch::channel(None);
        Self {
            devices,
            wifi,
            last_refresh,
        }
    }

    // ── Devices ──────────────────────────────────────────────────────

    /// Replace the whole collection, preserving the service's order.
    pub fn replace_devices(&self, devices: Vec<Device>) {
        let snapshot: Vec<Arc<Device>> = devices.into_iter().map(Arc::new).collect();
        // `send_replace` updates unconditionally, even with zero receivers.
        self.devices.send_replace(Arc::new(snapshot));
        self.last_refresh.send_replace(Some(Utc::now()));
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub fn devices_snapshot(&self) -> Arc<Vec<Arc<Device>>> {
        self.devices.borrow().clone()
    }

    pub fn subscribe_devices(&self) -> EntityStream<Device> {
        EntityStream::new(self.devices.subscribe())
    }

    pub fn device_by_mac(&self, mac: &MacAddress) -> Option<Arc<Device>> {
        self.devices
            .borrow()
            .iter()
            .find(|d| d.mac.matches(mac))
            .map(Arc::clone)
    }

    pub fn device_count(&self) -> usize {
        self.devices.borrow().len()
    }

    // ── Wi-Fi ────────────────────────────────────────────────────────

    pub fn set_wifi(&self, status: WifiStatus) {
        self.wifi.send_replace(status);
    }

    pub fn wifi(&self) -> WifiStatus {
        self.wifi.borrow().clone()
    }

    pub fn subscribe_wifi(&self) -> watch::Receiver<WifiStatus> {
        self.wifi.subscribe()
    }

    // ── Metadata ─────────────────────────────────────────────────────

    /// When the collection was last replaced by a successful poll.
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh.borrow()
    }

    pub fn subscribe_last_refresh(&self) -> watch::Receiver<Option<DateTime<Utc>>> {
        self.last_refresh.subscribe()
    }
}
