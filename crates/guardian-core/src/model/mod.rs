// ── Domain model ──

pub mod device;
pub mod duration;
pub mod mac;
pub mod wifi;

pub use device::{Device, DeviceAction, DeviceStatus, RowClass};
pub use duration::{BlockDuration, BlockUnit, OnlineDuration, format_online_duration};
pub use mac::MacAddress;
pub use wifi::WifiStatus;
