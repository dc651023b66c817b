// guardian-api: Async Rust client for the Router Guardian device API

pub mod client;
pub mod devices;
pub mod error;
pub mod models;
pub mod transport;
pub mod wifi;

pub use client::GuardianClient;
pub use error::Error;
pub use models::{ApiDevice, BlockRequest, UnblockRequest, WifiInfo};
pub use transport::TransportConfig;
