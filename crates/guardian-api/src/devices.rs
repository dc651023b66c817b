// Device endpoints: listing plus the block/unblock commands.

use tracing::debug;

use crate::client::GuardianClient;
use crate::error::Error;
use crate::models::{ApiDevice, BlockRequest, UnblockRequest};

impl GuardianClient {
    /// List every device the router knows about.
    ///
    /// `GET /devices`
    pub async fn list_devices(&self) -> Result<Vec<ApiDevice>, Error> {
        let url = self.url("devices")?;
        let devices: Vec<ApiDevice> = self.get(url).await?;
        debug!(count = devices.len(), "listed devices");
        Ok(devices)
    }

    /// Block a device, optionally for a limited time (`"1h"`, `"30m"`).
    ///
    /// `POST /block` with `{"mac": "...", "duration": "..."}`. The
    /// duration key is left out entirely for an indefinite block.
    pub async fn block_device(&self, mac: &str, duration: Option<&str>) -> Result<(), Error> {
        let url = self.url("block")?;
        debug!(mac, ?duration, "blocking device");
        self.post(url, &BlockRequest { mac, duration }).await
    }

    /// Lift a block.
    ///
    /// `POST /unblock` with `{"mac": "..."}`
    pub async fn unblock_device(&self, mac: &str) -> Result<(), Error> {
        let url = self.url("unblock")?;
        debug!(mac, "unblocking device");
        self.post(url, &UnblockRequest { mac }).await
    }
}
