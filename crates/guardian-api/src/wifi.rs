use tracing::debug;

use crate::client::GuardianClient;
use crate::error::Error;
use crate::models::WifiInfo;

impl GuardianClient {
    /// Name of the Wi-Fi network the service host is connected to.
    ///
    /// `GET /wifi`
    pub async fn get_wifi(&self) -> Result<WifiInfo, Error> {
        let url = self.url("wifi")?;
        let info: WifiInfo = self.get(url).await?;
        debug!(ssid = ?info.ssid, "fetched wifi info");
        Ok(info)
    }
}
