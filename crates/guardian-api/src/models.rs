// Router Guardian wire types
//
// Payloads exchanged with the device service. Every device field except
// `mac` is optional on the wire; `#[serde(default)]` keeps older backends
// (which omit `status` or the tracking timestamps) deserializable.

use serde::{Deserialize, Serialize};

// ── Device ───────────────────────────────────────────────────────────

/// A device record from `GET /devices`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiDevice {
    pub mac: String,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    /// `online`, `offline`, `blocked` or `scheduled`.
    #[serde(default)]
    pub status: Option<String>,
    /// Free-text duration, typically a Python `timedelta` rendering
    /// such as `"4 days, 2:23:19.137918"`.
    #[serde(default)]
    pub online_duration: Option<String>,
    #[serde(default)]
    pub blocked: Option<bool>,
    /// ISO-8601 timestamp, usually without an offset.
    #[serde(default)]
    pub first_seen: Option<String>,
    #[serde(default)]
    pub last_seen: Option<String>,
}

// ── Wi-Fi ────────────────────────────────────────────────────────────

/// Response of `GET /wifi`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WifiInfo {
    #[serde(default)]
    pub ssid: Option<String>,
}

// ── Commands ─────────────────────────────────────────────────────────

/// Body of `POST /block`. `duration` is omitted for an indefinite block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockRequest<'a> {
    pub mac: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<&'a str>,
}

/// Body of `POST /unblock`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnblockRequest<'a> {
    pub mac: &'a str,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn device_with_missing_fields_deserializes() {
        let device: ApiDevice = serde_json::from_value(json!({ "mac": "aa:bb" })).unwrap();
        assert_eq!(device.mac, "aa:bb");
        assert!(device.hostname.is_none());
        assert!(device.status.is_none());
        assert!(device.online_duration.is_none());
    }

    #[test]
    fn block_request_omits_absent_duration() {
        let body = serde_json::to_value(BlockRequest {
            mac: "aa:bb",
            duration: None,
        })
        .unwrap();
        assert_eq!(body, json!({ "mac": "aa:bb" }));

        let body = serde_json::to_value(BlockRequest {
            mac: "aa:bb",
            duration: Some("30m"),
        })
        .unwrap();
        assert_eq!(body, json!({ "mac": "aa:bb", "duration": "30m" }));
    }
}
