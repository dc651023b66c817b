use std::fmt;

/// Wi-Fi badge state shown in the dashboard header.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WifiStatus {
    /// No answer from `/wifi` yet.
    #[default]
    Fetching,
    Connected(String),
    Unavailable,
}

impl WifiStatus {
    /// Map the service's answer; blank names count as unavailable.
    pub fn from_ssid(ssid: Option<String>) -> Self {
        match ssid.map(|s| s.trim().to_owned()) {
            Some(s) if !s.is_empty() && s != "Unavailable" => Self::Connected(s),
            _ => Self::Unavailable,
        }
    }

    pub fn ssid(&self) -> Option<&str> {
        match self {
            Self::Connected(ssid) => Some(ssid),
            _ => None,
        }
    }
}

impl fmt::Display for WifiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetching => f.write_str("Fetching..."),
            Self::Connected(ssid) => f.write_str(ssid),
            Self::Unavailable => f.write_str("Unavailable"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_ssid_is_unavailable() {
        assert_eq!(WifiStatus::from_ssid(None), WifiStatus::Unavailable);
        assert_eq!(WifiStatus::from_ssid(Some("  ".into())), WifiStatus::Unavailable);
        assert_eq!(
            WifiStatus::from_ssid(Some("HomeNet".into())).to_string(),
            "HomeNet"
        );
        assert_eq!(WifiStatus::default().to_string(), "Fetching...");
    }
}
