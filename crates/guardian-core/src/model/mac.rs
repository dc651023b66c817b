// MacAddress is the join key for every block/unblock operation and the
// identity of a table row. The service's spelling is kept verbatim and sent
// back unchanged; only comparisons against user-typed input normalize.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// MAC address exactly as reported by the service (or typed by the user).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct MacAddress(String);

impl MacAddress {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Comparison form: lowercase, colon-separated. Accepts colon, dash or
    /// bare-hex spellings; anything else is only trimmed and lowercased.
    pub fn canonical(&self) -> String {
        let cleaned = self.0.trim().to_lowercase().replace('-', ":");
        let bare = cleaned.len() == 12 && cleaned.chars().all(|c| c.is_ascii_hexdigit());
        if bare {
            let pairs: Vec<&str> = (0..6).filter_map(|i| cleaned.get(i * 2..i * 2 + 2)).collect();
            return pairs.join(":");
        }
        cleaned
    }

    /// Same device regardless of case or separator style.
    pub fn matches(&self, other: &MacAddress) -> bool {
        self.0 == other.0 || self.canonical() == other.canonical()
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for MacAddress {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<String> for MacAddress {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for MacAddress {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<MacAddress> for String {
    fn from(mac: MacAddress) -> Self {
        mac.0
    }
}
