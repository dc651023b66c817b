// ── Runtime dashboard configuration ──
//
// Describes how to reach the service and how the dashboard behaves.
// Never touches disk: the CLI/TUI build a `DashboardConfig` from
// `guardian-config` and hand it in.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::error::CoreError;
use crate::model::BlockDuration;

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_PAGE_SIZE: usize = 5;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where a block's duration comes from when the user presses Block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockDurationPolicy {
    /// Ask every time; an empty answer cancels.
    #[default]
    Prompt,
    /// Never send a duration.
    Indefinite,
    /// Always use this duration.
    Fixed(BlockDuration),
}

impl FromStr for BlockDurationPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prompt" => Ok(Self::Prompt),
            "indefinite" | "forever" | "none" => Ok(Self::Indefinite),
            other => other.parse().map(Self::Fixed),
        }
    }
}

impl fmt::Display for BlockDurationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prompt => f.write_str("prompt"),
            Self::Indefinite => f.write_str("indefinite"),
            Self::Fixed(d) => write!(f, "{d}"),
        }
    }
}

/// Configuration for one dashboard session.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Service origin, e.g. `http://localhost:5000`.
    pub url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Poll period. Zero disables polling entirely.
    pub refresh_interval: Duration,
    /// Initial state of the auto-refresh toggle.
    pub auto_refresh: bool,
    pub page_size: usize,
    pub block_duration: BlockDurationPolicy,
    pub accept_invalid_certs: bool,
}

impl DashboardConfig {
    /// Defaults for everything but the URL.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            timeout: DEFAULT_TIMEOUT,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            auto_refresh: true,
            page_size: DEFAULT_PAGE_SIZE,
            block_duration: BlockDurationPolicy::default(),
            accept_invalid_certs: false,
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.page_size == 0 {
            return Err(CoreError::Config {
                message: "page size must be at least 1".into(),
            });
        }
        if !matches!(self.url.scheme(), "http" | "https") {
            return Err(CoreError::Config {
                message: format!("unsupported URL scheme: {}", self.url.scheme()),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn block_policy_parsing() {
        assert_eq!(
            "prompt".parse::<BlockDurationPolicy>().unwrap(),
            BlockDurationPolicy::Prompt
        );
        assert_eq!(
            "Indefinite".parse::<BlockDurationPolicy>().unwrap(),
            BlockDurationPolicy::Indefinite
        );
        let fixed = "45m".parse::<BlockDurationPolicy>().unwrap();
        assert_eq!(fixed.to_string(), "45m");
        assert!("sometimes".parse::<BlockDurationPolicy>().is_err());
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let mut config = DashboardConfig::new(Url::parse("http://localhost:5000").unwrap());
        assert!(config.validate().is_ok());
        config.page_size = 0;
        assert!(config.validate().is_err());
    }
}
