//! Every state change in the dashboard is expressed as an [`Action`].

use std::sync::Arc;

use chrono::{DateTime, Utc};

use guardian_core::{BlockDuration, ConnectionState, Device, MacAddress, SortKey, WifiStatus};

use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// A toast notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Info,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Data events (from guardian-core) ──────────────────────────
    DevicesUpdated(Arc<Vec<Arc<Device>>>),
    WifiUpdated(WifiStatus),
    ConnectionChanged(ConnectionState),
    AutoRefreshChanged(bool),
    BusyChanged(bool),
    LastRefresh(Option<DateTime<Utc>>),

    // ── View ──────────────────────────────────────────────────────
    SearchChanged(String),
    ToggleSort(SortKey),
    NextPage,
    PrevPage,

    // ── Mutations ─────────────────────────────────────────────────
    Block {
        mac: MacAddress,
        duration: Option<BlockDuration>,
    },
    Unblock(MacAddress),

    // ── Global toggles ────────────────────────────────────────────
    Refresh,
    ToggleAutoRefresh,
    ToggleTheme,
    ThemeChanged(Theme),
    ToggleHelp,

    // ── Notifications ─────────────────────────────────────────────
    Notify(Notification),
    DismissNotification,
}
