//! Device model and dashboard logic for Router Guardian, shared by the CLI
//! and the TUI.
//!
//! - **[`Controller`]**: facade over the device service. [`connect()`](Controller::connect)
//!   builds the HTTP client and command processor, [`start()`](Controller::start)
//!   performs the initial fetch and arms the poll timer.
//!   [`Controller::oneshot()`] runs a single CLI request without polling.
//!
//! - **[`DeviceStore`]**: the raw device collection behind a `watch` channel.
//!   Every successful poll replaces it wholesale.
//!
//! - **[`AutoRefresh`]**: the poll timer as a scoped resource. At most one
//!   timer task is alive; disabling or dropping the handle cancels it.
//!
//! - **[`ViewState`]**: search, sort and page inputs. [`ViewState::derive`]
//!   runs filter, sort and paginate over a snapshot.
//!
//! - **[`Command`]**: block/unblock mutations routed through an `mpsc`
//!   channel. A single in-flight guard rejects overlapping mutations, and
//!   each mutation is followed by exactly one refresh.

pub mod command;
pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod model;
pub mod refresh;
pub mod store;
pub mod stream;
pub mod view;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{Command, CommandResult};
pub use config::{BlockDurationPolicy, DashboardConfig};
pub use controller::{ConnectionState, Controller};
pub use error::CoreError;
pub use refresh::AutoRefresh;
pub use store::DeviceStore;
pub use stream::EntityStream;
pub use view::{DeviceView, SortDirection, SortKey, ViewState};

pub use model::{
    BlockDuration, Device, DeviceAction, DeviceStatus, MacAddress, OnlineDuration, RowClass,
    WifiStatus,
};
