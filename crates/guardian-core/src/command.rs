// ── Command API ──
//
// Block/unblock requests flow through a `Command` enum. The controller's
// command processor routes each variant to the service and then refreshes
// the device collection exactly once.

use std::sync::Arc;

use tokio::sync::watch;

use crate::error::CoreError;
use crate::model::{BlockDuration, Device, MacAddress};

/// A command envelope sent through the command channel.
/// Carries the in-flight guard so the flag clears only after the
/// follow-up refresh, even if the caller stops waiting.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub guard: MutationGuard,
    pub response_tx: tokio::sync::oneshot::Sender<Result<CommandResult, CoreError>>,
}

/// A device mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Block a device; `None` means indefinitely.
    Block {
        mac: MacAddress,
        duration: Option<BlockDuration>,
    },
    Unblock {
        mac: MacAddress,
    },
}

impl Command {
    pub fn mac(&self) -> &MacAddress {
        match self {
            Self::Block { mac, .. } | Self::Unblock { mac } => mac,
        }
    }

    /// Past-tense description for notifications.
    pub fn describe(&self) -> String {
        match self {
            Self::Block {
                mac,
                duration: Some(d),
            } => format!("Blocked {mac} for {d}"),
            Self::Block {
                mac,
                duration: None,
            } => format!("Blocked {mac}"),
            Self::Unblock { mac } => format!("Unblocked {mac}"),
        }
    }
}

/// Outcome of a successful command.
#[derive(Debug, Clone)]
pub enum CommandResult {
    /// The device as seen by the follow-up refresh.
    Device(Arc<Device>),
    /// Accepted, but the device wasn't in the refreshed collection (or the
    /// refresh failed).
    Ok,
}

// ── In-flight guard ─────────────────────────────────────────────────

/// Exclusive claim on the single mutation slot. Dropping it clears the
/// in-flight flag.
pub(crate) struct MutationGuard {
    flag: Arc<watch::Sender<bool>>,
}

impl MutationGuard {
    /// Claim the slot, or `None` if a mutation is already in flight.
    pub(crate) fn acquire(flag: &Arc<watch::Sender<bool>>) -> Option<Self> {
        let claimed = flag.send_if_modified(|busy| {
            if *busy {
                false
            } else {
                *busy = true;
                true
            }
        });
        claimed.then(|| Self {
            flag: Arc::clone(flag),
        })
    }
}

impl Drop for MutationGuard {
    fn drop(&mut self) {
        self.flag.send_replace(false);
    }
}
