//! Data bridge: connects [`Controller`] watch channels to TUI actions.
//!
//! Connects, performs the initial fetch, then forwards every change to
//! devices, Wi-Fi, connection state, the auto-refresh toggle and the
//! in-flight flag as an [`Action`] until cancelled.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use guardian_core::{ConnectionState, Controller};

use crate::action::{Action, Notification};

pub async fn spawn_data_bridge(
    controller: Controller,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    let _ = action_tx.send(Action::ConnectionChanged(ConnectionState::Connecting));

    if let Err(e) = controller.connect().await {
        warn!(error = %e, "failed to set up the service client");
        let _ = action_tx.send(Action::ConnectionChanged(ConnectionState::Disconnected));
        let _ = action_tx.send(Action::Notify(Notification::error(e.to_string())));
        return;
    }

    let mut devices = controller.devices();
    let mut wifi = controller.wifi();
    let mut conn_state = controller.connection_state();
    let mut auto_refresh = controller.auto_refresh();
    let mut busy = controller.mutation_in_flight();
    let mut last_refresh = controller.store().subscribe_last_refresh();

    let _ = action_tx.send(Action::ConnectionChanged(*conn_state.borrow_and_update()));

    // Initial fetch, then the timer is armed if configured.
    tokio::select! {
        biased;
        () = cancel.cancelled() => {
            controller.disconnect().await;
            return;
        }
        () = controller.start() => {}
    }

    // Push snapshots taken after the initial fetch so the table fills in
    // even if the watch notifications were consumed above.
    let _ = action_tx.send(Action::DevicesUpdated(devices.latest()));
    let _ = action_tx.send(Action::WifiUpdated(wifi.borrow_and_update().clone()));
    let _ = action_tx.send(Action::AutoRefreshChanged(*auto_refresh.borrow_and_update()));
    let _ = action_tx.send(Action::LastRefresh(*last_refresh.borrow_and_update()));

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            Some(d) = devices.changed() => {
                debug!(devices = d.len(), "dispatching DevicesUpdated");
                let _ = action_tx.send(Action::DevicesUpdated(d));
            }
            Ok(()) = wifi.changed() => {
                let status = wifi.borrow_and_update().clone();
                let _ = action_tx.send(Action::WifiUpdated(status));
            }
            Ok(()) = busy.changed() => {
                let flag = *busy.borrow_and_update();
                let _ = action_tx.send(Action::BusyChanged(flag));
            }
            Ok(()) = auto_refresh.changed() => {
                let enabled = *auto_refresh.borrow_and_update();
                let _ = action_tx.send(Action::AutoRefreshChanged(enabled));
            }
            Ok(()) = last_refresh.changed() => {
                let at = *last_refresh.borrow_and_update();
                let _ = action_tx.send(Action::LastRefresh(at));
            }
            Ok(()) = conn_state.changed() => {
                let state = *conn_state.borrow_and_update();
                let _ = action_tx.send(Action::ConnectionChanged(state));
            }
        }
    }

    controller.disconnect().await;
    debug!("data bridge shut down");
}
