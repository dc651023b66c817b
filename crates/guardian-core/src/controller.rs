// ── Controller abstraction ──
//
// Lifecycle of one dashboard session: HTTP client, device store, poll
// timer and the command processor that serializes mutations.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use guardian_api::{GuardianClient, TransportConfig};

use crate::command::{Command, CommandEnvelope, CommandResult, MutationGuard};
use crate::config::DashboardConfig;
use crate::error::CoreError;
use crate::model::{BlockDuration, Device, MacAddress, WifiStatus};
use crate::refresh::{AutoRefresh, RefreshFn};
use crate::store::DeviceStore;
use crate::stream::EntityStream;

const COMMAND_CHANNEL_SIZE: usize = 16;

// ── ConnectionState ──────────────────────────────────────────────

/// Connection state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    /// Connected, but the last request could not reach the service.
    Unreachable,
}

// ── Controller ───────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: DashboardConfig,
    store: Arc<DeviceStore>,
    connection_state: watch::Sender<ConnectionState>,
    /// `true` while a block/unblock (and its follow-up refresh) runs.
    in_flight: Arc<watch::Sender<bool>>,
    auto_refresh_state: watch::Sender<bool>,
    command_tx: Mutex<Option<mpsc::Sender<CommandEnvelope>>>,
    cancel: CancellationToken,
    /// Child token for the current connection; replaced on reconnect.
    cancel_child: Mutex<CancellationToken>,
    client: Mutex<Option<GuardianClient>>,
    auto_refresh: Mutex<Option<AutoRefresh>>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Controller {
    /// Create a new Controller. Does NOT connect; call
    /// [`connect()`](Self::connect) first.
    pub fn new(config: DashboardConfig) -> Self {
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);
        let (in_flight, _) = watch::channel(false);
        let (auto_refresh_state, _) = watch::channel(false);
        let cancel = CancellationToken::new();
        let cancel_child = cancel.child_token();

        Self {
            inner: Arc::new(ControllerInner {
                config,
                store: Arc::new(DeviceStore::new()),
                connection_state,
                in_flight: Arc::new(in_flight),
                auto_refresh_state,
                command_tx: Mutex::new(None),
                cancel,
                cancel_child: Mutex::new(cancel_child),
                client: Mutex::new(None),
                auto_refresh: Mutex::new(None),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<DeviceStore> {
        &self.inner.store
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Build the HTTP client and spawn the command processor.
    ///
    /// Performs no requests; [`start()`](Self::start) does the initial
    /// fetch and arms the poll timer.
    pub async fn connect(&self) -> Result<(), CoreError> {
        let config = &self.inner.config;
        config.validate()?;
        let _ = self
            .inner
            .connection_state
            .send_replace(ConnectionState::Connecting);

        let child = self.inner.cancel.child_token();
        *self.inner.cancel_child.lock().await = child.clone();

        let transport = TransportConfig {
            timeout: config.timeout,
            accept_invalid_certs: config.accept_invalid_certs,
        };
        let client = match GuardianClient::new(config.url.clone(), &transport) {
            Ok(client) => client,
            Err(e) => {
                let _ = self
                    .inner
                    .connection_state
                    .send_replace(ConnectionState::Disconnected);
                return Err(e.into());
            }
        };
        *self.inner.client.lock().await = Some(client);

        let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        *self.inner.command_tx.lock().await = Some(tx);
        let handle = tokio::spawn(command_processor_task(self.clone(), rx, child.clone()));
        self.inner.task_handles.lock().await.push(handle);

        *self.inner.auto_refresh.lock().await = Some(AutoRefresh::new(
            config.refresh_interval,
            child,
            self.poll_fn(),
        ));

        let _ = self
            .inner
            .connection_state
            .send_replace(ConnectionState::Connected);
        info!(url = %config.url, "connected");
        Ok(())
    }

    /// Initial fetch of devices and Wi-Fi, then arm the poll timer if
    /// auto-refresh is configured on. Fetch failures are logged, not fatal.
    pub async fn start(&self) {
        self.refresh_all().await;
        self.arm_timer(self.inner.config.auto_refresh).await;
    }

    /// Stop the poll timer and command processor.
    pub async fn disconnect(&self) {
        // Cancel the child token (not the parent; allows reconnect).
        self.inner.cancel_child.lock().await.cancel();

        if let Some(mut timer) = self.inner.auto_refresh.lock().await.take() {
            timer.stop();
        }
        self.inner.auto_refresh_state.send_replace(false);

        *self.inner.command_tx.lock().await = None;
        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        drop(handles);

        *self.inner.client.lock().await = None;
        let _ = self
            .inner
            .connection_state
            .send_replace(ConnectionState::Disconnected);
        debug!("disconnected");
    }

    /// One-shot: connect, run closure, disconnect. Polling stays off.
    pub async fn oneshot<F, Fut, T>(config: DashboardConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Controller) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let mut cfg = config;
        cfg.auto_refresh = false;

        let controller = Controller::new(cfg);
        controller.connect().await?;
        let result = f(controller.clone()).await;
        controller.disconnect().await;
        result
    }

    async fn client(&self) -> Result<GuardianClient, CoreError> {
        self.inner
            .client
            .lock()
            .await
            .clone()
            .ok_or(CoreError::Disconnected)
    }

    // ── Data refresh ─────────────────────────────────────────────

    /// Fetch the device collection and replace the store's copy.
    ///
    /// On error the previous collection is left untouched.
    pub async fn refresh_devices(&self) -> Result<usize, CoreError> {
        let client = self.client().await?;
        let result = client.list_devices().await.map_err(CoreError::from);
        self.note_reachability(result.as_ref().err());

        let devices: Vec<Device> = result?.into_iter().map(Device::from).collect();
        let count = devices.len();
        self.inner.store.replace_devices(devices);
        debug!(devices = count, "device collection replaced");
        Ok(count)
    }

    /// Fetch the SSID. Failures mark the badge `Unavailable`.
    pub async fn refresh_wifi(&self) -> Result<WifiStatus, CoreError> {
        let client = self.client().await?;
        let status = match client.get_wifi().await {
            Ok(info) => WifiStatus::from_ssid(info.ssid),
            Err(e) => {
                self.inner.store.set_wifi(WifiStatus::Unavailable);
                return Err(e.into());
            }
        };
        self.inner.store.set_wifi(status.clone());
        Ok(status)
    }

    /// Refresh devices and Wi-Fi concurrently, logging failures.
    pub async fn refresh_all(&self) {
        let (devices, wifi) = tokio::join!(self.poll_devices(), self.refresh_wifi());
        if let Err(e) = wifi {
            warn!(error = %e, "wifi lookup failed");
        }
        debug!(devices_ok = devices, "refresh complete");
    }

    /// `refresh_devices` with the error logged. Returns whether it succeeded.
    async fn poll_devices(&self) -> bool {
        match self.refresh_devices().await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "device refresh failed; keeping previous list");
                false
            }
        }
    }

    fn note_reachability(&self, error: Option<&CoreError>) {
        let next = match error {
            Some(e) if e.is_unreachable() => ConnectionState::Unreachable,
            Some(_) => return,
            None => ConnectionState::Connected,
        };
        self.inner.connection_state.send_if_modified(|state| {
            if *state == ConnectionState::Disconnected || *state == next {
                false
            } else {
                *state = next;
                true
            }
        });
    }

    /// Timer callback. Holds only a weak reference so an armed timer never
    /// keeps the controller alive.
    fn poll_fn(&self) -> RefreshFn {
        let weak = Arc::downgrade(&self.inner);
        Arc::new(move || {
            let weak = weak.clone();
            Box::pin(async move {
                if let Some(inner) = weak.upgrade() {
                    Controller { inner }.poll_devices().await;
                }
            })
        })
    }

    // ── Auto-refresh ─────────────────────────────────────────────

    /// Arm or disarm the poll timer. Returns the resulting state, which
    /// stays `false` when the configured period is zero. Switching on polls
    /// right away; the timer's first tick is a full period later.
    pub async fn set_auto_refresh(&self, enabled: bool) -> bool {
        let (was_armed, armed) = self.arm_timer(enabled).await;
        if armed && !was_armed {
            self.poll_devices().await;
        }
        armed
    }

    /// Returns the armed state before and after.
    async fn arm_timer(&self, enabled: bool) -> (bool, bool) {
        let mut guard = self.inner.auto_refresh.lock().await;
        let Some(timer) = guard.as_mut() else {
            return (false, false);
        };
        let was_armed = timer.is_enabled();
        timer.set_enabled(enabled);
        let armed = timer.is_enabled();
        self.inner.auto_refresh_state.send_replace(armed);
        info!(
            enabled = armed,
            period_secs = timer.period().as_secs(),
            "auto-refresh"
        );
        (was_armed, armed)
    }

    pub async fn toggle_auto_refresh(&self) -> bool {
        let current = *self.inner.auto_refresh_state.borrow();
        self.set_auto_refresh(!current).await
    }

    pub fn auto_refresh_enabled(&self) -> bool {
        *self.inner.auto_refresh_state.borrow()
    }

    pub fn auto_refresh(&self) -> watch::Receiver<bool> {
        self.inner.auto_refresh_state.subscribe()
    }

    // ── Command execution ────────────────────────────────────────

    /// Execute a mutation.
    ///
    /// Fails fast with [`CoreError::MutationInFlight`] if another mutation
    /// hasn't finished. Success or failure, the processor refreshes the
    /// device collection exactly once before answering.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        if *self.inner.connection_state.borrow() == ConnectionState::Disconnected {
            return Err(CoreError::Disconnected);
        }

        let guard =
            MutationGuard::acquire(&self.inner.in_flight).ok_or(CoreError::MutationInFlight)?;
        let cmd = self.with_reported_mac(cmd);

        let command_tx = self
            .inner
            .command_tx
            .lock()
            .await
            .clone()
            .ok_or(CoreError::Disconnected)?;

        let (tx, rx) = tokio::sync::oneshot::channel();
        command_tx
            .send(CommandEnvelope {
                command: cmd,
                guard,
                response_tx: tx,
            })
            .await
            .map_err(|_| CoreError::Disconnected)?;

        rx.await.map_err(|_| CoreError::Disconnected)?
    }

    /// The service matches MACs by exact string, so mutations carry the
    /// spelling from the last fetch when the typed one differs.
    fn with_reported_mac(&self, cmd: Command) -> Command {
        let Some(device) = self.inner.store.device_by_mac(cmd.mac()) else {
            return cmd;
        };
        let mac = device.mac.clone();
        match cmd {
            Command::Block { duration, .. } => Command::Block { mac, duration },
            Command::Unblock { .. } => Command::Unblock { mac },
        }
    }

    /// Map a typed MAC to the service's spelling, fetching once if the
    /// device isn't known yet. Falls back to the typed value.
    pub async fn resolve_mac(&self, typed: &MacAddress) -> MacAddress {
        if let Some(device) = self.inner.store.device_by_mac(typed) {
            return device.mac.clone();
        }
        if let Err(e) = self.refresh_devices().await {
            debug!(error = %e, "device lookup refresh failed");
        }
        self.inner
            .store
            .device_by_mac(typed)
            .map_or_else(|| typed.clone(), |d| d.mac.clone())
    }

    pub async fn block(
        &self,
        mac: MacAddress,
        duration: Option<BlockDuration>,
    ) -> Result<CommandResult, CoreError> {
        self.execute(Command::Block { mac, duration }).await
    }

    pub async fn unblock(&self, mac: MacAddress) -> Result<CommandResult, CoreError> {
        self.execute(Command::Unblock { mac }).await
    }

    /// Whether a mutation is in flight right now.
    pub fn is_busy(&self) -> bool {
        *self.inner.in_flight.borrow()
    }

    /// Subscribe to the in-flight flag.
    pub fn mutation_in_flight(&self) -> watch::Receiver<bool> {
        self.inner.in_flight.subscribe()
    }

    // ── State observation ────────────────────────────────────────

    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    pub fn devices(&self) -> EntityStream<Device> {
        self.inner.store.subscribe_devices()
    }

    pub fn devices_snapshot(&self) -> Arc<Vec<Arc<Device>>> {
        self.inner.store.devices_snapshot()
    }

    pub fn wifi(&self) -> watch::Receiver<WifiStatus> {
        self.inner.store.subscribe_wifi()
    }

    /// Fetch fresh data and look one device up by MAC.
    pub async fn get_device(&self, mac: &MacAddress) -> Result<Arc<Device>, CoreError> {
        self.refresh_devices().await?;
        self.inner
            .store
            .device_by_mac(mac)
            .ok_or_else(|| CoreError::DeviceNotFound {
                identifier: mac.to_string(),
            })
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Process commands one at a time until cancelled.
async fn command_processor_task(
    controller: Controller,
    mut rx: mpsc::Receiver<CommandEnvelope>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                let result = route_command(&controller, envelope.command).await;
                drop(envelope.guard);
                let _ = envelope.response_tx.send(result);
            }
        }
    }
}

// ── Command routing ──────────────────────────────────────────────

/// Send a command to the service, then refresh exactly once.
async fn route_command(controller: &Controller, cmd: Command) -> Result<CommandResult, CoreError> {
    let client = controller.client().await?;

    let outcome = match &cmd {
        Command::Block { mac, duration } => {
            let duration = duration.map(|d| d.to_string());
            client.block_device(mac.as_str(), duration.as_deref()).await
        }
        Command::Unblock { mac } => client.unblock_device(mac.as_str()).await,
    }
    .map_err(CoreError::from);

    match &outcome {
        Ok(()) => info!(mac = %cmd.mac(), "{}", cmd.describe()),
        Err(e) => warn!(mac = %cmd.mac(), error = %e, "command failed"),
    }

    let refreshed = controller.poll_devices().await;
    outcome?;

    let device = refreshed
        .then(|| controller.inner.store.device_by_mac(cmd.mac()))
        .flatten();
    Ok(device.map_or(CommandResult::Ok, CommandResult::Device))
}
