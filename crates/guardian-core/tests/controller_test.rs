#![allow(clippy::unwrap_used)]
// Controller behaviour against a mocked Router Guardian service.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use guardian_core::{
    CommandResult, ConnectionState, Controller, CoreError, DashboardConfig, DeviceStatus,
    MacAddress, WifiStatus,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn config(server: &MockServer) -> DashboardConfig {
    let mut config = DashboardConfig::new(Url::parse(&server.uri()).unwrap());
    config.auto_refresh = false;
    config.timeout = Duration::from_secs(5);
    config
}

async fn count_requests(server: &MockServer, p: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == p)
        .count()
}

async fn mount_devices(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_wifi(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/wifi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ssid": "HomeNet" })))
        .mount(server)
        .await;
}

async fn connected(server: &MockServer) -> Controller {
    let controller = Controller::new(config(server));
    controller.connect().await.unwrap();
    controller.start().await;
    controller
}

// ── Lifecycle ───────────────────────────────────────────────────────

#[tokio::test]
async fn start_fetches_devices_and_wifi_once() {
    let server = MockServer::start().await;
    mount_devices(
        &server,
        json!([
            { "mac": "aa:aa:aa:aa:aa:01", "status": "online", "hostname": "laptop" },
            { "mac": "aa:aa:aa:aa:aa:02", "status": "blocked" }
        ]),
    )
    .await;
    mount_wifi(&server).await;

    let controller = connected(&server).await;

    assert_eq!(controller.devices_snapshot().len(), 2);
    assert_eq!(*controller.wifi().borrow(), WifiStatus::Connected("HomeNet".into()));
    assert_eq!(count_requests(&server, "/devices").await, 1);
    assert_eq!(count_requests(&server, "/wifi").await, 1);
    assert!(!controller.auto_refresh_enabled());

    controller.disconnect().await;
    assert_eq!(*controller.connection_state().borrow(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn connect_marks_connected_with_no_observers() {
    let server = MockServer::start().await;
    mount_devices(&server, json!([{ "mac": "aa", "status": "blocked" }])).await;
    Mock::given(method("POST"))
        .and(path("/unblock"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let controller = Controller::new(config(&server));
    controller.connect().await.unwrap();
    assert_eq!(*controller.connection_state().borrow(), ConnectionState::Connected);

    // No start() and nobody subscribed: mutations must still go through.
    controller.unblock(MacAddress::new("aa")).await.unwrap();

    controller.disconnect().await;
    assert_eq!(*controller.connection_state().borrow(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn failed_refresh_keeps_previous_collection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/devices"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "mac": "aa", "status": "online" }])),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/devices"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_wifi(&server).await;

    let controller = connected(&server).await;
    assert_eq!(controller.devices_snapshot().len(), 1);

    let err = controller.refresh_devices().await.unwrap_err();
    assert!(matches!(err, CoreError::Api { status: Some(500), .. }));
    assert_eq!(controller.devices_snapshot().len(), 1);
}

#[tokio::test]
async fn wifi_failure_shows_unavailable() {
    let server = MockServer::start().await;
    mount_devices(&server, json!([])).await;
    Mock::given(method("GET"))
        .and(path("/wifi"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let controller = connected(&server).await;
    assert_eq!(*controller.wifi().borrow(), WifiStatus::Unavailable);
}

#[tokio::test]
async fn execute_requires_connection() {
    let server = MockServer::start().await;
    let controller = Controller::new(config(&server));
    let err = controller
        .unblock(MacAddress::new("aa:bb:cc:dd:ee:ff"))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Disconnected));
}

// ── Mutations ───────────────────────────────────────────────────────

#[tokio::test]
async fn block_refreshes_exactly_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/devices"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "mac": "AA-BB-CC-DD-EE-FF", "status": "online" }])),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_devices(
        &server,
        json!([{ "mac": "AA-BB-CC-DD-EE-FF", "status": "blocked" }]),
    )
    .await;
    mount_wifi(&server).await;
    // The service compares MACs as strings; its own spelling goes back.
    Mock::given(method("POST"))
        .and(path("/block"))
        .and(body_json(json!({ "mac": "AA-BB-CC-DD-EE-FF", "duration": "1h" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let controller = connected(&server).await;
    let result = controller
        .block(MacAddress::new("aa:bb:cc:dd:ee:ff"), "1h".parse().ok())
        .await
        .unwrap();

    match result {
        CommandResult::Device(device) => {
            assert_eq!(device.status, DeviceStatus::Blocked);
            assert_eq!(device.mac.as_str(), "AA-BB-CC-DD-EE-FF");
        }
        CommandResult::Ok => panic!("expected refreshed device"),
    }
    // One fetch on start, one after the mutation.
    assert_eq!(count_requests(&server, "/devices").await, 2);
    assert!(!controller.is_busy());
}

#[tokio::test]
async fn failed_unblock_still_refreshes_once() {
    let server = MockServer::start().await;
    mount_devices(&server, json!([{ "mac": "aa", "status": "blocked" }])).await;
    mount_wifi(&server).await;
    Mock::given(method("POST"))
        .and(path("/unblock"))
        .respond_with(ResponseTemplate::new(500).set_body_string("router said no"))
        .mount(&server)
        .await;

    let controller = connected(&server).await;
    let err = controller.unblock(MacAddress::new("aa")).await.unwrap_err();

    assert!(matches!(err, CoreError::Api { status: Some(500), .. }));
    assert_eq!(count_requests(&server, "/devices").await, 2);
    assert!(!controller.is_busy());
}

#[tokio::test]
async fn second_mutation_is_rejected_while_in_flight() {
    let server = MockServer::start().await;
    mount_devices(&server, json!([{ "mac": "aa", "status": "online" }])).await;
    mount_wifi(&server).await;
    Mock::given(method("POST"))
        .and(path("/block"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(300)))
        .expect(1)
        .mount(&server)
        .await;

    let controller = connected(&server).await;
    let mut busy = controller.mutation_in_flight();

    let first = tokio::spawn({
        let controller = controller.clone();
        async move { controller.block(MacAddress::new("aa"), None).await }
    });
    tokio::time::timeout(Duration::from_secs(5), busy.wait_for(|b| *b))
        .await
        .unwrap()
        .unwrap();

    let second = controller.unblock(MacAddress::new("aa")).await;
    assert!(matches!(second, Err(CoreError::MutationInFlight)));

    first.await.unwrap().unwrap();
    assert!(!controller.is_busy());
    assert_eq!(count_requests(&server, "/unblock").await, 0);
}

// ── Auto-refresh ────────────────────────────────────────────────────

#[tokio::test]
async fn toggling_auto_refresh_reports_state() {
    let server = MockServer::start().await;
    mount_devices(&server, json!([])).await;
    mount_wifi(&server).await;

    let controller = connected(&server).await;
    assert!(!controller.auto_refresh_enabled());
    assert_eq!(count_requests(&server, "/devices").await, 1);

    // Switching on fetches immediately instead of waiting a full period.
    assert!(controller.toggle_auto_refresh().await);
    assert!(*controller.auto_refresh().borrow());
    assert_eq!(count_requests(&server, "/devices").await, 2);

    assert!(!controller.toggle_auto_refresh().await);
    assert_eq!(count_requests(&server, "/devices").await, 2);

    controller.disconnect().await;
    assert!(!controller.auto_refresh_enabled());
}

#[tokio::test]
async fn start_with_auto_refresh_fetches_once() {
    let server = MockServer::start().await;
    mount_devices(&server, json!([])).await;
    mount_wifi(&server).await;

    let mut cfg = config(&server);
    cfg.auto_refresh = true;
    let controller = Controller::new(cfg);
    controller.connect().await.unwrap();
    controller.start().await;

    assert!(controller.auto_refresh_enabled());
    assert_eq!(count_requests(&server, "/devices").await, 1);
    controller.disconnect().await;
}

#[tokio::test]
async fn oneshot_never_arms_the_timer() {
    let server = MockServer::start().await;
    mount_devices(&server, json!([{ "mac": "aa", "status": "offline" }])).await;

    let mut cfg = config(&server);
    cfg.auto_refresh = true;
    let device = Controller::oneshot(cfg, |c| async move {
        assert!(!c.auto_refresh_enabled());
        c.get_device(&MacAddress::new("AA")).await
    })
    .await
    .unwrap();
    assert_eq!(device.status, DeviceStatus::Offline);
}
