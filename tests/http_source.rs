//! HTTP source behavior against a mock fleet backend.

use std::sync::Arc;
use std::time::Duration;

use fleetwatch::data::{BandThresholds, BatteryBand, OnlineState};
use fleetwatch::{FetchError, HttpSource, PollEvent, Poller, TelemetrySource, ViewModel};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn robot(id: &str, online: bool, battery: u32) -> Value {
    json!({
        "robot_id": id,
        "online_status": online,
        "battery_percentage": battery,
        "cpu_usage": 42.5,
        "ram_consumption": 2048,
        "last_updated": "2024-12-12T11:00:00",
        "location_coordinates": [34.0522, -118.2437]
    })
}

fn source_for(server: &MockServer) -> HttpSource {
    HttpSource::builder()
        .endpoint(server.uri())
        .timeout(Duration::from_secs(2))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_fetch_returns_raw_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            robot("robot_1", true, 80),
            robot("robot_2", false, 10),
            { "robot_id": "broken" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let records = source_for(&server).fetch().await.unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[2]["robot_id"], "broken");
}

#[tokio::test]
async fn test_fetch_non_success_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = source_for(&server).fetch().await.unwrap_err();
    assert!(matches!(err, FetchError::Http(ref msg) if msg.contains("503")));
}

#[tokio::test]
async fn test_fetch_body_not_an_array() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "robots": [] })),
        )
        .mount(&server)
        .await;

    let err = source_for(&server).fetch().await.unwrap_err();
    assert!(matches!(err, FetchError::Parse(_)));
}

#[tokio::test]
async fn test_fetch_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let source = HttpSource::builder()
        .endpoint(server.uri())
        .timeout(Duration::from_millis(100))
        .build()
        .unwrap();
    let err = source.fetch().await.unwrap_err();
    assert_eq!(err, FetchError::Timeout);
}

#[tokio::test]
async fn test_fetch_unit_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots/robot_7"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(robot("robot_7", true, 55)),
        )
        .mount(&server)
        .await;

    let unit = source_for(&server).fetch_unit("robot_7").await.unwrap();
    assert_eq!(unit.id, "robot_7");
    assert!(unit.online);
    assert_eq!(unit.battery_pct, 55.0);
    assert_eq!(unit.ram_usage, 2048.0);
}

#[tokio::test]
async fn test_fetch_unit_error_body_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots/ghost"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "error": "Robot not found" })),
        )
        .mount(&server)
        .await;

    let err = source_for(&server).fetch_unit("ghost").await.unwrap_err();
    assert_eq!(err, FetchError::NotFound("ghost".to_string()));
}

#[tokio::test]
async fn test_fetch_unit_404_is_not_found() {
    let server = MockServer::start().await;

    let err = source_for(&server).fetch_unit("missing").await.unwrap_err();
    assert_eq!(err, FetchError::NotFound("missing".to_string()));
}

#[tokio::test]
async fn test_fetch_unit_malformed_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots/half"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "robot_id": "half" })),
        )
        .mount(&server)
        .await;

    let err = source_for(&server).fetch_unit("half").await.unwrap_err();
    assert!(matches!(err, FetchError::Parse(_)));
}

#[tokio::test]
async fn test_connection_refused() {
    // Bind then drop a listener so the port is closed.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let uri = format!("http://127.0.0.1:{port}");

    let source = HttpSource::builder().endpoint(uri).build().unwrap();
    let err = source.fetch().await.unwrap_err();
    assert!(matches!(err, FetchError::Connection(_)), "got {err:?}");
}

#[tokio::test]
async fn test_poll_cycle_into_view_model() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            robot("robot_1", true, 80),
            robot("robot_2", false, 10),
            robot("robot_3", true, 30),
            { "robot_id": "broken", "online_status": "yes" }
        ])))
        .mount(&server)
        .await;

    let (tx, mut rx) = tokio::sync::mpsc::channel(4);
    let handle = Poller::builder()
        .interval(Duration::from_secs(60))
        .build(Arc::new(source_for(&server)))
        .spawn(tx);

    let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    handle.stop();

    let PollEvent::Snapshot(ref snapshot) = event else {
        panic!("expected a snapshot, got {event:?}");
    };
    assert_eq!(snapshot.len(), 3);
    assert_eq!(snapshot.dropped, 1);

    let mut view = ViewModel::new(2, BandThresholds::default());
    view.apply_event(event);
    view.set_online_state(OnlineState::Online);

    let state = view.current();
    assert_eq!(state.matching, 2);
    assert_eq!(state.total_pages, 1);
    assert_eq!(state.units[1].unit.id, "robot_3");
    assert_eq!(state.units[1].display.battery_band, BatteryBand::Warning);
    assert_eq!(state.summary.offline, 1);
}
