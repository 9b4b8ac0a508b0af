//! Integration tests for the BusTime client and report (wiremock-based)

use std::time::Duration;

use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bus_status::config::{BusTimeConfig, StopQuery};
use bus_status::error::{BusTimeError, EXIT_TRANSPORT_ERROR, exit_code_for};
use bus_status::fetch::MAX_ERROR_BODY_BYTES;
use bus_status::infra::bustime::BusTimeClient;
use bus_status::output::{HURRY_MESSAGE, MissingVehiclePolicy, NO_BUSES_MESSAGE, write_report};
use bus_status::services::transit_api::TransitApi;
use bus_status::stops::STOPS;

const API_KEY: &str = "test-key";

fn client_for_mock(base_url: &str) -> BusTimeClient {
    let config = BusTimeConfig::new(base_url, API_KEY.to_string(), Some(Duration::from_secs(5)))
        .unwrap();
    BusTimeClient::new(&config).unwrap()
}

fn query() -> StopQuery {
    StopQuery::new(STOPS[0], "MTABC", "q18")
}

fn stop_body(visits: &[(&str, u32)]) -> Value {
    let visits: Vec<Value> = visits
        .iter()
        .map(|(vehicle_ref, stops_away)| {
            json!({
                "MonitoredVehicleJourney": {
                    "LineRef": "MTABC_Q18",
                    "PublishedLineName": "Q18",
                    "VehicleRef": vehicle_ref,
                    "MonitoredCall": {
                        "StopPointName": "30 AV/36 ST",
                        "Extensions": { "Distances": { "StopsFromCall": stops_away } }
                    }
                }
            })
        })
        .collect();
    json!({ "Siri": { "ServiceDelivery": {
        "StopMonitoringDelivery": [{ "MonitoredStopVisit": visits }]
    }}})
}

fn vehicle_body(vehicle_ref: &str, stop_name: &str) -> Value {
    json!({ "Siri": { "ServiceDelivery": { "VehicleMonitoringDelivery": [{
        "VehicleActivity": [{ "MonitoredVehicleJourney": {
            "VehicleRef": vehicle_ref,
            "MonitoredCall": { "StopPointName": stop_name }
        }}]
    }]}}})
}

fn empty_vehicle_body() -> Value {
    json!({ "Siri": { "ServiceDelivery": { "VehicleMonitoringDelivery": [{ "VehicleActivity": [] }] }}})
}

async fn mount_stop(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path("/stop-monitoring.json"))
        .and(query_param("key", API_KEY))
        .and(query_param("OperatorRef", "MTA"))
        .and(query_param("MonitoringRef", "550601"))
        .and(query_param("LineRef", "MTABC_Q18"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_vehicle(server: &MockServer, body: Value, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/vehicle-monitoring.json"))
        .and(query_param("key", API_KEY))
        .and(query_param("LineRef", "MTABC_Q18"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn report(server: &MockServer, policy: MissingVehiclePolicy) -> (anyhow::Result<()>, String) {
    let client = client_for_mock(&server.uri());
    let mut out = Vec::new();
    let result = write_report(&client, &query(), policy, &mut out).await;
    (result, String::from_utf8(out).unwrap())
}

#[tokio::test]
async fn test_close_bus_report() {
    let server = MockServer::start().await;
    mount_stop(&server, stop_body(&[("MTABC_6045", 3)])).await;
    mount_vehicle(&server, vehicle_body("MTABC_6045", "Main St & 1st Ave"), 1).await;

    let (result, out) = report(&server, MissingVehiclePolicy::Skip).await;

    result.unwrap();
    assert_eq!(
        out,
        "There is a Q18 bus 3 stops away at Main St & 1st Ave.\nYou better get moving!\n"
    );
}

#[tokio::test]
async fn test_far_bus_report() {
    let server = MockServer::start().await;
    mount_stop(&server, stop_body(&[("MTABC_6045", 7)])).await;
    mount_vehicle(&server, vehicle_body("MTABC_6045", "Main St & 1st Ave"), 1).await;

    let (result, out) = report(&server, MissingVehiclePolicy::Skip).await;

    result.unwrap();
    assert_eq!(out, "There is a Q18 bus 7 stops away at Main St & 1st Ave.\n");
    assert!(!out.contains(HURRY_MESSAGE));
}

#[tokio::test]
async fn test_only_first_three_visits_reported() {
    let server = MockServer::start().await;
    let visits = [
        ("MTABC_1", 9),
        ("MTABC_2", 10),
        ("MTABC_3", 11),
        ("MTABC_4", 12),
        ("MTABC_5", 13),
    ];
    mount_stop(&server, stop_body(&visits)).await;
    mount_vehicle(&server, vehicle_body("MTABC_1", "Northern Blvd"), 3).await;

    let (result, out) = report(&server, MissingVehiclePolicy::Skip).await;

    result.unwrap();
    let lines: Vec<_> = out.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("9 stops away"));
    assert!(lines[1].contains("10 stops away"));
    assert!(lines[2].contains("11 stops away"));
}

#[tokio::test]
async fn test_invalid_key_skips_vehicle_lookups() {
    let server = MockServer::start().await;
    mount_stop(
        &server,
        serde_json::from_str(include_str!("fixtures/invalid_key.json")).unwrap(),
    )
    .await;
    mount_vehicle(&server, empty_vehicle_body(), 0).await;

    let (result, out) = report(&server, MissingVehiclePolicy::Skip).await;

    let err = result.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BusTimeError>(),
        Some(BusTimeError::InvalidApiKey)
    ));
    assert_eq!(err.to_string(), "Invalid MTA API key, please try again.");
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_error_condition_reported_verbatim() {
    let server = MockServer::start().await;
    mount_stop(
        &server,
        serde_json::from_str(include_str!("fixtures/error_condition.json")).unwrap(),
    )
    .await;
    mount_vehicle(&server, empty_vehicle_body(), 0).await;

    let (result, _) = report(&server, MissingVehiclePolicy::Skip).await;

    match result.unwrap_err().downcast::<BusTimeError>() {
        Ok(BusTimeError::Upstream { description }) => {
            assert_eq!(description, "No such stop: MTA_999999");
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_no_buses_coming() {
    let server = MockServer::start().await;
    mount_stop(&server, stop_body(&[])).await;
    mount_vehicle(&server, empty_vehicle_body(), 0).await;

    let (result, out) = report(&server, MissingVehiclePolicy::Skip).await;

    result.unwrap();
    assert_eq!(out, format!("{NO_BUSES_MESSAGE}\n"));
}

#[tokio::test]
async fn test_missing_vehicle_skipped() {
    let server = MockServer::start().await;
    mount_stop(&server, stop_body(&[("MTABC_6045", 2), ("MTABC_6046", 8)])).await;
    mount_vehicle(&server, empty_vehicle_body(), 2).await;

    let (result, out) = report(&server, MissingVehiclePolicy::Skip).await;

    result.unwrap();
    assert_eq!(
        out,
        "There is a Q18 bus 2 stops away (current location unknown).\n\
         You better get moving!\n\
         There is a Q18 bus 8 stops away (current location unknown).\n"
    );
}

#[tokio::test]
async fn test_missing_vehicle_aborts() {
    let server = MockServer::start().await;
    mount_stop(&server, stop_body(&[("MTABC_6045", 2), ("MTABC_6046", 8)])).await;
    mount_vehicle(&server, empty_vehicle_body(), 1).await;

    let (result, out) = report(&server, MissingVehiclePolicy::Abort).await;

    let err = result.unwrap_err();
    assert_eq!(
        err.to_string(),
        "No vehicle found for ref=MTABC_6045, line=MTABC_Q18"
    );
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_server_error_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stop-monitoring.json"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let client = client_for_mock(&server.uri());
    let err = client.stop_visits(550601, "MTABC_Q18").await.unwrap_err();

    assert!(matches!(err, BusTimeError::Status { status: 500, ref body } if body == "upstream down"));
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_forbidden_is_invalid_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stop-monitoring.json"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let client = client_for_mock(&server.uri());
    let err = client.stop_visits(550601, "MTABC_Q18").await.unwrap_err();

    assert!(matches!(err, BusTimeError::InvalidApiKey));
}

#[tokio::test]
async fn test_non_json_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stop-monitoring.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let (result, _) = report(&server, MissingVehiclePolicy::Skip).await;

    let err = result.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BusTimeError>(),
        Some(BusTimeError::MalformedResponse(_))
    ));
    assert_eq!(exit_code_for(&err), EXIT_TRANSPORT_ERROR);
}

#[tokio::test]
async fn test_unreachable_host_is_transport_error() {
    // Nothing listens on the discard port.
    let client = client_for_mock("http://127.0.0.1:9");
    let err = client.stop_visits(550601, "MTABC_Q18").await.unwrap_err();

    assert!(matches!(err, BusTimeError::Transport(_)));
}

#[tokio::test]
async fn test_transport_error_does_not_expose_key() {
    let config = BusTimeConfig::new(
        "http://127.0.0.1:9",
        "s3cretKEY".to_string(),
        Some(Duration::from_secs(5)),
    )
    .unwrap();
    let client = BusTimeClient::new(&config).unwrap();

    let err = client.stop_visits(550601, "MTABC_Q18").await.unwrap_err();

    assert!(matches!(err, BusTimeError::Transport(_)));
    assert!(!err.to_string().contains("s3cretKEY"));
    assert!(!format!("{err:?}").contains("s3cretKEY"));
}

#[tokio::test]
async fn test_status_error_body_is_capped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stop-monitoring.json"))
        .respond_with(ResponseTemplate::new(502).set_body_string("e".repeat(100_000)))
        .mount(&server)
        .await;

    let client = client_for_mock(&server.uri());
    let err = client.stop_visits(550601, "MTABC_Q18").await.unwrap_err();

    match err {
        BusTimeError::Status { status, body } => {
            assert_eq!(status, 502);
            assert!(body.len() <= MAX_ERROR_BODY_BYTES + 3);
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_vehicle_lookup_sends_refs() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vehicle-monitoring.json"))
        .and(query_param("VehicleRef", "MTABC_6045"))
        .and(query_param("LineRef", "MTABC_Q18"))
        .and(query_param("key", API_KEY))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(include_str!("fixtures/vehicle_monitoring.json")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for_mock(&server.uri());
    let vehicle = client.vehicle("MTABC_6045", "MTABC_Q18").await.unwrap();

    assert_eq!(vehicle.vehicle_ref(), "MTABC_6045");
    assert_eq!(vehicle.current_stop(), "Main St & 1st Ave");
}
