// Station API client tests against a mocked HTTP server

use chrono::{DateTime, Utc};
use mockito::{Matcher, Server};
use weather_rollup::fetch::BasicClient;
use weather_rollup::infra::RealmFiveClient;
use weather_rollup::readings::TimeRange;
use weather_rollup::services::ReadingSource;

const OBSERVATIONS_PATH: &str = "/api/v2/weather_stations/observations/26218796";

fn hour_window() -> TimeRange {
    let start: DateTime<Utc> = "2025-06-01T09:00:00Z".parse().unwrap();
    let end: DateTime<Utc> = "2025-06-01T10:00:00Z".parse().unwrap();
    TimeRange::new(start, end)
}

fn client(server: &Server) -> RealmFiveClient {
    RealmFiveClient::with_client(BasicClient::new(), &server.url(), "secret-key").unwrap()
}

#[tokio::test]
async fn test_fetch_sends_key_and_window() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", OBSERVATIONS_PATH)
        .match_header("x-api-key", "secret-key")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("occurred_after".into(), "2025-06-01T09:00:00Z".into()),
            Matcher::UrlEncoded("occurred_before".into(), "2025-06-01T10:00:00Z".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "2025-06-01T09:20:00Z": {"temperature_c": 21.5, "rainfall_in": null},
                "2025-06-01T09:05:00Z": {"temperature_c": 20.0, "rainfall_in": 0.2}
            }"#,
        )
        .create_async()
        .await;

    let readings = client(&server)
        .fetch("26218796", hour_window())
        .await
        .unwrap();

    assert_eq!(readings.len(), 2);
    let first = &readings.as_slice()[0];
    assert_eq!(first.value("temperature_c"), Some(21.5));
    assert_eq!(first.value("rainfall_in"), None);

    mock.assert_async().await;
}

#[tokio::test]
async fn test_fetch_empty_object_is_empty_set() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", OBSERVATIONS_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let readings = client(&server)
        .fetch("26218796", hour_window())
        .await
        .unwrap();

    assert!(readings.is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_fetch_server_error() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", OBSERVATIONS_PATH)
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("internal error")
        .create_async()
        .await;

    let result = client(&server).fetch("26218796", hour_window()).await;

    assert!(result.is_err());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_fetch_malformed_body() {
    let mut server = Server::new_async().await;

    let _mock = server
        .mock("GET", OBSERVATIONS_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html>maintenance</html>")
        .create_async()
        .await;

    let result = client(&server).fetch("26218796", hour_window()).await;

    assert!(result.is_err());
}
