//! End-to-end tests against a local mock server using the reqwest transport.

use skyfeed_client::{
    ApodQuery, ClientConfig, ExoplanetQuery, FailureKind, NeoFeedQuery, QueryOutput,
    RetryPolicy, Rover, RoverPhotosQuery, SkyfeedConnection, SpaceWeatherKind, SpaceWeatherQuery,
    Value,
};
use skyfeed_test_utils::fixtures;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn connect(server: &MockServer, max_attempts: u32) -> SkyfeedConnection {
    let config = ClientConfig::new("TEST_KEY")
        .with_base_url(server.uri())
        .with_exoplanet_url(format!("{}/cgi-bin/nstedAPI/nph-nstedAPI", server.uri()))
        .with_request_timeout(Duration::from_secs(5))
        .with_retry(
            RetryPolicy::default()
                .with_max_attempts(max_attempts)
                .with_backoff_factor(0.0),
        );
    SkyfeedConnection::connect(config).unwrap()
}

#[tokio::test]
async fn test_apod_latest_omits_date() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/planetary/apod"))
        .and(query_param("api_key", "TEST_KEY"))
        .and(query_param_is_missing("date"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::apod_json("2024-03-15")))
        .expect(1)
        .mount(&server)
        .await;

    let conn = connect(&server, 5);
    let table = conn.apod(&ApodQuery::latest()).await.unwrap();

    assert_eq!(table.len(), 1);
    assert_eq!(table.cell(0, "title"), Some(&Value::from("Pillars of Creation")));
}

#[tokio::test]
async fn test_apod_specific_date() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/planetary/apod"))
        .and(query_param("date", "2023-07-04"))
        .and(query_param("api_key", "TEST_KEY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::apod_json("2023-07-04")))
        .expect(1)
        .mount(&server)
        .await;

    let conn = connect(&server, 5);
    let table = conn.apod(&ApodQuery::new("2023-07-04")).await.unwrap();
    assert_eq!(table.cell(0, "date"), Some(&Value::from("2023-07-04")));
}

#[tokio::test]
async fn test_retryable_status_attempted_max_times() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/planetary/apod"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let conn = connect(&server, 3);
    assert!(conn.apod(&ApodQuery::latest()).await.is_none());
}

#[tokio::test]
async fn test_client_error_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/planetary/apod"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad date"))
        .expect(1)
        .mount(&server)
        .await;

    let conn = connect(&server, 5);
    let err = conn.try_apod(&ApodQuery::new("1990-01-01")).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Status);
}

#[tokio::test]
async fn test_cached_call_issues_one_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/neo/rest/v1/feed"))
        .and(query_param("start_date", "2015-09-07"))
        .and(query_param("end_date", "2015-09-08"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::neo_feed_json()))
        .expect(1)
        .mount(&server)
        .await;

    let conn = connect(&server, 5);
    let query = NeoFeedQuery::new("2015-09-07", "2015-09-08");
    let first = conn.neo_feed(&query).await.unwrap();
    let second = conn.neo_feed(&query).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
    assert_eq!(conn.cache_stats().hits, 1);
}

#[tokio::test]
async fn test_rover_photos_capped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/mars-photos/api/v1/rovers/Opportunity/photos"))
        .and(query_param("sol", "42"))
        .and(query_param("camera", "PANCAM"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::rover_photos_json(130)))
        .expect(1)
        .mount(&server)
        .await;

    let conn = connect(&server, 5);
    let query = RoverPhotosQuery::new(Rover::Opportunity, 42).with_camera("PANCAM");
    let table = conn.rover_photos(&query).await.unwrap();

    assert_eq!(table.len(), 100);
    assert_eq!(table.cell(99, "id"), Some(&Value::Integer(100)));
}

#[tokio::test]
async fn test_space_weather_table_and_raw() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/DONKI/notifications"))
        .and(query_param("startDate", "2024-01-01"))
        .and(query_param("endDate", "2024-01-31"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::donki_flat_json()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/DONKI/CME"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::donki_irregular_json()))
        .mount(&server)
        .await;

    let conn = connect(&server, 5);

    let flat = conn
        .space_weather(
            &SpaceWeatherQuery::new(SpaceWeatherKind::Notifications)
                .with_start_date("2024-01-01")
                .with_end_date("2024-01-31"),
        )
        .await
        .unwrap();
    assert_eq!(flat.as_table().map(|t| t.len()), Some(2));

    let irregular = conn
        .space_weather(
            &SpaceWeatherQuery::new(SpaceWeatherKind::Cme)
                .with_start_date("2024-01-01")
                .with_end_date("2024-01-31"),
        )
        .await
        .unwrap();
    assert_eq!(irregular, QueryOutput::Raw(fixtures::donki_irregular_json()));
}

#[tokio::test]
async fn test_exoplanet_where_clause_reaches_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/nstedAPI/nph-nstedAPI"))
        .and(query_param("table", "cumulative"))
        .and(query_param("where", fixtures::EXOPLANET_CANDIDATE_WHERE))
        .and(query_param("order", "kepid"))
        .and(query_param("api_key", "TEST_KEY"))
        .and(query_param_is_missing("select"))
        .respond_with(ResponseTemplate::new(200).set_body_string(fixtures::exoplanet_csv()))
        .expect(1)
        .mount(&server)
        .await;

    let conn = connect(&server, 5);
    let query = ExoplanetQuery::new("cumulative")
        .with_where(fixtures::EXOPLANET_CANDIDATE_WHERE)
        .with_order("kepid");
    let table = conn.exoplanet(&query).await.unwrap();

    assert_eq!(
        table.columns(),
        &["kepid", "kepoi_name", "kepler_name", "koi_disposition", "koi_period", "koi_prad"]
    );
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/planetary/apod"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(fixtures::apod_json("2024-03-15"))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let config = ClientConfig::new("TEST_KEY")
        .with_base_url(server.uri())
        .with_request_timeout(Duration::from_millis(50))
        .with_retry(RetryPolicy::no_retry());
    let conn = SkyfeedConnection::connect(config).unwrap();

    let err = conn.try_apod(&ApodQuery::latest()).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Network);
}

#[tokio::test]
async fn test_unreachable_host_is_network_failure() {
    let config = ClientConfig::new("TEST_KEY")
        .with_base_url("http://127.0.0.1:1/")
        .with_retry(RetryPolicy::no_retry());
    let conn = SkyfeedConnection::connect(config).unwrap();

    let err = conn.try_apod(&ApodQuery::latest()).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Network);
    assert!(!err.to_string().contains("TEST_KEY"));
}
