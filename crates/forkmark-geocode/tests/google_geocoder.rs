//! Integration tests for `GoogleGeocoder` and `GeocodingClient` using wiremock HTTP mocks.

use std::time::Duration;

use forkmark_core::Confidence;
use forkmark_geocode::{Geocode, GeocodeError, GeocodeProvider, GeocodingClient, GoogleGeocoder};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn geocoder(server: &MockServer, timeout: Duration) -> GoogleGeocoder {
    GoogleGeocoder::with_base_url("test-key", timeout, &format!("{}/geocode/json", server.uri()))
        .expect("client construction should not fail")
}

fn caching_client(server: &MockServer) -> GeocodingClient<GoogleGeocoder> {
    GeocodingClient::with_settings(
        geocoder(server, Duration::from_secs(5)),
        Duration::from_secs(3600),
        64,
        Duration::from_secs(5),
    )
}

fn borough_market_body() -> serde_json::Value {
    serde_json::json!({
        "status": "OK",
        "results": [{
            "formatted_address": "Borough Market, 8 Southwark St, London SE1 1TL, UK",
            "geometry": {
                "location": { "lat": 51.5055, "lng": -0.0910 },
                "location_type": "ROOFTOP"
            },
            "address_components": [
                { "long_name": "8", "types": ["street_number"] },
                { "long_name": "Southwark Street", "types": ["route"] },
                { "long_name": "London", "types": ["postal_town"] },
                { "long_name": "United Kingdom", "types": ["country", "political"] }
            ]
        }]
    })
}

#[tokio::test]
async fn lookup_parses_first_result() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geocode/json"))
        .and(query_param("address", "borough market"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(borough_market_body()))
        .expect(1)
        .mount(&server)
        .await;

    let result = geocoder(&server, Duration::from_secs(5))
        .lookup("borough market")
        .await
        .expect("lookup should succeed")
        .expect("should resolve");

    assert_eq!(result.locality.as_deref(), Some("London"));
    assert_eq!(result.confidence, Confidence::High);
    assert!((result.coordinate.longitude - -0.0910).abs() < 1e-9);
}

#[tokio::test]
async fn lookup_zero_results_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "status": "ZERO_RESULTS", "results": [] })),
        )
        .mount(&server)
        .await;

    let result = geocoder(&server, Duration::from_secs(5))
        .lookup("zzyyx nonexistent place")
        .await
        .expect("zero results is not an error");
    assert!(result.is_none());
}

#[tokio::test]
async fn lookup_server_error_is_unexpected_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = geocoder(&server, Duration::from_secs(5))
        .lookup("soho")
        .await
        .unwrap_err();
    assert!(
        matches!(err, GeocodeError::UnexpectedStatus { status: 503 }),
        "got {err:?}"
    );
}

#[tokio::test]
async fn lookup_quota_exceeded_is_provider_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "OVER_QUERY_LIMIT",
            "error_message": "You have exceeded your daily request quota for this API."
        })))
        .mount(&server)
        .await;

    let err = geocoder(&server, Duration::from_secs(5))
        .lookup("soho")
        .await
        .unwrap_err();
    assert!(matches!(err, GeocodeError::Provider { ref status, .. } if status == "OVER_QUERY_LIMIT"));
}

#[tokio::test]
async fn lookup_garbage_body_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = geocoder(&server, Duration::from_secs(5))
        .lookup("soho")
        .await
        .unwrap_err();
    assert!(err.is_malformed(), "got {err:?}");
}

#[tokio::test]
async fn client_serves_repeat_queries_from_cache() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("address", "borough market"))
        .respond_with(ResponseTemplate::new(200).set_body_json(borough_market_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = caching_client(&server);
    let first = client.geocode("Borough Market").await;
    let second = client.geocode("borough market").await;

    assert!(first.is_some());
    assert_eq!(first, second);
}

#[tokio::test]
async fn client_caches_empty_answers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "status": "ZERO_RESULTS", "results": [] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = caching_client(&server);
    assert!(client.geocode("Zzyyx Nonexistent Place").await.is_none());
    assert!(client.geocode("Zzyyx Nonexistent Place").await.is_none());
}

#[tokio::test]
async fn client_retries_after_provider_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let client = caching_client(&server);
    assert!(client.geocode("Soho").await.is_none());
    assert!(client.geocode("Soho").await.is_none());
}

#[tokio::test]
async fn client_treats_slow_provider_as_no_result() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(borough_market_body())
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = GeocodingClient::with_settings(
        geocoder(&server, Duration::from_secs(30)),
        Duration::from_secs(3600),
        64,
        Duration::from_millis(100),
    );

    assert!(client.geocode("Borough Market").await.is_none());
    assert_eq!(client.cached_entries(), 0);
}

#[tokio::test]
async fn client_skips_network_for_blank_queries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(borough_market_body()))
        .expect(0)
        .mount(&server)
        .await;

    let client = caching_client(&server);
    assert!(client.geocode("   ").await.is_none());
}
