use fence_quote::config::toml_config::GeocoderConfig;
use fence_quote::core::{ForwardGeocoder, ReverseGeocoder};
use fence_quote::domain::model::LatLon;
use fence_quote::{FenceError, NominatimClient};
use httpmock::prelude::*;

fn client_for(server: &MockServer) -> NominatimClient {
    let config = GeocoderConfig {
        base_url: server.base_url(),
        timeout_seconds: Some(5),
        ..GeocoderConfig::default()
    };
    NominatimClient::new(&config).unwrap()
}

#[tokio::test]
async fn test_search_sends_structured_postcode_query() {
    let server = MockServer::start();
    let search_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/search")
            .query_param("format", "json")
            .query_param("addressdetails", "1")
            .query_param("countrycodes", "gb")
            .query_param("limit", "1")
            .query_param("postalcode", "SW46QD");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!([
                {
                    "lat": "51.4613",
                    "lon": "-0.1386",
                    "display_name": "Clapham, London Borough of Lambeth, London, SW4 6QD, United Kingdom"
                }
            ]));
    });

    let client = client_for(&server);
    let candidates = client.search_postcode("SW46QD").await.unwrap();

    search_mock.assert();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].position, LatLon::new(51.4613, -0.1386));
    assert!(candidates[0].display_label.starts_with("Clapham"));
}

#[tokio::test]
async fn test_search_with_no_match_is_empty() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/search");
        then.status(200).json_body(serde_json::json!([]));
    });

    let candidates = client_for(&server).search_postcode("ZZ99ZZ").await.unwrap();
    assert!(candidates.is_empty());
}

#[tokio::test]
async fn test_search_server_error_is_transport_failure() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/search");
        then.status(503);
    });

    let err = client_for(&server).search_postcode("SW46QD").await.unwrap_err();
    assert!(matches!(err, FenceError::HttpError(_)));
}

#[tokio::test]
async fn test_search_with_bad_coordinates_fails() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/search");
        then.status(200)
            .json_body(serde_json::json!([{ "lat": "n/a", "lon": "0" }]));
    });

    let err = client_for(&server).search_postcode("SW46QD").await.unwrap_err();
    assert!(matches!(err, FenceError::GeocodeError { .. }));
}

#[tokio::test]
async fn test_reverse_extracts_uppercased_postcode() {
    let server = MockServer::start();
    let reverse_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/reverse")
            .query_param("format", "jsonv2")
            .query_param("lat", "51.47")
            .query_param("lon", "-0.11")
            .query_param("addressdetails", "1");
        then.status(200).json_body(serde_json::json!({
            "display_name": "Stockwell, London",
            "address": { "road": "Stockwell Road", "postcode": "sw9 6aa" }
        }));
    });

    let address = client_for(&server)
        .reverse(LatLon::new(51.47, -0.11))
        .await
        .unwrap();

    reverse_mock.assert();
    assert_eq!(address.postcode.as_deref(), Some("SW9 6AA"));
}

#[tokio::test]
async fn test_reverse_without_postcode() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/reverse");
        then.status(200)
            .json_body(serde_json::json!({ "error": "Unable to geocode" }));
    });

    let address = client_for(&server)
        .reverse(LatLon::new(0.0, 0.0))
        .await
        .unwrap();
    assert_eq!(address.postcode, None);
}
