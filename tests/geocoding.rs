use std::collections::HashMap;
use std::time::Duration;

use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use shipment_tracking::error::GeocodeError;
use shipment_tracking::geo::{Geocoder, NominatimClient};
use shipment_tracking::models::order::GeoPoint;

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn client(base_url: &str, timeout: Duration) -> NominatimClient {
    NominatimClient::new(base_url, "shipment-tracking-tests/0.1", timeout).unwrap()
}

const QUEZON_CITY: GeoPoint = GeoPoint {
    lat: 14.676,
    lng: 121.0437,
};

#[tokio::test]
async fn resolves_city_from_reverse_lookup() {
    let app = Router::new().route(
        "/reverse",
        get(|Query(params): Query<HashMap<String, String>>| async move {
            assert_eq!(params.get("format").map(String::as_str), Some("json"));
            assert_eq!(params.get("lat").map(String::as_str), Some("14.676"));
            Json(json!({
                "address": { "city": "Quezon City", "county": "Metro Manila" },
                "display_name": "Diliman, Quezon City"
            }))
        }),
    );
    let base = spawn(app).await;

    let place = client(&base, Duration::from_secs(2))
        .reverse(QUEZON_CITY)
        .await
        .unwrap();
    assert_eq!(place, "Quezon City");
}

#[tokio::test]
async fn server_error_is_reported_as_status() {
    let app = Router::new().route(
        "/reverse",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response() }),
    );
    let base = spawn(app).await;

    let err = client(&base, Duration::from_secs(2))
        .reverse(QUEZON_CITY)
        .await
        .unwrap_err();
    assert!(matches!(err, GeocodeError::Status(500)));
}

#[tokio::test]
async fn slow_upstream_times_out() {
    let app = Router::new().route(
        "/reverse",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({ "address": { "city": "Too Late" } }))
        }),
    );
    let base = spawn(app).await;

    let err = client(&base, Duration::from_millis(100))
        .reverse(QUEZON_CITY)
        .await
        .unwrap_err();
    assert!(matches!(err, GeocodeError::Timeout));
}

#[tokio::test]
async fn body_without_place_is_malformed() {
    let app = Router::new().route(
        "/reverse",
        get(|| async { Json(json!({ "error": "Unable to geocode" })) }),
    );
    let base = spawn(app).await;

    let err = client(&base, Duration::from_secs(2))
        .reverse(QUEZON_CITY)
        .await
        .unwrap_err();
    assert!(matches!(err, GeocodeError::Malformed(_)));
}
