// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP clients against a local server.

use axum::{
    extract::Query,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use facility_map::error::AppError;
use facility_map::models::{FacilityId, LngLat};
use facility_map::services::{FacilityApi, Geocoder, HttpFacilityApi, NominatimGeocoder};
use serde_json::{json, Value};
use std::collections::HashMap;

/// Serve `app` on an ephemeral port and return its base URL.
async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn facility_api_router() -> Router {
    Router::new()
        .route(
            "/facilities",
            get(|| async {
                Json(json!([
                    {
                        "id": 1,
                        "name": "Kenyatta National Hospital",
                        "facility_type": "Hospital",
                        "ownership": "Public",
                        "latitude": -1.301,
                        "longitude": 36.807
                    },
                    {
                        "id": 2,
                        "name": "Kibera Clinic",
                        "facility_type": "Clinic",
                        "ownership": null,
                        "latitude": "-1.313",
                        "longitude": "36.782"
                    }
                ]))
            }),
        )
        .route(
            "/facility-types",
            get(|| async {
                Json(json!([
                    { "facility_type": "Clinic" },
                    { "facility_type": "Hospital" }
                ]))
            }),
        )
        .route(
            "/uploaded-facilities",
            get(|| async {
                Json(json!([
                    {
                        "id": "upload-7",
                        "name": "Westlands Clinic",
                        "facility_type": "Clinic",
                        "ownership": "Private",
                        "latitude": -1.267,
                        "longitude": 36.803
                    }
                ]))
            }),
        )
}

#[tokio::test]
async fn test_fetches_facilities() {
    let base = serve(facility_api_router()).await;
    let api = HttpFacilityApi::new(&format!("{}/", base));

    let facilities = api.facilities().await.unwrap();
    assert_eq!(facilities.len(), 2);
    assert_eq!(facilities[0].id, FacilityId::Number(1));
    assert_eq!(facilities[0].ownership, "Public");
    // String coordinates and null ownership are tolerated.
    assert_eq!(facilities[1].latitude, -1.313);
    assert_eq!(facilities[1].longitude, 36.782);
    assert_eq!(facilities[1].ownership, "");
    assert!(!facilities[1].is_uploaded());
}

#[tokio::test]
async fn test_fetches_facility_types() {
    let base = serve(facility_api_router()).await;
    let api = HttpFacilityApi::new(&base);

    assert_eq!(api.facility_types().await.unwrap(), vec!["Clinic", "Hospital"]);
}

#[tokio::test]
async fn test_fetches_uploaded_facilities() {
    let base = serve(facility_api_router()).await;
    let api = HttpFacilityApi::new(&base);

    let uploaded = api.uploaded_facilities().await.unwrap();
    assert_eq!(uploaded.len(), 1);
    assert_eq!(uploaded[0].id, FacilityId::Text("upload-7".to_string()));
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let app = Router::new().route(
        "/facilities",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "database down") }),
    );
    let base = serve(app).await;
    let api = HttpFacilityApi::new(&base);

    match api.facilities().await {
        Err(AppError::FacilityApi(msg)) => {
            assert!(msg.contains("503"), "{}", msg);
            assert!(msg.contains("database down"), "{}", msg);
        }
        other => panic!("expected FacilityApi error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body_is_reported() {
    let app = Router::new().route("/facilities", get(|| async { "not json" }));
    let base = serve(app).await;
    let api = HttpFacilityApi::new(&base);

    assert!(matches!(
        api.facilities().await,
        Err(AppError::FacilityApi(_))
    ));
}

fn geocoder_router() -> Router {
    Router::new().route(
        "/search",
        get(|Query(params): Query<HashMap<String, String>>| async move {
            if params.get("format").map(String::as_str) != Some("json") {
                return Json(json!({ "error": "format required" }));
            }
            let results: Value = match params.get("q").map(String::as_str) {
                Some("Nairobi & Environs") => json!([
                    { "lat": "-1.2921", "lon": "36.8219", "display_name": "Nairobi, Kenya" },
                    { "lat": "0.5", "lon": "35.0", "display_name": "Elsewhere" }
                ]),
                _ => json!([]),
            };
            Json(results)
        }),
    )
}

#[tokio::test]
async fn test_geocoder_returns_first_match() {
    let base = serve(geocoder_router()).await;
    let geocoder = NominatimGeocoder::new(&format!("{}/search", base)).unwrap();

    let found = geocoder.locate("Nairobi & Environs").await.unwrap();
    assert_eq!(found, Some(LngLat::new(36.8219, -1.2921)));
}

#[tokio::test]
async fn test_geocoder_no_match() {
    let base = serve(geocoder_router()).await;
    let geocoder = NominatimGeocoder::new(&format!("{}/search", base)).unwrap();

    assert_eq!(geocoder.locate("Atlantis").await.unwrap(), None);
}

#[tokio::test]
async fn test_geocoder_error_status() {
    let app = Router::new().route(
        "/search",
        get(|| async { StatusCode::TOO_MANY_REQUESTS }),
    );
    let base = serve(app).await;
    let geocoder = NominatimGeocoder::new(&format!("{}/search", base)).unwrap();

    assert!(matches!(
        geocoder.locate("Nairobi").await,
        Err(AppError::Geocode(_))
    ));
}
