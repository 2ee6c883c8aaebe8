// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Free-text geocoding against a Nominatim-compatible search endpoint.

use crate::error::{AppError, Result};
use crate::models::facility::deserialize_degrees;
use crate::models::LngLat;
use serde::Deserialize;
use std::future::Future;

/// Resolves free text to the best-matching coordinate.
pub trait Geocoder: Send + Sync + 'static {
    /// `Ok(None)` when the provider has no match.
    fn locate(&self, query: &str) -> impl Future<Output = Result<Option<LngLat>>> + Send;
}

/// One search result. Nominatim sends coordinates as strings.
#[derive(Debug, Clone, Deserialize)]
pub struct Place {
    #[serde(deserialize_with = "deserialize_degrees")]
    pub lat: f64,
    #[serde(deserialize_with = "deserialize_degrees")]
    pub lon: f64,
    #[serde(default)]
    pub display_name: String,
}

/// Nominatim client.
#[derive(Clone)]
pub struct NominatimGeocoder {
    http: reqwest::Client,
    search_url: String,
}

impl NominatimGeocoder {
    /// Nominatim's usage policy requires an identifying user agent.
    const USER_AGENT: &'static str = concat!("facility-map/", env!("CARGO_PKG_VERSION"));

    pub fn new(search_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(Self::USER_AGENT)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            search_url: search_url.to_string(),
        })
    }

    /// Search URL for `query` (`format=json&q=<urlencoded>`).
    pub fn search_url(&self, query: &str) -> String {
        format!(
            "{}?format=json&q={}",
            self.search_url,
            urlencoding::encode(query)
        )
    }
}

impl Geocoder for NominatimGeocoder {
    async fn locate(&self, query: &str) -> Result<Option<LngLat>> {
        let url = self.search_url(query);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::Geocode(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::Geocode(format!("HTTP {}", status)));
        }

        let places: Vec<Place> = response
            .json()
            .await
            .map_err(|e| AppError::Geocode(format!("JSON parse error: {}", e)))?;

        Ok(places.first().map(|place| {
            tracing::debug!(query, name = %place.display_name, "Geocoded");
            LngLat::new(place.lon, place.lat)
        }))
    }
}
