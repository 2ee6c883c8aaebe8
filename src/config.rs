// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Timing constants that shape user-visible behaviour (long-press duration,
//! debounce window, poll interval, retry backoff) live in [`Timings`].

use crate::models::{LngLat, Viewport};
use std::env;
use std::time::Duration;

const DEFAULT_STYLE_URL: &str = "https://api.maptiler.com/maps/streets/style.json";
const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org/search";

/// Nairobi city centre.
const DEFAULT_LATITUDE: f64 = -1.286389;
const DEFAULT_LONGITUDE: f64 = 36.817223;
const DEFAULT_ZOOM: f64 = 10.0;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the facility API (no trailing slash)
    pub api_base_url: String,
    /// Geocoder search endpoint (Nominatim-compatible)
    pub geocoder_url: String,
    /// Map style document URL, without the key parameter
    pub style_url: String,
    /// Tile provider key appended to the style URL
    pub maptiler_key: String,
    /// Viewport shown before any interaction
    pub initial_viewport: Viewport,
    pub timings: Timings,
}

/// Fixed delays and durations used by the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timings {
    /// How long a single finger must rest before it counts as a long-press
    pub long_press: Duration,
    /// Quiet period before a search query is geocoded
    pub search_debounce: Duration,
    /// Interval between uploaded-facility refreshes
    pub poll_interval: Duration,
    /// Attempts per facility fetch before degrading to empty
    pub fetch_attempts: u32,
    /// Linear backoff step between fetch attempts (1x, 2x, ...)
    pub fetch_backoff: Duration,
    /// Fly-to duration after a successful search
    pub search_flight: Duration,
    /// Fly-to curve after a successful search
    pub search_curve: f64,
    /// Zoom used when flying to a search result
    pub search_zoom: f64,
    /// Fly-to duration after a radius is submitted
    pub radius_flight: Duration,
    /// Delay between initial data arriving and the loading overlay clearing
    pub loading_clear_delay: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            long_press: Duration::from_millis(1100),
            search_debounce: Duration::from_millis(300),
            poll_interval: Duration::from_secs(30),
            fetch_attempts: 3,
            fetch_backoff: Duration::from_secs(1),
            search_flight: Duration::from_millis(4000),
            search_curve: 1.5,
            search_zoom: 10.0,
            radius_flight: Duration::from_millis(3000),
            loading_clear_delay: Duration::from_millis(500),
        }
    }
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let latitude = parse_var("INITIAL_LATITUDE", DEFAULT_LATITUDE)?;
        let longitude = parse_var("INITIAL_LONGITUDE", DEFAULT_LONGITUDE)?;
        let zoom = parse_var("INITIAL_ZOOM", DEFAULT_ZOOM)?;

        Ok(Self {
            api_base_url: env::var("API_BASE_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .map_err(|_| ConfigError::Missing("API_BASE_URL"))?,
            geocoder_url: env::var("GEOCODER_URL")
                .unwrap_or_else(|_| DEFAULT_GEOCODER_URL.to_string()),
            style_url: env::var("MAP_STYLE_URL").unwrap_or_else(|_| DEFAULT_STYLE_URL.to_string()),
            maptiler_key: env::var("MAPTILER_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("MAPTILER_KEY"))?,
            initial_viewport: Viewport::new(LngLat::new(longitude, latitude), zoom),
            timings: Timings::default(),
        })
    }

    /// Offline configuration for tests.
    pub fn test_default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:9".to_string(),
            geocoder_url: "http://127.0.0.1:9/search".to_string(),
            style_url: DEFAULT_STYLE_URL.to_string(),
            maptiler_key: "test_key".to_string(),
            initial_viewport: Viewport::new(
                LngLat::new(DEFAULT_LONGITUDE, DEFAULT_LATITUDE),
                DEFAULT_ZOOM,
            ),
            timings: Timings::default(),
        }
    }

    /// Full style URL including the provider key.
    pub fn style_url(&self) -> String {
        let separator = if self.style_url.contains('?') { '&' } else { '?' };
        format!(
            "{}{}key={}",
            self.style_url,
            separator,
            urlencoding::encode(&self.maptiler_key)
        )
    }
}

fn parse_var(name: &'static str, default: f64) -> Result<f64, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
