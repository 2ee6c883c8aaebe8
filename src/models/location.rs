// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Coordinate and viewport types shared by the map engine.

use serde::{Deserialize, Serialize};

/// Lowest zoom level the viewport may take.
pub const MIN_ZOOM: f64 = 1.0;
/// Highest zoom level the viewport may take.
pub const MAX_ZOOM: f64 = 20.0;

/// A geographic coordinate in degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

impl From<LngLat> for geo::Point<f64> {
    fn from(value: LngLat) -> Self {
        geo::Point::new(value.lng, value.lat)
    }
}

/// A pixel position relative to the top-left corner of the map canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in pixels.
    pub fn distance_to(&self, other: &ScreenPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// The map's current centre and zoom.
///
/// Never edited in place; each transition replaces the whole value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: f64,
}

impl Viewport {
    /// Build a viewport, clamping zoom into `[MIN_ZOOM, MAX_ZOOM]`.
    pub fn new(center: LngLat, zoom: f64) -> Self {
        Self {
            latitude: center.lat,
            longitude: center.lng,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        }
    }

    pub fn center(&self) -> LngLat {
        LngLat::new(self.longitude, self.latitude)
    }
}

/// A pending spatial query: the point the user pressed, waiting for a radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusQuery {
    pub center: LngLat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_clamps_zoom() {
        let center = LngLat::new(36.8, -1.28);
        assert_eq!(Viewport::new(center, 0.2).zoom, MIN_ZOOM);
        assert_eq!(Viewport::new(center, 42.0).zoom, MAX_ZOOM);
        assert_eq!(Viewport::new(center, 10.5).zoom, 10.5);
    }

    #[test]
    fn test_viewport_center_round_trips() {
        let center = LngLat::new(36.817223, -1.286389);
        assert_eq!(Viewport::new(center, 10.0).center(), center);
    }

    #[test]
    fn test_screen_point_distance() {
        let a = ScreenPoint::new(0.0, 0.0);
        let b = ScreenPoint::new(3.0, 4.0);
        assert_eq!(a.distance_to(&b), 5.0);
    }
}
