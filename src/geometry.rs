// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Radius/zoom conversion and circle rings for the spatial-query overlay.
//!
//! These are rendering aids, not geodesic buffers: both use the small-angle
//! approximation on a spherical earth.

use crate::models::location::{LngLat, MAX_ZOOM, MIN_ZOOM};
use geo::{Coord, LineString};
use std::f64::consts::PI;

/// Mean earth radius used by all conversions.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Default number of segments in a radius circle.
pub const CIRCLE_SEGMENTS: usize = 64;

/// Zoom level at which a circle of `radius_km` fills the field of view.
///
/// The radius is treated as half the field of view. The caller must pass a
/// positive radius.
pub fn radius_to_zoom(radius_km: f64) -> f64 {
    debug_assert!(radius_km > 0.0, "radius must be positive");

    let fov_deg = (radius_km / EARTH_RADIUS_KM).to_degrees() * 2.0;
    let zoom = (360.0 / fov_deg).log2() - 1.0;
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}

/// Closed ring of `segments + 1` points approximating a circle around `center`.
///
/// Longitude offsets are stretched by `1 / cos(lat)` to account for meridian
/// convergence, so the ring degenerates as `|lat|` approaches 90°.
pub fn circle_polygon(center: LngLat, radius_km: f64, segments: usize) -> LineString<f64> {
    let angular = radius_km / EARTH_RADIUS_KM;
    let lat_scale = center.lat.to_radians().cos();

    let mut coords: Vec<Coord<f64>> = (0..segments)
        .map(|i| {
            let angle = (i as f64 / segments as f64) * 2.0 * PI;
            let lat_offset = angular * angle.cos();
            let lng_offset = angular * angle.sin() / lat_scale;
            Coord {
                x: center.lng + lng_offset.to_degrees(),
                y: center.lat + lat_offset.to_degrees(),
            }
        })
        .collect();

    if let Some(first) = coords.first().copied() {
        coords.push(first);
    }

    LineString::new(coords)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Distance, Haversine, Point};

    #[test]
    fn test_radius_to_zoom_ten_km() {
        let fov = (10.0 / EARTH_RADIUS_KM).to_degrees() * 2.0;
        assert!((fov - 0.1799).abs() < 0.001, "fov was {}", fov);

        // log2(360 / 0.17986) - 1
        let zoom = radius_to_zoom(10.0);
        assert!((zoom - 9.967).abs() < 0.01, "zoom was {}", zoom);
    }

    #[test]
    fn test_radius_to_zoom_is_monotonic() {
        let mut previous = radius_to_zoom(0.01);
        let mut radius = 0.01;
        while radius <= 100.0 {
            let zoom = radius_to_zoom(radius);
            assert!(
                zoom <= previous + 1e-12,
                "zoom increased at radius {}: {} > {}",
                radius,
                zoom,
                previous
            );
            previous = zoom;
            radius += 0.25;
        }
    }

    #[test]
    fn test_radius_to_zoom_is_clamped() {
        assert!(radius_to_zoom(0.0001) <= MAX_ZOOM);
        assert_eq!(radius_to_zoom(0.0001), MAX_ZOOM);
        assert!(radius_to_zoom(100.0) >= MIN_ZOOM);
        assert_eq!(radius_to_zoom(50_000.0), MIN_ZOOM);
    }

    #[test]
    fn test_circle_is_closed_with_expected_length() {
        let ring = circle_polygon(LngLat::new(36.817223, -1.286389), 5.0, 64);
        assert_eq!(ring.0.len(), 65);
        assert_eq!(ring.0.first(), ring.0.last());
        assert!(ring.is_closed());
    }

    #[test]
    fn test_circle_points_within_radius() {
        for center in [
            LngLat::new(36.817223, -1.286389),
            LngLat::new(-122.08, 37.39),
            LngLat::new(18.07, 59.33),
        ] {
            let radius = 25.0;
            let ring = circle_polygon(center, radius, CIRCLE_SEGMENTS);
            for coord in ring.coords() {
                let distance =
                    Haversine.distance(Point::from(center), Point::from(*coord)) / 1000.0;
                assert!(
                    distance <= radius * 1.01,
                    "point {:?} is {} km from {:?}",
                    coord,
                    distance,
                    center
                );
                assert!(distance >= radius * 0.95);
            }
        }
    }

    #[test]
    fn test_circle_first_point_is_due_north() {
        let center = LngLat::new(10.0, 0.0);
        let ring = circle_polygon(center, 10.0, 8);
        let north = ring.0[0];
        assert!((north.x - 10.0).abs() < 1e-12);
        assert!(north.y > 0.0);
    }

    #[test]
    fn test_zero_segments_yields_empty_ring() {
        let ring = circle_polygon(LngLat::new(0.0, 0.0), 1.0, 0);
        assert!(ring.0.is_empty());
    }
}
