// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! The pending radius query and its temporary marker.
//!
//! At most one marker exists at a time. A new request removes the previous
//! marker before placing the next one.

use crate::error::{AppError, Result};
use crate::geometry::{circle_polygon, radius_to_zoom, CIRCLE_SEGMENTS};
use crate::models::{LngLat, RadiusQuery, Viewport};
use crate::render::style::{radius_circle_styles, temporary_marker_style};
use crate::render::{FlyTo, MapRenderAdapter, MarkerHandle};
use std::time::Duration;

/// Source name of the radius circle overlay.
pub const RADIUS_LAYER: &str = "radius-circle";

/// Largest radius the prompt accepts, in km.
pub const MAX_RADIUS_KM: f64 = 100.0;

/// Check a radius entered by the user: finite, positive, at most [`MAX_RADIUS_KM`].
pub fn validate_radius(radius_km: f64) -> Result<f64> {
    if radius_km.is_finite() && radius_km > 0.0 && radius_km <= MAX_RADIUS_KM {
        Ok(radius_km)
    } else {
        Err(AppError::InvalidInput(format!(
            "radius must be in (0, {}] km, got {}",
            MAX_RADIUS_KM, radius_km
        )))
    }
}

#[derive(Debug, Default)]
pub struct SpatialQuery {
    marker: Option<MarkerHandle>,
    pending: Option<RadiusQuery>,
}

impl SpatialQuery {
    pub fn pending(&self) -> Option<RadiusQuery> {
        self.pending
    }

    pub fn has_marker(&self) -> bool {
        self.marker.is_some()
    }

    /// Start a query at `point`, superseding any pending one.
    pub fn request(&mut self, point: LngLat, adapter: &MapRenderAdapter) -> Result<RadiusQuery> {
        if let Some(previous) = self.marker.take() {
            tracing::debug!("Superseding pending radius query");
            adapter.remove_marker(previous);
        }
        self.pending = None;

        let marker = adapter.add_marker(point, &temporary_marker_style())?;
        self.marker = Some(marker);

        let query = RadiusQuery { center: point };
        self.pending = Some(query);
        tracing::info!(lng = point.lng, lat = point.lat, "Spatial query requested");
        Ok(query)
    }

    /// Apply `radius_km` to the pending query: fly to fit the circle, draw
    /// it, then close the query.
    ///
    /// Invalid radii and missing queries are rejected without touching the map.
    pub fn submit(
        &mut self,
        radius_km: f64,
        adapter: &MapRenderAdapter,
        flight: Duration,
    ) -> Result<Viewport> {
        let radius_km = validate_radius(radius_km)?;
        let query = self
            .pending
            .ok_or_else(|| AppError::InvalidInput("no spatial query is pending".to_string()))?;

        let ring = circle_polygon(query.center, radius_km, CIRCLE_SEGMENTS);
        let (fill, stroke) = radius_circle_styles();
        adapter.upsert_polygon_layer(RADIUS_LAYER, &ring, &fill, &stroke)?;

        let viewport = adapter.fly_to(FlyTo {
            center: query.center,
            zoom: radius_to_zoom(radius_km),
            duration: flight,
            curve: None,
        });

        tracing::info!(
            radius_km,
            zoom = viewport.zoom,
            "Radius applied to spatial query"
        );
        self.dismiss(adapter);
        Ok(viewport)
    }

    /// Drop the pending query and its marker. Returns whether one existed.
    pub fn dismiss(&mut self, adapter: &MapRenderAdapter) -> bool {
        let had_query = self.pending.take().is_some();
        if let Some(marker) = self.marker.take() {
            adapter.remove_marker(marker);
        }
        had_query
    }
}
