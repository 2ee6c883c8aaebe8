// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Declarative paint rules for the overlays the engine draws.
//!
//! Zoom-dependent sizing is expressed as style-spec `interpolate`
//! expressions and evaluated by the surface, never per frame here.

use serde_json::{json, Value};

pub const STANDARD_COLOR: &str = "#007cbf";
pub const UPLOADED_COLOR: &str = "#00bf7c";
pub const TEMPORARY_MARKER_COLOR: &str = "red";

/// Polygon fill.
#[derive(Debug, Clone, PartialEq)]
pub struct FillStyle {
    pub color: String,
    pub opacity: f64,
}

impl FillStyle {
    pub fn to_paint(&self) -> Value {
        json!({
            "fill-color": self.color,
            "fill-opacity": self.opacity,
        })
    }
}

/// Polygon outline.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    pub color: String,
    pub width: f64,
}

impl StrokeStyle {
    pub fn to_paint(&self) -> Value {
        json!({
            "line-color": self.color,
            "line-width": self.width,
        })
    }
}

/// Marker appearance.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerStyle {
    pub color: String,
}

/// Fill and outline of the spatial-query circle.
pub fn radius_circle_styles() -> (FillStyle, StrokeStyle) {
    (
        FillStyle {
            color: STANDARD_COLOR.to_string(),
            opacity: 0.1,
        },
        StrokeStyle {
            color: STANDARD_COLOR.to_string(),
            width: 2.0,
        },
    )
}

pub fn temporary_marker_style() -> MarkerStyle {
    MarkerStyle {
        color: TEMPORARY_MARKER_COLOR.to_string(),
    }
}

/// `["interpolate", ["linear"], ["zoom"], z0, v0, z1, v1, ...]`
pub fn zoom_ramp(stops: &[(f64, f64)]) -> Value {
    let mut expr = vec![json!("interpolate"), json!(["linear"]), json!(["zoom"])];
    for (zoom, value) in stops {
        expr.push(json!(zoom));
        expr.push(json!(value));
    }
    Value::Array(expr)
}

/// Circle paint for facility points: grow and fade in with zoom, coloured by source.
pub fn facility_paint() -> Value {
    json!({
        "circle-radius": zoom_ramp(&[(8.0, 5.0), (10.0, 10.0), (12.0, 15.0), (14.0, 20.0), (16.0, 25.0)]),
        "circle-opacity": zoom_ramp(&[(6.0, 0.1), (8.0, 0.3), (10.0, 0.5), (12.0, 0.8), (14.0, 1.0)]),
        "circle-color": [
            "case",
            ["==", ["get", "isUploaded"], true],
            UPLOADED_COLOR,
            STANDARD_COLOR
        ],
        "circle-stroke-width": zoom_ramp(&[(8.0, 0.0), (12.0, 0.5), (14.0, 1.0)]),
        "circle-stroke-color": "#ffffff",
    })
}
