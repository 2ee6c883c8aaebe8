// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Raw capabilities of the interactive map surface.
//!
//! This mirrors the primitives a MapLibre-style canvas offers: GeoJSON
//! sources, style layers, markers, animated camera moves, popups and
//! pointer/touch events. Higher-level, idempotent operations are built on
//! top of it in [`super::adapter`].

use crate::error::Result;
use crate::models::{LngLat, ScreenPoint};
use geojson::{GeoJson, JsonObject};
use serde::Serialize;
use std::time::Duration;
use tokio::sync::mpsc;

/// Channel end through which the surface reports user input.
pub type EventSink = mpsc::UnboundedSender<SurfaceEvent>;

/// Identifier for a marker placed on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerId(pub u64);

/// Identifier for an attached event listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Style layer type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Fill,
    Line,
    Circle,
}

/// A style layer drawing one source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerSpec {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: LayerKind,
    pub source: String,
    /// Paint properties as style-spec JSON (may contain expressions).
    pub paint: serde_json::Value,
}

/// Animated camera transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlyTo {
    pub center: LngLat,
    pub zoom: f64,
    pub duration: Duration,
    /// Zoom-out curve of the flight path; `None` uses the surface default.
    pub curve: Option<f64>,
}

/// What a listener subscribes to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    /// Style and tiles finished their initial load
    Load,
    /// Secondary button / long-click from a pointer device
    ContextMenu,
    /// Raw touch start/move/end/cancel on the canvas container
    Touch,
    /// Click on a rendered feature of a layer
    Click(String),
    /// Pointer entering or leaving features of a layer
    Hover(String),
}

/// A rendered feature under the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureHit {
    pub position: LngLat,
    pub properties: JsonObject,
}

/// Input reported by the surface.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    Loaded,
    ContextMenu { lng_lat: LngLat },
    TouchStart { touches: Vec<ScreenPoint> },
    TouchMove { touches: Vec<ScreenPoint> },
    TouchEnd,
    TouchCancel,
    FeatureClick { layer: String, hit: FeatureHit },
    PointerEnter { layer: String },
    PointerLeave { layer: String },
}

impl SurfaceEvent {
    /// The listener kind that receives this event.
    pub fn listener_kind(&self) -> ListenerKind {
        match self {
            SurfaceEvent::Loaded => ListenerKind::Load,
            SurfaceEvent::ContextMenu { .. } => ListenerKind::ContextMenu,
            SurfaceEvent::TouchStart { .. }
            | SurfaceEvent::TouchMove { .. }
            | SurfaceEvent::TouchEnd
            | SurfaceEvent::TouchCancel => ListenerKind::Touch,
            SurfaceEvent::FeatureClick { layer, .. } => ListenerKind::Click(layer.clone()),
            SurfaceEvent::PointerEnter { layer } | SurfaceEvent::PointerLeave { layer } => {
                ListenerKind::Hover(layer.clone())
            }
        }
    }
}

/// The rendering surface. Implementations use interior mutability; every
/// method is called from the controller task only.
pub trait MapCanvas: Send + Sync {
    /// True once the style and initial tiles have loaded.
    fn is_style_loaded(&self) -> bool;

    fn has_source(&self, id: &str) -> bool;
    fn add_source(&self, id: &str, data: GeoJson) -> Result<()>;
    fn remove_source(&self, id: &str);

    fn has_layer(&self, id: &str) -> bool;
    fn add_layer(&self, layer: LayerSpec) -> Result<()>;
    fn remove_layer(&self, id: &str);

    fn add_marker(&self, at: LngLat, color: &str) -> Result<MarkerId>;
    fn remove_marker(&self, marker: MarkerId);

    /// Start an animated transition. A new flight interrupts the current one.
    fn fly_to(&self, flight: FlyTo);

    /// Convert a canvas pixel position to a geographic coordinate.
    fn unproject(&self, point: ScreenPoint) -> LngLat;

    fn show_popup(&self, at: LngLat, html: &str);
    fn set_cursor(&self, cursor: &str);

    fn attach(&self, kind: ListenerKind, sink: EventSink) -> ListenerId;
    fn detach(&self, id: ListenerId);
}
