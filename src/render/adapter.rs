// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Idempotent map operations on top of a [`MapCanvas`].
//!
//! Every layer write is remove-then-add, so repeating an upsert replaces
//! what is on screen instead of stacking layers. This adapter is the only
//! code that touches the canvas.

use super::canvas::{
    EventSink, FlyTo, LayerKind, LayerSpec, ListenerId, ListenerKind, MapCanvas, MarkerId,
};
use super::style::{FillStyle, MarkerStyle, StrokeStyle};
use crate::error::{AppError, Result};
use crate::models::{LngLat, ScreenPoint, Viewport};
use geo::{LineString, Polygon};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, Value};
use std::sync::Arc;

/// Owned handle to a marker on the surface. Not `Clone`: removing it
/// consumes the handle, so a marker can only be removed once.
#[derive(Debug, PartialEq)]
pub struct MarkerHandle {
    id: MarkerId,
    position: LngLat,
}

impl MarkerHandle {
    pub fn position(&self) -> LngLat {
        self.position
    }
}

/// Listener registration that detaches itself when dropped.
pub struct ListenerGuard {
    canvas: Arc<dyn MapCanvas>,
    id: ListenerId,
    kind: ListenerKind,
}

impl ListenerGuard {
    pub fn kind(&self) -> &ListenerKind {
        &self.kind
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        tracing::trace!(listener = self.id.0, kind = ?self.kind, "Detaching listener");
        self.canvas.detach(self.id);
    }
}

/// Pointer cursor shown over the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    Default,
    Pointer,
}

/// Popup body for a facility.
#[derive(Debug, Clone, PartialEq)]
pub struct PopupContent {
    pub name: String,
    pub facility_type: String,
    pub ownership: String,
}

impl PopupContent {
    /// Build from feature properties, tolerating missing keys.
    pub fn from_properties(properties: &geojson::JsonObject) -> Self {
        let text = |key: &str| match properties.get(key) {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        Self {
            name: text("name"),
            facility_type: text("type"),
            ownership: text("ownership"),
        }
    }

    pub fn to_html(&self) -> String {
        format!(
            "<div class=\"popup-content\"><h4>{}</h4><p><strong>Type:</strong> {}</p><p><strong>Ownership:</strong> {}</p></div>",
            escape_html(&self.name),
            escape_html(&self.facility_type),
            escape_html(&self.ownership)
        )
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Gateway to the rendering surface.
#[derive(Clone)]
pub struct MapRenderAdapter {
    canvas: Arc<dyn MapCanvas>,
}

impl MapRenderAdapter {
    pub fn new(canvas: Arc<dyn MapCanvas>) -> Self {
        Self { canvas }
    }

    /// True only after the surface finished its initial style/tile load.
    pub fn is_ready(&self) -> bool {
        self.canvas.is_style_loaded()
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(AppError::Render(AppError::SURFACE_NOT_READY.to_string()))
        }
    }

    fn remove_layers_and_source(&self, layers: &[&str], source: &str) {
        for layer in layers {
            if self.canvas.has_layer(layer) {
                self.canvas.remove_layer(layer);
            }
        }
        if self.canvas.has_source(source) {
            self.canvas.remove_source(source);
        }
    }

    /// Draw (or redraw) a filled, outlined polygon named `name`.
    ///
    /// Uses source `name` with layers `{name}-fill` and `{name}-outline`.
    pub fn upsert_polygon_layer(
        &self,
        name: &str,
        ring: &LineString<f64>,
        fill: &FillStyle,
        stroke: &StrokeStyle,
    ) -> Result<()> {
        self.ensure_ready()?;

        let fill_id = format!("{}-fill", name);
        let outline_id = format!("{}-outline", name);
        self.remove_layers_and_source(&[&fill_id, &outline_id], name);

        let polygon = Polygon::new(ring.clone(), vec![]);
        let feature = Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::from(&polygon))),
            id: None,
            properties: Some(geojson::JsonObject::new()),
            foreign_members: None,
        };

        self.canvas.add_source(name, GeoJson::Feature(feature))?;
        self.canvas.add_layer(LayerSpec {
            id: fill_id,
            kind: LayerKind::Fill,
            source: name.to_string(),
            paint: fill.to_paint(),
        })?;
        self.canvas.add_layer(LayerSpec {
            id: outline_id,
            kind: LayerKind::Line,
            source: name.to_string(),
            paint: stroke.to_paint(),
        })?;

        tracing::debug!(layer = name, points = ring.0.len(), "Polygon layer upserted");
        Ok(())
    }

    /// Replace the point layer `name` (source and circle layer share the name).
    pub fn upsert_point_layer(
        &self,
        name: &str,
        features: Vec<Feature>,
        paint: serde_json::Value,
    ) -> Result<()> {
        self.ensure_ready()?;
        self.remove_layers_and_source(&[name], name);

        let count = features.len();
        let collection = FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        };

        self.canvas
            .add_source(name, GeoJson::FeatureCollection(collection))?;
        self.canvas.add_layer(LayerSpec {
            id: name.to_string(),
            kind: LayerKind::Circle,
            source: name.to_string(),
            paint,
        })?;

        tracing::debug!(layer = name, count, "Point layer upserted");
        Ok(())
    }

    pub fn add_marker(&self, at: LngLat, style: &MarkerStyle) -> Result<MarkerHandle> {
        self.ensure_ready()?;
        let id = self.canvas.add_marker(at, &style.color)?;
        Ok(MarkerHandle { id, position: at })
    }

    pub fn remove_marker(&self, handle: MarkerHandle) {
        self.canvas.remove_marker(handle.id);
    }

    /// Start an animated transition and return the viewport it lands on.
    pub fn fly_to(&self, flight: FlyTo) -> Viewport {
        let target = Viewport::new(flight.center, flight.zoom);
        self.canvas.fly_to(FlyTo {
            zoom: target.zoom,
            ..flight
        });
        target
    }

    pub fn unproject(&self, point: ScreenPoint) -> LngLat {
        self.canvas.unproject(point)
    }

    pub fn show_popup(&self, at: LngLat, content: &PopupContent) {
        self.canvas.show_popup(at, &content.to_html());
    }

    pub fn set_cursor(&self, cursor: Cursor) {
        let css = match cursor {
            Cursor::Default => "",
            Cursor::Pointer => "pointer",
        };
        self.canvas.set_cursor(css);
    }

    fn listen(&self, kind: ListenerKind, sink: EventSink) -> ListenerGuard {
        let id = self.canvas.attach(kind.clone(), sink);
        ListenerGuard {
            canvas: Arc::clone(&self.canvas),
            id,
            kind,
        }
    }

    pub fn on_load(&self, sink: EventSink) -> ListenerGuard {
        self.listen(ListenerKind::Load, sink)
    }

    pub fn on_click(&self, layer: &str, sink: EventSink) -> ListenerGuard {
        self.listen(ListenerKind::Click(layer.to_string()), sink)
    }

    /// Enter and leave both arrive on `sink`.
    pub fn on_hover(&self, layer: &str, sink: EventSink) -> ListenerGuard {
        self.listen(ListenerKind::Hover(layer.to_string()), sink)
    }

    pub fn on_context_menu(&self, sink: EventSink) -> ListenerGuard {
        self.listen(ListenerKind::ContextMenu, sink)
    }

    pub fn on_touch(&self, sink: EventSink) -> ListenerGuard {
        self.listen(ListenerKind::Touch, sink)
    }
}
