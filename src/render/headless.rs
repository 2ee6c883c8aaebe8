// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory map canvas.
//!
//! Keeps the same bookkeeping a browser canvas would (sources, layers,
//! markers, camera, popup, cursor, listeners) and projects with Web
//! Mercator over 512 px tiles. Flights land immediately.

use super::canvas::{
    EventSink, FlyTo, LayerSpec, ListenerId, ListenerKind, MapCanvas, MarkerId, SurfaceEvent,
};
use crate::error::{AppError, Result};
use crate::models::{LngLat, ScreenPoint, Viewport};
use geojson::GeoJson;
use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::sync::{Mutex, MutexGuard, PoisonError};

const TILE_SIZE: f64 = 512.0;

struct Listener {
    id: ListenerId,
    kind: ListenerKind,
    sink: EventSink,
}

struct HeadlessState {
    loaded: bool,
    viewport: Viewport,
    sources: Vec<(String, GeoJson)>,
    layers: Vec<LayerSpec>,
    markers: BTreeMap<u64, (LngLat, String)>,
    flights: Vec<FlyTo>,
    popup: Option<(LngLat, String)>,
    cursor: String,
    listeners: Vec<Listener>,
    next_id: u64,
}

/// Canvas without a display.
pub struct HeadlessCanvas {
    width: f64,
    height: f64,
    state: Mutex<HeadlessState>,
}

impl HeadlessCanvas {
    pub fn new(viewport: Viewport, width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            state: Mutex::new(HeadlessState {
                loaded: false,
                viewport,
                sources: Vec::new(),
                layers: Vec::new(),
                markers: BTreeMap::new(),
                flights: Vec::new(),
                popup: None,
                cursor: String::new(),
                listeners: Vec::new(),
                next_id: 1,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, HeadlessState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark the style as loaded and notify load listeners.
    pub fn finish_loading(&self) {
        self.state().loaded = true;
        tracing::info!("Map style loaded");
        self.emit(SurfaceEvent::Loaded);
    }

    /// Deliver an input event to every listener subscribed to its kind.
    ///
    /// Returns the number of listeners reached.
    pub fn emit(&self, event: SurfaceEvent) -> usize {
        let kind = event.listener_kind();
        let mut state = self.state();
        state.listeners.retain(|l| !l.sink.is_closed());
        let mut delivered = 0;
        for listener in state.listeners.iter().filter(|l| l.kind == kind) {
            if listener.sink.send(event.clone()).is_ok() {
                delivered += 1;
            }
        }
        delivered
    }

    /// Geographic coordinate to canvas pixel.
    pub fn project(&self, at: LngLat) -> ScreenPoint {
        let viewport = self.state().viewport;
        let world = world_size(viewport.zoom);
        let (cx, cy) = mercator(viewport.center(), world);
        let (x, y) = mercator(at, world);
        ScreenPoint::new(x - cx + self.width / 2.0, y - cy + self.height / 2.0)
    }

    pub fn viewport(&self) -> Viewport {
        self.state().viewport
    }

    pub fn flights(&self) -> Vec<FlyTo> {
        self.state().flights.clone()
    }

    pub fn layer_ids(&self) -> Vec<String> {
        self.state().layers.iter().map(|l| l.id.clone()).collect()
    }

    pub fn layer(&self, id: &str) -> Option<LayerSpec> {
        self.state().layers.iter().find(|l| l.id == id).cloned()
    }

    pub fn source_ids(&self) -> Vec<String> {
        self.state().sources.iter().map(|(id, _)| id.clone()).collect()
    }

    pub fn source(&self, id: &str) -> Option<GeoJson> {
        self.state()
            .sources
            .iter()
            .find(|(source_id, _)| source_id == id)
            .map(|(_, data)| data.clone())
    }

    /// Markers currently on the canvas, in creation order.
    pub fn markers(&self) -> Vec<(LngLat, String)> {
        self.state().markers.values().cloned().collect()
    }

    pub fn popup(&self) -> Option<(LngLat, String)> {
        self.state().popup.clone()
    }

    pub fn cursor(&self) -> String {
        self.state().cursor.clone()
    }

    pub fn listener_count(&self) -> usize {
        self.state().listeners.len()
    }
}

fn world_size(zoom: f64) -> f64 {
    TILE_SIZE * 2f64.powf(zoom)
}

fn mercator(at: LngLat, world: f64) -> (f64, f64) {
    let x = (at.lng + 180.0) / 360.0 * world;
    let lat = at.lat.to_radians();
    let y = (1.0 - (PI / 4.0 + lat / 2.0).tan().ln() / PI) / 2.0 * world;
    (x, y)
}

impl MapCanvas for HeadlessCanvas {
    fn is_style_loaded(&self) -> bool {
        self.state().loaded
    }

    fn has_source(&self, id: &str) -> bool {
        self.state().sources.iter().any(|(source_id, _)| source_id == id)
    }

    fn add_source(&self, id: &str, data: GeoJson) -> Result<()> {
        let mut state = self.state();
        if state.sources.iter().any(|(source_id, _)| source_id == id) {
            return Err(AppError::Render(format!("source {} already exists", id)));
        }
        state.sources.push((id.to_string(), data));
        Ok(())
    }

    fn remove_source(&self, id: &str) {
        let mut state = self.state();
        if state.layers.iter().any(|l| l.source == id) {
            tracing::warn!(source = id, "Refusing to remove source still in use by a layer");
            return;
        }
        state.sources.retain(|(source_id, _)| source_id != id);
    }

    fn has_layer(&self, id: &str) -> bool {
        self.state().layers.iter().any(|l| l.id == id)
    }

    fn add_layer(&self, layer: LayerSpec) -> Result<()> {
        let mut state = self.state();
        if state.layers.iter().any(|l| l.id == layer.id) {
            return Err(AppError::Render(format!("layer {} already exists", layer.id)));
        }
        if !state.sources.iter().any(|(id, _)| *id == layer.source) {
            return Err(AppError::Render(format!(
                "layer {} references missing source {}",
                layer.id, layer.source
            )));
        }
        state.layers.push(layer);
        Ok(())
    }

    fn remove_layer(&self, id: &str) {
        self.state().layers.retain(|l| l.id != id);
    }

    fn add_marker(&self, at: LngLat, color: &str) -> Result<MarkerId> {
        let mut state = self.state();
        let id = state.next_id;
        state.next_id += 1;
        state.markers.insert(id, (at, color.to_string()));
        tracing::debug!(marker = id, lng = at.lng, lat = at.lat, color, "Marker added");
        Ok(MarkerId(id))
    }

    fn remove_marker(&self, marker: MarkerId) {
        if self.state().markers.remove(&marker.0).is_some() {
            tracing::debug!(marker = marker.0, "Marker removed");
        }
    }

    fn fly_to(&self, flight: FlyTo) {
        let mut state = self.state();
        state.viewport = Viewport::new(flight.center, flight.zoom);
        state.flights.push(flight);
        tracing::info!(
            lng = flight.center.lng,
            lat = flight.center.lat,
            zoom = flight.zoom,
            duration_ms = flight.duration.as_millis() as u64,
            "Flying to"
        );
    }

    fn unproject(&self, point: ScreenPoint) -> LngLat {
        let viewport = self.state().viewport;
        let world = world_size(viewport.zoom);
        let (cx, cy) = mercator(viewport.center(), world);
        let x = cx + (point.x - self.width / 2.0);
        let y = cy + (point.y - self.height / 2.0);

        let lng = x / world * 360.0 - 180.0;
        let lat = (PI * (1.0 - 2.0 * y / world)).sinh().atan().to_degrees();
        LngLat::new(lng, lat)
    }

    fn show_popup(&self, at: LngLat, html: &str) {
        self.state().popup = Some((at, html.to_string()));
        tracing::info!(lng = at.lng, lat = at.lat, "Popup opened");
    }

    fn set_cursor(&self, cursor: &str) {
        self.state().cursor = cursor.to_string();
    }

    fn attach(&self, kind: ListenerKind, sink: EventSink) -> ListenerId {
        let mut state = self.state();
        let id = ListenerId(state.next_id);
        state.next_id += 1;
        state.listeners.push(Listener { id, kind, sink });
        id
    }

    fn detach(&self, id: ListenerId) {
        self.state().listeners.retain(|l| l.id != id);
    }
}
