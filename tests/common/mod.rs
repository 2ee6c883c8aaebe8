// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use facility_map::config::Config;
use facility_map::controller::ui::{MapUi, Notice};
use facility_map::error::{AppError, Result};
use facility_map::models::{Facility, FacilityId, FacilitySource, LngLat};
use facility_map::render::HeadlessCanvas;
use facility_map::services::{FacilityApi, Geocoder};
use facility_map::{MapController, MapHandle};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

#[allow(dead_code)]
pub fn facility(id: i64, name: &str, facility_type: &str, lng: f64, lat: f64) -> Facility {
    Facility {
        id: FacilityId::Number(id),
        name: name.to_string(),
        facility_type: facility_type.to_string(),
        ownership: "Public".to_string(),
        latitude: lat,
        longitude: lng,
        source: FacilitySource::Standard,
    }
}

/// Let every task run until idle. Advances the paused clock by 1ms.
#[allow(dead_code)]
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

// ─── Facility API ────────────────────────────────────────────────────────────

#[derive(Default)]
struct ApiState {
    standard: Vec<Facility>,
    facility_types: Vec<String>,
    uploaded: Vec<Facility>,
    /// Remaining forced failures per resource
    failures: HashMap<&'static str, u32>,
    uploaded_delay: Duration,
    calls: HashMap<&'static str, u32>,
}

/// In-memory facility API whose responses tests can change at any time.
#[derive(Clone, Default)]
pub struct FakeFacilityApi {
    state: Arc<Mutex<ApiState>>,
}

#[allow(dead_code)]
impl FakeFacilityApi {
    pub fn new(standard: Vec<Facility>, facility_types: &[&str], uploaded: Vec<Facility>) -> Self {
        let api = Self::default();
        {
            let mut state = api.state.lock().unwrap();
            state.standard = standard;
            state.facility_types = facility_types.iter().map(|t| t.to_string()).collect();
            state.uploaded = uploaded;
        }
        api
    }

    pub fn set_uploaded(&self, uploaded: Vec<Facility>) {
        self.state.lock().unwrap().uploaded = uploaded;
    }

    /// Fail the next `count` requests for `resource`.
    pub fn fail(&self, resource: &'static str, count: u32) {
        self.state.lock().unwrap().failures.insert(resource, count);
    }

    pub fn set_uploaded_delay(&self, delay: Duration) {
        self.state.lock().unwrap().uploaded_delay = delay;
    }

    pub fn calls(&self, resource: &'static str) -> u32 {
        self.state
            .lock()
            .unwrap()
            .calls
            .get(resource)
            .copied()
            .unwrap_or(0)
    }

    /// Count the call and consume a forced failure if one is pending.
    fn record(&self, resource: &'static str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        *state.calls.entry(resource).or_default() += 1;
        match state.failures.get_mut(resource) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                Err(AppError::FacilityApi(format!("{}: HTTP 503", resource)))
            }
            _ => Ok(()),
        }
    }
}

impl FacilityApi for FakeFacilityApi {
    async fn facilities(&self) -> Result<Vec<Facility>> {
        self.record("facilities")?;
        Ok(self.state.lock().unwrap().standard.clone())
    }

    async fn facility_types(&self) -> Result<Vec<String>> {
        self.record("facility-types")?;
        Ok(self.state.lock().unwrap().facility_types.clone())
    }

    async fn uploaded_facilities(&self) -> Result<Vec<Facility>> {
        let delay = self.state.lock().unwrap().uploaded_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.record("uploaded-facilities")?;
        Ok(self.state.lock().unwrap().uploaded.clone())
    }
}

// ─── Geocoder ────────────────────────────────────────────────────────────────

#[derive(Default)]
struct GeocoderState {
    places: HashMap<String, LngLat>,
    delays: HashMap<String, Duration>,
    failing: bool,
    queries: Vec<String>,
}

/// Geocoder answering from a fixed table.
#[derive(Clone, Default)]
pub struct FakeGeocoder {
    state: Arc<Mutex<GeocoderState>>,
}

#[allow(dead_code)]
impl FakeGeocoder {
    pub fn with_place(self, query: &str, at: LngLat) -> Self {
        self.state
            .lock()
            .unwrap()
            .places
            .insert(query.to_string(), at);
        self
    }

    pub fn with_delay(self, query: &str, delay: Duration) -> Self {
        self.state
            .lock()
            .unwrap()
            .delays
            .insert(query.to_string(), delay);
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.state.lock().unwrap().failing = failing;
    }

    pub fn queries(&self) -> Vec<String> {
        self.state.lock().unwrap().queries.clone()
    }
}

impl Geocoder for FakeGeocoder {
    async fn locate(&self, query: &str) -> Result<Option<LngLat>> {
        let delay = {
            let mut state = self.state.lock().unwrap();
            state.queries.push(query.to_string());
            state.delays.get(query).copied()
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.state.lock().unwrap();
        if state.failing {
            return Err(AppError::Geocode("HTTP 500".to_string()));
        }
        Ok(state.places.get(query).copied())
    }
}

// ─── UI ──────────────────────────────────────────────────────────────────────

/// Everything the controller told the UI, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    PromptRadius(LngLat),
    CloseRadiusPrompt,
    Notify(Notice),
    Loading(bool),
    Searching(bool),
    FacilityTypes(Vec<String>),
    Counts(usize, usize),
}

#[derive(Default)]
pub struct RecordingUi {
    events: Mutex<Vec<UiEvent>>,
}

#[allow(dead_code)]
impl RecordingUi {
    pub fn events(&self) -> Vec<UiEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                UiEvent::Notify(notice) => Some(notice),
                _ => None,
            })
            .collect()
    }

    pub fn loading_transitions(&self) -> Vec<bool> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                UiEvent::Loading(loading) => Some(loading),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: UiEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl MapUi for RecordingUi {
    fn prompt_radius(&self, center: LngLat) {
        self.push(UiEvent::PromptRadius(center));
    }

    fn close_radius_prompt(&self) {
        self.push(UiEvent::CloseRadiusPrompt);
    }

    fn notify(&self, notice: Notice) {
        self.push(UiEvent::Notify(notice));
    }

    fn set_loading(&self, loading: bool) {
        self.push(UiEvent::Loading(loading));
    }

    fn set_searching(&self, searching: bool) {
        self.push(UiEvent::Searching(searching));
    }

    fn facility_types_changed(&self, types: &[String]) {
        self.push(UiEvent::FacilityTypes(types.to_vec()));
    }

    fn facility_counts_changed(&self, standard: usize, uploaded: usize) {
        self.push(UiEvent::Counts(standard, uploaded));
    }
}

// ─── Harness ─────────────────────────────────────────────────────────────────

/// A running controller mounted on a headless canvas.
#[allow(dead_code)]
pub struct TestMap {
    pub canvas: Arc<HeadlessCanvas>,
    pub api: FakeFacilityApi,
    pub geocoder: FakeGeocoder,
    pub ui: Arc<RecordingUi>,
    pub handle: MapHandle,
    pub task: JoinHandle<()>,
}

/// Mount a controller and spawn it. The canvas is not loaded yet.
#[allow(dead_code)]
pub fn mount(api: FakeFacilityApi, geocoder: FakeGeocoder) -> TestMap {
    let config = Config::test_default();
    let canvas = Arc::new(HeadlessCanvas::new(config.initial_viewport, 800.0, 600.0));
    let ui = Arc::new(RecordingUi::default());

    let (controller, handle) = MapController::mount(
        canvas.clone(),
        api.clone(),
        geocoder.clone(),
        ui.clone(),
        &config,
    );
    let task = tokio::spawn(controller.run());

    TestMap {
        canvas,
        api,
        geocoder,
        ui,
        handle,
        task,
    }
}

/// Mount, load the style, and wait for the initial data.
#[allow(dead_code)]
pub async fn mount_loaded(api: FakeFacilityApi, geocoder: FakeGeocoder) -> TestMap {
    let map = mount(api, geocoder);
    map.canvas.finish_loading();
    settle().await;
    map
}
