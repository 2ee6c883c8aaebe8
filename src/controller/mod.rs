// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Map controller: the single owner of map state.
//!
//! Runs as one task. UI commands, surface events and the results of timers
//! and requests are handled one at a time, so state needs no locking.
//! Timers and network calls are spawned into a `JoinSet` and report back
//! as [`Completion`]s. Anything whose generation is no longer current when
//! it lands is dropped.

pub mod facilities;
pub mod gesture;
pub mod search;
pub mod spatial;
pub mod ui;

use crate::config::{Config, Timings};
use crate::error::{AppError, Result};
use crate::loading::{LoadingEdge, LoadingState};
use crate::models::{Facility, LngLat, RadiusQuery, ScreenPoint, Viewport};
use crate::render::{
    Cursor, FeatureHit, FlyTo, ListenerGuard, MapCanvas, MapRenderAdapter, PopupContent,
    SurfaceEvent,
};
use crate::services::{fetch_with_retry, FacilityApi, FacilityResource, Geocoder, RetryPolicy};
use facilities::{log_render_error, FacilitySync, InitialData, RefreshReason, FACILITY_LAYER};
use gesture::GestureController;
use search::{SearchDebouncer, SearchOutcome};
use spatial::SpatialQuery;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;
use ui::{MapUi, Notice};

/// Requests from the UI.
#[derive(Debug)]
enum Command {
    Search(String),
    SelectFacilityType(String),
    SubmitRadius {
        radius_km: f64,
        reply: oneshot::Sender<Result<Viewport>>,
    },
    DismissRadius,
    UploadSucceeded(Option<Vec<Facility>>),
    Snapshot(oneshot::Sender<MapSnapshot>),
    Shutdown,
}

/// Output of a spawned timer or request.
#[derive(Debug)]
enum Completion {
    LongPress {
        generation: u64,
    },
    SearchQuiet {
        input: u64,
    },
    Geocoded {
        lookup: u64,
        query: String,
        result: Result<Option<LngLat>>,
    },
    InitialLoad {
        generation: u64,
        data: InitialData,
    },
    UploadedRefreshed {
        generation: u64,
        result: Result<Vec<Facility>>,
    },
    PollTick,
    LoadingSettled,
}

/// Point-in-time view of the controller state.
#[derive(Debug, Clone)]
pub struct MapSnapshot {
    pub viewport: Viewport,
    pub filtered: Vec<Facility>,
    pub standard_count: usize,
    pub uploaded_count: usize,
    pub selected_type: String,
    pub facility_types: Vec<String>,
    pub pending_query: Option<RadiusQuery>,
    pub has_temporary_marker: bool,
    pub loading: bool,
    pub searching: bool,
    pub ready: bool,
}

/// Cloneable handle used by the UI to drive the controller.
#[derive(Clone)]
pub struct MapHandle {
    commands: mpsc::UnboundedSender<Command>,
}

impl MapHandle {
    fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| AppError::ControllerClosed)
    }

    /// Free-text location search (debounced).
    pub fn search(&self, query: impl Into<String>) -> Result<()> {
        self.send(Command::Search(query.into()))
    }

    /// Filter by facility type; an empty string shows every type.
    pub fn select_facility_type(&self, facility_type: impl Into<String>) -> Result<()> {
        self.send(Command::SelectFacilityType(facility_type.into()))
    }

    /// Apply a radius to the pending spatial query.
    pub async fn submit_radius(&self, radius_km: f64) -> Result<Viewport> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::SubmitRadius { radius_km, reply })?;
        rx.await.map_err(|_| AppError::ControllerClosed)?
    }

    /// Close the radius prompt without applying it.
    pub fn dismiss_radius(&self) -> Result<()> {
        self.send(Command::DismissRadius)
    }

    /// An upload finished. `Some` carries the fresh uploaded set; `None`
    /// asks the controller to fetch it.
    pub fn upload_succeeded(&self, uploaded: Option<Vec<Facility>>) -> Result<()> {
        self.send(Command::UploadSucceeded(uploaded))
    }

    pub async fn snapshot(&self) -> Result<MapSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Snapshot(reply))?;
        rx.await.map_err(|_| AppError::ControllerClosed)
    }

    /// Stop the controller. It tears down once it processes this.
    pub fn shutdown(&self) -> Result<()> {
        self.send(Command::Shutdown)
    }
}

/// The map controller. Create with [`MapController::mount`], then `run()`.
pub struct MapController<A, G> {
    adapter: MapRenderAdapter,
    api: Arc<A>,
    geocoder: Arc<G>,
    ui: Arc<dyn MapUi>,
    timings: Timings,

    commands: mpsc::UnboundedReceiver<Command>,
    surface_events: mpsc::UnboundedReceiver<SurfaceEvent>,
    listeners: Vec<ListenerGuard>,
    tasks: JoinSet<Completion>,

    viewport: Viewport,
    loading: LoadingState,
    started: bool,
    gestures: GestureController,
    search: SearchDebouncer,
    spatial: SpatialQuery,
    facilities: FacilitySync,
}

impl<A: FacilityApi, G: Geocoder> MapController<A, G> {
    /// Attach to `canvas` and register every surface listener.
    pub fn mount(
        canvas: Arc<dyn MapCanvas>,
        api: A,
        geocoder: G,
        ui: Arc<dyn MapUi>,
        config: &Config,
    ) -> (Self, MapHandle) {
        let adapter = MapRenderAdapter::new(canvas);
        let (command_tx, commands) = mpsc::unbounded_channel();
        let (surface_tx, surface_events) = mpsc::unbounded_channel();

        let listeners = vec![
            adapter.on_load(surface_tx.clone()),
            adapter.on_context_menu(surface_tx.clone()),
            adapter.on_touch(surface_tx.clone()),
            adapter.on_click(FACILITY_LAYER, surface_tx.clone()),
            adapter.on_hover(FACILITY_LAYER, surface_tx.clone()),
        ];

        // The load event has already been missed if the style is loaded.
        if adapter.is_ready() {
            let _ = surface_tx.send(SurfaceEvent::Loaded);
        }

        tracing::info!(
            lng = config.initial_viewport.longitude,
            lat = config.initial_viewport.latitude,
            zoom = config.initial_viewport.zoom,
            "Map controller mounted"
        );

        let controller = Self {
            adapter,
            api: Arc::new(api),
            geocoder: Arc::new(geocoder),
            ui,
            timings: config.timings,
            commands,
            surface_events,
            listeners,
            tasks: JoinSet::new(),
            viewport: config.initial_viewport,
            loading: LoadingState::default(),
            started: false,
            gestures: GestureController::default(),
            search: SearchDebouncer::default(),
            spatial: SpatialQuery::default(),
            facilities: FacilitySync::default(),
        };

        (
            controller,
            MapHandle {
                commands: command_tx,
            },
        )
    }

    /// Process events until shutdown, then tear down.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },
                Some(event) = self.surface_events.recv() => self.handle_surface_event(event),
                Some(joined) = self.tasks.join_next(), if !self.tasks.is_empty() => match joined {
                    Ok(completion) => self.handle_completion(completion),
                    Err(e) if e.is_cancelled() => {}
                    Err(e) => tracing::error!(error = %e, "Background task failed"),
                },
            }
        }
        self.teardown().await;
    }

    async fn teardown(mut self) {
        self.gestures.cancel();
        self.search.cancel();
        self.tasks.shutdown().await;
        self.spatial.dismiss(&self.adapter);
        let detached = self.listeners.len();
        self.listeners.clear();
        tracing::info!(detached, "Map controller stopped");
    }

    // ─── Dispatch ────────────────────────────────────────────────────────────

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Search(query) => {
                let input = self.search.input(query);
                let delay = self.timings.search_debounce;
                let handle = self.tasks.spawn(async move {
                    tokio::time::sleep(delay).await;
                    Completion::SearchQuiet { input }
                });
                self.search.attach_timer(input, handle);
            }
            Command::SelectFacilityType(facility_type) => {
                if self.facilities.select_type(facility_type) {
                    self.render_facilities();
                }
            }
            Command::SubmitRadius { radius_km, reply } => {
                let result =
                    self.spatial
                        .submit(radius_km, &self.adapter, self.timings.radius_flight);
                match &result {
                    Ok(viewport) => {
                        self.viewport = *viewport;
                        self.ui.close_radius_prompt();
                    }
                    Err(e) => tracing::warn!(radius_km, error = %e, "Radius rejected"),
                }
                let _ = reply.send(result);
            }
            Command::DismissRadius => {
                if self.spatial.dismiss(&self.adapter) {
                    tracing::debug!("Spatial query dismissed");
                }
                self.ui.close_radius_prompt();
            }
            Command::UploadSucceeded(Some(uploaded)) => {
                self.facilities.replace_uploaded(uploaded);
                self.render_facilities();
            }
            Command::UploadSucceeded(None) => self.refresh_uploaded(RefreshReason::UploadSucceeded),
            Command::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
            Command::Shutdown => {}
        }
    }

    fn handle_surface_event(&mut self, event: SurfaceEvent) {
        match event {
            SurfaceEvent::Loaded => self.on_ready(),
            SurfaceEvent::ContextMenu { lng_lat } => self.request_spatial_query(lng_lat),
            SurfaceEvent::TouchStart { touches } => self.on_touch_start(&touches),
            SurfaceEvent::TouchMove { touches } => self.gestures.touch_move(&touches),
            SurfaceEvent::TouchEnd | SurfaceEvent::TouchCancel => self.gestures.touch_end(),
            SurfaceEvent::FeatureClick { layer, hit } if layer == FACILITY_LAYER => {
                self.open_popup(&hit)
            }
            SurfaceEvent::PointerEnter { layer } if layer == FACILITY_LAYER => {
                self.adapter.set_cursor(Cursor::Pointer)
            }
            SurfaceEvent::PointerLeave { layer } if layer == FACILITY_LAYER => {
                self.adapter.set_cursor(Cursor::Default)
            }
            other => tracing::trace!(event = ?other, "Ignoring surface event"),
        }
    }

    fn handle_completion(&mut self, completion: Completion) {
        match completion {
            Completion::LongPress { generation } => {
                if let Some(point) = self.gestures.timer_fired(generation, &self.adapter) {
                    self.request_spatial_query(point);
                }
            }
            Completion::SearchQuiet { input } => {
                if let Some((lookup, query)) = self.search.quiet_period_elapsed(input) {
                    self.start_geocode(lookup, query);
                }
            }
            Completion::Geocoded {
                lookup,
                query,
                result,
            } => self.finish_geocode(lookup, &query, result),
            Completion::InitialLoad { generation, data } => {
                let follow_up = self.facilities.apply_initial(generation, data);
                self.ui
                    .facility_types_changed(self.facilities.facility_types());
                self.render_facilities();

                let delay = self.timings.loading_clear_delay;
                self.tasks.spawn(async move {
                    tokio::time::sleep(delay).await;
                    Completion::LoadingSettled
                });

                if follow_up {
                    self.refresh_uploaded(RefreshReason::UploadSucceeded);
                }
            }
            Completion::UploadedRefreshed { generation, result } => {
                let (changed, follow_up) = self.facilities.finish_refresh(generation, result);
                if changed {
                    self.render_facilities();
                }
                if follow_up {
                    self.refresh_uploaded(RefreshReason::UploadSucceeded);
                }
            }
            Completion::PollTick => {
                self.schedule_poll();
                self.refresh_uploaded(RefreshReason::Poll);
            }
            Completion::LoadingSettled => {
                if let Some(LoadingEdge::Finished) = self.loading.end_load() {
                    self.ui.set_loading(false);
                }
            }
        }
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────────

    fn on_ready(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        tracing::info!("Map ready, loading facilities");

        if let Some(LoadingEdge::Started) = self.loading.begin_load() {
            self.ui.set_loading(true);
        }

        let generation = self.facilities.begin_initial_load();
        let api = Arc::clone(&self.api);
        let policy = self.retry_policy();
        self.tasks.spawn(async move {
            let (standard, facility_types, uploaded) = tokio::join!(
                fetch_with_retry(FacilityResource::Facilities, policy, || api.facilities()),
                fetch_with_retry(FacilityResource::FacilityTypes, policy, || api
                    .facility_types()),
                fetch_with_retry(FacilityResource::UploadedFacilities, policy, || api
                    .uploaded_facilities()),
            );
            Completion::InitialLoad {
                generation,
                data: InitialData {
                    standard: standard.unwrap_or_default(),
                    facility_types: facility_types.unwrap_or_default(),
                    uploaded: uploaded.unwrap_or_default(),
                },
            }
        });

        self.schedule_poll();
    }

    fn schedule_poll(&mut self) {
        let interval = self.timings.poll_interval;
        self.tasks.spawn(async move {
            tokio::time::sleep(interval).await;
            Completion::PollTick
        });
    }

    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.timings.fetch_attempts,
            backoff: self.timings.fetch_backoff,
        }
    }

    // ─── Facilities ──────────────────────────────────────────────────────────

    fn refresh_uploaded(&mut self, reason: RefreshReason) {
        let Some(generation) = self.facilities.begin_refresh(reason) else {
            return;
        };
        tracing::debug!(reason = ?reason, "Refreshing uploaded facilities");

        let api = Arc::clone(&self.api);
        let policy = self.retry_policy();
        self.tasks.spawn(async move {
            let result = fetch_with_retry(FacilityResource::UploadedFacilities, policy, || {
                api.uploaded_facilities()
            })
            .await;
            Completion::UploadedRefreshed { generation, result }
        });
    }

    fn render_facilities(&mut self) {
        match self.facilities.render(&self.adapter) {
            Ok(count) => tracing::debug!(count, "Facility layer rendered"),
            Err(e) => log_render_error(&e),
        }
        self.ui.facility_counts_changed(
            self.facilities.standard().len(),
            self.facilities.uploaded().len(),
        );
    }

    fn open_popup(&self, hit: &FeatureHit) {
        let content = PopupContent::from_properties(&hit.properties);
        self.adapter.show_popup(hit.position, &content);
    }

    // ─── Gestures ────────────────────────────────────────────────────────────

    fn on_touch_start(&mut self, touches: &[ScreenPoint]) {
        if let Some(generation) = self.gestures.touch_start(touches) {
            let delay = self.timings.long_press;
            let handle = self.tasks.spawn(async move {
                tokio::time::sleep(delay).await;
                Completion::LongPress { generation }
            });
            self.gestures.attach_timer(generation, handle);
        }
    }

    fn request_spatial_query(&mut self, point: LngLat) {
        match self.spatial.request(point, &self.adapter) {
            Ok(query) => self.ui.prompt_radius(query.center),
            Err(e) => tracing::warn!(error = %e, "Spatial query ignored"),
        }
    }

    // ─── Search ──────────────────────────────────────────────────────────────

    fn start_geocode(&mut self, lookup: u64, query: String) {
        self.ui.set_searching(true);
        let geocoder = Arc::clone(&self.geocoder);
        self.tasks.spawn(async move {
            let result = geocoder.locate(&query).await;
            Completion::Geocoded {
                lookup,
                query,
                result,
            }
        });
    }

    fn finish_geocode(&mut self, lookup: u64, query: &str, result: Result<Option<LngLat>>) {
        let outcome = self.search.resolve(lookup, result);
        if !self.search.is_searching() {
            self.ui.set_searching(false);
        }

        match outcome {
            SearchOutcome::Found(center) => {
                self.viewport = self.adapter.fly_to(FlyTo {
                    center,
                    zoom: self.timings.search_zoom,
                    duration: self.timings.search_flight,
                    curve: Some(self.timings.search_curve),
                });
                tracing::info!(query, lng = center.lng, lat = center.lat, "Search result");
            }
            SearchOutcome::NotFound => {
                tracing::info!(query, "Search found nothing");
                self.ui.notify(Notice::LocationNotFound);
            }
            SearchOutcome::Failed(e) => {
                tracing::warn!(query, error = %e, "Search failed");
                self.ui.notify(Notice::SearchFailed);
            }
            SearchOutcome::Stale => {
                tracing::debug!(query, lookup, "Dropping response for superseded search");
            }
        }
    }

    fn snapshot(&self) -> MapSnapshot {
        MapSnapshot {
            viewport: self.viewport,
            filtered: self.facilities.filtered(),
            standard_count: self.facilities.standard().len(),
            uploaded_count: self.facilities.uploaded().len(),
            selected_type: self.facilities.selected_type().to_string(),
            facility_types: self.facilities.facility_types().to_vec(),
            pending_query: self.spatial.pending(),
            has_temporary_marker: self.spatial.has_marker(),
            loading: self.loading.is_loading(),
            searching: self.search.is_searching(),
            ready: self.adapter.is_ready(),
        }
    }
}
