// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Facility collections, the type filter and the rendered facility layer.
//!
//! The rendered layer is always a full replace computed from
//! `(standard, uploaded, selected type)`; nothing patches it directly.

use crate::error::{AppError, Result};
use crate::models::Facility;
use crate::render::style::facility_paint;
use crate::render::MapRenderAdapter;

/// Source/layer name of the facility points.
pub const FACILITY_LAYER: &str = "facilities";

/// Standard facilities followed by uploaded ones, filtered by type.
///
/// An empty `selected_type` means every type. Source order is preserved so
/// markers do not reshuffle between renders.
pub fn filter_facilities(
    standard: &[Facility],
    uploaded: &[Facility],
    selected_type: &str,
) -> Vec<Facility> {
    standard
        .iter()
        .cloned()
        .chain(uploaded.iter().cloned().map(Facility::into_uploaded))
        .filter(|f| selected_type.is_empty() || f.facility_type == selected_type)
        .collect()
}

/// Why an uploaded-facility refresh was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshReason {
    Poll,
    UploadSucceeded,
}

/// Data gathered by the initial load.
#[derive(Debug, Default)]
pub struct InitialData {
    pub standard: Vec<Facility>,
    pub facility_types: Vec<String>,
    pub uploaded: Vec<Facility>,
}

#[derive(Debug, Default)]
pub struct FacilitySync {
    standard: Vec<Facility>,
    uploaded: Vec<Facility>,
    facility_types: Vec<String>,
    selected_type: String,
    /// Bumped whenever `uploaded` is replaced.
    uploaded_generation: u64,
    refresh_in_flight: bool,
    refresh_queued: bool,
}

impl FacilitySync {
    pub fn standard(&self) -> &[Facility] {
        &self.standard
    }

    pub fn uploaded(&self) -> &[Facility] {
        &self.uploaded
    }

    pub fn facility_types(&self) -> &[String] {
        &self.facility_types
    }

    pub fn selected_type(&self) -> &str {
        &self.selected_type
    }

    pub fn filtered(&self) -> Vec<Facility> {
        filter_facilities(&self.standard, &self.uploaded, &self.selected_type)
    }

    /// Mark the initial load as the in-flight uploaded fetch.
    ///
    /// Returns the generation to hand back to [`Self::apply_initial`].
    pub fn begin_initial_load(&mut self) -> u64 {
        self.refresh_in_flight = true;
        self.uploaded_generation
    }

    /// Store the initial load. Returns true if a refresh was queued meanwhile.
    pub fn apply_initial(&mut self, generation: u64, data: InitialData) -> bool {
        self.standard = data.standard;
        self.facility_types = data.facility_types;
        if generation == self.uploaded_generation {
            self.set_uploaded(data.uploaded);
        } else {
            tracing::debug!("Uploaded facilities replaced during initial load, keeping newer");
        }
        self.finish_in_flight()
    }

    /// Try to start an uploaded refresh.
    ///
    /// Returns the generation the fetch is based on, or `None` when a fetch
    /// is already running. Poll ticks are skipped in that case; upload
    /// signals queue one follow-up fetch.
    pub fn begin_refresh(&mut self, reason: RefreshReason) -> Option<u64> {
        if self.refresh_in_flight {
            match reason {
                RefreshReason::Poll => {
                    tracing::debug!("Uploaded refresh still in flight, skipping poll tick");
                }
                RefreshReason::UploadSucceeded => {
                    tracing::debug!("Uploaded refresh in flight, queueing follow-up");
                    self.refresh_queued = true;
                }
            }
            return None;
        }
        self.refresh_in_flight = true;
        Some(self.uploaded_generation)
    }

    /// Apply a refresh result.
    ///
    /// Returns `(changed, follow_up)`: whether the uploaded set was replaced
    /// and whether a queued refresh should start now. Failures keep the
    /// previous collection.
    pub fn finish_refresh(
        &mut self,
        generation: u64,
        result: Result<Vec<Facility>>,
    ) -> (bool, bool) {
        let changed = match result {
            Ok(facilities) if generation == self.uploaded_generation => {
                self.set_uploaded(facilities);
                true
            }
            Ok(_) => {
                tracing::debug!("Discarding uploaded refresh older than current data");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "Uploaded facilities refresh failed, keeping previous");
                false
            }
        };
        (changed, self.finish_in_flight())
    }

    /// Replace the uploaded set with a payload delivered by the upload flow.
    pub fn replace_uploaded(&mut self, facilities: Vec<Facility>) {
        self.set_uploaded(facilities);
    }

    /// Select a facility type; empty selects all. Returns whether it changed.
    pub fn select_type(&mut self, facility_type: String) -> bool {
        if self.selected_type == facility_type {
            return false;
        }
        tracing::info!(facility_type = %facility_type, "Facility type filter changed");
        self.selected_type = facility_type;
        true
    }

    /// Replace the facility layer with the current filtered set.
    pub fn render(&self, adapter: &MapRenderAdapter) -> Result<usize> {
        let features: Vec<_> = self.filtered().iter().map(Facility::to_feature).collect();
        let count = features.len();
        adapter.upsert_point_layer(FACILITY_LAYER, features, facility_paint())?;
        Ok(count)
    }

    fn set_uploaded(&mut self, facilities: Vec<Facility>) {
        self.uploaded = facilities.into_iter().map(Facility::into_uploaded).collect();
        self.uploaded_generation += 1;
        tracing::info!(count = self.uploaded.len(), "Uploaded facilities replaced");
    }

    fn finish_in_flight(&mut self) -> bool {
        self.refresh_in_flight = false;
        std::mem::take(&mut self.refresh_queued)
    }
}

/// Log a render failure; rendering problems never escape to callers.
pub(crate) fn log_render_error(err: &AppError) {
    if err.is_not_ready() {
        tracing::debug!("Facility layer deferred until the map is ready");
    } else {
        tracing::error!(error = %err, "Failed to render facility layer");
    }
}
