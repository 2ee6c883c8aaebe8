// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Callbacks into the presentational layer (forms, overlays, status bar).

use crate::models::LngLat;
use std::fmt;

/// Blocking notice shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    LocationNotFound,
    SearchFailed,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::LocationNotFound => {
                f.write_str("Location not found. Please try a different search term.")
            }
            Notice::SearchFailed => f.write_str("Error performing search. Please try again."),
        }
    }
}

/// The widgets around the map. All methods default to doing nothing.
pub trait MapUi: Send + Sync {
    /// Ask for a radius around `center`.
    fn prompt_radius(&self, _center: LngLat) {}
    fn close_radius_prompt(&self) {}
    fn notify(&self, _notice: Notice) {}
    fn set_loading(&self, _loading: bool) {}
    fn set_searching(&self, _searching: bool) {}
    /// Options for the facility-type dropdown.
    fn facility_types_changed(&self, _types: &[String]) {}
    /// Standard/uploaded totals for the status bar.
    fn facility_counts_changed(&self, _standard: usize, _uploaded: usize) {}
}

/// Writes every UI callback to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingUi;

impl MapUi for TracingUi {
    fn prompt_radius(&self, center: LngLat) {
        tracing::info!(lng = center.lng, lat = center.lat, "Enter radius in km");
    }

    fn close_radius_prompt(&self) {
        tracing::debug!("Radius prompt closed");
    }

    fn notify(&self, notice: Notice) {
        tracing::warn!(notice = %notice, "Notice");
    }

    fn set_loading(&self, loading: bool) {
        tracing::info!(loading, "Loading state changed");
    }

    fn set_searching(&self, searching: bool) {
        tracing::debug!(searching, "Searching state changed");
    }

    fn facility_types_changed(&self, types: &[String]) {
        tracing::info!(types = ?types, "Facility types available");
    }

    fn facility_counts_changed(&self, standard: usize, uploaded: usize) {
        tracing::info!(standard, uploaded, "Facility counts");
    }
}
