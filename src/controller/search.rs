// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trailing-edge debounce for location search.
//!
//! Every keystroke restarts the quiet-period timer; only the text present
//! when the timer fires is geocoded. Lookups are numbered when they fire,
//! and a response is applied only if it belongs to the most recently fired
//! lookup, so a slow answer to an older query cannot move the map.

use crate::error::AppError;
use crate::models::LngLat;
use tokio::task::AbortHandle;

/// What to do with a geocode response.
#[derive(Debug)]
pub enum SearchOutcome {
    Found(LngLat),
    NotFound,
    Failed(AppError),
    /// A newer lookup fired since this one; drop it.
    Stale,
}

#[derive(Debug, Default)]
pub struct SearchDebouncer {
    latest_input: u64,
    latest_query: String,
    timer: Option<AbortHandle>,
    fired: u64,
    in_flight: usize,
}

impl SearchDebouncer {
    /// Record new text and return the id to arm the quiet-period timer with.
    pub fn input(&mut self, query: String) -> u64 {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.latest_input += 1;
        self.latest_query = query;
        self.latest_input
    }

    pub fn attach_timer(&mut self, input: u64, handle: AbortHandle) {
        if input == self.latest_input {
            self.timer = Some(handle);
        } else {
            handle.abort();
        }
    }

    /// The quiet period for `input` elapsed.
    ///
    /// Returns the lookup id and text to geocode, or `None` if newer input
    /// arrived or the text is blank.
    pub fn quiet_period_elapsed(&mut self, input: u64) -> Option<(u64, String)> {
        if input != self.latest_input {
            return None;
        }
        self.timer = None;

        let query = self.latest_query.trim();
        if query.is_empty() {
            return None;
        }

        self.fired += 1;
        self.in_flight += 1;
        tracing::debug!(lookup = self.fired, query, "Search debounce fired");
        Some((self.fired, query.to_string()))
    }

    /// Classify the response for lookup `lookup`.
    pub fn resolve(
        &mut self,
        lookup: u64,
        result: crate::error::Result<Option<LngLat>>,
    ) -> SearchOutcome {
        self.in_flight = self.in_flight.saturating_sub(1);
        if lookup != self.fired {
            return SearchOutcome::Stale;
        }
        match result {
            Ok(Some(point)) => SearchOutcome::Found(point),
            Ok(None) => SearchOutcome::NotFound,
            Err(e) => SearchOutcome::Failed(e),
        }
    }

    pub fn is_searching(&self) -> bool {
        self.in_flight > 0
    }

    pub fn cancel(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}
