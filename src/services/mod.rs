// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - network collaborators of the map engine.

pub mod facility_api;
pub mod geocoder;

pub use facility_api::{fetch_with_retry, FacilityApi, FacilityResource, HttpFacilityApi, RetryPolicy};
pub use geocoder::{Geocoder, NominatimGeocoder};
