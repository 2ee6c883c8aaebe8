// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the map engine.

pub mod facility;
pub mod location;

pub use facility::{Facility, FacilityId, FacilitySource, FacilityTypeRecord};
pub use location::{LngLat, RadiusQuery, ScreenPoint, Viewport};
