// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Facility map: interactive map state for a healthcare facility locator.
//!
//! A [`controller::MapController`] owns the map state and drives a
//! [`render::MapCanvas`]. It handles location search, long-press and
//! right-click spatial queries, and keeps standard and uploaded facilities
//! synchronized with the facility API.

pub mod config;
pub mod controller;
pub mod error;
pub mod geometry;
pub mod loading;
pub mod models;
pub mod render;
pub mod services;

pub use config::Config;
pub use controller::{MapController, MapHandle, MapSnapshot};
pub use error::{AppError, Result};
