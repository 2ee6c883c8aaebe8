// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types.

/// Crate-wide error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Facility API error: {0}")]
    FacilityApi(String),

    #[error("Geocoding error: {0}")]
    Geocode(String),

    #[error("Map surface error: {0}")]
    Render(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Map controller is no longer running")]
    ControllerClosed,

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Rendering-surface operation attempted before the style finished loading.
    pub const SURFACE_NOT_READY: &'static str = "surface not ready";

    /// True for errors raised because the map surface had not finished loading.
    pub fn is_not_ready(&self) -> bool {
        matches!(self, AppError::Render(msg) if msg == Self::SURFACE_NOT_READY)
    }
}

/// Result type alias used across the crate.
pub type Result<T> = std::result::Result<T, AppError>;
