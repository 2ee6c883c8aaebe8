// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Rendering surface access.

pub mod adapter;
pub mod canvas;
pub mod headless;
pub mod style;

pub use adapter::{Cursor, ListenerGuard, MapRenderAdapter, MarkerHandle, PopupContent};
pub use canvas::{EventSink, FeatureHit, FlyTo, ListenerKind, MapCanvas, SurfaceEvent};
pub use headless::HeadlessCanvas;
