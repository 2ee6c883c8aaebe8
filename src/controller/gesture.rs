// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Long-press detection for touch input.
//!
//! One finger resting for the long-press duration becomes a spatial query
//! at the finger's last position. Lifting, cancelling, adding a second
//! finger or dragging past [`MOVE_TOLERANCE_PX`] abandons the press.
//! Pointer devices use the context-menu event instead and never enter this
//! state machine.

use crate::models::{LngLat, ScreenPoint};
use crate::render::MapRenderAdapter;
use tokio::task::AbortHandle;
use tokio::time::Instant;

/// Movement beyond this many pixels turns a press into a pan.
pub const MOVE_TOLERANCE_PX: f64 = 10.0;

#[derive(Debug, Default)]
enum GestureState {
    #[default]
    Idle,
    Pending {
        generation: u64,
        timer: Option<AbortHandle>,
        start: ScreenPoint,
        last: ScreenPoint,
        started_at: Instant,
    },
}

#[derive(Debug, Default)]
pub struct GestureController {
    state: GestureState,
    generation: u64,
}

impl GestureController {
    pub fn is_pending(&self) -> bool {
        matches!(self.state, GestureState::Pending { .. })
    }

    /// Returns the generation to arm a long-press timer for, if this touch
    /// starts a press.
    pub fn touch_start(&mut self, touches: &[ScreenPoint]) -> Option<u64> {
        self.cancel();
        let [point] = touches else {
            return None;
        };

        self.generation += 1;
        self.state = GestureState::Pending {
            generation: self.generation,
            timer: None,
            start: *point,
            last: *point,
            started_at: Instant::now(),
        };
        Some(self.generation)
    }

    /// Hand over the timer armed for `generation`.
    pub fn attach_timer(&mut self, generation: u64, handle: AbortHandle) {
        match &mut self.state {
            GestureState::Pending {
                generation: current,
                timer,
                ..
            } if *current == generation => *timer = Some(handle),
            _ => handle.abort(),
        }
    }

    pub fn touch_move(&mut self, touches: &[ScreenPoint]) {
        let GestureState::Pending { start, last, .. } = &mut self.state else {
            return;
        };
        let still_pressing = match touches {
            [point] if start.distance_to(point) <= MOVE_TOLERANCE_PX => {
                *last = *point;
                true
            }
            _ => false,
        };
        if !still_pressing {
            tracing::trace!("Touch moved or gained a finger, abandoning press");
            self.cancel();
        }
    }

    /// Touch end or cancel.
    pub fn touch_end(&mut self) {
        self.cancel();
    }

    /// The long-press timer for `generation` fired.
    ///
    /// Returns the geographic point of the press when it is still current.
    pub fn timer_fired(&mut self, generation: u64, adapter: &MapRenderAdapter) -> Option<LngLat> {
        match &self.state {
            GestureState::Pending {
                generation: current,
                ..
            } if *current == generation => {}
            _ => return None,
        }

        let GestureState::Pending {
            last, started_at, ..
        } = std::mem::take(&mut self.state)
        else {
            return None;
        };

        tracing::debug!(
            held_ms = started_at.elapsed().as_millis() as u64,
            x = last.x,
            y = last.y,
            "Long press detected"
        );
        Some(adapter.unproject(last))
    }

    /// Abandon any pending press and stop its timer.
    pub fn cancel(&mut self) {
        if let GestureState::Pending {
            timer: Some(timer), ..
        } = std::mem::take(&mut self.state)
        {
            timer.abort();
        }
    }
}
