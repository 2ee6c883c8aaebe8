// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Explicit loading-indicator state.
//!
//! Several independent operations can be loading at once; the indicator is
//! shown while at least one is outstanding.

/// Edge produced by a transition, if the visible state changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingEdge {
    Started,
    Finished,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadingState {
    outstanding: u32,
}

impl LoadingState {
    pub fn is_loading(&self) -> bool {
        self.outstanding > 0
    }

    pub fn begin_load(&mut self) -> Option<LoadingEdge> {
        self.outstanding += 1;
        (self.outstanding == 1).then_some(LoadingEdge::Started)
    }

    /// Unbalanced calls are ignored.
    pub fn end_load(&mut self) -> Option<LoadingEdge> {
        match self.outstanding {
            0 => None,
            1 => {
                self.outstanding = 0;
                Some(LoadingEdge::Finished)
            }
            _ => {
                self.outstanding -= 1;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_only_on_visible_change() {
        let mut state = LoadingState::default();
        assert_eq!(state.begin_load(), Some(LoadingEdge::Started));
        assert_eq!(state.begin_load(), None);
        assert!(state.is_loading());
        assert_eq!(state.end_load(), None);
        assert_eq!(state.end_load(), Some(LoadingEdge::Finished));
        assert!(!state.is_loading());
    }

    #[test]
    fn test_unbalanced_end_is_ignored() {
        let mut state = LoadingState::default();
        assert_eq!(state.end_load(), None);
        assert_eq!(state.begin_load(), Some(LoadingEdge::Started));
    }
}
