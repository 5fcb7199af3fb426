//! Coalesces bursts of window resizes into a single re-render.
//!
//! Every size change bumps a generation counter and the caller schedules
//! [`ResizeDebouncer::settle`] after the quiet period. Only the check carrying
//! the newest generation gets the viewport back, so a burst of any length
//! produces one re-render with the last observed size.

use crate::render::Viewport;

#[derive(Debug, Default)]
pub struct ResizeDebouncer {
    generation: u64,
    latest: Option<Viewport>,
    pending: bool,
}

impl ResizeDebouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a resize. Returns the ticket to settle later, or `None` when
    /// the size did not actually change.
    pub fn notify(&mut self, viewport: Viewport) -> Option<u64> {
        if self.latest == Some(viewport) {
            return None;
        }
        self.latest = Some(viewport);
        self.generation += 1;
        self.pending = true;
        Some(self.generation)
    }

    /// Returns the viewport to render if no newer resize arrived since
    /// `ticket` was issued.
    pub fn settle(&mut self, ticket: u64) -> Option<Viewport> {
        if !self.pending || ticket != self.generation {
            return None;
        }
        self.pending = false;
        self.latest
    }

    /// Last size seen, settled or not.
    pub fn latest(&self) -> Option<Viewport> {
        self.latest
    }
}
