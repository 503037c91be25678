//! Core types for spark-scroll.
//!
//! These types define the foundation that everything builds on.
//! They flow from the surface through the broadcaster to every consumer.

use thiserror::Error;

// =============================================================================
// Scroll Sample
// =============================================================================

/// One viewport measurement, produced by the broadcaster at most once per
/// frame.
///
/// No history is kept; each sample overwrites the previous one. `scroll_y`
/// is non-negative by construction and `viewport_height` is non-zero once a
/// rendering surface is ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollSample {
    /// Vertical scroll offset in rows (0 = top of content).
    pub scroll_y: usize,
    /// Height of the visible viewport in rows.
    pub viewport_height: u16,
}

impl ScrollSample {
    /// Create a new sample.
    pub const fn new(scroll_y: usize, viewport_height: u16) -> Self {
        Self {
            scroll_y,
            viewport_height,
        }
    }

    /// The reference row used by section matching: the point offset a
    /// percentage of the viewport height below the scroll position.
    pub fn reference_row(&self, percent: u16) -> usize {
        self.scroll_y + (self.viewport_height as usize * percent as usize) / 100
    }
}

// =============================================================================
// Scroll Direction
// =============================================================================

/// Direction of a wheel scroll event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

// =============================================================================
// Location Errors
// =============================================================================

/// Failure to read or replace the location fragment.
///
/// These are contained at the consumer: the operation is logged and
/// skipped, never propagated into the scroll path.
#[derive(Debug, Error)]
pub enum LocationError {
    /// The host forbids mutating the fragment.
    #[error("fragment replacement denied: {0}")]
    Denied(String),
    /// The host has no fragment concept at all.
    #[error("fragment not supported by this host")]
    Unsupported,
}

// =============================================================================
// Tests
// =============================================================================
