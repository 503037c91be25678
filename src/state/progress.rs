//! Progress Tracker - Scroll progress consumer
//!
//! Derives how far through the content the viewport is, as a fraction in
//! `[0, 1]`, for progress bars and reading indicators. Content that fits
//! entirely inside the viewport reads as fully scrolled.

use std::cell::Cell;

use spark_signals::{Signal, signal};

use crate::types::ScrollSample;

/// Fractional scroll progress over a content region.
pub struct ProgressTracker {
    content_height: Cell<usize>,
    progress: Signal<f32>,
}

impl ProgressTracker {
    /// Track progress through content of the given height.
    pub fn new(content_height: usize) -> Self {
        Self {
            content_height: Cell::new(content_height),
            progress: signal(0.0),
        }
    }

    /// Update the content height (content grew or shrank).
    pub fn set_content_height(&self, content_height: usize) {
        self.content_height.set(content_height);
    }

    /// Feed one broadcast sample. Sets the signal only on change.
    pub fn on_sample(&self, sample: ScrollSample) {
        let range = self
            .content_height
            .get()
            .saturating_sub(sample.viewport_height as usize);
        let progress = if range == 0 {
            1.0
        } else {
            (sample.scroll_y as f32 / range as f32).clamp(0.0, 1.0)
        };
        if progress != self.progress.get() {
            self.progress.set(progress);
        }
    }

    /// Current progress in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        self.progress.get()
    }

    /// The signal for reactive tracking.
    pub fn signal(&self) -> Signal<f32> {
        self.progress.clone()
    }
}

// =============================================================================
// TESTS
// =============================================================================
