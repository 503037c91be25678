//! Visibility Tracker - Threshold-crossing boolean consumer
//!
//! Derives a single boolean from the scroll position: "has the viewport
//! scrolled past this row yet". Used for things like collapsing a hero
//! banner or revealing a back-to-top affordance once the reader is into
//! the content.
//!
//! The tracker owns its derived state; it shares nothing with other
//! consumers beyond the sample it is fed.

use spark_signals::{Signal, signal};

use crate::types::ScrollSample;

/// Boolean signal that flips when the scroll offset crosses a threshold.
pub struct VisibilityTracker {
    threshold: usize,
    past: Signal<bool>,
}

impl VisibilityTracker {
    /// Track whether the viewport has scrolled at or past `threshold`.
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold,
            past: signal(false),
        }
    }

    /// Feed one broadcast sample. Sets the signal only on change.
    pub fn on_sample(&self, sample: ScrollSample) {
        let past = sample.scroll_y >= self.threshold;
        if past != self.past.get() {
            self.past.set(past);
        }
    }

    /// Whether the threshold has been crossed.
    pub fn is_past(&self) -> bool {
        self.past.get()
    }

    /// The signal for reactive tracking.
    pub fn signal(&self) -> Signal<bool> {
        self.past.clone()
    }
}

// =============================================================================
// TESTS
// =============================================================================
