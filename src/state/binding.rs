//! Scroll Binding - Component lifecycle adapter for the broadcaster
//!
//! Bridges a component's render/teardown lifecycle to the broadcaster
//! without re-subscribing on every render and without leaking
//! subscriptions:
//!
//! - The callback lives in a mutable slot the broadcaster invokes through,
//!   so a re-render refreshes the callback without touching the registry.
//! - A dependency value controls re-subscription: unchanged deps keep the
//!   existing subscription, changed deps tear it down and subscribe anew.
//! - Dropping the binding unsubscribes; if that empties the registry the
//!   broadcaster tears itself down.
//!
//! # Example
//!
//! ```ignore
//! use spark_scroll::state::binding::ScrollBinding;
//!
//! let mut binding = ScrollBinding::new();
//!
//! // Each render: refresh the callback; deps () never change, so the
//! // subscription is created once and reused.
//! binding.render(|sample| println!("at {}", sample.scroll_y), ());
//!
//! // Unsubscribes on drop.
//! drop(binding);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use super::broadcaster::{self, Cleanup, ScrollCallback, SharedCallback};
use crate::types::ScrollSample;

// =============================================================================
// SCROLL BINDING
// =============================================================================

/// A broadcaster subscription tied to a component lifecycle.
///
/// `D` is the dependency value compared across renders; use `()` for a
/// subscription that lives for the whole component lifetime.
pub struct ScrollBinding<D: PartialEq = ()> {
    slot: SharedCallback,
    cleanup: Option<Cleanup>,
    deps: Option<D>,
}

impl<D: PartialEq> ScrollBinding<D> {
    /// Create an unsubscribed binding.
    pub fn new() -> Self {
        let noop: ScrollCallback = Box::new(|_| {});
        Self {
            slot: Rc::new(RefCell::new(noop)),
            cleanup: None,
            deps: None,
        }
    }

    /// Per-render registration.
    ///
    /// Always refreshes the callback slot. Subscribes on the first call;
    /// afterwards only a changed `deps` value forces an unsubscribe and
    /// re-subscribe (which re-delivers the current sample, like any fresh
    /// subscription).
    pub fn render<F>(&mut self, callback: F, deps: D)
    where
        F: FnMut(ScrollSample) + 'static,
    {
        *self.slot.borrow_mut() = Box::new(callback);

        let changed = match &self.deps {
            None => true,
            Some(previous) => *previous != deps,
        };
        if !changed {
            return;
        }

        if let Some(cleanup) = self.cleanup.take() {
            cleanup();
        }
        self.cleanup = Some(broadcaster::subscribe_shared(self.slot.clone()));
        self.deps = Some(deps);
    }

    /// Whether the binding currently holds a subscription.
    pub fn is_subscribed(&self) -> bool {
        self.cleanup.is_some()
    }

    /// Unsubscribe now, ahead of drop.
    pub fn dispose(&mut self) {
        if let Some(cleanup) = self.cleanup.take() {
            cleanup();
        }
        self.deps = None;
    }
}

impl<D: PartialEq> Default for ScrollBinding<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: PartialEq> Drop for ScrollBinding<D> {
    fn drop(&mut self) {
        if let Some(cleanup) = self.cleanup.take() {
            cleanup();
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
