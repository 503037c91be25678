//! # spark-scroll
//!
//! Reactive scroll tracking and viewport synchronization for terminal UIs.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for
//! fine-grained reactivity.
//!
//! ## Architecture
//!
//! A single cross-cutting mechanism with three parts: a frame-coalescing
//! scroll broadcaster, a lifecycle-aware subscription binding, and
//! independent derived-state consumers.
//!
//! ```text
//! scroll/resize events → broadcaster (coalesce per tick) → fan-out
//!                                                            ├─ section spy (fragment sync)
//!                                                            ├─ visibility tracker
//!                                                            └─ progress tracker
//! ```
//!
//! Data flow is strictly one-directional and single-threaded. Consumers
//! share nothing but the read-only sample each tick delivers; each owns its
//! derivation and exposes it as a signal.
//!
//! ## Modules
//!
//! - [`types`] - Core types (ScrollSample, ScrollDirection, LocationError)
//! - [`surface`] - Platform capability layer (surface trait, viewport, terminal)
//! - [`state`] - Broadcaster, binding, spy, visibility, progress, input
//! - [`pipeline`] - Host integration (mount, frame tick)

pub mod pipeline;
pub mod state;
pub mod surface;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use surface::{
    LINE_SCROLL, PAGE_SCROLL_FACTOR, ScrollSurface, TerminalSurface, ViewportState, WHEEL_SCROLL,
};

pub use state::{
    // Broadcaster
    Cleanup, ScrollCallback, SharedCallback, current_sample, install_surface, is_active,
    notify_resize, notify_scroll, reset_broadcaster_state, sample_signal, subscribe,
    subscribe_shared, subscriber_count, tick, uninstall_surface,
    // Binding
    ScrollBinding,
    // Spy
    LocationPort, SectionBounds, SectionLocator, SectionSpy, SpyConfig, SpyPhase,
    // Consumers
    ProgressTracker, VisibilityTracker,
    // Input
    InputEvent, ScrollCommand, convert_event, poll_event, route_event,
};

pub use pipeline::{MountHandle, mount, run};
