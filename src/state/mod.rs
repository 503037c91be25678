//! State Module - Runtime scroll-tracking systems
//!
//! The reactive systems that power viewport synchronization:
//!
//! - **Broadcaster** - Frame-coalesced scroll sample fan-out
//! - **Binding** - Component-lifecycle subscription adapter
//! - **Spy** - Active-section detection and fragment sync
//! - **Visibility** - Threshold-crossing boolean consumer
//! - **Progress** - Fractional scroll progress consumer
//! - **Input** - Crossterm event conversion and routing

pub mod binding;
pub mod broadcaster;
pub mod input;
pub mod progress;
pub mod spy;
pub mod visibility;

pub use binding::ScrollBinding;
pub use broadcaster::{
    Cleanup, ScrollCallback, SharedCallback, current_sample, install_surface, is_active,
    notify_resize, notify_scroll, reset_broadcaster_state, sample_signal, subscribe,
    subscribe_shared, subscriber_count, tick, uninstall_surface,
};
pub use input::{InputEvent, ScrollCommand, convert_event, poll_event, route_event};
pub use progress::ProgressTracker;
pub use spy::{LocationPort, SectionBounds, SectionLocator, SectionSpy, SpyConfig, SpyPhase};
pub use visibility::VisibilityTracker;
