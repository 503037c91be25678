//! Scroll Broadcaster - Frame-coalesced scroll fan-out
//!
//! Single source of truth for "where is the viewport right now". The
//! broadcaster listens to scroll/resize notifications once, coalesces
//! bursts into one measurement per frame tick, and fans the sample out to
//! every subscriber.
//!
//! Lifecycle: the singleton is built lazily by the first subscription and
//! dropped when the last subscriber leaves, so no stale state survives a
//! subscriber count of zero. A host without a ready surface never builds
//! one; subscriptions there are harmless no-ops.
//!
//! # API
//!
//! - `install_surface(surface)` - Provide the measurement capability
//! - `subscribe(callback)` - Register a callback, get a cleanup function
//! - `notify_scroll()` - Mark a scroll occurrence (coalesced)
//! - `notify_resize()` - Refresh the cached viewport height
//! - `tick()` - Frame callback: measure once, fan out once
//!
//! # Example
//!
//! ```ignore
//! use spark_scroll::state::broadcaster;
//!
//! let cleanup = broadcaster::subscribe(|sample| {
//!     println!("scrolled to {}", sample.scroll_y);
//! });
//!
//! // In the event handler:
//! broadcaster::notify_scroll();
//!
//! // Once per frame:
//! broadcaster::tick();
//!
//! cleanup();
//! ```

use std::cell::RefCell;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;

use spark_signals::{Signal, signal};

use crate::surface::ScrollSurface;
use crate::types::ScrollSample;

// =============================================================================
// TYPES
// =============================================================================

/// Cleanup function returned by subscriptions.
pub type Cleanup = Box<dyn FnOnce()>;

/// Subscriber callback invoked with each coalesced sample.
pub type ScrollCallback = Box<dyn FnMut(ScrollSample)>;

/// A callback behind a mutable slot.
///
/// The broadcaster invokes through the slot, so holders may swap the
/// callback between frames without re-subscribing.
pub type SharedCallback = Rc<RefCell<ScrollCallback>>;

bitflags::bitflags! {
    /// Notification kinds recorded since the last tick.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Pending: u8 {
        /// A scroll occurred; the next tick measures and fans out.
        const SCROLL = 1 << 0;
        /// A resize refreshed the cached height; no fan-out of its own.
        const RESIZE = 1 << 1;
    }
}

// =============================================================================
// STATE
// =============================================================================

struct Broadcaster {
    /// Measurement capability, captured at construction.
    surface: Rc<dyn ScrollSurface>,
    /// Registered subscribers, identity by id (no ordering guarantee).
    subscribers: Vec<(usize, SharedCallback)>,
    next_id: usize,
    pending: Pending,
    /// Cached sample; overwritten by each tick, delivered to new
    /// subscribers immediately.
    sample: Signal<ScrollSample>,
}

impl Broadcaster {
    fn create(surface: Rc<dyn ScrollSurface>) -> Self {
        let seed = ScrollSample::new(surface.scroll_offset(), surface.viewport_height());
        Self {
            surface,
            subscribers: Vec::new(),
            next_id: 0,
            pending: Pending::empty(),
            sample: signal(seed),
        }
    }
}

thread_local! {
    static SURFACE: RefCell<Option<Rc<dyn ScrollSurface>>> = RefCell::new(None);
    static BROADCASTER: RefCell<Option<Broadcaster>> = RefCell::new(None);
}

/// Install the surface the broadcaster measures through.
///
/// Must happen before the first subscription; subscriptions made while no
/// ready surface is installed are inert.
pub fn install_surface(surface: Rc<dyn ScrollSurface>) {
    SURFACE.with(|s| *s.borrow_mut() = Some(surface));
}

/// Remove the installed surface.
///
/// An already-built broadcaster keeps measuring through the surface it
/// captured at construction; this only affects future constructions.
pub fn uninstall_surface() {
    SURFACE.with(|s| *s.borrow_mut() = None);
}

fn ready_surface() -> Option<Rc<dyn ScrollSurface>> {
    SURFACE.with(|s| {
        s.borrow()
            .as_ref()
            .filter(|surface| surface.is_ready())
            .cloned()
    })
}

// =============================================================================
// SUBSCRIPTION
// =============================================================================

/// Subscribe to coalesced scroll samples.
///
/// The callback is invoked once immediately with the current sample, then
/// once per tick that follows a scroll notification. Returns a cleanup
/// function that removes the callback; when the last subscriber leaves the
/// broadcaster tears itself down.
///
/// Without a ready surface this is a no-op that still returns a valid
/// cleanup function.
pub fn subscribe<F>(callback: F) -> Cleanup
where
    F: FnMut(ScrollSample) + 'static,
{
    let slot: SharedCallback = Rc::new(RefCell::new(Box::new(callback)));
    subscribe_shared(slot)
}

/// Subscribe a callback slot.
///
/// Like [`subscribe`], but the caller keeps the slot and may replace the
/// callback inside it between frames without re-subscribing.
pub fn subscribe_shared(slot: SharedCallback) -> Cleanup {
    let id = BROADCASTER.with(|cell| {
        let mut holder = cell.borrow_mut();
        if holder.is_none() {
            match ready_surface() {
                Some(surface) => *holder = Some(Broadcaster::create(surface)),
                None => return None,
            }
        }
        holder.as_mut().map(|bc| {
            let id = bc.next_id;
            bc.next_id += 1;
            bc.subscribers.push((id, slot.clone()));
            id
        })
    });

    let Some(id) = id else {
        return Box::new(|| {});
    };

    // New subscribers get a first value right away instead of waiting for
    // the next scroll event.
    let sample = current_sample();
    invoke_isolated(id, &slot, sample);

    Box::new(move || unsubscribe(id))
}

fn unsubscribe(id: usize) {
    BROADCASTER.with(|cell| {
        let mut holder = cell.borrow_mut();
        let Some(bc) = holder.as_mut() else { return };
        bc.subscribers.retain(|(sid, _)| *sid != id);
        if bc.subscribers.is_empty() {
            // Last subscriber gone: drop the singleton so the next
            // subscription rebuilds from scratch.
            *holder = None;
        }
    });
}

fn is_subscribed(id: usize) -> bool {
    BROADCASTER.with(|cell| {
        cell.borrow()
            .as_ref()
            .map(|bc| bc.subscribers.iter().any(|(sid, _)| *sid == id))
            .unwrap_or(false)
    })
}

// =============================================================================
// NOTIFICATIONS & TICK
// =============================================================================

/// Record a scroll occurrence.
///
/// Any number of notifications between two ticks collapse into a single
/// measurement and fan-out on the next [`tick`].
pub fn notify_scroll() {
    BROADCASTER.with(|cell| {
        if let Some(bc) = cell.borrow_mut().as_mut() {
            bc.pending.insert(Pending::SCROLL);
        }
    });
}

/// Record a resize.
///
/// Refreshes the cached viewport height so new subscribers see it, but
/// does not fan out; existing subscribers observe the new height on the
/// next scroll tick.
pub fn notify_resize() {
    BROADCASTER.with(|cell| {
        if let Some(bc) = cell.borrow_mut().as_mut() {
            let mut sample = bc.sample.get();
            sample.viewport_height = bc.surface.viewport_height();
            bc.sample.set(sample);
            bc.pending.insert(Pending::RESIZE);
        }
    });
}

/// Frame callback: measure once and fan out once if a scroll is pending.
///
/// Call once per rendered frame from the host loop. Callbacks run with the
/// registry borrow released, so they may subscribe or unsubscribe
/// mid-flight; a removed subscriber receives nothing.
pub fn tick() {
    let fanout = BROADCASTER.with(|cell| {
        let mut holder = cell.borrow_mut();
        let bc = holder.as_mut()?;
        let scrolled = bc.pending.contains(Pending::SCROLL);
        bc.pending = Pending::empty();
        if !scrolled {
            return None;
        }
        let sample = ScrollSample::new(bc.surface.scroll_offset(), bc.surface.viewport_height());
        bc.sample.set(sample);
        Some((sample, bc.subscribers.clone()))
    });

    let Some((sample, snapshot)) = fanout else {
        return;
    };
    for (id, slot) in snapshot {
        // Membership guard: a callback earlier in this fan-out may have
        // removed this subscriber.
        if !is_subscribed(id) {
            continue;
        }
        invoke_isolated(id, &slot, sample);
    }
}

fn invoke_isolated(id: usize, slot: &SharedCallback, sample: ScrollSample) {
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let mut callback = slot.borrow_mut();
        (*callback)(sample);
    }));
    if outcome.is_err() {
        tracing::warn!(subscriber = id, "scroll subscriber panicked, skipping");
    }
}

// =============================================================================
// QUERIES
// =============================================================================

/// The most recent sample, or the default sample if no broadcaster exists.
pub fn current_sample() -> ScrollSample {
    BROADCASTER.with(|cell| {
        cell.borrow()
            .as_ref()
            .map(|bc| bc.sample.get())
            .unwrap_or_default()
    })
}

/// The cached-sample signal for reactive tracking.
///
/// Returns `None` when no broadcaster exists. The signal dies with the
/// broadcaster at teardown; re-fetch after re-subscribing.
pub fn sample_signal() -> Option<Signal<ScrollSample>> {
    BROADCASTER.with(|cell| cell.borrow().as_ref().map(|bc| bc.sample.clone()))
}

/// Number of active subscribers.
pub fn subscriber_count() -> usize {
    BROADCASTER.with(|cell| {
        cell.borrow()
            .as_ref()
            .map(|bc| bc.subscribers.len())
            .unwrap_or(0)
    })
}

/// Whether the singleton currently exists.
pub fn is_active() -> bool {
    BROADCASTER.with(|cell| cell.borrow().is_some())
}

/// Reset broadcaster and surface state (for testing).
pub fn reset_broadcaster_state() {
    BROADCASTER.with(|cell| *cell.borrow_mut() = None);
    SURFACE.with(|s| *s.borrow_mut() = None);
}

// =============================================================================
// TESTS
// =============================================================================
