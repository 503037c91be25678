//! Mount API - Scroll-system lifecycle.
//!
//! Entry point for wiring the scroll system into a terminal host. `mount`
//! detects the terminal, installs the surface, and enables mouse capture;
//! `tick` pumps one frame (events in, one coalesced fan-out out); the
//! handle tears everything down on unmount or drop.
//!
//! # Example
//!
//! ```ignore
//! use spark_scroll::pipeline::{mount, tick};
//! use std::time::Duration;
//!
//! let handle = mount(content_lines)?;
//!
//! while tick(&handle, Duration::from_millis(16))? {
//!     // App logic; consumers poll their own timers here.
//! }
//!
//! handle.unmount();
//! ```

use std::cell::{Cell, RefCell};
use std::io;
use std::rc::Rc;
use std::time::Duration;

use crate::state::{broadcaster, input};
use crate::surface::{ScrollSurface, TerminalSurface, ViewportState};

// =============================================================================
// Mount Handle
// =============================================================================

/// Handle returned by [`mount`] that allows ticking and unmounting.
pub struct MountHandle {
    viewport: Rc<RefCell<ViewportState>>,
    surface: Rc<TerminalSurface>,
    running: Cell<bool>,
}

impl MountHandle {
    /// The shared viewport, for app-driven scrolling and content updates.
    pub fn viewport(&self) -> Rc<RefCell<ViewportState>> {
        self.viewport.clone()
    }

    /// The installed surface.
    pub fn surface(&self) -> Rc<TerminalSurface> {
        self.surface.clone()
    }

    /// Check if still running.
    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// Stop the loop (the next [`tick`] returns `false`).
    pub fn stop(&self) {
        self.running.set(false);
    }

    /// Stop, disable mouse capture, and uninstall the surface.
    ///
    /// Live subscriptions keep the broadcaster (and the surface it
    /// captured) alive until they clean up; only future constructions are
    /// affected.
    pub fn unmount(self) {
        self.running.set(false);
        let _ = input::disable_mouse();
        broadcaster::uninstall_surface();
    }
}

impl Drop for MountHandle {
    fn drop(&mut self) {
        // Best effort; harmless if unmount already ran
        let _ = input::disable_mouse();
        broadcaster::uninstall_surface();
    }
}

// =============================================================================
// Mount / Tick
// =============================================================================

/// Mount the scroll system onto the current terminal.
///
/// Detects the terminal size, binds a fresh [`ViewportState`] over
/// `content_height` rows of content, installs the surface for the
/// broadcaster, and enables mouse capture. On a host with no terminal the
/// mount still succeeds; the surface reports not-ready and subscriptions
/// stay inert.
pub fn mount(content_height: usize) -> io::Result<MountHandle> {
    let viewport = Rc::new(RefCell::new(ViewportState::new()));
    viewport.borrow_mut().set_content(content_height, 0);

    let surface = Rc::new(TerminalSurface::detect(viewport.clone()));
    broadcaster::install_surface(surface.clone());

    if surface.is_ready() {
        input::enable_mouse()?;
    }

    Ok(MountHandle {
        viewport,
        surface,
        running: Cell::new(true),
    })
}

/// Pump one frame: poll for one event, route it, run the broadcaster tick.
///
/// Returns `false` once the handle has been stopped.
pub fn tick(handle: &MountHandle, timeout: Duration) -> io::Result<bool> {
    if !handle.is_running() {
        return Ok(false);
    }

    if let Some(event) = input::poll_event(timeout)? {
        input::route_event(&event, &handle.viewport, &handle.surface);
    }
    broadcaster::tick();

    Ok(handle.is_running())
}

/// Blocking loop: tick at roughly 60 FPS until [`MountHandle::stop`].
pub fn run(handle: &MountHandle) -> io::Result<()> {
    while tick(handle, Duration::from_millis(16))? {}
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
