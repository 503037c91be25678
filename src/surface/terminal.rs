//! Terminal Surface - Crossterm-backed scroll surface
//!
//! Binds a shared [`ViewportState`] to a detected terminal height so the
//! broadcaster can measure it. Detection happens once at construction:
//! when no terminal is attached (piped output, headless test run) the
//! surface reports not-ready and the broadcaster stays inert.

use std::cell::Cell;
use std::cell::RefCell;
use std::rc::Rc;

use super::viewport::ViewportState;
use super::ScrollSurface;

/// A [`ScrollSurface`] over an app-owned viewport and the terminal height.
pub struct TerminalSurface {
    viewport: Rc<RefCell<ViewportState>>,
    /// Detected terminal height in rows; 0 = no terminal attached.
    height: Cell<u16>,
}

impl TerminalSurface {
    /// Detect the terminal and bind it to the given viewport.
    ///
    /// When no terminal can be queried the surface is created not-ready;
    /// it becomes ready if a height is later supplied via [`set_height`].
    ///
    /// [`set_height`]: TerminalSurface::set_height
    pub fn detect(viewport: Rc<RefCell<ViewportState>>) -> Self {
        let height = crossterm::terminal::size().map(|(_, h)| h).unwrap_or(0);
        Self::with_height(viewport, height)
    }

    /// Bind a viewport to an explicit height (no terminal query).
    pub fn with_height(viewport: Rc<RefCell<ViewportState>>, height: u16) -> Self {
        viewport.borrow_mut().set_viewport_height(height);
        Self {
            viewport,
            height: Cell::new(height),
        }
    }

    /// Update the height after a terminal resize event.
    ///
    /// Also recomputes the viewport's scrollable range.
    pub fn set_height(&self, height: u16) {
        self.height.set(height);
        self.viewport.borrow_mut().set_viewport_height(height);
    }
}

impl ScrollSurface for TerminalSurface {
    fn is_ready(&self) -> bool {
        self.height.get() > 0
    }

    fn scroll_offset(&self) -> usize {
        self.viewport.borrow().offset()
    }

    fn viewport_height(&self) -> u16 {
        self.height.get()
    }
}

// =============================================================================
// TESTS
// =============================================================================
