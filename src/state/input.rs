//! Input Module - Event conversion and routing
//!
//! Bridges crossterm's event system to the viewport and the broadcaster.
//! Wheel and navigation-key events become clamped viewport scrolls plus a
//! coalesced scroll notification; resize events refresh the surface height.
//!
//! # API
//!
//! - `convert_event` - Convert a crossterm event to an [`InputEvent`]
//! - `poll_event` - Non-blocking event check with timeout
//! - `route_event` - Apply an event to the viewport and notify
//!
//! # Example
//!
//! ```ignore
//! use spark_scroll::state::input::{poll_event, route_event};
//! use std::time::Duration;
//!
//! loop {
//!     if let Ok(Some(event)) = poll_event(Duration::from_millis(16)) {
//!         route_event(&event, &viewport, &surface);
//!     }
//!     spark_scroll::state::broadcaster::tick();
//! }
//! ```

use std::cell::RefCell;
use std::io;
use std::time::Duration;

use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, Event as CrosstermEvent, KeyCode, KeyEventKind,
    MouseEventKind, poll, read,
};
use crossterm::execute;
use std::io::stdout;

use super::broadcaster;
use crate::surface::{
    LINE_SCROLL, PAGE_SCROLL_FACTOR, TerminalSurface, ViewportState, WHEEL_SCROLL,
};
use crate::types::ScrollDirection;

// =============================================================================
// INPUT EVENT TYPES
// =============================================================================

/// A scroll gesture, before clamping against the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollCommand {
    /// Mouse wheel notch.
    Wheel(ScrollDirection),
    /// Arrow key line step.
    Line(ScrollDirection),
    /// Page Up / Page Down.
    Page(ScrollDirection),
    /// Home.
    Top,
    /// End.
    Bottom,
}

/// Unified event type for the scroll system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// A scroll gesture.
    Scroll(ScrollCommand),
    /// Terminal resize event (new width, height).
    Resize(u16, u16),
    /// No event or unhandled event type.
    None,
}

// =============================================================================
// EVENT CONVERSION
// =============================================================================

/// Convert a crossterm event to an [`InputEvent`].
pub fn convert_event(event: CrosstermEvent) -> InputEvent {
    match event {
        CrosstermEvent::Mouse(mouse) => match mouse.kind {
            MouseEventKind::ScrollUp => {
                InputEvent::Scroll(ScrollCommand::Wheel(ScrollDirection::Up))
            }
            MouseEventKind::ScrollDown => {
                InputEvent::Scroll(ScrollCommand::Wheel(ScrollDirection::Down))
            }
            _ => InputEvent::None,
        },
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => match key.code {
            KeyCode::Up => InputEvent::Scroll(ScrollCommand::Line(ScrollDirection::Up)),
            KeyCode::Down => InputEvent::Scroll(ScrollCommand::Line(ScrollDirection::Down)),
            KeyCode::PageUp => InputEvent::Scroll(ScrollCommand::Page(ScrollDirection::Up)),
            KeyCode::PageDown => InputEvent::Scroll(ScrollCommand::Page(ScrollDirection::Down)),
            KeyCode::Home => InputEvent::Scroll(ScrollCommand::Top),
            KeyCode::End => InputEvent::Scroll(ScrollCommand::Bottom),
            _ => InputEvent::None,
        },
        CrosstermEvent::Resize(width, height) => InputEvent::Resize(width, height),
        _ => InputEvent::None,
    }
}

/// Non-blocking event check with timeout.
pub fn poll_event(timeout: Duration) -> io::Result<Option<InputEvent>> {
    if poll(timeout)? {
        Ok(Some(convert_event(read()?)))
    } else {
        Ok(None)
    }
}

/// Enable terminal mouse capture so wheel events arrive.
pub fn enable_mouse() -> io::Result<()> {
    execute!(stdout(), EnableMouseCapture)
}

/// Disable terminal mouse capture.
pub fn disable_mouse() -> io::Result<()> {
    execute!(stdout(), DisableMouseCapture)
}

// =============================================================================
// ROUTING
// =============================================================================

/// Apply an event to the viewport and raise broadcaster notifications.
///
/// Returns `true` if the event changed viewport state. Scroll gestures
/// that hit a boundary move nothing and notify nothing.
pub fn route_event(
    event: &InputEvent,
    viewport: &RefCell<ViewportState>,
    surface: &TerminalSurface,
) -> bool {
    match event {
        InputEvent::Scroll(command) => {
            let moved = apply_scroll(command, viewport);
            if moved {
                broadcaster::notify_scroll();
            }
            moved
        }
        InputEvent::Resize(_, height) => {
            surface.set_height(*height);
            broadcaster::notify_resize();
            true
        }
        InputEvent::None => false,
    }
}

fn apply_scroll(command: &ScrollCommand, viewport: &RefCell<ViewportState>) -> bool {
    let mut viewport = viewport.borrow_mut();
    match command {
        ScrollCommand::Wheel(direction) => {
            viewport.scroll_by(signed(*direction, WHEEL_SCROLL as i32))
        }
        ScrollCommand::Line(direction) => {
            viewport.scroll_by(signed(*direction, LINE_SCROLL as i32))
        }
        ScrollCommand::Page(direction) => {
            let page = (viewport.viewport_height() as f32 * PAGE_SCROLL_FACTOR) as i32;
            viewport.scroll_by(signed(*direction, page.max(1)))
        }
        ScrollCommand::Top => viewport.scroll_to_top(),
        ScrollCommand::Bottom => viewport.scroll_to_end(),
    }
}

fn signed(direction: ScrollDirection, amount: i32) -> i32 {
    match direction {
        ScrollDirection::Up => -amount,
        ScrollDirection::Down => amount,
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::broadcaster::{install_surface, reset_broadcaster_state, subscribe, tick};
    use std::cell::Cell;
    use std::rc::Rc;

    fn setup(content: usize, height: u16) -> (Rc<RefCell<ViewportState>>, TerminalSurface) {
        reset_broadcaster_state();
        let viewport = Rc::new(RefCell::new(ViewportState::new()));
        viewport.borrow_mut().set_content(content, height);
        let surface = TerminalSurface::with_height(viewport.clone(), height);
        (viewport, surface)
    }

    #[test]
    fn test_wheel_scrolls_viewport() {
        let (viewport, surface) = setup(100, 24);

        let down = InputEvent::Scroll(ScrollCommand::Wheel(ScrollDirection::Down));
        assert!(route_event(&down, &viewport, &surface));
        assert_eq!(viewport.borrow().offset(), WHEEL_SCROLL as usize);

        let up = InputEvent::Scroll(ScrollCommand::Wheel(ScrollDirection::Up));
        assert!(route_event(&up, &viewport, &surface));
        assert_eq!(viewport.borrow().offset(), 0);
    }

    #[test]
    fn test_boundary_scroll_does_not_notify() {
        let (viewport, surface) = setup(100, 24);

        install_surface(Rc::new(TerminalSurface::with_height(viewport.clone(), 24)));
        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();
        let _cleanup = subscribe(move |_| count_clone.set(count_clone.get() + 1));
        assert_eq!(count.get(), 1);

        // At the top already: wheel up moves nothing, no notification
        let up = InputEvent::Scroll(ScrollCommand::Wheel(ScrollDirection::Up));
        assert!(!route_event(&up, &viewport, &surface));
        tick();
        assert_eq!(count.get(), 1);

        // A real movement notifies
        let down = InputEvent::Scroll(ScrollCommand::Wheel(ScrollDirection::Down));
        assert!(route_event(&down, &viewport, &surface));
        tick();
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_page_and_edge_commands() {
        let (viewport, surface) = setup(200, 40);

        let page_down = InputEvent::Scroll(ScrollCommand::Page(ScrollDirection::Down));
        route_event(&page_down, &viewport, &surface);
        assert_eq!(viewport.borrow().offset(), 36); // 40 * 0.9

        let end = InputEvent::Scroll(ScrollCommand::Bottom);
        route_event(&end, &viewport, &surface);
        assert_eq!(viewport.borrow().offset(), 160);

        let home = InputEvent::Scroll(ScrollCommand::Top);
        route_event(&home, &viewport, &surface);
        assert_eq!(viewport.borrow().offset(), 0);
    }

    #[test]
    fn test_resize_updates_surface_and_range() {
        let (viewport, surface) = setup(100, 24);

        let resize = InputEvent::Resize(80, 50);
        assert!(route_event(&resize, &viewport, &surface));
        assert_eq!(viewport.borrow().viewport_height(), 50);
        assert_eq!(viewport.borrow().max_scroll(), 50);
    }

    #[test]
    fn test_none_event_is_inert() {
        let (viewport, surface) = setup(100, 24);
        assert!(!route_event(&InputEvent::None, &viewport, &surface));
        assert_eq!(viewport.borrow().offset(), 0);
    }
}
