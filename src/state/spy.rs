//! Section Spy - Active-section detection and fragment synchronization
//!
//! Keeps the host's location fragment in sync with whichever labeled
//! section currently holds the viewport's reference point, without
//! fighting user-initiated navigation.
//!
//! The spy is a one-way state machine per page visit:
//!
//! ```text
//! Cold ──(no recognized fragment)──▶ Settling ──(warm-up + scroll)──▶ Armed
//!   │
//!   └──(recognized fragment)──▶ stays Cold: one scroll request, no spying
//! ```
//!
//! Section geometry and fragment access are injected via [`SectionLocator`]
//! and [`LocationPort`], so the timing and threshold logic runs unchanged
//! against a real host or a test double.
//!
//! # Example
//!
//! ```ignore
//! use spark_scroll::state::spy::{SectionSpy, SpyConfig};
//! use std::time::Instant;
//!
//! let mut spy = SectionSpy::new(locator, location, sections, SpyConfig::default());
//! spy.activate(Instant::now());
//!
//! // From the scroll subscription:
//! spy.on_sample(sample, Instant::now());
//!
//! // Once per frame:
//! spy.poll(Instant::now());
//! ```

use std::time::{Duration, Instant};

use spark_signals::{Signal, signal};

use crate::types::{LocationError, ScrollSample};

// =============================================================================
// PORTS
// =============================================================================

/// Vertical extent of a labeled section in content rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionBounds {
    /// First content row of the section.
    pub top: usize,
    /// Height in rows.
    pub height: usize,
}

impl SectionBounds {
    /// Whether the given content row falls inside this section.
    pub fn contains(&self, row: usize) -> bool {
        row >= self.top && row < self.top + self.height
    }
}

/// Maps a section id to its current bounds.
///
/// Bounds are queried at evaluation time, never cached by the spy, so
/// layout changes between evaluations are picked up automatically.
pub trait SectionLocator {
    fn bounds(&self, id: &str) -> Option<SectionBounds>;
}

/// Host location capability: fragment read/replace and scroll requests.
///
/// `replace_fragment` must replace, never push, so spy updates leave no
/// history trail.
pub trait LocationPort {
    /// The current fragment, without the leading separator.
    fn fragment(&self) -> Option<String>;

    /// Replace the fragment (`None` clears it) without adding history.
    fn replace_fragment(&self, fragment: Option<&str>) -> Result<(), LocationError>;

    /// Request a one-time scroll so the section lands below a fixed
    /// header of the given height.
    fn scroll_to_section(&self, id: &str, header_offset: usize);

    /// Request a scroll to the top of the content.
    fn scroll_to_top(&self);
}

// =============================================================================
// CONFIG
// =============================================================================

/// Tuning knobs for the spy.
#[derive(Debug, Clone, Copy)]
pub struct SpyConfig {
    /// Fixed header height subtracted when scrolling to a section.
    pub header_offset: usize,
    /// Reference point as a percentage of viewport height below the
    /// scroll position.
    pub reference_percent: u16,
    /// Quiet period after the last sample before a fragment update.
    pub debounce: Duration,
    /// Window after activation during which samples are ignored
    /// (suppresses host scroll restoration).
    pub warmup: Duration,
    /// Offsets at or below this clear the fragment instead of naming a
    /// section (inclusive on the clear side).
    pub top_threshold: usize,
}

impl Default for SpyConfig {
    fn default() -> Self {
        Self {
            header_offset: 2,
            reference_percent: 30,
            debounce: Duration::from_millis(150),
            warmup: Duration::from_millis(400),
            top_threshold: 2,
        }
    }
}

/// Spy lifecycle phase. Transitions are one-way per activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpyPhase {
    /// Initial phase; also terminal when a recognized fragment was present
    /// at activation.
    Cold,
    /// Waiting out the warm-up window.
    Settling,
    /// Tracking user scrolling on a debounced cadence.
    Armed,
}

// =============================================================================
// SECTION SPY
// =============================================================================

/// Scroll-spy over a set of labeled sections.
pub struct SectionSpy<L: SectionLocator, P: LocationPort> {
    locator: L,
    location: P,
    config: SpyConfig,
    /// Known section ids in document order.
    sections: Vec<String>,
    phase: SpyPhase,
    activated: bool,
    warmup_deadline: Option<Instant>,
    debounce_deadline: Option<Instant>,
    last_sample: ScrollSample,
    active_section: Signal<Option<String>>,
}

impl<L: SectionLocator, P: LocationPort> SectionSpy<L, P> {
    /// Create an inactive spy over the given sections.
    pub fn new(locator: L, location: P, sections: Vec<String>, config: SpyConfig) -> Self {
        Self {
            locator,
            location,
            config,
            sections,
            phase: SpyPhase::Cold,
            activated: false,
            warmup_deadline: None,
            debounce_deadline: None,
            last_sample: ScrollSample::default(),
            active_section: signal(None),
        }
    }

    /// Cold-start entry, called once per page visit.
    ///
    /// A recognized fragment yields exactly one scroll request and leaves
    /// the spy Cold for the whole visit. Otherwise any stale fragment is
    /// cleared, the viewport is forced to the top, and the warm-up window
    /// begins.
    pub fn activate(&mut self, now: Instant) {
        if self.activated {
            return;
        }
        self.activated = true;

        match self.location.fragment() {
            Some(fragment) if self.sections.iter().any(|s| *s == fragment) => {
                self.location
                    .scroll_to_section(&fragment, self.config.header_offset);
                self.active_section.set(Some(fragment));
            }
            other => {
                if other.is_some() {
                    if let Err(err) = self.location.replace_fragment(None) {
                        tracing::warn!(error = %err, "could not clear stale fragment");
                    }
                }
                self.location.scroll_to_top();
                self.warmup_deadline = Some(now + self.config.warmup);
                self.phase = SpyPhase::Settling;
            }
        }
    }

    /// Feed one broadcast sample.
    ///
    /// Samples inside the warm-up window are dropped; the first sample
    /// after it arms the spy. Armed samples reschedule the trailing
    /// debounce deadline.
    pub fn on_sample(&mut self, sample: ScrollSample, now: Instant) {
        match self.phase {
            SpyPhase::Cold => {}
            SpyPhase::Settling => {
                let Some(deadline) = self.warmup_deadline else {
                    return;
                };
                if now < deadline {
                    return;
                }
                self.phase = SpyPhase::Armed;
                self.last_sample = sample;
                self.debounce_deadline = Some(now + self.config.debounce);
            }
            SpyPhase::Armed => {
                self.last_sample = sample;
                self.debounce_deadline = Some(now + self.config.debounce);
            }
        }
    }

    /// Frame callback: fire the debounce if its quiet period elapsed.
    pub fn poll(&mut self, now: Instant) {
        if self.phase != SpyPhase::Armed {
            return;
        }
        let Some(deadline) = self.debounce_deadline else {
            return;
        };
        if now < deadline {
            return;
        }
        self.debounce_deadline = None;
        self.evaluate();
    }

    fn evaluate(&mut self) {
        let sample = self.last_sample;

        // Inclusive boundary: at the threshold we clear, not assign.
        let desired: Option<Option<String>> = if sample.scroll_y <= self.config.top_threshold {
            Some(None)
        } else {
            let reference = sample.reference_row(self.config.reference_percent);
            let hit = self
                .sections
                .iter()
                .find(|id| {
                    self.locator
                        .bounds(id)
                        .is_some_and(|bounds| bounds.contains(reference))
                })
                .cloned();
            // No section under the reference point: leave the fragment be
            hit.map(Some)
        };

        let Some(desired) = desired else {
            return;
        };

        let current = self.location.fragment();
        if current.as_deref() == desired.as_deref() {
            if self.active_section.get() != desired {
                self.active_section.set(desired);
            }
            return;
        }

        match self.location.replace_fragment(desired.as_deref()) {
            Ok(()) => {
                self.active_section.set(desired);
            }
            Err(err) => {
                tracing::warn!(error = %err, "fragment replacement failed, skipping");
            }
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Current phase.
    pub fn phase(&self) -> SpyPhase {
        self.phase
    }

    /// Id of the section the spy last considered active.
    pub fn active_section(&self) -> Option<String> {
        self.active_section.get()
    }

    /// The active-section signal for reactive tracking.
    pub fn active_section_signal(&self) -> Signal<Option<String>> {
        self.active_section.clone()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    struct FakeLocator {
        bounds: HashMap<String, SectionBounds>,
    }

    impl FakeLocator {
        fn new(entries: &[(&str, usize, usize)]) -> Self {
            let bounds = entries
                .iter()
                .map(|(id, top, height)| {
                    (
                        id.to_string(),
                        SectionBounds {
                            top: *top,
                            height: *height,
                        },
                    )
                })
                .collect();
            Self { bounds }
        }
    }

    impl SectionLocator for FakeLocator {
        fn bounds(&self, id: &str) -> Option<SectionBounds> {
            self.bounds.get(id).copied()
        }
    }

    #[derive(Default)]
    struct PortState {
        fragment: Option<String>,
        replaces: Vec<Option<String>>,
        scrolls: Vec<(String, usize)>,
        top_scrolls: usize,
        fail_replace: bool,
    }

    #[derive(Clone, Default)]
    struct FakePort {
        state: Rc<RefCell<PortState>>,
    }

    impl FakePort {
        fn with_fragment(fragment: &str) -> Self {
            let port = Self::default();
            port.state.borrow_mut().fragment = Some(fragment.to_string());
            port
        }
    }

    impl LocationPort for FakePort {
        fn fragment(&self) -> Option<String> {
            self.state.borrow().fragment.clone()
        }

        fn replace_fragment(&self, fragment: Option<&str>) -> Result<(), LocationError> {
            let mut state = self.state.borrow_mut();
            if state.fail_replace {
                return Err(LocationError::Denied("read-only location".into()));
            }
            state.fragment = fragment.map(str::to_string);
            state.replaces.push(fragment.map(str::to_string));
            Ok(())
        }

        fn scroll_to_section(&self, id: &str, header_offset: usize) {
            self.state
                .borrow_mut()
                .scrolls
                .push((id.to_string(), header_offset));
        }

        fn scroll_to_top(&self) {
            self.state.borrow_mut().top_scrolls += 1;
        }
    }

    fn sections() -> Vec<String> {
        vec![
            "hero".to_string(),
            "work-archive".to_string(),
            "testimonials".to_string(),
        ]
    }

    fn locator() -> FakeLocator {
        FakeLocator::new(&[
            ("hero", 0, 40),
            ("work-archive", 40, 60),
            ("testimonials", 100, 50),
        ])
    }

    fn spy_with(port: FakePort) -> SectionSpy<FakeLocator, FakePort> {
        SectionSpy::new(locator(), port, sections(), SpyConfig::default())
    }

    fn ms(base: Instant, millis: u64) -> Instant {
        base + Duration::from_millis(millis)
    }

    #[test]
    fn test_cold_start_with_recognized_fragment() {
        let port = FakePort::with_fragment("testimonials");
        let mut spy = spy_with(port.clone());
        let t0 = Instant::now();

        spy.activate(t0);
        assert_eq!(spy.phase(), SpyPhase::Cold);
        assert_eq!(
            port.state.borrow().scrolls,
            vec![("testimonials".to_string(), 2)]
        );

        // Samples and polls never arm a Cold spy or rewrite the fragment
        spy.on_sample(ScrollSample::new(500, 40), ms(t0, 1000));
        spy.poll(ms(t0, 2000));
        assert_eq!(spy.phase(), SpyPhase::Cold);
        assert!(port.state.borrow().replaces.is_empty());
        assert_eq!(port.state.borrow().scrolls.len(), 1);
    }

    #[test]
    fn test_cold_start_without_fragment_settles() {
        let port = FakePort::default();
        let mut spy = spy_with(port.clone());
        let t0 = Instant::now();

        spy.activate(t0);
        assert_eq!(spy.phase(), SpyPhase::Settling);
        assert_eq!(port.state.borrow().top_scrolls, 1);
        // Nothing to clear: no replace issued
        assert!(port.state.borrow().replaces.is_empty());
    }

    #[test]
    fn test_unrecognized_fragment_is_cleared() {
        let port = FakePort::with_fragment("no-such-section");
        let mut spy = spy_with(port.clone());

        spy.activate(Instant::now());
        assert_eq!(spy.phase(), SpyPhase::Settling);
        assert_eq!(port.state.borrow().replaces, vec![None]);
        assert_eq!(port.state.borrow().fragment, None);
    }

    #[test]
    fn test_warmup_suppresses_samples() {
        let port = FakePort::default();
        let mut spy = spy_with(port.clone());
        let t0 = Instant::now();
        spy.activate(t0);

        // Scroll restoration noise inside the warm-up window
        spy.on_sample(ScrollSample::new(120, 40), ms(t0, 100));
        spy.poll(ms(t0, 300));
        assert_eq!(spy.phase(), SpyPhase::Settling);
        assert!(port.state.borrow().replaces.is_empty());

        // First sample past the window arms the spy
        spy.on_sample(ScrollSample::new(50, 40), ms(t0, 450));
        assert_eq!(spy.phase(), SpyPhase::Armed);
    }

    #[test]
    fn test_debounce_trailing_edge() {
        let port = FakePort::default();
        let mut spy = spy_with(port.clone());
        let t0 = Instant::now();
        spy.activate(t0);

        spy.on_sample(ScrollSample::new(50, 40), ms(t0, 500));

        // Quiet period not over yet
        spy.poll(ms(t0, 600));
        assert!(port.state.borrow().replaces.is_empty());

        // Continued scrolling reschedules the deadline
        spy.on_sample(ScrollSample::new(60, 40), ms(t0, 640));
        spy.poll(ms(t0, 700));
        assert!(port.state.borrow().replaces.is_empty());

        // Quiet for the full window: one evaluation
        spy.poll(ms(t0, 800));
        // reference = 60 + 12 = 72 -> work-archive [40, 100)
        assert_eq!(
            port.state.borrow().replaces,
            vec![Some("work-archive".to_string())]
        );
        assert_eq!(spy.active_section(), Some("work-archive".to_string()));

        // No further evaluations without new samples
        spy.poll(ms(t0, 1500));
        assert_eq!(port.state.borrow().replaces.len(), 1);
    }

    #[test]
    fn test_idempotent_at_fixed_position() {
        let port = FakePort::default();
        let mut spy = spy_with(port.clone());
        let t0 = Instant::now();
        spy.activate(t0);

        spy.on_sample(ScrollSample::new(50, 40), ms(t0, 500));
        spy.poll(ms(t0, 700));
        assert_eq!(port.state.borrow().replaces.len(), 1);

        // Same position again: fragment already matches, no churn
        spy.on_sample(ScrollSample::new(50, 40), ms(t0, 900));
        spy.poll(ms(t0, 1100));
        assert_eq!(port.state.borrow().replaces.len(), 1);
    }

    #[test]
    fn test_top_threshold_boundary_clears() {
        let port = FakePort::default();
        let mut spy = spy_with(port.clone());
        let t0 = Instant::now();
        spy.activate(t0);

        // Land inside a section first
        spy.on_sample(ScrollSample::new(50, 40), ms(t0, 500));
        spy.poll(ms(t0, 700));
        assert_eq!(port.state.borrow().fragment, Some("work-archive".to_string()));

        // Exactly at the threshold: clears (inclusive on the clear side)
        spy.on_sample(ScrollSample::new(2, 40), ms(t0, 900));
        spy.poll(ms(t0, 1100));
        assert_eq!(port.state.borrow().fragment, None);
        assert_eq!(spy.active_section(), None);

        // One row past the threshold: section assignment resumes
        spy.on_sample(ScrollSample::new(3, 40), ms(t0, 1300));
        spy.poll(ms(t0, 1500));
        // reference = 3 + 12 = 15 -> hero [0, 40)
        assert_eq!(port.state.borrow().fragment, Some("hero".to_string()));
    }

    #[test]
    fn test_gap_between_sections_keeps_fragment() {
        let port = FakePort::default();
        let locator = FakeLocator::new(&[("hero", 0, 20), ("work-archive", 200, 50)]);
        let mut spy = SectionSpy::new(
            locator,
            port.clone(),
            vec!["hero".to_string(), "work-archive".to_string()],
            SpyConfig::default(),
        );
        let t0 = Instant::now();
        spy.activate(t0);

        spy.on_sample(ScrollSample::new(5, 40), ms(t0, 500));
        spy.poll(ms(t0, 700));
        assert_eq!(port.state.borrow().fragment, Some("hero".to_string()));

        // Reference point lands in the gap: fragment is left alone
        spy.on_sample(ScrollSample::new(100, 40), ms(t0, 900));
        spy.poll(ms(t0, 1100));
        assert_eq!(port.state.borrow().fragment, Some("hero".to_string()));
        assert_eq!(port.state.borrow().replaces.len(), 1);
    }

    #[test]
    fn test_replace_failure_is_contained() {
        let port = FakePort::default();
        port.state.borrow_mut().fail_replace = true;
        let mut spy = spy_with(port.clone());
        let t0 = Instant::now();
        spy.activate(t0);

        spy.on_sample(ScrollSample::new(50, 40), ms(t0, 500));
        spy.poll(ms(t0, 700));

        // Skipped, not propagated; derived state untouched
        assert_eq!(port.state.borrow().fragment, None);
        assert_eq!(spy.active_section(), None);

        // The spy keeps running afterwards
        port.state.borrow_mut().fail_replace = false;
        spy.on_sample(ScrollSample::new(50, 40), ms(t0, 900));
        spy.poll(ms(t0, 1100));
        assert_eq!(port.state.borrow().fragment, Some("work-archive".to_string()));
    }

    #[test]
    fn test_activate_is_one_shot() {
        let port = FakePort::with_fragment("hero");
        let mut spy = spy_with(port.clone());
        let t0 = Instant::now();

        spy.activate(t0);
        spy.activate(ms(t0, 100));
        assert_eq!(port.state.borrow().scrolls.len(), 1);
    }

    #[test]
    fn test_section_bounds_contains() {
        let bounds = SectionBounds { top: 40, height: 60 };
        assert!(!bounds.contains(39));
        assert!(bounds.contains(40));
        assert!(bounds.contains(99));
        assert!(!bounds.contains(100));
    }

    #[test]
    fn test_signal_tracks_active_section() {
        let port = FakePort::default();
        let mut spy = spy_with(port.clone());
        let sig = spy.active_section_signal();
        let t0 = Instant::now();
        spy.activate(t0);

        spy.on_sample(ScrollSample::new(110, 40), ms(t0, 500));
        spy.poll(ms(t0, 700));
        // reference = 110 + 12 = 122 -> testimonials [100, 150)
        assert_eq!(sig.get(), Some("testimonials".to_string()));
    }
}
