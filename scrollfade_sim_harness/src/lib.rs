// Copyright 2026 the Scrollfade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic simulation harness for scrollfade.
//!
//! Provides an in-memory [`FakeStage`], a [`ManualTimer`] driven by virtual
//! time, a [`PageLayout`] that reproduces the page geometry (text column,
//! section markers, activation band), and a [`Session`] that feeds a
//! [`Carousel`] the same scroll and visibility events a browser would.
//!
//! [`check_invariants`] and [`convergence_mismatches`] are the properties
//! the tests below (and downstream demos) assert.

#![no_std]

extern crate alloc;

use alloc::vec;
use alloc::vec::Vec;

use kurbo::Rect;
use scrollfade_core::carousel::Carousel;
use scrollfade_core::config::{CarouselConfig, ConfigError};
use scrollfade_core::keyboard::NavKey;
use scrollfade_core::scroll::{self, ScrollMetrics};
use scrollfade_core::section::SectionMap;
use scrollfade_core::sequencer::{Phase, RequestOutcome};
use scrollfade_core::slide::SlideIndex;
use scrollfade_core::stage::{MediaPlayback, Stage, Timer};
use scrollfade_core::time::{Duration, HostTime};
use scrollfade_core::trace::Tracer;
use scrollfade_core::visibility::{RootMargin, VisibilityEntry, VisibilityResolver, band_intersects};

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// An in-memory [`Stage`] that records what it was told.
#[derive(Clone, Debug, Default)]
pub struct FakeStage {
    active: Vec<bool>,
    has_media: Vec<bool>,
    overlay: bool,
    plays: Vec<(SlideIndex, bool)>,
}

impl FakeStage {
    /// Creates a stage with `slides` slides, each with media.
    #[must_use]
    pub fn new(slides: usize) -> Self {
        Self {
            active: vec![false; slides],
            has_media: vec![true; slides],
            overlay: false,
            plays: Vec::new(),
        }
    }

    /// Removes the media from one slide.
    #[must_use]
    pub fn without_media(mut self, index: SlideIndex) -> Self {
        if let Some(m) = self.has_media.get_mut(index.get()) {
            *m = false;
        }
        self
    }

    /// Indices of the slides currently marked active.
    #[must_use]
    pub fn active_slides(&self) -> Vec<SlideIndex> {
        self.active
            .iter()
            .zip(0_u32..)
            .filter_map(|(&a, i)| a.then_some(SlideIndex(i)))
            .collect()
    }

    /// Whether the overlay is shown.
    #[must_use]
    pub fn overlay_visible(&self) -> bool {
        self.overlay
    }

    /// Every media start so far, as `(slide, rewind)`.
    #[must_use]
    pub fn plays(&self) -> &[(SlideIndex, bool)] {
        &self.plays
    }
}

impl Stage for FakeStage {
    fn slide_count(&self) -> usize {
        self.active.len()
    }

    fn set_slide_active(&mut self, index: SlideIndex, active: bool) {
        if let Some(slot) = self.active.get_mut(index.get()) {
            *slot = active;
        }
    }

    fn play_media(&mut self, index: SlideIndex, rewind: bool) -> MediaPlayback {
        if self.has_media.get(index.get()).copied().unwrap_or(false) {
            self.plays.push((index, rewind));
            MediaPlayback::Started
        } else {
            MediaPlayback::NoMedia
        }
    }

    fn set_overlay_visible(&mut self, visible: bool) {
        self.overlay = visible;
    }
}

/// A [`Timer`] over virtual time.
///
/// The owner advances [`now`](Self::set_now); arming computes the due time
/// from it.
#[derive(Clone, Copy, Debug, Default)]
pub struct ManualTimer {
    now: HostTime,
    due: Option<HostTime>,
    arms: u32,
}

impl ManualTimer {
    /// Sets the virtual clock the next arm is relative to.
    pub fn set_now(&mut self, now: HostTime) {
        self.now = now;
    }

    /// When the pending wake-up is due.
    #[must_use]
    pub fn due(&self) -> Option<HostTime> {
        self.due
    }

    /// Clears the pending wake-up and returns when it was due.
    pub fn take_due(&mut self) -> Option<HostTime> {
        self.due.take()
    }

    /// How many times the timer has been armed.
    #[must_use]
    pub fn arm_count(&self) -> u32 {
        self.arms
    }
}

impl Timer for ManualTimer {
    fn arm(&mut self, delay: Duration) {
        self.due = Some(self.now.saturating_add(delay));
        self.arms += 1;
    }
}

// ---------------------------------------------------------------------------
// Page geometry
// ---------------------------------------------------------------------------

/// Geometry of a simulated text column, in CSS pixels.
///
/// Section `i` owns the scroll offsets `[i·spacing, (i+1)·spacing)`. Its
/// marker sits so that it crosses the activation band while the offset is
/// near the middle of that range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageLayout {
    /// Visible height of the column.
    pub viewport_height: f64,
    /// Column width.
    pub width: f64,
    /// Scroll distance per section.
    pub spacing: f64,
    /// Height of a marker header.
    pub marker_height: f64,
    /// Number of sections.
    pub sections: usize,
    /// Observer margin.
    pub root_margin: RootMargin,
}

impl PageLayout {
    /// An 800px column with 1000px per section and 40px headers.
    #[must_use]
    pub fn standard(sections: usize) -> Self {
        Self {
            viewport_height: 800.0,
            width: 600.0,
            spacing: 1000.0,
            marker_height: 40.0,
            sections,
            root_margin: RootMargin::MIDDLE_BAND,
        }
    }

    /// Total scrollable content height.
    #[must_use]
    pub fn content_height(&self) -> f64 {
        self.viewport_height + self.spacing * self.sections as f64
    }

    /// Largest scroll offset.
    #[must_use]
    pub fn max_offset(&self) -> f64 {
        self.content_height() - self.viewport_height
    }

    /// Scroll metrics at `offset`.
    #[must_use]
    pub fn metrics(&self, offset: f64) -> ScrollMetrics {
        ScrollMetrics::new(offset, self.content_height(), self.viewport_height)
    }

    /// The activation band at `offset`, in content coordinates.
    #[must_use]
    pub fn band(&self, offset: f64) -> Rect {
        let root = Rect::new(0.0, offset, self.width, offset + self.viewport_height);
        self.root_margin.apply(root)
    }

    /// Marker `i`'s box, in content coordinates.
    #[must_use]
    pub fn marker(&self, i: usize) -> Rect {
        let center = (i as f64 + 0.5) * self.spacing + self.viewport_height / 2.0;
        let half = self.marker_height / 2.0;
        Rect::new(0.0, center - half, self.width, center + half)
    }

    /// Current intersection state of every marker at `offset`.
    #[must_use]
    pub fn visibility(&self, sections: &SectionMap, offset: f64) -> Vec<VisibilityEntry> {
        let band = self.band(offset);
        sections
            .iter()
            .enumerate()
            .map(|(i, s)| VisibilityEntry::new(s.id.as_str(), band_intersects(band, self.marker(i))))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Invariants
// ---------------------------------------------------------------------------

/// A broken carousel invariant.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    /// Not exactly one slide is active.
    #[error("{0} slides active, expected exactly one")]
    ActiveCount(usize),
    /// The active slide is not the carousel's current slide.
    #[error("stage shows {shown} but carousel is on {current}")]
    WrongSlide {
        /// Active slide on the stage.
        shown: SlideIndex,
        /// Carousel's current slide.
        current: SlideIndex,
    },
    /// The overlay state does not match the phase.
    #[error("overlay visible={visible} during {phase:?}")]
    Overlay {
        /// Whether the overlay is shown.
        visible: bool,
        /// Current phase.
        phase: Phase,
    },
    /// A deadline is pending while idle, or missing mid-transition.
    #[error("deadline {deadline:?} during {phase:?}")]
    Deadline {
        /// Pending deadline.
        deadline: Option<HostTime>,
        /// Current phase.
        phase: Phase,
    },
}

/// Checks the stage and sequencer against each other.
///
/// # Errors
///
/// Returns the first [`InvariantViolation`] found.
pub fn check_invariants(
    carousel: &Carousel<FakeStage, ManualTimer>,
) -> Result<(), InvariantViolation> {
    let active = carousel.stage().active_slides();
    let &[shown] = active.as_slice() else {
        return Err(InvariantViolation::ActiveCount(active.len()));
    };
    if shown != carousel.current() {
        return Err(InvariantViolation::WrongSlide {
            shown,
            current: carousel.current(),
        });
    }
    let phase = carousel.phase();
    let visible = carousel.stage().overlay_visible();
    if visible != matches!(phase, Phase::FadingOut | Phase::Swapping) {
        return Err(InvariantViolation::Overlay { visible, phase });
    }
    let deadline = carousel.sequencer().next_deadline();
    if deadline.is_some() != carousel.is_transitioning() {
        return Err(InvariantViolation::Deadline { deadline, phase });
    }
    Ok(())
}

/// Sweeps the scroll range in `step` increments and returns every offset at
/// which a marker newly entering the band names a different slide than the
/// scroll percentage does.
#[must_use]
pub fn convergence_mismatches(layout: &PageLayout, sections: &SectionMap, step: f64) -> Vec<f64> {
    let mut resolver = VisibilityResolver::new(sections.len());
    let mut mismatches = Vec::new();
    let mut offset = 0.0;
    while offset <= layout.max_offset() {
        let by_scroll = scroll::resolve(&layout.metrics(offset), sections.len()).index;
        let entered = resolver.observe(sections, &layout.visibility(sections, offset));
        if entered.iter().any(|&i| i != by_scroll) {
            mismatches.push(offset);
        }
        offset += step;
    }
    mismatches
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A carousel driven by virtual time and simulated page events.
#[derive(Debug)]
pub struct Session {
    carousel: Carousel<FakeStage, ManualTimer>,
    layout: PageLayout,
    now: HostTime,
    offset: f64,
}

/// Outcomes produced by one simulated scroll.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScrollOutcomes {
    /// From the scroll-percentage resolver.
    pub scroll: RequestOutcome,
    /// From the visibility resolver, one per newly visible marker.
    pub visibility: Vec<RequestOutcome>,
}

impl Session {
    /// Builds and starts a carousel over a [`FakeStage`] with one slide per
    /// configured section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid.
    pub fn new(config: &CarouselConfig, tracer: &mut Tracer<'_>) -> Result<Self, ConfigError> {
        Self::with_stage(config, FakeStage::new(config.sections.len()), tracer)
    }

    /// Like [`new`](Self::new) with a caller-supplied stage.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid or the stage
    /// does not match it.
    pub fn with_stage(
        config: &CarouselConfig,
        stage: FakeStage,
        tracer: &mut Tracer<'_>,
    ) -> Result<Self, ConfigError> {
        let mut carousel = Carousel::new(config, stage, ManualTimer::default())?;
        let layout = PageLayout::standard(carousel.sections().len());
        carousel.start(HostTime(0), tracer);
        Ok(Self {
            carousel,
            layout,
            now: HostTime(0),
            offset: 0.0,
        })
    }

    /// The driven carousel.
    #[must_use]
    pub fn carousel(&self) -> &Carousel<FakeStage, ManualTimer> {
        &self.carousel
    }

    /// The page geometry.
    #[must_use]
    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    /// Current virtual time.
    #[must_use]
    pub fn now(&self) -> HostTime {
        self.now
    }

    /// Current scroll offset.
    #[must_use]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Scrolls to `offset` (clamped to the page) and delivers the scroll
    /// event followed by the intersection batch, as a browser would.
    pub fn scroll_to(&mut self, offset: f64, tracer: &mut Tracer<'_>) -> ScrollOutcomes {
        self.offset = offset.clamp(0.0, self.layout.max_offset());
        let metrics = self.layout.metrics(self.offset);
        let scroll = self.carousel.on_scroll(&metrics, self.now, tracer);
        let entries = self.layout.visibility(self.carousel.sections(), self.offset);
        let visibility = self.carousel.on_visibility(&entries, self.now, tracer);
        ScrollOutcomes { scroll, visibility }
    }

    /// Delivers a navigation key press.
    pub fn key(&mut self, key: NavKey, tracer: &mut Tracer<'_>) -> Option<RequestOutcome> {
        self.carousel.on_key(key, self.now, tracer)
    }

    /// Delivers a scroll event at the current offset without moving.
    pub fn nudge(&mut self, tracer: &mut Tracer<'_>) -> RequestOutcome {
        let metrics = self.layout.metrics(self.offset);
        self.carousel.on_scroll(&metrics, self.now, tracer)
    }

    /// Advances virtual time by `by`, firing every timer that falls due.
    pub fn advance(&mut self, by: Duration, tracer: &mut Tracer<'_>) {
        let until = self.now.saturating_add(by);
        while let Some(due) = self.carousel.timer().due() {
            if due > until {
                break;
            }
            self.set_now(due);
            let _ = self.carousel.timer_mut().take_due();
            self.carousel.on_timer(due, tracer);
        }
        self.set_now(until);
    }

    /// Advances until no transition is in flight.
    pub fn settle(&mut self, tracer: &mut Tracer<'_>) {
        let round_trip = self.carousel.config().timing.round_trip();
        while self.carousel.is_transitioning() {
            self.advance(round_trip, tracer);
        }
    }

    fn set_now(&mut self, now: HostTime) {
        self.now = now;
        self.carousel.timer_mut().set_now(now);
    }
}

// ---------------------------------------------------------------------------
// Deterministic randomness
// ---------------------------------------------------------------------------

/// Xorshift generator for reproducible event streams.
#[derive(Clone, Copy, Debug)]
pub struct SimRng(u64);

impl SimRng {
    /// Seeds the generator; a zero seed is replaced.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self(if seed == 0 { 0x9e37_79b9_7f4a_7c15 } else { seed })
    }

    /// Next raw value.
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    /// Uniform value in `[0, 1)`.
    pub fn unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1_u64 << 53) as f64
    }

    /// Uniform integer in `[0, n)`; `n` of zero yields zero.
    pub fn below(&mut self, n: u64) -> u64 {
        if n == 0 { 0 } else { self.next_u64() % n }
    }
}
