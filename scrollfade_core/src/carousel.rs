// Copyright 2026 the Scrollfade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The carousel driver.
//!
//! [`Carousel`] owns the validated configuration, both resolvers, the
//! [`Sequencer`], and the backend's [`Stage`] and [`Timer`]. Backends feed
//! it raw events through the `on_*` methods; it resolves targets, runs them
//! through the gate, and keeps the timer armed for the next phase deadline.

use alloc::vec::Vec;

use crate::config::{CarouselConfig, ConfigError, ValidConfig};
use crate::keyboard::NavKey;
use crate::scroll::{self, ScrollMetrics};
use crate::section::SectionMap;
use crate::sequencer::{Phase, RequestOutcome, Sequencer, TransitionRequest, TriggerSource};
use crate::slide::SlideIndex;
use crate::stage::{Stage, Timer};
use crate::time::HostTime;
use crate::trace::Tracer;
use crate::visibility::{VisibilityEntry, VisibilityResolver};

/// A scroll-driven slide carousel bound to one stage.
#[derive(Debug)]
pub struct Carousel<S, T> {
    config: ValidConfig,
    sequencer: Sequencer,
    visibility: VisibilityResolver,
    stage: S,
    timer: T,
    armed: Option<HostTime>,
}

impl<S: Stage, T: Timer> Carousel<S, T> {
    /// Validates `config` and binds it to a stage and timer.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid or the stage
    /// does not have exactly one slide per section.
    pub fn new(config: &CarouselConfig, stage: S, timer: T) -> Result<Self, ConfigError> {
        let config = config.validate()?;
        let sections = config.sections.len();
        let slides = stage.slide_count();
        if sections != slides {
            return Err(ConfigError::SlideCountMismatch { sections, slides });
        }
        Ok(Self {
            sequencer: Sequencer::new(config.timing, sections),
            visibility: VisibilityResolver::new(sections),
            config,
            stage,
            timer,
            armed: None,
        })
    }

    /// Shows the first slide and starts its media.
    pub fn start(&mut self, now: HostTime, tracer: &mut Tracer<'_>) {
        self.sequencer.start(now, &mut self.stage, tracer);
    }

    /// Handles a scroll of the text column.
    ///
    /// While a transition is in flight the position is not even resolved.
    pub fn on_scroll(
        &mut self,
        metrics: &ScrollMetrics,
        now: HostTime,
        tracer: &mut Tracer<'_>,
    ) -> RequestOutcome {
        if self.sequencer.is_transitioning() {
            return RequestOutcome::Busy;
        }
        let target = scroll::resolve(metrics, self.config.sections.len());
        let request = TransitionRequest::new(target.index, TriggerSource::Scroll)
            .with_scroll_percent(target.percent());
        self.submit(request, now, tracer)
    }

    /// Handles a batch of marker visibility changes.
    ///
    /// Every marker that newly entered the band produces one request, in
    /// batch order; at most the first of them can be accepted.
    pub fn on_visibility(
        &mut self,
        entries: &[VisibilityEntry],
        now: HostTime,
        tracer: &mut Tracer<'_>,
    ) -> Vec<RequestOutcome> {
        let entered = self.visibility.observe(&self.config.sections, entries);
        entered
            .into_iter()
            .map(|index| {
                let request = TransitionRequest::new(index, TriggerSource::Visibility);
                self.submit(request, now, tracer)
            })
            .collect()
    }

    /// Handles a navigation key. Returns `None` at either end of the
    /// carousel, where the key has nothing to ask for.
    pub fn on_key(
        &mut self,
        key: NavKey,
        now: HostTime,
        tracer: &mut Tracer<'_>,
    ) -> Option<RequestOutcome> {
        let target = key.target(self.sequencer.current(), self.config.sections.len())?;
        let request = TransitionRequest::new(target, TriggerSource::Keyboard);
        Some(self.submit(request, now, tracer))
    }

    /// Requests a slide directly.
    pub fn show(
        &mut self,
        target: SlideIndex,
        now: HostTime,
        tracer: &mut Tracer<'_>,
    ) -> RequestOutcome {
        self.submit(TransitionRequest::new(target, TriggerSource::Direct), now, tracer)
    }

    /// Handles the wake-up armed on the [`Timer`].
    pub fn on_timer(&mut self, now: HostTime, tracer: &mut Tracer<'_>) {
        self.armed = None;
        let _ = self.sequencer.poll(now, &mut self.stage, tracer);
        self.sync_timer(now);
    }

    /// Slide currently showing.
    #[must_use]
    pub fn current(&self) -> SlideIndex {
        self.sequencer.current()
    }

    /// Current sequencer phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.sequencer.phase()
    }

    /// Returns `true` while a transition is in flight.
    #[must_use]
    pub fn is_transitioning(&self) -> bool {
        self.sequencer.is_transitioning()
    }

    /// The validated section list.
    #[must_use]
    pub fn sections(&self) -> &SectionMap {
        &self.config.sections
    }

    /// The validated configuration.
    #[must_use]
    pub fn config(&self) -> &ValidConfig {
        &self.config
    }

    /// The underlying sequencer.
    #[must_use]
    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    /// The stage.
    #[must_use]
    pub fn stage(&self) -> &S {
        &self.stage
    }

    /// The timer.
    #[must_use]
    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// The timer, mutably. Backends use this to complete timer setup after
    /// the carousel has been shared.
    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    fn submit(
        &mut self,
        request: TransitionRequest,
        now: HostTime,
        tracer: &mut Tracer<'_>,
    ) -> RequestOutcome {
        let outcome = self.sequencer.request(request, now, &mut self.stage, tracer);
        // A zero-length phase can already be due.
        let _ = self.sequencer.poll(now, &mut self.stage, tracer);
        self.sync_timer(now);
        outcome
    }

    fn sync_timer(&mut self, now: HostTime) {
        let next = self.sequencer.next_deadline();
        if next == self.armed {
            return;
        }
        if let Some(deadline) = next {
            self.timer.arm(deadline.saturating_duration_since(now));
        }
        self.armed = next;
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::stage::MediaPlayback;
    use crate::time::Duration;

    #[derive(Debug, Default)]
    struct FakeStage {
        active: Vec<bool>,
        overlay: bool,
    }

    impl FakeStage {
        fn with_slides(n: usize) -> Self {
            Self {
                active: vec![false; n],
                overlay: false,
            }
        }

        fn shown(&self) -> Vec<usize> {
            self.active
                .iter()
                .enumerate()
                .filter_map(|(i, &a)| a.then_some(i))
                .collect()
        }
    }

    impl Stage for FakeStage {
        fn slide_count(&self) -> usize {
            self.active.len()
        }

        fn set_slide_active(&mut self, index: SlideIndex, active: bool) {
            self.active[index.get()] = active;
        }

        fn play_media(&mut self, _index: SlideIndex, _rewind: bool) -> MediaPlayback {
            MediaPlayback::Started
        }

        fn set_overlay_visible(&mut self, visible: bool) {
            self.overlay = visible;
        }
    }

    #[derive(Debug, Default)]
    struct FakeTimer {
        arms: Vec<Duration>,
    }

    impl Timer for FakeTimer {
        fn arm(&mut self, delay: Duration) {
            self.arms.push(delay);
        }
    }

    fn ms(v: u64) -> HostTime {
        HostTime(Duration::from_millis(v).ticks())
    }

    fn carousel() -> Carousel<FakeStage, FakeTimer> {
        let mut c = Carousel::new(
            &CarouselConfig::standard(),
            FakeStage::with_slides(6),
            FakeTimer::default(),
        )
        .unwrap();
        c.start(ms(0), &mut Tracer::none());
        c
    }

    fn scrolled(p: f64) -> ScrollMetrics {
        ScrollMetrics::new(p * 6000.0, 6800.0, 800.0)
    }

    fn drain(c: &mut Carousel<FakeStage, FakeTimer>, until: u64) {
        let mut t = 0;
        while c.is_transitioning() && t <= until {
            c.on_timer(ms(t), &mut Tracer::none());
            t += 100;
        }
    }

    #[test]
    fn rejects_slide_count_mismatch() {
        let err = Carousel::new(
            &CarouselConfig::standard(),
            FakeStage::with_slides(4),
            FakeTimer::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::SlideCountMismatch {
                sections: 6,
                slides: 4
            }
        );
    }

    #[test]
    fn scroll_starts_transition_and_arms_timer() {
        let mut c = carousel();
        let outcome = c.on_scroll(&scrolled(0.5), ms(0), &mut Tracer::none());
        assert_eq!(outcome, RequestOutcome::Accepted);
        assert_eq!(c.phase(), Phase::FadingOut);
        assert_eq!(c.timer().arms, vec![Duration::from_millis(1000)]);
        assert!(c.stage().overlay);

        c.on_timer(ms(1000), &mut Tracer::none());
        assert_eq!(c.current(), SlideIndex(3));
        assert_eq!(c.stage().shown(), vec![3]);
        assert_eq!(c.timer().arms.last(), Some(&Duration::from_millis(500)));

        c.on_timer(ms(1500), &mut Tracer::none());
        c.on_timer(ms(2500), &mut Tracer::none());
        assert!(!c.is_transitioning());
        assert_eq!(c.timer().arms.len(), 3);
    }

    #[test]
    fn scroll_is_ignored_while_transitioning() {
        let mut c = carousel();
        let _ = c.on_scroll(&scrolled(0.2), ms(0), &mut Tracer::none());
        assert_eq!(
            c.on_scroll(&scrolled(0.9), ms(10), &mut Tracer::none()),
            RequestOutcome::Busy
        );
        drain(&mut c, 10_000);
        assert_eq!(c.current(), SlideIndex(1));
    }

    #[test]
    fn scroll_within_current_bucket_is_a_no_op() {
        let mut c = carousel();
        assert_eq!(
            c.on_scroll(&scrolled(0.1), ms(0), &mut Tracer::none()),
            RequestOutcome::AlreadyCurrent
        );
        assert!(c.timer().arms.is_empty());
    }

    #[test]
    fn early_wake_rearms_for_remainder() {
        let mut c = carousel();
        let _ = c.show(SlideIndex(2), ms(0), &mut Tracer::none());
        c.on_timer(ms(990), &mut Tracer::none());
        assert_eq!(c.phase(), Phase::FadingOut);
        assert_eq!(c.timer().arms.last(), Some(&Duration::from_millis(10)));
    }

    #[test]
    fn visibility_first_new_marker_wins() {
        let mut c = carousel();
        let outcomes = c.on_visibility(
            &[
                VisibilityEntry::new("excitation", true),
                VisibilityEntry::new("chronology", true),
            ],
            ms(0),
            &mut Tracer::none(),
        );
        assert_eq!(outcomes, vec![RequestOutcome::Accepted, RequestOutcome::Busy]);
        drain(&mut c, 10_000);
        assert_eq!(c.current(), SlideIndex(2));
    }

    #[test]
    fn keys_step_and_stop_at_ends() {
        let mut c = carousel();
        assert_eq!(c.on_key(NavKey::Previous, ms(0), &mut Tracer::none()), None);
        assert_eq!(
            c.on_key(NavKey::Next, ms(0), &mut Tracer::none()),
            Some(RequestOutcome::Accepted)
        );
        assert_eq!(
            c.on_key(NavKey::Next, ms(100), &mut Tracer::none()),
            Some(RequestOutcome::Busy)
        );
        drain(&mut c, 10_000);
        assert_eq!(c.current(), SlideIndex(1));

        let _ = c.show(SlideIndex(5), ms(20_000), &mut Tracer::none());
        c.on_timer(ms(30_000), &mut Tracer::none());
        assert_eq!(c.on_key(NavKey::Next, ms(30_000), &mut Tracer::none()), None);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut cfg = CarouselConfig::standard();
        cfg.timing.duration_ms = 0;
        assert!(matches!(
            Carousel::new(&cfg, FakeStage::with_slides(6), FakeTimer::default()),
            Err(ConfigError::Timing(_))
        ));
    }
}
