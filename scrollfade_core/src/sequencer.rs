// Copyright 2026 the Scrollfade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fade-transition state machine.
//!
//! The [`Sequencer`] accepts [`TransitionRequest`]s from any producer and
//! walks each accepted request through five named phases. Phase changes
//! happen at scheduled deadlines; the caller supplies the current
//! [`HostTime`] and arms a timer for [`Sequencer::next_deadline`]. See the
//! [`Sequencer`] struct docs for the timeline.

use crate::config::TransitionTiming;
use crate::slide::SlideIndex;
use crate::stage::Stage;
use crate::time::HostTime;
use crate::trace::{MediaEvent, PhaseEvent, RequestEvent, Tracer, TransitionSummary};

/// Phase of the transition sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// No transition in flight; requests are accepted.
    Idle,
    /// Overlay shown, old slide still active.
    FadingOut,
    /// New slide active and playing behind the overlay.
    Swapping,
    /// Overlay hidden, fade back in progress.
    FadingIn,
    /// Fade finished; settling before returning to [`Idle`](Self::Idle).
    Cooldown,
}

impl Phase {
    /// Short lowercase name for log lines.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::FadingOut => "fade-out",
            Self::Swapping => "swap",
            Self::FadingIn => "fade-in",
            Self::Cooldown => "cooldown",
        }
    }
}

/// Which producer issued a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TriggerSource {
    /// Scroll-percentage resolver.
    Scroll,
    /// Visibility-band resolver.
    Visibility,
    /// Keyboard navigation.
    Keyboard,
    /// Programmatic request from application code.
    Direct,
}

impl TriggerSource {
    /// Short lowercase name for log lines.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Scroll => "scroll",
            Self::Visibility => "visibility",
            Self::Keyboard => "keyboard",
            Self::Direct => "direct",
        }
    }
}

/// A request to show a slide.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransitionRequest {
    /// Slide to show.
    pub target: SlideIndex,
    /// Producer that resolved the target.
    pub source: TriggerSource,
    /// Scroll position at resolution time, for scroll-driven requests.
    pub scroll_percent: Option<u8>,
}

impl TransitionRequest {
    /// Creates a request without scroll context.
    #[must_use]
    pub const fn new(target: SlideIndex, source: TriggerSource) -> Self {
        Self {
            target,
            source,
            scroll_percent: None,
        }
    }

    /// Attaches the scroll position the target was resolved at.
    #[must_use]
    pub const fn with_scroll_percent(mut self, percent: u8) -> Self {
        self.scroll_percent = Some(percent);
        self
    }
}

/// What the gate did with a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestOutcome {
    /// A transition started.
    Accepted,
    /// Dropped: a transition is already in flight.
    Busy,
    /// Dropped: the target is already showing.
    AlreadyCurrent,
    /// Dropped: the target is not a slide.
    OutOfRange,
}

impl RequestOutcome {
    /// Returns `true` for [`Accepted`](Self::Accepted).
    #[must_use]
    pub const fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted)
    }
}

#[derive(Clone, Copy, Debug)]
struct InFlight {
    id: u64,
    from: SlideIndex,
    to: SlideIndex,
    source: TriggerSource,
    requested_at: HostTime,
    swapped_at: Option<HostTime>,
    overlay_hidden_at: Option<HostTime>,
    deadline: HostTime,
}

/// Transition gate and phase machine.
///
/// # Timeline
///
/// With fade duration `D`, swap hold `H` and cooldown `C`:
///
/// ```text
/// accept ──D/2──► swap ──H──► overlay off ──D/2──► cooldown ──C──► idle
/// FadingOut        Swapping    FadingIn            Cooldown         Idle
/// ```
///
/// Only `Idle` accepts requests. Anything arriving later is dropped, not
/// queued; once accepted, a transition always runs to completion.
///
/// # Usage
///
/// ```rust,ignore
/// let outcome = sequencer.request(req, now, &mut stage, &mut tracer);
/// if let Some(deadline) = sequencer.next_deadline() {
///     timer.arm(deadline.saturating_duration_since(now));
/// }
/// // ... when the timer fires:
/// sequencer.poll(now, &mut stage, &mut tracer);
/// ```
#[derive(Debug)]
pub struct Sequencer {
    timing: TransitionTiming,
    slide_count: usize,
    current: SlideIndex,
    phase: Phase,
    in_flight: Option<InFlight>,
    started: u64,
}

impl Sequencer {
    /// Creates an idle sequencer showing slide 0 of `slide_count`.
    #[must_use]
    pub fn new(timing: TransitionTiming, slide_count: usize) -> Self {
        Self {
            timing,
            slide_count,
            current: SlideIndex::FIRST,
            phase: Phase::Idle,
            in_flight: None,
            started: 0,
        }
    }

    /// Puts the stage in its initial state: overlay hidden, the current
    /// slide active and its media playing from wherever it is.
    pub fn start<S: Stage>(&mut self, now: HostTime, stage: &mut S, tracer: &mut Tracer<'_>) {
        stage.set_overlay_visible(false);
        for i in 0..self.slide_count {
            if let Some(index) = SlideIndex::from_usize(i) {
                stage.set_slide_active(index, index == self.current);
            }
        }
        let playback = stage.play_media(self.current, false);
        tracer.media(&MediaEvent {
            at: now,
            slide: self.current,
            rewind: false,
            playback,
        });
    }

    /// Slide currently showing (or, mid-transition before the swap, still
    /// showing).
    #[must_use]
    pub fn current(&self) -> SlideIndex {
        self.current
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns `true` while a transition is in flight.
    #[must_use]
    pub fn is_transitioning(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// When the current phase ends, if a transition is in flight.
    #[must_use]
    pub fn next_deadline(&self) -> Option<HostTime> {
        self.in_flight.map(|f| f.deadline)
    }

    /// Slide the in-flight transition is heading to.
    #[must_use]
    pub fn pending_target(&self) -> Option<SlideIndex> {
        self.in_flight.map(|f| f.to)
    }

    /// Configured timings.
    #[must_use]
    pub fn timing(&self) -> &TransitionTiming {
        &self.timing
    }

    /// Number of slides this sequencer addresses.
    #[must_use]
    pub fn slide_count(&self) -> usize {
        self.slide_count
    }

    /// Number of transitions accepted so far.
    #[must_use]
    pub fn transitions_started(&self) -> u64 {
        self.started
    }

    /// Runs a request through the gate, starting a transition if it passes.
    pub fn request<S: Stage>(
        &mut self,
        request: TransitionRequest,
        now: HostTime,
        stage: &mut S,
        tracer: &mut Tracer<'_>,
    ) -> RequestOutcome {
        let outcome = if self.is_transitioning() {
            RequestOutcome::Busy
        } else if request.target.get() >= self.slide_count {
            RequestOutcome::OutOfRange
        } else if request.target == self.current {
            RequestOutcome::AlreadyCurrent
        } else {
            RequestOutcome::Accepted
        };

        tracer.request(&RequestEvent {
            at: now,
            source: request.source,
            from: self.current,
            to: request.target,
            scroll_percent: request.scroll_percent,
            outcome,
        });

        if outcome.is_accepted() {
            self.begin(request, now, stage, tracer);
        }
        outcome
    }

    /// Advances through every phase whose deadline is at or before `now`
    /// and returns the next deadline.
    ///
    /// Each phase begins at its scheduled instant rather than at `now`, so a
    /// late wake-up does not stretch the remaining phases.
    pub fn poll<S: Stage>(
        &mut self,
        now: HostTime,
        stage: &mut S,
        tracer: &mut Tracer<'_>,
    ) -> Option<HostTime> {
        while let Some(deadline) = self.next_deadline() {
            if deadline > now {
                break;
            }
            self.advance(stage, tracer);
        }
        self.next_deadline()
    }

    fn begin<S: Stage>(
        &mut self,
        request: TransitionRequest,
        now: HostTime,
        stage: &mut S,
        tracer: &mut Tracer<'_>,
    ) {
        self.started += 1;
        let flight = InFlight {
            id: self.started,
            from: self.current,
            to: request.target,
            source: request.source,
            requested_at: now,
            swapped_at: None,
            overlay_hidden_at: None,
            deadline: now.saturating_add(self.timing.half_duration()),
        };
        self.in_flight = Some(flight);
        stage.set_overlay_visible(true);
        self.enter(Phase::FadingOut, now, tracer);
    }

    fn advance<S: Stage>(&mut self, stage: &mut S, tracer: &mut Tracer<'_>) {
        let Some(mut flight) = self.in_flight else {
            self.phase = Phase::Idle;
            return;
        };
        let at = flight.deadline;
        match self.phase {
            Phase::FadingOut => {
                stage.set_slide_active(flight.from, false);
                stage.set_slide_active(flight.to, true);
                let playback = stage.play_media(flight.to, true);
                tracer.media(&MediaEvent {
                    at,
                    slide: flight.to,
                    rewind: true,
                    playback,
                });
                self.current = flight.to;
                flight.swapped_at = Some(at);
                flight.deadline = at.saturating_add(self.timing.swap_hold());
                self.in_flight = Some(flight);
                self.enter(Phase::Swapping, at, tracer);
            }
            Phase::Swapping => {
                stage.set_overlay_visible(false);
                flight.overlay_hidden_at = Some(at);
                flight.deadline = at.saturating_add(self.timing.half_duration());
                self.in_flight = Some(flight);
                self.enter(Phase::FadingIn, at, tracer);
            }
            Phase::FadingIn => {
                flight.deadline = at.saturating_add(self.timing.cooldown());
                self.in_flight = Some(flight);
                self.enter(Phase::Cooldown, at, tracer);
            }
            Phase::Cooldown | Phase::Idle => {
                self.in_flight = None;
                self.enter_with(Phase::Idle, at, &flight, tracer);
                tracer.transition_summary(&TransitionSummary {
                    transition: flight.id,
                    source: flight.source,
                    from: flight.from,
                    to: flight.to,
                    requested_at: flight.requested_at,
                    swapped_at: flight.swapped_at.unwrap_or(at),
                    overlay_hidden_at: flight.overlay_hidden_at.unwrap_or(at),
                    finished_at: at,
                });
            }
        }
    }

    fn enter(&mut self, phase: Phase, at: HostTime, tracer: &mut Tracer<'_>) {
        if let Some(flight) = self.in_flight {
            self.enter_with(phase, at, &flight, tracer);
        } else {
            self.phase = phase;
        }
    }

    fn enter_with(
        &mut self,
        phase: Phase,
        at: HostTime,
        flight: &InFlight,
        tracer: &mut Tracer<'_>,
    ) {
        self.phase = phase;
        tracer.phase(&PhaseEvent {
            at,
            transition: flight.id,
            phase,
            from: flight.from,
            to: flight.to,
        });
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;
    use crate::stage::MediaPlayback;
    use crate::time::Duration;

    #[derive(Debug)]
    struct TestStage {
        active: Vec<bool>,
        overlay: bool,
        has_media: Vec<bool>,
        plays: Vec<(SlideIndex, bool)>,
    }

    impl TestStage {
        fn new(n: usize) -> Self {
            Self {
                active: vec![false; n],
                overlay: false,
                has_media: vec![true; n],
                plays: Vec::new(),
            }
        }

        fn active_slides(&self) -> Vec<usize> {
            self.active
                .iter()
                .enumerate()
                .filter_map(|(i, &a)| a.then_some(i))
                .collect()
        }
    }

    impl Stage for TestStage {
        fn slide_count(&self) -> usize {
            self.active.len()
        }

        fn set_slide_active(&mut self, index: SlideIndex, active: bool) {
            self.active[index.get()] = active;
        }

        fn play_media(&mut self, index: SlideIndex, rewind: bool) -> MediaPlayback {
            if self.has_media[index.get()] {
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

    fn ms(v: u64) -> HostTime {
        HostTime(Duration::from_millis(v).ticks())
    }

    fn started(n: usize) -> (Sequencer, TestStage) {
        let mut seq = Sequencer::new(TransitionTiming::standard(), n);
        let mut stage = TestStage::new(n);
        seq.start(ms(0), &mut stage, &mut Tracer::none());
        (seq, stage)
    }

    fn req(target: u32) -> TransitionRequest {
        TransitionRequest::new(SlideIndex(target), TriggerSource::Direct)
    }

    #[test]
    fn start_activates_first_slide() {
        let (seq, stage) = started(6);
        assert_eq!(stage.active_slides(), vec![0]);
        assert!(!stage.overlay);
        assert_eq!(stage.plays, vec![(SlideIndex(0), false)]);
        assert_eq!(seq.phase(), Phase::Idle);
        assert_eq!(seq.current(), SlideIndex(0));
    }

    #[test]
    fn phases_follow_the_timeline() {
        let (mut seq, mut stage) = started(6);
        let mut tracer = Tracer::none();

        let outcome = seq.request(req(3), ms(100), &mut stage, &mut tracer);
        assert_eq!(outcome, RequestOutcome::Accepted);
        assert_eq!(seq.phase(), Phase::FadingOut);
        assert!(stage.overlay, "overlay shown on accept");
        assert_eq!(stage.active_slides(), vec![0], "old slide until the swap");
        assert_eq!(seq.next_deadline(), Some(ms(1100)));

        // Not yet due.
        assert_eq!(seq.poll(ms(1099), &mut stage, &mut tracer), Some(ms(1100)));
        assert_eq!(seq.phase(), Phase::FadingOut);

        assert_eq!(seq.poll(ms(1100), &mut stage, &mut tracer), Some(ms(1600)));
        assert_eq!(seq.phase(), Phase::Swapping);
        assert_eq!(stage.active_slides(), vec![3]);
        assert_eq!(stage.plays.last(), Some(&(SlideIndex(3), true)));
        assert_eq!(seq.current(), SlideIndex(3));
        assert!(stage.overlay);

        assert_eq!(seq.poll(ms(1600), &mut stage, &mut tracer), Some(ms(2600)));
        assert_eq!(seq.phase(), Phase::FadingIn);
        assert!(!stage.overlay);
        assert!(seq.is_transitioning());

        // Zero cooldown: fade-in end passes straight through to idle.
        assert_eq!(seq.poll(ms(2600), &mut stage, &mut tracer), None);
        assert_eq!(seq.phase(), Phase::Idle);
        assert!(!seq.is_transitioning());
    }

    #[test]
    fn late_poll_catches_up_on_schedule() {
        let (mut seq, mut stage) = started(6);
        let mut tracer = Tracer::none();
        let _ = seq.request(req(2), ms(0), &mut stage, &mut tracer);

        assert_eq!(seq.poll(ms(10_000), &mut stage, &mut tracer), None);
        assert_eq!(seq.phase(), Phase::Idle);
        assert_eq!(stage.active_slides(), vec![2]);
        assert!(!stage.overlay);
    }

    #[test]
    fn requests_while_busy_are_dropped() {
        let (mut seq, mut stage) = started(6);
        let mut tracer = Tracer::none();
        let _ = seq.request(req(1), ms(0), &mut stage, &mut tracer);

        let before = (seq.current(), seq.phase(), seq.next_deadline(), seq.pending_target());
        for (t, target) in [(10, 4), (1200, 5), (2000, 0)] {
            let _ = seq.poll(ms(t), &mut stage, &mut tracer);
            let snapshot = (seq.current(), seq.phase(), seq.next_deadline(), seq.pending_target());
            assert_eq!(seq.request(req(target), ms(t), &mut stage, &mut tracer), RequestOutcome::Busy);
            assert_eq!(
                (seq.current(), seq.phase(), seq.next_deadline(), seq.pending_target()),
                snapshot,
                "busy request changed state at {t}ms"
            );
        }
        assert_eq!(before.3, Some(SlideIndex(1)));

        let _ = seq.poll(ms(5000), &mut stage, &mut tracer);
        assert_eq!(seq.current(), SlideIndex(1), "dropped requests are not queued");
        assert_eq!(seq.transitions_started(), 1);
    }

    #[test]
    fn same_and_out_of_range_targets_are_dropped() {
        let (mut seq, mut stage) = started(6);
        let mut tracer = Tracer::none();
        assert_eq!(seq.request(req(0), ms(0), &mut stage, &mut tracer), RequestOutcome::AlreadyCurrent);
        assert_eq!(seq.request(req(6), ms(0), &mut stage, &mut tracer), RequestOutcome::OutOfRange);
        assert_eq!(seq.request(req(u32::MAX), ms(0), &mut stage, &mut tracer), RequestOutcome::OutOfRange);
        assert_eq!(seq.phase(), Phase::Idle);
        assert!(!stage.overlay);
        assert_eq!(stage.active_slides(), vec![0]);
    }

    #[test]
    fn missing_media_is_skipped() {
        let (mut seq, mut stage) = started(3);
        stage.has_media[2] = false;
        let mut tracer = Tracer::none();
        let _ = seq.request(req(2), ms(0), &mut stage, &mut tracer);
        let _ = seq.poll(ms(5000), &mut stage, &mut tracer);
        assert_eq!(seq.current(), SlideIndex(2));
        assert_eq!(stage.active_slides(), vec![2]);
        assert_eq!(stage.plays, vec![(SlideIndex(0), false)]);
    }

    #[test]
    fn cooldown_delays_idle() {
        let timing = TransitionTiming {
            cooldown_ms: 300,
            ..TransitionTiming::standard()
        };
        let mut seq = Sequencer::new(timing, 2);
        let mut stage = TestStage::new(2);
        let mut tracer = Tracer::none();
        seq.start(ms(0), &mut stage, &mut tracer);
        let _ = seq.request(req(1), ms(0), &mut stage, &mut tracer);

        assert_eq!(seq.poll(ms(2500), &mut stage, &mut tracer), Some(ms(2800)));
        assert_eq!(seq.phase(), Phase::Cooldown);
        assert_eq!(seq.request(req(0), ms(2700), &mut stage, &mut tracer), RequestOutcome::Busy);
        assert_eq!(seq.poll(ms(2800), &mut stage, &mut tracer), None);
        assert_eq!(seq.request(req(0), ms(2800), &mut stage, &mut tracer), RequestOutcome::Accepted);
    }

    #[test]
    fn full_cycle_from_any_start_lands_on_target() {
        for from in 0..4_u32 {
            for to in 0..4_u32 {
                let (mut seq, mut stage) = started(4);
                let mut tracer = Tracer::none();
                if from != 0 {
                    let _ = seq.request(req(from), ms(0), &mut stage, &mut tracer);
                    let _ = seq.poll(ms(3000), &mut stage, &mut tracer);
                }
                let _ = seq.request(req(to), ms(4000), &mut stage, &mut tracer);
                let _ = seq.poll(ms(8000), &mut stage, &mut tracer);
                assert_eq!(stage.active_slides(), vec![SlideIndex(to).get()], "{from} -> {to}");
                assert!(!stage.overlay);
                assert!(!seq.is_transitioning());
                assert_eq!(seq.current(), SlideIndex(to));
            }
        }
    }
}
