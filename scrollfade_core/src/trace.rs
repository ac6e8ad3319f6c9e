// Copyright 2026 the Scrollfade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the transition sequence.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! sequencer calls as requests arrive and phases change. All method bodies
//! default to no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).

use core::fmt;

use crate::sequencer::{Phase, RequestOutcome, TriggerSource};
use crate::slide::SlideIndex;
use crate::stage::MediaPlayback;
use crate::time::HostTime;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted for every request that reaches the gate, accepted or not.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestEvent {
    /// Host time of the request.
    pub at: HostTime,
    /// Producer of the request.
    pub source: TriggerSource,
    /// Slide showing when the request arrived.
    pub from: SlideIndex,
    /// Requested slide.
    pub to: SlideIndex,
    /// Whole-percent scroll position, for scroll-driven requests.
    pub scroll_percent: Option<u8>,
    /// What the gate decided.
    pub outcome: RequestOutcome,
}

/// Formats as `from 0 to 3 at scroll 50%`, or `from 0 to 3 (keyboard)` when
/// there is no scroll position.
impl fmt::Display for RequestEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "from {} to {}", self.from, self.to)?;
        match self.scroll_percent {
            Some(pct) => write!(f, " at scroll {pct}%"),
            None => write!(f, " ({})", self.source.name()),
        }
    }
}

/// Emitted when the sequencer enters a phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseEvent {
    /// Scheduled instant the phase began.
    pub at: HostTime,
    /// Transition counter, starting at 1.
    pub transition: u64,
    /// Phase entered.
    pub phase: Phase,
    /// Slide the transition started from.
    pub from: SlideIndex,
    /// Slide the transition is heading to.
    pub to: SlideIndex,
}

/// Emitted when a slide's media is started.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MediaEvent {
    /// When playback was requested.
    pub at: HostTime,
    /// Slide whose media was started.
    pub slide: SlideIndex,
    /// Whether playback restarted from the beginning.
    pub rewind: bool,
    /// What the stage reported.
    pub playback: MediaPlayback,
}

/// Per-transition timing summary, emitted once the sequencer is idle again.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransitionSummary {
    /// Transition counter.
    pub transition: u64,
    /// Producer of the accepted request.
    pub source: TriggerSource,
    /// Slide before the transition.
    pub from: SlideIndex,
    /// Slide after the transition.
    pub to: SlideIndex,
    /// When the request was accepted.
    pub requested_at: HostTime,
    /// When the slides were swapped.
    pub swapped_at: HostTime,
    /// When the overlay was hidden.
    pub overlay_hidden_at: HostTime,
    /// When the sequencer returned to idle.
    pub finished_at: HostTime,
}

impl TransitionSummary {
    /// Ticks from acceptance to idle.
    #[must_use]
    pub fn total_ticks(&self) -> u64 {
        self.finished_at.saturating_duration_since(self.requested_at).ticks()
    }
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the sequencer.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a request reaches the gate.
    fn on_request(&mut self, e: &RequestEvent) {
        _ = e;
    }

    /// Called when the sequencer enters a phase.
    fn on_phase(&mut self, e: &PhaseEvent) {
        _ = e;
    }

    /// Called when media playback is requested.
    fn on_media(&mut self, e: &MediaEvent) {
        _ = e;
    }

    /// Called with a per-transition summary.
    fn on_transition_summary(&mut self, s: &TransitionSummary) {
        _ = s;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`RequestEvent`].
    #[inline]
    pub fn request(&mut self, e: &RequestEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_request(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseEvent`].
    #[inline]
    pub fn phase(&mut self, e: &PhaseEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`MediaEvent`].
    #[inline]
    pub fn media(&mut self, e: &MediaEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_media(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`TransitionSummary`].
    #[inline]
    pub fn transition_summary(&mut self, s: &TransitionSummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_transition_summary(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use alloc::string::ToString as _;

    use super::*;

    fn sample_request() -> RequestEvent {
        RequestEvent {
            at: HostTime(1_000),
            source: TriggerSource::Scroll,
            from: SlideIndex(0),
            to: SlideIndex(3),
            scroll_percent: Some(50),
            outcome: RequestOutcome::Accepted,
        }
    }

    #[test]
    fn request_display_includes_scroll_percent() {
        assert_eq!(sample_request().to_string(), "from 0 to 3 at scroll 50%");

        let key = RequestEvent {
            source: TriggerSource::Keyboard,
            scroll_percent: None,
            ..sample_request()
        };
        assert_eq!(key.to_string(), "from 0 to 3 (keyboard)");
    }

    #[test]
    fn summary_total() {
        let s = TransitionSummary {
            transition: 1,
            source: TriggerSource::Direct,
            from: SlideIndex(0),
            to: SlideIndex(1),
            requested_at: HostTime(100),
            swapped_at: HostTime(1_000_100),
            overlay_hidden_at: HostTime(1_500_100),
            finished_at: HostTime(2_500_100),
        };
        assert_eq!(s.total_ticks(), 2_500_000);
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_request(&sample_request());
        sink.on_media(&MediaEvent {
            at: HostTime(0),
            slide: SlideIndex(0),
            rewind: false,
            playback: MediaPlayback::NoMedia,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.request(&sample_request());
        tracer.phase(&PhaseEvent {
            at: HostTime(0),
            transition: 1,
            phase: Phase::FadingOut,
            from: SlideIndex(0),
            to: SlideIndex(1),
        });
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            targets: Vec<SlideIndex>,
        }
        impl TraceSink for RecordingSink {
            fn on_request(&mut self, e: &RequestEvent) {
                self.targets.push(e.to);
            }
        }

        let mut sink = RecordingSink {
            targets: Vec::new(),
        };
        let mut tracer = Tracer::new(&mut sink);
        tracer.request(&sample_request());
        // Access sink after tracer is dropped.
        drop(tracer);
        assert_eq!(sink.targets, &[SlideIndex(3)]);
    }
}
