// Copyright 2026 the Scrollfade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web backend for scrollfade.
//!
//! This crate provides integration with browser APIs:
//!
//! - [`DomStage`]: `.video-slide` / `.fade-overlay` class toggling and
//!   `<video>` playback
//! - [`TimeoutTimer`]: `setTimeout` wake-ups for phase deadlines
//! - [`attach`]: marker tagging plus scroll, `IntersectionObserver` and
//!   `keydown` listeners feeding a [`Carousel`]
//! - [`ConsoleSink`]: transition log lines on the browser console
//!
//! [`Carousel`]: scrollfade_core::carousel::Carousel

#![no_std]

extern crate alloc;

mod bind;
mod dom_stage;
mod timeout;

pub use bind::{
    HEADER_SELECTOR, MARKER_CLASS, SECTION_ATTRIBUTE, TEXT_COLUMN_SELECTOR, WebCarousel, attach,
    tag_section_markers,
};
pub use dom_stage::{ACTIVE_CLASS, DomStage, OVERLAY_SELECTOR, SLIDE_SELECTOR};
pub use scrollfade_core::stage::{Stage, Timer};
pub use timeout::TimeoutTimer;

use alloc::format;
use alloc::string::String;

use scrollfade_core::sequencer::RequestOutcome;
use scrollfade_core::stage::MediaPlayback;
use scrollfade_core::time::HostTime;
use scrollfade_core::trace::{MediaEvent, RequestEvent, TraceSink, TransitionSummary};

/// Returns the current host time from `performance.now()`.
///
/// The returned [`HostTime`] is in microsecond ticks.
#[must_use]
pub fn now() -> HostTime {
    HostTime::from_millis_f64(timeout::performance_now())
}

/// A [`TraceSink`] that writes to the browser console.
///
/// Accepted requests are logged with `console.log`; transitions to slides
/// without media and, when `verbose`, dropped requests and per-transition
/// summaries are logged with `console.debug`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleSink {
    /// Also log dropped requests and transition summaries.
    pub verbose: bool,
}

impl ConsoleSink {
    /// Creates a sink that only logs accepted requests.
    #[must_use]
    pub const fn new() -> Self {
        Self { verbose: false }
    }

    /// The console line for a request, or `None` if it is not logged.
    #[must_use]
    pub fn request_line(&self, e: &RequestEvent) -> Option<String> {
        match e.outcome {
            RequestOutcome::Accepted => Some(format!("Changing video {e}")),
            RequestOutcome::Busy | RequestOutcome::AlreadyCurrent | RequestOutcome::OutOfRange
                if self.verbose =>
            {
                Some(format!("Ignored request {e}: {:?}", e.outcome))
            }
            _ => None,
        }
    }
}

impl TraceSink for ConsoleSink {
    fn on_request(&mut self, e: &RequestEvent) {
        if let Some(line) = self.request_line(e) {
            if e.outcome.is_accepted() {
                web_sys::console::log_1(&line.into());
            } else {
                web_sys::console::debug_1(&line.into());
            }
        }
    }

    fn on_media(&mut self, e: &MediaEvent) {
        if e.playback == MediaPlayback::NoMedia {
            let line = format!("Slide {} has no video to play", e.slide);
            web_sys::console::debug_1(&line.into());
        }
    }

    fn on_transition_summary(&mut self, s: &TransitionSummary) {
        if self.verbose {
            let line = format!(
                "Transition #{} {} -> {} ({}) took {}ms",
                s.transition,
                s.from,
                s.to,
                s.source.name(),
                s.total_ticks() / 1000,
            );
            web_sys::console::debug_1(&line.into());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrollfade_core::sequencer::TriggerSource;
    use scrollfade_core::slide::SlideIndex;

    fn event(outcome: RequestOutcome) -> RequestEvent {
        RequestEvent {
            at: HostTime(0),
            source: TriggerSource::Scroll,
            from: SlideIndex(1),
            to: SlideIndex(4),
            scroll_percent: Some(72),
            outcome,
        }
    }

    #[test]
    fn accepted_request_line() {
        let sink = ConsoleSink::new();
        assert_eq!(
            sink.request_line(&event(RequestOutcome::Accepted)).as_deref(),
            Some("Changing video from 1 to 4 at scroll 72%")
        );
    }

    #[test]
    fn dropped_requests_only_when_verbose() {
        let quiet = ConsoleSink::new();
        assert_eq!(quiet.request_line(&event(RequestOutcome::Busy)), None);

        let verbose = ConsoleSink { verbose: true };
        let line = verbose.request_line(&event(RequestOutcome::Busy));
        assert_eq!(line.as_deref(), Some("Ignored request from 1 to 4 at scroll 72%: Busy"));
    }
}
