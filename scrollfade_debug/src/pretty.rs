// Copyright 2026 the Scrollfade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Timestamps
//! are printed in milliseconds.

use std::io::Write;

use scrollfade_core::sequencer::RequestOutcome;
use scrollfade_core::stage::MediaPlayback;
use scrollfade_core::time::HostTime;
use scrollfade_core::trace::{MediaEvent, PhaseEvent, RequestEvent, TraceSink, TransitionSummary};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    show_dropped: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("show_dropped", &self.show_dropped)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
            show_dropped: true,
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self::with_writer(writer)
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            show_dropped: true,
        }
    }

    /// Whether requests the gate dropped are printed (default: yes).
    #[must_use]
    pub fn show_dropped(mut self, show: bool) -> Self {
        self.show_dropped = show;
        self
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn ms(t: HostTime) -> f64 {
    t.ticks() as f64 / 1000.0
}

fn outcome_name(outcome: RequestOutcome) -> &'static str {
    match outcome {
        RequestOutcome::Accepted => "accepted",
        RequestOutcome::Busy => "busy",
        RequestOutcome::AlreadyCurrent => "current",
        RequestOutcome::OutOfRange => "out-of-range",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_request(&mut self, e: &RequestEvent) {
        if !self.show_dropped && !e.outcome.is_accepted() {
            return;
        }
        let _ = writeln!(
            self.writer,
            "[request] {:.1}ms {} {e} -> {}",
            ms(e.at),
            e.source.name(),
            outcome_name(e.outcome),
        );
    }

    fn on_phase(&mut self, e: &PhaseEvent) {
        let _ = writeln!(
            self.writer,
            "[phase] {:.1}ms #{} {} ({} -> {})",
            ms(e.at),
            e.transition,
            e.phase.name(),
            e.from,
            e.to,
        );
    }

    fn on_media(&mut self, e: &MediaEvent) {
        let what = match (e.playback, e.rewind) {
            (MediaPlayback::NoMedia, _) => "no media",
            (MediaPlayback::Started, true) => "restart",
            (MediaPlayback::Started, false) => "play",
        };
        let _ = writeln!(self.writer, "[media] {:.1}ms slide={} {what}", ms(e.at), e.slide);
    }

    fn on_transition_summary(&mut self, s: &TransitionSummary) {
        let _ = writeln!(
            self.writer,
            "[summary] #{} {} {} -> {} swap={:.1}ms overlay-off={:.1}ms total={:.1}ms",
            s.transition,
            s.source.name(),
            s.from,
            s.to,
            ms(s.swapped_at) - ms(s.requested_at),
            ms(s.overlay_hidden_at) - ms(s.requested_at),
            s.total_ticks() as f64 / 1000.0,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrollfade_core::sequencer::TriggerSource;
    use scrollfade_core::slide::SlideIndex;

    fn busy_request() -> RequestEvent {
        RequestEvent {
            at: HostTime(1_500_000),
            source: TriggerSource::Keyboard,
            from: SlideIndex(2),
            to: SlideIndex(3),
            scroll_percent: None,
            outcome: RequestOutcome::Busy,
        }
    }

    #[test]
    fn pretty_print_request() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_request(&busy_request());
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(output.contains("[request] 1500.0ms"), "got: {output}");
        assert!(output.contains("from 2 to 3"), "got: {output}");
        assert!(output.contains("busy"), "got: {output}");
    }

    #[test]
    fn dropped_requests_can_be_hidden() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new()).show_dropped(false);
        sink.on_request(&busy_request());
        assert!(sink.into_inner().is_empty(), "busy request was printed");
    }
}
