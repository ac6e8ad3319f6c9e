// Copyright 2026 the Scrollfade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! Requests and media starts become instant events. Each phase becomes a
//! duration slice on its own track, closed when the next phase begins, and
//! each transition summary becomes a complete event spanning the whole
//! transition.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use scrollfade_core::sequencer::Phase;
use scrollfade_core::time::HostTime;

use crate::recorder::{RecordedEvent, decode};

const TID_REQUESTS: u32 = 0;
const TID_PHASES: u32 = 1;
const TID_MEDIA: u32 = 2;
const TID_TRANSITIONS: u32 = 3;

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// # Errors
///
/// Returns any error from writing to `writer`.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    let mut open_phase: Option<Phase> = None;

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::Request(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": format!("{:?}", e.outcome),
                    "cat": "Request",
                    "ts": us(e.at),
                    "pid": 0,
                    "tid": TID_REQUESTS,
                    "s": "t",
                    "args": {
                        "source": e.source.name(),
                        "from": e.from.0,
                        "to": e.to.0,
                        "scroll_percent": e.scroll_percent,
                    }
                }));
            }
            RecordedEvent::Phase(e) => {
                if let Some(prev) = open_phase.take() {
                    events.push(json!({
                        "ph": "E",
                        "name": prev.name(),
                        "cat": "Phase",
                        "ts": us(e.at),
                        "pid": 0,
                        "tid": TID_PHASES,
                    }));
                }
                if e.phase != Phase::Idle {
                    events.push(json!({
                        "ph": "B",
                        "name": e.phase.name(),
                        "cat": "Phase",
                        "ts": us(e.at),
                        "pid": 0,
                        "tid": TID_PHASES,
                        "args": {
                            "transition": e.transition,
                            "from": e.from.0,
                            "to": e.to.0,
                        }
                    }));
                    open_phase = Some(e.phase);
                }
            }
            RecordedEvent::Media(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Play",
                    "cat": "Media",
                    "ts": us(e.at),
                    "pid": 0,
                    "tid": TID_MEDIA,
                    "s": "t",
                    "args": {
                        "slide": e.slide.0,
                        "rewind": e.rewind,
                        "playback": format!("{:?}", e.playback),
                    }
                }));
            }
            RecordedEvent::TransitionSummary(s) => {
                events.push(json!({
                    "ph": "X",
                    "name": format!("{} -> {}", s.from, s.to),
                    "cat": "Transition",
                    "ts": us(s.requested_at),
                    "dur": s.total_ticks(),
                    "pid": 0,
                    "tid": TID_TRANSITIONS,
                    "args": {
                        "transition": s.transition,
                        "source": s.source.name(),
                        "swap_us": s.swapped_at.saturating_duration_since(s.requested_at).ticks(),
                        "overlay_off_us": s
                            .overlay_hidden_at
                            .saturating_duration_since(s.requested_at)
                            .ticks(),
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

/// Host ticks are already microseconds, the unit Chrome traces use.
fn us(t: HostTime) -> u64 {
    t.ticks()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use scrollfade_core::sequencer::{RequestOutcome, TriggerSource};
    use scrollfade_core::slide::SlideIndex;
    use scrollfade_core::trace::{PhaseEvent, RequestEvent, TraceSink};

    fn phase(at: u64, phase: Phase) -> PhaseEvent {
        PhaseEvent {
            at: HostTime(at),
            transition: 1,
            phase,
            from: SlideIndex(0),
            to: SlideIndex(1),
        }
    }

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_request(&RequestEvent {
            at: HostTime(0),
            source: TriggerSource::Visibility,
            from: SlideIndex(0),
            to: SlideIndex(1),
            scroll_percent: None,
            outcome: RequestOutcome::Accepted,
        });
        rec.on_phase(&phase(0, Phase::FadingOut));
        rec.on_phase(&phase(1_000_000, Phase::Swapping));
        rec.on_phase(&phase(1_500_000, Phase::Idle));

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();

        // Should parse as a JSON array.
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.len(), 5);

        assert_eq!(parsed[0]["ph"], "i");
        assert_eq!(parsed[0]["name"], "Accepted");

        assert_eq!(parsed[1]["ph"], "B");
        assert_eq!(parsed[1]["name"], "fade-out");

        // Entering a phase closes the previous one.
        assert_eq!(parsed[2]["ph"], "E");
        assert_eq!(parsed[2]["name"], "fade-out");
        assert_eq!(parsed[2]["ts"], 1_000_000);
        assert_eq!(parsed[3]["ph"], "B");

        // Idle only closes.
        assert_eq!(parsed[4]["ph"], "E");
        assert_eq!(parsed[4]["name"], "swap");
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert!(parsed.is_empty());
    }
}
