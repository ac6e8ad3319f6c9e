// Copyright 2026 the Scrollfade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated reading session that exercises the tracing and diagnostics
//! pipeline.
//!
//! Scrolls a simulated six-section page (slowly, then with a fast fling and
//! some arrow keys), recording events to both a
//! [`PrettyPrintSink`](scrollfade_debug::pretty::PrettyPrintSink) and a
//! [`RecorderSink`](scrollfade_debug::recorder::RecorderSink), then exports a
//! Chrome trace JSON file.

use std::fs::File;
use std::io::BufWriter;

use scrollfade_core::config::CarouselConfig;
use scrollfade_core::keyboard::NavKey;
use scrollfade_core::time::Duration;
use scrollfade_core::trace::{
    MediaEvent, PhaseEvent, RequestEvent, TraceSink, Tracer, TransitionSummary,
};
use scrollfade_sim_harness::{Session, check_invariants};

use scrollfade_debug::pretty::PrettyPrintSink;
use scrollfade_debug::recorder::{RecordedEvent, RecorderSink, decode};

/// Pixels per simulated scroll event during the slow read.
const READ_STEP_PX: f64 = 120.0;
/// Time between scroll events during the slow read.
const READ_STEP: Duration = Duration::from_millis(400);

/// Forwards every event to two sinks.
struct Tee<'a> {
    a: &'a mut dyn TraceSink,
    b: &'a mut dyn TraceSink,
}

impl TraceSink for Tee<'_> {
    fn on_request(&mut self, e: &RequestEvent) {
        self.a.on_request(e);
        self.b.on_request(e);
    }

    fn on_phase(&mut self, e: &PhaseEvent) {
        self.a.on_phase(e);
        self.b.on_phase(e);
    }

    fn on_media(&mut self, e: &MediaEvent) {
        self.a.on_media(e);
        self.b.on_media(e);
    }

    fn on_transition_summary(&mut self, s: &TransitionSummary) {
        self.a.on_transition_summary(s);
        self.b.on_transition_summary(s);
    }
}

fn main() {
    // -- sinks -------------------------------------------------------------
    let mut pretty = PrettyPrintSink::new(Box::new(std::io::stdout()));
    let mut recorder = RecorderSink::new();

    {
        let mut tee = Tee {
            a: &mut pretty,
            b: &mut recorder,
        };
        let mut tracer = Tracer::new(&mut tee);

        // -- session -------------------------------------------------------
        let config = CarouselConfig::standard();
        let mut session = Session::new(&config, &mut tracer).expect("standard config is valid");
        let max = session.layout().max_offset();

        // 1. Slow read to the middle of the page.
        let mut offset = 0.0;
        while offset < max / 2.0 {
            offset += READ_STEP_PX;
            let _ = session.scroll_to(offset, &mut tracer);
            session.advance(READ_STEP, &mut tracer);
            check_invariants(session.carousel()).expect("invariants hold while reading");
        }
        session.settle(&mut tracer);

        // 2. Fling to the bottom in a few large steps; most land mid-fade.
        for offset in [max * 0.7, max * 0.85, max] {
            let _ = session.scroll_to(offset, &mut tracer);
            session.advance(Duration::from_millis(150), &mut tracer);
        }
        session.settle(&mut tracer);

        // 3. The fling was dropped mid-fade; the next scroll event catches up.
        let _ = session.nudge(&mut tracer);
        session.settle(&mut tracer);

        // 4. Arrow keys back up, one pressed during the fade.
        for key in [NavKey::Previous, NavKey::Previous] {
            let _ = session.key(key, &mut tracer);
            session.advance(Duration::from_millis(600), &mut tracer);
        }
        session.settle(&mut tracer);
        check_invariants(session.carousel()).expect("invariants hold at rest");

        println!(
            "Session ended on slide {} after {} transitions",
            session.carousel().current(),
            session.carousel().sequencer().transitions_started(),
        );
    }

    let transitions = decode(recorder.as_bytes())
        .filter(|e| matches!(e, RecordedEvent::TransitionSummary(_)))
        .count();

    // -- export Chrome trace -----------------------------------------------
    let path = "trace.json";
    let file = File::create(path).expect("failed to create trace.json");
    let mut writer = BufWriter::new(file);
    scrollfade_debug::chrome::export(recorder.as_bytes(), &mut writer)
        .expect("failed to write Chrome trace");

    println!("Wrote {path} ({transitions} transitions)");
}
