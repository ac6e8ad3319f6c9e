// Copyright 2026 the Scrollfade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].

use scrollfade_core::sequencer::{Phase, RequestOutcome, TriggerSource};
use scrollfade_core::slide::SlideIndex;
use scrollfade_core::stage::MediaPlayback;
use scrollfade_core::time::HostTime;
use scrollfade_core::trace::{MediaEvent, PhaseEvent, RequestEvent, TraceSink, TransitionSummary};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_REQUEST: u8 = 1;
const TAG_PHASE: u8 = 2;
const TAG_MEDIA: u8 = 3;
const TAG_TRANSITION_SUMMARY: u8 = 4;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_slide(&mut self, s: SlideIndex) {
        self.write_u32(s.0);
    }

    fn write_option_u8(&mut self, v: Option<u8>) {
        match v {
            Some(val) => {
                self.write_u8(1);
                self.write_u8(val);
            }
            None => {
                self.write_u8(0);
                self.write_u8(0);
            }
        }
    }

    fn write_source(&mut self, s: TriggerSource) {
        self.write_u8(match s {
            TriggerSource::Scroll => 0,
            TriggerSource::Visibility => 1,
            TriggerSource::Keyboard => 2,
            TriggerSource::Direct => 3,
        });
    }

    fn write_outcome(&mut self, o: RequestOutcome) {
        self.write_u8(match o {
            RequestOutcome::Accepted => 0,
            RequestOutcome::Busy => 1,
            RequestOutcome::AlreadyCurrent => 2,
            RequestOutcome::OutOfRange => 3,
        });
    }

    fn write_phase(&mut self, p: Phase) {
        self.write_u8(match p {
            Phase::Idle => 0,
            Phase::FadingOut => 1,
            Phase::Swapping => 2,
            Phase::FadingIn => 3,
            Phase::Cooldown => 4,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_request(&mut self, e: &RequestEvent) {
        self.write_u8(TAG_REQUEST);
        self.write_u64(e.at.ticks());
        self.write_source(e.source);
        self.write_slide(e.from);
        self.write_slide(e.to);
        self.write_option_u8(e.scroll_percent);
        self.write_outcome(e.outcome);
    }

    fn on_phase(&mut self, e: &PhaseEvent) {
        self.write_u8(TAG_PHASE);
        self.write_u64(e.at.ticks());
        self.write_u64(e.transition);
        self.write_phase(e.phase);
        self.write_slide(e.from);
        self.write_slide(e.to);
    }

    fn on_media(&mut self, e: &MediaEvent) {
        self.write_u8(TAG_MEDIA);
        self.write_u64(e.at.ticks());
        self.write_slide(e.slide);
        self.write_u8(u8::from(e.rewind));
        self.write_u8(match e.playback {
            MediaPlayback::Started => 1,
            MediaPlayback::NoMedia => 0,
        });
    }

    fn on_transition_summary(&mut self, s: &TransitionSummary) {
        self.write_u8(TAG_TRANSITION_SUMMARY);
        self.write_u64(s.transition);
        self.write_source(s.source);
        self.write_slide(s.from);
        self.write_slide(s.to);
        self.write_u64(s.requested_at.ticks());
        self.write_u64(s.swapped_at.ticks());
        self.write_u64(s.overlay_hidden_at.ticks());
        self.write_u64(s.finished_at.ticks());
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    /// A [`RequestEvent`].
    Request(RequestEvent),
    /// A [`PhaseEvent`].
    Phase(PhaseEvent),
    /// A [`MediaEvent`].
    Media(MediaEvent),
    /// A [`TransitionSummary`].
    TransitionSummary(TransitionSummary),
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
///
/// Iteration stops at the first truncated record or unknown tag.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let end = self.pos.checked_add(N)?;
        let bytes = self.data.get(self.pos..end)?.try_into().ok()?;
        self.pos = end;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[b]| b)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_time(&mut self) -> Option<HostTime> {
        self.read_u64().map(HostTime)
    }

    fn read_slide(&mut self) -> Option<SlideIndex> {
        self.read_u32().map(SlideIndex)
    }

    fn read_option_u8(&mut self) -> Option<Option<u8>> {
        let present = self.read_u8()?;
        let val = self.read_u8()?;
        Some((present != 0).then_some(val))
    }

    fn read_source(&mut self) -> Option<TriggerSource> {
        Some(match self.read_u8()? {
            0 => TriggerSource::Scroll,
            1 => TriggerSource::Visibility,
            2 => TriggerSource::Keyboard,
            _ => TriggerSource::Direct,
        })
    }

    fn read_outcome(&mut self) -> Option<RequestOutcome> {
        Some(match self.read_u8()? {
            0 => RequestOutcome::Accepted,
            1 => RequestOutcome::Busy,
            2 => RequestOutcome::AlreadyCurrent,
            _ => RequestOutcome::OutOfRange,
        })
    }

    fn read_phase(&mut self) -> Option<Phase> {
        Some(match self.read_u8()? {
            0 => Phase::Idle,
            1 => Phase::FadingOut,
            2 => Phase::Swapping,
            3 => Phase::FadingIn,
            _ => Phase::Cooldown,
        })
    }

    fn decode_request(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Request(RequestEvent {
            at: self.read_time()?,
            source: self.read_source()?,
            from: self.read_slide()?,
            to: self.read_slide()?,
            scroll_percent: self.read_option_u8()?,
            outcome: self.read_outcome()?,
        }))
    }

    fn decode_phase(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Phase(PhaseEvent {
            at: self.read_time()?,
            transition: self.read_u64()?,
            phase: self.read_phase()?,
            from: self.read_slide()?,
            to: self.read_slide()?,
        }))
    }

    fn decode_media(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Media(MediaEvent {
            at: self.read_time()?,
            slide: self.read_slide()?,
            rewind: self.read_u8()? != 0,
            playback: if self.read_u8()? != 0 {
                MediaPlayback::Started
            } else {
                MediaPlayback::NoMedia
            },
        }))
    }

    fn decode_transition_summary(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::TransitionSummary(TransitionSummary {
            transition: self.read_u64()?,
            source: self.read_source()?,
            from: self.read_slide()?,
            to: self.read_slide()?,
            requested_at: self.read_time()?,
            swapped_at: self.read_time()?,
            overlay_hidden_at: self.read_time()?,
            finished_at: self.read_time()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_REQUEST => self.decode_request(),
            TAG_PHASE => self.decode_phase(),
            TAG_MEDIA => self.decode_media(),
            TAG_TRANSITION_SUMMARY => self.decode_transition_summary(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use scrollfade_core::carousel::Carousel;
    use scrollfade_core::config::CarouselConfig;
    use scrollfade_core::trace::Tracer;
    use scrollfade_sim_harness::{FakeStage, ManualTimer};

    fn sample_request() -> RequestEvent {
        RequestEvent {
            at: HostTime(1_000_000),
            source: TriggerSource::Scroll,
            from: SlideIndex(0),
            to: SlideIndex(3),
            scroll_percent: Some(55),
            outcome: RequestOutcome::Accepted,
        }
    }

    #[test]
    fn request_survives_recording() {
        let mut rec = RecorderSink::new();
        let orig = sample_request();
        rec.on_request(&orig);

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events, vec![RecordedEvent::Request(orig)]);
    }

    #[test]
    fn records_a_whole_transition_in_order() {
        let mut rec = RecorderSink::new();
        let mut carousel = Carousel::new(
            &CarouselConfig::standard(),
            FakeStage::new(6),
            ManualTimer::default(),
        )
        .unwrap();
        {
            let mut tracer = Tracer::new(&mut rec);
            carousel.start(HostTime(0), &mut tracer);
            let _ = carousel.show(SlideIndex(4), HostTime(0), &mut tracer);
            carousel.on_timer(HostTime(10_000_000), &mut tracer);
        }

        let kinds: Vec<&str> = decode(rec.as_bytes())
            .map(|e| match e {
                RecordedEvent::Request(_) => "request",
                RecordedEvent::Phase(p) => p.phase.name(),
                RecordedEvent::Media(_) => "media",
                RecordedEvent::TransitionSummary(_) => "summary",
            })
            .collect();
        assert_eq!(
            kinds,
            [
                "media", "request", "fade-out", "media", "swap", "fade-in", "cooldown", "idle",
                "summary"
            ],
            "unexpected event order"
        );

        let summary = decode(rec.as_bytes()).find_map(|e| match e {
            RecordedEvent::TransitionSummary(s) => Some(s),
            _ => None,
        });
        let summary = summary.unwrap();
        assert_eq!(summary.to, SlideIndex(4));
        assert_eq!(summary.swapped_at, HostTime(1_000_000));
        assert_eq!(summary.finished_at, HostTime(2_500_000));
    }

    #[test]
    fn truncated_recording_stops_cleanly() {
        let mut rec = RecorderSink::new();
        rec.on_request(&sample_request());
        rec.on_request(&sample_request());
        let bytes = rec.into_bytes();
        let cut = &bytes[..bytes.len() - 3];
        assert_eq!(decode(cut).count(), 1);
    }

    #[test]
    fn unknown_tag_stops_iteration() {
        assert_eq!(decode(&[0xff, 1, 2, 3]).count(), 0);
    }
}
