// Copyright 2026 the Scrollfade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contract for presentation integrations.
//!
//! Scrollfade splits platform-specific work into *backend* crates. Each
//! backend provides the following pieces:
//!
//! - **Stage**: implements [`Stage`] to toggle slides and the overlay and to
//!   start media playback (e.g. CSS classes and `<video>` elements).
//!
//! - **Timer**: implements [`Timer`] so the [`Carousel`] can ask to be woken
//!   at the next phase deadline (e.g. `setTimeout`).
//!
//! - **Time**: a `now() -> HostTime` free function reading the platform's
//!   monotonic clock.
//!
//! - **Event sources**: scroll, visibility and keyboard listeners. These are
//!   backend-specific and not abstracted by a trait because their setup and
//!   lifecycle differ fundamentally across platforms; they call the
//!   `Carousel::on_*` methods.
//!
//! # Crate boundaries
//!
//! `scrollfade_core` owns the section model, resolvers, the sequencer, and
//! this contract module. Backend crates depend on `scrollfade_core` and
//! provide platform glue. Application code depends on both and wires them
//! together.
//!
//! [`Carousel`]: crate::carousel::Carousel

use crate::slide::SlideIndex;
use crate::time::Duration;

/// Result of asking a slide to start its media.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MediaPlayback {
    /// Playback was started.
    Started,
    /// The slide has no playable media; nothing was done.
    NoMedia,
}

/// The visual collaborator the sequencer drives.
///
/// Both DOM-backed stages and test doubles implement this trait. All
/// methods are infallible: a stage that cannot honor a call should degrade
/// to leaving the picture unchanged.
///
/// # Event loop pseudocode
///
/// ```rust,ignore
/// carousel.start(now(), &mut tracer);
///
/// on_scroll(|metrics| carousel.on_scroll(&metrics, now(), &mut tracer));
/// on_intersect(|entries| carousel.on_visibility(&entries, now(), &mut tracer));
/// on_keydown(|key| carousel.on_key(key, now(), &mut tracer));
/// on_timeout(|| carousel.on_timer(now(), &mut tracer));
/// ```
pub trait Stage {
    /// Number of slides the stage can show.
    fn slide_count(&self) -> usize;

    /// Marks a slide active (visible) or inactive.
    fn set_slide_active(&mut self, index: SlideIndex, active: bool);

    /// Starts the slide's media. With `rewind`, playback restarts from the
    /// beginning.
    fn play_media(&mut self, index: SlideIndex, rewind: bool) -> MediaPlayback;

    /// Shows or hides the full-screen overlay that masks the swap.
    fn set_overlay_visible(&mut self, visible: bool);
}

/// A one-shot wake-up source.
///
/// Arming replaces any pending wake-up. When the delay elapses the backend
/// calls [`Carousel::on_timer`](crate::carousel::Carousel::on_timer).
pub trait Timer {
    /// Requests a wake-up after `delay`.
    fn arm(&mut self, delay: Duration);
}
