// Copyright 2026 the Scrollfade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll-to-section resolution and fade-transition sequencing.
//!
//! `scrollfade_core` drives a carousel of full-screen slides (typically
//! looping videos) from the scroll position of a companion text column. It
//! is `no_std` compatible (with `alloc`) and contains no platform code;
//! backends implement the [`Stage`](stage::Stage) and
//! [`Timer`](stage::Timer) traits and forward raw events.
//!
//! # Architecture
//!
//! Three producers resolve a target slide, one gate decides, and one phase
//! machine animates:
//!
//! ```text
//!   scroll offset ──► scroll::resolve ──────┐
//!                                           │
//!   marker entries ──► VisibilityResolver ──┼──► Sequencer::request ──► Stage
//!                                           │           │
//!   key names ──► NavKey::target ───────────┘           ▼
//!                                                  Timer::arm ──► Sequencer::poll
//! ```
//!
//! **[`section`]**: Ordered section descriptors and their validation.
//!
//! **[`scroll`]**: Equal-bucket mapping from scroll percentage to slide.
//!
//! **[`visibility`]**: Root margins, the activation band, and detection of
//! markers newly entering it.
//!
//! **[`keyboard`]**: Arrow-key navigation.
//!
//! **[`sequencer`]**: The transition gate and its five-phase fade
//! sequence.
//!
//! **[`carousel`]**: [`Carousel`](carousel::Carousel), which ties the
//! above to a stage and timer.
//!
//! **[`config`]**: Serializable configuration and startup validation.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! transition instrumentation, with zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `serde` (disabled by default): Derives `Serialize`/`Deserialize` for
//!   configuration types.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod carousel;
pub mod config;
pub mod keyboard;
pub mod scroll;
pub mod section;
pub mod sequencer;
pub mod slide;
pub mod stage;
pub mod time;
pub mod trace;
pub mod visibility;
