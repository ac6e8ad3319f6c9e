// Copyright 2026 the Scrollfade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll-percentage resolver.
//!
//! Maps the scroll container's position to a slide by splitting the
//! scrollable range into `N` equal buckets:
//!
//! ```text
//! percentage = clamp(offset / max(1, scroll_height - viewport_height), 0, 1)
//! index      = min(floor(percentage / (1 / N)), N - 1)
//! ```
//!
//! The mapping is pure; [`Carousel::on_scroll`] decides whether the result
//! warrants a transition.
//!
//! [`Carousel::on_scroll`]: crate::carousel::Carousel::on_scroll

use crate::slide::SlideIndex;

/// A snapshot of the scroll container's geometry, in CSS pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollMetrics {
    /// Current scroll offset (`scrollTop`).
    pub offset: f64,
    /// Total scrollable content height (`scrollHeight`).
    pub scroll_height: f64,
    /// Visible height of the container (`clientHeight`).
    pub viewport_height: f64,
}

impl ScrollMetrics {
    /// Creates a snapshot.
    #[must_use]
    pub const fn new(offset: f64, scroll_height: f64, viewport_height: f64) -> Self {
        Self {
            offset,
            scroll_height,
            viewport_height,
        }
    }

    /// Largest meaningful offset, never less than 1 so the percentage is
    /// always defined.
    #[must_use]
    pub fn scrollable_range(&self) -> f64 {
        let range = self.scroll_height - self.viewport_height;
        if range.is_nan() { 1.0 } else { range.max(1.0) }
    }
}

/// Slide resolved from a scroll position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollTarget {
    /// Target slide.
    pub index: SlideIndex,
    /// Normalized scroll position in `[0, 1]`.
    pub percentage: f64,
}

impl ScrollTarget {
    /// The percentage rounded to a whole number for log lines.
    #[must_use]
    pub fn percent(&self) -> u8 {
        percent_of(self.percentage)
    }
}

/// Normalized scroll position in `[0, 1]`. Non-finite input maps to 0.
#[must_use]
pub fn percentage(metrics: &ScrollMetrics) -> f64 {
    let raw = metrics.offset / metrics.scrollable_range();
    if raw.is_nan() { 0.0 } else { raw.clamp(0.0, 1.0) }
}

/// Resolves the slide for a scroll position among `slide_count` slides.
///
/// `slide_count` of zero is treated as one.
#[must_use]
pub fn resolve(metrics: &ScrollMetrics, slide_count: usize) -> ScrollTarget {
    let percentage = percentage(metrics);
    ScrollTarget {
        index: bucket(percentage, slide_count),
        percentage,
    }
}

/// Maps a percentage in `[0, 1]` onto one of `slide_count` equal buckets.
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "bucket position is non-negative and bounded by slide_count"
)]
pub fn bucket(percentage: f64, slide_count: usize) -> SlideIndex {
    let count = slide_count.max(1);
    let size = 1.0 / count as f64;
    // Truncation is floor here: the clamped percentage is never negative.
    let raw = (percentage.clamp(0.0, 1.0) / size) as usize;
    let index = raw.min(count - 1);
    SlideIndex::from_usize(index).unwrap_or(SlideIndex(u32::MAX))
}

/// Rounds a `[0, 1]` fraction to a whole percentage.
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "value is clamped to [0, 100] before the cast"
)]
pub fn percent_of(fraction: f64) -> u8 {
    let clamped = if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    };
    (clamped * 100.0 + 0.5) as u8
}
