// Copyright 2026 the Scrollfade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Carousel configuration and startup validation.
//!
//! [`CarouselConfig`] is the plain, serializable form (enable the `serde`
//! feature to load it from JSON). [`CarouselConfig::validate`] turns it into
//! a [`ValidConfig`] whose invariants the rest of the crate relies on.

use alloc::string::{String, ToString as _};
use alloc::vec::Vec;

use crate::section::{SectionDescriptor, SectionMap, SectionMapError};
use crate::time::Duration;
use crate::visibility::{MIDDLE_BAND_MARGIN, RootMargin, RootMarginError};

/// Sections of the standard six-video page: `(id, reference offset px)`.
pub const STANDARD_SECTIONS: [(&str, f64); 6] = [
    ("intro", 0.0),
    ("theory", 800.0),
    ("excitation", 1600.0),
    ("chronology", 2400.0),
    ("oscillations", 3200.0),
    ("predictions", 4000.0),
];

/// Delays of the fade sequence.
///
/// A transition takes `D/2` fading out, `swap_hold` with the new slide
/// behind the overlay, `D/2` fading in, then `cooldown` before new requests
/// are accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransitionTiming {
    /// Full fade duration `D` in milliseconds.
    pub duration_ms: u64,
    /// Time the overlay stays up after the swap, in milliseconds.
    pub swap_hold_ms: u64,
    /// Extra settle time before accepting requests, in milliseconds.
    #[cfg_attr(feature = "serde", serde(default))]
    pub cooldown_ms: u64,
}

impl TransitionTiming {
    /// Two-second fades with a 500ms swap hold and no cooldown.
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            duration_ms: 2000,
            swap_hold_ms: 500,
            cooldown_ms: 0,
        }
    }

    /// Half of the fade duration.
    #[must_use]
    pub const fn half_duration(&self) -> Duration {
        Duration(Duration::from_millis(self.duration_ms).ticks() / 2)
    }

    /// Time between the swap and hiding the overlay.
    #[must_use]
    pub const fn swap_hold(&self) -> Duration {
        Duration::from_millis(self.swap_hold_ms)
    }

    /// Settle time after the fade-in.
    #[must_use]
    pub const fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    /// Time from acceptance until the sequencer is idle again.
    #[must_use]
    pub const fn round_trip(&self) -> Duration {
        self.half_duration()
            .saturating_add(self.swap_hold())
            .saturating_add(self.half_duration())
            .saturating_add(self.cooldown())
    }

    /// Checks that the timings describe a usable fade.
    ///
    /// # Errors
    ///
    /// Returns [`TimingError`] if the duration is zero or the swap hold is
    /// not shorter than half the duration.
    pub fn validate(&self) -> Result<(), TimingError> {
        if self.duration_ms == 0 {
            return Err(TimingError::ZeroDuration);
        }
        if self.swap_hold() >= self.half_duration() {
            return Err(TimingError::SwapHoldTooLong {
                swap_hold_ms: self.swap_hold_ms,
                duration_ms: self.duration_ms,
            });
        }
        Ok(())
    }
}

impl Default for TransitionTiming {
    fn default() -> Self {
        Self::standard()
    }
}

/// Reasons transition timings are rejected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TimingError {
    /// The fade duration is zero.
    #[error("transition duration must be positive")]
    ZeroDuration,
    /// The swap hold would outlast the fade-out.
    #[error("swap hold of {swap_hold_ms}ms must be shorter than half of {duration_ms}ms")]
    SwapHoldTooLong {
        /// Configured swap hold.
        swap_hold_ms: u64,
        /// Configured fade duration.
        duration_ms: u64,
    },
}

/// Reasons a configuration cannot drive a carousel.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The section list is malformed.
    #[error(transparent)]
    Sections(#[from] SectionMapError),
    /// The root margin does not parse.
    #[error(transparent)]
    RootMargin(#[from] RootMarginError),
    /// The timings are unusable.
    #[error(transparent)]
    Timing(#[from] TimingError),
    /// The stage shows a different number of slides than there are
    /// sections.
    #[error("{sections} sections configured but the stage has {slides} slides")]
    SlideCountMismatch {
        /// Number of configured sections.
        sections: usize,
        /// Number of slides on the stage.
        slides: usize,
    },
}

/// User-facing carousel configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CarouselConfig {
    /// Fade sequence delays.
    pub timing: TransitionTiming,
    /// Scroll distance (px) meant to gate section changes.
    ///
    /// Carried for compatibility with existing page configs; no resolver
    /// reads it.
    pub scroll_threshold_px: f64,
    /// Root margin for the visibility observer.
    pub root_margin: String,
    /// Ordered section list, one per slide.
    pub sections: Vec<SectionDescriptor>,
}

impl CarouselConfig {
    /// The six-section page with standard timings and the middle-band
    /// observer margin.
    #[must_use]
    pub fn standard() -> Self {
        let sections = STANDARD_SECTIONS
            .iter()
            .zip(0_u32..)
            .map(|(&(id, offset), index)| SectionDescriptor::new(id, index, offset))
            .collect();
        Self {
            timing: TransitionTiming::standard(),
            scroll_threshold_px: 100.0,
            root_margin: MIDDLE_BAND_MARGIN.to_string(),
            sections,
        }
    }

    /// Validates every part of the configuration.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found, checking sections, then the
    /// root margin, then timings.
    pub fn validate(&self) -> Result<ValidConfig, ConfigError> {
        let sections = SectionMap::new(self.sections.clone())?;
        let root_margin = RootMargin::parse(&self.root_margin)?;
        self.timing.validate()?;
        Ok(ValidConfig {
            timing: self.timing,
            scroll_threshold_px: self.scroll_threshold_px,
            root_margin,
            root_margin_css: self.root_margin.clone(),
            sections,
        })
    }
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self::standard()
    }
}

/// A configuration that passed [`CarouselConfig::validate`].
#[derive(Clone, Debug, PartialEq)]
pub struct ValidConfig {
    /// Fade sequence delays.
    pub timing: TransitionTiming,
    /// See [`CarouselConfig::scroll_threshold_px`].
    pub scroll_threshold_px: f64,
    /// Parsed observer margin.
    pub root_margin: RootMargin,
    /// The margin as configured, for handing to a native observer.
    pub root_margin_css: String,
    /// Validated sections.
    pub sections: SectionMap,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slide::SlideIndex;

    #[test]
    fn standard_config_is_valid() {
        let valid = CarouselConfig::standard().validate().unwrap();
        assert_eq!(valid.sections.len(), 6);
        assert_eq!(valid.sections.by_id("chronology").map(|s| s.slide_index), Some(SlideIndex(3)));
        assert_eq!(valid.root_margin, RootMargin::MIDDLE_BAND);
        assert_eq!(valid.root_margin_css, MIDDLE_BAND_MARGIN);
    }

    #[test]
    fn standard_timing_round_trip() {
        let t = TransitionTiming::standard();
        assert_eq!(t.half_duration(), Duration::from_millis(1000));
        assert_eq!(t.swap_hold(), Duration::from_millis(500));
        assert_eq!(t.round_trip(), Duration::from_millis(2500));
    }

    #[test]
    fn odd_duration_keeps_sub_millisecond_half() {
        let t = TransitionTiming {
            duration_ms: 1001,
            swap_hold_ms: 100,
            cooldown_ms: 0,
        };
        assert_eq!(t.half_duration(), Duration(500_500));
    }

    #[test]
    fn rejects_bad_timing() {
        let mut t = TransitionTiming::standard();
        t.duration_ms = 0;
        assert_eq!(t.validate(), Err(TimingError::ZeroDuration));

        let mut t = TransitionTiming::standard();
        t.swap_hold_ms = 1000;
        assert!(matches!(t.validate(), Err(TimingError::SwapHoldTooLong { .. })));
    }

    #[test]
    fn reports_first_failing_part() {
        let mut cfg = CarouselConfig::standard();
        cfg.root_margin = "-40vh".into();
        assert!(matches!(cfg.validate(), Err(ConfigError::RootMargin(_))));

        let mut cfg = CarouselConfig::standard();
        cfg.sections.clear();
        assert_eq!(cfg.validate(), Err(ConfigError::Sections(SectionMapError::Empty)));
    }
}
