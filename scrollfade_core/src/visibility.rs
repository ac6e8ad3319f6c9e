// Copyright 2026 the Scrollfade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visibility-based resolver.
//!
//! Section marker elements are observed against the scroll container with a
//! [`RootMargin`] that shrinks the container to a thin activation band
//! (by default the middle 20% of the viewport). When a marker *newly*
//! intersects the band, its section's slide becomes the requested target.
//!
//! In the browser the intersection test is done by `IntersectionObserver`,
//! which receives the margin string verbatim. [`RootMargin::apply`] and
//! [`band_intersects`] reproduce the same geometry for simulations and tests.

use alloc::string::{String, ToString as _};
use alloc::vec::Vec;
use core::fmt;

use kurbo::Rect;

use crate::section::SectionMap;
use crate::slide::SlideIndex;

/// Root margin that turns the viewport into its central 20% band.
pub const MIDDLE_BAND_MARGIN: &str = "-40% 0px -40% 0px";

/// One side of a root margin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MarginValue {
    /// Absolute CSS pixels.
    Px(f64),
    /// Percentage of the root's extent along that axis.
    Percent(f64),
}

impl MarginValue {
    /// Resolves to pixels given the root extent along the relevant axis.
    #[must_use]
    pub fn resolve(self, extent: f64) -> f64 {
        match self {
            Self::Px(px) => px,
            Self::Percent(pct) => extent * pct / 100.0,
        }
    }
}

impl fmt::Display for MarginValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Px(v) => write!(f, "{v}px"),
            Self::Percent(v) => write!(f, "{v}%"),
        }
    }
}

/// Reasons a root-margin string is rejected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RootMarginError {
    /// Zero or more than four components.
    #[error("root margin needs 1 to 4 components, got {0}")]
    ComponentCount(usize),
    /// A component is not `<number>px` or `<number>%`.
    #[error("invalid root margin component `{0}`")]
    InvalidComponent(String),
}

/// CSS-style root margin (`top right bottom left`).
///
/// Negative values shrink the root, positive values grow it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RootMargin {
    /// Top edge adjustment.
    pub top: MarginValue,
    /// Right edge adjustment.
    pub right: MarginValue,
    /// Bottom edge adjustment.
    pub bottom: MarginValue,
    /// Left edge adjustment.
    pub left: MarginValue,
}

impl RootMargin {
    /// A margin that leaves the root unchanged.
    pub const ZERO: Self = Self {
        top: MarginValue::Px(0.0),
        right: MarginValue::Px(0.0),
        bottom: MarginValue::Px(0.0),
        left: MarginValue::Px(0.0),
    };

    /// The middle-band margin, `-40% 0px -40% 0px`.
    pub const MIDDLE_BAND: Self = Self {
        top: MarginValue::Percent(-40.0),
        right: MarginValue::Px(0.0),
        bottom: MarginValue::Percent(-40.0),
        left: MarginValue::Px(0.0),
    };

    /// Parses a margin string using CSS shorthand expansion (1 to 4 values).
    ///
    /// # Errors
    ///
    /// Returns [`RootMarginError`] for a wrong component count or a
    /// component that is not a number followed by `px` or `%`. A bare `0`
    /// is accepted.
    pub fn parse(s: &str) -> Result<Self, RootMarginError> {
        let mut values = [MarginValue::Px(0.0); 4];
        let mut count = 0;
        for token in s.split_whitespace() {
            if count == 4 {
                return Err(RootMarginError::ComponentCount(
                    s.split_whitespace().count(),
                ));
            }
            values[count] = parse_component(token)?;
            count += 1;
        }
        let [a, b, c, d] = values;
        let (top, right, bottom, left) = match count {
            1 => (a, a, a, a),
            2 => (a, b, a, b),
            3 => (a, b, c, b),
            4 => (a, b, c, d),
            n => return Err(RootMarginError::ComponentCount(n)),
        };
        Ok(Self {
            top,
            right,
            bottom,
            left,
        })
    }

    /// Applies the margin to a root rectangle, producing the activation band.
    ///
    /// Vertical percentages are relative to the root height, horizontal ones
    /// to the root width. A band that collapses keeps zero extent instead of
    /// inverting.
    #[must_use]
    pub fn apply(&self, root: Rect) -> Rect {
        let w = root.width();
        let h = root.height();
        let x0 = root.x0 - self.left.resolve(w);
        let x1 = root.x1 + self.right.resolve(w);
        let y0 = root.y0 - self.top.resolve(h);
        let y1 = root.y1 + self.bottom.resolve(h);
        Rect::new(x0, y0, x1.max(x0), y1.max(y0))
    }
}

impl Default for RootMargin {
    fn default() -> Self {
        Self::MIDDLE_BAND
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.top, self.right, self.bottom, self.left)
    }
}

fn parse_component(token: &str) -> Result<MarginValue, RootMarginError> {
    let invalid = || RootMarginError::InvalidComponent(token.to_string());
    if let Some(num) = token.strip_suffix('%') {
        num.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(MarginValue::Percent)
            .ok_or_else(invalid)
    } else if let Some(num) = token.strip_suffix("px") {
        num.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(MarginValue::Px)
            .ok_or_else(invalid)
    } else if token == "0" {
        Ok(MarginValue::Px(0.0))
    } else {
        Err(invalid())
    }
}

/// Threshold-0 intersection test: touching edges count as intersecting.
#[must_use]
pub fn band_intersects(band: Rect, target: Rect) -> bool {
    target.x0 <= band.x1 && target.x1 >= band.x0 && target.y0 <= band.y1 && target.y1 >= band.y0
}

/// A visibility change for one section marker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VisibilityEntry {
    /// The marker's section id (`data-section`).
    pub section_id: String,
    /// Whether the marker now intersects the activation band.
    pub is_intersecting: bool,
}

impl VisibilityEntry {
    /// Creates an entry.
    #[must_use]
    pub fn new(section_id: impl Into<String>, is_intersecting: bool) -> Self {
        Self {
            section_id: section_id.into(),
            is_intersecting,
        }
    }
}

/// Tracks which markers are inside the activation band and reports the
/// ones that just entered it.
#[derive(Clone, Debug, Default)]
pub struct VisibilityResolver {
    intersecting: Vec<bool>,
}

impl VisibilityResolver {
    /// Creates a resolver for `section_count` markers, none visible.
    #[must_use]
    pub fn new(section_count: usize) -> Self {
        Self {
            intersecting: alloc::vec![false; section_count],
        }
    }

    /// Applies a batch of visibility changes and returns, in batch order,
    /// the slides whose markers became newly visible.
    ///
    /// Entries for unknown section ids are ignored. An entry that repeats
    /// the current state produces nothing.
    pub fn observe(&mut self, sections: &SectionMap, entries: &[VisibilityEntry]) -> Vec<SlideIndex> {
        if self.intersecting.len() != sections.len() {
            self.intersecting.resize(sections.len(), false);
        }
        let mut entered = Vec::new();
        for entry in entries {
            let Some(position) = sections.position_of(&entry.section_id) else {
                continue;
            };
            let was = core::mem::replace(&mut self.intersecting[position], entry.is_intersecting);
            if entry.is_intersecting && !was {
                entered.push(sections.as_slice()[position].slide_index);
            }
        }
        entered
    }

    /// Returns `true` if the marker at `position` is currently in the band.
    #[must_use]
    pub fn is_intersecting(&self, position: usize) -> bool {
        self.intersecting.get(position).copied().unwrap_or(false)
    }

    /// Forgets all tracked state.
    pub fn reset(&mut self) {
        self.intersecting.iter_mut().for_each(|v| *v = false);
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::section::SectionDescriptor;

    fn sections() -> SectionMap {
        SectionMap::new(vec![
            SectionDescriptor::new("intro", 0, 0.0),
            SectionDescriptor::new("theory", 1, 800.0),
            SectionDescriptor::new("excitation", 2, 1600.0),
        ])
        .unwrap()
    }

    #[test]
    fn parse_shorthand_forms() {
        assert_eq!(RootMargin::parse(MIDDLE_BAND_MARGIN), Ok(RootMargin::MIDDLE_BAND));
        assert_eq!(RootMargin::parse("0"), Ok(RootMargin::ZERO));

        let two = RootMargin::parse("10px -5%").unwrap();
        assert_eq!(two.top, MarginValue::Px(10.0));
        assert_eq!(two.right, MarginValue::Percent(-5.0));
        assert_eq!(two.bottom, MarginValue::Px(10.0));
        assert_eq!(two.left, MarginValue::Percent(-5.0));

        let three = RootMargin::parse("1px 2px 3px").unwrap();
        assert_eq!(three.left, MarginValue::Px(2.0));
        assert_eq!(three.bottom, MarginValue::Px(3.0));
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert_eq!(RootMargin::parse(""), Err(RootMarginError::ComponentCount(0)));
        assert_eq!(
            RootMargin::parse("1px 2px 3px 4px 5px"),
            Err(RootMarginError::ComponentCount(5))
        );
        assert_eq!(
            RootMargin::parse("-40em"),
            Err(RootMarginError::InvalidComponent("-40em".into()))
        );
        assert!(RootMargin::parse("abc%").is_err());
    }

    #[test]
    fn middle_band_is_central_fifth() {
        let root = Rect::new(0.0, 0.0, 600.0, 1000.0);
        let band = RootMargin::MIDDLE_BAND.apply(root);
        assert_eq!(band, Rect::new(0.0, 400.0, 600.0, 600.0));

        assert!(band_intersects(band, Rect::new(0.0, 500.0, 600.0, 540.0)));
        assert!(band_intersects(band, Rect::new(0.0, 360.0, 600.0, 400.0)), "edge contact");
        assert!(!band_intersects(band, Rect::new(0.0, 100.0, 600.0, 140.0)));
        assert!(!band_intersects(band, Rect::new(0.0, 601.0, 600.0, 640.0)));
    }

    #[test]
    fn over_shrunk_band_does_not_invert() {
        let root = Rect::new(0.0, 0.0, 100.0, 100.0);
        let band = RootMargin::parse("-60% 0px").unwrap().apply(root);
        assert!(band.height() >= 0.0);
    }

    #[test]
    fn reports_only_newly_visible_markers() {
        let map = sections();
        let mut resolver = VisibilityResolver::new(map.len());

        let first = resolver.observe(&map, &[VisibilityEntry::new("theory", true)]);
        assert_eq!(first, vec![SlideIndex(1)]);

        // Still intersecting: not newly visible.
        let again = resolver.observe(&map, &[VisibilityEntry::new("theory", true)]);
        assert!(again.is_empty());

        let leave_enter = resolver.observe(
            &map,
            &[
                VisibilityEntry::new("theory", false),
                VisibilityEntry::new("excitation", true),
            ],
        );
        assert_eq!(leave_enter, vec![SlideIndex(2)]);
        assert!(!resolver.is_intersecting(1));
        assert!(resolver.is_intersecting(2));
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let map = sections();
        let mut resolver = VisibilityResolver::new(map.len());
        let out = resolver.observe(&map, &[VisibilityEntry::new("appendix", true)]);
        assert!(out.is_empty());
    }
}
