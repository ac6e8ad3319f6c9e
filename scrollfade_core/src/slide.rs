// Copyright 2026 the Scrollfade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Slide identification.
//!
//! [`SlideIndex`] is a lightweight handle for one visual slide. Slides are
//! numbered `0..N-1` in section order; the stage maps indices to whatever it
//! renders.

use core::fmt;

/// Position of a slide in the carousel, `0..N-1`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SlideIndex(pub u32);

impl SlideIndex {
    /// The first slide, shown at startup.
    pub const FIRST: Self = Self(0);

    /// Returns the index as a `usize` for slice access.
    #[inline]
    #[must_use]
    pub const fn get(self) -> usize {
        self.0 as usize
    }

    /// Creates an index from a `usize`, or `None` if it does not fit.
    #[inline]
    #[must_use]
    pub fn from_usize(index: usize) -> Option<Self> {
        u32::try_from(index).ok().map(Self)
    }

    /// Returns the following index.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Returns the preceding index, or `None` at the first slide.
    #[inline]
    #[must_use]
    pub const fn prev(self) -> Option<Self> {
        match self.0.checked_sub(1) {
            Some(i) => Some(Self(i)),
            None => None,
        }
    }
}

impl fmt::Debug for SlideIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SlideIndex({})", self.0)
    }
}

impl fmt::Display for SlideIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
