// Copyright 2026 the Scrollfade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keyboard navigation.

use crate::slide::SlideIndex;

/// A directional navigation key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NavKey {
    /// Advance to the following slide (`ArrowDown`).
    Next,
    /// Go back to the preceding slide (`ArrowUp`).
    Previous,
}

impl NavKey {
    /// Maps a DOM `KeyboardEvent.key` name to a navigation key.
    #[must_use]
    pub fn from_key_name(key: &str) -> Option<Self> {
        match key {
            "ArrowDown" => Some(Self::Next),
            "ArrowUp" => Some(Self::Previous),
            _ => None,
        }
    }

    /// The slide this key asks for, or `None` at the boundary.
    #[must_use]
    pub fn target(self, current: SlideIndex, slide_count: usize) -> Option<SlideIndex> {
        match self {
            Self::Next if current.get() + 1 < slide_count => Some(current.next()),
            Self::Next => None,
            Self::Previous => current.prev(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_names() {
        assert_eq!(NavKey::from_key_name("ArrowDown"), Some(NavKey::Next));
        assert_eq!(NavKey::from_key_name("ArrowUp"), Some(NavKey::Previous));
        assert_eq!(NavKey::from_key_name("ArrowLeft"), None);
        assert_eq!(NavKey::from_key_name("j"), None);
    }

    #[test]
    fn boundaries_are_no_ops() {
        assert_eq!(NavKey::Next.target(SlideIndex(5), 6), None);
        assert_eq!(NavKey::Previous.target(SlideIndex(0), 6), None);
    }

    #[test]
    fn steps_by_one() {
        assert_eq!(NavKey::Next.target(SlideIndex(2), 6), Some(SlideIndex(3)));
        assert_eq!(NavKey::Previous.target(SlideIndex(2), 6), Some(SlideIndex(1)));
    }
}
