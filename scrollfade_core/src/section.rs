// Copyright 2026 the Scrollfade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Static section descriptors.
//!
//! A section is a content region of the scroll column mapped to exactly one
//! slide. [`SectionMap`] holds the validated, ordered list; it is built once
//! at startup and never mutated.

use alloc::string::String;
use alloc::vec::Vec;

use crate::slide::SlideIndex;

/// One content section and the slide it shows.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SectionDescriptor {
    /// Identifier carried by the section's marker element.
    pub id: String,
    /// Slide shown while this section is current.
    pub slide_index: SlideIndex,
    /// Nominal scroll offset (px) where the section begins.
    ///
    /// Informational: the resolvers work from percentages and marker
    /// visibility, not from these offsets.
    pub reference_offset: f64,
}

impl SectionDescriptor {
    /// Creates a descriptor.
    #[must_use]
    pub fn new(id: impl Into<String>, slide_index: u32, reference_offset: f64) -> Self {
        Self {
            id: id.into(),
            slide_index: SlideIndex(slide_index),
            reference_offset,
        }
    }
}

/// Reasons a section list is rejected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SectionMapError {
    /// No sections were given.
    #[error("section list is empty")]
    Empty,
    /// Slide indices are not exactly `0..N-1` in order.
    #[error("section at position {position} has slide index {found}, expected {position}")]
    OutOfOrder {
        /// Position in the list.
        position: usize,
        /// Slide index found there.
        found: u32,
    },
    /// Two sections share an id.
    #[error("duplicate section id `{0}`")]
    DuplicateId(String),
}

/// A validated, ordered list of sections.
///
/// Invariant: the slide index of the section at position `i` is `i`, and
/// ids are unique.
#[derive(Clone, Debug, PartialEq)]
pub struct SectionMap {
    sections: Vec<SectionDescriptor>,
}

impl SectionMap {
    /// Validates and wraps a section list.
    ///
    /// # Errors
    ///
    /// Returns [`SectionMapError`] if the list is empty, if slide indices
    /// are not `0..N-1` in order, or if an id repeats.
    pub fn new(sections: Vec<SectionDescriptor>) -> Result<Self, SectionMapError> {
        if sections.is_empty() {
            return Err(SectionMapError::Empty);
        }
        for (position, section) in sections.iter().enumerate() {
            if section.slide_index.get() != position {
                return Err(SectionMapError::OutOfOrder {
                    position,
                    found: section.slide_index.0,
                });
            }
            if sections[..position].iter().any(|s| s.id == section.id) {
                return Err(SectionMapError::DuplicateId(section.id.clone()));
            }
        }
        Ok(Self { sections })
    }

    /// Number of sections (and slides).
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Always `false`: an empty map cannot be constructed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Index of the last slide.
    #[must_use]
    pub fn last(&self) -> SlideIndex {
        self.sections[self.sections.len() - 1].slide_index
    }

    /// Returns `true` if `index` names a slide in this map.
    #[must_use]
    pub fn contains(&self, index: SlideIndex) -> bool {
        index.get() < self.sections.len()
    }

    /// Looks up a section by marker id.
    #[must_use]
    pub fn by_id(&self, id: &str) -> Option<&SectionDescriptor> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// Position of the section with the given id.
    #[must_use]
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.id == id)
    }

    /// Returns the section shown on the given slide.
    #[must_use]
    pub fn get(&self, index: SlideIndex) -> Option<&SectionDescriptor> {
        self.sections.get(index.get())
    }

    /// Iterates sections in slide order.
    pub fn iter(&self) -> core::slice::Iter<'_, SectionDescriptor> {
        self.sections.iter()
    }

    /// Returns the sections as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[SectionDescriptor] {
        &self.sections
    }
}

impl<'a> IntoIterator for &'a SectionMap {
    type Item = &'a SectionDescriptor;
    type IntoIter = core::slice::Iter<'a, SectionDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.sections.iter()
    }
}
