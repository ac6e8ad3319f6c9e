// Copyright 2026 the Scrollfade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DOM-backed stage.
//!
//! Slides are `.video-slide` elements shown by the `active` class, each
//! optionally holding a `<video>`. The overlay is the `.fade-overlay`
//! element, also shown by `active`; its CSS transition performs the fade.

use alloc::vec::Vec;

use scrollfade_core::slide::SlideIndex;
use scrollfade_core::stage::{MediaPlayback, Stage};
use wasm_bindgen::JsCast as _;
use wasm_bindgen::JsValue;
use web_sys::{Document, Element, HtmlVideoElement};

/// Class that marks a slide or the overlay as shown.
pub const ACTIVE_CLASS: &str = "active";

/// Selector for slide elements, in slide order.
pub const SLIDE_SELECTOR: &str = ".video-slide";

/// Selector for the overlay element.
pub const OVERLAY_SELECTOR: &str = ".fade-overlay";

/// Applies slide and overlay state to live DOM elements.
pub struct DomStage {
    slides: Vec<Element>,
    videos: Vec<Option<HtmlVideoElement>>,
    overlay: Option<Element>,
}

impl core::fmt::Debug for DomStage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DomStage")
            .field("slides_len", &self.slides.len())
            .field("videos", &self.videos.iter().filter(|v| v.is_some()).count())
            .field("overlay", &self.overlay.is_some())
            .finish()
    }
}

impl DomStage {
    /// Creates a stage over explicit elements.
    #[must_use]
    pub fn new(slides: Vec<Element>, overlay: Option<Element>) -> Self {
        let videos = slides
            .iter()
            .map(|slide| {
                slide
                    .query_selector("video")
                    .ok()
                    .flatten()
                    .and_then(|el| el.dyn_into::<HtmlVideoElement>().ok())
            })
            .collect();
        Self {
            slides,
            videos,
            overlay,
        }
    }

    /// Collects `.video-slide` elements and the `.fade-overlay` from
    /// `document`.
    ///
    /// # Errors
    ///
    /// Propagates selector errors from the DOM.
    pub fn from_document(document: &Document) -> Result<Self, JsValue> {
        let list = document.query_selector_all(SLIDE_SELECTOR)?;
        let slides = (0..list.length())
            .filter_map(|i| list.get(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect();
        let overlay = document.query_selector(OVERLAY_SELECTOR)?;
        Ok(Self::new(slides, overlay))
    }

    /// Returns the slide element at `index`, if any.
    #[must_use]
    pub fn slide(&self, index: SlideIndex) -> Option<&Element> {
        self.slides.get(index.get())
    }

    /// Returns the overlay element, if the page has one.
    #[must_use]
    pub fn overlay(&self) -> Option<&Element> {
        self.overlay.as_ref()
    }
}

fn set_class(el: &Element, class: &str, on: bool) {
    let list = el.class_list();
    let _ = if on {
        list.add_1(class)
    } else {
        list.remove_1(class)
    };
}

impl Stage for DomStage {
    fn slide_count(&self) -> usize {
        self.slides.len()
    }

    fn set_slide_active(&mut self, index: SlideIndex, active: bool) {
        if let Some(slide) = self.slides.get(index.get()) {
            set_class(slide, ACTIVE_CLASS, active);
        }
    }

    fn play_media(&mut self, index: SlideIndex, rewind: bool) -> MediaPlayback {
        let Some(Some(video)) = self.videos.get(index.get()) else {
            return MediaPlayback::NoMedia;
        };
        if rewind {
            video.set_current_time(0.0);
        }
        // Autoplay rejections surface as a rejected promise; the slide stays
        // visible either way.
        let _ = video.play();
        MediaPlayback::Started
    }

    fn set_overlay_visible(&mut self, visible: bool) {
        if let Some(overlay) = &self.overlay {
            set_class(overlay, ACTIVE_CLASS, visible);
        }
    }
}
