// Copyright 2026 the Scrollfade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Page wiring: marker tagging and event listeners.
//!
//! [`attach`] builds a [`Carousel`] over the page's DOM and forwards three
//! event streams into it: `scroll` on the text column, an
//! `IntersectionObserver` over the section markers, and `keydown` on the
//! document. The carousel lives in an `Rc<RefCell<_>>` shared by every
//! listener; the listeners are leaked for the lifetime of the page.

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::string::ToString as _;
use alloc::vec::Vec;
use core::cell::RefCell;

use js_sys::Array;
use scrollfade_core::carousel::Carousel;
use scrollfade_core::config::CarouselConfig;
use scrollfade_core::keyboard::NavKey;
use scrollfade_core::scroll::ScrollMetrics;
use scrollfade_core::section::SectionMap;
use scrollfade_core::time::HostTime;
use scrollfade_core::trace::Tracer;
use scrollfade_core::visibility::VisibilityEntry;
use wasm_bindgen::JsCast as _;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, Event, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, KeyboardEvent,
};

use crate::{ConsoleSink, DomStage, TimeoutTimer, now};

/// Selector for the scrolling text column.
pub const TEXT_COLUMN_SELECTOR: &str = ".text-column";

/// Selector for section headers, in document order.
pub const HEADER_SELECTOR: &str = ".text-content h2";

/// Class added to tagged headers.
pub const MARKER_CLASS: &str = "section-marker";

/// Attribute carrying a marker's section id.
pub const SECTION_ATTRIBUTE: &str = "data-section";

/// A carousel bound to the page DOM.
pub type WebCarousel = Carousel<DomStage, TimeoutTimer>;

/// Tags the first headers of the text content as section markers, one per
/// section in order, and returns them.
///
/// Extra headers are left alone; if there are fewer headers than sections,
/// the trailing sections have no marker.
///
/// # Errors
///
/// Propagates DOM errors from the selector or attribute calls.
pub fn tag_section_markers(
    document: &Document,
    sections: &SectionMap,
) -> Result<Vec<Element>, JsValue> {
    let headers = document.query_selector_all(HEADER_SELECTOR)?;
    let mut markers = Vec::with_capacity(sections.len());
    for (i, section) in (0..headers.length()).zip(sections) {
        let Some(header) = headers.get(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
            continue;
        };
        header.class_list().add_1(MARKER_CLASS)?;
        header.set_attribute(SECTION_ATTRIBUTE, &section.id)?;
        markers.push(header);
    }
    Ok(markers)
}

/// Builds a carousel over `document`, starts it, and installs its
/// listeners.
///
/// # Errors
///
/// Fails if the configuration is invalid, the slide count does not match
/// the sections, the text column is missing, or a DOM call fails.
pub fn attach(
    document: &Document,
    config: &CarouselConfig,
    sink: ConsoleSink,
) -> Result<Rc<RefCell<WebCarousel>>, JsValue> {
    let stage = DomStage::from_document(document)?;
    let carousel = Carousel::new(config, stage, TimeoutTimer::new())
        .map_err(|err| JsValue::from_str(&err.to_string()))?;
    let state = Rc::new(RefCell::new(carousel));

    // Weak, so the timer inside the carousel does not keep it alive.
    let weak = Rc::downgrade(&state);
    state.borrow().timer().set_callback(move || {
        if let Some(state) = Weak::upgrade(&weak) {
            dispatch(&state, sink, |c, now, tracer| c.on_timer(now, tracer));
        }
    });

    dispatch(&state, sink, |c, now, tracer| c.start(now, tracer));

    let markers = tag_section_markers(document, state.borrow().sections())?;
    let column = document
        .query_selector(TEXT_COLUMN_SELECTOR)?
        .ok_or_else(|| JsValue::from_str("page has no .text-column"))?;

    bind_scroll(&state, &column, sink)?;
    bind_visibility(&state, &column, &markers, sink)?;
    bind_keys(&state, document, sink)?;
    Ok(state)
}

/// Runs `f` against the carousel with a console tracer, unless the carousel
/// is already borrowed further up the stack.
fn dispatch<R>(
    state: &RefCell<WebCarousel>,
    mut sink: ConsoleSink,
    f: impl FnOnce(&mut WebCarousel, HostTime, &mut Tracer<'_>) -> R,
) -> Option<R> {
    let mut carousel = state.try_borrow_mut().ok()?;
    let mut tracer = Tracer::new(&mut sink);
    Some(f(&mut carousel, now(), &mut tracer))
}

fn bind_scroll(
    state: &Rc<RefCell<WebCarousel>>,
    column: &Element,
    sink: ConsoleSink,
) -> Result<(), JsValue> {
    let scroll_state = Rc::clone(state);
    let scroll_column = column.clone();
    let scroll_cb = Closure::wrap(Box::new(move |_event: Event| {
        let metrics = ScrollMetrics::new(
            f64::from(scroll_column.scroll_top()),
            f64::from(scroll_column.scroll_height()),
            f64::from(scroll_column.client_height()),
        );
        let _ = dispatch(&scroll_state, sink, |c, now, tracer| {
            c.on_scroll(&metrics, now, tracer)
        });
    }) as Box<dyn FnMut(_)>);
    column.add_event_listener_with_callback("scroll", scroll_cb.as_ref().unchecked_ref())?;
    scroll_cb.forget();
    Ok(())
}

fn bind_visibility(
    state: &Rc<RefCell<WebCarousel>>,
    column: &Element,
    markers: &[Element],
    sink: ConsoleSink,
) -> Result<(), JsValue> {
    let observer_state = Rc::clone(state);
    let observer_cb = Closure::wrap(Box::new(move |entries: Array, _observer: IntersectionObserver| {
        let batch: Vec<VisibilityEntry> = entries
            .iter()
            .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
            .filter_map(|entry| {
                let id = entry.target().get_attribute(SECTION_ATTRIBUTE)?;
                Some(VisibilityEntry::new(id, entry.is_intersecting()))
            })
            .collect();
        let _ = dispatch(&observer_state, sink, |c, now, tracer| {
            c.on_visibility(&batch, now, tracer)
        });
    }) as Box<dyn FnMut(Array, IntersectionObserver)>);

    let init = IntersectionObserverInit::new();
    init.set_root(Some(column));
    init.set_root_margin(&state.borrow().config().root_margin_css);
    init.set_threshold(&JsValue::from_f64(0.0));
    let observer =
        IntersectionObserver::new_with_options(observer_cb.as_ref().unchecked_ref(), &init)?;
    for marker in markers {
        observer.observe(marker);
    }
    observer_cb.forget();
    Ok(())
}

fn bind_keys(
    state: &Rc<RefCell<WebCarousel>>,
    document: &Document,
    sink: ConsoleSink,
) -> Result<(), JsValue> {
    let key_state = Rc::clone(state);
    let key_cb = Closure::wrap(Box::new(move |event: KeyboardEvent| {
        let Some(key) = NavKey::from_key_name(&event.key()) else {
            return;
        };
        let _ = dispatch(&key_state, sink, |c, now, tracer| c.on_key(key, now, tracer));
    }) as Box<dyn FnMut(_)>);
    document.add_event_listener_with_callback("keydown", key_cb.as_ref().unchecked_ref())?;
    key_cb.forget();
    Ok(())
}
