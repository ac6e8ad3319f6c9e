// Copyright 2026 the Scrollfade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll-driven video carousel page.
//!
//! Binds the carousel to `index.html`: a `.text-column` of `h2`-headed
//! sections beside a stack of `.video-slide` elements and a `.fade-overlay`.
//! Page authors can override the configuration with a JSON block:
//!
//! ```html
//! <script type="application/json" id="carousel-config">
//!   { "timing": { "duration_ms": 1200, "swap_hold_ms": 300 } }
//! </script>
//! ```
//!
//! Build with: `wasm-pack build --target web demos/web_carousel`
//! Then serve `demos/web_carousel/` and open `index.html`.

#![no_std]
#![cfg_attr(
    not(target_arch = "wasm32"),
    allow(dead_code, reason = "this crate only runs in the browser")
)]

extern crate alloc;

use alloc::format;

use scrollfade_backend_web::{ConsoleSink, attach};
use scrollfade_core::config::CarouselConfig;
use wasm_bindgen::prelude::*;
use web_sys::Document;

/// Id of the optional JSON configuration block.
const CONFIG_ELEMENT_ID: &str = "carousel-config";

/// Parses a page configuration override.
///
/// Missing fields keep their standard values.
fn parse_config(json: &str) -> Result<CarouselConfig, serde_json::Error> {
    serde_json::from_str(json)
}

/// Reads the configuration from the page, falling back to the standard one
/// when there is no override or it does not parse.
fn page_config(document: &Document) -> CarouselConfig {
    let Some(text) = document
        .get_element_by_id(CONFIG_ELEMENT_ID)
        .and_then(|el| el.text_content())
    else {
        return CarouselConfig::standard();
    };
    match parse_config(&text) {
        Ok(config) => config,
        Err(err) => {
            let line = format!("Ignoring #{CONFIG_ELEMENT_ID}: {err}");
            web_sys::console::warn_1(&line.into());
            CarouselConfig::standard()
        }
    }
}

/// Entry point for the carousel page.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let config = page_config(&document);
    let carousel = attach(&document, &config, ConsoleSink::new())?;

    // The listeners hold their own references; keep ours for the page's
    // lifetime too.
    core::mem::forget(carousel);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrollfade_core::slide::SlideIndex;

    #[test]
    fn empty_override_is_standard() {
        assert_eq!(parse_config("{}").unwrap(), CarouselConfig::standard());
    }

    #[test]
    fn partial_override_keeps_other_fields() {
        let cfg = parse_config(
            r#"{ "timing": { "duration_ms": 1200, "swap_hold_ms": 300 }, "root_margin": "-45% 0px" }"#,
        )
        .unwrap();
        assert_eq!(cfg.timing.duration_ms, 1200);
        assert_eq!(cfg.timing.cooldown_ms, 0);
        assert_eq!(cfg.root_margin, "-45% 0px");
        assert_eq!(cfg.sections.len(), 6);
        assert!(cfg.validate().is_ok(), "override should validate");
    }

    #[test]
    fn custom_sections() {
        let cfg = parse_config(
            r#"{ "sections": [
                { "id": "a", "slide_index": 0, "reference_offset": 0 },
                { "id": "b", "slide_index": 1, "reference_offset": 500 }
            ] }"#,
        )
        .unwrap();
        let valid = cfg.validate().unwrap();
        assert_eq!(valid.sections.by_id("b").map(|s| s.slide_index), Some(SlideIndex(1)));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(parse_config("{ timing: }").is_err());
    }
}
