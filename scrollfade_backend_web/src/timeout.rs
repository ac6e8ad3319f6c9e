// Copyright 2026 the Scrollfade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `setTimeout` wake-up source.
//!
//! [`TimeoutTimer`] implements [`Timer`] with a single pending `setTimeout`.
//! Arming cancels whatever was pending, so at most one wake-up is
//! outstanding.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use scrollfade_core::stage::Timer;
use scrollfade_core::time::Duration;

// Direct global bindings instead of `web_sys::Window` methods, so no Window
// object has to be fetched on every arm.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = performance, js_name = "now")]
    pub(crate) fn performance_now() -> f64;

    #[wasm_bindgen(js_name = "setTimeout")]
    fn set_timeout(callback: &JsValue, delay_ms: f64) -> i32;

    #[wasm_bindgen(js_name = "clearTimeout")]
    fn clear_timeout(id: i32);
}

type TimeoutClosure = Closure<dyn FnMut()>;

struct TimeoutInner {
    /// The JS closure handed to `setTimeout`. Set once by
    /// [`TimeoutTimer::set_callback`].
    closure: RefCell<Option<TimeoutClosure>>,

    /// ID of the pending `setTimeout`, if any.
    pending: Cell<Option<i32>>,

    /// Number of times the timer has fired.
    fired: Cell<u64>,
}

/// A one-shot [`Timer`] backed by `setTimeout`.
///
/// The callback usually needs the carousel that owns this timer, so it is
/// installed after construction with [`set_callback`](Self::set_callback).
/// Arming before a callback is installed does nothing.
pub struct TimeoutTimer {
    inner: Rc<TimeoutInner>,
}

impl TimeoutTimer {
    /// Creates a timer with no callback installed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(TimeoutInner {
                closure: RefCell::new(None),
                pending: Cell::new(None),
                fired: Cell::new(0),
            }),
        }
    }

    /// Installs the function run when the timer fires, replacing any
    /// previous one.
    pub fn set_callback(&self, mut callback: impl FnMut() + 'static) {
        let inner = Rc::clone(&self.inner);
        let closure = Closure::wrap(Box::new(move || {
            inner.pending.set(None);
            inner.fired.set(inner.fired.get() + 1);
            callback();
        }) as Box<dyn FnMut()>);
        *self.inner.closure.borrow_mut() = Some(closure);
    }

    /// Cancels the pending wake-up, if any.
    pub fn cancel(&self) {
        if let Some(id) = self.inner.pending.take() {
            clear_timeout(id);
        }
    }

    /// Returns `true` while a wake-up is pending.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.inner.pending.get().is_some()
    }
}

impl Default for TimeoutTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer for TimeoutTimer {
    fn arm(&mut self, delay: Duration) {
        self.cancel();
        if let Some(ref closure) = *self.inner.closure.borrow() {
            let id = set_timeout(closure.as_ref().unchecked_ref(), delay.as_millis_f64());
            self.inner.pending.set(Some(id));
        }
    }
}

impl Drop for TimeoutTimer {
    fn drop(&mut self) {
        self.cancel();
        // Drop the JS closure so it doesn't leak.
        self.inner.closure.borrow_mut().take();
    }
}

impl core::fmt::Debug for TimeoutTimer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TimeoutTimer")
            .field("pending", &self.inner.pending.get())
            .field("fired", &self.inner.fired.get())
            .finish()
    }
}
