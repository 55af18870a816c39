#![forbid(unsafe_code)]

//! `requestAnimationFrame` transition driver.
//!
//! [`FrameDriver`] owns the single in-flight [`Transition`] and its cancel
//! handle. Starting a new transition always cancels the previous one first,
//! so the document scroll position has exactly one writer at any time.
//! Cancellation is synchronous: it clears the pending frame request, so it
//! takes effect before the next frame.
//!
//! Each frame the driver samples the transition against the live scroll
//! position. Landing within tolerance, overshoot, or the duration elapsing
//! finish the transition and fire the completion hook; `cancel` never does.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use slidegate_core::transition::Transition;
use tracing::{trace, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::Window;

/// Shared driver state; the frame closure holds a weak handle so dropping the
/// last [`FrameDriver`] tears the loop down.
struct DriverInner {
    active: RefCell<Option<Transition>>,
    raf_id: Cell<Option<i32>>,
    tick: RefCell<Option<Closure<dyn FnMut(f64)>>>,
    on_complete: RefCell<Option<Box<dyn Fn(f64)>>>,
}

impl DriverInner {
    /// One animation frame: sample, write scroll, reschedule or finish.
    fn on_frame(inner: &Rc<Self>, now_ms: f64) {
        inner.raf_id.set(None);
        let Some(window) = web_sys::window() else {
            return;
        };
        let live = window.scroll_y().unwrap_or(0.0);
        let Some(transition) = *inner.active.borrow() else {
            return;
        };
        let sample = transition.frame(now_ms, live);
        if (sample.offset - live).abs() > f64::EPSILON {
            let x = window.scroll_x().unwrap_or(0.0);
            window.scroll_to_with_x_and_y(x, sample.offset);
        }
        if sample.done {
            inner.active.borrow_mut().take();
            trace!(target_index = transition.target_index, "transition finished");
            if let Some(hook) = inner.on_complete.borrow().as_ref() {
                hook(now_ms);
            }
        } else {
            Self::schedule(inner, &window);
        }
    }

    fn schedule(inner: &Rc<Self>, window: &Window) {
        if inner.raf_id.get().is_some() {
            return;
        }
        let tick = inner.tick.borrow();
        let Some(callback) = tick.as_ref() else {
            return;
        };
        match window.request_animation_frame(callback.as_ref().unchecked_ref()) {
            Ok(id) => inner.raf_id.set(Some(id)),
            Err(err) => warn!(?err, "requestAnimationFrame failed"),
        }
    }
}

/// Cloneable handle to the single-animation frame loop.
#[derive(Clone)]
pub(crate) struct FrameDriver {
    inner: Rc<DriverInner>,
}

impl FrameDriver {
    pub(crate) fn new() -> Self {
        let inner = Rc::new(DriverInner {
            active: RefCell::new(None),
            raf_id: Cell::new(None),
            tick: RefCell::new(None),
            on_complete: RefCell::new(None),
        });
        let weak: Weak<DriverInner> = Rc::downgrade(&inner);
        let tick = Closure::wrap(Box::new(move |now_ms: f64| {
            if let Some(inner) = weak.upgrade() {
                DriverInner::on_frame(&inner, now_ms);
            }
        }) as Box<dyn FnMut(f64)>);
        inner.tick.borrow_mut().replace(tick);
        Self { inner }
    }

    /// Hook invoked when a transition finishes (never on cancel). The hook
    /// must not call back into the driver.
    pub(crate) fn set_on_complete(&self, hook: impl Fn(f64) + 'static) {
        self.inner.on_complete.borrow_mut().replace(Box::new(hook));
    }

    /// Begin a transition, cancelling any active one first.
    pub(crate) fn start(&self, transition: Transition) {
        self.cancel();
        trace!(
            target_index = transition.target_index,
            duration_ms = transition.duration_ms,
            "transition started"
        );
        self.inner.active.borrow_mut().replace(transition);
        if let Some(window) = web_sys::window() {
            DriverInner::schedule(&self.inner, &window);
        }
    }

    /// Halt the frame loop without firing the completion hook.
    pub(crate) fn cancel(&self) {
        self.inner.active.borrow_mut().take();
        if let Some(id) = self.inner.raf_id.take()
            && let Some(window) = web_sys::window()
        {
            let _ = window.cancel_animation_frame(id);
        }
    }

    /// Whether a transition is currently in flight.
    pub(crate) fn is_active(&self) -> bool {
        self.inner.active.borrow().is_some()
    }
}
