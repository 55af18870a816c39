#![forbid(unsafe_code)]

//! `wasm-bindgen` surface: attach a slide gate to a container element.
//!
//! A [`SlideGateWeb`] discovers its panels as the container's element
//! children, installs a non-passive `wheel` listener plus passive
//! `touchstart`/`touchend` listeners on the container, and owns exactly the
//! listeners it installed: `detach` removes them and cancels any in-flight
//! transition. With fewer than two panels nothing is installed at all and the
//! page scrolls natively.

use std::cell::RefCell;
use std::rc::Rc;

use slidegate_core::controller::{ControllerState, GateConfig, HoldPolicy, SlideGate, Verdict};
use slidegate_core::gesture::{Gesture, classify_swipe, classify_wheel};
use slidegate_core::trace::{GestureRecord, TraceLog, TransitionRecord};
use slidegate_core::transition::Transition;
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::wasm_bindgen;
use web_sys::{AddEventListenerOptions, Element, Event, TouchEvent, WheelEvent, Window};

use crate::driver::FrameDriver;
use crate::probe;

/// Construction-time options, immutable once the gate is attached.
#[wasm_bindgen]
pub struct SlideGateOptions {
    config: GateConfig,
}

#[wasm_bindgen]
impl SlideGateOptions {
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: GateConfig::default(),
        }
    }

    /// Pixels of slack before a tall panel counts as exhausted in a direction.
    pub fn set_edge_proximity_px(&mut self, px: f64) {
        self.config.edge_proximity_px = px;
    }

    /// Seed for duration-by-distance: milliseconds per viewport-height of travel.
    pub fn set_base_duration_ms(&mut self, ms: f64) {
        self.config.base_duration_ms = ms;
    }

    /// Post-transition suppression window absorbing device inertia.
    pub fn set_tail_lock_ms(&mut self, ms: f64) {
        self.config.tail_lock_ms = ms;
    }

    /// Minimum touch displacement for a swipe to register.
    pub fn set_touch_threshold_px(&mut self, px: f64) {
        self.config.touch_threshold_px = px;
    }

    /// Resist `max_vetoes` forward gestures at the end of panel
    /// `panel_index` (an editorial hold), with `cooldown_ms` between counted
    /// vetoes. `progress_threshold` is the panel progress at which the hold
    /// engages; use 1.0 for panels no taller than the viewport.
    pub fn hold(
        &mut self,
        panel_index: usize,
        max_vetoes: u32,
        progress_threshold: f64,
        cooldown_ms: f64,
    ) {
        self.config.holds.insert(
            panel_index,
            HoldPolicy {
                max_vetoes,
                progress_threshold,
                cooldown_ms,
            },
        );
    }
}

impl Default for SlideGateOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-instance mutable state shared between the listeners and the driver's
/// completion hook.
struct GateShared {
    gate: SlideGate,
    container: Element,
    panels: Vec<Element>,
    trace: TraceLog,
    touch_start_y: Option<f64>,
}

/// One installed listener, kept so `detach` can remove exactly what was added.
struct ListenerHandle {
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

/// A mounted slide gate over one container element.
#[wasm_bindgen]
pub struct SlideGateWeb {
    shared: Rc<RefCell<GateShared>>,
    driver: FrameDriver,
    listeners: Vec<ListenerHandle>,
    attached: bool,
}

#[wasm_bindgen]
impl SlideGateWeb {
    /// Mount over `container`, whose element children become the panels.
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new(container: Element, options: Option<SlideGateOptions>) -> Self {
        let config = options.map_or_else(GateConfig::default, |opts| opts.config);
        let children = container.children();
        let mut panels = Vec::with_capacity(children.length() as usize);
        for index in 0..children.length() {
            if let Some(element) = children.item(index) {
                panels.push(element);
            }
        }
        let gate = SlideGate::new(panels.len(), config);
        let inert = gate.is_inert();
        let shared = Rc::new(RefCell::new(GateShared {
            gate,
            container,
            panels,
            trace: TraceLog::default(),
            touch_start_y: None,
        }));

        let driver = FrameDriver::new();
        {
            let weak = Rc::downgrade(&shared);
            driver.set_on_complete(move |now_ms| {
                if let Some(shared) = weak.upgrade() {
                    let mut state = shared.borrow_mut();
                    if let ControllerState::Animating { target_index, .. } = state.gate.state() {
                        state.trace.push(TransitionRecord::new(now_ms, target_index));
                    }
                    state.gate.transition_completed(now_ms);
                }
            });
        }

        let mut mounted = Self {
            shared,
            driver,
            listeners: Vec::new(),
            attached: false,
        };
        if inert {
            warn!("fewer than two panels, slide gate is inert");
        } else {
            mounted.install_listeners();
            mounted.attached = true;
            debug!(
                panels = mounted.shared.borrow().panels.len(),
                "slide gate attached"
            );
        }
        mounted
    }

    /// Remove the instance's listeners, cancel any in-flight transition, and
    /// discard all controller state. Idempotent.
    pub fn detach(&mut self) {
        let container = self.shared.borrow().container.clone();
        for handle in self.listeners.drain(..) {
            let _ = container.remove_event_listener_with_callback(
                handle.kind,
                handle.callback.as_ref().unchecked_ref(),
            );
        }
        self.driver.cancel();
        self.shared.borrow_mut().gate.reset();
        self.attached = false;
        debug!("slide gate detached");
    }

    /// Whether listeners are installed.
    #[wasm_bindgen(getter)]
    #[must_use]
    pub fn attached(&self) -> bool {
        self.attached
    }

    /// Number of panels discovered at mount.
    #[wasm_bindgen(getter)]
    #[must_use]
    pub fn panel_count(&self) -> usize {
        self.shared.borrow().panels.len()
    }

    /// Whether a transition is currently animating.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.driver.is_active()
    }

    /// Controller state name (`idle` / `animating` / `locked`), for debugging.
    #[must_use]
    pub fn state_name(&self) -> String {
        self.shared.borrow().gate.state().name().to_string()
    }

    /// The panel the visitor is currently on, freshly measured.
    #[must_use]
    pub fn current_index(&self) -> usize {
        let Some(window) = web_sys::window() else {
            return 0;
        };
        let shared = self.shared.borrow();
        probe::layout_snapshot(&window, &shared.panels).current_index()
    }

    /// Drain the gesture trace as newline-delimited JSON.
    #[must_use]
    pub fn drain_trace(&self) -> String {
        self.shared.borrow_mut().trace.drain_jsonl()
    }
}

impl SlideGateWeb {
    fn install_listeners(&mut self) {
        // Wheel must be non-passive: a captured step prevents the default
        // scroll. Touch listeners stay passive; a swipe step coexists with
        // whatever momentum the platform applies and the driver wins by
        // overshoot detection.
        self.add_listener("wheel", false, {
            let shared = Rc::clone(&self.shared);
            let driver = self.driver.clone();
            Closure::wrap(Box::new(move |event: Event| {
                on_wheel(&shared, &driver, &event);
            }) as Box<dyn FnMut(Event)>)
        });
        self.add_listener("touchstart", true, {
            let shared = Rc::clone(&self.shared);
            Closure::wrap(Box::new(move |event: Event| {
                on_touch_start(&shared, &event);
            }) as Box<dyn FnMut(Event)>)
        });
        self.add_listener("touchend", true, {
            let shared = Rc::clone(&self.shared);
            let driver = self.driver.clone();
            Closure::wrap(Box::new(move |event: Event| {
                on_touch_end(&shared, &driver, &event);
            }) as Box<dyn FnMut(Event)>)
        });
    }

    fn add_listener(
        &mut self,
        kind: &'static str,
        passive: bool,
        callback: Closure<dyn FnMut(Event)>,
    ) {
        let options = AddEventListenerOptions::new();
        options.set_passive(passive);
        let container = self.shared.borrow().container.clone();
        let result = container.add_event_listener_with_callback_and_add_event_listener_options(
            kind,
            callback.as_ref().unchecked_ref(),
            &options,
        );
        if let Err(err) = result {
            warn!(?err, kind, "failed to install listener");
            return;
        }
        self.listeners.push(ListenerHandle { kind, callback });
    }
}

/// Monotonic high-resolution clock, ms.
fn now_ms(window: &Window) -> f64 {
    window.performance().map_or(0.0, |perf| perf.now())
}

fn on_wheel(shared: &Rc<RefCell<GateShared>>, driver: &FrameDriver, event: &Event) {
    let Some(wheel) = event.dyn_ref::<WheelEvent>() else {
        return;
    };
    let origin = event.target().and_then(|t| t.dyn_into::<Element>().ok());
    if let Some(origin) = origin.as_ref()
        && !shared.borrow().container.contains(Some(origin.as_ref()))
    {
        return;
    }
    let line_mode = wheel.delta_mode() == WheelEvent::DOM_DELTA_LINE;
    let Some(gesture) = classify_wheel(wheel.delta_y(), line_mode) else {
        return;
    };
    let verdict = decide(shared, driver, gesture, origin.as_ref());
    if !matches!(verdict, Some(Verdict::Release { .. }) | None) {
        event.prevent_default();
    }
}

fn on_touch_start(shared: &Rc<RefCell<GateShared>>, event: &Event) {
    let Some(touch_event) = event.dyn_ref::<TouchEvent>() else {
        return;
    };
    if let Some(touch) = touch_event.touches().get(0) {
        shared.borrow_mut().touch_start_y = Some(f64::from(touch.client_y()));
    }
}

fn on_touch_end(shared: &Rc<RefCell<GateShared>>, driver: &FrameDriver, event: &Event) {
    let Some(touch_event) = event.dyn_ref::<TouchEvent>() else {
        return;
    };
    let (start_y, threshold) = {
        let mut state = shared.borrow_mut();
        let Some(start_y) = state.touch_start_y.take() else {
            return;
        };
        (start_y, state.gate.config().touch_threshold_px)
    };
    let Some(touch) = touch_event.changed_touches().get(0) else {
        return;
    };
    let end_y = f64::from(touch.client_y());
    let Some(gesture) = classify_swipe(start_y, end_y, threshold) else {
        return;
    };
    let origin = event.target().and_then(|t| t.dyn_into::<Element>().ok());
    // Touch listeners are passive: a suppress verdict simply does nothing.
    let _ = decide(shared, driver, gesture, origin.as_ref());
}

/// Measure, decide, and apply one gesture. Returns the verdict, or `None`
/// when the environment is gone (no window).
fn decide(
    shared: &Rc<RefCell<GateShared>>,
    driver: &FrameDriver,
    gesture: Gesture,
    origin: Option<&Element>,
) -> Option<Verdict> {
    let window = web_sys::window()?;
    let now = now_ms(&window);

    let mut state = shared.borrow_mut();
    let layout = probe::layout_snapshot(&window, &state.panels);
    let current = layout.current_index();
    let inner = origin.and_then(|origin| {
        let panel = state.panels.get(current)?;
        probe::find_inner_edges(&window, origin, panel)
    });

    let verdict = state.gate.on_gesture(gesture, &layout, inner, now);
    let record = GestureRecord::new(now, gesture, current, &verdict, state.gate.state().name());
    state.trace.push(record);

    match verdict {
        Verdict::Release { cancelled } => {
            if cancelled {
                driver.cancel();
            }
        }
        Verdict::Suppress => {}
        Verdict::Step(plan) => {
            let transition = Transition::new(
                plan.target_index,
                layout.scroll_y,
                plan.target_offset,
                now,
                plan.duration_ms,
            );
            drop(state);
            driver.start(transition);
        }
    }
    Some(verdict)
}
