#![forbid(unsafe_code)]

//! Host-agnostic gesture-to-panel scroll transition controller.
//!
//! A "story" page is an ordered sequence of full-viewport panels. Every wheel
//! or swipe gesture must resolve to exactly one adjacent panel, while native
//! scrolling still works before the first panel, after the last panel, and
//! inside panel-internal scrollable regions.
//!
//! This crate contains everything except the host bindings:
//! - [`geometry`]: layout snapshots, current-panel resolution, tall-panel
//!   progress, region edges,
//! - [`gesture`]: wheel/touch normalization into directed gestures,
//! - [`transition`]: eased interpolation toward a target offset with
//!   duration-by-distance and overshoot detection,
//! - [`controller`]: the gesture lock state machine and edge/passthrough
//!   policy that decides, per gesture, between release, suppress, and step,
//! - [`trace`]: bounded JSONL records for debugging and replay.
//!
//! The host (see `slidegate-web`) owns the DOM: it measures panels into a
//! [`LayoutSnapshot`], feeds gestures to [`SlideGate::on_gesture`], and drives
//! the returned [`StepPlan`] one animation frame at a time. All timestamps are
//! `f64` milliseconds on a monotonic high-resolution clock.

pub mod controller;
pub mod geometry;
pub mod gesture;
pub mod trace;
pub mod transition;

pub use controller::{ControllerState, GateConfig, HoldPolicy, SlideGate, StepPlan, Verdict};
pub use geometry::{InnerScrollEdges, LayoutSnapshot, PanelRect};
pub use gesture::{Direction, Gesture, InputResolution};
pub use trace::{GestureRecord, TraceLog, TraceRecord, TransitionRecord};
pub use transition::{DurationBand, Transition};
