#![forbid(unsafe_code)]

//! Gesture classification: raw wheel/touch deltas into directed gestures.
//!
//! Direction is the only correctness-affecting output. The coarse/fine wheel
//! split is a best-effort device heuristic (physical mouse wheels report
//! large or line-based deltas, trackpads report small pixel deltas) and feeds
//! nothing but animation pacing. Treat it as a hint, not a contract.

use serde::Serialize;

/// Wheel deltas at or above this magnitude are treated as coarse
/// (physical-mouse-like) input.
pub const COARSE_WHEEL_THRESHOLD: f64 = 40.0;

/// Default minimum touch displacement for a swipe to register at all.
pub const DEFAULT_TOUCH_THRESHOLD_PX: f64 = 40.0;

/// Which way a gesture wants to move through the panel sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Toward later panels (scrolling down / swiping up).
    Forward,
    /// Toward earlier panels (scrolling up / swiping down).
    Backward,
}

impl Direction {
    /// The opposite direction.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }

    /// Signed panel-index step for this direction.
    #[must_use]
    pub const fn step(self) -> isize {
        match self {
            Self::Forward => 1,
            Self::Backward => -1,
        }
    }
}

/// Input device class, used only to pick an animation duration band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputResolution {
    /// Low-resolution wheel ticks (physical mouse): heavier pacing.
    Coarse,
    /// High-resolution pixel deltas (trackpad).
    Fine,
    /// Touch swipe: shortest pacing.
    Touch,
}

/// A normalized input gesture. Derived per raw event, never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gesture {
    pub direction: Direction,
    pub resolution: InputResolution,
    /// Absolute raw delta, for traces only.
    pub magnitude: f64,
}

/// Classify a wheel event.
///
/// `delta_y` follows the DOM convention (positive = scroll down = forward).
/// `line_mode` is true when the event reports line-based rather than
/// pixel-based deltas, which only physical wheels do. Returns `None` for a
/// zero delta.
#[must_use]
pub fn classify_wheel(delta_y: f64, line_mode: bool) -> Option<Gesture> {
    if delta_y == 0.0 {
        return None;
    }
    let direction = if delta_y > 0.0 {
        Direction::Forward
    } else {
        Direction::Backward
    };
    let resolution = if line_mode || delta_y.abs() >= COARSE_WHEEL_THRESHOLD {
        InputResolution::Coarse
    } else {
        InputResolution::Fine
    };
    Some(Gesture {
        direction,
        resolution,
        magnitude: delta_y.abs(),
    })
}

/// Classify a touch swipe from its start and end Y positions.
///
/// Swiping up (end above start) moves forward. Displacements below
/// `threshold_px` are not gestures at all and return `None`.
#[must_use]
pub fn classify_swipe(start_y: f64, end_y: f64, threshold_px: f64) -> Option<Gesture> {
    let dy = end_y - start_y;
    if dy.abs() < threshold_px {
        return None;
    }
    let direction = if dy < 0.0 {
        Direction::Forward
    } else {
        Direction::Backward
    };
    Some(Gesture {
        direction,
        resolution: InputResolution::Touch,
        magnitude: dy.abs(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
