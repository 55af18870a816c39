#![forbid(unsafe_code)]

//! Eased scroll transitions: the math the frame driver executes.
//!
//! A [`Transition`] interpolates the document scroll position from its start
//! offset to a target panel offset over a fixed duration, using a symmetric
//! cubic ease-in/out so motion starts and ends gently. The host samples it
//! once per animation frame and applies the returned offset.
//!
//! # Invariants
//!
//! 1. Sampling is pure: a transition never mutates, so cancelling is simply
//!    dropping it.
//! 2. `sample` is clamped: before `started_at` it returns the start offset,
//!    after the duration it returns the target exactly.
//! 3. Duration is at least 1 ms; a degenerate request cannot divide by zero.
//!
//! # Failure Modes
//!
//! - The live scroll position can move under the transition (platform smooth
//!   scroll finishing, the visitor dragging the scrollbar). [`Transition::frame`]
//!   detects both landing (within 2 px) and overshoot (the sign of the
//!   remaining distance flipping) and reports the transition done early.

use crate::gesture::{Direction, InputResolution};

/// How close the live offset must be to the target to count as landed.
pub const LANDING_TOLERANCE_PX: f64 = 2.0;

// ---------------------------------------------------------------------------
// Easing
// ---------------------------------------------------------------------------

/// Symmetric cubic ease-in/out over normalized progress `t` in `[0, 1]`.
#[must_use]
pub fn ease_in_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = -2.0 * t + 2.0;
        1.0 - u * u * u / 2.0
    }
}

// ---------------------------------------------------------------------------
// Duration policy
// ---------------------------------------------------------------------------

/// Clamp band for a computed transition duration, per input resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationBand {
    pub min_ms: f64,
    pub max_ms: f64,
}

impl DurationBand {
    /// Empirical band for low-resolution wheel input: heavier feel.
    #[must_use]
    pub const fn coarse() -> Self {
        Self {
            min_ms: 650.0,
            max_ms: 1400.0,
        }
    }

    /// Band for high-resolution trackpad input.
    #[must_use]
    pub const fn fine() -> Self {
        Self {
            min_ms: 450.0,
            max_ms: 1000.0,
        }
    }

    /// Band for touch swipes: shortest.
    #[must_use]
    pub const fn touch() -> Self {
        Self {
            min_ms: 300.0,
            max_ms: 700.0,
        }
    }

    /// The default band for an input resolution.
    #[must_use]
    pub const fn for_resolution(resolution: InputResolution) -> Self {
        match resolution {
            InputResolution::Coarse => Self::coarse(),
            InputResolution::Fine => Self::fine(),
            InputResolution::Touch => Self::touch(),
        }
    }

    /// Clamp `ms` into this band.
    #[must_use]
    pub fn clamp(&self, ms: f64) -> f64 {
        ms.clamp(self.min_ms, self.max_ms)
    }
}

/// Duration for a step covering `distance_px`, seeded by `base_ms` per
/// viewport-height of travel and clamped into `band`.
#[must_use]
pub fn duration_for_distance(
    distance_px: f64,
    viewport_height: f64,
    base_ms: f64,
    band: DurationBand,
) -> f64 {
    let reference = if viewport_height > 0.0 {
        viewport_height
    } else {
        1.0
    };
    band.clamp(base_ms * (distance_px.abs() / reference))
}

// ---------------------------------------------------------------------------
// Transition
// ---------------------------------------------------------------------------

/// Result of sampling a transition for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSample {
    /// Offset to write this frame. Meaningless when `done` and the live
    /// position already landed.
    pub offset: f64,
    /// The transition is finished (elapsed, landed, or overshot) and the
    /// completion callback should fire.
    pub done: bool,
}

/// A single in-flight scroll transition toward a panel's top offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    /// Panel the transition is heading to.
    pub target_index: usize,
    /// Scroll offset at the moment the transition started.
    pub from_offset: f64,
    /// The target panel's measured top offset.
    pub target_offset: f64,
    /// Start timestamp, ms.
    pub started_at: f64,
    /// Total duration, ms (at least 1).
    pub duration_ms: f64,
}

impl Transition {
    /// Build a transition; a duration below 1 ms is clamped up.
    #[must_use]
    pub fn new(
        target_index: usize,
        from_offset: f64,
        target_offset: f64,
        started_at: f64,
        duration_ms: f64,
    ) -> Self {
        Self {
            target_index,
            from_offset,
            target_offset,
            started_at,
            duration_ms: duration_ms.max(1.0),
        }
    }

    /// Which way this transition moves.
    #[must_use]
    pub fn direction(&self) -> Direction {
        if self.target_offset >= self.from_offset {
            Direction::Forward
        } else {
            Direction::Backward
        }
    }

    /// Eased offset at `now_ms`, clamped to the `[from, target]` span.
    #[must_use]
    pub fn sample(&self, now_ms: f64) -> f64 {
        let progress = ((now_ms - self.started_at) / self.duration_ms).clamp(0.0, 1.0);
        let eased = ease_in_out_cubic(progress);
        self.from_offset + (self.target_offset - self.from_offset) * eased
    }

    /// Whether the full duration has elapsed at `now_ms`.
    #[must_use]
    pub fn is_elapsed(&self, now_ms: f64) -> bool {
        now_ms - self.started_at >= self.duration_ms
    }

    /// Whether `live_offset` is within landing tolerance of the target.
    #[must_use]
    pub fn has_landed(&self, live_offset: f64) -> bool {
        (live_offset - self.target_offset).abs() <= LANDING_TOLERANCE_PX
    }

    /// Whether `live_offset` is past the target relative to where the
    /// transition started (the sign of the remaining distance flipped).
    #[must_use]
    pub fn has_overshot(&self, live_offset: f64) -> bool {
        let planned = self.target_offset - self.from_offset;
        let remaining = self.target_offset - live_offset;
        planned != 0.0 && remaining.signum() != planned.signum() && remaining.abs() > 0.0
    }

    /// One frame step: the offset to write, and whether the transition is
    /// finished. Landing and overshoot end the transition early; an elapsed
    /// transition pins the offset to the target exactly.
    #[must_use]
    pub fn frame(&self, now_ms: f64, live_offset: f64) -> FrameSample {
        if self.has_landed(live_offset) || self.has_overshot(live_offset) {
            return FrameSample {
                offset: live_offset,
                done: true,
            };
        }
        if self.is_elapsed(now_ms) {
            return FrameSample {
                offset: self.target_offset,
                done: true,
            };
        }
        FrameSample {
            offset: self.sample(now_ms),
            done: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // -- easing --

    #[test]
    fn easing_endpoints() {
        assert_eq!(ease_in_out_cubic(0.0), 0.0);
        assert_eq!(ease_in_out_cubic(1.0), 1.0);
        assert!((ease_in_out_cubic(0.5) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn easing_is_gentle_at_both_ends() {
        // Near the endpoints the eased value moves slower than linear.
        assert!(ease_in_out_cubic(0.1) < 0.1);
        assert!(ease_in_out_cubic(0.9) > 0.9);
    }

    #[test]
    fn easing_clamps_out_of_range() {
        assert_eq!(ease_in_out_cubic(-3.0), 0.0);
        assert_eq!(ease_in_out_cubic(7.0), 1.0);
    }

    // -- duration --

    #[test]
    fn one_viewport_step_uses_base_duration() {
        let band = DurationBand::coarse();
        let ms = duration_for_distance(800.0, 800.0, 1000.0, band);
        assert!((ms - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn short_hop_clamps_to_band_minimum() {
        let band = DurationBand::coarse();
        let ms = duration_for_distance(40.0, 800.0, 1000.0, band);
        assert_eq!(ms, band.min_ms);
    }

    #[test]
    fn long_jump_clamps_to_band_maximum() {
        let band = DurationBand::coarse();
        let ms = duration_for_distance(5000.0, 800.0, 1000.0, band);
        assert_eq!(ms, band.max_ms);
    }

    #[test]
    fn touch_band_is_shorter_than_coarse() {
        let coarse = DurationBand::for_resolution(InputResolution::Coarse);
        let touch = DurationBand::for_resolution(InputResolution::Touch);
        assert!(touch.max_ms < coarse.max_ms);
        assert!(touch.min_ms < coarse.min_ms);
    }

    #[test]
    fn zero_viewport_does_not_divide_by_zero() {
        let band = DurationBand::fine();
        let ms = duration_for_distance(800.0, 0.0, 1.0, band);
        assert!(ms.is_finite());
    }

    // -- transition sampling --

    #[test]
    fn sample_clamps_to_span() {
        let t = Transition::new(1, 0.0, 800.0, 1000.0, 500.0);
        assert_eq!(t.sample(0.0), 0.0);
        assert_eq!(t.sample(1000.0), 0.0);
        assert_eq!(t.sample(2000.0), 800.0);
        let mid = t.sample(1250.0);
        assert!((mid - 400.0).abs() < 1e-9);
    }

    #[test]
    fn direction_follows_offsets() {
        assert_eq!(
            Transition::new(1, 0.0, 800.0, 0.0, 500.0).direction(),
            Direction::Forward
        );
        assert_eq!(
            Transition::new(0, 800.0, 0.0, 0.0, 500.0).direction(),
            Direction::Backward
        );
    }

    #[test]
    fn zero_duration_is_clamped() {
        let t = Transition::new(1, 0.0, 800.0, 0.0, 0.0);
        assert!(t.duration_ms >= 1.0);
        assert!(t.sample(0.5).is_finite());
    }

    // -- frame / early completion --

    #[test]
    fn frame_runs_to_exact_target() {
        let t = Transition::new(1, 0.0, 800.0, 0.0, 400.0);
        let mut live = 0.0;
        let mut now = 0.0;
        loop {
            let sample = t.frame(now, live);
            live = sample.offset;
            if sample.done {
                break;
            }
            now += 16.0;
            assert!(now < 1000.0, "transition did not finish");
        }
        assert!((live - 800.0).abs() <= LANDING_TOLERANCE_PX);
    }

    #[test]
    fn frame_completes_early_when_landed() {
        let t = Transition::new(1, 0.0, 800.0, 0.0, 400.0);
        // Platform scroll already reached the target mid-flight.
        let sample = t.frame(100.0, 799.0);
        assert!(sample.done);
    }

    #[test]
    fn frame_completes_on_overshoot() {
        let t = Transition::new(1, 0.0, 800.0, 0.0, 400.0);
        // The visitor yanked the scrollbar past the target.
        assert!(t.has_overshot(900.0));
        assert!(t.frame(100.0, 900.0).done);
        // Behind the start point is not an overshoot.
        assert!(!t.has_overshot(-50.0));
    }

    #[test]
    fn backward_overshoot_detected() {
        let t = Transition::new(0, 800.0, 0.0, 0.0, 400.0);
        assert!(t.has_overshot(-10.0));
        assert!(!t.has_overshot(400.0));
    }

    proptest! {
        #[test]
        fn sample_stays_within_span(
            from in -10_000.0f64..10_000.0,
            to in -10_000.0f64..10_000.0,
            duration in 1.0f64..5_000.0,
            at in -1_000.0f64..10_000.0,
        ) {
            let t = Transition::new(0, from, to, 0.0, duration);
            let v = t.sample(at);
            let (lo, hi) = if from <= to { (from, to) } else { (to, from) };
            prop_assert!(v >= lo - 1e-9 && v <= hi + 1e-9);
        }

        #[test]
        fn sample_is_monotonic_forward(duration in 10.0f64..3_000.0) {
            let t = Transition::new(1, 0.0, 1000.0, 0.0, duration);
            let mut prev = t.sample(0.0);
            let steps = 200;
            for i in 1..=steps {
                let now = duration * (i as f64) / (steps as f64);
                let v = t.sample(now);
                prop_assert!(v + 1e-9 >= prev, "eased offset regressed");
                prev = v;
            }
        }
    }
}
