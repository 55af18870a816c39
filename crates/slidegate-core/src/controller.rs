#![forbid(unsafe_code)]

//! The gesture lock state machine and edge/passthrough policy.
//!
//! [`SlideGate`] is the single source of truth for whether input is absorbed.
//! For every normalized gesture it returns a [`Verdict`]: release the event
//! to native scrolling, suppress it, or capture it and step exactly one panel.
//!
//! # State Machine
//!
//! - `Idle` + accepted gesture → `Animating`.
//! - `Animating` + same-direction gesture → suppressed, no state change.
//! - `Animating` + opposing gesture → the transition is cancelled and the
//!   gesture is re-evaluated as if from `Idle`.
//! - `Animating` + completion → `Locked` for a short inertia tail.
//! - `Locked` + gesture before expiry → suppressed. Expiry is checked lazily
//!   on the next gesture, no timer needed.
//!
//! # Policy order (per gesture)
//!
//! 1. Region edge: at the managed region's matching extremity the event
//!    belongs to the browser; the lock is forced back to `Idle`.
//! 2. Lock check (above).
//! 3. Inner scroller not at its matching edge → release.
//! 4. Tall panel with its own overflow left in the gesture direction → release.
//! 5. Optional per-panel hold: veto a forward step a bounded number of times.
//! 6. Step to the clamped adjacent panel, or release at an extremity.
//!
//! # Invariants
//!
//! 1. At most one logical transition is owned at a time; a `Step` verdict
//!    always supersedes (and implies cancellation of) the previous one.
//! 2. Fewer than two panels ⇒ the controller is inert and every verdict is a
//!    release.
//! 3. No verdict ever queues a gesture: suppressed input is dropped.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::geometry::{InnerScrollEdges, LayoutSnapshot};
use crate::gesture::{Direction, Gesture};
use crate::transition::{DurationBand, duration_for_distance};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Optional per-panel override that resists forward steps at a panel's end.
///
/// An editorial control: the step out of a specific panel is vetoed up to
/// `max_vetoes` times once the visitor has reached `progress_threshold` of
/// the panel. Consecutive vetoes must be at least `cooldown_ms` apart;
/// gestures landing inside the cooldown are suppressed without consuming the
/// budget (a trackpad inertia storm cannot burn through it). The budget
/// re-arms when the panel is stepped away from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoldPolicy {
    /// Forward gestures to veto before the step is finally allowed.
    pub max_vetoes: u32,
    /// Panel progress (see [`LayoutSnapshot::progress`]) at which the hold
    /// engages. Non-tall panels always report 1.0, so 1.0 engages everywhere.
    pub progress_threshold: f64,
    /// Minimum spacing between two counted vetoes.
    pub cooldown_ms: f64,
}

impl Default for HoldPolicy {
    fn default() -> Self {
        Self {
            max_vetoes: 2,
            progress_threshold: 1.0,
            cooldown_ms: 250.0,
        }
    }
}

/// Construction-time tuning for a [`SlideGate`]. Immutable afterwards.
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Slack, in pixels, before a tall panel counts as exhausted in a
    /// direction. Within this distance of the panel's own edge a step gesture
    /// becomes eligible.
    pub edge_proximity_px: f64,
    /// Seed for duration-by-distance: milliseconds per viewport-height of
    /// travel, before band clamping.
    pub base_duration_ms: f64,
    /// Post-transition suppression window absorbing device inertia.
    pub tail_lock_ms: f64,
    /// Minimum touch displacement for a swipe to register.
    pub touch_threshold_px: f64,
    /// Duration clamp band for coarse wheel input.
    pub coarse_band: DurationBand,
    /// Duration clamp band for fine (trackpad) input.
    pub fine_band: DurationBand,
    /// Duration clamp band for touch swipes.
    pub touch_band: DurationBand,
    /// Per-panel hold overrides, keyed by panel index.
    pub holds: BTreeMap<usize, HoldPolicy>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            edge_proximity_px: 24.0,
            base_duration_ms: 1000.0,
            tail_lock_ms: 300.0,
            touch_threshold_px: crate::gesture::DEFAULT_TOUCH_THRESHOLD_PX,
            coarse_band: DurationBand::coarse(),
            fine_band: DurationBand::fine(),
            touch_band: DurationBand::touch(),
            holds: BTreeMap::new(),
        }
    }
}

impl GateConfig {
    /// The duration band configured for an input resolution.
    #[must_use]
    pub fn band(&self, resolution: crate::gesture::InputResolution) -> DurationBand {
        match resolution {
            crate::gesture::InputResolution::Coarse => self.coarse_band,
            crate::gesture::InputResolution::Fine => self.fine_band,
            crate::gesture::InputResolution::Touch => self.touch_band,
        }
    }
}

// ---------------------------------------------------------------------------
// State and verdicts
// ---------------------------------------------------------------------------

/// The controller's lock state. Exactly one instance exists per controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControllerState {
    /// Resting state between gestures.
    Idle,
    /// A transition is in flight toward `target_index`.
    Animating {
        target_index: usize,
        target_offset: f64,
        started_at: f64,
        duration_ms: f64,
    },
    /// Post-transition inertia tail: gestures before `until` are suppressed.
    Locked { until: f64 },
}

impl ControllerState {
    /// Short name for traces.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Animating { .. } => "animating",
            Self::Locked { .. } => "locked",
        }
    }
}

/// A captured step the host must animate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepPlan {
    pub target_index: usize,
    /// The target panel's freshly measured top offset.
    pub target_offset: f64,
    /// Eased transition duration chosen for this step.
    pub duration_ms: f64,
}

/// Per-gesture decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    /// Let the browser handle the event. `cancelled` is true when an active
    /// transition was torn down on the way (the host must stop its driver).
    Release { cancelled: bool },
    /// Prevent the event's default action; nothing else happens.
    Suppress,
    /// Prevent the default action and start this transition, cancelling any
    /// active one first.
    Step(StepPlan),
}

impl Verdict {
    /// Short name for traces.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Release { .. } => "release",
            Self::Suppress => "suppress",
            Self::Step(_) => "step",
        }
    }
}

// ---------------------------------------------------------------------------
// SlideGate
// ---------------------------------------------------------------------------

/// Per-panel hold bookkeeping.
#[derive(Debug, Clone, Copy, Default)]
struct HoldDebt {
    used: u32,
    last_veto_at: Option<f64>,
}

/// The gesture-to-panel transition controller.
///
/// One instance per mounted panel sequence. Feed it one [`Gesture`] at a time
/// together with a fresh [`LayoutSnapshot`]; call
/// [`transition_completed`](Self::transition_completed) when the host's frame
/// driver reports the animation done, and [`reset`](Self::reset) on unmount.
#[derive(Debug, Clone)]
pub struct SlideGate {
    config: GateConfig,
    panel_count: usize,
    state: ControllerState,
    hold_debt: BTreeMap<usize, HoldDebt>,
}

impl SlideGate {
    /// Build a controller for a fixed panel count.
    ///
    /// Fewer than two panels produce an inert controller: every verdict is a
    /// release and the host should not install listeners at all.
    #[must_use]
    pub fn new(panel_count: usize, config: GateConfig) -> Self {
        Self {
            config,
            panel_count,
            state: ControllerState::Idle,
            hold_debt: BTreeMap::new(),
        }
    }

    /// Whether the controller intercepts anything at all.
    #[must_use]
    pub fn is_inert(&self) -> bool {
        self.panel_count < 2
    }

    /// Current lock state.
    #[must_use]
    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Construction-time configuration.
    #[must_use]
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// The host's frame driver finished the active transition: enter the
    /// inertia tail. A completion arriving in any other state is stale (the
    /// transition was already superseded) and is ignored.
    pub fn transition_completed(&mut self, now_ms: f64) {
        if let ControllerState::Animating { target_index, .. } = self.state {
            debug!(target_index, "transition complete, tail lock engaged");
            self.state = ControllerState::Locked {
                until: now_ms + self.config.tail_lock_ms,
            };
        }
    }

    /// Forced cancellation (unmount/detach): discard any transition and
    /// return to `Idle`.
    pub fn reset(&mut self) {
        self.state = ControllerState::Idle;
        self.hold_debt.clear();
    }

    /// Decide what to do with one gesture.
    ///
    /// `inner` is the edge state of the nearest panel-internal scrollable
    /// under the gesture origin, if any. `now_ms` is the host's monotonic
    /// high-resolution clock.
    pub fn on_gesture(
        &mut self,
        gesture: Gesture,
        layout: &LayoutSnapshot,
        inner: Option<InnerScrollEdges>,
        now_ms: f64,
    ) -> Verdict {
        if self.is_inert() || layout.panel_count() < 2 {
            return Verdict::Release { cancelled: false };
        }

        let direction = gesture.direction;
        let mut cancelled = false;

        // 1. Region extremity: the event belongs to the page around the
        //    managed region. Force the lock back to Idle so a re-entering
        //    visitor starts clean.
        let at_extremity = match direction {
            Direction::Backward => layout.at_region_top(),
            Direction::Forward => layout.at_region_bottom(),
        };
        if at_extremity {
            cancelled = matches!(self.state, ControllerState::Animating { .. });
            if self.state != ControllerState::Idle {
                trace!(state = self.state.name(), "region edge release, lock reset");
                self.state = ControllerState::Idle;
            }
            return Verdict::Release { cancelled };
        }

        // 2. Lock check.
        match self.state {
            ControllerState::Animating { target_offset, .. } => {
                let active_direction = if target_offset >= layout.scroll_y {
                    Direction::Forward
                } else {
                    Direction::Backward
                };
                if direction == active_direction {
                    trace!("gesture matches active transition, suppressed");
                    return Verdict::Suppress;
                }
                // Opposing gesture: cancel and evaluate fresh from Idle.
                debug!("opposing gesture cancels active transition");
                self.state = ControllerState::Idle;
                cancelled = true;
            }
            ControllerState::Locked { until } => {
                if now_ms < until {
                    trace!(until, now_ms, "inertia tail, suppressed");
                    return Verdict::Suppress;
                }
                self.state = ControllerState::Idle;
            }
            ControllerState::Idle => {}
        }

        // 3. Inner scroller absorbs the gesture until it hits its own edge.
        if let Some(edges) = inner
            && edges.can_absorb(direction)
        {
            return Verdict::Release { cancelled };
        }

        // 4. Tall panel still has its own content to traverse.
        let current = layout.current_index();
        if layout.is_tall(current)
            && layout.overflow_remaining(current, direction) > self.config.edge_proximity_px
        {
            return Verdict::Release { cancelled };
        }

        // 5. Per-panel hold: veto a forward step a bounded number of times.
        if direction == Direction::Forward
            && let Some(policy) = self.config.holds.get(&current).copied()
            && layout.progress(current) >= policy.progress_threshold
        {
            let debt = self.hold_debt.entry(current).or_default();
            // The cooldown binds regardless of remaining budget: inertia
            // trailing the last counted veto must never slip through.
            let within_cooldown = debt
                .last_veto_at
                .is_some_and(|at| now_ms - at < policy.cooldown_ms);
            if within_cooldown {
                trace!(panel = current, "hold cooldown, suppressed");
                return Verdict::Suppress;
            }
            if debt.used < policy.max_vetoes {
                debt.used += 1;
                debt.last_veto_at = Some(now_ms);
                debug!(panel = current, used = debt.used, "hold veto");
                return Verdict::Suppress;
            }
        }

        // 6. Step to the adjacent panel.
        let last = layout.panel_count() - 1;
        let target = current
            .checked_add_signed(direction.step())
            .map_or(0, |idx| idx.min(last));
        if target == current {
            return Verdict::Release { cancelled };
        }
        let Some(target_rect) = layout.panel(target) else {
            return Verdict::Release { cancelled };
        };

        // Leaving the panel re-arms its hold budget.
        self.hold_debt.remove(&current);

        let distance = target_rect.top - layout.scroll_y;
        let duration_ms = duration_for_distance(
            distance,
            layout.viewport_height,
            self.config.base_duration_ms,
            self.config.band(gesture.resolution),
        );
        self.state = ControllerState::Animating {
            target_index: target,
            target_offset: target_rect.top,
            started_at: now_ms,
            duration_ms,
        };
        debug!(
            from = current,
            to = target,
            distance,
            duration_ms,
            resolution = ?gesture.resolution,
            "step captured"
        );
        Verdict::Step(StepPlan {
            target_index: target,
            target_offset: target_rect.top,
            duration_ms,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PanelRect;
    use crate::gesture::InputResolution;

    const VIEWPORT: f64 = 800.0;

    fn layout(scroll_y: f64, heights: &[f64]) -> LayoutSnapshot {
        let mut top = 0.0;
        let panels = heights
            .iter()
            .map(|&height| {
                let rect = PanelRect { top, height };
                top += height;
                rect
            })
            .collect();
        LayoutSnapshot {
            viewport_height: VIEWPORT,
            scroll_y,
            panels,
        }
    }

    fn wheel(direction: Direction) -> Gesture {
        Gesture {
            direction,
            resolution: InputResolution::Coarse,
            magnitude: 120.0,
        }
    }

    fn gate(panel_count: usize) -> SlideGate {
        SlideGate::new(panel_count, GateConfig::default())
    }

    // -- inert controller --

    #[test]
    fn single_panel_controller_is_inert() {
        let mut gate = gate(1);
        assert!(gate.is_inert());
        let snap = layout(0.0, &[800.0]);
        let verdict = gate.on_gesture(wheel(Direction::Forward), &snap, None, 0.0);
        assert_eq!(verdict, Verdict::Release { cancelled: false });
        assert_eq!(gate.state(), ControllerState::Idle);
    }

    // -- scenario A: idle forward step from a normal panel --

    #[test]
    fn forward_step_from_middle_panel() {
        let mut gate = gate(3);
        let snap = layout(800.0, &[800.0, 800.0, 800.0]);
        let verdict = gate.on_gesture(wheel(Direction::Forward), &snap, None, 10.0);
        let Verdict::Step(plan) = verdict else {
            panic!("expected step, got {verdict:?}");
        };
        assert_eq!(plan.target_index, 2);
        assert!((plan.target_offset - 1600.0).abs() < 1e-9);
        assert!(plan.duration_ms >= DurationBand::coarse().min_ms);
        assert!(plan.duration_ms <= DurationBand::coarse().max_ms);
        assert!(matches!(
            gate.state(),
            ControllerState::Animating { target_index: 2, .. }
        ));
    }

    // -- scenario B: tall panel mid-progress releases --

    #[test]
    fn tall_panel_mid_progress_releases_forward() {
        let mut gate = gate(2);
        // Panel 0 is 3x viewport, visitor at 40% internal progress.
        let snap = layout(640.0, &[2400.0, 800.0]);
        assert!((snap.progress(0) - 0.4).abs() < 1e-9);
        let verdict = gate.on_gesture(wheel(Direction::Forward), &snap, None, 0.0);
        assert_eq!(verdict, Verdict::Release { cancelled: false });
        assert_eq!(snap.current_index(), 0);
        assert_eq!(gate.state(), ControllerState::Idle);
    }

    #[test]
    fn tall_panel_at_bottom_edge_steps_forward() {
        let mut gate = gate(2);
        // scroll_y + viewport reaches the panel bottom: overflow exhausted.
        let snap = layout(1600.0, &[2400.0, 800.0]);
        let verdict = gate.on_gesture(wheel(Direction::Forward), &snap, None, 0.0);
        assert!(matches!(verdict, Verdict::Step(plan) if plan.target_index == 1));
    }

    #[test]
    fn edge_proximity_makes_near_edge_step_eligible() {
        let config = GateConfig {
            edge_proximity_px: 24.0,
            ..GateConfig::default()
        };
        let mut gate = SlideGate::new(2, config);
        // 20 px of panel 0 overflow left: within the 24 px slack.
        let snap = layout(1580.0, &[2400.0, 800.0]);
        let verdict = gate.on_gesture(wheel(Direction::Forward), &snap, None, 0.0);
        assert!(matches!(verdict, Verdict::Step(_)));
    }

    // -- scenario C: backward at the first panel releases --

    #[test]
    fn backward_at_region_top_releases() {
        let mut gate = gate(3);
        let snap = layout(0.0, &[800.0, 800.0, 800.0]);
        let verdict = gate.on_gesture(wheel(Direction::Backward), &snap, None, 0.0);
        assert_eq!(verdict, Verdict::Release { cancelled: false });
        assert_eq!(gate.state(), ControllerState::Idle);
    }

    #[test]
    fn forward_at_region_bottom_releases_and_is_idempotent() {
        let mut gate = gate(3);
        let snap = layout(1600.0, &[800.0, 800.0, 800.0]);
        for _ in 0..5 {
            let verdict = gate.on_gesture(wheel(Direction::Forward), &snap, None, 0.0);
            assert_eq!(verdict, Verdict::Release { cancelled: false });
            assert_eq!(gate.state(), ControllerState::Idle);
        }
    }

    #[test]
    fn region_edge_release_resets_lock() {
        let mut gate = gate(3);
        let snap = layout(800.0, &[800.0, 800.0, 800.0]);
        assert!(matches!(
            gate.on_gesture(wheel(Direction::Forward), &snap, None, 0.0),
            Verdict::Step(_)
        ));
        // Mid-animation the live position reaches the last panel's territory.
        let snap_end = layout(1600.0, &[800.0, 800.0, 800.0]);
        let verdict = gate.on_gesture(wheel(Direction::Forward), &snap_end, None, 50.0);
        assert_eq!(verdict, Verdict::Release { cancelled: true });
        assert_eq!(gate.state(), ControllerState::Idle);
    }

    // -- scenario D: same-direction gesture while animating is suppressed --

    #[test]
    fn same_direction_gesture_suppressed_while_animating() {
        let mut gate = gate(3);
        let snap = layout(800.0, &[800.0, 800.0, 800.0]);
        assert!(matches!(
            gate.on_gesture(wheel(Direction::Forward), &snap, None, 0.0),
            Verdict::Step(_)
        ));
        // 50 ms later the animation is still in flight, position mid-way.
        let mid = layout(1100.0, &[800.0, 800.0, 800.0]);
        let verdict = gate.on_gesture(wheel(Direction::Forward), &mid, None, 50.0);
        assert_eq!(verdict, Verdict::Suppress);
        assert!(matches!(
            gate.state(),
            ControllerState::Animating { target_index: 2, .. }
        ));
    }

    #[test]
    fn opposing_gesture_cancels_and_restarts() {
        let mut gate = gate(3);
        let snap = layout(800.0, &[800.0, 800.0, 800.0]);
        assert!(matches!(
            gate.on_gesture(wheel(Direction::Forward), &snap, None, 0.0),
            Verdict::Step(plan) if plan.target_index == 2
        ));
        // Opposing gesture mid-flight: live position 1200, still panel 1.
        let mid = layout(1200.0, &[800.0, 800.0, 800.0]);
        let verdict = gate.on_gesture(wheel(Direction::Backward), &mid, None, 100.0);
        let Verdict::Step(plan) = verdict else {
            panic!("expected fresh backward step, got {verdict:?}");
        };
        assert_eq!(plan.target_index, 0);
        assert!((plan.target_offset - 0.0).abs() < 1e-9);
    }

    #[test]
    fn opposing_gesture_can_still_release() {
        let mut gate = gate(2);
        // Forward transition from a tall panel's end toward panel 1.
        let snap = layout(1600.0, &[2400.0, 800.0]);
        assert!(matches!(
            gate.on_gesture(wheel(Direction::Forward), &snap, None, 0.0),
            Verdict::Step(_)
        ));
        // Backward mid-flight, but panel 0 still has internal content above:
        // the cancel happens, then policy releases to native scroll.
        let mid = layout(2000.0, &[2400.0, 800.0]);
        let verdict = gate.on_gesture(wheel(Direction::Backward), &mid, None, 100.0);
        assert_eq!(verdict, Verdict::Release { cancelled: true });
        assert_eq!(gate.state(), ControllerState::Idle);
    }

    // -- inner scroller precedence --

    #[test]
    fn inner_scroller_mid_content_releases() {
        let mut gate = gate(3);
        let snap = layout(800.0, &[800.0, 800.0, 800.0]);
        let edges = InnerScrollEdges {
            at_top: true,
            at_bottom: false,
        };
        let verdict = gate.on_gesture(wheel(Direction::Forward), &snap, Some(edges), 0.0);
        assert_eq!(verdict, Verdict::Release { cancelled: false });
        assert_eq!(gate.state(), ControllerState::Idle);
    }

    #[test]
    fn inner_scroller_at_matching_edge_steps() {
        let mut gate = gate(3);
        let snap = layout(800.0, &[800.0, 800.0, 800.0]);
        let edges = InnerScrollEdges {
            at_top: false,
            at_bottom: true,
        };
        let verdict = gate.on_gesture(wheel(Direction::Forward), &snap, Some(edges), 0.0);
        assert!(matches!(verdict, Verdict::Step(_)));
    }

    // -- tail lock --

    #[test]
    fn tail_lock_suppresses_until_expiry() {
        let mut gate = gate(4);
        let snap = layout(800.0, &[800.0, 800.0, 800.0, 800.0]);
        assert!(matches!(
            gate.on_gesture(wheel(Direction::Forward), &snap, None, 0.0),
            Verdict::Step(_)
        ));
        gate.transition_completed(1000.0);
        assert!(matches!(gate.state(), ControllerState::Locked { .. }));

        // Residual inertia 100 ms after completion: fully suppressed.
        let landed = layout(1600.0, &[800.0, 800.0, 800.0, 800.0]);
        let verdict = gate.on_gesture(wheel(Direction::Forward), &landed, None, 1100.0);
        assert_eq!(verdict, Verdict::Suppress);
        assert!(matches!(gate.state(), ControllerState::Locked { .. }));

        // Past the tail the same gesture steps again.
        let verdict = gate.on_gesture(wheel(Direction::Forward), &landed, None, 1400.0);
        assert!(matches!(verdict, Verdict::Step(plan) if plan.target_index == 3));
    }

    #[test]
    fn stale_completion_is_ignored() {
        let mut gate = gate(3);
        gate.transition_completed(500.0);
        assert_eq!(gate.state(), ControllerState::Idle);
    }

    // -- hold policy --

    fn gate_with_hold(panel: usize, policy: HoldPolicy) -> SlideGate {
        let mut config = GateConfig::default();
        config.holds.insert(panel, policy);
        SlideGate::new(3, config)
    }

    #[test]
    fn hold_vetoes_then_allows() {
        let mut gate = gate_with_hold(
            1,
            HoldPolicy {
                max_vetoes: 2,
                progress_threshold: 1.0,
                cooldown_ms: 100.0,
            },
        );
        let snap = layout(800.0, &[800.0, 800.0, 800.0]);

        // Two spaced-out forward gestures are vetoed.
        assert_eq!(
            gate.on_gesture(wheel(Direction::Forward), &snap, None, 0.0),
            Verdict::Suppress
        );
        assert_eq!(
            gate.on_gesture(wheel(Direction::Forward), &snap, None, 200.0),
            Verdict::Suppress
        );
        // The third finally steps.
        assert!(matches!(
            gate.on_gesture(wheel(Direction::Forward), &snap, None, 400.0),
            Verdict::Step(plan) if plan.target_index == 2
        ));
    }

    #[test]
    fn hold_cooldown_does_not_consume_budget() {
        let mut gate = gate_with_hold(
            1,
            HoldPolicy {
                max_vetoes: 1,
                progress_threshold: 1.0,
                cooldown_ms: 300.0,
            },
        );
        let snap = layout(800.0, &[800.0, 800.0, 800.0]);

        assert_eq!(
            gate.on_gesture(wheel(Direction::Forward), &snap, None, 0.0),
            Verdict::Suppress
        );
        // An inertia storm inside the cooldown stays suppressed but does not
        // burn the budget down.
        for at in [20.0, 60.0, 120.0, 250.0] {
            assert_eq!(
                gate.on_gesture(wheel(Direction::Forward), &snap, None, at),
                Verdict::Suppress
            );
        }
        // First gesture past the cooldown: budget exhausted, step allowed.
        assert!(matches!(
            gate.on_gesture(wheel(Direction::Forward), &snap, None, 400.0),
            Verdict::Step(_)
        ));
    }

    #[test]
    fn hold_cooldown_binds_after_budget_is_spent() {
        let mut gate = gate_with_hold(
            1,
            HoldPolicy {
                max_vetoes: 1,
                progress_threshold: 1.0,
                cooldown_ms: 300.0,
            },
        );
        let snap = layout(800.0, &[800.0, 800.0, 800.0]);

        // The single counted veto.
        assert_eq!(
            gate.on_gesture(wheel(Direction::Forward), &snap, None, 0.0),
            Verdict::Suppress
        );
        // Inertia trailing the veto stays suppressed even though the budget
        // is already spent.
        for at in [20.0, 150.0, 280.0] {
            assert_eq!(
                gate.on_gesture(wheel(Direction::Forward), &snap, None, at),
                Verdict::Suppress
            );
        }
        // First gesture clear of the cooldown steps.
        assert!(matches!(
            gate.on_gesture(wheel(Direction::Forward), &snap, None, 350.0),
            Verdict::Step(plan) if plan.target_index == 2
        ));
    }

    #[test]
    fn hold_does_not_affect_backward_steps() {
        let mut gate = gate_with_hold(1, HoldPolicy::default());
        let snap = layout(800.0, &[800.0, 800.0, 800.0]);
        assert!(matches!(
            gate.on_gesture(wheel(Direction::Backward), &snap, None, 0.0),
            Verdict::Step(plan) if plan.target_index == 0
        ));
    }

    #[test]
    fn hold_rearms_after_leaving_the_panel() {
        let mut gate = gate_with_hold(
            1,
            HoldPolicy {
                max_vetoes: 1,
                progress_threshold: 1.0,
                cooldown_ms: 50.0,
            },
        );
        let snap = layout(800.0, &[800.0, 800.0, 800.0]);

        assert_eq!(
            gate.on_gesture(wheel(Direction::Forward), &snap, None, 0.0),
            Verdict::Suppress
        );
        assert!(matches!(
            gate.on_gesture(wheel(Direction::Forward), &snap, None, 100.0),
            Verdict::Step(_)
        ));
        gate.transition_completed(200.0);

        // Come back to panel 1 and reach its end again: the veto re-engages.
        let back = layout(1600.0, &[800.0, 800.0, 800.0]);
        assert!(matches!(
            gate.on_gesture(wheel(Direction::Backward), &back, None, 1000.0),
            Verdict::Step(_)
        ));
        gate.transition_completed(1100.0);
        assert_eq!(
            gate.on_gesture(wheel(Direction::Forward), &snap, None, 2000.0),
            Verdict::Suppress
        );
    }

    #[test]
    fn hold_waits_for_progress_threshold_on_tall_panel() {
        let mut config = GateConfig::default();
        config.holds.insert(
            0,
            HoldPolicy {
                max_vetoes: 1,
                progress_threshold: 0.95,
                cooldown_ms: 50.0,
            },
        );
        let mut gate = SlideGate::new(2, config);

        // Mid-panel: the tall-panel rule releases, the hold never engages.
        let mid = layout(640.0, &[2400.0, 800.0]);
        assert_eq!(
            gate.on_gesture(wheel(Direction::Forward), &mid, None, 0.0),
            Verdict::Release { cancelled: false }
        );

        // At the panel's end the hold engages before the step.
        let end = layout(1600.0, &[2400.0, 800.0]);
        assert_eq!(
            gate.on_gesture(wheel(Direction::Forward), &end, None, 100.0),
            Verdict::Suppress
        );
        assert!(matches!(
            gate.on_gesture(wheel(Direction::Forward), &end, None, 300.0),
            Verdict::Step(_)
        ));
    }

    // -- duration tuning --

    #[test]
    fn touch_steps_are_faster_than_coarse() {
        let snap = layout(800.0, &[800.0, 800.0, 800.0]);
        let mut gate_a = gate(3);
        let Verdict::Step(coarse) = gate_a.on_gesture(wheel(Direction::Forward), &snap, None, 0.0)
        else {
            panic!("expected step");
        };
        let mut gate_b = gate(3);
        let touch = Gesture {
            direction: Direction::Forward,
            resolution: InputResolution::Touch,
            magnitude: 90.0,
        };
        let Verdict::Step(swipe) = gate_b.on_gesture(touch, &snap, None, 0.0) else {
            panic!("expected step");
        };
        assert!(swipe.duration_ms < coarse.duration_ms);
    }

    // -- reset --

    #[test]
    fn reset_discards_state_and_debt() {
        let mut gate = gate_with_hold(1, HoldPolicy::default());
        let snap = layout(800.0, &[800.0, 800.0, 800.0]);
        let _ = gate.on_gesture(wheel(Direction::Forward), &snap, None, 0.0);
        gate.reset();
        assert_eq!(gate.state(), ControllerState::Idle);
        assert!(gate.hold_debt.is_empty());
    }

    // -- single ownership of the transition --

    #[test]
    fn at_most_one_transition_is_owned() {
        let mut gate = gate(4);
        let snap = layout(800.0, &[800.0, 800.0, 800.0, 800.0]);
        assert!(matches!(
            gate.on_gesture(wheel(Direction::Forward), &snap, None, 0.0),
            Verdict::Step(plan) if plan.target_index == 2
        ));
        // Opposing gesture supersedes: exactly one Animating state remains,
        // now pointing backward.
        let mid = layout(1200.0, &[800.0, 800.0, 800.0, 800.0]);
        assert!(matches!(
            gate.on_gesture(wheel(Direction::Backward), &mid, None, 80.0),
            Verdict::Step(plan) if plan.target_index == 0
        ));
        assert!(matches!(
            gate.state(),
            ControllerState::Animating { target_index: 0, .. }
        ));
    }
}
