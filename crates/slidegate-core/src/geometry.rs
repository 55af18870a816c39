#![forbid(unsafe_code)]

//! Layout snapshots: the geometry the policy layer reasons about.
//!
//! The host measures the page immediately before each gesture decision and
//! hands the controller a [`LayoutSnapshot`]. Nothing here is cached between
//! gestures; layout is volatile (resize, images loading, fonts swapping), so
//! every decision starts from fresh numbers.
//!
//! # Invariants
//!
//! 1. Panel indexes are 0-based and insertion-ordered; they never change
//!    after attach.
//! 2. `current_index` is the panel with the greatest top offset at or above
//!    the live scroll position (within a small sub-pixel epsilon), or panel 0
//!    when the visitor is above the managed region.
//! 3. `progress` is only meaningful for tall panels; non-tall and
//!    unmeasurable panels always report 1.0 so they never block a step.
//!
//! # Failure Modes
//!
//! - A panel that was not laid out yet reports height 0. That makes it
//!   non-tall with progress 1.0: neutral, never a permanent blocker.
//! - An empty snapshot degrades every query to "release to native scroll".

use serde::Serialize;

use crate::gesture::Direction;

/// Sub-pixel slack applied when resolving the current panel and the managed
/// region's edges. Matches the 2 px landing tolerance of a transition.
pub const INDEX_EPSILON_PX: f64 = 2.0;

// ---------------------------------------------------------------------------
// Panel rectangle
// ---------------------------------------------------------------------------

/// One panel's freshly measured document-relative rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PanelRect {
    /// Document-relative Y of the panel's top edge.
    pub top: f64,
    /// Rendered height. 0.0 when the panel could not be measured.
    pub height: f64,
}

impl PanelRect {
    /// Document-relative Y of the panel's bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

// ---------------------------------------------------------------------------
// Inner scroller edge report
// ---------------------------------------------------------------------------

/// Edge state of the nearest panel-internal scrollable under a gesture origin.
///
/// Produced by the host's inner-scroll detector (an ancestry walk over
/// computed `overflow-y`). When the scroller can still absorb movement in the
/// gesture's direction, the gesture is released untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InnerScrollEdges {
    /// The scroller's own content is at its top edge.
    pub at_top: bool,
    /// The scroller's own content is at its bottom edge.
    pub at_bottom: bool,
}

impl InnerScrollEdges {
    /// Whether the inner scroller can still move in `direction`.
    #[must_use]
    pub fn can_absorb(&self, direction: Direction) -> bool {
        match direction {
            Direction::Forward => !self.at_bottom,
            Direction::Backward => !self.at_top,
        }
    }
}

// ---------------------------------------------------------------------------
// Layout snapshot
// ---------------------------------------------------------------------------

/// Fresh page geometry for a single gesture decision.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutSnapshot {
    /// Viewport height in CSS pixels.
    pub viewport_height: f64,
    /// Live document scroll position.
    pub scroll_y: f64,
    /// One rectangle per panel, in panel order.
    pub panels: Vec<PanelRect>,
}

impl LayoutSnapshot {
    /// Number of panels measured.
    #[must_use]
    pub fn panel_count(&self) -> usize {
        self.panels.len()
    }

    /// Rectangle for `index`, if it exists.
    #[must_use]
    pub fn panel(&self, index: usize) -> Option<PanelRect> {
        self.panels.get(index).copied()
    }

    /// The panel whose top offset is the greatest offset at or above the
    /// current scroll position (sub-pixel epsilon applied). Panel 0 when the
    /// visitor has not reached the region yet.
    #[must_use]
    pub fn current_index(&self) -> usize {
        let probe = self.scroll_y + INDEX_EPSILON_PX;
        let mut current = 0;
        for (idx, rect) in self.panels.iter().enumerate() {
            if rect.top <= probe {
                current = idx;
            } else {
                break;
            }
        }
        current
    }

    /// Whether the panel's rendered height exceeds the viewport height.
    #[must_use]
    pub fn is_tall(&self, index: usize) -> bool {
        self.panel(index)
            .is_some_and(|rect| rect.height > self.viewport_height)
    }

    /// Scroll progress through a tall panel's internal height, in `[0, 1]`.
    ///
    /// 0.0 = panel top at viewport top, 1.0 = panel bottom at viewport
    /// bottom. Non-tall and unmeasurable panels always report 1.0.
    #[must_use]
    pub fn progress(&self, index: usize) -> f64 {
        let Some(rect) = self.panel(index) else {
            return 1.0;
        };
        let span = rect.height - self.viewport_height;
        if span <= 0.0 {
            return 1.0;
        }
        ((self.scroll_y - rect.top) / span).clamp(0.0, 1.0)
    }

    /// Pixels of the panel's own content left to traverse in `direction`
    /// before the panel counts as exhausted. Always 0.0 for panels shorter
    /// than the viewport.
    #[must_use]
    pub fn overflow_remaining(&self, index: usize, direction: Direction) -> f64 {
        let Some(rect) = self.panel(index) else {
            return 0.0;
        };
        let remaining = match direction {
            Direction::Forward => rect.bottom() - (self.scroll_y + self.viewport_height),
            Direction::Backward => self.scroll_y - rect.top,
        };
        remaining.max(0.0)
    }

    /// Top edge of the managed region (first panel's top).
    #[must_use]
    pub fn region_top(&self) -> f64 {
        self.panels.first().map_or(0.0, |rect| rect.top)
    }

    /// Bottom edge of the managed region (last panel's bottom).
    #[must_use]
    pub fn region_bottom(&self) -> f64 {
        self.panels.last().map_or(0.0, PanelRect::bottom)
    }

    /// Whether the region's top edge is at (or below) the viewport top: a
    /// backward gesture here belongs to the browser, not the controller.
    #[must_use]
    pub fn at_region_top(&self) -> bool {
        self.scroll_y <= self.region_top() + INDEX_EPSILON_PX
    }

    /// Whether the region's bottom edge is at (or above) the viewport bottom:
    /// a forward gesture here belongs to the browser.
    #[must_use]
    pub fn at_region_bottom(&self) -> bool {
        self.scroll_y + self.viewport_height >= self.region_bottom() - INDEX_EPSILON_PX
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
