#![forbid(unsafe_code)]

//! DOM geometry probe and inner-scroll detector.
//!
//! The decision helpers at the top are plain functions over the numbers the
//! DOM reports, so they compile and test on native targets; the actual DOM
//! walkers below are wasm-only.
//!
//! The inner-scroll detector mirrors standard browser behavior: an element
//! absorbs vertical scrolling when its computed `overflow-y` is `auto` or
//! `scroll` **and** its content height exceeds its box height by more than a
//! 1 px tolerance. No special markup is required from panels.

use slidegate_core::geometry::InnerScrollEdges;

/// Whether a computed `overflow-y` value lets the element scroll vertically.
#[must_use]
pub fn overflow_can_scroll(overflow_y: &str) -> bool {
    overflow_y.contains("auto") || overflow_y.contains("scroll")
}

/// Whether the element's content actually overflows its box (1 px tolerance
/// soaks up fractional layout rounding).
#[must_use]
pub fn content_overflows(scroll_height: i32, client_height: i32) -> bool {
    scroll_height > client_height + 1
}

/// Edge state from an element's raw scroll metrics.
///
/// The DOM reports fractional `scrollTop` under non-integer zoom, but the
/// binding truncates it toward zero, so the bottom comparison carries 1 px of
/// slack (the ceil of a truncated value): at the true bottom the scroller
/// must report at-bottom, or forward gestures get released to a scroller
/// that cannot move.
#[must_use]
pub fn edges_from_metrics(
    scroll_top: i32,
    client_height: i32,
    scroll_height: i32,
) -> InnerScrollEdges {
    InnerScrollEdges {
        at_top: scroll_top <= 0,
        at_bottom: scroll_top + client_height + 1 >= scroll_height,
    }
}

#[cfg(target_arch = "wasm32")]
mod dom {
    use slidegate_core::geometry::{LayoutSnapshot, PanelRect};
    use web_sys::{Element, Window};

    use super::{InnerScrollEdges, content_overflows, edges_from_metrics, overflow_can_scroll};

    /// Measure the page fresh: live scroll position, viewport height, and one
    /// rectangle per panel. A panel that fails to measure reports height 0,
    /// which the core treats as neutral.
    pub(crate) fn layout_snapshot(window: &Window, panels: &[Element]) -> LayoutSnapshot {
        let scroll_y = window.scroll_y().unwrap_or(0.0);
        let viewport_height = window
            .inner_height()
            .ok()
            .and_then(|value| value.as_f64())
            .unwrap_or(0.0);
        let panels = panels
            .iter()
            .map(|element| {
                let rect = element.get_bounding_client_rect();
                PanelRect {
                    top: rect.top() + scroll_y,
                    height: rect.height(),
                }
            })
            .collect();
        LayoutSnapshot {
            viewport_height,
            scroll_y,
            panels,
        }
    }

    /// Walk from the gesture origin up to (and including) the active panel
    /// root, returning the edge state of the first vertically scrollable
    /// ancestor. `None` means no inner scroller claims this gesture.
    pub(crate) fn find_inner_edges(
        window: &Window,
        origin: &Element,
        boundary: &Element,
    ) -> Option<InnerScrollEdges> {
        let mut cursor = Some(origin.clone());
        while let Some(element) = cursor {
            if !boundary.contains(Some(element.as_ref())) {
                break;
            }
            if is_scrollable(window, &element) {
                return Some(edges_from_metrics(
                    element.scroll_top(),
                    element.client_height(),
                    element.scroll_height(),
                ));
            }
            cursor = element.parent_element();
        }
        None
    }

    fn is_scrollable(window: &Window, element: &Element) -> bool {
        let Ok(Some(style)) = window.get_computed_style(element) else {
            return false;
        };
        let overflow_y = style.get_property_value("overflow-y").unwrap_or_default();
        overflow_can_scroll(&overflow_y)
            && content_overflows(element.scroll_height(), element.client_height())
    }
}

#[cfg(target_arch = "wasm32")]
pub(crate) use dom::{find_inner_edges, layout_snapshot};

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
