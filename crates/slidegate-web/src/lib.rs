#![forbid(unsafe_code)]

//! WASM frontend for slidegate.
//!
//! This crate is intentionally host-specific (web/WASM). It owns everything
//! the host-agnostic core cannot:
//! - discovering panels as a container element's children,
//! - installing and removing the instance's own wheel/touch listeners,
//! - measuring fresh [`slidegate_core::LayoutSnapshot`]s from the DOM,
//! - walking the ancestry for panel-internal scrollables,
//! - driving the active transition one `requestAnimationFrame` at a time.
//!
//! Each [`SlideGateWeb`] instance is fully self-contained: no module-level
//! listener state, so several independent instances can coexist on one page.

pub mod probe;

#[cfg(target_arch = "wasm32")]
mod driver;

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::{SlideGateOptions, SlideGateWeb};

/// Native builds compile this crate as a stub so `cargo check --workspace`
/// stays green on non-wasm targets.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default)]
pub struct SlideGateWeb;

#[cfg(not(target_arch = "wasm32"))]
impl SlideGateWeb {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}
