#![forbid(unsafe_code)]

//! WASM frontend for Cutup Studio.
//!
//! Binds [`cutup_core`] to the browser:
//! - the page's controls and phrase list (`web-sys` DOM),
//! - `fetch` for the generation request,
//! - the async clipboard API and blob downloads,
//! - `window` error / `unhandledrejection` listeners and a panic hook,
//! - `tracing` output forwarded to the browser console.
//!
//! JS usage:
//!
//! ```js
//! import init, { CutupStudio } from "./pkg/cutup_web.js";
//! await init();
//! const studio = new CutupStudio(JSON.stringify({ log_filter: "debug" }));
//! studio.start();
//! ```

pub mod calendar;
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
mod object_url;

#[cfg(target_arch = "wasm32")]
mod console;
#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod hooks;
#[cfg(target_arch = "wasm32")]
mod platform;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::CutupStudio;

/// Native builds compile this crate as a stub so `cargo check --workspace` stays
/// green on non-wasm targets.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default)]
pub struct CutupStudio;

#[cfg(not(target_arch = "wasm32"))]
impl CutupStudio {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self
    }
}
