//! Rendering module
//!
//! The scene is built as a flat list of 2D draw commands each frame, then
//! executed on a Canvas2D context in the browser.

pub mod scene;
#[cfg(target_arch = "wasm32")]
pub mod canvas;

pub use scene::{Align, Color, DrawCommand, build_scene};
#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasRenderer;
