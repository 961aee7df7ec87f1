//! Pinfield - 2D playfield rendering and touch input for pinball-style games
//!
//! Core modules:
//! - `field`: traits the game model implements, plus the shared handle
//!   that serializes rendering against input
//! - `renderer`: transform cache, circle tessellation, per-frame vertex
//!   batching, WebGPU and raster backends
//! - `input`: touch-to-flipper mapping
//! - `settings`: render and input preferences
//!
//! The physics and game rules live with the embedder. This crate draws
//! the field every frame and feeds control signals back into it.

pub mod field;
pub mod input;
pub mod renderer;
pub mod settings;

pub use field::{Color, DrawTarget, Drawable, Playfield, SharedField, lock_field, shared};
pub use input::{InputMapper, TouchAction, TouchCapability, TouchEvent};
pub use renderer::{
    CanvasRenderer, FieldRenderer, FrameStats, GpuRenderer, HeadlessBackend, PixelCanvas,
};
pub use settings::RenderSettings;

/// Driver configuration constants
pub mod consts {
    /// Cadence the demo render loop aims for.
    pub const TARGET_FPS: u32 = 60;
    /// Frames in the FPS averaging window.
    pub const FPS_WINDOW: usize = 60;
}
