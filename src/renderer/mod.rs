//! Playfield rendering
//!
//! Geometry flows world space -> transform -> pixel-space batches ->
//! backend. `frame` drives the batched path; `canvas` is the immediate
//! raster variant for targets without a GPU surface.

pub mod batch;
pub mod canvas;
pub mod frame;
pub mod pipeline;
pub mod shapes;
pub mod transform;
pub mod vertex;

pub use batch::{BatchSet, FrameStats, GraphicsBackend, HeadlessBackend, Topology};
pub use canvas::{CanvasRenderer, PixelCanvas};
pub use frame::FieldRenderer;
pub use pipeline::GpuRenderer;
pub use transform::Transform;
