//! World-to-pixel coordinate transform
//!
//! The playfield is authored in a fixed logical coordinate system with the
//! y axis pointing up. The viewport is pixels with y pointing down. One
//! uniform scale maps world units to pixels, chosen so the whole field fits
//! the viewport with aspect ratio preserved; offsets center the scaled
//! field. The snapshot is refreshed once at the start of each frame and
//! every draw call in that frame observes the same values.

use glam::Vec2;

/// Cached scale and offsets for the current frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct Transform {
    scale: f32,
    x_offset: f32,
    y_offset: f32,
    viewport_height: f32,
    initialized: bool,
}

impl Transform {
    pub const fn new() -> Self {
        Self {
            scale: 0.0,
            x_offset: 0.0,
            y_offset: 0.0,
            viewport_height: 0.0,
            initialized: false,
        }
    }

    /// Recompute the snapshot from the current viewport and world sizes.
    ///
    /// Callers clamp the viewport to at least 1x1 before calling; a
    /// zero-size viewport here produces a degenerate scale.
    pub fn refresh(
        &mut self,
        viewport_width: f32,
        viewport_height: f32,
        world_width: f32,
        world_height: f32,
        zoom: f32,
    ) {
        let fit = (viewport_width / world_width).min(viewport_height / world_height);
        self.scale = fit * zoom;
        self.x_offset = (viewport_width - world_width * self.scale) / 2.0;
        self.y_offset = (viewport_height - world_height * self.scale) / 2.0;
        self.viewport_height = viewport_height;
        self.initialized = true;
    }

    /// Uniform world-to-pixel scale factor.
    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    #[inline]
    pub fn world_to_pixel_x(&self, x: f32) -> f32 {
        debug_assert!(self.initialized, "transform used before first refresh");
        x * self.scale + self.x_offset
    }

    /// Pixel y grows downward, world y grows upward.
    #[inline]
    pub fn world_to_pixel_y(&self, y: f32) -> f32 {
        debug_assert!(self.initialized, "transform used before first refresh");
        self.viewport_height - y * self.scale - self.y_offset
    }

    /// Map a world-space point to pixel space.
    #[inline]
    pub fn world_to_pixel(&self, p: Vec2) -> Vec2 {
        Vec2::new(self.world_to_pixel_x(p.x), self.world_to_pixel_y(p.y))
    }

    /// Inverse mapping, for hit-testing.
    #[inline]
    pub fn pixel_to_world(&self, px: f32, py: f32) -> Vec2 {
        debug_assert!(self.initialized, "transform used before first refresh");
        Vec2::new(
            (px - self.x_offset) / self.scale,
            (self.viewport_height - py - self.y_offset) / self.scale,
        )
    }
}
