//! Playfield traits and the shared handle both threads go through.
//!
//! The game model lives outside this crate. The renderer and the input
//! mapper only see it through the [`Playfield`] trait, behind a single
//! `Arc<Mutex<_>>` that serializes frame drawing against touch handling.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use glam::Vec2;

/// 8-bit RGB color as authored by field elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Normalized RGBA components for GPU upload.
    #[inline]
    pub fn to_f32(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            1.0,
        ]
    }
}

/// Primitive drawing surface handed to elements each frame.
///
/// Coordinates are world units; the implementation applies the current
/// frame's transform. Two implementations exist: the batching target in
/// `renderer::frame` and the immediate raster target in `renderer::canvas`.
pub trait DrawTarget {
    /// Line segment between two world-space points.
    fn draw_line(&mut self, from: Vec2, to: Vec2, color: Color);
    /// Solid circle.
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);
    /// Circle outline.
    fn frame_circle(&mut self, center: Vec2, radius: f32, color: Color);
}

/// A field element that knows how to draw itself.
pub trait Drawable {
    /// Called once per frame with the active draw target.
    fn draw(&self, target: &mut dyn DrawTarget);
}

/// The game model as seen by the rendering and input core.
///
/// Geometry is read-only from here. The only mutations this crate performs
/// are the control calls driven by touch input: game start, ball launch,
/// dead-ball sweep, and flipper engagement flags.
pub trait Playfield {
    /// Logical width of the playfield in world units.
    fn world_width(&self) -> f32;
    /// Logical height of the playfield in world units.
    fn world_height(&self) -> f32;

    fn game_in_progress(&self) -> bool;
    fn reset_for_level(&mut self, level: u32);
    fn start_game(&mut self);
    /// Remove balls that have drained since the last check.
    fn handle_dead_balls(&mut self);
    /// Number of balls currently in play.
    fn ball_count(&self) -> usize;
    fn launch_ball(&mut self);

    /// Elements in draw order.
    fn elements(&self) -> &[Box<dyn Drawable + Send>];
    /// Draw the balls on top of the elements.
    fn draw_balls(&self, target: &mut dyn DrawTarget);

    fn set_left_flippers_engaged(&mut self, engaged: bool);
    fn set_right_flippers_engaged(&mut self, engaged: bool);
    fn set_all_flippers_engaged(&mut self, engaged: bool);
}

/// Shared handle to the playfield, cloned into the renderer and the input
/// mapper.
pub type SharedField<F> = Arc<Mutex<F>>;

/// Lock the field, recovering the guard if another thread poisoned it.
pub fn lock_field<F: Playfield + ?Sized>(field: &Mutex<F>) -> MutexGuard<'_, F> {
    field.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Wrap a field in the shared handle.
pub fn shared<F: Playfield>(field: F) -> SharedField<F> {
    Arc::new(Mutex::new(field))
}
