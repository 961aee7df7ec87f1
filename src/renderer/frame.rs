//! Batched frame rendering
//!
//! One `draw_frame` call runs the whole cycle: lock the field, refresh the
//! transform snapshot, open the frame's batches, walk the elements, draw
//! the balls and the optional FPS tally, flush to the backend, unlock.
//! Between calls the renderer is idle and holds no lock. With no field
//! attached a frame is a no-op that neither blocks nor allocates.

use glam::Vec2;
use log::{info, warn};

use super::batch::{BatchSet, FrameStats, GraphicsBackend, Topology};
use super::shapes::circle_points;
use super::transform::Transform;
use super::vertex::colors;
use crate::field::{Color, DrawTarget, Playfield, SharedField, lock_field};
use crate::settings::RenderSettings;

/// Renders a shared playfield through a [`GraphicsBackend`].
pub struct FieldRenderer<F: Playfield> {
    field: Option<SharedField<F>>,
    transform: Transform,
    batches: BatchSet,
    viewport: (u32, u32),
    fps: u32,
    frames_drawn: u64,
    pub settings: RenderSettings,
}

impl<F: Playfield> FieldRenderer<F> {
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            field: None,
            transform: Transform::new(),
            batches: BatchSet::new(),
            viewport: (1, 1),
            fps: 0,
            frames_drawn: 0,
            settings,
        }
    }

    /// Attach the field to render. Frames before this call are no-ops.
    pub fn attach_field(&mut self, field: SharedField<F>) {
        info!("field attached to renderer");
        self.field = Some(field);
    }

    pub fn detach_field(&mut self) {
        info!("field detached from renderer");
        self.field = None;
    }

    pub fn has_field(&self) -> bool {
        self.field.is_some()
    }

    /// Update the viewport, clamping degenerate sizes to 1x1, and forward
    /// it to the backend.
    pub fn resize(&mut self, backend: &mut dyn GraphicsBackend, width: u32, height: u32) {
        if width == 0 || height == 0 {
            warn!("viewport resize to {width}x{height} clamped");
        }
        let clamped = (width.max(1), height.max(1));
        self.viewport = clamped;
        backend.set_viewport(clamped.0, clamped.1);
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// The FPS value the tally overlay encodes. Frame timing is the
    /// driver's job; the renderer only displays the number.
    pub fn set_fps(&mut self, fps: u32) {
        self.fps = fps;
    }

    /// Transform snapshot of the most recent frame, for hit-testing.
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    /// Render one frame. Returns `None` without touching the backend when
    /// no field is attached.
    pub fn draw_frame(&mut self, backend: &mut dyn GraphicsBackend) -> Option<FrameStats> {
        let field = self.field.as_ref()?.clone();
        let field = lock_field(&field);

        let (vw, vh) = self.viewport;
        self.transform.refresh(
            vw as f32,
            vh as f32,
            field.world_width(),
            field.world_height(),
            self.settings.zoom,
        );
        self.batches.begin_frame();

        let mut target = BatchTarget {
            transform: &self.transform,
            batches: &mut self.batches,
        };
        for element in field.elements() {
            element.draw(&mut target);
        }
        field.draw_balls(&mut target);
        if self.settings.show_fps {
            draw_fps_tally(&mut target, self.fps);
        }

        let stats = self.batches.end_frame(backend);
        self.frames_drawn += 1;
        Some(stats)
    }
}

/// Draw target that transforms world coordinates and routes primitives
/// into the frame's batches.
struct BatchTarget<'a> {
    transform: &'a Transform,
    batches: &'a mut BatchSet,
}

impl BatchTarget<'_> {
    fn circle(&mut self, topology: Topology, center: Vec2, radius: f32, color: Color) {
        let id = self.batches.add_polygon_batch(topology);
        self.batches.add_color(id, color);
        for p in circle_points(center, radius) {
            self.batches.add_vertex(id, self.transform.world_to_pixel(p));
        }
    }
}

impl DrawTarget for BatchTarget<'_> {
    fn draw_line(&mut self, from: Vec2, to: Vec2, color: Color) {
        let id = self.batches.line_batch();
        self.batches.add_vertex(id, self.transform.world_to_pixel(from));
        self.batches.add_vertex(id, self.transform.world_to_pixel(to));
        self.batches.add_color(id, color);
        self.batches.add_color(id, color);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.circle(Topology::TriangleFan, center, radius, color);
    }

    fn frame_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.circle(Topology::LineLoop, center, radius, color);
    }
}

/// Draw the FPS value as tally marks near the world origin: one short
/// horizontal line per tens count in the first column, one per ones count
/// in the second.
pub fn draw_fps_tally(target: &mut dyn DrawTarget, fps: u32) {
    const BAR: f32 = 3.0;
    const GAP: f32 = 1.0;

    let mut x = 1.0;
    for count in [fps / 10, fps % 10] {
        let mut y = 1.0;
        for _ in 0..count {
            target.draw_line(
                Vec2::new(x, y),
                Vec2::new(x + BAR, y),
                colors::FPS_TALLY,
            );
            y += GAP;
        }
        x += BAR + GAP;
    }
}
