//! Immediate raster rendering
//!
//! CPU fallback for targets without a GPU surface. Primitives rasterize
//! into an RGBA8 pixel buffer the moment they are issued; there is no
//! batching. For a given field and viewport this path and the batched path
//! map geometry through the same transform, so their output lines up.

use glam::Vec2;

use super::frame::draw_fps_tally;
use super::shapes::circle_points;
use super::transform::Transform;
use crate::field::{Color, DrawTarget, Playfield, SharedField, lock_field};
use crate::settings::RenderSettings;

/// RGBA8 pixel buffer with y-down pixel coordinates.
pub struct PixelCanvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl PixelCanvas {
    /// Degenerate dimensions are clamped to 1.
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            pixels: vec![0; (width * height * 4) as usize],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 data, row-major from the top-left corner.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn clear(&mut self, color: [u8; 4]) {
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&color);
        }
    }

    /// Write one pixel; coordinates outside the buffer are ignored.
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, color: [u8; 4]) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let offset = ((y as u32 * self.width + x as u32) * 4) as usize;
        self.pixels[offset..offset + 4].copy_from_slice(&color);
    }

    /// Read one pixel; `None` outside the buffer, mirroring the write
    /// side's silent ignore.
    pub fn pixel_at(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = ((y * self.width + x) * 4) as usize;
        Some([
            self.pixels[offset],
            self.pixels[offset + 1],
            self.pixels[offset + 2],
            self.pixels[offset + 3],
        ])
    }

    /// Bresenham line between two pixel coordinates.
    pub fn draw_line(&mut self, mut x0: i32, mut y0: i32, x1: i32, y1: i32, color: [u8; 4]) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.set_pixel(x0, y0, color);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    /// Line with a stroke width of 1 or 2 pixels.
    pub fn draw_line_width(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        width: u32,
        color: [u8; 4],
    ) {
        self.draw_line(x0, y0, x1, y1, color);
        if width > 1 {
            // Offsets along both axes keep a 2 px stroke gap-free at any
            // slope.
            self.draw_line(x0 + 1, y0, x1 + 1, y1, color);
            self.draw_line(x0, y0 + 1, x1, y1 + 1, color);
        }
    }

    /// Solid circle via horizontal span fill.
    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: [u8; 4]) {
        if radius <= 0.0 {
            return;
        }
        let r2 = radius * radius;
        let y_min = (cy - radius).floor() as i32;
        let y_max = (cy + radius).ceil() as i32;
        for y in y_min..=y_max {
            let dy = y as f32 + 0.5 - cy;
            let span = r2 - dy * dy;
            if span < 0.0 {
                continue;
            }
            let half = span.sqrt();
            let x_start = (cx - half).round() as i32;
            let x_end = (cx + half).round() as i32;
            for x in x_start..x_end {
                self.set_pixel(x, y, color);
            }
        }
    }
}

/// Immediate-mode counterpart of [`super::frame::FieldRenderer`].
pub struct CanvasRenderer<F: Playfield> {
    field: Option<SharedField<F>>,
    transform: Transform,
    fps: u32,
    pub settings: RenderSettings,
}

impl<F: Playfield> CanvasRenderer<F> {
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            field: None,
            transform: Transform::new(),
            fps: 0,
            settings,
        }
    }

    pub fn attach_field(&mut self, field: SharedField<F>) {
        self.field = Some(field);
    }

    pub fn detach_field(&mut self) {
        self.field = None;
    }

    pub fn set_fps(&mut self, fps: u32) {
        self.fps = fps;
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Rasterize one frame into the canvas. Returns false without drawing
    /// when no field is attached.
    pub fn draw_frame(&mut self, canvas: &mut PixelCanvas) -> bool {
        let Some(field) = self.field.as_ref() else {
            return false;
        };
        let field = field.clone();
        let field = lock_field(&field);

        self.transform.refresh(
            canvas.width() as f32,
            canvas.height() as f32,
            field.world_width(),
            field.world_height(),
            self.settings.zoom,
        );
        canvas.clear([0, 0, 0, 255]);

        let mut target = CanvasTarget {
            transform: &self.transform,
            canvas,
            line_width: self.settings.line_width(),
        };
        for element in field.elements() {
            element.draw(&mut target);
        }
        field.draw_balls(&mut target);
        if self.settings.show_fps {
            draw_fps_tally(&mut target, self.fps);
        }
        true
    }
}

struct CanvasTarget<'a> {
    transform: &'a Transform,
    canvas: &'a mut PixelCanvas,
    line_width: u32,
}

#[inline]
fn rgba(color: Color) -> [u8; 4] {
    [color.r, color.g, color.b, 255]
}

impl DrawTarget for CanvasTarget<'_> {
    fn draw_line(&mut self, from: Vec2, to: Vec2, color: Color) {
        let a = self.transform.world_to_pixel(from);
        let b = self.transform.world_to_pixel(to);
        self.canvas.draw_line_width(
            a.x.round() as i32,
            a.y.round() as i32,
            b.x.round() as i32,
            b.y.round() as i32,
            self.line_width,
            rgba(color),
        );
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        let c = self.transform.world_to_pixel(center);
        self.canvas
            .fill_circle(c.x, c.y, radius * self.transform.scale(), rgba(color));
    }

    fn frame_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        let points: Vec<Vec2> = circle_points(center, radius)
            .map(|p| self.transform.world_to_pixel(p))
            .collect();
        for i in 0..points.len() {
            let a = points[i];
            let b = points[(i + 1) % points.len()];
            self.canvas.draw_line_width(
                a.x.round() as i32,
                a.y.round() as i32,
                b.x.round() as i32,
                b.y.round() as i32,
                self.line_width,
                rgba(color),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{Drawable, shared};
    use crate::renderer::vertex::colors;

    #[test]
    fn test_set_pixel_is_bounds_checked() {
        let mut canvas = PixelCanvas::new(4, 4);
        canvas.set_pixel(-1, 0, [255; 4]);
        canvas.set_pixel(0, 4, [255; 4]);
        canvas.set_pixel(4, 0, [255; 4]);
        assert!(canvas.pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_horizontal_line_covers_span() {
        let mut canvas = PixelCanvas::new(8, 4);
        canvas.draw_line(1, 2, 5, 2, [10, 20, 30, 255]);
        for x in 1..=5 {
            assert_eq!(canvas.pixel_at(x, 2), Some([10, 20, 30, 255]));
        }
        assert_eq!(canvas.pixel_at(0, 2), Some([0, 0, 0, 0]));
        assert_eq!(canvas.pixel_at(6, 2), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_diagonal_line_hits_endpoints() {
        let mut canvas = PixelCanvas::new(8, 8);
        canvas.draw_line(0, 0, 7, 7, [255; 4]);
        assert_eq!(canvas.pixel_at(0, 0), Some([255; 4]));
        assert_eq!(canvas.pixel_at(7, 7), Some([255; 4]));
        assert_eq!(canvas.pixel_at(3, 3), Some([255; 4]));
    }

    #[test]
    fn test_thick_line_widens_stroke() {
        let mut canvas = PixelCanvas::new(8, 4);
        canvas.draw_line_width(1, 1, 5, 1, 2, [255; 4]);
        assert_eq!(canvas.pixel_at(3, 1), Some([255; 4]));
        assert_eq!(canvas.pixel_at(3, 2), Some([255; 4]));
    }

    #[test]
    fn test_fill_circle_covers_center_not_corners() {
        let mut canvas = PixelCanvas::new(16, 16);
        canvas.fill_circle(8.0, 8.0, 4.0, [255; 4]);
        assert_eq!(canvas.pixel_at(8, 8), Some([255; 4]));
        assert_eq!(canvas.pixel_at(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(canvas.pixel_at(15, 15), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_pixel_read_out_of_range_is_none() {
        let canvas = PixelCanvas::new(4, 4);
        assert_eq!(canvas.pixel_at(4, 0), None);
        assert_eq!(canvas.pixel_at(0, 4), None);
        assert!(canvas.pixel_at(3, 3).is_some());
    }

    #[test]
    fn test_degenerate_canvas_clamped() {
        let canvas = PixelCanvas::new(0, 0);
        assert_eq!((canvas.width(), canvas.height()), (1, 1));
        assert_eq!(canvas.pixels().len(), 4);
    }

    struct OneBallField;

    impl Playfield for OneBallField {
        fn world_width(&self) -> f32 {
            400.0
        }
        fn world_height(&self) -> f32 {
            300.0
        }
        fn game_in_progress(&self) -> bool {
            true
        }
        fn reset_for_level(&mut self, _level: u32) {}
        fn start_game(&mut self) {}
        fn handle_dead_balls(&mut self) {}
        fn ball_count(&self) -> usize {
            1
        }
        fn launch_ball(&mut self) {}
        fn elements(&self) -> &[Box<dyn Drawable + Send>] {
            &[]
        }
        fn draw_balls(&self, target: &mut dyn DrawTarget) {
            target.fill_circle(Vec2::new(100.0, 150.0), 5.0, colors::BALL);
        }
        fn set_left_flippers_engaged(&mut self, _engaged: bool) {}
        fn set_right_flippers_engaged(&mut self, _engaged: bool) {}
        fn set_all_flippers_engaged(&mut self, _engaged: bool) {}
    }

    #[test]
    fn test_no_field_leaves_canvas_untouched() {
        let mut r: CanvasRenderer<OneBallField> = CanvasRenderer::new(RenderSettings::default());
        let mut canvas = PixelCanvas::new(8, 8);
        assert!(!r.draw_frame(&mut canvas));
        assert!(canvas.pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_ball_rasterizes_at_transformed_position() {
        let mut r = CanvasRenderer::new(RenderSettings::default());
        r.attach_field(shared(OneBallField));
        let mut canvas = PixelCanvas::new(800, 600);
        assert!(r.draw_frame(&mut canvas));

        // World (100, 150) maps to pixel (200, 300) at scale 2.
        let c = r.transform().world_to_pixel(Vec2::new(100.0, 150.0));
        assert_eq!((c.x, c.y), (200.0, 300.0));
        let ball = colors::BALL;
        assert_eq!(canvas.pixel_at(200, 300), Some([ball.r, ball.g, ball.b, 255]));
        // Background stays cleared to opaque black.
        assert_eq!(canvas.pixel_at(5, 5), Some([0, 0, 0, 255]));
    }

    #[test]
    fn test_detach_stops_rasterizing() {
        let mut r = CanvasRenderer::new(RenderSettings::default());
        r.attach_field(shared(OneBallField));
        let mut canvas = PixelCanvas::new(32, 32);
        assert!(r.draw_frame(&mut canvas));

        r.detach_field();
        assert!(!r.draw_frame(&mut canvas));
    }

    #[test]
    fn test_batched_and_raster_paths_agree_on_pixels() {
        use crate::renderer::batch::{GraphicsBackend, VertexBatch};
        use crate::renderer::frame::FieldRenderer;

        struct DiagWall;

        impl Drawable for DiagWall {
            fn draw(&self, target: &mut dyn DrawTarget) {
                target.draw_line(Vec2::new(40.0, 60.0), Vec2::new(360.0, 240.0), colors::WALL);
            }
        }

        struct WallField {
            elements: Vec<Box<dyn Drawable + Send>>,
        }

        impl Playfield for WallField {
            fn world_width(&self) -> f32 {
                400.0
            }
            fn world_height(&self) -> f32 {
                300.0
            }
            fn game_in_progress(&self) -> bool {
                true
            }
            fn reset_for_level(&mut self, _level: u32) {}
            fn start_game(&mut self) {}
            fn handle_dead_balls(&mut self) {}
            fn ball_count(&self) -> usize {
                0
            }
            fn launch_ball(&mut self) {}
            fn elements(&self) -> &[Box<dyn Drawable + Send>] {
                &self.elements
            }
            fn draw_balls(&self, _target: &mut dyn DrawTarget) {}
            fn set_left_flippers_engaged(&mut self, _engaged: bool) {}
            fn set_right_flippers_engaged(&mut self, _engaged: bool) {}
            fn set_all_flippers_engaged(&mut self, _engaged: bool) {}
        }

        #[derive(Default)]
        struct PositionRecorder {
            lines: Vec<Vec2>,
        }

        impl GraphicsBackend for PositionRecorder {
            fn set_viewport(&mut self, _width: u32, _height: u32) {}
            fn draw_batch(&mut self, batch: &VertexBatch) {
                self.lines.extend_from_slice(&batch.positions);
            }
            fn finish_frame(&mut self) {}
        }

        let field = shared(WallField {
            elements: vec![Box::new(DiagWall)],
        });

        let mut batched = FieldRenderer::new(RenderSettings::default());
        batched.attach_field(field.clone());
        let mut recorder = PositionRecorder::default();
        batched.resize(&mut recorder, 800, 600);
        batched.draw_frame(&mut recorder).unwrap();

        let mut raster = CanvasRenderer::new(RenderSettings::default());
        raster.attach_field(field);
        let mut canvas = PixelCanvas::new(800, 600);
        assert!(raster.draw_frame(&mut canvas));

        // Same viewport, same transform: the batched endpoints land on
        // pixels the raster path colored.
        assert_eq!(recorder.lines.len(), 2);
        let wall = colors::WALL;
        for p in &recorder.lines {
            assert_eq!(
                canvas.pixel_at(p.x.round() as u32, p.y.round() as u32),
                Some([wall.r, wall.g, wall.b, 255])
            );
        }
    }
}
