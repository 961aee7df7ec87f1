//! Per-frame vertex batching
//!
//! Field elements issue many small draws per frame. Instead of one
//! graphics call per shape, draws accumulate into batches grouped by
//! primitive topology and flush as one backend call each at end of frame.
//! All line segments of a frame share one batch opened at `begin_frame`;
//! every filled or outlined circle gets a batch of its own carrying a
//! single solid color.
//!
//! Batch storage is reused across frames; a flush clears contents but
//! keeps capacity.

use glam::Vec2;

use crate::field::Color;

/// Primitive assembly mode of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// Independent segments, two vertices each, one color per vertex.
    LineList,
    /// Convex polygon fanned from its first vertex, one color.
    TriangleFan,
    /// Closed outline, one color.
    LineLoop,
}

/// Handle to a batch within the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchId(usize);

/// One batch's vertices and colors, in pixel space.
#[derive(Debug)]
pub struct VertexBatch {
    pub topology: Topology,
    pub positions: Vec<Vec2>,
    /// One entry per vertex for lines; a single entry for polygons.
    pub colors: Vec<[f32; 4]>,
}

impl VertexBatch {
    fn new(topology: Topology) -> Self {
        Self {
            topology,
            positions: Vec::new(),
            colors: Vec::new(),
        }
    }

    fn reset(&mut self, topology: Topology) {
        self.topology = topology;
        self.positions.clear();
        self.colors.clear();
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Color for vertex `i`; a single-entry color list applies to all.
    #[inline]
    pub fn color_at(&self, i: usize) -> [f32; 4] {
        if self.colors.len() == 1 {
            self.colors[0]
        } else {
            self.colors.get(i).copied().unwrap_or([1.0; 4])
        }
    }
}

/// Counts reported by a frame flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Non-empty batches handed to the backend.
    pub batches: usize,
    /// Vertices across those batches, before topology lowering.
    pub vertices: usize,
}

/// Sink for flushed batches. Implemented by the wgpu renderer and by
/// [`HeadlessBackend`].
pub trait GraphicsBackend {
    /// Viewport size in pixels, at setup and on every resize.
    fn set_viewport(&mut self, width: u32, height: u32);
    /// One non-empty batch, in creation order within the frame.
    fn draw_batch(&mut self, batch: &VertexBatch);
    /// The frame's batches are complete; present.
    fn finish_frame(&mut self);
}

/// Accumulates the current frame's batches.
#[derive(Debug, Default)]
pub struct BatchSet {
    batches: Vec<VertexBatch>,
    live: usize,
}

impl BatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the previous frame's contents and open the shared line batch.
    pub fn begin_frame(&mut self) {
        self.live = 0;
        self.alloc(Topology::LineList);
    }

    /// The line batch shared by every `draw_line` of the frame.
    #[inline]
    pub fn line_batch(&self) -> BatchId {
        BatchId(0)
    }

    /// Open a dedicated batch for one fan or loop polygon.
    pub fn add_polygon_batch(&mut self, topology: Topology) -> BatchId {
        self.alloc(topology)
    }

    fn alloc(&mut self, topology: Topology) -> BatchId {
        if self.live < self.batches.len() {
            self.batches[self.live].reset(topology);
        } else {
            self.batches.push(VertexBatch::new(topology));
        }
        self.live += 1;
        BatchId(self.live - 1)
    }

    /// Append a pixel-space vertex to a batch.
    #[inline]
    pub fn add_vertex(&mut self, id: BatchId, p: Vec2) {
        self.batches[id.0].positions.push(p);
    }

    /// Append a color entry to a batch.
    #[inline]
    pub fn add_color(&mut self, id: BatchId, color: Color) {
        self.batches[id.0].colors.push(color.to_f32());
    }

    /// Flush every non-empty batch to the backend in creation order, then
    /// clear. Empty batches are skipped, so a frame with no draws issues
    /// no batch calls.
    pub fn end_frame(&mut self, backend: &mut dyn GraphicsBackend) -> FrameStats {
        let mut stats = FrameStats::default();
        for batch in &self.batches[..self.live] {
            if batch.positions.is_empty() {
                continue;
            }
            backend.draw_batch(batch);
            stats.batches += 1;
            stats.vertices += batch.vertex_count();
        }
        backend.finish_frame();
        for batch in &mut self.batches[..self.live] {
            batch.positions.clear();
            batch.colors.clear();
        }
        self.live = 0;
        stats
    }
}

/// Expand triangle-fan positions to a triangle list: (v0, vi, vi+1) per
/// triangle. WebGPU has no fan topology.
pub fn fan_to_triangle_list(points: &[Vec2]) -> Vec<Vec2> {
    if points.len() < 3 {
        return Vec::new();
    }
    let mut out = Vec::with_capacity((points.len() - 2) * 3);
    for i in 1..points.len() - 1 {
        out.push(points[0]);
        out.push(points[i]);
        out.push(points[i + 1]);
    }
    out
}

/// Expand closed-loop positions to line-list segment pairs, closing edge
/// last. WebGPU has no loop topology.
pub fn loop_to_line_list(points: &[Vec2]) -> Vec<Vec2> {
    if points.len() < 2 {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(points.len() * 2);
    for i in 0..points.len() {
        out.push(points[i]);
        out.push(points[(i + 1) % points.len()]);
    }
    out
}

/// Backend that records draw calls instead of submitting them. Stands in
/// for a GPU surface in tests and in the headless demo driver.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    pub viewport: (u32, u32),
    /// Topology and vertex count of every batch drawn since the last take.
    pub drawn: Vec<(Topology, usize)>,
    pub frames_finished: usize,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain the recorded batches, leaving the backend ready for the next
    /// frame.
    pub fn take_drawn(&mut self) -> Vec<(Topology, usize)> {
        std::mem::take(&mut self.drawn)
    }
}

impl GraphicsBackend for HeadlessBackend {
    fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
    }

    fn draw_batch(&mut self, batch: &VertexBatch) {
        self.drawn.push((batch.topology, batch.vertex_count()));
    }

    fn finish_frame(&mut self) {
        self.frames_finished += 1;
    }
}
