//! WebGPU batch backend
//!
//! Batches arrive in pixel space. Upload converts positions to NDC and
//! lowers fan and loop topologies, which WebGPU does not assemble
//! natively, to triangle and line lists. Each batch is recorded as a
//! vertex-range span and the spans replay in creation order inside a
//! single render pass when the frame finishes.

use glam::Vec2;
use wgpu::util::DeviceExt;

use super::batch::{GraphicsBackend, Topology, VertexBatch, fan_to_triangle_list, loop_to_line_list};
use super::vertex::{Vertex, colors};

/// Map a pixel coordinate (y down) to normalized device coordinates.
#[inline]
pub fn pixel_to_ndc(p: Vec2, width: u32, height: u32) -> Vec2 {
    Vec2::new(
        p.x / width as f32 * 2.0 - 1.0,
        1.0 - p.y / height as f32 * 2.0,
    )
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum SpanKind {
    Lines,
    Triangles,
}

struct DrawSpan {
    kind: SpanKind,
    start: u32,
    end: u32,
}

/// wgpu implementation of [`GraphicsBackend`].
pub struct GpuRenderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    line_pipeline: wgpu::RenderPipeline,
    triangle_pipeline: wgpu::RenderPipeline,
    size: (u32, u32),
    line_vertices: Vec<Vertex>,
    triangle_vertices: Vec<Vertex>,
    spans: Vec<DrawSpan>,
    last_error: Option<wgpu::SurfaceError>,
}

impl GpuRenderer {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
    ) -> Self {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("pinfield-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await
            .expect("Failed to create device");

        let surface_caps = surface.get_capabilities(adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[],
            immediate_size: 0,
        });

        let line_pipeline = build_pipeline(
            &device,
            &shader,
            &pipeline_layout,
            config.format,
            wgpu::PrimitiveTopology::LineList,
        );
        let triangle_pipeline = build_pipeline(
            &device,
            &shader,
            &pipeline_layout,
            config.format,
            wgpu::PrimitiveTopology::TriangleList,
        );

        Self {
            surface,
            device,
            queue,
            config,
            line_pipeline,
            triangle_pipeline,
            size: (width, height),
            line_vertices: Vec::new(),
            triangle_vertices: Vec::new(),
            spans: Vec::new(),
            last_error: None,
        }
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Surface error from the most recent presented frame, if any. The
    /// driver decides between reconfigure and log-and-continue.
    pub fn take_error(&mut self) -> Option<wgpu::SurfaceError> {
        self.last_error.take()
    }

    fn present(&mut self) -> Result<(), wgpu::SurfaceError> {
        let line_buffer = (!self.line_vertices.is_empty()).then(|| {
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("line_vertex_buffer"),
                    contents: bytemuck::cast_slice(&self.line_vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                })
        });
        let triangle_buffer = (!self.triangle_vertices.is_empty()).then(|| {
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("triangle_vertex_buffer"),
                    contents: bytemuck::cast_slice(&self.triangle_vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                })
        });

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render_encoder"),
            });

        {
            let [r, g, b, a] = colors::BACKGROUND;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: a as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            let mut bound: Option<SpanKind> = None;
            for span in &self.spans {
                if bound != Some(span.kind) {
                    match span.kind {
                        SpanKind::Lines => {
                            render_pass.set_pipeline(&self.line_pipeline);
                            if let Some(ref buffer) = line_buffer {
                                render_pass.set_vertex_buffer(0, buffer.slice(..));
                            }
                        }
                        SpanKind::Triangles => {
                            render_pass.set_pipeline(&self.triangle_pipeline);
                            if let Some(ref buffer) = triangle_buffer {
                                render_pass.set_vertex_buffer(0, buffer.slice(..));
                            }
                        }
                    }
                    bound = Some(span.kind);
                }
                render_pass.draw(span.start..span.end, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

impl GraphicsBackend for GpuRenderer {
    fn set_viewport(&mut self, width: u32, height: u32) {
        self.resize(width, height);
    }

    fn draw_batch(&mut self, batch: &VertexBatch) {
        let (w, h) = self.size;
        match batch.topology {
            Topology::LineList => {
                let start = self.line_vertices.len() as u32;
                for (i, p) in batch.positions.iter().enumerate() {
                    self.line_vertices
                        .push(Vertex::from_point(pixel_to_ndc(*p, w, h), batch.color_at(i)));
                }
                self.spans.push(DrawSpan {
                    kind: SpanKind::Lines,
                    start,
                    end: self.line_vertices.len() as u32,
                });
            }
            Topology::TriangleFan => {
                let start = self.triangle_vertices.len() as u32;
                let color = batch.color_at(0);
                for p in fan_to_triangle_list(&batch.positions) {
                    self.triangle_vertices
                        .push(Vertex::from_point(pixel_to_ndc(p, w, h), color));
                }
                self.spans.push(DrawSpan {
                    kind: SpanKind::Triangles,
                    start,
                    end: self.triangle_vertices.len() as u32,
                });
            }
            Topology::LineLoop => {
                let start = self.line_vertices.len() as u32;
                let color = batch.color_at(0);
                for p in loop_to_line_list(&batch.positions) {
                    self.line_vertices
                        .push(Vertex::from_point(pixel_to_ndc(p, w, h), color));
                }
                self.spans.push(DrawSpan {
                    kind: SpanKind::Lines,
                    start,
                    end: self.line_vertices.len() as u32,
                });
            }
        }
    }

    fn finish_frame(&mut self) {
        if let Err(err) = self.present() {
            log::warn!("frame present failed: {err:?}");
            self.last_error = Some(err);
        }
        self.line_vertices.clear();
        self.triangle_vertices.clear();
        self.spans.clear();
    }
}

fn build_pipeline(
    device: &wgpu::Device,
    shader: &wgpu::ShaderModule,
    layout: &wgpu::PipelineLayout,
    format: wgpu::TextureFormat,
    topology: wgpu::PrimitiveTopology,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("render_pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::desc()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}
