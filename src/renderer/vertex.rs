//! Vertex type for GPU upload

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

/// 2D vertex with position and color, matching the shader input layout.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn from_point(p: Vec2, color: [f32; 4]) -> Self {
        Self::new(p.x, p.y, color)
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Colors for playfield elements
pub mod colors {
    use crate::field::Color;

    pub const WALL: Color = Color::rgb(64, 64, 160);
    pub const FLIPPER: Color = Color::rgb(0, 255, 0);
    pub const BUMPER: Color = Color::rgb(0, 153, 255);
    pub const BUMPER_RIM: Color = Color::rgb(200, 220, 255);
    pub const BALL: Color = Color::rgb(255, 255, 160);
    pub const LAUNCH_LANE: Color = Color::rgb(102, 102, 102);
    pub const FPS_TALLY: Color = Color::rgb(255, 0, 0);
    pub const BACKGROUND: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
}
