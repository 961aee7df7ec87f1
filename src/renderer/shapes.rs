//! Circle tessellation
//!
//! Circles are drawn as fixed-resolution polygons. The unit-circle sample
//! table is computed once on first use and shared by every fill and outline
//! draw; per-circle work is one multiply-add per point. Raising
//! [`CIRCLE_SEGMENTS`] trades draw cost for smoothness and changes nothing
//! else.

use std::f32::consts::TAU;
use std::sync::LazyLock;

use glam::Vec2;

/// Number of points approximating a circle.
pub const CIRCLE_SEGMENTS: usize = 12;

static UNIT_CIRCLE: LazyLock<[Vec2; CIRCLE_SEGMENTS]> = LazyLock::new(|| {
    std::array::from_fn(|i| {
        let theta = i as f32 / CIRCLE_SEGMENTS as f32 * TAU;
        Vec2::new(theta.cos(), theta.sin())
    })
});

/// The unit-circle sample table, counter-clockwise from angle 0.
#[inline]
pub fn unit_circle() -> &'static [Vec2; CIRCLE_SEGMENTS] {
    &UNIT_CIRCLE
}

/// Points of a circle with the given center and radius, in table order.
pub fn circle_points(center: Vec2, radius: f32) -> impl Iterator<Item = Vec2> {
    UNIT_CIRCLE.iter().map(move |u| center + radius * *u)
}
