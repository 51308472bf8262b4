//! Full-screen effects that paint the frame before any geometry is drawn.

use crate::gpu::layout::EffectPushConstants;
use nalgebra::{Vector2, Vector3, Vector4};

/// Per-frame crawl applied to star sample positions.
const STAR_DRIFT: Vector2<f32> = Vector2::new(0.2, -0.06);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    /// `data1` everywhere.
    Solid,
    /// `data1` on the top row, blending towards `data2` at the bottom.
    Gradient,
    /// `data1.xyz` fading in from black down the frame, plus a star field.
    /// `data1.w` is the star threshold: the closer to 1, the fewer stars.
    Sky,
}

/// One background program and the block pushed to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackgroundEffect {
    pub kind: EffectKind,
    pub data: EffectPushConstants,
}

impl BackgroundEffect {
    pub fn solid(color: Vector4<f32>) -> Self {
        Self::new(EffectKind::Solid, color, Vector4::zeros())
    }

    pub fn gradient(top: Vector4<f32>, bottom: Vector4<f32>) -> Self {
        Self::new(EffectKind::Gradient, top, bottom)
    }

    pub fn sky(color: Vector3<f32>, star_threshold: f32) -> Self {
        Self::new(EffectKind::Sky, color.push(star_threshold), Vector4::zeros())
    }

    fn new(kind: EffectKind, data1: Vector4<f32>, data2: Vector4<f32>) -> Self {
        Self {
            kind,
            data: EffectPushConstants::new(data1, data2, Vector4::zeros(), Vector4::zeros()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self.kind {
            EffectKind::Solid => "Solid Color",
            EffectKind::Gradient => "Gradient Color",
            EffectKind::Sky => "Sky",
        }
    }

    /// One invocation at texel `(x, y)` of a target `height` texels tall.
    pub fn shade(&self, x: usize, y: usize, height: usize) -> Vector4<f32> {
        let data1 = Vector4::from(self.data.data1);
        let v = y as f32 / height.max(1) as f32;
        match self.kind {
            EffectKind::Solid => data1,
            EffectKind::Gradient => data1.lerp(&Vector4::from(self.data.data2), v),
            EffectKind::Sky => {
                let coord = Vector2::new(x as f32, y as f32);
                let stars = stable_star_field(coord + STAR_DRIFT, data1.w);
                (data1.xyz() * v + Vector3::repeat(stars)).push(1.0)
            }
        }
    }
}

/// GLSL `fract`: always in `[0, 1)`, unlike [`f32::fract`] for negatives.
fn fract(x: f32) -> f32 {
    x - x.floor()
}

fn noise_2d(p: Vector2<f32>) -> f32 {
    fract(415.92653 * ((p.x * 37.0).cos() + (p.y * 57.0).cos()))
}

fn noisy_star_field(p: Vector2<f32>, threshold: f32) -> f32 {
    let value = noise_2d(p);
    if value >= threshold {
        ((value - threshold) / (1.0 - threshold)).powi(6)
    } else {
        0.0
    }
}

/// Bilinear blend of the field at the four surrounding lattice points, so
/// stars stay put under sub-texel drift.
fn stable_star_field(p: Vector2<f32>, threshold: f32) -> f32 {
    let (fx, fy) = (fract(p.x), fract(p.y));
    let base = p.map(f32::floor);
    let at = |dx: f32, dy: f32| noisy_star_field(base + Vector2::new(dx, dy), threshold);

    at(0.0, 0.0) * (1.0 - fx) * (1.0 - fy)
        + at(0.0, 1.0) * (1.0 - fx) * fy
        + at(1.0, 0.0) * fx * (1.0 - fy)
        + at(1.0, 1.0) * fx * fy
}
