use crate::core::geometry::Vertex;
use nalgebra::{Vector2, Vector4};
use std::ops::{Add, Mul};

/// Values handed from the vertex stage to the fragment stage.
///
/// The rasterizer blends three of these with barycentric weights, so the type
/// only needs `a + b` and `a * t`. Fragments are shaded from several threads
/// at once, hence `Send + Sync`.
pub trait Interpolatable:
    Copy + Clone + Add<Output = Self> + Mul<f32, Output = Self> + Send + Sync
{
    /// Texture coordinates carried by this varying, if any.
    fn uv(&self) -> Option<Vector2<f32>> {
        None
    }
}

/// The two programmable stages of a draw.
///
/// A shader value holds everything bound for one draw (push constants,
/// uniform blocks, textures). Each call is a pure function of that state and
/// its arguments.
pub trait Shader: Send + Sync {
    /// Per-vertex outputs interpolated across the primitive.
    type Varying: Interpolatable;

    /// Vertex stage: clip-space position plus the varyings for one vertex.
    fn vertex(&self, vertex: &Vertex) -> (Vector4<f32>, Self::Varying);

    /// Fragment stage: RGBA color for one covered sample.
    fn fragment(&self, varying: Self::Varying) -> Vector4<f32>;
}

impl Interpolatable for Vector4<f32> {}
