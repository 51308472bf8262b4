use bytemuck::{Pod, Zeroable};
use nalgebra::{Point3, Vector2, Vector3, Vector4};

/// One vertex record exactly as the vertex stage reads it from memory.
///
/// UV is split around the normal so every vec3 is followed by a scalar and
/// the record packs into 48 bytes without implicit padding:
///
/// | offset | field      |
/// |--------|------------|
/// | 0      | position   |
/// | 12     | uv_x       |
/// | 16     | normal     |
/// | 28     | uv_y       |
/// | 32     | color      |
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv_x: f32,
    pub normal: [f32; 3],
    pub uv_y: f32,
    pub color: [f32; 4],
}

impl Vertex {
    /// Byte distance between consecutive records in a vertex buffer.
    pub const STRIDE: usize = std::mem::size_of::<Self>();

    pub fn new(
        position: Point3<f32>,
        normal: Vector3<f32>,
        uv: Vector2<f32>,
        color: Vector4<f32>,
    ) -> Self {
        Self {
            position: position.coords.into(),
            uv_x: uv.x,
            normal: normal.into(),
            uv_y: uv.y,
            color: color.into(),
        }
    }

    /// A vertex carrying only position and color.
    pub fn colored(position: Point3<f32>, color: Vector4<f32>) -> Self {
        Self::new(position, Vector3::zeros(), Vector2::zeros(), color)
    }

    pub fn position(&self) -> Point3<f32> {
        Point3::from(self.position)
    }

    pub fn normal(&self) -> Vector3<f32> {
        Vector3::from(self.normal)
    }

    pub fn uv(&self) -> Vector2<f32> {
        Vector2::new(self.uv_x, self.uv_y)
    }

    pub fn color(&self) -> Vector4<f32> {
        Vector4::from(self.color)
    }
}

const _: () = assert!(Vertex::STRIDE == 48);
