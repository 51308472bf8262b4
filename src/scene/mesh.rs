use crate::core::geometry::Vertex;
use crate::error::{Error, Result};
use crate::gpu::layout::BufferAddress;
use crate::scene::vertex_pool::VertexPool;
use nalgebra::{Point3, Vector2, Vector3, Vector4};
use std::f32::consts::PI;
use std::sync::Arc;

/// Host-side geometry before upload. Triangles wind counter-clockwise when
/// seen from the side their normals point to.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Replaces every vertex color.
    pub fn with_color(mut self, color: Vector4<f32>) -> Self {
        for v in &mut self.vertices {
            v.color = color.into();
        }
        self
    }

    pub fn triangle() -> Self {
        let n = Vector3::z();
        let white = Vector4::repeat(1.0);
        Self::new(
            vec![
                Vertex::new(Point3::new(0.0, 0.5, 0.0), n, Vector2::new(0.5, 0.0), white),
                Vertex::new(Point3::new(-0.5, -0.5, 0.0), n, Vector2::new(0.0, 1.0), white),
                Vertex::new(Point3::new(0.5, -0.5, 0.0), n, Vector2::new(1.0, 1.0), white),
            ],
            vec![0, 1, 2],
        )
    }

    /// `size`x`size` square in the XZ plane facing +Y.
    pub fn quad(size: f32) -> Self {
        let h = size * 0.5;
        let n = Vector3::y();
        let white = Vector4::repeat(1.0);
        Self::new(
            vec![
                Vertex::new(Point3::new(-h, 0.0, -h), n, Vector2::new(0.0, 0.0), white),
                Vertex::new(Point3::new(-h, 0.0, h), n, Vector2::new(0.0, 1.0), white),
                Vertex::new(Point3::new(h, 0.0, h), n, Vector2::new(1.0, 1.0), white),
                Vertex::new(Point3::new(h, 0.0, -h), n, Vector2::new(1.0, 0.0), white),
            ],
            vec![0, 1, 2, 0, 2, 3],
        )
    }

    /// Axis-aligned cube with flat per-face normals.
    pub fn cube(size: f32) -> Self {
        let h = size * 0.5;
        let white = Vector4::repeat(1.0);
        // (normal, tangent u, tangent v) per face; u x v = normal.
        let faces = [
            (Vector3::x(), -Vector3::z(), Vector3::y()),
            (-Vector3::x(), Vector3::z(), Vector3::y()),
            (Vector3::y(), Vector3::x(), -Vector3::z()),
            (-Vector3::y(), Vector3::x(), Vector3::z()),
            (Vector3::z(), Vector3::x(), Vector3::y()),
            (-Vector3::z(), -Vector3::x(), Vector3::y()),
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, u, v) in faces {
            let base = vertices.len() as u32;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let p = (normal + u * su + v * sv) * h;
                let uv = Vector2::new((su + 1.0) * 0.5, (1.0 - sv) * 0.5);
                vertices.push(Vertex::new(Point3::from(p), normal, uv, white));
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        Self::new(vertices, indices)
    }

    /// Latitude/longitude sphere. `rings` and `segments` are clamped to at
    /// least 2 and 3.
    pub fn uv_sphere(radius: f32, rings: u32, segments: u32) -> Self {
        let rings = rings.max(2);
        let segments = segments.max(3);
        let white = Vector4::repeat(1.0);

        let mut vertices = Vec::with_capacity(((rings + 1) * (segments + 1)) as usize);
        for r in 0..=rings {
            let v = r as f32 / rings as f32;
            let theta = v * PI;
            for s in 0..=segments {
                let u = s as f32 / segments as f32;
                let phi = u * 2.0 * PI;
                let n = Vector3::new(theta.sin() * phi.sin(), theta.cos(), theta.sin() * phi.cos());
                vertices.push(Vertex::new(Point3::from(n * radius), n, Vector2::new(u, v), white));
            }
        }

        let stride = segments + 1;
        let mut indices = Vec::with_capacity((rings * segments * 6) as usize);
        for r in 0..rings {
            for s in 0..segments {
                let a = r * stride + s;
                let b = a + stride;
                indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
            }
        }
        Self::new(vertices, indices)
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// A mesh whose vertices live in a [`VertexPool`].
#[derive(Debug, Clone)]
pub struct GpuMesh {
    pub vertex_buffer: BufferAddress,
    pub vertex_count: usize,
    pub indices: Arc<[u32]>,
}

impl GpuMesh {
    /// Uploads the vertices; indices stay on the host. Every index is checked
    /// against the vertex count here.
    pub fn upload(pool: &VertexPool, mesh: &Mesh) -> Result<Self> {
        if let Some(&bad) = mesh
            .indices
            .iter()
            .find(|&&i| i as usize >= mesh.vertices.len())
        {
            return Err(Error::VertexIndexOutOfBounds {
                handle: 0,
                index: bad,
                len: mesh.vertices.len(),
            });
        }

        let vertex_buffer = pool.upload(&mesh.vertices)?;
        Ok(Self {
            vertex_buffer,
            vertex_count: mesh.vertices.len(),
            indices: Arc::from(mesh.indices.as_slice()),
        })
    }
}
