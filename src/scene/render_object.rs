use crate::gpu::layout::{BufferAddress, DrawPushConstants};
use crate::scene::material::MaterialInstance;
use crate::scene::mesh::GpuMesh;
use nalgebra::Matrix4;
use std::sync::Arc;

/// Everything one indexed draw needs.
#[derive(Debug, Clone)]
pub struct RenderObject {
    pub index_count: u32,
    pub first_index: u32,
    pub indices: Arc<[u32]>,
    pub material: Arc<MaterialInstance>,
    pub transform: Matrix4<f32>,
    pub vertex_buffer: BufferAddress,
}

impl RenderObject {
    /// Draws the whole mesh.
    pub fn from_mesh(
        mesh: &GpuMesh,
        material: Arc<MaterialInstance>,
        transform: Matrix4<f32>,
    ) -> Self {
        Self {
            index_count: mesh.indices.len() as u32,
            first_index: 0,
            indices: Arc::clone(&mesh.indices),
            material,
            transform,
            vertex_buffer: mesh.vertex_buffer,
        }
    }

    pub fn push_constants(&self) -> DrawPushConstants {
        DrawPushConstants::new(self.transform, self.vertex_buffer)
    }

    /// The slice of the index buffer this draw covers, or `None` if the range
    /// runs past its end.
    pub fn index_range(&self) -> Option<&[u32]> {
        let start = self.first_index as usize;
        let end = start.checked_add(self.index_count as usize)?;
        self.indices.get(start..end)
    }
}
