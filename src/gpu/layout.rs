use bytemuck::{Pod, Zeroable};
use nalgebra::{Matrix4, Vector2, Vector4};

/// Opaque address of a vertex allocation, as carried in push constants.
/// Zero is the null address.
pub type BufferAddress = u64;

/// Per-draw block pushed with every draw call.
///
/// Matrices are column-major (`[column][row]`), which is also nalgebra's
/// storage order.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DrawPushConstants {
    pub world_matrix: [[f32; 4]; 4],
    pub vertex_buffer: BufferAddress,
    pub _pad: [f32; 2],
}

impl DrawPushConstants {
    pub fn new(world_matrix: Matrix4<f32>, vertex_buffer: BufferAddress) -> Self {
        Self {
            world_matrix: world_matrix.into(),
            vertex_buffer,
            _pad: [0.0; 2],
        }
    }

    pub fn world_matrix(&self) -> Matrix4<f32> {
        Matrix4::from(self.world_matrix)
    }

    pub fn vertex_buffer(&self) -> BufferAddress {
        self.vertex_buffer
    }
}

/// Scene uniform block (set 0, binding 0), rewritten once per frame.
///
/// `sun_color.w` is the sun intensity, not an alpha. Build this through
/// [`crate::scene::light::SceneData::to_gpu`] to keep that straight.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuSceneData {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub view_proj: [[f32; 4]; 4],
    pub ambient_color: [f32; 4],
    pub sun_direction: [f32; 4],
    pub sun_color: [f32; 4],
}

impl GpuSceneData {
    pub fn view(&self) -> Matrix4<f32> {
        Matrix4::from(self.view)
    }

    pub fn proj(&self) -> Matrix4<f32> {
        Matrix4::from(self.proj)
    }

    pub fn view_proj(&self) -> Matrix4<f32> {
        Matrix4::from(self.view_proj)
    }

    pub fn ambient_color(&self) -> Vector4<f32> {
        Vector4::from(self.ambient_color)
    }

    pub fn sun_direction(&self) -> Vector4<f32> {
        Vector4::from(self.sun_direction)
    }

    pub fn sun_color(&self) -> Vector4<f32> {
        Vector4::from(self.sun_color)
    }

    pub fn sun_intensity(&self) -> f32 {
        self.sun_color[3]
    }
}

/// Material uniform block (set 1, binding 0).
///
/// Padded to 256 bytes so instances can live side by side in one buffer at
/// the strictest `minUniformBufferOffsetAlignment` in common use.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MaterialConstants {
    pub color_factors: [f32; 4],
    /// x = metallic, y = roughness, z/w reserved.
    pub metal_rough_factors: [f32; 4],
    pub _pad: [[f32; 4]; 14],
}

impl MaterialConstants {
    pub fn new(color_factors: Vector4<f32>, metal_rough: Vector2<f32>) -> Self {
        Self {
            color_factors: color_factors.into(),
            metal_rough_factors: [metal_rough.x, metal_rough.y, 0.0, 0.0],
            _pad: [[0.0; 4]; 14],
        }
    }

    pub fn color_factors(&self) -> Vector4<f32> {
        Vector4::from(self.color_factors)
    }

    pub fn metal_rough_factors(&self) -> Vector2<f32> {
        Vector2::new(self.metal_rough_factors[0], self.metal_rough_factors[1])
    }
}

impl Default for MaterialConstants {
    fn default() -> Self {
        Self::new(Vector4::repeat(1.0), Vector2::new(1.0, 0.5))
    }
}

/// Push-constant block of a full-screen background effect: four vectors
/// whose meaning each effect defines.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct EffectPushConstants {
    pub data1: [f32; 4],
    pub data2: [f32; 4],
    pub data3: [f32; 4],
    pub data4: [f32; 4],
}

impl EffectPushConstants {
    pub fn new(
        data1: Vector4<f32>,
        data2: Vector4<f32>,
        data3: Vector4<f32>,
        data4: Vector4<f32>,
    ) -> Self {
        Self {
            data1: data1.into(),
            data2: data2.into(),
            data3: data3.into(),
            data4: data4.into(),
        }
    }
}

const _: () = {
    assert!(std::mem::size_of::<DrawPushConstants>() == 80);
    assert!(std::mem::size_of::<GpuSceneData>() == 240);
    assert!(std::mem::size_of::<MaterialConstants>() == 256);
    assert!(std::mem::size_of::<EffectPushConstants>() == 64);
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::offset_of;

    #[test]
    fn push_constant_offsets() {
        assert_eq!(offset_of!(DrawPushConstants, world_matrix), 0);
        assert_eq!(offset_of!(DrawPushConstants, vertex_buffer), 64);
        assert_eq!(offset_of!(DrawPushConstants, _pad), 72);
    }

    #[test]
    fn scene_block_offsets() {
        assert_eq!(offset_of!(GpuSceneData, view_proj), 128);
        assert_eq!(offset_of!(GpuSceneData, ambient_color), 192);
        assert_eq!(offset_of!(GpuSceneData, sun_direction), 208);
        assert_eq!(offset_of!(GpuSceneData, sun_color), 224);
    }

    #[test]
    fn matrices_stay_column_major() {
        let m = Matrix4::new_translation(&nalgebra::Vector3::new(1.0, 2.0, 3.0));
        let pc = DrawPushConstants::new(m, 0x30);
        assert_eq!(pc.world_matrix[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(pc.world_matrix(), m);

        let floats: &[f32] = bytemuck::cast_slice(&pc.world_matrix);
        assert_eq!(&floats[12..15], &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn reserved_material_channels_are_zero() {
        let mc = MaterialConstants::new(Vector4::new(0.5, 0.5, 0.5, 1.0), Vector2::new(0.2, 0.8));
        assert_eq!(mc.metal_rough_factors, [0.2, 0.8, 0.0, 0.0]);
        assert!(mc._pad.iter().flatten().all(|&f| f == 0.0));
    }
}
