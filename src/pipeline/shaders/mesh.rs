use crate::core::geometry::Vertex;
use crate::core::pipeline::{Interpolatable, Shader};
use crate::gpu::layout::{DrawPushConstants, GpuSceneData};
use crate::scene::material::MaterialInstance;
use nalgebra::{Matrix4, Vector2, Vector3, Vector4};
use std::ops::{Add, Mul};

/// Interpolated from the vertex stage to the fragment stage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshVarying {
    /// World space, not renormalized.
    pub normal: Vector3<f32>,
    /// Vertex color already multiplied by the material color factor.
    pub color: Vector3<f32>,
    pub uv: Vector2<f32>,
}

impl Add for MeshVarying {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            normal: self.normal + other.normal,
            color: self.color + other.color,
            uv: self.uv + other.uv,
        }
    }
}

impl Mul<f32> for MeshVarying {
    type Output = Self;

    fn mul(self, scalar: f32) -> Self {
        Self {
            normal: self.normal * scalar,
            color: self.color * scalar,
            uv: self.uv * scalar,
        }
    }
}

impl Interpolatable for MeshVarying {
    fn uv(&self) -> Option<Vector2<f32>> {
        Some(self.uv)
    }
}

/// Lambert + ambient shading of a textured mesh.
///
/// One value is built per draw from the bound state: the scene block (set 0),
/// the material (set 1) and the pushed per-draw constants.
pub struct MeshShader<'a> {
    pub scene: &'a GpuSceneData,
    pub material: &'a MaterialInstance,
    pub draw: DrawPushConstants,

    world_matrix: Matrix4<f32>,
    view_proj: Matrix4<f32>,
    sun_direction: Vector3<f32>,
    ambient: Vector3<f32>,
    color_factor: Vector3<f32>,
}

impl<'a> MeshShader<'a> {
    pub fn new(
        scene: &'a GpuSceneData,
        material: &'a MaterialInstance,
        draw: DrawPushConstants,
    ) -> Self {
        Self {
            scene,
            material,
            draw,
            world_matrix: draw.world_matrix(),
            view_proj: scene.view_proj(),
            sun_direction: scene.sun_direction().xyz(),
            ambient: scene.ambient_color().xyz(),
            color_factor: material.constants.color_factors().xyz(),
        }
    }
}

impl Shader for MeshShader<'_> {
    type Varying = MeshVarying;

    fn vertex(&self, vertex: &Vertex) -> (Vector4<f32>, Self::Varying) {
        let clip = self.view_proj * (self.world_matrix * vertex.position().to_homogeneous());
        // w = 0 drops the translation column.
        let normal = (self.world_matrix * vertex.normal().push(0.0)).xyz();
        let color = vertex.color().xyz().component_mul(&self.color_factor);

        (
            clip,
            MeshVarying {
                normal,
                color,
                uv: vertex.uv(),
            },
        )
    }

    fn fragment(&self, varying: Self::Varying) -> Vector4<f32> {
        let light = varying.normal.dot(&self.sun_direction).max(0.0);

        let resources = &self.material.resources;
        let texel = resources
            .color_texture
            .sample(&resources.color_sampler, varying.uv);
        let sampled = varying.color.component_mul(&texel.xyz());
        let ambient = varying.color.component_mul(&self.ambient);

        let color = sampled * light * self.scene.sun_intensity() + ambient;
        color.push(1.0)
    }
}
