use crate::core::rasterizer::{BlendMode, CullMode, FrontFace, RasterState};
use crate::gpu::layout::MaterialConstants;
use crate::scene::texture::{DefaultSamplers, DefaultTextures, Sampler, Texture};
use nalgebra::{Vector2, Vector4};
use std::sync::Arc;

/// Which pipeline variant a material draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaterialPass {
    #[default]
    MainColor,
    Transparent,
    Other,
}

impl MaterialPass {
    pub fn is_transparent(self) -> bool {
        matches!(self, Self::Transparent)
    }
}

/// Metallic-roughness factors as authored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialParams {
    pub base_color_factor: Vector4<f32>,
    pub metallic: f32,
    pub roughness: f32,
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self {
            base_color_factor: Vector4::repeat(1.0),
            metallic: 1.0,
            roughness: 0.5,
        }
    }
}

impl MaterialParams {
    pub fn to_constants(&self) -> MaterialConstants {
        MaterialConstants::new(
            self.base_color_factor,
            Vector2::new(self.metallic, self.roughness),
        )
    }
}

/// Images and samplers bound to set 1.
#[derive(Debug, Clone)]
pub struct MaterialResources {
    pub color_texture: Arc<Texture>,
    pub color_sampler: Sampler,
    pub metal_rough_texture: Arc<Texture>,
    pub metal_rough_sampler: Sampler,
}

impl MaterialResources {
    /// White images with linear sampling: the material's factors show
    /// through unchanged.
    pub fn defaults(textures: &DefaultTextures, samplers: &DefaultSamplers) -> Self {
        Self {
            color_texture: Arc::clone(&textures.white),
            color_sampler: samplers.linear,
            metal_rough_texture: Arc::clone(&textures.white),
            metal_rough_sampler: samplers.linear,
        }
    }
}

/// A material ready to draw with: pass, uniform block contents, and the
/// resources of its descriptor set.
#[derive(Debug, Clone)]
pub struct MaterialInstance {
    pub pass: MaterialPass,
    pub constants: MaterialConstants,
    pub resources: MaterialResources,
}

impl MaterialInstance {
    pub fn raster_state(&self) -> RasterState {
        MetallicRoughness::pipeline_state(self.pass)
    }
}

/// The glTF metallic-roughness material family: one opaque and one
/// transparent pipeline sharing the same shading programs.
pub struct MetallicRoughness;

impl MetallicRoughness {
    /// Opaque passes depth test and write with blending off; the transparent
    /// pass skips depth entirely and adds onto the target.
    pub fn pipeline_state(pass: MaterialPass) -> RasterState {
        let base = RasterState {
            cull_mode: CullMode::None,
            front_face: FrontFace::CounterClockwise,
            ..RasterState::default()
        };
        match pass {
            MaterialPass::MainColor | MaterialPass::Other => base,
            MaterialPass::Transparent => RasterState {
                depth_test: false,
                depth_write: false,
                blend: BlendMode::Additive,
                ..base
            },
        }
    }

    pub fn write_material(
        pass: MaterialPass,
        params: &MaterialParams,
        resources: MaterialResources,
    ) -> MaterialInstance {
        MaterialInstance {
            pass,
            constants: params.to_constants(),
            resources,
        }
    }
}
