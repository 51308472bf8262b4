use crate::error::{Error, Result};
use crate::gpu::layout::GpuSceneData;
use nalgebra::{Matrix4, Vector3, Vector4};

/// The single directional light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sun {
    /// Unit vector pointing from the surface *towards* the sun.
    pub direction: Vector3<f32>,
    pub color: Vector3<f32>,
    pub intensity: f32,
}

impl Sun {
    pub fn new(direction: Vector3<f32>, color: Vector3<f32>, intensity: f32) -> Result<Self> {
        let direction = direction
            .try_normalize(1e-6)
            .ok_or_else(|| {
                Error::InvalidLight(format!("sun direction {direction:?} has no length"))
            })?;
        Ok(Self {
            direction,
            color,
            intensity,
        })
    }
}

impl Default for Sun {
    fn default() -> Self {
        Self {
            direction: Vector3::new(0.0, 1.0, 0.5).normalize(),
            color: Vector3::repeat(1.0),
            intensity: 1.0,
        }
    }
}

/// Per-frame scene state with the sun intensity kept as its own field.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneData {
    pub view: Matrix4<f32>,
    pub proj: Matrix4<f32>,
    pub ambient_color: Vector4<f32>,
    pub sun: Sun,
}

impl Default for SceneData {
    fn default() -> Self {
        Self {
            view: Matrix4::identity(),
            proj: Matrix4::identity(),
            ambient_color: Vector4::new(0.1, 0.1, 0.1, 1.0),
            sun: Sun::default(),
        }
    }
}

impl SceneData {
    /// Packs into the uniform layout: `view_proj = proj * view`, sun
    /// direction with `w = 0`, and the intensity in `sun_color.w`.
    pub fn to_gpu(&self) -> GpuSceneData {
        GpuSceneData {
            view: self.view.into(),
            proj: self.proj.into(),
            view_proj: (self.proj * self.view).into(),
            ambient_color: self.ambient_color.into(),
            sun_direction: self.sun.direction.push(0.0).into(),
            sun_color: self.sun.color.push(self.sun.intensity).into(),
        }
    }
}
