use crate::core::math::transform::TransformFactory;
use nalgebra::{Matrix4, Point3, Vector3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Perspective { fov_y_rad: f32 },
    Orthographic { height: f32 },
}

/// Source of the view and projection matrices in the scene block.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
    pub projection: Projection,
}

impl Camera {
    pub fn new_perspective(
        position: Point3<f32>,
        target: Point3<f32>,
        fov_y_rad: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    ) -> Self {
        Self {
            position,
            target,
            up: Vector3::y(),
            aspect_ratio,
            near,
            far,
            projection: Projection::Perspective { fov_y_rad },
        }
    }

    pub fn new_orthographic(
        position: Point3<f32>,
        target: Point3<f32>,
        height: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    ) -> Self {
        Self {
            projection: Projection::Orthographic { height },
            ..Self::new_perspective(position, target, 0.0, aspect_ratio, near, far)
        }
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        TransformFactory::look_at(&self.position, &self.target, &self.up)
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        match self.projection {
            Projection::Perspective { fov_y_rad } => {
                TransformFactory::perspective(self.aspect_ratio, fov_y_rad, self.near, self.far)
            }
            Projection::Orthographic { height } => {
                let half_h = height * 0.5;
                let half_w = half_h * self.aspect_ratio;
                TransformFactory::orthographic(
                    -half_w, half_w, -half_h, half_h, self.near, self.far,
                )
            }
        }
    }
}
