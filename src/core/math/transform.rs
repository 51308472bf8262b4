use nalgebra::{Matrix4, Point2, Point3, Vector3, Vector4};

/// Builders for the matrices a host feeds into the uniform and push-constant
/// blocks.
///
/// World and view space are right-handed with +Y up and the camera looking
/// down -Z. Projections target the Vulkan clip volume: `-w <= x, y <= w`,
/// `0 <= z <= w`, and +Y in clip space points *down* the framebuffer, so the
/// projections negate Y to keep world-up at the top of the image.
pub struct TransformFactory;

#[rustfmt::skip]
impl TransformFactory {
    pub fn translation(offset: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_translation(offset)
    }

    pub fn scaling(scale: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_nonuniform_scaling(scale)
    }

    /// Rotation of `angle_rad` around `axis` (need not be normalized).
    pub fn rotation(axis: &Vector3<f32>, angle_rad: f32) -> Matrix4<f32> {
        let k = axis.normalize();
        let (s, c) = angle_rad.sin_cos();
        let t = 1.0 - c;

        Matrix4::new(
            t * k.x * k.x + c,       t * k.x * k.y - k.z * s, t * k.x * k.z + k.y * s, 0.0,
            t * k.x * k.y + k.z * s, t * k.y * k.y + c,       t * k.y * k.z - k.x * s, 0.0,
            t * k.x * k.z - k.y * s, t * k.y * k.z + k.x * s, t * k.z * k.z + c,       0.0,
            0.0,                     0.0,                     0.0,                     1.0,
        )
    }

    /// Euler rotation applied X first, then Y, then Z.
    pub fn rotation_xyz(angles_rad: &Vector3<f32>) -> Matrix4<f32> {
        Self::rotation(&Vector3::z(), angles_rad.z)
            * Self::rotation(&Vector3::y(), angles_rad.y)
            * Self::rotation(&Vector3::x(), angles_rad.x)
    }

    /// Translation * rotation * scale.
    pub fn trs(
        position: &Vector3<f32>,
        rotation_rad: &Vector3<f32>,
        scale: &Vector3<f32>,
    ) -> Matrix4<f32> {
        Self::translation(position) * Self::rotation_xyz(rotation_rad) * Self::scaling(scale)
    }

    /// World -> view transform for a camera at `eye` looking at `target`.
    pub fn look_at(eye: &Point3<f32>, target: &Point3<f32>, up: &Vector3<f32>) -> Matrix4<f32> {
        let back = (eye - target).normalize();
        let right = up.cross(&back).normalize();
        let true_up = back.cross(&right);

        Matrix4::new(
            right.x,   right.y,   right.z,   -right.dot(&eye.coords),
            true_up.x, true_up.y, true_up.z, -true_up.dot(&eye.coords),
            back.x,    back.y,    back.z,    -back.dot(&eye.coords),
            0.0,       0.0,       0.0,       1.0,
        )
    }

    /// Perspective projection onto depth `[0, 1]` (near maps to 0).
    pub fn perspective(aspect_ratio: f32, fov_y_rad: f32, near: f32, far: f32) -> Matrix4<f32> {
        let f = 1.0 / (fov_y_rad * 0.5).tan();
        let range = 1.0 / (near - far);

        Matrix4::new(
            f / aspect_ratio, 0.0, 0.0,          0.0,
            0.0,              -f,  0.0,          0.0,
            0.0,              0.0, far * range,  near * far * range,
            0.0,              0.0, -1.0,         0.0,
        )
    }

    /// Orthographic projection onto depth `[0, 1]` (near maps to 0).
    pub fn orthographic(
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    ) -> Matrix4<f32> {
        let rl = 1.0 / (right - left);
        let tb = 1.0 / (top - bottom);
        let range = 1.0 / (near - far);

        Matrix4::new(
            2.0 * rl, 0.0,       0.0,   -(right + left) * rl,
            0.0,      -2.0 * tb, 0.0,   (top + bottom) * tb,
            0.0,      0.0,       range, near * range,
            0.0,      0.0,       0.0,   1.0,
        )
    }
}

/// Clip space -> normalized device coordinates.
#[inline]
pub fn perspective_divide(clip: &Vector4<f32>) -> Point3<f32> {
    if clip.w.abs() > 1e-6 {
        Point3::new(clip.x / clip.w, clip.y / clip.w, clip.z / clip.w)
    } else {
        Point3::origin()
    }
}

/// Viewport transform. NDC (-1, -1) lands on the top-left corner of the
/// framebuffer.
#[inline]
pub fn ndc_to_screen(ndc_x: f32, ndc_y: f32, width: f32, height: f32) -> Point2<f32> {
    Point2::new((ndc_x + 1.0) * 0.5 * width, (ndc_y + 1.0) * 0.5 * height)
}
