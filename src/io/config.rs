use crate::core::rasterizer::CullMode;
use crate::error::{Error, Result};
use crate::scene::material::MaterialPass;
use crate::scene::texture::Sampler;
use nalgebra::Vector3;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub sun: SunConfig,
    #[serde(default = "default_ambient")]
    pub ambient: [f32; 3],
    #[serde(default)]
    pub objects: Vec<ObjectConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            render: RenderConfig::default(),
            camera: CameraConfig::default(),
            sun: SunConfig::default(),
            ambient: default_ambient(),
            objects: vec![
                ObjectConfig {
                    shape: Shape::Quad,
                    scale: [6.0, 1.0, 6.0],
                    texture: "grey".to_string(),
                    ..ObjectConfig::default()
                },
                ObjectConfig {
                    shape: Shape::Cube,
                    position: [-1.2, 0.5, 0.0],
                    rotation: [0.0, 30.0, 0.0],
                    texture: "checker".to_string(),
                    sampler: SamplerKind::Nearest,
                    ..ObjectConfig::default()
                },
                ObjectConfig {
                    shape: Shape::Sphere,
                    position: [1.2, 0.6, 0.0],
                    scale: [0.6, 0.6, 0.6],
                    color_factor: [0.9, 0.3, 0.2, 1.0],
                    metallic: 0.0,
                    roughness: 0.4,
                    ..ObjectConfig::default()
                },
                ObjectConfig {
                    shape: Shape::Triangle,
                    position: [0.0, 1.4, -1.0],
                    vertex_color: Some([0.1, 0.3, 0.6, 1.0]),
                    pass: PassKind::Transparent,
                    ..ObjectConfig::default()
                },
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_width")]
    pub width: usize,
    #[serde(default = "default_height")]
    pub height: usize,
    #[serde(default = "default_samples")]
    pub samples: usize,
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default = "default_clear_color")]
    pub clear_color: [f32; 3],
    /// Encode the PNG with the sRGB curve, as an sRGB swapchain would.
    #[serde(default = "default_true")]
    pub srgb_output: bool,
    /// Overrides every material's cull mode when set.
    #[serde(default)]
    pub cull_mode: Option<CullModeKind>,
    #[serde(default = "default_false")]
    pub wireframe: bool,
    /// Effect painted before any geometry. `solid` fills with `clear_color`.
    #[serde(default)]
    pub background: BackgroundKind,
    #[serde(default = "default_gradient_top")]
    pub gradient_top: [f32; 3],
    #[serde(default = "default_gradient_bottom")]
    pub gradient_bottom: [f32; 3],
    #[serde(default = "default_sky_color")]
    pub sky_color: [f32; 3],
    /// Noise level a star needs; in `(0, 1]`, higher is sparser.
    #[serde(default = "default_star_threshold")]
    pub star_threshold: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            samples: default_samples(),
            output: default_output(),
            clear_color: default_clear_color(),
            srgb_output: true,
            cull_mode: None,
            wireframe: false,
            background: BackgroundKind::default(),
            gradient_top: default_gradient_top(),
            gradient_bottom: default_gradient_bottom(),
            sky_color: default_sky_color(),
            star_threshold: default_star_threshold(),
        }
    }
}

fn default_width() -> usize {
    800
}
fn default_height() -> usize {
    600
}
fn default_samples() -> usize {
    2
}
fn default_output() -> String {
    "output.png".to_string()
}
fn default_clear_color() -> [f32; 3] {
    [0.05, 0.05, 0.08]
}
fn default_ambient() -> [f32; 3] {
    [0.1, 0.1, 0.1]
}
fn default_gradient_top() -> [f32; 3] {
    [0.2, 0.2, 0.3]
}
fn default_gradient_bottom() -> [f32; 3] {
    [0.05, 0.05, 0.1]
}
fn default_sky_color() -> [f32; 3] {
    [0.1, 0.2, 0.4]
}
fn default_star_threshold() -> f32 {
    0.97
}
fn default_false() -> bool {
    false
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundKind {
    #[default]
    Solid,
    Gradient,
    Sky,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CullModeKind {
    None,
    Front,
    Back,
}

impl From<CullModeKind> for CullMode {
    fn from(kind: CullModeKind) -> Self {
        match kind {
            CullModeKind::None => CullMode::None,
            CullModeKind::Front => CullMode::Front,
            CullModeKind::Back => CullMode::Back,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionKind {
    #[default]
    Perspective,
    Orthographic,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "default_camera_position")]
    pub position: [f32; 3],
    #[serde(default = "default_camera_target")]
    pub target: [f32; 3],
    #[serde(default = "default_up")]
    pub up: [f32; 3],
    /// Vertical field of view in degrees.
    #[serde(default = "default_fov")]
    pub fov: f32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
    #[serde(default)]
    pub projection: ProjectionKind,
    #[serde(default = "default_ortho_height")]
    pub ortho_height: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: default_camera_position(),
            target: default_camera_target(),
            up: default_up(),
            fov: default_fov(),
            near: default_near(),
            far: default_far(),
            projection: ProjectionKind::Perspective,
            ortho_height: default_ortho_height(),
        }
    }
}

fn default_camera_position() -> [f32; 3] {
    [0.0, 2.5, 5.0]
}
fn default_camera_target() -> [f32; 3] {
    [0.0, 0.3, 0.0]
}
fn default_up() -> [f32; 3] {
    [0.0, 1.0, 0.0]
}
fn default_fov() -> f32 {
    45.0
}
fn default_near() -> f32 {
    0.1
}
fn default_far() -> f32 {
    100.0
}
fn default_ortho_height() -> f32 {
    4.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct SunConfig {
    /// Points from the surface towards the sun.
    #[serde(default = "default_sun_direction")]
    pub direction: [f32; 3],
    #[serde(default = "default_sun_color")]
    pub color: [f32; 3],
    #[serde(default = "default_sun_intensity")]
    pub intensity: f32,
}

impl Default for SunConfig {
    fn default() -> Self {
        Self {
            direction: default_sun_direction(),
            color: default_sun_color(),
            intensity: default_sun_intensity(),
        }
    }
}

fn default_sun_direction() -> [f32; 3] {
    [0.4, 1.0, 0.6]
}
fn default_sun_color() -> [f32; 3] {
    [1.0, 0.95, 0.85]
}
fn default_sun_intensity() -> f32 {
    1.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Triangle,
    Quad,
    #[default]
    Cube,
    Sphere,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplerKind {
    Nearest,
    #[default]
    Linear,
    NearestClamp,
    LinearClamp,
}

impl From<SamplerKind> for Sampler {
    fn from(kind: SamplerKind) -> Self {
        match kind {
            SamplerKind::Nearest => Sampler::NEAREST,
            SamplerKind::Linear => Sampler::LINEAR,
            SamplerKind::NearestClamp => Sampler::NEAREST_CLAMP,
            SamplerKind::LinearClamp => Sampler::LINEAR_CLAMP,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassKind {
    #[default]
    Opaque,
    Transparent,
    Other,
}

impl From<PassKind> for MaterialPass {
    fn from(kind: PassKind) -> Self {
        match kind {
            PassKind::Opaque => MaterialPass::MainColor,
            PassKind::Transparent => MaterialPass::Transparent,
            PassKind::Other => MaterialPass::Other,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectConfig {
    #[serde(default)]
    pub shape: Shape,

    // --- Transform ---
    #[serde(default)]
    pub position: [f32; 3],
    /// Euler angles in degrees, applied X then Y then Z.
    #[serde(default)]
    pub rotation: [f32; 3],
    #[serde(default = "default_scale")]
    pub scale: [f32; 3],

    // --- Material ---
    /// Replaces the generated white vertex colors.
    pub vertex_color: Option<[f32; 4]>,
    #[serde(default = "default_color_factor")]
    pub color_factor: [f32; 4],
    #[serde(default = "default_metallic")]
    pub metallic: f32,
    #[serde(default = "default_roughness")]
    pub roughness: f32,
    /// Image path, or one of the built-ins: white, grey, black, error, checker.
    #[serde(default = "default_texture")]
    pub texture: String,
    #[serde(default)]
    pub sampler: SamplerKind,
    #[serde(default)]
    pub pass: PassKind,
}

impl Default for ObjectConfig {
    fn default() -> Self {
        Self {
            shape: Shape::default(),
            position: [0.0; 3],
            rotation: [0.0; 3],
            scale: default_scale(),
            vertex_color: None,
            color_factor: default_color_factor(),
            metallic: default_metallic(),
            roughness: default_roughness(),
            texture: default_texture(),
            sampler: SamplerKind::default(),
            pass: PassKind::default(),
        }
    }
}

fn default_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}
fn default_color_factor() -> [f32; 4] {
    [1.0, 1.0, 1.0, 1.0]
}
fn default_metallic() -> f32 {
    1.0
}
fn default_roughness() -> f32 {
    0.5
}
fn default_texture() -> String {
    "white".to_string()
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let render = &self.render;
        if render.width == 0 || render.height == 0 {
            return Err(Error::InvalidConfig(format!(
                "resolution {}x{} has no pixels",
                render.width, render.height
            )));
        }
        if render.samples == 0 || render.samples > 8 {
            return Err(Error::InvalidConfig(format!(
                "samples must be in 1..=8, got {}",
                render.samples
            )));
        }

        if !(render.star_threshold > 0.0 && render.star_threshold <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "star_threshold must be in (0, 1], got {}",
                render.star_threshold
            )));
        }

        let camera = &self.camera;
        if !(camera.near > 0.0 && camera.far > camera.near) {
            return Err(Error::InvalidConfig(format!(
                "camera planes need 0 < near < far, got near={} far={}",
                camera.near, camera.far
            )));
        }
        if camera.projection == ProjectionKind::Perspective
            && !(camera.fov > 0.0 && camera.fov < 180.0)
        {
            return Err(Error::InvalidConfig(format!(
                "fov must be between 0 and 180 degrees, got {}",
                camera.fov
            )));
        }
        if camera.projection == ProjectionKind::Orthographic && camera.ortho_height <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "ortho_height must be positive, got {}",
                camera.ortho_height
            )));
        }

        // look_at needs a view direction and an up vector off that axis.
        let forward = Vector3::from(camera.target) - Vector3::from(camera.position);
        let side = forward.cross(&Vector3::from(camera.up));
        if forward.norm() < 1e-6 {
            return Err(Error::InvalidConfig(format!(
                "camera position {:?} equals its target",
                camera.position
            )));
        }
        if side.norm() < 1e-6 * forward.norm() {
            return Err(Error::InvalidConfig(format!(
                "camera up {:?} is zero or parallel to the view direction",
                camera.up
            )));
        }
        Ok(())
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.render.width as f32 / self.render.height as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_takes_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.render.width, 800);
        assert_eq!(config.render.samples, 2);
        assert_eq!(config.ambient, [0.1, 0.1, 0.1]);
        assert!(config.objects.is_empty());
        assert!(config.render.cull_mode.is_none());
    }

    #[test]
    fn objects_parse_with_enum_names() {
        let config = Config::parse(
            r#"
            [render]
            width = 64
            height = 32
            cull_mode = "back"

            [[objects]]
            shape = "sphere"
            sampler = "linear_clamp"
            pass = "transparent"
            texture = "error"
            color_factor = [0.5, 0.5, 0.5, 1.0]
            "#,
        )
        .unwrap();
        assert_eq!(config.aspect_ratio(), 2.0);
        assert_eq!(config.render.cull_mode, Some(CullModeKind::Back));

        let obj = &config.objects[0];
        assert_eq!(obj.shape, Shape::Sphere);
        assert_eq!(Sampler::from(obj.sampler), Sampler::LINEAR_CLAMP);
        assert_eq!(MaterialPass::from(obj.pass), MaterialPass::Transparent);
        assert_eq!(obj.scale, [1.0, 1.0, 1.0]);
        assert_eq!(obj.metallic, 1.0);
    }

    #[test]
    fn unknown_shape_is_a_parse_error() {
        let err = Config::parse("[[objects]]\nshape = \"teapot\"\n").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn inverted_depth_range_is_rejected() {
        let err = Config::parse("[camera]\nnear = 10.0\nfar = 1.0\n").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn degenerate_camera_basis_is_rejected() {
        for camera in [
            "position = [1.0, 2.0, 3.0]\ntarget = [1.0, 2.0, 3.0]",
            "position = [0.0, 5.0, 0.0]\ntarget = [0.0, 0.0, 0.0]\nup = [0.0, 1.0, 0.0]",
            "up = [0.0, 0.0, 0.0]",
        ] {
            let err = Config::parse(&format!("[camera]\n{camera}\n")).unwrap_err();
            assert!(matches!(err, Error::InvalidConfig(_)), "{camera}: {err}");
        }
    }

    #[test]
    fn background_keys_parse() {
        let config = Config::parse(
            r#"
            [render]
            background = "sky"
            sky_color = [0.3, 0.1, 0.0]
            star_threshold = 0.99
            "#,
        )
        .unwrap();
        assert_eq!(config.render.background, BackgroundKind::Sky);
        assert_eq!(config.render.sky_color, [0.3, 0.1, 0.0]);
        assert_eq!(config.render.gradient_top, [0.2, 0.2, 0.3]);

        let err = Config::parse("[render]\nstar_threshold = 1.5\n").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        let err = Config::parse("[render]\nbackground = \"plasma\"\n").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Config::load("/definitely/not/here.toml").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }

    #[test]
    fn default_scene_is_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert!(config.objects.iter().any(|o| o.pass == PassKind::Transparent));
    }

    #[test]
    fn shipped_scene_file_parses() {
        let config = Config::load(concat!(env!("CARGO_MANIFEST_DIR"), "/scene.toml")).unwrap();
        assert_eq!(config.ambient, [0.1, 0.1, 0.1]);
        assert_eq!(config.objects.len(), 4);
        assert_eq!(config.objects[3].pass, PassKind::Transparent);
    }
}
