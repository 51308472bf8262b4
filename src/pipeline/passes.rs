use crate::core::color::linear_to_srgb;
use crate::core::framebuffer::FrameBuffer;
use crate::core::math::transform::TransformFactory;
use crate::error::Result;
use crate::io::config::{BackgroundKind, Config, ObjectConfig, ProjectionKind, Shape};
use crate::pipeline::background::BackgroundEffect;
use crate::pipeline::renderer::{DrawContext, DrawStats, Renderer};
use crate::scene::camera::Camera;
use crate::scene::light::{SceneData, Sun};
use crate::scene::material::{MaterialParams, MaterialResources, MetallicRoughness};
use crate::scene::mesh::{GpuMesh, Mesh};
use crate::scene::render_object::RenderObject;
use crate::scene::texture::{DefaultSamplers, DefaultTextures, Texture, WHITE};
use crate::scene::vertex_pool::VertexPool;
use log::{debug, info, warn};
use nalgebra::{Matrix4, Point3, Vector3, Vector4};
use rayon::prelude::*;
use std::sync::Arc;

const SPHERE_RINGS: u32 = 16;
const SPHERE_SEGMENTS: u32 = 32;
const CHECKER_SIZE: u32 = 8;

/// Everything a frame draws from, built once from a [`Config`].
pub struct SceneResources {
    pub pool: VertexPool,
    pub textures: DefaultTextures,
    pub samplers: DefaultSamplers,
    pub camera: Camera,
    pub scene: SceneData,
    pub objects: Vec<RenderObject>,
}

pub fn build_camera(config: &Config) -> Camera {
    let cam = &config.camera;
    let position = Point3::from(cam.position);
    let target = Point3::from(cam.target);
    let mut camera = match cam.projection {
        ProjectionKind::Perspective => Camera::new_perspective(
            position,
            target,
            cam.fov.to_radians(),
            config.aspect_ratio(),
            cam.near,
            cam.far,
        ),
        ProjectionKind::Orthographic => Camera::new_orthographic(
            position,
            target,
            cam.ortho_height,
            config.aspect_ratio(),
            cam.near,
            cam.far,
        ),
    };
    camera.up = Vector3::from(cam.up);
    camera
}

pub fn build_background(config: &Config) -> BackgroundEffect {
    let render = &config.render;
    match render.background {
        BackgroundKind::Solid => {
            BackgroundEffect::solid(Vector3::from(render.clear_color).push(1.0))
        }
        BackgroundKind::Gradient => BackgroundEffect::gradient(
            Vector3::from(render.gradient_top).push(1.0),
            Vector3::from(render.gradient_bottom).push(1.0),
        ),
        BackgroundKind::Sky => {
            BackgroundEffect::sky(Vector3::from(render.sky_color), render.star_threshold)
        }
    }
}

pub fn build_scene(config: &Config) -> Result<SceneResources> {
    let camera = build_camera(config);
    let sun = Sun::new(
        Vector3::from(config.sun.direction),
        Vector3::from(config.sun.color),
        config.sun.intensity,
    )?;
    let scene = SceneData {
        view: camera.view_matrix(),
        proj: camera.projection_matrix(),
        ambient_color: Vector3::from(config.ambient).push(1.0),
        sun,
    };

    let pool = VertexPool::new();
    let textures = DefaultTextures::default();
    let samplers = DefaultSamplers::default();

    let mut objects = Vec::with_capacity(config.objects.len());
    for (i, obj) in config.objects.iter().enumerate() {
        let mesh = GpuMesh::upload(&pool, &build_mesh(obj))?;
        let resources = MaterialResources {
            color_texture: resolve_texture(&obj.texture, &textures),
            color_sampler: obj.sampler.into(),
            ..MaterialResources::defaults(&textures, &samplers)
        };
        let params = MaterialParams {
            base_color_factor: Vector4::from(obj.color_factor),
            metallic: obj.metallic,
            roughness: obj.roughness,
        };
        let material = MetallicRoughness::write_material(obj.pass.into(), &params, resources);
        debug!(
            "Object {}: {:?} at {:#x}, {:?} pass",
            i, obj.shape, mesh.vertex_buffer, material.pass
        );
        objects.push(RenderObject::from_mesh(&mesh, Arc::new(material), object_transform(obj)));
    }

    info!(
        "Scene built: {} objects, {} vertices in pool",
        objects.len(),
        pool.stats().live_vertices
    );
    Ok(SceneResources {
        pool,
        textures,
        samplers,
        camera,
        scene,
        objects,
    })
}

fn build_mesh(obj: &ObjectConfig) -> Mesh {
    let mesh = match obj.shape {
        Shape::Triangle => Mesh::triangle(),
        Shape::Quad => Mesh::quad(1.0),
        Shape::Cube => Mesh::cube(1.0),
        Shape::Sphere => Mesh::uv_sphere(1.0, SPHERE_RINGS, SPHERE_SEGMENTS),
    };
    match obj.vertex_color {
        Some(color) => mesh.with_color(Vector4::from(color)),
        None => mesh,
    }
}

fn object_transform(obj: &ObjectConfig) -> Matrix4<f32> {
    let rotation = Vector3::from(obj.rotation).map(f32::to_radians);
    TransformFactory::trs(
        &Vector3::from(obj.position),
        &rotation,
        &Vector3::from(obj.scale),
    )
}

/// Built-in names map to the default textures. An image that fails to load
/// falls back to the error checkerboard so the draw still happens.
fn resolve_texture(name: &str, defaults: &DefaultTextures) -> Arc<Texture> {
    match name {
        "white" => Arc::clone(&defaults.white),
        "grey" | "gray" => Arc::clone(&defaults.grey),
        "black" => Arc::clone(&defaults.black),
        "error" => Arc::clone(&defaults.error),
        "checker" => Arc::new(Texture::checkerboard(
            CHECKER_SIZE,
            WHITE,
            Vector4::new(0.2, 0.2, 0.2, 1.0),
        )),
        path => match Texture::load(path) {
            Ok(texture) => Arc::new(texture),
            Err(e) => {
                warn!("{}; using the error texture", e);
                Arc::clone(&defaults.error)
            }
        },
    }
}

/// Paints the background effect, then draws every object of the scene into a
/// fresh renderer.
pub fn render_main_pass(
    config: &Config,
    resources: &SceneResources,
) -> Result<(Renderer, DrawStats)> {
    let render = &config.render;
    let mut renderer = Renderer::new(render.width, render.height, render.samples);
    renderer.cull_override = render.cull_mode.map(Into::into);
    renderer.wireframe = render.wireframe;

    let background = build_background(config);
    debug!("Background: {}", background.name());
    renderer.clear_with(&background);

    let gpu_scene = resources.scene.to_gpu();
    let ctx = DrawContext {
        scene: &gpu_scene,
        pool: &resources.pool,
    };
    let stats = renderer.draw_all(&ctx, &resources.objects)?;
    Ok((renderer, stats))
}

/// Resolves supersamples and quantizes to RGB8 rows. With `srgb` set the
/// sRGB transfer curve is applied first; otherwise values are clamped as-is.
pub fn post_process_to_rgb8(framebuffer: &FrameBuffer, srgb: bool) -> Vec<u8> {
    let mut pixels = vec![0u8; framebuffer.width * framebuffer.height * 3];
    pixels
        .par_chunks_mut(framebuffer.width * 3)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, pixel) in row.chunks_exact_mut(3).enumerate() {
                let Some(color) = framebuffer.resolve_pixel(x, y) else {
                    continue;
                };
                for (out, c) in pixel.iter_mut().zip(color.xyz().iter()) {
                    let encoded = if srgb { linear_to_srgb(*c) } else { *c };
                    *out = (encoded.clamp(0.0, 1.0) * 255.0).round() as u8;
                }
            }
        });
    pixels
}
