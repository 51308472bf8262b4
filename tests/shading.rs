use mesh_shader::core::geometry::Vertex;
use mesh_shader::core::pipeline::Shader;
use mesh_shader::core::math::transform::TransformFactory;
use mesh_shader::core::rasterizer::CullMode;
use mesh_shader::gpu::{DrawPushConstants, GpuSceneData};
use mesh_shader::pipeline::renderer::{DrawContext, Renderer};
use mesh_shader::pipeline::shaders::mesh::{MeshShader, MeshVarying};
use mesh_shader::scene::camera::Camera;
use mesh_shader::scene::light::{SceneData, Sun};
use mesh_shader::scene::material::{
    MaterialInstance, MaterialParams, MaterialPass, MaterialResources, MetallicRoughness,
};
use mesh_shader::scene::mesh::{GpuMesh, Mesh};
use mesh_shader::scene::render_object::RenderObject;
use mesh_shader::scene::texture::{DefaultSamplers, DefaultTextures, Sampler, Texture};
use mesh_shader::scene::vertex_pool::VertexPool;
use nalgebra::{Matrix4, Point3, Vector2, Vector3, Vector4};
use std::sync::Arc;

fn material_with(
    pass: MaterialPass,
    factor: Vector4<f32>,
    texture: Option<(Texture, Sampler)>,
) -> MaterialInstance {
    let mut resources =
        MaterialResources::defaults(&DefaultTextures::default(), &DefaultSamplers::default());
    if let Some((texture, sampler)) = texture {
        resources.color_texture = Arc::new(texture);
        resources.color_sampler = sampler;
    }
    let params = MaterialParams {
        base_color_factor: factor,
        ..MaterialParams::default()
    };
    MetallicRoughness::write_material(pass, &params, resources)
}

fn material(factor: Vector4<f32>) -> MaterialInstance {
    material_with(MaterialPass::MainColor, factor, None)
}

fn scene(sun_dir: Vector3<f32>, intensity: f32, ambient: Vector3<f32>) -> GpuSceneData {
    SceneData {
        ambient_color: ambient.push(1.0),
        sun: Sun::new(sun_dir, Vector3::repeat(1.0), intensity).unwrap(),
        ..SceneData::default()
    }
    .to_gpu()
}

fn varying(normal: Vector3<f32>, color: Vector3<f32>) -> MeshVarying {
    MeshVarying {
        normal,
        color,
        uv: Vector2::new(0.5, 0.5),
    }
}

#[test]
fn origin_with_identity_transforms_lands_at_clip_origin() {
    let scene = SceneData::default().to_gpu();
    let mat = material(Vector4::repeat(1.0));
    let shader = MeshShader::new(&scene, &mat, DrawPushConstants::new(Matrix4::identity(), 0));

    let v = Vertex::new(Point3::origin(), Vector3::z(), Vector2::zeros(), Vector4::repeat(1.0));
    let (clip, _) = shader.vertex(&v);
    assert_eq!(clip, Vector4::new(0.0, 0.0, 0.0, 1.0));
}

#[test]
fn vertex_color_is_modulated_by_material_factor_for_any_model_matrix() {
    let scene = SceneData::default().to_gpu();
    let mat = material(Vector4::new(0.5, 0.25, 2.0, 0.3));
    let vertex = Vertex::new(
        Point3::new(1.0, -2.0, 3.0),
        Vector3::new(0.0, 1.0, 0.0),
        Vector2::new(0.1, 0.9),
        Vector4::new(0.8, 0.4, 0.2, 1.0),
    );
    let expected = Vector3::new(0.8 * 0.5, 0.4 * 0.25, 0.2 * 2.0);

    for model in [
        Matrix4::identity(),
        TransformFactory::translation(&Vector3::new(10.0, 0.0, -4.0)),
        TransformFactory::trs(
            &Vector3::new(1.0, 2.0, 3.0),
            &Vector3::new(0.3, 1.2, -0.7),
            &Vector3::new(2.0, 0.5, 3.0),
        ),
    ] {
        let shader = MeshShader::new(&scene, &mat, DrawPushConstants::new(model, 0));
        let (_, out) = shader.vertex(&vertex);
        assert_eq!(out.color, expected);
    }
}

#[test]
fn surface_facing_away_gets_only_ambient() {
    let scene = scene(Vector3::y(), 3.0, Vector3::new(0.2, 0.3, 0.4));
    let mat = material(Vector4::repeat(1.0));
    let shader = MeshShader::new(&scene, &mat, DrawPushConstants::new(Matrix4::identity(), 0));

    let color = Vector3::new(0.9, 0.5, 0.1);
    let ambient = color.component_mul(&Vector3::new(0.2, 0.3, 0.4));
    for normal in [-Vector3::y(), Vector3::x(), Vector3::new(0.3, -0.9, 0.1)] {
        let out = shader.fragment(varying(normal, color));
        assert_eq!(out.xyz(), ambient, "normal {normal:?}");
    }
}

#[test]
fn zero_sun_intensity_leaves_ambient() {
    let scene = scene(Vector3::y(), 0.0, Vector3::new(0.1, 0.2, 0.3));
    let checker = Texture::checkerboard(4, Vector4::new(1.0, 0.0, 0.0, 1.0), Vector4::repeat(1.0));
    let mat = material_with(
        MaterialPass::MainColor,
        Vector4::repeat(1.0),
        Some((checker, Sampler::NEAREST)),
    );
    let shader = MeshShader::new(&scene, &mat, DrawPushConstants::new(Matrix4::identity(), 0));

    let color = Vector3::new(1.0, 0.5, 0.25);
    let ambient = color.component_mul(&Vector3::new(0.1, 0.2, 0.3));
    for uv in [Vector2::new(0.1, 0.1), Vector2::new(0.4, 0.1), Vector2::new(0.9, 0.6)] {
        let out = shader.fragment(MeshVarying {
            normal: Vector3::y(),
            color,
            uv,
        });
        assert_eq!(out.xyz(), ambient);
    }
}

#[test]
fn alpha_is_always_one() {
    let scene = scene(Vector3::new(0.2, 1.0, -0.4), 5.0, Vector3::repeat(0.7));
    let mat = material(Vector4::new(3.0, 0.0, 1.0, 0.0));
    let shader = MeshShader::new(&scene, &mat, DrawPushConstants::new(Matrix4::identity(), 0));

    for (normal, color) in [
        (Vector3::y(), Vector3::repeat(1.0)),
        (-Vector3::y(), Vector3::zeros()),
        (Vector3::new(10.0, 10.0, 10.0), Vector3::new(4.0, -1.0, 0.5)),
    ] {
        assert_eq!(shader.fragment(varying(normal, color)).w, 1.0);
    }
}

#[test]
fn clamped_uv_extremes_sample_opposite_corners() {
    // 2x2: red, green / blue, yellow
    let texture = Texture::from_rgba8(
        2,
        2,
        vec![
            255, 0, 0, 255, 0, 255, 0, 255, //
            0, 0, 255, 255, 255, 255, 0, 255,
        ],
    )
    .unwrap();
    let scene = scene(Vector3::y(), 1.0, Vector3::zeros());

    for sampler in [Sampler::NEAREST_CLAMP, Sampler::LINEAR_CLAMP] {
        let mat = material_with(
            MaterialPass::MainColor,
            Vector4::repeat(1.0),
            Some((texture.clone(), sampler)),
        );
        let shader = MeshShader::new(&scene, &mat, DrawPushConstants::new(Matrix4::identity(), 0));
        let at = |uv: Vector2<f32>| {
            shader
                .fragment(MeshVarying {
                    normal: Vector3::y(),
                    color: Vector3::repeat(1.0),
                    uv,
                })
                .xyz()
        };
        assert_eq!(at(Vector2::new(0.0, 0.0)), Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(at(Vector2::new(1.0, 1.0)), Vector3::new(1.0, 1.0, 0.0));
    }
}

/// A 2x2 quad standing in the XY plane at depth `z`, seen by a camera on +Z.
struct Stage {
    pool: VertexPool,
    quad: GpuMesh,
    gpu_scene: GpuSceneData,
}

impl Stage {
    fn new(sun_dir: Vector3<f32>, intensity: f32, ambient: Vector3<f32>) -> Self {
        let camera = Camera::new_perspective(
            Point3::new(0.0, 0.0, 3.0),
            Point3::origin(),
            60f32.to_radians(),
            1.0,
            0.1,
            10.0,
        );
        let pool = VertexPool::new();
        let quad = GpuMesh::upload(&pool, &Mesh::quad(2.0)).unwrap();
        let gpu_scene = SceneData {
            view: camera.view_matrix(),
            proj: camera.projection_matrix(),
            ambient_color: ambient.push(1.0),
            sun: Sun::new(sun_dir, Vector3::repeat(1.0), intensity).unwrap(),
        }
        .to_gpu();
        Self {
            pool,
            quad,
            gpu_scene,
        }
    }

    fn ctx(&self) -> DrawContext<'_> {
        DrawContext {
            scene: &self.gpu_scene,
            pool: &self.pool,
        }
    }

    fn object(&self, material: MaterialInstance, z: f32) -> RenderObject {
        let model = TransformFactory::translation(&Vector3::new(0.0, 0.0, z))
            * TransformFactory::rotation(&Vector3::x(), 90f32.to_radians());
        RenderObject::from_mesh(&self.quad, Arc::new(material), model)
    }
}

fn quad_normal() -> Vector3<f32> {
    let rotation = TransformFactory::rotation(&Vector3::x(), 90f32.to_radians());
    (rotation * Vector4::new(0.0, 1.0, 0.0, 0.0)).xyz()
}

fn center(renderer: &Renderer) -> Vector4<f32> {
    renderer.framebuffer.resolve_pixel(16, 16).unwrap()
}

fn assert_close(actual: Vector4<f32>, expected: Vector4<f32>) {
    assert!((actual - expected).norm() < 1e-4, "{actual:?} != {expected:?}");
}

#[test]
fn quad_facing_the_sun_is_lit_and_facing_away_is_ambient() {
    let ambient = Vector3::repeat(0.1);

    let lit = Stage::new(quad_normal(), 1.0, ambient);
    let renderer = Renderer::new(32, 32, 1);
    let stats = renderer
        .draw(&lit.ctx(), &lit.object(material(Vector4::repeat(1.0)), 0.0))
        .unwrap();
    assert_eq!(stats.triangles, 2);
    assert!(stats.fragments_shaded > 0);
    assert_close(center(&renderer), Vector4::new(1.1, 1.1, 1.1, 1.0));

    let dark = Stage::new(-quad_normal(), 1.0, ambient);
    let renderer = Renderer::new(32, 32, 1);
    renderer
        .draw(&dark.ctx(), &dark.object(material(Vector4::repeat(1.0)), 0.0))
        .unwrap();
    assert_close(center(&renderer), Vector4::new(0.1, 0.1, 0.1, 1.0));
}

#[test]
fn nearer_opaque_quad_wins_regardless_of_order() {
    let stage = Stage::new(quad_normal(), 0.0, Vector3::repeat(1.0));
    let red = material(Vector4::new(1.0, 0.0, 0.0, 1.0));
    let blue = material(Vector4::new(0.0, 0.0, 1.0, 1.0));

    let renderer = Renderer::new(32, 32, 1);
    renderer.draw(&stage.ctx(), &stage.object(red, 0.5)).unwrap();
    renderer.draw(&stage.ctx(), &stage.object(blue, -0.5)).unwrap();
    assert_close(center(&renderer), Vector4::new(1.0, 0.0, 0.0, 1.0));
}

#[test]
fn transparent_pass_adds_onto_opaque_after_it() {
    // No sun and white ambient: every fragment outputs its material color.
    let stage = Stage::new(quad_normal(), 0.0, Vector3::repeat(1.0));
    let glow = material_with(MaterialPass::Transparent, Vector4::new(0.3, 0.0, 0.0, 1.0), None);
    let base = material(Vector4::new(0.2, 0.2, 0.2, 1.0));

    // Submitted transparent first; the opaque pass still goes down first.
    let objects = [stage.object(glow, 0.5), stage.object(base, 0.0)];
    let renderer = Renderer::new(32, 32, 1);
    renderer.draw_all(&stage.ctx(), &objects).unwrap();
    assert_close(center(&renderer), Vector4::new(0.5, 0.2, 0.2, 2.0));
}

#[test]
fn cull_override_applies_to_every_material() {
    let stage = Stage::new(quad_normal(), 1.0, Vector3::repeat(0.1));
    let mut renderer = Renderer::new(32, 32, 1);
    renderer.cull_override = Some(CullMode::Back);
    let front = renderer
        .draw(&stage.ctx(), &stage.object(material(Vector4::repeat(1.0)), 0.0))
        .unwrap();

    renderer.cull_override = Some(CullMode::Front);
    let back = renderer
        .draw(&stage.ctx(), &stage.object(material(Vector4::repeat(1.0)), 0.0))
        .unwrap();

    // Exactly one of the two windings survives each cull mode.
    assert!((front.fragments_shaded == 0) != (back.fragments_shaded == 0));
}

#[test]
fn transparent_quad_blends_every_pixel_once() {
    let stage = Stage::new(quad_normal(), 0.0, Vector3::repeat(1.0));
    let color = Vector4::new(0.3, 0.0, 0.0, 1.0);
    let glow = material_with(MaterialPass::Transparent, color, None);

    let renderer = Renderer::new(32, 32, 1);
    let stats = renderer.draw(&stage.ctx(), &stage.object(glow, 0.0)).unwrap();

    let mut covered = 0u64;
    for y in 0..32 {
        for x in 0..32 {
            let pixel = renderer.framebuffer.sample(x, y).unwrap();
            if pixel != Vector4::zeros() {
                assert_close(pixel, color);
                covered += 1;
            }
        }
    }
    assert!(covered > 0);
    assert_eq!(covered, stats.fragments_shaded);
}

#[test]
fn back_face_culling_keeps_the_faces_towards_the_camera() {
    let stage = Stage::new(Vector3::z(), 1.0, Vector3::repeat(0.1));
    let cube = GpuMesh::upload(&stage.pool, &Mesh::cube(1.0)).unwrap();
    let depth_at_center = |cull: CullMode| {
        let mut renderer = Renderer::new(32, 32, 1);
        renderer.cull_override = Some(cull);
        let object = RenderObject::from_mesh(
            &cube,
            Arc::new(material(Vector4::repeat(1.0))),
            Matrix4::identity(),
        );
        renderer.draw(&stage.ctx(), &object).unwrap();
        renderer.framebuffer.sample_depth(16, 16).unwrap()
    };
    // Depth of a plane `d` units in front of the camera (near 0.1, far 10).
    let depth_at = |d: f32| 10.0 * (d - 0.1) / (d * (10.0 - 0.1));

    let back_culled = depth_at_center(CullMode::Back);
    let front_culled = depth_at_center(CullMode::Front);
    assert!((back_culled - depth_at(2.5)).abs() < 1e-4, "{back_culled}");
    assert!((front_culled - depth_at(3.5)).abs() < 1e-4, "{front_culled}");
}
