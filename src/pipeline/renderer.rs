use crate::core::framebuffer::FrameBuffer;
use crate::core::pipeline::Shader;
use crate::core::rasterizer::{CullMode, Rasterizer};
use crate::error::{Error, Result};
use crate::gpu::layout::GpuSceneData;
use crate::pipeline::background::BackgroundEffect;
use crate::pipeline::shaders::mesh::MeshShader;
use crate::scene::render_object::RenderObject;
use crate::scene::vertex_pool::VertexPool;
use log::debug;
use std::ops::AddAssign;

/// Frame-wide state shared by every draw: the scene block and the memory the
/// vertex handles point into.
#[derive(Clone, Copy)]
pub struct DrawContext<'a> {
    pub scene: &'a GpuSceneData,
    pub pool: &'a VertexPool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    pub triangles: u64,
    pub vertices_shaded: u64,
    pub fragments_shaded: u64,
}

impl AddAssign for DrawStats {
    fn add_assign(&mut self, other: Self) {
        self.triangles += other.triangles;
        self.vertices_shaded += other.vertices_shaded;
        self.fragments_shaded += other.fragments_shaded;
    }
}

/// Drives the two shading stages over indexed draws.
pub struct Renderer {
    pub rasterizer: Rasterizer,
    pub framebuffer: FrameBuffer,
    /// Replaces the material's cull mode when set.
    pub cull_override: Option<CullMode>,
    pub wireframe: bool,
}

impl Renderer {
    /// `sample_count`: 1 for no AA, 2 for 2x2 SSAA, etc.
    pub fn new(width: usize, height: usize, sample_count: usize) -> Self {
        Self {
            rasterizer: Rasterizer::new(),
            framebuffer: FrameBuffer::new(width, height, sample_count),
            cull_override: None,
            wireframe: false,
        }
    }

    /// Runs `effect` over every pixel and resets depth to the far plane.
    pub fn clear_with(&mut self, effect: &BackgroundEffect) {
        let height = self.framebuffer.height;
        self.framebuffer
            .fill_with(1.0, |x, y| effect.shade(x, y, height));
    }

    /// One indexed draw of `object`.
    ///
    /// The handle and every index in the draw's range are validated before
    /// any stage runs, so a failing draw leaves the framebuffer untouched.
    pub fn draw(&self, ctx: &DrawContext<'_>, object: &RenderObject) -> Result<DrawStats> {
        let indices = object
            .index_range()
            .ok_or(Error::IndexRangeOutOfBounds {
                first: object.first_index,
                end: u64::from(object.first_index) + u64::from(object.index_count),
                len: object.indices.len(),
            })?;

        let push = object.push_constants();
        let vertices = ctx.pool.resolve(push.vertex_buffer())?;
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(Error::VertexIndexOutOfBounds {
                handle: vertices.address(),
                index: bad,
                len: vertices.len(),
            });
        }

        let shader = MeshShader::new(ctx.scene, &object.material, push);
        let mut state = object.material.raster_state();
        if let Some(cull_mode) = self.cull_override {
            state.cull_mode = cull_mode;
        }
        state.wireframe |= self.wireframe;

        // Vertex stage: once per distinct index, as a post-transform cache would.
        let mut shaded = vec![None; vertices.len()];
        let mut stats = DrawStats::default();
        for &index in indices {
            let slot = &mut shaded[index as usize];
            if slot.is_none() {
                *slot = Some(shader.vertex(&vertices.fetch(index)?));
                stats.vertices_shaded += 1;
            }
        }

        for tri in indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| shaded[i as usize]);
            let (Some((pa, va)), Some((pb, vb)), Some((pc, vc))) = (a, b, c) else {
                continue;
            };
            let (clip, varyings) = ([pa, pb, pc], [va, vb, vc]);
            self.rasterizer
                .rasterize_triangle(&self.framebuffer, &state, &shader, &clip, &varyings);
            stats.triangles += 1;
        }

        stats.fragments_shaded = self.rasterizer.take_fragment_count();
        debug!(
            "Draw at {:#x}: {} triangles, {} vertices, {} fragments",
            push.vertex_buffer(),
            stats.triangles,
            stats.vertices_shaded,
            stats.fragments_shaded
        );
        Ok(stats)
    }

    /// Draws opaque passes first, then transparent ones, each group in
    /// submission order. Stops at the first failing draw.
    pub fn draw_all(&self, ctx: &DrawContext<'_>, objects: &[RenderObject]) -> Result<DrawStats> {
        let (transparent, opaque): (Vec<_>, Vec<_>) = objects
            .iter()
            .partition(|o| o.material.pass.is_transparent());

        let mut total = DrawStats::default();
        for object in opaque.into_iter().chain(transparent) {
            total += self.draw(ctx, object)?;
        }
        Ok(total)
    }
}
