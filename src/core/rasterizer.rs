use crate::core::framebuffer::FrameBuffer;
use crate::core::math::interpolation::{
    edge_function, is_top_left, perspective_correct_barycentric,
};
use crate::core::math::transform::{ndc_to_screen, perspective_divide};
use crate::core::pipeline::{Interpolatable, Shader};
use nalgebra::{Point2, Vector3, Vector4};
use rayon::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(PartialEq, Eq, Copy, Clone, Debug, Default)]
pub enum CullMode {
    #[default]
    None,
    Front,
    Back,
}

/// Winding that counts as front-facing, measured in framebuffer space
/// (+Y down) the way Vulkan measures it.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Default)]
pub enum FrontFace {
    #[default]
    CounterClockwise,
    Clockwise,
}

#[derive(PartialEq, Eq, Copy, Clone, Debug, Default)]
pub enum BlendMode {
    #[default]
    Opaque,
    Additive,
}

/// Fixed-function state applied between the two shading stages.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub struct RasterState {
    pub cull_mode: CullMode,
    pub front_face: FrontFace,
    pub depth_test: bool,
    pub depth_write: bool,
    pub blend: BlendMode,
    pub wireframe: bool,
}

impl Default for RasterState {
    fn default() -> Self {
        Self {
            cull_mode: CullMode::None,
            front_face: FrontFace::CounterClockwise,
            depth_test: true,
            depth_write: true,
            blend: BlendMode::Opaque,
            wireframe: false,
        }
    }
}

type ClipVertex<V> = (Vector4<f32>, V);

/// Inward-facing planes of the clip volume as `dot(plane, p) >= 0`.
const CLIP_PLANES: [[f32; 4]; 6] = [
    [-1.0, 0.0, 0.0, 1.0], // x <= w
    [1.0, 0.0, 0.0, 1.0],  // -w <= x
    [0.0, -1.0, 0.0, 1.0], // y <= w
    [0.0, 1.0, 0.0, 1.0],  // -w <= y
    [0.0, 0.0, 1.0, 0.0],  // 0 <= z
    [0.0, 0.0, -1.0, 1.0], // z <= w
];

/// Turns clip-space triangles into shaded fragments.
#[derive(Default)]
pub struct Rasterizer {
    fragments: AtomicU64,
}

impl Rasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fragments shaded since the last call, resetting the counter.
    pub fn take_fragment_count(&self) -> u64 {
        self.fragments.swap(0, Ordering::Relaxed)
    }

    /// Clips one triangle against the clip volume (Sutherland–Hodgman in
    /// homogeneous space), fans the remaining polygon and rasterizes every
    /// piece.
    pub fn rasterize_triangle<S: Shader>(
        &self,
        framebuffer: &FrameBuffer,
        state: &RasterState,
        shader: &S,
        clip_coords: &[Vector4<f32>; 3],
        varyings: &[S::Varying; 3],
    ) {
        let mut polygon: Vec<ClipVertex<S::Varying>> = Vec::with_capacity(16);
        let mut scratch: Vec<ClipVertex<S::Varying>> = Vec::with_capacity(16);
        polygon.extend(clip_coords.iter().copied().zip(varyings.iter().copied()));

        for plane in &CLIP_PLANES {
            clip_against_plane(&polygon, &mut scratch, &Vector4::from(*plane));
            std::mem::swap(&mut polygon, &mut scratch);
            if polygon.len() < 3 {
                return;
            }
        }

        let (p0, v0) = polygon[0];
        for pair in polygon[1..].windows(2) {
            let (p1, v1) = pair[0];
            let (p2, v2) = pair[1];
            self.rasterize_clipped(framebuffer, state, shader, &[p0, p1, p2], &[v0, v1, v2]);
        }
    }

    fn rasterize_clipped<S: Shader>(
        &self,
        framebuffer: &FrameBuffer,
        state: &RasterState,
        shader: &S,
        clip: &[Vector4<f32>; 3],
        varyings: &[S::Varying; 3],
    ) {
        let width = framebuffer.buffer_width as f32;
        let height = framebuffer.buffer_height as f32;

        let mut screen = [Point2::origin(); 3];
        let mut depth = [0.0f32; 3];
        let mut w = [0.0f32; 3];
        for i in 0..3 {
            if clip[i].w.abs() < 1e-6 {
                return;
            }
            let ndc = perspective_divide(&clip[i]);
            screen[i] = ndc_to_screen(ndc.x, ndc.y, width, height);
            depth[i] = ndc.z;
            w[i] = clip[i].w;
        }

        // Positive area is clockwise in the +Y-down framebuffer.
        let area = edge_function(screen[0], screen[1], screen[2]);
        if area.abs() < 1e-6 {
            return;
        }
        let front = match state.front_face {
            FrontFace::CounterClockwise => area < 0.0,
            FrontFace::Clockwise => area > 0.0,
        };
        match state.cull_mode {
            CullMode::Back if !front => return,
            CullMode::Front if front => return,
            _ => {}
        }

        let (min_x, min_y, max_x, max_y) = bounding_box(&screen);
        if max_x < 0
            || max_y < 0
            || min_x >= framebuffer.buffer_width as i32
            || min_y >= framebuffer.buffer_height as i32
        {
            return;
        }
        let last_x = framebuffer.buffer_width as i32 - 1;
        let last_y = framebuffer.buffer_height as i32 - 1;
        let x_range = min_x.max(0) as usize..=max_x.min(last_x) as usize;
        let y_range = min_y.max(0) as usize..=max_y.min(last_y) as usize;
        let coverage = Coverage::new(screen, area);

        let shaded: u64 = y_range
            .into_par_iter()
            .map(|y| {
                let mut count = 0u64;
                for x in x_range.clone() {
                    let center = Point2::new(x as f32 + 0.5, y as f32 + 0.5);
                    let Some(bary) = coverage.weights(center) else {
                        continue;
                    };
                    if state.wireframe && bary.min() > 0.02 {
                        continue;
                    }

                    // z/w is affine in screen space, so depth uses the raw weights.
                    let z = bary.x * depth[0] + bary.y * depth[1] + bary.z * depth[2];
                    if state.depth_test && !framebuffer.depth_test(x, y, z, state.depth_write) {
                        continue;
                    }

                    let Some(weights) = perspective_correct_barycentric(bary, w) else {
                        continue;
                    };
                    let varying = varyings[0] * weights.x
                        + varyings[1] * weights.y
                        + varyings[2] * weights.z;

                    let color = shader.fragment(varying);
                    match state.blend {
                        BlendMode::Opaque => framebuffer.write_pixel(x, y, color),
                        BlendMode::Additive => framebuffer.blend_additive(x, y, color),
                    }
                    count += 1;
                }
                count
            })
            .sum();

        self.fragments.fetch_add(shaded, Ordering::Relaxed);
    }
}

/// Edge equations of one screen-space triangle. Edge `i` is the one opposite
/// vertex `i`.
struct Coverage {
    points: [Point2<f32>; 3],
    inv_area: f32,
    top_left: [bool; 3],
}

impl Coverage {
    fn new(points: [Point2<f32>; 3], area: f32) -> Self {
        // Walk counter-clockwise triangles backwards so every edge is tested
        // in clockwise order.
        let top_left = std::array::from_fn(|i| {
            let (a, b) = (points[(i + 1) % 3], points[(i + 2) % 3]);
            if area > 0.0 { is_top_left(a, b) } else { is_top_left(b, a) }
        });
        Self {
            points,
            inv_area: 1.0 / area,
            top_left,
        }
    }

    /// Barycentric weights of `p`, or `None` when the sample does not belong
    /// to this triangle. Samples exactly on an edge belong to it only when
    /// that edge is a top or left edge.
    fn weights(&self, p: Point2<f32>) -> Option<Vector3<f32>> {
        let mut weights = [0.0f32; 3];
        for (i, weight) in weights.iter_mut().enumerate() {
            let (a, b) = (self.points[(i + 1) % 3], self.points[(i + 2) % 3]);
            let e = edge_function(a, b, p) * self.inv_area;
            if e < 0.0 || (e == 0.0 && !self.top_left[i]) {
                return None;
            }
            *weight = e;
        }
        Some(Vector3::from(weights))
    }
}

/// One Sutherland–Hodgman step. `output` is cleared first.
fn clip_against_plane<V: Interpolatable>(
    input: &[ClipVertex<V>],
    output: &mut Vec<ClipVertex<V>>,
    plane: &Vector4<f32>,
) {
    output.clear();
    let Some(&last) = input.last() else {
        return;
    };

    let mut prev = last;
    let mut prev_dist = plane.dot(&prev.0);
    for &curr in input {
        let curr_dist = plane.dot(&curr.0);
        if (prev_dist >= 0.0) != (curr_dist >= 0.0) {
            let t = prev_dist / (prev_dist - curr_dist);
            if t.is_finite() {
                output.push((
                    prev.0 + (curr.0 - prev.0) * t,
                    prev.1 * (1.0 - t) + curr.1 * t,
                ));
            }
        }
        if curr_dist >= 0.0 {
            output.push(curr);
        }
        prev = curr;
        prev_dist = curr_dist;
    }
}

fn bounding_box(points: &[Point2<f32>; 3]) -> (i32, i32, i32, i32) {
    let min_x = points.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
    let min_y = points.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
    let max_x = points.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max);
    let max_y = points.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);
    (
        min_x.floor() as i32,
        min_y.floor() as i32,
        max_x.ceil() as i32,
        max_y.ceil() as i32,
    )
}
