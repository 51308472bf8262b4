use nalgebra::Vector4;
use rayon::prelude::*;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

const LOCK_STRIPES: usize = 1024;

/// RGBA color + depth target shared by all fragment invocations of a draw.
///
/// Depth is an atomic `f32` updated with a CAS loop; color writes are
/// serialized per pixel through a pool of striped locks so a pixel's four
/// channels always change together.
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    pub sample_count: usize,
    pub buffer_width: usize,
    pub buffer_height: usize,

    color: Vec<[AtomicU32; 4]>,
    depth: Vec<AtomicU32>,
    locks: Vec<Mutex<()>>,
}

impl FrameBuffer {
    /// `sample_count` is the supersampling factor per axis (1 = no AA).
    pub fn new(width: usize, height: usize, sample_count: usize) -> Self {
        let sample_count = sample_count.max(1);
        let buffer_width = width * sample_count;
        let buffer_height = height * sample_count;
        let size = buffer_width * buffer_height;

        Self {
            width,
            height,
            sample_count,
            buffer_width,
            buffer_height,
            color: (0..size).map(|_| Default::default()).collect(),
            depth: (0..size)
                .map(|_| AtomicU32::new(1.0f32.to_bits()))
                .collect(),
            locks: (0..LOCK_STRIPES).map(|_| Mutex::new(())).collect(),
        }
    }

    #[inline(always)]
    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.buffer_width && y < self.buffer_height
    }

    #[inline(always)]
    fn index(&self, x: usize, y: usize) -> usize {
        y * self.buffer_width + x
    }

    /// Writes `shade(x, y)` to every sample, with `x` and `y` in output
    /// pixels so all samples of a pixel share one value, and resets depth.
    pub fn fill_with<F>(&mut self, depth: f32, shade: F)
    where
        F: Fn(usize, usize) -> Vector4<f32> + Sync,
    {
        let samples = self.sample_count;
        self.color
            .par_chunks_mut(self.buffer_width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, texel) in row.iter_mut().enumerate() {
                    let color = shade(x / samples, y / samples);
                    for (channel, value) in texel.iter_mut().zip(color.iter()) {
                        *channel.get_mut() = value.to_bits();
                    }
                }
            });
        for d in &mut self.depth {
            *d.get_mut() = depth.to_bits();
        }
    }

    /// Passes when `depth` is strictly closer than the stored value
    /// (`COMPARE_OP_LESS`). With `write` set, a passing depth is stored.
    #[inline]
    pub fn depth_test(&self, x: usize, y: usize, depth: f32, write: bool) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let slot = &self.depth[self.index(x, y)];
        let mut current = slot.load(Ordering::Relaxed);
        loop {
            if depth >= f32::from_bits(current) {
                return false;
            }
            if !write {
                return true;
            }
            match slot.compare_exchange_weak(
                current,
                depth.to_bits(),
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return true,
                Err(updated) => current = updated,
            }
        }
    }

    /// Overwrites one sample.
    #[inline]
    pub fn write_pixel(&self, x: usize, y: usize, color: Vector4<f32>) {
        self.modify_pixel(x, y, |_| color);
    }

    /// `dst + src` on all four channels (`BLEND_FACTOR_ONE`, `ONE`).
    #[inline]
    pub fn blend_additive(&self, x: usize, y: usize, color: Vector4<f32>) {
        self.modify_pixel(x, y, |dst| dst + color);
    }

    fn modify_pixel(&self, x: usize, y: usize, f: impl FnOnce(Vector4<f32>) -> Vector4<f32>) {
        if !self.in_bounds(x, y) {
            return;
        }
        let idx = self.index(x, y);
        let _guard = self.locks[idx % self.locks.len()]
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let texel = &self.color[idx];
        let next = f(Self::load(texel));
        for (channel, value) in texel.iter().zip(next.iter()) {
            channel.store(value.to_bits(), Ordering::Relaxed);
        }
    }

    fn load(texel: &[AtomicU32; 4]) -> Vector4<f32> {
        Vector4::from_fn(|i, _| f32::from_bits(texel[i].load(Ordering::Relaxed)))
    }

    /// Raw sample at supersampled coordinates.
    pub fn sample(&self, x: usize, y: usize) -> Option<Vector4<f32>> {
        self.in_bounds(x, y)
            .then(|| Self::load(&self.color[self.index(x, y)]))
    }

    pub fn sample_depth(&self, x: usize, y: usize) -> Option<f32> {
        self.in_bounds(x, y)
            .then(|| f32::from_bits(self.depth[self.index(x, y)].load(Ordering::Relaxed)))
    }

    /// Output pixel: box-filtered average of its `sample_count²` samples.
    pub fn resolve_pixel(&self, x: usize, y: usize) -> Option<Vector4<f32>> {
        if x >= self.width || y >= self.height {
            return None;
        }
        if self.sample_count == 1 {
            return self.sample(x, y);
        }

        let n = self.sample_count;
        let mut sum = Vector4::zeros();
        for dy in 0..n {
            for dx in 0..n {
                sum += Self::load(&self.color[self.index(x * n + dx, y * n + dy)]);
            }
        }
        Some(sum / (n * n) as f32)
    }
}
