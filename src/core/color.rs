use nalgebra::Vector4;

/// Packs a normalized RGBA color into a little-endian `R8G8B8A8_UNORM` word
/// (red in the low byte).
pub fn pack_unorm_4x8(color: Vector4<f32>) -> u32 {
    let quantize = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
    quantize(color.x)
        | (quantize(color.y) << 8)
        | (quantize(color.z) << 16)
        | (quantize(color.w) << 24)
}

/// Inverse of [`pack_unorm_4x8`].
pub fn unpack_unorm_4x8(packed: u32) -> Vector4<f32> {
    let channel = |shift: u32| ((packed >> shift) & 0xFF) as f32 / 255.0;
    Vector4::new(channel(0), channel(8), channel(16), channel(24))
}

/// Encodes one linear channel with the sRGB transfer curve.
pub fn linear_to_srgb(c: f32) -> f32 {
    let c = c.clamp(0.0, 1.0);
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}
