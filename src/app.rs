use crate::core::geometry::Vertex;
use crate::error::{Error, Result};
use crate::gpu::bindings::{
    MESH_BINDINGS, PUSH_CONSTANTS, WGSL_EXTRA_BINDINGS, mesh_pipeline_layout,
};
use crate::gpu::layout::{
    DrawPushConstants, EffectPushConstants, GpuSceneData, MaterialConstants,
};
use crate::io::config::Config;
use crate::io::image::save_rgb8;
use crate::pipeline::passes::{build_scene, post_process_to_rgb8, render_main_pass};
use crate::pipeline::renderer::DrawStats;
use crate::pipeline::wgsl::MESH_WGSL;
use log::{debug, info};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::time::Instant;

/// Renders the configured scene headlessly and writes it to
/// `config.render.output`.
pub fn run_render(config: &Config) -> Result<DrawStats> {
    info!(
        "Rendering {}x{} ({}x{} SSAA)...",
        config.render.width, config.render.height, config.render.samples, config.render.samples
    );
    let start_time = Instant::now();

    let resources = build_scene(config)?;
    let (renderer, stats) = render_main_pass(config, &resources)?;
    info!(
        "Render completed in {:.2?}: {} triangles, {} fragments",
        start_time.elapsed(),
        stats.triangles,
        stats.fragments_shaded
    );
    debug!("Pool: {:?}", resources.pool.stats());

    let pixels = post_process_to_rgb8(&renderer.framebuffer, config.render.srgb_output);
    save_rgb8(
        &pixels,
        config.render.width,
        config.render.height,
        &config.render.output,
    )?;
    Ok(stats)
}

/// Human-readable dump of the binding contract and wire sizes.
pub fn layout_report() -> Result<String> {
    let layout = mesh_pipeline_layout()?;
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "Descriptor bindings:");
    for slot in MESH_BINDINGS.iter().chain(WGSL_EXTRA_BINDINGS.iter()) {
        let _ = writeln!(
            out,
            "  set {} binding {}  {:<22} {:<32} {}",
            slot.set, slot.binding, slot.name, slot.kind, slot.stages
        );
    }
    let _ = writeln!(
        out,
        "Push constants: offset {}, {} bytes, {}",
        PUSH_CONSTANTS.offset, PUSH_CONSTANTS.size, PUSH_CONSTANTS.stages
    );
    let _ = writeln!(out, "Struct sizes:");
    for (name, size) in [
        ("Vertex", Vertex::STRIDE),
        ("DrawPushConstants", size_of::<DrawPushConstants>()),
        ("GpuSceneData", size_of::<GpuSceneData>()),
        ("MaterialConstants", size_of::<MaterialConstants>()),
        ("EffectPushConstants", size_of::<EffectPushConstants>()),
    ] {
        let _ = writeln!(out, "  {name:<20} {size:>4} bytes");
    }
    let _ = writeln!(
        out,
        "Contract check: {}",
        if layout.matches_mesh_contract() { "ok" } else { "MISMATCH" }
    );
    Ok(out)
}

/// Writes the WGSL program to `output`, or returns it for stdout when no
/// path is given.
pub fn write_wgsl(output: Option<&Path>) -> Result<Option<String>> {
    match output {
        Some(path) => {
            fs::write(path, MESH_WGSL).map_err(|source| Error::WriteFile {
                path: path.to_path_buf(),
                source,
            })?;
            info!("Wrote WGSL to {:?}", path);
            Ok(None)
        }
        None => Ok(Some(MESH_WGSL.to_string())),
    }
}
