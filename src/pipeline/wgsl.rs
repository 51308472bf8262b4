//! The shading stages as WGSL, for hosts with a real GPU.
//!
//! Bind the vertex pool arena ([`crate::scene::vertex_pool::VertexPool::to_bytes`])
//! at set 2 binding 0 and push [`crate::gpu::DrawPushConstants`] per draw.

pub const MESH_WGSL: &str = include_str!("../../shaders/mesh.wgsl");

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";
