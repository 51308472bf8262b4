//! Host mirrors of the memory the shading programs read, and the binding
//! contract that ties them to descriptor slots.

pub mod bindings;
pub mod layout;

pub use bindings::{
    BindingKind, BindingSlot, DescriptorLayoutBuilder, DescriptorSetLayout, MESH_BINDINGS,
    PUSH_CONSTANTS, PipelineLayout, PushConstantRange, ShaderStages, WGSL_EXTRA_BINDINGS,
    mesh_pipeline_layout,
};
pub use layout::{
    BufferAddress, DrawPushConstants, EffectPushConstants, GpuSceneData, MaterialConstants,
};
