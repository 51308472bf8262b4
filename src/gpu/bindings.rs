use crate::error::{Error, Result};
use crate::gpu::layout::{DrawPushConstants, GpuSceneData, MaterialConstants};
use std::fmt;

bitflags::bitflags! {
    /// Stage visibility bit set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ShaderStages: u8 {
        const VERTEX = 0b01;
        const FRAGMENT = 0b10;
        const VERTEX_FRAGMENT = Self::VERTEX.bits() | Self::FRAGMENT.bits();
    }
}

impl fmt::Display for ShaderStages {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.contains(Self::VERTEX), self.contains(Self::FRAGMENT)) {
            (true, true) => f.write_str("vertex|fragment"),
            (true, false) => f.write_str("vertex"),
            (false, true) => f.write_str("fragment"),
            (false, false) => f.write_str("none"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// Uniform block of the given size in bytes.
    UniformBuffer { size: usize },
    /// 2D sampled image (a combined image sampler on Vulkan).
    SampledTexture,
    /// Sampler object, only needed where images and samplers are split (WGSL).
    Sampler,
    /// Read-only storage buffer with an element stride in bytes.
    StorageBuffer { stride: usize },
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UniformBuffer { size } => write!(f, "uniform buffer ({size} B)"),
            Self::SampledTexture => f.write_str("sampled texture 2D"),
            Self::Sampler => f.write_str("sampler"),
            Self::StorageBuffer { stride } => write!(f, "storage buffer (stride {stride} B)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingSlot {
    pub set: u32,
    pub binding: u32,
    pub kind: BindingKind,
    pub stages: ShaderStages,
    pub name: &'static str,
}

/// Descriptor slots read by the mesh programs.
pub const MESH_BINDINGS: [BindingSlot; 4] = [
    BindingSlot {
        set: 0,
        binding: 0,
        kind: BindingKind::UniformBuffer {
            size: std::mem::size_of::<GpuSceneData>(),
        },
        stages: ShaderStages::VERTEX_FRAGMENT,
        name: "scene",
    },
    BindingSlot {
        set: 1,
        binding: 0,
        kind: BindingKind::UniformBuffer {
            size: std::mem::size_of::<MaterialConstants>(),
        },
        stages: ShaderStages::VERTEX_FRAGMENT,
        name: "material",
    },
    BindingSlot {
        set: 1,
        binding: 1,
        kind: BindingKind::SampledTexture,
        stages: ShaderStages::VERTEX_FRAGMENT,
        name: "color_texture",
    },
    BindingSlot {
        set: 1,
        binding: 2,
        kind: BindingKind::SampledTexture,
        stages: ShaderStages::VERTEX_FRAGMENT,
        name: "metal_rough_texture",
    },
];

/// Slots the WGSL translation adds: WGSL has no combined image samplers and
/// no buffer device addresses, so samplers get their own bindings and the
/// vertex pool is bound as one storage buffer indexed by address / stride.
pub const WGSL_EXTRA_BINDINGS: [BindingSlot; 3] = [
    BindingSlot {
        set: 1,
        binding: 3,
        kind: BindingKind::Sampler,
        stages: ShaderStages::FRAGMENT,
        name: "color_sampler",
    },
    BindingSlot {
        set: 1,
        binding: 4,
        kind: BindingKind::Sampler,
        stages: ShaderStages::FRAGMENT,
        name: "metal_rough_sampler",
    },
    BindingSlot {
        set: 2,
        binding: 0,
        kind: BindingKind::StorageBuffer {
            stride: crate::core::geometry::Vertex::STRIDE,
        },
        stages: ShaderStages::VERTEX,
        name: "vertex_pool",
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PushConstantRange {
    pub offset: u32,
    pub size: u32,
    pub stages: ShaderStages,
}

pub const PUSH_CONSTANTS: PushConstantRange = PushConstantRange {
    offset: 0,
    size: std::mem::size_of::<DrawPushConstants>() as u32,
    stages: ShaderStages::VERTEX,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutBinding {
    pub binding: u32,
    pub kind: BindingKind,
    pub stages: ShaderStages,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorSetLayout {
    pub set: u32,
    pub bindings: Vec<LayoutBinding>,
}

impl DescriptorSetLayout {
    pub fn binding(&self, binding: u32) -> Option<&LayoutBinding> {
        self.bindings.iter().find(|b| b.binding == binding)
    }
}

/// Accumulates bindings, then stamps them all with the given stages.
#[derive(Debug, Default)]
pub struct DescriptorLayoutBuilder {
    bindings: Vec<(u32, BindingKind)>,
}

impl DescriptorLayoutBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_binding(mut self, binding: u32, kind: BindingKind) -> Self {
        self.bindings.push((binding, kind));
        self
    }

    pub fn build(self, set: u32, stages: ShaderStages) -> Result<DescriptorSetLayout> {
        let mut bindings: Vec<LayoutBinding> = Vec::with_capacity(self.bindings.len());
        for (binding, kind) in self.bindings {
            if bindings.iter().any(|b| b.binding == binding) {
                return Err(Error::DuplicateBinding { set, binding });
            }
            bindings.push(LayoutBinding {
                binding,
                kind,
                stages,
            });
        }
        bindings.sort_by_key(|b| b.binding);
        Ok(DescriptorSetLayout { set, bindings })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineLayout {
    pub sets: Vec<DescriptorSetLayout>,
    pub push_constants: PushConstantRange,
}

impl PipelineLayout {
    pub fn find(&self, set: u32, binding: u32) -> Option<&LayoutBinding> {
        self.sets
            .iter()
            .find(|s| s.set == set)
            .and_then(|s| s.binding(binding))
    }

    /// Every `(set, binding)` in [`MESH_BINDINGS`] is present with the same
    /// kind.
    pub fn matches_mesh_contract(&self) -> bool {
        MESH_BINDINGS.iter().all(|slot| {
            self.find(slot.set, slot.binding)
                .is_some_and(|b| b.kind == slot.kind && b.stages.contains(slot.stages))
        }) && self.push_constants == PUSH_CONSTANTS
    }
}

/// Layout of the mesh pipeline: the scene set, the material set and the
/// vertex-stage push constants.
pub fn mesh_pipeline_layout() -> Result<PipelineLayout> {
    let set_layout = |set: u32| {
        MESH_BINDINGS
            .iter()
            .filter(|slot| slot.set == set)
            .fold(DescriptorLayoutBuilder::new(), |builder, slot| {
                builder.add_binding(slot.binding, slot.kind)
            })
            .build(set, ShaderStages::VERTEX_FRAGMENT)
    };

    Ok(PipelineLayout {
        sets: vec![set_layout(0)?, set_layout(1)?],
        push_constants: PUSH_CONSTANTS,
    })
}
