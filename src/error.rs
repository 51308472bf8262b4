use std::path::PathBuf;
use thiserror::Error;

/// Host-side failures. The shading stages themselves never fail; everything
/// here is caught before a draw reaches them.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read config file '{}': {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("failed to load texture '{}': {source}", path.display())]
    TextureLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("invalid texture: {0}")]
    InvalidTexture(String),

    #[error("failed to save image to '{}': {source}", path.display())]
    ImageSave {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to write '{}': {source}", path.display())]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("buffer handle {0:#x} does not reference a live vertex allocation")]
    InvalidBufferHandle(u64),

    #[error("vertex index {index} out of bounds for buffer {handle:#x} holding {len} vertices")]
    VertexIndexOutOfBounds { handle: u64, index: u32, len: usize },

    #[error("index range {first}..{end} exceeds index buffer of length {len}")]
    IndexRangeOutOfBounds { first: u32, end: u64, len: usize },

    #[error("refusing to upload an empty vertex buffer")]
    EmptyBuffer,

    #[error("vertex pool exhausted: {requested} bytes requested at offset {offset:#x}")]
    PoolExhausted { offset: u64, requested: u64 },

    #[error("binding {binding} declared twice in set {set}")]
    DuplicateBinding { set: u32, binding: u32 },

    #[error("invalid light: {0}")]
    InvalidLight(String),
}

pub type Result<T> = std::result::Result<T, Error>;
