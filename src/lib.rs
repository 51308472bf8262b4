//! Lambert + ambient mesh shading.
//!
//! The crate carries the two shading stages of a textured mesh pipeline
//! (vertex transform through a buffer handle, diffuse + ambient fragment
//! lighting) together with everything needed to drive them: wire-exact
//! mirrors of the uniform and push-constant blocks, the binding layout
//! contract, the same programs in WGSL, and a software backend that executes
//! them the way a GPU would.

pub mod app;
pub mod core;
pub mod error;
pub mod gpu;
pub mod io;
pub mod pipeline;
pub mod scene;

pub use error::{Error, Result};
