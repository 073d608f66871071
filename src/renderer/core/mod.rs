//! Core GPU layer
//!
//! - WgpuContext: device, queue, optional surface and its configuration
//! - RAII wrappers: render targets, meshes, textures, growable buffers
//! - ResourceManager: GPU mirrors of registry resources and per-frame buffers
//! - Uniform layouts shared with the WGSL chunks

pub mod context;
pub mod gpu;
pub mod readback;
pub mod resources;
pub mod uniforms;

pub use context::{HEADLESS_OUTPUT_FORMAT, WgpuContext};
pub use gpu::{GpuMesh, GpuTexture, GrowableBuffer, RenderTarget};
pub use resources::ResourceManager;
