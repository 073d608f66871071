//! Umbra: an interactive 3D scene editor with a deferred wgpu renderer.
//!
//! - [`registry`]: handle-keyed tables of entities, meshes, materials,
//!   lights and shaders
//! - [`renderer`]: shadows, G-buffer, SSAO, lighting, outline, skybox,
//!   bloom and tone mapping
//! - [`app`]: keyboard controller and (with `winit`) the windowed editor
//! - [`config`]: JSON editor configuration

#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod app;
pub mod assets;
pub mod config;
pub mod errors;
pub mod registry;
pub mod renderer;
pub mod resources;
pub mod scene;
pub mod utils;

pub use app::{EditorCommand, EditorController};
pub use config::EditorConfig;
pub use errors::{Result, UmbraError};
pub use registry::{EntityHandle, LightHandle, MaterialHandle, MeshHandle, ResourceRegistry, ShaderHandle};
pub use renderer::core::WgpuContext;
pub use renderer::{Renderer, RendererSettings};
pub use resources::{Material, Mesh, MeshType, Shader, ShaderSource};
pub use scene::{Camera, Entity, Light, LightType, Transform};
