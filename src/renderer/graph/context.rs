//! Render Graph Context System
//!
//! Two phase-separated contexts:
//!
//! - [`PrepareContext`]: the **prepare** phase. Passes compile shaders,
//!   create pipelines and rebuild bind groups here.
//! - [`ExecuteContext`]: the **execute** phase. Read-only; passes record
//!   GPU commands.
//!
//! Both store individual references so the borrow checker can split
//! borrows across disjoint fields.

use crate::registry::ResourceRegistry;
use crate::renderer::core::{GpuTexture, ResourceManager, WgpuContext};
use crate::renderer::graph::extracted::RenderLists;
use crate::renderer::graph::frame::FrameTargets;
use crate::renderer::graph::shadow_utils::ShadowMaps;
use crate::renderer::pipeline::ShaderManager;
use crate::renderer::settings::RendererSettings;

/// Skybox cube texture plus a counter bumped whenever it is replaced.
pub struct SkyboxBinding<'a> {
    pub texture: &'a GpuTexture,
    pub generation: u64,
}

pub struct PrepareContext<'a> {
    pub wgpu_ctx: &'a WgpuContext,
    pub registry: &'a ResourceRegistry,
    pub settings: &'a RendererSettings,
    pub resources: &'a ResourceManager,
    pub shader_manager: &'a mut ShaderManager,
    pub frame: &'a FrameTargets,
    pub shadow_maps: &'a ShadowMaps,
    pub lists: &'a RenderLists,
    pub skybox: Option<SkyboxBinding<'a>>,
}

pub struct ExecuteContext<'a> {
    pub wgpu_ctx: &'a WgpuContext,
    pub registry: &'a ResourceRegistry,
    pub settings: &'a RendererSettings,
    pub resources: &'a ResourceManager,
    pub frame: &'a FrameTargets,
    pub shadow_maps: &'a ShadowMaps,
    pub lists: &'a RenderLists,
    /// Final colour destination: the surface texture or the offscreen output.
    pub output_view: &'a wgpu::TextureView,
}
