//! Rendering System
//!
//! The renderer turns a [`ResourceRegistry`] and a [`Camera`] into a frame.
//! Each frame runs in fixed phases:
//!
//! 1. **Allocate**: assign shadow slots to lights within the budget
//! 2. **Extract**: flatten the registry into [`RenderLists`]
//! 3. **Upload**: sync meshes and materials, write camera/object/light buffers
//! 4. **Prepare**: every pass compiles pipelines and refreshes bind groups
//! 5. **Execute**: every pass records into one encoder, submitted once
//!
//! # Module Structure
//!
//! - `core`: wgpu context, RAII GPU resources, uniform layouts, readback
//! - `graph`: frame targets, render lists, shadow maps and the passes
//! - `pipeline`: shader templates and pipeline helpers
//! - `settings`: [`RendererSettings`]

pub mod core;
pub mod graph;
pub mod pipeline;
pub mod settings;

use std::path::Path;

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::assets::image_loader::load_cube_map_or_placeholder;
use crate::errors::Result;
use crate::registry::ResourceRegistry;
use crate::scene::Camera;

use self::core::uniforms::CameraUniforms;
use self::core::{GpuTexture, ResourceManager, WgpuContext};
use self::graph::passes::{
    BloomPass, GeometryPass, HighlightPass, LightGizmoPass, LightingPass, ShadowPass, SkyboxPass, SsaoPass,
    ToneMapPass,
};
use self::graph::{
    ExecuteContext, FrameTarget, FrameTargets, PrepareContext, RenderGraph, RenderLists, ShadowAllocation,
    ShadowMaps, SkyboxBinding, allocate_shadow_slots,
};
use self::pipeline::ShaderManager;
pub use self::settings::RendererSettings;

/// Deferred renderer.
///
/// Owns the GPU context, every GPU-side copy of registry data and the pass
/// graph. The registry itself stays with the caller and is only borrowed
/// for the duration of [`render`](Self::render).
pub struct Renderer {
    settings: RendererSettings,
    wgpu_ctx: WgpuContext,

    resources: ResourceManager,
    shader_manager: ShaderManager,
    graph: RenderGraph,

    frame: FrameTargets,
    shadow_maps: ShadowMaps,
    lists: RenderLists,
    allocation: ShadowAllocation,

    skybox: Option<GpuTexture>,
    skybox_generation: u64,

    /// Bumped whenever frame targets or shadow maps are reallocated.
    generation: u64,
    frame_count: u64,
}

impl Renderer {
    /// Creates a renderer presenting to `window`.
    pub async fn new<W>(window: W, settings: RendererSettings, width: u32, height: u32) -> Result<Self>
    where
        W: HasWindowHandle + HasDisplayHandle + Send + Sync + 'static,
    {
        let wgpu_ctx = WgpuContext::new(window, &settings, width, height).await?;
        Ok(Self::from_context(wgpu_ctx, settings))
    }

    /// Creates a renderer drawing into an offscreen target.
    pub async fn headless(settings: RendererSettings, width: u32, height: u32) -> Result<Self> {
        let wgpu_ctx = WgpuContext::headless(&settings, width, height).await?;
        Ok(Self::from_context(wgpu_ctx, settings))
    }

    fn from_context(wgpu_ctx: WgpuContext, settings: RendererSettings) -> Self {
        let device = &wgpu_ctx.device;
        let (width, height) = wgpu_ctx.size();

        let graph = RenderGraph::with_capacity(9)
            .with_node(Box::new(ShadowPass::new()))
            .with_node(Box::new(GeometryPass::new()))
            .with_node(Box::new(SsaoPass::new(device, &wgpu_ctx.queue)))
            .with_node(Box::new(LightingPass::new(device)))
            .with_node(Box::new(HighlightPass::new(device)))
            .with_node(Box::new(SkyboxPass::new(device)))
            .with_node(Box::new(LightGizmoPass::new()))
            .with_node(Box::new(BloomPass::new(device)))
            .with_node(Box::new(ToneMapPass::new(device)));

        let offscreen = wgpu_ctx.is_headless().then(|| wgpu_ctx.color_format());
        let frame = FrameTargets::new(device, width, height, offscreen, 0);
        let shadow_maps = ShadowMaps::new(
            device,
            settings.max_shadow_maps,
            settings.shadow_map_size,
            settings.point_shadow_map_size,
            0,
        );

        log::info!("Renderer initialised at {width}x{height} with {} passes", graph.node_count());

        Self {
            resources: ResourceManager::new(device, &wgpu_ctx.queue),
            shader_manager: ShaderManager::new(),
            graph,
            frame,
            shadow_maps,
            lists: RenderLists::default(),
            allocation: ShadowAllocation::default(),
            skybox: None,
            skybox_generation: 0,
            generation: 0,
            frame_count: 0,
            settings,
            wgpu_ctx,
        }
    }

    /// Recreates the surface and every frame target. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 || (width, height) == (self.frame.width, self.frame.height) {
            return;
        }
        self.wgpu_ctx.resize(width, height);
        self.generation += 1;
        let offscreen = self.wgpu_ctx.is_headless().then(|| self.wgpu_ctx.color_format());
        self.frame = FrameTargets::new(&self.wgpu_ctx.device, width, height, offscreen, self.generation);
    }

    /// Loads a cube map from six faces (right, left, top, bottom, front, back).
    ///
    /// Unreadable faces are replaced by placeholders and logged.
    pub fn set_skybox<P: AsRef<Path>>(&mut self, faces: &[P]) {
        let data = load_cube_map_or_placeholder(faces);
        self.skybox = Some(GpuTexture::upload(&self.wgpu_ctx.device, &self.wgpu_ctx.queue, &data));
        self.skybox_generation += 1;
    }

    pub fn clear_skybox(&mut self) {
        self.skybox = None;
    }

    /// Renders one frame of `registry` as seen by `camera`.
    pub fn render(&mut self, registry: &ResourceRegistry, camera: &Camera) {
        // 1. Shadow slots
        let allocation = allocate_shadow_slots(
            registry.lights_by_creation().map(|(handle, light)| (handle, light.light_type())),
            self.settings.max_shadow_maps,
        );
        if allocation.skipped() != self.allocation.skipped() && !allocation.skipped().is_empty() {
            log::warn!(
                "{} light(s) exceed the shadow budget of {} and cast no shadows",
                allocation.skipped().len(),
                self.settings.max_shadow_maps
            );
        }
        self.allocation = allocation;

        // 2. Extract
        self.lists.extract(registry, &self.allocation);

        // 3. Upload
        let device = &self.wgpu_ctx.device;
        let queue = &self.wgpu_ctx.queue;
        self.resources.sync_meshes(device, registry);
        self.resources.sync_materials(device, queue, registry);
        self.resources
            .write_camera(queue, &CameraUniforms::new(camera, self.frame.width, self.frame.height));
        self.resources.write_objects(device, queue, &self.lists.objects);
        self.resources.write_lights(
            device,
            queue,
            &self.lists.lights,
            &self.lists.shadow_matrices,
            &self.lists.shadow_view_uniforms(),
        );

        let settings = &self.settings;
        if !self.shadow_maps.matches(
            settings.max_shadow_maps,
            settings.shadow_map_size,
            settings.point_shadow_map_size,
        ) {
            self.generation += 1;
            self.shadow_maps = ShadowMaps::new(
                device,
                settings.max_shadow_maps,
                settings.shadow_map_size,
                settings.point_shadow_map_size,
                self.generation,
            );
        }

        // 4. Prepare
        let mut prepare_ctx = PrepareContext {
            wgpu_ctx: &self.wgpu_ctx,
            registry,
            settings: &self.settings,
            resources: &self.resources,
            shader_manager: &mut self.shader_manager,
            frame: &self.frame,
            shadow_maps: &self.shadow_maps,
            lists: &self.lists,
            skybox: self.skybox.as_ref().map(|texture| SkyboxBinding {
                texture,
                generation: self.skybox_generation,
            }),
        };
        self.graph.prepare(&mut prepare_ctx);

        // 5. Execute
        let surface_texture = match &self.wgpu_ctx.surface {
            Some(surface) => match surface.get_current_texture() {
                wgpu::CurrentSurfaceTexture::Success(output) | wgpu::CurrentSurfaceTexture::Suboptimal(output) => {
                    Some(output)
                }
                wgpu::CurrentSurfaceTexture::Lost | wgpu::CurrentSurfaceTexture::Outdated => {
                    let (width, height) = self.wgpu_ctx.size();
                    self.wgpu_ctx.resize(width, height);
                    return;
                }
                e => {
                    log::error!("Failed to acquire surface texture: {e:?}");
                    return;
                }
            },
            None => None,
        };

        let surface_view = surface_texture
            .as_ref()
            .map(|output| output.texture.create_view(&wgpu::TextureViewDescriptor::default()));
        let Some(output_view) = surface_view
            .as_ref()
            .or_else(|| self.frame.output.as_ref().map(|target| &target.view))
        else {
            return;
        };

        let execute_ctx = ExecuteContext {
            wgpu_ctx: &self.wgpu_ctx,
            registry,
            settings: &self.settings,
            resources: &self.resources,
            frame: &self.frame,
            shadow_maps: &self.shadow_maps,
            lists: &self.lists,
            output_view,
        };
        self.graph.execute(&execute_ctx);

        if let Some(output) = surface_texture {
            output.present();
        }
        self.frame_count += 1;
    }

    /// Copies a frame target back to the CPU and decodes it to RGBA floats.
    ///
    /// Returns `None` for targets that do not exist (the offscreen output of
    /// a windowed renderer).
    #[must_use]
    pub fn read_target(&self, target: FrameTarget) -> Option<Vec<[f32; 4]>> {
        self.frame
            .target(target)
            .map(|t| self::core::readback::read_target(&self.wgpu_ctx, t))
    }

    #[must_use]
    pub fn settings(&self) -> &RendererSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut RendererSettings {
        &mut self.settings
    }

    /// Pass names in execution order.
    #[must_use]
    pub fn pass_names(&self) -> Vec<&str> {
        self.graph.node_names()
    }

    /// Shadow slot assignment of the last rendered frame.
    #[must_use]
    pub fn shadow_allocation(&self) -> &ShadowAllocation {
        &self.allocation
    }

    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.frame.width, self.frame.height)
    }

    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    #[must_use]
    pub fn context(&self) -> &WgpuContext {
        &self.wgpu_ctx
    }

    /// GPU-side caches, for diagnostics.
    #[must_use]
    pub fn resources(&self) -> &ResourceManager {
        &self.resources
    }
}
