//! Skybox Pass
//!
//! Draws a unit cube around the camera sampling the cube map. The vertex
//! shader generates the 36 cube vertices itself, strips the view translation
//! and writes `z = w`, so the sky sits on the far plane and only fills pixels
//! the scene left at depth 1.
//!
//! The stencil buffer is cleared here; nothing after this pass reads it.

use crate::renderer::graph::context::{ExecuteContext, PrepareContext};
use crate::renderer::graph::frame::{DEPTH_STENCIL_FORMAT, HDR_FORMAT};
use crate::renderer::graph::node::RenderNode;
use crate::renderer::pipeline::{
    MeshPipelineDescriptor, ShaderDefines, color_target, create_mesh_pipeline, depth_state,
};

use super::{color_attachment, sampler_entry, texture_entry, uniform_entry};

pub struct SkyboxPass {
    pipeline: Option<wgpu::RenderPipeline>,
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,

    bind_group: Option<wgpu::BindGroup>,
    /// Skybox generation the bind group was built for.
    bound_generation: Option<u64>,
}

impl SkyboxPass {
    #[must_use]
    pub fn new(device: &wgpu::Device) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Skybox Layout"),
            entries: &[
                // Binding 0: camera
                uniform_entry(0, wgpu::ShaderStages::VERTEX),
                // Binding 1: cube map
                texture_entry(1, wgpu::TextureViewDimension::Cube),
                // Binding 2: sampler
                sampler_entry(2, wgpu::SamplerBindingType::Filtering),
            ],
        });

        Self {
            pipeline: None,
            layout,
            sampler: super::linear_clamp_sampler(device, "Skybox Sampler"),
            bind_group: None,
            bound_generation: None,
        }
    }

    #[must_use]
    pub fn has_skybox(&self) -> bool {
        self.bind_group.is_some()
    }
}

impl RenderNode for SkyboxPass {
    fn name(&self) -> &str {
        "Skybox Pass"
    }

    fn prepare(&mut self, ctx: &mut PrepareContext) {
        let device = &ctx.wgpu_ctx.device;

        if self.pipeline.is_none() {
            let (module, _) = ctx
                .shader_manager
                .get_or_compile_template(device, "skybox", &ShaderDefines::new());
            self.pipeline = Some(create_mesh_pipeline(
                device,
                &MeshPipelineDescriptor {
                    label: "Skybox Pipeline",
                    module,
                    bind_group_layouts: &[&self.layout],
                    vertex_buffers: &[],
                    targets: &[color_target(HDR_FORMAT)],
                    depth_stencil: Some(depth_state(
                        DEPTH_STENCIL_FORMAT,
                        false,
                        wgpu::CompareFunction::LessEqual,
                    )),
                    cull_mode: None,
                },
            ));
        }

        let Some(skybox) = &ctx.skybox else {
            self.bind_group = None;
            self.bound_generation = None;
            return;
        };
        if self.bound_generation == Some(skybox.generation) {
            return;
        }

        self.bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Skybox BindGroup"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: ctx.resources.camera_buffer().as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&skybox.texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        }));
        self.bound_generation = Some(skybox.generation);
    }

    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Skybox Pass"),
            color_attachments: &[color_attachment(&ctx.frame.hdr.view, wgpu::LoadOp::Load)],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &ctx.frame.depth_stencil.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(0),
                    store: wgpu::StoreOp::Store,
                }),
            }),
            ..Default::default()
        });

        if let (Some(pipeline), Some(bind_group)) = (&self.pipeline, &self.bind_group) {
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, bind_group, &[]);
            pass.draw(0..36, 0..1);
        }
    }
}
