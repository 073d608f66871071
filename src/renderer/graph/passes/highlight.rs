//! Highlight Pass
//!
//! Draws an outline around the selected entity. Each selected component is
//! redrawn with its vertices pushed along the normal by the outline width,
//! and the stencil test (`!= SELECTED_STENCIL`) keeps only the rim outside
//! the original silhouette.
//!
//! Depth is ignored so the outline stays visible through occluders.

use glam::Vec4;

use crate::renderer::core::uniforms::HighlightUniforms;
use crate::renderer::graph::context::{ExecuteContext, PrepareContext};
use crate::renderer::graph::frame::{DEPTH_STENCIL_FORMAT, HDR_FORMAT, SELECTED_STENCIL};
use crate::renderer::graph::node::RenderNode;
use crate::renderer::pipeline::{
    MeshPipelineDescriptor, ShaderDefines, color_target, create_mesh_pipeline, depth_state, stencil_state,
    vertex_layout,
};

use super::{color_attachment, load_depth_stencil, uniform_entry};

pub struct HighlightPass {
    pipeline: Option<wgpu::RenderPipeline>,
    layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl HighlightPass {
    #[must_use]
    pub fn new(device: &wgpu::Device) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Highlight Layout"),
            entries: &[
                // Binding 0: outline colour + width
                uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT),
            ],
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Highlight Uniforms"),
            size: std::mem::size_of::<HighlightUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Highlight BindGroup"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        Self {
            pipeline: None,
            layout,
            uniform_buffer,
            bind_group,
        }
    }
}

impl RenderNode for HighlightPass {
    fn name(&self) -> &str {
        "Highlight Pass"
    }

    fn prepare(&mut self, ctx: &mut PrepareContext) {
        if self.pipeline.is_none() {
            let device = &ctx.wgpu_ctx.device;
            let (module, _) = ctx
                .shader_manager
                .get_or_compile_template(device, "highlight", &ShaderDefines::new());

            let mut depth_stencil = depth_state(DEPTH_STENCIL_FORMAT, false, wgpu::CompareFunction::Always);
            depth_stencil.stencil = stencil_state(wgpu::CompareFunction::NotEqual, wgpu::StencilOperation::Keep, 0);

            self.pipeline = Some(create_mesh_pipeline(
                device,
                &MeshPipelineDescriptor {
                    label: "Highlight Pipeline",
                    module,
                    bind_group_layouts: &[
                        ctx.resources.camera_layout(),
                        ctx.resources.object_layout(),
                        &self.layout,
                    ],
                    vertex_buffers: &[vertex_layout()],
                    targets: &[color_target(HDR_FORMAT)],
                    depth_stencil: Some(depth_stencil),
                    cull_mode: None,
                },
            ));
        }

        let [r, g, b] = ctx.settings.outline_color;
        let uniforms = HighlightUniforms {
            color: Vec4::new(r, g, b, 1.0),
            params: Vec4::new(ctx.settings.outline_width, 0.0, 0.0, 0.0),
        };
        ctx.wgpu_ctx
            .queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder) {
        let Some(pipeline) = &self.pipeline else {
            return;
        };
        if ctx.lists.selected_draws().next().is_none() {
            return;
        }

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Highlight Pass"),
            color_attachments: &[color_attachment(&ctx.frame.hdr.view, wgpu::LoadOp::Load)],
            depth_stencil_attachment: Some(load_depth_stencil(&ctx.frame.depth_stencil.view)),
            ..Default::default()
        });

        pass.set_pipeline(pipeline);
        pass.set_stencil_reference(SELECTED_STENCIL);
        pass.set_bind_group(0, ctx.resources.camera_bind_group(), &[]);
        pass.set_bind_group(2, &self.bind_group, &[]);

        for draw in ctx.lists.selected_draws() {
            let Some(mesh) = ctx.resources.mesh(draw.mesh) else {
                continue;
            };
            pass.set_bind_group(
                1,
                ctx.resources.object_bind_group(),
                &[ctx.resources.object_offset(draw.object_index)],
            );
            mesh.draw(&mut pass);
        }
    }
}
