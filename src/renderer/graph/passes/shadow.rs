//! Shadow Pass
//!
//! Renders scene depth from every light that holds a shadow slot.
//!
//! - Directional and spot lights: one orthographic/perspective view into a
//!   layer of the planar array
//! - Point lights: six 90° views into consecutive layers of the point array
//!
//! Front faces are culled while rendering depth, which pushes acne onto the
//! unlit side of closed meshes.

use crate::renderer::graph::context::{ExecuteContext, PrepareContext};
use crate::renderer::graph::node::RenderNode;
use crate::renderer::graph::shadow_utils::SHADOW_DEPTH_FORMAT;
use crate::renderer::pipeline::{
    MeshPipelineDescriptor, ShaderDefines, create_mesh_pipeline, depth_state, position_only_layout,
};

#[derive(Default)]
pub struct ShadowPass {
    pipeline: Option<wgpu::RenderPipeline>,
}

impl ShadowPass {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderNode for ShadowPass {
    fn name(&self) -> &str {
        "Shadow Pass"
    }

    fn prepare(&mut self, ctx: &mut PrepareContext) {
        if self.pipeline.is_some() {
            return;
        }
        let device = &ctx.wgpu_ctx.device;
        let (module, _) = ctx
            .shader_manager
            .get_or_compile_template(device, "shadow_depth", &ShaderDefines::new());

        self.pipeline = Some(create_mesh_pipeline(
            device,
            &MeshPipelineDescriptor {
                label: "Shadow Depth Pipeline",
                module,
                bind_group_layouts: &[ctx.resources.shadow_view_layout(), ctx.resources.object_layout()],
                vertex_buffers: &[position_only_layout()],
                targets: &[],
                depth_stencil: Some(depth_state(SHADOW_DEPTH_FORMAT, true, wgpu::CompareFunction::Less)),
                cull_mode: Some(wgpu::Face::Front),
            },
        ));
    }

    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder) {
        let Some(pipeline) = &self.pipeline else {
            return;
        };
        let device = &ctx.wgpu_ctx.device;

        for (index, view) in ctx.lists.shadow_views.iter().enumerate() {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Depth"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: ctx.shadow_maps.view_for(view),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_pipeline(pipeline);
            pass.set_bind_group(
                0,
                ctx.resources.shadow_view_bind_group(),
                &[ctx.resources.shadow_view_offset(device, index as u32)],
            );

            for draw in &ctx.lists.draws {
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
}
