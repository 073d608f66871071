//! Light Gizmo Pass
//!
//! Draws a small unlit cube at every visible point and spot light, coloured
//! with the light's diffuse colour. The cube also writes the bright target
//! so lights glow through bloom.

use crate::renderer::graph::context::{ExecuteContext, PrepareContext};
use crate::renderer::graph::frame::{DEPTH_STENCIL_FORMAT, HDR_FORMAT};
use crate::renderer::graph::node::RenderNode;
use crate::renderer::pipeline::{
    MeshPipelineDescriptor, ShaderDefines, color_target, create_mesh_pipeline, depth_state, position_only_layout,
};

use super::{color_attachment, load_depth_stencil};

#[derive(Default)]
pub struct LightGizmoPass {
    pipeline: Option<wgpu::RenderPipeline>,
}

impl LightGizmoPass {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderNode for LightGizmoPass {
    fn name(&self) -> &str {
        "Light Gizmo Pass"
    }

    fn prepare(&mut self, ctx: &mut PrepareContext) {
        if self.pipeline.is_some() {
            return;
        }
        let device = &ctx.wgpu_ctx.device;
        let (module, _) = ctx
            .shader_manager
            .get_or_compile_template(device, "light_gizmo", &ShaderDefines::new());

        self.pipeline = Some(create_mesh_pipeline(
            device,
            &MeshPipelineDescriptor {
                label: "Light Gizmo Pipeline",
                module,
                bind_group_layouts: &[ctx.resources.camera_layout(), ctx.resources.object_layout()],
                vertex_buffers: &[position_only_layout()],
                targets: &[color_target(HDR_FORMAT), color_target(HDR_FORMAT)],
                depth_stencil: Some(depth_state(DEPTH_STENCIL_FORMAT, true, wgpu::CompareFunction::Less)),
                cull_mode: None,
            },
        ));
    }

    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder) {
        let Some(pipeline) = &self.pipeline else {
            return;
        };
        if ctx.lists.gizmos.is_empty() {
            return;
        }
        let Some(cube) = ctx.resources.mesh(ctx.registry.gizmo_mesh()) else {
            return;
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Light Gizmo Pass"),
            color_attachments: &[
                color_attachment(&ctx.frame.hdr.view, wgpu::LoadOp::Load),
                color_attachment(&ctx.frame.bright.view, wgpu::LoadOp::Load),
            ],
            depth_stencil_attachment: Some(load_depth_stencil(&ctx.frame.depth_stencil.view)),
            ..Default::default()
        });

        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, ctx.resources.camera_bind_group(), &[]);
        for gizmo in &ctx.lists.gizmos {
            pass.set_bind_group(
                1,
                ctx.resources.object_bind_group(),
                &[ctx.resources.object_offset(gizmo.object_index)],
            );
            cube.draw(&mut pass);
        }
    }
}
