//! Geometry Pass
//!
//! Fills the G-buffer from every visible component:
//!
//! | Target   | Contents                                   |
//! |----------|--------------------------------------------|
//! | position | world position, shininess in `w`           |
//! | normal   | world normal, `w = 1` where geometry lies  |
//! | albedo   | diffuse colour, specular intensity in `a`  |
//!
//! The stencil buffer is written with [`SELECTED_STENCIL`] for the selected
//! entity and 0 elsewhere; the highlight pass tests against it.
//!
//! Materials pick one of three programs: the colour built-in, the textured
//! built-in (normal and parallax mapping), or a user WGSL shader. Custom
//! shaders bind the same three groups as the built-ins:
//!
//! ```text
//! group(0) camera   group(1) object (dynamic)   group(2) material
//! ```
//!
//! A custom shader that fails to load, compile or link against the G-buffer
//! layout falls back to the built-in for its material mode.

use rustc_hash::FxHashMap;

use crate::registry::ShaderHandle;
use crate::renderer::graph::context::{ExecuteContext, PrepareContext};
use crate::renderer::graph::extracted::GeometryProgram;
use crate::renderer::graph::frame::{
    ALBEDO_FORMAT, DEPTH_STENCIL_FORMAT, NORMAL_FORMAT, POSITION_FORMAT, SELECTED_STENCIL,
};
use crate::renderer::graph::node::RenderNode;
use crate::renderer::pipeline::{
    MeshPipelineDescriptor, ShaderDefines, color_target, create_mesh_pipeline, depth_state, stencil_state,
    vertex_layout,
};
use crate::resources::shader::ShaderSource;

use super::color_attachment;

struct CustomProgram {
    /// Source the pipeline was built from; a change forces a rebuild.
    source: ShaderSource,
    /// `None` when the shader failed and the built-in is used instead.
    pipeline: Option<wgpu::RenderPipeline>,
}

#[derive(Default)]
pub struct GeometryPass {
    // === Pipelines ===
    color_pipeline: Option<wgpu::RenderPipeline>,
    textured_pipeline: Option<wgpu::RenderPipeline>,
    custom: FxHashMap<ShaderHandle, CustomProgram>,
}

impl GeometryPass {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of custom shaders that compiled into a usable pipeline.
    #[must_use]
    pub fn custom_pipeline_count(&self) -> usize {
        self.custom.values().filter(|p| p.pipeline.is_some()).count()
    }

    fn build_custom(ctx: &mut PrepareContext, handle: ShaderHandle) -> Option<wgpu::RenderPipeline> {
        let registry = ctx.registry;
        let shader = registry.shader(handle);
        let source = match shader.load_wgsl() {
            Ok(Some(source)) => source,
            Ok(None) => return None,
            Err(e) => {
                log::error!("Shader '{}' could not be loaded: {e}", shader.name);
                return None;
            }
        };
        if !source.contains("fn vs_main") || !source.contains("fn fs_main") {
            log::error!("Shader '{}' must define both vs_main and fs_main", shader.name);
            return None;
        }

        let wgpu_ctx = ctx.wgpu_ctx;
        let device = &wgpu_ctx.device;
        let module = ctx.shader_manager.compile_custom(device, &shader.name, &source)?;

        // A module can validate on its own and still not fit the G-buffer
        // layout or targets; catch that here instead of poisoning the frame.
        let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = create_gbuffer_pipeline(
            device,
            &format!("Geometry Pipeline ({})", shader.name),
            &module,
            ctx,
        );
        if let Some(error) = pollster::block_on(scope.pop()) {
            log::error!("Shader '{}' does not fit the G-buffer pipeline: {error}", shader.name);
            return None;
        }
        Some(pipeline)
    }
}

fn create_gbuffer_pipeline(
    device: &wgpu::Device,
    label: &str,
    module: &wgpu::ShaderModule,
    ctx: &PrepareContext,
) -> wgpu::RenderPipeline {
    let mut depth_stencil = depth_state(DEPTH_STENCIL_FORMAT, true, wgpu::CompareFunction::Less);
    depth_stencil.stencil = stencil_state(wgpu::CompareFunction::Always, wgpu::StencilOperation::Replace, 0xff);

    create_mesh_pipeline(
        device,
        &MeshPipelineDescriptor {
            label,
            module,
            bind_group_layouts: &[
                ctx.resources.camera_layout(),
                ctx.resources.object_layout(),
                ctx.resources.material_layout(),
            ],
            vertex_buffers: &[vertex_layout()],
            targets: &[
                color_target(POSITION_FORMAT),
                color_target(NORMAL_FORMAT),
                color_target(ALBEDO_FORMAT),
            ],
            depth_stencil: Some(depth_stencil),
            cull_mode: None,
        },
    )
}

impl RenderNode for GeometryPass {
    fn name(&self) -> &str {
        "Geometry Pass"
    }

    fn prepare(&mut self, ctx: &mut PrepareContext) {
        let wgpu_ctx = ctx.wgpu_ctx;
        let device = &wgpu_ctx.device;

        if self.color_pipeline.is_none() {
            let (module, _) = ctx
                .shader_manager
                .get_or_compile_template(device, "gbuffer_color", &ShaderDefines::new());
            let module = module.clone();
            self.color_pipeline = Some(create_gbuffer_pipeline(device, "Geometry Color Pipeline", &module, ctx));
        }
        if self.textured_pipeline.is_none() {
            let (module, _) = ctx
                .shader_manager
                .get_or_compile_template(device, "gbuffer_textured", &ShaderDefines::new());
            let module = module.clone();
            self.textured_pipeline = Some(create_gbuffer_pipeline(
                device,
                "Geometry Textured Pipeline",
                &module,
                ctx,
            ));
        }

        // Drop programs whose shader was removed or whose source changed.
        let registry = ctx.registry;
        let lists = ctx.lists;
        self.custom.retain(|handle, program| {
            registry
                .try_shader(*handle)
                .is_some_and(|shader| *shader.source() == program.source)
        });

        for draw in &lists.draws {
            let GeometryProgram::Custom(handle) = draw.program else {
                continue;
            };
            if self.custom.contains_key(&handle) {
                continue;
            }
            let pipeline = Self::build_custom(ctx, handle);
            if pipeline.is_none() {
                log::warn!(
                    "Falling back to the built-in program for shader '{}'",
                    registry.shader(handle).name
                );
            }
            self.custom.insert(
                handle,
                CustomProgram {
                    source: registry.shader(handle).source().clone(),
                    pipeline,
                },
            );
        }
    }

    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder) {
        let frame = ctx.frame;
        let clear = wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT);

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Geometry Pass"),
            color_attachments: &[
                color_attachment(&frame.position.view, clear),
                color_attachment(&frame.normal.view, clear),
                color_attachment(&frame.albedo.view, clear),
            ],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &frame.depth_stencil.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(0),
                    store: wgpu::StoreOp::Store,
                }),
            }),
            ..Default::default()
        });

        pass.set_bind_group(0, ctx.resources.camera_bind_group(), &[]);

        for draw in &ctx.lists.draws {
            let Some(mesh) = ctx.resources.mesh(draw.mesh) else {
                continue;
            };
            let Some(material) = ctx.resources.material_bind_group(draw.material) else {
                continue;
            };

            let builtin = || {
                if ctx.registry.material(draw.material).is_color {
                    self.color_pipeline.as_ref()
                } else {
                    self.textured_pipeline.as_ref()
                }
            };
            let pipeline = match draw.program {
                GeometryProgram::Color => self.color_pipeline.as_ref(),
                GeometryProgram::Textured => self.textured_pipeline.as_ref(),
                GeometryProgram::Custom(handle) => self
                    .custom
                    .get(&handle)
                    .and_then(|p| p.pipeline.as_ref())
                    .or_else(builtin),
            };
            let Some(pipeline) = pipeline else {
                continue;
            };

            pass.set_pipeline(pipeline);
            pass.set_stencil_reference(if draw.selected { SELECTED_STENCIL } else { 0 });
            pass.set_bind_group(
                1,
                ctx.resources.object_bind_group(),
                &[ctx.resources.object_offset(draw.object_index)],
            );
            pass.set_bind_group(2, material, &[]);
            mesh.draw(&mut pass);
        }
    }
}
