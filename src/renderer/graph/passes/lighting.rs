//! Lighting Pass
//!
//! Fullscreen Blinn-Phong resolve of the G-buffer into two HDR targets:
//! the lit colour and its bright part (luminance above the threshold),
//! which feeds bloom.
//!
//! Every light in the registry contributes; lights holding a shadow slot
//! sample their map with 3×3 PCF through a comparison sampler. Pixels the
//! geometry pass left empty receive the clear colour.
//!
//! The light count is dynamic (storage buffer); only the shadow budget is
//! baked into the shader, so the pipeline is recompiled when it changes.

use glam::Vec4;

use crate::renderer::core::uniforms::LightingUniforms;
use crate::renderer::graph::context::{ExecuteContext, PrepareContext};
use crate::renderer::graph::frame::HDR_FORMAT;
use crate::renderer::graph::node::RenderNode;
use crate::renderer::pipeline::{ShaderDefines, color_target, create_fullscreen_pipeline};

use super::{color_attachment, sampler_entry, storage_entry, texture_entry, uniform_entry};

/// Generations of every resource the bind group references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BindingKey {
    frame: u64,
    buffers: u64,
    shadow_maps: u64,
}

pub struct LightingPass {
    pipeline: Option<wgpu::RenderPipeline>,
    pipeline_hash: u128,

    layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    /// `LessEqual` comparison, linear filtering for hardware PCF.
    shadow_sampler: wgpu::Sampler,

    bind_group: Option<wgpu::BindGroup>,
    bound: Option<BindingKey>,
}

impl LightingPass {
    #[must_use]
    pub fn new(device: &wgpu::Device) -> Self {
        let depth_array = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Depth,
                view_dimension: wgpu::TextureViewDimension::D2Array,
                multisampled: false,
            },
            count: None,
        };

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Lighting Layout"),
            entries: &[
                // Binding 0: camera
                uniform_entry(0, wgpu::ShaderStages::FRAGMENT),
                // Binding 1: lighting parameters
                uniform_entry(1, wgpu::ShaderStages::FRAGMENT),
                // Binding 2: lights
                storage_entry(2),
                // Binding 3: shadow matrices
                storage_entry(3),
                // Binding 4-7: g_position, g_normal, g_albedo, ssao
                texture_entry(4, wgpu::TextureViewDimension::D2),
                texture_entry(5, wgpu::TextureViewDimension::D2),
                texture_entry(6, wgpu::TextureViewDimension::D2),
                texture_entry(7, wgpu::TextureViewDimension::D2),
                // Binding 8: directional/spot shadow maps
                depth_array(8),
                // Binding 9: point shadow faces
                depth_array(9),
                // Binding 10: comparison sampler
                sampler_entry(10, wgpu::SamplerBindingType::Comparison),
            ],
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Lighting Uniforms"),
            size: std::mem::size_of::<LightingUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let shadow_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Shadow Comparison Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        Self {
            pipeline: None,
            pipeline_hash: 0,
            layout,
            uniform_buffer,
            shadow_sampler,
            bind_group: None,
            bound: None,
        }
    }

    fn rebuild_bind_group(&mut self, ctx: &PrepareContext) {
        let frame = ctx.frame;
        let resources = ctx.resources;
        let view = wgpu::BindingResource::TextureView;

        self.bind_group = Some(ctx.wgpu_ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Lighting BindGroup"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: resources.camera_buffer().as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: resources.light_buffer().as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: resources.shadow_matrix_buffer().as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: view(&frame.position.view),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: view(&frame.normal.view),
                },
                wgpu::BindGroupEntry {
                    binding: 6,
                    resource: view(&frame.albedo.view),
                },
                wgpu::BindGroupEntry {
                    binding: 7,
                    resource: view(&frame.ssao.view),
                },
                wgpu::BindGroupEntry {
                    binding: 8,
                    resource: view(&ctx.shadow_maps.planar.view),
                },
                wgpu::BindGroupEntry {
                    binding: 9,
                    resource: view(&ctx.shadow_maps.point.view),
                },
                wgpu::BindGroupEntry {
                    binding: 10,
                    resource: wgpu::BindingResource::Sampler(&self.shadow_sampler),
                },
            ],
        }));
    }
}

impl RenderNode for LightingPass {
    fn name(&self) -> &str {
        "Lighting Pass"
    }

    fn prepare(&mut self, ctx: &mut PrepareContext) {
        let device = &ctx.wgpu_ctx.device;
        let budget = ctx.shadow_maps.budget;

        let defines = ShaderDefines::new().with("MAX_SHADOW_MAPS", budget);
        let (module, hash) = ctx
            .shader_manager
            .get_or_compile_template(device, "lighting", &defines);
        if self.pipeline.is_none() || self.pipeline_hash != hash {
            self.pipeline = Some(create_fullscreen_pipeline(
                device,
                "Lighting Pipeline",
                module,
                &[&self.layout],
                &[color_target(HDR_FORMAT), color_target(HDR_FORMAT)],
            ));
            self.pipeline_hash = hash;
        }

        let key = BindingKey {
            frame: ctx.frame.generation,
            buffers: ctx.resources.buffer_generation(),
            shadow_maps: ctx.shadow_maps.generation,
        };
        if self.bound != Some(key) {
            self.rebuild_bind_group(ctx);
            self.bound = Some(key);
        }

        let [r, g, b] = ctx.settings.clear_color;
        let uniforms = LightingUniforms {
            clear_color: Vec4::new(r, g, b, 1.0),
            light_count: ctx.resources.light_count(),
            max_shadow_maps: budget,
            bright_threshold: ctx.settings.bright_threshold,
            _pad0: 0.0,
            shadow_texel: Vec4::new(
                1.0 / ctx.shadow_maps.planar_size.max(1) as f32,
                1.0 / ctx.shadow_maps.point_size.max(1) as f32,
                0.0,
                0.0,
            ),
        };
        ctx.wgpu_ctx
            .queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder) {
        let (Some(pipeline), Some(bind_group)) = (&self.pipeline, &self.bind_group) else {
            return;
        };
        let clear = wgpu::LoadOp::Clear(wgpu::Color::BLACK);

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Lighting Pass"),
            color_attachments: &[
                color_attachment(&ctx.frame.hdr.view, clear),
                color_attachment(&ctx.frame.bright.view, clear),
            ],
            ..Default::default()
        });
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}
