//! Tone Map Pass
//!
//! Final composite: HDR colour plus the blurred bloom, exposure-scaled and
//! mapped to display range with the selected operator. Gamma is applied in
//! the shader only when the output format is not sRGB.
//!
//! The operator is a template define, so switching modes compiles (once) and
//! swaps the pipeline.

use crate::renderer::core::uniforms::ToneMapUniforms;
use crate::renderer::graph::context::{ExecuteContext, PrepareContext};
use crate::renderer::graph::node::RenderNode;
use crate::renderer::pipeline::{ShaderDefines, color_target, create_fullscreen_pipeline};
use crate::resources::bloom::bloom_output_index;

use super::{color_attachment, sampler_entry, texture_entry, uniform_entry};

pub struct ToneMapPass {
    pipeline: Option<wgpu::RenderPipeline>,
    /// Template hash and output format of the current pipeline.
    pipeline_key: Option<(u128, wgpu::TextureFormat)>,

    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    uniform_buffer: wgpu::Buffer,

    /// One bind group per ping-pong target holding the final bloom.
    bind_groups: Option<[wgpu::BindGroup; 2]>,
    bound_generation: Option<u64>,
    bloom_index: usize,
}

impl ToneMapPass {
    #[must_use]
    pub fn new(device: &wgpu::Device) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Tone Mapping Layout"),
            entries: &[
                // Binding 0: HDR colour
                texture_entry(0, wgpu::TextureViewDimension::D2),
                // Binding 1: bloom
                texture_entry(1, wgpu::TextureViewDimension::D2),
                // Binding 2: sampler
                sampler_entry(2, wgpu::SamplerBindingType::Filtering),
                // Binding 3: exposure, bloom strength, gamma flag
                uniform_entry(3, wgpu::ShaderStages::FRAGMENT),
            ],
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Tone Mapping Uniforms"),
            size: std::mem::size_of::<ToneMapUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            pipeline: None,
            pipeline_key: None,
            layout,
            sampler: super::linear_clamp_sampler(device, "Tone Mapping Sampler"),
            uniform_buffer,
            bind_groups: None,
            bound_generation: None,
            bloom_index: 0,
        }
    }

    fn rebuild_bind_groups(&mut self, ctx: &PrepareContext) {
        let frame = ctx.frame;
        self.bind_groups = Some([&frame.pingpong[0], &frame.pingpong[1]].map(|bloom| {
            ctx.wgpu_ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Tone Mapping BindGroup"),
                layout: &self.layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&frame.hdr.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(&bloom.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: self.uniform_buffer.as_entire_binding(),
                    },
                ],
            })
        }));
        self.bound_generation = Some(frame.generation);
    }
}

impl RenderNode for ToneMapPass {
    fn name(&self) -> &str {
        "Tone Map Pass"
    }

    fn prepare(&mut self, ctx: &mut PrepareContext) {
        let device = &ctx.wgpu_ctx.device;
        let settings = ctx.settings;
        let format = ctx.wgpu_ctx.color_format();

        let defines =
            ShaderDefines::new().with("TONE_MAPPING_MODE", settings.tone_mapping.mode.template_value());
        let (module, hash) = ctx
            .shader_manager
            .get_or_compile_template(device, "tone_mapping", &defines);
        if self.pipeline_key != Some((hash, format)) {
            self.pipeline = Some(create_fullscreen_pipeline(
                device,
                "Tone Mapping Pipeline",
                module,
                &[&self.layout],
                &[color_target(format)],
            ));
            self.pipeline_key = Some((hash, format));
        }

        if self.bound_generation != Some(ctx.frame.generation) {
            self.rebuild_bind_groups(ctx);
        }

        self.bloom_index = bloom_output_index(settings.bloom.iterations());
        let uniforms = ToneMapUniforms {
            exposure: settings.tone_mapping.exposure(),
            bloom_strength: if settings.bloom.enabled {
                settings.bloom.strength()
            } else {
                0.0
            },
            apply_gamma: u32::from(!ctx.wgpu_ctx.output_is_srgb()),
            _pad: 0,
        };
        ctx.wgpu_ctx
            .queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder) {
        let (Some(pipeline), Some(bind_groups)) = (&self.pipeline, &self.bind_groups) else {
            return;
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Tone Map Pass"),
            color_attachments: &[color_attachment(
                ctx.output_view,
                wgpu::LoadOp::Clear(wgpu::Color::BLACK),
            )],
            ..Default::default()
        });
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &bind_groups[self.bloom_index], &[]);
        pass.draw(0..3, 0..1);
    }
}
