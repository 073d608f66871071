//! Bloom Pass
//!
//! Separable Gaussian blur of the bright target, alternating between two
//! ping-pong targets:
//!
//! ```text
//!  bright ──H──► pingpong[1] ──V──► pingpong[0] ──H──► pingpong[1] ──► …
//! ```
//!
//! Pass `k` blurs horizontally when `k` is even. The first pass reads the
//! bright target, later passes read the other ping-pong target. The final
//! destination is [`bloom_output_index`](crate::resources::bloom::bloom_output_index),
//! which the tone map pass samples.

use crate::renderer::core::uniforms::BlurUniforms;
use crate::renderer::graph::context::{ExecuteContext, PrepareContext};
use crate::renderer::graph::frame::HDR_FORMAT;
use crate::renderer::graph::node::RenderNode;
use crate::renderer::pipeline::{ShaderDefines, color_target, create_fullscreen_pipeline};
use crate::resources::bloom::{BlurSource, blur_step};

use super::{color_attachment, sampler_entry, texture_entry, uniform_entry};

pub struct BloomPass {
    pipeline: Option<wgpu::RenderPipeline>,

    // === Bind Group Layouts ===
    source_layout: wgpu::BindGroupLayout,
    direction_layout: wgpu::BindGroupLayout,

    sampler: wgpu::Sampler,
    /// Index 0 blurs vertically, index 1 horizontally.
    direction_bind_groups: [wgpu::BindGroup; 2],

    /// `[bright, pingpong[0], pingpong[1]]`, rebuilt on resize.
    source_bind_groups: Option<[wgpu::BindGroup; 3]>,
    bound_generation: Option<u64>,

    iterations: u32,
    enabled: bool,
}

impl BloomPass {
    #[must_use]
    pub fn new(device: &wgpu::Device) -> Self {
        let source_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Bloom Source Layout"),
            entries: &[
                // Binding 0: source image
                texture_entry(0, wgpu::TextureViewDimension::D2),
                // Binding 1: sampler
                sampler_entry(1, wgpu::SamplerBindingType::Filtering),
            ],
        });

        let direction_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Bloom Direction Layout"),
            entries: &[
                // Binding 0: blur direction
                uniform_entry(0, wgpu::ShaderStages::FRAGMENT),
            ],
        });

        let direction_bind_groups = [false, true].map(|horizontal| {
            let buffer = wgpu::util::DeviceExt::create_buffer_init(
                device,
                &wgpu::util::BufferInitDescriptor {
                    label: Some("Bloom Direction Uniforms"),
                    contents: bytemuck::bytes_of(&BlurUniforms {
                        horizontal: u32::from(horizontal),
                        _pad: [0; 3],
                    }),
                    usage: wgpu::BufferUsages::UNIFORM,
                },
            );
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Bloom Direction BindGroup"),
                layout: &direction_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
            })
        });

        Self {
            pipeline: None,
            source_layout,
            direction_layout,
            sampler: super::linear_clamp_sampler(device, "Bloom Sampler"),
            direction_bind_groups,
            source_bind_groups: None,
            bound_generation: None,
            iterations: 0,
            enabled: false,
        }
    }

    fn rebuild_source_bind_groups(&mut self, ctx: &PrepareContext) {
        let frame = ctx.frame;
        let sources = [&frame.bright, &frame.pingpong[0], &frame.pingpong[1]];

        self.source_bind_groups = Some(sources.map(|target| {
            ctx.wgpu_ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Bloom Source BindGroup"),
                layout: &self.source_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&target.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                ],
            })
        }));
        self.bound_generation = Some(frame.generation);
    }
}

impl RenderNode for BloomPass {
    fn name(&self) -> &str {
        "Bloom Pass"
    }

    fn prepare(&mut self, ctx: &mut PrepareContext) {
        self.enabled = ctx.settings.bloom.enabled;
        self.iterations = ctx.settings.bloom.iterations();

        if self.pipeline.is_none() {
            let device = &ctx.wgpu_ctx.device;
            let (module, _) = ctx
                .shader_manager
                .get_or_compile_template(device, "bloom_blur", &ShaderDefines::new());
            self.pipeline = Some(create_fullscreen_pipeline(
                device,
                "Bloom Blur Pipeline",
                module,
                &[&self.source_layout, &self.direction_layout],
                &[color_target(HDR_FORMAT)],
            ));
        }

        if self.bound_generation != Some(ctx.frame.generation) {
            self.rebuild_source_bind_groups(ctx);
        }
    }

    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder) {
        if !self.enabled {
            return;
        }
        let (Some(pipeline), Some(sources)) = (&self.pipeline, &self.source_bind_groups) else {
            return;
        };

        for iteration in 0..self.iterations {
            let (source, dst, horizontal) = blur_step(iteration);
            let source = match source {
                BlurSource::Bright => &sources[0],
                BlurSource::PingPong(index) => &sources[1 + index],
            };

            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Bloom Blur"),
                color_attachments: &[color_attachment(
                    &ctx.frame.pingpong[dst].view,
                    wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                )],
                ..Default::default()
            });
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, source, &[]);
            pass.set_bind_group(1, &self.direction_bind_groups[usize::from(horizontal)], &[]);
            pass.draw(0..3, 0..1);
        }
    }
}
