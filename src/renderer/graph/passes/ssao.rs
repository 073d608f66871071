//! Screen Space Ambient Occlusion (SSAO) Pass
//!
//! Two sub-passes over the G-buffer:
//!
//! 1. **Raw SSAO**: hemisphere sampling around each fragment using the
//!    view-space position and normal, a 64-sample kernel and a 4×4 tiled
//!    rotation noise texture.
//! 2. **Blur**: a 4×4 box filter matching the noise tile, removing the
//!    rotation pattern.
//!
//! # Data Flow
//!
//! ```text
//! GeometryPass              SsaoPass
//!        │             ┌──────────────────────────┐
//!  g_position ───┬────►│  Sub-Pass 1: Raw SSAO    │──► ssao_raw (R8)
//!  g_normal   ───┘     │                          │         │
//!                      │  Sub-Pass 2: Box Blur    │◄────────┘
//!                      │                          │──► ssao (R8)
//!                      └──────────────────────────┘
//!                                   │
//!                            LightingPass (binding 7)
//! ```
//!
//! When disabled both targets are cleared to 1 (no occlusion) so the
//! lighting pass can sample them unconditionally.

use glam::Vec4;

use crate::renderer::core::GpuTexture;
use crate::renderer::core::uniforms::SsaoUniforms;
use crate::renderer::graph::context::{ExecuteContext, PrepareContext};
use crate::renderer::graph::frame::SSAO_FORMAT;
use crate::renderer::graph::node::RenderNode;
use crate::renderer::pipeline::{ShaderDefines, color_target, create_fullscreen_pipeline};
use crate::resources::ssao::{
    SSAO_KERNEL_SIZE, SSAO_NOISE_DIM, SsaoSettings, generate_ssao_kernel, generate_ssao_noise,
};
use crate::resources::texture::TextureData;

use super::{color_attachment, sampler_entry, texture_entry, uniform_entry};

pub struct SsaoPass {
    // === Pipelines ===
    raw_pipeline: Option<wgpu::RenderPipeline>,
    blur_pipeline: Option<wgpu::RenderPipeline>,

    // === Bind Group Layouts ===
    raw_layout: wgpu::BindGroupLayout,
    blur_layout: wgpu::BindGroupLayout,

    // === Persistent Resources ===
    noise: GpuTexture,
    /// Nearest-neighbour, repeat sampler tiling the noise over the screen.
    noise_sampler: wgpu::Sampler,
    uniform_buffer: wgpu::Buffer,
    uniforms: SsaoUniforms,

    // === Bind Groups (rebuilt when the frame targets change) ===
    raw_bind_group: Option<wgpu::BindGroup>,
    blur_bind_group: Option<wgpu::BindGroup>,
    bound_generation: Option<u64>,

    enabled: bool,
}

impl SsaoPass {
    #[must_use]
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let raw_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("SSAO Raw Layout"),
            entries: &[
                // Binding 0: camera
                uniform_entry(0, wgpu::ShaderStages::FRAGMENT),
                // Binding 1: g_position
                texture_entry(1, wgpu::TextureViewDimension::D2),
                // Binding 2: g_normal
                texture_entry(2, wgpu::TextureViewDimension::D2),
                // Binding 3: noise
                texture_entry(3, wgpu::TextureViewDimension::D2),
                // Binding 4: noise sampler
                sampler_entry(4, wgpu::SamplerBindingType::Filtering),
                // Binding 5: kernel + params
                uniform_entry(5, wgpu::ShaderStages::FRAGMENT),
            ],
        });

        let blur_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("SSAO Blur Layout"),
            entries: &[
                // Binding 0: raw AO
                texture_entry(0, wgpu::TextureViewDimension::D2),
            ],
        });

        let noise_texels = generate_ssao_noise();
        let noise = GpuTexture::upload(
            device,
            queue,
            &TextureData {
                label: "SSAO Noise".to_string(),
                width: SSAO_NOISE_DIM,
                height: SSAO_NOISE_DIM,
                layers: 1,
                format: wgpu::TextureFormat::Rgba8Unorm,
                data: noise_texels.iter().flatten().copied().collect(),
            },
        );

        let noise_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("SSAO Noise Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let mut kernel = [Vec4::ZERO; SSAO_KERNEL_SIZE];
        for (slot, sample) in kernel.iter_mut().zip(generate_ssao_kernel(SSAO_KERNEL_SIZE)) {
            *slot = sample;
        }
        let uniforms = SsaoUniforms {
            kernel,
            params: Vec4::ZERO,
        };

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("SSAO Uniforms"),
            size: std::mem::size_of::<SsaoUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            raw_pipeline: None,
            blur_pipeline: None,
            raw_layout,
            blur_layout,
            noise,
            noise_sampler,
            uniform_buffer,
            uniforms,
            raw_bind_group: None,
            blur_bind_group: None,
            bound_generation: None,
            enabled: true,
        }
    }

    fn create_pipelines(&mut self, ctx: &mut PrepareContext) {
        let device = &ctx.wgpu_ctx.device;
        let defines = ShaderDefines::new()
            .with("KERNEL_SIZE", SSAO_KERNEL_SIZE)
            .with("NOISE_DIM", SSAO_NOISE_DIM);

        let (raw_module, _) = ctx
            .shader_manager
            .get_or_compile_template(device, "ssao_raw", &defines);
        self.raw_pipeline = Some(create_fullscreen_pipeline(
            device,
            "SSAO Raw Pipeline",
            raw_module,
            &[&self.raw_layout],
            &[color_target(SSAO_FORMAT)],
        ));

        let (blur_module, _) = ctx
            .shader_manager
            .get_or_compile_template(device, "ssao_blur", &defines);
        self.blur_pipeline = Some(create_fullscreen_pipeline(
            device,
            "SSAO Blur Pipeline",
            blur_module,
            &[&self.blur_layout],
            &[color_target(SSAO_FORMAT)],
        ));
    }

    fn rebuild_bind_groups(&mut self, ctx: &PrepareContext) {
        let device = &ctx.wgpu_ctx.device;
        let frame = ctx.frame;

        self.raw_bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("SSAO Raw BindGroup"),
            layout: &self.raw_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: ctx.resources.camera_buffer().as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&frame.position.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&frame.normal.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&self.noise.view),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(&self.noise_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
            ],
        }));

        self.blur_bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("SSAO Blur BindGroup"),
            layout: &self.blur_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&frame.ssao_raw.view),
            }],
        }));

        self.bound_generation = Some(frame.generation);
    }
}

impl RenderNode for SsaoPass {
    fn name(&self) -> &str {
        "SSAO Pass"
    }

    fn prepare(&mut self, ctx: &mut PrepareContext) {
        self.enabled = ctx.settings.ssao.enabled;

        if self.raw_pipeline.is_none() {
            self.create_pipelines(ctx);
        }
        if self.bound_generation != Some(ctx.frame.generation) {
            self.rebuild_bind_groups(ctx);
        }

        let settings = &ctx.settings.ssao;
        let scale = SsaoSettings::noise_scale(ctx.frame.width, ctx.frame.height);
        self.uniforms.params = Vec4::new(scale.x, scale.y, settings.radius, settings.bias);
        ctx.wgpu_ctx
            .queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&self.uniforms));
    }

    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder) {
        let frame = ctx.frame;
        let white = wgpu::LoadOp::Clear(wgpu::Color::WHITE);

        let sub_passes = [
            (&frame.ssao_raw, &self.raw_pipeline, &self.raw_bind_group, "SSAO Raw"),
            (&frame.ssao, &self.blur_pipeline, &self.blur_bind_group, "SSAO Blur"),
        ];

        for (target, pipeline, bind_group, label) in sub_passes {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(label),
                color_attachments: &[color_attachment(&target.view, white)],
                ..Default::default()
            });
            if !self.enabled {
                continue;
            }
            if let (Some(pipeline), Some(bind_group)) = (pipeline, bind_group) {
                pass.set_pipeline(pipeline);
                pass.set_bind_group(0, bind_group, &[]);
                pass.draw(0..3, 0..1);
            }
        }
    }
}
