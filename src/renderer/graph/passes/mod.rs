//! Render Passes
//!
//! One [`RenderNode`](super::RenderNode) per stage of the deferred
//! pipeline, listed here in execution order:
//!
//! | Pass             | Reads                              | Writes                    |
//! |------------------|------------------------------------|---------------------------|
//! | [`ShadowPass`]   | draw list, shadow views            | shadow map arrays         |
//! | [`GeometryPass`] | draw list, materials               | G-buffer, depth, stencil  |
//! | [`SsaoPass`]     | position, normal                   | raw AO, blurred AO        |
//! | [`LightingPass`] | G-buffer, AO, lights, shadow maps  | HDR colour, bright        |
//! | [`HighlightPass`]| stencil, selected draws            | HDR colour                |
//! | [`SkyboxPass`]   | depth, cube map                    | HDR colour                |
//! | [`LightGizmoPass`]| gizmo list                        | HDR colour, bright        |
//! | [`BloomPass`]    | bright                             | ping-pong targets         |
//! | [`ToneMapPass`]  | HDR colour, bloom                  | output                    |

mod bloom;
mod geometry;
mod highlight;
mod light_gizmo;
mod lighting;
mod shadow;
mod skybox;
mod ssao;
mod tone_mapping;

pub use bloom::BloomPass;
pub use geometry::GeometryPass;
pub use highlight::HighlightPass;
pub use light_gizmo::LightGizmoPass;
pub use lighting::LightingPass;
pub use shadow::ShadowPass;
pub use skybox::SkyboxPass;
pub use ssao::SsaoPass;
pub use tone_mapping::ToneMapPass;

// ============================================================================
// Shared attachment and layout helpers
// ============================================================================

fn color_attachment(
    view: &wgpu::TextureView,
    load: wgpu::LoadOp<wgpu::Color>,
) -> Option<wgpu::RenderPassColorAttachment<'_>> {
    Some(wgpu::RenderPassColorAttachment {
        view,
        resolve_target: None,
        ops: wgpu::Operations {
            load,
            store: wgpu::StoreOp::Store,
        },
        depth_slice: None,
    })
}

/// Depth-stencil attachment keeping the existing contents of both aspects.
fn load_depth_stencil(view: &wgpu::TextureView) -> wgpu::RenderPassDepthStencilAttachment<'_> {
    wgpu::RenderPassDepthStencilAttachment {
        view,
        depth_ops: Some(wgpu::Operations {
            load: wgpu::LoadOp::Load,
            store: wgpu::StoreOp::Store,
        }),
        stencil_ops: Some(wgpu::Operations {
            load: wgpu::LoadOp::Load,
            store: wgpu::StoreOp::Store,
        }),
    }
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn storage_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only: true },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn texture_entry(binding: u32, view_dimension: wgpu::TextureViewDimension) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32, ty: wgpu::SamplerBindingType) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(ty),
        count: None,
    }
}

fn linear_clamp_sampler(device: &wgpu::Device, label: &str) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    })
}
