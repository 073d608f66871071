//! Frame Targets
//!
//! Screen-sized render targets shared by the deferred passes. The whole set
//! is rebuilt on resize; [`FrameTargets::generation`] changes each time so
//! passes know their cached bind groups are stale.
//!
//! | Target        | Format                | Written by           | Read by               |
//! |---------------|-----------------------|----------------------|-----------------------|
//! | position      | `Rgba16Float`         | Geometry             | SSAO, Lighting        |
//! | normal        | `Rgba16Float`         | Geometry             | SSAO, Lighting        |
//! | albedo        | `Rgba8Unorm`          | Geometry             | Lighting              |
//! | depth_stencil | `Depth24PlusStencil8` | Geometry             | Highlight, Skybox, Gizmo |
//! | ssao_raw      | `R8Unorm`             | SSAO (raw)           | SSAO (blur)           |
//! | ssao          | `R8Unorm`             | SSAO (blur)          | Lighting              |
//! | hdr           | `Rgba16Float`         | Lighting, Highlight, Skybox, Gizmo | Tone map |
//! | bright        | `Rgba16Float`         | Lighting, Gizmo      | Bloom                 |
//! | pingpong[2]   | `Rgba16Float`         | Bloom                | Bloom, Tone map       |
//! | output        | surface format        | Tone map (headless)  | readback              |

use crate::renderer::core::RenderTarget;

pub const POSITION_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
pub const NORMAL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
pub const ALBEDO_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
pub const DEPTH_STENCIL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;
pub const SSAO_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R8Unorm;
pub const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// Stencil value the geometry pass writes under the selected entity.
pub const SELECTED_STENCIL: u32 = 1;

/// Names a readable frame target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameTarget {
    Position,
    Normal,
    Albedo,
    SsaoRaw,
    Ssao,
    Hdr,
    Bright,
    /// Bloom ping-pong target 0 or 1.
    Bloom(usize),
    /// The tone-mapped image (headless contexts only).
    Output,
}

pub struct FrameTargets {
    pub position: RenderTarget,
    pub normal: RenderTarget,
    pub albedo: RenderTarget,
    pub depth_stencil: RenderTarget,
    pub ssao_raw: RenderTarget,
    pub ssao: RenderTarget,
    pub hdr: RenderTarget,
    pub bright: RenderTarget,
    pub pingpong: [RenderTarget; 2],
    /// Offscreen tone-map destination when there is no surface.
    pub output: Option<RenderTarget>,
    pub width: u32,
    pub height: u32,
    pub generation: u64,
}

impl FrameTargets {
    /// Creates every target at `width`×`height`.
    ///
    /// `output_format` is set for headless contexts.
    ///
    /// # Panics
    ///
    /// Panics if any target fails validation. Targets created before the
    /// failing one are dropped during unwinding.
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        output_format: Option<wgpu::TextureFormat>,
        generation: u64,
    ) -> Self {
        let readable = wgpu::TextureUsages::COPY_SRC;
        let color = |label: &str, format| RenderTarget::new(device, label, format, width, height, readable);

        let targets = Self {
            position: color("G-Buffer Position", POSITION_FORMAT),
            normal: color("G-Buffer Normal", NORMAL_FORMAT),
            albedo: color("G-Buffer Albedo", ALBEDO_FORMAT),
            depth_stencil: RenderTarget::new(
                device,
                "G-Buffer Depth Stencil",
                DEPTH_STENCIL_FORMAT,
                width,
                height,
                wgpu::TextureUsages::empty(),
            ),
            ssao_raw: color("SSAO Raw", SSAO_FORMAT),
            ssao: color("SSAO Blurred", SSAO_FORMAT),
            hdr: color("HDR Color", HDR_FORMAT),
            bright: color("HDR Bright", HDR_FORMAT),
            pingpong: [color("Bloom Ping", HDR_FORMAT), color("Bloom Pong", HDR_FORMAT)],
            output: output_format.map(|format| color("Offscreen Output", format)),
            width,
            height,
            generation,
        };

        log::debug!("Frame targets created at {width}x{height} (generation {generation})");
        targets
    }

    #[must_use]
    pub fn target(&self, target: FrameTarget) -> Option<&RenderTarget> {
        match target {
            FrameTarget::Position => Some(&self.position),
            FrameTarget::Normal => Some(&self.normal),
            FrameTarget::Albedo => Some(&self.albedo),
            FrameTarget::SsaoRaw => Some(&self.ssao_raw),
            FrameTarget::Ssao => Some(&self.ssao),
            FrameTarget::Hdr => Some(&self.hdr),
            FrameTarget::Bright => Some(&self.bright),
            FrameTarget::Bloom(i) => self.pingpong.get(i),
            FrameTarget::Output => self.output.as_ref(),
        }
    }
}
