//! wgpu Context
//!
//! The [`WgpuContext`] holds core GPU handles: device, queue and, for the
//! windowed path, the surface and its configuration. It is responsible for
//! surface management and resize handling.

use std::sync::Arc;

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::errors::{Result, UmbraError};
use crate::renderer::settings::RendererSettings;

/// Format of the offscreen output target used when no surface exists.
pub const HEADLESS_OUTPUT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Core wgpu context holding GPU handles.
///
/// - `device`: GPU device for resource creation
/// - `queue`: Command submission queue
/// - `surface`: Window surface for presentation (`None` when headless)
/// - `config`: Surface configuration (format, size, present mode)
///
/// In headless mode `config` still carries the output format and size so
/// that every pass can size its targets the same way.
pub struct WgpuContext {
    /// The wgpu device for GPU operations
    pub device: wgpu::Device,
    /// The command queue for submitting work
    pub queue: wgpu::Queue,
    /// The window surface for presentation
    pub surface: Option<wgpu::Surface<'static>>,
    /// Surface configuration
    pub config: wgpu::SurfaceConfiguration,
    /// Name of the selected adapter, for logging
    pub adapter_name: String,
}

impl WgpuContext {
    /// Creates a context presenting to `window`.
    pub async fn new<W>(
        window: W,
        settings: &RendererSettings,
        width: u32,
        height: u32,
    ) -> Result<Self>
    where
        W: HasWindowHandle + HasDisplayHandle + Send + Sync + 'static,
    {
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: settings.power_preference.into(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| UmbraError::AdapterRequestFailed(e.to_string()))?;

        let (device, queue) = Self::request_device(&adapter).await?;

        let mut config = surface
            .get_default_config(&adapter, width.max(1), height.max(1))
            .ok_or_else(|| {
                UmbraError::AdapterRequestFailed("Surface not supported by adapter".to_string())
            })?;

        config.present_mode = if settings.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };
        surface.configure(&device, &config);

        let adapter_name = adapter.get_info().name;
        log::info!(
            "GPU adapter: {adapter_name} ({:?}), surface format {:?}",
            adapter.get_info().backend,
            config.format
        );

        Ok(Self {
            device,
            queue,
            surface: Some(surface),
            config,
            adapter_name,
        })
    }

    /// Creates a context without a window.
    ///
    /// Frames are tone-mapped into an offscreen [`HEADLESS_OUTPUT_FORMAT`]
    /// target. Returns [`UmbraError::AdapterRequestFailed`] when the machine
    /// exposes no usable adapter.
    pub async fn headless(settings: &RendererSettings, width: u32, height: u32) -> Result<Self> {
        let instance = wgpu::Instance::default();
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: settings.power_preference.into(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| UmbraError::AdapterRequestFailed(e.to_string()))?;

        let (device, queue) = Self::request_device(&adapter).await?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: HEADLESS_OUTPUT_FORMAT,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            desired_maximum_frame_latency: 2,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
        };

        let adapter_name = adapter.get_info().name;
        log::info!("Headless GPU adapter: {adapter_name}");

        Ok(Self {
            device,
            queue,
            surface: None,
            config,
            adapter_name,
        })
    }

    async fn request_device(adapter: &wgpu::Adapter) -> Result<(wgpu::Device, wgpu::Queue)> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Umbra Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::Performance,
                ..Default::default()
            })
            .await?;

        device.on_uncaptured_error(Arc::new(|error: wgpu::Error| {
            log::error!("wgpu error: {error}");
        }));

        Ok((device, queue))
    }

    /// Reconfigures the surface. Zero-sized requests (minimised windows)
    /// are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            if let Some(surface) = &self.surface {
                surface.configure(&self.device, &self.config);
            }
        }
    }

    /// Returns the output color format.
    #[inline]
    #[must_use]
    pub fn color_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Whether the output needs manual gamma encoding in the composite.
    #[inline]
    #[must_use]
    pub fn output_is_srgb(&self) -> bool {
        self.config.format.is_srgb()
    }

    /// Returns the current output dimensions.
    #[inline]
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    #[inline]
    #[must_use]
    pub fn is_headless(&self) -> bool {
        self.surface.is_none()
    }
}
