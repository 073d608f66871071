//! Error Types
//!
//! This module defines the error types used throughout the editor.
//!
//! # Overview
//!
//! The main error type [`UmbraError`] covers the recoverable failure modes:
//! - GPU initialization failures
//! - Model, image and shader source loading errors
//! - Configuration parsing errors
//!
//! Contract violations (unknown handles, double releases, incomplete render
//! targets) are not represented here as recoverable values. They panic at the
//! call site; [`UmbraError::IncompleteFramebuffer`] only exists so that the
//! panic message carries a structured description.
//!
//! # Usage
//!
//! ```rust,ignore
//! use umbra::errors::{UmbraError, Result};
//!
//! fn load_scene() -> Result<()> {
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the Umbra editor.
#[derive(Error, Debug)]
pub enum UmbraError {
    // ========================================================================
    // GPU & Rendering Errors
    // ========================================================================
    /// Failed to request a compatible GPU adapter.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    /// Failed to create a presentation surface for the window.
    #[error("Failed to create WGPU surface: {0}")]
    SurfaceCreateFailed(#[from] wgpu::CreateSurfaceError),

    /// A render target could not be constructed in a usable state.
    ///
    /// Later passes assume every target exists, so this is fatal at startup.
    #[error("Render target '{label}' is incomplete: {reason}")]
    IncompleteFramebuffer {
        /// Debug label of the offending target
        label: String,
        /// What was wrong with it
        reason: String,
    },

    /// Event loop error (winit).
    #[cfg(feature = "winit")]
    #[error("Event loop error: {0}")]
    EventLoopError(#[from] winit::error::EventLoopError),

    // ========================================================================
    // Asset Loading Errors
    // ========================================================================
    /// The requested asset was not found.
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    /// Model import failed (unreadable path or malformed scene).
    #[error("Model import failed for '{path}': {reason}")]
    ModelImport {
        /// Path that was being imported
        path: String,
        /// Underlying parser message
        reason: String,
    },

    /// Image decoding error.
    #[error("Image decode error: {0}")]
    ImageDecodeError(String),

    /// Cube map validation error.
    #[error("Cube map error: {0}")]
    CubeMapError(String),

    /// Shader source could not be read.
    #[error("Shader source error for '{path}': {reason}")]
    ShaderSource {
        /// Path of the shader stage file
        path: String,
        /// What went wrong
        reason: String,
    },

    // ========================================================================
    // Configuration & I/O Errors
    // ========================================================================
    /// Editor configuration could not be parsed.
    #[error("Config parse error: {0}")]
    Config(#[from] serde_json::Error),

    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

// ============================================================================
// Convenient conversion implementations
// ============================================================================

impl From<image::ImageError> for UmbraError {
    fn from(err: image::ImageError) -> Self {
        UmbraError::ImageDecodeError(err.to_string())
    }
}

/// Alias for `Result<T, UmbraError>`.
pub type Result<T> = std::result::Result<T, UmbraError>;
