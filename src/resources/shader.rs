//! Shader resource.
//!
//! A [`Shader`] is a name plus where its WGSL comes from. Compilation is the
//! renderer's job; the registry never touches the GPU. Custom shaders are
//! G-buffer programs that share the built-in geometry bind-group layout and
//! expose `vs_main`/`fs_main` entry points.

use std::path::PathBuf;

/// Where a shader's WGSL source lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShaderSource {
    /// The built-in G-buffer programs (colour and textured variants).
    BuiltIn,
    /// Stage files on disk. `geometry` is accepted for compatibility and
    /// ignored: wgpu exposes no geometry stage.
    Files {
        vertex: PathBuf,
        fragment: PathBuf,
        geometry: Option<PathBuf>,
    },
    /// A single WGSL module containing both stages.
    Inline(String),
}

/// A named shader program.
///
/// Immutable after creation apart from its display name.
#[derive(Debug, Clone)]
pub struct Shader {
    pub name: String,
    source: ShaderSource,
}

impl Shader {
    #[must_use]
    pub fn new(name: impl Into<String>, source: ShaderSource) -> Self {
        Self {
            name: name.into(),
            source,
        }
    }

    #[inline]
    #[must_use]
    pub fn source(&self) -> &ShaderSource {
        &self.source
    }

    #[inline]
    #[must_use]
    pub fn is_builtin(&self) -> bool {
        matches!(self.source, ShaderSource::BuiltIn)
    }

    /// Resolves the WGSL text of a non-built-in shader.
    ///
    /// File sources concatenate the vertex and fragment stage files into one
    /// module. Returns `Ok(None)` for [`ShaderSource::BuiltIn`].
    pub fn load_wgsl(&self) -> crate::errors::Result<Option<String>> {
        match &self.source {
            ShaderSource::BuiltIn => Ok(None),
            ShaderSource::Inline(code) => Ok(Some(code.clone())),
            ShaderSource::Files {
                vertex,
                fragment,
                geometry,
            } => {
                if let Some(geometry) = geometry {
                    log::warn!(
                        "Shader '{}': geometry stage {} is not supported and will be ignored",
                        self.name,
                        geometry.display()
                    );
                }
                let read = |path: &PathBuf| {
                    std::fs::read_to_string(path).map_err(|e| crate::errors::UmbraError::ShaderSource {
                        path: path.display().to_string(),
                        reason: e.to_string(),
                    })
                };
                let mut code = read(vertex)?;
                if fragment != vertex {
                    code.push('\n');
                    code.push_str(&read(fragment)?);
                }
                Ok(Some(code))
            }
        }
    }
}
