//! Shader Template Manager
//!
//! Manages WGSL shaders using the minijinja template engine and provides
//! a `ShaderModule` cache shared by all passes.
//!
//! ## Two compilation modes
//!
//! | Method | Use case | Source |
//! |--------|----------|--------|
//! | [`ShaderManager::get_or_compile_template`] | Built-in pass shaders | embedded minijinja template |
//! | [`ShaderManager::compile_custom`]          | User G-buffer shaders | raw WGSL from the registry |
//!
//! Built-in templates are trusted: a render failure there is a packaging bug
//! and panics. Custom shaders are untrusted; their compilation messages are
//! logged and a failed module is reported as `None` so callers can fall back
//! to the built-in program.

use minijinja::{Environment, Error, ErrorKind, syntax::SyntaxConfig};
use rust_embed::RustEmbed;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use xxhash_rust::xxh3::xxh3_128;

pub static SHADER_ENV: OnceLock<Environment<'static>> = OnceLock::new();

#[derive(RustEmbed)]
#[folder = "src/renderer/pipeline/shaders"]
struct ShaderAssets;

pub fn get_env() -> &'static Environment<'static> {
    SHADER_ENV.get_or_init(|| {
        let mut env = Environment::new();

        let syntax = SyntaxConfig::builder()
            .block_delimiters("{$", "$}")
            .variable_delimiters("{{", "}}")
            .line_statement_prefix("$$")
            .build()
            .expect("Failed to configure Jinja2 syntax");

        env.set_syntax(syntax);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_undefined_behavior(minijinja::UndefinedBehavior::SemiStrict);

        env.set_loader(shader_loader);

        env.set_path_join_callback(|name, _parent| format!("chunks/{name}").into());

        env
    })
}

fn shader_loader(name: &str) -> Result<Option<String>, Error> {
    let filename = if std::path::Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wgsl"))
    {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("{name}.wgsl"))
    };

    #[cfg(debug_assertions)]
    {
        let path = std::path::Path::new("src/renderer/pipeline/shaders").join(filename.as_ref());
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(source) => return Ok(Some(source)),
                Err(e) => {
                    return Err(Error::new(
                        ErrorKind::TemplateNotFound,
                        format!("Failed to read file: {e}"),
                    ));
                }
            }
        }
    }

    if let Some(file) = ShaderAssets::get(&filename)
        && let Ok(source) = std::str::from_utf8(file.data.as_ref())
    {
        return Ok(Some(source.to_string()));
    }

    Ok(None)
}

// ─── ShaderDefines ────────────────────────────────────────────────────────────

/// Template variables injected into a built-in shader.
///
/// Keys are upper-case constants (`MAX_SHADOW_MAPS`, `TONE_MAPPING_MODE`);
/// ordering is stable so the rendered source hashes identically across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ShaderDefines(BTreeMap<String, String>);

impl ShaderDefines {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: impl ToString) {
        self.0.insert(key.to_string(), value.to_string());
    }

    #[must_use]
    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

/// Renders the built-in template `template_name` with `defines`.
///
/// # Panics
///
/// Panics when the template is missing or fails to render; built-in
/// templates ship with the crate.
#[must_use]
pub fn render_template(template_name: &str, defines: &ShaderDefines) -> String {
    let template = get_env()
        .get_template(template_name)
        .unwrap_or_else(|e| panic!("Shader template '{template_name}' not found: {e}"));
    let source = template
        .render(defines)
        .unwrap_or_else(|e| panic!("Shader template '{template_name}' failed to render: {e}"));
    format!("// === Generated from {template_name} ===\n{source}")
}

// ─── ShaderManager ────────────────────────────────────────────────────────────

/// Centralized shader module cache.
///
/// Deduplicates compiled `wgpu::ShaderModule`s by hashing the **final** WGSL
/// source with xxh3-128.
pub struct ShaderManager {
    /// xxh3-128 of final WGSL → compiled module.
    module_cache: FxHashMap<u128, wgpu::ShaderModule>,
}

impl Default for ShaderManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ShaderManager {
    #[must_use]
    pub fn new() -> Self {
        Self {
            module_cache: FxHashMap::default(),
        }
    }

    /// Compile a built-in template (or return a cached module).
    ///
    /// Returns `(module_ref, source_hash)`.
    pub fn get_or_compile_template(
        &mut self,
        device: &wgpu::Device,
        template_name: &str,
        defines: &ShaderDefines,
    ) -> (&wgpu::ShaderModule, u128) {
        let source = render_template(template_name, defines);
        let hash = xxh3_128(source.as_bytes());

        let module = self.module_cache.entry(hash).or_insert_with(|| {
            log::debug!("Compiling shader template '{template_name}'");
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(&format!("Shader Module {template_name}")),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            })
        });

        (module, hash)
    }

    /// Compile user-supplied WGSL.
    ///
    /// Compilation messages are logged. Returns `None` when the module has
    /// errors; the module is not cached in that case.
    pub fn compile_custom(
        &mut self,
        device: &wgpu::Device,
        label: &str,
        source: &str,
    ) -> Option<wgpu::ShaderModule> {
        let hash = xxh3_128(source.as_bytes());
        if let Some(module) = self.module_cache.get(&hash) {
            return Some(module.clone());
        }

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let info = pollster::block_on(module.get_compilation_info());
        let mut failed = false;
        for message in &info.messages {
            let location = message
                .location
                .map(|l| format!("{}:{}", l.line_number, l.line_position))
                .unwrap_or_default();
            match message.message_type {
                wgpu::CompilationMessageType::Error => {
                    failed = true;
                    log::error!("Shader '{label}' {location}: {}", message.message);
                }
                wgpu::CompilationMessageType::Warning => {
                    log::warn!("Shader '{label}' {location}: {}", message.message);
                }
                wgpu::CompilationMessageType::Info => {
                    log::info!("Shader '{label}' {location}: {}", message.message);
                }
            }
        }

        if failed {
            return None;
        }
        self.module_cache.insert(hash, module.clone());
        Some(module)
    }

    /// Returns the number of cached shader modules.
    #[must_use]
    pub fn module_count(&self) -> usize {
        self.module_cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tone_mapping_mode_is_substituted() {
        let defines = ShaderDefines::new().with("TONE_MAPPING_MODE", "REINHARD");
        let source = render_template("tone_mapping", &defines);
        assert!(source.contains("reinhard"), "{source}");
        assert!(!source.contains("aces_filmic("));
    }

    #[test]
    fn chunks_are_included() {
        let defines = ShaderDefines::new().with("MAX_SHADOW_MAPS", 10);
        let source = render_template("lighting", &defines);
        assert!(source.contains("struct CameraUniforms"));
        assert!(!source.contains("{$"));
    }

    #[test]
    fn every_builtin_template_renders() {
        let defines = ShaderDefines::new()
            .with("MAX_SHADOW_MAPS", 10)
            .with("KERNEL_SIZE", 64)
            .with("NOISE_DIM", 4)
            .with("TONE_MAPPING_MODE", "ACES_FILMIC");
        for name in [
            "shadow_depth",
            "gbuffer_color",
            "gbuffer_textured",
            "ssao_raw",
            "ssao_blur",
            "lighting",
            "highlight",
            "skybox",
            "light_gizmo",
            "bloom_blur",
            "tone_mapping",
        ] {
            let source = render_template(name, &defines);
            assert!(source.contains("fn vs_main"), "{name} lacks vs_main");
        }
    }
}
