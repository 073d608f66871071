//! Material resource.
//!
//! A material is either a flat Blinn-Phong colour set or a texture set with
//! parallax parameters. Both halves are always stored; `is_color` decides
//! which one the geometry pass reads, so toggling it never loses edits.

use std::path::{Path, PathBuf};

use glam::Vec3;

use crate::registry::ShaderHandle;

/// Maximum number of textures of a single kind on one material.
pub const MAX_TEXTURES_PER_KIND: usize = 10;

/// Role of a material texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TextureKind {
    Diffuse,
    Specular,
    Normal,
    Height,
}

impl TextureKind {
    pub const ALL: [TextureKind; 4] = [Self::Diffuse, Self::Specular, Self::Normal, Self::Height];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Diffuse => "diffuse",
            Self::Specular => "specular",
            Self::Normal => "normal",
            Self::Height => "height",
        }
    }
}

/// A texture reference by file path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MaterialTexture {
    pub kind: TextureKind,
    pub path: PathBuf,
}

impl MaterialTexture {
    #[must_use]
    pub fn new(kind: TextureKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    /// Selects the colour fields (`true`) or the texture set (`false`).
    pub is_color: bool,
    pub shader: ShaderHandle,

    // === Colour mode ===
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub shininess: f32,

    // === Texture mode ===
    textures: Vec<MaterialTexture>,
    /// Parallax depth scale applied to the height map.
    pub height_scale: f32,
    /// Layer count used when viewing the surface head-on.
    pub min_layers: u32,
    /// Layer count used at grazing angles.
    pub max_layers: u32,

    textures_version: u64,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: String::new(),
            is_color: true,
            shader: ShaderHandle::DEFAULT,
            ambient: Vec3::new(0.0215, 0.1745, 0.0215),
            diffuse: Vec3::new(0.075_68, 0.614_24, 0.075_68),
            specular: Vec3::new(0.633, 0.727_811, 0.633),
            shininess: 32.0,
            textures: Vec::new(),
            height_scale: 0.1,
            min_layers: 8,
            max_layers: 32,
            textures_version: 0,
        }
    }
}

impl Material {
    /// Colour-mode material with the default palette.
    #[must_use]
    pub fn color() -> Self {
        Self::default()
    }

    /// Texture-mode material; textures beyond the per-kind limit are dropped.
    #[must_use]
    pub fn textured(textures: impl IntoIterator<Item = MaterialTexture>) -> Self {
        let mut material = Self {
            is_color: false,
            ..Self::default()
        };
        for t in textures {
            material.add_texture(t.kind, t.path);
        }
        material
    }

    #[inline]
    #[must_use]
    pub fn textures(&self) -> &[MaterialTexture] {
        &self.textures
    }

    /// Stamp that changes whenever the texture list changes.
    #[inline]
    #[must_use]
    pub fn textures_version(&self) -> u64 {
        self.textures_version
    }

    /// Number of textures of `kind`.
    #[must_use]
    pub fn texture_count(&self, kind: TextureKind) -> usize {
        self.textures.iter().filter(|t| t.kind == kind).count()
    }

    /// The texture of `kind` the geometry pass samples (the first one).
    #[must_use]
    pub fn first_texture(&self, kind: TextureKind) -> Option<&Path> {
        self.textures
            .iter()
            .find(|t| t.kind == kind)
            .map(|t| t.path.as_path())
    }

    /// Appends a texture. Returns `false` when `kind` is already full.
    pub fn add_texture(&mut self, kind: TextureKind, path: impl Into<PathBuf>) -> bool {
        let path = path.into();
        if self.texture_count(kind) >= MAX_TEXTURES_PER_KIND {
            log::warn!(
                "Material '{}': ignoring {} texture {}, limit of {MAX_TEXTURES_PER_KIND} reached",
                self.name,
                kind.name(),
                path.display()
            );
            return false;
        }
        self.textures.push(MaterialTexture { kind, path });
        self.textures_version += 1;
        true
    }

    /// Removes the texture at `index` in [`textures`](Self::textures).
    pub fn remove_texture(&mut self, index: usize) -> Option<MaterialTexture> {
        if index >= self.textures.len() {
            return None;
        }
        self.textures_version += 1;
        Some(self.textures.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texture_kind_limit_is_enforced() {
        let mut m = Material::textured([]);
        for i in 0..MAX_TEXTURES_PER_KIND {
            assert!(m.add_texture(TextureKind::Diffuse, format!("d{i}.png")));
        }
        assert!(!m.add_texture(TextureKind::Diffuse, "extra.png"));
        assert!(m.add_texture(TextureKind::Normal, "n.png"));
        assert_eq!(m.textures().len(), MAX_TEXTURES_PER_KIND + 1);
    }

    #[test]
    fn first_texture_of_kind_is_sampled() {
        let m = Material::textured([
            MaterialTexture::new(TextureKind::Specular, "s.png"),
            MaterialTexture::new(TextureKind::Diffuse, "a.png"),
            MaterialTexture::new(TextureKind::Diffuse, "b.png"),
        ]);
        assert_eq!(m.first_texture(TextureKind::Diffuse), Some(Path::new("a.png")));
        assert_eq!(m.first_texture(TextureKind::Height), None);
    }

    #[test]
    fn removing_texture_bumps_version() {
        let mut m = Material::textured([MaterialTexture::new(TextureKind::Diffuse, "a.png")]);
        let v = m.textures_version();
        assert!(m.remove_texture(0).is_some());
        assert!(m.remove_texture(0).is_none());
        assert!(m.textures_version() > v);
    }
}
