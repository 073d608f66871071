//! Editor Configuration
//!
//! [`EditorConfig`] describes the window, the startup scene and renderer
//! overrides. It is read from a JSON file; every field is optional and falls
//! back to its default.
//!
//! ```json
//! {
//!     "title": "Umbra",
//!     "width": 1600,
//!     "height": 900,
//!     "skybox": ["sky/rt.jpg", "sky/lf.jpg", "sky/up.jpg", "sky/dn.jpg", "sky/ft.jpg", "sky/bk.jpg"],
//!     "models": ["models/backpack/backpack.obj"],
//!     "primitives": [{ "shape": "Sphere", "position": [2.0, 0.0, 0.0] }],
//!     "lights": [{ "type": "Point", "position": [0.0, 2.0, 1.0], "diffuse": [4.0, 4.0, 4.0] }],
//!     "renderer": { "max_shadow_maps": 4, "bloom": { "strength": 0.6 } }
//! }
//! ```
//!
//! The file path comes from the first command-line argument or the
//! `UMBRA_CONFIG` environment variable. A file that exists but does not parse
//! is an error; no path at all means defaults.

use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::Deserialize;

use crate::assets::ModelImporter;
use crate::errors::Result;
use crate::registry::ResourceRegistry;
use crate::renderer::RendererSettings;
use crate::resources::MeshType;
use crate::scene::{LightKind, LightType};

/// Environment variable consulted when no path is passed on the command line.
pub const CONFIG_ENV_VAR: &str = "UMBRA_CONFIG";

/// Shape of a startup primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum PrimitiveShape {
    Cube,
    Sphere,
}

impl From<PrimitiveShape> for MeshType {
    fn from(value: PrimitiveShape) -> Self {
        match value {
            PrimitiveShape::Cube => MeshType::Cube,
            PrimitiveShape::Sphere => MeshType::Sphere,
        }
    }
}

/// A cube or sphere entity created at startup.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PrimitiveConfig {
    pub shape: PrimitiveShape,
    pub position: [f32; 3],
    /// Euler angles in degrees.
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
}

impl Default for PrimitiveConfig {
    fn default() -> Self {
        Self {
            shape: PrimitiveShape::Cube,
            position: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
        }
    }
}

/// Light type tag as written in the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum LightTypeConfig {
    Directional,
    Point,
    Spot,
}

impl From<LightTypeConfig> for LightType {
    fn from(value: LightTypeConfig) -> Self {
        match value {
            LightTypeConfig::Directional => LightType::Directional,
            LightTypeConfig::Point => LightType::Point,
            LightTypeConfig::Spot => LightType::Spot,
        }
    }
}

/// A light created at startup. Unset fields keep the light type's defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LightConfig {
    #[serde(rename = "type")]
    pub light_type: LightTypeConfig,
    #[serde(default)]
    pub position: Option<[f32; 3]>,
    /// Ignored for point lights.
    #[serde(default)]
    pub direction: Option<[f32; 3]>,
    #[serde(default)]
    pub ambient: Option<[f32; 3]>,
    #[serde(default)]
    pub diffuse: Option<[f32; 3]>,
    #[serde(default)]
    pub specular: Option<[f32; 3]>,
}

/// Top-level editor configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    // === Window ===
    pub title: String,
    pub width: u32,
    pub height: u32,

    // === Startup Scene ===
    /// Six cube-map faces: right, left, top, bottom, front, back.
    pub skybox: Option<Vec<PathBuf>>,
    pub models: Vec<PathBuf>,
    pub primitives: Vec<PrimitiveConfig>,
    pub lights: Vec<LightConfig>,
    pub camera_position: [f32; 3],

    // === Renderer ===
    pub renderer: RendererSettings,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            title: "Umbra Scene Editor".to_string(),
            width: 1280,
            height: 720,
            skybox: None,
            models: Vec::new(),
            primitives: vec![PrimitiveConfig::default()],
            lights: vec![LightConfig {
                light_type: LightTypeConfig::Point,
                position: Some([1.2, 1.0, 2.0]),
                direction: None,
                ambient: None,
                diffuse: None,
                specular: None,
            }],
            camera_position: [0.0, 0.0, 3.0],
            renderer: RendererSettings::default(),
        }
    }
}

impl EditorConfig {
    /// Parses a configuration from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads and parses a configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        log::info!("Loaded editor configuration from {}", path.display());
        Ok(config)
    }

    /// Resolves the configuration path from `arg` or [`CONFIG_ENV_VAR`] and
    /// loads it. Returns the defaults when neither is set.
    pub fn load(arg: Option<PathBuf>) -> Result<Self> {
        let path = arg.or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from));
        match path {
            Some(path) => Self::from_file(&path),
            None => {
                log::info!("No editor configuration given, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Loads from the process arguments (first positional argument).
    pub fn from_args() -> Result<Self> {
        Self::load(std::env::args_os().nth(1).map(PathBuf::from))
    }

    /// Populates `registry` with the startup primitives, lights and models.
    ///
    /// Models that fail to import are logged and skipped.
    pub fn populate(&self, registry: &mut ResourceRegistry, importer: &dyn ModelImporter) {
        for primitive in &self.primitives {
            let handle = registry.add_entity(primitive.shape.into());
            let transform = &mut registry.entity_mut(handle).transform;
            transform.position = Vec3::from_array(primitive.position);
            transform.rotation = Vec3::from_array(primitive.rotation);
            transform.scale = Vec3::from_array(primitive.scale);
        }

        for config in &self.lights {
            let handle = registry.add_light(config.light_type.into());
            let light = registry.light_mut(handle);
            if let Some(position) = config.position {
                light.set_position(Vec3::from_array(position));
            }
            if let Some(new_direction) = config.direction {
                match &mut light.kind {
                    LightKind::Directional { direction } | LightKind::Spot { direction, .. } => {
                        *direction = Vec3::from_array(new_direction);
                    }
                    LightKind::Point { .. } => {}
                }
            }
            if let Some(ambient) = config.ambient {
                light.ambient = Vec3::from_array(ambient);
            }
            if let Some(diffuse) = config.diffuse {
                light.diffuse = Vec3::from_array(diffuse);
            }
            if let Some(specular) = config.specular {
                light.specular = Vec3::from_array(specular);
            }
        }

        for path in &self.models {
            match registry.add_entity_from_model(path, importer) {
                Ok(handle) => log::info!("Loaded model {} as {handle}", path.display()),
                Err(e) => log::error!("Failed to load model {}: {e}", path.display()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::ObjImporter;

    #[test]
    fn empty_object_gives_defaults() {
        let config = EditorConfig::from_json("{}").unwrap();
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn partial_config_overrides_only_given_fields() {
        let config = EditorConfig::from_json(
            r#"{
                "title": "Test",
                "primitives": [{ "shape": "Sphere", "position": [1.0, 2.0, 3.0] }],
                "lights": [{ "type": "Spot", "direction": [0.0, -1.0, 0.0] }],
                "renderer": { "max_shadow_maps": 2 }
            }"#,
        )
        .unwrap();

        assert_eq!(config.title, "Test");
        assert_eq!(config.width, 1280);
        assert_eq!(config.primitives[0].shape, PrimitiveShape::Sphere);
        assert_eq!(config.primitives[0].scale, [1.0; 3]);
        assert_eq!(config.lights[0].light_type, LightTypeConfig::Spot);
        assert_eq!(config.renderer.max_shadow_maps, 2);
        assert_eq!(config.renderer.shadow_map_size, 2048);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(EditorConfig::from_json("{ \"width\": \"wide\" }").is_err());
        assert!(EditorConfig::from_json("{").is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(EditorConfig::from_file(Path::new("does/not/exist.json")).is_err());
    }

    #[test]
    fn populate_builds_startup_scene() {
        let config = EditorConfig::from_json(
            r#"{
                "primitives": [
                    { "shape": "Cube", "scale": [2.0, 2.0, 2.0] },
                    { "shape": "Sphere" }
                ],
                "lights": [
                    { "type": "Directional", "direction": [0.0, -1.0, 0.0] },
                    { "type": "Point", "position": [0.0, 3.0, 0.0], "diffuse": [2.0, 2.0, 2.0] }
                ],
                "models": ["does/not/exist.obj"]
            }"#,
        )
        .unwrap();

        let mut registry = ResourceRegistry::new();
        config.populate(&mut registry, &ObjImporter);

        assert_eq!(registry.entity_count(), 2, "the unreadable model is skipped");
        assert_eq!(registry.light_count(), 2);

        let (_, point) = registry
            .lights()
            .find(|(_, l)| l.light_type() == LightType::Point)
            .unwrap();
        assert_eq!(point.position(), Some(Vec3::new(0.0, 3.0, 0.0)));
        assert_eq!(point.diffuse, Vec3::splat(2.0));

        let (_, cube) = registry.entities().next().unwrap();
        assert_eq!(cube.transform.scale, Vec3::splat(2.0));
    }
}
