//! Resource Registry Tests
//!
//! Tests for:
//! - IdentifierPool: smallest-first reuse, release discipline
//! - Built-in defaults: default shader, default material, gizmo mesh
//! - Add/remove round-trips for every category
//! - Cascading removal (material → components, shader → materials)
//! - Selection tracking across removals
//! - Model import through a `ModelImporter`

use std::path::Path;

use glam::{Vec2, Vec3};

use umbra::assets::{ImportedModel, ImportedSubmesh, ModelImporter};
use umbra::errors::{Result, UmbraError};
use umbra::registry::{IdentifierPool, MaterialHandle, ResourceRegistry, ShaderHandle};
use umbra::resources::{MaterialTexture, MeshType, ShaderSource, TextureKind, Vertex};
use umbra::scene::LightType;

// ============================================================================
// IdentifierPool
// ============================================================================

#[test]
fn id_pool_hands_out_sequential_ids() {
    let mut pool = IdentifierPool::new();
    assert_eq!(pool.acquire(), 0);
    assert_eq!(pool.acquire(), 1);
    assert_eq!(pool.acquire(), 2);
    assert_eq!(pool.in_use(), 3);
}

#[test]
fn id_pool_reuses_smallest_released_id() {
    let mut pool = IdentifierPool::new();
    for _ in 0..5 {
        pool.acquire();
    }
    pool.release(3);
    pool.release(1);

    assert_eq!(pool.pending(), 2);
    assert_eq!(pool.acquire(), 1, "smallest released id comes back first");
    assert_eq!(pool.acquire(), 3);
    assert_eq!(pool.acquire(), 5, "fresh ids resume after the high-water mark");
}

#[test]
#[should_panic]
fn id_pool_double_release_panics() {
    let mut pool = IdentifierPool::new();
    let id = pool.acquire();
    pool.release(id);
    pool.release(id);
}

#[test]
#[should_panic]
fn id_pool_release_of_unissued_id_panics() {
    let mut pool = IdentifierPool::new();
    pool.release(7);
}

// ============================================================================
// Defaults
// ============================================================================

#[test]
fn new_registry_holds_only_builtins() {
    let registry = ResourceRegistry::new();

    assert_eq!(registry.entity_count(), 0);
    assert_eq!(registry.light_count(), 0);
    assert_eq!(registry.shader_count(), 1);
    assert_eq!(registry.material_count(), 1);
    assert_eq!(registry.mesh_count(), 1, "the light gizmo cube");

    assert!(registry.shader(ShaderHandle::DEFAULT).is_builtin());
    assert!(registry.material(MaterialHandle::DEFAULT).is_color);
    assert!(registry.is_internal_mesh(registry.gizmo_mesh()));
}

#[test]
fn defaults_cannot_be_removed() {
    let mut registry = ResourceRegistry::new();
    assert!(!registry.remove_material(MaterialHandle::DEFAULT));
    assert!(!registry.remove_shader(ShaderHandle::DEFAULT));
    assert_eq!(registry.material_count(), 1);
    assert_eq!(registry.shader_count(), 1);
}

// ============================================================================
// Round-trips
// ============================================================================

#[test]
fn entity_add_remove_round_trip() {
    let mut registry = ResourceRegistry::new();
    let before = (registry.entity_count(), registry.mesh_count(), registry.material_count());

    let cube = registry.add_entity(MeshType::Cube);
    assert_eq!(registry.entity_count(), 1);
    assert_eq!(registry.mesh_count(), before.1 + 1);
    let component = &registry.entity(cube).components[0];
    assert_eq!(component.material, MaterialHandle::DEFAULT);
    assert_eq!(registry.mesh(component.mesh).mesh_type(), MeshType::Cube);

    registry.remove_entity(cube);
    assert_eq!(
        (registry.entity_count(), registry.mesh_count(), registry.material_count()),
        before,
        "removing the entity releases its mesh and keeps the default material"
    );
    assert!(registry.try_entity(cube).is_none());
}

/// Handles of every table, in order, for before/after comparisons.
fn snapshot(registry: &ResourceRegistry) -> (Vec<u32>, Vec<u32>, Vec<u32>, Vec<u32>, Vec<u32>) {
    (
        registry.entities().map(|(h, _)| h.index()).collect(),
        registry.meshes().map(|(h, _)| h.index()).collect(),
        registry.materials().map(|(h, _)| h.index()).collect(),
        registry.lights().map(|(h, _)| h.index()).collect(),
        registry.shaders().map(|(h, _)| h.index()).collect(),
    )
}

#[test]
fn material_add_remove_round_trip() {
    let mut registry = ResourceRegistry::new();
    registry.add_material(true, []);
    let before = snapshot(&registry);

    let material = registry.add_material(false, [MaterialTexture::new(TextureKind::Diffuse, "wood.png")]);
    assert_eq!(registry.material_count(), 3);
    assert!(!registry.material(material).is_color);

    assert!(registry.remove_material(material));
    assert_eq!(snapshot(&registry), before);
}

#[test]
fn light_add_remove_round_trip() {
    let mut registry = ResourceRegistry::new();
    registry.add_light(LightType::Directional);
    let before = snapshot(&registry);

    let light = registry.add_light(LightType::Point);
    assert_eq!(registry.light_count(), 2);
    registry.remove_light(light);

    assert_eq!(snapshot(&registry), before);
    assert_eq!(registry.lights_by_creation().count(), 1);
}

#[test]
fn shader_add_remove_round_trip() {
    let mut registry = ResourceRegistry::new();
    let before = snapshot(&registry);

    let shader = registry.add_shader("Toon", ShaderSource::Inline(String::new()));
    assert_eq!(registry.shader(shader).name, "Toon");
    assert!(registry.remove_shader(shader));

    assert_eq!(snapshot(&registry), before);
}

#[test]
fn removed_handles_are_reused() {
    let mut registry = ResourceRegistry::new();
    let a = registry.add_entity(MeshType::Cube);
    let b = registry.add_entity(MeshType::Sphere);
    registry.remove_entity(a);

    let c = registry.add_entity(MeshType::Sphere);
    assert_eq!(c, a, "the freed entity id is handed out again");
    assert_ne!(c, b);

    let light = registry.add_light(LightType::Point);
    registry.remove_light(light);
    assert_eq!(registry.add_light(LightType::Spot), light);
}

#[test]
fn remove_light_returns_the_light() {
    let mut registry = ResourceRegistry::new();
    let handle = registry.add_light(LightType::Spot);
    registry.light_mut(handle).name = "Key".to_string();

    let light = registry.remove_light(handle);
    assert_eq!(light.name, "Key");
    assert_eq!(light.light_type(), LightType::Spot);
    assert_eq!(registry.light_count(), 0);
}

#[test]
fn light_counts_follow_the_table() {
    let mut registry = ResourceRegistry::new();
    registry.add_light(LightType::Directional);
    let p = registry.add_light(LightType::Point);
    registry.add_light(LightType::Point);
    registry.add_light(LightType::Spot);
    registry.remove_light(p);

    let counts = registry.light_counts();
    assert_eq!((counts.directional, counts.point, counts.spot), (1, 1, 1));
    assert_eq!(counts.total(), 3);
}

#[test]
fn iteration_is_in_handle_order() {
    let mut registry = ResourceRegistry::new();
    for _ in 0..4 {
        registry.add_light(LightType::Point);
    }
    let handles: Vec<u32> = registry.lights().map(|(h, _)| h.index()).collect();
    assert_eq!(handles, vec![0, 1, 2, 3]);
}

// ============================================================================
// Cascades
// ============================================================================

#[test]
fn removing_material_repoints_components_to_default() {
    let mut registry = ResourceRegistry::new();
    let entity = registry.add_entity(MeshType::Cube);
    let material = registry.add_material(true, []);
    registry.set_component_material(entity, 0, material);
    assert_eq!(registry.entity(entity).components[0].material, material);

    assert!(registry.remove_material(material));
    assert_eq!(registry.entity(entity).components[0].material, MaterialHandle::DEFAULT);
}

#[test]
fn removing_shader_repoints_materials_to_default() {
    let mut registry = ResourceRegistry::new();
    let shader = registry.add_shader("Custom", ShaderSource::Inline(String::new()));
    let material = registry.add_material(true, []);
    registry.material_mut(material).shader = shader;

    assert!(registry.remove_shader(shader));
    assert_eq!(registry.material(material).shader, ShaderHandle::DEFAULT);
}

#[test]
fn shared_mesh_survives_entity_removal() {
    let mut registry = ResourceRegistry::new();
    let mesh = registry.add_mesh(MeshType::Sphere);
    let a = registry.add_entity_with(mesh, MaterialHandle::DEFAULT);
    let b = registry.add_entity_with(mesh, MaterialHandle::DEFAULT);

    registry.remove_entity(a);
    assert!(registry.try_mesh(mesh).is_some(), "entity b still uses the mesh");

    registry.remove_entity(b);
    assert!(registry.try_mesh(mesh).is_none());
}

#[test]
fn texture_material_keeps_its_textures() {
    let mut registry = ResourceRegistry::new();
    let material = registry.add_material(
        false,
        [
            MaterialTexture::new(TextureKind::Diffuse, "albedo.png"),
            MaterialTexture::new(TextureKind::Normal, "normal.png"),
        ],
    );
    let m = registry.material(material);
    assert!(!m.is_color);
    assert_eq!(m.textures().len(), 2);
    assert_eq!(m.texture_count(TextureKind::Diffuse), 1);
}

#[test]
fn sphere_tessellation_updates_revision() {
    let mut registry = ResourceRegistry::new();
    let sphere = registry.add_mesh(MeshType::Sphere);
    let cube = registry.add_mesh(MeshType::Cube);
    let revision = registry.mesh(sphere).revision();

    assert!(registry.set_sphere_tessellation(sphere, 8, 6));
    let mesh = registry.mesh(sphere);
    assert!(mesh.revision() > revision);
    assert_eq!(mesh.vertices().len(), 9 * 7);

    assert!(!registry.set_sphere_tessellation(cube, 8, 6), "cubes have no tessellation");
}

// ============================================================================
// Selection
// ============================================================================

#[test]
fn selection_marks_entity_and_clears_on_removal() {
    let mut registry = ResourceRegistry::new();
    let a = registry.add_entity(MeshType::Cube);
    let b = registry.add_entity(MeshType::Cube);

    registry.select_entity(Some(a));
    assert!(registry.entity(a).is_selected());

    registry.select_entity(Some(b));
    assert!(!registry.entity(a).is_selected(), "previous selection is cleared");
    assert_eq!(registry.selected_entity(), Some(b));

    registry.remove_entity(b);
    assert_eq!(registry.selected_entity(), None);
}

#[test]
fn select_component_checks_range() {
    let mut registry = ResourceRegistry::new();
    assert!(!registry.select_component(0), "nothing selected");

    let entity = registry.add_entity(MeshType::Cube);
    registry.select_entity(Some(entity));
    assert!(registry.select_component(0));
    assert!(!registry.select_component(1));
    assert_eq!(registry.selection().map(|s| s.component_index), Some(0));
}

// ============================================================================
// Contract violations
// ============================================================================

#[test]
#[should_panic(expected = "unknown")]
fn looking_up_removed_entity_panics() {
    let mut registry = ResourceRegistry::new();
    let entity = registry.add_entity(MeshType::Cube);
    registry.remove_entity(entity);
    let _ = registry.entity(entity);
}

#[test]
#[should_panic]
fn removing_unknown_light_panics() {
    let mut registry = ResourceRegistry::new();
    let light = registry.add_light(LightType::Point);
    registry.remove_light(light);
    registry.remove_light(light);
}

// ============================================================================
// Model import
// ============================================================================

/// Returns a fixed two-part model, or fails for every path.
struct FakeImporter {
    fail: bool,
}

fn triangle(name: &str, textures: Vec<MaterialTexture>) -> ImportedSubmesh {
    ImportedSubmesh {
        name: name.to_string(),
        vertices: vec![
            Vertex::new(Vec3::ZERO, Vec3::Z, Vec2::ZERO),
            Vertex::new(Vec3::X, Vec3::Z, Vec2::X),
            Vertex::new(Vec3::Y, Vec3::Z, Vec2::Y),
        ],
        indices: vec![0, 1, 2],
        textures,
    }
}

impl ModelImporter for FakeImporter {
    fn import(&self, path: &Path) -> Result<ImportedModel> {
        if self.fail {
            return Err(UmbraError::ModelImport {
                path: path.display().to_string(),
                reason: "unreadable".to_string(),
            });
        }
        Ok(ImportedModel {
            submeshes: vec![
                triangle("Body", vec![MaterialTexture::new(TextureKind::Diffuse, "body.png")]),
                triangle("Trim", Vec::new()),
            ],
        })
    }
}

fn counts(registry: &ResourceRegistry) -> (usize, usize, usize) {
    (registry.entity_count(), registry.material_count(), registry.mesh_count())
}

#[test]
fn imported_entity_owns_its_meshes_and_materials() {
    let mut registry = ResourceRegistry::new();
    let before = counts(&registry);

    let entity = registry
        .add_entity_from_model(Path::new("models/crate.obj"), &FakeImporter { fail: false })
        .expect("import succeeds");
    assert_eq!(counts(&registry), (1, 3, 3), "one mesh and one material per sub-mesh");
    assert_eq!(registry.entity(entity).name, "crate");

    let components = &registry.entity(entity).components;
    assert_eq!(components.len(), 2);
    assert!(!registry.material(components[0].material).is_color, "textured sub-mesh");
    assert!(registry.material(components[1].material).is_color, "untextured sub-mesh");
    assert_eq!(registry.mesh(components[0].mesh).name, "Body");

    registry.remove_entity(entity);
    assert_eq!(counts(&registry), before, "imported materials go with the entity");
    assert!(registry.try_material(MaterialHandle::DEFAULT).is_some());
}

#[test]
fn failed_import_leaves_registry_untouched() {
    let mut registry = ResourceRegistry::new();
    registry.add_entity(MeshType::Cube);
    let before = snapshot(&registry);

    let result = registry.add_entity_from_model(Path::new("missing.obj"), &FakeImporter { fail: true });
    assert!(matches!(result, Err(UmbraError::ModelImport { .. })));
    assert_eq!(snapshot(&registry), before);
}
