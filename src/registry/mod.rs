//! Resource Registry
//!
//! The single source of truth for scene content. Every category (entities,
//! meshes, materials, lights, shaders) lives in its own handle-keyed table
//! backed by its own [`IdentifierPool`], so handles are small integers that
//! get reused after removal.
//!
//! # Contract
//!
//! - Looking up a handle that is not in its table is a programming error and
//!   panics with the offending handle in the message. The `try_*` accessors
//!   exist for UI code that holds possibly stale handles.
//! - The default shader and default material (both handle 0) and the light
//!   gizmo mesh are registered once in [`ResourceRegistry::new`] and can
//!   never be removed.
//! - Removing a material re-points every component that used it to the
//!   default material; removing a shader re-points every material that used
//!   it to the default shader. A mesh still referenced by an entity is not
//!   removed.
//! - Tables are `BTreeMap`s, so iteration is in ascending handle order.
//!
//! The registry is GPU-free. The renderer mirrors it into GPU caches and
//! watches [`Mesh::revision`] to know when geometry must be re-uploaded.

mod handles;
mod id_pool;

pub use handles::{EntityHandle, LightHandle, MaterialHandle, MeshHandle, ShaderHandle};
pub use id_pool::IdentifierPool;

use std::collections::BTreeMap;
use std::path::Path;

use crate::assets::ModelImporter;
use crate::errors::Result;
use crate::resources::material::{Material, MaterialTexture};
use crate::resources::mesh::{Mesh, MeshType, Vertex};
use crate::resources::primitives::SphereTessellation;
use crate::resources::shader::{Shader, ShaderSource};
use crate::scene::entity::{Component, Entity, EntityOrigin};
use crate::scene::light::{Light, LightType};

/// Number of live lights of each type, derived from the light table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LightCounts {
    pub directional: usize,
    pub point: usize,
    pub spot: usize,
}

impl LightCounts {
    #[must_use]
    pub fn total(&self) -> usize {
        self.directional + self.point + self.spot
    }
}

/// The selected component, addressed by owner and position.
///
/// Re-resolved on every access, so it stays valid while the component list
/// grows and resolves to nothing once the entity is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub entity: EntityHandle,
    pub component_index: usize,
}

#[derive(Debug)]
pub struct ResourceRegistry {
    entities: BTreeMap<EntityHandle, Entity>,
    meshes: BTreeMap<MeshHandle, Mesh>,
    materials: BTreeMap<MaterialHandle, Material>,
    lights: BTreeMap<LightHandle, Light>,
    shaders: BTreeMap<ShaderHandle, Shader>,

    entity_ids: IdentifierPool,
    mesh_ids: IdentifierPool,
    material_ids: IdentifierPool,
    light_ids: IdentifierPool,
    shader_ids: IdentifierPool,

    /// Live lights, oldest first. Handles are recycled, so their order is not
    /// the creation order.
    light_order: Vec<LightHandle>,

    gizmo_mesh: MeshHandle,
    selection: Option<Selection>,
    /// Source of mesh revision stamps; never reused.
    next_revision: u64,
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceRegistry {
    /// Creates a registry holding only the built-in defaults.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self {
            entities: BTreeMap::new(),
            meshes: BTreeMap::new(),
            materials: BTreeMap::new(),
            lights: BTreeMap::new(),
            shaders: BTreeMap::new(),
            entity_ids: IdentifierPool::new(),
            mesh_ids: IdentifierPool::new(),
            material_ids: IdentifierPool::new(),
            light_ids: IdentifierPool::new(),
            shader_ids: IdentifierPool::new(),
            light_order: Vec::new(),
            gizmo_mesh: MeshHandle(0),
            selection: None,
            next_revision: 1,
        };

        let shader = ShaderHandle(registry.shader_ids.acquire());
        debug_assert_eq!(shader, ShaderHandle::DEFAULT);
        registry
            .shaders
            .insert(shader, Shader::new("Default", ShaderSource::BuiltIn));

        let material = MaterialHandle(registry.material_ids.acquire());
        debug_assert_eq!(material, MaterialHandle::DEFAULT);
        let mut default_material = Material::color();
        default_material.name = "Default Material".to_string();
        registry.materials.insert(material, default_material);

        let mut gizmo = Mesh::procedural(MeshType::Cube);
        gizmo.name = "Light Gizmo".to_string();
        registry.gizmo_mesh = registry.insert_mesh(gizmo);

        registry
    }

    // ========================================================================
    // Meshes
    // ========================================================================

    /// Generates a procedural cube or sphere.
    ///
    /// `MeshType::Other` has no procedural form; use
    /// [`add_mesh_from_geometry`](Self::add_mesh_from_geometry).
    pub fn add_mesh(&mut self, mesh_type: MeshType) -> MeshHandle {
        assert!(
            mesh_type != MeshType::Other,
            "add_mesh: MeshType::Other needs explicit geometry"
        );
        let handle = self.insert_mesh(Mesh::procedural(mesh_type));
        self.mesh_mut(handle).name = format!("Mesh {}", handle.index());
        handle
    }

    pub fn add_mesh_from_geometry(&mut self, vertices: Vec<Vertex>, indices: Vec<u32>) -> MeshHandle {
        let handle = self.insert_mesh(Mesh::from_geometry(vertices, indices));
        self.mesh_mut(handle).name = format!("Mesh {}", handle.index());
        handle
    }

    fn insert_mesh(&mut self, mut mesh: Mesh) -> MeshHandle {
        let handle = MeshHandle(self.mesh_ids.acquire());
        mesh.set_revision(self.bump_revision());
        log::debug!("Added {handle} ({:?})", mesh.mesh_type());
        self.meshes.insert(handle, mesh);
        handle
    }

    /// Removes a mesh. Refuses (returns `false`) for the internal gizmo mesh
    /// and for meshes still used by an entity.
    pub fn remove_mesh(&mut self, handle: MeshHandle) -> bool {
        let _ = self.mesh(handle);
        if handle == self.gizmo_mesh {
            log::warn!("{handle} is internal and cannot be removed");
            return false;
        }
        if let Some(owner) = self.mesh_user(handle) {
            log::warn!("{handle} is still used by {owner}; not removed");
            return false;
        }
        self.meshes.remove(&handle);
        self.mesh_ids.release(handle.0);
        log::debug!("Removed {handle}");
        true
    }

    /// Regenerates a sphere mesh with new sector/stack counts.
    ///
    /// Counts are clamped to a closed solid (≥3 sectors, ≥2 stacks). Returns
    /// `false` if the mesh is not a sphere.
    pub fn set_sphere_tessellation(&mut self, handle: MeshHandle, sectors: u32, stacks: u32) -> bool {
        let revision = self.next_revision;
        let mesh = self.mesh_mut(handle);
        if !mesh.retessellate(SphereTessellation { sectors, stacks }) {
            return false;
        }
        mesh.set_revision(revision);
        self.next_revision += 1;
        true
    }

    /// The cube drawn at every visible positional light.
    #[inline]
    #[must_use]
    pub fn gizmo_mesh(&self) -> MeshHandle {
        self.gizmo_mesh
    }

    #[must_use]
    pub fn is_internal_mesh(&self, handle: MeshHandle) -> bool {
        handle == self.gizmo_mesh
    }

    // ========================================================================
    // Materials
    // ========================================================================

    /// Adds a colour (`is_color`) or texture material using the default shader.
    pub fn add_material(
        &mut self,
        is_color: bool,
        textures: impl IntoIterator<Item = MaterialTexture>,
    ) -> MaterialHandle {
        let mut material = Material::textured(textures);
        material.is_color = is_color;
        let handle = MaterialHandle(self.material_ids.acquire());
        material.name = format!("Material {}", handle.index());
        log::debug!("Added {handle} (color: {is_color})");
        self.materials.insert(handle, material);
        handle
    }

    /// Removes a material; components using it fall back to the default.
    ///
    /// Returns `false` for the default material.
    pub fn remove_material(&mut self, handle: MaterialHandle) -> bool {
        let _ = self.material(handle);
        if handle == MaterialHandle::DEFAULT {
            log::warn!("The default material cannot be removed");
            return false;
        }
        for entity in self.entities.values_mut() {
            for component in &mut entity.components {
                if component.material == handle {
                    component.material = MaterialHandle::DEFAULT;
                }
            }
        }
        self.materials.remove(&handle);
        self.material_ids.release(handle.0);
        log::debug!("Removed {handle}");
        true
    }

    // ========================================================================
    // Shaders
    // ========================================================================

    pub fn add_shader(&mut self, name: impl Into<String>, source: ShaderSource) -> ShaderHandle {
        let handle = ShaderHandle(self.shader_ids.acquire());
        let shader = Shader::new(name, source);
        log::debug!("Added {handle} '{}'", shader.name);
        self.shaders.insert(handle, shader);
        handle
    }

    /// Removes a shader; materials using it fall back to the default shader.
    ///
    /// Returns `false` for the default shader.
    pub fn remove_shader(&mut self, handle: ShaderHandle) -> bool {
        let _ = self.shader(handle);
        if handle == ShaderHandle::DEFAULT {
            log::warn!("The default shader cannot be removed");
            return false;
        }
        for material in self.materials.values_mut() {
            if material.shader == handle {
                material.shader = ShaderHandle::DEFAULT;
            }
        }
        self.shaders.remove(&handle);
        self.shader_ids.release(handle.0);
        log::debug!("Removed {handle}");
        true
    }

    // ========================================================================
    // Lights
    // ========================================================================

    pub fn add_light(&mut self, light_type: LightType) -> LightHandle {
        let handle = LightHandle(self.light_ids.acquire());
        let mut light = Light::new(light_type);
        light.name = format!("{} {}", light_type.name(), handle.index());
        log::debug!("Added {handle} ({light_type:?})");
        self.lights.insert(handle, light);
        self.light_order.push(handle);
        handle
    }

    /// Removes a light and returns it.
    ///
    /// Shadow slots are reassigned from the remaining lights on the next frame.
    pub fn remove_light(&mut self, handle: LightHandle) -> Light {
        let light = self
            .lights
            .remove(&handle)
            .unwrap_or_else(|| panic!("remove_light: unknown {handle}"));
        self.light_ids.release(handle.0);
        self.light_order.retain(|&h| h != handle);
        log::debug!("Removed {handle}");
        light
    }

    /// Live light counts per type.
    #[must_use]
    pub fn light_counts(&self) -> LightCounts {
        let mut counts = LightCounts::default();
        for light in self.lights.values() {
            match light.light_type() {
                LightType::Directional => counts.directional += 1,
                LightType::Point => counts.point += 1,
                LightType::Spot => counts.spot += 1,
            }
        }
        counts
    }

    // ========================================================================
    // Entities
    // ========================================================================

    /// Adds a single-component entity from existing resources.
    pub fn add_entity_with(&mut self, mesh: MeshHandle, material: MaterialHandle) -> EntityHandle {
        let _ = (self.mesh(mesh), self.material(material));
        self.insert_entity(EntityOrigin::Primitive, vec![Component::new(mesh, material)])
    }

    /// Adds a cube or sphere entity with its own mesh and the default material.
    pub fn add_entity(&mut self, mesh_type: MeshType) -> EntityHandle {
        let mesh = self.add_mesh(mesh_type);
        self.insert_entity(
            EntityOrigin::Primitive,
            vec![Component::new(mesh, MaterialHandle::DEFAULT)],
        )
    }

    /// Imports a model and adds it as one entity with a component per sub-mesh.
    ///
    /// On failure the registry is left untouched.
    pub fn add_entity_from_model(
        &mut self,
        path: &Path,
        importer: &dyn ModelImporter,
    ) -> Result<EntityHandle> {
        let model = importer.import(path)?;

        let components = model
            .submeshes
            .into_iter()
            .map(|sub| {
                let mesh = self.add_mesh_from_geometry(sub.vertices, sub.indices);
                if !sub.name.is_empty() {
                    self.mesh_mut(mesh).name = sub.name;
                }
                let is_color = sub.textures.is_empty();
                let material = self.add_material(is_color, sub.textures);
                Component::new(mesh, material)
            })
            .collect();

        let handle = self.insert_entity(EntityOrigin::Imported, components);
        if let Some(stem) = path.file_stem() {
            self.entity_mut(handle).name = stem.to_string_lossy().into_owned();
        }
        Ok(handle)
    }

    fn insert_entity(&mut self, origin: EntityOrigin, components: Vec<Component>) -> EntityHandle {
        let handle = EntityHandle(self.entity_ids.acquire());
        let mut entity = Entity::new(origin, components);
        entity.name = format!("Entity {}", handle.index());
        log::debug!(
            "Added {handle} ({origin:?}, {} components)",
            entity.components.len()
        );
        self.entities.insert(handle, entity);
        handle
    }

    /// Removes an entity together with the resources created for it.
    ///
    /// Component meshes are removed unless another entity shares them.
    /// Component materials are removed only for imported entities; the
    /// shared default material is never touched.
    pub fn remove_entity(&mut self, handle: EntityHandle) -> Entity {
        let entity = self
            .entities
            .remove(&handle)
            .unwrap_or_else(|| panic!("remove_entity: unknown {handle}"));
        self.entity_ids.release(handle.0);

        if self.selection.is_some_and(|s| s.entity == handle) {
            self.selection = None;
        }

        for component in &entity.components {
            if self.meshes.contains_key(&component.mesh)
                && component.mesh != self.gizmo_mesh
                && self.mesh_user(component.mesh).is_none()
            {
                self.meshes.remove(&component.mesh);
                self.mesh_ids.release(component.mesh.0);
            }
            if entity.origin() == EntityOrigin::Imported
                && component.material != MaterialHandle::DEFAULT
                && self.materials.contains_key(&component.material)
                && !self.material_in_use(component.material)
            {
                self.materials.remove(&component.material);
                self.material_ids.release(component.material.0);
            }
        }
        log::debug!("Removed {handle}");
        entity
    }

    /// Points component `index` of `entity` at `material`.
    pub fn set_component_material(
        &mut self,
        entity: EntityHandle,
        index: usize,
        material: MaterialHandle,
    ) {
        let _ = self.material(material);
        let entity_ref = self.entity_mut(entity);
        let count = entity_ref.components.len();
        let component = entity_ref
            .components
            .get_mut(index)
            .unwrap_or_else(|| panic!("{entity} has {count} components, index {index} is out of range"));
        component.material = material;
    }

    fn mesh_user(&self, mesh: MeshHandle) -> Option<EntityHandle> {
        self.entities
            .iter()
            .find(|(_, e)| e.components.iter().any(|c| c.mesh == mesh))
            .map(|(h, _)| *h)
    }

    fn material_in_use(&self, material: MaterialHandle) -> bool {
        self.entities
            .values()
            .any(|e| e.components.iter().any(|c| c.material == material))
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Selects `entity` (and its first component), or clears the selection.
    pub fn select_entity(&mut self, entity: Option<EntityHandle>) {
        if let Some(prev) = self.selection.take()
            && let Some(e) = self.entities.get_mut(&prev.entity)
        {
            e.selected = false;
        }
        if let Some(handle) = entity {
            self.entity_mut(handle).selected = true;
            self.selection = Some(Selection {
                entity: handle,
                component_index: 0,
            });
        }
    }

    /// Selects component `index` of the selected entity.
    ///
    /// Returns `false` if nothing is selected or `index` is out of range.
    pub fn select_component(&mut self, index: usize) -> bool {
        let Some(sel) = self.selection else {
            return false;
        };
        let in_range = self
            .entities
            .get(&sel.entity)
            .is_some_and(|e| index < e.components.len());
        if in_range {
            self.selection = Some(Selection {
                component_index: index,
                ..sel
            });
        }
        in_range
    }

    /// The current selection, if its entity still exists.
    #[must_use]
    pub fn selection(&self) -> Option<Selection> {
        self.selection
            .filter(|s| self.entities.contains_key(&s.entity))
    }

    #[must_use]
    pub fn selected_entity(&self) -> Option<EntityHandle> {
        self.selection().map(|s| s.entity)
    }

    /// Resolves the selected component.
    #[must_use]
    pub fn selected_component(&self) -> Option<(EntityHandle, &Component)> {
        let sel = self.selection()?;
        let component = self.entities.get(&sel.entity)?.components.get(sel.component_index)?;
        Some((sel.entity, component))
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub fn entity(&self, handle: EntityHandle) -> &Entity {
        self.entities
            .get(&handle)
            .unwrap_or_else(|| panic!("unknown {handle}"))
    }

    pub fn entity_mut(&mut self, handle: EntityHandle) -> &mut Entity {
        self.entities
            .get_mut(&handle)
            .unwrap_or_else(|| panic!("unknown {handle}"))
    }

    #[must_use]
    pub fn mesh(&self, handle: MeshHandle) -> &Mesh {
        self.meshes
            .get(&handle)
            .unwrap_or_else(|| panic!("unknown {handle}"))
    }

    /// Mutable access for renaming. Geometry only changes through
    /// [`set_sphere_tessellation`](Self::set_sphere_tessellation).
    pub fn mesh_mut(&mut self, handle: MeshHandle) -> &mut Mesh {
        self.meshes
            .get_mut(&handle)
            .unwrap_or_else(|| panic!("unknown {handle}"))
    }

    #[must_use]
    pub fn material(&self, handle: MaterialHandle) -> &Material {
        self.materials
            .get(&handle)
            .unwrap_or_else(|| panic!("unknown {handle}"))
    }

    pub fn material_mut(&mut self, handle: MaterialHandle) -> &mut Material {
        self.materials
            .get_mut(&handle)
            .unwrap_or_else(|| panic!("unknown {handle}"))
    }

    #[must_use]
    pub fn light(&self, handle: LightHandle) -> &Light {
        self.lights
            .get(&handle)
            .unwrap_or_else(|| panic!("unknown {handle}"))
    }

    pub fn light_mut(&mut self, handle: LightHandle) -> &mut Light {
        self.lights
            .get_mut(&handle)
            .unwrap_or_else(|| panic!("unknown {handle}"))
    }

    #[must_use]
    pub fn shader(&self, handle: ShaderHandle) -> &Shader {
        self.shaders
            .get(&handle)
            .unwrap_or_else(|| panic!("unknown {handle}"))
    }

    pub fn shader_mut(&mut self, handle: ShaderHandle) -> &mut Shader {
        self.shaders
            .get_mut(&handle)
            .unwrap_or_else(|| panic!("unknown {handle}"))
    }

    #[must_use]
    pub fn try_entity(&self, handle: EntityHandle) -> Option<&Entity> {
        self.entities.get(&handle)
    }

    #[must_use]
    pub fn try_mesh(&self, handle: MeshHandle) -> Option<&Mesh> {
        self.meshes.get(&handle)
    }

    #[must_use]
    pub fn try_material(&self, handle: MaterialHandle) -> Option<&Material> {
        self.materials.get(&handle)
    }

    #[must_use]
    pub fn try_light(&self, handle: LightHandle) -> Option<&Light> {
        self.lights.get(&handle)
    }

    #[must_use]
    pub fn try_shader(&self, handle: ShaderHandle) -> Option<&Shader> {
        self.shaders.get(&handle)
    }

    // ========================================================================
    // Iteration & counts
    // ========================================================================

    pub fn entities(&self) -> impl Iterator<Item = (EntityHandle, &Entity)> {
        self.entities.iter().map(|(h, e)| (*h, e))
    }

    pub fn meshes(&self) -> impl Iterator<Item = (MeshHandle, &Mesh)> {
        self.meshes.iter().map(|(h, m)| (*h, m))
    }

    pub fn materials(&self) -> impl Iterator<Item = (MaterialHandle, &Material)> {
        self.materials.iter().map(|(h, m)| (*h, m))
    }

    pub fn lights(&self) -> impl Iterator<Item = (LightHandle, &Light)> {
        self.lights.iter().map(|(h, l)| (*h, l))
    }

    /// Lights from oldest to newest. Shadow slots are handed out in this order.
    pub fn lights_by_creation(&self) -> impl Iterator<Item = (LightHandle, &Light)> {
        self.light_order.iter().map(|h| (*h, self.light(*h)))
    }

    pub fn shaders(&self) -> impl Iterator<Item = (ShaderHandle, &Shader)> {
        self.shaders.iter().map(|(h, s)| (*h, s))
    }

    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    #[must_use]
    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    #[must_use]
    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    #[must_use]
    pub fn shader_count(&self) -> usize {
        self.shaders.len()
    }

    fn bump_revision(&mut self) -> u64 {
        let r = self.next_revision;
        self.next_revision += 1;
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_registered_once() {
        let reg = ResourceRegistry::new();
        assert_eq!(reg.shader_count(), 1);
        assert_eq!(reg.material_count(), 1);
        assert_eq!(reg.mesh_count(), 1);
        assert_eq!(reg.shader(ShaderHandle::DEFAULT).name, "Default");
        assert!(reg.material(MaterialHandle::DEFAULT).is_color);
        assert!(reg.is_internal_mesh(reg.gizmo_mesh()));
    }

    #[test]
    fn light_names_follow_type_and_handle() {
        let mut reg = ResourceRegistry::new();
        let d = reg.add_light(LightType::Directional);
        let p = reg.add_light(LightType::Point);
        assert_eq!(reg.light(d).name, "Directional Light 0");
        assert_eq!(reg.light(p).name, "Point Light 1");
    }

    #[test]
    fn selection_survives_component_growth() {
        let mut reg = ResourceRegistry::new();
        let e = reg.add_entity(MeshType::Cube);
        reg.select_entity(Some(e));
        let extra = reg.add_mesh(MeshType::Sphere);
        reg.entity_mut(e)
            .components
            .push(Component::new(extra, MaterialHandle::DEFAULT));
        assert!(reg.select_component(1));
        let (owner, component) = reg.selected_component().expect("selection resolves");
        assert_eq!(owner, e);
        assert_eq!(component.mesh, extra);
        assert!(!reg.select_component(2));
    }

    #[test]
    fn reselecting_clears_previous_flag() {
        let mut reg = ResourceRegistry::new();
        let a = reg.add_entity(MeshType::Cube);
        let b = reg.add_entity(MeshType::Cube);
        reg.select_entity(Some(a));
        reg.select_entity(Some(b));
        assert!(!reg.entity(a).is_selected());
        assert!(reg.entity(b).is_selected());
        reg.select_entity(None);
        assert!(!reg.entity(b).is_selected());
        assert!(reg.selection().is_none());
    }

    #[test]
    fn shared_mesh_is_not_removed() {
        let mut reg = ResourceRegistry::new();
        let e = reg.add_entity(MeshType::Cube);
        let mesh = reg.entity(e).components[0].mesh;
        assert!(!reg.remove_mesh(mesh));
        assert!(!reg.remove_mesh(reg.gizmo_mesh()));
    }

    #[test]
    fn tessellation_bumps_revision() {
        let mut reg = ResourceRegistry::new();
        let s = reg.add_mesh(MeshType::Sphere);
        let before = reg.mesh(s).revision();
        assert!(reg.set_sphere_tessellation(s, 8, 6));
        assert!(reg.mesh(s).revision() > before);
        let c = reg.add_mesh(MeshType::Cube);
        assert!(!reg.set_sphere_tessellation(c, 8, 6));
    }

    #[test]
    #[should_panic(expected = "unknown Light#3")]
    fn unknown_handle_panics() {
        let reg = ResourceRegistry::new();
        let _ = reg.light(LightHandle(3));
    }
}
