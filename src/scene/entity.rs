//! Scene entities.
//!
//! An [`Entity`] is a placed object made of one or more [`Component`]s, each
//! binding a mesh and a material with a local transform. Entities reference
//! meshes and materials by handle only; the registry owns the data.

use glam::Mat4;

use crate::registry::{MaterialHandle, MeshHandle};
use crate::scene::transform::Transform;

/// How an entity was created, which decides what `remove_entity` frees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityOrigin {
    /// Built from a procedural cube/sphere; materials are shared.
    Primitive,
    /// Built by a model importer; meshes and materials are exclusive.
    Imported,
}

/// One mesh + material binding inside an entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub mesh: MeshHandle,
    pub material: MaterialHandle,
    pub transform: Transform,
}

impl Component {
    #[must_use]
    pub fn new(mesh: MeshHandle, material: MaterialHandle) -> Self {
        Self {
            mesh,
            material,
            transform: Transform::IDENTITY,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub name: String,
    pub transform: Transform,
    pub visible: bool,
    pub(crate) selected: bool,
    pub components: Vec<Component>,
    origin: EntityOrigin,
}

impl Entity {
    #[must_use]
    pub fn new(origin: EntityOrigin, components: Vec<Component>) -> Self {
        Self {
            name: String::new(),
            transform: Transform::IDENTITY,
            visible: true,
            selected: false,
            components,
            origin,
        }
    }

    #[inline]
    #[must_use]
    pub fn origin(&self) -> EntityOrigin {
        self.origin
    }

    #[inline]
    #[must_use]
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    #[inline]
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        self.transform.matrix()
    }

    /// `entity.matrix() · component.matrix()`
    #[must_use]
    pub fn world_matrix(&self, component: &Component) -> Mat4 {
        self.matrix() * component.transform.matrix()
    }
}
