//! Extracted Frame Data
//!
//! Flattens the registry into plain per-frame lists before any pass runs.
//! Passes never walk the registry themselves; they index into these lists
//! and into the object buffer filled from [`RenderLists::objects`].

use glam::{Mat4, Vec3};

use crate::registry::{EntityHandle, LightHandle, MaterialHandle, MeshHandle, ResourceRegistry, ShaderHandle};
use crate::renderer::core::uniforms::{GpuLight, ObjectUniforms, ShadowViewUniforms};
use crate::renderer::graph::shadow_utils::{
    ShadowAllocation, ShadowView, build_shadow_views, shadow_matrix_table,
};
use crate::scene::LightType;

/// Scale of the cube drawn at each light position.
pub const GIZMO_SCALE: f32 = 0.1;

/// G-buffer program used for one draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryProgram {
    Color,
    Textured,
    Custom(ShaderHandle),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawItem {
    pub entity: EntityHandle,
    pub component_index: usize,
    pub mesh: MeshHandle,
    pub material: MaterialHandle,
    pub program: GeometryProgram,
    /// Slot in the object buffer.
    pub object_index: u32,
    pub selected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GizmoItem {
    pub light: LightHandle,
    pub object_index: u32,
}

/// Everything the passes draw this frame.
#[derive(Debug, Default)]
pub struct RenderLists {
    pub draws: Vec<DrawItem>,
    pub gizmos: Vec<GizmoItem>,
    pub objects: Vec<ObjectUniforms>,
    pub lights: Vec<GpuLight>,
    pub shadow_views: Vec<ShadowView>,
    pub shadow_matrices: Vec<Mat4>,
}

impl RenderLists {
    /// Rebuilds every list from `registry`, reusing allocations.
    pub fn extract(&mut self, registry: &ResourceRegistry, allocation: &ShadowAllocation) {
        self.draws.clear();
        self.gizmos.clear();
        self.objects.clear();
        self.lights.clear();

        for (entity_handle, entity) in registry.entities() {
            if !entity.visible {
                continue;
            }
            for (component_index, component) in entity.components.iter().enumerate() {
                let object_index = self.objects.len() as u32;
                self.objects
                    .push(ObjectUniforms::new(entity.world_matrix(component)));
                self.draws.push(DrawItem {
                    entity: entity_handle,
                    component_index,
                    mesh: component.mesh,
                    material: component.material,
                    program: program_for(registry, component.material),
                    object_index,
                    selected: entity.is_selected(),
                });
            }
        }

        for (handle, light) in registry.lights() {
            let slot = allocation.slot_for(handle).map(|s| s.index());
            self.lights.push(GpuLight::new(light, slot));

            if !light.visible || light.light_type() == LightType::Directional {
                continue;
            }
            if let Some(position) = light.position() {
                let model = Mat4::from_translation(position) * Mat4::from_scale(Vec3::splat(GIZMO_SCALE));
                let object_index = self.objects.len() as u32;
                self.objects
                    .push(ObjectUniforms::new(model).with_color(light.diffuse));
                self.gizmos.push(GizmoItem {
                    light: handle,
                    object_index,
                });
            }
        }

        self.shadow_views = build_shadow_views(registry, allocation);
        self.shadow_matrices = shadow_matrix_table(&self.shadow_views, allocation.budget());
    }

    /// Per-view uniforms for the shadow pass, in `shadow_views` order.
    #[must_use]
    pub fn shadow_view_uniforms(&self) -> Vec<ShadowViewUniforms> {
        self.shadow_views
            .iter()
            .map(|v| ShadowViewUniforms {
                light_space: v.light_space,
            })
            .collect()
    }

    pub fn selected_draws(&self) -> impl Iterator<Item = &DrawItem> {
        self.draws.iter().filter(|d| d.selected)
    }
}

/// Picks the G-buffer program for `material`.
///
/// A custom shader wins over the material mode; the default shader maps to
/// the colour or textured built-in.
#[must_use]
pub fn program_for(registry: &ResourceRegistry, material: MaterialHandle) -> GeometryProgram {
    let material = registry.material(material);
    let custom = registry
        .try_shader(material.shader)
        .is_some_and(|shader| !shader.is_builtin());
    if custom {
        GeometryProgram::Custom(material.shader)
    } else if material.is_color {
        GeometryProgram::Color
    } else {
        GeometryProgram::Textured
    }
}
