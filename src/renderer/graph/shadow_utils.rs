//! Shadow Utilities
//!
//! Slot allocation and matrix packing for shadow mapping, kept free of GPU
//! state so the budget rules can be tested directly.
//!
//! # Budget
//!
//! With a budget of `N`:
//!
//! | Light type  | Pool                     | Slots            |
//! |-------------|--------------------------|------------------|
//! | Directional | 2D array                 | layers `0..N/2`  |
//! | Spot        | 2D array                 | layers `N/2..N`  |
//! | Point       | cube array (6 layers/slot) | slots `0..N`   |
//!
//! Lights are visited oldest first, so a new light never takes the slot of
//! one that already had it; removing a light moves younger lights down.

use glam::Mat4;

use crate::registry::{LightHandle, ResourceRegistry};
use crate::renderer::core::RenderTarget;
use crate::scene::LightType;

pub const SHADOW_DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Shadow map assigned to one light.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowSlot {
    /// Layer of the 2D shadow array.
    Planar(u32),
    /// Cube slot; its faces are layers `6·slot..6·slot + 6` of the point array.
    Cube(u32),
}

impl ShadowSlot {
    #[inline]
    #[must_use]
    pub fn index(self) -> u32 {
        match self {
            Self::Planar(i) | Self::Cube(i) => i,
        }
    }
}

/// Result of one frame's slot assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShadowAllocation {
    budget: u32,
    assigned: Vec<(LightHandle, LightType, ShadowSlot)>,
    skipped: Vec<LightHandle>,
}

/// Assigns shadow slots to `lights` in iteration order, oldest light first.
///
/// Lights past their type's share of `budget` get no slot and are listed in
/// [`ShadowAllocation::skipped`].
#[must_use]
pub fn allocate_shadow_slots<I>(lights: I, budget: u32) -> ShadowAllocation
where
    I: IntoIterator<Item = (LightHandle, LightType)>,
{
    let half = budget / 2;
    let (mut directional, mut spot, mut point) = (0u32, 0u32, 0u32);
    let mut allocation = ShadowAllocation {
        budget,
        ..Default::default()
    };

    for (handle, light_type) in lights {
        let slot = match light_type {
            LightType::Directional if directional < half => {
                directional += 1;
                Some(ShadowSlot::Planar(directional - 1))
            }
            LightType::Spot if spot < half => {
                spot += 1;
                Some(ShadowSlot::Planar(half + spot - 1))
            }
            LightType::Point if point < budget => {
                point += 1;
                Some(ShadowSlot::Cube(point - 1))
            }
            _ => None,
        };
        match slot {
            Some(slot) => allocation.assigned.push((handle, light_type, slot)),
            None => allocation.skipped.push(handle),
        }
    }
    allocation
}

impl ShadowAllocation {
    #[must_use]
    pub fn budget(&self) -> u32 {
        self.budget
    }

    #[must_use]
    pub fn slot_for(&self, light: LightHandle) -> Option<ShadowSlot> {
        self.assigned
            .iter()
            .find(|(handle, ..)| *handle == light)
            .map(|(.., slot)| *slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = (LightHandle, ShadowSlot)> + '_ {
        self.assigned.iter().map(|(handle, _, slot)| (*handle, *slot))
    }

    /// Number of assigned slots of `light_type`.
    #[must_use]
    pub fn count(&self, light_type: LightType) -> usize {
        self.assigned.iter().filter(|(_, t, _)| *t == light_type).count()
    }

    /// Lights that exceeded their type's budget this frame.
    #[must_use]
    pub fn skipped(&self) -> &[LightHandle] {
        &self.skipped
    }
}

// ============================================================================
// Shadow views
// ============================================================================

/// One depth render of the shadow pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowView {
    /// Layer of the planar array, or of the point array when `cube` is set.
    pub layer: u32,
    pub cube: bool,
    pub light_space: Mat4,
}

/// Expands an allocation into per-layer views (six per point light).
#[must_use]
pub fn build_shadow_views(registry: &ResourceRegistry, allocation: &ShadowAllocation) -> Vec<ShadowView> {
    let mut views = Vec::new();
    for (handle, slot) in allocation.iter() {
        let matrices = registry.light(handle).light_space_matrices();
        match slot {
            ShadowSlot::Planar(layer) => views.push(ShadowView {
                layer,
                cube: false,
                light_space: matrices[0],
            }),
            ShadowSlot::Cube(slot) => {
                views.extend(matrices.iter().enumerate().map(|(face, m)| ShadowView {
                    layer: slot * 6 + face as u32,
                    cube: true,
                    light_space: *m,
                }));
            }
        }
    }
    views
}

/// Packs view matrices into the table read by the lighting shader.
///
/// Planar layer `l` lives at index `l`; point layer `l` at `budget + l`.
/// The table always holds `7·budget` entries (at least one).
#[must_use]
pub fn shadow_matrix_table(views: &[ShadowView], budget: u32) -> Vec<Mat4> {
    let mut table = vec![Mat4::IDENTITY; (7 * budget as usize).max(1)];
    for view in views {
        let index = if view.cube { budget + view.layer } else { view.layer };
        if let Some(entry) = table.get_mut(index as usize) {
            *entry = view.light_space;
        }
    }
    table
}

// ============================================================================
// GPU shadow maps
// ============================================================================

/// Depth arrays backing every shadow slot.
pub struct ShadowMaps {
    /// `budget` layers for directional and spot lights.
    pub planar: RenderTarget,
    /// `6·budget` layers for point light cube faces.
    pub point: RenderTarget,
    pub budget: u32,
    pub planar_size: u32,
    pub point_size: u32,
    /// Changes whenever the maps are reallocated.
    pub generation: u64,
}

impl ShadowMaps {
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        budget: u32,
        planar_size: u32,
        point_size: u32,
        generation: u64,
    ) -> Self {
        log::info!(
            "Allocating shadow maps: {budget} x {planar_size}px planar, {budget} x 6 x {point_size}px cube"
        );
        Self {
            planar: RenderTarget::new_array(
                device,
                "Shadow Map Array",
                SHADOW_DEPTH_FORMAT,
                planar_size,
                budget,
            ),
            point: RenderTarget::new_array(
                device,
                "Point Shadow Map Array",
                SHADOW_DEPTH_FORMAT,
                point_size,
                budget * 6,
            ),
            budget,
            planar_size,
            point_size,
            generation,
        }
    }

    /// Whether these maps were built for the given settings.
    #[must_use]
    pub fn matches(&self, budget: u32, planar_size: u32, point_size: u32) -> bool {
        self.budget == budget && self.planar_size == planar_size && self.point_size == point_size
    }

    #[must_use]
    pub fn view_for(&self, view: &ShadowView) -> &wgpu::TextureView {
        if view.cube {
            self.point.layer_view(view.layer)
        } else {
            self.planar.layer_view(view.layer)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_faces_follow_planar_block() {
        let views = [
            ShadowView {
                layer: 1,
                cube: false,
                light_space: Mat4::from_scale(glam::Vec3::splat(2.0)),
            },
            ShadowView {
                layer: 3,
                cube: true,
                light_space: Mat4::from_scale(glam::Vec3::splat(3.0)),
            },
        ];
        let table = shadow_matrix_table(&views, 4);
        assert_eq!(table.len(), 28);
        assert_eq!(table[1], views[0].light_space);
        assert_eq!(table[4 + 3], views[1].light_space);
        assert_eq!(table[0], Mat4::IDENTITY);
    }

    #[test]
    fn empty_budget_still_has_one_matrix() {
        assert_eq!(shadow_matrix_table(&[], 0).len(), 1);
    }
}
