//! Shadow Allocation Tests
//!
//! Tests for:
//! - Budget partition: directional and spot share N 2D layers, points get N cubes
//! - Deterministic slot order (ascending handle)
//! - Skipped lights beyond the budget
//! - Shadow views and the packed matrix table
//! - Light-space matrices per light type

use glam::{Mat4, Vec3, Vec4Swizzles};

use umbra::registry::ResourceRegistry;
use umbra::renderer::graph::shadow_utils::{build_shadow_views, shadow_matrix_table};
use umbra::renderer::graph::{ShadowSlot, allocate_shadow_slots};
use umbra::scene::{Light, LightKind, LightType};

const EPSILON: f32 = 1e-4;

fn approx_vec3(a: Vec3, b: Vec3) -> bool {
    (a - b).abs().max_element() < EPSILON
}

fn allocate(registry: &ResourceRegistry, budget: u32) -> umbra::renderer::graph::ShadowAllocation {
    allocate_shadow_slots(
        registry.lights_by_creation().map(|(handle, light)| (handle, light.light_type())),
        budget,
    )
}

// ============================================================================
// Partition
// ============================================================================

#[test]
fn budget_is_partitioned_per_type() {
    let mut registry = ResourceRegistry::new();
    for _ in 0..4 {
        registry.add_light(LightType::Directional);
        registry.add_light(LightType::Spot);
        registry.add_light(LightType::Point);
    }

    let allocation = allocate(&registry, 4);
    assert_eq!(allocation.count(LightType::Directional), 2, "half of N");
    assert_eq!(allocation.count(LightType::Spot), 2, "the other half of N");
    assert_eq!(allocation.count(LightType::Point), 4, "points have their own N");
    assert_eq!(allocation.skipped().len(), 4);
}

#[test]
fn spot_layers_follow_directional_layers() {
    let mut registry = ResourceRegistry::new();
    let spot = registry.add_light(LightType::Spot);
    let sun = registry.add_light(LightType::Directional);
    let point = registry.add_light(LightType::Point);

    let allocation = allocate(&registry, 6);
    assert_eq!(allocation.slot_for(sun), Some(ShadowSlot::Planar(0)));
    assert_eq!(allocation.slot_for(spot), Some(ShadowSlot::Planar(3)));
    assert_eq!(allocation.slot_for(point), Some(ShadowSlot::Cube(0)));
}

#[test]
fn older_lights_win_the_budget() {
    let mut registry = ResourceRegistry::new();
    let first = registry.add_light(LightType::Point);
    let second = registry.add_light(LightType::Point);
    let third = registry.add_light(LightType::Point);

    let allocation = allocate(&registry, 2);
    assert_eq!(allocation.slot_for(first), Some(ShadowSlot::Cube(0)));
    assert_eq!(allocation.slot_for(second), Some(ShadowSlot::Cube(1)));
    assert_eq!(allocation.skipped(), &[third]);

    // Removing a light frees its slot for the next oldest light.
    registry.remove_light(first);
    let allocation = allocate(&registry, 2);
    assert_eq!(allocation.slot_for(second), Some(ShadowSlot::Cube(0)));
    assert_eq!(allocation.slot_for(third), Some(ShadowSlot::Cube(1)));
    assert!(allocation.skipped().is_empty());
}

#[test]
fn recycled_handle_does_not_jump_the_queue() {
    let mut registry = ResourceRegistry::new();
    let a = registry.add_light(LightType::Directional);
    let b = registry.add_light(LightType::Directional);
    registry.remove_light(a);

    // The newest light reuses the lowest id.
    let c = registry.add_light(LightType::Directional);
    assert_eq!(c, a, "handle of the removed light is recycled");
    assert!(c < b);

    let allocation = allocate(&registry, 2);
    assert_eq!(allocation.slot_for(b), Some(ShadowSlot::Planar(0)), "older light keeps the slot");
    assert_eq!(allocation.slot_for(c), None);
    assert_eq!(allocation.skipped(), &[c]);
}

#[test]
fn zero_budget_assigns_nothing() {
    let mut registry = ResourceRegistry::new();
    registry.add_light(LightType::Directional);
    registry.add_light(LightType::Point);

    let allocation = allocate(&registry, 0);
    assert_eq!(allocation.iter().count(), 0);
    assert_eq!(allocation.skipped().len(), 2);
}

// ============================================================================
// Views and matrix table
// ============================================================================

#[test]
fn point_lights_render_six_cube_faces() {
    let mut registry = ResourceRegistry::new();
    registry.add_light(LightType::Point);
    registry.add_light(LightType::Point);
    registry.add_light(LightType::Spot);

    let allocation = allocate(&registry, 4);
    let views = build_shadow_views(&registry, &allocation);

    let cube_layers: Vec<u32> = views.iter().filter(|v| v.cube).map(|v| v.layer).collect();
    assert_eq!(cube_layers, (0..12).collect::<Vec<_>>());
    let planar: Vec<u32> = views.iter().filter(|v| !v.cube).map(|v| v.layer).collect();
    assert_eq!(planar, vec![2]);
}

#[test]
fn matrix_table_places_cube_faces_after_planar_layers() {
    let mut registry = ResourceRegistry::new();
    let sun = registry.add_light(LightType::Directional);
    registry.add_light(LightType::Point);

    let budget = 2;
    let allocation = allocate(&registry, budget);
    let views = build_shadow_views(&registry, &allocation);
    let table = shadow_matrix_table(&views, budget);

    assert_eq!(table.len(), 7 * budget as usize);
    assert_eq!(table[0], registry.light(sun).light_space_matrices()[0]);
    assert_eq!(table[1], Mat4::IDENTITY, "unused planar layer");
    assert_ne!(table[budget as usize], Mat4::IDENTITY, "first cube face");
}

#[test]
fn matrix_table_is_never_empty() {
    assert_eq!(shadow_matrix_table(&[], 0).len(), 1);
}

// ============================================================================
// Light-space matrices
// ============================================================================

#[test]
fn matrix_count_per_light_type() {
    assert_eq!(Light::new(LightType::Directional).light_space_matrices().len(), 1);
    assert_eq!(Light::new(LightType::Spot).light_space_matrices().len(), 1);
    assert_eq!(Light::new(LightType::Point).light_space_matrices().len(), 6);
}

#[test]
fn point_light_faces_look_along_each_axis() {
    let mut light = Light::new(LightType::Point);
    light.set_position(Vec3::new(1.0, 2.0, 3.0));
    let position = light.position().unwrap();

    let axes = [Vec3::X, Vec3::NEG_X, Vec3::Y, Vec3::NEG_Y, Vec3::Z, Vec3::NEG_Z];
    for (matrix, axis) in light.light_space_matrices().iter().zip(axes) {
        let clip = *matrix * (position + axis * 2.0).extend(1.0);
        let ndc = clip.xyz() / clip.w;
        assert!(
            ndc.x.abs() < EPSILON && ndc.y.abs() < EPSILON,
            "a point straight along {axis} projects to the face centre, got {ndc}"
        );
    }
}

#[test]
fn spot_light_projects_its_axis_to_the_centre() {
    let light = Light::new(LightType::Spot);
    let LightKind::Spot {
        position, direction, ..
    } = light.kind
    else {
        unreachable!()
    };

    let target = position + direction.normalize() * 2.0;
    let clip = light.light_space_matrices()[0] * target.extend(1.0);
    let ndc = clip.xyz() / clip.w;
    assert!(approx_vec3(Vec3::new(ndc.x, ndc.y, 0.0), Vec3::ZERO), "got {ndc}");
    assert!((0.0..=1.0).contains(&ndc.z), "inside the depth range, got {}", ndc.z);
}
