//! Transform Tests
//!
//! Tests for:
//! - T · R · S composition order
//! - Euler rotation order (X, then Y, then Z)
//! - Entity × component world matrices
//! - Camera view/projection basics

use glam::{Mat4, Vec3};

use umbra::registry::ResourceRegistry;
use umbra::resources::MeshType;
use umbra::scene::{Camera, CameraMovement, Transform};

const EPSILON: f32 = 1e-4;

fn approx_vec3(a: Vec3, b: Vec3) -> bool {
    (a - b).abs().max_element() < EPSILON
}

// ============================================================================
// Transform
// ============================================================================

#[test]
fn identity_transform_is_identity_matrix() {
    assert!(Transform::IDENTITY.matrix().abs_diff_eq(Mat4::IDENTITY, EPSILON));
}

#[test]
fn scale_applies_before_rotation_and_translation() {
    let t = Transform::from_position(Vec3::new(10.0, 0.0, 0.0))
        .with_rotation_degrees(Vec3::new(0.0, 0.0, 90.0))
        .with_scale(Vec3::new(2.0, 1.0, 1.0));

    // X is scaled to 2, rotated onto +Y, then translated.
    let p = t.matrix().transform_point3(Vec3::X);
    assert!(approx_vec3(p, Vec3::new(10.0, 2.0, 0.0)), "got {p}");
}

#[test]
fn euler_x_applies_before_y() {
    let t = Transform::IDENTITY.with_rotation_degrees(Vec3::new(90.0, 90.0, 0.0));

    // X first: +Y → +Z. Then Y: +Z → +X.
    let p = t.matrix().transform_vector3(Vec3::Y);
    assert!(approx_vec3(p, Vec3::X), "got {p}");
}

#[test]
fn rotation_quat_is_normalized() {
    let t = Transform::IDENTITY.with_rotation_degrees(Vec3::new(33.0, -120.0, 471.0));
    assert!((t.rotation_quat().length() - 1.0).abs() < EPSILON);
}

// ============================================================================
// Entity / Component
// ============================================================================

#[test]
fn component_transform_is_local_to_entity() {
    let mut registry = ResourceRegistry::new();
    let handle = registry.add_entity(MeshType::Cube);

    let entity = registry.entity_mut(handle);
    entity.transform = Transform::from_position(Vec3::new(0.0, 5.0, 0.0)).with_scale(Vec3::splat(2.0));
    entity.components[0].transform = Transform::from_position(Vec3::new(1.0, 0.0, 0.0));

    let entity = registry.entity(handle);
    let world = entity.world_matrix(&entity.components[0]);
    let origin = world.transform_point3(Vec3::ZERO);
    assert!(
        approx_vec3(origin, Vec3::new(2.0, 5.0, 0.0)),
        "component offset is scaled by the entity, got {origin}"
    );
}

// ============================================================================
// Camera
// ============================================================================

#[test]
fn camera_moves_along_its_front() {
    let mut camera = Camera::new(Vec3::new(0.0, 0.0, 3.0), 1.0);
    camera.process_movement(CameraMovement::Forward, false, 1.0);
    assert!(approx_vec3(camera.position, Vec3::new(0.0, 0.0, 3.0 - camera.speed)));

    let start = camera.position;
    camera.process_movement(CameraMovement::Right, true, 1.0);
    assert!(approx_vec3(camera.position - start, Vec3::X * camera.speed * 2.0), "fast doubles speed");
}

#[test]
fn camera_zoom_is_clamped() {
    let mut camera = Camera::default();
    camera.process_zoom(1000.0);
    assert!((camera.zoom() - umbra::scene::camera::MIN_ZOOM).abs() < EPSILON);
    camera.process_zoom(-1000.0);
    assert!((camera.zoom() - umbra::scene::camera::MAX_ZOOM).abs() < EPSILON);
}

#[test]
fn camera_never_flips_over_the_pole() {
    let mut camera = Camera::default();
    for _ in 0..100 {
        camera.process_rotation(0.0, -500.0);
    }
    assert!(camera.front().dot(Vec3::Y).abs() < 0.999);
    assert!(camera.view().is_finite());
}

#[test]
fn origin_projects_inside_clip_space() {
    let camera = Camera::new(Vec3::new(0.0, 0.0, 3.0), 16.0 / 9.0);
    let clip = camera.view_projection() * Vec3::ZERO.extend(1.0);
    let ndc = clip.truncate() / clip.w;
    assert!(ndc.x.abs() < EPSILON && ndc.y.abs() < EPSILON);
    assert!((0.0..=1.0).contains(&ndc.z));
}
