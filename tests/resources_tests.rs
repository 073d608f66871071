//! Resource Data Tests
//!
//! Tests for:
//! - SSAO kernel: hemisphere orientation, quadratic scale growth, determinism
//! - SSAO rotation noise texture
//! - Bloom ping-pong parity
//! - Procedural cube and sphere geometry
//! - Tone-mapping mode cycling
//! - Renderer settings defaults

use glam::Vec3;

use umbra::renderer::RendererSettings;
use umbra::resources::bloom::{BlurSource, blur_step};
use umbra::resources::ssao::{SSAO_KERNEL_SIZE, kernel_scale};
use umbra::resources::{
    Mesh, MeshType, SphereTessellation, ToneMappingMode, bloom_output_index, generate_ssao_kernel,
    generate_ssao_noise,
};

const EPSILON: f32 = 1e-5;

// ============================================================================
// SSAO
// ============================================================================

#[test]
fn ssao_kernel_lies_in_the_upper_hemisphere() {
    let kernel = generate_ssao_kernel(SSAO_KERNEL_SIZE);
    assert_eq!(kernel.len(), SSAO_KERNEL_SIZE);
    for (i, sample) in kernel.iter().enumerate() {
        assert!(sample.z >= 0.0, "sample {i} points below the surface: {sample}");
        assert!(
            sample.truncate().length() <= kernel_scale(i, SSAO_KERNEL_SIZE) + EPSILON,
            "sample {i} exceeds its scale"
        );
        assert_eq!(sample.w, 0.0);
    }
}

#[test]
fn ssao_kernel_scale_grows_monotonically() {
    let scales: Vec<f32> = (0..SSAO_KERNEL_SIZE).map(|i| kernel_scale(i, SSAO_KERNEL_SIZE)).collect();
    assert!((scales[0] - 0.1).abs() < EPSILON, "first sample hugs the origin");
    assert!(scales.windows(2).all(|w| w[1] > w[0]), "scales must strictly increase");
    assert!(*scales.last().unwrap() < 1.0);
}

#[test]
fn ssao_kernel_is_deterministic() {
    assert_eq!(generate_ssao_kernel(16), generate_ssao_kernel(16));
}

#[test]
fn ssao_noise_is_a_4x4_rotation_texture() {
    let noise = generate_ssao_noise();
    assert_eq!(noise.len(), 16);
    for texel in &noise {
        assert_eq!(texel[2], 0, "rotation vectors lie in the tangent plane");
        assert_eq!(texel[3], 255);
    }
}

// ============================================================================
// Bloom
// ============================================================================

#[test]
fn bloom_output_index_follows_iteration_parity() {
    assert_eq!(bloom_output_index(0), 0);
    assert_eq!(bloom_output_index(1), 1);
    assert_eq!(bloom_output_index(2), 0);
    assert_eq!(bloom_output_index(9), 1);
    assert_eq!(bloom_output_index(10), 0);
}

#[test]
fn bloom_chain_reads_previous_destination() {
    let mut previous = None;
    for k in 0..10 {
        let (source, dst, horizontal) = blur_step(k);
        assert_eq!(horizontal, k % 2 == 0, "horizontal on even passes");
        match (k, source) {
            (0, BlurSource::Bright) => {}
            (_, BlurSource::PingPong(src)) => assert_eq!(Some(src), previous),
            other => panic!("unexpected blur source {other:?}"),
        }
        previous = Some(dst);
    }
    assert_eq!(previous, Some(bloom_output_index(10)));
}

// ============================================================================
// Procedural geometry
// ============================================================================

#[test]
fn cube_has_flat_shaded_faces() {
    let cube = Mesh::procedural(MeshType::Cube);
    assert_eq!(cube.vertices().len(), 24);
    assert_eq!(cube.indices().len(), 36);
    assert_eq!(cube.index_count(), 36);
    for v in cube.vertices() {
        assert!(v.position.abs().max_element() <= 0.5 + EPSILON);
        assert!((v.normal.length() - 1.0).abs() < EPSILON);
    }
}

#[test]
fn sphere_counts_match_tessellation() {
    let sphere = Mesh::procedural(MeshType::Sphere);
    let SphereTessellation { sectors, stacks } = sphere.tessellation().unwrap();
    assert_eq!(sphere.vertices().len(), ((sectors + 1) * (stacks + 1)) as usize);
    assert_eq!(sphere.indices().len(), (sectors * (2 * stacks - 2) * 3) as usize);
    assert!(Mesh::procedural(MeshType::Cube).tessellation().is_none());
}

#[test]
fn tessellation_is_clamped_to_a_closed_solid() {
    let t = SphereTessellation { sectors: 0, stacks: 1 }.clamped();
    assert_eq!((t.sectors, t.stacks), (3, 2));
}

#[test]
fn imported_geometry_gets_tangents() {
    let (vertices, indices) = {
        let cube = Mesh::procedural(MeshType::Cube);
        let mut vertices = cube.vertices().to_vec();
        for v in &mut vertices {
            v.tangent = Vec3::ZERO;
        }
        (vertices, cube.indices().to_vec())
    };
    let mesh = Mesh::from_geometry(vertices, indices);
    assert_eq!(mesh.mesh_type(), MeshType::Other);
    assert!(mesh.vertices().iter().all(|v| v.tangent != Vec3::ZERO));
}

// ============================================================================
// Settings
// ============================================================================

#[test]
fn tone_mapping_cycle_visits_every_mode() {
    let mut mode = ToneMappingMode::default();
    assert_eq!(mode, ToneMappingMode::Reinhard);

    let mut seen = vec![mode];
    for _ in 1..ToneMappingMode::all().len() {
        mode = mode.next();
        seen.push(mode);
    }
    assert_eq!(mode.next(), ToneMappingMode::Reinhard, "wraps around");
    for m in ToneMappingMode::all() {
        assert!(seen.contains(m), "{} never visited", m.name());
    }
}

#[test]
fn renderer_settings_defaults() {
    let settings = RendererSettings::default();
    assert_eq!(settings.max_shadow_maps, 10);
    assert_eq!(settings.shadow_slots_per_type(), 5);
    assert!(settings.ssao.enabled);
    assert!(settings.bloom.enabled);
    assert_eq!(settings.bloom.iterations(), 10);
    assert!((settings.tone_mapping.exposure() - 1.0).abs() < EPSILON);
}
