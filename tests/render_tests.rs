//! End-to-End Rendering Tests
//!
//! Renders a small scene headless and reads the intermediate targets back:
//! - pass order of the deferred graph
//! - G-buffer coverage where the cube is
//! - lit HDR output and a non-empty tone-mapped image
//! - selection, shader fallback, texture release and shadow budget on a
//!   live renderer
//!
//! Every test skips (with a log line) when no GPU adapter is available.

use glam::Vec3;

use umbra::registry::ResourceRegistry;
use umbra::renderer::graph::FrameTarget;
use umbra::renderer::{Renderer, RendererSettings};
use umbra::resources::{MaterialTexture, MeshType, ShaderSource, TextureKind};
use umbra::scene::{Camera, LightType};

const WIDTH: u32 = 64;
const HEIGHT: u32 = 64;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn small_settings() -> RendererSettings {
    RendererSettings {
        max_shadow_maps: 2,
        shadow_map_size: 256,
        point_shadow_map_size: 256,
        ..Default::default()
    }
}

fn headless_renderer(settings: RendererSettings) -> Option<Renderer> {
    init_logger();
    match pollster::block_on(Renderer::headless(settings, WIDTH, HEIGHT)) {
        Ok(renderer) => Some(renderer),
        Err(e) => {
            log::warn!("Skipping GPU test: {e}");
            None
        }
    }
}

/// A cube at the origin lit by a point light above it.
fn cube_scene() -> (ResourceRegistry, Camera) {
    let mut registry = ResourceRegistry::new();
    registry.add_entity(MeshType::Cube);
    let light = registry.add_light(LightType::Point);
    registry.light_mut(light).set_position(Vec3::new(0.0, 1.0, 0.0));

    let camera = Camera::new(Vec3::new(0.0, 0.0, 3.0), WIDTH as f32 / HEIGHT as f32);
    (registry, camera)
}

fn center(pixels: &[[f32; 4]]) -> [f32; 4] {
    pixels[(HEIGHT / 2 * WIDTH + WIDTH / 2) as usize]
}

fn luminance(p: [f32; 4]) -> f32 {
    0.2126 * p[0] + 0.7152 * p[1] + 0.0722 * p[2]
}

// ============================================================================
// Graph shape
// ============================================================================

#[test]
fn passes_run_in_deferred_order() -> anyhow::Result<()> {
    let Some(renderer) = headless_renderer(small_settings()) else {
        return Ok(());
    };
    assert_eq!(
        renderer.pass_names(),
        vec![
            "Shadow Pass",
            "Geometry Pass",
            "SSAO Pass",
            "Lighting Pass",
            "Highlight Pass",
            "Skybox Pass",
            "Light Gizmo Pass",
            "Bloom Pass",
            "Tone Map Pass",
        ]
    );
    Ok(())
}

// ============================================================================
// Full frame
// ============================================================================

#[test]
fn cube_fills_gbuffer_and_lights_hdr() -> anyhow::Result<()> {
    let Some(mut renderer) = headless_renderer(small_settings()) else {
        return Ok(());
    };
    let (registry, camera) = cube_scene();

    renderer.render(&registry, &camera);
    assert_eq!(renderer.frame_count(), 1);

    let normal = renderer
        .read_target(FrameTarget::Normal)
        .ok_or_else(|| anyhow::anyhow!("normal target missing"))?;
    assert_eq!(normal.len(), (WIDTH * HEIGHT) as usize);
    let n = center(&normal);
    assert!((n[3] - 1.0).abs() < 1e-3, "cube covers the centre pixel, got {n:?}");
    assert!(n[2] > 0.9, "front face normal points at the camera, got {n:?}");
    assert!(normal[0][3] < 0.5, "corner pixel is background");

    let position = renderer
        .read_target(FrameTarget::Position)
        .ok_or_else(|| anyhow::anyhow!("position target missing"))?;
    let p = center(&position);
    assert!((p[2] - 0.5).abs() < 1e-2, "front face sits at z = 0.5, got {p:?}");

    let hdr = renderer
        .read_target(FrameTarget::Hdr)
        .ok_or_else(|| anyhow::anyhow!("hdr target missing"))?;
    assert!(luminance(center(&hdr)) > 0.0, "lit cube is not black");

    let output = renderer
        .read_target(FrameTarget::Output)
        .ok_or_else(|| anyhow::anyhow!("headless output missing"))?;
    assert!(output.iter().any(|p| luminance(*p) > 0.0), "tone-mapped image is not empty");
    Ok(())
}

#[test]
fn ssao_disabled_leaves_full_visibility() -> anyhow::Result<()> {
    let mut settings = small_settings();
    settings.ssao.enabled = false;
    let Some(mut renderer) = headless_renderer(settings) else {
        return Ok(());
    };
    let (registry, camera) = cube_scene();
    renderer.render(&registry, &camera);

    let ssao = renderer
        .read_target(FrameTarget::Ssao)
        .ok_or_else(|| anyhow::anyhow!("ssao target missing"))?;
    assert!(ssao.iter().all(|p| (p[0] - 1.0).abs() < 1e-3), "cleared to white");
    Ok(())
}

#[test]
fn gizmo_writes_bright_target() -> anyhow::Result<()> {
    let mut settings = small_settings();
    settings.bright_threshold = 100.0;
    let Some(mut renderer) = headless_renderer(settings) else {
        return Ok(());
    };

    // No geometry: only the gizmo cube of a light in front of the camera.
    let mut registry = ResourceRegistry::new();
    let light = registry.add_light(LightType::Point);
    registry.light_mut(light).set_position(Vec3::ZERO);
    registry.light_mut(light).diffuse = Vec3::ONE;
    let camera = Camera::new(Vec3::new(0.0, 0.0, 1.0), 1.0);

    renderer.render(&registry, &camera);
    let bright = renderer
        .read_target(FrameTarget::Bright)
        .ok_or_else(|| anyhow::anyhow!("bright target missing"))?;
    assert!(luminance(center(&bright)) > 0.0, "gizmo glows through bloom");

    registry.light_mut(light).visible = false;
    renderer.render(&registry, &camera);
    let bright = renderer
        .read_target(FrameTarget::Bright)
        .ok_or_else(|| anyhow::anyhow!("bright target missing"))?;
    assert!(luminance(center(&bright)) < 1e-4, "hidden gizmo is not drawn");
    Ok(())
}

// ============================================================================
// Editor interactions on a live renderer
// ============================================================================

#[test]
fn broken_custom_shader_falls_back() -> anyhow::Result<()> {
    let Some(mut renderer) = headless_renderer(small_settings()) else {
        return Ok(());
    };
    let (mut registry, camera) = cube_scene();

    let shader = registry.add_shader("Broken", ShaderSource::Inline("this is not wgsl".to_string()));
    let material = registry.add_material(true, []);
    registry.material_mut(material).shader = shader;
    let (entity, _) = registry.entities().next().unwrap();
    registry.set_component_material(entity, 0, material);

    renderer.render(&registry, &camera);

    let normal = renderer
        .read_target(FrameTarget::Normal)
        .ok_or_else(|| anyhow::anyhow!("normal target missing"))?;
    assert!(
        (center(&normal)[3] - 1.0).abs() < 1e-3,
        "the built-in program still draws the cube"
    );
    Ok(())
}

/// Valid WGSL that reads a bind group the G-buffer layout does not have.
const MISMATCHED_LAYOUT_WGSL: &str = r"
@group(3) @binding(0) var<uniform> tint: vec4<f32>;

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(position, 1.0) + tint * 0.0;
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0, 0.0, 1.0, 1.0);
}
";

#[test]
fn shader_outside_gbuffer_layout_falls_back() -> anyhow::Result<()> {
    let Some(mut renderer) = headless_renderer(small_settings()) else {
        return Ok(());
    };
    let (mut registry, camera) = cube_scene();

    // A second cube keeps the default program.
    let other = registry.add_entity(MeshType::Cube);
    registry.entity_mut(other).transform.position = Vec3::new(0.0, 1.1, 0.0);

    let shader = registry.add_shader("Mismatched", ShaderSource::Inline(MISMATCHED_LAYOUT_WGSL.to_string()));
    let material = registry.add_material(true, []);
    registry.material_mut(material).shader = shader;
    let (first, _) = registry.entities().next().unwrap();
    registry.set_component_material(first, 0, material);

    for _ in 0..2 {
        renderer.render(&registry, &camera);
    }

    let normal = renderer
        .read_target(FrameTarget::Normal)
        .ok_or_else(|| anyhow::anyhow!("normal target missing"))?;
    assert!(
        (center(&normal)[3] - 1.0).abs() < 1e-3,
        "the cube with the unusable shader is drawn by the built-in program"
    );
    // Near the top edge the view ray meets only the second cube.
    let upper = normal[(6 * WIDTH + WIDTH / 2) as usize];
    assert!((upper[3] - 1.0).abs() < 1e-3, "the other cube still reaches the G-buffer");

    let hdr = renderer
        .read_target(FrameTarget::Hdr)
        .ok_or_else(|| anyhow::anyhow!("hdr target missing"))?;
    assert!(luminance(center(&hdr)) > 0.0, "the frame is still lit");
    Ok(())
}

#[test]
fn textures_are_released_with_their_material() -> anyhow::Result<()> {
    let Some(mut renderer) = headless_renderer(small_settings()) else {
        return Ok(());
    };
    let (mut registry, camera) = cube_scene();

    // Missing files are cached as placeholders under their path.
    let material = registry.add_material(false, [MaterialTexture::new(TextureKind::Diffuse, "missing/brick.png")]);
    let (entity, _) = registry.entities().next().unwrap();
    registry.set_component_material(entity, 0, material);

    renderer.render(&registry, &camera);
    assert_eq!(renderer.resources().texture_count(), 1);

    registry.remove_material(material);
    renderer.render(&registry, &camera);
    assert_eq!(renderer.resources().texture_count(), 0, "no live material binds the texture");
    Ok(())
}

#[test]
fn shadow_budget_skips_extra_lights() -> anyhow::Result<()> {
    let Some(mut renderer) = headless_renderer(small_settings()) else {
        return Ok(());
    };
    let (mut registry, camera) = cube_scene();
    for _ in 0..3 {
        registry.add_light(LightType::Directional);
    }

    renderer.render(&registry, &camera);
    let allocation = renderer.shadow_allocation();
    assert_eq!(allocation.count(LightType::Directional), 1);
    assert_eq!(allocation.count(LightType::Point), 1);
    assert_eq!(allocation.skipped().len(), 2);
    Ok(())
}

#[test]
fn resize_reallocates_targets() -> anyhow::Result<()> {
    let Some(mut renderer) = headless_renderer(small_settings()) else {
        return Ok(());
    };
    let (registry, camera) = cube_scene();

    renderer.resize(32, 16);
    renderer.resize(0, 16);
    assert_eq!(renderer.size(), (32, 16), "zero sizes are ignored");

    renderer.render(&registry, &camera);
    let hdr = renderer
        .read_target(FrameTarget::Hdr)
        .ok_or_else(|| anyhow::anyhow!("hdr target missing"))?;
    assert_eq!(hdr.len(), 32 * 16);
    Ok(())
}
