use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use umbra::registry::ResourceRegistry;
use umbra::renderer::graph::{RenderLists, allocate_shadow_slots};
use umbra::resources::MeshType;
use umbra::scene::LightType;

fn populated_registry(entities: usize, lights: usize) -> ResourceRegistry {
    let mut registry = ResourceRegistry::new();
    for i in 0..entities {
        let mesh_type = if i % 2 == 0 { MeshType::Cube } else { MeshType::Sphere };
        registry.add_entity(mesh_type);
    }
    let types = [LightType::Directional, LightType::Point, LightType::Spot];
    for i in 0..lights {
        registry.add_light(types[i % types.len()]);
    }
    registry
}

fn bench_registry(c: &mut Criterion) {
    let mut group = c.benchmark_group("Registry");

    group.bench_function("Add/Remove Churn (1k cubes)", |b| {
        b.iter(|| {
            let mut registry = ResourceRegistry::new();
            let handles: Vec<_> = (0..1_000).map(|_| registry.add_entity(MeshType::Cube)).collect();
            for handle in handles.into_iter().step_by(2) {
                black_box(registry.remove_entity(handle));
            }
            black_box(registry.entity_count())
        });
    });

    group.finish();
}

fn bench_extraction(c: &mut Criterion) {
    let registry = populated_registry(500, 24);
    let mut group = c.benchmark_group("Frame Extraction");

    group.bench_function("Shadow Allocation (24 lights)", |b| {
        b.iter(|| {
            black_box(allocate_shadow_slots(
                registry.lights_by_creation().map(|(handle, light)| (handle, light.light_type())),
                10,
            ))
        });
    });

    let allocation = allocate_shadow_slots(
        registry.lights_by_creation().map(|(handle, light)| (handle, light.light_type())),
        10,
    );
    let mut lists = RenderLists::default();
    group.bench_function("Render Lists (500 entities)", |b| {
        b.iter(|| {
            lists.extract(black_box(&registry), &allocation);
            black_box(lists.draws.len())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_registry, bench_extraction);
criterion_main!(benches);
