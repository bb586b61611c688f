use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::Vec3;
use particle_accelerator::*;

const CUBE_FACES: [[u32; 4]; 6] = [
    [0, 3, 2, 1],
    [4, 5, 6, 7],
    [0, 1, 5, 4],
    [3, 7, 6, 2],
    [0, 4, 7, 3],
    [1, 2, 6, 5],
];

fn cube_shape() -> Arc<HullShape> {
    let e = Vec3::splat(0.5);
    let vertices = vec![
        Vec3::new(-e.x, -e.y, -e.z),
        Vec3::new(e.x, -e.y, -e.z),
        Vec3::new(e.x, e.y, -e.z),
        Vec3::new(-e.x, e.y, -e.z),
        Vec3::new(-e.x, -e.y, e.z),
        Vec3::new(e.x, -e.y, e.z),
        Vec3::new(e.x, e.y, e.z),
        Vec3::new(-e.x, e.y, e.z),
    ];
    let faces = CUBE_FACES.iter().map(|f| f.to_vec()).collect();
    Arc::new(HullShape::new(vertices, faces).unwrap())
}

fn bench_broad_phase(c: &mut Criterion) {
    c.bench_function("broad_phase_100_bodies", |b| {
        b.iter(|| {
            let shape = cube_shape();
            let mut world = World::new();
            for i in 0..100 {
                world
                    .add_dynamic_body(
                        shape.clone(),
                        Transform::from_position(Vec3::new(i as f32 * 1.5, 0.0, 0.0)),
                        1.0,
                        Material::default(),
                    )
                    .unwrap();
            }
            world.step(black_box(1.0 / 60.0), 8).unwrap();
        })
    });
}

fn floor_shape() -> Arc<HullShape> {
    let e = Vec3::new(25.0, 0.5, 25.0);
    let vertices = vec![
        Vec3::new(-e.x, -e.y, -e.z),
        Vec3::new(e.x, -e.y, -e.z),
        Vec3::new(e.x, e.y, -e.z),
        Vec3::new(-e.x, e.y, -e.z),
        Vec3::new(-e.x, -e.y, e.z),
        Vec3::new(e.x, -e.y, e.z),
        Vec3::new(e.x, e.y, e.z),
        Vec3::new(-e.x, e.y, e.z),
    ];
    let faces = CUBE_FACES.iter().map(|f| f.to_vec()).collect();
    Arc::new(HullShape::new(vertices, faces).unwrap())
}

fn bench_stack_settle(c: &mut Criterion) {
    c.bench_function("stack_of_20_settle_60_steps", |b| {
        b.iter(|| {
            let shape = cube_shape();
            let mut world = World::new();
            world
                .add_static_body(floor_shape(), Transform::from_position(Vec3::new(0.0, -0.5, 0.0)), 1.0)
                .unwrap();
            for i in 0..20 {
                world
                    .add_dynamic_body(
                        shape.clone(),
                        Transform::from_position(Vec3::new(0.0, i as f32 + 0.5, 0.0)),
                        1.0,
                        Material::default(),
                    )
                    .unwrap();
            }
            for _ in 0..60 {
                world.step(black_box(1.0 / 60.0), 8).unwrap();
            }
        })
    });
}

fn bench_bvh_bulk_build(c: &mut Criterion) {
    use particle_accelerator::collision::bvh::Bvh;
    use particle_accelerator::collision::Aabb;
    use particle_accelerator::utils::Arena;

    c.bench_function("bvh_bulk_build_5000_leaves", |b| {
        b.iter(|| {
            let mut bodies: Arena<()> = Arena::new();
            let leaves: Vec<_> = (0..5000)
                .map(|i| {
                    let pos = Vec3::new((i % 50) as f32, ((i / 50) % 50) as f32, (i / 2500) as f32);
                    let id = bodies.insert(());
                    (id, Aabb::new(pos, pos + Vec3::splat(0.9)))
                })
                .collect();
            let mut bvh = Bvh::new();
            bvh.build(black_box(leaves)).unwrap();
        })
    });
}

criterion_group!(benches, bench_broad_phase, bench_stack_settle, bench_bvh_bulk_build);
criterion_main!(benches);
