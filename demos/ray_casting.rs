use std::sync::Arc;

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

fn box_shape(half_extent: Vec3) -> Arc<HullShape> {
    let e = half_extent;
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
    Arc::new(HullShape::new(vertices, faces).expect("box is a valid hull"))
}

fn main() {
    env_logger::init();

    let mut world = World::new();
    world
        .add_static_body(
            box_shape(Vec3::splat(1.0)),
            Transform::from_position(Vec3::ZERO),
            1.0,
        )
        .expect("target body is valid");

    let hits = world
        .raycast(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO)
        .expect("raycast should not fail");

    println!("Ray hits: {}", hits.len());
}
