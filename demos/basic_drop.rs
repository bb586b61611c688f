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
            box_shape(Vec3::new(25.0, 0.5, 25.0)),
            Transform::from_position(Vec3::new(0.0, -0.5, 0.0)),
            1.0,
        )
        .expect("floor is a valid body");

    let body = world
        .add_dynamic_body(
            box_shape(Vec3::splat(0.5)),
            Transform::from_position(Vec3::new(0.0, 2.0, 0.0)),
            1.0,
            Material::default(),
        )
        .expect("dynamic box is a valid body");

    for _ in 0..120 {
        world.step(1.0 / 60.0, 8).expect("step should not fail");
    }

    let position = world.get_body(body).unwrap().transform().position;
    println!("Box position after 2 seconds: {position:?}");
}
