mod common;

use glam::Vec3;
use particle_accelerator::{Transform, World};

/// A downward trace from (0,10,0) should hit a floor body sitting at y=0.
#[test]
fn downward_trace_hits_floor_body() {
    let shape = common::floor_shape();
    let mut world = World::new();
    let floor = world
        .add_static_body(shape, Transform::from_position(Vec3::new(0.0, -0.5, 0.0)), 1.0)
        .unwrap();

    let hits = world
        .raycast(Vec3::new(0.0, 10.0, 0.0), Vec3::new(0.0, -20.0, 0.0), Vec3::ZERO)
        .unwrap();

    assert!(hits.contains(&floor));
}

#[test]
fn trace_pointed_away_from_everything_hits_nothing() {
    let shape = common::floor_shape();
    let mut world = World::new();
    world
        .add_static_body(shape, Transform::from_position(Vec3::new(0.0, -0.5, 0.0)), 1.0)
        .unwrap();

    let hits = world
        .raycast(Vec3::new(0.0, 10.0, 0.0), Vec3::new(0.0, 20.0, 0.0), Vec3::ZERO)
        .unwrap();

    assert!(hits.is_empty());
}
