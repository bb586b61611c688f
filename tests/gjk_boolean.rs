mod common;

use glam::Vec3;
use particle_accelerator::collision::gjk;
use particle_accelerator::{Hull, Transform};

fn cube_at(x: f32) -> Hull {
    Hull::new(common::unit_cube_shape(), Transform::from_position(Vec3::new(x, 0.0, 0.0)), 1.0)
}

#[test]
fn overlapping_unit_cubes_report_collision() {
    let a = cube_at(0.0);
    let b = cube_at(0.9);
    assert!(gjk::is_colliding(&a, &b));
}

#[test]
fn unit_cubes_shifted_apart_report_no_collision() {
    let a = cube_at(0.0);
    let b = cube_at(1.1);
    assert!(!gjk::is_colliding(&a, &b));
}
