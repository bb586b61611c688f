mod common;

use glam::{Quat, Vec3};
use particle_accelerator::collision::sat;
use particle_accelerator::{Hull, Transform};

/// Two unit cubes offset diagonally, one rotated 45 degrees about Z, should
/// report an edge-edge contact with a single point near (0.505, 0.505, 0).
#[test]
fn rotated_cube_corner_reports_single_edge_contact() {
    let shape = common::unit_cube_shape();
    let a = Hull::new(shape.clone(), Transform::default(), 1.0);
    let b = Hull::new(
        shape,
        Transform::from_position_rotation(Vec3::new(1.01, 1.01, 0.0), Quat::from_rotation_z(std::f32::consts::FRAC_PI_4)),
        1.0,
    );

    let manifold = sat::collide(&a, &b).expect("rotated corners should still report contact");
    assert_eq!(manifold.points.len(), 1);

    let expected = Vec3::new(0.505, 0.505, 0.0);
    let distance = (manifold.points[0].position - expected).length();
    assert!(
        distance < 0.05,
        "contact point {:?} too far from expected {expected:?}",
        manifold.points[0].position
    );
}
