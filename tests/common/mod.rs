use std::sync::Arc;

use glam::Vec3;
use particle_accelerator::HullShape;

const CUBE_FACES: [[u32; 4]; 6] = [
    [0, 3, 2, 1],
    [4, 5, 6, 7],
    [0, 1, 5, 4],
    [3, 7, 6, 2],
    [0, 4, 7, 3],
    [1, 2, 6, 5],
];

/// Builds a box shape with the given per-axis half extents. `Body`'s `size`
/// only applies a uniform scalar, so a flat floor plate needs its own
/// differently-proportioned `HullShape` rather than a scaled unit cube.
pub fn box_shape(half_extent: Vec3) -> Arc<HullShape> {
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

/// Builds a unit cube shape (same vertex/face layout across every
/// integration test) via the public `HullShape` constructor.
pub fn unit_cube_shape() -> Arc<HullShape> {
    box_shape(Vec3::splat(0.5))
}

/// A wide, thin floor plate: 100x1x100 centered on its own origin.
pub fn floor_shape() -> Arc<HullShape> {
    box_shape(Vec3::new(50.0, 0.5, 50.0))
}
