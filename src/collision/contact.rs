use glam::Vec3;

/// One contact point within a [`Manifold`]: world position, penetration
/// depth along the manifold normal, and the body-relative offsets the
/// solver needs to build Jacobians.
#[derive(Debug, Clone, Copy)]
pub struct ManifoldPoint {
    pub position: Vec3,
    pub depth: f32,
}

/// The result of narrowphase collision between two hulls: a shared normal
/// (pointing from body A to body B) and up to four contact points, per
/// SPEC_FULL §4.4's manifold-reduction rule.
#[derive(Debug, Clone)]
pub struct Manifold {
    pub normal: Vec3,
    pub points: Vec<ManifoldPoint>,
}

impl Manifold {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
