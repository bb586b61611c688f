use std::sync::Arc;

use glam::{Mat3, Vec3};

use crate::collision::aabb::Aabb;
use crate::config::{SLEEP_ANGULAR_THRESHOLD, SLEEP_LINEAR_THRESHOLD, SLEEP_TIME_THRESHOLD};
use crate::core::hull::{Hull, HullShape};
use crate::core::types::{Material, Transform, Velocity};
use crate::error::Result;
use crate::utils::math::try_inverse;

/// Static bodies have infinite mass and never move; dynamic bodies
/// integrate forces and can sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Static,
    Dynamic,
}

/// A rigid body: a hull instance plus the kinematic and inertial state the
/// solver and integrator need. Mirrors the teacher's `RigidBody`, narrowed
/// to hull-only shapes and a single combined friction/restitution/β
/// material per SPEC_FULL §3.
#[derive(Debug, Clone)]
pub struct Body {
    pub kind: BodyKind,
    pub hull: Hull,
    pub velocity: Velocity,
    pub force: Vec3,
    pub torque: Vec3,
    pub mass: f32,
    pub inverse_mass: f32,
    pub inertia_local: Mat3,
    pub inverse_inertia_local: Mat3,
    pub material: Material,
    pub is_awake: bool,
    pub is_enabled: bool,
    sleep_timer: f32,
}

impl Body {
    /// Builds a static body: zero mass/inertia, ignored by integration.
    pub fn new_static(shape: Arc<HullShape>, transform: Transform, size: f32) -> Self {
        Self {
            kind: BodyKind::Static,
            hull: Hull::new(shape, transform, size),
            velocity: Velocity::default(),
            force: Vec3::ZERO,
            torque: Vec3::ZERO,
            mass: f32::INFINITY,
            inverse_mass: 0.0,
            inertia_local: Mat3::ZERO,
            inverse_inertia_local: Mat3::ZERO,
            material: Material::default(),
            is_awake: true,
            is_enabled: true,
            sleep_timer: 0.0,
        }
    }

    /// Builds a dynamic body with mass and inertia derived from the hull's
    /// local AABB as a box approximation (SPEC_FULL §3), scaled by density.
    pub fn new_dynamic(
        shape: Arc<HullShape>,
        transform: Transform,
        size: f32,
        material: Material,
    ) -> Result<Self> {
        let local_aabb = shape.local_aabb();
        let extent = local_aabb.extent() * size;
        let volume = (extent.x * extent.y * extent.z).max(1e-6);
        let mass = (volume * material.density).max(1e-6);
        let inertia_local = Mat3::from_diagonal(
            (mass / 12.0)
                * Vec3::new(
                    extent.y * extent.y + extent.z * extent.z,
                    extent.x * extent.x + extent.z * extent.z,
                    extent.x * extent.x + extent.y * extent.y,
                ),
        );
        let inverse_inertia_local = try_inverse(inertia_local)?;

        Ok(Self {
            kind: BodyKind::Dynamic,
            hull: Hull::new(shape, transform, size),
            velocity: Velocity::default(),
            force: Vec3::ZERO,
            torque: Vec3::ZERO,
            mass,
            inverse_mass: 1.0 / mass,
            inertia_local,
            inverse_inertia_local,
            material,
            is_awake: true,
            is_enabled: true,
            sleep_timer: 0.0,
        })
    }

    pub fn is_static(&self) -> bool {
        self.kind == BodyKind::Static
    }

    pub fn transform(&self) -> Transform {
        self.hull.transform()
    }

    pub fn aabb(&self) -> Aabb {
        self.hull.aabb()
    }

    /// World-space inverse inertia tensor: `R * I^-1_local * R^T`.
    pub fn inverse_inertia_world(&self) -> Mat3 {
        let r = Mat3::from_quat(self.hull.transform().rotation);
        r * self.inverse_inertia_local * r.transpose()
    }

    pub fn apply_force(&mut self, force: Vec3) {
        if self.is_static() {
            return;
        }
        self.force += force;
        self.wake();
    }

    pub fn apply_impulse(&mut self, impulse: Vec3, world_point: Vec3) {
        if self.is_static() {
            return;
        }
        self.velocity.linear += impulse * self.inverse_mass;
        let r = world_point - self.hull.transform().position;
        self.velocity.angular += self.inverse_inertia_world() * r.cross(impulse);
        self.wake();
    }

    pub fn wake(&mut self) {
        self.is_awake = true;
        self.sleep_timer = 0.0;
    }

    /// Advances the idle timer and puts the body to sleep once it has
    /// stayed below the velocity thresholds for long enough. This is the
    /// single-body idle-timer policy SPEC_FULL §3 calls the ambient minimum
    /// for `is_awake` to mean anything; cross-body islanding is excluded.
    pub fn update_sleep_state(&mut self, dt: f32) {
        if self.is_static() || !self.is_awake {
            return;
        }
        let slow = self.velocity.linear.length_squared()
            < SLEEP_LINEAR_THRESHOLD * SLEEP_LINEAR_THRESHOLD
            && self.velocity.angular.length_squared()
                < SLEEP_ANGULAR_THRESHOLD * SLEEP_ANGULAR_THRESHOLD;
        if slow {
            self.sleep_timer += dt;
            if self.sleep_timer >= SLEEP_TIME_THRESHOLD {
                self.is_awake = false;
                self.velocity = Velocity::default();
            }
        } else {
            self.sleep_timer = 0.0;
        }
    }
}

/// A part contributing to a composite rigid body: its own mass, local
/// center, and local inertia about that center.
pub struct MassPart {
    pub mass: f32,
    pub center: Vec3,
    pub inertia: Mat3,
}

/// Composes several parts into one aggregate mass, centroid, and inertia
/// via the parallel-axis theorem (SPEC_FULL §3): `I_sys = sum(I_part + m *
/// (|r|^2 * Identity - r (x) r))` where `r = part.center - centroid`.
pub fn composite_mass_properties(parts: &[MassPart]) -> (f32, Vec3, Mat3) {
    let mass: f32 = parts.iter().map(|p| p.mass).sum();
    if mass <= 0.0 {
        return (0.0, Vec3::ZERO, Mat3::ZERO);
    }
    let centroid = parts.iter().map(|p| p.center * p.mass).sum::<Vec3>() / mass;

    let mut inertia = Mat3::ZERO;
    for part in parts {
        let r = part.center - centroid;
        let outer = Mat3::from_cols(r.x * r, r.y * r, r.z * r);
        let parallel_axis = Mat3::IDENTITY * r.length_squared() - outer;
        inertia += part.inertia + parallel_axis * part.mass;
    }

    (mass, centroid, inertia)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hull::tests::unit_cube_shape;

    #[test]
    fn static_body_has_zero_inverse_mass() {
        let body = Body::new_static(unit_cube_shape(), Transform::default(), 1.0);
        assert_eq!(body.inverse_mass, 0.0);
    }

    #[test]
    fn dynamic_body_mass_scales_with_density() {
        let light = Body::new_dynamic(
            unit_cube_shape(),
            Transform::default(),
            1.0,
            Material {
                density: 1.0,
                ..Material::default()
            },
        )
        .unwrap();
        let heavy = Body::new_dynamic(
            unit_cube_shape(),
            Transform::default(),
            1.0,
            Material {
                density: 2.0,
                ..Material::default()
            },
        )
        .unwrap();
        assert!(heavy.mass > light.mass);
    }

    #[test]
    fn composite_properties_of_two_equal_offset_points() {
        let parts = vec![
            MassPart {
                mass: 1.0,
                center: Vec3::new(-1.0, 0.0, 0.0),
                inertia: Mat3::ZERO,
            },
            MassPart {
                mass: 1.0,
                center: Vec3::new(1.0, 0.0, 0.0),
                inertia: Mat3::ZERO,
            },
        ];
        let (mass, centroid, inertia) = composite_mass_properties(&parts);
        assert_eq!(mass, 2.0);
        assert_eq!(centroid, Vec3::ZERO);
        assert!(inertia.z_axis.z > 0.0);
    }

    #[test]
    fn sleeping_body_zeroes_velocity_after_idle_threshold() {
        let mut body = Body::new_dynamic(
            unit_cube_shape(),
            Transform::default(),
            1.0,
            Material::default(),
        )
        .unwrap();
        body.velocity.linear = Vec3::new(0.001, 0.0, 0.0);
        for _ in 0..100 {
            body.update_sleep_state(1.0 / 60.0);
        }
        assert!(!body.is_awake);
        assert_eq!(body.velocity.linear, Vec3::ZERO);
    }
}
