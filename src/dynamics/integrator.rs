//! Semi-implicit Euler integration, grounded on the teacher's
//! `dynamics::integrator::Integrator`, trimmed of substeps/parallel since
//! SPEC_FULL §5 is strictly single-threaded and the world drives one
//! integration pass per `step(dt)` call.

use glam::{Quat, Vec3};

use crate::core::body::Body;

/// Applies accumulated force/torque to velocity, then damping.
pub fn integrate_velocity(body: &mut Body, dt: f32, gravity: Vec3, linear_damping: f32, angular_damping: f32) {
    if body.is_static() || !body.is_awake {
        body.force = Vec3::ZERO;
        body.torque = Vec3::ZERO;
        return;
    }

    let linear_acceleration = gravity + body.force * body.inverse_mass;
    body.velocity.linear += linear_acceleration * dt;
    body.velocity.angular += body.inverse_inertia_world() * body.torque * dt;

    body.velocity.linear *= (1.0 - linear_damping * dt).max(0.0);
    body.velocity.angular *= (1.0 - angular_damping * dt).max(0.0);

    body.force = Vec3::ZERO;
    body.torque = Vec3::ZERO;
}

/// Advances transform from velocity: linear Euler step for position, and
/// an axis-angle quaternion delta for rotation.
pub fn integrate_position(body: &mut Body, dt: f32) {
    if body.is_static() || !body.is_awake {
        return;
    }

    let mut transform = body.transform();
    transform.position += body.velocity.linear * dt;

    let omega_mag = body.velocity.angular.length();
    if omega_mag > 1e-6 {
        let axis = body.velocity.angular / omega_mag;
        let angle = omega_mag * dt;
        let delta = Quat::from_axis_angle(axis, angle);
        transform.rotation = (delta * transform.rotation).normalize();
    }

    body.hull.set_transform(transform);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hull::tests::unit_cube_shape;
    use crate::core::types::{Material, Transform};

    #[test]
    fn gravity_accelerates_dynamic_body_downward() {
        let mut body = Body::new_dynamic(unit_cube_shape(), Transform::default(), 1.0, Material::default()).unwrap();
        integrate_velocity(&mut body, 1.0 / 60.0, Vec3::new(0.0, -9.81, 0.0), 0.0, 0.0);
        assert!(body.velocity.linear.y < 0.0);
    }

    #[test]
    fn static_body_never_moves() {
        let mut body = Body::new_static(unit_cube_shape(), Transform::default(), 1.0);
        integrate_velocity(&mut body, 1.0 / 60.0, Vec3::new(0.0, -9.81, 0.0), 0.0, 0.0);
        integrate_position(&mut body, 1.0 / 60.0);
        assert_eq!(body.transform().position, Vec3::ZERO);
    }

    #[test]
    fn position_advances_by_velocity_times_dt() {
        let mut body = Body::new_dynamic(unit_cube_shape(), Transform::default(), 1.0, Material::default()).unwrap();
        body.velocity.linear = Vec3::new(1.0, 0.0, 0.0);
        integrate_position(&mut body, 0.5);
        assert!((body.transform().position.x - 0.5).abs() < 1e-5);
    }
}
