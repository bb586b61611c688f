//! Sequential-impulse constraint solver: builds a normal + two friction
//! Jacobians per manifold point, then iterates accumulated-impulse-clamped
//! updates over every contact (SPEC_FULL §4.5). Grounded on the shape of the
//! teacher's `dynamics::solver::PGSSolver`/`ConstraintSolver::resolve_contact`
//! (sequential impulses, warm-less here since manifold caching is a
//! non-goal), rewritten around Jacobian rows instead of ad hoc velocity math.

use glam::Vec3;

use crate::collision::contact::Manifold;
use crate::core::body::Body;
use crate::dynamics::jacobian::{friction_basis, Jacobian, JacobianBuildInput};
use crate::utils::allocator::{Arena, EntityId};

pub type BodyHandle = EntityId;

/// One resolved contact point ready for the solver: body references, the
/// combined friction coefficient, and its three Jacobians.
pub struct Contact {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    pub friction: f32,
    pub normal: Jacobian,
    pub tangent: Jacobian,
    pub bitangent: Jacobian,
}

/// Builds one [`Contact`] per manifold point between `a` and `b`.
pub fn build_contacts(
    bodies: &Arena<Body>,
    a: BodyHandle,
    b: BodyHandle,
    manifold: &Manifold,
    dt: f32,
) -> Vec<Contact> {
    let Some(body_a) = bodies.get(a) else {
        return Vec::new();
    };
    let Some(body_b) = bodies.get(b) else {
        return Vec::new();
    };

    let pair = crate::core::types::Material::combine_pair(&body_a.material, &body_b.material);
    let (tangent_dir, bitangent_dir) = friction_basis(manifold.normal);

    let pos_a = body_a.transform().position;
    let pos_b = body_b.transform().position;
    let inv_inertia_a = body_a.inverse_inertia_world();
    let inv_inertia_b = body_b.inverse_inertia_world();

    manifold
        .points
        .iter()
        .map(|point| {
            let r_a = point.position - pos_a;
            let r_b = point.position - pos_b;

            let input = JacobianBuildInput {
                r_a,
                r_b,
                inv_mass_a: body_a.inverse_mass,
                inv_mass_b: body_b.inverse_mass,
                inv_inertia_a,
                inv_inertia_b,
            };

            let v_rel = relative_velocity(body_b, r_b, body_a, r_a);

            let normal = Jacobian::build_normal(
                &input,
                manifold.normal,
                v_rel,
                pair.restitution,
                pair.baumgarte_beta,
                point.depth,
                dt,
            );
            let tangent = Jacobian::build_friction(&input, tangent_dir);
            let bitangent = Jacobian::build_friction(&input, bitangent_dir);

            Contact {
                body_a: a,
                body_b: b,
                friction: pair.friction,
                normal,
                tangent,
                bitangent,
            }
        })
        .collect()
}

fn relative_velocity(body_b: &Body, r_b: Vec3, body_a: &Body, r_a: Vec3) -> Vec3 {
    let v_b = body_b.velocity.linear + body_b.velocity.angular.cross(r_b);
    let v_a = body_a.velocity.linear + body_a.velocity.angular.cross(r_a);
    v_b - v_a
}

/// Runs `iterations` sweeps of sequential impulses over every contact:
/// normal first, then the two friction Jacobians clamped to the current
/// Coulomb pyramid (SPEC_FULL §4.5).
pub fn solve(contacts: &mut [Contact], bodies: &mut Arena<Body>, iterations: u32) {
    for _ in 0..iterations {
        for contact in contacts.iter_mut() {
            let Some((body_a, body_b)) = bodies.get2_mut(contact.body_a, contact.body_b) else {
                continue;
            };

            apply_iteration(&mut contact.normal, body_a, body_b, 0.0, f32::INFINITY);

            let max_friction = contact.friction * contact.normal.accumulated_impulse.max(0.0);
            apply_iteration(&mut contact.tangent, body_a, body_b, -max_friction, max_friction);
            apply_iteration(
                &mut contact.bitangent,
                body_a,
                body_b,
                -max_friction,
                max_friction,
            );
        }
    }
}

fn apply_iteration(j: &mut Jacobian, body_a: &mut Body, body_b: &mut Body, lo: f32, hi: f32) {
    let jv = j.jv(
        body_a.velocity.linear,
        body_a.velocity.angular,
        body_b.velocity.linear,
        body_b.velocity.angular,
    );

    let lambda = -(jv + j.bias) * j.effective_mass;
    let prev = j.accumulated_impulse;
    j.accumulated_impulse = (prev + lambda).clamp(lo, hi);
    let applied = j.accumulated_impulse - prev;

    body_a.velocity.linear += j.lin_a * (applied * body_a.inverse_mass);
    body_a.velocity.angular += body_a.inverse_inertia_world() * (j.ang_a * applied);
    body_b.velocity.linear += j.lin_b * (applied * body_b.inverse_mass);
    body_b.velocity.angular += body_b.inverse_inertia_world() * (j.ang_b * applied);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::contact::ManifoldPoint;
    use crate::core::hull::tests::unit_cube_shape;
    use crate::core::types::{Material, Transform};

    fn falling_body(y: f32) -> Body {
        let mut b = Body::new_dynamic(unit_cube_shape(), Transform::from_position(Vec3::new(0.0, y, 0.0)), 1.0, Material::default()).unwrap();
        b.velocity.linear = Vec3::new(0.0, -5.0, 0.0);
        b
    }

    #[test]
    fn normal_impulse_stays_non_negative() {
        let mut bodies: Arena<Body> = Arena::new();
        let a = bodies.insert(Body::new_static(unit_cube_shape(), Transform::default(), 1.0));
        let b = bodies.insert(falling_body(1.0));

        let manifold = Manifold {
            normal: Vec3::Y,
            points: vec![ManifoldPoint {
                position: Vec3::new(0.0, 0.5, 0.0),
                depth: 0.01,
            }],
        };

        let mut contacts = build_contacts(&bodies, a, b, &manifold, 1.0 / 60.0);
        solve(&mut contacts, &mut bodies, 8);

        assert!(contacts[0].normal.accumulated_impulse >= 0.0);
    }

    #[test]
    fn friction_impulse_stays_within_pyramid() {
        let mut bodies: Arena<Body> = Arena::new();
        let a = bodies.insert(Body::new_static(unit_cube_shape(), Transform::default(), 1.0));
        let mut b = falling_body(1.0);
        b.velocity.linear.x = 3.0;
        let b_id = bodies.insert(b);

        let manifold = Manifold {
            normal: Vec3::Y,
            points: vec![ManifoldPoint {
                position: Vec3::new(0.0, 0.5, 0.0),
                depth: 0.01,
            }],
        };

        let mut contacts = build_contacts(&bodies, a, b_id, &manifold, 1.0 / 60.0);
        solve(&mut contacts, &mut bodies, 8);

        let max = contacts[0].friction * contacts[0].normal.accumulated_impulse.max(0.0);
        assert!(contacts[0].tangent.accumulated_impulse.abs() <= max + 1e-4);
    }
}
