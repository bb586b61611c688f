use glam::Vec3;

use crate::config::BAUMGARTE_K;

/// Which constraint direction a [`Jacobian`] enforces. SPEC_FULL §9 leaves
/// the style open; a plain enum compared with `==`/`matches!` reads clearer
/// here than a bitflag checked against one constant, since a Jacobian is
/// never more than one kind at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JacobianKind {
    Normal,
    Tangent,
    Bitangent,
}

/// A single constraint row: linear/angular coefficients for bodies A and B,
/// the effective mass, positional/restitution bias, and accumulated
/// impulse carried across solver iterations within one step.
#[derive(Debug, Clone, Copy)]
pub struct Jacobian {
    pub kind: JacobianKind,
    pub lin_a: Vec3,
    pub ang_a: Vec3,
    pub lin_b: Vec3,
    pub ang_b: Vec3,
    pub effective_mass: f32,
    pub bias: f32,
    pub accumulated_impulse: f32,
}

/// Inputs shared by every Jacobian built for one contact point.
pub struct JacobianBuildInput {
    pub r_a: Vec3,
    pub r_b: Vec3,
    pub inv_mass_a: f32,
    pub inv_mass_b: f32,
    pub inv_inertia_a: glam::Mat3,
    pub inv_inertia_b: glam::Mat3,
}

impl Jacobian {
    /// Builds the normal Jacobian for a contact, with a Baumgarte +
    /// restitution bias (SPEC_FULL §4.5):
    /// `bias = e * dot(vRel, n) - (k/dt) * beta * depth`.
    #[allow(clippy::too_many_arguments)]
    pub fn build_normal(
        input: &JacobianBuildInput,
        normal: Vec3,
        v_rel: Vec3,
        restitution: f32,
        beta: f32,
        depth: f32,
        dt: f32,
    ) -> Self {
        let mut j = Self::build(input, normal, JacobianKind::Normal);
        let closing_speed = v_rel.dot(normal);
        let k_over_dt = if dt > 1e-8 { BAUMGARTE_K / dt } else { 0.0 };
        j.bias = restitution * closing_speed - k_over_dt * beta * depth.max(0.0);
        j
    }

    pub fn build_friction(input: &JacobianBuildInput, tangent: Vec3) -> Self {
        Self::build(input, tangent, JacobianKind::Tangent)
    }

    fn build(input: &JacobianBuildInput, u: Vec3, kind: JacobianKind) -> Self {
        let lin_a = -u;
        let ang_a = -input.r_a.cross(u);
        let lin_b = u;
        let ang_b = input.r_b.cross(u);

        let k = input.inv_mass_a
            + input.inv_mass_b
            + ang_a.dot(input.inv_inertia_a * ang_a)
            + ang_b.dot(input.inv_inertia_b * ang_b);

        let effective_mass = if k.abs() > 1e-9 { 1.0 / k } else { 0.0 };

        Self {
            kind,
            lin_a,
            ang_a,
            lin_b,
            ang_b,
            effective_mass,
            bias: 0.0,
            accumulated_impulse: 0.0,
        }
    }

    /// `J * v` for the given body velocities.
    pub fn jv(&self, v_a: Vec3, w_a: Vec3, v_b: Vec3, w_b: Vec3) -> f32 {
        self.lin_a.dot(v_a) + self.ang_a.dot(w_a) + self.lin_b.dot(v_b) + self.ang_b.dot(w_b)
    }
}

/// Builds the orthonormal friction basis (tangent, bitangent) from a
/// contact normal, per SPEC_FULL §4.5: world X/Z when the normal is nearly
/// vertical, otherwise a basis derived from the normal's components.
pub fn friction_basis(normal: Vec3) -> (Vec3, Vec3) {
    if normal.y.abs() > 0.99 {
        (Vec3::X, Vec3::Z)
    } else {
        let tangent = Vec3::new(normal.z, 0.0, -normal.x).normalize();
        let bitangent = tangent.cross(normal).normalize();
        (tangent, bitangent)
    }
}
