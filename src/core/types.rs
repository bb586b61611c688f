use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Position and orientation of a hull or body. Unlike the generic transform
/// this grew from, bodies here carry non-uniform scale at the `Body` level
/// (a single per-axis `size` multiplier on the hull), not here.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }

    /// Maps a local-space point into world space.
    pub fn apply_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }

    /// Maps a local-space direction into world space (no translation).
    pub fn apply_vector(&self, local: Vec3) -> Vec3 {
        self.rotation * local
    }

    pub fn combine(&self, other: &Transform) -> Transform {
        Transform {
            position: self.position + self.rotation * other.position,
            rotation: (self.rotation * other.rotation).normalize(),
        }
    }
}

/// Linear and angular velocity of a rigid body.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Velocity {
    pub linear: Vec3,
    pub angular: Vec3,
}

impl Default for Velocity {
    fn default() -> Self {
        Self {
            linear: Vec3::ZERO,
            angular: Vec3::ZERO,
        }
    }
}

/// Material coefficients affecting contact response: restitution, a single
/// Coulomb friction coefficient, and the Baumgarte stabilization factor β.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    pub density: f32,
    pub restitution: f32,
    pub friction: f32,
    pub baumgarte_beta: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            density: 1.0,
            restitution: 0.1,
            friction: 0.4,
            baumgarte_beta: 0.2,
        }
    }
}

impl Material {
    pub fn rubber() -> Self {
        Self {
            density: 1.4,
            restitution: 0.8,
            friction: 1.1,
            baumgarte_beta: 0.2,
        }
    }

    pub fn steel() -> Self {
        Self {
            density: 7.8,
            restitution: 0.4,
            friction: 0.5,
            baumgarte_beta: 0.2,
        }
    }

    pub fn ice() -> Self {
        Self {
            density: 0.9,
            restitution: 0.05,
            friction: 0.03,
            baumgarte_beta: 0.2,
        }
    }

    /// Combines two materials into the single set of coefficients a contact
    /// between them uses, per SPEC_FULL §4.5: restitution and β multiply,
    /// friction averages.
    pub fn combine_pair(a: &Self, b: &Self) -> MaterialPairProperties {
        MaterialPairProperties {
            friction: 0.5 * (a.friction + b.friction),
            restitution: a.restitution * b.restitution,
            baumgarte_beta: a.baumgarte_beta * b.baumgarte_beta,
        }
    }
}

/// Combined per-contact coefficients produced by [`Material::combine_pair`].
#[derive(Debug, Clone, Copy)]
pub struct MaterialPairProperties {
    pub friction: f32,
    pub restitution: f32,
    pub baumgarte_beta: f32,
}

impl Default for MaterialPairProperties {
    fn default() -> Self {
        Material::combine_pair(&Material::default(), &Material::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_pair_averages_friction_and_multiplies_restitution() {
        let a = Material {
            restitution: 0.5,
            friction: 0.6,
            ..Material::default()
        };
        let b = Material {
            restitution: 0.8,
            friction: 0.2,
            ..Material::default()
        };
        let pair = Material::combine_pair(&a, &b);
        assert!((pair.restitution - 0.4).abs() < 1e-5);
        assert!((pair.friction - 0.4).abs() < 1e-5);
    }

    #[test]
    fn transform_combine_composes_position_and_rotation() {
        let a = Transform::from_position(Vec3::new(1.0, 0.0, 0.0));
        let b = Transform::from_position(Vec3::new(0.0, 2.0, 0.0));
        let c = a.combine(&b);
        assert_eq!(c.position, Vec3::new(1.0, 2.0, 0.0));
    }
}
