//! Small math helpers layered on top of `glam`, covering the one place the
//! engine needs a checked operation `glam` itself leaves unchecked.

use glam::Mat3;

use crate::config::SINGULAR_INERTIA_THRESHOLD;
use crate::error::{EngineError, Result};

/// Inverts `m`, failing instead of returning a garbage matrix when the
/// determinant magnitude falls below [`SINGULAR_INERTIA_THRESHOLD`].
///
/// `glam::Mat3::inverse` has no failure mode; near-singular input silently
/// produces `NaN`/`inf` entries that only surface much later as exploding
/// velocities. Inertia tensors built from degenerate (near-planar or
/// near-zero-volume) hulls are exactly the inputs this must catch.
pub fn try_inverse(m: Mat3) -> Result<Mat3> {
    let det = m.determinant();
    if det.abs() < SINGULAR_INERTIA_THRESHOLD {
        return Err(EngineError::SingularInertia {
            det,
            threshold: SINGULAR_INERTIA_THRESHOLD,
        });
    }
    Ok(m.inverse())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn inverts_well_conditioned_matrix() {
        let m = Mat3::from_diagonal(glam::Vec3::new(2.0, 4.0, 8.0));
        let inv = try_inverse(m).unwrap();
        let identity = m * inv;
        assert_relative_eq!(identity, Mat3::IDENTITY, epsilon = 1e-5);
    }

    #[test]
    fn rejects_singular_matrix() {
        let m = Mat3::from_diagonal(glam::Vec3::new(1.0, 0.0, 1.0));
        assert!(matches!(
            try_inverse(m),
            Err(EngineError::SingularInertia { .. })
        ));
    }
}
