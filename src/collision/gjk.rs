//! GJK over hull pairs: a boolean overlap test and a closest-simplex
//! bootstrap (no EPA — the engine never needs penetration depth from GJK
//! itself; SAT produces depth for the manifold pipeline). Follows Casey
//! Muratori's "shortcut" simplex-reduction method, grounded on the simplex
//! case structure of the teacher's `collision::narrowphase::GJKAlgorithm`
//! with the EPA polytope stripped out.

use glam::Vec3;

use crate::config::GJK_MAX_ITERATIONS;
use crate::core::hull::Hull;

#[derive(Clone, Copy)]
struct SupportPoint {
    point: Vec3,
}

fn minkowski_support(a: &Hull, b: &Hull, d: Vec3) -> SupportPoint {
    let point = a.support(d) - b.support(-d);
    SupportPoint { point }
}

/// Returns true iff the Minkowski difference of `a` and `b` contains the
/// origin, i.e. the two hulls overlap (including touching within
/// `SAT_EPSILON`-scale tolerance, which GJK here does not special-case: a
/// hull pair resting exactly in contact is treated as colliding, matching
/// the narrowphase's own face/edge epsilon at the SAT stage).
pub fn is_colliding(a: &Hull, b: &Hull) -> bool {
    let mut d = (b.aabb().center() - a.aabb().center()).normalize_or(Vec3::X);
    let mut simplex = vec![minkowski_support(a, b, d)];
    d = -simplex[0].point;

    for _ in 0..GJK_MAX_ITERATIONS {
        if d.length_squared() < 1e-12 {
            return true;
        }
        let new_point = minkowski_support(a, b, d);
        if new_point.point.dot(d) < 0.0 {
            return false;
        }
        simplex.push(new_point);
        if next_simplex(&mut simplex, &mut d) {
            return true;
        }
    }
    // Exhausted iterations without separating or enclosing: treat as
    // touching/colliding since the shortcut method only ever exits early on
    // a definitive separation.
    true
}

/// Runs the same simplex iteration as [`is_colliding`] but never exits early
/// on separation, instead biasing `d` toward the origin every step and
/// returning the final simplex's world points once it stops improving. Used
/// to seed manifold construction from a GJK witness simplex rather than
/// starting SAT's face/edge search cold (SPEC_FULL §4.3 `getClosestSimplex`).
pub fn get_closest_simplex(a: &Hull, b: &Hull, seed: Vec3) -> Vec<Vec3> {
    let mut d = seed.normalize_or(Vec3::X);
    let mut simplex = vec![minkowski_support(a, b, d)];
    d = -simplex[0].point;
    if d.length_squared() < 1e-12 {
        d = Vec3::X;
    }

    for _ in 0..GJK_MAX_ITERATIONS {
        let candidate = minkowski_support(a, b, d);
        if simplex.iter().any(|p| (p.point - candidate.point).length_squared() < 1e-10) {
            break;
        }
        simplex.push(candidate);
        if next_simplex(&mut simplex, &mut d) || d.length_squared() < 1e-12 {
            break;
        }
    }

    simplex.into_iter().map(|p| p.point).collect()
}

/// Reduces `simplex` toward the origin, narrowing to the Voronoi region
/// that can contain it and updating the search direction `d`. Returns true
/// if the simplex (a tetrahedron) encloses the origin.
fn next_simplex(simplex: &mut Vec<SupportPoint>, d: &mut Vec3) -> bool {
    match simplex.len() {
        2 => line_case(simplex, d),
        3 => triangle_case(simplex, d),
        4 => tetrahedron_case(simplex, d),
        _ => false,
    }
}

fn line_case(simplex: &mut Vec<SupportPoint>, d: &mut Vec3) -> bool {
    let a = simplex[1].point;
    let b = simplex[0].point;
    let ab = b - a;
    let ao = -a;
    *d = triple_cross(ab, ao, ab);
    if d.length_squared() < 1e-12 {
        // origin lies on the line; pick any perpendicular direction
        *d = ab.cross(Vec3::X).normalize_or(ab.cross(Vec3::Y));
    }
    false
}

fn triangle_case(simplex: &mut Vec<SupportPoint>, d: &mut Vec3) -> bool {
    let a = simplex[2].point;
    let b = simplex[1].point;
    let c = simplex[0].point;

    let ab = b - a;
    let ac = c - a;
    let ao = -a;
    let abc = ab.cross(ac);

    if abc.cross(ac).dot(ao) > 0.0 {
        if ac.dot(ao) > 0.0 {
            *simplex = vec![SupportPoint { point: c }, SupportPoint { point: a }];
            *d = triple_cross(ac, ao, ac);
        } else {
            *simplex = vec![SupportPoint { point: b }, SupportPoint { point: a }];
            return line_case(simplex, d);
        }
    } else if ab.cross(abc).dot(ao) > 0.0 {
        *simplex = vec![SupportPoint { point: b }, SupportPoint { point: a }];
        return line_case(simplex, d);
    } else if abc.dot(ao) > 0.0 {
        *simplex = vec![
            SupportPoint { point: c },
            SupportPoint { point: b },
            SupportPoint { point: a },
        ];
        *d = abc;
    } else {
        *simplex = vec![
            SupportPoint { point: b },
            SupportPoint { point: c },
            SupportPoint { point: a },
        ];
        *d = -abc;
    }
    false
}

fn tetrahedron_case(simplex: &mut Vec<SupportPoint>, d: &mut Vec3) -> bool {
    let a = simplex[3].point;
    let b = simplex[2].point;
    let c = simplex[1].point;
    let dd = simplex[0].point;

    let ab = b - a;
    let ac = c - a;
    let ad = dd - a;
    let ao = -a;

    let abc = ab.cross(ac);
    let acd = ac.cross(ad);
    let adb = ad.cross(ab);

    if abc.dot(ao) > 0.0 {
        *simplex = vec![
            SupportPoint { point: c },
            SupportPoint { point: b },
            SupportPoint { point: a },
        ];
        return triangle_case(simplex, d);
    }
    if acd.dot(ao) > 0.0 {
        *simplex = vec![
            SupportPoint { point: dd },
            SupportPoint { point: c },
            SupportPoint { point: a },
        ];
        return triangle_case(simplex, d);
    }
    if adb.dot(ao) > 0.0 {
        *simplex = vec![
            SupportPoint { point: b },
            SupportPoint { point: dd },
            SupportPoint { point: a },
        ];
        return triangle_case(simplex, d);
    }
    true
}

fn triple_cross(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    a.cross(b).cross(c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hull::tests::unit_cube_shape;
    use crate::core::types::Transform;

    fn cube_at(x: f32) -> Hull {
        Hull::new(
            unit_cube_shape(),
            Transform::from_position(Vec3::new(x, 0.0, 0.0)),
            1.0,
        )
    }

    #[test]
    fn overlapping_cubes_collide() {
        let a = cube_at(0.0);
        let b = cube_at(0.9);
        assert!(is_colliding(&a, &b));
    }

    #[test]
    fn separated_cubes_do_not_collide() {
        let a = cube_at(0.0);
        let b = cube_at(1.1);
        assert!(!is_colliding(&a, &b));
    }

    #[test]
    fn identical_position_cubes_collide() {
        let a = cube_at(0.0);
        let b = cube_at(0.0);
        assert!(is_colliding(&a, &b));
    }

    #[test]
    fn closest_simplex_for_overlapping_cubes_is_nonempty() {
        let a = cube_at(0.0);
        let b = cube_at(0.9);
        let simplex = get_closest_simplex(&a, &b, Vec3::X);
        assert!(!simplex.is_empty());
        assert!(simplex.len() <= 4);
    }

    #[test]
    fn closest_simplex_for_separated_cubes_stays_bounded() {
        let a = cube_at(0.0);
        let b = cube_at(5.0);
        let simplex = get_closest_simplex(&a, &b, Vec3::X);
        assert!(!simplex.is_empty());
        assert!(simplex.len() <= 4);
    }
}
