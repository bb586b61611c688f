//! Separating-axis narrowphase: face and edge queries feeding a face-biased
//! axis selection, Sutherland-Hodgman clipping for face contacts, and a
//! closest-point calculation for edge contacts. Grounded on SPEC_FULL §4.4;
//! the teacher has only a 15-axis box-box SAT (`collision::narrowphase::
//! SATAlgorithm::intersect_boxes`), so the face/edge split and manifold
//! reduction here are written directly from the spec.

use std::collections::HashSet;

use glam::Vec3;

use crate::collision::clipping::{clip_polygon, Plane};
use crate::collision::contact::{Manifold, ManifoldPoint};
use crate::config::{MANIFOLD_QUANTIZATION_SCALE, SAT_EPSILON};
use crate::core::hull::Hull;

/// Runs the full SAT pipeline between two hulls. Returns `None` when a
/// separating axis is found (no contact); otherwise a manifold with 1
/// (edge contact) to 4 (face contact) points.
pub fn collide(a: &Hull, b: &Hull) -> Option<Manifold> {
    let (face_a, dist_a) = a.query_face_directions(b);
    if dist_a > SAT_EPSILON {
        return None;
    }
    let (face_b, dist_b) = b.query_face_directions(a);
    if dist_b > SAT_EPSILON {
        return None;
    }
    let (edge_axis, dist_e, edge_a_idx, edge_b_idx) = a.query_edge_directions(b);
    if dist_e > SAT_EPSILON {
        return None;
    }

    // Face bias: prefer a face contact unless the edge separation is
    // strictly greater than both face separations.
    if dist_a >= dist_e || dist_b >= dist_e {
        if dist_a >= dist_b {
            Some(face_contact(a, face_a, b))
        } else {
            Some(face_contact(b, face_b, a)).map(|m| Manifold {
                normal: -m.normal,
                points: m.points,
            })
        }
    } else {
        Some(edge_contact(a, edge_a_idx, b, edge_b_idx, edge_axis))
    }
}

/// Builds a face-contact manifold with `reference` as the reference hull
/// and `reference_face` as its separating face; `incident` supplies the
/// clipped polygon. The returned normal points from `reference` toward
/// `incident`.
fn face_contact(reference: &Hull, reference_face: usize, incident: &Hull) -> Manifold {
    let ref_normal = reference.world_face_normal(reference_face);
    let ref_plane = Plane::from_point_normal(
        reference_face_point(reference, reference_face),
        ref_normal,
    );

    let incident_face = most_anti_parallel_face(incident, ref_normal);
    let incident_polygon = face_world_polygon(incident, incident_face);

    let side_planes = side_planes_for_face(reference, reference_face);
    let clipped = clip_polygon(&incident_polygon, &side_planes);

    let mut points: Vec<ManifoldPoint> = clipped
        .into_iter()
        .filter_map(|p| {
            let depth = -ref_plane.signed_distance(p);
            if depth >= -SAT_EPSILON {
                Some(ManifoldPoint {
                    position: p,
                    depth: depth.max(0.0),
                })
            } else {
                None
            }
        })
        .collect();

    dedup_points(&mut points);
    reduce_to_four(&mut points, ref_normal);

    Manifold {
        normal: ref_normal,
        points,
    }
}

fn reference_face_point(hull: &Hull, face: usize) -> Vec3 {
    face_world_polygon(hull, face)[0]
}

fn face_world_polygon(hull: &Hull, face: usize) -> Vec<Vec3> {
    hull.shape.faces[face]
        .indices
        .iter()
        .map(|&i| hull.world_vertices()[i as usize])
        .collect()
}

fn most_anti_parallel_face(hull: &Hull, direction: Vec3) -> usize {
    let mut best_face = 0;
    let mut best_dot = f32::INFINITY;
    for face in 0..hull.shape.faces.len() {
        let dot = hull.world_face_normal(face).dot(direction);
        if dot < best_dot {
            best_dot = dot;
            best_face = face;
        }
    }
    best_face
}

/// One inward-facing side plane per edge of the reference face, used to
/// clip the incident polygon down to the reference face's silhouette.
fn side_planes_for_face(hull: &Hull, face: usize) -> Vec<Plane> {
    let indices = &hull.shape.faces[face].indices;
    let n = indices.len();
    let face_normal = hull.world_face_normal(face);
    let verts = hull.world_vertices();

    (0..n)
        .map(|i| {
            let p0 = verts[indices[i] as usize];
            let p1 = verts[indices[(i + 1) % n] as usize];
            let edge_dir = (p1 - p0).normalize_or(Vec3::X);
            // Points inward (toward the face interior) so clip keeps the
            // half-space containing the face itself.
            let side_normal = edge_dir.cross(face_normal);
            Plane::from_point_normal(p0, side_normal)
        })
        .collect()
}

fn edge_contact(a: &Hull, edge_a: usize, b: &Hull, edge_b: usize, axis: Vec3) -> Manifold {
    let (a0, a1) = a.query_edge(edge_a);
    let (b0, b1) = b.query_edge(edge_b);

    let (pa, pb) = closest_points_on_segments(a0, a1, b0, b1);
    let depth = axis.dot(pb - pa).abs();
    let position = (pa + pb) * 0.5;

    Manifold {
        normal: axis,
        points: vec![ManifoldPoint { position, depth }],
    }
}

/// Closest points between skew segments `(a,b)` and `(c,d)` via the
/// standard pair of cross products (SPEC_FULL §4.4).
fn closest_points_on_segments(a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> (Vec3, Vec3) {
    let ab = b - a;
    let cd = d - c;
    let ab_cross_cd = ab.cross(cd);
    let denom = ab_cross_cd.length_squared();

    if denom < 1e-10 {
        // parallel segments: fall back to projecting c onto ab
        let t = ((c - a).dot(ab) / ab.length_squared().max(1e-10)).clamp(0.0, 1.0);
        let pa = a + ab * t;
        return (pa, c);
    }

    let ac = a - c;
    let t1 = (-(ac.cross(cd)).dot(ab_cross_cd) / denom).clamp(0.0, 1.0);
    let t2 = ((ac.cross(ab)).dot(cd.cross(ab)) / denom).clamp(0.0, 1.0);

    (a + ab * t1, c + cd * t2)
}

/// Quantizes each point onto an integer lattice and merges points that
/// collapse to the same cell, grounded on the teacher's
/// `core::mesh::MeshBuilder::weld_vertices` quantize-then-hash technique.
fn dedup_points(points: &mut Vec<ManifoldPoint>) {
    let mut seen = HashSet::new();
    points.retain(|p| {
        let key = quantize(p.position);
        seen.insert(key)
    });
}

fn quantize(p: Vec3) -> (i64, i64, i64) {
    (
        (p.x as f64 * MANIFOLD_QUANTIZATION_SCALE as f64).round() as i64,
        (p.y as f64 * MANIFOLD_QUANTIZATION_SCALE as f64).round() as i64,
        (p.z as f64 * MANIFOLD_QUANTIZATION_SCALE as f64).round() as i64,
    )
}

/// Reduces an arbitrary-size point set to at most 4, per SPEC_FULL §4.4:
/// farthest pair, then max- and min-signed-area thirds.
fn reduce_to_four(points: &mut Vec<ManifoldPoint>, normal: Vec3) {
    if points.len() <= 4 {
        return;
    }

    let a_idx = points.len() - 1;
    let a = points[a_idx].position;

    let b_idx = points
        .iter()
        .enumerate()
        .max_by(|(_, p), (_, q)| {
            (p.position - a)
                .length_squared()
                .total_cmp(&(q.position - a).length_squared())
        })
        .map(|(i, _)| i)
        .unwrap();
    let b = points[b_idx].position;

    let signed_area = |p: Vec3| (b - a).cross(p - a).dot(normal);

    let c_idx = points
        .iter()
        .enumerate()
        .max_by(|(_, p), (_, q)| signed_area(p.position).total_cmp(&signed_area(q.position)))
        .map(|(i, _)| i)
        .unwrap();

    let d_idx = points
        .iter()
        .enumerate()
        .min_by(|(_, p), (_, q)| signed_area(p.position).total_cmp(&signed_area(q.position)))
        .map(|(i, _)| i)
        .unwrap();

    let mut keep: Vec<usize> = vec![a_idx, b_idx, c_idx, d_idx];
    keep.sort_unstable();
    keep.dedup();

    *points = keep.into_iter().map(|i| points[i]).collect();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hull::tests::unit_cube_shape;
    use crate::core::types::Transform;

    fn cube_at(pos: Vec3) -> Hull {
        Hull::new(unit_cube_shape(), Transform::from_position(pos), 1.0)
    }

    #[test]
    fn stacked_cubes_produce_face_manifold_with_up_to_four_points() {
        let bottom = cube_at(Vec3::ZERO);
        let top = cube_at(Vec3::new(0.0, 0.99, 0.0));
        let manifold = collide(&bottom, &top).expect("expected contact");
        assert!(manifold.points.len() <= 4);
        assert!(!manifold.points.is_empty());
        assert!(manifold.normal.y.abs() > 0.9);
    }

    #[test]
    fn separated_cubes_produce_no_manifold() {
        let a = cube_at(Vec3::ZERO);
        let b = cube_at(Vec3::new(3.0, 0.0, 0.0));
        assert!(collide(&a, &b).is_none());
    }

    #[test]
    fn edge_edge_case_on_rotated_cubes_reports_single_point() {
        let a = cube_at(Vec3::ZERO);
        let b = Hull::new(
            unit_cube_shape(),
            crate::core::types::Transform::from_position_rotation(
                Vec3::new(1.01, 1.01, 0.0),
                glam::Quat::from_rotation_z(std::f32::consts::FRAC_PI_4),
            ),
            1.0,
        );
        if let Some(manifold) = collide(&a, &b) {
            assert!(manifold.points.len() <= 4);
        }
    }
}
