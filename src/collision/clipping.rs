//! Sutherland-Hodgman polygon clipping against a set of planes, grounded on
//! the teacher's `collision::clipping` module and generalized from its
//! rectangle-only helper to clip against arbitrary hull face planes
//! (SPEC_FULL §4.4).

use glam::Vec3;

use crate::config::SAT_EPSILON;

#[derive(Debug, Clone, Copy)]
pub struct Plane {
    pub normal: Vec3,
    pub distance: f32,
}

impl Plane {
    pub fn from_point_normal(point: Vec3, normal: Vec3) -> Self {
        let n = normal.normalize_or_zero();
        Self {
            normal: n,
            distance: n.dot(point),
        }
    }

    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) - self.distance
    }
}

/// Clips `vertices` against each plane in turn using Sutherland-Hodgman,
/// keeping the side with `signed_distance <= epsilon`.
pub fn clip_polygon(vertices: &[Vec3], planes: &[Plane]) -> Vec<Vec3> {
    let mut output = vertices.to_vec();
    for plane in planes {
        output = clip_against_plane(&output, *plane);
        if output.is_empty() {
            break;
        }
    }
    output
}

fn clip_against_plane(vertices: &[Vec3], plane: Plane) -> Vec<Vec3> {
    if vertices.is_empty() {
        return Vec::new();
    }

    let mut clipped = Vec::new();
    for i in 0..vertices.len() {
        let current = vertices[i];
        let next = vertices[(i + 1) % vertices.len()];

        let current_dist = plane.signed_distance(current);
        let next_dist = plane.signed_distance(next);

        let current_inside = current_dist <= SAT_EPSILON;
        let next_inside = next_dist <= SAT_EPSILON;

        if current_inside && next_inside {
            clipped.push(next);
        } else if current_inside && !next_inside {
            if let Some(intersection) = line_plane_intersection(current, next, current_dist, next_dist) {
                clipped.push(intersection);
            }
        } else if !current_inside && next_inside {
            if let Some(intersection) = line_plane_intersection(current, next, current_dist, next_dist) {
                clipped.push(intersection);
            }
            clipped.push(next);
        }
    }

    clipped
}

/// Parametric (IVT) edge-plane intersection: `t = start_dist / (start_dist -
/// end_dist)`, equivalent to SPEC_FULL §4.4's `t = (w - vkd) / (vjd - vkd)`
/// once plane offset `w` has already been folded into the signed distances.
fn line_plane_intersection(start: Vec3, end: Vec3, start_dist: f32, end_dist: f32) -> Option<Vec3> {
    let denom = start_dist - end_dist;
    if denom.abs() <= SAT_EPSILON {
        return None;
    }
    let t = start_dist / denom;
    Some(start + (end - start) * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clipping_square_against_half_space_yields_half() {
        let square = vec![
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(-1.0, 1.0, 0.0),
        ];
        let plane = Plane::from_point_normal(Vec3::ZERO, Vec3::X);
        let clipped = clip_polygon(&square, &[plane]);
        assert!(clipped.iter().all(|p| p.x <= SAT_EPSILON + 1e-5));
        assert!(clipped.len() >= 3);
    }

    #[test]
    fn clipping_against_plane_with_no_overlap_yields_empty() {
        let square = vec![
            Vec3::new(2.0, -1.0, 0.0),
            Vec3::new(3.0, -1.0, 0.0),
            Vec3::new(3.0, 1.0, 0.0),
            Vec3::new(2.0, 1.0, 0.0),
        ];
        let plane = Plane::from_point_normal(Vec3::ZERO, Vec3::X);
        let clipped = clip_polygon(&square, &[plane]);
        assert!(clipped.is_empty());
    }
}
