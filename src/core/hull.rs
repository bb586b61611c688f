use std::sync::Arc;

use glam::Vec3;

use crate::collision::aabb::Aabb;
use crate::core::types::Transform;
use crate::error::{EngineError, Result};

/// A planar, CCW-wound face of a [`HullShape`]: an index loop into the
/// shape's vertices plus its local outward plane normal.
#[derive(Debug, Clone)]
pub struct Face {
    pub indices: Vec<u32>,
    pub local_normal: Vec3,
}

/// An undirected edge shared by exactly two faces.
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    pub v0: u32,
    pub v1: u32,
    pub face0: u32,
    pub face1: u32,
}

/// Immutable convex polyhedron descriptor, shared by `Arc` across every body
/// that uses the same shape. Vertices/faces/edges never change after
/// construction; only [`Hull`] (transform + size applied) carries a cache.
#[derive(Debug)]
pub struct HullShape {
    pub local_vertices: Vec<Vec3>,
    pub faces: Vec<Face>,
    pub edges: Vec<Edge>,
}

impl HullShape {
    /// Builds a hull from vertices and CCW-wound faces (each a loop of
    /// vertex indices; the plane is computed from the first three
    /// non-collinear points of the loop). Edge adjacency is derived.
    ///
    /// Fails with [`EngineError::InvalidShape`] if a face is degenerate
    /// (fewer than 3 indices, zero-area normal) or if any edge does not
    /// border exactly two faces.
    pub fn new(vertices: Vec<Vec3>, face_loops: Vec<Vec<u32>>) -> Result<Self> {
        if vertices.len() < 4 {
            return Err(EngineError::InvalidShape(
                "hull must have at least 4 vertices".into(),
            ));
        }

        let mut faces = Vec::with_capacity(face_loops.len());
        for loop_indices in &face_loops {
            if loop_indices.len() < 3 {
                return Err(EngineError::InvalidShape(
                    "face must have at least 3 vertices".into(),
                ));
            }
            let normal = face_normal(&vertices, loop_indices)?;
            faces.push(Face {
                indices: loop_indices.clone(),
                local_normal: normal,
            });
        }

        let edges = derive_edges(&faces)?;

        Ok(Self {
            local_vertices: vertices,
            faces,
            edges,
        })
    }

    /// Builds the local-space AABB once; callers transform it per-instance.
    pub fn local_aabb(&self) -> Aabb {
        Aabb::from_points(self.local_vertices.iter().copied())
    }
}

fn face_normal(vertices: &[Vec3], loop_indices: &[u32]) -> Result<Vec3> {
    let p0 = vertices[loop_indices[0] as usize];
    for i in 1..loop_indices.len() - 1 {
        let p1 = vertices[loop_indices[i] as usize];
        let p2 = vertices[loop_indices[i + 1] as usize];
        let n = (p1 - p0).cross(p2 - p0);
        if n.length_squared() > 1e-10 {
            return Ok(n.normalize());
        }
    }
    Err(EngineError::InvalidShape(
        "face vertices are collinear or degenerate".into(),
    ))
}

fn derive_edges(faces: &[Face]) -> Result<Vec<Edge>> {
    use std::collections::HashMap;

    // Undirected vertex pair -> (face index, winding direction) seen so far.
    let mut seen: HashMap<(u32, u32), u32> = HashMap::new();
    let mut edges = Vec::new();

    for (face_idx, face) in faces.iter().enumerate() {
        let n = face.indices.len();
        for i in 0..n {
            let a = face.indices[i];
            let b = face.indices[(i + 1) % n];
            let key = if a < b { (a, b) } else { (b, a) };
            if let Some(&other_face) = seen.get(&key) {
                edges.push(Edge {
                    v0: key.0,
                    v1: key.1,
                    face0: other_face,
                    face1: face_idx as u32,
                });
                seen.remove(&key);
            } else {
                seen.insert(key, face_idx as u32);
            }
        }
    }

    if !seen.is_empty() {
        return Err(EngineError::InvalidShape(
            "hull is non-manifold: some edges do not border exactly two faces".into(),
        ));
    }

    Ok(edges)
}

/// A world-space instance of a [`HullShape`]: transform and uniform `size`
/// applied, with vertices/normals/AABB cached until [`Hull::set_transform`]
/// is called again.
#[derive(Debug, Clone)]
pub struct Hull {
    pub shape: Arc<HullShape>,
    transform: Transform,
    size: f32,
    world_vertices: Vec<Vec3>,
    world_face_normals: Vec<Vec3>,
    aabb: Aabb,
}

impl Hull {
    pub fn new(shape: Arc<HullShape>, transform: Transform, size: f32) -> Self {
        let mut hull = Self {
            shape,
            transform,
            size,
            world_vertices: Vec::new(),
            world_face_normals: Vec::new(),
            aabb: Aabb::EMPTY,
        };
        hull.recompute_cache();
        hull
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
        self.recompute_cache();
    }

    fn recompute_cache(&mut self) {
        self.world_vertices.clear();
        self.world_vertices.extend(
            self.shape
                .local_vertices
                .iter()
                .map(|&v| self.transform.apply_point(v * self.size)),
        );
        self.world_face_normals.clear();
        self.world_face_normals.extend(
            self.shape
                .faces
                .iter()
                .map(|f| self.transform.apply_vector(f.local_normal).normalize()),
        );
        self.aabb = Aabb::from_points(self.world_vertices.iter().copied());
    }

    pub fn world_vertices(&self) -> &[Vec3] {
        &self.world_vertices
    }

    pub fn world_face_normal(&self, face: usize) -> Vec3 {
        self.world_face_normals[face]
    }

    pub fn aabb(&self) -> Aabb {
        self.aabb
    }

    pub fn face_count(&self) -> usize {
        self.shape.faces.len()
    }

    pub fn edge_count(&self) -> usize {
        self.shape.edges.len()
    }

    /// For direction `d`, returns the world vertex maximizing `dot(v, d)`.
    pub fn support(&self, d: Vec3) -> Vec3 {
        let mut best = self.world_vertices[0];
        let mut best_dot = best.dot(d);
        for &v in &self.world_vertices[1..] {
            let dot = v.dot(d);
            if dot > best_dot {
                best_dot = dot;
                best = v;
            }
        }
        best
    }

    fn face_offset(&self, face: usize) -> f32 {
        let n = self.world_face_normals[face];
        let p = self.world_vertices[self.shape.faces[face].indices[0] as usize];
        n.dot(p)
    }

    /// Returns the index of the most-separating face of `self` against
    /// `other` and that axis's signed separation (positive => separated).
    pub fn query_face_directions(&self, other: &Hull) -> (usize, f32) {
        let mut best_face = 0;
        let mut best_dist = f32::NEG_INFINITY;
        for face in 0..self.shape.faces.len() {
            let n = self.world_face_normals[face];
            let w = self.face_offset(face);
            let support = other.support(-n);
            let dist = n.dot(support) - w;
            if dist > best_dist {
                best_dist = dist;
                best_face = face;
            }
        }
        (best_face, best_dist)
    }

    /// Returns the two world endpoints of edge `i`.
    pub fn query_edge(&self, i: usize) -> (Vec3, Vec3) {
        let edge = &self.shape.edges[i];
        (
            self.world_vertices[edge.v0 as usize],
            self.world_vertices[edge.v1 as usize],
        )
    }

    /// Enumerates edge pairs between `self` and `other`, prunes with the
    /// Gauss-map adjacency test, and returns the maximum separating axis
    /// found along with the edge indices that produced it.
    pub fn query_edge_directions(&self, other: &Hull) -> (Vec3, f32, usize, usize) {
        let mut best_axis = Vec3::Z;
        let mut best_dist = f32::NEG_INFINITY;
        let mut best_a = 0;
        let mut best_b = 0;

        let center_a = self.aabb.center();

        for (ia, edge_a) in self.shape.edges.iter().enumerate() {
            let (a0, a1) = self.query_edge(ia);
            let n_a1 = self.world_face_normals[edge_a.face0 as usize];
            let n_a2 = self.world_face_normals[edge_a.face1 as usize];

            for (ib, edge_b) in other.shape.edges.iter().enumerate() {
                let (b0, b1) = other.query_edge(ib);
                let n_b1 = other.world_face_normals[edge_b.face0 as usize];
                let n_b2 = other.world_face_normals[edge_b.face1 as usize];

                if !gauss_map_overlap(n_a1, n_a2, n_b1, n_b2) {
                    continue;
                }

                let ab = a1 - a0;
                let cd = b1 - b0;
                let mut axis = ab.cross(cd);
                if axis.length_squared() < 1e-10 {
                    continue;
                }
                axis = axis.normalize();

                // Orient the axis to point away from A's center.
                if axis.dot(a0 - center_a) < 0.0 {
                    axis = -axis;
                }

                let dist = axis.dot(b0 - a0);
                if dist > best_dist {
                    best_dist = dist;
                    best_axis = axis;
                    best_a = ia;
                    best_b = ib;
                }
            }
        }

        (best_axis, best_dist, best_a, best_b)
    }
}

/// Gauss-map adjacency test: arcs (n_a1, n_a2) and (n_b1, -n_b1)/(n_b2,
/// -n_b2) on the unit sphere must cross for this edge pair to be able to
/// contribute a separating axis, per SPEC_FULL §4.2.
fn gauss_map_overlap(a1: Vec3, a2: Vec3, b1: Vec3, b2: Vec3) -> bool {
    let cba = b1.cross(b2);
    let a_side = a1.dot(cba) * a2.dot(cba);

    let cab = a1.cross(a2);
    let b_side = (-b1).dot(cab) * (-b2).dot(cab);

    a_side < 0.0 && b_side < 0.0
}
