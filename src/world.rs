//! World orchestration: owns the body arena and the broadphase BVH, and
//! drives one step's integrate -> refit -> broadphase -> narrowphase ->
//! solve -> integrate pipeline (SPEC_FULL §2). Grounded on the shape of the
//! teacher's `PhysicsWorld::step`, trimmed of CCD/islands/ABA/GPU sync/
//! manifold caching per the explicit non-goals (see DESIGN.md).

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use glam::Vec3;

use crate::collision::aabb::Aabb;
use crate::collision::bvh::{Bvh, NodeHandle};
use crate::collision::{gjk, sat};
use crate::config::{
    BVH_FAT_AABB_PAD, DEFAULT_GRAVITY, DEFAULT_LINEAR_DAMPING, DEFAULT_ANGULAR_DAMPING,
};
use crate::core::body::Body;
use crate::core::hull::HullShape;
use crate::core::types::{Material, Transform};
use crate::dynamics::{integrator, solver};
use crate::error::Result;
use crate::utils::allocator::{Arena, EntityId};
use crate::utils::logging::{warn_if_frame_budget_exceeded, ScopedTimer};

/// Public handle to a body registered with a [`World`].
pub type BodyHandle = EntityId;

/// Caller-supplied hook for debug visualization, following the teacher's
/// "sink, not a global" convention (SPEC_FULL §9) rather than a module-level
/// debug-draw buffer.
pub type DebugSink = Box<dyn FnMut(DebugEvent)>;

/// One visualizable event a step can emit when a sink is installed.
#[derive(Debug, Clone)]
pub enum DebugEvent {
    ContactPoint { position: Vec3, normal: Vec3 },
    BroadphaseAabb { min: Vec3, max: Vec3 },
}

/// A convex-polyhedron rigid body simulation. Owns every body and the
/// broadphase tree; a step is one synchronous, non-suspending pass
/// (SPEC_FULL §5) — there is no background thread and no async boundary.
pub struct World {
    bodies: Arena<Body>,
    bvh: Bvh,
    node_of: std::collections::HashMap<BodyHandle, NodeHandle>,
    gravity: Vec3,
    linear_damping: f32,
    angular_damping: f32,
    debug_sink: Option<DebugSink>,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        Self {
            bodies: Arena::new(),
            bvh: Bvh::new(),
            node_of: std::collections::HashMap::new(),
            gravity: DEFAULT_GRAVITY,
            linear_damping: DEFAULT_LINEAR_DAMPING,
            angular_damping: DEFAULT_ANGULAR_DAMPING,
            debug_sink: None,
        }
    }

    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn set_debug_sink(&mut self, sink: DebugSink) {
        self.debug_sink = Some(sink);
    }

    pub fn add_static_body(
        &mut self,
        shape: Arc<HullShape>,
        transform: Transform,
        size: f32,
    ) -> Result<BodyHandle> {
        let body = Body::new_static(shape, transform, size);
        Ok(self.insert_body(body))
    }

    pub fn add_dynamic_body(
        &mut self,
        shape: Arc<HullShape>,
        transform: Transform,
        size: f32,
        material: Material,
    ) -> Result<BodyHandle> {
        let body = Body::new_dynamic(shape, transform, size, material)?;
        Ok(self.insert_body(body))
    }

    fn insert_body(&mut self, body: Body) -> BodyHandle {
        let aabb = body.aabb();
        let fat = aabb.pad(BVH_FAT_AABB_PAD);
        let id = self.bodies.insert(body);
        let node = self.bvh.insert(id, fat);
        self.node_of.insert(id, node);
        id
    }

    pub fn remove_body(&mut self, id: BodyHandle) {
        if let Some(node) = self.node_of.remove(&id) {
            self.bvh.remove(node);
        }
        self.bodies.remove(id);
    }

    pub fn get_body(&self, id: BodyHandle) -> Option<&Body> {
        self.bodies.get(id)
    }

    pub fn get_body_mut(&mut self, id: BodyHandle) -> Option<&mut Body> {
        self.bodies.get_mut(id)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// BVH-accelerated box overlap query (SPEC_FULL §6 `overlapBox`).
    pub fn overlap_box(&self, min: Vec3, max: Vec3) -> Result<Vec<BodyHandle>> {
        self.bvh.query(min, max)
    }

    /// BVH-accelerated segment trace (SPEC_FULL §6 `raycast`); `dir` is the
    /// full displacement (origin to origin + dir), `size` expands the trace
    /// volume the way a swept query would.
    pub fn raycast(&self, origin: Vec3, dir: Vec3, size: Vec3) -> Result<Vec<BodyHandle>> {
        self.bvh.trace(origin, dir, size)
    }

    /// Runs one simulation step: integrate forces, refit the broadphase,
    /// run narrowphase on candidate pairs, solve contacts, then integrate
    /// positions (SPEC_FULL §2).
    pub fn step(&mut self, dt: f32, solver_iterations: u32) -> Result<()> {
        let _timer = ScopedTimer::new("world.step");
        let start = Instant::now();

        let ids: Vec<BodyHandle> = self.bodies.ids().collect();

        for &id in &ids {
            let body = self.bodies.get_mut(id).unwrap();
            body.update_sleep_state(dt);
            integrator::integrate_velocity(body, dt, self.gravity, self.linear_damping, self.angular_damping);
        }

        self.refit_broadphase(&ids);

        let pairs = self.find_candidate_pairs(&ids)?;

        let mut manifolds = Vec::new();
        for (a, b) in pairs {
            let body_a = self.bodies.get(a).unwrap();
            let body_b = self.bodies.get(b).unwrap();
            if body_a.is_static() && body_b.is_static() {
                continue;
            }
            if !body_a.is_awake && !body_b.is_awake {
                continue;
            }
            if !gjk::is_colliding(&body_a.hull, &body_b.hull) {
                continue;
            }
            if let Some(manifold) = sat::collide(&body_a.hull, &body_b.hull) {
                if let Some(sink) = &mut self.debug_sink {
                    for p in &manifold.points {
                        sink(DebugEvent::ContactPoint {
                            position: p.position,
                            normal: manifold.normal,
                        });
                    }
                }
                manifolds.push((a, b, manifold));
            }
        }

        let mut contacts = Vec::new();
        for (a, b, manifold) in &manifolds {
            contacts.extend(solver::build_contacts(&self.bodies, *a, *b, manifold, dt));
        }

        solver::solve(&mut contacts, &mut self.bodies, solver_iterations);

        for &id in &ids {
            let body = self.bodies.get_mut(id).unwrap();
            integrator::integrate_position(body, dt);
        }

        warn_if_frame_budget_exceeded(start.elapsed(), 1000.0 / 60.0);
        Ok(())
    }

    fn refit_broadphase(&mut self, ids: &[BodyHandle]) {
        for &id in ids {
            let Some(body) = self.bodies.get(id) else {
                continue;
            };
            if body.is_static() || !body.is_awake {
                continue;
            }
            let actual = body.aabb();
            if let Some(&node) = self.node_of.get(&id) {
                let fat = actual.pad(BVH_FAT_AABB_PAD);
                let new_node = self.bvh.update(node, id, actual, fat);
                self.node_of.insert(id, new_node);
            }
        }
    }

    fn find_candidate_pairs(&self, ids: &[BodyHandle]) -> Result<HashSet<(BodyHandle, BodyHandle)>> {
        let mut pairs = HashSet::new();
        for &id in ids {
            let Some(body) = self.bodies.get(id) else {
                continue;
            };
            let aabb: Aabb = body.aabb().pad(BVH_FAT_AABB_PAD);
            let candidates = self.bvh.query(aabb.min, aabb.max)?;
            for other in candidates {
                if other == id {
                    continue;
                }
                let pair = if id.index() < other.index() {
                    (id, other)
                } else {
                    (other, id)
                };
                pairs.insert(pair);
            }
        }
        Ok(pairs)
    }
}
