//! Particle Accelerator: a real-time rigid-body physics engine for convex
//! polyhedra. Broadphase is a dynamic AABB tree, narrowphase is GJK+SAT over
//! hull pairs, and contacts are resolved with a sequential-impulse solver.
//!
//! [`World`] is the entry point: register static and dynamic bodies, then
//! call [`World::step`] once per tick.

pub mod collision;
pub mod config;
pub mod core;
pub mod dynamics;
pub mod error;
pub mod utils;
pub mod world;

pub use core::{Body, BodyKind, Hull, HullShape, Material, Transform, Velocity};
pub use error::{EngineError, Result};
pub use world::{BodyHandle, DebugEvent, DebugSink, World};
