pub mod aabb;
pub mod bvh;
pub mod clipping;
pub mod contact;
pub mod gjk;
pub mod sat;

pub use aabb::Aabb;
pub use bvh::{BodyHandle, Bvh, NodeHandle};
pub use contact::{Manifold, ManifoldPoint};
