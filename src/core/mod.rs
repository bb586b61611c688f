pub mod body;
pub mod hull;
pub mod types;

pub use body::{composite_mass_properties, Body, BodyKind, MassPart};
pub use hull::{Edge, Face, Hull, HullShape};
pub use types::{Material, MaterialPairProperties, Transform, Velocity};
