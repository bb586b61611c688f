use thiserror::Error;

/// Errors surfaced at shape construction, body construction, and step
/// boundaries. Per-step failures leave the world state unchanged from step
/// entry; construction-time failures are fatal to the object being built.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("invalid shape: {0}")]
    InvalidShape(String),

    #[error("singular inertia matrix (|det| < {threshold}, got {det})")]
    SingularInertia { det: f32, threshold: f32 },

    #[error("traversal queue overflow (capacity {capacity})")]
    QueueOverflow { capacity: usize },

    #[error("bvh partition received a degenerate leaf range [{lo}, {hi})")]
    PartitionDegenerate { lo: usize, hi: usize },

    #[error("no contact between the requested shapes")]
    NoContact,
}

pub type Result<T> = std::result::Result<T, EngineError>;
