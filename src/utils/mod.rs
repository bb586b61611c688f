pub mod allocator;
pub mod logging;
pub mod math;
pub mod queue;

pub use allocator::{Arena, EntityId};
pub use logging::ScopedTimer;
pub use queue::Queue;
