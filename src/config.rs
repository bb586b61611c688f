//! Flat constants shared across the engine, following the crate's existing
//! flat-config convention rather than a builder or loaded file: every knob
//! here is a compile-time default a caller can still override per-body or
//! per-world.

use glam::Vec3;

/// Default gravitational acceleration (m/s^2), matching the stacked-cubes
/// test scenario's `g = 9.81`.
pub const DEFAULT_GRAVITY: Vec3 = Vec3::new(0.0, -9.81, 0.0);

/// Default fixed timestep (seconds), 1/60.
pub const DEFAULT_TIME_STEP: f32 = 1.0 / 60.0;

/// Default sequential-impulse iteration count per step.
pub const DEFAULT_SOLVER_ITERATIONS: u32 = 8;

/// Default per-second linear/angular velocity damping applied during
/// integration, independent of any contact friction.
pub const DEFAULT_LINEAR_DAMPING: f32 = 0.01;
pub const DEFAULT_ANGULAR_DAMPING: f32 = 0.05;

/// Expansion applied per axis to a body's AABB before it is stored as a BVH
/// leaf's fat bound, so minor motion doesn't force a tree re-insertion.
pub const BVH_FAT_AABB_PAD: f32 = 0.1;

/// Number of SAH bins evaluated per axis during binned bulk build.
pub const BVH_SAH_BINS: usize = 8;

/// Minimum axis extent (world units) worth binning; axes narrower than this
/// are skipped when choosing a split plane.
pub const BVH_MIN_AXIS_EXTENT: f32 = 1e-2;

/// A branch whose SAH cost is at or below this fraction of the root's cost
/// is freed and its leaves reinserted during bonsai pruning.
pub const BVH_BONSAI_PRUNE_THRESHOLD: f32 = 0.05;

/// Separating-axis / GJK tolerance: distances or dot products within this
/// of zero are treated as touching rather than separated or penetrating.
pub const SAT_EPSILON: f32 = 1e-4;

/// Maximum GJK simplex refinement iterations before declaring overlap.
pub const GJK_MAX_ITERATIONS: u32 = 8;

/// Baumgarte stabilization constant `k`; the solver divides this by the
/// step's `dt` rather than assuming a fixed tick rate (see DESIGN.md).
pub const BAUMGARTE_K: f32 = 120.0;

/// Scale used to quantize manifold points onto an integer lattice before
/// hashing for deduplication.
pub const MANIFOLD_QUANTIZATION_SCALE: f32 = 10_000.0;

/// Mat3 inversion fails below this absolute determinant.
pub const SINGULAR_INERTIA_THRESHOLD: f32 = 1e-3;

/// Linear/angular speed below which a body accrues sleep time.
pub const SLEEP_LINEAR_THRESHOLD: f32 = 0.05;
pub const SLEEP_ANGULAR_THRESHOLD: f32 = 0.05;

/// Seconds a body must stay under the sleep thresholds before sleeping.
pub const SLEEP_TIME_THRESHOLD: f32 = 0.5;

/// Initial traversal queue capacity (must be a power of two); grown by
/// doubling on `QueueOverflow` by callers that manage their own queues.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;
