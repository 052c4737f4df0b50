//! Message types exchanged between scanfuse nodes
//!
//! - Geometry: spatial primitives (Vector2, Pose2D)
//! - Sensor: raw inputs (LaserScan, PositionFix)
//! - Mapping: pipeline outputs (StabilityVerdict, MapFrame)
//!
//! All message types are re-exported at the crate root for convenience.

pub mod geometry;
pub mod mapping;
pub mod sensor;

pub use geometry::{Pose2D, Vector2};
pub use mapping::{MapFrame, StabilityVerdict};
pub use sensor::{LaserScan, PositionFix};

/// Current time in nanoseconds since the Unix epoch
pub(crate) fn now_nanos() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}
