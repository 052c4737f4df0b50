//! # scanfuse Library
//!
//! Messages, algorithms and nodes for stability-gated occupancy mapping.
//!
//! ## Structure
//!
//! ```text
//! scanfuse_library/
//! ── messages/       # Vector2, Pose2D, LaserScan, PositionFix, MapFrame, ...
//! ── algorithms/     # Stability window, scan projection, grid, fusion
//! ── nodes/          # Position fix, scan and fusion nodes
//! ── config.rs       # YAML/TOML run configuration
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use scanfuse_library::{FusionPipeline, LaserScan, Pose2D};
//!
//! let mut pipeline = FusionPipeline::default();
//! for _ in 0..3 {
//!     pipeline.on_position_fix(Pose2D::from_xy(0.3, 0.3, 0.0));
//! }
//!
//! let scan = LaserScan::new(0.0, 0.1, vec![Some(0.6), None, Some(0.6)]);
//! let outcome = pipeline.on_scan(&scan).unwrap();
//! assert_eq!(outcome.points.len(), 2);
//! assert_eq!(pipeline.grid().total_evidence(), 2);
//! ```

pub mod algorithms;
pub mod config;
pub mod messages;
pub mod nodes;

// Re-export core traits needed for message types
pub use scanfuse_core::core::LogSummary;

// Re-export message types at the crate root for convenience
pub use messages::*;

// Re-export the algorithm entry points
pub use algorithms::fusion::{FusionPipeline, PipelineStats, ScanOutcome};
pub use algorithms::occupancy_grid::{GridConfig, OccupancyGrid};
pub use algorithms::stability_window::{StabilityConfig, StabilityReport, StabilityWindow};
pub use config::FusionConfig;

// Re-export nodes for convenience
pub use nodes::{FusionNode, PositionFixNode, ScanNode};

/// Prelude module for convenient imports
///
/// # Usage
/// ```rust
/// use scanfuse_library::prelude::*;
///
/// let grid = OccupancyGrid::default();
/// assert_eq!(grid.dimensions(), (20, 20));
/// ```
pub mod prelude {
    // Core traits
    pub use crate::LogSummary;

    // Common message types
    pub use crate::messages::{
        geometry::{Pose2D, Vector2},
        mapping::{MapFrame, StabilityVerdict},
        sensor::{LaserScan, PositionFix},
    };

    // Algorithms
    pub use crate::algorithms::{
        fusion::{FusionPipeline, PipelineStats, ScanOutcome},
        occupancy_grid::{GridConfig, OccupancyGrid},
        scan_projection::{transform, transform_iter},
        stability_window::{StabilityConfig, StabilityReport, StabilityWindow},
    };

    pub use crate::config::FusionConfig;

    // Nodes and their sources
    pub use crate::nodes::{
        FixSource, FusionNode, PositionFixNode, ReplayFixSource, ScanNode, ScanSource,
        SimulatedFixSource, SimulatedScanSource,
    };
}
