//! scanfuse nodes
//!
//! Every node follows the same constructor pattern: `NodeName::new()` for the
//! default configuration, or a `new_with_*` / `from_config` variant for
//! custom topics and sources.
//!
//! ## Sensor Interfaces
//! - `PositionFixNode` - absolute position fixes on "gps/fix"
//! - `ScanNode` - rate-limited laser scans on "scan"
//!
//! ## Mapping
//! - `FusionNode` - stability verdicts on "stability", map frames on "map/frame"
//!
//! # Usage Examples
//!
//! ```rust
//! use scanfuse_library::nodes::*;
//! use scanfuse_library::{FusionConfig, Pose2D};
//!
//! let config = FusionConfig::default();
//!
//! let source = SimulatedFixSource::new(Pose2D::from_xy(0.3, 0.3, 0.0), 0.0005, 7);
//! let fixes = PositionFixNode::new_with_source("docs/gps/fix", Box::new(source)).unwrap();
//! let scans = ScanNode::new_with_topic("docs/scan").unwrap();
//! let fusion = FusionNode::from_config(&config).unwrap();
//! ```

pub mod fusion;
pub mod gps;
pub mod lidar;

// Sensor Interface Nodes
pub use gps::{FixSource, PositionFixNode, ReplayFixSource, SimulatedFixSource};
pub use lidar::{ScanNode, ScanSource, SimulatedScanSource};

// Mapping Nodes
pub use fusion::FusionNode;

// Re-export core types for convenience
pub use scanfuse_core::{Hub, Node, NodeInfo};
