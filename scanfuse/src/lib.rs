//! # scanfuse - stability-gated occupancy mapping
//!
//! Builds a bounded occupancy grid from laser scans, but only while the
//! absolute position fixes say the robot's localization is holding still.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scanfuse::prelude::*;
//!
//! let config = FusionConfig::default();
//! let mut scheduler = scanfuse::runtime::build_scheduler(&config)?;
//! scheduler.run_for(Duration::from_secs(10))?;
//! # Ok::<(), ScanfuseError>(())
//! ```
//!
//! ## Crates
//!
//! - **scanfuse_core**: nodes, typed topics, the scheduler
//! - **scanfuse_library**: messages, mapping algorithms, nodes, configuration

pub mod render;
pub mod runtime;

// Re-export core components (avoiding conflicts)
pub use scanfuse_core::{self, *};

// Re-export standard library with alias
pub use scanfuse_library as library;

/// The scanfuse prelude - everything you need to get started
pub mod prelude {
    // Core node types
    pub use scanfuse_core::core::{Node, NodeConfig, NodeInfo, NodeInfoExt, NodeState};

    // Communication types
    pub use scanfuse_core::communication::Hub;

    // Scheduling
    pub use scanfuse_core::scheduling::Scheduler;

    // Error types
    pub use scanfuse_core::error::{ScanfuseError, ScanfuseResult};
    pub type Result<T> = ScanfuseResult<T>;

    // Common std types
    pub use std::time::{Duration, Instant};

    // Common traits
    pub use serde::{Deserialize, Serialize};

    // Re-export anyhow for error handling
    pub use anyhow::{anyhow, bail, ensure, Context, Result as AnyResult};

    // Messages, algorithms, nodes and configuration
    pub use scanfuse_library::prelude::*;

    pub use crate::render::ConsoleRenderer;
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get scanfuse version
pub fn version() -> &'static str {
    VERSION
}
