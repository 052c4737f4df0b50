//! # scanfuse Core
//!
//! The runtime underneath the scanfuse mapping pipeline:
//!
//! - **Nodes**: independent computational units with a lifecycle
//! - **Communication**: named, typed, in-process publish/subscribe topics
//! - **Scheduling**: a single-threaded cooperative tick loop
//! - **Errors**: one error enum shared by every crate in the workspace
//!
//! ## Quick Start
//!
//! ```rust
//! use scanfuse_core::{Hub, Node, NodeInfo, Scheduler};
//!
//! struct Heartbeat {
//!     output: Hub<u64>,
//!     beats: u64,
//! }
//!
//! impl Node for Heartbeat {
//!     fn name(&self) -> &'static str { "heartbeat" }
//!
//!     fn tick(&mut self, ctx: Option<&mut NodeInfo>) {
//!         self.beats += 1;
//!         self.output.send(self.beats, ctx);
//!     }
//! }
//!
//! let output = Hub::new("docs/heartbeat").unwrap();
//! let mut scheduler = Scheduler::new();
//! scheduler.add(Box::new(Heartbeat { output: output.clone(), beats: 0 }), 0, None);
//! scheduler.tick_once();
//! assert_eq!(output.recv(None), Some(1));
//! ```

pub mod communication;
pub mod core;
pub mod error;
pub mod scheduling;

// Re-export commonly used types for easy access
pub use communication::{Hub, HubMetrics};
pub use core::{LogSummary, Node, NodeConfig, NodeInfo, NodeInfoExt, NodeState, TopicMetadata};
pub use error::{ScanfuseError, ScanfuseResult};
pub use scheduling::Scheduler;
