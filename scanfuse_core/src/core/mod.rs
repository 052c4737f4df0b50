//! # Core types and traits for scanfuse
//!
//! - **Node**: the base trait for every computational unit
//! - **NodeInfo**: runtime context handed to a node while it executes
//! - **LogSummary**: compact, log-friendly rendering of message types
//!
//! ## Node Lifecycle
//!
//! 1. **Construction** - node is created with its configuration
//! 2. **Initialization** - `init()` is called once by the scheduler
//! 3. **Execution** - `tick()` is called repeatedly
//! 4. **Shutdown** - `shutdown()` is called once on exit

pub mod node;
pub mod node_info_ext;

pub use node::{
    LogSummary, Node, NodeConfig, NodeInfo, NodeMetrics, NodeState, TopicMetadata,
};
pub use node_info_ext::NodeInfoExt;
