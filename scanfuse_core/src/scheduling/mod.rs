//! # scanfuse Scheduling System
//!
//! A single-threaded, cooperative scheduler that orchestrates node execution:
//!
//! - **Priorities**: numeric, lower ticks first within a pass
//! - **Per-node rates**: a node can be limited to N ticks per second
//! - **Fault isolation**: a panicking tick is recorded and the loop goes on
//!
//! ## Usage
//!
//! ```rust,ignore
//! use scanfuse_core::Scheduler;
//!
//! let mut scheduler = Scheduler::new();
//! scheduler.add(Box::new(fix_node), 0, Some(true));
//! scheduler.add(Box::new(fusion_node), 10, None);
//! scheduler.set_node_rate("PositionFixNode", 1.0);
//! scheduler.run()?;
//! ```

pub mod scheduler;

pub use scheduler::{Scheduler, DEFAULT_TICK_RATE_HZ};
