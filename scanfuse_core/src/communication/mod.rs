//! # Communication layer for scanfuse
//!
//! Nodes talk through named, typed, in-process topics:
//!
//! - **Topic**: bounded ring shared by every handle opened with the same name
//! - **Hub**: publish/subscribe handle with its own read cursor and metrics
//!
//! ```rust
//! use scanfuse_core::communication::Hub;
//!
//! let scans: Hub<String> = Hub::new_with_capacity("docs/latest", 1).unwrap();
//! scans.send("old".to_string(), None);
//! scans.send("new".to_string(), None);
//! assert_eq!(scans.recv(None).as_deref(), Some("new"));
//! ```

pub mod hub;
pub mod topic;

pub use hub::{Hub, HubMetrics, DEFAULT_CAPACITY};
pub use topic::{Delivery, PushOutcome, Topic};
