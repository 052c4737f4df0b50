//! Pure computational algorithms for stability-gated mapping
//!
//! No I/O in here: every algorithm is a plain value or function that nodes
//! (or any other caller) drive directly.
//!
//! # Available Algorithms
//!
//! ## Localization
//! - **stability_window**: sliding-window stability classifier over pose samples
//!
//! ## Mapping
//! - **scan_projection**: polar-to-world transform of laser scans
//! - **occupancy_grid**: confidence-capped evidence grid
//! - **fusion**: joins fixes and scans, gates grid updates on stability

pub mod fusion;
pub mod occupancy_grid;
pub mod scan_projection;
pub mod stability_window;
