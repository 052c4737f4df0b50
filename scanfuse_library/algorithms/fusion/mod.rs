//! Stability-gated scan fusion
//!
//! Joins the position-fix stream and the laser-scan stream:
//!
//! - every fix updates the current pose (unconditionally) and produces a new
//!   stability verdict
//! - every scan is projected with the current pose and paired with the
//!   latest verdict; only a stable verdict lets the points into the grid
//!
//! The join is last-value-wins. A scan never waits for the next fix, and a
//! scan that arrives before any fix is not joined at all.
//!
//! # Example
//!
//! ```rust
//! use scanfuse_library::algorithms::fusion::FusionPipeline;
//! use scanfuse_library::{LaserScan, Pose2D};
//!
//! let mut pipeline = FusionPipeline::default();
//! let scan = LaserScan::new(0.0, 0.0, vec![Some(1.0)]);
//!
//! assert!(pipeline.on_scan(&scan).is_none());
//!
//! for _ in 0..3 {
//!     pipeline.on_position_fix(Pose2D::from_xy(0.3, 0.3, 0.0));
//! }
//! let outcome = pipeline.on_scan(&scan).unwrap();
//! assert!(outcome.stable);
//! assert_eq!(outcome.increments, 1);
//! ```

use crate::algorithms::occupancy_grid::{GridConfig, OccupancyGrid};
use crate::algorithms::scan_projection;
use crate::algorithms::stability_window::{StabilityConfig, StabilityReport, StabilityWindow};
use crate::messages::geometry::{Pose2D, Vector2};
use crate::messages::mapping::MapFrame;
use crate::messages::sensor::{LaserScan, PositionFix};
use scanfuse_core::core::LogSummary;
use serde::{Deserialize, Serialize};

/// Result of one joined scan
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOutcome {
    /// World-frame obstacle points, always present regardless of stability
    pub points: Vec<Vector2>,
    /// Verdict the scan was joined with
    pub stable: bool,
    /// Points that landed inside the grid (0 when unstable)
    pub increments: usize,
}

/// Running counters of the pipeline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStats {
    pub fixes: u64,
    pub scans: u64,
    /// Scans that arrived before the first verdict
    pub scans_waiting: u64,
    /// Scans joined with a stable verdict
    pub scans_integrated: u64,
    pub points_projected: u64,
    pub cells_incremented: u64,
    /// Points of integrated scans that fell outside the grid
    pub points_out_of_bounds: u64,
}

impl LogSummary for PipelineStats {
    fn log_summary(&self) -> String {
        format!(
            "fixes={} scans={} (waiting={}, integrated={}) points={} cells+={} oob={}",
            self.fixes,
            self.scans,
            self.scans_waiting,
            self.scans_integrated,
            self.points_projected,
            self.cells_incremented,
            self.points_out_of_bounds
        )
    }
}

/// Owns the stability window, the grid and the current pose
#[derive(Debug, Clone)]
pub struct FusionPipeline {
    window: StabilityWindow,
    grid: OccupancyGrid,
    current_pose: Pose2D,
    latest_verdict: Option<StabilityReport>,
    latest_points: Vec<Vector2>,
    stats: PipelineStats,
}

impl Default for FusionPipeline {
    fn default() -> Self {
        Self::new(&GridConfig::default(), StabilityConfig::default(), Pose2D::default())
    }
}

impl FusionPipeline {
    pub fn new(grid: &GridConfig, stability: StabilityConfig, initial_pose: Pose2D) -> Self {
        Self {
            window: StabilityWindow::new(stability),
            grid: OccupancyGrid::from_config(grid),
            current_pose: initial_pose,
            latest_verdict: None,
            latest_points: Vec::new(),
            stats: PipelineStats::default(),
        }
    }

    /// Feed one pose sample
    ///
    /// The current pose follows the sample whatever the verdict.
    pub fn on_position_fix(&mut self, pose: Pose2D) -> StabilityReport {
        let report = self.window.observe_report(pose);
        self.current_pose = pose;
        self.latest_verdict = Some(report);
        self.stats.fixes += 1;
        report
    }

    /// Feed one fix record
    pub fn on_fix(&mut self, fix: &PositionFix) -> StabilityReport {
        self.on_position_fix(fix.to_pose())
    }

    /// Join a scan with the latest verdict
    ///
    /// Returns `None` while no fix has been seen yet.
    pub fn on_scan(&mut self, scan: &LaserScan) -> Option<ScanOutcome> {
        self.stats.scans += 1;
        let stable = match &self.latest_verdict {
            Some(report) => report.stable,
            None => {
                self.stats.scans_waiting += 1;
                return None;
            }
        };

        let points = scan_projection::transform(&self.current_pose, scan);
        self.stats.points_projected += points.len() as u64;

        let increments = if stable {
            let applied = self.grid.accumulate(points.iter().copied());
            self.stats.scans_integrated += 1;
            self.stats.cells_incremented += applied as u64;
            self.stats.points_out_of_bounds += (points.len() - applied) as u64;
            applied
        } else {
            0
        };

        self.latest_points.clone_from(&points);
        Some(ScanOutcome {
            points,
            stable,
            increments,
        })
    }

    /// Snapshot for renderers
    pub fn frame(&self, outcome: ScanOutcome) -> MapFrame {
        MapFrame {
            pose: self.current_pose,
            points: outcome.points,
            grid: self.grid.clone(),
            stable: outcome.stable,
            increments: outcome.increments,
            timestamp: crate::messages::now_nanos(),
        }
    }

    pub fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    pub fn current_pose(&self) -> Pose2D {
        self.current_pose
    }

    /// World points of the last joined scan
    pub fn latest_points(&self) -> &[Vector2] {
        &self.latest_points
    }

    pub fn latest_report(&self) -> Option<&StabilityReport> {
        self.latest_verdict.as_ref()
    }

    /// Latest verdict, false before the first fix
    pub fn is_stable(&self) -> bool {
        self.latest_verdict.map_or(false, |report| report.stable)
    }

    pub fn window(&self) -> &StabilityWindow {
        &self.window
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn room_scan() -> LaserScan {
        // Four beams a quarter turn apart, one of them without a return
        LaserScan::new(
            0.0,
            std::f64::consts::FRAC_PI_2,
            vec![Some(1.0), Some(0.5), None, Some(40.0)],
        )
    }

    fn settle(pipeline: &mut FusionPipeline, pose: Pose2D) {
        for _ in 0..3 {
            pipeline.on_position_fix(pose);
        }
    }

    #[test]
    fn test_scan_before_first_fix_is_not_joined() {
        let mut pipeline = FusionPipeline::default();
        assert!(pipeline.on_scan(&room_scan()).is_none());
        assert_eq!(pipeline.stats().scans_waiting, 1);
        assert!(pipeline.latest_points().is_empty());
    }

    #[test]
    fn test_first_fix_enables_join_even_when_unstable() {
        let mut pipeline = FusionPipeline::default();
        let report = pipeline.on_position_fix(Pose2D::from_xy(0.2, 0.2, 0.0));
        assert!(!report.stable);

        let outcome = pipeline.on_scan(&room_scan()).unwrap();
        assert!(!outcome.stable);
        assert_eq!(outcome.points.len(), 3);
        assert_eq!(outcome.increments, 0);
        assert_eq!(pipeline.grid().total_evidence(), 0);
    }

    #[test]
    fn test_unstable_scans_never_touch_grid() {
        let mut pipeline = FusionPipeline::default();
        let mut x = 0.0;
        for _ in 0..10 {
            // Half a metre per fix keeps the window jumping
            x += 0.5;
            pipeline.on_position_fix(Pose2D::from_xy(x, 0.0, 0.0));
            let outcome = pipeline.on_scan(&room_scan()).unwrap();
            assert!(!outcome.stable);
            assert_eq!(outcome.increments, 0);
        }
        assert_eq!(pipeline.grid().total_evidence(), 0);
        assert_eq!(pipeline.stats().points_projected, 30);
        assert_eq!(pipeline.stats().scans_integrated, 0);
    }

    #[test]
    fn test_stable_scans_accumulate_in_bounds_points() {
        let mut pipeline = FusionPipeline::default();
        settle(&mut pipeline, Pose2D::from_xy(0.1, 0.1, 0.0));
        assert!(pipeline.is_stable());

        let mut expected = 0;
        for _ in 0..10 {
            let outcome = pipeline.on_scan(&room_scan()).unwrap();
            // The 40m beam lands far outside the 3m grid
            assert_eq!(outcome.points.len(), 3);
            assert_eq!(outcome.increments, 2);
            expected += outcome.increments as u64;
        }

        assert_eq!(pipeline.grid().total_evidence(), expected);
        assert_eq!(pipeline.stats().cells_incremented, 20);
        assert_eq!(pipeline.stats().points_out_of_bounds, 10);
    }

    #[test]
    fn test_current_pose_follows_every_fix() {
        let mut pipeline = FusionPipeline::default();
        pipeline.on_position_fix(Pose2D::from_xy(1.0, 2.0, 0.5));
        assert_eq!(pipeline.current_pose(), Pose2D::from_xy(1.0, 2.0, 0.5));
        assert!(!pipeline.is_stable());

        let outcome = pipeline.on_scan(&LaserScan::new(0.0, 0.0, vec![Some(1.0)])).unwrap();
        let expected = Pose2D::from_xy(1.0, 2.0, 0.5).apply(Vector2::new(1.0, 0.0));
        assert_abs_diff_eq!(outcome.points[0].x, expected.x);
        assert_abs_diff_eq!(outcome.points[0].y, expected.y);
    }

    #[test]
    fn test_latest_verdict_wins() {
        let mut pipeline = FusionPipeline::default();
        settle(&mut pipeline, Pose2D::from_xy(0.1, 0.1, 0.0));
        // A jump makes the latest verdict unstable again
        pipeline.on_position_fix(Pose2D::from_xy(1.0, 0.1, 0.0));

        let outcome = pipeline.on_scan(&room_scan()).unwrap();
        assert!(!outcome.stable);
        assert_eq!(pipeline.grid().total_evidence(), 0);
    }

    #[test]
    fn test_frame_carries_grid_snapshot() {
        let mut pipeline = FusionPipeline::default();
        settle(&mut pipeline, Pose2D::from_xy(0.1, 0.1, 0.0));
        let outcome = pipeline.on_scan(&room_scan()).unwrap();
        let mut frame = pipeline.frame(outcome);

        assert!(frame.stable);
        assert_eq!(frame.increments, 2);
        assert_eq!(frame.grid.total_evidence(), 2);

        // Mutating the snapshot leaves the pipeline grid alone
        frame.grid.increment(0, 0);
        assert_eq!(pipeline.grid().total_evidence(), 2);
    }

    #[test]
    fn test_on_fix_uses_radians() {
        let mut pipeline = FusionPipeline::default();
        let fix = PositionFix {
            gps_x: 0.5,
            gps_y: 0.5,
            gps_orientation: 90.0,
            gps_orientation_rad: std::f64::consts::FRAC_PI_2,
            timestamp: 1,
        };
        pipeline.on_fix(&fix);
        assert_abs_diff_eq!(pipeline.current_pose().orientation, std::f64::consts::FRAC_PI_2);
    }
}
