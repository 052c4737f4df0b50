use super::geometry::{Pose2D, Vector2};
use crate::algorithms::occupancy_grid::OccupancyGrid;
use crate::algorithms::stability_window::StabilityReport;
use scanfuse_core::core::LogSummary;
use serde::{Deserialize, Serialize};

/// Localization stability verdict, published once per position fix
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StabilityVerdict {
    pub stable: bool,
    pub report: StabilityReport,
    pub timestamp: u64,
}

impl StabilityVerdict {
    pub fn new(report: StabilityReport) -> Self {
        Self {
            stable: report.stable,
            report,
            timestamp: super::now_nanos(),
        }
    }
}

impl LogSummary for StabilityVerdict {
    fn log_summary(&self) -> String {
        format!(
            "StabilityVerdict({}, err=({:.4}, {:.4}, {:.4}))",
            if self.stable { "stable" } else { "unstable" },
            self.report.error_x,
            self.report.error_y,
            self.report.error_orientation
        )
    }
}

/// Everything a renderer needs for one scan event
///
/// `grid` is a snapshot; receivers own it and cannot affect the mapping
/// state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapFrame {
    pub pose: Pose2D,
    /// World-frame obstacle points of the scan, in beam order
    pub points: Vec<Vector2>,
    pub grid: OccupancyGrid,
    pub stable: bool,
    /// Cells incremented by this scan
    pub increments: usize,
    pub timestamp: u64,
}

impl LogSummary for MapFrame {
    fn log_summary(&self) -> String {
        format!(
            "MapFrame({} points, +{} cells, {})",
            self.points.len(),
            self.increments,
            if self.stable { "stable" } else { "unstable" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::stability_window::StabilityWindow;

    #[test]
    fn test_unfilled_verdict_serializes_nan_as_null() {
        let mut window = StabilityWindow::default();
        let report = window.observe_report(Pose2D::from_xy(0.1, 0.1, 0.0));
        let verdict = StabilityVerdict::new(report);

        let json: serde_json::Value = serde_json::to_value(verdict).unwrap();
        assert_eq!(json["stable"], false);
        assert_eq!(json["report"]["filled"], false);
        assert!(json["report"]["error_x"].is_null());
        assert!(json["report"]["mean"]["position"]["x"].is_null());
    }

    #[test]
    fn test_frame_roundtrip() {
        let frame = MapFrame {
            pose: Pose2D::from_xy(0.3, 0.3, 0.0),
            points: vec![Vector2::new(1.2, 0.3)],
            grid: OccupancyGrid::new(4, 4, 0.5),
            stable: true,
            increments: 1,
            timestamp: 7,
        };

        let json = serde_json::to_string(&frame).unwrap();
        let back: MapFrame = serde_json::from_str(&json).unwrap();
        assert_eq!(back, frame);
    }
}
