use super::geometry::Pose2D;
use scanfuse_core::core::LogSummary;
use scanfuse_core::error::ScanfuseResult;
use serde::{Deserialize, Serialize};

/// Laser scan message
///
/// One range per beam, beam `i` points along `angle_min + i * angle_increment`
/// in the robot frame. `None` means the beam saw no return.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LaserScan {
    /// Angle of the first beam (radians)
    pub angle_min: f64,
    /// Angular distance between beams (radians)
    pub angle_increment: f64,
    pub ranges: Vec<Option<f64>>,
    /// Capture time in nanoseconds since the Unix epoch
    #[serde(default)]
    pub timestamp: u64,
}

impl LaserScan {
    /// Create a scan stamped with the current time
    pub fn new(angle_min: f64, angle_increment: f64, ranges: Vec<Option<f64>>) -> Self {
        Self {
            angle_min,
            angle_increment,
            ranges,
            timestamp: super::now_nanos(),
        }
    }

    /// Angle of beam `index` in the robot frame
    pub fn angle_at(&self, index: usize) -> f64 {
        self.angle_min + index as f64 * self.angle_increment
    }

    /// Number of beams that produced a return
    pub fn valid_count(&self) -> usize {
        self.ranges.iter().filter(|r| r.is_some()).count()
    }

    pub fn beam_count(&self) -> usize {
        self.ranges.len()
    }
}

impl LogSummary for LaserScan {
    fn log_summary(&self) -> String {
        format!(
            "LaserScan({}/{} returns)",
            self.valid_count(),
            self.beam_count()
        )
    }
}

/// Absolute position fix as delivered by the positioning service
///
/// Field names follow the service's JSON records. `gps_orientation` is in
/// degrees and only meant for display; poses are built from
/// `gps_orientation_rad`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PositionFix {
    pub gps_x: f64,
    pub gps_y: f64,
    #[serde(default)]
    pub gps_orientation: f64,
    pub gps_orientation_rad: f64,
    /// Receive time in nanoseconds since the Unix epoch
    #[serde(default)]
    pub timestamp: u64,
}

impl PositionFix {
    /// Create a fix from world coordinates and an orientation in radians
    pub fn new(x: f64, y: f64, orientation_rad: f64) -> Self {
        Self {
            gps_x: x,
            gps_y: y,
            gps_orientation: orientation_rad.to_degrees(),
            gps_orientation_rad: orientation_rad,
            timestamp: super::now_nanos(),
        }
    }

    /// Parse one JSON record
    pub fn from_json(json: &str) -> ScanfuseResult<Self> {
        let mut fix: PositionFix = serde_json::from_str(json)?;
        if fix.timestamp == 0 {
            fix.timestamp = super::now_nanos();
        }
        Ok(fix)
    }

    /// Robot pose described by this fix
    pub fn to_pose(&self) -> Pose2D {
        Pose2D::from_xy(self.gps_x, self.gps_y, self.gps_orientation_rad)
    }
}

impl From<Pose2D> for PositionFix {
    fn from(pose: Pose2D) -> Self {
        PositionFix::new(pose.position.x, pose.position.y, pose.orientation)
    }
}

impl LogSummary for PositionFix {
    fn log_summary(&self) -> String {
        format!(
            "PositionFix({:.3}, {:.3}, {:.1}deg)",
            self.gps_x, self.gps_y, self.gps_orientation
        )
    }
}
