//! Polar-to-world projection of laser scans
//!
//! Beam `i` with range `r` lands at `pose.apply(from_angle(angle_min + i *
//! angle_increment, r))`. Beams without a return produce no point, so the
//! output can be shorter than the scan but always keeps beam order.
//!
//! # Example
//!
//! ```rust
//! use scanfuse_library::algorithms::scan_projection;
//! use scanfuse_library::{LaserScan, Pose2D};
//!
//! let pose = Pose2D::from_xy(1.0, 0.0, 0.0);
//! let scan = LaserScan::new(0.0, 0.1, vec![Some(2.0), None]);
//!
//! let points = scan_projection::transform(&pose, &scan);
//! assert_eq!(points.len(), 1);
//! assert!((points[0].x - 3.0).abs() < 1e-12);
//! ```

use crate::messages::geometry::{Pose2D, Vector2};
use crate::messages::sensor::LaserScan;

/// Project every returning beam into the world frame
pub fn transform(pose: &Pose2D, scan: &LaserScan) -> Vec<Vector2> {
    transform_iter(pose, scan).collect()
}

/// Lazy form of [`transform`]
pub fn transform_iter<'a>(
    pose: &'a Pose2D,
    scan: &'a LaserScan,
) -> impl Iterator<Item = Vector2> + 'a {
    scan.ranges.iter().enumerate().filter_map(move |(i, range)| {
        range.map(|r| pose.apply(Vector2::from_angle(scan.angle_at(i), r)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn single_beam(angle: f64, range: f64) -> LaserScan {
        LaserScan::new(angle, 0.0, vec![Some(range)])
    }

    #[test]
    fn test_identity_pose() {
        let points = transform(&Pose2D::default(), &single_beam(0.0, 5.0));
        assert_eq!(points.len(), 1);
        assert_abs_diff_eq!(points[0].x, 5.0);
        assert_abs_diff_eq!(points[0].y, 0.0);
    }

    #[test]
    fn test_rotated_pose() {
        let pose = Pose2D::from_xy(0.0, 0.0, FRAC_PI_2);
        let points = transform(&pose, &single_beam(0.0, 5.0));
        assert_abs_diff_eq!(points[0].x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(points[0].y, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_translated_and_rotated() {
        let pose = Pose2D::from_xy(2.0, -1.0, PI);
        let points = transform(&pose, &single_beam(FRAC_PI_2, 1.0));
        // Beam points +y in robot frame, -y in world after the half turn
        assert_abs_diff_eq!(points[0].x, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(points[0].y, -2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_null_beams_filtered() {
        let scan = LaserScan::new(-0.5, 0.25, vec![None, Some(2.0), None]);
        let pose = Pose2D::from_xy(3.0, 4.0, 1.2);
        let points = transform(&pose, &scan);
        assert_eq!(points.len(), 1);

        let expected = pose.apply(Vector2::from_angle(-0.25, 2.0));
        assert_abs_diff_eq!(points[0].x, expected.x);
        assert_abs_diff_eq!(points[0].y, expected.y);
    }

    #[test]
    fn test_beam_order_preserved() {
        let scan = LaserScan::new(0.0, FRAC_PI_2, vec![Some(1.0), None, Some(1.0), Some(1.0)]);
        let points: Vec<_> = transform_iter(&Pose2D::default(), &scan).collect();

        assert_eq!(points.len(), 3);
        assert_abs_diff_eq!(points[0].x, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(points[1].x, -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(points[2].y, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_scan() {
        let scan = LaserScan::new(0.0, 0.1, Vec::new());
        assert!(transform(&Pose2D::default(), &scan).is_empty());
    }
}
