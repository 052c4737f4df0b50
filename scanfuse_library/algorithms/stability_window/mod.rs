//! Sliding-window localization stability classifier
//!
//! Keeps the last `W` pose samples in a ring and judges whether the
//! localization estimate is holding still or jumping around.
//!
//! # Algorithm
//!
//! 1. Write the sample at the cursor, advance the cursor modulo `W`
//! 2. Average x, y and orientation over all `W` slots. A slot that was never
//!    written contributes NaN, so the verdict stays unstable until the window
//!    has been filled once
//! 3. Sum the squared deviations from the mean per axis, positions scaled by
//!    `scale` before squaring
//! 4. Stable iff every enforced error is within its threshold
//!
//! The verdict is recomputed from scratch on every sample; nothing latches.
//!
//! # Example
//!
//! ```rust
//! use scanfuse_library::algorithms::stability_window::StabilityWindow;
//! use scanfuse_library::Pose2D;
//!
//! let mut window = StabilityWindow::default();
//!
//! assert!(!window.observe(Pose2D::from_xy(1.0, 2.0, 0.0)));
//! assert!(!window.observe(Pose2D::from_xy(1.0, 2.0, 0.0)));
//! // Third sample fills the window
//! assert!(window.observe(Pose2D::from_xy(1.0, 2.0, 0.0)));
//! ```

use crate::messages::geometry::Pose2D;
use serde::{Deserialize, Serialize};

/// Classifier parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilityConfig {
    /// Number of samples averaged (W)
    pub window_size: usize,
    /// Position unit conversion applied before squaring
    pub scale: f64,
    pub max_error_x: f64,
    pub max_error_y_low: f64,
    pub max_error_y_high: f64,
    /// Orientation error limit; `None` reports the error without enforcing it
    pub max_error_orientation: Option<f64>,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            window_size: 3,
            scale: 100.0,
            max_error_x: 0.1,
            max_error_y_low: 0.1,
            max_error_y_high: 5.0,
            max_error_orientation: None,
        }
    }
}

/// Result of one classification
///
/// Serialize-only: the NaN fields of an unfilled window are written as JSON
/// `null` and cannot be read back as numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StabilityReport {
    /// Mean pose over the window (NaN components while not filled)
    pub mean: Pose2D,
    pub error_x: f64,
    pub error_y: f64,
    pub error_orientation: f64,
    /// Every slot has been written at least once
    pub filled: bool,
    pub stable: bool,
}

impl StabilityReport {
    fn unstable(mean: Pose2D, filled: bool) -> Self {
        Self {
            mean,
            error_x: f64::NAN,
            error_y: f64::NAN,
            error_orientation: f64::NAN,
            filled,
            stable: false,
        }
    }
}

/// Ring of the last `W` pose samples
#[derive(Debug, Clone)]
pub struct StabilityWindow {
    config: StabilityConfig,
    slots: Vec<Option<Pose2D>>,
    cursor: usize,
    last_report: Option<StabilityReport>,
}

impl Default for StabilityWindow {
    fn default() -> Self {
        Self::new(StabilityConfig::default())
    }
}

impl StabilityWindow {
    /// Create an empty window
    ///
    /// A window size of zero is treated as one.
    pub fn new(config: StabilityConfig) -> Self {
        let size = config.window_size.max(1);
        Self {
            config,
            slots: vec![None; size],
            cursor: 0,
            last_report: None,
        }
    }

    /// Add a sample and return the verdict
    pub fn observe(&mut self, sample: Pose2D) -> bool {
        self.observe_report(sample).stable
    }

    /// Add a sample and return the full classification
    pub fn observe_report(&mut self, sample: Pose2D) -> StabilityReport {
        self.slots[self.cursor] = Some(sample);
        self.cursor = (self.cursor + 1) % self.slots.len();

        let report = self.classify();
        self.last_report = Some(report);
        report
    }

    fn classify(&self) -> StabilityReport {
        let filled = self.is_filled();
        let mean = self.mean();
        if !mean.is_finite() {
            return StabilityReport::unstable(mean, filled);
        }

        let scale = self.config.scale;
        let (mut error_x, mut error_y, mut error_orientation) = (0.0, 0.0, 0.0);
        for pose in self.slots.iter().flatten() {
            error_x += ((pose.position.x - mean.position.x) * scale).powi(2);
            error_y += ((pose.position.y - mean.position.y) * scale).powi(2);
            error_orientation += (pose.orientation - mean.orientation).powi(2);
        }

        // Never-initialized sentinel: every sample is the zero pose
        if mean.is_zero() && error_x == 0.0 && error_y == 0.0 && error_orientation == 0.0 {
            return StabilityReport {
                mean,
                error_x,
                error_y,
                error_orientation,
                filled,
                stable: false,
            };
        }

        let orientation_ok = self
            .config
            .max_error_orientation
            .map_or(true, |limit| error_orientation <= limit);

        let stable = error_x <= self.config.max_error_x
            && error_y <= self.config.max_error_y_low
            && error_y <= self.config.max_error_y_high
            && orientation_ok;

        StabilityReport {
            mean,
            error_x,
            error_y,
            error_orientation,
            filled,
            stable,
        }
    }

    fn mean(&self) -> Pose2D {
        let n = self.slots.len() as f64;
        let (mut x, mut y, mut orientation) = (0.0, 0.0, 0.0);
        for slot in &self.slots {
            match slot {
                Some(pose) => {
                    x += pose.position.x;
                    y += pose.position.y;
                    orientation += pose.orientation;
                }
                None => {
                    x = f64::NAN;
                    y = f64::NAN;
                    orientation = f64::NAN;
                }
            }
        }
        Pose2D::from_xy(x / n, y / n, orientation / n)
    }

    /// Forget every sample; the next `W - 1` verdicts are unstable again
    pub fn reset(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.cursor = 0;
        self.last_report = None;
    }

    /// True once every slot has been written
    pub fn is_filled(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Most recent classification, `None` before the first sample
    pub fn last_report(&self) -> Option<&StabilityReport> {
        self.last_report.as_ref()
    }

    pub fn window_size(&self) -> usize {
        self.slots.len()
    }

    pub fn config(&self) -> &StabilityConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pose(x: f64, y: f64, orientation: f64) -> Pose2D {
        Pose2D::from_xy(x, y, orientation)
    }

    #[test]
    fn test_unstable_until_filled() {
        let mut window = StabilityWindow::default();

        let first = window.observe_report(pose(3.0, 4.0, 0.5));
        assert!(!first.stable);
        assert!(!first.filled);
        assert!(first.mean.position.x.is_nan());

        assert!(!window.observe(pose(3.0, 4.0, 0.5)));
        assert!(window.observe(pose(3.0, 4.0, 0.5)));
        assert!(window.is_filled());
    }

    #[test]
    fn test_prefill_with_larger_window() {
        let mut window = StabilityWindow::new(StabilityConfig {
            window_size: 5,
            ..Default::default()
        });
        for _ in 0..4 {
            assert!(!window.observe(pose(1.0, 1.0, 0.0)));
        }
        assert!(window.observe(pose(1.0, 1.0, 0.0)));
    }

    #[test]
    fn test_zero_pose_sentinel() {
        let mut window = StabilityWindow::default();
        for _ in 0..3 {
            assert!(!window.observe(Pose2D::default()));
        }
        let report = window.last_report().unwrap();
        assert!(report.filled);
        assert!(!report.stable);
    }

    #[test]
    fn test_small_jitter_is_stable() {
        let mut window = StabilityWindow::default();
        window.observe(pose(0.0, 0.0, 0.0));
        window.observe(pose(0.001, 0.0, 0.0));
        let report = window.observe_report(pose(-0.001, 0.0, 0.0));

        assert!(report.stable);
        assert_relative_eq!(report.error_x, 0.02, epsilon = 1e-9);
        assert_relative_eq!(report.error_y, 0.0);
    }

    #[test]
    fn test_large_jitter_is_unstable() {
        let mut window = StabilityWindow::default();
        window.observe(pose(0.0, 0.0, 0.0));
        window.observe(pose(0.1, 0.0, 0.0));
        let report = window.observe_report(pose(-0.1, 0.0, 0.0));

        assert!(!report.stable);
        assert_relative_eq!(report.error_x, 200.0, epsilon = 1e-6);
    }

    #[test]
    fn test_y_axis_uses_tighter_threshold() {
        let mut window = StabilityWindow::default();
        window.observe(pose(5.0, 5.0, 0.0));
        window.observe(pose(5.0, 5.01, 0.0));
        // err.y is about 2: under the loose limit, over the tight one
        let report = window.observe_report(pose(5.0, 4.99, 0.0));
        assert!(report.error_y > 0.1 && report.error_y < 5.0);
        assert!(!report.stable);
    }

    #[test]
    fn test_orientation_reported_not_enforced_by_default() {
        let mut window = StabilityWindow::default();
        window.observe(pose(2.0, 2.0, 0.0));
        window.observe(pose(2.0, 2.0, 1.0));
        let report = window.observe_report(pose(2.0, 2.0, -1.0));

        assert!(report.stable);
        assert_relative_eq!(report.error_orientation, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_orientation_threshold_when_configured() {
        let mut window = StabilityWindow::new(StabilityConfig {
            max_error_orientation: Some(0.5),
            ..Default::default()
        });
        window.observe(pose(2.0, 2.0, 0.0));
        window.observe(pose(2.0, 2.0, 1.0));
        assert!(!window.observe(pose(2.0, 2.0, -1.0)));
    }

    #[test]
    fn test_verdict_recovers_after_jump() {
        let mut window = StabilityWindow::default();
        for _ in 0..3 {
            window.observe(pose(1.0, 1.0, 0.0));
        }
        assert!(!window.observe(pose(3.0, 1.0, 0.0)));
        assert!(!window.observe(pose(3.0, 1.0, 0.0)));
        // Oldest sample at x=1 is overwritten now
        assert!(window.observe(pose(3.0, 1.0, 0.0)));
    }

    #[test]
    fn test_nan_sample_is_unstable() {
        let mut window = StabilityWindow::default();
        window.observe(pose(1.0, 1.0, 0.0));
        window.observe(pose(1.0, 1.0, 0.0));
        assert!(!window.observe(pose(f64::NAN, 1.0, 0.0)));
    }

    #[test]
    fn test_reset() {
        let mut window = StabilityWindow::default();
        for _ in 0..3 {
            window.observe(pose(1.0, 1.0, 0.0));
        }
        window.reset();

        assert!(!window.is_filled());
        assert!(window.last_report().is_none());
        assert!(!window.observe(pose(1.0, 1.0, 0.0)));
    }
}
