use scanfuse_core::core::LogSummary;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// 2D vector in world or robot frame
///
/// Plain value type: every operation returns a new vector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// Point at `radius` along the direction `angle` (radians)
    pub fn from_angle(angle: f64, radius: f64) -> Self {
        Self {
            x: radius * angle.cos(),
            y: radius * angle.sin(),
        }
    }

    /// Rotate counter-clockwise about the origin
    pub fn rotate(&self, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            x: self.x * cos - self.y * sin,
            y: self.x * sin + self.y * cos,
        }
    }

    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vector2 {
    type Output = Vector2;

    fn add(self, other: Vector2) -> Vector2 {
        Vector2::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Vector2 {
    type Output = Vector2;

    fn sub(self, other: Vector2) -> Vector2 {
        Vector2::new(self.x - other.x, self.y - other.y)
    }
}

impl LogSummary for Vector2 {
    fn log_summary(&self) -> String {
        format!("({:.3}, {:.3})", self.x, self.y)
    }
}

/// Robot pose in the world frame
///
/// `orientation` is always radians.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose2D {
    pub position: Vector2,
    pub orientation: f64,
}

impl Pose2D {
    pub const fn new(position: Vector2, orientation: f64) -> Self {
        Self {
            position,
            orientation,
        }
    }

    pub const fn from_xy(x: f64, y: f64, orientation: f64) -> Self {
        Self::new(Vector2::new(x, y), orientation)
    }

    /// Map a robot-frame vector into the world frame
    ///
    /// Rotates by `orientation`, then translates by `position`.
    pub fn apply(&self, local: Vector2) -> Vector2 {
        local.rotate(self.orientation) + self.position
    }

    /// True for the all-zero pose (also what an unset fix decodes to)
    pub fn is_zero(&self) -> bool {
        self.position.x == 0.0 && self.position.y == 0.0 && self.orientation == 0.0
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.orientation.is_finite()
    }
}

impl LogSummary for Pose2D {
    fn log_summary(&self) -> String {
        format!(
            "{:.3} / {:.3} @ {:.3}rad",
            self.position.x, self.position.y, self.orientation
        )
    }
}
