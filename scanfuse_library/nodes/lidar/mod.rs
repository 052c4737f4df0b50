use crate::messages::geometry::Pose2D;
use crate::LaserScan;
use scanfuse_core::core::TopicMetadata;
use scanfuse_core::error::ScanfuseResult;
use std::f64::consts::PI;
use std::time::{Duration, Instant};

// Type alias for cleaner signatures
type Result<T> = ScanfuseResult<T>;
use scanfuse_core::{Hub, Node, NodeInfo, NodeInfoExt};

/// Anything that can hand out laser scans
pub trait ScanSource: Send {
    fn next_scan(&mut self) -> Result<Option<LaserScan>>;

    /// Short description for logs
    fn describe(&self) -> String;
}

/// Simulated scanner in an empty rectangular room
///
/// The room is axis-aligned and centred on the world origin. Beams cover a
/// full turn starting at -pi; walls further than `max_range` give no return.
pub struct SimulatedScanSource {
    pose: Pose2D,
    half_width: f64,
    half_height: f64,
    beam_count: usize,
    max_range: f64,
}

impl SimulatedScanSource {
    pub fn new(pose: Pose2D, room_width: f64, room_height: f64) -> Self {
        Self {
            pose,
            half_width: room_width / 2.0,
            half_height: room_height / 2.0,
            beam_count: 180,
            max_range: 4.0,
        }
    }

    pub fn with_beams(mut self, beam_count: usize, max_range: f64) -> Self {
        self.beam_count = beam_count.max(1);
        self.max_range = max_range;
        self
    }

    /// Move the simulated robot
    pub fn set_pose(&mut self, pose: Pose2D) {
        self.pose = pose;
    }

    fn angle_increment(&self) -> f64 {
        2.0 * PI / self.beam_count as f64
    }

    /// Distance from the robot to the first wall along a world heading
    fn cast(&self, heading: f64) -> Option<f64> {
        let (dy, dx) = heading.sin_cos();
        let p = self.pose.position;

        let along = |delta: f64, pos: f64, half: f64| -> f64 {
            if delta > 0.0 {
                (half - pos) / delta
            } else if delta < 0.0 {
                (-half - pos) / delta
            } else {
                f64::INFINITY
            }
        };

        let distance = along(dx, p.x, self.half_width).min(along(dy, p.y, self.half_height));
        if distance >= 0.0 && distance <= self.max_range {
            Some(distance)
        } else {
            None
        }
    }
}

impl ScanSource for SimulatedScanSource {
    fn next_scan(&mut self) -> Result<Option<LaserScan>> {
        let increment = self.angle_increment();
        let ranges = (0..self.beam_count)
            .map(|i| self.cast(self.pose.orientation - PI + i as f64 * increment))
            .collect();
        Ok(Some(LaserScan::new(-PI, increment, ranges)))
    }

    fn describe(&self) -> String {
        format!(
            "simulated {}x{} room, {} beams",
            self.half_width * 2.0,
            self.half_height * 2.0,
            self.beam_count
        )
    }
}

/// Laser scan node
///
/// Polls its [`ScanSource`] but delivers at most one scan per
/// `min_interval`. The output topic keeps only `queue_depth` undelivered
/// scans (1 by default), so a slow consumer always sees the newest one.
pub struct ScanNode {
    publisher: Hub<LaserScan>,
    source: Box<dyn ScanSource>,

    // Configuration
    min_interval: Duration,

    // State
    last_delivery: Option<Instant>,
    scan_count: u64,
    error_count: u64,
}

impl ScanNode {
    /// Create a node with default topic "scan" in simulation mode
    pub fn new() -> Result<Self> {
        Self::new_with_topic("scan")
    }

    /// Create a node with custom topic in simulation mode
    pub fn new_with_topic(topic: &str) -> Result<Self> {
        let source = SimulatedScanSource::new(Pose2D::from_xy(0.3, 0.3, 0.0), 2.4, 2.4);
        Self::new_with_source(topic, 1, Box::new(source))
    }

    /// Create a node around any scan source
    pub fn new_with_source(
        topic: &str,
        queue_depth: usize,
        source: Box<dyn ScanSource>,
    ) -> Result<Self> {
        Ok(Self {
            publisher: Hub::new_with_capacity(topic, queue_depth)?,
            source,
            min_interval: Duration::from_millis(500),
            last_delivery: None,
            scan_count: 0,
            error_count: 0,
        })
    }

    /// Set the minimum time between two delivered scans
    pub fn set_min_interval(&mut self, interval: Duration) {
        self.min_interval = interval;
    }

    /// Get number of scans published
    pub fn get_scan_count(&self) -> u64 {
        self.scan_count
    }

    fn throttled(&self, now: Instant) -> bool {
        self.last_delivery
            .map_or(false, |last| now.duration_since(last) < self.min_interval)
    }
}

impl Node for ScanNode {
    fn name(&self) -> &'static str {
        "ScanNode"
    }

    fn init(&mut self, ctx: &mut NodeInfo) -> Result<()> {
        ctx.log_info(&format!(
            "Scan node initialized ({}, min interval {:?})",
            self.source.describe(),
            self.min_interval
        ));
        Ok(())
    }

    fn tick(&mut self, mut ctx: Option<&mut NodeInfo>) {
        let now = Instant::now();
        if self.throttled(now) {
            return;
        }

        match self.source.next_scan() {
            Ok(Some(scan)) => {
                self.last_delivery = Some(now);
                self.scan_count += 1;
                self.publisher.send(scan, ctx);
            }
            Ok(None) => {}
            Err(e) => {
                self.error_count += 1;
                ctx.log_warning(&format!("Skipping scan: {}", e));
            }
        }
    }

    fn shutdown(&mut self, ctx: &mut NodeInfo) -> Result<()> {
        ctx.log_info(&format!(
            "Scan node shutdown ({} scans, {} dropped by consumers, {} failed polls)",
            self.scan_count,
            self.publisher.get_metrics().messages_dropped,
            self.error_count
        ));
        Ok(())
    }

    fn get_publishers(&self) -> Vec<TopicMetadata> {
        vec![TopicMetadata::of::<LaserScan>(self.publisher.get_topic_name())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_cast_hits_walls() {
        let source = SimulatedScanSource::new(Pose2D::default(), 2.0, 4.0);
        assert_abs_diff_eq!(source.cast(0.0).unwrap(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(source.cast(FRAC_PI_2).unwrap(), 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(source.cast(PI).unwrap(), 1.0, epsilon = 1e-12);
        // Corner diagonal of a square room
        let square = SimulatedScanSource::new(Pose2D::default(), 2.0, 2.0);
        assert_abs_diff_eq!(
            square.cast(PI / 4.0).unwrap(),
            2.0_f64.sqrt(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_beyond_max_range_is_none() {
        let source =
            SimulatedScanSource::new(Pose2D::default(), 20.0, 2.0).with_beams(4, 5.0);
        assert!(source.cast(0.0).is_none());
        assert!(source.cast(FRAC_PI_2).is_some());
    }

    #[test]
    fn test_scan_shape() {
        let mut source =
            SimulatedScanSource::new(Pose2D::from_xy(0.2, -0.1, 0.4), 2.4, 2.4).with_beams(90, 4.0);
        let scan = source.next_scan().unwrap().unwrap();
        assert_eq!(scan.beam_count(), 90);
        assert_eq!(scan.valid_count(), 90);
        assert_abs_diff_eq!(scan.angle_min, -PI);
    }

    #[test]
    fn test_scan_points_lie_on_walls() {
        let pose = Pose2D::from_xy(0.3, 0.3, 0.7);
        let mut source = SimulatedScanSource::new(pose, 2.4, 2.4).with_beams(36, 4.0);
        let scan = source.next_scan().unwrap().unwrap();

        for point in crate::algorithms::scan_projection::transform(&pose, &scan) {
            let on_x_wall = (point.x.abs() - 1.2).abs() < 1e-9;
            let on_y_wall = (point.y.abs() - 1.2).abs() < 1e-9;
            assert!(on_x_wall || on_y_wall, "{:?} is not on a wall", point);
        }
    }

    #[test]
    fn test_min_interval_throttles_delivery() {
        let source = SimulatedScanSource::new(Pose2D::default(), 2.0, 2.0).with_beams(8, 4.0);
        let mut node = ScanNode::new_with_source("test_lidar/throttle", 1, Box::new(source)).unwrap();
        node.set_min_interval(Duration::from_secs(60));

        for _ in 0..5 {
            node.tick(None);
        }
        assert_eq!(node.get_scan_count(), 1);
    }

    #[test]
    fn test_queue_depth_one_keeps_newest() {
        let source = SimulatedScanSource::new(Pose2D::default(), 2.0, 2.0).with_beams(8, 4.0);
        let mut node = ScanNode::new_with_source("test_lidar/latest", 1, Box::new(source)).unwrap();
        node.set_min_interval(Duration::ZERO);
        let subscriber: Hub<LaserScan> = Hub::new("test_lidar/latest").unwrap();

        for _ in 0..3 {
            node.tick(None);
        }

        assert_eq!(node.get_scan_count(), 3);
        assert_eq!(subscriber.pending(), 1);
        assert!(subscriber.recv(None).is_some());
        assert!(subscriber.recv(None).is_none());
    }
}
