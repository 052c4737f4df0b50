use crate::messages::geometry::Pose2D;
use crate::PositionFix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use scanfuse_core::core::TopicMetadata;
use scanfuse_core::error::{ScanfuseError, ScanfuseResult};
use std::collections::VecDeque;
use std::path::Path;

// Type alias for cleaner signatures
type Result<T> = ScanfuseResult<T>;
use scanfuse_core::{Hub, Node, NodeInfo, NodeInfoExt};

/// Anything that can hand out position fixes
///
/// `Ok(None)` means no fix is available right now; an error means this poll
/// failed and the caller should skip it.
pub trait FixSource: Send {
    fn next_fix(&mut self) -> Result<Option<PositionFix>>;

    /// Short description for logs
    fn describe(&self) -> String;
}

/// Simulated positioning service
///
/// Reports a stationary robot at `base` with uniform jitter. Optionally
/// every n-th fix is thrown `jump_distance` off along x, like a receiver
/// losing lock for a moment.
pub struct SimulatedFixSource {
    base: Pose2D,
    jitter: f64,
    jump_every: Option<u64>,
    jump_distance: f64,
    rng: StdRng,
    count: u64,
}

impl SimulatedFixSource {
    pub fn new(base: Pose2D, jitter: f64, seed: u64) -> Self {
        Self {
            base,
            jitter: jitter.abs(),
            jump_every: None,
            jump_distance: 0.0,
            rng: StdRng::seed_from_u64(seed),
            count: 0,
        }
    }

    /// Make every `every`-th fix jump by `distance`
    pub fn with_jumps(mut self, every: u64, distance: f64) -> Self {
        self.jump_every = if every > 0 { Some(every) } else { None };
        self.jump_distance = distance;
        self
    }

    fn noise(&mut self) -> f64 {
        if self.jitter > 0.0 {
            self.rng.gen_range(-self.jitter..=self.jitter)
        } else {
            0.0
        }
    }
}

impl FixSource for SimulatedFixSource {
    fn next_fix(&mut self) -> Result<Option<PositionFix>> {
        self.count += 1;
        let mut x = self.base.position.x + self.noise();
        let y = self.base.position.y + self.noise();

        if let Some(every) = self.jump_every {
            if self.count % every == 0 {
                x += self.jump_distance;
            }
        }

        Ok(Some(PositionFix::new(x, y, self.base.orientation)))
    }

    fn describe(&self) -> String {
        format!(
            "simulated fixes around {:.2} / {:.2} (jitter {})",
            self.base.position.x, self.base.position.y, self.jitter
        )
    }
}

/// Replays recorded position-fix records
///
/// Accepts either a JSON array of records or one JSON record per line.
/// Records are parsed when they are polled, so a corrupt record only costs
/// its own fix.
pub struct ReplayFixSource {
    records: VecDeque<String>,
    total: usize,
}

impl ReplayFixSource {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let records: VecDeque<String> = if text.trim_start().starts_with('[') {
            let values: Vec<serde_json::Value> = serde_json::from_str(text)?;
            values.iter().map(|value| value.to_string()).collect()
        } else {
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect()
        };

        Ok(Self {
            total: records.len(),
            records,
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ScanfuseError::config(format!(
                "cannot read fix replay {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_json_str(&text)
    }

    /// Records not yet replayed
    pub fn remaining(&self) -> usize {
        self.records.len()
    }
}

impl FixSource for ReplayFixSource {
    fn next_fix(&mut self) -> Result<Option<PositionFix>> {
        match self.records.pop_front() {
            Some(record) => PositionFix::from_json(&record).map(Some),
            None => Ok(None),
        }
    }

    fn describe(&self) -> String {
        format!("replay of {} fixes", self.total)
    }
}

/// Position fix node
///
/// Polls its [`FixSource`] once per tick and publishes every fix it gets.
/// Schedule it at the desired polling rate (1 Hz by default). Failed polls
/// are logged and skipped; the node itself never fails.
pub struct PositionFixNode {
    publisher: Hub<PositionFix>,
    source: Box<dyn FixSource>,

    // State
    last_fix: Option<PositionFix>,
    fix_count: u64,
    error_count: u64,
    exhausted: bool,
}

impl PositionFixNode {
    /// Create a node with default topic "gps/fix" and a simulated source
    pub fn new() -> Result<Self> {
        Self::new_with_topic("gps/fix")
    }

    /// Create a node with custom topic and a simulated source
    pub fn new_with_topic(topic: &str) -> Result<Self> {
        let source = SimulatedFixSource::new(Pose2D::from_xy(0.3, 0.3, 0.0), 0.0005, 42);
        Self::new_with_source(topic, Box::new(source))
    }

    /// Create a node around any fix source
    pub fn new_with_source(topic: &str, source: Box<dyn FixSource>) -> Result<Self> {
        Ok(Self {
            publisher: Hub::new(topic)?,
            source,
            last_fix: None,
            fix_count: 0,
            error_count: 0,
            exhausted: false,
        })
    }

    /// Get last published fix
    pub fn get_last_fix(&self) -> Option<&PositionFix> {
        self.last_fix.as_ref()
    }

    /// Get number of fixes published
    pub fn get_fix_count(&self) -> u64 {
        self.fix_count
    }

    /// Get number of failed polls
    pub fn get_error_count(&self) -> u64 {
        self.error_count
    }
}

impl Node for PositionFixNode {
    fn name(&self) -> &'static str {
        "PositionFixNode"
    }

    fn init(&mut self, ctx: &mut NodeInfo) -> Result<()> {
        ctx.log_info(&format!(
            "Position fix node initialized ({})",
            self.source.describe()
        ));
        Ok(())
    }

    fn tick(&mut self, mut ctx: Option<&mut NodeInfo>) {
        match self.source.next_fix() {
            Ok(Some(fix)) => {
                self.exhausted = false;
                self.last_fix = Some(fix);
                self.fix_count += 1;
                self.publisher.send(fix, ctx);
            }
            Ok(None) => {
                if !self.exhausted {
                    self.exhausted = true;
                    ctx.log_info("Fix source has no data");
                }
            }
            Err(e) => {
                self.error_count += 1;
                ctx.log_warning(&format!("Skipping position fix: {}", e));
            }
        }
    }

    fn shutdown(&mut self, ctx: &mut NodeInfo) -> Result<()> {
        ctx.log_info(&format!(
            "Position fix node shutdown ({} fixes, {} failed polls)",
            self.fix_count, self.error_count
        ));
        Ok(())
    }

    fn get_publishers(&self) -> Vec<TopicMetadata> {
        vec![TopicMetadata::of::<PositionFix>(self.publisher.get_topic_name())]
    }
}
